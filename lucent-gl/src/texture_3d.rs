//! 3D textures.

use crate::{
  context::Context,
  texture::{check_size, impl_texture, TextureCore, TextureDesc, TextureOptions},
  transfer::{Destination, Source},
};
use lucent::{
  texture::{check_alignment, PixelFormat, SamplerParams},
  viewport::Viewport3,
  Error, Result,
};
use std::rc::Rc;

/// A volume texture. All three dimensions shrink along mipmap levels.
#[derive(Clone)]
pub struct Texture3D(pub(crate) Rc<TextureCore>);

impl_texture!(Texture3D);

impl Context {
  pub fn texture3d(
    &self,
    (w, h, d): (u32, u32, u32),
    components: usize,
    data: Option<Source>,
    options: TextureOptions,
  ) -> Result<Texture3D> {
    let state = self.current_state()?;

    if options.samples > 0 {
      return Err(Error::creation("3D textures cannot be multisampled"));
    }

    check_size(&[w, h, d], state.limits().max_3d_texture_size)?;

    let desc = TextureDesc {
      target: gl::TEXTURE_3D,
      format: PixelFormat::color(components, options.dtype)?,
      size: (w, h, d),
      samples: 0,
      alignment: options.alignment,
      params: SamplerParams::for_dtype(options.dtype),
      volume: true,
    };

    Ok(Texture3D(Rc::new(TextureCore::create(state, desc, data)?)))
  }
}

impl Texture3D {
  pub fn size(&self) -> (u32, u32, u32) {
    self.0.size
  }

  pub fn width(&self) -> u32 {
    self.0.size.0
  }

  pub fn height(&self) -> u32 {
    self.0.size.1
  }

  pub fn depth(&self) -> u32 {
    self.0.size.2
  }

  /// Write `data` into a box of a mipmap level; the whole level if `None`.
  pub fn write<'a>(
    &self,
    data: impl Into<Source<'a>>,
    viewport: Option<Viewport3>,
    level: u32,
    alignment: usize,
  ) -> Result<()> {
    let (w, h, d) = self.0.level_size(level)?;
    let region = viewport.unwrap_or(Viewport3::full(w, h, d));
    region.check_within(w, h, d)?;

    self
      .0
      .upload(gl::TEXTURE_3D, region, level, alignment, data.into())
  }

  pub fn read(&self, level: u32, alignment: usize) -> Result<Vec<u8>> {
    self.0.read(gl::TEXTURE_3D, level, alignment)
  }

  pub fn read_into<'a>(
    &self,
    dst: impl Into<Destination<'a>>,
    level: u32,
    alignment: usize,
    write_offset: usize,
  ) -> Result<()> {
    check_alignment(alignment)?;
    self
      .0
      .download(gl::TEXTURE_3D, level, alignment, dst.into(), write_offset)
  }
}
