//! 2D texture arrays.

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

/// An array of 2D layers of the same size and format.
#[derive(Clone)]
pub struct TextureArray(pub(crate) Rc<TextureCore>);

impl_texture!(TextureArray);

impl Context {
  /// A texture array of `layers` layers; the initial data holds the layers one after the other.
  pub fn texture_array(
    &self,
    (w, h, layers): (u32, u32, u32),
    components: usize,
    data: Option<Source>,
    options: TextureOptions,
  ) -> Result<TextureArray> {
    let state = self.current_state()?;
    let limits = state.limits();

    if options.samples > 0 {
      return Err(Error::creation("texture arrays cannot be multisampled"));
    }

    check_size(&[w, h], limits.max_texture_size)?;
    check_size(&[layers], limits.max_array_texture_layers)?;

    let desc = TextureDesc {
      target: gl::TEXTURE_2D_ARRAY,
      format: PixelFormat::color(components, options.dtype)?,
      size: (w, h, layers),
      samples: 0,
      alignment: options.alignment,
      params: SamplerParams::for_dtype(options.dtype),
      volume: false,
    };

    Ok(TextureArray(Rc::new(TextureCore::create(state, desc, data)?)))
  }
}

impl TextureArray {
  /// Width, height and number of layers.
  pub fn size(&self) -> (u32, u32, u32) {
    self.0.size
  }

  pub fn layers(&self) -> u32 {
    self.0.size.2
  }

  /// Write `data` into a box of a mipmap level, the `z` axis selecting layers; the whole level
  /// if `None`.
  pub fn write<'a>(
    &self,
    data: impl Into<Source<'a>>,
    viewport: Option<Viewport3>,
    level: u32,
    alignment: usize,
  ) -> Result<()> {
    let (w, h, layers) = self.0.level_size(level)?;
    let region = viewport.unwrap_or(Viewport3::full(w, h, layers));
    region.check_within(w, h, layers)?;

    self
      .0
      .upload(gl::TEXTURE_2D_ARRAY, region, level, alignment, data.into())
  }

  /// Read every layer of a mipmap level.
  pub fn read(&self, level: u32, alignment: usize) -> Result<Vec<u8>> {
    self.0.read(gl::TEXTURE_2D_ARRAY, level, alignment)
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
      .download(gl::TEXTURE_2D_ARRAY, level, alignment, dst.into(), write_offset)
  }
}
