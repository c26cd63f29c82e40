//! Cubemaps.
//!
//! Faces are addressed by index, in the `+X, -X, +Y, -Y, +Z, -Z` order, which is also the order
//! of the faces in the initial data.

use crate::{
  context::Context,
  texture::{check_size, impl_texture, TextureCore, TextureDesc, TextureOptions},
  transfer::{Destination, Source},
};
use lucent::{
  texture::{check_alignment, CubeFace, PixelFormat, SamplerParams},
  viewport::{Viewport, Viewport3},
  Error, Result,
};
use std::rc::Rc;

#[derive(Clone)]
pub struct TextureCube(pub(crate) Rc<TextureCore>);

impl_texture!(TextureCube);

impl Context {
  /// A cubemap of square `size` faces; the initial data holds the six faces one after the other.
  pub fn texture_cube(
    &self,
    (w, h): (u32, u32),
    components: usize,
    data: Option<Source>,
    options: TextureOptions,
  ) -> Result<TextureCube> {
    let state = self.current_state()?;

    if options.samples > 0 {
      return Err(Error::creation("cubemaps cannot be multisampled"));
    }

    if w != h {
      return Err(Error::creation(format!(
        "cubemap faces must be square, got {}×{}",
        w, h
      )));
    }

    check_size(&[w, h], state.limits().max_cube_map_texture_size)?;

    let desc = TextureDesc {
      target: gl::TEXTURE_CUBE_MAP,
      format: PixelFormat::color(components, options.dtype)?,
      size: (w, h, 1),
      samples: 0,
      alignment: options.alignment,
      params: SamplerParams::for_dtype(options.dtype),
      volume: false,
    };

    Ok(TextureCube(Rc::new(TextureCore::create(state, desc, data)?)))
  }
}

impl TextureCube {
  /// Size of a face.
  pub fn size(&self) -> (u32, u32) {
    (self.0.size.0, self.0.size.1)
  }

  /// Write `data` into `viewport` (the whole face if `None`) of a face mipmap level.
  pub fn write<'a>(
    &self,
    face: usize,
    data: impl Into<Source<'a>>,
    viewport: Option<Viewport>,
    level: u32,
    alignment: usize,
  ) -> Result<()> {
    let face = CubeFace::from_index(face)?;
    let (w, h, _) = self.0.level_size(level)?;
    let viewport = viewport.unwrap_or(Viewport::full(w, h));
    viewport.check_within(w, h)?;

    let region = Viewport3 {
      x: viewport.x,
      y: viewport.y,
      z: 0,
      width: viewport.width,
      height: viewport.height,
      depth: 1,
    };

    self
      .0
      .upload(face.to_glenum(), region, level, alignment, data.into())
  }

  /// Read a face mipmap level.
  pub fn read(&self, face: usize, level: u32, alignment: usize) -> Result<Vec<u8>> {
    let face = CubeFace::from_index(face)?;
    self.0.read(face.to_glenum(), level, alignment)
  }

  pub fn read_into<'a>(
    &self,
    face: usize,
    dst: impl Into<Destination<'a>>,
    level: u32,
    alignment: usize,
    write_offset: usize,
  ) -> Result<()> {
    let face = CubeFace::from_index(face)?;
    check_alignment(alignment)?;

    self
      .0
      .download(face.to_glenum(), level, alignment, dst.into(), write_offset)
  }
}
