//! Textures.
//!
//! Every texture kind ([`Texture2D`], [`TextureArray`](crate::TextureArray),
//! [`Texture3D`](crate::Texture3D), [`TextureCube`](crate::TextureCube)) is a thin layer over a
//! shared texture core holding the driver name, the pixel format and the sampling state.
//!
//! Transfers bind the texture to a scratch unit (the last texture unit of the context), so that the
//! bindings of the units a program samples from are left alone.

use crate::{
  context::{Context, ContextState},
  object::RawObject,
  sampler::{apply_sampler_params, check_sampler_params, check_unit, ParamSink},
  texture_3d::Texture3D,
  texture_array::TextureArray,
  texture_cube::TextureCube,
  transfer::{begin_pack, begin_unpack, end_pack, end_unpack, Destination, Source},
};
use gl::types::*;
use lucent::{
  depth_test::DepthComparison,
  texture::{
    check_alignment, check_samples, Dtype, Filter, ImageAccess, PixelFormat, SamplerParams, Swizzle,
  },
  viewport::{Viewport, Viewport3},
  Error, Glo, ObjectKind, Result,
};
use std::{cell::Cell, ffi::c_void, ptr, rc::Rc};

/// Creation options shared by every texture kind.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TextureOptions {
  pub dtype: Dtype,
  /// `0` for a single-sample texture; only 2D textures can be multisampled.
  pub samples: u32,
  /// Row alignment of the initial data.
  pub alignment: usize,
}

impl Default for TextureOptions {
  fn default() -> Self {
    TextureOptions {
      dtype: Dtype::F1,
      samples: 0,
      alignment: 1,
    }
  }
}

impl TextureOptions {
  pub fn dtype(self, dtype: Dtype) -> Self {
    TextureOptions { dtype, ..self }
  }

  pub fn samples(self, samples: u32) -> Self {
    TextureOptions { samples, ..self }
  }

  pub fn alignment(self, alignment: usize) -> Self {
    TextureOptions { alignment, ..self }
  }
}

pub(crate) fn scratch_unit(state: &ContextState) -> u32 {
  state.limits().max_texture_units.saturating_sub(1)
}

/// What a texture is made of before it reaches the driver.
pub(crate) struct TextureDesc {
  pub(crate) target: GLenum,
  pub(crate) format: PixelFormat,
  pub(crate) size: (u32, u32, u32),
  pub(crate) samples: u32,
  pub(crate) alignment: usize,
  pub(crate) params: SamplerParams,
  /// Whether the depth shrinks along mipmap levels (3D textures).
  pub(crate) volume: bool,
}

pub(crate) struct TextureCore {
  pub(crate) raw: RawObject,
  pub(crate) target: GLenum,
  pub(crate) format: PixelFormat,
  pub(crate) samples: u32,
  pub(crate) size: (u32, u32, u32),
  volume: bool,
  params: Cell<SamplerParams>,
  swizzle: Cell<Swizzle>,
}

impl TextureCore {
  pub(crate) fn create(state: &Rc<ContextState>, desc: TextureDesc, data: Option<Source>) -> Result<Self> {
    check_alignment(desc.alignment)?;
    check_samples(desc.samples, state.limits().max_samples)?;

    if desc.samples > 0 && data.is_some() {
      return Err(Error::creation("multisample textures cannot be initialized with data"));
    }

    let (w, h, d) = desc.size;
    let format = desc.format;
    let face_size = format.surface_size(w as usize, h as usize, 1, desc.alignment)?;
    let expected = if desc.target == gl::TEXTURE_CUBE_MAP {
      face_size * 6
    } else {
      face_size * d as usize
    };

    let has_data = data.is_some();

    let name = unsafe {
      let mut gl = state.gl();
      gl.set_unpack_alignment(desc.alignment as GLint);

      let pixels = match data {
        Some(source) => begin_unpack(&mut gl, source, expected)? as *const u8,
        None => {
          end_unpack(&mut gl);
          ptr::null()
        }
      };

      let mut name: GLuint = 0;
      gl::GenTextures(1, &mut name);
      gl.bind_texture_to_unit(scratch_unit(state), desc.target, name);

      let ifmt = format.internal_format as GLint;
      let (w, h, d) = (w as GLsizei, h as GLsizei, d as GLsizei);

      match desc.target {
        gl::TEXTURE_2D_MULTISAMPLE => gl::TexImage2DMultisample(
          desc.target,
          desc.samples as GLsizei,
          format.internal_format,
          w,
          h,
          gl::TRUE,
        ),

        gl::TEXTURE_2D => gl::TexImage2D(
          desc.target,
          0,
          ifmt,
          w,
          h,
          0,
          format.base_format,
          format.gl_type,
          pixels as *const c_void,
        ),

        gl::TEXTURE_CUBE_MAP => {
          for face in 0..6 {
            let face_pixels = if has_data {
              pixels.wrapping_add(face * face_size)
            } else {
              ptr::null()
            };

            gl::TexImage2D(
              gl::TEXTURE_CUBE_MAP_POSITIVE_X + face as GLenum,
              0,
              ifmt,
              w,
              h,
              0,
              format.base_format,
              format.gl_type,
              face_pixels as *const c_void,
            );
          }
        }

        _ => gl::TexImage3D(
          desc.target,
          0,
          ifmt,
          w,
          h,
          d,
          0,
          format.base_format,
          format.gl_type,
          pixels as *const c_void,
        ),
      }

      end_unpack(&mut gl);

      if desc.samples == 0 {
        apply_sampler_params(
          ParamSink::Texture(desc.target),
          &desc.params,
          state.limits().max_anisotropy,
        );
      }

      name
    };

    Ok(TextureCore {
      raw: RawObject::new(state, ObjectKind::Texture, name),
      target: desc.target,
      format,
      samples: desc.samples,
      size: desc.size,
      volume: desc.volume,
      params: Cell::new(desc.params),
      swizzle: Cell::new(Swizzle::IDENTITY),
    })
  }

  /// Bind the texture to the scratch unit.
  pub(crate) fn bind(&self) -> Result<(Rc<ContextState>, GLuint)> {
    let (state, name) = self.raw.live()?;
    let unit = scratch_unit(&state);
    unsafe { state.gl().bind_texture_to_unit(unit, self.target, name) };

    Ok((state, name))
  }

  fn check_single_sample(&self, what: &str) -> Result<()> {
    if self.samples > 0 {
      Err(Error::creation(format!(
        "multisample textures do not support {}",
        what
      )))
    } else {
      Ok(())
    }
  }

  /// Size of a mipmap level.
  pub(crate) fn level_size(&self, level: u32) -> Result<(u32, u32, u32)> {
    let (w, h, d) = self.size;
    let largest = if self.volume { w.max(h).max(d) } else { w.max(h) };

    if level >= 32 || largest >> level == 0 {
      return Err(Error::out_of_range(format!(
        "mipmap level {} does not exist for a {}×{}×{} texture",
        level, w, h, d
      )));
    }

    let shrink = |x: u32| (x >> level).max(1);
    let depth = if self.volume { shrink(d) } else { d };

    Ok((shrink(w), shrink(h), depth))
  }

  /// Upload `source` into `region` of a mipmap level. `image_target` is the target of the image
  /// (a cube face for cube maps).
  pub(crate) fn upload(
    &self,
    image_target: GLenum,
    region: Viewport3,
    level: u32,
    alignment: usize,
    source: Source,
  ) -> Result<()> {
    self.check_single_sample("uploads")?;
    check_alignment(alignment)?;

    let expected = self.format.surface_size(
      region.width as usize,
      region.height as usize,
      region.depth as usize,
      alignment,
    )?;

    let (state, _) = self.bind()?;
    let mut gl = state.gl();

    unsafe {
      gl.set_unpack_alignment(alignment as GLint);
      let pixels = begin_unpack(&mut gl, source, expected)?;

      if self.target == gl::TEXTURE_2D || self.target == gl::TEXTURE_CUBE_MAP {
        gl::TexSubImage2D(
          image_target,
          level as GLint,
          region.x as GLint,
          region.y as GLint,
          region.width as GLsizei,
          region.height as GLsizei,
          self.format.base_format,
          self.format.gl_type,
          pixels,
        );
      } else {
        gl::TexSubImage3D(
          image_target,
          level as GLint,
          region.x as GLint,
          region.y as GLint,
          region.z as GLint,
          region.width as GLsizei,
          region.height as GLsizei,
          region.depth as GLsizei,
          self.format.base_format,
          self.format.gl_type,
          pixels,
        );
      }

      end_unpack(&mut gl);
    }

    Ok(())
  }

  /// Download a whole mipmap level of `image_target` into `destination` at `write_offset`.
  pub(crate) fn download(
    &self,
    image_target: GLenum,
    level: u32,
    alignment: usize,
    mut destination: Destination,
    write_offset: usize,
  ) -> Result<()> {
    self.check_single_sample("readback")?;
    let expected = self.level_bytes(image_target, level, alignment)?;

    let (state, _) = self.bind()?;
    let mut gl = state.gl();

    unsafe {
      gl.set_pack_alignment(alignment as GLint);
      let pixels = begin_pack(&mut gl, &mut destination, expected, write_offset)?;

      gl::GetTexImage(
        image_target,
        level as GLint,
        self.format.base_format,
        self.format.gl_type,
        pixels,
      );

      end_pack(&mut gl);
    }

    Ok(())
  }

  /// Bytes of a whole mipmap level of `image_target`.
  pub(crate) fn level_bytes(&self, image_target: GLenum, level: u32, alignment: usize) -> Result<usize> {
    let (w, h, d) = self.level_size(level)?;
    let layers = if image_target == self.target { d } else { 1 };

    self
      .format
      .surface_size(w as usize, h as usize, layers as usize, alignment)
  }

  pub(crate) fn read(&self, image_target: GLenum, level: u32, alignment: usize) -> Result<Vec<u8>> {
    check_alignment(alignment)?;
    let mut out = vec![0; self.level_bytes(image_target, level, alignment)?];
    self.download(image_target, level, alignment, Destination::Bytes(&mut out), 0)?;

    Ok(out)
  }

  pub(crate) fn bind_to_unit(&self, unit: u32) -> Result<()> {
    let (state, name) = self.raw.live()?;
    check_unit(&state, unit)?;

    unsafe { state.gl().bind_texture_to_unit(unit, self.target, name) };
    Ok(())
  }

  pub(crate) fn build_mipmaps(&self, base: u32, max: u32) -> Result<()> {
    self.check_single_sample("mipmaps")?;

    if base > max {
      return Err(Error::out_of_range(format!(
        "base level {} is greater than max level {}",
        base, max
      )));
    }

    self.level_size(base)?;
    let (state, _) = self.bind()?;

    let mut params = self.params.get();
    params.filter = Filter::MIPMAP;

    unsafe {
      gl::TexParameteri(self.target, gl::TEXTURE_BASE_LEVEL, base as GLint);
      gl::TexParameteri(self.target, gl::TEXTURE_MAX_LEVEL, max as GLint);
      gl::GenerateMipmap(self.target);
      apply_sampler_params(
        ParamSink::Texture(self.target),
        &params,
        state.limits().max_anisotropy,
      );
    }

    self.params.set(params);
    Ok(())
  }

  pub(crate) fn bind_to_image(
    &self,
    unit: u32,
    read: bool,
    write: bool,
    level: u32,
    format: Option<GLenum>,
  ) -> Result<()> {
    let (state, name) = self.raw.live()?;
    state.require("image load/store", 420, "GL_ARB_shader_image_load_store")?;

    let access = ImageAccess::new(read, write)?;
    let max = state.limits().max_image_units;

    if unit >= max {
      return Err(Error::out_of_range(format!(
        "image unit {} exceeds the {} available units",
        unit, max
      )));
    }

    self.level_size(level)?;
    let layered = self.target != gl::TEXTURE_2D && self.target != gl::TEXTURE_2D_MULTISAMPLE;

    unsafe {
      gl::BindImageTexture(
        unit,
        name,
        level as GLint,
        if layered { gl::TRUE } else { gl::FALSE },
        0,
        access.to_glenum(),
        format.unwrap_or(self.format.internal_format),
      );
    }

    Ok(())
  }

  pub(crate) fn params(&self) -> SamplerParams {
    self.params.get()
  }

  pub(crate) fn set_params(&self, f: impl FnOnce(&mut SamplerParams)) -> Result<()> {
    self.check_single_sample("sampling parameters")?;

    let mut params = self.params.get();
    f(&mut params);
    check_sampler_params(&params)?;

    let (state, _) = self.bind()?;

    unsafe {
      apply_sampler_params(
        ParamSink::Texture(self.target),
        &params,
        state.limits().max_anisotropy,
      );
    }

    self.params.set(params);
    Ok(())
  }

  pub(crate) fn swizzle(&self) -> Swizzle {
    self.swizzle.get()
  }

  pub(crate) fn set_swizzle(&self, swizzle: Swizzle) -> Result<()> {
    self.check_single_sample("swizzling")?;
    let (state, _) = self.bind()?;
    let channels = swizzle.to_glenums().map(|c| c as GLint);

    unsafe {
      gl::TexParameteriv(self.target, gl::TEXTURE_SWIZZLE_RGBA, channels.as_ptr());
    }

    self.swizzle.set(swizzle);
    Ok(())
  }
}

/// Accessors and operations common to every texture kind.
macro_rules! impl_texture {
  ($t:ident) => {
    crate::object::impl_object!($t);
    crate::sampler::impl_sampling!($t);

    impl $t {
      pub fn components(&self) -> usize {
        self.0.format.components
      }

      pub fn dtype(&self) -> lucent::texture::Dtype {
        self.0.format.dtype
      }

      pub fn is_depth(&self) -> bool {
        self.0.format.depth
      }

      pub fn format(&self) -> lucent::texture::PixelFormat {
        self.0.format
      }

      /// Bind the texture to a texture unit, for the samplers of the next draws.
      pub fn bind_to_unit(&self, unit: u32) -> lucent::Result<()> {
        self.0.bind_to_unit(unit)
      }

      /// Generate the mipmap chain between `base` and `max`; switches the filter to
      /// [`Filter::MIPMAP`](lucent::texture::Filter::MIPMAP).
      pub fn build_mipmaps(&self, base: u32, max: u32) -> lucent::Result<()> {
        self.0.build_mipmaps(base, max)
      }

      /// Bind a level to an image unit for load/store access. `format` defaults to the storage
      /// format of the texture.
      pub fn bind_to_image(
        &self,
        unit: u32,
        read: bool,
        write: bool,
        level: u32,
        format: Option<gl::types::GLenum>,
      ) -> lucent::Result<()> {
        self.0.bind_to_image(unit, read, write, level, format)
      }

      pub fn swizzle(&self) -> lucent::texture::Swizzle {
        self.0.swizzle()
      }

      pub fn set_swizzle(&self, swizzle: lucent::texture::Swizzle) -> lucent::Result<()> {
        self.0.set_swizzle(swizzle)
      }
    }
  };
}

pub(crate) use impl_texture;

/// A 2D texture, single-sample or multisample.
#[derive(Clone)]
pub struct Texture2D(pub(crate) Rc<TextureCore>);

impl_texture!(Texture2D);

impl Context {
  /// A color texture of `components` components per texel.
  pub fn texture(
    &self,
    size: (u32, u32),
    components: usize,
    data: Option<Source>,
    options: TextureOptions,
  ) -> Result<Texture2D> {
    let format = PixelFormat::color(components, options.dtype)?;
    self.texture_2d(size, format, data, options, SamplerParams::for_dtype(options.dtype))
  }

  /// A depth texture; its compare function defaults to `<=`. The dtype of `options` is ignored.
  pub fn depth_texture(
    &self,
    size: (u32, u32),
    data: Option<Source>,
    options: TextureOptions,
  ) -> Result<Texture2D> {
    let params = SamplerParams {
      compare_func: Some(DepthComparison::LessOrEqual),
      ..SamplerParams::default()
    };

    self.texture_2d(size, PixelFormat::depth(), data, options, params)
  }

  fn texture_2d(
    &self,
    (w, h): (u32, u32),
    format: PixelFormat,
    data: Option<Source>,
    options: TextureOptions,
    params: SamplerParams,
  ) -> Result<Texture2D> {
    let state = self.current_state()?;
    check_size(&[w, h], state.limits().max_texture_size)?;

    let target = if options.samples > 0 {
      gl::TEXTURE_2D_MULTISAMPLE
    } else {
      gl::TEXTURE_2D
    };

    let desc = TextureDesc {
      target,
      format,
      size: (w, h, 1),
      samples: options.samples,
      alignment: options.alignment,
      params,
      volume: false,
    };

    Ok(Texture2D(Rc::new(TextureCore::create(state, desc, data)?)))
  }
}

/// Check every dimension of a texture against `max`.
pub(crate) fn check_size(dims: &[u32], max: u32) -> Result<()> {
  if dims.iter().any(|&d| d == 0 || d > max) {
    return Err(Error::creation(format!(
      "texture size {:?} must be positive and at most {}",
      dims, max
    )));
  }

  Ok(())
}

impl Texture2D {
  pub fn size(&self) -> (u32, u32) {
    (self.0.size.0, self.0.size.1)
  }

  pub fn width(&self) -> u32 {
    self.0.size.0
  }

  pub fn height(&self) -> u32 {
    self.0.size.1
  }

  /// Number of samples; `0` for single-sample textures.
  pub fn samples(&self) -> u32 {
    self.0.samples
  }

  /// Write `data` into `viewport` (the whole level if `None`) of a mipmap level. Rows of `data`
  /// are padded to `alignment`.
  pub fn write<'a>(
    &self,
    data: impl Into<Source<'a>>,
    viewport: Option<Viewport>,
    level: u32,
    alignment: usize,
  ) -> Result<()> {
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

    self.0.upload(gl::TEXTURE_2D, region, level, alignment, data.into())
  }

  /// Read a whole mipmap level, rows padded to `alignment`.
  pub fn read(&self, level: u32, alignment: usize) -> Result<Vec<u8>> {
    self.0.read(gl::TEXTURE_2D, level, alignment)
  }

  /// Read a whole mipmap level into host bytes or a buffer, at `write_offset`.
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
      .download(gl::TEXTURE_2D, level, alignment, dst.into(), write_offset)
  }
}

/// Any kind of texture, as bound by scopes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AnyTexture {
  Texture2D(Texture2D),
  TextureArray(TextureArray),
  Texture3D(Texture3D),
  TextureCube(TextureCube),
}

impl AnyTexture {
  pub(crate) fn core(&self) -> &TextureCore {
    match self {
      AnyTexture::Texture2D(t) => &t.0,
      AnyTexture::TextureArray(t) => &t.0,
      AnyTexture::Texture3D(t) => &t.0,
      AnyTexture::TextureCube(t) => &t.0,
    }
  }

  pub fn glo(&self) -> Glo {
    self.core().raw.glo()
  }

  /// Binding target, such as `GL_TEXTURE_2D`.
  pub fn target(&self) -> GLenum {
    self.core().target
  }

  pub fn bind_to_unit(&self, unit: u32) -> Result<()> {
    self.core().bind_to_unit(unit)
  }
}

impl From<Texture2D> for AnyTexture {
  fn from(t: Texture2D) -> Self {
    AnyTexture::Texture2D(t)
  }
}

impl From<TextureArray> for AnyTexture {
  fn from(t: TextureArray) -> Self {
    AnyTexture::TextureArray(t)
  }
}

impl From<Texture3D> for AnyTexture {
  fn from(t: Texture3D) -> Self {
    AnyTexture::Texture3D(t)
  }
}

impl From<TextureCube> for AnyTexture {
  fn from(t: TextureCube) -> Self {
    AnyTexture::TextureCube(t)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn texture_sizes() {
    assert!(check_size(&[16, 16], 4096).is_ok());
    assert!(check_size(&[0, 16], 4096).is_err());
    assert!(check_size(&[16, 8192], 4096).is_err());
  }

  #[test]
  fn default_options() {
    let options = TextureOptions::default();

    assert_eq!(options.dtype, Dtype::F1);
    assert_eq!(options.samples, 0);
    assert_eq!(options.alignment, 1);
    assert_eq!(options.samples(4).alignment(8).samples, 4);
  }
}
