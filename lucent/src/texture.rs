//! Texture formats, sampling parameters and texel layout.

use crate::depth_test::DepthComparison;
use crate::error::{Error, Result};
use gl::types::GLenum;
use std::{fmt, str::FromStr};

/// How to wrap texture coordinates while sampling textures?
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Wrap {
  /// If textures coordinates lay outside of *[0;1]*, they will be clamped to either *0* or *1* for
  /// every components.
  ClampToEdge,
  /// Textures coordinates are repeated if they lay outside of *[0;1]*. Picture this as:
  ///
  /// ```ignore
  /// // given the frac function returning the fractional part of a floating number:
  /// coord_ith = frac(coord_ith); // always between [0;1]
  /// ```
  #[default]
  Repeat,
  /// Same as `Repeat` but it will alternatively repeat between *[0;1]* and *[1;0]*.
  MirroredRepeat,
  /// Coordinates outside of *[0;1]* sample the border color.
  ClampToBorder,
}

impl Wrap {
  /// `true` is `Repeat`, `false` is `ClampToEdge`.
  pub fn from_repeat(repeat: bool) -> Self {
    if repeat {
      Wrap::Repeat
    } else {
      Wrap::ClampToEdge
    }
  }

  pub fn to_glenum(self) -> GLenum {
    match self {
      Wrap::ClampToEdge => gl::CLAMP_TO_EDGE,
      Wrap::Repeat => gl::REPEAT,
      Wrap::MirroredRepeat => gl::MIRRORED_REPEAT,
      Wrap::ClampToBorder => gl::CLAMP_TO_BORDER,
    }
  }
}

/// Minification filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MinFilter {
  /// Nearest interpolation.
  Nearest,
  /// Linear interpolation between surrounding pixels.
  Linear,
  /// This filter will select the nearest mipmap between two samples and will perform a nearest
  /// interpolation afterwards.
  NearestMipmapNearest,
  /// This filter will select the nearest mipmap between two samples and will perform a linear
  /// interpolation afterwards.
  NearestMipmapLinear,
  /// This filter will linearly interpolate between two mipmaps, which selected texels would have
  /// been interpolated with a nearest filter.
  LinearMipmapNearest,
  /// This filter will linearly interpolate between two mipmaps, which selected texels would have
  /// been linarily interpolated as well.
  LinearMipmapLinear,
}

impl MinFilter {
  pub fn to_glenum(self) -> GLenum {
    match self {
      MinFilter::Nearest => gl::NEAREST,
      MinFilter::Linear => gl::LINEAR,
      MinFilter::NearestMipmapNearest => gl::NEAREST_MIPMAP_NEAREST,
      MinFilter::NearestMipmapLinear => gl::NEAREST_MIPMAP_LINEAR,
      MinFilter::LinearMipmapNearest => gl::LINEAR_MIPMAP_NEAREST,
      MinFilter::LinearMipmapLinear => gl::LINEAR_MIPMAP_LINEAR,
    }
  }
}

/// Magnification filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MagFilter {
  /// Nearest interpolation.
  Nearest,
  /// Linear interpolation between surrounding pixels.
  Linear,
}

impl MagFilter {
  pub fn to_glenum(self) -> GLenum {
    match self {
      MagFilter::Nearest => gl::NEAREST,
      MagFilter::Linear => gl::LINEAR,
    }
  }
}

/// Minification and magnification filters.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Filter {
  pub min: MinFilter,
  pub mag: MagFilter,
}

impl Filter {
  pub const NEAREST: Filter = Filter {
    min: MinFilter::Nearest,
    mag: MagFilter::Nearest,
  };

  pub const LINEAR: Filter = Filter {
    min: MinFilter::Linear,
    mag: MagFilter::Linear,
  };

  /// Filter set by `build_mipmaps`.
  pub const MIPMAP: Filter = Filter {
    min: MinFilter::LinearMipmapLinear,
    mag: MagFilter::Linear,
  };

  pub fn new(min: MinFilter, mag: MagFilter) -> Self {
    Filter { min, mag }
  }

  /// Linear for float and normalized dtypes, nearest for integer ones.
  pub fn default_for(dtype: Dtype) -> Self {
    if dtype.is_integer() {
      Filter::NEAREST
    } else {
      Filter::LINEAR
    }
  }
}

/// Element type of a texel component.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Dtype {
  /// Unsigned byte, sampled as a normalized float.
  #[default]
  F1,
  /// Half float.
  F2,
  F4,
  U1,
  U2,
  U4,
  I1,
  I2,
  I4,
  NU1,
  NU2,
  NI1,
  NI2,
}

impl Dtype {
  pub const ALL: [Dtype; 13] = [
    Dtype::F1,
    Dtype::F2,
    Dtype::F4,
    Dtype::U1,
    Dtype::U2,
    Dtype::U4,
    Dtype::I1,
    Dtype::I2,
    Dtype::I4,
    Dtype::NU1,
    Dtype::NU2,
    Dtype::NI1,
    Dtype::NI2,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Dtype::F1 => "f1",
      Dtype::F2 => "f2",
      Dtype::F4 => "f4",
      Dtype::U1 => "u1",
      Dtype::U2 => "u2",
      Dtype::U4 => "u4",
      Dtype::I1 => "i1",
      Dtype::I2 => "i2",
      Dtype::I4 => "i4",
      Dtype::NU1 => "nu1",
      Dtype::NU2 => "nu2",
      Dtype::NI1 => "ni1",
      Dtype::NI2 => "ni2",
    }
  }

  /// Bytes per component.
  pub fn size(self) -> usize {
    match self {
      Dtype::F1 | Dtype::U1 | Dtype::I1 | Dtype::NU1 | Dtype::NI1 => 1,
      Dtype::F2 | Dtype::U2 | Dtype::I2 | Dtype::NU2 | Dtype::NI2 => 2,
      Dtype::F4 | Dtype::U4 | Dtype::I4 => 4,
    }
  }

  /// Integer textures are sampled with `usampler` / `isampler` and can’t be filtered linearly.
  pub fn is_integer(self) -> bool {
    matches!(
      self,
      Dtype::U1 | Dtype::U2 | Dtype::U4 | Dtype::I1 | Dtype::I2 | Dtype::I4
    )
  }

  /// Pixel transfer type.
  pub fn gl_type(self) -> GLenum {
    match self {
      Dtype::F1 | Dtype::U1 | Dtype::NU1 => gl::UNSIGNED_BYTE,
      Dtype::F2 => gl::HALF_FLOAT,
      Dtype::F4 => gl::FLOAT,
      Dtype::U2 | Dtype::NU2 => gl::UNSIGNED_SHORT,
      Dtype::U4 => gl::UNSIGNED_INT,
      Dtype::I1 | Dtype::NI1 => gl::BYTE,
      Dtype::I2 | Dtype::NI2 => gl::SHORT,
      Dtype::I4 => gl::INT,
    }
  }

  fn internal_formats(self) -> [GLenum; 4] {
    match self {
      Dtype::F1 | Dtype::NU1 => [gl::R8, gl::RG8, gl::RGB8, gl::RGBA8],
      Dtype::F2 => [gl::R16F, gl::RG16F, gl::RGB16F, gl::RGBA16F],
      Dtype::F4 => [gl::R32F, gl::RG32F, gl::RGB32F, gl::RGBA32F],
      Dtype::U1 => [gl::R8UI, gl::RG8UI, gl::RGB8UI, gl::RGBA8UI],
      Dtype::U2 => [gl::R16UI, gl::RG16UI, gl::RGB16UI, gl::RGBA16UI],
      Dtype::U4 => [gl::R32UI, gl::RG32UI, gl::RGB32UI, gl::RGBA32UI],
      Dtype::I1 => [gl::R8I, gl::RG8I, gl::RGB8I, gl::RGBA8I],
      Dtype::I2 => [gl::R16I, gl::RG16I, gl::RGB16I, gl::RGBA16I],
      Dtype::I4 => [gl::R32I, gl::RG32I, gl::RGB32I, gl::RGBA32I],
      Dtype::NU2 => [gl::R16, gl::RG16, gl::RGB16, gl::RGBA16],
      Dtype::NI1 => [gl::R8_SNORM, gl::RG8_SNORM, gl::RGB8_SNORM, gl::RGBA8_SNORM],
      Dtype::NI2 => [gl::R16_SNORM, gl::RG16_SNORM, gl::RGB16_SNORM, gl::RGBA16_SNORM],
    }
  }
}

impl FromStr for Dtype {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Dtype::ALL
      .iter()
      .copied()
      .find(|d| d.as_str() == s)
      .ok_or_else(|| Error::creation(format!("invalid dtype {:?}", s)))
  }
}

impl fmt::Display for Dtype {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Storage and transfer formats of a texture.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PixelFormat {
  pub components: usize,
  pub dtype: Dtype,
  pub depth: bool,
  pub internal_format: GLenum,
  pub base_format: GLenum,
  pub gl_type: GLenum,
}

impl PixelFormat {
  /// Format of a color texture with 1 to 4 components.
  pub fn color(components: usize, dtype: Dtype) -> Result<Self> {
    if !(1..=4).contains(&components) {
      return Err(Error::creation(format!(
        "components must be 1, 2, 3 or 4, got {}",
        components
      )));
    }

    let base_format = if dtype.is_integer() {
      [gl::RED_INTEGER, gl::RG_INTEGER, gl::RGB_INTEGER, gl::RGBA_INTEGER][components - 1]
    } else {
      [gl::RED, gl::RG, gl::RGB, gl::RGBA][components - 1]
    };

    Ok(PixelFormat {
      components,
      dtype,
      depth: false,
      internal_format: dtype.internal_formats()[components - 1],
      base_format,
      gl_type: dtype.gl_type(),
    })
  }

  /// Format of a depth texture or renderbuffer: 24-bit storage read back as 32-bit floats.
  pub fn depth() -> Self {
    PixelFormat {
      components: 1,
      dtype: Dtype::F4,
      depth: true,
      internal_format: gl::DEPTH_COMPONENT24,
      base_format: gl::DEPTH_COMPONENT,
      gl_type: gl::FLOAT,
    }
  }

  /// Bytes per texel.
  pub fn texel_size(&self) -> usize {
    self.components * self.dtype.size()
  }

  /// Size of a `width × height × depth` block of texels with rows padded to `alignment`.
  pub fn surface_size(
    &self,
    width: usize,
    height: usize,
    depth: usize,
    alignment: usize,
  ) -> Result<usize> {
    Ok(row_stride(width, self.texel_size(), alignment)? * height * depth)
  }
}

/// Check a pixel-store alignment.
pub fn check_alignment(alignment: usize) -> Result<()> {
  match alignment {
    1 | 2 | 4 | 8 => Ok(()),
    _ => Err(Error::creation(format!(
      "alignment must be 1, 2, 4 or 8, got {}",
      alignment
    ))),
  }
}

/// Row length in bytes: `ceil(width * texel_size / alignment) * alignment`.
pub fn row_stride(width: usize, texel_size: usize, alignment: usize) -> Result<usize> {
  check_alignment(alignment)?;
  Ok((width * texel_size + alignment - 1) / alignment * alignment)
}

/// Check a sample count against the driver maximum. `0` means single-sample.
pub fn check_samples(samples: u32, max_samples: u32) -> Result<()> {
  if samples == 0 || (samples >= 2 && samples.is_power_of_two() && samples <= max_samples) {
    Ok(())
  } else {
    Err(Error::creation(format!(
      "samples must be 0 or a power of two in [2, {}], got {}",
      max_samples, samples
    )))
  }
}

/// A swizzle channel source.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SwizzleChannel {
  Red,
  Green,
  Blue,
  Alpha,
  Zero,
  One,
}

impl SwizzleChannel {
  pub fn to_glenum(self) -> GLenum {
    match self {
      SwizzleChannel::Red => gl::RED,
      SwizzleChannel::Green => gl::GREEN,
      SwizzleChannel::Blue => gl::BLUE,
      SwizzleChannel::Alpha => gl::ALPHA,
      SwizzleChannel::Zero => gl::ZERO,
      SwizzleChannel::One => gl::ONE,
    }
  }

  pub fn from_glenum(e: GLenum) -> Option<Self> {
    match e {
      gl::RED => Some(SwizzleChannel::Red),
      gl::GREEN => Some(SwizzleChannel::Green),
      gl::BLUE => Some(SwizzleChannel::Blue),
      gl::ALPHA => Some(SwizzleChannel::Alpha),
      gl::ZERO => Some(SwizzleChannel::Zero),
      gl::ONE => Some(SwizzleChannel::One),
      _ => None,
    }
  }

  fn as_char(self) -> char {
    match self {
      SwizzleChannel::Red => 'R',
      SwizzleChannel::Green => 'G',
      SwizzleChannel::Blue => 'B',
      SwizzleChannel::Alpha => 'A',
      SwizzleChannel::Zero => '0',
      SwizzleChannel::One => '1',
    }
  }
}

/// Four-component remapping applied at sample time, written as four characters from `RGBA01`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Swizzle(pub [SwizzleChannel; 4]);

impl Swizzle {
  pub const IDENTITY: Swizzle = Swizzle([
    SwizzleChannel::Red,
    SwizzleChannel::Green,
    SwizzleChannel::Blue,
    SwizzleChannel::Alpha,
  ]);

  pub fn to_glenums(self) -> [GLenum; 4] {
    self.0.map(SwizzleChannel::to_glenum)
  }
}

impl Default for Swizzle {
  fn default() -> Self {
    Swizzle::IDENTITY
  }
}

impl FromStr for Swizzle {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let bad = || Error::creation(format!("invalid swizzle {:?}", s));

    let channels = s
      .chars()
      .map(|c| match c.to_ascii_uppercase() {
        'R' => Ok(SwizzleChannel::Red),
        'G' => Ok(SwizzleChannel::Green),
        'B' => Ok(SwizzleChannel::Blue),
        'A' => Ok(SwizzleChannel::Alpha),
        '0' => Ok(SwizzleChannel::Zero),
        '1' => Ok(SwizzleChannel::One),
        _ => Err(bad()),
      })
      .collect::<Result<Vec<_>>>()?;

    let channels: [SwizzleChannel; 4] = channels.try_into().map_err(|_| bad())?;
    Ok(Swizzle(channels))
  }
}

impl fmt::Display for Swizzle {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    self.0.iter().try_for_each(|c| write!(f, "{}", c.as_char()))
  }
}

/// Faces of a cubemap, in upload order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CubeFace {
  /// The +X face of the cube.
  PositiveX,
  /// The -X face of the cube.
  NegativeX,
  /// The +Y face of the cube.
  PositiveY,
  /// The -Y face of the cube.
  NegativeY,
  /// The +Z face of the cube.
  PositiveZ,
  /// The -Z face of the cube.
  NegativeZ,
}

impl CubeFace {
  pub const ALL: [CubeFace; 6] = [
    CubeFace::PositiveX,
    CubeFace::NegativeX,
    CubeFace::PositiveY,
    CubeFace::NegativeY,
    CubeFace::PositiveZ,
    CubeFace::NegativeZ,
  ];

  pub fn from_index(face: usize) -> Result<Self> {
    CubeFace::ALL
      .get(face)
      .copied()
      .ok_or_else(|| Error::out_of_range(format!("cube face must be in [0, 5], got {}", face)))
  }

  pub fn index(self) -> usize {
    self as usize
  }

  pub fn to_glenum(self) -> GLenum {
    gl::TEXTURE_CUBE_MAP_POSITIVE_X + self as GLenum
  }
}

/// Access of an image binding.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ImageAccess {
  ReadOnly,
  WriteOnly,
  ReadWrite,
}

impl ImageAccess {
  pub fn new(read: bool, write: bool) -> Result<Self> {
    match (read, write) {
      (true, false) => Ok(ImageAccess::ReadOnly),
      (false, true) => Ok(ImageAccess::WriteOnly),
      (true, true) => Ok(ImageAccess::ReadWrite),
      (false, false) => Err(Error::creation(
        "an image binding must be readable or writable",
      )),
    }
  }

  pub fn to_glenum(self) -> GLenum {
    match self {
      ImageAccess::ReadOnly => gl::READ_ONLY,
      ImageAccess::WriteOnly => gl::WRITE_ONLY,
      ImageAccess::ReadWrite => gl::READ_WRITE,
    }
  }
}

/// Sampling state shared by textures and sampler objects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerParams {
  pub wrap_s: Wrap,
  pub wrap_t: Wrap,
  pub wrap_r: Wrap,
  pub filter: Filter,
  /// `1.0` disables anisotropic filtering.
  pub anisotropy: f32,
  /// For depth textures, should we perform depth comparison and if so, how?
  pub compare_func: Option<DepthComparison>,
  pub min_lod: f32,
  pub max_lod: f32,
  pub lod_bias: f32,
  pub border_color: [f32; 4],
}

impl SamplerParams {
  /// Parameters of a freshly created texture of the given dtype.
  pub fn for_dtype(dtype: Dtype) -> Self {
    SamplerParams {
      filter: Filter::default_for(dtype),
      ..Self::default()
    }
  }
}

impl Default for SamplerParams {
  fn default() -> Self {
    SamplerParams {
      wrap_s: Wrap::Repeat,
      wrap_t: Wrap::Repeat,
      wrap_r: Wrap::Repeat,
      filter: Filter::LINEAR,
      anisotropy: 1.,
      compare_func: None,
      min_lod: -1000.,
      max_lod: 1000.,
      lod_bias: 0.,
      border_color: [0.; 4],
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dtype_names() {
    for dtype in Dtype::ALL {
      assert_eq!(dtype.as_str().parse::<Dtype>().unwrap(), dtype);
    }

    assert!("f8".parse::<Dtype>().is_err());
  }

  #[test]
  fn default_filters() {
    assert_eq!(Filter::default_for(Dtype::F1), Filter::LINEAR);
    assert_eq!(Filter::default_for(Dtype::NI2), Filter::LINEAR);
    assert_eq!(Filter::default_for(Dtype::U1), Filter::NEAREST);
    assert_eq!(Filter::default_for(Dtype::I4), Filter::NEAREST);
    assert_eq!(SamplerParams::for_dtype(Dtype::U2).filter, Filter::NEAREST);
  }

  #[test]
  fn pixel_formats() {
    let rgb8 = PixelFormat::color(3, Dtype::F1).unwrap();
    assert_eq!(
      (rgb8.internal_format, rgb8.base_format, rgb8.gl_type),
      (gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE)
    );

    let rg32ui = PixelFormat::color(2, Dtype::U4).unwrap();
    assert_eq!(rg32ui.base_format, gl::RG_INTEGER);
    assert_eq!(rg32ui.texel_size(), 8);

    assert!(PixelFormat::color(0, Dtype::F1).is_err());
    assert!(PixelFormat::color(5, Dtype::F1).is_err());
    assert_eq!(PixelFormat::depth().texel_size(), 4);
  }

  #[test]
  fn row_strides() {
    assert_eq!(row_stride(3, 3, 1).unwrap(), 9);
    assert_eq!(row_stride(3, 3, 4).unwrap(), 12);
    assert_eq!(row_stride(3, 3, 8).unwrap(), 16);
    assert_eq!(row_stride(4, 4, 8).unwrap(), 16);
    assert!(row_stride(4, 4, 3).is_err());

    let rgb8 = PixelFormat::color(3, Dtype::F1).unwrap();
    assert_eq!(rgb8.surface_size(8, 8, 1, 1).unwrap(), 192);
    assert_eq!(rgb8.surface_size(5, 2, 3, 4).unwrap(), 16 * 2 * 3);
  }

  #[test]
  fn samples() {
    assert!(check_samples(0, 8).is_ok());
    assert!(check_samples(4, 8).is_ok());
    assert!(check_samples(1, 8).is_err());
    assert!(check_samples(3, 8).is_err());
    assert!(check_samples(16, 8).is_err());
  }

  #[test]
  fn swizzles() {
    let s: Swizzle = "bgr1".parse().unwrap();

    assert_eq!(s.to_string(), "BGR1");
    assert_eq!(
      s.to_glenums(),
      [gl::BLUE, gl::GREEN, gl::RED, gl::ONE]
    );

    for bad in ["RGB", "RGBAR", "RGBX", ""] {
      assert!(bad.parse::<Swizzle>().is_err(), "{:?}", bad);
    }
  }

  #[test]
  fn cube_faces() {
    assert_eq!(CubeFace::from_index(0).unwrap().to_glenum(), gl::TEXTURE_CUBE_MAP_POSITIVE_X);
    assert_eq!(CubeFace::from_index(1).unwrap().to_glenum(), gl::TEXTURE_CUBE_MAP_NEGATIVE_X);
    assert_eq!(CubeFace::from_index(5).unwrap().to_glenum(), gl::TEXTURE_CUBE_MAP_NEGATIVE_Z);
    assert!(CubeFace::from_index(6).is_err());
  }

  #[test]
  fn image_access() {
    assert_eq!(ImageAccess::new(true, true).unwrap(), ImageAccess::ReadWrite);
    assert!(ImageAccess::new(false, false).is_err());
  }
}
