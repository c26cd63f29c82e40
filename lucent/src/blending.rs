//! That module exports blending-related types and functions.
//!
//! Given two pixels *src* and *dst* – source and destination, we associate each pixel a blending
//! factor – respectively, *srcK* and *dstK*. *src* is the pixel being computed, and *dst* is the
//! pixel that is already stored in the framebuffer.
//!
//! The pixels can be blended in several ways. See the documentation of [`Equation`] for further
//! details. The factors are encoded with [`Factor`].
//!
//! [`blend`] evaluates a blend on the host, the way the fixed-function stage of the driver does it
//! for floating-point targets.

/// Blending equation. Used to state how blending factors and pixel data should be blended.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Equation {
  /// `Additive` represents the following blending equation:
  ///
  /// > `blended = src * srcK + dst * dstK`
  Additive,
  /// `Subtract` represents the following blending equation:
  ///
  /// > `blended = src * srcK - dst * dstK`
  Subtract,
  /// Because subtracting is not commutative, `ReverseSubtract` represents the following additional
  /// blending equation:
  ///
  /// > `blended = dst * dstK - src * srcK`
  ReverseSubtract,
  /// `Min` represents the following blending equation:
  ///
  /// > `blended = min(src, dst)`
  Min,
  /// `Max` represents the following blending equation:
  ///
  /// > `blended = max(src, dst)`
  Max,
}

impl Equation {
  pub const ALL: [Equation; 5] = [
    Equation::Additive,
    Equation::Subtract,
    Equation::ReverseSubtract,
    Equation::Min,
    Equation::Max,
  ];
}

/// Blending factors. Pixel data are multiplied by these factors to achieve several effects driven
/// by *blending equations*.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Factor {
  /// `1 * color = factor`
  One,
  /// `0 * color = 0`
  Zero,
  /// `src * color`
  SrcColor,
  /// `(1 - src) * color`
  SrcColorComplement,
  /// `dst * color`
  DestColor,
  /// `(1 - dst) * color`
  DestColorComplement,
  /// `srcA * color`
  SrcAlpha,
  /// `(1 - srcA) * color`
  SrcAlphaComplement,
  /// `dstA * color`
  DstAlpha,
  /// `(1 - dstA) * color`
  DstAlphaComplement,
  /// `min(srcA, 1 - dstA) * color` for RGB, `1` for alpha.
  SrcAlphaSaturate,
}

impl Factor {
  pub const ALL: [Factor; 11] = [
    Factor::One,
    Factor::Zero,
    Factor::SrcColor,
    Factor::SrcColorComplement,
    Factor::DestColor,
    Factor::DestColorComplement,
    Factor::SrcAlpha,
    Factor::SrcAlphaComplement,
    Factor::DstAlpha,
    Factor::DstAlphaComplement,
    Factor::SrcAlphaSaturate,
  ];

  // Factor for channel `c` (3 is alpha).
  fn eval(self, src: &[f32; 4], dst: &[f32; 4], c: usize) -> f32 {
    match self {
      Factor::One => 1.,
      Factor::Zero => 0.,
      Factor::SrcColor => src[c],
      Factor::SrcColorComplement => 1. - src[c],
      Factor::DestColor => dst[c],
      Factor::DestColorComplement => 1. - dst[c],
      Factor::SrcAlpha => src[3],
      Factor::SrcAlphaComplement => 1. - src[3],
      Factor::DstAlpha => dst[3],
      Factor::DstAlphaComplement => 1. - dst[3],
      Factor::SrcAlphaSaturate if c == 3 => 1.,
      Factor::SrcAlphaSaturate => src[3].min(1. - dst[3]),
    }
  }
}

/// Source and destination factors, separately for the RGB and alpha channels.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct BlendFunc {
  pub src_rgb: Factor,
  pub dst_rgb: Factor,
  pub src_alpha: Factor,
  pub dst_alpha: Factor,
}

impl BlendFunc {
  pub fn new(src: Factor, dst: Factor) -> Self {
    Self::separate(src, dst, src, dst)
  }

  pub fn separate(src_rgb: Factor, dst_rgb: Factor, src_alpha: Factor, dst_alpha: Factor) -> Self {
    BlendFunc {
      src_rgb,
      dst_rgb,
      src_alpha,
      dst_alpha,
    }
  }

  /// Classic alpha blending: `src * srcA + dst * (1 - srcA)`.
  pub fn alpha() -> Self {
    Self::new(Factor::SrcAlpha, Factor::SrcAlphaComplement)
  }

  /// Additive blending: `src + dst`.
  pub fn additive() -> Self {
    Self::new(Factor::One, Factor::One)
  }
}

impl Default for BlendFunc {
  fn default() -> Self {
    Self::new(Factor::One, Factor::Zero)
  }
}

/// Equations, separately for the RGB and alpha channels.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct BlendEquations {
  pub rgb: Equation,
  pub alpha: Equation,
}

impl BlendEquations {
  pub fn new(equation: Equation) -> Self {
    BlendEquations {
      rgb: equation,
      alpha: equation,
    }
  }
}

impl Default for BlendEquations {
  fn default() -> Self {
    Self::new(Equation::Additive)
  }
}

/// Blend a source fragment into a destination pixel.
///
/// No clamping is performed, as with floating-point render targets.
pub fn blend(src: [f32; 4], dst: [f32; 4], func: BlendFunc, equations: BlendEquations) -> [f32; 4] {
  let mut out = [0.; 4];

  for (c, o) in out.iter_mut().enumerate() {
    let (src_k, dst_k, equation) = if c == 3 {
      (func.src_alpha, func.dst_alpha, equations.alpha)
    } else {
      (func.src_rgb, func.dst_rgb, equations.rgb)
    };

    let s = src[c] * src_k.eval(&src, &dst, c);
    let d = dst[c] * dst_k.eval(&src, &dst, c);

    *o = match equation {
      Equation::Additive => s + d,
      Equation::Subtract => s - d,
      Equation::ReverseSubtract => d - s,
      Equation::Min => src[c].min(dst[c]),
      Equation::Max => src[c].max(dst[c]),
    };
  }

  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn close(a: [f32; 4], b: [f32; 4]) -> bool {
    a.iter().zip(&b).all(|(x, y)| (x - y).abs() < 1e-6)
  }

  #[test]
  fn alpha_blending() {
    let out = blend(
      [1., 0., 0., 0.25],
      [0., 0., 1., 1.],
      BlendFunc::alpha(),
      BlendEquations::default(),
    );

    assert!(close(out, [0.25, 0., 0.75, 0.25 * 0.25 + 0.75]), "{:?}", out);
  }

  #[test]
  fn separate_alpha_channel() {
    let func = BlendFunc::separate(Factor::One, Factor::One, Factor::Zero, Factor::One);
    let equations = BlendEquations {
      rgb: Equation::ReverseSubtract,
      alpha: Equation::Additive,
    };
    let out = blend([0.2, 0.2, 0.2, 0.5], [0.5, 0.5, 0.5, 0.5], func, equations);

    assert!(close(out, [0.3, 0.3, 0.3, 0.5]), "{:?}", out);
  }

  #[test]
  fn min_max_ignore_factors() {
    let func = BlendFunc::new(Factor::Zero, Factor::Zero);
    let src = [0.1, 0.9, 0.5, 0.3];
    let dst = [0.4, 0.2, 0.5, 0.6];

    assert!(close(
      blend(src, dst, func, BlendEquations::new(Equation::Min)),
      [0.1, 0.2, 0.5, 0.3]
    ));
    assert!(close(
      blend(src, dst, func, BlendEquations::new(Equation::Max)),
      [0.4, 0.9, 0.5, 0.6]
    ));
  }

  #[test]
  fn alpha_saturate() {
    let func = BlendFunc::new(Factor::SrcAlphaSaturate, Factor::Zero);
    let out = blend([1., 1., 1., 0.8], [0., 0., 0., 0.5], func, BlendEquations::default());

    assert!(close(out, [0.5, 0.5, 0.5, 0.8]), "{:?}", out);
  }
}
