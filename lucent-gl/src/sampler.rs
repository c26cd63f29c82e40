//! Sampler objects.
//!
//! A sampler bound to a texture unit overrides the sampling parameters of whatever texture is
//! bound to the same unit. Textures and samplers share the [`SamplerParams`] model and the same
//! setters.

use crate::{
  context::{Context, ContextState},
  object::{impl_object, RawObject},
  state::depth_comparison_to_glenum,
};
use gl::types::*;
use lucent::{texture::SamplerParams, Error, ObjectKind, Result};
use std::{cell::Cell, rc::Rc};

/// Sampling parameter setters, shared by samplers and textures.
macro_rules! impl_sampling {
  ($t:ident) => {
    impl $t {
      pub fn params(&self) -> lucent::texture::SamplerParams {
        self.0.params()
      }

      pub fn set_params(&self, params: lucent::texture::SamplerParams) -> lucent::Result<()> {
        self.0.set_params(|p| *p = params)
      }

      /// `true` repeats along x, `false` clamps to the edge.
      pub fn set_repeat_x(&self, repeat: bool) -> lucent::Result<()> {
        self
          .0
          .set_params(|p| p.wrap_s = lucent::texture::Wrap::from_repeat(repeat))
      }

      pub fn set_repeat_y(&self, repeat: bool) -> lucent::Result<()> {
        self
          .0
          .set_params(|p| p.wrap_t = lucent::texture::Wrap::from_repeat(repeat))
      }

      pub fn set_repeat_z(&self, repeat: bool) -> lucent::Result<()> {
        self
          .0
          .set_params(|p| p.wrap_r = lucent::texture::Wrap::from_repeat(repeat))
      }

      pub fn set_wrap(
        &self,
        x: lucent::texture::Wrap,
        y: lucent::texture::Wrap,
        z: lucent::texture::Wrap,
      ) -> lucent::Result<()> {
        self.0.set_params(|p| {
          p.wrap_s = x;
          p.wrap_t = y;
          p.wrap_r = z;
        })
      }

      pub fn set_filter(&self, filter: lucent::texture::Filter) -> lucent::Result<()> {
        self.0.set_params(|p| p.filter = filter)
      }

      /// Clamped to `Limits::max_anisotropy`.
      pub fn set_anisotropy(&self, anisotropy: f32) -> lucent::Result<()> {
        self.0.set_params(|p| p.anisotropy = anisotropy)
      }

      /// Depth comparison performed when sampling a depth texture; `None` disables it.
      pub fn set_compare_func(
        &self,
        func: Option<lucent::depth_test::DepthComparison>,
      ) -> lucent::Result<()> {
        self.0.set_params(|p| p.compare_func = func)
      }

      pub fn set_lod_range(&self, min: f32, max: f32) -> lucent::Result<()> {
        self.0.set_params(|p| {
          p.min_lod = min;
          p.max_lod = max;
        })
      }

      pub fn set_lod_bias(&self, bias: f32) -> lucent::Result<()> {
        self.0.set_params(|p| p.lod_bias = bias)
      }

      pub fn set_border_color(&self, color: [f32; 4]) -> lucent::Result<()> {
        self.0.set_params(|p| p.border_color = color)
      }
    }
  };
}

pub(crate) use impl_sampling;

/// Where sampling parameters go: the texture bound to a target, or a sampler object.
#[derive(Clone, Copy, Debug)]
pub(crate) enum ParamSink {
  Texture(GLenum),
  Sampler(GLuint),
}

impl ParamSink {
  unsafe fn int(self, pname: GLenum, value: GLint) {
    match self {
      ParamSink::Texture(target) => gl::TexParameteri(target, pname, value),
      ParamSink::Sampler(name) => gl::SamplerParameteri(name, pname, value),
    }
  }

  unsafe fn float(self, pname: GLenum, value: f32) {
    match self {
      ParamSink::Texture(target) => gl::TexParameterf(target, pname, value),
      ParamSink::Sampler(name) => gl::SamplerParameterf(name, pname, value),
    }
  }

  unsafe fn floats(self, pname: GLenum, value: &[f32; 4]) {
    match self {
      ParamSink::Texture(target) => gl::TexParameterfv(target, pname, value.as_ptr()),
      ParamSink::Sampler(name) => gl::SamplerParameterfv(name, pname, value.as_ptr()),
    }
  }
}

/// Upload every sampling parameter. Anisotropy is skipped when `max_anisotropy` is `1`, which is
/// what contexts without anisotropic filtering report.
pub(crate) unsafe fn apply_sampler_params(
  sink: ParamSink,
  params: &SamplerParams,
  max_anisotropy: f32,
) {
  sink.int(gl::TEXTURE_WRAP_S, params.wrap_s.to_glenum() as GLint);
  sink.int(gl::TEXTURE_WRAP_T, params.wrap_t.to_glenum() as GLint);
  sink.int(gl::TEXTURE_WRAP_R, params.wrap_r.to_glenum() as GLint);
  sink.int(gl::TEXTURE_MIN_FILTER, params.filter.min.to_glenum() as GLint);
  sink.int(gl::TEXTURE_MAG_FILTER, params.filter.mag.to_glenum() as GLint);

  if max_anisotropy > 1. {
    sink.float(
      gl::TEXTURE_MAX_ANISOTROPY,
      params.anisotropy.clamp(1., max_anisotropy),
    );
  }

  match params.compare_func {
    Some(func) => {
      sink.int(gl::TEXTURE_COMPARE_MODE, gl::COMPARE_REF_TO_TEXTURE as GLint);
      sink.int(gl::TEXTURE_COMPARE_FUNC, depth_comparison_to_glenum(func) as GLint);
    }

    None => sink.int(gl::TEXTURE_COMPARE_MODE, gl::NONE as GLint),
  }

  sink.float(gl::TEXTURE_MIN_LOD, params.min_lod);
  sink.float(gl::TEXTURE_MAX_LOD, params.max_lod);
  sink.float(gl::TEXTURE_LOD_BIAS, params.lod_bias);
  sink.floats(gl::TEXTURE_BORDER_COLOR, &params.border_color);
}

/// Check a parameter set before it reaches the driver.
pub(crate) fn check_sampler_params(params: &SamplerParams) -> Result<()> {
  if params.min_lod > params.max_lod {
    return Err(Error::out_of_range(format!(
      "min LOD {} is greater than max LOD {}",
      params.min_lod, params.max_lod
    )));
  }

  if params.anisotropy < 1. {
    return Err(Error::out_of_range(format!(
      "anisotropy must be at least 1, got {}",
      params.anisotropy
    )));
  }

  Ok(())
}

/// Check a texture unit against the number of units of the context.
pub(crate) fn check_unit(state: &ContextState, unit: u32) -> Result<()> {
  let max = state.limits().max_texture_units;

  if unit < max {
    Ok(())
  } else {
    Err(Error::out_of_range(format!(
      "texture unit {} exceeds the {} available units",
      unit, max
    )))
  }
}

pub(crate) struct SamplerInner {
  pub(crate) raw: RawObject,
  params: Cell<SamplerParams>,
}

impl SamplerInner {
  pub(crate) fn params(&self) -> SamplerParams {
    self.params.get()
  }

  pub(crate) fn set_params(&self, f: impl FnOnce(&mut SamplerParams)) -> Result<()> {
    let (state, name) = self.raw.live()?;
    let mut params = self.params.get();
    f(&mut params);
    check_sampler_params(&params)?;

    unsafe {
      apply_sampler_params(
        ParamSink::Sampler(name),
        &params,
        state.limits().max_anisotropy,
      )
    };

    self.params.set(params);
    Ok(())
  }
}

/// A sampler object.
#[derive(Clone)]
pub struct Sampler(pub(crate) Rc<SamplerInner>);

impl_object!(Sampler);
impl_sampling!(Sampler);

impl Context {
  pub fn sampler(&self, params: SamplerParams) -> Result<Sampler> {
    let state = self.current_state()?;
    check_sampler_params(&params)?;

    let name = unsafe {
      let mut name: GLuint = 0;
      gl::GenSamplers(1, &mut name);
      apply_sampler_params(
        ParamSink::Sampler(name),
        &params,
        state.limits().max_anisotropy,
      );
      name
    };

    Ok(Sampler(Rc::new(SamplerInner {
      raw: RawObject::new(state, ObjectKind::Sampler, name),
      params: Cell::new(params),
    })))
  }
}

impl Sampler {
  /// Bind the sampler to a texture unit.
  pub fn bind_to_unit(&self, unit: u32) -> Result<()> {
    let (state, name) = self.0.raw.live()?;
    check_unit(&state, unit)?;

    unsafe { state.gl().bind_sampler(unit, name) };
    Ok(())
  }

  /// Unbind whatever sampler is bound to a texture unit.
  pub fn clear(&self, unit: u32) -> Result<()> {
    let (state, _) = self.0.raw.live()?;
    check_unit(&state, unit)?;

    unsafe { state.gl().bind_sampler(unit, 0) };
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_inverted_lod_range() {
    let params = SamplerParams {
      min_lod: 4.,
      max_lod: 2.,
      ..SamplerParams::default()
    };

    assert!(check_sampler_params(&params).is_err());
    assert!(check_sampler_params(&SamplerParams::default()).is_ok());
  }

  #[test]
  fn rejects_low_anisotropy() {
    let params = SamplerParams {
      anisotropy: 0.5,
      ..SamplerParams::default()
    };

    assert!(check_sampler_params(&params).is_err());
  }
}
