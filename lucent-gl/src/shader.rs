//! Shader stages.
//!
//! Stages only live long enough to be linked into a [`Program`](crate::Program) or a
//! [`ComputeShader`](crate::ComputeShader).

use crate::context::Context;
use gl::types::*;
use log::warn;
use lucent::{
  shader::{
    spirv::{self, Reflection},
    ShaderSource, StageType,
  },
  Error, Result,
};
use std::{
  ffi::CString,
  ptr::{null, null_mut},
};

/// SPIR-V execution models, indexed like [`StageType`].
fn execution_model(ty: StageType) -> u32 {
  match ty {
    StageType::VertexShader => 0,
    StageType::TessellationControlShader => 1,
    StageType::TessellationEvaluationShader => 2,
    StageType::GeometryShader => 3,
    StageType::FragmentShader => 4,
    StageType::ComputeShader => 5,
  }
}

#[derive(Debug)]
pub(crate) struct Stage {
  pub(crate) handle: GLuint,
  pub(crate) ty: StageType,
  /// Reflection of SPIR-V stages; `None` for GLSL ones.
  pub(crate) reflection: Option<Reflection>,
}

impl Drop for Stage {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteShader(self.handle);
    }
  }
}

impl Stage {
  /// Compile a stage. GLSL sources get their includes expanded first.
  pub(crate) fn new(ctx: &Context, ty: StageType, source: &ShaderSource) -> Result<Self> {
    match source {
      ShaderSource::Glsl(src) => Self::from_glsl(ctx, ty, src),
      ShaderSource::SpirV(bytes) => Self::from_spirv(ctx, ty, bytes),
    }
  }

  fn from_glsl(ctx: &Context, ty: StageType, src: &str) -> Result<Self> {
    let src = ctx.expand_includes(src).map_err(|e| {
      warn!(target: "lucent::program", "cannot preprocess {}: {}", ty, e);
      Error::compilation(ty, src, e.to_string())
    })?;

    let c_src = CString::new(src.as_bytes())
      .map_err(|_| Error::compilation(ty, &src, "source contains a NUL byte"))?;

    unsafe {
      let handle = gl::CreateShader(ty.to_glenum());

      if handle == 0 {
        return Err(Error::compilation(ty, &src, "unable to create shader stage"));
      }

      gl::ShaderSource(handle, 1, [c_src.as_ptr()].as_ptr(), null());
      gl::CompileShader(handle);

      let stage = Stage {
        handle,
        ty,
        reflection: None,
      };

      stage.check_compiled(&src)?;
      Ok(stage)
    }
  }

  fn from_spirv(ctx: &Context, ty: StageType, bytes: &[u8]) -> Result<Self> {
    ctx
      .state()
      .require("SPIR-V shaders", 460, "GL_ARB_gl_spirv")?;

    let reflection = spirv::reflect(bytes)?;
    let entry_point = reflection
      .entry_points
      .iter()
      .find(|e| e.execution_model == execution_model(ty))
      .map_or("main", |e| e.name.as_str());

    let c_entry_point = CString::new(entry_point)
      .map_err(|_| Error::reflection("SPIR-V entry point name contains a NUL byte"))?;

    unsafe {
      let handle = gl::CreateShader(ty.to_glenum());

      if handle == 0 {
        return Err(Error::compilation(ty, "", "unable to create shader stage"));
      }

      gl::ShaderBinary(
        1,
        &handle,
        gl::SHADER_BINARY_FORMAT_SPIR_V,
        bytes.as_ptr() as *const _,
        bytes.len() as GLsizei,
      );
      gl::SpecializeShader(handle, c_entry_point.as_ptr(), 0, null(), null());

      let stage = Stage {
        handle,
        ty,
        reflection: Some(reflection),
      };

      stage.check_compiled(&format!("<SPIR-V module, {} bytes>", bytes.len()))?;
      Ok(stage)
    }
  }

  unsafe fn check_compiled(&self, src: &str) -> Result<()> {
    let mut compiled: GLint = gl::FALSE.into();
    gl::GetShaderiv(self.handle, gl::COMPILE_STATUS, &mut compiled);

    if compiled == GLint::from(gl::TRUE) {
      return Ok(());
    }

    let mut log_len: GLint = 0;
    gl::GetShaderiv(self.handle, gl::INFO_LOG_LENGTH, &mut log_len);

    let mut log: Vec<u8> = Vec::with_capacity(log_len.max(0) as usize);
    gl::GetShaderInfoLog(
      self.handle,
      log_len,
      null_mut(),
      log.as_mut_ptr() as *mut GLchar,
    );
    log.set_len(log_len.max(0) as usize);

    let log = info_log(log);
    warn!(target: "lucent::program", "{} failed to compile:\n{}", self.ty, log);

    Err(Error::compilation(self.ty, src, log))
  }
}

/// Turn a driver info log into a string, without the trailing NUL.
pub(crate) fn info_log(mut log: Vec<u8>) -> String {
  while log.last() == Some(&0) {
    log.pop();
  }

  String::from_utf8_lossy(&log).into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn info_log_drops_nul() {
    assert_eq!(info_log(b"0:1: error\0".to_vec()), "0:1: error");
    assert_eq!(info_log(Vec::new()), "");
  }

  #[test]
  fn execution_models() {
    assert_eq!(execution_model(StageType::VertexShader), 0);
    assert_eq!(execution_model(StageType::FragmentShader), 4);
    assert_eq!(execution_model(StageType::ComputeShader), 5);
  }
}
