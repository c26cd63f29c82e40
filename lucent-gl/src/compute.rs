//! Compute shaders.

use crate::{
  buffer::Buffer,
  context::Context,
  program::{link_program, CaptureMode, LinkOptions, Program},
  shader::Stage,
  state::{Bind, BufferTarget},
};
use log::debug;
use lucent::{
  shader::{ShaderSource, StageType},
  Error, Result,
};
use std::{ops::Deref, rc::Rc};

/// Size in bytes of an indirect dispatch command: three `u32` group counts.
pub const DISPATCH_COMMAND_SIZE: usize = 12;

/// A program made of a single compute stage.
///
/// Uniforms and blocks are reached through the underlying [`Program`], which this type
/// dereferences to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ComputeShader {
  program: Program,
}

impl Context {
  pub fn compute_shader(&self, source: impl Into<ShaderSource>) -> Result<ComputeShader> {
    let state = self.current_state()?;
    state.require("compute shaders", 430, "GL_ARB_compute_shader")?;

    let stage = Stage::new(self, StageType::ComputeShader, &source.into())?;
    let link = LinkOptions {
      varyings: &[],
      fragment_outputs: &[],
      capture_mode: CaptureMode::default(),
    };

    let inner = link_program(state, &[stage], &link, false)?;

    Ok(ComputeShader {
      program: Program(Rc::new(inner)),
    })
  }
}

impl Deref for ComputeShader {
  type Target = Program;

  fn deref(&self) -> &Program {
    &self.program
  }
}

impl ComputeShader {
  /// Dispatch `x * y * z` work groups.
  pub fn run(&self, x: u32, y: u32, z: u32) -> Result<()> {
    let (state, program) = self.program.live()?;
    let max = state.limits().max_compute_work_group_count;

    for (axis, (count, max)) in ["x", "y", "z"].iter().zip([x, y, z].into_iter().zip(max)) {
      if count > max {
        return Err(Error::out_of_range(format!(
          "{} work groups along {} exceed the maximum of {}",
          count, axis, max
        )));
      }
    }

    debug!(target: "lucent::program", "dispatching {}x{}x{} work groups", x, y, z);

    unsafe {
      state.gl().use_program(program);
      gl::DispatchCompute(x, y, z);
    }

    Ok(())
  }

  /// Dispatch with the group counts read from `buffer` at `offset`.
  pub fn run_indirect(&self, buffer: &Buffer, offset: usize) -> Result<()> {
    let (state, program) = self.program.live()?;
    let (_, commands) = buffer.live()?;

    if offset % 4 != 0 {
      return Err(Error::out_of_range(format!(
        "indirect dispatch offset {} is not a multiple of 4",
        offset
      )));
    }

    lucent::error::check_range(
      "indirect dispatch",
      offset,
      DISPATCH_COMMAND_SIZE,
      buffer.size(),
    )?;

    unsafe {
      let mut gl = state.gl();
      gl.use_program(program);
      gl.bind_buffer(BufferTarget::DispatchIndirect, commands, Bind::Cached);
      gl::DispatchComputeIndirect(offset as gl::types::GLintptr);
    }

    Ok(())
  }

  pub fn program(&self) -> &Program {
    &self.program
  }
}
