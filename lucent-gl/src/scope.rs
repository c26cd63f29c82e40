//! Scoped state transactions.
//!
//! A [`Scope`] gathers a framebuffer, a set of capabilities and resource bindings. Entering it
//! records what it is about to change, applies its configuration, and the returned
//! [`ScopeGuard`] puts the recorded state back when dropped. Guards nest: an inner scope restores
//! what the outer one had set.

use crate::{
  buffer::Buffer,
  context::{Context, ContextState},
  framebuffer::{restore_target, Framebuffer},
  sampler::{check_unit, Sampler},
  state::IndexedBinding,
  texture::AnyTexture,
};
use gl::types::*;
use lucent::{state::EnableFlags, Error, Result};
use std::rc::{Rc, Weak};

/// A buffer range bound to an indexed block binding.
struct BlockBinding {
  buffer: Buffer,
  binding: u32,
  offset: usize,
  size: usize,
}

struct ScopeInner {
  state: Weak<ContextState>,
  framebuffer: Option<Framebuffer>,
  enable_only: Option<EnableFlags>,
  textures: Vec<(AnyTexture, u32)>,
  samplers: Vec<(Sampler, u32)>,
  uniform_buffers: Vec<BlockBinding>,
  storage_buffers: Vec<BlockBinding>,
}

/// Reusable state configuration, entered with [`Scope::enter`].
#[derive(Clone)]
pub struct Scope(Rc<ScopeInner>);

impl PartialEq for Scope {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }
}

impl Eq for Scope {}

impl std::fmt::Debug for Scope {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    f.debug_struct("Scope")
      .field("framebuffer", &self.0.framebuffer)
      .field("enable_only", &self.0.enable_only)
      .field("textures", &self.0.textures.len())
      .field("samplers", &self.0.samplers.len())
      .field("uniform_buffers", &self.0.uniform_buffers.len())
      .field("storage_buffers", &self.0.storage_buffers.len())
      .finish()
  }
}

pub struct ScopeBuilder<'a> {
  ctx: &'a Context,
  framebuffer: Option<Framebuffer>,
  enable_only: Option<EnableFlags>,
  textures: Vec<(AnyTexture, u32)>,
  samplers: Vec<(Sampler, u32)>,
  uniform_buffers: Vec<(Buffer, u32, usize, Option<usize>)>,
  storage_buffers: Vec<(Buffer, u32, usize, Option<usize>)>,
}

impl Context {
  pub fn scope(&self) -> ScopeBuilder<'_> {
    ScopeBuilder {
      ctx: self,
      framebuffer: None,
      enable_only: None,
      textures: Vec::new(),
      samplers: Vec::new(),
      uniform_buffers: Vec::new(),
      storage_buffers: Vec::new(),
    }
  }
}

impl<'a> ScopeBuilder<'a> {
  /// Framebuffer to render into while the scope is entered.
  pub fn framebuffer(mut self, framebuffer: &Framebuffer) -> Self {
    self.framebuffer = Some(framebuffer.clone());
    self
  }

  /// Capabilities to enable, every other one being disabled.
  pub fn enable_only(mut self, flags: EnableFlags) -> Self {
    self.enable_only = Some(flags);
    self
  }

  pub fn texture(mut self, texture: impl Into<AnyTexture>, unit: u32) -> Self {
    self.textures.push((texture.into(), unit));
    self
  }

  pub fn sampler(mut self, sampler: &Sampler, unit: u32) -> Self {
    self.samplers.push((sampler.clone(), unit));
    self
  }

  /// Bind `size` bytes of `buffer` at `offset` (up to the end if `None`) to a uniform block
  /// binding.
  pub fn uniform_buffer(
    mut self,
    buffer: &Buffer,
    binding: u32,
    offset: usize,
    size: Option<usize>,
  ) -> Self {
    self
      .uniform_buffers
      .push((buffer.clone(), binding, offset, size));
    self
  }

  pub fn storage_buffer(
    mut self,
    buffer: &Buffer,
    binding: u32,
    offset: usize,
    size: Option<usize>,
  ) -> Self {
    self
      .storage_buffers
      .push((buffer.clone(), binding, offset, size));
    self
  }

  pub fn build(self) -> Result<Scope> {
    let state = self.ctx.current_state()?;

    for unit in self
      .textures
      .iter()
      .map(|(_, u)| *u)
      .chain(self.samplers.iter().map(|(_, u)| *u))
    {
      check_unit(state, unit)?;
    }

    let uniform_buffers = self
      .uniform_buffers
      .into_iter()
      .map(|(buffer, binding, offset, size)| {
        let size = buffer.uniform_block_span(state, binding, offset, size)?;
        Ok(BlockBinding {
          buffer,
          binding,
          offset,
          size,
        })
      })
      .collect::<Result<Vec<_>>>()?;

    let storage_buffers = self
      .storage_buffers
      .into_iter()
      .map(|(buffer, binding, offset, size)| {
        let size = buffer.storage_block_span(state, binding, offset, size)?;
        Ok(BlockBinding {
          buffer,
          binding,
          offset,
          size,
        })
      })
      .collect::<Result<Vec<_>>>()?;

    Ok(Scope(Rc::new(ScopeInner {
      state: Rc::downgrade(state),
      framebuffer: self.framebuffer,
      enable_only: self.enable_only,
      textures: self.textures,
      samplers: self.samplers,
      uniform_buffers,
      storage_buffers,
    })))
  }
}

/// State recorded when entering a scope.
struct Saved {
  enable_flags: EnableFlags,
  fbo: Option<Framebuffer>,
  textures: Vec<(u32, GLenum, GLuint)>,
  samplers: Vec<(u32, GLuint)>,
  uniform_buffers: Vec<(u32, IndexedBinding)>,
  storage_buffers: Vec<(u32, IndexedBinding)>,
}

/// Restores the state of the context as it was before [`Scope::enter`].
pub struct ScopeGuard<'a> {
  scope: &'a Scope,
  state: Rc<ContextState>,
  saved: Option<Saved>,
}

impl Scope {
  /// Apply the scope until the returned guard is dropped.
  pub fn enter(&self) -> Result<ScopeGuard<'_>> {
    let inner = &self.0;
    let state = inner
      .state
      .upgrade()
      .ok_or_else(|| Error::context("the context of this scope was dropped"))?;

    if !state.is_current() {
      return Err(Error::context("this scope belongs to a context that is not current"));
    }

    let saved = unsafe {
      let mut gl = state.gl();

      Saved {
        enable_flags: gl.enable_flags(),
        fbo: state.fbo.borrow().clone(),
        textures: inner
          .textures
          .iter()
          .map(|(t, unit)| (*unit, t.target(), gl.texture_binding(*unit, t.target())))
          .collect(),
        samplers: inner
          .samplers
          .iter()
          .map(|(_, unit)| (*unit, gl.sampler_binding(*unit)))
          .collect(),
        uniform_buffers: inner
          .uniform_buffers
          .iter()
          .map(|b| (b.binding, gl.uniform_buffer_binding(b.binding)))
          .collect(),
        storage_buffers: inner
          .storage_buffers
          .iter()
          .map(|b| (b.binding, gl.storage_buffer_binding(b.binding)))
          .collect(),
      }
    };

    // from here on, the guard undoes whatever was applied even if a step fails
    let guard = ScopeGuard {
      scope: self,
      state: state.clone(),
      saved: Some(saved),
    };

    if let Some(flags) = inner.enable_only {
      unsafe { state.gl().set_enable_flags(flags) };
    }

    if let Some(ref framebuffer) = inner.framebuffer {
      framebuffer.bind()?;
    }

    for (texture, unit) in &inner.textures {
      texture.bind_to_unit(*unit)?;
    }

    for (sampler, unit) in &inner.samplers {
      sampler.bind_to_unit(*unit)?;
    }

    for b in &inner.uniform_buffers {
      b.buffer.bind_to_uniform_block(b.binding, b.offset, Some(b.size))?;
    }

    for b in &inner.storage_buffers {
      b.buffer.bind_to_storage_buffer(b.binding, b.offset, Some(b.size))?;
    }

    Ok(guard)
  }
}

impl<'a> ScopeGuard<'a> {
  pub fn scope(&self) -> &Scope {
    self.scope
  }
}

impl<'a> Drop for ScopeGuard<'a> {
  fn drop(&mut self) {
    let Some(saved) = self.saved.take() else {
      return;
    };

    let state = &self.state;
    let previous = state.fbo.replace(saved.fbo);

    unsafe {
      let mut gl = state.gl();

      for (binding, bound) in saved.storage_buffers.into_iter().rev() {
        gl.restore_storage_buffer(binding, bound);
      }

      for (binding, bound) in saved.uniform_buffers.into_iter().rev() {
        gl.restore_uniform_buffer(binding, bound);
      }

      for (unit, handle) in saved.samplers.into_iter().rev() {
        gl.bind_sampler(unit, handle);
      }

      for (unit, target, handle) in saved.textures.into_iter().rev() {
        gl.bind_texture_to_unit(unit, target, handle);
      }

      restore_target(state, &mut gl);
      gl.set_enable_flags(saved.enable_flags);
    }

    drop(previous);
  }
}
