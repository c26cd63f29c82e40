//! Renderbuffers: framebuffer attachments that can’t be sampled.

use crate::{
  context::{Context, ContextState},
  object::{impl_object, RawObject},
  texture::check_size,
};
use gl::types::*;
use lucent::{
  texture::{check_samples, Dtype, PixelFormat},
  ObjectKind, Result,
};
use std::rc::Rc;

pub(crate) struct RenderbufferInner {
  pub(crate) raw: RawObject,
  format: PixelFormat,
  size: (u32, u32),
  samples: u32,
}

/// A color or depth image, only usable as a framebuffer attachment and as a blit source.
#[derive(Clone)]
pub struct Renderbuffer(pub(crate) Rc<RenderbufferInner>);

impl_object!(Renderbuffer);

impl Context {
  pub fn renderbuffer(
    &self,
    size: (u32, u32),
    components: usize,
    samples: u32,
    dtype: Dtype,
  ) -> Result<Renderbuffer> {
    let state = self.current_state()?;
    let format = PixelFormat::color(components, dtype)?;
    create_renderbuffer(state, size, samples, format)
  }

  pub fn depth_renderbuffer(&self, size: (u32, u32), samples: u32) -> Result<Renderbuffer> {
    let state = self.current_state()?;
    create_renderbuffer(state, size, samples, PixelFormat::depth())
  }
}

fn create_renderbuffer(
  state: &Rc<ContextState>,
  (w, h): (u32, u32),
  samples: u32,
  format: PixelFormat,
) -> Result<Renderbuffer> {
  let limits = state.limits();
  check_size(&[w, h], limits.max_texture_size)?;
  check_samples(samples, limits.max_samples)?;

  let name = unsafe {
    let mut name: GLuint = 0;
    gl::GenRenderbuffers(1, &mut name);
    gl::BindRenderbuffer(gl::RENDERBUFFER, name);
    gl::RenderbufferStorageMultisample(
      gl::RENDERBUFFER,
      samples as GLsizei,
      format.internal_format,
      w as GLsizei,
      h as GLsizei,
    );
    gl::BindRenderbuffer(gl::RENDERBUFFER, 0);
    name
  };

  Ok(Renderbuffer(Rc::new(RenderbufferInner {
    raw: RawObject::new(state, ObjectKind::Renderbuffer, name),
    format,
    size: (w, h),
    samples,
  })))
}

impl Renderbuffer {
  pub fn size(&self) -> (u32, u32) {
    self.0.size
  }

  pub fn width(&self) -> u32 {
    self.0.size.0
  }

  pub fn height(&self) -> u32 {
    self.0.size.1
  }

  pub fn samples(&self) -> u32 {
    self.0.samples
  }

  pub fn components(&self) -> usize {
    self.0.format.components
  }

  pub fn dtype(&self) -> Dtype {
    self.0.format.dtype
  }

  pub fn is_depth(&self) -> bool {
    self.0.format.depth
  }

  pub fn format(&self) -> PixelFormat {
    self.0.format
  }
}
