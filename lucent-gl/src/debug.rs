//! Driver debug output, debug groups and object labels.
//!
//! Messages are forwarded to `log` under the `OpenGL` target, with the driver severity mapped to
//! a log level.

use crate::context::Context;
use gl::types::*;
use log::warn;
use lucent::{Error, Glo, ObjectKind, Result};
use std::{
  ffi::{c_void, CStr, CString},
  os::raw::c_char,
};

pub(crate) unsafe fn install_debug_output() {
  gl::Enable(gl::DEBUG_OUTPUT);
  gl::Enable(gl::DEBUG_OUTPUT_SYNCHRONOUS);
  gl::DebugMessageCallback(Some(gl_debug), std::ptr::null());
  gl::DebugMessageControl(
    gl::DONT_CARE,
    gl::DONT_CARE,
    gl::DONT_CARE,
    0,
    std::ptr::null(),
    gl::TRUE,
  );
}

extern "system" fn gl_debug(
  source: GLenum,
  ty: GLenum,
  _id: GLuint,
  severity: GLenum,
  _length: GLsizei,
  message: *const c_char,
  _user_param: *mut c_void,
) {
  if message.is_null() {
    return;
  }

  let message = unsafe { CStr::from_ptr(message) }.to_string_lossy();

  let source = match source {
    gl::DEBUG_SOURCE_API => "API",
    gl::DEBUG_SOURCE_WINDOW_SYSTEM => "Window System",
    gl::DEBUG_SOURCE_SHADER_COMPILER => "Shader Compiler",
    gl::DEBUG_SOURCE_THIRD_PARTY => "Third Party",
    gl::DEBUG_SOURCE_APPLICATION => "Application",
    _ => "Other",
  };

  let ty = match ty {
    gl::DEBUG_TYPE_ERROR => "Error",
    gl::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "Deprecated Behavior",
    gl::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "Undefined Behavior",
    gl::DEBUG_TYPE_PORTABILITY => "Portability",
    gl::DEBUG_TYPE_PERFORMANCE => "Performance",
    gl::DEBUG_TYPE_MARKER => "Marker",
    gl::DEBUG_TYPE_PUSH_GROUP => "Push Group",
    gl::DEBUG_TYPE_POP_GROUP => "Pop Group",
    _ => "Other",
  };

  match severity {
    gl::DEBUG_SEVERITY_HIGH => log::error!(target: "OpenGL", "{ty}: {source}: {message}"),
    gl::DEBUG_SEVERITY_MEDIUM => log::warn!(target: "OpenGL", "{ty}: {source}: {message}"),
    gl::DEBUG_SEVERITY_LOW => log::debug!(target: "OpenGL", "{ty}: {source}: {message}"),
    _ => log::trace!(target: "OpenGL", "{ty}: {source}: {message}"),
  }
}

fn label_identifier(kind: ObjectKind) -> GLenum {
  match kind {
    ObjectKind::Buffer => gl::BUFFER,
    ObjectKind::Texture => gl::TEXTURE,
    ObjectKind::Sampler => gl::SAMPLER,
    ObjectKind::Renderbuffer => gl::RENDERBUFFER,
    ObjectKind::Framebuffer => gl::FRAMEBUFFER,
    ObjectKind::Program => gl::PROGRAM,
    ObjectKind::VertexArray => gl::VERTEX_ARRAY,
    ObjectKind::Query => gl::QUERY,
  }
}

fn debug_string(what: &str, s: &str) -> Result<CString> {
  CString::new(s).map_err(|_| Error::creation(format!("{} contains a NUL byte", what)))
}

impl Context {
  fn has_debug(&self) -> bool {
    self.state().supports(430, "GL_KHR_debug")
  }

  /// Open a named debug group, shown by frame debuggers. Does nothing without debug support.
  pub fn push_debug_group(&self, name: &str) -> Result<()> {
    self.current_state()?;
    let name = debug_string("debug group name", name)?;

    if !self.has_debug() {
      warn!(target: "lucent::debug", "debug groups are not supported by this context");
      return Ok(());
    }

    unsafe { gl::PushDebugGroup(gl::DEBUG_SOURCE_APPLICATION, 0, -1, name.as_ptr()) };

    Ok(())
  }

  pub fn pop_debug_group(&self) -> Result<()> {
    self.current_state()?;

    if self.has_debug() {
      unsafe { gl::PopDebugGroup() };
    }

    Ok(())
  }

  /// Attach a label to a driver object, as shown by frame debuggers and debug messages.
  pub fn set_label(&self, kind: ObjectKind, glo: Glo, label: &str) -> Result<()> {
    self.current_state()?;
    let name = glo.name().ok_or(Error::InvalidObject(kind.name()))?;
    let label = debug_string("label", label)?;

    if !self.has_debug() {
      warn!(target: "lucent::debug", "object labels are not supported by this context");
      return Ok(());
    }

    unsafe { gl::ObjectLabel(label_identifier(kind), name, -1, label.as_ptr()) };

    Ok(())
  }
}
