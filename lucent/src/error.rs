//! Error taxonomy.
//!
//! Every fallible operation in lucent returns a [`Result`] whose error is one of the kinds listed in
//! [`ErrorKind`]. Errors are reported synchronously; nothing is retried.

use crate::shader::StageType;
use std::fmt;
use thiserror::Error;

/// Shorthand for results produced by lucent.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Kind of an [`Error`], for matching without destructuring.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
  Creation,
  Compilation,
  Link,
  Reflection,
  Lookup,
  OutOfRange,
  InvalidObject,
  Context,
  Unsupported,
}

/// A shader stage that failed to compile.
///
/// The source is the pre-processed one (includes expanded), with line numbers, so that the
/// driver log can be read against it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompilationError {
  pub stage: StageType,
  pub numbered_source: String,
  pub log: String,
}

impl fmt::Display for CompilationError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(
      f,
      "{} failed to compile\n\n{}\n\n{}",
      self.stage,
      self.numbered_source,
      self.log.trim_end()
    )
  }
}

/// An OpenGL version code, such as `330` or `430`.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct GlVersion(pub u32);

impl fmt::Display for GlVersion {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}.{}", self.0 / 100, (self.0 % 100) / 10)
  }
}

/// Errors emitted by lucent.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
  /// Invalid creation parameters (size, components, dtype, samples, attachment mismatch…).
  #[error("creation error: {0}")]
  Creation(String),

  /// A shader stage failed to compile.
  #[error("compilation error: {0}")]
  Compilation(CompilationError),

  /// The program failed to link. The payload is the driver log.
  #[error("link error: {0}")]
  Link(String),

  /// Introspection found something lucent cannot represent.
  #[error("reflection error: {0}")]
  Reflection(String),

  /// A name that the program doesn’t have: a vertex array attribute, a uniform, a block…
  #[error("{what} {name:?} not found in program (known {what}s: {})", .known.join(", "))]
  Lookup {
    what: &'static str,
    name: String,
    known: Vec<String>,
  },

  /// An offset, size, viewport or attachment index is out of bounds.
  #[error("out of range: {0}")]
  OutOfRange(String),

  /// A call was made on a released object.
  #[error("invalid object: the {0} was released")]
  InvalidObject(&'static str),

  /// No current context, version or profile mismatch, or mis-threaded access.
  #[error("context error: {0}")]
  Context(String),

  /// A feature that the current context doesn’t expose.
  #[error("unsupported: {feature} requires OpenGL {required} or the {extension} extension")]
  Unsupported {
    feature: &'static str,
    required: GlVersion,
    extension: &'static str,
  },
}

impl Error {
  pub fn creation(reason: impl Into<String>) -> Self {
    Error::Creation(reason.into())
  }

  pub fn compilation(stage: StageType, source: &str, log: impl Into<String>) -> Self {
    Error::Compilation(CompilationError {
      stage,
      numbered_source: crate::shader::numbered_source(source),
      log: log.into(),
    })
  }

  pub fn link(log: impl Into<String>) -> Self {
    Error::Link(log.into())
  }

  pub fn reflection(reason: impl Into<String>) -> Self {
    Error::Reflection(reason.into())
  }

  pub fn lookup<'a>(
    what: &'static str,
    name: impl Into<String>,
    known: impl IntoIterator<Item = &'a str>,
  ) -> Self {
    let mut known: Vec<String> = known.into_iter().map(str::to_owned).collect();
    known.sort();

    Error::Lookup {
      what,
      name: name.into(),
      known,
    }
  }

  pub fn out_of_range(reason: impl Into<String>) -> Self {
    Error::OutOfRange(reason.into())
  }

  pub fn context(reason: impl Into<String>) -> Self {
    Error::Context(reason.into())
  }

  pub fn unsupported(feature: &'static str, required: u32, extension: &'static str) -> Self {
    Error::Unsupported {
      feature,
      required: GlVersion(required),
      extension,
    }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Creation(_) => ErrorKind::Creation,
      Error::Compilation(_) => ErrorKind::Compilation,
      Error::Link(_) => ErrorKind::Link,
      Error::Reflection(_) => ErrorKind::Reflection,
      Error::Lookup { .. } => ErrorKind::Lookup,
      Error::OutOfRange(_) => ErrorKind::OutOfRange,
      Error::InvalidObject(_) => ErrorKind::InvalidObject,
      Error::Context(_) => ErrorKind::Context,
      Error::Unsupported { .. } => ErrorKind::Unsupported,
    }
  }
}

/// Check that `[offset, offset + len)` lies within `[0, size)`.
pub fn check_range(what: &str, offset: usize, len: usize, size: usize) -> Result<()> {
  match offset.checked_add(len) {
    Some(end) if end <= size => Ok(()),
    _ => Err(Error::out_of_range(format!(
      "{} [{}, {}+{}) exceeds size {}",
      what, offset, offset, len, size
    ))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unsupported_message_names_version() {
    let e = Error::unsupported("compute shaders", 430, "GL_ARB_compute_shader");
    assert_eq!(
      e.to_string(),
      "unsupported: compute shaders requires OpenGL 4.3 or the GL_ARB_compute_shader extension"
    );
    assert_eq!(e.kind(), ErrorKind::Unsupported);
  }

  #[test]
  fn lookup_lists_known_names_sorted() {
    let e = Error::lookup("attribute", "in_color", ["in_vert", "in_uv"]);
    assert_eq!(
      e.to_string(),
      "attribute \"in_color\" not found in program (known attributes: in_uv, in_vert)"
    );
  }

  #[test]
  fn range_checks() {
    assert!(check_range("write", 0, 16, 16).is_ok());
    assert!(check_range("write", 16, 0, 16).is_ok());
    assert!(check_range("write", 8, 9, 16).is_err());
    assert!(check_range("write", usize::MAX, 2, 16).is_err());
  }
}
