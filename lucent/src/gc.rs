//! Object names and release policies.
//!
//! GPU objects can only be deleted while their context is current. The [`GcMode`] of a context
//! decides what happens when the last handle to an object goes away: nothing (`Manual`), deferral
//! to an explicit drain (`ContextGc`), or immediate deletion (`Auto`).

use crate::error::{Error, Result};
use std::{collections::VecDeque, fmt, str::FromStr};

/// Release policy of a context.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum GcMode {
  /// Objects are only deleted by an explicit `release`.
  #[default]
  Manual,
  /// Dropped objects are queued and deleted by the next `gc`.
  ContextGc,
  /// Dropped objects are deleted immediately.
  Auto,
}

impl FromStr for GcMode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "manual" => Ok(GcMode::Manual),
      "context_gc" => Ok(GcMode::ContextGc),
      "auto" => Ok(GcMode::Auto),
      _ => Err(Error::context(format!(
        "invalid gc mode {:?} (expected manual, context_gc or auto)",
        s
      ))),
    }
  }
}

impl fmt::Display for GcMode {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(match self {
      GcMode::Manual => "manual",
      GcMode::ContextGc => "context_gc",
      GcMode::Auto => "auto",
    })
  }
}

/// Kind of a driver object, which selects its `glDelete*` call.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ObjectKind {
  Buffer,
  Texture,
  Sampler,
  Renderbuffer,
  Framebuffer,
  Program,
  VertexArray,
  Query,
}

impl ObjectKind {
  pub fn name(self) -> &'static str {
    match self {
      ObjectKind::Buffer => "buffer",
      ObjectKind::Texture => "texture",
      ObjectKind::Sampler => "sampler",
      ObjectKind::Renderbuffer => "renderbuffer",
      ObjectKind::Framebuffer => "framebuffer",
      ObjectKind::Program => "program",
      ObjectKind::VertexArray => "vertex array",
      ObjectKind::Query => "query",
    }
  }

  /// Whether objects of this kind are visible to every context of a share group. Container
  /// objects (vertex arrays, framebuffers) and queries are per-context.
  pub fn is_shareable(self) -> bool {
    !matches!(
      self,
      ObjectKind::VertexArray | ObjectKind::Framebuffer | ObjectKind::Query
    )
  }
}

impl fmt::Display for ObjectKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Driver name of an object, or the sentinel left by `release`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Glo {
  Live(u32),
  Invalid,
}

impl Glo {
  pub fn is_live(self) -> bool {
    matches!(self, Glo::Live(_))
  }

  pub fn name(self) -> Option<u32> {
    match self {
      Glo::Live(name) => Some(name),
      Glo::Invalid => None,
    }
  }
}

impl fmt::Display for Glo {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Glo::Live(name) => write!(f, "{}", name),
      Glo::Invalid => f.write_str("InvalidObject"),
    }
  }
}

/// Objects waiting for deletion, in insertion order.
#[derive(Debug, Default)]
pub struct ReleaseQueue {
  pending: VecDeque<(ObjectKind, u32)>,
}

impl ReleaseQueue {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, kind: ObjectKind, name: u32) {
    self.pending.push_back((kind, name));
  }

  pub fn pop(&mut self) -> Option<(ObjectKind, u32)> {
    self.pending.pop_front()
  }

  pub fn len(&self) -> usize {
    self.pending.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pending.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &(ObjectKind, u32)> {
    self.pending.iter()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn gc_modes() {
    for mode in [GcMode::Manual, GcMode::ContextGc, GcMode::Auto] {
      assert_eq!(mode.to_string().parse::<GcMode>().unwrap(), mode);
    }

    assert!("eager".parse::<GcMode>().is_err());
    assert_eq!(GcMode::default(), GcMode::Manual);
  }

  #[test]
  fn queue_is_fifo() {
    let mut queue = ReleaseQueue::new();
    queue.push(ObjectKind::VertexArray, 3);
    queue.push(ObjectKind::Buffer, 1);
    queue.push(ObjectKind::Program, 2);

    assert_eq!(queue.len(), 3);
    assert_eq!(queue.pop(), Some((ObjectKind::VertexArray, 3)));
    assert_eq!(queue.pop(), Some((ObjectKind::Buffer, 1)));
    assert_eq!(queue.pop(), Some((ObjectKind::Program, 2)));
    assert!(queue.is_empty());
  }

  #[test]
  fn shareable_kinds() {
    assert!(ObjectKind::Buffer.is_shareable());
    assert!(ObjectKind::Program.is_shareable());
    assert!(!ObjectKind::VertexArray.is_shareable());
    assert!(!ObjectKind::Framebuffer.is_shareable());
  }

  #[test]
  fn glo_display() {
    assert_eq!(Glo::Live(12).to_string(), "12");
    assert_eq!(Glo::Invalid.to_string(), "InvalidObject");
    assert_eq!(Glo::Invalid.name(), None);
  }
}
