//! Ownership of driver objects.
//!
//! Every GPU object handle wraps a [`RawObject`]: the driver name, the kind selecting its
//! `glDelete*` call, and a weak reference to the context that created it. Handles are cheap to
//! clone; the driver object goes away with [`RawObject::release`] or, depending on the
//! [`GcMode`] of the context, when the last handle is dropped.

use crate::context::ContextState;
use gl::types::GLuint;
use log::{trace, warn};
use lucent::{Error, GcMode, Glo, ObjectKind, Result};
use std::{
  any::Any,
  cell::{Cell, RefCell},
  rc::{Rc, Weak},
};

pub(crate) struct RawObject {
  kind: ObjectKind,
  glo: Cell<Glo>,
  ctx: Weak<ContextState>,
  extra: RefCell<Option<Rc<dyn Any>>>,
  // wrapped objects created outside of lucent (the default framebuffer, detected fbos)
  external: bool,
}

impl RawObject {
  pub(crate) fn new(ctx: &Rc<ContextState>, kind: ObjectKind, name: GLuint) -> Self {
    trace!(target: "lucent::object", "created {} {}", kind, name);
    Self::with_ownership(ctx, kind, name, false)
  }

  /// Wrap an object that lucent must never delete.
  pub(crate) fn external(ctx: &Rc<ContextState>, kind: ObjectKind, name: GLuint) -> Self {
    Self::with_ownership(ctx, kind, name, true)
  }

  fn with_ownership(ctx: &Rc<ContextState>, kind: ObjectKind, name: GLuint, external: bool) -> Self {
    RawObject {
      kind,
      glo: Cell::new(Glo::Live(name)),
      ctx: Rc::downgrade(ctx),
      extra: RefCell::new(None),
      external,
    }
  }

  pub(crate) fn glo(&self) -> Glo {
    self.glo.get()
  }

  /// The driver name together with the state to issue calls through.
  ///
  /// Fails with [`Error::InvalidObject`] once released, and with [`Error::Context`] if the
  /// context is gone or can’t see the object right now.
  pub(crate) fn live(&self) -> Result<(Rc<ContextState>, GLuint)> {
    let name = self
      .glo
      .get()
      .name()
      .ok_or(Error::InvalidObject(self.kind.name()))?;

    let owner = self
      .ctx
      .upgrade()
      .ok_or_else(|| Error::context(format!("the context of this {} was dropped", self.kind)))?;

    let state = ContextState::resolve(&owner, self.kind)?;
    Ok((state, name))
  }

  /// Delete the driver object now if possible, queue it otherwise, and mark the handle invalid.
  pub(crate) fn release(&self) {
    let Some(name) = self.glo.get().name() else {
      return;
    };

    self.glo.set(Glo::Invalid);

    if self.external {
      return;
    }

    if let Some(owner) = self.ctx.upgrade() {
      self.delete_or_queue(&owner, name);
    }
  }

  fn delete_or_queue(&self, owner: &Rc<ContextState>, name: GLuint) {
    if let Ok(state) = ContextState::resolve(owner, self.kind) {
      if let Ok(mut gl) = state.gl.try_borrow_mut() {
        trace!(target: "lucent::object", "deleting {} {}", self.kind, name);
        unsafe { gl.delete_object(self.kind, name) };
        return;
      }
    }

    self.queue(owner, name);
  }

  fn queue(&self, owner: &ContextState, name: GLuint) {
    match owner.queue.try_borrow_mut() {
      Ok(mut queue) => queue.push(self.kind, name),
      Err(_) => warn!(
        target: "lucent::object",
        "release queue busy, leaking {} {}",
        self.kind,
        name
      ),
    }
  }

  pub(crate) fn extra(&self) -> Option<Rc<dyn Any>> {
    self.extra.borrow().clone()
  }

  pub(crate) fn set_extra(&self, extra: Option<Rc<dyn Any>>) {
    *self.extra.borrow_mut() = extra;
  }
}

impl Drop for RawObject {
  fn drop(&mut self) {
    let Some(name) = self.glo.get().name() else {
      return;
    };

    if self.external {
      return;
    }

    let Some(owner) = self.ctx.upgrade() else {
      return;
    };

    match owner.gc_mode() {
      GcMode::Manual => {
        trace!(target: "lucent::object", "dropped {} {} without release", self.kind, name)
      }
      GcMode::ContextGc => self.queue(&owner, name),
      GcMode::Auto => self.delete_or_queue(&owner, name),
    }
  }
}

/// Common surface of object handles: `glo`, `release`, `extra` and identity comparison.
macro_rules! impl_object {
  ($t:ident) => {
    impl $t {
      /// Driver name of the object, or [`Glo::Invalid`](lucent::Glo::Invalid) once released.
      pub fn glo(&self) -> lucent::Glo {
        self.0.raw.glo()
      }

      /// Delete the driver object. Releasing an object twice does nothing.
      pub fn release(&self) {
        self.0.raw.release()
      }

      /// User data attached to the object.
      pub fn extra(&self) -> Option<std::rc::Rc<dyn std::any::Any>> {
        self.0.raw.extra()
      }

      pub fn set_extra(&self, extra: Option<std::rc::Rc<dyn std::any::Any>>) {
        self.0.raw.set_extra(extra)
      }
    }

    impl PartialEq for $t {
      fn eq(&self, other: &Self) -> bool {
        std::rc::Rc::ptr_eq(&self.0, &other.0)
      }
    }

    impl Eq for $t {}

    impl std::fmt::Debug for $t {
      fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}({})", stringify!($t), self.glo())
      }
    }
  };
}

pub(crate) use impl_object;
