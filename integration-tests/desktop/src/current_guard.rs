//! Entering contexts, nested and shared.

use crate::harness::{ensure, ensure_eq, Harness, Outcome};
use lucent::ErrorKind;
use lucent_gl::ContextOptions;

pub fn fixture() -> Outcome {
  let h = Harness::new()?;
  let a = &h.ctx;
  let (b, _window) = h.shared(ContextOptions::default())?;

  let shared = {
    let _a = a.enter();
    ensure(a.is_current(), "first context after enter")?;
    ensure(!b.is_current(), "second context while the first is entered")?;

    match b.buffer(&[0; 4]) {
      Err(e) if e.kind() == ErrorKind::Context => (),
      other => return Err(format!("creation through a context not current: {:?}", other).into()),
    }

    let buffer = a.buffer(&[1, 2, 3, 4])?;

    {
      let guard = b.enter();
      ensure(std::ptr::eq(guard.context(), &b), "guard context")?;
      ensure(b.is_current(), "second context nested")?;
      ensure(!a.is_current(), "first context under the nested one")?;

      // buffers live in the share group
      ensure_eq(buffer.read(None, 0)?, vec![1, 2, 3, 4], "buffer read from the shared context")?;
    }

    ensure(a.is_current(), "first context after the nested guard")?;
    buffer
  };

  ensure(a.is_current() && b.is_current(), "no context entered")?;

  {
    let _a = a.enter();
    ensure_eq(shared.size(), 4, "buffer size")?;
    shared.release();
  }

  Ok(())
}
