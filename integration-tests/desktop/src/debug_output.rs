//! Debug groups and labels, with or without driver support.

use crate::harness::{ensure, ensure_eq, Harness, Outcome};
use lucent::{ErrorKind, ObjectKind};
use lucent_gl::ContextOptions;

pub fn fixture() -> Outcome {
  let h = Harness::with_options(ContextOptions::new().debug(true))?;
  let ctx = &h.ctx;

  let buffer = ctx.buffer(&[0; 16])?;

  ctx.push_debug_group("labels")?;
  ctx.set_label(ObjectKind::Buffer, buffer.glo(), "sixteen zeros")?;
  ctx.pop_debug_group()?;

  ensure(ctx.push_debug_group("nul\0inside").is_err(), "name with a nul byte")?;

  buffer.release();
  match ctx.set_label(ObjectKind::Buffer, buffer.glo(), "gone") {
    Err(e) if e.kind() == ErrorKind::InvalidObject => (),
    other => return Err(format!("label on a released buffer: {:?}", other).into()),
  }

  ensure_eq(ctx.error(), "GL_NO_ERROR", "driver error")?;

  Ok(())
}
