//! What happens to dropped handles under each release policy.

use crate::harness::{ensure, ensure_eq, Harness, Outcome};
use lucent::{GcMode, Glo};
use lucent_gl::{ContextOptions, TextureOptions};

fn is_buffer(name: u32) -> bool {
  unsafe { gl::IsBuffer(name) == gl::TRUE }
}

pub fn fixture() -> Outcome {
  let h = Harness::with_options(ContextOptions::new().gc_mode(GcMode::ContextGc))?;
  let ctx = &h.ctx;

  ensure_eq(ctx.gc_mode(), GcMode::ContextGc, "initial mode")?;

  // queued on drop, deleted by gc
  let buffer = ctx.buffer(&[0; 16])?;
  let texture = ctx.texture((1, 1), 4, None, TextureOptions::default())?;
  let name = buffer.glo().name().ok_or("fresh buffer without a name")?;

  drop(buffer);
  drop(texture);
  ensure_eq(ctx.pending_releases(), 2, "queued releases")?;
  ensure(is_buffer(name), "buffer deleted before gc")?;

  ensure_eq(ctx.gc()?, 2, "collected objects")?;
  ensure_eq(ctx.pending_releases(), 0, "queue after gc")?;
  ensure(!is_buffer(name), "buffer left alive by gc")?;
  ensure_eq(ctx.gc()?, 0, "second gc")?;

  // explicitly released objects are never queued
  let buffer = ctx.buffer(&[0; 16])?;
  buffer.release();
  drop(buffer);
  ensure_eq(ctx.pending_releases(), 0, "released then dropped")?;

  // deleted right away
  ctx.set_gc_mode(GcMode::Auto);
  let buffer = ctx.buffer(&[0; 16])?;
  let name = buffer.glo().name().ok_or("fresh buffer without a name")?;
  drop(buffer);
  ensure_eq(ctx.pending_releases(), 0, "auto mode queue")?;
  ensure(!is_buffer(name), "buffer left alive in auto mode")?;

  // leaked until released
  ctx.set_gc_mode(GcMode::Manual);
  let buffer = ctx.buffer(&[0; 16])?;
  let name = buffer.glo().name().ok_or("fresh buffer without a name")?;
  let alias = buffer.clone();
  drop(buffer);
  ensure_eq(ctx.pending_releases(), 0, "manual mode queue")?;
  ensure(is_buffer(name), "buffer deleted in manual mode")?;
  alias.release();
  ensure_eq(alias.glo(), Glo::Invalid, "released alias")?;
  ensure(!is_buffer(name), "buffer left alive by release")?;

  Ok(())
}
