//! Texture and framebuffer reads into buffers.

use crate::harness::{ensure_eq, Harness, Outcome};
use lucent_gl::{FramebufferReadOptions, TextureOptions};

pub fn fixture() -> Outcome {
  let h = Harness::new()?;
  let ctx = &h.ctx;

  let pixels: Vec<u8> = [0x10, 0x20, 0x30].repeat(64);

  let texture = ctx.texture((8, 8), 3, None, TextureOptions::default())?;
  texture.write(&pixels, None, 0, 1)?;

  let pbo = ctx.reserve_buffer(192, false)?;
  texture.read_into(&pbo, 0, 1, 0)?;
  ensure_eq(pbo.read(None, 0)?, pixels.clone(), "texture pixels packed in a buffer")?;

  // and back, unpacking from the buffer
  let copy = ctx.texture((8, 8), 3, None, TextureOptions::default())?;
  copy.write(&pbo, None, 0, 1)?;
  ensure_eq(copy.read(0, 1)?, pixels.clone(), "texture unpacked from a buffer")?;

  let fb = ctx.framebuffer([&copy], None)?;
  let from_fb = ctx.reserve_buffer(192, false)?;
  fb.read_into(&from_fb, FramebufferReadOptions::default(), 0)?;
  ensure_eq(from_fb.read(None, 0)?, pixels, "framebuffer pixels packed in a buffer")?;

  Ok(())
}
