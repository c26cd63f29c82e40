//! Clears are idempotent and follow masks and viewports.

use crate::harness::{ensure, ensure_eq, floats, Harness, Outcome};
use lucent::{texture::Dtype, viewport::Viewport};
use lucent_gl::{FramebufferReadOptions, ReadAttachment, TextureOptions};

pub fn fixture() -> Outcome {
  let h = Harness::new()?;
  let ctx = &h.ctx;

  let color = ctx.texture((4, 4), 4, None, TextureOptions::default())?;
  let depth = ctx.depth_renderbuffer((4, 4), 0)?;
  let fb = ctx.framebuffer([&color], Some((&depth).into()))?;

  let rgba = FramebufferReadOptions {
    components: 4,
    ..FramebufferReadOptions::default()
  };
  let depth_read = FramebufferReadOptions {
    attachment: ReadAttachment::Depth,
    dtype: Dtype::F4,
    ..FramebufferReadOptions::default()
  };

  let partial = Some(Viewport::new(1, 0, 2, 3)?);

  fb.clear([0.2, 0.4, 0.6, 0.8], 0.5, None)?;
  fb.clear([1., 0., 1., 0.], 0.25, partial)?;
  let first = fb.read(rgba)?;
  let first_depth = fb.read(depth_read)?;

  fb.clear([0.2, 0.4, 0.6, 0.8], 0.5, None)?;
  fb.clear([1., 0., 1., 0.], 0.25, partial)?;
  ensure_eq(fb.read(rgba)?, first.clone(), "repeated clear")?;
  ensure_eq(fb.read(depth_read)?, first_depth, "repeated depth clear")?;

  // the viewport of a clear doesn't leak into the stored scissor
  ensure_eq(fb.scissor(), None, "scissor after a partial clear")?;

  ensure_eq(pixel(&first, 0, 0), vec![51, 102, 153, 204], "outside of the clear viewport")?;
  ensure_eq(pixel(&first, 1, 2), vec![255, 0, 255, 0], "inside of the clear viewport")?;
  ensure_eq(pixel(&first, 3, 3), vec![51, 102, 153, 204], "above the clear viewport")?;

  // masked channels are preserved
  fb.set_color_mask([true, false, true, false])?;
  fb.clear([0., 1., 0., 1.], 1., None)?;
  fb.set_color_mask([true; 4])?;
  ensure_eq(pixel(&fb.read(rgba)?, 0, 0), vec![0, 102, 0, 204], "masked clear")?;

  fb.set_depth_mask(false)?;
  fb.clear([0.; 4], 1., None)?;
  fb.set_depth_mask(true)?;
  let depths = floats(&fb.read(depth_read)?);
  ensure(
    (depths[0] - 0.5).abs() < 1e-6,
    format!("masked depth clear: got {}", depths[0]),
  )?;

  Ok(())
}

fn pixel(pixels: &[u8], x: usize, y: usize) -> Vec<u8> {
  pixels[(y * 4 + x) * 4..(y * 4 + x) * 4 + 4].to_vec()
}
