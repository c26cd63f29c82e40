//! Clearing a framebuffer quadrant by quadrant through its scissor.

use crate::harness::{ensure_eq, Harness, Outcome};
use lucent::{texture::Dtype, viewport::Viewport};
use lucent_gl::FramebufferReadOptions;

const RED: [u8; 3] = [255, 0, 0];
const GREEN: [u8; 3] = [0, 255, 0];
const BLUE: [u8; 3] = [0, 0, 255];
const WHITE: [u8; 3] = [255, 255, 255];

pub fn fixture() -> Outcome {
  let h = Harness::new()?;
  let ctx = &h.ctx;

  let color = ctx.renderbuffer((4, 4), 3, 0, Dtype::F1)?;
  let fb = ctx.framebuffer([&color], None)?;

  fb.clear([0., 0., 0., 0.], 1., None)?;

  let quadrants = [
    ((0, 2), [1., 0., 0., 1.]),
    ((2, 2), [0., 1., 0., 1.]),
    ((0, 0), [0., 0., 1., 1.]),
    ((2, 0), [1., 1., 1., 1.]),
  ];

  for ((x, y), rgba) in quadrants {
    fb.set_scissor(Some(Viewport::new(x, y, 2, 2)?))?;
    fb.clear(rgba, 1., None)?;
  }

  fb.set_scissor(None)?;

  let bottom = [BLUE, BLUE, WHITE, WHITE];
  let top = [RED, RED, GREEN, GREEN];
  let expected: Vec<u8> = [bottom, bottom, top, top]
    .iter()
    .flatten()
    .flatten()
    .copied()
    .collect();

  let pixels = fb.read(FramebufferReadOptions::default())?;
  ensure_eq(pixels, expected, "quadrant pixels")?;

  color.release();
  fb.release();

  Ok(())
}
