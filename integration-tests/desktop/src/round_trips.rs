//! What is written to buffers and textures reads back unchanged.

use crate::harness::{bytes, ensure, ensure_eq, Harness, Outcome};
use lucent::{texture::Dtype, viewport::Viewport};
use lucent_gl::TextureOptions;

fn pattern(len: usize, seed: u8) -> Vec<u8> {
  (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
}

fn buffers(h: &Harness) -> Outcome {
  let ctx = &h.ctx;
  let buffer = ctx.reserve_buffer(64, false)?;

  for (offset, size) in [(0, 64), (0, 1), (13, 7), (63, 1), (32, 32), (64, 0)] {
    let data = pattern(size, offset as u8);
    buffer.write(&data, offset)?;
    ensure_eq(buffer.read(Some(size), offset)?, data, "buffer range")?;
  }

  ensure(buffer.write(&[0; 2], 63).is_err(), "write past the end")?;
  ensure(buffer.read(Some(1), 64).is_err(), "read past the end")?;

  buffer.clear(None, 0, Some(&[1, 2, 3, 4]))?;
  ensure_eq(buffer.read(Some(8), 0)?, vec![1, 2, 3, 4, 1, 2, 3, 4], "pattern clear")?;
  ensure(
    buffer.clear(Some(6), 0, Some(&[1, 2, 3, 4])).is_err(),
    "pattern not dividing the span",
  )?;

  let other = ctx.reserve_buffer(16, false)?;
  ctx.copy_buffer(&other, &buffer, Some(8), 4, 2)?;
  ensure_eq(other.read(Some(8), 2)?, buffer.read(Some(8), 4)?, "buffer copy")?;

  Ok(())
}

fn chunks(h: &Harness) -> Outcome {
  let buffer = h.ctx.reserve_buffer(48, false)?;

  // 4 chunks of 3 bytes, every 5 bytes from 2; then backwards from the end
  for (start, step) in [(2, 5), (45, -6), (0, 3)] {
    let data = pattern(12, start as u8);
    buffer.write_chunks(&data, start, step, 4)?;
    ensure_eq(buffer.read_chunks(3, start, step, 4)?, data, "chunks")?;
  }

  // overlapping chunks: the last one wins
  buffer.write_chunks(&[1, 1, 2, 2], 0, 1, 2)?;
  ensure_eq(buffer.read(Some(3), 0)?, vec![1, 2, 2], "overlapping chunks")?;

  ensure(buffer.write_chunks(&[0; 4], 46, 1, 2).is_err(), "chunks past the end")?;

  Ok(())
}

fn textures(h: &Harness) -> Outcome {
  let ctx = &h.ctx;

  // a 3-byte wide RGB row needs padding at alignment 4
  for (components, dtype, alignment) in [
    (3, Dtype::F1, 1),
    (3, Dtype::F1, 4),
    (1, Dtype::U2, 2),
    (4, Dtype::U4, 8),
    (2, Dtype::I1, 1),
  ] {
    let row = 5 * components * dtype.size();
    let stride = (row + alignment - 1) / alignment * alignment;
    let data = pattern(stride * 3, components as u8);

    let texture = ctx.texture((5, 3), components, None, TextureOptions::default().dtype(dtype))?;
    texture.write(&data, None, 0, alignment)?;

    let read = texture.read(0, alignment)?;

    // padding bytes are unspecified
    for y in 0..3 {
      let line = y * stride..y * stride + row;
      ensure_eq(&read[line.clone()], &data[line], &format!("{:?} row {}", dtype, y))?;
    }

    texture.release();
  }

  let values: Vec<f32> = (0..4 * 2 * 2).map(|i| i as f32 * 0.375 - 2.).collect();
  let data = bytes(&values);
  let texture = ctx.texture((2, 2), 4, Some((&data).into()), TextureOptions::default().dtype(Dtype::F4))?;
  ensure_eq(texture.read(0, 4)?, data, "float texels")?;
  texture.release();

  let texture = ctx.texture((4, 4), 1, Some((&[0u8; 16]).into()), TextureOptions::default())?;
  texture.write(&[7; 4], Some(Viewport::new(1, 1, 2, 2)?), 0, 1)?;
  ensure_eq(
    texture.read(0, 1)?,
    vec![0, 0, 0, 0, 0, 7, 7, 0, 0, 7, 7, 0, 0, 0, 0, 0],
    "partial write",
  )?;

  ensure(
    texture.write(&[7; 4], Some(Viewport::new(3, 3, 2, 2)?), 0, 1).is_err(),
    "write outside the texture",
  )?;

  Ok(())
}

pub fn fixture() -> Outcome {
  let h = Harness::new()?;

  buffers(&h)?;
  chunks(&h)?;
  textures(&h)?;

  Ok(())
}
