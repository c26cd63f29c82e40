//! Chunked buffer access.
//!
//! `count` chunks of `chunk_size` bytes at byte offsets `start, start + step, start + 2 * step…`.
//! The step may be negative, in which case the chunks are laid out backward from `start`. Chunks
//! always correspond to the host data in index order, and a write processes them in ascending
//! index order, so that with overlapping chunks the last one wins.

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ChunkLayout {
  pub chunk_size: usize,
  pub start: isize,
  pub step: isize,
  pub count: usize,
}

impl ChunkLayout {
  pub fn new(chunk_size: usize, start: isize, step: isize, count: usize) -> Self {
    ChunkLayout {
      chunk_size,
      start,
      step,
      count,
    }
  }

  /// Layout for writing `data_len` bytes split into `count` equal chunks.
  pub fn for_data(data_len: usize, start: isize, step: isize, count: usize) -> Result<Self> {
    if count == 0 || data_len % count != 0 {
      return Err(Error::out_of_range(format!(
        "{} bytes cannot be split into {} equal chunks",
        data_len, count
      )));
    }

    Ok(Self::new(data_len / count, start, step, count))
  }

  /// Total number of host bytes.
  pub fn data_len(&self) -> usize {
    self.chunk_size * self.count
  }

  /// Byte offset of each chunk, in index order, checked against a buffer of `size` bytes.
  pub fn offsets(&self, size: usize) -> Result<Vec<usize>> {
    (0..self.count)
      .map(|i| {
        let offset = (i as isize)
          .checked_mul(self.step)
          .and_then(|d| self.start.checked_add(d))
          .filter(|&o| o >= 0)
          .map(|o| o as usize)
          .filter(|&o| o.checked_add(self.chunk_size).map_or(false, |end| end <= size));

        offset.ok_or_else(|| {
          Error::out_of_range(format!(
            "chunk {} (start {}, step {}, {} bytes) lies outside of a {} bytes buffer",
            i, self.start, self.step, self.chunk_size, size
          ))
        })
      })
      .collect()
  }
}

/// Scatter `data` into `dst` following `layout`.
pub fn scatter(dst: &mut [u8], data: &[u8], layout: &ChunkLayout) -> Result<()> {
  if data.len() != layout.data_len() {
    return Err(Error::out_of_range(format!(
      "expected {} bytes of chunk data, got {}",
      layout.data_len(),
      data.len()
    )));
  }

  let offsets = layout.offsets(dst.len())?;

  for (chunk, offset) in data.chunks_exact(layout.chunk_size.max(1)).zip(offsets) {
    dst[offset..offset + chunk.len()].copy_from_slice(chunk);
  }

  Ok(())
}

/// Gather the chunks described by `layout` from `src`.
pub fn gather(src: &[u8], layout: &ChunkLayout) -> Result<Vec<u8>> {
  let offsets = layout.offsets(src.len())?;
  let mut out = Vec::with_capacity(layout.data_len());

  for offset in offsets {
    out.extend_from_slice(&src[offset..offset + layout.chunk_size]);
  }

  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn forward_offsets() {
    let layout = ChunkLayout::new(4, 2, 8, 3);
    assert_eq!(layout.offsets(32).unwrap(), [2, 10, 18]);
    assert!(layout.offsets(21).is_err());
  }

  #[test]
  fn backward_offsets() {
    let layout = ChunkLayout::new(4, 12, -4, 4);
    assert_eq!(layout.offsets(16).unwrap(), [12, 8, 4, 0]);

    let past_start = ChunkLayout::new(4, 4, -4, 3);
    assert!(past_start.offsets(16).is_err());
  }

  #[test]
  fn round_trip_reverses_with_negative_step() {
    let mut buf = vec![0u8; 8];
    let layout = ChunkLayout::for_data(8, 6, -2, 4).unwrap();

    scatter(&mut buf, &[1, 2, 3, 4, 5, 6, 7, 8], &layout).unwrap();
    assert_eq!(buf, [7, 8, 5, 6, 3, 4, 1, 2]);
    assert_eq!(gather(&buf, &layout).unwrap(), [1, 2, 3, 4, 5, 6, 7, 8]);
  }

  #[test]
  fn overlapping_chunks_last_wins() {
    let mut buf = vec![0u8; 4];
    let layout = ChunkLayout::for_data(6, 0, 1, 3).unwrap();

    scatter(&mut buf, &[1, 1, 2, 2, 3, 3], &layout).unwrap();
    assert_eq!(buf, [1, 2, 3, 3]);
  }

  #[test]
  fn uneven_data_is_rejected() {
    assert!(ChunkLayout::for_data(7, 0, 4, 2).is_err());
    assert!(ChunkLayout::for_data(8, 0, 4, 0).is_err());
  }
}
