//! Sources and destinations of data transfers.
//!
//! Uploads read either host bytes or a GPU buffer (through `GL_PIXEL_UNPACK_BUFFER` for images),
//! and downloads write either into host bytes or into a GPU buffer (through
//! `GL_PIXEL_PACK_BUFFER`), in which case the data never travels through the host.

use crate::{
  buffer::Buffer,
  state::{Bind, BufferTarget, GLState},
};
use lucent::{error::check_range, Error, Result};
use std::{ffi::c_void, ptr};

/// Data read by an upload.
#[derive(Clone, Copy, Debug)]
pub enum Source<'a> {
  Bytes(&'a [u8]),
  /// The first bytes of a buffer.
  Buffer(&'a Buffer),
}

impl<'a> From<&'a [u8]> for Source<'a> {
  fn from(bytes: &'a [u8]) -> Self {
    Source::Bytes(bytes)
  }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Source<'a> {
  fn from(bytes: &'a [u8; N]) -> Self {
    Source::Bytes(bytes)
  }
}

impl<'a> From<&'a Vec<u8>> for Source<'a> {
  fn from(bytes: &'a Vec<u8>) -> Self {
    Source::Bytes(bytes)
  }
}

impl<'a> From<&'a Buffer> for Source<'a> {
  fn from(buffer: &'a Buffer) -> Self {
    Source::Buffer(buffer)
  }
}

/// Storage written by a download.
#[derive(Debug)]
pub enum Destination<'a> {
  Bytes(&'a mut [u8]),
  Buffer(&'a Buffer),
}

impl<'a> From<&'a mut [u8]> for Destination<'a> {
  fn from(bytes: &'a mut [u8]) -> Self {
    Destination::Bytes(bytes)
  }
}

impl<'a, const N: usize> From<&'a mut [u8; N]> for Destination<'a> {
  fn from(bytes: &'a mut [u8; N]) -> Self {
    Destination::Bytes(bytes)
  }
}

impl<'a> From<&'a mut Vec<u8>> for Destination<'a> {
  fn from(bytes: &'a mut Vec<u8>) -> Self {
    Destination::Bytes(bytes)
  }
}

impl<'a> From<&'a Buffer> for Destination<'a> {
  fn from(buffer: &'a Buffer) -> Self {
    Destination::Buffer(buffer)
  }
}

/// Bind the unpack buffer for an upload of `expected` bytes and return the data pointer to hand
/// to the driver.
///
/// Host bytes must be exactly `expected` long; a buffer must hold at least `expected` bytes.
pub(crate) unsafe fn begin_unpack(
  gl: &mut GLState,
  source: Source,
  expected: usize,
) -> Result<*const c_void> {
  match source {
    Source::Bytes(bytes) => {
      if bytes.len() != expected {
        return Err(Error::out_of_range(format!(
          "expected {} bytes of image data, got {}",
          expected,
          bytes.len()
        )));
      }

      gl.bind_buffer(BufferTarget::PixelUnpack, 0, Bind::Cached);
      Ok(bytes.as_ptr() as *const c_void)
    }

    Source::Buffer(buffer) => {
      let (_, name) = buffer.live()?;
      check_range("image upload", 0, expected, buffer.size())?;

      gl.bind_buffer(BufferTarget::PixelUnpack, name, Bind::Cached);
      Ok(ptr::null())
    }
  }
}

pub(crate) unsafe fn end_unpack(gl: &mut GLState) {
  gl.bind_buffer(BufferTarget::PixelUnpack, 0, Bind::Cached);
}

/// Bind the pack buffer for a download of `expected` bytes at `write_offset` and return the data
/// pointer to hand to the driver.
pub(crate) unsafe fn begin_pack(
  gl: &mut GLState,
  destination: &mut Destination,
  expected: usize,
  write_offset: usize,
) -> Result<*mut c_void> {
  match destination {
    Destination::Bytes(bytes) => {
      check_range("read destination", write_offset, expected, bytes.len())?;

      gl.bind_buffer(BufferTarget::PixelPack, 0, Bind::Cached);
      Ok(bytes[write_offset..].as_mut_ptr() as *mut c_void)
    }

    Destination::Buffer(buffer) => {
      let (_, name) = buffer.live()?;
      check_range("read destination", write_offset, expected, buffer.size())?;

      gl.bind_buffer(BufferTarget::PixelPack, name, Bind::Cached);
      Ok(write_offset as *mut c_void)
    }
  }
}

pub(crate) unsafe fn end_pack(gl: &mut GLState) {
  gl.bind_buffer(BufferTarget::PixelPack, 0, Bind::Cached);
}
