//! OpenGL buffer implementation.
//!
//! Buffers are untyped byte stores. Every write goes through `GL_COPY_WRITE_BUFFER` and every
//! read through `GL_COPY_READ_BUFFER`, so that no vertex array or indexed binding is disturbed.

use crate::{
  context::{Context, ContextState},
  object::{impl_object, RawObject},
  state::{Bind, BufferTarget},
  transfer::Destination,
};
use gl::types::*;
use lucent::{
  chunk::ChunkLayout,
  error::check_range,
  Error, ObjectKind, Result,
};
use std::{cell::Cell, ffi::c_void, ops::Deref, ptr, rc::Rc, slice};

pub(crate) struct BufferInner {
  pub(crate) raw: RawObject,
  size: Cell<usize>,
  dynamic: bool,
}

/// A GPU buffer.
#[derive(Clone)]
pub struct Buffer(pub(crate) Rc<BufferInner>);

impl_object!(Buffer);

/// Access requested by [`Buffer::map`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MapAccess {
  Read,
  Write,
  ReadWrite,
}

impl MapAccess {
  fn to_bits(self) -> GLbitfield {
    match self {
      MapAccess::Read => gl::MAP_READ_BIT,
      MapAccess::Write => gl::MAP_WRITE_BIT,
      MapAccess::ReadWrite => gl::MAP_READ_BIT | gl::MAP_WRITE_BIT,
    }
  }
}

fn usage(dynamic: bool) -> GLenum {
  if dynamic {
    gl::DYNAMIC_DRAW
  } else {
    gl::STATIC_DRAW
  }
}

/// Resolve an optional size against what is left after `offset`.
fn span(what: &str, size: Option<usize>, offset: usize, total: usize) -> Result<usize> {
  let size = match size {
    Some(size) => size,
    None => total.checked_sub(offset).ok_or_else(|| {
      Error::out_of_range(format!("{} offset {} exceeds size {}", what, offset, total))
    })?,
  };

  check_range(what, offset, size, total)?;
  Ok(size)
}

/// Like `span`, for ranges bound to indexed targets, which can't be empty.
pub(crate) fn block_span(what: &str, size: Option<usize>, offset: usize, total: usize) -> Result<usize> {
  match span(what, size, offset, total)? {
    0 => Err(Error::out_of_range(format!(
      "{} at offset {} of {} bytes is empty",
      what, offset, total
    ))),
    size => Ok(size),
  }
}

impl Context {
  /// A static buffer initialized with `data`.
  pub fn buffer(&self, data: &[u8]) -> Result<Buffer> {
    self.create_buffer(data.len(), Some(data), false)
  }

  /// A buffer initialized with `data`, hinted as frequently updated.
  pub fn dynamic_buffer(&self, data: &[u8]) -> Result<Buffer> {
    self.create_buffer(data.len(), Some(data), true)
  }

  /// A buffer of `size` uninitialized bytes.
  pub fn reserve_buffer(&self, size: usize, dynamic: bool) -> Result<Buffer> {
    self.create_buffer(size, None, dynamic)
  }

  fn create_buffer(&self, size: usize, data: Option<&[u8]>, dynamic: bool) -> Result<Buffer> {
    let state = self.current_state()?;

    if size == 0 {
      return Err(Error::creation("buffers cannot be empty"));
    }

    let name = unsafe {
      let mut name: GLuint = 0;
      gl::GenBuffers(1, &mut name);

      state
        .gl()
        .bind_buffer(BufferTarget::CopyWrite, name, Bind::Forced);
      gl::BufferData(
        gl::COPY_WRITE_BUFFER,
        size as GLsizeiptr,
        data.map_or(ptr::null(), |d| d.as_ptr() as *const c_void),
        usage(dynamic),
      );

      name
    };

    Ok(Buffer(Rc::new(BufferInner {
      raw: RawObject::new(state, ObjectKind::Buffer, name),
      size: Cell::new(size),
      dynamic,
    })))
  }

  /// Copy `size` bytes (everything after `read_offset` if `None`) from `src` into `dst`.
  pub fn copy_buffer(
    &self,
    dst: &Buffer,
    src: &Buffer,
    size: Option<usize>,
    read_offset: usize,
    write_offset: usize,
  ) -> Result<()> {
    self.current_state()?;
    src.copy_to(dst, size, read_offset, write_offset)
  }
}

impl Buffer {
  pub(crate) fn live(&self) -> Result<(Rc<ContextState>, GLuint)> {
    self.0.raw.live()
  }

  /// Size in bytes.
  pub fn size(&self) -> usize {
    self.0.size.get()
  }

  pub fn is_dynamic(&self) -> bool {
    self.0.dynamic
  }

  /// Write `data` at `offset`.
  pub fn write(&self, data: &[u8], offset: usize) -> Result<()> {
    let (state, name) = self.live()?;
    check_range("buffer write", offset, data.len(), self.size())?;

    if data.is_empty() {
      return Ok(());
    }

    unsafe {
      state
        .gl()
        .bind_buffer(BufferTarget::CopyWrite, name, Bind::Cached);
      gl::BufferSubData(
        gl::COPY_WRITE_BUFFER,
        offset as GLintptr,
        data.len() as GLsizeiptr,
        data.as_ptr() as *const c_void,
      );
    }

    Ok(())
  }

  /// Read `size` bytes at `offset`; `None` reads up to the end of the buffer.
  pub fn read(&self, size: Option<usize>, offset: usize) -> Result<Vec<u8>> {
    let size = span("buffer read", size, offset, self.size())?;
    let mut out = vec![0; size];
    self.read_into(&mut out[..], Some(size), offset, 0)?;

    Ok(out)
  }

  /// Read `size` bytes at `offset` into `dst` at `write_offset`.
  ///
  /// When `dst` is a buffer, the copy happens on the GPU.
  pub fn read_into<'a>(
    &self,
    dst: impl Into<Destination<'a>>,
    size: Option<usize>,
    offset: usize,
    write_offset: usize,
  ) -> Result<()> {
    let (state, name) = self.live()?;
    let size = span("buffer read", size, offset, self.size())?;

    match dst.into() {
      Destination::Bytes(bytes) => {
        check_range("read destination", write_offset, size, bytes.len())?;

        if size == 0 {
          return Ok(());
        }

        unsafe {
          state
            .gl()
            .bind_buffer(BufferTarget::CopyRead, name, Bind::Cached);
          gl::GetBufferSubData(
            gl::COPY_READ_BUFFER,
            offset as GLintptr,
            size as GLsizeiptr,
            bytes[write_offset..].as_mut_ptr() as *mut c_void,
          );
        }

        Ok(())
      }

      Destination::Buffer(buffer) => self.copy_to(buffer, Some(size), offset, write_offset),
    }
  }

  fn copy_to(
    &self,
    dst: &Buffer,
    size: Option<usize>,
    read_offset: usize,
    write_offset: usize,
  ) -> Result<()> {
    let (state, src_name) = self.live()?;
    let (_, dst_name) = dst.live()?;
    let size = span("buffer copy", size, read_offset, self.size())?;
    check_range("buffer copy destination", write_offset, size, dst.size())?;

    if size == 0 {
      return Ok(());
    }

    unsafe {
      let mut gl = state.gl();
      gl.bind_buffer(BufferTarget::CopyRead, src_name, Bind::Cached);
      gl.bind_buffer(BufferTarget::CopyWrite, dst_name, Bind::Cached);

      gl::CopyBufferSubData(
        gl::COPY_READ_BUFFER,
        gl::COPY_WRITE_BUFFER,
        read_offset as GLintptr,
        write_offset as GLintptr,
        size as GLsizeiptr,
      );
    }

    Ok(())
  }

  /// Split `data` into `count` equal chunks and write chunk `i` at `start + i * step`.
  ///
  /// Chunks are written in ascending index order: with overlapping chunks, the last one wins.
  pub fn write_chunks(&self, data: &[u8], start: isize, step: isize, count: usize) -> Result<()> {
    let (state, name) = self.live()?;
    let layout = ChunkLayout::for_data(data.len(), start, step, count)?;
    let offsets = layout.offsets(self.size())?;

    if layout.chunk_size == 0 {
      return Ok(());
    }

    unsafe {
      state
        .gl()
        .bind_buffer(BufferTarget::CopyWrite, name, Bind::Cached);

      for (chunk, offset) in data.chunks_exact(layout.chunk_size).zip(offsets) {
        gl::BufferSubData(
          gl::COPY_WRITE_BUFFER,
          offset as GLintptr,
          chunk.len() as GLsizeiptr,
          chunk.as_ptr() as *const c_void,
        );
      }
    }

    Ok(())
  }

  /// Read `count` chunks of `chunk_size` bytes at `start, start + step…`, concatenated.
  pub fn read_chunks(
    &self,
    chunk_size: usize,
    start: isize,
    step: isize,
    count: usize,
  ) -> Result<Vec<u8>> {
    let (state, name) = self.live()?;
    let layout = ChunkLayout::new(chunk_size, start, step, count);
    let offsets = layout.offsets(self.size())?;
    let mut out = vec![0; layout.data_len()];

    if chunk_size == 0 {
      return Ok(out);
    }

    unsafe {
      state
        .gl()
        .bind_buffer(BufferTarget::CopyRead, name, Bind::Cached);

      for (chunk, offset) in out.chunks_exact_mut(chunk_size).zip(offsets) {
        gl::GetBufferSubData(
          gl::COPY_READ_BUFFER,
          offset as GLintptr,
          chunk.len() as GLsizeiptr,
          chunk.as_mut_ptr() as *mut c_void,
        );
      }
    }

    Ok(out)
  }

  /// Fill `size` bytes at `offset` with zeros, or with `chunk` repeated.
  ///
  /// The chunk length must divide the cleared span.
  pub fn clear(&self, size: Option<usize>, offset: usize, chunk: Option<&[u8]>) -> Result<()> {
    self.live()?;
    let size = span("buffer clear", size, offset, self.size())?;

    let data = match chunk {
      None => vec![0; size],

      Some(chunk) => {
        if chunk.is_empty() || size % chunk.len() != 0 {
          return Err(Error::creation(format!(
            "a {} bytes chunk cannot fill {} bytes",
            chunk.len(),
            size
          )));
        }

        chunk.repeat(size / chunk.len())
      }
    };

    self.write(&data, offset)
  }

  /// Reallocate the storage with `size` bytes (the current size if `None`), dropping its
  /// content.
  pub fn orphan(&self, size: Option<usize>) -> Result<()> {
    let (state, name) = self.live()?;
    let size = size.unwrap_or_else(|| self.size());

    if size == 0 {
      return Err(Error::creation("buffers cannot be empty"));
    }

    unsafe {
      let mut gl = state.gl();
      gl.bind_buffer(BufferTarget::CopyWrite, name, Bind::Cached);
      gl::BufferData(
        gl::COPY_WRITE_BUFFER,
        size as GLsizeiptr,
        ptr::null(),
        usage(self.0.dynamic),
      );

      gl.forget_buffer_ranges(name);
    }

    self.0.size.set(size);
    Ok(())
  }

  /// Bind `size` bytes at `offset` (up to the end if `None`) to a uniform block binding.
  ///
  /// `offset` must be a multiple of `Limits::uniform_buffer_offset_alignment`.
  pub fn bind_to_uniform_block(&self, binding: u32, offset: usize, size: Option<usize>) -> Result<()> {
    let (state, name) = self.live()?;
    let size = self.uniform_block_span(&state, binding, offset, size)?;

    unsafe { state.gl().bind_uniform_buffer(binding, name, offset, size) };
    Ok(())
  }

  pub(crate) fn uniform_block_span(
    &self,
    state: &ContextState,
    binding: u32,
    offset: usize,
    size: Option<usize>,
  ) -> Result<usize> {
    let limits = *state.limits();
    let size = block_span("uniform block range", size, offset, self.size())?;

    check_block_binding(
      "uniform buffer",
      binding,
      limits.max_uniform_buffer_bindings,
      offset,
      limits.uniform_buffer_offset_alignment,
    )?;

    Ok(size)
  }

  /// Bind `size` bytes at `offset` (up to the end if `None`) to a storage block binding.
  ///
  /// `offset` must be a multiple of `Limits::shader_storage_buffer_offset_alignment`.
  pub fn bind_to_storage_buffer(
    &self,
    binding: u32,
    offset: usize,
    size: Option<usize>,
  ) -> Result<()> {
    let (state, name) = self.live()?;
    let size = self.storage_block_span(&state, binding, offset, size)?;

    unsafe { state.gl().bind_storage_buffer(binding, name, offset, size) };
    Ok(())
  }

  pub(crate) fn storage_block_span(
    &self,
    state: &ContextState,
    binding: u32,
    offset: usize,
    size: Option<usize>,
  ) -> Result<usize> {
    state.require(
      "shader storage buffers",
      430,
      "GL_ARB_shader_storage_buffer_object",
    )?;

    let limits = *state.limits();
    let size = block_span("storage block range", size, offset, self.size())?;

    check_block_binding(
      "storage buffer",
      binding,
      limits.max_shader_storage_buffer_bindings,
      offset,
      limits.shader_storage_buffer_offset_alignment,
    )?;

    Ok(size)
  }

  /// Map `size` bytes at `offset` (up to the end if `None`) into host memory.
  ///
  /// The buffer is unmapped when the returned guard is dropped.
  pub fn map(&self, offset: usize, size: Option<usize>, access: MapAccess) -> Result<BufferMap> {
    let (state, name) = self.live()?;
    let size = span("buffer map", size, offset, self.size())?;

    if size == 0 {
      return Err(Error::out_of_range("cannot map an empty range"));
    }

    let ptr = unsafe {
      state
        .gl()
        .bind_buffer(BufferTarget::CopyWrite, name, Bind::Cached);
      gl::MapBufferRange(
        gl::COPY_WRITE_BUFFER,
        offset as GLintptr,
        size as GLsizeiptr,
        access.to_bits(),
      ) as *mut u8
    };

    if ptr.is_null() {
      return Err(Error::creation("buffer mapping failed"));
    }

    Ok(BufferMap {
      state,
      name,
      ptr,
      len: size,
      access,
      _buffer: self,
    })
  }
}

fn check_block_binding(
  what: &str,
  binding: u32,
  max_bindings: u32,
  offset: usize,
  alignment: u32,
) -> Result<()> {
  if binding >= max_bindings {
    return Err(Error::out_of_range(format!(
      "{} binding {} exceeds the {} available bindings",
      what, binding, max_bindings
    )));
  }

  if offset % alignment.max(1) as usize != 0 {
    return Err(Error::out_of_range(format!(
      "{} offset {} is not a multiple of the required alignment {}",
      what, offset, alignment
    )));
  }

  Ok(())
}

/// A mapped buffer range.
pub struct BufferMap<'a> {
  state: Rc<ContextState>,
  name: GLuint,
  ptr: *mut u8,
  len: usize,
  access: MapAccess,
  _buffer: &'a Buffer,
}

impl BufferMap<'_> {
  pub fn access(&self) -> MapAccess {
    self.access
  }

  /// Writable view of the range; fails for read-only maps.
  pub fn as_mut_slice(&mut self) -> Result<&mut [u8]> {
    if self.access == MapAccess::Read {
      return Err(Error::creation("the buffer was mapped read-only"));
    }

    Ok(unsafe { slice::from_raw_parts_mut(self.ptr, self.len) })
  }
}

impl Deref for BufferMap<'_> {
  type Target = [u8];

  fn deref(&self) -> &Self::Target {
    unsafe { slice::from_raw_parts(self.ptr, self.len) }
  }
}

impl Drop for BufferMap<'_> {
  fn drop(&mut self) {
    unsafe {
      self
        .state
        .gl()
        .bind_buffer(BufferTarget::CopyWrite, self.name, Bind::Cached);
      gl::UnmapBuffer(gl::COPY_WRITE_BUFFER);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn spans() {
    assert_eq!(span("read", None, 4, 16).unwrap(), 12);
    assert_eq!(span("read", Some(4), 12, 16).unwrap(), 4);
    assert_eq!(span("read", None, 16, 16).unwrap(), 0);
    assert!(span("read", None, 17, 16).is_err());
    assert!(span("read", Some(5), 12, 16).is_err());
  }

  #[test]
  fn block_spans_are_never_empty() {
    assert_eq!(block_span("uniform block range", None, 256, 512).unwrap(), 256);
    assert_eq!(block_span("uniform block range", Some(64), 0, 512).unwrap(), 64);
    assert!(matches!(
      block_span("uniform block range", None, 512, 512),
      Err(Error::OutOfRange(_))
    ));
    assert!(matches!(
      block_span("storage block range", Some(0), 0, 512),
      Err(Error::OutOfRange(_))
    ));
  }

  #[test]
  fn block_bindings() {
    assert!(check_block_binding("uniform buffer", 3, 4, 512, 256).is_ok());
    assert!(check_block_binding("uniform buffer", 4, 4, 0, 256).is_err());
    assert!(check_block_binding("uniform buffer", 0, 4, 128, 256).is_err());
  }
}
