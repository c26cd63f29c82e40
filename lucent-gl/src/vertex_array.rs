//! Vertex arrays.
//!
//! A [`VertexArray`] ties a [`Program`] to the buffers feeding its attributes. Each buffer comes
//! with a format string (see [`lucent::format`]) and the names of the attributes its nodes map to,
//! in order. Names ending with `?` are optional: they are silently skipped when the program has
//! no such attribute (the GLSL compiler removes unused inputs).

use crate::{
  buffer::{block_span, Buffer},
  context::{Context, ContextState},
  object::{impl_object, RawObject},
  program::{apply_subroutines, Program},
  scope::Scope,
  state::{Bind, BufferTarget, GLState},
};
use gl::types::*;
use log::trace;
use lucent::{
  format::{AttributeFormat, Divisor, FormatNode, NodeType},
  mode::Mode,
  shader::types::GlslType,
  Error, ObjectKind, Result,
};
use std::{
  cell::{Cell, RefCell},
  ffi::c_void,
  ptr,
  rc::Rc,
};

/// Size in bytes of an indirect draw command: five `u32`.
pub const INDIRECT_COMMAND_SIZE: usize = 20;

/// A buffer with the layout of its vertices and the attributes it feeds.
#[derive(Clone, Debug)]
pub struct VertexBinding {
  pub buffer: Buffer,
  pub format: String,
  pub attributes: Vec<String>,
  /// Bytes between two consecutive vertices; the format size when `None`.
  pub stride: Option<usize>,
}

impl VertexBinding {
  pub fn new<I, S>(buffer: &Buffer, format: impl Into<String>, attributes: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    VertexBinding {
      buffer: buffer.clone(),
      format: format.into(),
      attributes: attributes.into_iter().map(Into::into).collect(),
      stride: None,
    }
  }

  pub fn stride(self, stride: usize) -> Self {
    VertexBinding {
      stride: Some(stride),
      ..self
    }
  }
}

/// Index buffer of a vertex array.
#[derive(Clone, Debug)]
struct IndexBuffer {
  buffer: Buffer,
  element_size: u32,
}

impl IndexBuffer {
  fn gl_type(&self) -> GLenum {
    match self.element_size {
      1 => gl::UNSIGNED_BYTE,
      2 => gl::UNSIGNED_SHORT,
      _ => gl::UNSIGNED_INT,
    }
  }
}

fn check_element_size(element_size: u32) -> Result<()> {
  match element_size {
    1 | 2 | 4 => Ok(()),
    _ => Err(Error::creation(format!(
      "index element size must be 1, 2 or 4, not {}",
      element_size
    ))),
  }
}

/// A single attribute pointer, as set with `glVertexAttrib*Pointer`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct AttributePointer {
  location: GLuint,
  components: GLint,
  gl_type: GLenum,
  normalized: bool,
  offset: usize,
  stride: GLsizei,
  divisor: u32,
  /// `'f'`, `'i'`, `'u'` or `'d'`: selects the pointer entry point.
  shape: char,
}

impl AttributePointer {
  unsafe fn apply(&self) {
    let offset = ptr::null::<c_void>().wrapping_add(self.offset);

    match self.shape {
      'i' | 'u' if !self.normalized => {
        gl::VertexAttribIPointer(self.location, self.components, self.gl_type, self.stride, offset)
      }

      'd' if self.gl_type == gl::DOUBLE => {
        gl::VertexAttribLPointer(self.location, self.components, self.gl_type, self.stride, offset)
      }

      _ => gl::VertexAttribPointer(
        self.location,
        self.components,
        self.gl_type,
        if self.normalized { gl::TRUE } else { gl::FALSE },
        self.stride,
        offset,
      ),
    }

    gl::VertexAttribDivisor(self.location, self.divisor);
    gl::EnableVertexAttribArray(self.location);
  }
}

/// Pointers of a format node bound to an attribute. Matrices take one location per column.
fn node_pointers(
  name: &str,
  node: &FormatNode,
  offset: usize,
  stride: usize,
  divisor: Divisor,
  location: u32,
  ty: &GlslType,
) -> Result<Vec<AttributePointer>> {
  let columns = ty.rows_length.max(1);

  if node.count % columns != 0 {
    return Err(Error::creation(format!(
      "format node {} does not fit the {} columns of attribute {}",
      node, columns, name
    )));
  }

  let gl_type = node
    .gl_type()
    .ok_or_else(|| Error::creation(format!("format node {} has no scalar type", node)))?;

  let components = node.count / columns;
  let column_bytes = (components * node.size) as usize;

  if components > 4 {
    return Err(Error::creation(format!(
      "format node {} has too many components for attribute {}",
      node, name
    )));
  }

  let shape = match node.ty {
    // integer data fed to float inputs is converted
    NodeType::Int | NodeType::Unsigned if ty.shape == 'f' => 'f',
    _ => ty.shape,
  };

  Ok(
    (0..columns)
      .map(|column| AttributePointer {
        location: location + column,
        components: components as GLint,
        gl_type,
        normalized: node.normalized,
        offset: offset + column as usize * column_bytes,
        stride: stride as GLsizei,
        divisor: divisor.value(),
        shape,
      })
      .collect(),
  )
}

/// Resolved layout of a vertex binding.
struct ResolvedBinding {
  pointers: Vec<AttributePointer>,
  stride: usize,
  divisor: Divisor,
}

fn resolve_binding(program: &Program, binding: &VertexBinding) -> Result<ResolvedBinding> {
  let format = AttributeFormat::parse(&binding.format)?;

  if format.attribute_count() != binding.attributes.len() {
    return Err(Error::creation(format!(
      "format {:?} has {} attributes but {} names were given",
      binding.format,
      format.attribute_count(),
      binding.attributes.len()
    )));
  }

  let stride = match binding.stride {
    Some(stride) if stride < format.stride() => {
      return Err(Error::creation(format!(
        "stride {} is smaller than the {} bytes of format {:?}",
        stride,
        format.stride(),
        binding.format
      )))
    }
    Some(stride) => stride,
    None => format.stride(),
  };

  let mut pointers = Vec::new();

  for ((offset, node), name) in format.attributes().zip(&binding.attributes) {
    let (name, optional) = match name.strip_suffix('?') {
      Some(name) => (name, true),
      None => (name.as_str(), false),
    };

    match program.attribute(name) {
      Some(attribute) => pointers.extend(node_pointers(
        name,
        node,
        offset,
        stride,
        format.divisor(),
        attribute.location,
        &attribute.ty,
      )?),

      None if optional => trace!(target: "lucent::program", "skipping optional attribute {:?}", name),

      None => {
        return Err(Error::lookup(
          "attribute",
          name,
          program.attributes().map(|a| a.name.as_str()),
        ))
      }
    }
  }

  Ok(ResolvedBinding {
    pointers,
    stride,
    divisor: format.divisor(),
  })
}

pub(crate) struct VertexArrayInner {
  pub(crate) raw: RawObject,
  program: Program,
  buffers: RefCell<Vec<Buffer>>,
  index: RefCell<Option<IndexBuffer>>,
  mode: Cell<Mode>,
  vertices: Cell<u32>,
  instances: Cell<u32>,
  subroutines: RefCell<Vec<u32>>,
  scope: RefCell<Option<Scope>>,
}

/// Attribute bindings of a program, and the default parameters of its draws.
#[derive(Clone)]
pub struct VertexArray(pub(crate) Rc<VertexArrayInner>);

impl_object!(VertexArray);

pub struct VertexArrayBuilder<'a> {
  ctx: &'a Context,
  program: Program,
  bindings: Vec<VertexBinding>,
  index: Option<(Buffer, u32)>,
  mode: Option<Mode>,
}

impl Context {
  pub fn vertex_array(&self, program: &Program) -> VertexArrayBuilder<'_> {
    VertexArrayBuilder {
      ctx: self,
      program: program.clone(),
      bindings: Vec::new(),
      index: None,
      mode: None,
    }
  }
}

impl<'a> VertexArrayBuilder<'a> {
  /// Feed `attributes` from `buffer`, laid out as `format`.
  pub fn buffer<I, S>(self, buffer: &Buffer, format: &str, attributes: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.binding(VertexBinding::new(buffer, format, attributes))
  }

  pub fn binding(mut self, binding: VertexBinding) -> Self {
    self.bindings.push(binding);
    self
  }

  pub fn index_buffer(mut self, buffer: &Buffer, element_size: u32) -> Self {
    self.index = Some((buffer.clone(), element_size));
    self
  }

  pub fn mode(mut self, mode: Mode) -> Self {
    self.mode = Some(mode);
    self
  }

  pub fn build(self) -> Result<VertexArray> {
    let state = self.ctx.current_state()?;
    self.program.live()?;

    let index = match self.index {
      Some((buffer, element_size)) => {
        check_element_size(element_size)?;
        buffer.live()?;
        Some(IndexBuffer {
          buffer,
          element_size,
        })
      }
      None => None,
    };

    let resolved = self
      .bindings
      .iter()
      .map(|b| {
        b.buffer.live()?;
        resolve_binding(&self.program, b)
      })
      .collect::<Result<Vec<_>>>()?;

    let max_location = state.limits().max_vertex_attribs;

    if let Some(p) = resolved
      .iter()
      .flat_map(|r| &r.pointers)
      .find(|p| p.location >= max_location)
    {
      return Err(Error::out_of_range(format!(
        "attribute location {} exceeds the {} vertex attributes",
        p.location, max_location
      )));
    }

    // vertices of the first per-vertex buffer, or indices
    let vertices = match index {
      Some(ref index) => index.buffer.size() / index.element_size as usize,
      None => self
        .bindings
        .iter()
        .zip(&resolved)
        .find(|(_, r)| r.divisor == Divisor::PerVertex && r.stride > 0)
        .map_or(0, |(b, r)| b.buffer.size() / r.stride),
    };

    let mut vao: GLuint = 0;

    {
      let mut gl = state.gl();

      unsafe {
        gl::GenVertexArrays(1, &mut vao);

        // force binding the vertex array so that a vertex array recycling this name doesn’t
        // prevent us from binding here
        gl.bind_vertex_array(vao, Bind::Forced);

        for (binding, resolved) in self.bindings.iter().zip(&resolved) {
          if let Some(name) = binding.buffer.glo().name() {
            gl.bind_buffer(BufferTarget::Array, name, Bind::Forced);

            for pointer in &resolved.pointers {
              pointer.apply();
            }
          }
        }

        if let Some(name) = index.as_ref().and_then(|i| i.buffer.glo().name()) {
          gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, name);
        }

        gl.unbind_vertex_array();
      }
    }

    let raw = RawObject::new(state, ObjectKind::VertexArray, vao);
    let default_mode = if self.program.is_transform() {
      Mode::Points
    } else {
      Mode::Triangles
    };

    Ok(VertexArray(Rc::new(VertexArrayInner {
      raw,
      program: self.program,
      buffers: RefCell::new(self.bindings.into_iter().map(|b| b.buffer).collect()),
      index: RefCell::new(index),
      mode: Cell::new(self.mode.unwrap_or(default_mode)),
      vertices: Cell::new(vertices as u32),
      instances: Cell::new(1),
      subroutines: RefCell::new(Vec::new()),
      scope: RefCell::new(None),
    })))
  }
}

/// Parameters of [`VertexArray::render`]. `None` fields fall back to the vertex array’s own.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RenderOptions {
  pub mode: Option<Mode>,
  pub vertices: Option<u32>,
  pub first: u32,
  pub instances: Option<u32>,
}

/// Parameters of [`VertexArray::transform`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TransformOptions {
  pub mode: Option<Mode>,
  pub vertices: Option<u32>,
  pub first: u32,
  pub instances: Option<u32>,
  /// Where captured data starts in the output buffers.
  pub buffer_offset: usize,
}

/// A single attribute binding, for [`VertexArray::bind`].
#[derive(Clone, Debug)]
pub struct AttributeBinding<'a> {
  pub location: u32,
  pub buffer: &'a Buffer,
  /// A single format node, such as `"3f"` or `"4nu1"`.
  pub format: &'a str,
  pub offset: usize,
  pub stride: usize,
  pub divisor: Divisor,
}

impl VertexArray {
  pub(crate) fn live(&self) -> Result<(Rc<ContextState>, GLuint)> {
    self.0.raw.live()
  }

  pub fn program(&self) -> &Program {
    &self.0.program
  }

  pub fn mode(&self) -> Mode {
    self.0.mode.get()
  }

  pub fn set_mode(&self, mode: Mode) {
    self.0.mode.set(mode)
  }

  /// Vertices drawn by default: indices when an index buffer is set.
  pub fn vertices(&self) -> u32 {
    self.0.vertices.get()
  }

  pub fn set_vertices(&self, vertices: u32) {
    self.0.vertices.set(vertices)
  }

  pub fn instances(&self) -> u32 {
    self.0.instances.get()
  }

  pub fn set_instances(&self, instances: u32) {
    self.0.instances.set(instances)
  }

  /// Subroutine selected for every subroutine uniform of the program, in
  /// [`Program::subroutines`] order.
  pub fn subroutines(&self) -> Vec<u32> {
    self.0.subroutines.borrow().clone()
  }

  pub fn set_subroutines(&self, indices: &[u32]) -> Result<()> {
    let expected = self.0.program.subroutines().count();

    if indices.len() != expected && !indices.is_empty() {
      return Err(Error::out_of_range(format!(
        "{} subroutine indices given for {} subroutine uniforms",
        indices.len(),
        expected
      )));
    }

    *self.0.subroutines.borrow_mut() = indices.to_vec();
    Ok(())
  }

  pub fn scope(&self) -> Option<Scope> {
    self.0.scope.borrow().clone()
  }

  /// Scope entered around every draw of this vertex array.
  pub fn set_scope(&self, scope: Option<Scope>) {
    *self.0.scope.borrow_mut() = scope;
  }

  pub fn index_buffer(&self) -> Option<Buffer> {
    self.0.index.borrow().as_ref().map(|i| i.buffer.clone())
  }

  /// Replace the index buffer; `None` makes draws non-indexed.
  pub fn set_index_buffer(&self, index: Option<(&Buffer, u32)>) -> Result<()> {
    let (state, vao) = self.live()?;

    let index = match index {
      Some((buffer, element_size)) => {
        check_element_size(element_size)?;
        let (_, name) = buffer.live()?;
        Some((buffer.clone(), element_size, name))
      }
      None => None,
    };

    unsafe {
      let mut gl = state.gl();
      gl.bind_vertex_array(vao, Bind::Cached);
      gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, index.as_ref().map_or(0, |i| i.2));
    }

    let previous = self.0.index.replace(index.map(|(buffer, element_size, _)| IndexBuffer {
      buffer,
      element_size,
    }));
    drop(previous);

    Ok(())
  }

  /// Bind a single attribute location to a buffer, replacing its previous binding.
  pub fn bind(&self, binding: AttributeBinding) -> Result<()> {
    let (state, vao) = self.live()?;
    let (_, buffer) = binding.buffer.live()?;
    let format = AttributeFormat::parse(binding.format)?;

    let node = match format.nodes() {
      [node] if !node.is_padding() => *node,
      _ => {
        return Err(Error::creation(format!(
          "attribute binding needs a single format node, got {:?}",
          binding.format
        )))
      }
    };

    if binding.location >= state.limits().max_vertex_attribs {
      return Err(Error::out_of_range(format!(
        "attribute location {} exceeds the {} vertex attributes",
        binding.location,
        state.limits().max_vertex_attribs
      )));
    }

    let program = &self.0.program;
    let attribute = program
      .attributes()
      .find(|a| a.location == binding.location)
      .cloned();

    let pointers = match attribute {
      Some(attribute) => node_pointers(
        &attribute.name,
        &node,
        binding.offset,
        binding.stride,
        binding.divisor,
        binding.location,
        &attribute.ty,
      )?,

      // unknown to the program: take the shape of the data
      None => vec![AttributePointer {
        location: binding.location,
        components: node.count.min(4) as GLint,
        gl_type: node.gl_type().unwrap_or(gl::FLOAT),
        normalized: node.normalized,
        offset: binding.offset,
        stride: binding.stride as GLsizei,
        divisor: binding.divisor.value(),
        shape: match (node.ty, node.size) {
          (NodeType::Float, 8) => 'd',
          (NodeType::Int, _) => 'i',
          (NodeType::Unsigned, _) => 'u',
          _ => 'f',
        },
      }],
    };

    unsafe {
      let mut gl = state.gl();
      gl.bind_vertex_array(vao, Bind::Cached);
      gl.bind_buffer(BufferTarget::Array, buffer, Bind::Forced);

      for pointer in &pointers {
        pointer.apply();
      }
    }

    let mut buffers = self.0.buffers.borrow_mut();

    if !buffers.contains(binding.buffer) {
      buffers.push(binding.buffer.clone());
    }

    Ok(())
  }

  /// Use the program and the vertex array for the next draw call.
  unsafe fn prepare(&self, gl: &mut GLState, vao: GLuint, program: GLuint) -> Result<()> {
    gl.use_program(program);
    gl.bind_vertex_array(vao, Bind::Cached);

    let subroutines = self.0.subroutines.borrow();

    if !subroutines.is_empty() {
      apply_subroutines(&self.0.program, &subroutines)?;
    }

    Ok(())
  }

  unsafe fn draw(&self, mode: Mode, first: u32, count: GLsizei, instances: GLsizei) {
    let mode = mode.to_glenum();

    match &*self.0.index.borrow() {
      Some(index) => {
        let first = ptr::null::<c_void>().wrapping_add(first as usize * index.element_size as usize);
        gl::DrawElementsInstanced(mode, count, index.gl_type(), first, instances);
      }

      None => gl::DrawArraysInstanced(mode, first as GLint, count, instances),
    }
  }

  /// Driver name of the program, which must have a fragment shader.
  fn render_program(&self) -> Result<GLuint> {
    let program = &self.0.program;
    let (_, name) = program.live()?;

    if program.is_transform() {
      return Err(Error::creation(
        "render needs a program with a fragment shader",
      ));
    }

    Ok(name)
  }

  /// Draw into the current framebuffer.
  pub fn render(&self, options: RenderOptions) -> Result<()> {
    let (state, vao) = self.live()?;
    let program = self.render_program()?;

    let mode = options.mode.unwrap_or_else(|| self.mode());
    let vertices = gl_count("vertices", options.vertices.unwrap_or_else(|| self.vertices()))?;
    let instances = gl_count("instances", options.instances.unwrap_or_else(|| self.instances()))?;

    let scope = self.scope();
    let _guard = scope.as_ref().map(Scope::enter).transpose()?;

    unsafe {
      self.prepare(&mut state.gl(), vao, program)?;
      self.draw(mode, options.first, vertices, instances);
    }

    Ok(())
  }

  /// Draw `count` commands stored in `buffer`, starting at command `first`. Every command is
  /// [`INDIRECT_COMMAND_SIZE`] bytes; `None` draws every command up to the end of the buffer.
  pub fn render_indirect(
    &self,
    buffer: &Buffer,
    mode: Option<Mode>,
    count: Option<usize>,
    first: usize,
  ) -> Result<()> {
    let (state, vao) = self.live()?;
    let program = self.render_program()?;
    let (_, commands) = buffer.live()?;

    state.require("indirect draws", 430, "GL_ARB_multi_draw_indirect")?;

    let offset = first * INDIRECT_COMMAND_SIZE;
    let count = match count {
      Some(count) => count,
      None => buffer.size().saturating_sub(offset) / INDIRECT_COMMAND_SIZE,
    };

    lucent::error::check_range(
      "indirect commands",
      offset,
      count * INDIRECT_COMMAND_SIZE,
      buffer.size(),
    )?;

    let count = GLsizei::try_from(count)
      .map_err(|_| Error::out_of_range(format!("{} indirect commands are too many", count)))?;

    let scope = self.scope();
    let _guard = scope.as_ref().map(Scope::enter).transpose()?;

    let mode = mode.unwrap_or_else(|| self.mode()).to_glenum();

    unsafe {
      let mut gl = state.gl();
      self.prepare(&mut gl, vao, program)?;
      gl.bind_buffer(BufferTarget::DrawIndirect, commands, Bind::Cached);

      let offset = ptr::null::<c_void>().wrapping_add(offset);

      match &*self.0.index.borrow() {
        Some(index) => gl::MultiDrawElementsIndirect(
          mode,
          index.gl_type(),
          offset,
          count,
          INDIRECT_COMMAND_SIZE as GLsizei,
        ),

        None => gl::MultiDrawArraysIndirect(
          mode,
          offset,
          count,
          INDIRECT_COMMAND_SIZE as GLsizei,
        ),
      }
    }

    Ok(())
  }

  /// Run the vertices through a transform program, capturing its varyings into `outputs`.
  ///
  /// Interleaved programs take a single output buffer; separate ones take one buffer per
  /// varying.
  pub fn transform(&self, outputs: &[&Buffer], options: TransformOptions) -> Result<()> {
    let (state, vao) = self.live()?;
    let program = &self.0.program;
    let (_, program_name) = program.live()?;

    if !program.is_transform() {
      return Err(Error::creation(
        "transform needs a program without fragment shader",
      ));
    }

    let expected = match program.capture_mode() {
      crate::program::CaptureMode::Interleaved => 1,
      crate::program::CaptureMode::Separate => program.varyings().count(),
    };

    if outputs.len() != expected {
      return Err(Error::creation(format!(
        "{} output buffers given, {} expected",
        outputs.len(),
        expected
      )));
    }

    let names = outputs
      .iter()
      .map(|b| {
        let (_, name) = b.live()?;
        let size = block_span("transform output", None, options.buffer_offset, b.size())?;
        Ok((name, size))
      })
      .collect::<Result<Vec<_>>>()?;

    let mode = options.mode.unwrap_or_else(|| self.mode());
    let primitive = program.capture_primitive(mode).ok_or_else(|| {
      Error::creation(format!("no primitive can be captured from {:?}", mode))
    })?;

    let vertices = gl_count("vertices", options.vertices.unwrap_or_else(|| self.vertices()))?;
    let instances = gl_count("instances", options.instances.unwrap_or_else(|| self.instances()))?;

    let scope = self.scope();
    let _guard = scope.as_ref().map(Scope::enter).transpose()?;

    unsafe {
      self.prepare(&mut state.gl(), vao, program_name)?;

      for (i, (name, size)) in names.iter().enumerate() {
        gl::BindBufferRange(
          gl::TRANSFORM_FEEDBACK_BUFFER,
          i as GLuint,
          *name,
          options.buffer_offset as GLintptr,
          *size as GLsizeiptr,
        );
      }

      gl::Enable(gl::RASTERIZER_DISCARD);
      gl::BeginTransformFeedback(primitive.to_glenum());
      self.draw(mode, options.first, vertices, instances);
      gl::EndTransformFeedback();
      gl::Disable(gl::RASTERIZER_DISCARD);
      gl::Flush();
    }

    Ok(())
  }
}

fn gl_count(what: &str, count: u32) -> Result<GLsizei> {
  GLsizei::try_from(count).map_err(|_| {
    Error::out_of_range(format!("{} {} exceed {}", count, what, GLsizei::MAX))
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use lucent::shader::types::lookup;

  fn node(format: &str) -> FormatNode {
    AttributeFormat::parse(format).unwrap().nodes()[0]
  }

  #[test]
  fn vector_attribute_pointer() {
    let vec3 = lookup(gl::FLOAT_VEC3).unwrap();
    let pointers = node_pointers("in_vert", &node("3f"), 8, 20, Divisor::PerVertex, 2, &vec3).unwrap();

    assert_eq!(
      pointers,
      [AttributePointer {
        location: 2,
        components: 3,
        gl_type: gl::FLOAT,
        normalized: false,
        offset: 8,
        stride: 20,
        divisor: 0,
        shape: 'f',
      }]
    );
  }

  #[test]
  fn matrix_takes_one_location_per_column() {
    let mat4 = lookup(gl::FLOAT_MAT4).unwrap();
    let pointers = node_pointers("in_model", &node("16f"), 0, 64, Divisor::PerInstance, 3, &mat4).unwrap();

    assert_eq!(pointers.len(), 4);
    assert_eq!(
      pointers.iter().map(|p| (p.location, p.offset)).collect::<Vec<_>>(),
      [(3, 0), (4, 16), (5, 32), (6, 48)]
    );
    assert!(pointers.iter().all(|p| p.components == 4 && p.divisor == 1));
  }

  #[test]
  fn matrix_needs_whole_columns() {
    let mat3 = lookup(gl::FLOAT_MAT3).unwrap();
    assert!(node_pointers("m", &node("8f"), 0, 32, Divisor::PerVertex, 0, &mat3).is_err());
  }

  #[test]
  fn normalized_bytes_feed_float_inputs() {
    let vec4 = lookup(gl::FLOAT_VEC4).unwrap();
    let pointers = node_pointers("in_color", &node("4nu1"), 12, 16, Divisor::PerVertex, 1, &vec4).unwrap();

    assert_eq!(pointers[0].gl_type, gl::UNSIGNED_BYTE);
    assert!(pointers[0].normalized);
    assert_eq!(pointers[0].shape, 'f');
  }

  #[test]
  fn index_element_sizes() {
    assert!(check_element_size(1).is_ok());
    assert!(check_element_size(2).is_ok());
    assert!(check_element_size(4).is_ok());
    assert!(check_element_size(3).is_err());
    assert!(check_element_size(8).is_err());
  }

  #[test]
  fn draw_counts_fit_gl_sizes() {
    assert_eq!(gl_count("vertices", 3).unwrap(), 3);
    assert_eq!(gl_count("vertices", i32::MAX as u32).unwrap(), i32::MAX);
    assert!(matches!(
      gl_count("instances", i32::MAX as u32 + 1),
      Err(Error::OutOfRange(_))
    ));
  }
}
