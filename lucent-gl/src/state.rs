//! Graphics state.
//!
//! Every context owns a [`GLState`]: a cache of the driver state lucent touches, so that binding
//! the same object twice, or setting the same render state twice, issues a single driver call.

use gl::types::*;
use lucent::{
  blending::{BlendEquations, BlendFunc, Equation, Factor},
  depth_test::DepthComparison,
  face_culling::{FaceCullingMode, FaceCullingOrder},
  state::{EnableFlags, PolygonOffset, ProvokingVertex},
  viewport::ColorMask,
  ObjectKind,
};

/// Cached value.
///
/// A cached value is used to prevent issuing costy GPU commands if we know the target value is
/// already set to what the command tries to set. For instance, if you ask to use a texture ID
/// `34` once, that value will be set on the GPU and cached on our side. Later, if no other texture
/// setting has occurred, if you ask to use the texture ID `34` again, because the value is cached,
/// we know the GPU is already using it, so we don’t have to perform anything GPU-wise.
///
/// An empty cached value is always invalid, which forces the next setter to reach the driver.
#[derive(Debug)]
struct Cached<T>(Option<T>)
where
  T: PartialEq;

impl<T> Cached<T>
where
  T: PartialEq,
{
  /// Cache a value.
  fn new(initial: T) -> Self {
    Cached(Some(initial))
  }

  /// A value that the driver has but that we don’t know about.
  fn unknown() -> Self {
    Cached(None)
  }

  /// Explicitly invalidate a value.
  ///
  /// This is necessary when we want to be able to force a GPU command to run.
  fn invalidate(&mut self) {
    self.0 = None;
  }

  fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  /// Check if the cached value is invalid regarding a value.
  ///
  /// A non-cached value (i.e. empty) is always invalid whatever compared value. If a value is
  /// already cached, then it’s invalid if it’s not equal ([`PartialEq`]) to the input value.
  fn is_invalid(&self, new_val: &T) -> bool {
    match &self.0 {
      Some(ref t) => t != new_val,
      _ => true,
    }
  }
}

/// Should the binding be cached or forced to the provided value?
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Bind {
  Forced,
  Cached,
}

/// Non-indexed buffer binding points used by lucent.
///
/// `GL_ELEMENT_ARRAY_BUFFER` is missing on purpose: it belongs to the bound vertex array and is
/// only ever set while building one.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum BufferTarget {
  Array,
  CopyRead,
  CopyWrite,
  PixelPack,
  PixelUnpack,
  DrawIndirect,
  DispatchIndirect,
}

impl BufferTarget {
  const COUNT: usize = 7;

  pub(crate) fn to_glenum(self) -> GLenum {
    match self {
      BufferTarget::Array => gl::ARRAY_BUFFER,
      BufferTarget::CopyRead => gl::COPY_READ_BUFFER,
      BufferTarget::CopyWrite => gl::COPY_WRITE_BUFFER,
      BufferTarget::PixelPack => gl::PIXEL_PACK_BUFFER,
      BufferTarget::PixelUnpack => gl::PIXEL_UNPACK_BUFFER,
      BufferTarget::DrawIndirect => gl::DRAW_INDIRECT_BUFFER,
      BufferTarget::DispatchIndirect => gl::DISPATCH_INDIRECT_BUFFER,
    }
  }
}

/// A range of a buffer bound to an indexed binding point.
type BufferRange = (GLuint, GLintptr, GLsizeiptr);

/// Indexed buffer binding as reported by the driver.
pub(crate) type IndexedBinding = BufferRange;

/// The graphics state.
///
/// This type represents the current state of a given graphics context. It acts as a
/// forward-gate to all the exposed features from the low-level API but adds a small cache layer
/// over it to prevent from issuing the same API call (with the same parameters).
#[derive(Debug)]
pub(crate) struct GLState {
  // capabilities
  enable_flags: Cached<EnableFlags>,
  scissor_test: Cached<bool>,

  // viewport and scissor
  viewport: Cached<[GLint; 4]>,
  scissor_box: Cached<[GLint; 4]>,

  // write masks
  color_masks: Cached<Vec<ColorMask>>,
  depth_mask: Cached<bool>,

  // blending
  blend_func: Cached<BlendFunc>,
  blend_equations: Cached<BlendEquations>,

  // depth test
  depth_func: Cached<DepthComparison>,

  // face culling
  front_face: Cached<FaceCullingOrder>,
  cull_face: Cached<FaceCullingMode>,

  // rasterization
  wireframe: Cached<bool>,
  point_size: Cached<f32>,
  line_width: Cached<f32>,
  polygon_offset: Cached<PolygonOffset>,
  provoking_vertex: Cached<ProvokingVertex>,

  // patch primitive vertex number
  patch_vertices: Cached<u32>,

  // pixel store
  pack_alignment: Cached<GLint>,
  unpack_alignment: Cached<GLint>,

  // texture
  current_texture_unit: Cached<u32>,
  bound_textures: Vec<(GLenum, GLuint)>,
  bound_samplers: Vec<GLuint>,

  // buffers
  bound_buffers: [GLuint; BufferTarget::COUNT],
  bound_uniform_buffers: Vec<Option<BufferRange>>,
  bound_storage_buffers: Vec<Option<BufferRange>>,

  // framebuffer
  bound_draw_framebuffer: Cached<GLuint>,
  bound_read_framebuffer: Cached<GLuint>,

  // vertex array
  bound_vertex_array: Cached<GLuint>,

  // shader program
  current_program: Cached<GLuint>,
}

impl GLState {
  /// Build the state of the currently bound OpenGL context.
  ///
  /// Values lucent resets on context creation are left unknown; the others are read back from
  /// the driver.
  pub(crate) unsafe fn from_context() -> Self {
    GLState {
      enable_flags: Cached::unknown(),
      scissor_test: Cached::unknown(),
      viewport: Cached::new(get_ctx_viewport()),
      scissor_box: Cached::unknown(),
      color_masks: Cached::unknown(),
      depth_mask: Cached::unknown(),
      blend_func: Cached::unknown(),
      blend_equations: Cached::unknown(),
      depth_func: Cached::unknown(),
      front_face: Cached::unknown(),
      cull_face: Cached::unknown(),
      wireframe: Cached::unknown(),
      point_size: Cached::unknown(),
      line_width: Cached::unknown(),
      polygon_offset: Cached::unknown(),
      provoking_vertex: Cached::unknown(),
      patch_vertices: Cached::unknown(),
      pack_alignment: Cached::unknown(),
      unpack_alignment: Cached::unknown(),
      current_texture_unit: Cached::new(get_ctx_current_texture_unit()),
      bound_textures: Vec::new(),
      bound_samplers: Vec::new(),
      bound_buffers: [0; BufferTarget::COUNT],
      bound_uniform_buffers: Vec::new(),
      bound_storage_buffers: Vec::new(),
      bound_draw_framebuffer: Cached::new(get_ctx_bound_framebuffer(gl::DRAW_FRAMEBUFFER_BINDING)),
      bound_read_framebuffer: Cached::new(get_ctx_bound_framebuffer(gl::READ_FRAMEBUFFER_BINDING)),
      bound_vertex_array: Cached::new(get_ctx_bound_vertex_array()),
      current_program: Cached::new(get_ctx_current_program()),
    }
  }

  /// Force the render states lucent exposes to their initial values.
  pub(crate) unsafe fn reset(&mut self, patch_vertices: bool) {
    self.set_enable_flags(EnableFlags::NOTHING);
    self.set_blend_func(BlendFunc::alpha());
    self.set_blend_equations(BlendEquations::default());
    self.set_depth_func(DepthComparison::default());
    self.set_front_face(FaceCullingOrder::default());
    self.set_cull_face(FaceCullingMode::default());
    self.set_wireframe(false);
    self.set_point_size(1.);
    self.set_line_width(1.);
    self.set_polygon_offset(PolygonOffset::default());
    self.set_provoking_vertex(ProvokingVertex::default());
    self.set_pack_alignment(1);
    self.set_unpack_alignment(1);

    if patch_vertices {
      self.set_patch_vertices(3);
    }
  }

  pub(crate) fn invalidate_vertex_array(&mut self) {
    self.bound_vertex_array.invalidate();
  }

  pub(crate) fn invalidate_shader_program(&mut self) {
    self.current_program.invalidate();
  }

  pub(crate) fn invalidate_framebuffer(&mut self) {
    self.bound_draw_framebuffer.invalidate();
    self.bound_read_framebuffer.invalidate();
  }

  pub(crate) fn invalidate_bound_textures(&mut self) {
    self.current_texture_unit.invalidate();
    self.bound_textures.clear();
    self.bound_samplers.clear();
  }

  pub(crate) fn invalidate_bound_buffers(&mut self) {
    self.bound_buffers = [0; BufferTarget::COUNT];
    self.bound_uniform_buffers.clear();
    self.bound_storage_buffers.clear();
  }

  pub(crate) fn invalidate_viewport(&mut self) {
    self.viewport.invalidate();
    self.scissor_box.invalidate();
    self.scissor_test.invalidate();
  }

  pub(crate) fn invalidate_render_states(&mut self) {
    self.enable_flags.invalidate();
    self.color_masks.invalidate();
    self.depth_mask.invalidate();
    self.blend_func.invalidate();
    self.blend_equations.invalidate();
    self.depth_func.invalidate();
    self.front_face.invalidate();
    self.cull_face.invalidate();
    self.wireframe.invalidate();
    self.point_size.invalidate();
    self.line_width.invalidate();
    self.polygon_offset.invalidate();
    self.provoking_vertex.invalidate();
    self.patch_vertices.invalidate();
    self.pack_alignment.invalidate();
    self.unpack_alignment.invalidate();
  }

  /// Capabilities currently enabled.
  pub(crate) fn enable_flags(&self) -> EnableFlags {
    self.enable_flags.0.unwrap_or(EnableFlags::NOTHING)
  }

  pub(crate) unsafe fn set_enable_flags(&mut self, flags: EnableFlags) {
    let known = self.enable_flags.0;

    for (flag, capability) in EnableFlags::capabilities() {
      let on = flags.contains(flag);

      if known.map_or(true, |k| k.contains(flag) != on) {
        if on {
          gl::Enable(capability);
        } else {
          gl::Disable(capability);
        }
      }
    }

    self.enable_flags.set(flags);
  }

  pub(crate) unsafe fn set_viewport(&mut self, viewport: [GLint; 4]) {
    if self.viewport.is_invalid(&viewport) {
      gl::Viewport(viewport[0], viewport[1], viewport[2], viewport[3]);
      self.viewport.set(viewport);
    }
  }

  /// Enable the scissor test with a region, or disable it.
  pub(crate) unsafe fn set_scissor(&mut self, scissor: Option<[GLint; 4]>) {
    let test = scissor.is_some();

    if self.scissor_test.is_invalid(&test) {
      if test {
        gl::Enable(gl::SCISSOR_TEST);
      } else {
        gl::Disable(gl::SCISSOR_TEST);
      }

      self.scissor_test.set(test);
    }

    if let Some(b) = scissor {
      if self.scissor_box.is_invalid(&b) {
        gl::Scissor(b[0], b[1], b[2], b[3]);
        self.scissor_box.set(b);
      }
    }
  }

  /// Color write masks of the draw buffers, in draw buffer order.
  pub(crate) unsafe fn set_color_masks(&mut self, masks: &[ColorMask]) {
    if self.color_masks.is_invalid(&masks.to_vec()) {
      for (i, ColorMask([r, g, b, a])) in masks.iter().enumerate() {
        gl::ColorMaski(
          i as GLuint,
          *r as GLboolean,
          *g as GLboolean,
          *b as GLboolean,
          *a as GLboolean,
        );
      }

      self.color_masks.set(masks.to_vec());
    }
  }

  pub(crate) unsafe fn set_depth_mask(&mut self, mask: bool) {
    if self.depth_mask.is_invalid(&mask) {
      gl::DepthMask(mask as GLboolean);
      self.depth_mask.set(mask);
    }
  }

  pub(crate) fn blend_func(&self) -> BlendFunc {
    self.blend_func.0.unwrap_or_else(BlendFunc::alpha)
  }

  pub(crate) unsafe fn set_blend_func(&mut self, func: BlendFunc) {
    if self.blend_func.is_invalid(&func) {
      gl::BlendFuncSeparate(
        from_blending_factor(func.src_rgb),
        from_blending_factor(func.dst_rgb),
        from_blending_factor(func.src_alpha),
        from_blending_factor(func.dst_alpha),
      );

      self.blend_func.set(func);
    }
  }

  pub(crate) fn blend_equations(&self) -> BlendEquations {
    self.blend_equations.0.unwrap_or_default()
  }

  pub(crate) unsafe fn set_blend_equations(&mut self, equations: BlendEquations) {
    if self.blend_equations.is_invalid(&equations) {
      gl::BlendEquationSeparate(
        from_blending_equation(equations.rgb),
        from_blending_equation(equations.alpha),
      );

      self.blend_equations.set(equations);
    }
  }

  pub(crate) fn depth_func(&self) -> DepthComparison {
    self.depth_func.0.unwrap_or_default()
  }

  pub(crate) unsafe fn set_depth_func(&mut self, func: DepthComparison) {
    if self.depth_func.is_invalid(&func) {
      gl::DepthFunc(depth_comparison_to_glenum(func));
      self.depth_func.set(func);
    }
  }

  pub(crate) unsafe fn set_front_face(&mut self, order: FaceCullingOrder) {
    if self.front_face.is_invalid(&order) {
      match order {
        FaceCullingOrder::CW => gl::FrontFace(gl::CW),
        FaceCullingOrder::CCW => gl::FrontFace(gl::CCW),
      }

      self.front_face.set(order);
    }
  }

  pub(crate) unsafe fn set_cull_face(&mut self, mode: FaceCullingMode) {
    if self.cull_face.is_invalid(&mode) {
      match mode {
        FaceCullingMode::Front => gl::CullFace(gl::FRONT),
        FaceCullingMode::Back => gl::CullFace(gl::BACK),
        FaceCullingMode::Both => gl::CullFace(gl::FRONT_AND_BACK),
      }

      self.cull_face.set(mode);
    }
  }

  pub(crate) unsafe fn set_wireframe(&mut self, wireframe: bool) {
    if self.wireframe.is_invalid(&wireframe) {
      let mode = if wireframe { gl::LINE } else { gl::FILL };
      gl::PolygonMode(gl::FRONT_AND_BACK, mode);
      self.wireframe.set(wireframe);
    }
  }

  pub(crate) unsafe fn set_point_size(&mut self, size: f32) {
    if self.point_size.is_invalid(&size) {
      gl::PointSize(size);
      self.point_size.set(size);
    }
  }

  pub(crate) unsafe fn set_line_width(&mut self, width: f32) {
    if self.line_width.is_invalid(&width) {
      gl::LineWidth(width);
      self.line_width.set(width);
    }
  }

  pub(crate) unsafe fn set_polygon_offset(&mut self, offset: PolygonOffset) {
    if self.polygon_offset.is_invalid(&offset) {
      let fill = offset.factor != 0. || offset.units != 0.;

      for capability in [gl::POLYGON_OFFSET_POINT, gl::POLYGON_OFFSET_LINE, gl::POLYGON_OFFSET_FILL] {
        if fill {
          gl::Enable(capability);
        } else {
          gl::Disable(capability);
        }
      }

      gl::PolygonOffset(offset.factor, offset.units);
      self.polygon_offset.set(offset);
    }
  }

  pub(crate) unsafe fn set_provoking_vertex(&mut self, vertex: ProvokingVertex) {
    if self.provoking_vertex.is_invalid(&vertex) {
      match vertex {
        ProvokingVertex::First => gl::ProvokingVertex(gl::FIRST_VERTEX_CONVENTION),
        ProvokingVertex::Last => gl::ProvokingVertex(gl::LAST_VERTEX_CONVENTION),
      }

      self.provoking_vertex.set(vertex);
    }
  }

  pub(crate) fn patch_vertices(&self) -> u32 {
    self.patch_vertices.0.unwrap_or(3)
  }

  pub(crate) unsafe fn set_patch_vertices(&mut self, nb: u32) {
    if self.patch_vertices.is_invalid(&nb) {
      gl::PatchParameteri(gl::PATCH_VERTICES, nb as GLint);
      self.patch_vertices.set(nb);
    }
  }

  pub(crate) unsafe fn set_pack_alignment(&mut self, alignment: GLint) {
    if self.pack_alignment.is_invalid(&alignment) {
      gl::PixelStorei(gl::PACK_ALIGNMENT, alignment);
      self.pack_alignment.set(alignment);
    }
  }

  pub(crate) unsafe fn set_unpack_alignment(&mut self, alignment: GLint) {
    if self.unpack_alignment.is_invalid(&alignment) {
      gl::PixelStorei(gl::UNPACK_ALIGNMENT, alignment);
      self.unpack_alignment.set(alignment);
    }
  }

  pub(crate) unsafe fn set_texture_unit(&mut self, unit: u32) {
    if self.current_texture_unit.is_invalid(&unit) {
      gl::ActiveTexture(gl::TEXTURE0 + unit);
      self.current_texture_unit.set(unit);
    }
  }

  /// Bind a texture to the current texture unit.
  pub(crate) unsafe fn bind_texture(&mut self, target: GLenum, handle: GLuint) {
    let unit = match self.current_texture_unit.0 {
      Some(unit) => unit as usize,

      None => {
        self.set_texture_unit(0);
        0
      }
    };

    match self.bound_textures.get(unit).cloned() {
      Some((target_, handle_)) if target != target_ || handle != handle_ => {
        gl::BindTexture(target, handle);
        self.bound_textures[unit] = (target, handle);
      }

      None => {
        gl::BindTexture(target, handle);

        // not enough registered texture units; let’s grow a bit more
        self.bound_textures.resize(unit + 1, (gl::TEXTURE_2D, 0));
        self.bound_textures[unit] = (target, handle);
      }

      _ => (), // cached
    }
  }

  /// Bind a texture to a given unit.
  pub(crate) unsafe fn bind_texture_to_unit(&mut self, unit: u32, target: GLenum, handle: GLuint) {
    self.set_texture_unit(unit);
    self.bind_texture(target, handle);
  }

  /// Read back the texture bound to `target` of `unit` from the driver.
  pub(crate) unsafe fn texture_binding(&mut self, unit: u32, target: GLenum) -> GLuint {
    self.set_texture_unit(unit);

    let mut bound = 0 as GLint;
    gl::GetIntegerv(texture_binding_query(target), &mut bound);
    bound as GLuint
  }

  pub(crate) unsafe fn bind_sampler(&mut self, unit: u32, handle: GLuint) {
    let unit_ = unit as usize;

    match self.bound_samplers.get(unit_) {
      Some(&handle_) if handle == handle_ => (), // cached

      _ => {
        gl::BindSampler(unit, handle);

        if self.bound_samplers.len() <= unit_ {
          self.bound_samplers.resize(unit_ + 1, 0);
        }

        self.bound_samplers[unit_] = handle;
      }
    }
  }

  pub(crate) unsafe fn sampler_binding(&mut self, unit: u32) -> GLuint {
    self.set_texture_unit(unit);

    let mut bound = 0 as GLint;
    gl::GetIntegerv(gl::SAMPLER_BINDING, &mut bound);
    bound as GLuint
  }

  pub(crate) unsafe fn bind_buffer(&mut self, target: BufferTarget, handle: GLuint, bind: Bind) {
    let slot = &mut self.bound_buffers[target as usize];

    if bind == Bind::Forced || *slot != handle {
      gl::BindBuffer(target.to_glenum(), handle);
      *slot = handle;
    }
  }

  /// Bind a buffer range to an indexed `GL_UNIFORM_BUFFER` binding.
  pub(crate) unsafe fn bind_uniform_buffer(
    &mut self,
    binding: u32,
    handle: GLuint,
    offset: usize,
    size: usize,
  ) {
    bind_buffer_range(
      &mut self.bound_uniform_buffers,
      gl::UNIFORM_BUFFER,
      binding,
      (handle, offset as GLintptr, size as GLsizeiptr),
    );
  }

  /// Bind a buffer range to an indexed `GL_SHADER_STORAGE_BUFFER` binding.
  pub(crate) unsafe fn bind_storage_buffer(
    &mut self,
    binding: u32,
    handle: GLuint,
    offset: usize,
    size: usize,
  ) {
    bind_buffer_range(
      &mut self.bound_storage_buffers,
      gl::SHADER_STORAGE_BUFFER,
      binding,
      (handle, offset as GLintptr, size as GLsizeiptr),
    );
  }

  /// `(buffer, offset, size)` the driver has bound to a uniform buffer binding. A zero size
  /// means the whole buffer.
  pub(crate) unsafe fn uniform_buffer_binding(&self, binding: u32) -> IndexedBinding {
    indexed_binding(
      [
        gl::UNIFORM_BUFFER_BINDING,
        gl::UNIFORM_BUFFER_START,
        gl::UNIFORM_BUFFER_SIZE,
      ],
      binding,
    )
  }

  pub(crate) unsafe fn storage_buffer_binding(&self, binding: u32) -> IndexedBinding {
    indexed_binding(
      [
        gl::SHADER_STORAGE_BUFFER_BINDING,
        gl::SHADER_STORAGE_BUFFER_START,
        gl::SHADER_STORAGE_BUFFER_SIZE,
      ],
      binding,
    )
  }

  /// Put back a binding read with `uniform_buffer_binding`.
  pub(crate) unsafe fn restore_uniform_buffer(&mut self, binding: u32, bound: IndexedBinding) {
    restore_buffer_range(
      &mut self.bound_uniform_buffers,
      gl::UNIFORM_BUFFER,
      binding,
      bound,
    );
  }

  pub(crate) unsafe fn restore_storage_buffer(&mut self, binding: u32, bound: IndexedBinding) {
    restore_buffer_range(
      &mut self.bound_storage_buffers,
      gl::SHADER_STORAGE_BUFFER,
      binding,
      bound,
    );
  }

  /// Forget a buffer that was just reallocated, so that the next indexed binding reaches the
  /// driver.
  pub(crate) fn forget_buffer_ranges(&mut self, handle: GLuint) {
    for range in self
      .bound_uniform_buffers
      .iter_mut()
      .chain(self.bound_storage_buffers.iter_mut())
    {
      if matches!(range, Some((h, _, _)) if *h == handle) {
        *range = None;
      }
    }
  }

  pub(crate) unsafe fn bind_draw_framebuffer(&mut self, handle: GLuint) {
    if self.bound_draw_framebuffer.is_invalid(&handle) {
      gl::BindFramebuffer(gl::DRAW_FRAMEBUFFER, handle);
      self.bound_draw_framebuffer.set(handle);
    }
  }

  pub(crate) unsafe fn bind_read_framebuffer(&mut self, handle: GLuint) {
    if self.bound_read_framebuffer.is_invalid(&handle) {
      gl::BindFramebuffer(gl::READ_FRAMEBUFFER, handle);
      self.bound_read_framebuffer.set(handle);
    }
  }

  pub(crate) unsafe fn bind_vertex_array(&mut self, handle: GLuint, bind: Bind) {
    if bind == Bind::Forced || self.bound_vertex_array.is_invalid(&handle) {
      gl::BindVertexArray(handle);
      self.bound_vertex_array.set(handle);
    }
  }

  pub(crate) unsafe fn unbind_vertex_array(&mut self) {
    self.bind_vertex_array(0, Bind::Cached)
  }

  pub(crate) unsafe fn use_program(&mut self, handle: GLuint) {
    if self.current_program.is_invalid(&handle) {
      gl::UseProgram(handle);
      self.current_program.set(handle);
    }
  }

  /// Delete a driver object, dropping every cached binding that refers to it.
  ///
  /// Names are recycled by the driver, so a stale cache entry would otherwise match a future
  /// object.
  pub(crate) unsafe fn delete_object(&mut self, kind: ObjectKind, name: GLuint) {
    match kind {
      ObjectKind::Buffer => {
        for slot in self.bound_buffers.iter_mut().filter(|h| **h == name) {
          *slot = 0;
        }

        self.forget_buffer_ranges(name);
        gl::DeleteBuffers(1, &name);
      }

      ObjectKind::Texture => {
        for binding in self.bound_textures.iter_mut().filter(|(_, h)| *h == name) {
          binding.1 = 0;
        }

        gl::DeleteTextures(1, &name);
      }

      ObjectKind::Sampler => {
        for binding in self.bound_samplers.iter_mut().filter(|h| **h == name) {
          *binding = 0;
        }

        gl::DeleteSamplers(1, &name);
      }

      ObjectKind::Renderbuffer => gl::DeleteRenderbuffers(1, &name),

      ObjectKind::Framebuffer => {
        if self.bound_draw_framebuffer.0 == Some(name) {
          self.bound_draw_framebuffer.set(0);
        }

        if self.bound_read_framebuffer.0 == Some(name) {
          self.bound_read_framebuffer.set(0);
        }

        gl::DeleteFramebuffers(1, &name);
      }

      ObjectKind::Program => {
        // a deleted program stays in use until another one replaces it
        if self.current_program.0 == Some(name) {
          self.current_program.invalidate();
        }

        gl::DeleteProgram(name);
      }

      ObjectKind::VertexArray => {
        if self.bound_vertex_array.0 == Some(name) {
          self.bound_vertex_array.set(0);
        }

        gl::DeleteVertexArrays(1, &name);
      }

      ObjectKind::Query => gl::DeleteQueries(1, &name),
    }
  }
}

unsafe fn indexed_binding([name, start, size]: [GLenum; 3], binding: u32) -> IndexedBinding {
  let mut handle: GLint = 0;
  let mut offset: GLint64 = 0;
  let mut len: GLint64 = 0;

  gl::GetIntegeri_v(name, binding, &mut handle);
  gl::GetInteger64i_v(start, binding, &mut offset);
  gl::GetInteger64i_v(size, binding, &mut len);

  (handle as GLuint, offset as GLintptr, len as GLsizeiptr)
}

unsafe fn restore_buffer_range(
  cache: &mut Vec<Option<BufferRange>>,
  target: GLenum,
  binding: u32,
  bound: IndexedBinding,
) {
  match bound {
    (handle, _, size) if handle == 0 || size == 0 => {
      // nothing or a whole buffer was bound
      gl::BindBufferBase(target, binding, handle);

      if let Some(slot) = cache.get_mut(binding as usize) {
        *slot = None;
      }
    }

    range => bind_buffer_range(cache, target, binding, range),
  }
}

unsafe fn bind_buffer_range(
  cache: &mut Vec<Option<BufferRange>>,
  target: GLenum,
  binding: u32,
  range: BufferRange,
) {
  let binding_ = binding as usize;

  match cache.get(binding_) {
    Some(Some(range_)) if *range_ == range => (), // cached

    _ => {
      gl::BindBufferRange(target, binding, range.0, range.1, range.2);

      // not enough registered buffer bindings; let’s grow a bit more
      if cache.len() <= binding_ {
        cache.resize(binding_ + 1, None);
      }

      cache[binding_] = Some(range);
    }
  }
}

#[inline]
pub(crate) fn from_blending_equation(equation: Equation) -> GLenum {
  match equation {
    Equation::Additive => gl::FUNC_ADD,
    Equation::Subtract => gl::FUNC_SUBTRACT,
    Equation::ReverseSubtract => gl::FUNC_REVERSE_SUBTRACT,
    Equation::Min => gl::MIN,
    Equation::Max => gl::MAX,
  }
}

#[inline]
pub(crate) fn from_blending_factor(factor: Factor) -> GLenum {
  match factor {
    Factor::One => gl::ONE,
    Factor::Zero => gl::ZERO,
    Factor::SrcColor => gl::SRC_COLOR,
    Factor::SrcColorComplement => gl::ONE_MINUS_SRC_COLOR,
    Factor::DestColor => gl::DST_COLOR,
    Factor::DestColorComplement => gl::ONE_MINUS_DST_COLOR,
    Factor::SrcAlpha => gl::SRC_ALPHA,
    Factor::SrcAlphaComplement => gl::ONE_MINUS_SRC_ALPHA,
    Factor::DstAlpha => gl::DST_ALPHA,
    Factor::DstAlphaComplement => gl::ONE_MINUS_DST_ALPHA,
    Factor::SrcAlphaSaturate => gl::SRC_ALPHA_SATURATE,
  }
}

#[inline]
pub(crate) fn depth_comparison_to_glenum(dc: DepthComparison) -> GLenum {
  match dc {
    DepthComparison::Never => gl::NEVER,
    DepthComparison::Always => gl::ALWAYS,
    DepthComparison::Equal => gl::EQUAL,
    DepthComparison::NotEqual => gl::NOTEQUAL,
    DepthComparison::Less => gl::LESS,
    DepthComparison::LessOrEqual => gl::LEQUAL,
    DepthComparison::Greater => gl::GREATER,
    DepthComparison::GreaterOrEqual => gl::GEQUAL,
  }
}

fn texture_binding_query(target: GLenum) -> GLenum {
  match target {
    gl::TEXTURE_2D_ARRAY => gl::TEXTURE_BINDING_2D_ARRAY,
    gl::TEXTURE_3D => gl::TEXTURE_BINDING_3D,
    gl::TEXTURE_CUBE_MAP => gl::TEXTURE_BINDING_CUBE_MAP,
    gl::TEXTURE_2D_MULTISAMPLE => gl::TEXTURE_BINDING_2D_MULTISAMPLE,
    _ => gl::TEXTURE_BINDING_2D,
  }
}

unsafe fn get_ctx_viewport() -> [GLint; 4] {
  let mut data = [0; 4];
  gl::GetIntegerv(gl::VIEWPORT, data.as_mut_ptr());
  data
}

unsafe fn get_ctx_current_texture_unit() -> u32 {
  let mut active_texture = gl::TEXTURE0 as GLint;
  gl::GetIntegerv(gl::ACTIVE_TEXTURE, &mut active_texture);
  (active_texture as GLenum).saturating_sub(gl::TEXTURE0)
}

unsafe fn get_ctx_bound_framebuffer(binding: GLenum) -> GLuint {
  let mut bound = 0 as GLint;
  gl::GetIntegerv(binding, &mut bound);
  bound as GLuint
}

unsafe fn get_ctx_bound_vertex_array() -> GLuint {
  let mut bound = 0 as GLint;
  gl::GetIntegerv(gl::VERTEX_ARRAY_BINDING, &mut bound);
  bound as GLuint
}

unsafe fn get_ctx_current_program() -> GLuint {
  let mut used = 0 as GLint;
  gl::GetIntegerv(gl::CURRENT_PROGRAM, &mut used);
  used as GLuint
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cached_values() {
    let mut cached = Cached::unknown();
    assert!(cached.is_invalid(&3));

    cached.set(3);
    assert!(!cached.is_invalid(&3));
    assert!(cached.is_invalid(&4));

    cached.invalidate();
    assert!(cached.is_invalid(&3));
  }

  #[test]
  fn blending_enums() {
    assert_eq!(from_blending_equation(Equation::ReverseSubtract), gl::FUNC_REVERSE_SUBTRACT);
    assert_eq!(from_blending_factor(Factor::SrcAlphaComplement), gl::ONE_MINUS_SRC_ALPHA);
    assert_eq!(depth_comparison_to_glenum(DepthComparison::LessOrEqual), gl::LEQUAL);
  }
}
