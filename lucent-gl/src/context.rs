//! Contexts.
//!
//! A [`Context`] wraps the OpenGL context that is current on the calling thread when it is
//! created. It owns the [`GLState`](crate::state::GLState) cache, the include registry, the queue
//! of objects waiting for deletion, and is the factory of every GPU object.
//!
//! Contexts are tracked per thread: creating a context or entering it with [`Context::enter`]
//! makes it the current one until the guard goes away. Objects can only be used while their
//! context is current, or while another context of the same share group is current for objects
//! that OpenGL shares (buffers, textures, samplers, renderbuffers and programs).

use crate::{debug, framebuffer::Framebuffer, state::GLState};
use gl::types::*;
use log::{debug, info, warn};
use lucent::{
  blending::{BlendEquations, BlendFunc},
  depth_test::DepthComparison,
  face_culling::{FaceCullingMode, FaceCullingOrder},
  gc::ReleaseQueue,
  shader::include::IncludeRegistry,
  state::{EnableFlags, MemoryBarrier, PolygonOffset, ProvokingVertex},
  Error, GcMode, ObjectKind, Result,
};
use std::{
  cell::{Cell, OnceCell, Ref, RefCell, RefMut},
  collections::BTreeSet,
  ffi::CStr,
  fmt,
  os::raw::c_char,
  rc::{Rc, Weak},
};

thread_local!(static CURRENT: RefCell<Vec<Weak<ContextState>>> = RefCell::new(Vec::new()));

/// The innermost live context of the calling thread.
pub(crate) fn current() -> Option<Rc<ContextState>> {
  CURRENT.with(|stack| stack.borrow().iter().rev().find_map(Weak::upgrade))
}

fn push_current(state: &Rc<ContextState>) {
  CURRENT.with(|stack| stack.borrow_mut().push(Rc::downgrade(state)));
}

fn pop_current(state: &Rc<ContextState>) {
  CURRENT.with(|stack| {
    let mut stack = stack.borrow_mut();

    if let Some(i) = stack
      .iter()
      .rposition(|w| w.as_ptr() == Rc::as_ptr(state))
    {
      stack.remove(i);
    }
  });
}

/// Windowing glue able to make an OpenGL context current on the calling thread.
pub trait ContextBinding {
  fn make_current(&self);

  /// Called when no other lucent context is left current after [`Context::enter`].
  fn release_current(&self) {}
}

/// Options used to create a [`Context`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ContextOptions {
  /// Minimal OpenGL version code (`330`, `430`…).
  pub require: u32,
  pub gc_mode: GcMode,
  /// Forward driver debug messages to `log` when the context supports debug output.
  pub debug: bool,
}

impl ContextOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn require(self, require: u32) -> Self {
    ContextOptions { require, ..self }
  }

  pub fn gc_mode(self, gc_mode: GcMode) -> Self {
    ContextOptions { gc_mode, ..self }
  }

  pub fn debug(self, debug: bool) -> Self {
    ContextOptions { debug, ..self }
  }
}

impl Default for ContextOptions {
  fn default() -> Self {
    ContextOptions {
      require: 330,
      gc_mode: GcMode::Manual,
      debug: false,
    }
  }
}

/// Driver identification strings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Info {
  pub vendor: String,
  pub renderer: String,
  pub version: String,
  pub glsl_version: String,
}

impl fmt::Display for Info {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(
      f,
      "{} ({}), OpenGL {}, GLSL {}",
      self.renderer, self.vendor, self.version, self.glsl_version
    )
  }
}

/// Driver limits.
///
/// Limits of features the context doesn’t support are reported as `0` (or `1` for alignments and
/// anisotropy).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Limits {
  pub max_texture_size: u32,
  pub max_3d_texture_size: u32,
  pub max_cube_map_texture_size: u32,
  pub max_array_texture_layers: u32,
  /// Texture units usable across every stage.
  pub max_texture_units: u32,
  pub max_vertex_attribs: u32,
  pub max_samples: u32,
  pub max_color_attachments: u32,
  pub max_draw_buffers: u32,
  pub max_viewport_dims: [u32; 2],
  pub max_uniform_buffer_bindings: u32,
  pub max_uniform_block_size: u32,
  pub uniform_buffer_offset_alignment: u32,
  pub max_shader_storage_buffer_bindings: u32,
  pub shader_storage_buffer_offset_alignment: u32,
  pub max_image_units: u32,
  pub max_transform_feedback_separate_attribs: u32,
  pub max_transform_feedback_interleaved_components: u32,
  pub max_compute_work_group_count: [u32; 3],
  pub max_compute_work_group_size: [u32; 3],
  pub max_compute_work_group_invocations: u32,
  pub max_anisotropy: f32,
  /// Bits of the timer query counter; bounds the measurable elapsed time.
  pub timer_query_bits: u32,
}

/// Identity of a group of contexts sharing their objects.
#[derive(Debug, Default)]
struct ShareGroup;

pub(crate) struct ContextState {
  pub(crate) gl: RefCell<GLState>,
  pub(crate) queue: RefCell<ReleaseQueue>,
  includes: RefCell<IncludeRegistry>,
  /// Framebuffer used by the last `bind`; the screen when `None`.
  pub(crate) fbo: RefCell<Option<Framebuffer>>,
  pub(crate) screen: OnceCell<Framebuffer>,
  pub(crate) initial_viewport: [GLint; 4],
  limits: OnceCell<Limits>,
  info: OnceCell<Info>,
  extensions: BTreeSet<String>,
  version_code: u32,
  gc_mode: Cell<GcMode>,
  binding: RefCell<Option<Box<dyn ContextBinding>>>,
  share_group: Rc<ShareGroup>,
}

impl ContextState {
  pub(crate) fn gl(&self) -> RefMut<GLState> {
    self.gl.borrow_mut()
  }

  pub(crate) fn gc_mode(&self) -> GcMode {
    self.gc_mode.get()
  }

  pub(crate) fn version_code(&self) -> u32 {
    self.version_code
  }

  pub(crate) fn supports(&self, version: u32, extension: &str) -> bool {
    self.version_code >= version || self.extensions.contains(extension)
  }

  /// Fail with [`Error::Unsupported`] unless the context provides a feature.
  pub(crate) fn require(
    &self,
    feature: &'static str,
    version: u32,
    extension: &'static str,
  ) -> Result<()> {
    if self.supports(version, extension) {
      Ok(())
    } else {
      Err(Error::unsupported(feature, version, extension))
    }
  }

  pub(crate) fn limits(&self) -> &Limits {
    self
      .limits
      .get_or_init(|| unsafe { query_limits(self.version_code, &self.extensions) })
  }

  /// Whether objects of `owner` can be used right now, and if so, the state to issue the driver
  /// calls through.
  pub(crate) fn resolve(owner: &Rc<Self>, kind: ObjectKind) -> Result<Rc<Self>> {
    match current() {
      None => Ok(owner.clone()),
      Some(cur) if Rc::ptr_eq(&cur, owner) => Ok(cur),
      Some(cur) if kind.is_shareable() && Rc::ptr_eq(&cur.share_group, &owner.share_group) => {
        Ok(cur)
      }
      Some(_) => Err(Error::context(format!(
        "this {} belongs to a context that is not current",
        kind
      ))),
    }
  }

  pub(crate) fn is_current(self: &Rc<Self>) -> bool {
    current().map_or(true, |cur| Rc::ptr_eq(&cur, self))
  }

  /// Delete every queued object, including the ones queued while draining.
  pub(crate) fn collect(&self) -> usize {
    let mut released = 0;

    loop {
      let next = self.queue.borrow_mut().pop();
      let Some((kind, name)) = next else { break };

      unsafe { self.gl().delete_object(kind, name) };
      released += 1;
    }

    if released > 0 {
      debug!(target: "lucent::gc", "released {} queued objects", released);
    }

    released
  }
}

/// An OpenGL context.
///
/// The context is not `Send`: it, and every object it creates, stays on the thread that created
/// it.
pub struct Context {
  state: Rc<ContextState>,
}

impl Context {
  /// Wrap the OpenGL context current on the calling thread.
  ///
  /// [`load_with`](crate::load_with) must have been called beforehand.
  pub fn new(options: ContextOptions) -> Result<Self> {
    Self::create(options, Rc::new(ShareGroup))
  }

  /// Wrap the OpenGL context current on the calling thread, which was created by the windowing
  /// system as sharing its objects with `share`.
  pub fn new_shared(options: ContextOptions, share: &Context) -> Result<Self> {
    Self::create(options, share.state.share_group.clone())
  }

  fn create(options: ContextOptions, share_group: Rc<ShareGroup>) -> Result<Self> {
    if !gl::GetString::is_loaded() {
      return Err(Error::context(
        "OpenGL functions are not loaded; call lucent_gl::load_with first",
      ));
    }

    let version_code = unsafe { get_version_code() };

    if version_code == 0 {
      warn!(target: "lucent::context", "no OpenGL context is current");
      return Err(Error::context("no OpenGL context is current"));
    }

    if version_code < options.require {
      warn!(
        target: "lucent::context",
        "OpenGL {} required, the context provides {}",
        options.require,
        version_code
      );

      return Err(Error::context(format!(
        "OpenGL {} required, the context provides {}",
        lucent::GlVersion(options.require),
        lucent::GlVersion(version_code)
      )));
    }

    let extensions = unsafe { get_extensions() };

    let gl = unsafe {
      let mut gl = GLState::from_context();
      gl.reset(version_code >= 400);
      gl
    };

    let initial_viewport = unsafe {
      let mut data = [0; 4];
      gl::GetIntegerv(gl::VIEWPORT, data.as_mut_ptr());
      data
    };

    let state = Rc::new(ContextState {
      gl: RefCell::new(gl),
      queue: RefCell::new(ReleaseQueue::new()),
      includes: RefCell::new(IncludeRegistry::new()),
      fbo: RefCell::new(None),
      screen: OnceCell::new(),
      initial_viewport,
      limits: OnceCell::new(),
      info: OnceCell::new(),
      extensions,
      version_code,
      gc_mode: Cell::new(options.gc_mode),
      binding: RefCell::new(None),
      share_group,
    });

    if options.debug {
      if state.supports(430, "GL_KHR_debug") {
        unsafe { debug::install_debug_output() };
      } else {
        warn!(target: "lucent::context", "debug output requested but not supported");
      }
    }

    push_current(&state);

    let ctx = Context { state };
    info!(target: "lucent::context", "created context: {}", ctx.info());

    Ok(ctx)
  }

  pub(crate) fn state(&self) -> &Rc<ContextState> {
    &self.state
  }

  /// The state of this context, provided that it is the current one.
  pub(crate) fn current_state(&self) -> Result<&Rc<ContextState>> {
    if self.state.is_current() {
      Ok(&self.state)
    } else {
      Err(Error::context("the context is not current"))
    }
  }

  /// Whether this context is the innermost current context of the calling thread.
  pub fn is_current(&self) -> bool {
    self.state.is_current()
  }

  /// Set the windowing glue used by [`Context::enter`].
  pub fn set_binding(&self, binding: impl ContextBinding + 'static) {
    *self.state.binding.borrow_mut() = Some(Box::new(binding));
  }

  /// Make this context current until the returned guard is dropped; the previously current
  /// context is then made current again.
  pub fn enter(&self) -> CurrentGuard<'_> {
    if let Some(binding) = self.state.binding.borrow().as_ref() {
      binding.make_current();
    }

    push_current(&self.state);
    CurrentGuard { ctx: self }
  }

  /// Version code of the context, such as `330` or `460`.
  pub fn version_code(&self) -> u32 {
    self.state.version_code
  }

  pub fn info(&self) -> &Info {
    self.state.info.get_or_init(|| unsafe {
      Info {
        vendor: get_string(gl::VENDOR),
        renderer: get_string(gl::RENDERER),
        version: get_string(gl::VERSION),
        glsl_version: get_string(gl::SHADING_LANGUAGE_VERSION),
      }
    })
  }

  pub fn limits(&self) -> &Limits {
    self.state.limits()
  }

  pub fn extensions(&self) -> &BTreeSet<String> {
    &self.state.extensions
  }

  pub fn gc_mode(&self) -> GcMode {
    self.state.gc_mode()
  }

  pub fn set_gc_mode(&self, gc_mode: GcMode) {
    self.state.gc_mode.set(gc_mode);
  }

  /// Delete every object queued by dropped handles. Returns the number of deleted objects.
  pub fn gc(&self) -> Result<usize> {
    Ok(self.current_state()?.collect())
  }

  /// Number of objects waiting for [`Context::gc`].
  pub fn pending_releases(&self) -> usize {
    self.state.queue.borrow().len()
  }

  /// The most recent driver error, as its OpenGL name (`"GL_NO_ERROR"` when there is none).
  pub fn error(&self) -> &'static str {
    match unsafe { gl::GetError() } {
      gl::NO_ERROR => "GL_NO_ERROR",
      gl::INVALID_ENUM => "GL_INVALID_ENUM",
      gl::INVALID_VALUE => "GL_INVALID_VALUE",
      gl::INVALID_OPERATION => "GL_INVALID_OPERATION",
      gl::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
      gl::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
      gl::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
      gl::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
      _ => "GL_UNKNOWN_ERROR",
    }
  }

  /// Block until every submitted command has completed.
  pub fn finish(&self) -> Result<()> {
    self.current_state()?;
    unsafe { gl::Finish() };
    Ok(())
  }

  pub fn flush(&self) -> Result<()> {
    self.current_state()?;
    unsafe { gl::Flush() };
    Ok(())
  }

  pub fn memory_barrier(&self, barriers: MemoryBarrier) -> Result<()> {
    let state = self.current_state()?;
    state.require("memory barriers", 420, "GL_ARB_shader_image_load_store")?;
    unsafe { gl::MemoryBarrier(barriers.bits()) };
    Ok(())
  }

  /// Forget everything the state cache knows; needed after foreign code issued OpenGL calls.
  pub fn reset_state_cache(&self) -> Result<()> {
    let mut gl = self.current_state()?.gl();

    gl.invalidate_vertex_array();
    gl.invalidate_shader_program();
    gl.invalidate_framebuffer();
    gl.invalidate_bound_textures();
    gl.invalidate_bound_buffers();
    gl.invalidate_viewport();
    gl.invalidate_render_states();

    Ok(())
  }

  pub fn includes(&self) -> Ref<IncludeRegistry> {
    self.state.includes.borrow()
  }

  /// Register a source for `#include "name"`.
  pub fn set_include(&self, name: impl Into<String>, source: impl Into<String>) {
    self.state.includes.borrow_mut().insert(name, source);
  }

  pub fn remove_include(&self, name: &str) -> Option<String> {
    self.state.includes.borrow_mut().remove(name)
  }

  pub(crate) fn expand_includes(
    &self,
    source: &str,
  ) -> std::result::Result<String, lucent::shader::include::IncludeError> {
    self.state.includes.borrow().expand(source)
  }

  pub fn enable_flags(&self) -> EnableFlags {
    self.state.gl().enable_flags()
  }

  /// Enable exactly `flags`, disabling every other capability.
  pub fn enable_only(&self, flags: EnableFlags) -> Result<()> {
    unsafe { self.current_state()?.gl().set_enable_flags(flags) };
    Ok(())
  }

  pub fn enable(&self, flags: EnableFlags) -> Result<()> {
    let mut gl = self.current_state()?.gl();
    let flags = gl.enable_flags() | flags;
    unsafe { gl.set_enable_flags(flags) };
    Ok(())
  }

  pub fn disable(&self, flags: EnableFlags) -> Result<()> {
    let mut gl = self.current_state()?.gl();
    let flags = gl.enable_flags() - flags;
    unsafe { gl.set_enable_flags(flags) };
    Ok(())
  }

  pub fn blend_func(&self) -> BlendFunc {
    self.state.gl().blend_func()
  }

  pub fn set_blend_func(&self, func: BlendFunc) -> Result<()> {
    unsafe { self.current_state()?.gl().set_blend_func(func) };
    Ok(())
  }

  pub fn blend_equation(&self) -> BlendEquations {
    self.state.gl().blend_equations()
  }

  pub fn set_blend_equation(&self, equations: BlendEquations) -> Result<()> {
    unsafe { self.current_state()?.gl().set_blend_equations(equations) };
    Ok(())
  }

  pub fn depth_func(&self) -> DepthComparison {
    self.state.gl().depth_func()
  }

  pub fn set_depth_func(&self, func: DepthComparison) -> Result<()> {
    unsafe { self.current_state()?.gl().set_depth_func(func) };
    Ok(())
  }

  pub fn set_front_face(&self, order: FaceCullingOrder) -> Result<()> {
    unsafe { self.current_state()?.gl().set_front_face(order) };
    Ok(())
  }

  pub fn set_cull_face(&self, mode: FaceCullingMode) -> Result<()> {
    unsafe { self.current_state()?.gl().set_cull_face(mode) };
    Ok(())
  }

  pub fn set_wireframe(&self, wireframe: bool) -> Result<()> {
    unsafe { self.current_state()?.gl().set_wireframe(wireframe) };
    Ok(())
  }

  pub fn set_point_size(&self, size: f32) -> Result<()> {
    unsafe { self.current_state()?.gl().set_point_size(size) };
    Ok(())
  }

  pub fn set_line_width(&self, width: f32) -> Result<()> {
    unsafe { self.current_state()?.gl().set_line_width(width) };
    Ok(())
  }

  pub fn set_polygon_offset(&self, offset: PolygonOffset) -> Result<()> {
    unsafe { self.current_state()?.gl().set_polygon_offset(offset) };
    Ok(())
  }

  pub fn set_provoking_vertex(&self, vertex: ProvokingVertex) -> Result<()> {
    unsafe { self.current_state()?.gl().set_provoking_vertex(vertex) };
    Ok(())
  }

  pub fn patch_vertices(&self) -> u32 {
    self.state.gl().patch_vertices()
  }

  /// Number of vertices per patch for [`Mode::Patches`](lucent::mode::Mode::Patches).
  pub fn set_patch_vertices(&self, vertices: u32) -> Result<()> {
    let state = self.current_state()?;
    state.require("tessellation", 400, "GL_ARB_tessellation_shader")?;

    if vertices == 0 {
      return Err(Error::out_of_range("patches must have at least one vertex"));
    }

    unsafe { state.gl().set_patch_vertices(vertices) };
    Ok(())
  }

  /// Unbind sampler objects from the texture units `start..end`.
  pub fn clear_samplers(&self, start: u32, end: u32) -> Result<()> {
    let state = self.current_state()?;
    let end = end.min(state.limits().max_texture_units);
    let mut gl = state.gl();

    for unit in start..end {
      unsafe { gl.bind_sampler(unit, 0) };
    }

    Ok(())
  }
}

impl Drop for Context {
  fn drop(&mut self) {
    if self.state.is_current() && !self.state.queue.borrow().is_empty() {
      self.state.collect();
    }

    pop_current(&self.state);
    debug!(target: "lucent::context", "dropped context");
  }
}

/// Guard returned by [`Context::enter`].
pub struct CurrentGuard<'a> {
  ctx: &'a Context,
}

impl CurrentGuard<'_> {
  pub fn context(&self) -> &Context {
    self.ctx
  }
}

impl Drop for CurrentGuard<'_> {
  fn drop(&mut self) {
    pop_current(&self.ctx.state);

    match current() {
      Some(previous) => {
        if let Some(binding) = previous.binding.borrow().as_ref() {
          binding.make_current();
        }
      }

      None => {
        if let Some(binding) = self.ctx.state.binding.borrow().as_ref() {
          binding.release_current();
        }
      }
    }
  }
}

unsafe fn get_version_code() -> u32 {
  let mut major = 0 as GLint;
  let mut minor = 0 as GLint;

  gl::GetIntegerv(gl::MAJOR_VERSION, &mut major);
  gl::GetIntegerv(gl::MINOR_VERSION, &mut minor);

  (major.max(0) * 100 + minor.max(0) * 10) as u32
}

unsafe fn get_string(name: GLenum) -> String {
  let s = gl::GetString(name);

  if s.is_null() {
    String::new()
  } else {
    CStr::from_ptr(s as *const c_char)
      .to_string_lossy()
      .into_owned()
  }
}

unsafe fn get_extensions() -> BTreeSet<String> {
  let mut count = 0 as GLint;
  gl::GetIntegerv(gl::NUM_EXTENSIONS, &mut count);

  (0..count.max(0) as GLuint)
    .filter_map(|i| {
      let s = gl::GetStringi(gl::EXTENSIONS, i);

      if s.is_null() {
        None
      } else {
        Some(
          CStr::from_ptr(s as *const c_char)
            .to_string_lossy()
            .into_owned(),
        )
      }
    })
    .collect()
}

unsafe fn get_int(name: GLenum) -> u32 {
  let mut value = 0 as GLint;
  gl::GetIntegerv(name, &mut value);
  value.max(0) as u32
}

unsafe fn get_int_indexed(name: GLenum) -> [u32; 3] {
  let mut values = [0; 3];

  for (i, v) in values.iter_mut().enumerate() {
    let mut value = 0 as GLint;
    gl::GetIntegeri_v(name, i as GLuint, &mut value);
    *v = value.max(0) as u32;
  }

  values
}

unsafe fn query_limits(version_code: u32, extensions: &BTreeSet<String>) -> Limits {
  let supports = |version: u32, ext: &str| version_code >= version || extensions.contains(ext);

  let mut viewport_dims = [0 as GLint; 2];
  gl::GetIntegerv(gl::MAX_VIEWPORT_DIMS, viewport_dims.as_mut_ptr());

  let (ssbo_bindings, ssbo_alignment) = if supports(430, "GL_ARB_shader_storage_buffer_object") {
    (
      get_int(gl::MAX_SHADER_STORAGE_BUFFER_BINDINGS),
      get_int(gl::SHADER_STORAGE_BUFFER_OFFSET_ALIGNMENT).max(1),
    )
  } else {
    (0, 1)
  };

  let max_image_units = if supports(420, "GL_ARB_shader_image_load_store") {
    get_int(gl::MAX_IMAGE_UNITS)
  } else {
    0
  };

  let (group_count, group_size, group_invocations) = if supports(430, "GL_ARB_compute_shader") {
    (
      get_int_indexed(gl::MAX_COMPUTE_WORK_GROUP_COUNT),
      get_int_indexed(gl::MAX_COMPUTE_WORK_GROUP_SIZE),
      get_int(gl::MAX_COMPUTE_WORK_GROUP_INVOCATIONS),
    )
  } else {
    ([0; 3], [0; 3], 0)
  };

  let max_anisotropy = if supports(460, "GL_EXT_texture_filter_anisotropic")
    || extensions.contains("GL_ARB_texture_filter_anisotropic")
  {
    let mut value = 1.;
    gl::GetFloatv(gl::MAX_TEXTURE_MAX_ANISOTROPY, &mut value);
    value
  } else {
    1.
  };

  let mut timer_query_bits = 0 as GLint;
  gl::GetQueryiv(gl::TIME_ELAPSED, gl::QUERY_COUNTER_BITS, &mut timer_query_bits);

  Limits {
    max_texture_size: get_int(gl::MAX_TEXTURE_SIZE),
    max_3d_texture_size: get_int(gl::MAX_3D_TEXTURE_SIZE),
    max_cube_map_texture_size: get_int(gl::MAX_CUBE_MAP_TEXTURE_SIZE),
    max_array_texture_layers: get_int(gl::MAX_ARRAY_TEXTURE_LAYERS),
    max_texture_units: get_int(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS),
    max_vertex_attribs: get_int(gl::MAX_VERTEX_ATTRIBS),
    max_samples: get_int(gl::MAX_SAMPLES),
    max_color_attachments: get_int(gl::MAX_COLOR_ATTACHMENTS),
    max_draw_buffers: get_int(gl::MAX_DRAW_BUFFERS),
    max_viewport_dims: [viewport_dims[0].max(0) as u32, viewport_dims[1].max(0) as u32],
    max_uniform_buffer_bindings: get_int(gl::MAX_UNIFORM_BUFFER_BINDINGS),
    max_uniform_block_size: get_int(gl::MAX_UNIFORM_BLOCK_SIZE),
    uniform_buffer_offset_alignment: get_int(gl::UNIFORM_BUFFER_OFFSET_ALIGNMENT).max(1),
    max_shader_storage_buffer_bindings: ssbo_bindings,
    shader_storage_buffer_offset_alignment: ssbo_alignment,
    max_image_units,
    max_transform_feedback_separate_attribs: get_int(gl::MAX_TRANSFORM_FEEDBACK_SEPARATE_ATTRIBS),
    max_transform_feedback_interleaved_components: get_int(
      gl::MAX_TRANSFORM_FEEDBACK_INTERLEAVED_COMPONENTS,
    ),
    max_compute_work_group_count: group_count,
    max_compute_work_group_size: group_size,
    max_compute_work_group_invocations: group_invocations,
    max_anisotropy,
    timer_query_bits: timer_query_bits.max(0) as u32,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_options() {
    let options = ContextOptions::default();

    assert_eq!(options.require, 330);
    assert_eq!(options.gc_mode, GcMode::Manual);
    assert!(!options.debug);

    let options = options.require(430).gc_mode(GcMode::Auto).debug(true);
    assert_eq!(
      options,
      ContextOptions {
        require: 430,
        gc_mode: GcMode::Auto,
        debug: true
      }
    );
  }

  #[test]
  fn no_current_context_by_default() {
    assert!(current().is_none());
  }
}
