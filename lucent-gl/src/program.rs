//! Shader programs.
//!
//! A program is linked from a vertex stage and optional tessellation, geometry and fragment
//! stages. Without a fragment stage, it is a transform program: its vertex (or geometry) outputs
//! listed as varyings are captured into buffers by
//! [`VertexArray::transform`](crate::VertexArray::transform).
//!
//! Once linked, the program is reflected into a table of [`Member`]s keyed by their GLSL name.

use crate::{
  context::{Context, ContextState},
  object::{impl_object, RawObject},
  shader::{info_log, Stage},
  uniform,
};
use gl::types::*;
use log::{debug, warn};
use lucent::{
  mode::{Mode, Primitive},
  shader::{
    types::{lookup, GlslType},
    uniform::{decode, encode, Setter, UniformData, UniformValue},
    ShaderSource, StageType,
  },
  Error, ObjectKind, Result,
};
use std::{
  collections::BTreeMap,
  ffi::CString,
  fmt,
  ptr::null_mut,
  rc::Rc,
  str::FromStr,
};

/// How varyings are laid out in the capture buffers.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum CaptureMode {
  /// Every varying goes, interleaved, into a single buffer.
  #[default]
  Interleaved,
  /// Each varying goes into its own buffer.
  Separate,
}

impl CaptureMode {
  fn to_glenum(self) -> GLenum {
    match self {
      CaptureMode::Interleaved => gl::INTERLEAVED_ATTRIBS,
      CaptureMode::Separate => gl::SEPARATE_ATTRIBS,
    }
  }
}

impl FromStr for CaptureMode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "interleaved" => Ok(CaptureMode::Interleaved),
      "separate" => Ok(CaptureMode::Separate),
      _ => Err(Error::creation(format!(
        "invalid capture mode {:?}, expected \"interleaved\" or \"separate\"",
        s
      ))),
    }
  }
}

/// A vertex input.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
  pub name: String,
  pub location: u32,
  pub array_length: usize,
  pub ty: GlslType,
}

impl Attribute {
  /// `(dimension, scalar_type, rows_length, row_length, normalizable, shape)`.
  pub fn info(&self) -> (u32, GLenum, u32, u32, bool, char) {
    self.ty.attribute_info()
  }
}

/// A uniform outside of any block.
#[derive(Clone, Debug, PartialEq)]
pub struct Uniform {
  pub name: String,
  pub location: GLint,
  pub array_length: usize,
  pub ty: GlslType,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UniformBlock {
  pub name: String,
  pub index: u32,
  /// Size of the block data, in bytes.
  pub size: usize,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StorageBlock {
  pub name: String,
  pub index: u32,
  pub size: usize,
}

/// A subroutine implementation, selected through a subroutine uniform.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subroutine {
  pub name: String,
  pub index: u32,
  pub stage: StageType,
}

/// An output captured by transform feedback.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Varying {
  pub name: String,
  /// Position in the capture list.
  pub number: u32,
  pub array_length: usize,
  pub dimension: u32,
}

/// A reflected program member.
#[derive(Clone, Debug, PartialEq)]
pub enum Member {
  Attribute(Attribute),
  Uniform(Uniform),
  UniformBlock(UniformBlock),
  StorageBlock(StorageBlock),
  Subroutine(Subroutine),
  Varying(Varying),
}

impl Member {
  pub fn name(&self) -> &str {
    match self {
      Member::Attribute(m) => &m.name,
      Member::Uniform(m) => &m.name,
      Member::UniformBlock(m) => &m.name,
      Member::StorageBlock(m) => &m.name,
      Member::Subroutine(m) => &m.name,
      Member::Varying(m) => &m.name,
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      Member::Attribute(_) => "attribute",
      Member::Uniform(_) => "uniform",
      Member::UniformBlock(_) => "uniform block",
      Member::StorageBlock(_) => "storage block",
      Member::Subroutine(_) => "subroutine",
      Member::Varying(_) => "varying",
    }
  }
}

impl fmt::Display for Member {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{} {}", self.kind(), self.name())
  }
}

/// Primitive information of the geometry stage.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct GeometryInfo {
  pub input: Mode,
  pub output: Primitive,
  pub vertices: u32,
}

/// Subroutine uniforms of a stage, in location order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct SubroutineUniforms {
  pub(crate) stage: StageType,
  pub(crate) names: Vec<String>,
}

pub(crate) struct ProgramInner {
  pub(crate) raw: RawObject,
  members: BTreeMap<String, Member>,
  stages: Vec<StageType>,
  transform: bool,
  capture_mode: CaptureMode,
  geometry: Option<GeometryInfo>,
  tess_output: Option<Primitive>,
  pub(crate) subroutine_uniforms: Vec<SubroutineUniforms>,
}

/// A linked shader program.
#[derive(Clone)]
pub struct Program(pub(crate) Rc<ProgramInner>);

impl_object!(Program);

/// Stages and link options of a [`Program`].
pub struct ProgramBuilder<'a> {
  ctx: &'a Context,
  stages: Vec<(StageType, ShaderSource)>,
  varyings: Vec<String>,
  fragment_outputs: Vec<(String, u32)>,
  capture_mode: CaptureMode,
}

impl Context {
  pub fn program(&self) -> ProgramBuilder<'_> {
    ProgramBuilder {
      ctx: self,
      stages: Vec::new(),
      varyings: Vec::new(),
      fragment_outputs: Vec::new(),
      capture_mode: CaptureMode::default(),
    }
  }
}

impl<'a> ProgramBuilder<'a> {
  fn stage(mut self, ty: StageType, source: impl Into<ShaderSource>) -> Self {
    self.stages.retain(|(t, _)| *t != ty);
    self.stages.push((ty, source.into()));
    self
  }

  pub fn vertex_shader(self, source: impl Into<ShaderSource>) -> Self {
    self.stage(StageType::VertexShader, source)
  }

  pub fn tess_control_shader(self, source: impl Into<ShaderSource>) -> Self {
    self.stage(StageType::TessellationControlShader, source)
  }

  pub fn tess_evaluation_shader(self, source: impl Into<ShaderSource>) -> Self {
    self.stage(StageType::TessellationEvaluationShader, source)
  }

  pub fn geometry_shader(self, source: impl Into<ShaderSource>) -> Self {
    self.stage(StageType::GeometryShader, source)
  }

  pub fn fragment_shader(self, source: impl Into<ShaderSource>) -> Self {
    self.stage(StageType::FragmentShader, source)
  }

  /// Outputs to capture, in capture order.
  pub fn varyings<I, S>(mut self, varyings: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.varyings = varyings.into_iter().map(Into::into).collect();
    self
  }

  /// Bind a named fragment output to a draw buffer index.
  pub fn fragment_output(mut self, name: impl Into<String>, index: u32) -> Self {
    self.fragment_outputs.push((name.into(), index));
    self
  }

  pub fn capture_mode(mut self, mode: CaptureMode) -> Self {
    self.capture_mode = mode;
    self
  }

  pub fn build(self) -> Result<Program> {
    let state = self.ctx.current_state()?;
    let has = |ty| self.stages.iter().any(|(t, _)| *t == ty);

    if !has(StageType::VertexShader) {
      return Err(Error::creation("a program needs a vertex shader"));
    }

    let transform = !has(StageType::FragmentShader);

    if transform && self.varyings.is_empty() {
      return Err(Error::creation(
        "a program without fragment shader captures varyings, but none were given",
      ));
    }

    let tessellation =
      has(StageType::TessellationControlShader) || has(StageType::TessellationEvaluationShader);

    if tessellation {
      state.require("tessellation shaders", 400, "GL_ARB_tessellation_shader")?;
    }

    let stages = self
      .stages
      .iter()
      .map(|(ty, source)| Stage::new(self.ctx, *ty, source))
      .collect::<Result<Vec<_>>>()?;

    let link = LinkOptions {
      varyings: &self.varyings,
      fragment_outputs: &self.fragment_outputs,
      capture_mode: self.capture_mode,
    };

    let inner = link_program(state, &stages, &link, transform)?;
    Ok(Program(Rc::new(inner)))
  }
}

pub(crate) struct LinkOptions<'a> {
  pub(crate) varyings: &'a [String],
  pub(crate) fragment_outputs: &'a [(String, u32)],
  pub(crate) capture_mode: CaptureMode,
}

fn c_string(what: &str, name: &str) -> Result<CString> {
  CString::new(name).map_err(|_| Error::creation(format!("{} {:?} contains a NUL byte", what, name)))
}

/// Link compiled stages and reflect the result.
pub(crate) fn link_program(
  state: &Rc<ContextState>,
  stages: &[Stage],
  options: &LinkOptions,
  transform: bool,
) -> Result<ProgramInner> {
  let varyings = options
    .varyings
    .iter()
    .map(|v| c_string("varying", v))
    .collect::<Result<Vec<_>>>()?;

  let outputs = options
    .fragment_outputs
    .iter()
    .map(|(name, index)| Ok((c_string("fragment output", name)?, *index)))
    .collect::<Result<Vec<_>>>()?;

  let handle = unsafe {
    let handle = gl::CreateProgram();

    for stage in stages {
      gl::AttachShader(handle, stage.handle);
    }

    if !varyings.is_empty() {
      let ptrs: Vec<*const GLchar> = varyings.iter().map(|v| v.as_ptr()).collect();
      gl::TransformFeedbackVaryings(
        handle,
        ptrs.len() as GLsizei,
        ptrs.as_ptr(),
        options.capture_mode.to_glenum(),
      );
    }

    for (name, index) in &outputs {
      gl::BindFragDataLocation(handle, *index, name.as_ptr());
    }

    gl::LinkProgram(handle);

    for stage in stages {
      gl::DetachShader(handle, stage.handle);
    }

    handle
  };

  let raw = RawObject::new(state, ObjectKind::Program, handle);

  if let Err(e) = unsafe { check_linked(handle) } {
    raw.release();
    return Err(e);
  }

  let reflected = unsafe { reflect(state, handle, stages) };

  let reflected = match reflected {
    Ok(reflected) => reflected,
    Err(e) => {
      raw.release();
      return Err(e);
    }
  };

  debug!(
    target: "lucent::program",
    "linked program {} with {} members",
    handle,
    reflected.members.len()
  );

  Ok(ProgramInner {
    raw,
    members: reflected.members,
    stages: stages.iter().map(|s| s.ty).collect(),
    transform,
    capture_mode: options.capture_mode,
    geometry: reflected.geometry,
    tess_output: reflected.tess_output,
    subroutine_uniforms: reflected.subroutine_uniforms,
  })
}

unsafe fn check_linked(handle: GLuint) -> Result<()> {
  let mut linked: GLint = gl::FALSE.into();
  gl::GetProgramiv(handle, gl::LINK_STATUS, &mut linked);

  if linked == GLint::from(gl::TRUE) {
    return Ok(());
  }

  let mut log_len: GLint = 0;
  gl::GetProgramiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

  let mut log: Vec<u8> = Vec::with_capacity(log_len.max(0) as usize);
  gl::GetProgramInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);
  log.set_len(log_len.max(0) as usize);

  let log = info_log(log);
  warn!(target: "lucent::program", "program failed to link:\n{}", log);

  Err(Error::link(log))
}

struct Reflected {
  members: BTreeMap<String, Member>,
  geometry: Option<GeometryInfo>,
  tess_output: Option<Primitive>,
  subroutine_uniforms: Vec<SubroutineUniforms>,
}

/// Name of an array member without its `[0]` suffix.
fn member_name(raw: &[u8]) -> String {
  let name = String::from_utf8_lossy(raw);
  name.strip_suffix("[0]").unwrap_or(&name).to_owned()
}

/// Read a name filled in by the driver into a buffer of `capacity` bytes.
unsafe fn read_name(capacity: GLint, fill: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar)) -> Vec<u8> {
  let mut buf = vec![0u8; capacity.max(1) as usize];
  let mut len: GLsizei = 0;
  fill(buf.len() as GLsizei, &mut len, buf.as_mut_ptr() as *mut GLchar);
  buf.truncate(len.max(0) as usize);
  buf
}

unsafe fn program_int(handle: GLuint, pname: GLenum) -> GLint {
  let mut value = 0;
  gl::GetProgramiv(handle, pname, &mut value);
  value
}

fn unsupported_type(what: &str, name: &str, ty: GLenum) -> Error {
  Error::reflection(format!("{} {} has an unsupported type 0x{:x}", what, name, ty))
}

unsafe fn reflect(state: &ContextState, handle: GLuint, stages: &[Stage]) -> Result<Reflected> {
  let mut members = BTreeMap::new();

  for attribute in reflect_attributes(handle)? {
    members.insert(attribute.name.clone(), Member::Attribute(attribute));
  }

  // SPIR-V modules keep their names only as debug information; the module itself is authoritative
  if let Some(reflection) = stages
    .iter()
    .find(|s| s.ty == StageType::VertexShader)
    .and_then(|s| s.reflection.as_ref())
  {
    members.retain(|_, m| !matches!(m, Member::Attribute(_)));

    for input in reflection.inputs.values() {
      let name = if input.name.is_empty() {
        format!("location{}", input.location)
      } else {
        input.name.clone()
      };

      members.insert(
        name.clone(),
        Member::Attribute(Attribute {
          name,
          location: input.location,
          array_length: 1,
          ty: input.ty,
        }),
      );
    }
  }

  for uniform in reflect_uniforms(handle)? {
    members.insert(uniform.name.clone(), Member::Uniform(uniform));
  }

  for block in reflect_uniform_blocks(handle) {
    members.insert(block.name.clone(), Member::UniformBlock(block));
  }

  if state.supports(430, "GL_ARB_shader_storage_buffer_object") {
    for block in reflect_storage_blocks(handle) {
      members.insert(block.name.clone(), Member::StorageBlock(block));
    }
  }

  let mut subroutine_uniforms = Vec::new();

  if state.supports(400, "GL_ARB_shader_subroutine") {
    for stage in stages {
      let (subroutines, uniforms) = reflect_subroutines(handle, stage.ty);

      for subroutine in subroutines {
        members.insert(subroutine.name.clone(), Member::Subroutine(subroutine));
      }

      if !uniforms.names.is_empty() {
        subroutine_uniforms.push(uniforms);
      }
    }
  }

  for varying in reflect_varyings(handle)? {
    members.insert(varying.name.clone(), Member::Varying(varying));
  }

  let geometry = if stages.iter().any(|s| s.ty == StageType::GeometryShader) {
    let input = program_int(handle, gl::GEOMETRY_INPUT_TYPE) as GLenum;
    let output = program_int(handle, gl::GEOMETRY_OUTPUT_TYPE) as GLenum;
    let vertices = program_int(handle, gl::GEOMETRY_VERTICES_OUT).max(0) as u32;

    match (Mode::from_glenum(input), Primitive::from_geometry_output(output)) {
      (Some(input), Some(output)) => Some(GeometryInfo {
        input,
        output,
        vertices,
      }),
      _ => {
        return Err(Error::reflection(format!(
          "unknown geometry primitives 0x{:x} / 0x{:x}",
          input, output
        )))
      }
    }
  } else {
    None
  };

  let tess_output = if stages
    .iter()
    .any(|s| s.ty == StageType::TessellationEvaluationShader)
  {
    if program_int(handle, gl::TESS_GEN_POINT_MODE) == GLint::from(gl::TRUE) {
      Some(Primitive::Points)
    } else {
      match program_int(handle, gl::TESS_GEN_MODE) as GLenum {
        gl::ISOLINES => Some(Primitive::Lines),
        gl::TRIANGLES | gl::QUADS => Some(Primitive::Triangles),
        _ => None,
      }
    }
  } else {
    None
  };

  Ok(Reflected {
    members,
    geometry,
    tess_output,
    subroutine_uniforms,
  })
}

unsafe fn reflect_attributes(handle: GLuint) -> Result<Vec<Attribute>> {
  let count = program_int(handle, gl::ACTIVE_ATTRIBUTES);
  let max_len = program_int(handle, gl::ACTIVE_ATTRIBUTE_MAX_LENGTH);
  let mut attributes = Vec::new();

  for i in 0..count.max(0) as GLuint {
    let (mut size, mut ty) = (0, 0);
    let raw = read_name(max_len, |cap, len, buf| {
      gl::GetActiveAttrib(handle, i, cap, len, &mut size, &mut ty, buf)
    });

    if raw.starts_with(b"gl_") {
      continue;
    }

    let c_name = CString::new(raw.clone()).unwrap_or_default();
    let location = gl::GetAttribLocation(handle, c_name.as_ptr());
    let name = member_name(&raw);
    let ty = lookup(ty).ok_or_else(|| unsupported_type("attribute", &name, ty))?;

    attributes.push(Attribute {
      name,
      location: location.max(0) as u32,
      array_length: size.max(1) as usize,
      ty,
    });
  }

  Ok(attributes)
}

unsafe fn reflect_uniforms(handle: GLuint) -> Result<Vec<Uniform>> {
  let count = program_int(handle, gl::ACTIVE_UNIFORMS);
  let max_len = program_int(handle, gl::ACTIVE_UNIFORM_MAX_LENGTH);
  let mut uniforms = Vec::new();

  for i in 0..count.max(0) as GLuint {
    let (mut size, mut ty) = (0, 0);
    let raw = read_name(max_len, |cap, len, buf| {
      gl::GetActiveUniform(handle, i, cap, len, &mut size, &mut ty, buf)
    });

    if raw.starts_with(b"gl_") {
      continue;
    }

    let c_name = CString::new(raw.clone()).unwrap_or_default();
    let location = gl::GetUniformLocation(handle, c_name.as_ptr());

    // members of uniform blocks have no location
    if location < 0 {
      continue;
    }

    let name = member_name(&raw);
    let ty = lookup(ty).ok_or_else(|| unsupported_type("uniform", &name, ty))?;

    uniforms.push(Uniform {
      name,
      location,
      array_length: size.max(1) as usize,
      ty,
    });
  }

  Ok(uniforms)
}

unsafe fn reflect_uniform_blocks(handle: GLuint) -> Vec<UniformBlock> {
  let count = program_int(handle, gl::ACTIVE_UNIFORM_BLOCKS);

  (0..count.max(0) as GLuint)
    .map(|index| {
      let mut name_len = 0;
      gl::GetActiveUniformBlockiv(handle, index, gl::UNIFORM_BLOCK_NAME_LENGTH, &mut name_len);
      let raw = read_name(name_len, |cap, len, buf| {
        gl::GetActiveUniformBlockName(handle, index, cap, len, buf)
      });

      let mut size = 0;
      gl::GetActiveUniformBlockiv(handle, index, gl::UNIFORM_BLOCK_DATA_SIZE, &mut size);

      UniformBlock {
        name: member_name(&raw),
        index,
        size: size.max(0) as usize,
      }
    })
    .collect()
}

unsafe fn reflect_storage_blocks(handle: GLuint) -> Vec<StorageBlock> {
  let (mut count, mut max_len) = (0, 0);
  gl::GetProgramInterfaceiv(
    handle,
    gl::SHADER_STORAGE_BLOCK,
    gl::ACTIVE_RESOURCES,
    &mut count,
  );
  gl::GetProgramInterfaceiv(
    handle,
    gl::SHADER_STORAGE_BLOCK,
    gl::MAX_NAME_LENGTH,
    &mut max_len,
  );

  (0..count.max(0) as GLuint)
    .map(|index| {
      let raw = read_name(max_len, |cap, len, buf| {
        gl::GetProgramResourceName(handle, gl::SHADER_STORAGE_BLOCK, index, cap, len, buf)
      });

      let mut size = 0;
      gl::GetProgramResourceiv(
        handle,
        gl::SHADER_STORAGE_BLOCK,
        index,
        1,
        &gl::BUFFER_DATA_SIZE,
        1,
        null_mut(),
        &mut size,
      );

      StorageBlock {
        name: member_name(&raw),
        index,
        size: size.max(0) as usize,
      }
    })
    .collect()
}

unsafe fn reflect_subroutines(handle: GLuint, stage: StageType) -> (Vec<Subroutine>, SubroutineUniforms) {
  let target = stage.to_glenum();
  let stage_int = |pname| {
    let mut value = 0;
    gl::GetProgramStageiv(handle, target, pname, &mut value);
    value
  };

  let count = stage_int(gl::ACTIVE_SUBROUTINES);
  let max_len = stage_int(gl::ACTIVE_SUBROUTINE_MAX_LENGTH);

  let subroutines = (0..count.max(0) as GLuint)
    .map(|index| {
      let raw = read_name(max_len, |cap, len, buf| {
        gl::GetActiveSubroutineName(handle, target, index, cap, len, buf)
      });

      Subroutine {
        name: member_name(&raw),
        index,
        stage,
      }
    })
    .collect();

  let uniform_count = stage_int(gl::ACTIVE_SUBROUTINE_UNIFORMS);
  let uniform_max_len = stage_int(gl::ACTIVE_SUBROUTINE_UNIFORM_MAX_LENGTH);
  let locations = stage_int(gl::ACTIVE_SUBROUTINE_UNIFORM_LOCATIONS).max(0) as usize;
  let mut names = vec![String::new(); locations];

  for index in 0..uniform_count.max(0) as GLuint {
    let raw = read_name(uniform_max_len, |cap, len, buf| {
      gl::GetActiveSubroutineUniformName(handle, target, index, cap, len, buf)
    });

    let c_name = CString::new(raw.clone()).unwrap_or_default();
    let location = gl::GetSubroutineUniformLocation(handle, target, c_name.as_ptr());

    if let Some(slot) = usize::try_from(location).ok().and_then(|l| names.get_mut(l)) {
      *slot = member_name(&raw);
    }
  }

  (subroutines, SubroutineUniforms { stage, names })
}

unsafe fn reflect_varyings(handle: GLuint) -> Result<Vec<Varying>> {
  let count = program_int(handle, gl::TRANSFORM_FEEDBACK_VARYINGS);
  let max_len = program_int(handle, gl::TRANSFORM_FEEDBACK_VARYING_MAX_LENGTH);
  let mut varyings = Vec::new();

  for number in 0..count.max(0) as GLuint {
    let (mut size, mut ty) = (0, 0);
    let raw = read_name(max_len, |cap, len, buf| {
      gl::GetTransformFeedbackVarying(handle, number, cap, len, &mut size, &mut ty, buf)
    });

    let name = member_name(&raw);
    let ty = lookup(ty).ok_or_else(|| unsupported_type("varying", &name, ty))?;

    varyings.push(Varying {
      name,
      number,
      array_length: size.max(1) as usize,
      dimension: ty.dimension,
    });
  }

  Ok(varyings)
}

impl Program {
  pub(crate) fn live(&self) -> Result<(Rc<ContextState>, GLuint)> {
    self.0.raw.live()
  }

  /// Look up a member by name.
  pub fn get(&self, name: &str) -> Option<&Member> {
    self.0.members.get(name)
  }

  /// Every member, by name.
  pub fn members(&self) -> impl Iterator<Item = &Member> + '_ {
    self.0.members.values()
  }

  pub fn attribute(&self, name: &str) -> Option<&Attribute> {
    match self.get(name) {
      Some(Member::Attribute(attribute)) => Some(attribute),
      _ => None,
    }
  }

  pub fn attributes(&self) -> impl Iterator<Item = &Attribute> + '_ {
    self.members().filter_map(|m| match m {
      Member::Attribute(a) => Some(a),
      _ => None,
    })
  }

  pub fn varyings(&self) -> impl Iterator<Item = &Varying> + '_ {
    self.members().filter_map(|m| match m {
      Member::Varying(v) => Some(v),
      _ => None,
    })
  }

  /// Stages the program was linked from.
  pub fn stages(&self) -> &[StageType] {
    &self.0.stages
  }

  /// Whether the program has no fragment stage and captures varyings.
  pub fn is_transform(&self) -> bool {
    self.0.transform
  }

  pub fn capture_mode(&self) -> CaptureMode {
    self.0.capture_mode
  }

  pub fn geometry_input(&self) -> Option<Mode> {
    self.0.geometry.map(|g| g.input)
  }

  pub fn geometry_output(&self) -> Option<Primitive> {
    self.0.geometry.map(|g| g.output)
  }

  pub fn geometry_vertices(&self) -> Option<u32> {
    self.0.geometry.map(|g| g.vertices)
  }

  /// Primitive captured by transform feedback when drawing with `mode`.
  ///
  /// The last vertex processing stage decides: geometry, then tessellation, then the draw mode.
  pub(crate) fn capture_primitive(&self, mode: Mode) -> Option<Primitive> {
    self
      .0
      .geometry
      .map(|g| g.output)
      .or(self.0.tess_output)
      .or_else(|| mode.transform_primitive())
  }

  /// Subroutine uniform names, stage after stage, in location order.
  pub fn subroutines(&self) -> impl Iterator<Item = &str> + '_ {
    self
      .0
      .subroutine_uniforms
      .iter()
      .flat_map(|s| s.names.iter().map(String::as_str))
  }

  fn uniform(&self, name: &str) -> Result<&Uniform> {
    match self.get(name) {
      Some(Member::Uniform(uniform)) => Ok(uniform),
      _ => Err(Error::lookup(
        "uniform",
        name,
        self.members().filter_map(|m| match m {
          Member::Uniform(u) => Some(u.name.as_str()),
          _ => None,
        }),
      )),
    }
  }

  /// Set a uniform. The value must hold exactly `dimension * array_length` scalars.
  pub fn set(&self, name: &str, value: impl Into<UniformValue>) -> Result<()> {
    let (state, handle) = self.live()?;
    let uniform = self.uniform(name)?;
    let data = encode(&uniform.ty, uniform.array_length, value.into())?;

    unsafe {
      state.gl().use_program(handle);
      uniform::upload(
        uniform.location,
        Setter::for_type(&uniform.ty),
        uniform.array_length as GLsizei,
        &data,
      )
    }
  }

  /// Set a uniform from its raw storage.
  pub fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
    self.set(name, UniformValue::Bytes(bytes.to_vec()))
  }

  /// Raw storage of a uniform, every array element included.
  pub fn read(&self, name: &str) -> Result<Vec<u8>> {
    let (_, handle) = self.live()?;
    let uniform = self.uniform(name)?;

    Ok(unsafe { uniform::download(handle, uniform.location, &uniform.ty, uniform.array_length) })
  }

  /// Current value of a uniform.
  pub fn value(&self, name: &str) -> Result<UniformData> {
    let uniform = self.uniform(name)?;
    let bytes = self.read(name)?;

    Ok(decode(&uniform.ty, &bytes))
  }

  /// Binding point of a uniform block or storage block.
  pub fn block_binding(&self, name: &str) -> Result<u32> {
    let (_, handle) = self.live()?;

    let binding = match self.get(name) {
      Some(Member::UniformBlock(block)) => unsafe {
        let mut binding = 0;
        gl::GetActiveUniformBlockiv(handle, block.index, gl::UNIFORM_BLOCK_BINDING, &mut binding);
        binding
      },

      Some(Member::StorageBlock(block)) => unsafe {
        let mut binding = 0;
        gl::GetProgramResourceiv(
          handle,
          gl::SHADER_STORAGE_BLOCK,
          block.index,
          1,
          &gl::BUFFER_BINDING,
          1,
          null_mut(),
          &mut binding,
        );
        binding
      },

      _ => return Err(self.block_lookup(name)),
    };

    Ok(binding.max(0) as u32)
  }

  /// Attach a uniform block or storage block to a binding point.
  pub fn set_block_binding(&self, name: &str, binding: u32) -> Result<()> {
    let (state, handle) = self.live()?;
    let limits = state.limits();

    match self.get(name) {
      Some(Member::UniformBlock(block)) => {
        check_binding(name, binding, limits.max_uniform_buffer_bindings)?;
        unsafe { gl::UniformBlockBinding(handle, block.index, binding) };
      }

      Some(Member::StorageBlock(block)) => {
        check_binding(name, binding, limits.max_shader_storage_buffer_bindings)?;
        unsafe { gl::ShaderStorageBlockBinding(handle, block.index, binding) };
      }

      _ => return Err(self.block_lookup(name)),
    }

    Ok(())
  }

  fn block_lookup(&self, name: &str) -> Error {
    Error::lookup(
      "block",
      name,
      self.members().filter_map(|m| match m {
        Member::UniformBlock(b) => Some(b.name.as_str()),
        Member::StorageBlock(b) => Some(b.name.as_str()),
        _ => None,
      }),
    )
  }
}

fn check_binding(name: &str, binding: u32, max: u32) -> Result<()> {
  if binding < max {
    Ok(())
  } else {
    Err(Error::out_of_range(format!(
      "binding {} of {} exceeds the {} available",
      binding, name, max
    )))
  }
}

/// Upload subroutine selections, one index per subroutine uniform location, stage after stage.
///
/// Selections are part of the program-use state and must be set again after every program switch.
pub(crate) unsafe fn apply_subroutines(program: &Program, indices: &[u32]) -> Result<()> {
  let expected: usize = program.0.subroutine_uniforms.iter().map(|s| s.names.len()).sum();

  if indices.len() != expected {
    return Err(Error::out_of_range(format!(
      "{} subroutine indices given for {} subroutine uniforms",
      indices.len(),
      expected
    )));
  }

  let mut rest = indices;

  for stage in &program.0.subroutine_uniforms {
    let (head, tail) = rest.split_at(stage.names.len());
    gl::UniformSubroutinesuiv(stage.stage.to_glenum(), head.len() as GLsizei, head.as_ptr());
    rest = tail;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_array_suffix() {
    assert_eq!(member_name(b"lights[0]"), "lights");
    assert_eq!(member_name(b"lights[1].color"), "lights[1].color");
    assert_eq!(member_name(b"color"), "color");
  }

  #[test]
  fn parses_capture_mode() {
    assert_eq!("interleaved".parse::<CaptureMode>().unwrap(), CaptureMode::Interleaved);
    assert_eq!("separate".parse::<CaptureMode>().unwrap(), CaptureMode::Separate);
    assert!("both".parse::<CaptureMode>().is_err());
  }

  #[test]
  fn bindings_are_bounded() {
    assert!(check_binding("Block", 3, 4).is_ok());
    assert!(check_binding("Block", 4, 4).is_err());
  }
}
