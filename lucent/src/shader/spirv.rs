//! Minimal SPIR-V reflection.
//!
//! Only what is needed to bind vertex attributes is recovered: entry points, and for every
//! `Input` variable decorated with a `Location`, its name and GLSL type. Types are resolved by a
//! fixed-point pass over the type declarations, each type id getting a bitmask made of its scalar
//! kind and its shape (vector size, matrix column count).

use crate::error::{Error, Result};
use crate::shader::types::{self, GlslType};
use gl::types::GLenum;
use std::collections::{BTreeMap, HashMap};

/// First word of every SPIR-V module.
pub const MAGIC: u32 = 0x0723_0203;

const HEADER_WORDS: usize = 5;

const OP_NAME: u32 = 5;
const OP_ENTRY_POINT: u32 = 15;
const OP_TYPE_INT: u32 = 21;
const OP_TYPE_FLOAT: u32 = 22;
const OP_TYPE_VECTOR: u32 = 23;
const OP_TYPE_MATRIX: u32 = 24;
const OP_TYPE_POINTER: u32 = 32;
const OP_VARIABLE: u32 = 59;
const OP_DECORATE: u32 = 71;

const DECORATION_LOCATION: u32 = 30;
const STORAGE_CLASS_INPUT: u32 = 1;

const INT32: u32 = 1;
const UINT32: u32 = 2;
const FLOAT32: u32 = 4;
const FLOAT64: u32 = 8;
const VEC2: u32 = 16;
const VEC3: u32 = 32;
const VEC4: u32 = 64;
const MAT2: u32 = 128;
const MAT3: u32 = 256;
const MAT4: u32 = 512;

const KIND_BITS: u32 = INT32 | UINT32 | FLOAT32 | FLOAT64;
const VEC_BITS: u32 = VEC2 | VEC3 | VEC4;

/// Whether `bytes` starts with the SPIR-V magic word (little-endian).
pub fn is_spirv(bytes: &[u8]) -> bool {
  bytes.len() >= HEADER_WORDS * 4 && bytes[..4] == MAGIC.to_le_bytes()
}

/// An entry point declared by the module.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryPoint {
  /// SPIR-V execution model (0 is vertex, 4 fragment, 5 compute…).
  pub execution_model: u32,
  pub name: String,
}

/// A vertex input recovered from the module.
#[derive(Clone, Debug, PartialEq)]
pub struct SpirvInput {
  pub name: String,
  pub location: u32,
  pub ty: GlslType,
}

/// Everything recovered from a module.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reflection {
  pub entry_points: Vec<EntryPoint>,
  /// Inputs keyed by location.
  pub inputs: BTreeMap<u32, SpirvInput>,
}

impl Reflection {
  /// Attribute table keyed by location, with the same tuples as the GLSL path.
  pub fn attributes(&self) -> BTreeMap<u32, (u32, GLenum, u32, u32, bool, char)> {
    self
      .inputs
      .iter()
      .map(|(&loc, input)| (loc, input.ty.attribute_info()))
      .collect()
  }
}

#[derive(Clone, Copy, Debug)]
enum TypeDecl {
  Int { width: u32, signed: bool },
  Float { width: u32 },
  Vector { component: u32, count: u32 },
  Matrix { column: u32, count: u32 },
  Pointer { pointee: u32 },
}

#[derive(Clone, Copy, Debug)]
struct Variable {
  id: u32,
  pointer_type: u32,
  storage_class: u32,
}

/// Reflect a SPIR-V module.
pub fn reflect(bytes: &[u8]) -> Result<Reflection> {
  if !is_spirv(bytes) {
    return Err(Error::reflection("not a SPIR-V module"));
  }

  if bytes.len() % 4 != 0 {
    return Err(Error::reflection(format!(
      "SPIR-V module size ({} bytes) is not a multiple of 4",
      bytes.len()
    )));
  }

  let words: Vec<u32> = bytes
    .chunks_exact(4)
    .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
    .collect();

  let mut names = HashMap::new();
  let mut locations = HashMap::new();
  let mut decls = HashMap::new();
  let mut variables = Vec::new();
  let mut entry_points = Vec::new();

  let mut i = HEADER_WORDS;
  while i < words.len() {
    let word_count = (words[i] >> 16) as usize;
    let opcode = words[i] & 0xffff;

    if word_count == 0 || i + word_count > words.len() {
      return Err(Error::reflection(format!(
        "truncated SPIR-V instruction at word {}",
        i
      )));
    }

    let ops = &words[i + 1..i + word_count];

    match (opcode, ops) {
      (OP_NAME, [target, name @ ..]) => {
        names.insert(*target, literal_string(name));
      }

      (OP_ENTRY_POINT, [model, _id, rest @ ..]) => {
        entry_points.push(EntryPoint {
          execution_model: *model,
          name: literal_string(rest),
        });
      }

      (OP_TYPE_INT, [id, width, signedness, ..]) => {
        decls.insert(
          *id,
          TypeDecl::Int {
            width: *width,
            signed: *signedness != 0,
          },
        );
      }

      (OP_TYPE_FLOAT, [id, width, ..]) => {
        decls.insert(*id, TypeDecl::Float { width: *width });
      }

      (OP_TYPE_VECTOR, [id, component, count, ..]) => {
        decls.insert(
          *id,
          TypeDecl::Vector {
            component: *component,
            count: *count,
          },
        );
      }

      (OP_TYPE_MATRIX, [id, column, count, ..]) => {
        decls.insert(
          *id,
          TypeDecl::Matrix {
            column: *column,
            count: *count,
          },
        );
      }

      (OP_TYPE_POINTER, [id, _storage, pointee, ..]) => {
        decls.insert(*id, TypeDecl::Pointer { pointee: *pointee });
      }

      (OP_VARIABLE, [pointer_type, id, storage_class, ..]) => {
        variables.push(Variable {
          id: *id,
          pointer_type: *pointer_type,
          storage_class: *storage_class,
        });
      }

      (OP_DECORATE, [target, DECORATION_LOCATION, location, ..]) => {
        locations.insert(*target, *location);
      }

      _ => (),
    }

    i += word_count;
  }

  let masks = resolve_masks(&decls);
  let mut inputs = BTreeMap::new();

  for var in variables
    .iter()
    .filter(|v| v.storage_class == STORAGE_CLASS_INPUT)
  {
    let location = match locations.get(&var.id) {
      Some(&location) => location,
      // built-ins carry no location
      None => continue,
    };

    let type_id = match decls.get(&var.pointer_type) {
      Some(TypeDecl::Pointer { pointee }) => *pointee,
      _ => var.pointer_type,
    };

    let ty = masks
      .get(&type_id)
      .and_then(|&mask| gl_type_for_mask(mask))
      .and_then(types::lookup)
      .ok_or_else(|| {
        Error::reflection(format!(
          "unsupported SPIR-V type %{} for input at location {}",
          type_id, location
        ))
      })?;

    inputs.insert(
      location,
      SpirvInput {
        name: names.get(&var.id).cloned().unwrap_or_default(),
        location,
        ty,
      },
    );
  }

  Ok(Reflection {
    entry_points,
    inputs,
  })
}

// Assemble the type masks until no more type can be resolved.
fn resolve_masks(decls: &HashMap<u32, TypeDecl>) -> HashMap<u32, u32> {
  let mut masks: HashMap<u32, u32> = HashMap::new();

  loop {
    let mut changed = false;

    for (&id, decl) in decls {
      if masks.contains_key(&id) {
        continue;
      }

      let mask = match *decl {
        TypeDecl::Int {
          width: 32,
          signed: true,
        } => Some(INT32),
        TypeDecl::Int {
          width: 32,
          signed: false,
        } => Some(UINT32),
        TypeDecl::Float { width: 32 } => Some(FLOAT32),
        TypeDecl::Float { width: 64 } => Some(FLOAT64),
        TypeDecl::Int { .. } | TypeDecl::Float { .. } => Some(0),

        TypeDecl::Vector { component, count } => masks
          .get(&component)
          .map(|&m| shape_bits(count, [VEC2, VEC3, VEC4]).map_or(0, |v| m | v)),

        TypeDecl::Matrix { column, count } => masks.get(&column).map(|&m| {
          match (m & VEC_BITS, shape_bits(count, [MAT2, MAT3, MAT4])) {
            (vec, Some(mat)) if vec != 0 => (m & KIND_BITS) | vec | mat,
            _ => 0,
          }
        }),

        TypeDecl::Pointer { pointee } => masks.get(&pointee).copied(),
      };

      if let Some(mask) = mask {
        masks.insert(id, mask);
        changed = true;
      }
    }

    if !changed {
      break masks;
    }
  }
}

fn shape_bits(count: u32, bits: [u32; 3]) -> Option<u32> {
  match count {
    2 => Some(bits[0]),
    3 => Some(bits[1]),
    4 => Some(bits[2]),
    _ => None,
  }
}

/// Translate a resolved type mask to its OpenGL type enum.
fn gl_type_for_mask(mask: u32) -> Option<GLenum> {
  let vec = match mask & VEC_BITS {
    0 => 1,
    VEC2 => 2,
    VEC3 => 3,
    VEC4 => 4,
    _ => return None,
  };

  let mat = match mask & (MAT2 | MAT3 | MAT4) {
    0 => 0,
    MAT2 => 2,
    MAT3 => 3,
    MAT4 => 4,
    _ => return None,
  };

  let ty = match (mask & KIND_BITS, vec, mat) {
    (INT32, 1, 0) => gl::INT,
    (INT32, 2, 0) => gl::INT_VEC2,
    (INT32, 3, 0) => gl::INT_VEC3,
    (INT32, 4, 0) => gl::INT_VEC4,
    (UINT32, 1, 0) => gl::UNSIGNED_INT,
    (UINT32, 2, 0) => gl::UNSIGNED_INT_VEC2,
    (UINT32, 3, 0) => gl::UNSIGNED_INT_VEC3,
    (UINT32, 4, 0) => gl::UNSIGNED_INT_VEC4,
    (FLOAT32, 1, 0) => gl::FLOAT,
    (FLOAT32, 2, 0) => gl::FLOAT_VEC2,
    (FLOAT32, 3, 0) => gl::FLOAT_VEC3,
    (FLOAT32, 4, 0) => gl::FLOAT_VEC4,
    (FLOAT64, 1, 0) => gl::DOUBLE,
    (FLOAT64, 2, 0) => gl::DOUBLE_VEC2,
    (FLOAT64, 3, 0) => gl::DOUBLE_VEC3,
    (FLOAT64, 4, 0) => gl::DOUBLE_VEC4,

    // (kind, column size, column count)
    (FLOAT32, 2, 2) => gl::FLOAT_MAT2,
    (FLOAT32, 3, 2) => gl::FLOAT_MAT2x3,
    (FLOAT32, 4, 2) => gl::FLOAT_MAT2x4,
    (FLOAT32, 2, 3) => gl::FLOAT_MAT3x2,
    (FLOAT32, 3, 3) => gl::FLOAT_MAT3,
    (FLOAT32, 4, 3) => gl::FLOAT_MAT3x4,
    (FLOAT32, 2, 4) => gl::FLOAT_MAT4x2,
    (FLOAT32, 3, 4) => gl::FLOAT_MAT4x3,
    (FLOAT32, 4, 4) => gl::FLOAT_MAT4,
    (FLOAT64, 2, 2) => gl::DOUBLE_MAT2,
    (FLOAT64, 3, 2) => gl::DOUBLE_MAT2x3,
    (FLOAT64, 4, 2) => gl::DOUBLE_MAT2x4,
    (FLOAT64, 2, 3) => gl::DOUBLE_MAT3x2,
    (FLOAT64, 3, 3) => gl::DOUBLE_MAT3,
    (FLOAT64, 4, 3) => gl::DOUBLE_MAT3x4,
    (FLOAT64, 2, 4) => gl::DOUBLE_MAT4x2,
    (FLOAT64, 3, 4) => gl::DOUBLE_MAT4x3,
    (FLOAT64, 4, 4) => gl::DOUBLE_MAT4,

    _ => return None,
  };

  Some(ty)
}

// Null-terminated UTF-8, packed little-endian into words.
fn literal_string(words: &[u32]) -> String {
  let bytes: Vec<u8> = words
    .iter()
    .flat_map(|w| w.to_le_bytes())
    .take_while(|&b| b != 0)
    .collect();

  String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Module {
    words: Vec<u32>,
  }

  impl Module {
    fn new() -> Self {
      Module {
        words: vec![MAGIC, 0x0001_0000, 0, 64, 0],
      }
    }

    fn op(mut self, opcode: u32, operands: &[u32]) -> Self {
      self
        .words
        .push(((operands.len() as u32 + 1) << 16) | opcode);
      self.words.extend_from_slice(operands);
      self
    }

    fn bytes(&self) -> Vec<u8> {
      self.words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }
  }

  fn string(s: &str) -> Vec<u32> {
    let mut bytes = s.as_bytes().to_vec();
    bytes.push(0);
    while bytes.len() % 4 != 0 {
      bytes.push(0);
    }

    bytes
      .chunks_exact(4)
      .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
      .collect()
  }

  fn with(head: &[u32], tail: &[u32]) -> Vec<u32> {
    head.iter().chain(tail).copied().collect()
  }

  fn vertex_module() -> Module {
    Module::new()
      .op(OP_ENTRY_POINT, &with(&[0, 1], &with(&string("main"), &[10, 11])))
      .op(OP_NAME, &with(&[10], &string("in_pos")))
      .op(OP_NAME, &with(&[11], &string("in_uv")))
      .op(OP_NAME, &with(&[12], &string("v_uv")))
      .op(OP_DECORATE, &[10, DECORATION_LOCATION, 0])
      .op(OP_DECORATE, &[11, DECORATION_LOCATION, 1])
      .op(OP_DECORATE, &[12, DECORATION_LOCATION, 0])
      // BuiltIn VertexIndex
      .op(OP_DECORATE, &[13, 11, 42])
      .op(OP_TYPE_FLOAT, &[2, 32])
      .op(OP_TYPE_VECTOR, &[3, 2, 3])
      .op(OP_TYPE_VECTOR, &[4, 2, 2])
      .op(OP_TYPE_INT, &[7, 32, 1])
      .op(OP_TYPE_POINTER, &[5, STORAGE_CLASS_INPUT, 3])
      .op(OP_TYPE_POINTER, &[6, STORAGE_CLASS_INPUT, 4])
      .op(OP_TYPE_POINTER, &[8, 3, 4])
      .op(OP_TYPE_POINTER, &[9, STORAGE_CLASS_INPUT, 7])
      .op(OP_VARIABLE, &[5, 10, STORAGE_CLASS_INPUT])
      .op(OP_VARIABLE, &[6, 11, STORAGE_CLASS_INPUT])
      .op(OP_VARIABLE, &[8, 12, 3])
      .op(OP_VARIABLE, &[9, 13, STORAGE_CLASS_INPUT])
  }

  #[test]
  fn detects_magic() {
    assert!(is_spirv(&vertex_module().bytes()));
    assert!(!is_spirv(b"#version 330 core\nvoid main() {}"));
    assert!(!is_spirv(&MAGIC.to_le_bytes()));
  }

  #[test]
  fn reflects_vertex_inputs() {
    let refl = reflect(&vertex_module().bytes()).unwrap();

    assert_eq!(
      refl.entry_points,
      [EntryPoint {
        execution_model: 0,
        name: "main".to_owned()
      }]
    );

    let attrs = refl.attributes();
    assert_eq!(attrs.len(), 2);
    assert_eq!(attrs[&0], (3, gl::FLOAT, 1, 3, true, 'f'));
    assert_eq!(attrs[&1], (2, gl::FLOAT, 1, 2, true, 'f'));

    assert_eq!(refl.inputs[&0].name, "in_pos");
    assert_eq!(refl.inputs[&1].name, "in_uv");
  }

  #[test]
  fn disambiguates_double_matrices() {
    let bytes = Module::new()
      .op(OP_DECORATE, &[20, DECORATION_LOCATION, 0])
      .op(OP_DECORATE, &[21, DECORATION_LOCATION, 4])
      .op(OP_TYPE_FLOAT, &[2, 64])
      .op(OP_TYPE_VECTOR, &[3, 2, 2])
      .op(OP_TYPE_VECTOR, &[4, 2, 3])
      .op(OP_TYPE_MATRIX, &[5, 3, 3])
      .op(OP_TYPE_MATRIX, &[6, 4, 2])
      .op(OP_TYPE_POINTER, &[7, STORAGE_CLASS_INPUT, 5])
      .op(OP_TYPE_POINTER, &[8, STORAGE_CLASS_INPUT, 6])
      .op(OP_VARIABLE, &[7, 20, STORAGE_CLASS_INPUT])
      .op(OP_VARIABLE, &[8, 21, STORAGE_CLASS_INPUT])
      .bytes();

    let refl = reflect(&bytes).unwrap();

    assert_eq!(refl.inputs[&0].ty.gl_type, gl::DOUBLE_MAT3x2);
    assert_eq!(refl.inputs[&4].ty.gl_type, gl::DOUBLE_MAT2x3);
    assert_eq!(refl.inputs[&0].name, "");
  }

  #[test]
  fn forward_referenced_types_resolve() {
    // pointer declared before its pointee
    let bytes = Module::new()
      .op(OP_DECORATE, &[20, DECORATION_LOCATION, 2])
      .op(OP_TYPE_POINTER, &[7, STORAGE_CLASS_INPUT, 3])
      .op(OP_TYPE_VECTOR, &[3, 2, 4])
      .op(OP_TYPE_INT, &[2, 32, 0])
      .op(OP_VARIABLE, &[7, 20, STORAGE_CLASS_INPUT])
      .bytes();

    let refl = reflect(&bytes).unwrap();
    assert_eq!(refl.inputs[&2].ty.gl_type, gl::UNSIGNED_INT_VEC4);
  }

  #[test]
  fn unknown_mask_names_type_id() {
    let bytes = Module::new()
      .op(OP_DECORATE, &[20, DECORATION_LOCATION, 0])
      .op(OP_TYPE_INT, &[2, 16, 1])
      .op(OP_TYPE_VECTOR, &[3, 2, 2])
      .op(OP_TYPE_POINTER, &[7, STORAGE_CLASS_INPUT, 3])
      .op(OP_VARIABLE, &[7, 20, STORAGE_CLASS_INPUT])
      .bytes();

    let err = reflect(&bytes).unwrap_err();

    assert_eq!(err.kind(), crate::ErrorKind::Reflection);
    assert!(err.to_string().contains("%3"), "{}", err);
  }

  #[test]
  fn rejects_truncated_streams() {
    let mut words = Module::new().words;
    words.push((4 << 16) | OP_VARIABLE);
    words.push(1);
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();

    assert!(reflect(&bytes).is_err());

    let mut odd = vertex_module().bytes();
    odd.push(0);
    assert!(reflect(&odd).is_err());
  }
}
