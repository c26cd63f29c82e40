//! SPIR-V vertex inputs reflect to the same attribute table as the GLSL ones.

use crate::harness::{ensure, ensure_eq, Harness, Outcome};
use lucent::shader::{
  spirv::{self, MAGIC},
  ShaderSource,
};
use std::collections::BTreeMap;

const OP_NAME: u32 = 5;
const OP_ENTRY_POINT: u32 = 15;
const OP_TYPE_FLOAT: u32 = 22;
const OP_TYPE_VECTOR: u32 = 23;
const OP_TYPE_POINTER: u32 = 32;
const OP_VARIABLE: u32 = 59;
const OP_DECORATE: u32 = 71;
const LOCATION: u32 = 30;
const INPUT: u32 = 1;

const GLSL: &str = "#version 330
layout (location = 0) in vec3 in_pos;
layout (location = 1) in vec2 in_uv;
out vec2 v_uv;

void main() {
  gl_Position = vec4(in_pos, 1.);
  v_uv = in_uv;
}
";

const FRAGMENT: &str = "#version 330
in vec2 v_uv;
out vec4 color;

void main() {
  color = vec4(v_uv, 0., 1.);
}
";

fn op(words: &mut Vec<u32>, opcode: u32, operands: &[u32]) {
  words.push(((operands.len() as u32 + 1) << 16) | opcode);
  words.extend_from_slice(operands);
}

fn literal(s: &str) -> Vec<u32> {
  let mut bytes = s.as_bytes().to_vec();
  bytes.resize((bytes.len() / 4 + 1) * 4, 0);

  bytes
    .chunks_exact(4)
    .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
    .collect()
}

fn named(id: u32, name: &str) -> Vec<u32> {
  let mut operands = vec![id];
  operands.extend(literal(name));
  operands
}

/// `in vec3 in_pos` at location 0 and `in vec2 in_uv` at location 1.
fn vertex_module() -> Vec<u8> {
  let mut words = vec![MAGIC, 0x0001_0000, 0, 64, 0];

  let mut entry = vec![0, 1];
  entry.extend(literal("main"));
  entry.extend([10, 11]);

  op(&mut words, OP_ENTRY_POINT, &entry);
  op(&mut words, OP_NAME, &named(10, "in_pos"));
  op(&mut words, OP_NAME, &named(11, "in_uv"));
  op(&mut words, OP_DECORATE, &[10, LOCATION, 0]);
  op(&mut words, OP_DECORATE, &[11, LOCATION, 1]);
  op(&mut words, OP_TYPE_FLOAT, &[2, 32]);
  op(&mut words, OP_TYPE_VECTOR, &[3, 2, 3]);
  op(&mut words, OP_TYPE_VECTOR, &[4, 2, 2]);
  op(&mut words, OP_TYPE_POINTER, &[5, INPUT, 3]);
  op(&mut words, OP_TYPE_POINTER, &[6, INPUT, 4]);
  op(&mut words, OP_VARIABLE, &[5, 10, INPUT]);
  op(&mut words, OP_VARIABLE, &[6, 11, INPUT]);

  words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

pub fn fixture() -> Outcome {
  let module = vertex_module();

  let source = ShaderSource::from_bytes(module.clone())?;
  ensure(source.is_spirv(), "SPIR-V magic not detected")?;

  let reflection = spirv::reflect(&module)?;
  let expected = BTreeMap::from([
    (0, (3, gl::FLOAT, 1, 3, true, 'f')),
    (1, (2, gl::FLOAT, 1, 2, true, 'f')),
  ]);
  ensure_eq(reflection.attributes(), expected.clone(), "SPIR-V attributes")?;

  let h = Harness::new()?;
  let program = h
    .ctx
    .program()
    .vertex_shader(GLSL)
    .fragment_shader(FRAGMENT)
    .build()?;

  let linked: BTreeMap<_, _> = program
    .attributes()
    .map(|a| (a.location, a.info()))
    .collect();
  ensure_eq(linked, expected, "GLSL attributes")?;

  Ok(())
}
