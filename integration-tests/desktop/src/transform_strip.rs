//! Transform feedback capture of expanded primitives.

use crate::harness::{bytes, ensure, ensure_eq, floats, Harness, Outcome};
use lucent::{mode::Mode, ErrorKind};
use lucent_gl::{RenderOptions, TransformOptions, INDIRECT_COMMAND_SIZE};

const PASS_THROUGH: &str = "#version 330
in vec2 in_vert;
out vec2 out_vert;

void main() {
  out_vert = in_vert;
}
";

const DOUBLE: &str = "#version 330
in vec2 in_vert;
out vec2 out_vert;

void main() {
  out_vert = in_vert + in_vert;
}
";

pub fn fixture() -> Outcome {
  let h = Harness::new()?;
  let ctx = &h.ctx;

  // a strip of four vertices captures two triangles
  let program = ctx
    .program()
    .vertex_shader(PASS_THROUGH)
    .varyings(["out_vert"])
    .build()?;
  let input = ctx.buffer(&bytes(&[1., 1., 2., 2., 3., 3., 4., 4.]))?;
  let output = ctx.reserve_buffer(6 * 2 * 4, false)?;

  let vao = ctx
    .vertex_array(&program)
    .buffer(&input, "2f", ["in_vert"])
    .mode(Mode::TriangleStrip)
    .build()?;
  ensure_eq(vao.vertices(), 4, "strip vertex count")?;

  // programs without fragment shader only transform
  match vao.render(RenderOptions::default()) {
    Err(e) if e.kind() == ErrorKind::Creation => (),
    result => return Err(format!("render with a transform program: {:?}", result).into()),
  }

  if ctx.version_code() >= 430 {
    let commands = ctx.reserve_buffer(INDIRECT_COMMAND_SIZE, false)?;
    ensure(
      vao.render_indirect(&commands, None, None, 0).is_err(),
      "indirect render with a transform program",
    )?;
  }

  // captures can’t target an empty range
  match vao.transform(
    &[&output],
    TransformOptions {
      buffer_offset: output.size(),
      ..TransformOptions::default()
    },
  ) {
    Err(e) if e.kind() == ErrorKind::OutOfRange => (),
    result => return Err(format!("capture into an empty range: {:?}", result).into()),
  }

  vao.transform(&[&output], TransformOptions::default())?;
  ensure_eq(
    floats(&output.read(None, 0)?),
    vec![1., 1., 2., 2., 3., 3., 3., 3., 2., 2., 4., 4.],
    "captured strip",
  )?;

  // captured buffers can feed the next transform
  let program = ctx
    .program()
    .vertex_shader(DOUBLE)
    .varyings(["out_vert"])
    .build()?;
  let values = [0.5, -1.25, 3., 1024., -0.0, 7.75];
  let a = ctx.buffer(&bytes(&values))?;
  let b = ctx.reserve_buffer(a.size(), false)?;

  let vao = ctx
    .vertex_array(&program)
    .buffer(&a, "2f", ["in_vert"])
    .build()?;
  ensure_eq(vao.mode(), Mode::Points, "transform vertex array mode")?;

  vao.transform(&[&b], TransformOptions::default())?;
  let doubled: Vec<f32> = values.iter().map(|v| v + v).collect();
  ensure_eq(floats(&b.read(None, 0)?), doubled.clone(), "doubled values")?;

  let swapped = ctx
    .vertex_array(&program)
    .buffer(&b, "2f", ["in_vert"])
    .build()?;
  swapped.transform(&[&a], TransformOptions::default())?;
  let quadrupled: Vec<f32> = doubled.iter().map(|v| v + v).collect();
  ensure_eq(floats(&a.read(None, 0)?), quadrupled, "swapped buffers")?;

  Ok(())
}
