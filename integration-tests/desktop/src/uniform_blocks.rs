//! Uniform blocks bound to explicit binding points.

use crate::harness::{bytes, ensure_eq, floats, Harness, Outcome};
use lucent_gl::TransformOptions;

const BLOCKS: &str = "#version 330
uniform Block1 { float x; };
uniform Block2 { float y; };
uniform Block3 { float z; };

in vec2 in_v;
out vec2 out_v;

void main() {
  out_v = in_v * z + vec2(x, y);
}
";

pub fn fixture() -> Outcome {
  let h = Harness::new()?;
  let ctx = &h.ctx;

  let program = ctx
    .program()
    .vertex_shader(BLOCKS)
    .varyings(["out_v"])
    .build()?;

  for (block, binding) in [("Block1", 2), ("Block2", 4), ("Block3", 1)] {
    program.set_block_binding(block, binding)?;
    ensure_eq(program.block_binding(block)?, binding, block)?;
  }

  let x = ctx.buffer(&bytes(&[9.5]))?;
  let y = ctx.buffer(&bytes(&[4.]))?;
  let z = ctx.buffer(&bytes(&[0.]))?;
  x.bind_to_uniform_block(2, 0, None)?;
  y.bind_to_uniform_block(4, 0, None)?;
  z.bind_to_uniform_block(1, 0, None)?;

  let input = ctx.buffer(&bytes(&[100., 1000.]))?;
  let output = ctx.reserve_buffer(8, false)?;
  let vao = ctx
    .vertex_array(&program)
    .buffer(&input, "2f", ["in_v"])
    .build()?;

  vao.transform(&[&output], TransformOptions::default())?;
  ensure_eq(floats(&output.read(None, 0)?), vec![9.5, 4.], "first pass")?;

  let three = ctx.buffer(&bytes(&[3.]))?;
  three.bind_to_uniform_block(1, 0, None)?;

  vao.transform(&[&output], TransformOptions::default())?;
  ensure_eq(floats(&output.read(None, 0)?), vec![309.5, 3004.], "rebound block")?;

  Ok(())
}
