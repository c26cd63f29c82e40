//! Shared GLSL through the include registry.

use crate::harness::{bytes, ensure, ensure_eq, floats, Failure, Harness, Outcome};
use lucent::ErrorKind;
use lucent_gl::TransformOptions;

const SCALE: &str = "float scale(float x) {
  return x * 3.;
}
";

const OFFSET: &str = "#include \"scale\"

float offset(float x) {
  return scale(x) + 1.;
}
";

const VS: &str = "#version 330
#include \"offset\"

in float in_x;
out float out_x;

void main() {
  out_x = offset(in_x);
}
";

fn compilation_error(result: lucent::Result<lucent_gl::Program>, what: &str) -> Outcome {
  match result {
    Err(e) if e.kind() == ErrorKind::Compilation => Ok(()),
    Err(e) => Err(Failure(format!("{}: unexpected error {}", what, e))),
    Ok(_) => Err(Failure(format!("{}: the program linked", what))),
  }
}

pub fn fixture() -> Outcome {
  let h = Harness::new()?;
  let ctx = &h.ctx;

  ctx.set_include("scale", SCALE);
  ctx.set_include("offset", OFFSET);
  ensure(ctx.includes().get("scale").is_some(), "registered include")?;

  let program = ctx.program().vertex_shader(VS).varyings(["out_x"]).build()?;
  let input = ctx.buffer(&bytes(&[1., 2.]))?;
  let output = ctx.reserve_buffer(8, false)?;
  let vao = ctx
    .vertex_array(&program)
    .buffer(&input, "1f", ["in_x"])
    .build()?;

  vao.transform(&[&output], TransformOptions::default())?;
  ensure_eq(floats(&output.read(None, 0)?), vec![4., 7.], "included functions")?;

  ctx.set_include("scale", "#include \"offset\"\n");
  compilation_error(
    ctx.program().vertex_shader(VS).varyings(["out_x"]).build(),
    "include cycle",
  )?;

  ctx.remove_include("scale");
  compilation_error(
    ctx.program().vertex_shader(VS).varyings(["out_x"]).build(),
    "unresolved include",
  )?;

  Ok(())
}
