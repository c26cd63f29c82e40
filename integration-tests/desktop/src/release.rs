//! Released objects turn invalid, once.

use crate::harness::{ensure, ensure_eq, Failure, Harness, Outcome};
use lucent::{ErrorKind, Glo, Result};
use lucent_gl::TextureOptions;

fn invalid<T: std::fmt::Debug>(result: Result<T>, what: &str) -> Outcome {
  match result {
    Err(e) if e.kind() == ErrorKind::InvalidObject => Ok(()),
    other => Err(Failure(format!("{}: expected an invalid object, got {:?}", what, other))),
  }
}

const VS: &str = "#version 330
in vec2 in_vert;
void main() {
  gl_Position = vec4(in_vert, 0., 1.);
}
";

const FS: &str = "#version 330
uniform float k;
out vec4 color;
void main() {
  color = vec4(k);
}
";

pub fn fixture() -> Outcome {
  let h = Harness::new()?;
  let ctx = &h.ctx;

  let buffer = ctx.buffer(&[0; 32])?;
  ensure(buffer.glo().is_live(), "fresh buffer")?;
  buffer.release();
  ensure_eq(buffer.glo(), Glo::Invalid, "released buffer")?;
  buffer.release();
  ensure_eq(buffer.glo(), Glo::Invalid, "buffer released twice")?;
  invalid(buffer.read(None, 0), "buffer read")?;
  invalid(buffer.write(&[1], 0), "buffer write")?;

  // clones are the same object
  let texture = ctx.texture((2, 2), 1, None, TextureOptions::default())?;
  let alias = texture.clone();
  alias.release();
  ensure_eq(texture.glo(), Glo::Invalid, "texture through its alias")?;
  invalid(texture.read(0, 1), "texture read")?;

  let program = ctx.program().vertex_shader(VS).fragment_shader(FS).build()?;
  let vertices = ctx.buffer(&[0; 24])?;
  let vao = ctx
    .vertex_array(&program)
    .buffer(&vertices, "2f", ["in_vert"])
    .build()?;

  program.release();
  invalid(program.set("k", 1f32), "program uniform")?;
  invalid(vao.render(Default::default()), "render with a released program")?;

  vao.release();
  vao.release();
  ensure_eq(vao.glo(), Glo::Invalid, "released vertex array")?;

  let color = ctx.renderbuffer((2, 2), 4, 0, lucent::texture::Dtype::F1)?;
  let fb = ctx.framebuffer([&color], None)?;
  fb.release();
  invalid(fb.clear([0.; 4], 1., None), "framebuffer clear")?;
  fb.release();

  ensure_eq(ctx.error(), "GL_NO_ERROR", "driver error")?;

  Ok(())
}
