//! Driver blending into a float framebuffer agrees with the host formula.

use crate::harness::{ensure, floats, Harness, Outcome};
use lucent::{
  blending::{blend, BlendEquations, BlendFunc, Equation, Factor},
  state::EnableFlags,
  texture::Dtype,
};
use lucent_gl::{FramebufferReadOptions, RenderOptions, TextureOptions};

const COVER: &str = "#version 330
void main() {
  vec2 p = vec2(gl_VertexID % 2, gl_VertexID / 2) * 4. - 1.;
  gl_Position = vec4(p, 0., 1.);
}
";

const FILL: &str = "#version 330
uniform vec4 color;
out vec4 frag;

void main() {
  frag = color;
}
";

const SRC: [f32; 4] = [0.25, 0.5, 0.75, 0.5];
const DST: [f32; 4] = [0.5, 0.125, 1., 0.25];

pub fn fixture() -> Outcome {
  let h = Harness::new()?;
  let ctx = &h.ctx;

  let target = ctx.texture((1, 1), 4, None, TextureOptions::default().dtype(Dtype::F4))?;
  let fb = ctx.framebuffer([&target], None)?;
  fb.bind()?;

  let program = ctx.program().vertex_shader(COVER).fragment_shader(FILL).build()?;
  program.set("color", SRC)?;

  let vao = ctx.vertex_array(&program).build()?;
  let cover = RenderOptions {
    vertices: Some(3),
    ..RenderOptions::default()
  };

  let read = FramebufferReadOptions {
    components: 4,
    dtype: Dtype::F4,
    ..FramebufferReadOptions::default()
  };

  for equation in Equation::ALL {
    for src in Factor::ALL {
      for dst in Factor::ALL {
        let func = BlendFunc::new(src, dst);
        let equations = BlendEquations::new(equation);

        ctx.disable(EnableFlags::BLEND)?;
        fb.clear(DST, 1., None)?;

        ctx.enable(EnableFlags::BLEND)?;
        ctx.set_blend_func(func)?;
        ctx.set_blend_equation(equations)?;
        vao.render(cover)?;

        let got = floats(&fb.read(read)?);
        let expected = blend(SRC, DST, func, equations);

        let close = got
          .iter()
          .zip(expected)
          .all(|(g, e)| (g - e).abs() <= 1e-6);

        ensure(
          close,
          format!(
            "{:?} with {:?}/{:?}: got {:?}, expected {:?}",
            equation, src, dst, got, expected
          ),
        )?;
      }
    }
  }

  ctx.disable(EnableFlags::BLEND)?;
  ctx.screen().bind()?;

  Ok(())
}
