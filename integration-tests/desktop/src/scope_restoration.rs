//! Scopes restore what they change.

use crate::harness::{ensure, ensure_eq, Harness, Outcome};
use gl::types::{GLint, GLint64};
use lucent::{state::EnableFlags, texture::SamplerParams, ErrorKind};
use lucent_gl::{Context, TextureOptions};

/// Texture bound to `unit`, straight from the driver.
fn bound_texture(ctx: &Context, unit: u32) -> Result<u32, lucent::Error> {
  let mut name: GLint = 0;

  unsafe {
    gl::ActiveTexture(gl::TEXTURE0 + unit);
    gl::GetIntegerv(gl::TEXTURE_BINDING_2D, &mut name);
  }

  // the active unit changed behind the cache
  ctx.reset_state_cache()?;

  Ok(name as u32)
}

fn bound_framebuffer() -> u32 {
  let mut name: GLint = 0;
  unsafe { gl::GetIntegerv(gl::DRAW_FRAMEBUFFER_BINDING, &mut name) };
  name as u32
}

/// `(buffer, offset, size)` bound to a uniform buffer binding, straight from the driver.
fn bound_uniform_buffer(binding: u32) -> (u32, i64, i64) {
  let mut name: GLint = 0;
  let mut offset: GLint64 = 0;
  let mut size: GLint64 = 0;

  unsafe {
    gl::GetIntegeri_v(gl::UNIFORM_BUFFER_BINDING, binding, &mut name);
    gl::GetInteger64i_v(gl::UNIFORM_BUFFER_START, binding, &mut offset);
    gl::GetInteger64i_v(gl::UNIFORM_BUFFER_SIZE, binding, &mut size);
  }

  (name as u32, offset, size)
}

fn buffer_bindings(ctx: &Context) -> Outcome {
  let align = ctx.limits().uniform_buffer_offset_alignment.max(16) as usize;
  let block = ctx.buffer(&vec![0; 2 * align])?;
  let other = ctx.buffer(&vec![0; 2 * align])?;
  let name = block.glo().name().unwrap_or(0);
  let other_name = other.glo().name().unwrap_or(0);

  // binding 5 starts empty, binding 6 holds a range of another buffer
  other.bind_to_uniform_block(6, align, Some(16))?;
  ensure_eq(bound_uniform_buffer(5).0, 0, "binding 5 before the scope")?;

  let scope = ctx
    .scope()
    .uniform_buffer(&block, 5, align, Some(16))
    .uniform_buffer(&block, 6, 0, None)
    .build()?;

  {
    let _guard = scope.enter()?;

    ensure_eq(
      bound_uniform_buffer(5),
      (name, align as i64, 16),
      "sub-range inside the scope",
    )?;
    ensure_eq(
      bound_uniform_buffer(6),
      (name, 0, 2 * align as i64),
      "whole buffer inside the scope",
    )?;
  }

  ensure_eq(bound_uniform_buffer(5).0, 0, "binding 5 after the scope")?;
  ensure_eq(
    bound_uniform_buffer(6),
    (other_name, align as i64, 16),
    "binding 6 after the scope",
  )?;

  // entering again still reaches the driver
  {
    let _guard = scope.enter()?;
    ensure_eq(bound_uniform_buffer(5).0, name, "binding 5 entered again")?;
  }

  ensure_eq(bound_uniform_buffer(5).0, 0, "binding 5 after the second scope")?;

  match ctx.scope().uniform_buffer(&block, 5, 2 * align, None).build() {
    Err(e) if e.kind() == ErrorKind::OutOfRange => (),
    result => return Err(format!("empty uniform range: {:?}", result.map(|_| ())).into()),
  }

  if ctx.limits().uniform_buffer_offset_alignment > 1 {
    ensure(
      ctx.scope().uniform_buffer(&block, 5, 1, Some(16)).build().is_err(),
      "misaligned uniform range",
    )?;
  }

  Ok(())
}

pub fn fixture() -> Outcome {
  let h = Harness::new()?;
  let ctx = &h.ctx;

  let outside = ctx.texture((2, 2), 4, None, TextureOptions::default())?;
  let inside = ctx.texture((2, 2), 4, None, TextureOptions::default())?;
  let target = ctx.texture((2, 2), 4, None, TextureOptions::default())?;
  let fb = ctx.framebuffer([&target], None)?;
  let sampler = ctx.sampler(SamplerParams::default())?;
  let block = ctx.buffer(&[0; 16])?;

  ctx.enable_only(EnableFlags::BLEND)?;
  outside.bind_to_unit(2)?;

  let flags = ctx.enable_flags();
  let fbo = ctx.fbo();
  let raw_fbo = bound_framebuffer();
  let unit = bound_texture(ctx, 2)?;

  let scope = ctx
    .scope()
    .framebuffer(&fb)
    .enable_only(EnableFlags::DEPTH_TEST | EnableFlags::CULL_FACE)
    .texture(inside.clone(), 2)
    .sampler(&sampler, 2)
    .uniform_buffer(&block, 3, 0, None)
    .build()?;

  {
    let _guard = scope.enter()?;

    ensure_eq(
      ctx.enable_flags(),
      EnableFlags::DEPTH_TEST | EnableFlags::CULL_FACE,
      "flags inside the scope",
    )?;
    ensure(ctx.fbo() == fb, "framebuffer inside the scope")?;
    ensure_eq(Some(bound_framebuffer()), fb.glo().name(), "bound framebuffer")?;
    ensure_eq(Some(bound_texture(ctx, 2)?), inside.glo().name(), "texture inside the scope")?;
  }

  ensure_eq(ctx.enable_flags(), flags, "flags after the scope")?;
  ensure(ctx.fbo() == fbo, "framebuffer after the scope")?;
  ensure_eq(bound_framebuffer(), raw_fbo, "bound framebuffer after the scope")?;
  ensure_eq(bound_texture(ctx, 2)?, unit, "texture after the scope")?;

  // nested scopes unwind in order
  let outer = ctx.scope().enable_only(EnableFlags::RASTERIZER_DISCARD).build()?;
  {
    let _outer = outer.enter()?;
    {
      let _inner = scope.enter()?;
      ensure(ctx.fbo() == fb, "framebuffer of the inner scope")?;
    }

    ensure_eq(
      ctx.enable_flags(),
      EnableFlags::RASTERIZER_DISCARD,
      "flags of the outer scope",
    )?;
  }

  ensure_eq(ctx.enable_flags(), flags, "flags after nested scopes")?;
  ensure(ctx.fbo() == fbo, "framebuffer after nested scopes")?;

  ctx.enable_only(EnableFlags::empty())?;

  buffer_bindings(ctx)
}
