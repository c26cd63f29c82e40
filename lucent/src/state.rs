//! Render state flags.

use bitflags::bitflags;

bitflags! {
  /// Capabilities toggled by `enable` / `disable` and captured by scopes.
  #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
  pub struct EnableFlags: u32 {
    const BLEND = 1;
    const DEPTH_TEST = 2;
    const CULL_FACE = 4;
    const RASTERIZER_DISCARD = 8;
    const PROGRAM_POINT_SIZE = 16;
  }
}

impl EnableFlags {
  pub const NOTHING: EnableFlags = EnableFlags::empty();

  /// Each flag with the capability it maps to.
  pub fn capabilities() -> [(EnableFlags, gl::types::GLenum); 5] {
    [
      (EnableFlags::BLEND, gl::BLEND),
      (EnableFlags::DEPTH_TEST, gl::DEPTH_TEST),
      (EnableFlags::CULL_FACE, gl::CULL_FACE),
      (EnableFlags::RASTERIZER_DISCARD, gl::RASTERIZER_DISCARD),
      (EnableFlags::PROGRAM_POINT_SIZE, gl::PROGRAM_POINT_SIZE),
    ]
  }
}

bitflags! {
  /// Barriers passed to `memory_barrier`.
  #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
  pub struct MemoryBarrier: u32 {
    const VERTEX_ATTRIB_ARRAY = gl::VERTEX_ATTRIB_ARRAY_BARRIER_BIT;
    const ELEMENT_ARRAY = gl::ELEMENT_ARRAY_BARRIER_BIT;
    const UNIFORM = gl::UNIFORM_BARRIER_BIT;
    const TEXTURE_FETCH = gl::TEXTURE_FETCH_BARRIER_BIT;
    const SHADER_IMAGE_ACCESS = gl::SHADER_IMAGE_ACCESS_BARRIER_BIT;
    const COMMAND = gl::COMMAND_BARRIER_BIT;
    const PIXEL_BUFFER = gl::PIXEL_BUFFER_BARRIER_BIT;
    const TEXTURE_UPDATE = gl::TEXTURE_UPDATE_BARRIER_BIT;
    const BUFFER_UPDATE = gl::BUFFER_UPDATE_BARRIER_BIT;
    const FRAMEBUFFER = gl::FRAMEBUFFER_BARRIER_BIT;
    const TRANSFORM_FEEDBACK = gl::TRANSFORM_FEEDBACK_BARRIER_BIT;
    const ATOMIC_COUNTER = gl::ATOMIC_COUNTER_BARRIER_BIT;
    const SHADER_STORAGE = gl::SHADER_STORAGE_BARRIER_BIT;
    const ALL = gl::ALL_BARRIER_BITS;
  }
}

impl Default for MemoryBarrier {
  fn default() -> Self {
    MemoryBarrier::ALL
  }
}

/// Vertex whose outputs are used for flat-shaded varyings.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ProvokingVertex {
  First,
  #[default]
  Last,
}

/// Depth offset applied to polygons: `factor * dz + units * r`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PolygonOffset {
  pub factor: f32,
  pub units: f32,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn enable_flags() {
    let flags = EnableFlags::BLEND | EnableFlags::DEPTH_TEST;

    assert!(flags.contains(EnableFlags::BLEND));
    assert!(!flags.contains(EnableFlags::CULL_FACE));
    assert_eq!(flags.bits(), 3);
    assert_eq!(EnableFlags::NOTHING, EnableFlags::default());
    assert_eq!(
      EnableFlags::capabilities()
        .iter()
        .fold(EnableFlags::empty(), |acc, (f, _)| acc | *f),
      EnableFlags::all()
    );
  }

  #[test]
  fn all_barriers() {
    assert!(MemoryBarrier::ALL.contains(MemoryBarrier::SHADER_STORAGE | MemoryBarrier::COMMAND));
    assert_eq!(MemoryBarrier::default().bits(), gl::ALL_BARRIER_BITS);
  }
}
