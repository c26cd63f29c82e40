//! Primitive modes.

use gl::types::GLenum;

/// Vertices can be connected via several modes.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Mode {
  /// A single point.
  ///
  /// Points are left unconnected from each other and represent a _point cloud_. This is the
  /// default mode of transform programs.
  Points,
  /// A line, defined by two points.
  ///
  /// Every pair of vertices are connected together to form a straight line.
  Lines,
  /// A closed strip line.
  LineLoop,
  /// A strip line, defined by at least two points and zero or many other ones.
  ///
  /// The first two vertices create a line, and every new vertex flowing in the graphics pipeline
  /// (starting from the third, then) well extend the initial line, making a curve composed of
  /// several segments.
  LineStrip,
  /// A triangle, defined by three points. This is the default mode of render programs.
  #[default]
  Triangles,
  /// A triangle strip: every new vertex forms a triangle with the two previous ones, sharing the
  /// edge created for the previous triangle.
  TriangleStrip,
  /// A triangle fan: the first vertex is the center, and every new vertex forms a triangle with
  /// the center and the previous vertex.
  TriangleFan,
  LinesAdjacency,
  LineStripAdjacency,
  TrianglesAdjacency,
  TriangleStripAdjacency,
  /// Patches consumed by tessellation stages; the number of vertices per patch is a context
  /// setting.
  Patches,
}

/// Primitive captured by transform feedback.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Primitive {
  Points,
  Lines,
  Triangles,
}

impl Primitive {
  pub fn to_glenum(self) -> GLenum {
    match self {
      Primitive::Points => gl::POINTS,
      Primitive::Lines => gl::LINES,
      Primitive::Triangles => gl::TRIANGLES,
    }
  }

  /// Primitive of a geometry stage output (`GL_GEOMETRY_OUTPUT_TYPE`).
  pub fn from_geometry_output(e: GLenum) -> Option<Self> {
    match e {
      gl::POINTS => Some(Primitive::Points),
      gl::LINES | gl::LINE_STRIP => Some(Primitive::Lines),
      gl::TRIANGLES | gl::TRIANGLE_STRIP => Some(Primitive::Triangles),
      _ => None,
    }
  }
}

impl Mode {
  pub const ALL: [Mode; 12] = [
    Mode::Points,
    Mode::Lines,
    Mode::LineLoop,
    Mode::LineStrip,
    Mode::Triangles,
    Mode::TriangleStrip,
    Mode::TriangleFan,
    Mode::LinesAdjacency,
    Mode::LineStripAdjacency,
    Mode::TrianglesAdjacency,
    Mode::TriangleStripAdjacency,
    Mode::Patches,
  ];

  pub fn to_glenum(self) -> GLenum {
    match self {
      Mode::Points => gl::POINTS,
      Mode::Lines => gl::LINES,
      Mode::LineLoop => gl::LINE_LOOP,
      Mode::LineStrip => gl::LINE_STRIP,
      Mode::Triangles => gl::TRIANGLES,
      Mode::TriangleStrip => gl::TRIANGLE_STRIP,
      Mode::TriangleFan => gl::TRIANGLE_FAN,
      Mode::LinesAdjacency => gl::LINES_ADJACENCY,
      Mode::LineStripAdjacency => gl::LINE_STRIP_ADJACENCY,
      Mode::TrianglesAdjacency => gl::TRIANGLES_ADJACENCY,
      Mode::TriangleStripAdjacency => gl::TRIANGLE_STRIP_ADJACENCY,
      Mode::Patches => gl::PATCHES,
    }
  }

  pub fn from_glenum(e: GLenum) -> Option<Self> {
    Mode::ALL.iter().copied().find(|m| m.to_glenum() == e)
  }

  /// Primitive that transform feedback captures when drawing with this mode and no geometry
  /// stage. Patches have none: their output primitive is decided by the tessellation stages.
  pub fn transform_primitive(self) -> Option<Primitive> {
    match self {
      Mode::Points => Some(Primitive::Points),
      Mode::Lines
      | Mode::LineLoop
      | Mode::LineStrip
      | Mode::LinesAdjacency
      | Mode::LineStripAdjacency => Some(Primitive::Lines),
      Mode::Triangles
      | Mode::TriangleStrip
      | Mode::TriangleFan
      | Mode::TrianglesAdjacency
      | Mode::TriangleStripAdjacency => Some(Primitive::Triangles),
      Mode::Patches => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn glenum_round_trip() {
    for mode in Mode::ALL {
      assert_eq!(Mode::from_glenum(mode.to_glenum()), Some(mode));
    }
  }

  #[test]
  fn transform_primitives() {
    assert_eq!(Mode::TriangleStrip.transform_primitive(), Some(Primitive::Triangles));
    assert_eq!(Mode::LineLoop.transform_primitive(), Some(Primitive::Lines));
    assert_eq!(Mode::Points.transform_primitive(), Some(Primitive::Points));
    assert_eq!(Mode::Patches.transform_primitive(), None);
  }
}
