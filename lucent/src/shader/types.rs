//! GLSL type table.
//!
//! Maps the OpenGL enum reported for an active attribute or uniform to its geometry: the number of
//! scalar components, the scalar type, how many locations (matrix columns) it spans, how many
//! components each location holds, whether normalized integer data may feed it, and the encoding
//! character used to pick the attribute pointer or uniform entry point.

use gl::types::GLenum;

/// Broad category of a GLSL type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TypeKind {
  Scalar,
  Vector,
  Matrix,
  Sampler,
  Image,
}

/// Geometry of a GLSL type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct GlslType {
  /// OpenGL enum, such as `GL_FLOAT_VEC3`.
  pub gl_type: GLenum,
  /// GLSL spelling, such as `vec3`.
  pub name: &'static str,
  pub kind: TypeKind,
  /// Total number of scalar components.
  pub dimension: u32,
  /// Scalar type: `GL_FLOAT`, `GL_DOUBLE`, `GL_INT`, `GL_UNSIGNED_INT` or `GL_BOOL`.
  pub scalar_type: GLenum,
  /// Number of consecutive locations (matrix columns; 1 otherwise).
  pub rows_length: u32,
  /// Number of components per location.
  pub row_length: u32,
  pub normalizable: bool,
  /// `f`, `d`, `i`, `u` or `b`.
  pub shape: char,
}

impl GlslType {
  /// Size of a single scalar, in bytes.
  pub fn scalar_size(&self) -> usize {
    match self.scalar_type {
      gl::DOUBLE => 8,
      _ => 4,
    }
  }

  /// Size of the whole value (one array element), in bytes.
  pub fn element_size(&self) -> usize {
    self.dimension as usize * self.scalar_size()
  }

  pub fn is_matrix(&self) -> bool {
    self.kind == TypeKind::Matrix
  }

  pub fn is_opaque(&self) -> bool {
    matches!(self.kind, TypeKind::Sampler | TypeKind::Image)
  }

  /// The tuple exposed for attributes: `(dimension, scalar_type, rows_length, row_length,
  /// normalizable, shape)`.
  pub fn attribute_info(&self) -> (u32, GLenum, u32, u32, bool, char) {
    (
      self.dimension,
      self.scalar_type,
      self.rows_length,
      self.row_length,
      self.normalizable,
      self.shape,
    )
  }
}

macro_rules! glsl_types {
  ($( $gl:ident => $name:literal, $kind:ident, $scalar:ident, $rows:literal x $cols:literal, $norm:literal, $shape:literal; )*) => {
    /// Look up the geometry of an OpenGL type enum.
    pub fn lookup(gl_type: GLenum) -> Option<GlslType> {
      match gl_type {
        $(
          gl::$gl => Some(GlslType {
            gl_type: gl::$gl,
            name: $name,
            kind: TypeKind::$kind,
            dimension: $rows * $cols,
            scalar_type: gl::$scalar,
            rows_length: $rows,
            row_length: $cols,
            normalizable: $norm,
            shape: $shape,
          }),
        )*

        _ => None,
      }
    }

    /// Every OpenGL type enum known to the table.
    pub const KNOWN_TYPES: &[GLenum] = &[$( gl::$gl ),*];
  };
}

glsl_types! {
  // scalars and vectors
  FLOAT => "float", Scalar, FLOAT, 1 x 1, true, 'f';
  FLOAT_VEC2 => "vec2", Vector, FLOAT, 1 x 2, true, 'f';
  FLOAT_VEC3 => "vec3", Vector, FLOAT, 1 x 3, true, 'f';
  FLOAT_VEC4 => "vec4", Vector, FLOAT, 1 x 4, true, 'f';
  DOUBLE => "double", Scalar, DOUBLE, 1 x 1, false, 'd';
  DOUBLE_VEC2 => "dvec2", Vector, DOUBLE, 1 x 2, false, 'd';
  DOUBLE_VEC3 => "dvec3", Vector, DOUBLE, 1 x 3, false, 'd';
  DOUBLE_VEC4 => "dvec4", Vector, DOUBLE, 1 x 4, false, 'd';
  INT => "int", Scalar, INT, 1 x 1, false, 'i';
  INT_VEC2 => "ivec2", Vector, INT, 1 x 2, false, 'i';
  INT_VEC3 => "ivec3", Vector, INT, 1 x 3, false, 'i';
  INT_VEC4 => "ivec4", Vector, INT, 1 x 4, false, 'i';
  UNSIGNED_INT => "uint", Scalar, UNSIGNED_INT, 1 x 1, false, 'u';
  UNSIGNED_INT_VEC2 => "uvec2", Vector, UNSIGNED_INT, 1 x 2, false, 'u';
  UNSIGNED_INT_VEC3 => "uvec3", Vector, UNSIGNED_INT, 1 x 3, false, 'u';
  UNSIGNED_INT_VEC4 => "uvec4", Vector, UNSIGNED_INT, 1 x 4, false, 'u';
  BOOL => "bool", Scalar, BOOL, 1 x 1, false, 'b';
  BOOL_VEC2 => "bvec2", Vector, BOOL, 1 x 2, false, 'b';
  BOOL_VEC3 => "bvec3", Vector, BOOL, 1 x 3, false, 'b';
  BOOL_VEC4 => "bvec4", Vector, BOOL, 1 x 4, false, 'b';

  // matrices; matCxR spans C locations of R components
  FLOAT_MAT2 => "mat2", Matrix, FLOAT, 2 x 2, true, 'f';
  FLOAT_MAT3 => "mat3", Matrix, FLOAT, 3 x 3, true, 'f';
  FLOAT_MAT4 => "mat4", Matrix, FLOAT, 4 x 4, true, 'f';
  FLOAT_MAT2x3 => "mat2x3", Matrix, FLOAT, 2 x 3, true, 'f';
  FLOAT_MAT2x4 => "mat2x4", Matrix, FLOAT, 2 x 4, true, 'f';
  FLOAT_MAT3x2 => "mat3x2", Matrix, FLOAT, 3 x 2, true, 'f';
  FLOAT_MAT3x4 => "mat3x4", Matrix, FLOAT, 3 x 4, true, 'f';
  FLOAT_MAT4x2 => "mat4x2", Matrix, FLOAT, 4 x 2, true, 'f';
  FLOAT_MAT4x3 => "mat4x3", Matrix, FLOAT, 4 x 3, true, 'f';
  DOUBLE_MAT2 => "dmat2", Matrix, DOUBLE, 2 x 2, false, 'd';
  DOUBLE_MAT3 => "dmat3", Matrix, DOUBLE, 3 x 3, false, 'd';
  DOUBLE_MAT4 => "dmat4", Matrix, DOUBLE, 4 x 4, false, 'd';
  DOUBLE_MAT2x3 => "dmat2x3", Matrix, DOUBLE, 2 x 3, false, 'd';
  DOUBLE_MAT2x4 => "dmat2x4", Matrix, DOUBLE, 2 x 4, false, 'd';
  DOUBLE_MAT3x2 => "dmat3x2", Matrix, DOUBLE, 3 x 2, false, 'd';
  DOUBLE_MAT3x4 => "dmat3x4", Matrix, DOUBLE, 3 x 4, false, 'd';
  DOUBLE_MAT4x2 => "dmat4x2", Matrix, DOUBLE, 4 x 2, false, 'd';
  DOUBLE_MAT4x3 => "dmat4x3", Matrix, DOUBLE, 4 x 3, false, 'd';

  // samplers
  SAMPLER_1D => "sampler1D", Sampler, INT, 1 x 1, false, 'i';
  SAMPLER_2D => "sampler2D", Sampler, INT, 1 x 1, false, 'i';
  SAMPLER_3D => "sampler3D", Sampler, INT, 1 x 1, false, 'i';
  SAMPLER_CUBE => "samplerCube", Sampler, INT, 1 x 1, false, 'i';
  SAMPLER_1D_SHADOW => "sampler1DShadow", Sampler, INT, 1 x 1, false, 'i';
  SAMPLER_2D_SHADOW => "sampler2DShadow", Sampler, INT, 1 x 1, false, 'i';
  SAMPLER_1D_ARRAY => "sampler1DArray", Sampler, INT, 1 x 1, false, 'i';
  SAMPLER_2D_ARRAY => "sampler2DArray", Sampler, INT, 1 x 1, false, 'i';
  SAMPLER_1D_ARRAY_SHADOW => "sampler1DArrayShadow", Sampler, INT, 1 x 1, false, 'i';
  SAMPLER_2D_ARRAY_SHADOW => "sampler2DArrayShadow", Sampler, INT, 1 x 1, false, 'i';
  SAMPLER_2D_MULTISAMPLE => "sampler2DMS", Sampler, INT, 1 x 1, false, 'i';
  SAMPLER_2D_MULTISAMPLE_ARRAY => "sampler2DMSArray", Sampler, INT, 1 x 1, false, 'i';
  SAMPLER_CUBE_SHADOW => "samplerCubeShadow", Sampler, INT, 1 x 1, false, 'i';
  SAMPLER_BUFFER => "samplerBuffer", Sampler, INT, 1 x 1, false, 'i';
  SAMPLER_2D_RECT => "sampler2DRect", Sampler, INT, 1 x 1, false, 'i';
  SAMPLER_2D_RECT_SHADOW => "sampler2DRectShadow", Sampler, INT, 1 x 1, false, 'i';
  SAMPLER_CUBE_MAP_ARRAY => "samplerCubeArray", Sampler, INT, 1 x 1, false, 'i';
  SAMPLER_CUBE_MAP_ARRAY_SHADOW => "samplerCubeArrayShadow", Sampler, INT, 1 x 1, false, 'i';
  INT_SAMPLER_1D => "isampler1D", Sampler, INT, 1 x 1, false, 'i';
  INT_SAMPLER_2D => "isampler2D", Sampler, INT, 1 x 1, false, 'i';
  INT_SAMPLER_3D => "isampler3D", Sampler, INT, 1 x 1, false, 'i';
  INT_SAMPLER_CUBE => "isamplerCube", Sampler, INT, 1 x 1, false, 'i';
  INT_SAMPLER_1D_ARRAY => "isampler1DArray", Sampler, INT, 1 x 1, false, 'i';
  INT_SAMPLER_2D_ARRAY => "isampler2DArray", Sampler, INT, 1 x 1, false, 'i';
  INT_SAMPLER_2D_MULTISAMPLE => "isampler2DMS", Sampler, INT, 1 x 1, false, 'i';
  INT_SAMPLER_2D_MULTISAMPLE_ARRAY => "isampler2DMSArray", Sampler, INT, 1 x 1, false, 'i';
  INT_SAMPLER_BUFFER => "isamplerBuffer", Sampler, INT, 1 x 1, false, 'i';
  INT_SAMPLER_2D_RECT => "isampler2DRect", Sampler, INT, 1 x 1, false, 'i';
  INT_SAMPLER_CUBE_MAP_ARRAY => "isamplerCubeArray", Sampler, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_SAMPLER_1D => "usampler1D", Sampler, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_SAMPLER_2D => "usampler2D", Sampler, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_SAMPLER_3D => "usampler3D", Sampler, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_SAMPLER_CUBE => "usamplerCube", Sampler, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_SAMPLER_1D_ARRAY => "usampler1DArray", Sampler, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_SAMPLER_2D_ARRAY => "usampler2DArray", Sampler, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_SAMPLER_2D_MULTISAMPLE => "usampler2DMS", Sampler, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_SAMPLER_2D_MULTISAMPLE_ARRAY => "usampler2DMSArray", Sampler, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_SAMPLER_BUFFER => "usamplerBuffer", Sampler, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_SAMPLER_2D_RECT => "usampler2DRect", Sampler, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_SAMPLER_CUBE_MAP_ARRAY => "usamplerCubeArray", Sampler, INT, 1 x 1, false, 'i';

  // images
  IMAGE_1D => "image1D", Image, INT, 1 x 1, false, 'i';
  IMAGE_2D => "image2D", Image, INT, 1 x 1, false, 'i';
  IMAGE_3D => "image3D", Image, INT, 1 x 1, false, 'i';
  IMAGE_2D_RECT => "image2DRect", Image, INT, 1 x 1, false, 'i';
  IMAGE_CUBE => "imageCube", Image, INT, 1 x 1, false, 'i';
  IMAGE_BUFFER => "imageBuffer", Image, INT, 1 x 1, false, 'i';
  IMAGE_1D_ARRAY => "image1DArray", Image, INT, 1 x 1, false, 'i';
  IMAGE_2D_ARRAY => "image2DArray", Image, INT, 1 x 1, false, 'i';
  IMAGE_CUBE_MAP_ARRAY => "imageCubeArray", Image, INT, 1 x 1, false, 'i';
  IMAGE_2D_MULTISAMPLE => "image2DMS", Image, INT, 1 x 1, false, 'i';
  IMAGE_2D_MULTISAMPLE_ARRAY => "image2DMSArray", Image, INT, 1 x 1, false, 'i';
  INT_IMAGE_1D => "iimage1D", Image, INT, 1 x 1, false, 'i';
  INT_IMAGE_2D => "iimage2D", Image, INT, 1 x 1, false, 'i';
  INT_IMAGE_3D => "iimage3D", Image, INT, 1 x 1, false, 'i';
  INT_IMAGE_2D_RECT => "iimage2DRect", Image, INT, 1 x 1, false, 'i';
  INT_IMAGE_CUBE => "iimageCube", Image, INT, 1 x 1, false, 'i';
  INT_IMAGE_BUFFER => "iimageBuffer", Image, INT, 1 x 1, false, 'i';
  INT_IMAGE_1D_ARRAY => "iimage1DArray", Image, INT, 1 x 1, false, 'i';
  INT_IMAGE_2D_ARRAY => "iimage2DArray", Image, INT, 1 x 1, false, 'i';
  INT_IMAGE_CUBE_MAP_ARRAY => "iimageCubeArray", Image, INT, 1 x 1, false, 'i';
  INT_IMAGE_2D_MULTISAMPLE => "iimage2DMS", Image, INT, 1 x 1, false, 'i';
  INT_IMAGE_2D_MULTISAMPLE_ARRAY => "iimage2DMSArray", Image, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_IMAGE_1D => "uimage1D", Image, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_IMAGE_2D => "uimage2D", Image, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_IMAGE_3D => "uimage3D", Image, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_IMAGE_2D_RECT => "uimage2DRect", Image, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_IMAGE_CUBE => "uimageCube", Image, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_IMAGE_BUFFER => "uimageBuffer", Image, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_IMAGE_1D_ARRAY => "uimage1DArray", Image, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_IMAGE_2D_ARRAY => "uimage2DArray", Image, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_IMAGE_CUBE_MAP_ARRAY => "uimageCubeArray", Image, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_IMAGE_2D_MULTISAMPLE => "uimage2DMS", Image, INT, 1 x 1, false, 'i';
  UNSIGNED_INT_IMAGE_2D_MULTISAMPLE_ARRAY => "uimage2DMSArray", Image, INT, 1 x 1, false, 'i';
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn vectors() {
    let vec3 = lookup(gl::FLOAT_VEC3).unwrap();

    assert_eq!(vec3.attribute_info(), (3, gl::FLOAT, 1, 3, true, 'f'));
    assert_eq!(vec3.element_size(), 12);
    assert_eq!(vec3.name, "vec3");

    let uvec2 = lookup(gl::UNSIGNED_INT_VEC2).unwrap();
    assert_eq!(uvec2.attribute_info(), (2, gl::UNSIGNED_INT, 1, 2, false, 'u'));
  }

  #[test]
  fn non_square_matrices_are_distinct() {
    let m32 = lookup(gl::FLOAT_MAT3x2).unwrap();
    let m23 = lookup(gl::FLOAT_MAT2x3).unwrap();

    assert_eq!((m32.rows_length, m32.row_length), (3, 2));
    assert_eq!((m23.rows_length, m23.row_length), (2, 3));
    assert_eq!(m32.dimension, m23.dimension);

    let dm4 = lookup(gl::DOUBLE_MAT4).unwrap();
    assert_eq!(dm4.element_size(), 128);
    assert!(dm4.is_matrix());
  }

  #[test]
  fn opaque_types() {
    for ty in [gl::SAMPLER_2D, gl::UNSIGNED_INT_SAMPLER_CUBE, gl::IMAGE_3D] {
      let t = lookup(ty).unwrap();
      assert!(t.is_opaque());
      assert_eq!(t.dimension, 1);
    }
  }

  #[test]
  fn table_is_consistent() {
    for &ty in KNOWN_TYPES {
      let t = lookup(ty).unwrap();
      assert_eq!(t.gl_type, ty);
      assert_eq!(t.dimension, t.rows_length * t.row_length);
    }

    assert!(lookup(0).is_none());
  }
}
