//! Uniform value coercion.
//!
//! Host values are checked against the reflected type of a uniform (scalar kind, dimension and
//! array length) and coerced into one of four scalar buffers. The OpenGL entry point that uploads a
//! buffer only depends on the uniform type; it is given by [`Setter`].

use crate::error::{Error, Result};
use crate::shader::types::{GlslType, TypeKind};

/// The `glUniform*` family used to upload a uniform.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Setter {
  /// `glUniform{N}fv`.
  Float(u8),
  /// `glUniform{N}dv`.
  Double(u8),
  /// `glUniform{N}iv`; booleans, samplers and images go through this one as well.
  Int(u8),
  /// `glUniform{N}uiv`.
  Unsigned(u8),
  /// `glUniformMatrix{C}x{R}fv`.
  FloatMatrix { columns: u8, rows: u8 },
  /// `glUniformMatrix{C}x{R}dv`.
  DoubleMatrix { columns: u8, rows: u8 },
}

impl Setter {
  pub fn for_type(ty: &GlslType) -> Self {
    let n = ty.row_length as u8;

    match (ty.kind, ty.scalar_type) {
      (TypeKind::Sampler | TypeKind::Image, _) => Setter::Int(1),
      (TypeKind::Matrix, gl::DOUBLE) => Setter::DoubleMatrix {
        columns: ty.rows_length as u8,
        rows: n,
      },
      (TypeKind::Matrix, _) => Setter::FloatMatrix {
        columns: ty.rows_length as u8,
        rows: n,
      },
      (_, gl::DOUBLE) => Setter::Double(n),
      (_, gl::UNSIGNED_INT) => Setter::Unsigned(n),
      (_, gl::FLOAT) => Setter::Float(n),
      _ => Setter::Int(n),
    }
  }

  fn scalar(self) -> Scalar {
    match self {
      Setter::Float(_) | Setter::FloatMatrix { .. } => Scalar::F32,
      Setter::Double(_) | Setter::DoubleMatrix { .. } => Scalar::F64,
      Setter::Int(_) => Scalar::I32,
      Setter::Unsigned(_) => Scalar::U32,
    }
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Scalar {
  F32,
  F64,
  I32,
  U32,
}

impl Scalar {
  fn size(self) -> usize {
    match self {
      Scalar::F64 => 8,
      _ => 4,
    }
  }
}

/// A value supplied by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum UniformValue {
  Float(Vec<f32>),
  Double(Vec<f64>),
  Int(Vec<i32>),
  Unsigned(Vec<u32>),
  Bool(Vec<bool>),
  /// Raw element storage, laid out as the uniform’s scalars (matrices column after column).
  Bytes(Vec<u8>),
}

macro_rules! impl_from_value {
  ($t:ty, $variant:ident) => {
    impl From<$t> for UniformValue {
      fn from(x: $t) -> Self {
        UniformValue::$variant(vec![x])
      }
    }

    impl<const N: usize> From<[$t; N]> for UniformValue {
      fn from(x: [$t; N]) -> Self {
        UniformValue::$variant(x.to_vec())
      }
    }

    impl From<&[$t]> for UniformValue {
      fn from(x: &[$t]) -> Self {
        UniformValue::$variant(x.to_vec())
      }
    }

    impl From<Vec<$t>> for UniformValue {
      fn from(x: Vec<$t>) -> Self {
        UniformValue::$variant(x)
      }
    }
  };
}

impl_from_value!(f32, Float);
impl_from_value!(f64, Double);
impl_from_value!(i32, Int);
impl_from_value!(u32, Unsigned);
impl_from_value!(bool, Bool);

/// Scalars ready to be handed to a [`Setter`].
#[derive(Clone, Debug, PartialEq)]
pub enum UniformData {
  F32(Vec<f32>),
  F64(Vec<f64>),
  I32(Vec<i32>),
  U32(Vec<u32>),
}

impl UniformData {
  pub fn len(&self) -> usize {
    match self {
      UniformData::F32(v) => v.len(),
      UniformData::F64(v) => v.len(),
      UniformData::I32(v) => v.len(),
      UniformData::U32(v) => v.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn as_bytes(&self) -> &[u8] {
    match self {
      UniformData::F32(v) => bytemuck::cast_slice(v),
      UniformData::F64(v) => bytemuck::cast_slice(v),
      UniformData::I32(v) => bytemuck::cast_slice(v),
      UniformData::U32(v) => bytemuck::cast_slice(v),
    }
  }
}

/// Coerce `value` into the scalars of a uniform of type `ty` with `array_length` elements.
///
/// The number of scalars must be exactly `ty.dimension * array_length`. Floats and doubles convert
/// into each other, booleans into integers, and non-negative signed integers into unsigned ones.
pub fn encode(ty: &GlslType, array_length: usize, value: UniformValue) -> Result<UniformData> {
  let setter = Setter::for_type(ty);
  let scalar = setter.scalar();
  let expected = ty.dimension as usize * array_length;

  let data = match (scalar, value) {
    (_, UniformValue::Bytes(bytes)) => {
      let size = expected * scalar.size();

      if bytes.len() != size {
        return Err(Error::out_of_range(format!(
          "{} uniform expects {} bytes, got {}",
          ty.name,
          size,
          bytes.len()
        )));
      }

      decode(ty, &bytes)
    }

    (Scalar::F32, UniformValue::Float(v)) => UniformData::F32(v),
    (Scalar::F32, UniformValue::Double(v)) => {
      UniformData::F32(v.into_iter().map(|x| x as f32).collect())
    }
    (Scalar::F64, UniformValue::Double(v)) => UniformData::F64(v),
    (Scalar::F64, UniformValue::Float(v)) => {
      UniformData::F64(v.into_iter().map(f64::from).collect())
    }
    (Scalar::I32, UniformValue::Int(v)) => UniformData::I32(v),
    (Scalar::I32, UniformValue::Bool(v)) => {
      UniformData::I32(v.into_iter().map(i32::from).collect())
    }
    (Scalar::U32, UniformValue::Unsigned(v)) => UniformData::U32(v),
    (Scalar::U32, UniformValue::Bool(v)) => {
      UniformData::U32(v.into_iter().map(u32::from).collect())
    }
    (Scalar::U32, UniformValue::Int(v)) => UniformData::U32(
      v.into_iter()
        .map(|x| {
          u32::try_from(x)
            .map_err(|_| Error::out_of_range(format!("{} is not a valid {} value", x, ty.name)))
        })
        .collect::<Result<_>>()?,
    ),
    (Scalar::I32, UniformValue::Unsigned(v)) if ty.scalar_type == gl::BOOL => {
      UniformData::I32(v.into_iter().map(|x| i32::from(x != 0)).collect())
    }
    (_, value) => {
      return Err(Error::creation(format!(
        "cannot set {} uniform from {} values",
        ty.name,
        value.kind_name()
      )))
    }
  };

  if data.len() != expected {
    return Err(Error::out_of_range(format!(
      "{} uniform{} expects {} scalars, got {}",
      ty.name,
      if array_length > 1 {
        format!("[{}]", array_length)
      } else {
        String::new()
      },
      expected,
      data.len()
    )));
  }

  Ok(data)
}

/// Interpret raw element storage as the scalars of `ty`. Trailing bytes that don’t form a whole
/// scalar are ignored.
pub fn decode(ty: &GlslType, bytes: &[u8]) -> UniformData {
  match Setter::for_type(ty).scalar() {
    Scalar::F32 => UniformData::F32(read_scalars(bytes, 4)),
    Scalar::F64 => UniformData::F64(read_scalars(bytes, 8)),
    Scalar::I32 => UniformData::I32(read_scalars(bytes, 4)),
    Scalar::U32 => UniformData::U32(read_scalars(bytes, 4)),
  }
}

fn read_scalars<T: bytemuck::AnyBitPattern>(bytes: &[u8], size: usize) -> Vec<T> {
  bytes
    .chunks_exact(size)
    .map(bytemuck::pod_read_unaligned)
    .collect()
}

impl UniformValue {
  fn kind_name(&self) -> &'static str {
    match self {
      UniformValue::Float(_) => "float",
      UniformValue::Double(_) => "double",
      UniformValue::Int(_) => "int",
      UniformValue::Unsigned(_) => "uint",
      UniformValue::Bool(_) => "bool",
      UniformValue::Bytes(_) => "byte",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::shader::types::lookup;

  #[test]
  fn setters() {
    assert_eq!(Setter::for_type(&lookup(gl::FLOAT_VEC3).unwrap()), Setter::Float(3));
    assert_eq!(Setter::for_type(&lookup(gl::UNSIGNED_INT).unwrap()), Setter::Unsigned(1));
    assert_eq!(Setter::for_type(&lookup(gl::BOOL_VEC2).unwrap()), Setter::Int(2));
    assert_eq!(Setter::for_type(&lookup(gl::SAMPLER_2D).unwrap()), Setter::Int(1));
    assert_eq!(
      Setter::for_type(&lookup(gl::FLOAT_MAT2x3).unwrap()),
      Setter::FloatMatrix { columns: 2, rows: 3 }
    );
    assert_eq!(
      Setter::for_type(&lookup(gl::DOUBLE_MAT4).unwrap()),
      Setter::DoubleMatrix { columns: 4, rows: 4 }
    );
  }

  #[test]
  fn encode_checks_length() {
    let vec2 = lookup(gl::FLOAT_VEC2).unwrap();

    assert_eq!(encode(&vec2, 1, [1f32, 2.].into()).unwrap(), UniformData::F32(vec![1., 2.]));
    assert_eq!(encode(&vec2, 2, [1f32, 2., 3., 4.].into()).unwrap().len(), 4);
    assert!(encode(&vec2, 1, 1f32.into()).is_err());
    assert!(encode(&vec2, 2, [1f32, 2.].into()).is_err());
  }

  #[test]
  fn encode_coerces_scalars() {
    let dvec2 = lookup(gl::DOUBLE_VEC2).unwrap();
    let uint = lookup(gl::UNSIGNED_INT).unwrap();
    let boolean = lookup(gl::BOOL).unwrap();

    assert_eq!(encode(&dvec2, 1, [0.5f32, 2.].into()).unwrap(), UniformData::F64(vec![0.5, 2.]));
    assert_eq!(encode(&uint, 1, 7i32.into()).unwrap(), UniformData::U32(vec![7]));
    assert!(encode(&uint, 1, (-7i32).into()).is_err());
    assert_eq!(encode(&boolean, 1, true.into()).unwrap(), UniformData::I32(vec![1]));
    assert!(encode(&boolean, 1, 1f32.into()).is_err());
  }

  #[test]
  fn matrices_from_floats_and_bytes() {
    let mat2 = lookup(gl::FLOAT_MAT2).unwrap();
    let floats = [1f32, 2., 3., 4.];

    let from_floats = encode(&mat2, 1, floats.into()).unwrap();
    let from_bytes = encode(&mat2, 1, UniformValue::Bytes(bytemuck::cast_slice(&floats).to_vec())).unwrap();

    assert_eq!(from_floats, from_bytes);
    assert_eq!(from_bytes.as_bytes(), bytemuck::cast_slice::<f32, u8>(&floats));
    assert!(encode(&mat2, 1, UniformValue::Bytes(vec![0; 12])).is_err());
  }

  #[test]
  fn decode_unaligned_bytes() {
    let ivec2 = lookup(gl::INT_VEC2).unwrap();
    let mut bytes = vec![0u8];
    bytes.extend_from_slice(bytemuck::cast_slice(&[-3i32, 9]));

    assert_eq!(decode(&ivec2, &bytes[1..]), UniformData::I32(vec![-3, 9]));
  }
}
