//! Uniform upload and readback.

use bytemuck::Pod;
use gl::types::*;
use lucent::{
  shader::{
    types::GlslType,
    uniform::{Setter, UniformData},
  },
  Error, Result,
};

/// Upload `count` elements of `data` to the uniform at `location` of the program in use.
pub(crate) unsafe fn upload(
  location: GLint,
  setter: Setter,
  count: GLsizei,
  data: &UniformData,
) -> Result<()> {
  match (setter, data) {
    (Setter::Float(n), UniformData::F32(v)) => {
      let f = match n {
        1 => gl::Uniform1fv,
        2 => gl::Uniform2fv,
        3 => gl::Uniform3fv,
        _ => gl::Uniform4fv,
      };

      f(location, count, v.as_ptr());
    }

    (Setter::Double(n), UniformData::F64(v)) => {
      let f = match n {
        1 => gl::Uniform1dv,
        2 => gl::Uniform2dv,
        3 => gl::Uniform3dv,
        _ => gl::Uniform4dv,
      };

      f(location, count, v.as_ptr());
    }

    (Setter::Int(n), UniformData::I32(v)) => {
      let f = match n {
        1 => gl::Uniform1iv,
        2 => gl::Uniform2iv,
        3 => gl::Uniform3iv,
        _ => gl::Uniform4iv,
      };

      f(location, count, v.as_ptr());
    }

    (Setter::Unsigned(n), UniformData::U32(v)) => {
      let f = match n {
        1 => gl::Uniform1uiv,
        2 => gl::Uniform2uiv,
        3 => gl::Uniform3uiv,
        _ => gl::Uniform4uiv,
      };

      f(location, count, v.as_ptr());
    }

    (Setter::FloatMatrix { columns, rows }, UniformData::F32(v)) => {
      let f = match (columns, rows) {
        (2, 2) => gl::UniformMatrix2fv,
        (2, 3) => gl::UniformMatrix2x3fv,
        (2, _) => gl::UniformMatrix2x4fv,
        (3, 2) => gl::UniformMatrix3x2fv,
        (3, 3) => gl::UniformMatrix3fv,
        (3, _) => gl::UniformMatrix3x4fv,
        (_, 2) => gl::UniformMatrix4x2fv,
        (_, 3) => gl::UniformMatrix4x3fv,
        _ => gl::UniformMatrix4fv,
      };

      f(location, count, gl::FALSE, v.as_ptr());
    }

    (Setter::DoubleMatrix { columns, rows }, UniformData::F64(v)) => {
      let f = match (columns, rows) {
        (2, 2) => gl::UniformMatrix2dv,
        (2, 3) => gl::UniformMatrix2x3dv,
        (2, _) => gl::UniformMatrix2x4dv,
        (3, 2) => gl::UniformMatrix3x2dv,
        (3, 3) => gl::UniformMatrix3dv,
        (3, _) => gl::UniformMatrix3x4dv,
        (_, 2) => gl::UniformMatrix4x2dv,
        (_, 3) => gl::UniformMatrix4x3dv,
        _ => gl::UniformMatrix4dv,
      };

      f(location, count, gl::FALSE, v.as_ptr());
    }

    (setter, data) => {
      return Err(Error::creation(format!(
        "{:?} cannot upload {} {} scalars",
        setter,
        data.len(),
        scalar_name(data)
      )))
    }
  }

  Ok(())
}

fn scalar_name(data: &UniformData) -> &'static str {
  match data {
    UniformData::F32(_) => "f32",
    UniformData::F64(_) => "f64",
    UniformData::I32(_) => "i32",
    UniformData::U32(_) => "u32",
  }
}

/// Read back the raw storage of `array_length` elements of a uniform.
///
/// Array elements occupy consecutive locations.
pub(crate) unsafe fn download(
  program: GLuint,
  location: GLint,
  ty: &GlslType,
  array_length: usize,
) -> Vec<u8> {
  let n = ty.dimension as usize;

  match Setter::for_type(ty) {
    Setter::Float(_) | Setter::FloatMatrix { .. } => {
      fetch::<GLfloat>(program, location, n, array_length, gl::GetUniformfv)
    }

    Setter::Double(_) | Setter::DoubleMatrix { .. } => {
      fetch::<GLdouble>(program, location, n, array_length, gl::GetUniformdv)
    }

    Setter::Int(_) => fetch::<GLint>(program, location, n, array_length, gl::GetUniformiv),
    Setter::Unsigned(_) => fetch::<GLuint>(program, location, n, array_length, gl::GetUniformuiv),
  }
}

unsafe fn fetch<T: Pod>(
  program: GLuint,
  location: GLint,
  dimension: usize,
  array_length: usize,
  get: unsafe fn(GLuint, GLint, *mut T),
) -> Vec<u8> {
  let mut scalars = vec![T::zeroed(); dimension * array_length];

  for (i, element) in scalars.chunks_exact_mut(dimension).enumerate() {
    get(program, location + i as GLint, element.as_mut_ptr());
  }

  bytemuck::cast_slice(&scalars).to_vec()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mismatched_scalars_are_rejected() {
    // rejected before reaching the driver
    let uploaded = unsafe { upload(0, Setter::Float(2), 1, &UniformData::I32(vec![1, 2])) };
    assert!(matches!(uploaded, Err(Error::Creation(_))));

    let uploaded = unsafe {
      upload(
        0,
        Setter::DoubleMatrix {
          columns: 2,
          rows: 2,
        },
        1,
        &UniformData::F32(vec![0.; 4]),
      )
    };
    assert!(matches!(uploaded, Err(Error::Creation(_))));
  }
}
