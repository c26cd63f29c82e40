//! Shader sources, stages and the textual pre-passes applied before compilation.
//!
//! GLSL sources are forwarded verbatim to the driver once `#include "name"` directives are
//! expanded against an include registry. SPIR-V binaries (detected by their magic word) are
//! forwarded as-is and reflected locally by [`spirv`] to recover vertex attributes.

pub mod include;
pub mod spirv;
pub mod types;
pub mod uniform;

use gl::types::GLenum;
use std::fmt;

/// A shader stage type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StageType {
  /// Vertex shader.
  VertexShader,
  /// Tessellation control shader.
  TessellationControlShader,
  /// Tessellation evaluation shader.
  TessellationEvaluationShader,
  /// Geometry shader.
  GeometryShader,
  /// Fragment shader.
  FragmentShader,
  /// Compute shader.
  ComputeShader,
}

impl StageType {
  pub fn to_glenum(self) -> GLenum {
    match self {
      StageType::VertexShader => gl::VERTEX_SHADER,
      StageType::TessellationControlShader => gl::TESS_CONTROL_SHADER,
      StageType::TessellationEvaluationShader => gl::TESS_EVALUATION_SHADER,
      StageType::GeometryShader => gl::GEOMETRY_SHADER,
      StageType::FragmentShader => gl::FRAGMENT_SHADER,
      StageType::ComputeShader => gl::COMPUTE_SHADER,
    }
  }
}

impl fmt::Display for StageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageType::VertexShader => f.write_str("vertex shader"),
      StageType::TessellationControlShader => f.write_str("tessellation control shader"),
      StageType::TessellationEvaluationShader => f.write_str("tessellation evaluation shader"),
      StageType::GeometryShader => f.write_str("geometry shader"),
      StageType::FragmentShader => f.write_str("fragment shader"),
      StageType::ComputeShader => f.write_str("compute shader"),
    }
  }
}

/// Source of a single shader stage.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ShaderSource {
  /// GLSL text.
  Glsl(String),
  /// A SPIR-V module, as little-endian bytes.
  SpirV(Vec<u8>),
}

impl ShaderSource {
  /// Build a source from raw bytes: SPIR-V if it starts with the SPIR-V magic, UTF-8 GLSL
  /// otherwise.
  pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> crate::Result<Self> {
    let bytes = bytes.into();

    if spirv::is_spirv(&bytes) {
      Ok(ShaderSource::SpirV(bytes))
    } else {
      String::from_utf8(bytes)
        .map(ShaderSource::Glsl)
        .map_err(|_| crate::Error::creation("shader source is neither SPIR-V nor UTF-8 text"))
    }
  }

  pub fn is_spirv(&self) -> bool {
    matches!(self, ShaderSource::SpirV(_))
  }
}

impl From<&str> for ShaderSource {
  fn from(src: &str) -> Self {
    ShaderSource::Glsl(src.to_owned())
  }
}

impl From<String> for ShaderSource {
  fn from(src: String) -> Self {
    ShaderSource::Glsl(src)
  }
}

impl From<&String> for ShaderSource {
  fn from(src: &String) -> Self {
    ShaderSource::Glsl(src.clone())
  }
}

/// Prefix every line of `source` with its 1-based line number.
pub fn numbered_source(source: &str) -> String {
  let lines: Vec<&str> = source.lines().collect();
  let width = lines.len().max(1).to_string().len();

  lines
    .iter()
    .enumerate()
    .map(|(i, line)| format!("{:>width$} | {}", i + 1, line, width = width))
    .collect::<Vec<_>>()
    .join("\n")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn numbers_lines() {
    let src = (1..=10)
      .map(|i| format!("l{}", i))
      .collect::<Vec<_>>()
      .join("\n");
    let numbered = numbered_source(&src);
    let lines: Vec<&str> = numbered.lines().collect();

    assert_eq!(lines[0], " 1 | l1");
    assert_eq!(lines[9], "10 | l10");
  }

  #[test]
  fn detects_spirv_bytes() {
    let mut bytes = 0x0723_0203u32.to_le_bytes().to_vec();
    bytes.extend_from_slice(&[0; 16]);

    assert!(ShaderSource::from_bytes(bytes).unwrap().is_spirv());
    assert_eq!(
      ShaderSource::from_bytes(b"#version 330\n".to_vec()).unwrap(),
      ShaderSource::Glsl("#version 330\n".to_owned())
    );
    assert!(ShaderSource::from_bytes(vec![0xff, 0xfe, 0x00]).is_err());
  }
}
