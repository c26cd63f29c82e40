//! Vertex attribute format mini-language.
//!
//! A format string describes the layout of a single vertex (or instance) in a buffer. It is a list
//! of whitespace-separated element tokens, optionally followed by a divisor suffix:
//!
//! ```text
//! 3f 2f          two float attributes, 20 bytes per vertex
//! 2f 4x 2nu1     a float vec2, 4 padding bytes, two normalized unsigned bytes
//! 3f/i           a per-instance vec3
//! ```
//!
//! An element token reads `count? n? type size?`:
//!
//! - `count` is a positive decimal integer (default `1`);
//! - `n` marks a normalized integer (only legal on `i` and `u`);
//! - `type` is one of `f` (float), `i` (signed int), `u` (unsigned int), `x` (padding bytes) or
//!   `d` (double, same as `f8`);
//! - `size` is a byte size in `{1, 2, 4, 8}` (default `4`, or `1` for padding).
//!
//! The divisor suffix is `/v` (per vertex, the default), `/i` (per instance) or `/r` (per render).

use crate::error::{Error, Result};
use gl::types::GLenum;
use std::{fmt, str::FromStr};

/// Divisor value used for per-render attributes.
pub const PER_RENDER_DIVISOR: u32 = 0x7fff_ffff;

/// Scalar kind of a format element.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NodeType {
  Float,
  Int,
  Unsigned,
  Padding,
}

/// A single element of a format string, such as `3f` or `2nu1`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct FormatNode {
  pub count: u32,
  pub ty: NodeType,
  pub size: u32,
  pub normalized: bool,
}

impl FormatNode {
  /// Size in bytes of the whole node.
  pub fn bytes(&self) -> usize {
    (self.count * self.size) as usize
  }

  pub fn is_padding(&self) -> bool {
    self.ty == NodeType::Padding
  }

  /// OpenGL scalar type used in `glVertexAttrib*Pointer`. Padding has none.
  pub fn gl_type(&self) -> Option<GLenum> {
    let ty = match (self.ty, self.size) {
      (NodeType::Float, 2) => gl::HALF_FLOAT,
      (NodeType::Float, 4) => gl::FLOAT,
      (NodeType::Float, 8) => gl::DOUBLE,
      (NodeType::Int, 1) => gl::BYTE,
      (NodeType::Int, 2) => gl::SHORT,
      (NodeType::Int, 4) => gl::INT,
      (NodeType::Unsigned, 1) => gl::UNSIGNED_BYTE,
      (NodeType::Unsigned, 2) => gl::UNSIGNED_SHORT,
      (NodeType::Unsigned, 4) => gl::UNSIGNED_INT,
      _ => return None,
    };

    Some(ty)
  }

  fn parse(token: &str) -> Result<Self> {
    let bad = || Error::creation(format!("invalid format token {:?}", token));
    let bytes = token.as_bytes();

    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    let count = if digits == 0 {
      1
    } else {
      token[..digits].parse::<u32>().map_err(|_| bad())?
    };

    if count == 0 {
      return Err(bad());
    }

    let mut rest = &token[digits..];
    let normalized = rest.starts_with('n');
    if normalized {
      rest = &rest[1..];
    }

    let mut chars = rest.chars();
    let ty_char = chars.next().ok_or_else(bad)?;
    let size_str = chars.as_str();

    let size = if size_str.is_empty() {
      None
    } else {
      Some(size_str.parse::<u32>().map_err(|_| bad())?)
    };

    let (ty, size) = match (ty_char, size) {
      ('f', None) => (NodeType::Float, 4),
      ('f', Some(s @ (2 | 4 | 8))) => (NodeType::Float, s),
      ('d', None | Some(8)) => (NodeType::Float, 8),
      ('i', None) => (NodeType::Int, 4),
      ('i', Some(s @ (1 | 2 | 4))) => (NodeType::Int, s),
      ('u', None) => (NodeType::Unsigned, 4),
      ('u', Some(s @ (1 | 2 | 4))) => (NodeType::Unsigned, s),
      ('x', None) => (NodeType::Padding, 1),
      ('x', Some(s @ (1 | 2 | 4 | 8))) => (NodeType::Padding, s),
      _ => return Err(bad()),
    };

    if normalized && !matches!(ty, NodeType::Int | NodeType::Unsigned) {
      return Err(bad());
    }

    Ok(FormatNode {
      count,
      ty,
      size,
      normalized,
    })
  }
}

impl fmt::Display for FormatNode {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let ty = match self.ty {
      NodeType::Float => 'f',
      NodeType::Int => 'i',
      NodeType::Unsigned => 'u',
      NodeType::Padding => 'x',
    };
    let n = if self.normalized { "n" } else { "" };

    write!(f, "{}{}{}{}", self.count, n, ty, self.size)
  }
}

/// Per-vertex, per-instance or per-render attribute stepping.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Divisor {
  #[default]
  PerVertex,
  PerInstance,
  PerRender,
}

impl Divisor {
  /// Value passed to `glVertexAttribDivisor`.
  pub fn value(self) -> u32 {
    match self {
      Divisor::PerVertex => 0,
      Divisor::PerInstance => 1,
      Divisor::PerRender => PER_RENDER_DIVISOR,
    }
  }
}

/// A parsed format string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttributeFormat {
  nodes: Vec<FormatNode>,
  divisor: Divisor,
  stride: usize,
}

impl AttributeFormat {
  /// Parse a format string.
  pub fn parse(format: &str) -> Result<Self> {
    let mut tokens: Vec<&str> = format.split_whitespace().collect();
    let mut divisor = Divisor::PerVertex;

    // the divisor is either glued to the last token (3f/i) or standalone (3f /i)
    if let Some(last) = tokens.pop() {
      let (token, suffix) = match last.find('/') {
        Some(i) => (&last[..i], Some(&last[i + 1..])),
        None => (last, None),
      };

      if let Some(suffix) = suffix {
        divisor = match suffix {
          "v" => Divisor::PerVertex,
          "i" => Divisor::PerInstance,
          "r" => Divisor::PerRender,
          _ => {
            return Err(Error::creation(format!(
              "invalid divisor {:?} in format {:?}",
              suffix, format
            )))
          }
        };
      }

      if !token.is_empty() {
        tokens.push(token);
      }
    }

    if tokens.is_empty() {
      return Err(Error::creation(format!("empty format {:?}", format)));
    }

    let nodes = tokens
      .into_iter()
      .map(|token| {
        if token.contains('/') {
          Err(Error::creation(format!(
            "divisor must end the format {:?}",
            format
          )))
        } else {
          FormatNode::parse(token)
        }
      })
      .collect::<Result<Vec<_>>>()?;

    let stride = nodes.iter().map(FormatNode::bytes).sum();

    Ok(AttributeFormat {
      nodes,
      divisor,
      stride,
    })
  }

  pub fn nodes(&self) -> &[FormatNode] {
    &self.nodes
  }

  pub fn divisor(&self) -> Divisor {
    self.divisor
  }

  /// Sum of `count * size` over every node, padding included.
  pub fn stride(&self) -> usize {
    self.stride
  }

  /// Non-padding nodes together with their byte offset inside a vertex.
  pub fn attributes(&self) -> impl Iterator<Item = (usize, &FormatNode)> + '_ {
    self
      .nodes
      .iter()
      .scan(0, |offset, node| {
        let current = *offset;
        *offset += node.bytes();
        Some((current, node))
      })
      .filter(|(_, node)| !node.is_padding())
  }

  /// Number of nodes that bind to an attribute name.
  pub fn attribute_count(&self) -> usize {
    self.nodes.iter().filter(|n| !n.is_padding()).count()
  }
}

impl FromStr for AttributeFormat {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    AttributeFormat::parse(s)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn node(count: u32, ty: NodeType, size: u32, normalized: bool) -> FormatNode {
    FormatNode {
      count,
      ty,
      size,
      normalized,
    }
  }

  #[test]
  fn parse_simple() {
    let fmt = AttributeFormat::parse("3f 2f").unwrap();

    assert_eq!(
      fmt.nodes(),
      &[
        node(3, NodeType::Float, 4, false),
        node(2, NodeType::Float, 4, false)
      ]
    );
    assert_eq!(fmt.stride(), 20);
    assert_eq!(fmt.divisor(), Divisor::PerVertex);
  }

  #[test]
  fn parse_padding_and_normalized() {
    let fmt = AttributeFormat::parse("2f 4x 4nu1").unwrap();

    assert_eq!(fmt.stride(), 8 + 4 + 4);
    assert_eq!(fmt.attribute_count(), 2);

    let attrs: Vec<_> = fmt.attributes().collect();
    assert_eq!(attrs[0].0, 0);
    assert_eq!(attrs[1].0, 12);
    assert_eq!(attrs[1].1, &node(4, NodeType::Unsigned, 1, true));
    assert_eq!(attrs[1].1.gl_type(), Some(gl::UNSIGNED_BYTE));
  }

  #[test]
  fn parse_divisors() {
    assert_eq!(
      AttributeFormat::parse("3f/i").unwrap().divisor(),
      Divisor::PerInstance
    );
    assert_eq!(
      AttributeFormat::parse("3f 1u /r").unwrap().divisor(),
      Divisor::PerRender
    );
    assert_eq!(
      AttributeFormat::parse("2i/v").unwrap().divisor(),
      Divisor::PerVertex
    );
    assert_eq!(Divisor::PerRender.value(), PER_RENDER_DIVISOR);
  }

  #[test]
  fn double_and_half() {
    let fmt = AttributeFormat::parse("2d 3f2 d8").unwrap();

    assert_eq!(fmt.nodes()[0], node(2, NodeType::Float, 8, false));
    assert_eq!(fmt.nodes()[1].gl_type(), Some(gl::HALF_FLOAT));
    assert_eq!(fmt.stride(), 16 + 6 + 8);
  }

  #[test]
  fn padding_sizes() {
    assert_eq!(AttributeFormat::parse("4x").unwrap().stride(), 4);
    assert_eq!(AttributeFormat::parse("x8").unwrap().stride(), 8);
    assert_eq!(AttributeFormat::parse("2x4 f").unwrap().stride(), 12);
    assert_eq!(AttributeFormat::parse("4x").unwrap().attribute_count(), 0);
  }

  #[test]
  fn rejects_illegal_combinations() {
    for bad in [
      "", "   ", "f1", "f3", "i8", "u8", "x3", "nf", "nx", "0f", "3q", "3f/q", "3f/i 2f", "/i", "d4",
      "3ff",
    ] {
      assert!(AttributeFormat::parse(bad).is_err(), "{:?} should fail", bad);
    }
  }

  #[test]
  fn display_roundtrips_tokens() {
    let fmt = AttributeFormat::parse("3f 2nu1 4x").unwrap();
    let shown: Vec<String> = fmt.nodes().iter().map(|n| n.to_string()).collect();

    assert_eq!(shown, ["3f4", "2nu1", "4x1"]);
  }
}
