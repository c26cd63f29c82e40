//! Depth test related features.
//!
//! The same comparisons are used for depth-texture compare functions, spelled as short operator
//! strings (`"<="`, `"!="`, `"0"` for never, `"1"` for always…).

use crate::error::{Error, Result};
use std::{fmt, str::FromStr};

/// Depth comparison to perform while depth test. `a` is the incoming fragment’s depth and b is the
/// fragment’s depth that is already stored.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum DepthComparison {
  /// Depth test never succeeds.
  Never,
  /// Depth test always succeeds.
  Always,
  /// Depth test succeeds if `a == b`.
  Equal,
  /// Depth test succeeds if `a != b`.
  NotEqual,
  /// Depth test succeeds if `a < b`.
  #[default]
  Less,
  /// Depth test succeeds if `a <= b`.
  LessOrEqual,
  /// Depth test succeeds if `a > b`.
  Greater,
  /// Depth test succeeds if `a >= b`.
  GreaterOrEqual,
}

impl DepthComparison {
  pub fn as_str(self) -> &'static str {
    match self {
      DepthComparison::Never => "0",
      DepthComparison::Always => "1",
      DepthComparison::Equal => "==",
      DepthComparison::NotEqual => "!=",
      DepthComparison::Less => "<",
      DepthComparison::LessOrEqual => "<=",
      DepthComparison::Greater => ">",
      DepthComparison::GreaterOrEqual => ">=",
    }
  }

  /// Parse a compare function; the empty string disables comparison.
  pub fn parse_compare_func(s: &str) -> Result<Option<Self>> {
    if s.is_empty() {
      Ok(None)
    } else {
      s.parse().map(Some)
    }
  }
}

impl FromStr for DepthComparison {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "0" => Ok(DepthComparison::Never),
      "1" => Ok(DepthComparison::Always),
      "==" => Ok(DepthComparison::Equal),
      "!=" => Ok(DepthComparison::NotEqual),
      "<" => Ok(DepthComparison::Less),
      "<=" => Ok(DepthComparison::LessOrEqual),
      ">" => Ok(DepthComparison::Greater),
      ">=" => Ok(DepthComparison::GreaterOrEqual),
      _ => Err(Error::creation(format!("invalid compare function {:?}", s))),
    }
  }
}

impl fmt::Display for DepthComparison {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn compare_funcs() {
    for s in ["0", "1", "==", "!=", "<", "<=", ">", ">="] {
      assert_eq!(s.parse::<DepthComparison>().unwrap().to_string(), s);
    }

    assert_eq!(DepthComparison::parse_compare_func("").unwrap(), None);
    assert_eq!(
      DepthComparison::parse_compare_func("<=").unwrap(),
      Some(DepthComparison::LessOrEqual)
    );
    assert!(DepthComparison::parse_compare_func("=<").is_err());
  }
}
