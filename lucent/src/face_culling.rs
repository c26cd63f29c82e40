//! Face culling is the operation of removing triangles if they’re facing the screen in a specific
//! direction with a specific mode.

use crate::error::{Error, Result};
use std::str::FromStr;

/// Face culling order.
///
/// The order determines how a triangle is determined to be discarded. If the triangle’s vertices
/// wind up in the same direction as the `FaceCullingOrder`, it’s assigned the front side,
/// otherwise, it’s the back side.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum FaceCullingOrder {
  /// Clockwise order.
  CW,
  /// Counter-clockwise order.
  #[default]
  CCW,
}

/// Side to cull.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum FaceCullingMode {
  /// Cull the front side only.
  Front,
  /// Cull the back side only.
  #[default]
  Back,
  /// Always cull any triangle.
  Both,
}

impl FromStr for FaceCullingOrder {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "cw" => Ok(FaceCullingOrder::CW),
      "ccw" => Ok(FaceCullingOrder::CCW),
      _ => Err(Error::creation(format!("invalid front face {:?}", s))),
    }
  }
}

impl FromStr for FaceCullingMode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "front" => Ok(FaceCullingMode::Front),
      "back" => Ok(FaceCullingMode::Back),
      "front_and_back" => Ok(FaceCullingMode::Both),
      _ => Err(Error::creation(format!("invalid cull face {:?}", s))),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse() {
    assert_eq!("cw".parse::<FaceCullingOrder>().unwrap(), FaceCullingOrder::CW);
    assert_eq!(
      "front_and_back".parse::<FaceCullingMode>().unwrap(),
      FaceCullingMode::Both
    );
    assert!("CW".parse::<FaceCullingOrder>().is_err());
    assert_eq!(FaceCullingMode::default(), FaceCullingMode::Back);
  }
}
