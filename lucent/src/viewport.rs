//! Viewports, scissor regions and write masks.
//!
//! The scissor test is a special test performed at rendering time. It allows to define a region
//! of the screen for which fragments will be discarded. Viewports and scissor regions share the same
//! rectangle type.

use crate::error::{Error, Result};

/// A screen-space rectangle.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct Viewport {
  /// The x screen position of the region.
  pub x: u32,

  /// The y screen position of the region.
  pub y: u32,

  /// The screen width of the region.
  pub width: u32,

  /// The screen height of the region.
  pub height: u32,
}

impl Viewport {
  /// Create a region; width and height must be positive.
  pub fn new(x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
    if width == 0 || height == 0 {
      return Err(Error::out_of_range(format!(
        "viewport ({}, {}, {}, {}) must have a positive width and height",
        x, y, width, height
      )));
    }

    Ok(Viewport {
      x,
      y,
      width,
      height,
    })
  }

  /// The whole of a `width × height` surface.
  pub fn full(width: u32, height: u32) -> Self {
    Viewport {
      x: 0,
      y: 0,
      width,
      height,
    }
  }

  /// Check that the region fits in a `width × height` surface.
  pub fn check_within(&self, width: u32, height: u32) -> Result<()> {
    let fits = |o: u32, len: u32, max: u32| o.checked_add(len).map_or(false, |end| end <= max);

    if fits(self.x, self.width, width) && fits(self.y, self.height, height) {
      Ok(())
    } else {
      Err(Error::out_of_range(format!(
        "region ({}, {}, {}, {}) exceeds the {}×{} surface",
        self.x, self.y, self.width, self.height, width, height
      )))
    }
  }

  pub fn as_gl(&self) -> [i32; 4] {
    [
      self.x as i32,
      self.y as i32,
      self.width as i32,
      self.height as i32,
    ]
  }
}

/// A box inside a 3D or layered image.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct Viewport3 {
  pub x: u32,
  pub y: u32,
  pub z: u32,
  pub width: u32,
  pub height: u32,
  pub depth: u32,
}

impl Viewport3 {
  pub fn new(x: u32, y: u32, z: u32, width: u32, height: u32, depth: u32) -> Result<Self> {
    if width == 0 || height == 0 || depth == 0 {
      return Err(Error::out_of_range(format!(
        "viewport ({}, {}, {}, {}, {}, {}) must have a positive size",
        x, y, z, width, height, depth
      )));
    }

    Ok(Viewport3 {
      x,
      y,
      z,
      width,
      height,
      depth,
    })
  }

  pub fn full(width: u32, height: u32, depth: u32) -> Self {
    Viewport3 {
      x: 0,
      y: 0,
      z: 0,
      width,
      height,
      depth,
    }
  }

  pub fn check_within(&self, width: u32, height: u32, depth: u32) -> Result<()> {
    Viewport {
      x: self.x,
      y: self.y,
      width: self.width,
      height: self.height,
    }
    .check_within(width, height)?;

    match self.z.checked_add(self.depth) {
      Some(end) if end <= depth => Ok(()),
      _ => Err(Error::out_of_range(format!(
        "layers [{}, {}+{}) exceed depth {}",
        self.z, self.z, self.depth, depth
      ))),
    }
  }
}

/// Per-channel color write mask.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct ColorMask(pub [bool; 4]);

impl ColorMask {
  pub const ALL: ColorMask = ColorMask([true; 4]);
  pub const NONE: ColorMask = ColorMask([false; 4]);
}

impl Default for ColorMask {
  fn default() -> Self {
    ColorMask::ALL
  }
}

impl From<[bool; 4]> for ColorMask {
  fn from(mask: [bool; 4]) -> Self {
    ColorMask(mask)
  }
}

impl From<(bool, bool, bool, bool)> for ColorMask {
  fn from((r, g, b, a): (bool, bool, bool, bool)) -> Self {
    ColorMask([r, g, b, a])
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn positive_size() {
    assert!(Viewport::new(0, 0, 1, 1).is_ok());
    assert!(Viewport::new(2, 2, 0, 2).is_err());
    assert!(Viewport::new(2, 2, 2, 0).is_err());
    assert!(Viewport3::new(0, 0, 0, 1, 1, 0).is_err());
  }

  #[test]
  fn bounds() {
    let v = Viewport::new(2, 2, 2, 2).unwrap();

    assert!(v.check_within(4, 4).is_ok());
    assert!(v.check_within(3, 4).is_err());
    assert!(Viewport::new(u32::MAX, 0, 2, 1).unwrap().check_within(4, 4).is_err());

    let b = Viewport3::new(0, 0, 1, 4, 4, 2).unwrap();
    assert!(b.check_within(4, 4, 3).is_ok());
    assert!(b.check_within(4, 4, 2).is_err());
    assert!(b.check_within(3, 4, 3).is_err());
  }

  #[test]
  fn masks() {
    assert_eq!(ColorMask::from((true, false, true, false)).0, [true, false, true, false]);
    assert_eq!(ColorMask::default(), ColorMask::ALL);
  }
}
