//! GPU counters.

use bitflags::bitflags;
use gl::types::GLenum;

bitflags! {
  /// Counters captured by a query object.
  #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
  pub struct QueryKinds: u32 {
    const SAMPLES_PASSED = 1;
    const ANY_SAMPLES_PASSED = 2;
    const TIME_ELAPSED = 4;
    const PRIMITIVES_GENERATED = 8;
  }
}

impl QueryKinds {
  /// Each counter with its query target, in begin order.
  pub fn targets(self) -> impl Iterator<Item = (QueryKinds, GLenum)> {
    [
      (QueryKinds::SAMPLES_PASSED, gl::SAMPLES_PASSED),
      (QueryKinds::ANY_SAMPLES_PASSED, gl::ANY_SAMPLES_PASSED),
      (QueryKinds::TIME_ELAPSED, gl::TIME_ELAPSED),
      (QueryKinds::PRIMITIVES_GENERATED, gl::PRIMITIVES_GENERATED),
    ]
    .into_iter()
    .filter(move |(k, _)| self.contains(*k))
  }

  /// Whether a conditional render can be driven by these counters.
  pub fn supports_conditional_render(self) -> bool {
    self.intersects(QueryKinds::SAMPLES_PASSED | QueryKinds::ANY_SAMPLES_PASSED)
  }
}

impl Default for QueryKinds {
  /// Every counter.
  fn default() -> Self {
    QueryKinds::all()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn targets_follow_flags() {
    let kinds = QueryKinds::TIME_ELAPSED | QueryKinds::SAMPLES_PASSED;
    let targets: Vec<_> = kinds.targets().map(|(_, t)| t).collect();

    assert_eq!(targets, [gl::SAMPLES_PASSED, gl::TIME_ELAPSED]);
    assert!(kinds.supports_conditional_render());
    assert!(!QueryKinds::PRIMITIVES_GENERATED.supports_conditional_render());
    assert_eq!(QueryKinds::default().targets().count(), 4);
  }
}
