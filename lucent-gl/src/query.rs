//! GPU queries and conditional rendering.
//!
//! A [`Query`] counts what happens between [`Query::begin`] and the drop of the returned guard:
//! samples passing the depth test, elapsed GPU time and generated primitives. Results block until
//! the driver has them.

use crate::{
  context::{Context, ContextState},
  object::RawObject,
};
use gl::types::*;
use lucent::{query::QueryKinds, Error, Glo, ObjectKind, Result};
use std::{cell::Cell, rc::Rc};

/// Targets to begin for a set of counters.
///
/// Occlusion targets can’t be active at the same time; when both sample counters are asked for,
/// the exact count is queried and the boolean one derived from it.
fn plan(kinds: QueryKinds) -> Vec<(QueryKinds, GLenum)> {
  let derive_any = kinds.contains(QueryKinds::SAMPLES_PASSED | QueryKinds::ANY_SAMPLES_PASSED);

  kinds
    .targets()
    .filter(|(k, _)| !(derive_any && *k == QueryKinds::ANY_SAMPLES_PASSED))
    .collect()
}

struct Counter {
  kind: QueryKinds,
  target: GLenum,
  raw: RawObject,
}

pub(crate) struct QueryInner {
  kinds: QueryKinds,
  counters: Vec<Counter>,
  active: Cell<bool>,
  ended: Cell<bool>,
}

/// A set of GPU counters.
#[derive(Clone)]
pub struct Query(Rc<QueryInner>);

impl PartialEq for Query {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }
}

impl Eq for Query {}

impl std::fmt::Debug for Query {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Query({:?}, {})", self.0.kinds, self.glo())
  }
}

impl Context {
  /// A query over `kinds`. Every counter when empty.
  pub fn query(&self, kinds: QueryKinds) -> Result<Query> {
    let state = self.current_state()?;
    let kinds = if kinds.is_empty() {
      QueryKinds::default()
    } else {
      kinds
    };

    let counters = plan(kinds)
      .into_iter()
      .map(|(kind, target)| {
        let mut name: GLuint = 0;
        unsafe { gl::GenQueries(1, &mut name) };

        Counter {
          kind,
          target,
          raw: RawObject::new(state, ObjectKind::Query, name),
        }
      })
      .collect();

    Ok(Query(Rc::new(QueryInner {
      kinds,
      counters,
      active: Cell::new(false),
      ended: Cell::new(false),
    })))
  }
}

/// Ends the queries of a [`Query`] when dropped.
pub struct QueryGuard<'a> {
  query: &'a Query,
}

impl<'a> QueryGuard<'a> {
  /// End the queries now.
  pub fn end(self) {}
}

impl<'a> Drop for QueryGuard<'a> {
  fn drop(&mut self) {
    let inner = &self.query.0;

    for counter in inner.counters.iter().rev() {
      unsafe { gl::EndQuery(counter.target) };
    }

    inner.active.set(false);
    inner.ended.set(true);
  }
}

impl Query {
  /// Driver name of the first counter, or [`Glo::Invalid`] once released.
  pub fn glo(&self) -> Glo {
    self
      .0
      .counters
      .first()
      .map_or(Glo::Invalid, |c| c.raw.glo())
  }

  /// Delete the driver queries. Releasing twice does nothing.
  pub fn release(&self) {
    if self.0.active.get() {
      return;
    }

    for counter in &self.0.counters {
      counter.raw.release();
    }
  }

  pub fn kinds(&self) -> QueryKinds {
    self.0.kinds
  }

  fn live(&self) -> Result<Rc<ContextState>> {
    let mut state = None;

    for counter in &self.0.counters {
      state = Some(counter.raw.live()?.0);
    }

    state.ok_or(Error::InvalidObject("query"))
  }

  /// Start counting until the returned guard is dropped.
  pub fn begin(&self) -> Result<QueryGuard<'_>> {
    self.live()?;

    if self.0.active.get() {
      return Err(Error::creation("this query is already running"));
    }

    for counter in &self.0.counters {
      if let Some(name) = counter.raw.glo().name() {
        unsafe { gl::BeginQuery(counter.target, name) };
      }
    }

    self.0.active.set(true);
    Ok(QueryGuard { query: self })
  }

  fn counter(&self, kind: QueryKinds) -> Option<&Counter> {
    self.0.counters.iter().find(|c| c.kind == kind)
  }

  fn result(&self, kind: QueryKinds, what: &str) -> Result<u64> {
    self.live()?;

    let counter = self
      .counter(kind)
      .ok_or_else(|| Error::creation(format!("this query doesn’t count {}", what)))?;

    if self.0.active.get() || !self.0.ended.get() {
      return Err(Error::creation(format!(
        "{} are only known once the query has ended",
        what
      )));
    }

    let name = counter.raw.glo().name().ok_or(Error::InvalidObject("query"))?;
    let mut value: GLuint64 = 0;
    unsafe { gl::GetQueryObjectui64v(name, gl::QUERY_RESULT, &mut value) };

    Ok(value)
  }

  /// Samples that passed the depth test.
  pub fn samples(&self) -> Result<u64> {
    self.result(QueryKinds::SAMPLES_PASSED, "samples")
  }

  /// Whether any sample passed the depth test.
  pub fn any_samples(&self) -> Result<bool> {
    if self.counter(QueryKinds::ANY_SAMPLES_PASSED).is_some() {
      self
        .result(QueryKinds::ANY_SAMPLES_PASSED, "any samples")
        .map(|v| v != 0)
    } else if self.0.kinds.contains(QueryKinds::ANY_SAMPLES_PASSED) {
      self.samples().map(|v| v > 0)
    } else {
      Err(Error::creation("this query doesn’t count any samples"))
    }
  }

  /// Elapsed GPU time, in nanoseconds.
  pub fn elapsed(&self) -> Result<u64> {
    self.result(QueryKinds::TIME_ELAPSED, "elapsed time")
  }

  pub fn primitives(&self) -> Result<u64> {
    self.result(QueryKinds::PRIMITIVES_GENERATED, "primitives")
  }

  /// Conditional rendering driven by the samples counted by this query.
  pub fn conditional_render(&self) -> Result<ConditionalRender> {
    if !self.0.kinds.supports_conditional_render() {
      return Err(Error::creation(
        "conditional rendering needs a query counting samples",
      ));
    }

    Ok(ConditionalRender {
      query: self.clone(),
    })
  }
}

/// Discards the draws it encloses when its query counted no sample.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConditionalRender {
  query: Query,
}

/// Ends conditional rendering when dropped.
pub struct ConditionalRenderGuard<'a> {
  render: &'a ConditionalRender,
}

impl ConditionalRender {
  pub fn query(&self) -> &Query {
    &self.query
  }

  /// Start conditional rendering until the returned guard is dropped.
  pub fn enter(&self) -> Result<ConditionalRenderGuard<'_>> {
    self.query.live()?;

    let counter = self
      .query
      .counter(QueryKinds::SAMPLES_PASSED)
      .or_else(|| self.query.counter(QueryKinds::ANY_SAMPLES_PASSED))
      .ok_or_else(|| Error::creation("conditional rendering needs a query counting samples"))?;

    let name = counter.raw.glo().name().ok_or(Error::InvalidObject("query"))?;

    if self.query.0.active.get() {
      return Err(Error::creation(
        "conditional rendering can’t use a running query",
      ));
    }

    unsafe { gl::BeginConditionalRender(name, gl::QUERY_WAIT) };
    Ok(ConditionalRenderGuard { render: self })
  }
}

impl<'a> ConditionalRenderGuard<'a> {
  pub fn conditional_render(&self) -> &ConditionalRender {
    self.render
  }
}

impl<'a> Drop for ConditionalRenderGuard<'a> {
  fn drop(&mut self) {
    unsafe { gl::EndConditionalRender() };
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn occlusion_counters_do_not_overlap() {
    let both = plan(QueryKinds::SAMPLES_PASSED | QueryKinds::ANY_SAMPLES_PASSED);
    assert_eq!(both, [(QueryKinds::SAMPLES_PASSED, gl::SAMPLES_PASSED)]);

    let any = plan(QueryKinds::ANY_SAMPLES_PASSED | QueryKinds::TIME_ELAPSED);
    assert_eq!(
      any,
      [
        (QueryKinds::ANY_SAMPLES_PASSED, gl::ANY_SAMPLES_PASSED),
        (QueryKinds::TIME_ELAPSED, gl::TIME_ELAPSED)
      ]
    );

    assert_eq!(plan(QueryKinds::default()).len(), 3);
  }
}
