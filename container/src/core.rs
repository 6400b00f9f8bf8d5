//! Core data structures shared by the registry, the resolver and the invoker.

use crate::container::Container;
use crate::error::{ContainerError, Result};
use crate::key::Key;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A resolved service, type-erased.
pub type Instance = Arc<dyn Any + Send + Sync>;

pub(crate) type Factory = Arc<dyn Fn(&Container) -> Result<Instance> + Send + Sync>;
pub(crate) type Hook = Arc<dyn Fn(&Instance, &Container) -> Option<Instance> + Send + Sync>;
pub(crate) type MethodOverride = Arc<dyn Fn(&Instance, &Container) -> Result<Instance> + Send + Sync>;

/// How a binding produces its instance.
#[derive(Clone)]
pub(crate) enum Concrete {
  /// A closure receiving the container.
  Factory(Factory),
  /// A concrete target: built directly when it equals the abstract key,
  /// otherwise resolved as another abstract key.
  Key(Key),
}

/// A registered strategy. Key targets are already wrapped into factories.
#[derive(Clone)]
pub(crate) struct Binding {
  pub(crate) factory: Factory,
  pub(crate) shared: bool,
}

static NEXT_CONTAINER_ID: AtomicUsize = AtomicUsize::new(0);

pub(crate) fn next_container_id() -> usize {
  NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed)
}

thread_local! {
  // Keys currently being resolved on this thread, tagged with the owning
  // container so that two containers may resolve the same key in a nested way.
  static RESOLVING: RefCell<HashSet<(usize, Key)>> = RefCell::new(HashSet::new());
}

/// An RAII guard that detects re-entrant resolution of the same key.
///
/// Creating the guard pushes `(container, key)` onto the thread-local
/// resolution set and fails if it was already there. Dropping it pops the entry,
/// including when resolution unwinds with an error.
pub(crate) struct ResolutionGuard {
  entry: (usize, Key),
}

impl ResolutionGuard {
  pub(crate) fn enter(container: usize, key: &Key) -> Result<Self> {
    let entry = (container, key.clone());
    let inserted = RESOLVING.with(|set| set.borrow_mut().insert(entry.clone()));
    if !inserted {
      return Err(ContainerError::CircularDependency(key.clone()));
    }
    Ok(Self { entry })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING.with(|set| {
      set.borrow_mut().remove(&self.entry);
    });
  }
}
