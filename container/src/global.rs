//! The process-wide container and its accessors.

use crate::container::Container;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

// `None` until a container is set or first requested.
static GLOBAL_CONTAINER: Lazy<RwLock<Option<Arc<Container>>>> = Lazy::new(|| RwLock::new(None));

/// Provides the process-wide container, creating an empty one on first access
/// if none was set.
///
/// # Examples
///
/// ```
/// use curia_container::global;
///
/// fn register_services() {
///   global().instance("greeting", String::from("Hello from global!"));
/// }
///
/// register_services();
/// assert_eq!(*global().get::<String>("greeting").unwrap(), "Hello from global!");
/// ```
pub fn global() -> Arc<Container> {
  let existing = GLOBAL_CONTAINER.read().clone();
  if let Some(container) = existing {
    return container;
  }
  GLOBAL_CONTAINER
    .write()
    .get_or_insert_with(|| Arc::new(Container::new()))
    .clone()
}

/// Installs `container` as the process-wide container, returning the previous one.
pub fn set_global(container: impl Into<Arc<Container>>) -> Option<Arc<Container>> {
  GLOBAL_CONTAINER.write().replace(container.into())
}

/// Removes the process-wide container. The next [`global`] call creates a fresh one.
pub fn clear_global() -> Option<Arc<Container>> {
  GLOBAL_CONTAINER.write().take()
}

/// True once a container has been set or lazily created.
pub fn has_global() -> bool {
  GLOBAL_CONTAINER.read().is_some()
}
