// container/tests/macros.rs

//! Tests for the resolution macros against the global container:
//! - `resolve!`
//! - `maybe_resolve!`
//! - `injectable!` together with global resolution

use curia_container::{global, injectable, maybe_resolve, resolve, Key};
use std::sync::Arc;

// --- Test Fixtures ---

struct MacroTestService {
  value: i32,
}

trait MacroTestTrait: Send + Sync {
  fn value(&self) -> i32;
}

impl MacroTestTrait for MacroTestService {
  fn value(&self) -> i32 {
    self.value
  }
}

struct UnregisteredService;

struct Engine;
struct Car {
  engine: Arc<Engine>,
}

injectable!(Engine {});
injectable!(Car { engine: Engine });

// --- Global Macro Tests ---

#[test]
fn test_maybe_resolve_global() {
  // Arrange
  global().singleton_factory(Key::of::<MacroTestService>(), |_| Ok(MacroTestService { value: 42 }));
  global().singleton_factory("macros.named", |_| Ok(MacroTestService { value: 43 }));
  global().singleton_trait::<dyn MacroTestTrait>(Key::of::<dyn MacroTestTrait>(), |_| {
    Ok(Arc::new(MacroTestService { value: 44 }) as Arc<dyn MacroTestTrait>)
  });
  global().singleton_trait::<dyn MacroTestTrait>("macros.named_trait", |_| {
    Ok(Arc::new(MacroTestService { value: 45 }) as Arc<dyn MacroTestTrait>)
  });

  // Act & Assert: Success cases
  assert_eq!(maybe_resolve!(MacroTestService).unwrap().value, 42);
  assert_eq!(maybe_resolve!(MacroTestService, "macros.named").unwrap().value, 43);
  assert_eq!(maybe_resolve!(trait MacroTestTrait).unwrap().value(), 44);
  assert_eq!(
    maybe_resolve!(trait MacroTestTrait, "macros.named_trait")
      .unwrap()
      .value(),
    45
  );

  // Act & Assert: Failure cases
  assert!(maybe_resolve!(UnregisteredService).is_none());
  assert!(maybe_resolve!(MacroTestService, "macros.missing").is_none());
  trait MissingTrait: Send + Sync {}
  assert!(maybe_resolve!(trait MissingTrait).is_none());
}

#[test]
fn test_resolve_returns_shared_instances() {
  global().singleton_factory("macros.shared", |_| Ok(MacroTestService { value: 7 }));

  let r1 = resolve!(MacroTestService, "macros.shared");
  let r2 = resolve!(MacroTestService, &String::from("macros.shared"));

  assert_eq!(r1.value, 7);
  assert!(Arc::ptr_eq(&r1, &r2));
}

#[test]
fn test_injectable_types_resolve_through_the_global_container() {
  global().register::<Engine>();
  global().register::<Car>();
  global().singleton_self(Key::of::<Engine>());

  let first = resolve!(Car);
  let second = resolve!(Car);

  assert!(!Arc::ptr_eq(&first, &second));
  assert!(Arc::ptr_eq(&first.engine, &second.engine));
}

#[test]
#[should_panic(expected = "Failed to resolve required service")]
fn test_resolve_panics_on_missing_concrete_service() {
  struct MissingService;
  resolve!(MissingService);
}

#[test]
#[should_panic(expected = "Failed to resolve required trait service")]
fn test_resolve_panics_on_missing_trait_service() {
  trait MissingTrait: Send + Sync {}
  resolve!(trait MissingTrait);
}

#[test]
#[should_panic(expected = "is not instantiable")]
fn test_resolve_panic_message_carries_the_cause() {
  resolve!(MacroTestService, "macros.never_registered");
}
