use curia_container::{Container, ContainerError, Key};
use pretty_assertions::assert_eq;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// --- Test Fixtures ---

trait Greeter: Send + Sync {
  fn greet(&self) -> String;
}

struct EnglishGreeter;
impl Greeter for EnglishGreeter {
  fn greet(&self) -> String {
    "Hello!".to_string()
  }
}

#[derive(Debug, PartialEq, Eq)]
struct SimpleService {
  id: usize,
}

fn counting_factory(counter: Arc<AtomicUsize>) -> impl Fn(&Container) -> curia_container::Result<SimpleService> {
  move |_| {
    Ok(SimpleService {
      id: counter.fetch_add(1, Ordering::SeqCst),
    })
  }
}

// --- Basic Tests ---

#[test]
fn test_singleton_returns_the_same_instance() {
  // Arrange
  let container = Container::new();
  container.singleton_factory("simple", |_| Ok(SimpleService { id: 101 }));

  // Act
  let r1 = container.get::<SimpleService>("simple").unwrap();
  let r2 = container.get::<SimpleService>("simple").unwrap();

  // Assert
  assert_eq!(r1.id, 101);
  assert!(Arc::ptr_eq(&r1, &r2));
  assert!(container.is_shared("simple"));
}

#[test]
fn test_bind_returns_distinct_instances() {
  // Arrange
  let container = Container::new();
  let counter = Arc::new(AtomicUsize::new(0));
  container.bind_factory("simple", counting_factory(counter.clone()));

  // Act
  let r1 = container.get::<SimpleService>("simple").unwrap();
  let r2 = container.get::<SimpleService>("simple").unwrap();

  // Assert
  assert_eq!((r1.id, r2.id), (0, 1));
  assert!(!Arc::ptr_eq(&r1, &r2));
  assert!(!container.is_shared("simple"));
}

#[test]
fn test_instance_bypasses_the_bound_strategy() {
  // Arrange
  let container = Container::new();
  let counter = Arc::new(AtomicUsize::new(0));
  container.bind_factory("simple", counting_factory(counter.clone()));
  let value = Arc::new(SimpleService { id: 202 });

  // Act
  container.instance_arc("simple", value.clone());
  let resolved = container.get::<SimpleService>("simple").unwrap();

  // Assert
  assert!(Arc::ptr_eq(&value, &resolved));
  assert_eq!(counter.load(Ordering::SeqCst), 0);
  assert!(container.is_shared("simple"));
}

#[test]
fn test_instance_registration_is_chainable() {
  let container = Container::new();
  container
    .instance("host", String::from("localhost"))
    .instance("port", 8080_u16);

  assert_eq!(*container.get::<String>("host").unwrap(), "localhost");
  assert_eq!(*container.get::<u16>("port").unwrap(), 8080);
}

#[test]
fn test_instance_is_stored_under_the_alias_target() {
  let container = Container::new();
  container.alias("db", "database");
  container.instance("db", String::from("postgres"));

  assert_eq!(*container.get::<String>("database").unwrap(), "postgres");
  assert_eq!(*container.get::<String>("db").unwrap(), "postgres");
}

#[test]
fn test_alias_chain_resolves_like_its_target() {
  // Arrange: a -> b -> c, with c bound to a singleton.
  let container = Container::new();
  container.singleton_factory("c", |_| Ok(SimpleService { id: 7 }));
  container.alias("a", "b");
  container.alias("b", "c");

  // Act
  let via_alias = container.get::<SimpleService>("a").unwrap();
  let direct = container.get::<SimpleService>("c").unwrap();

  // Assert
  assert!(Arc::ptr_eq(&via_alias, &direct));
  assert_eq!(container.get_alias("a").unwrap(), Key::from("c"));
}

#[test]
fn test_cyclic_alias_chain_is_a_configuration_error() {
  let container = Container::new();
  container.alias("a", "b");
  container.alias("b", "a");

  let err = container.resolve("a").unwrap_err();

  assert!(matches!(err, ContainerError::CyclicAlias(key) if key == Key::from("a")));
}

#[test]
fn test_bind_to_another_key_redirects() {
  // Arrange: an interface-to-interface chain ending at a factory.
  let container = Container::new();
  container.singleton_factory("sqlite", |_| Ok(String::from("sqlite://memory")));
  container.bind("repository", "storage");
  container.bind("storage", "sqlite");

  // Act
  let resolved = container.get::<String>("repository").unwrap();

  // Assert
  assert_eq!(*resolved, "sqlite://memory");
  // Non-shared redirect, shared target: still the same instance underneath.
  assert!(Arc::ptr_eq(&resolved, &container.get::<String>("sqlite").unwrap()));
}

#[test]
fn test_binding_cycle_is_detected() {
  let container = Container::new();
  container.bind("a", "b");
  container.bind("b", "a");

  let err = container.resolve("a").unwrap_err();

  assert!(matches!(err, ContainerError::CircularDependency(key) if key == Key::from("a")));
}

#[test]
fn test_rebinding_invalidates_the_cached_instance() {
  // Arrange
  let container = Container::new();
  container.singleton_factory("simple", |_| Ok(SimpleService { id: 1 }));
  let first = container.get::<SimpleService>("simple").unwrap();

  // Act
  container.singleton_factory("simple", |_| Ok(SimpleService { id: 2 }));
  let second = container.get::<SimpleService>("simple").unwrap();

  // Assert
  assert_eq!(first.id, 1);
  assert_eq!(second.id, 2);
  assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_rebinding_drops_an_alias_of_the_same_name() {
  let container = Container::new();
  container.instance("target", String::from("through alias"));
  container.alias("name", "target");
  assert_eq!(*container.get::<String>("name").unwrap(), "through alias");

  container.bind_factory("name", |_| Ok(String::from("own binding")));

  assert!(!container.is_alias("name"));
  assert_eq!(*container.get::<String>("name").unwrap(), "own binding");
}

#[test]
fn test_bound_and_has_never_resolve() {
  let container = Container::new();
  container.bind_factory("bound", |_| -> curia_container::Result<SimpleService> {
    panic!("has() must not resolve")
  });
  container.instance("instance", 1_u8);
  container.alias("alias", "nowhere");

  assert!(container.bound("bound"));
  assert!(container.has("instance"));
  assert!(container.has("alias"));
  assert!(!container.has("nowhere"));
  assert!(!container.has(Key::of::<SimpleService>()));
}

#[test]
fn test_forget_removes_binding_instance_and_alias() {
  let container = Container::new();
  container.singleton_factory("service", |_| Ok(SimpleService { id: 3 }));
  container.get::<SimpleService>("service").unwrap();
  container.alias("svc", "service");

  container.forget("service");
  container.forget("svc");

  assert!(!container.has("service"));
  assert!(!container.has("svc"));
  assert!(container.resolve("service").unwrap_err().is_not_instantiable());
}

#[test]
fn test_forget_instance_rebuilds_shared_bindings() {
  let container = Container::new();
  let counter = Arc::new(AtomicUsize::new(0));
  container.singleton_factory("simple", counting_factory(counter.clone()));

  let first = container.get::<SimpleService>("simple").unwrap();
  container.forget_instance("simple");
  let second = container.get::<SimpleService>("simple").unwrap();
  container.forget_instances();
  let third = container.get::<SimpleService>("simple").unwrap();

  assert_eq!((first.id, second.id, third.id), (0, 1, 2));
}

#[test]
fn test_flush_clears_everything() {
  let container = Container::new();
  container.instance("a", 1_i32);
  container.bind_factory("b", |_| Ok(2_i32));
  container.alias("c", "a");
  container.hook("a", |_, _| None);

  container.flush();

  assert!(!container.has("a"));
  assert!(!container.has("b"));
  assert!(!container.has("c"));
}

#[test]
fn test_trait_bindings_resolve_as_trait_objects() {
  // Arrange
  let container = Container::new();
  container.singleton_trait::<dyn Greeter>(Key::of::<dyn Greeter>(), |_| {
    Ok(Arc::new(EnglishGreeter) as Arc<dyn Greeter>)
  });
  container.instance_trait::<dyn Greeter>("fixed", Arc::new(EnglishGreeter));

  // Act
  let greeter = container.get_trait::<dyn Greeter>(Key::of::<dyn Greeter>()).unwrap();
  let again = container.get_trait::<dyn Greeter>(Key::of::<dyn Greeter>()).unwrap();
  let fixed = container.get_trait::<dyn Greeter>("fixed").unwrap();

  // Assert
  assert_eq!(greeter.greet(), "Hello!");
  assert_eq!(fixed.greet(), "Hello!");
  assert!(Arc::ptr_eq(&greeter, &again));
}

#[test]
fn test_wrong_type_is_reported() {
  let container = Container::new();
  container.instance("number", 5_u32);

  let err = container.get::<String>("number").unwrap_err();

  assert!(matches!(err, ContainerError::TypeMismatch { key, .. } if key == Key::from("number")));
  assert!(container.try_get::<String>("number").is_none());
  assert_eq!(container.try_get::<u32>("number").as_deref(), Some(&5));
}

#[test]
fn test_factory_errors_are_surfaced() {
  let container = Container::new();
  container.bind_factory("flaky", |_| -> curia_container::Result<SimpleService> {
    Err(ContainerError::factory("flaky", "connection refused"))
  });

  let err = container.resolve("flaky").unwrap_err();

  assert_eq!(err.to_string(), "factory for [flaky] failed: connection refused");
}
