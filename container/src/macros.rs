//! Public macros for ergonomic resolution and type description.

/// Resolves a service from the global container.
///
/// # Panics
///
/// Panics if the service cannot be resolved. For a non-panicking version, use
/// [`maybe_resolve!`] or `global().get(...)` directly.
///
/// # Examples
///
/// ```
/// use curia_container::{global, resolve};
///
/// global().singleton_factory("motd", |_| Ok(String::from("hello")));
///
/// let message = resolve!(String, "motd");
/// assert_eq!(*message, "hello");
/// ```
///
/// ```
/// use curia_container::{global, resolve, Key};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
/// struct EnglishGreeter;
/// impl Greeter for EnglishGreeter { fn greet(&self) -> String { "Hello!".to_string() } }
///
/// global().singleton_trait::<dyn Greeter>(Key::of::<dyn Greeter>(), |_| {
///   Ok(Arc::new(EnglishGreeter) as Arc<dyn Greeter>)
/// });
///
/// let greeter = resolve!(trait Greeter);
/// assert_eq!(greeter.greet(), "Hello!");
/// ```
#[cfg(feature = "global")]
#[macro_export]
macro_rules! resolve {
  (trait $trait_ident:ident) => {
    $crate::global()
      .get_trait::<dyn $trait_ident>($crate::Key::of::<dyn $trait_ident>())
      .unwrap_or_else(|err| {
        panic!(
          "Failed to resolve required trait service {}: {}",
          std::any::type_name::<dyn $trait_ident>(),
          err
        )
      })
  };

  (trait $trait_ident:ident, $name:expr) => {
    $crate::global()
      .get_trait::<dyn $trait_ident>($name)
      .unwrap_or_else(|err| {
        panic!(
          "Failed to resolve required trait service with name '{}': {}",
          $name, err
        )
      })
  };

  ($type:ty) => {
    $crate::global().make::<$type>().unwrap_or_else(|err| {
      panic!(
        "Failed to resolve required service {}: {}",
        std::any::type_name::<$type>(),
        err
      )
    })
  };

  ($type:ty, $name:expr) => {
    $crate::global()
      .get::<$type>($name)
      .unwrap_or_else(|err| {
        panic!(
          "Failed to resolve required service with name '{}': {}",
          $name, err
        )
      })
  };
}

/// Like [`resolve!`], returning `None` instead of panicking.
#[cfg(feature = "global")]
#[macro_export]
macro_rules! maybe_resolve {
  (trait $trait_ident:ident) => {
    $crate::global()
      .get_trait::<dyn $trait_ident>($crate::Key::of::<dyn $trait_ident>())
      .ok()
  };
  (trait $trait_ident:ident, $name:expr) => {
    $crate::global().get_trait::<dyn $trait_ident>($name).ok()
  };
  ($type:ty) => {
    $crate::global().make::<$type>().ok()
  };
  ($type:ty, $name:expr) => {
    $crate::global().get::<$type>($name).ok()
  };
}

/// Implements [`Injectable`](crate::Injectable) for a struct whose fields are
/// `Arc<_>` dependencies, in declaration order.
///
/// Fields are resolved by the type token of their inner type, or by an
/// explicit key with `field: Type => key`.
///
/// ```
/// use curia_container::{injectable, Container};
/// use std::sync::Arc;
///
/// struct Clock;
/// struct Store;
/// struct Scheduler {
///   clock: Arc<Clock>,
///   store: Arc<Store>,
/// }
///
/// injectable!(Clock {});
/// injectable!(Store {});
/// injectable!(Scheduler { clock: Clock => "clock", store: Store => curia_container::Key::of::<Store>() });
///
/// let container = Container::new();
/// container.register_as::<Clock>("clock");
/// container.register::<Store>();
/// container.register::<Scheduler>();
/// assert!(container.make::<Scheduler>().is_ok());
/// ```
#[macro_export]
macro_rules! injectable {
  ($type:ident { $($field:ident : $dep:ty => $key:expr),* $(,)? }) => {
    impl $crate::Injectable for $type {
      fn parameters() -> ::std::option::Option<::std::vec::Vec<$crate::Parameter>> {
        ::std::option::Option::Some(::std::vec![
          $($crate::Parameter::dependency(::std::stringify!($field), $key)),*
        ])
      }

      #[allow(unused_variables)]
      fn construct(args: &mut $crate::Arguments) -> $crate::Result<Self> {
        ::std::result::Result::Ok($type {
          $($field: args.next::<$dep>()?),*
        })
      }
    }
  };

  ($type:ident { $($field:ident : $dep:ty),* $(,)? }) => {
    $crate::injectable!($type { $($field : $dep => $crate::Key::of::<$dep>()),* });
  };
}
