//! # Curia Container
//!
//! An Inversion of Control (IoC) container that maps abstract identifiers to
//! construction strategies and builds object graphs on demand.
//!
//! ## Core Concepts
//!
//! - **Key**: the identifier a service is bound and requested under, either a
//!   string name or a type token (`Key::of::<T>()`).
//! - **Binding**: a factory or a concrete key, shared (singleton) or not.
//! - **Alias**: a redirect followed before any lookup. Cycles are reported as
//!   errors.
//! - **Instance**: an already-built value returned on every resolution.
//! - **Hook**: a decorator run after every resolution of a key, cache hits
//!   included. It may replace the instance.
//! - **Injectable**: a type that describes its constructor parameters, so the
//!   container can build it without a binding.
//! - **Global Container**: an optional process-wide container behind `global()`.
//!
//! ## Quick Start
//!
//! ```
//! use curia_container::{Arguments, Container, Injectable, Parameter, Result};
//! use std::sync::Arc;
//!
//! struct Logger {
//!   prefix: &'static str,
//! }
//!
//! struct Service {
//!   logger: Arc<Logger>,
//! }
//!
//! impl Injectable for Service {
//!   fn parameters() -> Option<Vec<Parameter>> {
//!     Some(vec![Parameter::dependency("logger", "Logger")])
//!   }
//!
//!   fn construct(args: &mut Arguments) -> Result<Self> {
//!     Ok(Service { logger: args.next()? })
//!   }
//! }
//!
//! let container = Container::new();
//! container.singleton_factory("Logger", |_| Ok(Logger { prefix: "[app]" }));
//! container.register_as::<Service>("Service");
//!
//! let first = container.get::<Service>("Service").unwrap();
//! let second = container.get::<Service>("Service").unwrap();
//!
//! // Services are built fresh, the shared logger is not.
//! assert!(!Arc::ptr_eq(&first, &second));
//! assert!(Arc::ptr_eq(&first.logger, &second.logger));
//! assert_eq!(first.logger.prefix, "[app]");
//! ```

mod container;
mod core;
mod error;
#[cfg(feature = "global")]
mod global;
mod invoker;
mod key;
mod macros;
mod reflect;

pub use crate::container::Container;
pub use crate::core::Instance;
pub use crate::error::{BoxError, ContainerError, Result};
#[cfg(feature = "global")]
pub use crate::global::{clear_global, global, has_global, set_global};
pub use crate::invoker::{Callable, Parameters};
pub use crate::key::Key;
pub use crate::reflect::{Arguments, Injectable, Method, MethodInfo, Parameter, Reflector, TypeInfo};
