//! Errors surfaced by resolution, construction and invocation.

use crate::key::Key;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = ContainerError> = std::result::Result<T, E>;

/// Every failure the container can report.
///
/// Errors raised deep inside a dependency graph propagate unchanged to the
/// caller of `resolve`/`get`; nothing built along the way is cached.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
  /// The concrete target is abstract, or has no described constructor.
  #[error("target [{0}] is not instantiable")]
  NotInstantiable(Key),

  /// A parameter has neither a dependency key nor a default value.
  #[error("unresolvable dependency resolving parameter [{parameter}] of [{owner}]")]
  UnresolvableParameter { parameter: String, owner: Key },

  /// Following aliases from this key returned to an alias already visited.
  #[error("alias chain starting at [{0}] is cyclic")]
  CyclicAlias(Key),

  /// The key was requested again while it was still being resolved.
  #[error("circular dependency detected while resolving [{0}]")]
  CircularDependency(Key),

  /// A resolved instance is not of the requested type.
  #[error("instance resolved for [{key}] is not a `{expected}`")]
  TypeMismatch { key: Key, expected: &'static str },

  /// A constructor asked for more arguments than were resolved.
  #[error("argument #{index} (`{expected}`) was not supplied")]
  MissingArgument { index: usize, expected: &'static str },

  /// A constructor argument is not of the type the constructor asked for.
  #[error("argument #{index} is not a `{expected}`")]
  ArgumentMismatch { index: usize, expected: &'static str },

  #[error("method [{method}] is not described for [{target}]")]
  MethodNotFound { target: Key, method: String },

  #[error("[{0}] is not a callable; expected `Type@method`")]
  InvalidCallable(String),

  /// A user factory failed for its own reasons.
  #[error("factory for [{key}] failed: {source}")]
  Factory {
    key: Key,
    #[source]
    source: BoxError,
  },
}

impl ContainerError {
  /// Wraps an error raised by a user-supplied factory.
  pub fn factory(key: impl Into<Key>, source: impl Into<BoxError>) -> Self {
    ContainerError::Factory {
      key: key.into(),
      source: source.into(),
    }
  }

  pub fn is_not_instantiable(&self) -> bool {
    matches!(self, ContainerError::NotInstantiable(_))
  }
}
