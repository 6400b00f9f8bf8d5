//! Described constructors: the container's stand-in for runtime reflection.
//!
//! A type takes part in autowiring by implementing [`Injectable`]. Its
//! `parameters()` list tells the container, in order, what each constructor
//! argument is: a dependency key to resolve, a default value, or neither.
//! The container resolves that list into [`Arguments`] and hands them to
//! `construct`.

use crate::core::Instance;
use crate::error::{ContainerError, Result};
use crate::key::Key;
use dashmap::DashMap;
use std::any::{type_name, Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A type the container can build by itself.
///
/// # Examples
///
/// ```
/// use curia_container::{Arguments, Container, Injectable, Parameter, Result};
/// use std::sync::Arc;
///
/// struct Clock;
/// impl Injectable for Clock {
///   fn construct(_: &mut Arguments) -> Result<Self> {
///     Ok(Clock)
///   }
/// }
///
/// struct Scheduler {
///   clock: Arc<Clock>,
///   workers: usize,
/// }
/// impl Injectable for Scheduler {
///   fn parameters() -> Option<Vec<Parameter>> {
///     Some(vec![
///       Parameter::of::<Clock>("clock"),
///       Parameter::with_default("workers", 4usize),
///     ])
///   }
///   fn construct(args: &mut Arguments) -> Result<Self> {
///     Ok(Scheduler {
///       clock: args.next()?,
///       workers: args.next_value()?,
///     })
///   }
/// }
///
/// let container = Container::new();
/// container.register::<Clock>();
/// container.register::<Scheduler>();
///
/// let scheduler = container.make::<Scheduler>().unwrap();
/// assert_eq!(scheduler.workers, 4);
/// ```
pub trait Injectable: Any + Send + Sync + Sized {
  /// The ordered constructor parameters, or `None` when the type has no
  /// constructor and is built from nothing.
  fn parameters() -> Option<Vec<Parameter>> {
    None
  }

  fn construct(args: &mut Arguments) -> Result<Self>;

  /// Methods reachable through `Container::call` with `Type@method`.
  fn methods() -> Vec<Method<Self>> {
    Vec::new()
  }
}

/// One constructor (or method) parameter.
#[derive(Clone, Debug)]
pub struct Parameter {
  name: Cow<'static, str>,
  key: Option<Key>,
  default: Option<Instance>,
}

impl Parameter {
  /// A parameter satisfied by resolving `key`.
  pub fn dependency(name: impl Into<Cow<'static, str>>, key: impl Into<Key>) -> Self {
    Self {
      name: name.into(),
      key: Some(key.into()),
      default: None,
    }
  }

  /// A parameter satisfied by resolving the type token of `T`.
  pub fn of<T: ?Sized + Any>(name: impl Into<Cow<'static, str>>) -> Self {
    Self::dependency(name, Key::of::<T>())
  }

  /// An untyped parameter that falls back to `value`.
  pub fn with_default<T: Any + Send + Sync>(name: impl Into<Cow<'static, str>>, value: T) -> Self {
    Self {
      name: name.into(),
      key: None,
      default: Some(Arc::new(value)),
    }
  }

  /// An untyped parameter with no default. Resolving it always fails.
  pub fn untyped(name: impl Into<Cow<'static, str>>) -> Self {
    Self {
      name: name.into(),
      key: None,
      default: None,
    }
  }

  /// Adds a default used when the dependency key is not instantiable.
  pub fn or_default<T: Any + Send + Sync>(mut self, value: T) -> Self {
    self.default = Some(Arc::new(value));
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn key(&self) -> Option<&Key> {
    self.key.as_ref()
  }

  pub fn default_value(&self) -> Option<&Instance> {
    self.default.as_ref()
  }
}

/// Resolved arguments, consumed in parameter order.
pub struct Arguments {
  values: Vec<Instance>,
  cursor: usize,
}

impl Arguments {
  pub fn new(values: Vec<Instance>) -> Self {
    Self { values, cursor: 0 }
  }

  pub fn empty() -> Self {
    Self::new(Vec::new())
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Takes the next argument without looking at its type.
  pub fn next_instance(&mut self) -> Result<Instance> {
    self.take(type_name::<Instance>())
  }

  /// Takes the next argument as an `Arc<T>`.
  pub fn next<T: Any + Send + Sync>(&mut self) -> Result<Arc<T>> {
    let index = self.cursor;
    self
      .take(type_name::<T>())?
      .downcast::<T>()
      .map_err(|_| ContainerError::ArgumentMismatch {
        index,
        expected: type_name::<T>(),
      })
  }

  /// Takes the next argument and clones the value out of it.
  pub fn next_value<T: Any + Send + Sync + Clone>(&mut self) -> Result<T> {
    self.next::<T>().map(|value| (*value).clone())
  }

  /// Takes the next argument as a trait object stored with `*_trait` registrations.
  pub fn next_trait<I: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<I>> {
    self.next::<Arc<I>>().map(|value| (*value).clone())
  }

  fn take(&mut self, expected: &'static str) -> Result<Instance> {
    let value = self
      .values
      .get(self.cursor)
      .cloned()
      .ok_or(ContainerError::MissingArgument {
        index: self.cursor,
        expected,
      })?;
    self.cursor += 1;
    Ok(value)
  }
}

type MethodFn = Arc<dyn Fn(&Instance, &mut Arguments) -> Result<Instance> + Send + Sync>;
type ConstructFn = Arc<dyn Fn(&mut Arguments) -> Result<Instance> + Send + Sync>;

/// A method of `T` that can be invoked with container-resolved arguments.
pub struct Method<T> {
  name: Cow<'static, str>,
  parameters: Vec<Parameter>,
  invoke: Box<dyn Fn(&T, &mut Arguments) -> Result<Instance> + Send + Sync>,
}

impl<T: Injectable> Method<T> {
  pub fn new<R, F>(name: impl Into<Cow<'static, str>>, parameters: Vec<Parameter>, f: F) -> Self
  where
    R: Any + Send + Sync,
    F: Fn(&T, &mut Arguments) -> Result<R> + Send + Sync + 'static,
  {
    Self {
      name: name.into(),
      parameters,
      invoke: Box::new(move |this: &T, args: &mut Arguments| {
        f(this, args).map(|r| Arc::new(r) as Instance)
      }),
    }
  }

  fn erase(self) -> (String, MethodInfo) {
    let invoke = self.invoke;
    let erased: MethodFn = Arc::new(move |instance: &Instance, args: &mut Arguments| {
      let this = instance
        .downcast_ref::<T>()
        .ok_or(ContainerError::TypeMismatch {
          key: Key::of::<T>(),
          expected: type_name::<T>(),
        })?;
      invoke(this, args)
    });
    (
      self.name.into_owned(),
      MethodInfo {
        parameters: self.parameters,
        invoke: erased,
      },
    )
  }
}

/// A described method with its type erased.
#[derive(Clone)]
pub struct MethodInfo {
  parameters: Vec<Parameter>,
  invoke: MethodFn,
}

impl MethodInfo {
  pub fn parameters(&self) -> &[Parameter] {
    &self.parameters
  }

  pub(crate) fn invoke(&self, instance: &Instance, args: &mut Arguments) -> Result<Instance> {
    (self.invoke)(instance, args)
  }
}

enum Constructor {
  Abstract,
  Described {
    parameters: Option<Vec<Parameter>>,
    construct: ConstructFn,
  },
}

/// Everything the container knows about one registered type.
pub struct TypeInfo {
  key: Key,
  type_name: &'static str,
  constructor: Constructor,
  methods: HashMap<String, MethodInfo>,
}

impl TypeInfo {
  fn of<T: Injectable>(key: Key) -> Self {
    let construct: ConstructFn =
      Arc::new(|args: &mut Arguments| T::construct(args).map(|value| Arc::new(value) as Instance));
    Self {
      key,
      type_name: type_name::<T>(),
      constructor: Constructor::Described {
        parameters: T::parameters(),
        construct,
      },
      methods: T::methods().into_iter().map(Method::erase).collect(),
    }
  }

  fn abstract_type(key: Key) -> Self {
    Self {
      type_name: "<abstract>",
      key,
      constructor: Constructor::Abstract,
      methods: HashMap::new(),
    }
  }

  pub fn key(&self) -> &Key {
    &self.key
  }

  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  pub fn is_instantiable(&self) -> bool {
    matches!(self.constructor, Constructor::Described { .. })
  }

  /// `None` for types without a constructor (and for abstract types).
  pub fn parameters(&self) -> Option<&[Parameter]> {
    match &self.constructor {
      Constructor::Described { parameters, .. } => parameters.as_deref(),
      Constructor::Abstract => None,
    }
  }

  pub fn method(&self, name: &str) -> Option<&MethodInfo> {
    self.methods.get(name)
  }

  pub(crate) fn construct(&self, args: &mut Arguments) -> Result<Instance> {
    match &self.constructor {
      Constructor::Described { construct, .. } => construct(args),
      Constructor::Abstract => Err(ContainerError::NotInstantiable(self.key.clone())),
    }
  }
}

impl fmt::Debug for TypeInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TypeInfo")
      .field("key", &self.key)
      .field("type_name", &self.type_name)
      .field("instantiable", &self.is_instantiable())
      .field("parameters", &self.parameters())
      .field("methods", &self.methods.keys().collect::<Vec<_>>())
      .finish()
  }
}

/// The table of described types, looked up by key or by concrete `TypeId`.
#[derive(Default)]
pub struct Reflector {
  by_key: DashMap<Key, Arc<TypeInfo>>,
  by_type: DashMap<TypeId, Arc<TypeInfo>>,
}

impl Reflector {
  pub fn new() -> Self {
    Self::default()
  }

  /// Describes `T` under its own type token.
  pub fn register<T: Injectable>(&self) -> Arc<TypeInfo> {
    self.insert::<T>(Key::of::<T>())
  }

  /// Describes `T` under `key` as well as under its type token.
  pub fn register_as<T: Injectable>(&self, key: impl Into<Key>) -> Arc<TypeInfo> {
    let info = self.insert::<T>(key.into());
    self.by_key.insert(Key::of::<T>(), info.clone());
    info
  }

  /// Marks `key` as an abstract type: known, but never buildable.
  pub fn register_abstract(&self, key: impl Into<Key>) {
    let key = key.into();
    self
      .by_key
      .insert(key.clone(), Arc::new(TypeInfo::abstract_type(key)));
  }

  pub fn describe(&self, key: &Key) -> Option<Arc<TypeInfo>> {
    self.by_key.get(key).map(|entry| entry.value().clone())
  }

  pub fn describe_type(&self, id: TypeId) -> Option<Arc<TypeInfo>> {
    self.by_type.get(&id).map(|entry| entry.value().clone())
  }

  pub fn is_instantiable(&self, key: &Key) -> bool {
    self
      .describe(key)
      .map(|info| info.is_instantiable())
      .unwrap_or(false)
  }

  pub fn parameters(&self, key: &Key) -> Option<Vec<Parameter>> {
    self
      .describe(key)
      .and_then(|info| info.parameters().map(<[Parameter]>::to_vec))
  }

  pub fn clear(&self) {
    self.by_key.clear();
    self.by_type.clear();
  }

  fn insert<T: Injectable>(&self, key: Key) -> Arc<TypeInfo> {
    let info = Arc::new(TypeInfo::of::<T>(key.clone()));
    self.by_key.insert(key, info.clone());
    self.by_type.insert(TypeId::of::<T>(), info.clone());
    info
  }
}
