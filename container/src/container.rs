//! The main `Container` struct: binding registry and resolver.

use crate::core::{next_container_id, Binding, Concrete, Factory, Hook, Instance, MethodOverride, ResolutionGuard};
use crate::error::{ContainerError, Result};
use crate::invoker::Parameters;
use crate::key::Key;
use crate::reflect::{Arguments, Injectable, Parameter, Reflector, TypeInfo};
use dashmap::DashMap;
use std::any::{type_name, Any};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// The Inversion of Control (IoC) container.
///
/// Bindings, aliases, cached instances, hooks and method bindings are stored in
/// `DashMap`s, so registration takes `&self` and may happen at any point, even
/// from inside a factory. Resolution semantics assume a single owner: two
/// threads resolving the same shared binding at once may both build it.
pub struct Container {
  id: usize,
  bindings: DashMap<Key, Binding>,
  aliases: DashMap<Key, Key>,
  instances: DashMap<Key, Instance>,
  hooks: DashMap<Key, Hook>,
  pub(crate) method_bindings: DashMap<(Key, String), MethodOverride>,
  reflector: Reflector,
}

impl Default for Container {
  fn default() -> Self {
    Self {
      id: next_container_id(),
      bindings: DashMap::new(),
      aliases: DashMap::new(),
      instances: DashMap::new(),
      hooks: DashMap::new(),
      method_bindings: DashMap::new(),
      reflector: Reflector::new(),
    }
  }
}

impl Concrete {
  // A bare key becomes a factory: build it directly when it is the abstract
  // key itself, otherwise resolve it as another abstract.
  fn into_factory(self, abstract_key: &Key) -> Factory {
    let factory: Factory = match self {
      Concrete::Factory(factory) => return factory,
      Concrete::Key(target) if &target == abstract_key => {
        Arc::new(move |container: &Container| container.build(&target))
      }
      Concrete::Key(target) => Arc::new(move |container: &Container| container.resolve(&target)),
    };
    factory
  }
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  // --- PRIVATE HELPERS ---

  fn bind_internal(&self, abstract_key: Key, concrete: Option<Concrete>, shared: bool) {
    self.drop_stale(&abstract_key);
    let concrete = concrete.unwrap_or_else(|| Concrete::Key(abstract_key.clone()));
    let factory = concrete.into_factory(&abstract_key);
    debug!(key = %abstract_key, shared, "binding registered");
    self.bindings.insert(abstract_key, Binding { factory, shared });
  }

  fn drop_stale(&self, key: &Key) {
    self.instances.remove(key);
    self.aliases.remove(key);
  }

  fn typed_factory<T, F>(factory: F) -> Concrete
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
  {
    Concrete::Factory(Arc::new(move |container: &Container| {
      factory(container).map(|value| Arc::new(value) as Instance)
    }))
  }

  fn trait_factory<I, F>(factory: F) -> Concrete
  where
    I: ?Sized + Send + Sync + 'static,
    F: Fn(&Container) -> Result<Arc<I>> + Send + Sync + 'static,
  {
    Concrete::Factory(Arc::new(move |container: &Container| {
      factory(container).map(|value| Arc::new(value) as Instance)
    }))
  }

  // Registration follows aliases but never fails on a cyclic chain; the cycle
  // is reported when the key is resolved.
  fn terminal_or_self(&self, key: Key) -> Key {
    self.get_alias(&key).unwrap_or(key)
  }

  fn apply_hook(&self, key: &Key, instance: Instance) -> Instance {
    let hook = self.hooks.get(key).map(|entry| entry.value().clone());
    match hook {
      Some(hook) => {
        trace!(key = %key, "applying hook");
        hook(&instance, self).unwrap_or(instance)
      }
      None => instance,
    }
  }

  fn resolve_parameter(&self, owner: &Key, parameter: &Parameter) -> Result<Instance> {
    match (parameter.key(), parameter.default_value()) {
      // Only the parameter's own key being unavailable selects the default;
      // a failure further down the graph fails the outer build.
      (Some(key), default) => match (self.resolve(key), default) {
        (Err(ContainerError::NotInstantiable(failed)), Some(default))
          if self.get_alias(key).is_ok_and(|terminal| terminal == failed) =>
        {
          trace!(owner = %owner, parameter = parameter.name(), "falling back to default");
          Ok(default.clone())
        }
        (result, _) => result,
      },
      (None, Some(default)) => Ok(default.clone()),
      (None, None) => Err(ContainerError::UnresolvableParameter {
        parameter: parameter.name().to_owned(),
        owner: owner.clone(),
      }),
    }
  }

  /// Resolves `parameters` in order into [`Arguments`]. Explicit values, matched
  /// by parameter name, win over container resolution.
  pub(crate) fn resolve_parameters(
    &self,
    owner: &Key,
    parameters: &[Parameter],
    explicit: Option<&Parameters>,
  ) -> Result<Arguments> {
    let mut values = Vec::with_capacity(parameters.len());
    for parameter in parameters {
      let supplied = explicit.and_then(|explicit| explicit.get(parameter.name()));
      let value = match supplied {
        Some(value) => value.clone(),
        None => self.resolve_parameter(owner, parameter)?,
      };
      values.push(value);
    }
    Ok(Arguments::new(values))
  }

  // --- PUBLIC API ---

  // --- Bindings ---

  /// Binds `abstract_key` to another key. When both keys are equal the target
  /// is built directly from its description.
  pub fn bind(&self, abstract_key: impl Into<Key>, concrete: impl Into<Key>) {
    self.bind_internal(abstract_key.into(), Some(Concrete::Key(concrete.into())), false);
  }

  /// Marks `abstract_key` as its own concrete target.
  pub fn bind_self(&self, abstract_key: impl Into<Key>) {
    self.bind_internal(abstract_key.into(), None, false);
  }

  pub fn bind_factory<T: Any + Send + Sync>(
    &self,
    abstract_key: impl Into<Key>,
    factory: impl Fn(&Container) -> Result<T> + Send + Sync + 'static,
  ) {
    self.bind_internal(abstract_key.into(), Some(Self::typed_factory(factory)), false);
  }

  pub fn bind_trait<I: ?Sized + Send + Sync + 'static>(
    &self,
    abstract_key: impl Into<Key>,
    factory: impl Fn(&Container) -> Result<Arc<I>> + Send + Sync + 'static,
  ) {
    self.bind_internal(abstract_key.into(), Some(Self::trait_factory(factory)), false);
  }

  // --- Shared Bindings ---

  pub fn singleton(&self, abstract_key: impl Into<Key>, concrete: impl Into<Key>) {
    self.bind_internal(abstract_key.into(), Some(Concrete::Key(concrete.into())), true);
  }

  pub fn singleton_self(&self, abstract_key: impl Into<Key>) {
    self.bind_internal(abstract_key.into(), None, true);
  }

  pub fn singleton_factory<T: Any + Send + Sync>(
    &self,
    abstract_key: impl Into<Key>,
    factory: impl Fn(&Container) -> Result<T> + Send + Sync + 'static,
  ) {
    self.bind_internal(abstract_key.into(), Some(Self::typed_factory(factory)), true);
  }

  pub fn singleton_trait<I: ?Sized + Send + Sync + 'static>(
    &self,
    abstract_key: impl Into<Key>,
    factory: impl Fn(&Container) -> Result<Arc<I>> + Send + Sync + 'static,
  ) {
    self.bind_internal(abstract_key.into(), Some(Self::trait_factory(factory)), true);
  }

  // --- Instances ---

  /// Stores an already-built instance. Later resolutions return it until the
  /// key is bound again or forgotten.
  pub fn instance_erased(&self, abstract_key: impl Into<Key>, instance: Instance) -> &Self {
    let key = self.terminal_or_self(abstract_key.into());
    debug!(key = %key, "instance registered");
    self.instances.insert(key, instance);
    self
  }

  pub fn instance<T: Any + Send + Sync>(&self, abstract_key: impl Into<Key>, value: T) -> &Self {
    self.instance_erased(abstract_key, Arc::new(value))
  }

  /// Like [`Container::instance`], keeping the caller's `Arc` so identity is preserved.
  pub fn instance_arc<T: Any + Send + Sync>(&self, abstract_key: impl Into<Key>, value: Arc<T>) -> &Self {
    self.instance_erased(abstract_key, value)
  }

  pub fn instance_trait<I: ?Sized + Send + Sync + 'static>(
    &self,
    abstract_key: impl Into<Key>,
    value: Arc<I>,
  ) -> &Self {
    self.instance_erased(abstract_key, Arc::new(value))
  }

  // --- Aliases ---

  /// Records `alias -> abstract_key`. The target is not checked until resolution.
  pub fn alias(&self, alias: impl Into<Key>, abstract_key: impl Into<Key>) {
    let (alias, target) = (alias.into(), abstract_key.into());
    trace!(alias = %alias, target = %target, "alias registered");
    self.aliases.insert(alias, target);
  }

  pub fn is_alias(&self, key: impl Into<Key>) -> bool {
    self.aliases.contains_key(&key.into())
  }

  /// Follows the alias chain from `key` to its terminal key.
  pub fn get_alias(&self, key: impl Into<Key>) -> Result<Key> {
    let start = key.into();
    let mut current = start.clone();
    let mut visited = HashSet::new();
    while let Some(next) = self.aliases.get(&current).map(|entry| entry.value().clone()) {
      if !visited.insert(current.clone()) {
        return Err(ContainerError::CyclicAlias(start));
      }
      current = next;
    }
    Ok(current)
  }

  // --- Hooks ---

  /// Decorates every resolution of `abstract_key`, cache hits included.
  /// Returning `None` keeps the resolved instance.
  pub fn hook(
    &self,
    abstract_key: impl Into<Key>,
    hook: impl Fn(&Instance, &Container) -> Option<Instance> + Send + Sync + 'static,
  ) {
    let key = self.terminal_or_self(abstract_key.into());
    self.hooks.insert(key, Arc::new(hook));
  }

  /// A typed [`Container::hook`]. Instances that are not a `T` pass through.
  pub fn hook_typed<T: Any + Send + Sync>(
    &self,
    abstract_key: impl Into<Key>,
    hook: impl Fn(&Arc<T>, &Container) -> Option<Arc<T>> + Send + Sync + 'static,
  ) {
    self.hook(abstract_key, move |instance: &Instance, container: &Container| {
      let typed = instance.clone().downcast::<T>().ok()?;
      hook(&typed, container).map(|replacement| replacement as Instance)
    });
  }

  // --- Inspection ---

  /// True if `key` has a binding, a cached instance or an alias. Never resolves.
  pub fn bound(&self, key: impl Into<Key>) -> bool {
    let key = key.into();
    self.bindings.contains_key(&key) || self.instances.contains_key(&key) || self.aliases.contains_key(&key)
  }

  pub fn has(&self, key: impl Into<Key>) -> bool {
    self.bound(key)
  }

  pub fn is_shared(&self, key: impl Into<Key>) -> bool {
    let key = self.terminal_or_self(key.into());
    self.instances.contains_key(&key)
      || self
        .bindings
        .get(&key)
        .map(|binding| binding.shared)
        .unwrap_or(false)
  }

  // --- Removal ---

  /// Removes the binding, cached instance and alias stored under `key`.
  pub fn forget(&self, key: impl Into<Key>) {
    let key = key.into();
    self.bindings.remove(&key);
    self.drop_stale(&key);
  }

  pub fn forget_instance(&self, key: impl Into<Key>) {
    self.instances.remove(&key.into());
  }

  pub fn forget_instances(&self) {
    self.instances.clear();
  }

  /// Clears every registration, including hooks, method bindings and type descriptions.
  pub fn flush(&self) {
    self.bindings.clear();
    self.aliases.clear();
    self.instances.clear();
    self.hooks.clear();
    self.method_bindings.clear();
    self.reflector.clear();
  }

  // --- Type Descriptions ---

  pub fn register<T: Injectable>(&self) -> Arc<TypeInfo> {
    self.reflector.register::<T>()
  }

  /// Describes `T` under a string key so it can be requested by name.
  pub fn register_as<T: Injectable>(&self, key: impl Into<Key>) -> Arc<TypeInfo> {
    self.reflector.register_as::<T>(key)
  }

  pub fn declare_abstract(&self, key: impl Into<Key>) {
    self.reflector.register_abstract(key);
  }

  pub fn reflector(&self) -> &Reflector {
    &self.reflector
  }

  // --- Resolution ---

  /// Resolves `abstract_key`: follows aliases, returns a cached instance or
  /// runs the bound strategy (building the key itself when unbound), caches
  /// shared results and applies the hook.
  pub fn resolve(&self, abstract_key: impl Into<Key>) -> Result<Instance> {
    let key = self.get_alias(abstract_key)?;
    let _guard = ResolutionGuard::enter(self.id, &key)?;

    let cached = self.instances.get(&key).map(|entry| entry.value().clone());
    let instance = match cached {
      Some(instance) => {
        trace!(key = %key, "cache hit");
        instance
      }
      None => {
        // Clone the binding out so no map guard is held while the factory runs.
        let binding = self.bindings.get(&key).map(|entry| entry.value().clone());
        match binding {
          Some(Binding { factory, shared }) => {
            let instance = factory(self)?;
            if shared {
              self.instances.insert(key.clone(), instance.clone());
            }
            instance
          }
          None => self.build(&key)?,
        }
      }
    };

    Ok(self.apply_hook(&key, instance))
  }

  /// Builds `concrete` from its description, resolving constructor
  /// parameters depth-first, left to right.
  pub fn build(&self, concrete: impl Into<Key>) -> Result<Instance> {
    let key = concrete.into();
    let info = self
      .reflector
      .describe(&key)
      .filter(|info| info.is_instantiable())
      .ok_or_else(|| ContainerError::NotInstantiable(key.clone()))?;

    trace!(key = %key, type_name = info.type_name(), "building");
    let mut args = match info.parameters() {
      Some(parameters) => self.resolve_parameters(&key, parameters, None)?,
      None => Arguments::empty(),
    };
    info.construct(&mut args)
  }

  pub fn get<T: Any + Send + Sync>(&self, abstract_key: impl Into<Key>) -> Result<Arc<T>> {
    let key = abstract_key.into();
    self
      .resolve(&key)?
      .downcast::<T>()
      .map_err(|_| ContainerError::TypeMismatch {
        key,
        expected: type_name::<T>(),
      })
  }

  /// Resolves a trait object registered with one of the `*_trait` methods.
  pub fn get_trait<I: ?Sized + Send + Sync + 'static>(&self, abstract_key: impl Into<Key>) -> Result<Arc<I>> {
    self.get::<Arc<I>>(abstract_key).map(|value| (*value).clone())
  }

  /// Resolves the type token of `T`.
  pub fn make<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
    self.get::<T>(Key::of::<T>())
  }

  pub fn try_get<T: Any + Send + Sync>(&self, abstract_key: impl Into<Key>) -> Option<Arc<T>> {
    self.get::<T>(abstract_key).ok()
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("id", &self.id)
      .field("bindings", &self.bindings.len())
      .field("aliases", &self.aliases.len())
      .field("instances", &self.instances.len())
      .field("hooks", &self.hooks.len())
      .field("method_bindings", &self.method_bindings.len())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn alias_chains_are_followed_to_the_end() {
    let container = Container::new();
    container.alias("a", "b");
    container.alias("b", "c");

    assert_eq!(container.get_alias("a").unwrap(), Key::from("c"));
    assert_eq!(container.get_alias("c").unwrap(), Key::from("c"));
    assert!(container.is_alias("a"));
    assert!(!container.is_alias("c"));
  }

  #[test]
  fn self_alias_is_a_cycle() {
    let container = Container::new();
    container.alias("loop", "loop");

    assert!(matches!(
      container.get_alias("loop"),
      Err(ContainerError::CyclicAlias(key)) if key == Key::from("loop")
    ));
  }

  #[test]
  fn guards_are_released_after_errors() {
    let container = Container::new();

    assert!(container.resolve("missing").unwrap_err().is_not_instantiable());
    // A leaked guard would turn the second attempt into a circular dependency.
    assert!(container.resolve("missing").unwrap_err().is_not_instantiable());
  }
}
