//! Calling closures and described methods with container-resolved arguments.

use crate::container::Container;
use crate::core::Instance;
use crate::error::{ContainerError, Result};
use crate::key::Key;
use crate::reflect::{Arguments, Parameter};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

type FunctionFn = Arc<dyn Fn(&mut Arguments) -> Result<Instance> + Send + Sync>;

/// Explicit arguments for [`Container::call`], matched by parameter name.
#[derive(Clone, Default)]
pub struct Parameters {
  values: HashMap<String, Instance>,
}

impl Parameters {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with<T: Any + Send + Sync>(self, name: impl Into<String>, value: T) -> Self {
    self.with_instance(name, Arc::new(value))
  }

  pub fn with_instance(mut self, name: impl Into<String>, value: Instance) -> Self {
    self.values.insert(name.into(), value);
    self
  }

  pub fn get(&self, name: &str) -> Option<&Instance> {
    self.values.get(name)
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

/// Something [`Container::call`] can invoke.
#[derive(Clone)]
pub enum Callable {
  /// An ad-hoc closure with described parameters.
  Function {
    parameters: Vec<Parameter>,
    function: FunctionFn,
  },
  /// A described method on the instance resolved for `target`.
  Method { target: Key, method: String },
}

impl Callable {
  pub fn function<R, F>(parameters: Vec<Parameter>, function: F) -> Self
  where
    R: Any + Send + Sync,
    F: Fn(&mut Arguments) -> Result<R> + Send + Sync + 'static,
  {
    Callable::Function {
      parameters,
      function: Arc::new(move |args: &mut Arguments| function(args).map(|r| Arc::new(r) as Instance)),
    }
  }

  pub fn method(target: impl Into<Key>, method: impl Into<String>) -> Self {
    Callable::Method {
      target: target.into(),
      method: method.into(),
    }
  }

  /// Parses `"Type@method"`.
  pub fn parse(callable: &str) -> Result<Self> {
    match callable.split_once('@') {
      Some((target, method)) if !target.is_empty() && !method.is_empty() && !method.contains('@') => {
        Ok(Callable::method(target, method))
      }
      _ => Err(ContainerError::InvalidCallable(callable.to_owned())),
    }
  }
}

impl fmt::Debug for Callable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Callable::Function { parameters, .. } => f
        .debug_struct("Function")
        .field("parameters", parameters)
        .finish_non_exhaustive(),
      Callable::Method { target, method } => write!(f, "Method({}@{})", target, method),
    }
  }
}

impl Container {
  /// Replaces reflective dispatch of `"Type@method"` with `method`, which
  /// receives the resolved target instance and the container.
  pub fn bind_method<R: Any + Send + Sync>(
    &self,
    callable: &str,
    method: impl Fn(&Instance, &Container) -> Result<R> + Send + Sync + 'static,
  ) -> Result<()> {
    let (target, name) = match Callable::parse(callable)? {
      Callable::Method { target, method } => (target, method),
      Callable::Function { .. } => return Err(ContainerError::InvalidCallable(callable.to_owned())),
    };
    self.method_bindings.insert(
      (target, name),
      Arc::new(move |instance: &Instance, container: &Container| {
        method(instance, container).map(|r| Arc::new(r) as Instance)
      }),
    );
    Ok(())
  }

  pub fn has_method_binding(&self, callable: &str) -> bool {
    match Callable::parse(callable) {
      Ok(Callable::Method { target, method }) => self.method_bindings.contains_key(&(target, method)),
      _ => false,
    }
  }

  /// Invokes `callable`, filling each parameter from `parameters` by name
  /// first, then from the container, then from its default.
  pub fn call(&self, callable: Callable, parameters: Parameters) -> Result<Instance> {
    match callable {
      Callable::Function {
        parameters: declared,
        function,
      } => {
        let owner = Key::from("{closure}");
        let mut args = self.resolve_parameters(&owner, &declared, Some(&parameters))?;
        function(&mut args)
      }
      Callable::Method { target, method } => self.call_method(target, method, &parameters),
    }
  }

  /// Resolves the call and downcasts its return value.
  pub fn call_as<T: Any + Send + Sync>(&self, callable: Callable, parameters: Parameters) -> Result<Arc<T>> {
    let owner = match &callable {
      Callable::Method { target, .. } => target.clone(),
      Callable::Function { .. } => Key::from("{closure}"),
    };
    self
      .call(callable, parameters)?
      .downcast::<T>()
      .map_err(|_| ContainerError::TypeMismatch {
        key: owner,
        expected: std::any::type_name::<T>(),
      })
  }

  fn call_method(&self, target: Key, method: String, parameters: &Parameters) -> Result<Instance> {
    let instance = self.resolve(&target)?;

    let terminal = self.get_alias(&target)?;
    let binding = [target.clone(), terminal]
      .into_iter()
      .find_map(|key| self.method_bindings.get(&(key, method.clone())).map(|entry| entry.value().clone()));
    if let Some(binding) = binding {
      trace!(target = %target, method = %method, "dispatching to method binding");
      return binding(&instance, self);
    }

    let not_found = || ContainerError::MethodNotFound {
      target: target.clone(),
      method: method.clone(),
    };
    let info = self
      .reflector()
      .describe_type((*instance).type_id())
      .ok_or_else(not_found)?;
    let described = info.method(&method).cloned().ok_or_else(not_found)?;

    let mut args = self.resolve_parameters(&target, described.parameters(), Some(parameters))?;
    described.invoke(&instance, &mut args)
  }
}
