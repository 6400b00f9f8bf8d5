//! Identifiers under which services are bound and requested.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An abstract identifier.
///
/// A key is either an arbitrary string name (`"logger"`, `"App\\Mailer"`) or a
/// type token created with [`Key::of`]. Names compare by their text, type
/// tokens compare by `TypeId` only. A name never equals a type token, even if
/// the text matches the type's name.
#[derive(Clone)]
pub enum Key {
  Name(Arc<str>),
  Type { id: TypeId, name: &'static str },
}

impl Key {
  /// The type token for `T`. Works for unsized types such as `dyn Trait`.
  pub fn of<T: ?Sized + Any>() -> Self {
    Key::Type {
      id: TypeId::of::<T>(),
      name: std::any::type_name::<T>(),
    }
  }

  pub fn named(name: impl Into<Arc<str>>) -> Self {
    Key::Name(name.into())
  }

  /// The human-readable form: the name itself, or the type's name.
  pub fn as_str(&self) -> &str {
    match self {
      Key::Name(name) => name.as_ref(),
      Key::Type { name, .. } => *name,
    }
  }

  pub fn is_type(&self) -> bool {
    matches!(self, Key::Type { .. })
  }
}

impl PartialEq for Key {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Key::Name(a), Key::Name(b)) => a == b,
      (Key::Type { id: a, .. }, Key::Type { id: b, .. }) => a == b,
      _ => false,
    }
  }
}

impl Eq for Key {}

impl Hash for Key {
  fn hash<H: Hasher>(&self, state: &mut H) {
    match self {
      Key::Name(name) => {
        0u8.hash(state);
        name.hash(state);
      }
      Key::Type { id, .. } => {
        1u8.hash(state);
        id.hash(state);
      }
    }
  }
}

impl fmt::Display for Key {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl fmt::Debug for Key {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Key::Name(name) => write!(f, "Key(Name({}))", name),
      Key::Type { name, .. } => write!(f, "Key(Type({}))", name),
    }
  }
}

impl From<&str> for Key {
  fn from(name: &str) -> Self {
    Key::Name(Arc::from(name))
  }
}

impl From<String> for Key {
  fn from(name: String) -> Self {
    Key::Name(Arc::from(name))
  }
}

impl From<&String> for Key {
  fn from(name: &String) -> Self {
    Key::Name(Arc::from(name.as_str()))
  }
}

impl From<&Key> for Key {
  fn from(key: &Key) -> Self {
    key.clone()
  }
}
