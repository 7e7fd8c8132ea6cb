//! Keys under which services are registered.

use crate::manifest::{Blueprint, Injectable};
use std::any::{type_name, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// A reference to an injectable type.
///
/// Two `ClassRef`s are equal when they refer to the same Rust type. Besides the
/// type identity it carries a pointer to the type's manifest, which is what lets
/// the container build a type it has never seen registered.
#[derive(Clone, Copy)]
pub struct ClassRef {
  type_id: TypeId,
  type_name: &'static str,
  blueprint: fn() -> Blueprint,
}

impl ClassRef {
  /// Creates a reference to the injectable type `T`.
  pub fn of<T: Injectable>() -> Self {
    Self {
      type_id: TypeId::of::<T>(),
      type_name: type_name::<T>(),
      blueprint: Blueprint::of::<T>,
    }
  }

  pub fn type_id(&self) -> TypeId {
    self.type_id
  }

  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  pub(crate) fn blueprint(&self) -> Blueprint {
    (self.blueprint)()
  }
}

impl PartialEq for ClassRef {
  fn eq(&self, other: &Self) -> bool {
    self.type_id == other.type_id
  }
}

impl Eq for ClassRef {}

impl Hash for ClassRef {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.type_id.hash(state);
  }
}

impl fmt::Debug for ClassRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "ClassRef({})", self.type_name)
  }
}

// Process-wide source of token ids. Zero is never handed out.
static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

/// The runtime identity of a [`Token`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TokenId {
  id: u64,
  name: Option<Cow<'static, str>>,
}

impl TokenId {
  fn next(name: Option<Cow<'static, str>>) -> Self {
    Self {
      id: NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed),
      name,
    }
  }
}

impl fmt::Debug for TokenId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(self, f)
  }
}

impl fmt::Display for TokenId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.name {
      Some(name) => write!(f, "Token({}#{})", name, self.id),
      None => write!(f, "Token(#{})", self.id),
    }
  }
}

/// A typed, payload-free registry key.
///
/// Every call to [`Token::new`] or [`Token::named`] produces a distinct key,
/// even if two tokens share a name. Clones of a token are the same key. The
/// type parameter only types the result of [`Container::get_token`](crate::Container::get_token).
///
/// ```
/// use fibre_di::{Container, Token};
///
/// let primary: Token<String> = Token::named("database_url");
/// let replica: Token<String> = Token::named("database_url");
///
/// let container = Container::new();
/// container.set(&primary, "postgres://primary".to_string());
/// container.set(&replica, "postgres://replica".to_string());
///
/// assert_eq!(*container.get_token(&primary).unwrap(), "postgres://primary");
/// assert_eq!(*container.get_token(&replica).unwrap(), "postgres://replica");
/// ```
pub struct Token<T: ?Sized> {
  id: TokenId,
  _marker: PhantomData<fn() -> T>,
}

impl<T: ?Sized> Token<T> {
  pub fn new() -> Self {
    Self {
      id: TokenId::next(None),
      _marker: PhantomData,
    }
  }

  /// Creates a token with a name used only in diagnostics.
  pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
    Self {
      id: TokenId::next(Some(name.into())),
      _marker: PhantomData,
    }
  }

  pub fn name(&self) -> Option<&str> {
    self.id.name.as_deref()
  }

  pub fn identifier(&self) -> Identifier {
    Identifier::Token(self.id.clone())
  }
}

impl<T: ?Sized> Default for Token<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: ?Sized> Clone for Token<T> {
  fn clone(&self) -> Self {
    Self {
      id: self.id.clone(),
      _marker: PhantomData,
    }
  }
}

impl<T: ?Sized> PartialEq for Token<T> {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl<T: ?Sized> Eq for Token<T> {}

impl<T: ?Sized> fmt::Debug for Token<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.id, f)
  }
}

/// Identifies a registration: an injectable type, a string name or a token.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
  Class(ClassRef),
  Name(String),
  Token(TokenId),
}

impl Identifier {
  /// The identifier of the injectable type `T`.
  pub fn class<T: Injectable>() -> Self {
    Identifier::Class(ClassRef::of::<T>())
  }

  pub fn name(name: impl Into<String>) -> Self {
    Identifier::Name(name.into())
  }

  pub fn as_class(&self) -> Option<&ClassRef> {
    match self {
      Identifier::Class(class) => Some(class),
      _ => None,
    }
  }
}

impl fmt::Debug for Identifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Identifier::Class(class) => write!(f, "Class({})", class.type_name),
      Identifier::Name(name) => write!(f, "Name({:?})", name),
      Identifier::Token(token) => write!(f, "{}", token),
    }
  }
}

impl fmt::Display for Identifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Identifier::Class(class) => write!(f, "`{}`", class.type_name),
      Identifier::Name(name) => write!(f, "\"{}\"", name),
      Identifier::Token(token) => write!(f, "{}", token),
    }
  }
}

impl From<ClassRef> for Identifier {
  fn from(class: ClassRef) -> Self {
    Identifier::Class(class)
  }
}

impl From<&str> for Identifier {
  fn from(name: &str) -> Self {
    Identifier::Name(name.to_owned())
  }
}

impl From<String> for Identifier {
  fn from(name: String) -> Self {
    Identifier::Name(name)
  }
}

impl<T: ?Sized> From<&Token<T>> for Identifier {
  fn from(token: &Token<T>) -> Self {
    token.identifier()
  }
}

impl<T: ?Sized> From<Token<T>> for Identifier {
  fn from(token: Token<T>) -> Self {
    Identifier::Token(token.id)
  }
}

impl From<&Identifier> for Identifier {
  fn from(id: &Identifier) -> Self {
    id.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::manifest::Manifest;
  use std::collections::HashMap;

  #[derive(Default)]
  struct Widget;

  impl Injectable for Widget {
    fn manifest() -> Manifest<Self> {
      Manifest::new(|_| Ok(Widget))
    }
  }

  #[test]
  fn tokens_with_same_name_are_distinct() {
    let a: Token<u32> = Token::named("port");
    let b: Token<u32> = Token::named("port");
    assert_ne!(a, b);
    assert_ne!(Identifier::from(&a), Identifier::from(&b));
  }

  #[test]
  fn cloned_token_is_same_key() {
    let a: Token<u32> = Token::new();
    assert_eq!(Identifier::from(&a), Identifier::from(a.clone()));
  }

  #[test]
  fn class_identifiers_compare_by_type() {
    let mut map = HashMap::new();
    map.insert(Identifier::class::<Widget>(), 1);
    assert_eq!(map.get(&Identifier::from(ClassRef::of::<Widget>())), Some(&1));
    assert_eq!(map.get(&Identifier::name("Widget")), None);
  }

  #[test]
  fn display_names_the_key() {
    assert_eq!(Identifier::name("db").to_string(), "\"db\"");
    let token: Token<()> = Token::named("cfg");
    assert!(token.identifier().to_string().starts_with("Token(cfg#"));
    assert!(Identifier::class::<Widget>().to_string().contains("Widget"));
  }
}
