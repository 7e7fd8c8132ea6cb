//! Dependency manifests: the explicit description of how a type is built.
//!
//! A type opts into container construction by implementing [`Injectable`]. Its
//! [`Manifest`] lists, in order, the identifiers of its constructor parameters,
//! the properties to inject after construction and, for factory types, the
//! named methods the container may call to produce other services.

use crate::core::{AnyBox, Instance};
use crate::error::{Error, Result};
use crate::identifier::Identifier;
use std::any::{type_name, Any};
use std::borrow::Cow;
use std::sync::Arc;

/// A type the container knows how to construct.
///
/// ```
/// use fibre_di::{Container, Injectable, Manifest};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Engine;
///
/// impl Injectable for Engine {
///   fn manifest() -> Manifest<Self> {
///     Manifest::new(|_| Ok(Engine))
///   }
/// }
///
/// struct Car {
///   engine: Arc<Engine>,
/// }
///
/// impl Injectable for Car {
///   fn manifest() -> Manifest<Self> {
///     Manifest::new(|args| Ok(Car { engine: args.take::<Engine>()? })).inject::<Engine>()
///   }
/// }
///
/// let container = Container::new();
/// let car = container.get_type::<Car>().unwrap();
/// assert!(Arc::ptr_eq(&car.engine, &container.get_type::<Engine>().unwrap()));
/// ```
pub trait Injectable: Any + Send + Sync + Sized {
  fn manifest() -> Manifest<Self>;
}

type Constructor<T> = Box<dyn Fn(&mut Arguments) -> Result<T>>;

struct PropertySlot<T> {
  name: Cow<'static, str>,
  id: Identifier,
  inject: Box<dyn Fn(&mut T, Instance) -> Result<()>>,
}

struct MethodSlot<T> {
  name: Cow<'static, str>,
  call: Box<dyn Fn(&T) -> Result<Instance>>,
}

/// The dependency manifest of an injectable type `T`.
pub struct Manifest<T> {
  constructor: Constructor<T>,
  params: Vec<Identifier>,
  properties: Vec<PropertySlot<T>>,
  methods: Vec<MethodSlot<T>>,
}

impl<T: Injectable> Manifest<T> {
  /// Starts a manifest from the constructor. The constructor receives the
  /// resolved parameters in the order they are declared with [`param`](Self::param).
  pub fn new(constructor: impl Fn(&mut Arguments) -> Result<T> + 'static) -> Self {
    Self {
      constructor: Box::new(constructor),
      params: Vec::new(),
      properties: Vec::new(),
      methods: Vec::new(),
    }
  }

  /// Declares the next constructor parameter.
  pub fn param(mut self, id: impl Into<Identifier>) -> Self {
    self.params.push(id.into());
    self
  }

  /// Declares the next constructor parameter as the injectable type `D`.
  pub fn inject<D: Injectable>(self) -> Self {
    self.param(Identifier::class::<D>())
  }

  /// Declares a property that is injected after construction.
  pub fn property<V: Any + Send + Sync>(
    mut self,
    name: impl Into<Cow<'static, str>>,
    id: impl Into<Identifier>,
    setter: impl Fn(&mut T, Arc<V>) + 'static,
  ) -> Self {
    let name = name.into();
    let label = format!("property '{}' of `{}`", name, type_name::<T>());
    self.properties.push(PropertySlot {
      name,
      id: id.into(),
      inject: Box::new(move |target: &mut T, value: Instance| {
        let value = value
          .downcast::<V>()
          .map_err(|_| Error::type_mismatch::<V>(&label))?;
        setter(target, value);
        Ok(())
      }),
    });
    self
  }

  /// Declares a named method that produces a service, making `T` usable as
  /// a factory class in [`Factory::Method`](crate::Factory::Method).
  pub fn method<R: Any + Send + Sync>(
    mut self,
    name: impl Into<Cow<'static, str>>,
    method: impl Fn(&T) -> Result<R> + 'static,
  ) -> Self {
    self.methods.push(MethodSlot {
      name: name.into(),
      call: Box::new(move |target: &T| Ok(Arc::new(method(target)?) as Instance)),
    });
    self
  }

  fn erase(self) -> Blueprint {
    let class = type_name::<T>();
    let constructor = self.constructor;

    let properties = self
      .properties
      .into_iter()
      .map(|slot| {
        let inject = slot.inject;
        ErasedProperty {
          name: slot.name,
          id: slot.id,
          inject: Box::new(move |target: &mut (dyn Any + Send + Sync), value: Instance| {
            let target = target
              .downcast_mut::<T>()
              .ok_or_else(|| Error::type_mismatch::<T>(class))?;
            inject(target, value)
          }),
        }
      })
      .collect();

    let methods = self
      .methods
      .into_iter()
      .map(|slot| {
        let call = slot.call;
        ErasedMethod {
          name: slot.name,
          call: Box::new(move |target: &(dyn Any + Send + Sync)| {
            let target = target
              .downcast_ref::<T>()
              .ok_or_else(|| Error::type_mismatch::<T>(class))?;
            call(target)
          }),
        }
      })
      .collect();

    Blueprint {
      class,
      params: self.params,
      construct: Box::new(move |args: &mut Arguments| Ok(Box::new(constructor(args)?) as AnyBox)),
      properties,
      methods,
    }
  }
}

/// The resolved constructor parameters of a type, in declaration order.
pub struct Arguments {
  class: &'static str,
  values: Vec<Instance>,
  cursor: usize,
}

impl Arguments {
  pub(crate) fn new(class: &'static str, values: Vec<Instance>) -> Self {
    Self {
      class,
      values,
      cursor: 0,
    }
  }

  /// Takes the next argument as a shared `V`.
  pub fn take<V: Any + Send + Sync>(&mut self) -> Result<Arc<V>> {
    let index = self.cursor;
    let value = self.next_raw()?;
    value
      .downcast::<V>()
      .map_err(|_| Error::type_mismatch::<V>(format!("argument {} of `{}`", index, self.class)))
  }

  /// Takes the next argument and clones the value out of it.
  pub fn take_cloned<V: Any + Send + Sync + Clone>(&mut self) -> Result<V> {
    self.take::<V>().map(|value| (*value).clone())
  }

  /// Takes the next argument without downcasting it.
  pub fn next_raw(&mut self) -> Result<Instance> {
    let index = self.cursor;
    let value = self
      .values
      .get(index)
      .cloned()
      .ok_or(Error::MissingArgument {
        class: self.class,
        index,
      })?;
    self.cursor += 1;
    Ok(value)
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

pub(crate) struct ErasedProperty {
  pub(crate) name: Cow<'static, str>,
  pub(crate) id: Identifier,
  pub(crate) inject: Box<dyn Fn(&mut (dyn Any + Send + Sync), Instance) -> Result<()>>,
}

struct ErasedMethod {
  name: Cow<'static, str>,
  call: Box<dyn Fn(&(dyn Any + Send + Sync)) -> Result<Instance>>,
}

/// A type-erased [`Manifest`], as consumed by the container.
pub(crate) struct Blueprint {
  class: &'static str,
  params: Vec<Identifier>,
  construct: Box<dyn Fn(&mut Arguments) -> Result<AnyBox>>,
  properties: Vec<ErasedProperty>,
  methods: Vec<ErasedMethod>,
}

impl Blueprint {
  pub(crate) fn of<T: Injectable>() -> Self {
    T::manifest().erase()
  }

  pub(crate) fn class(&self) -> &'static str {
    self.class
  }

  pub(crate) fn params(&self) -> &[Identifier] {
    &self.params
  }

  pub(crate) fn properties(&self) -> &[ErasedProperty] {
    &self.properties
  }

  pub(crate) fn construct(&self, values: Vec<Instance>) -> Result<AnyBox> {
    let mut args = Arguments::new(self.class, values);
    (self.construct)(&mut args)
  }

  pub(crate) fn invoke(&self, method: &str, target: &(dyn Any + Send + Sync)) -> Result<Instance> {
    let slot = self
      .methods
      .iter()
      .find(|slot| slot.name == method)
      .ok_or_else(|| Error::MethodNotFound {
        class: self.class,
        method: method.to_owned(),
      })?;
    (slot.call)(target)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Pair {
    left: Arc<u32>,
    right: String,
    label: Option<Arc<String>>,
  }

  impl Injectable for Pair {
    fn manifest() -> Manifest<Self> {
      Manifest::new(|args| {
        Ok(Pair {
          left: args.take::<u32>()?,
          right: args.take_cloned::<String>()?,
          label: None,
        })
      })
      .param("left")
      .param("right")
      .property::<String>("label", "label", |pair, value| pair.label = Some(value))
      .method("sum", |pair: &Pair| Ok(*pair.left as usize + pair.right.len()))
    }
  }

  fn args() -> Vec<Instance> {
    vec![Arc::new(7u32) as Instance, Arc::new("abc".to_string())]
  }

  #[test]
  fn blueprint_keeps_declaration_order() {
    let blueprint = Blueprint::of::<Pair>();
    assert_eq!(
      blueprint.params(),
      &[Identifier::name("left"), Identifier::name("right")]
    );
    assert_eq!(blueprint.properties().len(), 1);
    assert_eq!(blueprint.properties()[0].name, "label");
  }

  #[test]
  fn construct_and_inject_property() {
    let blueprint = Blueprint::of::<Pair>();
    let mut built = blueprint.construct(args()).unwrap();
    let label: Instance = Arc::new("tag".to_string());
    (blueprint.properties()[0].inject)(built.as_mut(), label).unwrap();

    let pair = built.downcast_ref::<Pair>().unwrap();
    assert_eq!(*pair.left, 7);
    assert_eq!(pair.right, "abc");
    assert_eq!(pair.label.as_deref().map(String::as_str), Some("tag"));
  }

  #[test]
  fn missing_argument_is_reported() {
    let blueprint = Blueprint::of::<Pair>();
    let err = blueprint.construct(vec![Arc::new(1u32) as Instance]).err().unwrap();
    assert!(matches!(err, Error::MissingArgument { index: 1, .. }));
  }

  #[test]
  fn wrongly_typed_argument_is_reported() {
    let blueprint = Blueprint::of::<Pair>();
    let err = blueprint
      .construct(vec![Arc::new("oops") as Instance, Arc::new(String::new())])
      .err()
      .unwrap();
    assert!(matches!(err, Error::TypeMismatch { expected: "u32", .. }));
  }

  #[test]
  fn invoke_named_method() {
    let blueprint = Blueprint::of::<Pair>();
    let built = blueprint.construct(args()).unwrap();
    let sum = blueprint.invoke("sum", built.as_ref()).unwrap();
    assert_eq!(*sum.downcast::<usize>().unwrap(), 10);

    let err = blueprint.invoke("product", built.as_ref()).err().unwrap();
    assert!(matches!(err, Error::MethodNotFound { .. }));
  }
}
