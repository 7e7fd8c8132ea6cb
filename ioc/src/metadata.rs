//! Registration records.

use crate::core::Instance;
use crate::error::Result;
use crate::identifier::{ClassRef, Identifier};
use crate::manifest::Injectable;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

pub type FactoryFn = Arc<dyn Fn() -> Result<Instance> + Send + Sync>;

/// How a service without a cached value is produced.
#[derive(Clone)]
pub enum Factory {
  /// A zero-argument producer. It is the single source of truth for how the
  /// instance is built; the manifest of the service type is not consulted.
  Function(FactoryFn),
  /// Resolve `class` through the container, then call its manifest method
  /// `method` to produce the service.
  Method {
    class: ClassRef,
    method: Cow<'static, str>,
  },
}

impl Factory {
  pub fn function<T: Any + Send + Sync>(
    factory: impl Fn() -> Result<T> + Send + Sync + 'static,
  ) -> Self {
    Factory::Function(Arc::new(move || Ok(Arc::new(factory()?) as Instance)))
  }

  pub fn method<F: Injectable>(method: impl Into<Cow<'static, str>>) -> Self {
    Factory::Method {
      class: ClassRef::of::<F>(),
      method: method.into(),
    }
  }
}

impl fmt::Debug for Factory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Factory::Function(_) => f.write_str("Factory::Function(..)"),
      Factory::Method { class, method } => f
        .debug_struct("Factory::Method")
        .field("class", class)
        .field("method", method)
        .finish(),
    }
  }
}

/// Everything the container knows about one registration.
///
/// A record with a `value` is served as-is. Otherwise the `factory` produces
/// it, falling back to the manifest of `class`. Produced values are cached in
/// `value` unless the record is `transient`.
#[derive(Clone)]
pub struct ServiceMetadata {
  pub id: Identifier,
  pub class: Option<ClassRef>,
  pub factory: Option<Factory>,
  pub value: Option<Instance>,
  /// The record is one of several served under `id` by `get_many`.
  pub multiple: bool,
  /// Produce a fresh value on every resolution.
  pub transient: bool,
  // Stamped by the container when the record is stored. A built value is only
  // cached into the record it was built from.
  pub(crate) revision: u64,
}

impl ServiceMetadata {
  /// An empty record for `id`. If `id` names a type, that type is also the
  /// record's class.
  pub fn new(id: impl Into<Identifier>) -> Self {
    let id = id.into();
    Self {
      class: id.as_class().copied(),
      id,
      factory: None,
      value: None,
      multiple: false,
      transient: false,
      revision: 0,
    }
  }

  pub(crate) fn stamped(mut self) -> Self {
    self.revision = NEXT_REVISION.fetch_add(1, Ordering::Relaxed);
    self
  }

  /// A record keyed by, and built from, the injectable type `T`.
  pub fn for_type<T: Injectable>() -> Self {
    Self::new(ClassRef::of::<T>())
  }

  pub fn class<T: Injectable>(mut self) -> Self {
    self.class = Some(ClassRef::of::<T>());
    self
  }

  pub fn factory(mut self, factory: Factory) -> Self {
    self.factory = Some(factory);
    self
  }

  pub fn factory_fn<T: Any + Send + Sync>(
    self,
    factory: impl Fn() -> Result<T> + Send + Sync + 'static,
  ) -> Self {
    self.factory(Factory::function(factory))
  }

  pub fn factory_method<F: Injectable>(self, method: impl Into<Cow<'static, str>>) -> Self {
    self.factory(Factory::method::<F>(method))
  }

  pub fn value<T: Any + Send + Sync>(mut self, value: T) -> Self {
    self.value = Some(Arc::new(value) as Instance);
    self
  }

  pub fn multiple(mut self, multiple: bool) -> Self {
    self.multiple = multiple;
    self
  }

  pub fn transient(mut self, transient: bool) -> Self {
    self.transient = transient;
    self
  }
}

impl fmt::Debug for ServiceMetadata {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ServiceMetadata")
      .field("id", &self.id)
      .field("class", &self.class)
      .field("factory", &self.factory)
      .field("initialized", &self.value.is_some())
      .field("multiple", &self.multiple)
      .field("transient", &self.transient)
      .finish()
  }
}

/// An `(id, value)` pair for [`Container::provide`](crate::Container::provide).
#[derive(Clone)]
pub struct Provision {
  pub id: Identifier,
  pub value: Instance,
}

impl Provision {
  pub fn new<T: Any + Send + Sync>(id: impl Into<Identifier>, value: T) -> Self {
    Self {
      id: id.into(),
      value: Arc::new(value),
    }
  }

  /// Provides an already shared instance, preserving its identity.
  pub fn shared<T: Any + Send + Sync>(id: impl Into<Identifier>, value: Arc<T>) -> Self {
    Self {
      id: id.into(),
      value,
    }
  }
}
