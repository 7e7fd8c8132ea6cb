//! The main `Container` struct and its associated methods.

use crate::config::ContainerConfig;
use crate::core::{Instance, ResolutionGuard, Slot};
use crate::error::{Error, Result};
use crate::handler::{Handler, InjectionPoint};
use crate::identifier::{ClassRef, Identifier, Token};
use crate::manifest::Injectable;
use crate::metadata::{Factory, Provision, ServiceMetadata};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// The Inversion of Control (IoC) container.
///
/// Holds every registration, keyed by [`Identifier`], plus the list of
/// injection [`Handler`]s. Services are built lazily on first request and
/// cached, so each identifier maps to one shared instance unless it was
/// registered as transient.
///
/// No lock is held while user code runs, which lets factories, handlers and
/// constructors resolve other services from the same container.
#[derive(Default)]
pub struct Container {
  services: DashMap<Identifier, ServiceMetadata>,
  groups: DashMap<Identifier, Vec<ServiceMetadata>>,
  handlers: RwLock<Vec<Handler>>,
  config: ContainerConfig,
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_config(config: ContainerConfig) -> Self {
    Self {
      config,
      ..Self::default()
    }
  }

  pub fn config(&self) -> &ContainerConfig {
    &self.config
  }

  // --- PRIVATE HELPERS ---

  fn address(&self) -> usize {
    self as *const Self as usize
  }

  fn register_implicitly(&self, id: &Identifier) -> Result<ServiceMetadata> {
    match id {
      Identifier::Class(class) if self.config.implicit_registration => {
        debug!(service = %id, "registering type implicitly");
        let entry = self
          .services
          .entry(id.clone())
          .or_insert_with(|| ServiceMetadata::new(*class).stamped());
        Ok(entry.value().clone())
      }
      _ => Err(Error::ServiceNotFound(id.clone())),
    }
  }

  /// Builds a fresh value for `metadata`, ignoring any cached one.
  fn produce(&self, metadata: &ServiceMetadata, slot: Slot) -> Result<Instance> {
    let _guard = if self.config.detect_cycles {
      Some(ResolutionGuard::enter(self.address(), &metadata.id, slot)?)
    } else {
      None
    };

    match (&metadata.factory, &metadata.class) {
      (Some(Factory::Function(factory)), _) => {
        trace!(service = %metadata.id, "calling factory function");
        factory()
      }
      (Some(Factory::Method { class, method }), _) => {
        trace!(service = %metadata.id, factory = class.type_name(), %method, "calling factory method");
        let factory = self.resolve(&Identifier::Class(*class))?;
        class.blueprint().invoke(method, &*factory)
      }
      (None, Some(class)) => self.construct(class),
      (None, None) => Err(Error::ServiceNotFound(metadata.id.clone())),
    }
  }

  fn construct(&self, class: &ClassRef) -> Result<Instance> {
    let blueprint = class.blueprint();
    trace!(class = blueprint.class(), params = blueprint.params().len(), "constructing service");

    let args = blueprint
      .params()
      .iter()
      .enumerate()
      .map(|(index, param)| self.inject(class, &InjectionPoint::Parameter(index), param))
      .collect::<Result<Vec<_>>>()?;

    let mut built = blueprint.construct(args)?;

    for property in blueprint.properties() {
      let point = InjectionPoint::Property(property.name.clone());
      let value = self.inject(class, &point, &property.id)?;
      (property.inject)(built.as_mut(), value)?;
    }

    Ok(Instance::from(built))
  }

  /// Supplies one injection point: the first matching handler wins, otherwise
  /// the declared identifier is resolved.
  fn inject(&self, target: &ClassRef, point: &InjectionPoint, declared: &Identifier) -> Result<Instance> {
    let handler = self
      .handlers
      .read()
      .iter()
      .find(|handler| handler.matches(target, point))
      .map(|handler| handler.value.clone());

    match handler {
      Some(value) => value(self),
      None => self.resolve(declared),
    }
  }

  // --- PUBLIC API ---

  // --- Registration ---

  /// Registers `value` under `id`, replacing any existing registration.
  pub fn set<T: Any + Send + Sync>(&self, id: impl Into<Identifier>, value: T) -> &Self {
    self.set_instance(id, Arc::new(value))
  }

  /// Registers an already shared value. `get` returns this very `Arc`.
  pub fn set_shared<T: Any + Send + Sync>(&self, id: impl Into<Identifier>, value: Arc<T>) -> &Self {
    self.set_instance(id, value)
  }

  /// Registers a value under a token, checking it against the token's type.
  pub fn set_token<T: Any + Send + Sync>(&self, token: &Token<T>, value: T) -> &Self {
    self.set(token, value)
  }

  pub fn set_instance(&self, id: impl Into<Identifier>, value: Instance) -> &Self {
    let mut metadata = ServiceMetadata::new(id);
    metadata.value = Some(value);
    self.set_metadata(metadata)
  }

  /// Registers a full record. A `multiple` record joins its identifier's
  /// group; any other record replaces the existing one for its identifier.
  pub fn set_metadata(&self, metadata: ServiceMetadata) -> &Self {
    let metadata = metadata.stamped();
    trace!(service = %metadata.id, multiple = metadata.multiple, "setting service");
    if metadata.multiple {
      self
        .groups
        .entry(metadata.id.clone())
        .or_default()
        .push(metadata);
    } else {
      self.services.insert(metadata.id.clone(), metadata);
    }
    self
  }

  /// Sets each provision in order. Later duplicates win.
  pub fn provide(&self, provisions: impl IntoIterator<Item = Provision>) -> &Self {
    for provision in provisions {
      self.set_instance(provision.id, provision.value);
    }
    self
  }

  /// Registers how a service is produced without producing it.
  pub fn register_service(&self, metadata: ServiceMetadata) -> &Self {
    self.set_metadata(metadata)
  }

  /// Appends an injection handler.
  ///
  /// Handlers are never replaced: when two handlers target the same injection
  /// point, the one registered first is used.
  pub fn register_handler(&self, handler: Handler) -> &Self {
    let mut handlers = self.handlers.write();
    if handlers
      .iter()
      .any(|existing| existing.matches(&handler.target, &handler.point))
    {
      warn!(
        target_class = handler.target.type_name(),
        point = ?handler.point,
        "handler already registered for this injection point; the earlier one stays in effect"
      );
    }
    handlers.push(handler);
    drop(handlers);
    self
  }

  /// Drops the registrations of every given identifier. Unknown identifiers
  /// are ignored.
  pub fn remove<I: Into<Identifier>>(&self, ids: impl IntoIterator<Item = I>) -> &Self {
    for id in ids {
      let id = id.into();
      let single = self.services.remove(&id).is_some();
      let group = self.groups.remove(&id).is_some();
      debug!(service = %id, removed = single || group, "removing service");
    }
    self
  }

  /// Clears all registrations and handlers. Injectable types register
  /// themselves again on their next lookup.
  pub fn reset(&self) -> &Self {
    debug!(
      services = self.services.len(),
      groups = self.groups.len(),
      "resetting container"
    );
    self.services.clear();
    self.groups.clear();
    self.handlers.write().clear();
    self
  }

  // --- Resolution ---

  /// Whether `id` has a registration, single or grouped. Implicit
  /// registration is not considered.
  pub fn has(&self, id: impl Into<Identifier>) -> bool {
    let id = id.into();
    self.services.contains_key(&id) || self.groups.contains_key(&id)
  }

  /// Resolves the service registered under `id` as a type-erased instance.
  pub fn resolve(&self, id: &Identifier) -> Result<Instance> {
    let existing = self.services.get(id).map(|entry| entry.value().clone());
    let metadata = match existing {
      Some(metadata) => metadata,
      None => self.register_implicitly(id)?,
    };

    if let Some(value) = metadata.value {
      trace!(service = %id, "serving cached instance");
      return Ok(value);
    }

    let value = self.produce(&metadata, Slot::Single)?;
    if !metadata.transient {
      // The record may have been replaced while it was being built.
      match self.services.get_mut(id) {
        Some(mut entry) if entry.revision == metadata.revision => {
          entry.value_mut().value = Some(value.clone());
        }
        _ => trace!(service = %id, "registration changed during build; not caching"),
      }
    }
    Ok(value)
  }

  /// Resolves the service registered under `id` as a `T`.
  pub fn get<T: Any + Send + Sync>(&self, id: impl Into<Identifier>) -> Result<Arc<T>> {
    let id = id.into();
    self
      .resolve(&id)?
      .downcast::<T>()
      .map_err(|_| Error::type_mismatch::<T>(&id))
  }

  /// Resolves the injectable type `T`, building it on first use.
  pub fn get_type<T: Injectable>(&self) -> Result<Arc<T>> {
    self.get(Identifier::class::<T>())
  }

  pub fn get_token<T: Any + Send + Sync>(&self, token: &Token<T>) -> Result<Arc<T>> {
    self.get(token)
  }

  /// Resolves every `multiple` registration of `id`, in registration order.
  pub fn get_many<T: Any + Send + Sync>(&self, id: impl Into<Identifier>) -> Result<Vec<Arc<T>>> {
    let id = id.into();
    let members = self
      .groups
      .get(&id)
      .map(|group| group.value().clone())
      .ok_or_else(|| Error::ServiceNotFound(id.clone()))?;

    let mut resolved = Vec::with_capacity(members.len());
    for (position, member) in members.iter().enumerate() {
      let value = match &member.value {
        Some(value) => value.clone(),
        None => {
          let value = self.produce(member, Slot::Member(position))?;
          if !member.transient {
            if let Some(mut group) = self.groups.get_mut(&id) {
              if let Some(slot) = group
                .value_mut()
                .get_mut(position)
                .filter(|slot| slot.revision == member.revision)
              {
                slot.value = Some(value.clone());
              }
            }
          }
          value
        }
      };
      resolved.push(
        value
          .downcast::<T>()
          .map_err(|_| Error::type_mismatch::<T>(&id))?,
      );
    }
    Ok(resolved)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::manifest::Manifest;

  #[derive(Debug, PartialEq)]
  struct Counter(u32);

  impl Injectable for Counter {
    fn manifest() -> Manifest<Self> {
      Manifest::new(|_| Ok(Counter(0)))
    }
  }

  #[test]
  fn resolve_caches_implicit_registration() {
    let container = Container::new();
    assert!(!container.has(Identifier::class::<Counter>()));

    let first = container.get_type::<Counter>().unwrap();
    assert!(container.has(Identifier::class::<Counter>()));
    assert!(Arc::ptr_eq(&first, &container.get_type::<Counter>().unwrap()));
  }

  #[test]
  fn record_without_producer_is_not_found() {
    let container = Container::new();
    container.register_service(ServiceMetadata::new("empty"));
    let err = container.resolve(&Identifier::name("empty")).err().unwrap();
    assert!(matches!(err, Error::ServiceNotFound(_)));
  }

  #[test]
  fn downcast_failure_is_type_mismatch() {
    let container = Container::new();
    container.set("answer", 42u8);
    let err = container.get::<String>("answer").err().unwrap();
    assert!(matches!(err, Error::TypeMismatch { .. }));
  }

  #[test]
  fn transient_metadata_is_not_cached() {
    let container = Container::new();
    container.register_service(
      ServiceMetadata::new("fresh")
        .factory_fn(|| Ok(Counter(1)))
        .transient(true),
    );

    let a = container.get::<Counter>("fresh").unwrap();
    let b = container.get::<Counter>("fresh").unwrap();
    assert_eq!(*a, Counter(1));
    assert!(!Arc::ptr_eq(&a, &b));
  }
}
