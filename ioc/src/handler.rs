//! Overrides for single injection points.

use crate::container::Container;
use crate::core::Instance;
use crate::error::Result;
use crate::identifier::ClassRef;
use crate::manifest::Injectable;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

pub type HandlerFn = Arc<dyn Fn(&Container) -> Result<Instance> + Send + Sync>;

/// A constructor parameter position or a property name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InjectionPoint {
  Parameter(usize),
  Property(Cow<'static, str>),
}

/// Supplies the value of one injection point of `target`, bypassing the
/// normal resolution of the declared identifier.
///
/// The producer runs on every construction of `target`; its result is never
/// cached by the handler itself.
#[derive(Clone)]
pub struct Handler {
  pub target: ClassRef,
  pub point: InjectionPoint,
  pub value: HandlerFn,
}

impl Handler {
  /// Overrides constructor parameter `index` of `T`.
  pub fn parameter<T: Injectable, V: Any + Send + Sync>(
    index: usize,
    value: impl Fn(&Container) -> Result<V> + Send + Sync + 'static,
  ) -> Self {
    Self::new(ClassRef::of::<T>(), InjectionPoint::Parameter(index), value)
  }

  /// Overrides property `name` of `T`.
  pub fn property<T: Injectable, V: Any + Send + Sync>(
    name: impl Into<Cow<'static, str>>,
    value: impl Fn(&Container) -> Result<V> + Send + Sync + 'static,
  ) -> Self {
    Self::new(
      ClassRef::of::<T>(),
      InjectionPoint::Property(name.into()),
      value,
    )
  }

  pub fn new<V: Any + Send + Sync>(
    target: ClassRef,
    point: InjectionPoint,
    value: impl Fn(&Container) -> Result<V> + Send + Sync + 'static,
  ) -> Self {
    Self {
      target,
      point,
      value: Arc::new(move |container: &Container| Ok(Arc::new(value(container)?) as Instance)),
    }
  }

  pub(crate) fn matches(&self, target: &ClassRef, point: &InjectionPoint) -> bool {
    self.target == *target && self.point == *point
  }
}

impl fmt::Debug for Handler {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Handler")
      .field("target", &self.target)
      .field("point", &self.point)
      .finish_non_exhaustive()
  }
}
