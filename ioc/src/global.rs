//! The process-wide container instance.

use crate::container::Container;
use once_cell::sync::Lazy;

// Created on first access; lives for the rest of the process. `reset` is the
// only way to return it to an empty state.
static GLOBAL_CONTAINER: Lazy<Container> = Lazy::new(Container::default);

/// Provides a reference to the global container instance.
///
/// Applications typically register their services here once during start-up
/// and resolve them anywhere afterwards. Code that should be testable in
/// isolation can take a `&Container` instead and be handed a fresh one.
///
/// # Examples
///
/// ```
/// use fibre_di::global;
///
/// fn bootstrap() {
///   global().set("greeting", String::from("Hello from global!"));
/// }
///
/// bootstrap();
/// assert_eq!(*global().get::<String>("greeting").unwrap(), "Hello from global!");
/// ```
pub fn global() -> &'static Container {
  &GLOBAL_CONTAINER
}
