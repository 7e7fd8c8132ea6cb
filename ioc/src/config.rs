//! Container behavior switches.

/// Options fixed when a [`Container`](crate::Container) is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerConfig {
  pub(crate) implicit_registration: bool,
  pub(crate) detect_cycles: bool,
}

impl Default for ContainerConfig {
  fn default() -> Self {
    Self {
      implicit_registration: true,
      detect_cycles: true,
    }
  }
}

impl ContainerConfig {
  pub fn new() -> Self {
    Self::default()
  }

  /// Whether an unregistered injectable type is registered on its first
  /// lookup. When disabled such lookups fail with `ServiceNotFound`.
  pub fn implicit_registration(mut self, enabled: bool) -> Self {
    self.implicit_registration = enabled;
    self
  }

  /// Whether dependency cycles are reported as `CircularDependency`. When
  /// disabled a cycle recurses until the stack is exhausted.
  pub fn detect_cycles(mut self, enabled: bool) -> Self {
    self.detect_cycles = enabled;
    self
  }

  pub fn is_implicit_registration(&self) -> bool {
    self.implicit_registration
  }

  pub fn is_detect_cycles(&self) -> bool {
    self.detect_cycles
  }
}
