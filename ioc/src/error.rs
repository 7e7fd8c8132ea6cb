use crate::identifier::Identifier;
use thiserror::Error;

/// The error type for all container operations.
#[derive(Debug, Error)]
pub enum Error {
  /// A name or token was requested that has no registration. Types are never
  /// reported here unless implicit registration is disabled.
  #[error(
    "Service with identifier {0} was not found in the container. Register it before usage via `set` or `register_service`."
  )]
  ServiceNotFound(Identifier),

  #[error("Service {id} does not hold a value of type `{expected}`")]
  TypeMismatch { id: String, expected: &'static str },

  #[error("Constructor of `{class}` requested argument {index}, which was not declared in its manifest")]
  MissingArgument { class: &'static str, index: usize },

  #[error("Factory class `{class}` has no method named '{method}'")]
  MethodNotFound { class: &'static str, method: String },

  #[error("Circular dependency detected while resolving service: {0}")]
  CircularDependency(String),

  /// An error raised by user code (a factory, handler or constructor).
  #[error(transparent)]
  Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wraps an arbitrary error raised inside a factory or constructor.
  pub fn custom<E>(error: E) -> Self
  where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
  {
    Error::Custom(error.into())
  }

  pub(crate) fn type_mismatch<T: ?Sized>(id: impl ToString) -> Self {
    Error::TypeMismatch {
      id: id.to_string(),
      expected: std::any::type_name::<T>(),
    }
  }
}

/// A specialized `Result` type for container operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
