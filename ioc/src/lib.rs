//! # Fibre DI
//!
//! A manifest-driven dependency injection container for Rust.
//!
//! Services are registered under an [`Identifier`]: an injectable type, a
//! string name or a typed [`Token`]. Types describe how they are built with a
//! [`Manifest`] listing their constructor parameters, injected properties and
//! factory methods, so a type never registered explicitly can still be
//! resolved: the container builds it, and everything it depends on, on first
//! request and keeps the instance for later lookups.
//!
//! ## Core Concepts
//!
//! - **Container**: the registry of services and injection handlers.
//! - **Global Container**: a process-wide container, accessible via [`global()`].
//! - **Manifest**: the explicit dependency description of an [`Injectable`] type.
//! - **Handlers**: overrides for a single constructor parameter or property.
//! - **Factories**: functions, or methods of another injectable type, that
//!   produce a service instead of its manifest.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_di::{injectable, Container, Handler, Injectable, Manifest, ServiceMetadata};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Engine;
//! injectable!(Engine);
//!
//! struct Car {
//!   engine: Arc<Engine>,
//!   seats: u8,
//! }
//!
//! impl Injectable for Car {
//!   fn manifest() -> Manifest<Self> {
//!     Manifest::new(|args| {
//!       Ok(Car {
//!         engine: args.take::<Engine>()?,
//!         seats: args.take_cloned::<u8>()?,
//!       })
//!     })
//!     .inject::<Engine>()
//!     .param("seats")
//!   }
//! }
//!
//! let container = Container::new();
//! container.set("seats", 4u8);
//!
//! let car = container.get_type::<Car>().unwrap();
//! assert_eq!(car.seats, 4);
//!
//! // Override the second constructor argument of `Car` for future builds.
//! container.reset();
//! container.register_handler(Handler::parameter::<Car, u8>(1, |_| Ok(2)));
//! assert_eq!(container.get_type::<Car>().unwrap().seats, 2);
//!
//! // Or bypass the manifest entirely.
//! container.reset();
//! container.register_service(
//!   ServiceMetadata::for_type::<Car>().factory_fn(|| Ok(Car { engine: Arc::new(Engine), seats: 7 })),
//! );
//! assert_eq!(container.get_type::<Car>().unwrap().seats, 7);
//! ```

mod config;
mod container;
mod core;
mod error;
mod global;
mod handler;
mod identifier;
mod macros;
mod manifest;
mod metadata;

pub use crate::config::ContainerConfig;
pub use crate::container::Container;
pub use crate::core::Instance;
pub use crate::error::{Error, Result};
pub use crate::global::global;
pub use crate::handler::{Handler, HandlerFn, InjectionPoint};
pub use crate::identifier::{ClassRef, Identifier, Token, TokenId};
pub use crate::manifest::{Arguments, Injectable, Manifest};
pub use crate::metadata::{Factory, FactoryFn, Provision, ServiceMetadata};
