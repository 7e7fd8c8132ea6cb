//! Public macros for registration and ergonomic resolution.

/// Resolves a service, panicking if it cannot be produced.
///
/// Without a `from` clause the global container is used. A bare type is
/// resolved as an injectable type; a type followed by an identifier resolves
/// that identifier and downcasts the result.
///
/// # Panics
///
/// Panics with the underlying error if resolution fails. For a fallible
/// version, call `get`/`get_type` on the container directly.
///
/// # Examples
///
/// ```
/// use fibre_di::{global, injectable, resolve};
///
/// #[derive(Default)]
/// struct Clock;
/// injectable!(Clock);
///
/// global().set("motd", String::from("hello"));
///
/// let _clock = resolve!(Clock);
/// let motd = resolve!(String, "motd");
/// assert_eq!(*motd, "hello");
/// ```
#[macro_export]
macro_rules! resolve {
    // resolve!(from container, MyService)
    (from $container:expr, $type:ty) => {
        $container
            .get_type::<$type>()
            .unwrap_or_else(|err| {
                panic!(
                    "Failed to resolve required service {}: {}",
                    std::any::type_name::<$type>(),
                    err
                )
            })
    };

    // resolve!(from container, MyService, "name")
    (from $container:expr, $type:ty, $id:expr) => {
        $container
            .get::<$type>($id)
            .unwrap_or_else(|err| {
                panic!(
                    "Failed to resolve required service {}: {}",
                    std::any::type_name::<$type>(),
                    err
                )
            })
    };

    // resolve!(MyService)
    ($type:ty) => {
        $crate::resolve!(from $crate::global(), $type)
    };

    // resolve!(MyService, "name") or resolve!(MyService, &TOKEN)
    ($type:ty, $id:expr) => {
        $crate::resolve!(from $crate::global(), $type, $id)
    };
}

/// Resolves a service, returning `None` if it cannot be produced.
///
/// Accepts the same forms as [`resolve!`].
#[macro_export]
macro_rules! maybe_resolve {
    (from $container:expr, $type:ty) => {
        $container.get_type::<$type>().ok()
    };

    (from $container:expr, $type:ty, $id:expr) => {
        $container.get::<$type>($id).ok()
    };

    ($type:ty) => {
        $crate::maybe_resolve!(from $crate::global(), $type)
    };

    ($type:ty, $id:expr) => {
        $crate::maybe_resolve!(from $crate::global(), $type, $id)
    };
}

/// Implements `Injectable` for simple types.
///
/// `injectable!(Type)` builds the type with `Default::default()`.
/// `injectable!(Type => constructor, [Dep, ...])` calls `constructor` with an
/// `Arc` of each listed injectable dependency, in order.
///
/// # Examples
///
/// ```
/// use fibre_di::{injectable, Container};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Engine;
/// injectable!(Engine);
///
/// struct Car {
///   engine: Arc<Engine>,
/// }
///
/// impl Car {
///   fn new(engine: Arc<Engine>) -> Self {
///     Car { engine }
///   }
/// }
/// injectable!(Car => Car::new, [Engine]);
///
/// let container = Container::new();
/// let car = container.get_type::<Car>().unwrap();
/// assert!(Arc::ptr_eq(&car.engine, &container.get_type::<Engine>().unwrap()));
/// ```
#[macro_export]
macro_rules! injectable {
    ($type:ty => $ctor:path, [$($dep:ty),* $(,)?]) => {
        impl $crate::Injectable for $type {
            fn manifest() -> $crate::Manifest<Self> {
                $crate::Manifest::new(|_args: &mut $crate::Arguments| {
                    Ok($ctor($(_args.take::<$dep>()?),*))
                })
                $(.inject::<$dep>())*
            }
        }
    };

    ($type:ty) => {
        impl $crate::Injectable for $type {
            fn manifest() -> $crate::Manifest<Self> {
                $crate::Manifest::new(|_: &mut $crate::Arguments| {
                    Ok(<$type as ::std::default::Default>::default())
                })
            }
        }
    };
}
