use fibre_di::{
  injectable, Container, Error, Identifier, Injectable, Manifest, Provision, ServiceMetadata, Token,
};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

// --- Test Fixtures ---

#[derive(Debug, Default, PartialEq, Eq)]
struct Engine {
  cylinders: u8,
}
injectable!(Engine);

#[derive(Debug)]
struct Car {
  engine: Arc<Engine>,
}

impl Car {
  fn new(engine: Arc<Engine>) -> Self {
    Car { engine }
  }
}
injectable!(Car => Car::new, [Engine]);

// Counts its constructions so tests can tell fresh instances apart.
static BUILT_STAMPS: AtomicUsize = AtomicUsize::new(0);

struct Stamp {
  serial: usize,
}

impl Injectable for Stamp {
  fn manifest() -> Manifest<Self> {
    Manifest::new(|_| {
      Ok(Stamp {
        serial: BUILT_STAMPS.fetch_add(1, Ordering::SeqCst),
      })
    })
  }
}

// --- Basic Tests ---

#[test]
fn test_unregistered_type_is_built_implicitly() {
  // Arrange
  let container = Container::new();

  // Act
  let car = container.get_type::<Car>().unwrap();

  // Assert
  assert_eq!(*car.engine, Engine::default());
  // The dependency was registered and cached as a singleton along the way.
  assert!(Arc::ptr_eq(&car.engine, &container.get_type::<Engine>().unwrap()));
  assert!(Arc::ptr_eq(&car, &container.get_type::<Car>().unwrap()));
}

#[test]
fn test_unregistered_name_is_not_found() {
  let container = Container::new();

  let err = container.get::<String>("database_url").unwrap_err();

  assert!(matches!(&err, Error::ServiceNotFound(Identifier::Name(name)) if name == "database_url"));
  assert!(err.to_string().contains("\"database_url\""));
}

#[test]
fn test_unregistered_token_is_not_found() {
  let container = Container::new();
  let token: Token<u16> = Token::named("port");

  let err = container.get_token(&token).unwrap_err();

  assert!(matches!(&err, Error::ServiceNotFound(id) if *id == token.identifier()));
  assert!(err.to_string().contains("Token(port#"));
}

#[test]
fn test_set_then_get_returns_the_same_instance() {
  // Arrange
  let container = Container::new();
  let engine = Arc::new(Engine { cylinders: 8 });

  // Act
  container.set_shared(Identifier::class::<Engine>(), engine.clone());

  // Assert
  let resolved = container.get_type::<Engine>().unwrap();
  assert!(Arc::ptr_eq(&engine, &resolved));
}

#[test]
fn test_distinct_tokens_never_collide() {
  let container = Container::new();
  let first: Token<String> = Token::named("same");
  let second: Token<String> = Token::named("same");

  container.set_token(&first, "a".to_string());
  container.set_token(&second, "b".to_string());

  assert_eq!(*container.get_token(&first).unwrap(), "a");
  assert_eq!(*container.get_token(&second).unwrap(), "b");
}

#[test]
fn test_last_set_wins() {
  let container = Container::new();

  container.set("mode", "v1".to_string()).set("mode", "v2".to_string());

  assert_eq!(*container.get::<String>("mode").unwrap(), "v2");
}

#[test]
fn test_provide_then_remove() {
  // Arrange
  let container = Container::new();
  let token: Token<u32> = Token::new();
  container.provide([
    Provision::new("a", 1u32),
    Provision::new("b", 2u32),
    Provision::new(&token, 3u32),
  ]);

  // Act & Assert
  assert_eq!(*container.get::<u32>("a").unwrap(), 1);
  assert_eq!(*container.get::<u32>("b").unwrap(), 2);
  assert_eq!(*container.get_token(&token).unwrap(), 3);

  container.remove([Identifier::name("b"), token.identifier()]);

  assert_eq!(*container.get::<u32>("a").unwrap(), 1);
  assert!(matches!(container.get::<u32>("b"), Err(Error::ServiceNotFound(_))));
  assert!(matches!(container.get_token(&token), Err(Error::ServiceNotFound(_))));
}

#[test]
fn test_provide_later_duplicate_wins() {
  let container = Container::new();

  container.provide([Provision::new("dup", 1u8), Provision::new("dup", 2u8)]);

  assert_eq!(*container.get::<u8>("dup").unwrap(), 2);
}

#[test]
fn test_remove_missing_identifier_is_a_no_op() {
  let container = Container::new();
  container.set("kept", 1u8);

  container.remove(["never-registered"]);
  container.remove(["never-registered"]);

  assert!(container.has("kept"));
}

#[test]
fn test_reset_invalidates_singletons() {
  // Arrange
  let container = Container::new();
  let custom = Arc::new(Engine { cylinders: 12 });
  container.set_shared(Identifier::class::<Engine>(), custom.clone());
  assert!(Arc::ptr_eq(&custom, &container.get_type::<Engine>().unwrap()));

  // Act
  container.reset();

  // Assert
  let fresh = container.get_type::<Engine>().unwrap();
  assert!(!Arc::ptr_eq(&custom, &fresh));
  assert_eq!(*fresh, Engine::default());
}

#[test]
fn test_reset_rebuilds_implicit_services() {
  let container = Container::new();
  let before = container.get_type::<Stamp>().unwrap();

  container.reset();
  assert!(!container.has(Identifier::class::<Stamp>()));

  let after = container.get_type::<Stamp>().unwrap();
  assert_ne!(before.serial, after.serial);
}

#[test]
fn test_removed_type_is_registered_again_on_lookup() {
  let container = Container::new();
  let before = container.get_type::<Stamp>().unwrap();

  container.remove([Identifier::class::<Stamp>()]);
  let after = container.get_type::<Stamp>().unwrap();

  assert!(!Arc::ptr_eq(&before, &after));
}

#[test]
fn test_wrong_type_requested() {
  let container = Container::new();
  container.set("answer", 42u64);

  let err = container.get::<u32>("answer").unwrap_err();

  assert!(matches!(err, Error::TypeMismatch { expected: "u32", .. }));
}

#[test]
fn test_set_during_build_wins_over_built_value() {
  // Arrange
  let container = Arc::new(Container::new());
  let inner = Arc::downgrade(&container);
  container.register_service(ServiceMetadata::new("x").factory_fn(move || {
    let container = inner.upgrade().ok_or_else(|| Error::custom("container dropped"))?;
    container.set("x", 2u8);
    Ok(1u8)
  }));

  // Act
  let built = container.get::<u8>("x").unwrap();
  let after = container.get::<u8>("x").unwrap();

  // Assert
  assert_eq!(*built, 1);
  assert_eq!(*after, 2);
}

#[test]
fn test_concurrent_set_during_slow_build_wins() {
  // Arrange
  let container = Container::new();
  let (started_tx, started_rx) = mpsc::channel::<()>();
  let (release_tx, release_rx) = mpsc::channel::<()>();
  let started_tx = Mutex::new(started_tx);
  let release_rx = Mutex::new(release_rx);
  container.register_service(ServiceMetadata::new("slow").factory_fn(move || {
    let _ = started_tx.lock().unwrap().send(());
    let _ = release_rx.lock().unwrap().recv();
    Ok(1u8)
  }));

  // Act
  thread::scope(|s| {
    let builder = s.spawn(|| container.get::<u8>("slow").unwrap());
    started_rx.recv().unwrap();
    container.set("slow", 2u8);
    release_tx.send(()).unwrap();
    assert_eq!(*builder.join().unwrap(), 1);
  });

  // Assert
  assert_eq!(*container.get::<u8>("slow").unwrap(), 2);
}
