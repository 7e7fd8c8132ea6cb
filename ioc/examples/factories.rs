use fibre_di::{global, injectable, resolve, Handler, Injectable, Manifest, ServiceMetadata};
use std::sync::Arc;

#[derive(Default)]
struct Engine;
injectable!(Engine);

struct Car {
  engine: Arc<Engine>,
  color: String,
}

impl Injectable for Car {
  fn manifest() -> Manifest<Self> {
    Manifest::new(|args| {
      Ok(Car {
        engine: args.take::<Engine>()?,
        color: args.take_cloned::<String>()?,
      })
    })
    .inject::<Engine>()
    .param("car.color")
  }
}

// A factory class: it has its own dependencies and exposes `create_car`.
struct CarFactory {
  engine: Arc<Engine>,
}

impl CarFactory {
  fn create_car(&self) -> Car {
    Car {
      engine: self.engine.clone(),
      color: "blue".to_string(),
    }
  }
}

impl Injectable for CarFactory {
  fn manifest() -> Manifest<Self> {
    Manifest::new(|args| {
      Ok(CarFactory {
        engine: args.take::<Engine>()?,
      })
    })
    .inject::<Engine>()
    .method("create_car", |factory: &CarFactory| Ok(factory.create_car()))
  }
}

struct Garage {
  car: Arc<Car>,
}

impl Injectable for Garage {
  fn manifest() -> Manifest<Self> {
    Manifest::new(|args| Ok(Garage { car: args.take::<Car>()? })).param("garage.car")
  }
}

fn main() {
  // Built from the manifest, with the color argument supplied by a handler.
  global().register_handler(Handler::parameter::<Car, String>(1, |_| Ok("red".to_string())));
  let car = resolve!(Car);
  println!("Manifest-built car is {}", car.color);

  // A named car produced by the factory class instead.
  global().register_service(ServiceMetadata::new("garage.car").factory_method::<CarFactory>("create_car"));
  let garage = resolve!(Garage);
  println!("Garage car is {}", garage.car.color);

  // Both cars share the singleton engine.
  assert!(Arc::ptr_eq(&garage.car.engine, &car.engine));
}
