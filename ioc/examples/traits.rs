use fibre_di::{global, resolve, Injectable, Manifest, Token};
use once_cell::sync::Lazy;
use std::sync::Arc;

// 1. Define the abstraction (the trait)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. Define a concrete implementation
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

// Trait objects are registered under a token typed with the shared pointer.
static LOGGER: Lazy<Token<Arc<dyn Logger>>> = Lazy::new(|| Token::named("logger"));

// 3. Define a service that depends on the abstraction
struct ReportService {
  logger: Arc<dyn Logger>,
}

impl Injectable for ReportService {
  fn manifest() -> Manifest<Self> {
    Manifest::new(|args| {
      Ok(ReportService {
        logger: args.take_cloned::<Arc<dyn Logger>>()?,
      })
    })
    .param(&*LOGGER)
  }
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    // ... logic to generate report ...
    self.logger.log("Finished report generation.");
  }
}

fn main() {
  // --- Registration ---
  // ReportService itself needs no registration; the container reads its manifest.
  global().set_token(&*LOGGER, Arc::new(ConsoleLogger) as Arc<dyn Logger>);

  // --- Resolution and Usage ---
  println!("Resolving the high-level service...");
  let report_service = resolve!(ReportService);

  println!("Using the service...");
  report_service.generate_report();
}
