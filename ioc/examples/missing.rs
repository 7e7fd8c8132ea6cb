use fibre_di::{global, resolve, Error, Token};
use std::panic;

fn main() {
  // --- Using the panicking `resolve!` macro ---
  println!("Attempting to resolve a name that was never registered...");

  let result = panic::catch_unwind(|| {
    // This line will panic!
    let _service = resolve!(String, "unregistered");
  });

  assert!(result.is_err(), "resolve! should have panicked.");
  println!("Successfully caught the expected panic from resolve!.");

  // --- Using the fallible `get_token()` method ---
  println!("\nNow, attempting to resolve a token using the fallible API...");

  let token: Token<String> = Token::named("api_key");
  match global().get_token(&token) {
    Ok(_) => panic!("Should not have found the service!"),
    Err(Error::ServiceNotFound(id)) => println!("Correctly received ServiceNotFound for {}.", id),
    Err(other) => panic!("Unexpected error: {}", other),
  }
}
