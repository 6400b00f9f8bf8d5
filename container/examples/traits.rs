use curia_container::{global, resolve, Arguments, Injectable, Key, Parameter, Result};
use std::sync::Arc;

// 1. Define the abstraction (the trait)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. Define concrete implementations
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

struct QuietLogger;
impl Logger for QuietLogger {
  fn log(&self, _message: &str) {}
}

// 3. Define a service that depends on the abstraction, and describe its constructor
struct ReportService {
  logger: Arc<dyn Logger>,
}

impl Injectable for ReportService {
  fn parameters() -> Option<Vec<Parameter>> {
    Some(vec![Parameter::of::<dyn Logger>("logger")])
  }

  fn construct(args: &mut Arguments) -> Result<Self> {
    Ok(ReportService {
      logger: args.next_trait()?,
    })
  }
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    self.logger.log("Finished report generation.");
  }
}

fn main() {
  // --- Registration ---

  // The trait token resolves to the console logger; "quiet" is a named alternative.
  global().singleton_trait::<dyn Logger>(Key::of::<dyn Logger>(), |_| {
    Ok(Arc::new(ConsoleLogger) as Arc<dyn Logger>)
  });
  global().singleton_trait::<dyn Logger>("quiet", |_| Ok(Arc::new(QuietLogger) as Arc<dyn Logger>));

  // ReportService is never bound: the container builds it from its description.
  global().register::<ReportService>();

  // --- Resolution and Usage ---
  println!("Resolving the high-level service...");
  let report_service = resolve!(ReportService);

  println!("Using the service...");
  report_service.generate_report();

  let quiet = resolve!(trait Logger, "quiet");
  quiet.log("nobody hears this");
}
