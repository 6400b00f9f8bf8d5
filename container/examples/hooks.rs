use curia_container::{Callable, Container, Parameter, Parameters};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

struct Connection {
  dsn: String,
  retries: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
  let container = Container::new();

  container.instance("config.dsn", String::from("postgres://localhost/app"));
  container.singleton_factory("db", |c: &Container| {
    Ok(Connection {
      dsn: (*c.get::<String>("config.dsn")?).clone(),
      retries: 0,
    })
  });
  container.alias("database", "db");

  // Hooks run on every resolution, cache hits included.
  let resolutions = Arc::new(AtomicUsize::new(0));
  let counter = resolutions.clone();
  container.hook_typed::<Connection>("database", move |conn, _| {
    counter.fetch_add(1, Ordering::SeqCst);
    Some(Arc::new(Connection {
      dsn: conn.dsn.clone(),
      retries: 3,
    }))
  });

  let conn = container.get::<Connection>("database")?;
  println!("{} (retries: {})", conn.dsn, conn.retries);
  container.get::<Connection>("db")?;
  println!("hook ran {} times", resolutions.load(Ordering::SeqCst));

  // Ad-hoc invocation: "db" comes from the container, "table" from the call site.
  let count_rows = Callable::function(
    vec![Parameter::dependency("db", "db"), Parameter::untyped("table")],
    |args| {
      let conn = args.next::<Connection>()?;
      let table: String = args.next_value()?;
      Ok(format!("SELECT count(*) FROM {} -- on {}", table, conn.dsn))
    },
  );
  let query = container.call_as::<String>(count_rows, Parameters::new().with("table", String::from("users")))?;
  println!("{}", query);

  Ok(())
}
