use curia_container::{global, resolve};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// A simple service that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

// A global, thread-safe counter to generate unique IDs.
static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn main() {
  // --- Shared Registration ---
  // This factory will only be called ONCE.
  global().singleton_factory("singleton_tracker", |_| {
    println!("Creating SINGLETON RequestTracker...");
    Ok(RequestTracker {
      id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
    })
  });

  // --- Non-shared Registration ---
  // This factory will be called EVERY time the service is resolved.
  global().bind_factory("transient_tracker", |_| {
    println!("Creating TRANSIENT RequestTracker...");
    Ok(RequestTracker {
      id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
    })
  });

  println!("--- Resolving Singletons ---");
  let s1 = resolve!(RequestTracker, "singleton_tracker");
  let s2 = resolve!(RequestTracker, "singleton_tracker");
  println!("Singleton 1 ID: {}, Singleton 2 ID: {}", s1.id, s2.id);
  assert!(Arc::ptr_eq(&s1, &s2), "Singleton instances should be identical");

  println!("--- Resolving Transients ---");
  let t1 = resolve!(RequestTracker, "transient_tracker");
  let t2 = resolve!(RequestTracker, "transient_tracker");
  println!("Transient 1 ID: {}, Transient 2 ID: {}", t1.id, t2.id);
  assert!(!Arc::ptr_eq(&t1, &t2), "Transient instances should be different");

  // --- Re-binding drops the cached singleton ---
  global().singleton_factory("singleton_tracker", |_| Ok(RequestTracker { id: 100 }));
  let s3 = resolve!(RequestTracker, "singleton_tracker");
  println!("Singleton after re-bind ID: {}", s3.id);
  assert_eq!(s3.id, 100);
}
