//! # Notiq
//!
//! A thread-safe, in-process notification queue for tagged resource pub-sub.
//!
//! ## Overview
//!
//! Producers register as sources of a tagged resource and receive a
//! [`ProviderHandle`]; consumers register a [`Tag`] and a callback. A single
//! dedicated worker thread drains the pending FIFO and delivers each
//! [`Notification`] to every listener whose tag matches, off the producer's
//! call stack. The queue targets same-process component decoupling (sensor
//! producers vs. UI or logging consumers), not distributed messaging.
//!
//! ## Features
//!
//! * **Tag routing**: exact-equality matching of an application-chosen
//!   resource identifier type.
//! * **FIFO delivery**: one global enqueue order across all producers, one
//!   consuming worker.
//! * **RAII producers**: dropping a [`ProviderHandle`] deregisters it;
//!   in-flight updates from a torn-down producer are discarded, never errors.
//! * **Two lock domains**: listener scans never block producer registration
//!   or enqueue.
//!
//! # Example
//!
//! ```rust
//! use notiq::{EventQueue, QueueError, Tag};
//! use std::sync::{Arc, Mutex};
//!
//! fn main() -> Result<(), QueueError> {
//!     // Resource identifiers are &str, payloads are u32.
//!     let queue = EventQueue::<&str, u32>::new();
//!
//!     let seen = Arc::new(Mutex::new(Vec::new()));
//!     let sink = Arc::clone(&seen);
//!     let token = queue.listen(Tag::new("speed"), move |n| {
//!         sink.lock().unwrap().push(*n.data());
//!     })?;
//!
//!     let speed = queue.provide(Tag::new("speed"));
//!     speed.update(98);
//!     speed.update(100);
//!
//!     queue.wait_until_empty()?;
//!     assert_eq!(*seen.lock().unwrap(), [98, 100]);
//!
//!     queue.remove_listener(token)?;
//!     Ok(())
//! }
//! ```

mod error;
mod handle;
mod listener;
mod notification;
mod queue;

pub use error::QueueError;
pub use handle::ProviderHandle;
pub use listener::ListenerToken;
pub use notification::{Notification, Tag};
pub use queue::EventQueue;
