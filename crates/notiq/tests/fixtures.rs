//! Shared helpers for integration tests.

use std::sync::{Arc, Mutex};

use notiq::Notification;

/// Collects every payload a listener observes, in delivery order.
#[derive(Debug, Clone)]
pub struct Recorder<T> {
    values: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self { values: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Callback that appends each observed payload to this recorder.
    pub fn callback(&self) -> impl Fn(&Notification<T>) + Send + 'static {
        let values = Arc::clone(&self.values);
        move |notification| values.lock().unwrap().push(notification.data().clone())
    }

    pub fn values(&self) -> Vec<T> {
        self.values.lock().unwrap().clone()
    }
}

/// Installs a fmt subscriber honoring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
