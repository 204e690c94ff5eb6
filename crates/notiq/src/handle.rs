//! Producer-side capability handle.

use std::fmt;
use std::sync::Arc;

use crate::notification::{Notification, Tag};
use crate::queue::{ProviderId, Shared};

/// Capability object held by a producer of one tagged resource.
///
/// Returned by [`EventQueue::provide`](crate::EventQueue::provide). Calling
/// [`update`](Self::update) enqueues a notification under the tag captured at
/// registration time. Dropping the handle deregisters the producer; release
/// and deregistration are the same event, on every exit path.
///
/// The handle shares ownership of the queue internals, so a handle that
/// outlives its [`EventQueue`](crate::EventQueue) stays safe to use: once the
/// queue has shut down, every `update` is dropped silently.
pub struct ProviderHandle<A, T> {
    shared: Arc<Shared<A, T>>,
    id: ProviderId,
    tag: Tag<A>,
}

impl<A, T> ProviderHandle<A, T>
where
    A: Clone + PartialEq + Send + 'static,
    T: Send + 'static,
{
    pub(crate) const fn new(shared: Arc<Shared<A, T>>, id: ProviderId, tag: Tag<A>) -> Self {
        Self { shared, id, tag }
    }

    /// Enqueues one notification under this producer's tag.
    ///
    /// Returns as soon as the entry is queued; delivery happens later on the
    /// dispatch worker thread. Never blocks beyond the queue lock. If the
    /// producer's registration is already gone (the queue shut down), the
    /// notification is dropped silently by contract.
    ///
    /// # Examples
    /// ```rust
    /// use notiq::{EventQueue, Tag};
    ///
    /// let queue = EventQueue::<&str, u32>::new();
    /// let speed = queue.provide(Tag::new("speed"));
    /// speed.update(98);
    /// ```
    pub fn update(&self, value: T) {
        self.shared.enqueue(self.id, Notification::new(value));
    }

    /// Returns the tag this producer was registered under.
    #[must_use]
    pub const fn tag(&self) -> &Tag<A> {
        &self.tag
    }

    pub(crate) fn belongs_to(&self, shared: &Arc<Shared<A, T>>) -> bool {
        Arc::ptr_eq(&self.shared, shared)
    }
}

impl<A, T> Drop for ProviderHandle<A, T> {
    fn drop(&mut self) {
        self.shared.remove_provider(self.id);
    }
}

impl<A: fmt::Debug, T> fmt::Debug for ProviderHandle<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("id", &self.id)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}
