//! The queue engine: registries, pending FIFO, and the dispatch worker.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle, ThreadId};

use fxhash::FxHashMap;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

use crate::error::QueueError;
use crate::handle::ProviderHandle;
use crate::listener::{ListenerSet, ListenerToken};
use crate::notification::{Notification, Tag};

pub(crate) type ProviderId = u64;

const WORKER_NAME: &str = "notiq-dispatch";

/// Dispatch worker lifecycle. The only transition is Running → ShuttingDown,
/// triggered by [`EventQueue`] disposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    ShuttingDown,
}

/// Producer registry, pending FIFO, and worker phase, guarded by one lock:
/// enqueue reads the registry, so their mutations serialize together.
struct QueueState<A, T> {
    providers: FxHashMap<ProviderId, Tag<A>>,
    pending: VecDeque<(Tag<A>, Notification<T>)>,
    phase: Phase,
    /// True while the worker delivers a popped entry. `wait_until_empty`
    /// treats an in-flight entry as not yet drained, so a return from the
    /// wait means every previously enqueued notification was delivered.
    in_flight: bool,
    next_provider: ProviderId,
}

pub(crate) struct Shared<A, T> {
    state: Mutex<QueueState<A, T>>,
    /// Single condition for both wakeup directions: the worker waits on it
    /// for "shutting down or non-empty", `wait_until_empty` for "drained".
    /// Notified broadly after enqueue, delivery, and shutdown.
    event_cond: Condvar,
    /// Listener registry under its own lock, so a long dispatch scan never
    /// blocks producer registration or enqueue.
    listeners: Mutex<ListenerSet<A, T>>,
    /// Recorded once by the worker before it processes anything; used to
    /// detect reentrant calls out of listener callbacks.
    worker_thread: OnceLock<ThreadId>,
}

impl<A, T> Shared<A, T> {
    /// Removes a producer registration. Idempotent: unknown ids are ignored.
    pub(crate) fn remove_provider(&self, id: ProviderId) {
        let removed = self.state.lock().providers.remove(&id).is_some();
        if removed {
            debug!(provider = id, "provider deregistered");
        }
    }

    fn on_worker_thread(&self) -> bool {
        self.worker_thread.get().copied() == Some(thread::current().id())
    }
}

impl<A, T> Shared<A, T>
where
    A: Clone + PartialEq,
{
    /// Enqueues under the tag captured at registration time. A stale id
    /// (producer removed, queue shutting down) drops the value silently.
    pub(crate) fn enqueue(&self, id: ProviderId, notification: Notification<T>) {
        {
            let mut state = self.state.lock();
            if state.phase == Phase::ShuttingDown {
                trace!(provider = id, "update after shutdown dropped");
                return;
            }
            let Some(tag) = state.providers.get(&id) else {
                trace!(provider = id, "update from removed provider dropped");
                return;
            };
            let tag = tag.clone();
            state.pending.push_back((tag, notification));
        }
        self.event_cond.notify_all();
    }

    /// Worker loop: wait for "shutting down or non-empty", pop exactly one
    /// entry, release the queue lock, then scan the listener registry and
    /// invoke every matching callback in registration order.
    fn dispatch_loop(&self) {
        let _ = self.worker_thread.set(thread::current().id());

        loop {
            let (tag, notification) = {
                let mut state = self.state.lock();
                loop {
                    if state.phase == Phase::ShuttingDown {
                        if !state.pending.is_empty() {
                            debug!(
                                discarded = state.pending.len(),
                                "shutdown with undelivered notifications"
                            );
                        }
                        return;
                    }
                    if let Some(entry) = state.pending.pop_front() {
                        state.in_flight = true;
                        break entry;
                    }
                    self.event_cond.wait(&mut state);
                }
            };

            // The queue lock is released here; only the listener lock is held
            // while callbacks run.
            {
                let listeners = self.listeners.lock();
                let mut matched = 0_usize;
                for entry in listeners.matching(&tag) {
                    (entry.notify)(&notification);
                    matched += 1;
                }
                trace!(matched, "notification dispatched");
            }

            self.state.lock().in_flight = false;
            self.event_cond.notify_all();
        }
    }
}

/// Thread-safe notification queue with a single dispatch worker.
///
/// Producers register through [`provide`](Self::provide) and push values via
/// their [`ProviderHandle`]; listeners register a tag and a callback through
/// [`listen`](Self::listen). A dedicated worker thread drains the pending
/// FIFO in enqueue order and invokes every listener whose tag equals the
/// entry's tag. Delivery is at-most-once and fire-and-forget: no listener
/// acknowledgment, no retry, and no catching of listener panics.
///
/// Both registries can be mutated from any thread while the worker runs. The
/// one restriction is reentrancy: a listener callback must not call
/// [`listen`](Self::listen), [`remove_listener`](Self::remove_listener), or
/// [`wait_until_empty`](Self::wait_until_empty) on the queue that is invoking
/// it; such calls are detected and rejected with a [`QueueError`].
/// [`provide`](Self::provide) and handle updates remain legal inside
/// callbacks.
///
/// Dropping the queue shuts the worker down; notifications still queued at
/// that point are discarded.
///
/// # Examples
/// ```rust
/// use notiq::{EventQueue, Tag};
/// use std::sync::{Arc, Mutex};
///
/// # fn main() -> Result<(), notiq::QueueError> {
/// let queue = EventQueue::<&str, u32>::new();
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// queue.listen(Tag::new("speed"), move |n| sink.lock().unwrap().push(*n.data()))?;
///
/// let speed = queue.provide(Tag::new("speed"));
/// speed.update(98);
/// speed.update(100);
///
/// queue.wait_until_empty()?;
/// assert_eq!(*seen.lock().unwrap(), [98, 100]);
/// # Ok(())
/// # }
/// ```
pub struct EventQueue<A, T> {
    shared: Arc<Shared<A, T>>,
    worker: Option<JoinHandle<()>>,
}

impl<A, T> EventQueue<A, T>
where
    A: Clone + PartialEq + Send + 'static,
    T: Send + 'static,
{
    /// Creates a queue and starts its dispatch worker thread.
    ///
    /// # Panics
    /// Panics if the worker thread cannot be spawned. Resource exhaustion at
    /// construction is the one unrecoverable failure mode of the queue.
    #[must_use]
    pub fn new() -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                providers: FxHashMap::default(),
                pending: VecDeque::new(),
                phase: Phase::Running,
                in_flight: false,
                next_provider: 0,
            }),
            event_cond: Condvar::new(),
            listeners: Mutex::new(ListenerSet::new()),
            worker_thread: OnceLock::new(),
        });

        let worker = thread::Builder::new()
            .name(WORKER_NAME.into())
            .spawn({
                let shared = Arc::clone(&shared);
                move || shared.dispatch_loop()
            })
            .expect("failed to spawn dispatch worker thread");

        Self { shared, worker: Some(worker) }
    }

    /// Registers a producer of the given tag and returns its handle.
    ///
    /// The tag is captured now and never re-read: notifications enqueued
    /// through the handle route under this tag even if the registry changes
    /// concurrently. Dropping the returned handle deregisters the producer.
    #[must_use = "dropping the handle immediately deregisters the producer"]
    pub fn provide(&self, tag: Tag<A>) -> ProviderHandle<A, T> {
        let id = {
            let mut state = self.shared.state.lock();
            let id = state.next_provider;
            state.next_provider += 1;
            state.providers.insert(id, tag.clone());
            id
        };
        debug!(provider = id, "provider registered");
        ProviderHandle::new(Arc::clone(&self.shared), id, tag)
    }

    /// Explicitly deregisters a producer.
    ///
    /// Equivalent to dropping the handle; provided for call sites that want
    /// the removal to read as an operation on the queue.
    pub fn remove_provider(&self, handle: ProviderHandle<A, T>) {
        debug_assert!(handle.belongs_to(&self.shared), "handle from a different queue");
        drop(handle);
    }

    /// Registers a listener for the given tag.
    ///
    /// The callback runs on the dispatch worker thread, once per matching
    /// notification, in registration order within each dispatch pass.
    /// Registering the same tag twice yields two independent registrations
    /// that each deliver. The queue never removes a listener on its own: the
    /// caller must [`remove_listener`](Self::remove_listener) before any
    /// state captured by the callback becomes invalid.
    ///
    /// # Errors
    /// Returns [`QueueError::ReentrantMutation`] when called from inside a
    /// listener callback of this queue.
    pub fn listen<F>(&self, tag: Tag<A>, callback: F) -> Result<ListenerToken, QueueError>
    where
        F: Fn(&Notification<T>) + Send + 'static,
    {
        if self.shared.on_worker_thread() {
            return Err(QueueError::ReentrantMutation {
                message: "listener registry is locked for dispatch".into(),
                context: Some("listen".into()),
            });
        }
        let token = self.shared.listeners.lock().insert(tag, Box::new(callback));
        debug!(?token, "listener registered");
        Ok(token)
    }

    /// Removes a listener registration.
    ///
    /// Removing a token that is not currently registered is a no-op, not an
    /// error.
    ///
    /// # Errors
    /// Returns [`QueueError::ReentrantMutation`] when called from inside a
    /// listener callback of this queue; a listener cannot remove itself or
    /// any other listener from its own callback.
    pub fn remove_listener(&self, token: ListenerToken) -> Result<(), QueueError> {
        if self.shared.on_worker_thread() {
            return Err(QueueError::ReentrantMutation {
                message: "listener registry is locked for dispatch".into(),
                context: Some("remove_listener".into()),
            });
        }
        if self.shared.listeners.lock().remove(token) {
            debug!(?token, "listener removed");
        } else {
            trace!(?token, "remove of unknown listener ignored");
        }
        Ok(())
    }

    /// Blocks until the queue is drained: no pending entries and no delivery
    /// in flight.
    ///
    /// This is a point-in-time guarantee. Nothing prevents other producers
    /// from enqueuing immediately after the wait returns, so it is advisory
    /// for callers whose producers have already stopped, not a barrier
    /// against concurrent ones.
    ///
    /// # Errors
    /// Returns [`QueueError::ReentrantWait`] when called from inside a
    /// listener callback of this queue.
    pub fn wait_until_empty(&self) -> Result<(), QueueError> {
        if self.shared.on_worker_thread() {
            return Err(QueueError::ReentrantWait {
                message: "the dispatch worker cannot wait for its own queue".into(),
                context: None,
            });
        }
        let mut state = self.shared.state.lock();
        while !state.pending.is_empty() || state.in_flight {
            self.shared.event_cond.wait(&mut state);
        }
        Ok(())
    }
}

impl<A, T> Default for EventQueue<A, T>
where
    A: Clone + PartialEq + Send + 'static,
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A, T> Drop for EventQueue<A, T> {
    fn drop(&mut self) {
        self.shared.state.lock().phase = Phase::ShuttingDown;
        self.shared.event_cond.notify_all();

        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            warn!("dispatch worker was terminated early by a listener panic");
        }
    }
}

impl<A, T> fmt::Debug for EventQueue<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue").finish_non_exhaustive()
    }
}
