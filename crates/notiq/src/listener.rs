//! Listener registrations: tokens, callback storage, and tag matching.

use std::fmt;

use crate::notification::{Notification, Tag};

/// Opaque identity of one listener registration.
///
/// Returned by [`EventQueue::listen`](crate::EventQueue::listen) and consumed
/// by [`EventQueue::remove_listener`](crate::EventQueue::remove_listener).
/// Every registration gets a fresh token, so duplicate registrations of the
/// same tag and callback are removable independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(u64);

impl ListenerToken {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Boxed listener callback, invoked on the dispatch worker thread.
pub(crate) type Callback<T> = Box<dyn Fn(&Notification<T>) + Send>;

pub(crate) struct ListenerEntry<A, T> {
    pub(crate) token: ListenerToken,
    pub(crate) tag: Tag<A>,
    pub(crate) notify: Callback<T>,
}

/// Insertion-ordered listener registry.
///
/// Delivery order within one dispatch pass is registration order, so a `Vec`
/// rather than a map: removal is rare compared to scanning.
pub(crate) struct ListenerSet<A, T> {
    entries: Vec<ListenerEntry<A, T>>,
    next_token: u64,
}

impl<A, T> ListenerSet<A, T> {
    pub(crate) const fn new() -> Self {
        Self { entries: Vec::new(), next_token: 0 }
    }

    /// Appends a registration and returns its token.
    pub(crate) fn insert(&mut self, tag: Tag<A>, notify: Callback<T>) -> ListenerToken {
        let token = ListenerToken::new(self.next_token);
        self.next_token += 1;
        self.entries.push(ListenerEntry { token, tag, notify });
        token
    }

    /// Removes the registration with the given token, if present.
    pub(crate) fn remove(&mut self, token: ListenerToken) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.token != token);
        before != self.entries.len()
    }

    /// Iterates registrations whose tag equals `tag`, in registration order.
    pub(crate) fn matching<'a>(
        &'a self,
        tag: &'a Tag<A>,
    ) -> impl Iterator<Item = &'a ListenerEntry<A, T>>
    where
        A: PartialEq,
    {
        self.entries.iter().filter(move |entry| entry.tag == *tag)
    }
}

impl<A: fmt::Debug, T> fmt::Debug for ListenerSet<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.entries.len())
            .field("next_token", &self.next_token)
            .finish_non_exhaustive()
    }
}
