//! Value types carried through the queue: routing tags and payloads.

/// Equality-compared routing key identifying one class of resource.
///
/// A tag has no identity beyond its wrapped value: two tags wrapping equal
/// resource identifiers route to the same listeners. Matching is exact
/// equality, with no wildcard or hierarchical semantics.
///
/// # Examples
/// ```rust
/// use notiq::Tag;
///
/// let speed = Tag::new("speed");
/// assert_eq!(speed, Tag::new("speed"));
/// assert_ne!(speed, Tag::new("altitude"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag<A> {
    resource_id: A,
}

impl<A> Tag<A> {
    /// Wraps a resource identifier in a tag.
    #[must_use]
    pub const fn new(resource_id: A) -> Self {
        Self { resource_id }
    }

    /// Returns the wrapped resource identifier.
    #[must_use]
    pub const fn resource_id(&self) -> &A {
        &self.resource_id
    }

    /// Consumes the tag, returning the wrapped resource identifier.
    #[must_use]
    pub fn into_inner(self) -> A {
        self.resource_id
    }
}

/// One immutable payload value destined for listeners of a matching tag.
///
/// The payload is moved into the queue once at publish time; every listener
/// matched during a dispatch pass observes the same value by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification<T> {
    data: T,
}

impl<T> Notification<T> {
    /// Wraps a payload value in a notification.
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { data }
    }

    /// Returns the wrapped payload.
    #[must_use]
    pub const fn data(&self) -> &T {
        &self.data
    }

    /// Consumes the notification, returning the wrapped payload.
    #[must_use]
    pub fn into_data(self) -> T {
        self.data
    }
}
