use std::borrow::Cow;

/// Errors that can occur during queue operations.
///
/// The taxonomy is intentionally small: stale-handle updates and
/// unknown-token removals are silent no-ops by contract, and listener panics
/// are not caught by the engine. What remains is reentrancy, which the
/// original callback contract left undefined and this crate detects and
/// rejects instead of deadlocking.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// A listener callback attempted to mutate the listener registry of the
    /// queue that is currently invoking it. The registry lock is held for the
    /// whole dispatch pass, so the mutation could never be granted.
    #[error("Reentrant listener mutation{}: {message}", format_context(.context))]
    ReentrantMutation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A listener callback attempted to block until the queue drained. The
    /// dispatch worker is the only thread that drains it, so the wait could
    /// never make progress.
    #[error("Reentrant wait{}: {message}", format_context(.context))]
    ReentrantWait { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
