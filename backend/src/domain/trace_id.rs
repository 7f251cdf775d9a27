//! Correlation identifier carried by every request.
//!
//! The [`Trace`](crate::Trace) middleware puts a [`TraceId`] in task-local
//! storage for the lifetime of a request. Domain errors read it when they are
//! built, so error payloads and log lines can be matched without threading
//! the identifier through every call.
//!
//! Task-locals do not cross `tokio::spawn`. Work handed to another task,
//! such as queued mail delivery, captures [`TraceId::current`] and re-enters
//! it with [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    pub(crate) static TRACE_ID: TraceId;
}

/// Request and response header carrying the trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Per-request correlation identifier.
///
/// # Examples
/// ```
/// use edunexus::TraceId;
///
/// async fn handler() {
///     if let Some(id) = TraceId::current() {
///         tracing::info!(trace_id = %id, "placing order");
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// A fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Accept an identifier supplied by a caller in the [`TRACE_ID_HEADER`]
    /// header. Values that are not UUIDs, and the nil UUID, are ignored.
    #[must_use]
    pub fn from_header(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim())
            .ok()
            .filter(|uuid| !uuid.is_nil())
            .map(Self)
    }

    /// The identifier in scope for the running task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    /// Inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Run `fut` with `trace_id` in scope.
    ///
    /// # Examples
    /// ```
    /// use edunexus::TraceId;
    ///
    /// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
    /// let trace_id = TraceId::generate();
    /// let observed = TraceId::scope(trace_id, async { TraceId::current() }).await;
    /// assert_eq!(observed, Some(trace_id));
    /// # });
    /// ```
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }

    /// Run `fut` inside `trace_id` when one is given, otherwise as is.
    pub async fn scope_optional<Fut>(trace_id: Option<Self>, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        match trace_id {
            Some(id) => Self::scope(id, fut).await,
            None => fut.await,
        }
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
