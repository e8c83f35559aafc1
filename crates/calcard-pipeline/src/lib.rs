//! Aggregation pipeline: concurrent fetch, normalization, snapshot cache and
//! new-event notifications.
//!
//! ```ignore
//! let pipeline = AgendaPipeline::new(Arc::new(provider));
//! match pipeline.refresh(&config, Local::now()).await? {
//!     RefreshOutcome::Fetched { snapshot, previous } => {
//!         notifier.notify_new_events(&config, previous.as_deref(), &snapshot).await;
//!     }
//!     RefreshOutcome::Cached(snapshot) => { /* render */ }
//!     RefreshOutcome::Busy => {}
//! }
//! ```

pub mod cache;
pub mod error;
pub mod notify;
pub mod pipeline;

pub use cache::{AgendaCache, CacheKey};
pub use error::{NotifyError, PipelineError, PipelineResult};
pub use notify::{Notification, Notifier, NotifySink, new_events};
pub use pipeline::{AgendaPipeline, AgendaSnapshot, FailureRecord, RefreshOutcome};
