//! Calendar backends and event normalization.
//!
//! - [`CalendarApi`] - the trait every calendar backend implements
//! - [`homeassistant`] - the Home Assistant REST backend
//! - [`normalize_events`] - raw payloads to the sorted agenda event list
//! - [`ProviderError`] - error type for backend operations
//!
//! ```text
//! ┌──────────────────┐
//! │  Home Assistant  │
//! └────────┬─────────┘
//!          │ GET api/calendars/{entity}
//!          ▼
//! ┌──────────────────────┐
//! │ HomeAssistantProvider│  CalendarApi
//! └────────┬─────────────┘
//!          │ Vec<RawEvent>
//!          ▼ normalize_events()
//! ┌──────────────────┐
//! │ Vec<CalendarEvent>│
//! └──────────────────┘
//! ```

pub mod error;
#[cfg(feature = "homeassistant")]
pub mod homeassistant;
pub mod normalize;
pub mod provider;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use normalize::normalize_events;
pub use provider::{BoxFuture, CalendarApi, decode_events};
