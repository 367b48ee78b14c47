//! Calendar retrieval for kalender.
//!
//! - [`CalendarSource`]: the trait every source implements
//! - [`parse_ics_content`]: iCalendar text to the engine's entry map
//! - [`IcsFileSource`], [`StaticSource`], [`ErrorSource`]: built-in sources
//! - [`ProviderError`]: retrieval failures
//!
//! ```text
//!  .ics files ──► IcsFileSource ─┐
//!  in-memory ───► StaticSource ──┼──► EventMap ──► Pipeline::run_fetched
//!                 ErrorSource ───┘
//! ```

pub mod error;
pub mod ics;
pub mod source;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use ics::{IcsTime, parse_duration, parse_ics_content, parse_ics_datetime};
pub use source::{BoxFuture, CalendarSource, ErrorSource, IcsFileSource, StaticSource, fetch_all};
