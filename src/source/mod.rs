//! Feed source abstraction layer.
//!
//! This module defines the [`FeedSource`] trait and the common [`Entry`]
//! type.  The only concrete source is [`RssSource`], which speaks RSS 2.0 and
//! falls back to Atom.
//!
//! ## For contributors
//!
//! The poll loop is generic over [`FeedSource`], so tests substitute an
//! in-memory source instead of hitting the network.  A new source only has to
//! turn its native format into [`Entry`] values; id extraction and
//! de-duplication happen downstream.

mod entry;
mod rss;

pub use self::entry::{extract_id, sequence_number, Entry};
pub use self::rss::RssSource;

#[cfg(test)]
pub(crate) use entry::tests::make_entry;

use crate::error::Result;

/// Trait that every feed source must implement.
///
/// The poll loop awaits [`fetch()`](FeedSource::fetch) once per cycle and
/// never calls it concurrently.
pub trait FeedSource {
    /// Human-readable label used in log lines.
    fn name(&self) -> &str;

    /// Fetch the current batch of entries.
    ///
    /// Any transport or parse problem is reported as
    /// [`RelayError::Fetch`](crate::error::RelayError::Fetch).
    async fn fetch(&self) -> Result<Vec<Entry>>;
}
