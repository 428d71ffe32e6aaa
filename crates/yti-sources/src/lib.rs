//! Source adapters producing normalized time entries.
//!
//! Each adapter turns raw records from one time-tracking source into
//! [`yti_core::TimeEntry`] batches, preserving source order:
//! - [`manictime`]: ManicTime tag CSV exports
//! - [`toggl`]: Toggl detailed CSV exports and the Toggl Reports API
//!
//! Date arguments for API pulls are handled by [`date_range`].

use std::io::Read;

use thiserror::Error;

use yti_core::{EntryError, SourceKind, TimeEntry};

pub mod date_range;
pub mod manictime;
pub mod toggl;

/// Failures loading a batch of entries from a source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A CSV record could not be read.
    #[error("failed to read CSV record {index}")]
    Csv {
        index: usize,
        #[source]
        source: csv::Error,
    },

    /// A record was read but could not be normalized.
    #[error("invalid record {index}")]
    Entry {
        index: usize,
        #[source]
        source: EntryError,
    },

    /// The Toggl API request failed.
    #[error("toggl API request failed")]
    Http(#[from] reqwest::Error),

    /// The Toggl API answered with something unexpected.
    #[error("unexpected toggl API response: {message}")]
    InvalidResponse { message: String },
}

/// Reads every CSV record into a normalized entry, in file order.
///
/// Header names become the raw field names verbatim, so each source's
/// field mapping in `yti-core` sees exactly what the export contains.
pub(crate) fn entries_from_csv<R: Read>(
    kind: SourceKind,
    reader: R,
) -> Result<Vec<TimeEntry>, SourceError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|source| SourceError::Csv { index: 0, source })?
        .clone();

    let mut entries = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let index = index + 1;
        let record = record.map_err(|source| SourceError::Csv { index, source })?;
        let raw = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        let entry = TimeEntry::from_raw(kind, raw)
            .map_err(|source| SourceError::Entry { index, source })?;
        entries.push(entry);
    }
    tracing::debug!(source = %kind, count = entries.len(), "loaded entries");
    Ok(entries)
}
