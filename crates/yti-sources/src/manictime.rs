//! ManicTime CSV adapter.
//!
//! Reads a ManicTime tag export: `Name` holds comma-separated tags (the
//! text searched for an issue key and for the ignore marker), `Notes` the
//! description, `Start` a `%d/%m/%Y %H:%M:%S` timestamp, and `Duration` an
//! `H:MM:SS` clock string.

use std::io::Read;

use yti_core::{SourceKind, TimeEntry};

use crate::{SourceError, entries_from_csv};

/// Loads every row of a ManicTime CSV export, in file order.
pub fn load<R: Read>(reader: R) -> Result<Vec<TimeEntry>, SourceError> {
    entries_from_csv(SourceKind::ManicTime, reader)
}
