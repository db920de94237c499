//! File-format interfaces owned by the core.
//!
//! Raster and CSV I/O belong to upstream collaborators; the only format
//! parsed here is the MIRCA condensed crop calendar.

mod mirca;

pub use mirca::{
    parse_condensed_crop_calendar, parse_condensed_crop_calendar_reader, MircaRecord,
    DEFAULT_HEADER_LINES,
};
