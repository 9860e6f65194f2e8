//! Journaling system for recording what happened in a challenge.

pub mod entry;
pub mod log;

pub use entry::JournalEntry;
pub use log::Journal;
