//! Language, scheme, and UI string tables
//!
//! The app is localized into five languages. Each speech engine wants its own
//! locale code, so [`Language`] maps one application identifier onto:
//! - a BCP-47 tag for live recognition and synthesis (`hi-IN`)
//! - a two-letter code for cloud transcription (`hi`)
//!
//! Resolution is total: an unknown identifier resolves to English.

mod language;
mod scheme;
mod strings;

pub use language::Language;
pub use scheme::{ApplicationMode, Scheme};
pub use strings::UiStrings;
