//! Renders parsed forum markup to html and to plain text meta descriptions.
//!
//! Titles of referenced games, movies, submissions and topics are looked up through a
//! [lookup::LookupProvider] before the (synchronous) render walk starts.

/// Renderer settings: site host, route templates and language aliases.
pub mod config;

/// Code block language names.
pub mod languages;

/// The title lookup seam and reference collection.
pub mod lookup;

/// Html and meta description renderers.
pub mod renderers;

pub mod timing;

pub mod video;

/// Html output sinks.
pub mod writer;

pub use config::{RenderSettings, Routes};
pub use lookup::{EntityKind, LookupProvider, NullLookup, Titles};
pub use renderers::{MarkupRenderer, RenderError};
pub use writer::{HtmlSink, HtmlWriter, WriterError};
