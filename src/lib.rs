//! Command line front end for the forum markup engine: project configuration, an offline title
//! catalog and the parse/render pipeline.

pub mod config;
pub mod pipeline;
pub mod titles;
