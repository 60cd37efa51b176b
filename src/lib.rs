//! Static "what calls what" analysis over a low-code automation platform dump.
//!
//! A [`dump::LaneState`] snapshot is compiled into a typed [`graph::Graph`] by
//! [`graph::build_graph`]; the [`analyzer::Analyzer`] answers named queries on
//! top of the generic walk engine in [`graph::walk`].

pub mod analyzer;
pub mod config;
pub mod dump;
pub mod error;
pub mod graph;
