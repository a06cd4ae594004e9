//! External-collaborator seam
//!
//! The dashboard never talks to a store directly; it consumes these
//! traits. Concrete document/relational store clients live with the
//! excluded data-access layer, so tests and callers inject their own.

pub mod cached;
pub mod trait_def;

pub use cached::CachedSources;
pub use trait_def::{CustomerSource, EventSource, OrderSource};
