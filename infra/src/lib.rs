//! Shared plumbing for the point-of-sale front end: typed identifiers and
//! the small JSON document store that stands in for browser storage.

pub mod ids;
pub mod persistence;
