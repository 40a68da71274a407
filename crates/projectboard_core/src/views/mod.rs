//! Derived read models for the presentation surfaces.
//!
//! Every function here is pure: it takes slices handed out by the store and
//! returns freshly built values, never touching the collections themselves.

pub mod board;
pub mod calendar;
pub mod gantt;
pub mod notes;
pub mod progress;
pub mod timeline;
