//! Dotted data paths, array-crossing analysis, and indexed-path rendering.
//!
//! Paths are dot-separated segment names. There is no escaping of literal
//! dots. Indexed paths additionally carry `segment[N]`, which is produced by
//! [`render_indexed_path`] rather than written by hand.

mod crossings;
mod indexed;
mod navigate;
mod segment;

pub use crossings::{analyze_array_crossings, ArrayCrossing};
pub use indexed::{render_indexed_path, IndexedPath};
pub use navigate::{navigate, navigate_indexed};
pub use segment::{parse_indexed_path, segment_count, PathSegment};
