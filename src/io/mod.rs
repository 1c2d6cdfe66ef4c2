//! Input/output helpers.
//!
//! - extract discovery by file-name convention (`discover`)
//! - raw extract decoding + parsing (`raw`)
//! - reconciled-table cache read/write (`cache`)

pub mod cache;
pub mod discover;
pub mod raw;

pub use cache::*;
pub use discover::*;
pub use raw::*;
