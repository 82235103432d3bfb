//! Output Generation
//!
//! Run report collection and JSON output.

pub mod report;

pub use report::*;
