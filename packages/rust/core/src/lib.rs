//! README aggregation for foldertoc.
//!
//! Scans the project root for top-level folders, merges them into the
//! managed region of the root README, and writes it back (`regenerate`) or
//! reports whether it is stale (`check`).

pub mod merge;
pub mod regenerate;
pub mod scan;

pub use regenerate::{check, regenerate};
