//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - loaded observations (`Record`) and column/threshold configuration
//! - parsed period keys (`Period`)
//! - screen and PEG outputs (`Screening`, `PegResult`, `PegUnavailable`, etc.)

pub mod period;
pub mod types;

pub use period::*;
pub use types::*;
