//! Reporting: render screen and PEG results as terminal text.
//!
//! Everything here returns `String`s; printing happens in `app`.

pub mod bars;
pub mod format;

pub use bars::render_distribution_bars;
pub use format::*;
