//! `pe-screen` library crate.
//!
//! The binary (`pe`) is a thin wrapper around this library so that:
//!
//! - screening and PEG logic is testable without spawning processes
//! - results come back as structured values; text rendering lives in `report`

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod growth;
pub mod io;
pub mod report;
pub mod screen;
