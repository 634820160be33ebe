//! Komposit core library.
//!
//! Loads `komposit.yaml` project configuration, resolves variants into
//! component graphs, generates `CMake` build scripts for them and runs the
//! configured pipeline incrementally.

pub mod cli;
pub mod cmake_gen;
pub mod config;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod runner;
pub mod status;
pub mod traceability;
