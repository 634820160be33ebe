//! Test utilities for komposit.
//!
//! Provides a scripted stand-in for `cmake`, temporary project fixtures and
//! guards for tests that touch the process environment.

pub mod env_lock;
pub mod env_var_guard;
pub mod fake_cmake;
pub mod project;

pub use fake_cmake::FakeCmake;
pub use project::ProjectFixture;
