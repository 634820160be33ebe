#![forbid(unsafe_code)]

//! Shared environment constants used across komposit crates (library, tests,
//! and helpers).

/// Environment variable override for the `CMake` executable.
///
/// When set, the build step invokes this program instead of `cmake` from
/// `PATH`. Integration tests point it at a scripted stand-in.
///
/// # Examples
///
/// ```
/// use cmake_env::CMAKE_ENV;
/// let mut command = std::process::Command::new("komposit");
/// command.env(CMAKE_ENV, "/opt/cmake/bin/cmake");
/// assert!(command.get_envs().any(|(key, _)| key == CMAKE_ENV));
/// ```
pub const CMAKE_ENV: &str = "KOMPOSIT_CMAKE";

/// Name of the `CMake` executable resolved from `PATH` by default.
pub const CMAKE_PROGRAM: &str = "cmake";
