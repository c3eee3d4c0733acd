//! API implementation submodules.
//!
//! Each submodule contains `impl FileWarden` blocks that extend the public API
//! with domain-specific methods. The struct definition remains in `lib.rs`.

mod builder;
mod catalog;
mod checking;
mod repair;

pub use builder::{FileWardenBuilder, StateBackend};
