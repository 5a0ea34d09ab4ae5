//! API implementation submodules.
//!
//! Each submodule contains `impl AppSearch` blocks that extend the public API
//! with one area of functionality. The struct definition remains in `lib.rs`.

mod builder;
mod launches;
mod search;
mod updates;

pub use builder::AppSearchBuilder;
