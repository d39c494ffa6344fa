//! Shared types for the jewelry catalog admin.
//!
//! Everything here is free of IO so that both the wasm frontend and the
//! axum backend can use it, and so the resource controller state machines
//! can be tested natively.

pub mod domain;
pub mod shared;
pub mod system;
