//! Command types for IPC messages.

mod decal;
mod pointer;

pub use decal::*;
pub use pointer::*;
