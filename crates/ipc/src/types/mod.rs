//! Observable state published by the engine.

mod cart;
mod state;

pub use cart::*;
pub use state::*;
