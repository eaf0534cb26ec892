//! State management module for Markdown Studio
//!
//! This module contains persisted editor state:
//! - `store`: key-value persistence (`KeyValueStore`, file and memory stores)
//! - `session_state`: restored text and theme mode

mod session_state;
mod store;

pub use session_state::*;
pub use store::*;
