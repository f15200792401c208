#![forbid(unsafe_code)]

//! Core: geometry primitives and input debouncing shared by the layout and
//! virtualization crates.

pub mod debounce;
pub mod geometry;

pub use debounce::{DebounceAction, DebounceConfig, Debouncer};
pub use geometry::{ItemRect, Span};
