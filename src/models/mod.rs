//! Request and response types

mod types;

pub use types::*;
