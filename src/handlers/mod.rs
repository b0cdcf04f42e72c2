//! Request handlers

pub mod cookies;
pub mod frontend;
