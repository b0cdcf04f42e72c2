//! Services module
//!
//! Integrations with services outside Hangar.

mod frontend;

pub use frontend::{forwardable_headers, FrontendClient, MAX_REQUEST_BODY};
