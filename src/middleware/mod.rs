//! Middleware module for the Hangar gateway
//!
//! Contains the route guard and the path matcher that scopes it.

mod guard;
mod matcher;

pub use guard::{
    authorize, route_guard, strip_bearer, AuthEvidence, GuardDecision, GuardRequest, RouteGuard,
    BEARER_PREFIX, TOKEN_COOKIE_NAME,
};
pub use matcher::PathMatcher;
