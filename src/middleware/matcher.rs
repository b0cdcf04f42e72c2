//! Protected path matcher
//!
//! Decides which requests the route guard runs on. Patterns are either exact
//! paths (`/login`) or a prefix followed by a trailing wildcard segment
//! (`/dashboard/:path*`), which matches the prefix itself and anything below
//! it, but not sibling paths such as `/dashboardx`.

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pattern {
    prefix: String,
    wildcard: bool,
}

impl Pattern {
    fn parse(raw: &str) -> AppResult<Self> {
        let raw = raw.trim();
        if !raw.starts_with('/') {
            return Err(AppError::Config(format!(
                "guard matcher '{raw}' must start with '/'"
            )));
        }

        let (prefix, wildcard) = match raw.rsplit_once("/:") {
            Some((prefix, param)) => {
                let name = param.strip_suffix('*').ok_or_else(|| {
                    AppError::Config(format!(
                        "guard matcher '{raw}' may only end in a wildcard parameter"
                    ))
                })?;
                if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(AppError::Config(format!(
                        "guard matcher '{raw}' has an invalid parameter name"
                    )));
                }
                (prefix, true)
            }
            None => (raw, false),
        };

        if prefix.contains(':') {
            return Err(AppError::Config(format!(
                "guard matcher '{raw}' may only end in a wildcard parameter"
            )));
        }

        Ok(Self {
            prefix: prefix.to_string(),
            wildcard,
        })
    }

    fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some("") => true,
            Some(rest) => self.wildcard && (rest.starts_with('/') || self.prefix.is_empty()),
            None => false,
        }
    }
}

/// Path as the dashboard frontend will resolve it: percent-decoded, with
/// empty and `.` segments dropped and `..` segments applied.
pub fn normalize_path(raw: &str) -> String {
    let decoded = urlencoding::decode_binary(raw.as_bytes());
    let decoded = String::from_utf8_lossy(&decoded);

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }

    format!("/{}", segments.join("/"))
}

/// Compiled set of guard path patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatcher {
    patterns: Vec<Pattern>,
}

impl PathMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> AppResult<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::parse(p.as_ref()))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Whether the guard should run for this request path
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }

    /// Static prefixes of the patterns, used for the guard's own path check
    pub fn prefixes(&self) -> Vec<String> {
        self.patterns.iter().map(|p| p.prefix.clone()).collect()
    }
}
