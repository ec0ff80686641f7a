//! Subscription target parsing from client navigation paths.

use serde::{Deserialize, Serialize};

/// The resource a live connection wants update notifications for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionTarget {
    /// Identifier of the watched resource.
    pub resource_id: String,
}

impl SubscriptionTarget {
    /// Creates a target for the given resource id.
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
        }
    }

    /// Parses a client path (or full URL) against a resource prefix such as `/products/`.
    ///
    /// Only `<prefix><id>` (optionally followed by a trailing slash, further
    /// segments, a query or a fragment) subscribes. Any other path yields `None`.
    pub fn parse(url: &str, prefix: &str) -> Option<Self> {
        let path = strip_origin(url.trim());
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        let rest = path.strip_prefix(prefix)?;
        let id = rest.split('/').next().unwrap_or_default();
        if id.is_empty() {
            return None;
        }
        Some(Self::new(id))
    }

    /// Whether this target watches the given resource.
    pub fn matches(&self, resource_id: &str) -> bool {
        self.resource_id == resource_id
    }
}

/// Drops `scheme://host[:port]` from a full URL, leaving the path.
fn strip_origin(url: &str) -> &str {
    match url.find("://") {
        Some(scheme_end) => {
            let after = &url[scheme_end + 3..];
            match after.find('/') {
                Some(path_start) => &after[path_start..],
                None => "/",
            }
        }
        None => url,
    }
}
