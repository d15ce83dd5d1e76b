//! The `resources` descriptor: which resource types an installation exposes.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::error::ApiError;

/// How a resource type can be archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Supports `index`: browse it page by page.
    Paginated,
    /// Supports `get` but not `index`: a single document.
    Singleton,
    /// Exposes neither; nothing to archive.
    Unbrowsable,
}

/// One entry of the descriptor.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ResourceInfo {
    /// Browse URL as supplied by the server, usually an absolute path.
    #[serde(default)]
    pub url: Option<String>,
    /// Actions the resource supports (`index`, `get`, `post`, ...).
    #[serde(default)]
    pub actions: Vec<String>,
}

impl ResourceInfo {
    /// Classifies the resource by its supported actions.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        let supports = |action: &str| self.actions.iter().any(|a| a == action);
        if supports("index") {
            ResourceKind::Paginated
        } else if supports("get") {
            ResourceKind::Singleton
        } else {
            ResourceKind::Unbrowsable
        }
    }
}

/// Resource types exposed by an installation, in server order.
#[derive(Debug, Clone, Default)]
pub struct ResourceDescriptor {
    entries: Vec<(String, ResourceInfo)>,
}

impl ResourceDescriptor {
    /// Decodes the descriptor document fetched from `url`.
    ///
    /// Entries whose shape cannot be read are kept as [`ResourceKind::Unbrowsable`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnexpectedShape`] if the document is not an object.
    pub fn from_value(url: &str, value: Value) -> Result<Self, ApiError> {
        let map = match value {
            Value::Object(map) => map,
            other => return Err(ApiError::unexpected_shape(url, "a JSON object", &other)),
        };

        let entries = map
            .into_iter()
            .map(|(name, entry)| {
                let info = serde_json::from_value(entry).unwrap_or_else(|e| {
                    warn!(resource = %name, error = %e, "unreadable resource descriptor entry");
                    ResourceInfo::default()
                });
                (name, info)
            })
            .collect();
        Ok(Self { entries })
    }

    /// Iterates over `(name, info)` pairs in server order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResourceInfo)> {
        self.entries.iter().map(|(name, info)| (name.as_str(), info))
    }

    /// Number of resource types listed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no resource types are listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_from_actions() {
        let paginated = ResourceInfo {
            url: None,
            actions: vec!["index".into(), "get".into()],
        };
        let singleton = ResourceInfo {
            url: None,
            actions: vec!["get".into()],
        };
        assert_eq!(paginated.kind(), ResourceKind::Paginated);
        assert_eq!(singleton.kind(), ResourceKind::Singleton);
        assert_eq!(ResourceInfo::default().kind(), ResourceKind::Unbrowsable);
    }

    #[test]
    fn test_from_value_keeps_server_order_and_tolerates_odd_entries() {
        let descriptor = ResourceDescriptor::from_value(
            "http://x/api/resources",
            json!({
                "site": {"controller": "site", "actions": ["get"]},
                "tags": {"record_type": "Tag", "actions": ["index", "get"], "url": "/api/tags"},
                "broken": {"actions": "index"}
            }),
        )
        .unwrap();

        let names: Vec<&str> = descriptor.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["site", "tags", "broken"]);
        let (_, tags) = descriptor.iter().nth(1).unwrap();
        assert_eq!(tags.url.as_deref(), Some("/api/tags"));
        let (_, broken) = descriptor.iter().nth(2).unwrap();
        assert_eq!(broken.kind(), ResourceKind::Unbrowsable);
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let result = ResourceDescriptor::from_value("http://x/api/resources", json!([]));
        assert!(matches!(result, Err(ApiError::UnexpectedShape { .. })));
    }
}
