//! User-Agent string sent with every API and asset request.

/// Tool identification appended after the version.
const UA_COMMENT: &str = "archival-tool";

/// Default User-Agent identifying the archiver to the remote Omeka server.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("omeka-archive/{version} ({UA_COMMENT})")
}
