//! Deterministic on-disk layout of an archive.
//!
//! Every path is a pure function of the archive root and the ancestry of the
//! node being written (collection id, item id, file id). Segment order
//! encodes the full ancestry, so two distinct records never share a path and
//! re-running an archive reproduces the same paths.
//!
//! ```text
//! site.json
//! collections/<id>/collection.json
//! collections/<id>/items/<id>/item.json
//! collections/<id>/items/<id>/files/<id>/file.json
//! collections/<id>/items/<id>/files/<id>/<rendition><ext>
//! items/<id>/...                      (items archived without a collection)
//! <resource>.json | <resource>/<id>.json
//! ```

use std::fmt::{Display, Write};
use std::path::{Component, Path, PathBuf};

use url::Url;

use crate::record::RecordId;

/// Maximum length (including the dot) of an extension taken from a URL.
const MAX_EXTENSION_LEN: usize = 12;

/// Joins `segments` onto `root`, stringifying each one.
///
/// Each segment becomes exactly one path component: `%`, separators and other
/// characters unsafe in file names are percent-encoded, and the dots of
/// `.`/`..` are encoded too, so server-supplied values can never escape
/// `root`. The encoding is injective: distinct segments stay distinct.
#[must_use]
pub fn build_path(root: &Path, segments: &[&dyn Display]) -> PathBuf {
    segments.iter().fold(root.to_path_buf(), |mut path, segment| {
        path.push(sanitize_segment(&segment.to_string()));
        path
    })
}

/// Where an item lives: under its collection, or under the flat `items/` root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemScope {
    /// The item belongs to the collection with this id.
    Collection(RecordId),
    /// The item is archived without a collection.
    Orphan,
}

/// Computes archive paths relative to a fixed root.
#[derive(Debug, Clone)]
pub struct ArchiveLayout {
    root: PathBuf,
}

impl ArchiveLayout {
    /// Creates a layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The archive root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `site.json`
    #[must_use]
    pub fn site(&self) -> PathBuf {
        build_path(&self.root, &[&"site.json"])
    }

    /// `collections/<cid>/collection.json`
    #[must_use]
    pub fn collection_record(&self, collection: &RecordId) -> PathBuf {
        build_path(&self.root, &[&"collections", collection, &"collection.json"])
    }

    /// `collections/<cid>/items/<iid>` or `items/<iid>`
    #[must_use]
    pub fn item_dir(&self, scope: &ItemScope, item: &RecordId) -> PathBuf {
        match scope {
            ItemScope::Collection(collection) => {
                build_path(&self.root, &[&"collections", collection, &"items", item])
            }
            ItemScope::Orphan => build_path(&self.root, &[&"items", item]),
        }
    }

    /// `<item dir>/item.json`
    #[must_use]
    pub fn item_record(&self, scope: &ItemScope, item: &RecordId) -> PathBuf {
        build_path(&self.item_dir(scope, item), &[&"item.json"])
    }

    /// `<item dir>/files/<fid>`
    #[must_use]
    pub fn file_dir(&self, scope: &ItemScope, item: &RecordId, file: &RecordId) -> PathBuf {
        build_path(&self.item_dir(scope, item), &[&"files", file])
    }

    /// `<file dir>/file.json`
    #[must_use]
    pub fn file_record(&self, scope: &ItemScope, item: &RecordId, file: &RecordId) -> PathBuf {
        build_path(&self.file_dir(scope, item, file), &[&"file.json"])
    }

    /// `<file dir>/<rendition><extension of url>`
    #[must_use]
    pub fn rendition(
        &self,
        scope: &ItemScope,
        item: &RecordId,
        file: &RecordId,
        rendition: &str,
        url: &str,
    ) -> PathBuf {
        let name = format!("{rendition}{}", extension_from_url(url));
        build_path(&self.file_dir(scope, item, file), &[&name])
    }

    /// `<resource>.json`
    #[must_use]
    pub fn singleton_resource(&self, resource: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_segment(resource)))
    }

    /// `<resource>/<id>.json`
    #[must_use]
    pub fn resource_record(&self, resource: &str, id: &RecordId) -> PathBuf {
        let name = format!("{}.json", sanitize_segment(id.as_str()));
        build_path(&self.root, &[&resource]).join(name)
    }
}

/// Returns the extension (with leading dot) of the last path segment of `url`,
/// or an empty string when there is none.
pub(crate) fn extension_from_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    let Some(last) = parsed.path_segments().and_then(|mut s| s.next_back()) else {
        return String::new();
    };
    match last.rfind('.') {
        Some(dot) if dot > 0 => {
            let ext = &last[dot..];
            if ext.len() > 1 && ext.len() <= MAX_EXTENSION_LEN {
                ext.to_string()
            } else {
                String::new()
            }
        }
        _ => String::new(),
    }
}

fn sanitize_segment(segment: &str) -> String {
    // A lone `%` is never produced by encoding, so it can stand for "".
    if segment.is_empty() {
        return "%".to_string();
    }

    let mut encoded = String::with_capacity(segment.len());
    for c in segment.chars() {
        if is_unsafe_char(c) {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(encoded, "%{byte:02X}");
            }
        } else {
            encoded.push(c);
        }
    }

    if is_normal_component(&encoded) {
        encoded
    } else {
        encoded.replace('.', "%2E")
    }
}

fn is_unsafe_char(c: char) -> bool {
    matches!(c, '%' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
}

fn is_normal_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::record::record_id;
    use serde_json::json;

    fn id(n: u64) -> RecordId {
        record_id(&json!({ "id": n }), "test").unwrap()
    }

    #[test]
    fn test_build_path_stringifies_segments() {
        let path = build_path(Path::new("/archive"), &[&"collections", &3, &"items", &17]);
        assert_eq!(path, PathBuf::from("/archive/collections/3/items/17"));
    }

    #[test]
    fn test_build_path_is_deterministic() {
        let root = Path::new("/archive");
        let a = build_path(root, &[&"collections", &1, &"collection.json"]);
        let b = build_path(root, &[&"collections", &1, &"collection.json"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_ids_yield_distinct_paths() {
        let layout = ArchiveLayout::new("/archive");
        let scope = ItemScope::Collection(id(1));
        assert_ne!(
            layout.file_record(&scope, &id(10), &id(100)),
            layout.file_record(&scope, &id(11), &id(100))
        );
        assert_ne!(
            layout.item_record(&scope, &id(10)),
            layout.item_record(&ItemScope::Collection(id(2)), &id(10))
        );
        assert_ne!(
            layout.item_record(&scope, &id(10)),
            layout.item_record(&ItemScope::Orphan, &id(10))
        );
    }

    #[test]
    fn test_layout_paths() {
        let layout = ArchiveLayout::new("/archive");
        let scope = ItemScope::Collection(id(1));
        assert_eq!(layout.site(), PathBuf::from("/archive/site.json"));
        assert_eq!(
            layout.collection_record(&id(1)),
            PathBuf::from("/archive/collections/1/collection.json")
        );
        assert_eq!(
            layout.item_record(&scope, &id(10)),
            PathBuf::from("/archive/collections/1/items/10/item.json")
        );
        assert_eq!(
            layout.file_record(&scope, &id(10), &id(100)),
            PathBuf::from("/archive/collections/1/items/10/files/100/file.json")
        );
        assert_eq!(
            layout.rendition(&scope, &id(10), &id(100), "original", "http://x/a.jpg"),
            PathBuf::from("/archive/collections/1/items/10/files/100/original.jpg")
        );
        assert_eq!(
            layout.item_record(&ItemScope::Orphan, &id(10)),
            PathBuf::from("/archive/items/10/item.json")
        );
        assert_eq!(layout.singleton_resource("tags"), PathBuf::from("/archive/tags.json"));
        assert_eq!(
            layout.resource_record("tags", &id(4)),
            PathBuf::from("/archive/tags/4.json")
        );
    }

    #[test]
    fn test_extension_from_url() {
        assert_eq!(extension_from_url("http://x/files/original/a.JPG"), ".JPG");
        assert_eq!(extension_from_url("http://x/files/thumb.jpg?v=2"), ".jpg");
        assert_eq!(extension_from_url("http://x/files/noext"), "");
        assert_eq!(extension_from_url("http://x/files/.hidden"), "");
        assert_eq!(extension_from_url("http://x/file.toolongextension"), "");
        assert_eq!(extension_from_url("not a url"), "");
    }

    #[test]
    fn test_server_supplied_segments_cannot_escape_root() {
        let root = Path::new("/archive");
        assert_eq!(build_path(root, &[&".."]), PathBuf::from("/archive/%2E%2E"));
        assert_eq!(build_path(root, &[&"a/b"]), PathBuf::from("/archive/a%2Fb"));
        assert_eq!(build_path(root, &[&""]), PathBuf::from("/archive/%"));
        assert!(build_path(root, &[&"../etc", &"passwd"]).starts_with(root));
        assert_eq!(build_path(root, &[&"../etc", &"passwd"]).components().count(), 4);
    }

    #[test]
    fn test_distinct_string_ids_yield_distinct_paths() {
        let layout = ArchiveLayout::new("/archive");
        let ids = [
            "a/b", "a_b", "a%2Fb", "a%b", "..", "__", "%2E%2E", ".", "_", "%", "a:b", "a\\b",
            "tab\tid",
        ];
        let paths: Vec<PathBuf> = ids
            .iter()
            .map(|raw| {
                let id = record_id(&json!({ "id": raw }), "tags").unwrap();
                layout.resource_record("tags", &id)
            })
            .collect();

        for (i, a) in paths.iter().enumerate() {
            assert_eq!(a.parent(), Some(Path::new("/archive/tags")), "{:?} escaped", ids[i]);
            for (j, b) in paths.iter().enumerate().skip(i + 1) {
                assert_ne!(a, b, "{:?} and {:?} collided", ids[i], ids[j]);
            }
        }
        let slashed = record_id(&json!({ "id": "a/b" }), "tags").unwrap();
        assert_eq!(
            layout.resource_record("tags", &slashed),
            PathBuf::from("/archive/tags/a%2Fb.json")
        );
    }

    #[test]
    fn test_singleton_names_are_encoded_once() {
        let layout = ArchiveLayout::new("/archive");
        assert_eq!(
            layout.singleton_resource("100%"),
            PathBuf::from("/archive/100%25.json")
        );
    }
}
