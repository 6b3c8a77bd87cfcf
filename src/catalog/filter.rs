//! Filtering: glob patterns and derivation of a filtered view from its base

use regex::Regex;

use super::{CatalogTree, ObjectType, ObjectTypeValidation};
use crate::tree::TreeNode;

/// Textual wildcard conventions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterType {
    LocalLike,
    LocalRegexp,
    RemoteLike,
    RemoteRegexp,
}

/// Convert a user filter fragment to a wildcard in the given convention.
///
/// Local conventions keep `*`/`?` and append a trailing `*`. Remote
/// conventions produce SQL LIKE text: literal `%` and `_` are escaped, `?`
/// becomes `_`, `*` becomes `%` and a trailing `%` is appended. An empty
/// fragment matches everything.
pub fn get_filter_wildcard(filter: &str, filter_type: FilterType) -> String {
    let mut wildcard = if filter.is_empty() {
        "*".to_string()
    } else {
        filter.to_string()
    };

    match filter_type {
        FilterType::LocalLike | FilterType::LocalRegexp => {
            if !wildcard.ends_with('*') {
                wildcard.push('*');
            }
        }
        FilterType::RemoteLike | FilterType::RemoteRegexp => {
            wildcard = wildcard
                .replace('%', "\\%")
                .replace('_', "\\_")
                .replace('?', "_")
                .replace('*', "%");
            if !wildcard.ends_with('%') || wildcard.ends_with("\\%") {
                wildcard.push('%');
            }
        }
    }
    wildcard
}

/// Glob matcher supporting `*` (any run) and `?` (one character).
///
/// A pattern that cannot be compiled never matches.
#[derive(Clone, Debug)]
pub struct GlobPattern {
    source: String,
    matcher: Option<Regex>,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Self {
        let mut expression = String::from("(?s)^");
        let mut buffer = [0u8; 4];
        for ch in pattern.chars() {
            match ch {
                '*' => expression.push_str(".*"),
                '?' => expression.push('.'),
                other => expression.push_str(&regex::escape(other.encode_utf8(&mut buffer))),
            }
        }
        expression.push('$');

        let matcher = match Regex::new(&expression) {
            Ok(matcher) => Some(matcher),
            Err(err) => {
                log::warn!("filter pattern {:?} rejected: {}", pattern, err);
                None
            }
        };

        Self {
            source: pattern.to_string(),
            matcher,
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.matcher.as_ref().is_some_and(|matcher| matcher.is_match(text))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Compiled state of a filter string
#[derive(Clone, Debug, Default)]
pub(super) struct CatalogFilter {
    pub(super) text: String,
    pub(super) schema_pattern: Option<GlobPattern>,
    pub(super) object_pattern: Option<GlobPattern>,
}

const TABLE_COLLECTION_ITEMS: [ObjectType; 4] = [
    ObjectType::TableColumn,
    ObjectType::Index,
    ObjectType::ForeignKey,
    ObjectType::Trigger,
];

impl CatalogFilter {
    fn pattern_for(&self, kind: ObjectType) -> Option<&GlobPattern> {
        if kind == ObjectType::Schema {
            self.schema_pattern.as_ref()
        } else if kind.is(ObjectTypeValidation::SchemaObject) {
            self.object_pattern.as_ref()
        } else {
            None
        }
    }

    /// Rebuild the children of `target` from the children of `source` of
    /// `kind` that pass the filter. Payloads are shared, not copied.
    pub(super) fn filter_children(&self, kind: ObjectType, source: &TreeNode, target: &mut TreeNode) -> bool {
        let pattern = self.pattern_for(kind);
        target.remove_children();

        for source_node in source.children.iter().filter(|node| node.kind == kind) {
            if let Some(pattern) = pattern {
                if !pattern.matches(&source_node.caption.to_uppercase()) {
                    continue;
                }
            }

            let mut node = CatalogTree::setup_node(&source_node.caption, kind, source_node.data.clone());
            node.expanded = source_node.expanded;
            match kind {
                ObjectType::Schema | ObjectType::Table => self.filter_collections(source_node, &mut node),
                ObjectType::View => {
                    self.filter_children(ObjectType::ViewColumn, source_node, &mut node);
                }
                _ => {}
            }
            target.add_child(node);
        }

        target.expanded = source.expanded;
        target.count() > 0
    }

    fn filter_collections(&self, source: &TreeNode, target: &mut TreeNode) {
        let items: &[ObjectType] = match source.kind {
            ObjectType::Schema => &ObjectType::SCHEMA_OBJECTS,
            ObjectType::Table => &TABLE_COLLECTION_ITEMS,
            _ => &[],
        };

        for (index, item) in items.iter().enumerate() {
            if let (Some(source_collection), Some(target_collection)) = (source.child(index), target.child_mut(index)) {
                target_collection.caption = source_collection.caption.clone();
                self.filter_children(*item, source_collection, target_collection);
            }
        }
    }
}

impl CatalogTree {
    pub fn get_filter(&self) -> &str {
        &self.filter.text
    }

    pub fn schema_pattern(&self) -> Option<&GlobPattern> {
        self.filter.schema_pattern.as_ref()
    }

    pub fn object_pattern(&self) -> Option<&GlobPattern> {
        self.filter.object_pattern.as_ref()
    }

    /// Compile `filter` (`schema` or `schema.object`). Takes effect on the
    /// next [`filter_data`](Self::filter_data).
    pub fn set_filter(&mut self, filter: &str) {
        self.clean_filter();
        if filter.is_empty() {
            return;
        }
        self.filter.text = filter.to_string();

        let (schema_part, object_part) = match filter.split_once('.') {
            Some((schema, object)) => (schema, Some(object)),
            None => (filter, None),
        };

        let schema_wildcard = get_filter_wildcard(schema_part, FilterType::LocalLike).to_uppercase();
        self.filter.schema_pattern = Some(GlobPattern::new(&schema_wildcard));

        if let Some(object_part) = object_part {
            let object_wildcard = get_filter_wildcard(object_part, FilterType::LocalLike).to_uppercase();
            if object_wildcard != "*" {
                self.filter.object_pattern = Some(GlobPattern::new(&object_wildcard));
            }
        }
        log::debug!(
            "filter {:?} compiled to schema {:?} object {:?}",
            filter,
            self.filter.schema_pattern.as_ref().map(GlobPattern::as_str),
            self.filter.object_pattern.as_ref().map(GlobPattern::as_str)
        );
    }

    pub fn clean_filter(&mut self) {
        self.filter = CatalogFilter::default();
    }

    /// Re-derive this filtered view from its base tree
    pub fn filter_data(&mut self) {
        let Some(base) = self.base.clone() else {
            log::debug!("filter_data called on a tree without base");
            return;
        };
        let Ok(base) = base.try_borrow() else {
            log::trace!("base tree busy, view refresh deferred");
            return;
        };
        self.derive_from(&base.root, &base.active_schema);
    }

    pub(super) fn derive_from(&mut self, base_root: &TreeNode, active_schema: &str) {
        let mut root = TreeNode::new("", ObjectType::NoneType);

        if base_root.children.iter().any(|child| child.data.is_none()) {
            // placeholder rows (no connection) are mirrored as they are
            root.children = base_root.children.clone();
        } else {
            self.filter.filter_children(ObjectType::Schema, base_root, &mut root);
        }

        self.root = root;
        self.active_schema = active_schema.to_string();
        self.mark_active_schema();
    }

    /// Refresh the linked filtered view from this tree
    pub(super) fn sync_view(&self) {
        let Some(view) = self.view.as_ref().and_then(|view| view.upgrade()) else {
            return;
        };
        match view.try_borrow_mut() {
            Ok(mut view) => view.derive_from(&self.root, &self.active_schema),
            Err(_) => log::trace!("filtered view busy, it refreshes itself"),
        };
    }

    /// Ask the data source for schemas and objects matching the given
    /// fragments, translated to SQL LIKE patterns.
    pub fn load_data_for_filter(&mut self, schema_filter: &str, object_filter: &str) {
        if self.is_filtered_view() {
            self.forward_to_base(|base| base.load_data_for_filter(schema_filter, object_filter));
            return;
        }

        let remote_schema = get_filter_wildcard(schema_filter, FilterType::RemoteLike);
        let remote_object = get_filter_wildcard(object_filter, FilterType::RemoteLike);

        match self.fetch_delegate() {
            Some(delegate) => {
                delegate.fetch_data_for_filter(&remote_schema, &remote_object, self.reply_sender.clone());
            }
            None => log::debug!("no fetch delegate for filter {} {}", remote_schema, remote_object),
        }
        self.process_replies();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_wildcards() {
        assert_eq!(get_filter_wildcard("", FilterType::LocalLike), "*");
        assert_eq!(get_filter_wildcard("basic", FilterType::LocalLike), "basic*");
        assert_eq!(get_filter_wildcard("basic*", FilterType::LocalLike), "basic*");
        assert_eq!(get_filter_wildcard("?asic", FilterType::LocalRegexp), "?asic*");
    }

    #[test]
    fn test_remote_wildcards() {
        assert_eq!(get_filter_wildcard("*sample", FilterType::RemoteLike), "%sample%");
        assert_eq!(get_filter_wildcard("?bject", FilterType::RemoteLike), "_bject%");
        assert_eq!(get_filter_wildcard("", FilterType::RemoteLike), "%");
        assert_eq!(get_filter_wildcard("my_db", FilterType::RemoteLike), "my\\_db%");
        assert_eq!(get_filter_wildcard("50%", FilterType::RemoteRegexp), "50\\%%");
        assert_eq!(get_filter_wildcard("abc*", FilterType::RemoteLike), "abc%");
    }

    #[test]
    fn test_glob_matching() {
        let pattern = GlobPattern::new("BASIC*");
        assert!(pattern.matches("BASIC_SCHEMA"));
        assert!(pattern.matches("BASIC"));
        assert!(!pattern.matches("XBASIC"));

        let pattern = GlobPattern::new("?ASIC_*");
        assert!(pattern.matches("BASIC_TRAINING"));
        assert!(!pattern.matches("BASICS"));

        let pattern = GlobPattern::new("A.B(C)+*");
        assert!(pattern.matches("A.B(C)+D"));
        assert!(!pattern.matches("AXB(C)+D"));

        assert!(GlobPattern::new("*").matches(""));
        assert!(!GlobPattern::new("").matches("x"));
    }

    #[test]
    fn test_set_filter_patterns() {
        let mut tree = CatalogTree::new();

        tree.set_filter("basic");
        assert_eq!(tree.get_filter(), "basic");
        assert_eq!(tree.schema_pattern().map(GlobPattern::as_str), Some("BASIC*"));
        assert!(tree.object_pattern().is_none());

        tree.set_filter("basic.*");
        assert!(tree.schema_pattern().is_some());
        assert!(tree.object_pattern().is_none());

        tree.set_filter("basic.");
        assert!(tree.object_pattern().is_none());

        tree.set_filter("basic*.sec*");
        assert_eq!(tree.object_pattern().map(GlobPattern::as_str), Some("SEC*"));

        tree.set_filter("a.b.c");
        assert_eq!(tree.schema_pattern().map(GlobPattern::as_str), Some("A*"));
        assert_eq!(tree.object_pattern().map(GlobPattern::as_str), Some("B.C*"));

        tree.clean_filter();
        assert_eq!(tree.get_filter(), "");
        assert!(tree.schema_pattern().is_none());
        assert!(tree.object_pattern().is_none());

        tree.set_filter("");
        assert!(tree.schema_pattern().is_none());
    }
}
