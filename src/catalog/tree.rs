//! Catalog tree core: node layout, child search, reconciliation and name paths

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::{Rc, Weak};

use tokio::sync::mpsc::UnboundedReceiver;

use super::filter::CatalogFilter;
use super::{
    collection_caption, NodeData, ObjectType, SharedData, COLUMNS_CAPTION, FOREIGN_KEYS_CAPTION,
    FUNCTIONS_CAPTION, INDEXES_CAPTION, PROCEDURES_CAPTION, TABLES_CAPTION, TRIGGERS_CAPTION,
    VIEWS_CAPTION,
};
use crate::config::TreeConfig;
use crate::delegate::{reply_channel, ActionDelegate, FetchDelegate, FetchReply, ReplySender};
use crate::tree::{NodeHandle, TreeNode};

/// In-memory mirror of a database catalog.
///
/// A tree is either a base tree, which owns the payloads and talks to the
/// fetch delegate, or a filtered view linked to a base tree with
/// [`CatalogTree::new_filtered_view`]. A filtered view forwards every change to
/// its base and re-derives itself afterwards; a base tree refreshes its view
/// after each change of its own.
pub struct CatalogTree {
    pub(super) root: TreeNode,
    pub(super) case_sensitive_identifiers: bool,
    pub(super) enabled_events: bool,
    pub(super) active_schema: String,
    pub(super) filter: CatalogFilter,
    pub(super) notify_on_reload_data: Option<SharedData>,
    pub(super) reply_sender: ReplySender,
    pub(super) replies: UnboundedReceiver<FetchReply>,
    pub(super) draining: bool,
    pub(super) base: Option<Rc<RefCell<CatalogTree>>>,
    pub(super) view: Option<Weak<RefCell<CatalogTree>>>,
    fetch_delegate: Option<Weak<dyn FetchDelegate>>,
    action_delegate: Option<Weak<dyn ActionDelegate>>,
}

impl Default for CatalogTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogTree {
    pub fn new() -> Self {
        Self::with_config(&TreeConfig::default())
    }

    pub fn with_config(config: &TreeConfig) -> Self {
        let (reply_sender, replies) = reply_channel();
        Self {
            root: TreeNode::new("", ObjectType::NoneType),
            case_sensitive_identifiers: config.case_sensitive_identifiers,
            enabled_events: config.events_enabled,
            active_schema: String::new(),
            filter: CatalogFilter::default(),
            notify_on_reload_data: None,
            reply_sender,
            replies,
            draining: false,
            base: None,
            view: None,
            fetch_delegate: None,
            action_delegate: None,
        }
    }

    /// Create a filtered view of `base`. The view starts unfiltered.
    pub fn new_filtered_view(base: &Rc<RefCell<CatalogTree>>) -> Rc<RefCell<CatalogTree>> {
        let mut view = CatalogTree::new();
        {
            let base = base.borrow();
            view.case_sensitive_identifiers = base.case_sensitive_identifiers;
            view.enabled_events = base.enabled_events;
        }
        view.base = Some(Rc::clone(base));

        let view = Rc::new(RefCell::new(view));
        base.borrow_mut().view = Some(Rc::downgrade(&view));
        view.borrow_mut().filter_data();
        view
    }

    pub fn is_filtered_view(&self) -> bool {
        self.base.is_some()
    }

    pub fn root_node(&self) -> &TreeNode {
        &self.root
    }

    pub fn node(&self, handle: &NodeHandle) -> Option<&TreeNode> {
        self.root.resolve(handle)
    }

    pub fn node_data(&self, handle: &NodeHandle) -> Option<SharedData> {
        self.root.resolve(handle)?.data.clone()
    }

    pub fn active_schema(&self) -> &str {
        &self.active_schema
    }

    /// The delegate is held weakly; dropping it disables fetching.
    pub fn set_fetch_delegate<D: FetchDelegate + 'static>(&mut self, delegate: &Rc<D>) {
        let delegate: Weak<D> = Rc::downgrade(delegate);
        self.fetch_delegate = Some(delegate);
    }

    pub fn set_action_delegate<D: ActionDelegate + 'static>(&mut self, delegate: &Rc<D>) {
        let delegate: Weak<D> = Rc::downgrade(delegate);
        self.action_delegate = Some(delegate);
    }

    pub(super) fn fetch_delegate(&self) -> Option<Rc<dyn FetchDelegate>> {
        self.fetch_delegate.as_ref().and_then(Weak::upgrade)
    }

    /// Own action delegate, else the base tree's
    pub(super) fn action_delegate(&self) -> Option<Rc<dyn ActionDelegate>> {
        if let Some(delegate) = self.action_delegate.as_ref().and_then(Weak::upgrade) {
            return Some(delegate);
        }
        let base = self.base.as_ref()?;
        let base = base.try_borrow().ok()?;
        base.action_delegate()
    }

    /// Sender feeding this tree's reply inbox
    pub fn reply_sender(&self) -> ReplySender {
        self.reply_sender.clone()
    }

    /// Changing the policy on a populated tree breaks the sort order of its
    /// collections; set it before the first update.
    pub fn set_case_sensitive_identifiers(&mut self, flag: bool) {
        self.case_sensitive_identifiers = flag;
    }

    pub fn enable_events(&mut self, enabled: bool) {
        self.enabled_events = enabled;
    }

    /// Run `op` against the base tree, then re-derive this view from it.
    /// None when this tree has no base or the base is busy.
    pub(super) fn forward_to_base<R>(&mut self, op: impl FnOnce(&mut CatalogTree) -> R) -> Option<R> {
        let base = self.base.clone()?;
        let result = match base.try_borrow_mut() {
            Ok(mut base) => op(&mut base),
            Err(_) => {
                log::warn!("base catalog tree is busy, change not forwarded");
                return None;
            }
        };
        self.filter_data();
        Some(result)
    }

    // === Search ===

    pub fn identifiers_equal(&self, a: &str, b: &str) -> bool {
        identifier_order(self.case_sensitive_identifiers, a, b) == Ordering::Equal
    }

    /// Binary search for `name` among the children of `parent` in `[first, last)`.
    ///
    /// The range must be sorted under the tree's case policy. Returns the
    /// index of the match, or the position that keeps the range sorted.
    pub fn binary_search_node(
        &self,
        parent: &TreeNode,
        first: usize,
        last: usize,
        name: &str,
    ) -> Result<usize, usize> {
        search_sorted(parent, first, last, name, self.case_sensitive_identifiers)
    }

    pub(super) fn find_child_index(
        &self,
        parent: &TreeNode,
        name: &str,
        kind: ObjectType,
        binary_search: bool,
    ) -> Option<usize> {
        if binary_search {
            return self.binary_search_node(parent, 0, parent.count(), name).ok();
        }
        parent.children.iter().position(|child| {
            self.identifiers_equal(&child.caption, name)
                && (kind == ObjectType::Any || child.kind == kind)
        })
    }

    /// Find a child of `parent` by name. Binary search assumes a sorted
    /// collection; the linear scan also filters on `kind` unless it is `Any`.
    pub fn get_child_node(
        &self,
        parent: &NodeHandle,
        name: &str,
        kind: ObjectType,
        binary_search: bool,
    ) -> Option<NodeHandle> {
        let node = self.root.resolve(parent)?;
        let index = self.find_child_index(node, name, kind, binary_search)?;
        Some(parent.child(index))
    }

    // === Structure ===

    /// New node of `kind` with its fixed collection children. Without `data`
    /// a default payload is created.
    pub(super) fn setup_node(caption: &str, kind: ObjectType, data: Option<SharedData>) -> TreeNode {
        let mut node = TreeNode::new(caption, kind);
        node.data = data.or_else(|| NodeData::for_object(kind, caption).map(NodeData::shared));
        node.children = collection_skeleton(kind);
        node
    }

    /// Reconcile the children of `parent` of `kind` with `children`.
    ///
    /// Unless `just_append`, children of `kind` missing from the list are
    /// removed. Missing names are added at their sorted position when
    /// `sorted`, otherwise appended in list order. Returns whether anything
    /// was inserted or removed.
    pub fn update_node_children(
        &mut self,
        parent: &NodeHandle,
        children: &[String],
        kind: ObjectType,
        sorted: bool,
        just_append: bool,
    ) -> bool {
        if self.is_filtered_view() {
            let Some(path) = self.get_node_path(parent) else {
                return false;
            };
            return self
                .forward_to_base(|base| match base.get_node_from_path(&path) {
                    Some(base_parent) => {
                        base.update_node_children(&base_parent, children, kind, sorted, just_append)
                    }
                    None => {
                        log::debug!("no base node for {:?}", path);
                        false
                    }
                })
                .unwrap_or(false);
        }

        let changed = self.reconcile_children(parent, children, kind, sorted, just_append);
        if changed {
            self.sync_view();
        }
        changed
    }

    pub(super) fn reconcile_children(
        &mut self,
        parent: &NodeHandle,
        children: &[String],
        kind: ObjectType,
        sorted: bool,
        just_append: bool,
    ) -> bool {
        let case_sensitive = self.case_sensitive_identifiers;
        match self.root.resolve_mut(parent) {
            Some(node) => reconcile(node, children, kind, sorted, just_append, case_sensitive),
            None => {
                log::debug!("reconcile target {:?} is not in the tree", parent);
                false
            }
        }
    }

    /// Insert a node at its sorted position unless the name already exists
    pub fn insert_node(&mut self, parent: &NodeHandle, name: &str, kind: ObjectType) -> Option<NodeHandle> {
        if self.is_filtered_view() {
            let path = self.get_node_path(parent)?;
            self.forward_to_base(|base| {
                let base_parent = base.get_node_from_path(&path)?;
                base.insert_node(&base_parent, name, kind)
            })??;
            return self.get_child_node(parent, name, kind, true);
        }

        let handle = self.insert_sorted(parent, name, kind)?;
        self.sync_view();
        Some(handle)
    }

    pub(super) fn insert_sorted(&mut self, parent: &NodeHandle, name: &str, kind: ObjectType) -> Option<NodeHandle> {
        let case_sensitive = self.case_sensitive_identifiers;
        let node = self.root.resolve_mut(parent)?;
        let position = search_sorted(node, 0, node.count(), name, case_sensitive).err()?;
        node.insert_child(position, Self::setup_node(name, kind, None));
        Some(parent.child(position))
    }

    pub(super) fn remove_node(&mut self, handle: &NodeHandle) -> Option<TreeNode> {
        let parent = handle.parent()?;
        let index = handle.last_index()?;
        self.root.resolve_mut(&parent)?.remove_child(index)
    }

    /// Give a node a new name and move it to keep its collection sorted
    pub(super) fn rename_node(&mut self, handle: &NodeHandle, new_name: &str) -> Option<NodeHandle> {
        let case_sensitive = self.case_sensitive_identifiers;
        let parent = handle.parent()?;
        let index = handle.last_index()?;
        let parent_node = self.root.resolve_mut(&parent)?;
        let mut node = parent_node.remove_child(index)?;
        node.caption = new_name.to_string();

        let position = match search_sorted(parent_node, 0, parent_node.count(), new_name, case_sensitive) {
            Ok(position) | Err(position) => position,
        };
        let position = parent_node.insert_child(position, node);
        Some(parent.child(position))
    }

    // === Object lookup ===

    pub fn get_node_for_object(&self, schema_name: &str, kind: ObjectType, name: &str) -> Option<NodeHandle> {
        let schema = self.get_child_node(&NodeHandle::root(), schema_name, ObjectType::Schema, true)?;
        if kind == ObjectType::Schema {
            return Some(schema);
        }
        let collection = schema.child(kind.schema_collection_index()?);
        self.get_child_node(&collection, name, kind, true)
    }

    /// Node for an object, creating it (and its schema) when missing
    pub fn create_node_for_object(&mut self, schema_name: &str, kind: ObjectType, name: &str) -> Option<NodeHandle> {
        if self.is_filtered_view() {
            self.forward_to_base(|base| base.create_node_for_object(schema_name, kind, name))??;
            return self.get_node_for_object(schema_name, kind, name);
        }

        let root = NodeHandle::root();
        let (schema, created_schema) = match self.get_child_node(&root, schema_name, ObjectType::Schema, true) {
            Some(schema) => (schema, false),
            None => (self.insert_sorted(&root, schema_name, ObjectType::Schema)?, true),
        };

        let handle = if kind == ObjectType::Schema {
            Some(schema)
        } else if let Some(index) = kind.schema_collection_index() {
            let collection = schema.child(index);
            self.get_child_node(&collection, name, kind, true)
                .or_else(|| self.insert_sorted(&collection, name, kind))
        } else {
            if created_schema {
                self.remove_node(&schema);
            }
            log::debug!("cannot create a {} node under a schema", kind);
            None
        };

        self.sync_view();
        handle
    }

    // === Paths ===

    /// Name of the schema a node belongs to, empty for the root
    pub fn get_schema_name(&self, handle: &NodeHandle) -> String {
        handle
            .indices()
            .first()
            .and_then(|&index| self.root.child(index))
            .map(|schema| schema.caption.clone())
            .unwrap_or_default()
    }

    /// Names from the root down to a node. Collections are named by their
    /// plain caption so paths survive caption decorations.
    pub fn get_node_path(&self, handle: &NodeHandle) -> Option<Vec<String>> {
        let mut node = &self.root;
        let mut path = Vec::with_capacity(handle.depth());
        for &index in handle.indices() {
            node = node.child(index)?;
            path.push(path_label(node).to_string());
        }
        Some(path)
    }

    pub fn get_node_from_path(&self, path: &[String]) -> Option<NodeHandle> {
        let mut handle = NodeHandle::root();
        let mut node = &self.root;
        let mut binary_search = true;

        for element in path {
            let index = if matches!(node.kind, ObjectType::Schema | ObjectType::Table) {
                node.children.iter().position(|child| path_label(child) == element.as_str())?
            } else {
                self.find_child_index(node, element, ObjectType::Any, binary_search)?
            };
            node = node.child(index)?;
            handle = handle.child(index);

            // Routine collections are searched linearly, a name may be both
            // a procedure and a function
            binary_search = matches!(node.kind, ObjectType::TableCollection | ObjectType::ViewCollection);
        }
        Some(handle)
    }
}

fn path_label(node: &TreeNode) -> &str {
    collection_caption(node.kind).unwrap_or(&node.caption)
}

/// Fixed collection children of a new node
fn collection_skeleton(kind: ObjectType) -> Vec<TreeNode> {
    let layout: &[(&str, ObjectType)] = match kind {
        ObjectType::Schema => &[
            (TABLES_CAPTION, ObjectType::TableCollection),
            (VIEWS_CAPTION, ObjectType::ViewCollection),
            (PROCEDURES_CAPTION, ObjectType::ProcedureCollection),
            (FUNCTIONS_CAPTION, ObjectType::FunctionCollection),
        ],
        ObjectType::Table => &[
            (COLUMNS_CAPTION, ObjectType::ColumnCollection),
            (INDEXES_CAPTION, ObjectType::IndexCollection),
            (FOREIGN_KEYS_CAPTION, ObjectType::ForeignKeyCollection),
            (TRIGGERS_CAPTION, ObjectType::TriggerCollection),
        ],
        _ => &[],
    };
    layout
        .iter()
        .map(|(caption, kind)| TreeNode::new(caption, *kind))
        .collect()
}

pub(super) fn identifier_order(case_sensitive: bool, a: &str, b: &str) -> Ordering {
    if case_sensitive {
        a.cmp(b)
    } else {
        a.chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase))
    }
}

pub(super) fn search_sorted(
    parent: &TreeNode,
    first: usize,
    last: usize,
    name: &str,
    case_sensitive: bool,
) -> Result<usize, usize> {
    let mut low = first.min(parent.count());
    let mut high = last.min(parent.count());

    while low < high {
        let middle = low + (high - low) / 2;
        match identifier_order(case_sensitive, &parent.children[middle].caption, name) {
            Ordering::Less => low = middle + 1,
            Ordering::Greater => high = middle,
            Ordering::Equal => return Ok(middle),
        }
    }
    Err(low)
}

fn reconcile(
    node: &mut TreeNode,
    names: &[String],
    kind: ObjectType,
    sorted: bool,
    just_append: bool,
    case_sensitive: bool,
) -> bool {
    let order = |a: &str, b: &str| identifier_order(case_sensitive, a, b);

    let mut incoming: Vec<&str> = names.iter().map(String::as_str).collect();
    incoming.sort_by(|a, b| order(*a, *b));
    incoming.dedup_by(|a, b| order(*a, *b) == Ordering::Equal);

    let mut changed = false;

    if !just_append {
        let before = node.count();
        node.children.retain(|child| {
            child.kind != kind
                || incoming
                    .binary_search_by(|probe| order(*probe, &child.caption))
                    .is_ok()
        });
        changed = node.count() != before;
    }

    if sorted {
        for name in incoming {
            if let Err(position) = search_sorted(node, 0, node.count(), name, case_sensitive) {
                node.insert_child(position, CatalogTree::setup_node(name, kind, None));
                changed = true;
            }
        }
    } else {
        for name in names {
            let exists = node
                .children
                .iter()
                .any(|child| child.kind == kind && order(&child.caption, name) == Ordering::Equal);
            if !exists {
                node.add_child(CatalogTree::setup_node(name, kind, None));
                changed = true;
            }
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| name.to_string()).collect()
    }

    fn captions(node: &TreeNode) -> Vec<&str> {
        node.children.iter().map(|child| child.caption.as_str()).collect()
    }

    #[test]
    fn test_update_children_is_idempotent() {
        let mut tree = CatalogTree::new();
        let root = NodeHandle::root();
        let list = names(&["world", "sakila", "mysql", "employees"]);

        assert!(tree.update_node_children(&root, &list, ObjectType::Schema, true, false));
        let first = captions(tree.root_node()).join(",");
        assert!(!tree.update_node_children(&root, &list, ObjectType::Schema, true, false));
        assert_eq!(captions(tree.root_node()).join(","), first);
        assert_eq!(first, "employees,mysql,sakila,world");
    }

    #[test]
    fn test_update_children_removes_missing() {
        let mut tree = CatalogTree::new();
        let root = NodeHandle::root();
        tree.update_node_children(&root, &names(&["a", "b", "c"]), ObjectType::Schema, true, false);

        assert!(tree.update_node_children(&root, &names(&["b", "d"]), ObjectType::Schema, true, false));
        assert_eq!(captions(tree.root_node()), vec!["b", "d"]);

        assert!(tree.update_node_children(&root, &names(&["a"]), ObjectType::Schema, true, true));
        assert_eq!(captions(tree.root_node()), vec!["a", "b", "d"]);
    }

    #[test]
    fn test_unsorted_children_keep_source_order() {
        let mut tree = CatalogTree::new();
        let root = NodeHandle::root();
        tree.update_node_children(&root, &names(&["sakila"]), ObjectType::Schema, true, false);
        let table = tree.insert_node(&root.child(0).child(0), "actor", ObjectType::Table).unwrap();
        let columns = table.child(0);

        let list = names(&["zeta", "alpha", "mid"]);
        assert!(tree.update_node_children(&columns, &list, ObjectType::TableColumn, false, false));
        assert!(!tree.update_node_children(&columns, &list, ObjectType::TableColumn, false, false));
        assert_eq!(captions(tree.node(&columns).unwrap()), vec!["zeta", "alpha", "mid"]);

        assert_eq!(
            tree.get_child_node(&columns, "alpha", ObjectType::TableColumn, false),
            Some(columns.child(1))
        );
        assert_eq!(tree.get_child_node(&columns, "alpha", ObjectType::Index, false), None);
    }

    #[test]
    fn test_binary_and_linear_search_agree() {
        let mut tree = CatalogTree::new();
        let root = NodeHandle::root();
        let list = names(&["t9", "b", "Apple", "zz", "m", "c_1", "aa", "Q"]);
        tree.update_node_children(&root, &list, ObjectType::Schema, true, false);

        for name in &list {
            let binary = tree.get_child_node(&root, name, ObjectType::Schema, true);
            let linear = tree.get_child_node(&root, name, ObjectType::Schema, false);
            assert!(binary.is_some(), "{} not found", name);
            assert_eq!(binary, linear);
        }
        assert_eq!(tree.get_child_node(&root, "missing", ObjectType::Any, true), None);
    }

    #[test]
    fn test_binary_search_insert_position() {
        let mut tree = CatalogTree::new();
        let root = NodeHandle::root();
        tree.update_node_children(&root, &names(&["b", "d", "f"]), ObjectType::Schema, true, false);
        let node = tree.root_node();

        assert_eq!(tree.binary_search_node(node, 0, 3, "d"), Ok(1));
        assert_eq!(tree.binary_search_node(node, 0, 3, "a"), Err(0));
        assert_eq!(tree.binary_search_node(node, 0, 3, "e"), Err(2));
        assert_eq!(tree.binary_search_node(node, 0, 3, "z"), Err(3));
        assert_eq!(tree.binary_search_node(node, 1, 3, "b"), Err(1));
        assert_eq!(tree.binary_search_node(node, 0, 99, "f"), Ok(2));
    }

    #[test]
    fn test_case_policy() {
        let mut tree = CatalogTree::new();
        assert!(tree.identifiers_equal("Sakila", "SAKILA"));
        tree.set_case_sensitive_identifiers(true);
        assert!(!tree.identifiers_equal("Sakila", "SAKILA"));

        let root = NodeHandle::root();
        tree.update_node_children(&root, &names(&["b", "B", "a"]), ObjectType::Schema, true, false);
        assert_eq!(captions(tree.root_node()), vec!["B", "a", "b"]);
        assert!(tree.get_child_node(&root, "B", ObjectType::Any, true).is_some());
    }

    #[test]
    fn test_new_nodes_get_collections() {
        let mut tree = CatalogTree::new();
        let root = NodeHandle::root();
        tree.update_node_children(&root, &names(&["sakila"]), ObjectType::Schema, true, false);
        let schema = tree.node(&root.child(0)).unwrap();

        assert_eq!(
            captions(schema),
            vec![TABLES_CAPTION, VIEWS_CAPTION, PROCEDURES_CAPTION, FUNCTIONS_CAPTION]
        );
        assert_eq!(schema.data.as_ref().map(|d| d.borrow().get_type()), Some(ObjectType::Schema));

        let table = tree.insert_node(&root.child(0).child(0), "film", ObjectType::Table).unwrap();
        let table = tree.node(&table).unwrap();
        assert_eq!(
            captions(table),
            vec![COLUMNS_CAPTION, INDEXES_CAPTION, FOREIGN_KEYS_CAPTION, TRIGGERS_CAPTION]
        );
        assert!(table.children.iter().all(|c| c.data.is_none()));
    }

    #[test]
    fn test_insert_node_skips_existing() {
        let mut tree = CatalogTree::new();
        let root = NodeHandle::root();
        assert_eq!(tree.insert_node(&root, "m", ObjectType::Schema), Some(root.child(0)));
        assert_eq!(tree.insert_node(&root, "a", ObjectType::Schema), Some(root.child(0)));
        assert_eq!(tree.insert_node(&root, "z", ObjectType::Schema), Some(root.child(2)));
        assert_eq!(tree.insert_node(&root, "M", ObjectType::Schema), None);
    }

    #[test]
    fn test_paths_round_trip() {
        let mut tree = CatalogTree::new();
        tree.create_node_for_object("sakila", ObjectType::Procedure, "rewards").unwrap();
        let film = tree.create_node_for_object("sakila", ObjectType::Table, "film").unwrap();
        assert_eq!(tree.get_node_for_object("sakila", ObjectType::Table, "film"), Some(film.clone()));
        let indexes = film.child(1);

        let path = tree.get_node_path(&indexes).unwrap();
        assert_eq!(path, names(&["sakila", "Tables", "film", "Indexes"]));
        assert_eq!(tree.get_node_from_path(&path), Some(indexes.clone()));
        assert_eq!(tree.get_schema_name(&indexes), "sakila");
        assert_eq!(tree.get_schema_name(&NodeHandle::root()), "");

        tree.root.resolve_mut(&film.parent().unwrap()).unwrap().caption = "Tables fetching...".to_string();
        assert_eq!(tree.get_node_from_path(&path), Some(indexes));
        assert_eq!(tree.get_node_from_path(&names(&["sakila", "Views", "nope"])), None);
    }

    #[test]
    fn test_create_node_for_object() {
        let mut tree = CatalogTree::new();
        let view = tree.create_node_for_object("world", ObjectType::View, "city_list").unwrap();
        assert_eq!(tree.node(&view).map(|n| n.kind), Some(ObjectType::View));
        assert_eq!(tree.create_node_for_object("world", ObjectType::View, "city_list"), Some(view));

        assert_eq!(tree.create_node_for_object("other", ObjectType::Trigger, "trg"), None);
        assert!(tree.get_child_node(&NodeHandle::root(), "other", ObjectType::Schema, true).is_none());
        assert_eq!(tree.root_node().count(), 1);
    }

    #[test]
    fn test_rename_keeps_order() {
        let mut tree = CatalogTree::new();
        let root = NodeHandle::root();
        tree.update_node_children(&root, &names(&["b", "d", "f"]), ObjectType::Schema, true, false);

        let renamed = tree.rename_node(&root.child(0), "e").unwrap();
        assert_eq!(renamed, root.child(1));
        assert_eq!(captions(tree.root_node()), vec!["d", "e", "f"]);
    }
}
