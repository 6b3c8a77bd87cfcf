//! User-facing operations: active schema, activation, context menu and
//! field descriptions

use std::rc::Rc;

use super::{CatalogTree, LoadMask, ObjectType, ObjectTypeValidation, NOT_CONNECTED_CAPTION};
use crate::delegate::ChangeRecord;
use crate::tree::{NodeHandle, TreeNode};

/// Kind of a context menu entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuItemKind {
    Action,
    Separator,
}

/// Context menu entry offered for a node selection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuItem {
    pub caption: String,
    pub internal_name: String,
    pub enabled: bool,
    pub kind: MenuItemKind,
}

impl MenuItem {
    fn action(caption: impl Into<String>, internal_name: &str, enabled: bool) -> Self {
        Self {
            caption: caption.into(),
            internal_name: internal_name.to_string(),
            enabled,
            kind: MenuItemKind::Action,
        }
    }

    fn separator(internal_name: &str) -> Self {
        Self {
            caption: String::new(),
            internal_name: internal_name.to_string(),
            enabled: true,
            kind: MenuItemKind::Separator,
        }
    }
}

/// Quote `name` with `quote` unless it is a plain identifier. Embedded
/// quote characters are doubled.
pub fn quote_identifier_if_needed(name: &str, quote: char) -> String {
    let plain = !name.is_empty()
        && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '$')
        && !name.chars().all(|ch| ch.is_ascii_digit());
    if plain {
        return name.to_string();
    }

    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push(quote);
    for ch in name.chars() {
        if ch == quote {
            quoted.push(quote);
        }
        quoted.push(ch);
    }
    quoted.push(quote);
    quoted
}

impl CatalogTree {
    // === Active schema ===

    /// Make `name` the active schema: its node is shown bold and expanded
    pub fn set_active_schema(&mut self, name: &str) {
        if self.is_filtered_view() {
            self.forward_to_base(|base| base.set_active_schema(name));
            return;
        }

        self.active_schema = name.to_string();
        self.mark_active_schema();

        if let Some(schema) = self.get_child_node(&NodeHandle::root(), name, ObjectType::Schema, true) {
            if self.enabled_events {
                self.expand_toggled(&schema, true);
            } else if let Some(node) = self.root.resolve_mut(&schema) {
                node.expanded = true;
            }
        }
        self.sync_view();
    }

    pub(super) fn mark_active_schema(&mut self) {
        let active = self.active_schema.clone();
        let case_sensitive = self.case_sensitive_identifiers;
        for schema in self.root.children.iter_mut() {
            schema.bold = schema.data.is_some()
                && !active.is_empty()
                && super::tree::identifier_order(case_sensitive, &schema.caption, &active).is_eq();
        }
    }

    // === No connection ===

    /// Replace the content with a single "Not connected" placeholder
    pub fn set_no_connection(&mut self) {
        if self.is_filtered_view() {
            self.forward_to_base(|base| base.set_no_connection());
            return;
        }
        self.root.remove_children();
        self.root.add_child(TreeNode::new(NOT_CONNECTED_CAPTION, ObjectType::Schema));
        self.sync_view();
    }

    pub fn is_no_connection(&self) -> bool {
        self.root.children.iter().any(|child| child.data.is_none())
    }

    // === Activation ===

    /// Handle a double click or an overlay icon click.
    ///
    /// Negative columns address overlay icons and map to delegate
    /// activations. Otherwise nodes without payload toggle and objects
    /// return their identifier for insertion into an editor.
    pub fn node_activated(&mut self, handle: &NodeHandle, column: i32) -> Option<String> {
        let node = self.node(handle)?;
        if node.data.is_none() {
            self.toggle_node(handle);
            return None;
        }

        let (kind, name) = (node.kind, node.caption.clone());
        let schema = if kind == ObjectType::Schema {
            String::new()
        } else {
            self.get_schema_name(handle)
        };
        let record = ChangeRecord {
            kind,
            schema,
            name: name.clone(),
            detail: String::new(),
        };

        let action = match kind {
            ObjectType::Schema => match column {
                -1 => Some("inspect"),
                -2 => Some("alter"),
                _ => {
                    self.activate_objects("activate", &[record]);
                    self.toggle_node(handle);
                    return None;
                }
            },
            ObjectType::Table | ObjectType::View if column < 0 => match column {
                -1 => Some("inspect"),
                -2 => Some("alter"),
                -3 => Some("select_data"),
                _ => {
                    self.toggle_node(handle);
                    None
                }
            },
            ObjectType::Procedure | ObjectType::Function if column < 0 => match column {
                -1 => Some("alter"),
                -2 => Some("execute"),
                _ => None,
            },
            _ => return Some(quote_identifier_if_needed(&name, '`')),
        };

        if let Some(action) = action {
            self.activate_objects(action, &[record]);
        }
        None
    }

    fn toggle_node(&mut self, handle: &NodeHandle) {
        let Some(expanded) = self.node(handle).map(|node| !node.expanded) else {
            return;
        };
        if self.enabled_events {
            self.expand_toggled(handle, expanded);
        } else if let Some(node) = self.root.resolve_mut(handle) {
            node.toggle();
        }
    }

    fn activate_objects(&self, action: &str, changes: &[ChangeRecord]) {
        match self.action_delegate() {
            Some(delegate) => delegate.tree_activate_objects(action, changes),
            None => log::debug!("no action delegate for {}", action),
        }
    }

    // === Context menu ===

    /// Menu entries for a selection; the first node decides the kind
    pub fn get_popup_items_for_nodes(&self, nodes: &[NodeHandle]) -> Vec<MenuItem> {
        let mut items = Vec::new();
        let first = nodes.first().and_then(|handle| self.node(handle));
        let kind = first.map(|node| node.kind);
        let has_data = first.is_some_and(|node| node.data.is_some());
        let single = nodes.len() == 1;

        match kind {
            Some(ObjectType::Schema) if has_data => {
                items.push(MenuItem::action("Set as Default Schema", "set_active_schema", single));
                items.push(MenuItem::action("Filter to This Schema", "filter_schema", single));
                items.push(MenuItem::separator("builtins_separator"));
            }
            Some(
                kind @ (ObjectType::Table
                | ObjectType::View
                | ObjectType::TableColumn
                | ObjectType::ViewColumn
                | ObjectType::ViewCollection
                | ObjectType::ColumnCollection),
            ) => {
                let columns = kind.is(ObjectTypeValidation::ColumnObject);
                items.push(MenuItem::action("Select Rows", "select_data", single || columns));
                items.push(MenuItem::separator("builtins_separator"));
            }
            _ => {}
        }

        match kind {
            Some(kind) if has_data && kind.is(ObjectTypeValidation::DatabaseObject) => {
                items.push(MenuItem::action(format!("Alter {}...", kind), "alter", single));
                items.push(MenuItem::action(format!("Drop {}...", kind), "drop", true));
            }
            Some(kind) => {
                if let Some(item) = kind.collection_item().filter(|item| item.is(ObjectTypeValidation::SchemaObject)) {
                    items.push(MenuItem::action(format!("Create {}...", item), "create", single));
                }
            }
            None => {}
        }

        items.push(MenuItem::separator("bottom_plugins_separator"));
        items.push(MenuItem::action("Refresh All", "refresh", true));
        items
    }

    /// Dispatch a menu entry to the action delegate. Unknown entries go to
    /// the sidebar. False without a delegate.
    pub fn activate_popup_item_for_nodes(&self, name: &str, nodes: &[NodeHandle]) -> bool {
        let Some(delegate) = self.action_delegate() else {
            log::debug!("no action delegate for menu item {}", name);
            return false;
        };

        let first_schema = || {
            nodes.first().and_then(|handle| self.node(handle)).map(|node| ChangeRecord {
                kind: ObjectType::Schema,
                schema: String::new(),
                name: node.caption.clone(),
                detail: String::new(),
            })
        };

        match name {
            "refresh" => delegate.tree_refresh(),
            "set_active_schema" | "filter_schema" => {
                let Some(record) = first_schema() else {
                    return false;
                };
                let action = if name == "filter_schema" { "filter" } else { "activate" };
                delegate.tree_activate_objects(action, &[record]);
            }
            "select_data" => {
                let changes: Vec<ChangeRecord> = self
                    .change_records_for_nodes(nodes)
                    .into_iter()
                    .filter(|record| record.kind != ObjectType::Schema)
                    .collect();
                if changes.iter().any(|record| !record.detail.is_empty()) {
                    delegate.tree_activate_objects("select_data_columns", &changes);
                } else {
                    delegate.tree_activate_objects("select_data", &changes);
                }
            }
            "alter" => delegate.tree_alter_objects(&self.change_records_for_nodes(nodes)),
            "drop" => delegate.tree_drop_objects(&self.change_records_for_nodes(nodes)),
            "create" => {
                let Some(handle) = nodes.first() else {
                    return false;
                };
                let Some(item) = self.node(handle).and_then(|node| node.kind.collection_item()) else {
                    return false;
                };
                delegate.tree_create_object(item, &self.get_schema_name(handle), "");
            }
            _ => return delegate.sidebar_action(name),
        }
        true
    }

    /// Describe a selection as change records. Columns map to their owning
    /// table or view with the column name as detail; a column collection
    /// yields one record per column.
    pub fn change_records_for_nodes(&self, nodes: &[NodeHandle]) -> Vec<ChangeRecord> {
        let mut changes = Vec::new();
        for handle in nodes {
            let Some(node) = self.node(handle) else {
                continue;
            };
            let schema = self.get_schema_name(handle);

            match node.kind {
                ObjectType::Schema if node.data.is_some() => changes.push(ChangeRecord {
                    kind: ObjectType::Schema,
                    schema: String::new(),
                    name: node.caption.clone(),
                    detail: String::new(),
                }),
                kind if kind.is(ObjectTypeValidation::SchemaObject) => changes.push(ChangeRecord {
                    kind,
                    schema,
                    name: node.caption.clone(),
                    detail: String::new(),
                }),
                ObjectType::TableColumn | ObjectType::ViewColumn => {
                    let (owner_kind, owner) = if node.kind == ObjectType::TableColumn {
                        (ObjectType::Table, handle.parent().and_then(|collection| collection.parent()))
                    } else {
                        (ObjectType::View, handle.parent())
                    };
                    if let Some(owner) = owner.and_then(|owner| self.node(&owner)) {
                        changes.push(ChangeRecord {
                            kind: owner_kind,
                            schema,
                            name: owner.caption.clone(),
                            detail: node.caption.clone(),
                        });
                    }
                }
                ObjectType::ColumnCollection => {
                    let Some(owner) = handle.parent().and_then(|owner| self.node(&owner)) else {
                        continue;
                    };
                    changes.extend(node.children.iter().map(|column| ChangeRecord {
                        kind: ObjectType::Table,
                        schema: schema.clone(),
                        name: owner.caption.clone(),
                        detail: column.caption.clone(),
                    }));
                }
                _ => {}
            }
        }
        changes
    }

    // === Details ===

    /// Full detail text of the nearest node with a payload, triggering the
    /// lazy load it needs first
    pub fn get_field_description(&mut self, handle: &NodeHandle) -> String {
        if self.is_filtered_view() {
            let Some(path) = self.get_node_path(handle) else {
                return String::new();
            };
            return self
                .forward_to_base(|base| match base.get_node_from_path(&path) {
                    Some(base_node) => base.get_field_description(&base_node),
                    None => String::new(),
                })
                .unwrap_or_default();
        }

        let mut target = handle.clone();
        while self.node_data(&target).is_none() {
            match target.parent() {
                Some(parent) if !target.is_root() => target = parent,
                _ => return String::new(),
            }
        }
        let (Some(kind), Some(path)) = (self.node(&target).map(|node| node.kind), self.get_node_path(&target)) else {
            return String::new();
        };

        match kind {
            ObjectType::Table => self.load_table_details_at(&target, LoadMask::COLUMN_DATA | LoadMask::INDEX_DATA),
            ObjectType::View => self.load_table_details_at(&target, LoadMask::COLUMN_DATA),
            ObjectType::Procedure | ObjectType::Function => self.load_routine_details(&target),
            _ => {}
        }

        // replies applied by the load may have moved the node
        let Some(target) = self.get_node_from_path(&path) else {
            return String::new();
        };
        match (self.node(&target), self.node_data(&target)) {
            (Some(node), Some(data)) => data.borrow_mut().get_details(true, node),
            _ => String::new(),
        }
    }

    // === Reload notification ===

    /// Remember a node whose reload completion should be reported
    pub fn set_notify_on_reload(&mut self, handle: &NodeHandle) {
        self.notify_on_reload_data = self.node_data(handle);
    }

    /// True once, when the remembered node finished reloading
    pub fn notify_on_reload(&mut self, handle: &NodeHandle) -> bool {
        let (Some(recorded), Some(data)) = (self.notify_on_reload_data.as_ref(), self.node_data(handle)) else {
            return false;
        };
        if !Rc::ptr_eq(recorded, &data) || !data.borrow_mut().is_update_complete() {
            return false;
        }
        self.notify_on_reload_data = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier_if_needed("actor", '`'), "actor");
        assert_eq!(quote_identifier_if_needed("film_text$2", '`'), "film_text$2");
        assert_eq!(quote_identifier_if_needed("my table", '`'), "`my table`");
        assert_eq!(quote_identifier_if_needed("123", '`'), "`123`");
        assert_eq!(quote_identifier_if_needed("a`b", '`'), "`a``b`");
        assert_eq!(quote_identifier_if_needed("", '`'), "``");
    }

    #[test]
    fn test_no_connection_placeholder() {
        let mut tree = CatalogTree::new();
        tree.set_no_connection();
        assert!(tree.is_no_connection());
        assert_eq!(tree.root_node().count(), 1);
        assert_eq!(tree.root_node().children[0].caption, NOT_CONNECTED_CAPTION);

        tree.update_schemata(&["sakila".to_string()]);
        assert!(!tree.is_no_connection());
        assert_eq!(tree.root_node().children[0].caption, "sakila");
    }

    #[test]
    fn test_popup_items_per_kind() {
        let mut tree = CatalogTree::new();
        let schema = tree.create_node_for_object("sakila", ObjectType::Schema, "sakila").unwrap();
        let table = tree.create_node_for_object("sakila", ObjectType::Table, "actor").unwrap();

        let names = |items: Vec<MenuItem>| -> Vec<String> { items.into_iter().map(|item| item.internal_name).collect() };

        assert_eq!(
            names(tree.get_popup_items_for_nodes(&[schema.clone()])),
            vec![
                "set_active_schema",
                "filter_schema",
                "builtins_separator",
                "alter",
                "drop",
                "bottom_plugins_separator",
                "refresh"
            ]
        );

        let items = tree.get_popup_items_for_nodes(&[table.clone(), schema.clone()]);
        assert_eq!(items[0].internal_name, "select_data");
        assert!(!items[0].enabled);

        let items = tree.get_popup_items_for_nodes(&[schema.child(2)]);
        assert_eq!(items[0].caption, "Create Procedure...");

        assert_eq!(
            names(tree.get_popup_items_for_nodes(&[])),
            vec!["bottom_plugins_separator", "refresh"]
        );
    }

    #[test]
    fn test_change_records_for_columns() {
        let mut tree = CatalogTree::new();
        let table = tree.create_node_for_object("sakila", ObjectType::Table, "actor").unwrap();
        let columns = table.child(0);
        tree.update_node_children(
            &columns,
            &["actor_id".to_string(), "first_name".to_string()],
            ObjectType::TableColumn,
            false,
            false,
        );

        let records = tree.change_records_for_nodes(&[columns.child(1)]);
        assert_eq!(
            records,
            vec![ChangeRecord {
                kind: ObjectType::Table,
                schema: "sakila".to_string(),
                name: "actor".to_string(),
                detail: "first_name".to_string(),
            }]
        );

        let records = tree.change_records_for_nodes(&[columns.clone()]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].detail, "actor_id");

        let records = tree.change_records_for_nodes(&[table]);
        assert_eq!(records[0].kind, ObjectType::Table);
        assert_eq!(records[0].detail, "");
    }

    #[test]
    fn test_active_schema_is_bold() {
        let mut tree = CatalogTree::new();
        tree.enable_events(false);
        tree.update_schemata(&["sakila".to_string(), "world".to_string()]);

        tree.set_active_schema("WORLD");
        assert!(!tree.root_node().children[0].bold);
        assert!(tree.root_node().children[1].bold);
        assert!(tree.root_node().children[1].expanded);

        tree.set_active_schema("sakila");
        assert!(tree.root_node().children[0].bold);
        assert!(!tree.root_node().children[1].bold);
        assert_eq!(tree.active_schema(), "sakila");
    }
}
