//! Node payloads
//!
//! Every real catalog node carries one `NodeData` behind a shared handle so the
//! base tree and its filtered view observe the same record.

use std::cell::RefCell;
use std::rc::Rc;

use bitflags::bitflags;

use super::kind::ObjectType;
use super::token::externalize_token;
use crate::tree::TreeNode;

bitflags! {
    /// Independently loadable sub-data of a table or view
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct LoadMask: u16 {
        const COLUMN_DATA = 0x01;
        const TRIGGER_DATA = 0x02;
        const INDEX_DATA = 0x04;
        const FK_DATA = 0x08;
    }
}

impl LoadMask {
    /// Sub-data loaded when an object of `kind` is expanded
    pub fn standard_for(kind: ObjectType) -> LoadMask {
        match kind {
            ObjectType::Table => LoadMask::all(),
            ObjectType::View => LoadMask::COLUMN_DATA,
            _ => LoadMask::empty(),
        }
    }

    /// Category that holds children of `kind`
    pub fn for_child(kind: ObjectType) -> LoadMask {
        match kind {
            ObjectType::TableColumn | ObjectType::ViewColumn => LoadMask::COLUMN_DATA,
            ObjectType::Index => LoadMask::INDEX_DATA,
            ObjectType::Trigger => LoadMask::TRIGGER_DATA,
            ObjectType::ForeignKey => LoadMask::FK_DATA,
            _ => LoadMask::empty(),
        }
    }

    /// Child kind stored for a single category under an `owner` object
    pub fn child_kind(self, owner: ObjectType) -> Option<ObjectType> {
        if self == LoadMask::COLUMN_DATA {
            return match owner {
                ObjectType::Table => Some(ObjectType::TableColumn),
                ObjectType::View => Some(ObjectType::ViewColumn),
                _ => None,
            };
        }
        if owner != ObjectType::Table {
            return None;
        }
        if self == LoadMask::INDEX_DATA {
            Some(ObjectType::Index)
        } else if self == LoadMask::TRIGGER_DATA {
            Some(ObjectType::Trigger)
        } else if self == LoadMask::FK_DATA {
            Some(ObjectType::ForeignKey)
        } else {
            None
        }
    }
}

/// Payload handle shared between a base tree and its filtered view
pub type SharedData = Rc<RefCell<NodeData>>;

/// Lazy-load status of a schema
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaData {
    pub fetched: bool,
    pub fetching: bool,
}

/// Lazy-load status shared by tables, views and routines
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectData {
    pub fetched: bool,
    pub fetching: bool,
}

/// Table and view state: which sub-data is loaded or in flight
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewData {
    pub object: ObjectData,
    pub columns_load_error: bool,
    loaded_mask: LoadMask,
    loading_mask: LoadMask,
    reload_mask: LoadMask,
}

impl ViewData {
    pub fn get_loaded_mask(&self) -> LoadMask {
        self.loaded_mask
    }

    pub fn get_loading_mask(&self) -> LoadMask {
        self.loading_mask
    }

    pub fn get_reload_mask(&self) -> LoadMask {
        self.reload_mask
    }

    /// Mark `mask` as in flight, keeping bits already in flight
    pub fn set_loading_mask(&mut self, mask: LoadMask) {
        self.loading_mask |= mask;
    }

    /// Loading of `mask` completed
    pub fn set_loaded_data(&mut self, mask: LoadMask) {
        let finished = self.loading_mask & mask;
        self.loading_mask.remove(finished);
        self.loaded_mask |= mask;
    }

    /// Forget loaded sub-data; bits that were never loaded are ignored
    pub fn set_unloaded_data(&mut self, mask: LoadMask) {
        let present = self.loaded_mask & mask;
        self.loaded_mask.remove(present);
    }

    /// Release in-flight bits whose fetch failed
    pub fn cancel_loading(&mut self, mask: LoadMask) {
        self.loading_mask.remove(mask);
    }

    pub fn set_reload_mask(&mut self, mask: LoadMask) {
        self.reload_mask = mask;
    }

    pub fn is_data_loaded(&self, mask: LoadMask) -> bool {
        self.loaded_mask.contains(mask)
    }

    /// True once everything recorded in the reload mask is loaded again.
    /// Reporting completion consumes the reload mask.
    pub fn is_update_complete(&mut self) -> bool {
        if self.reload_mask.is_empty() || !self.loaded_mask.contains(self.reload_mask) {
            return false;
        }
        self.reload_mask = LoadMask::empty();
        true
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnData {
    pub name: String,
    pub data_type: String,
    pub default_value: String,
    pub charset_collation: String,
    pub is_pk: bool,
    pub is_fk: bool,
    pub is_id: bool,
    pub is_idx: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexData {
    pub visible: bool,
    pub unique: bool,
    /// Internalized index type token
    pub index_type: u8,
    pub columns: Vec<String>,
}

impl Default for IndexData {
    fn default() -> Self {
        Self {
            visible: true,
            unique: false,
            index_type: 0,
            columns: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriggerData {
    pub event_manipulation: u8,
    pub timing: u8,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ForeignKeyData {
    pub update_rule: u8,
    pub delete_rule: u8,
    pub referenced_table: String,
    pub from_cols: Vec<String>,
    pub to_cols: Vec<String>,
}

/// Kind-specific part of a payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    Schema(SchemaData),
    Table(ViewData),
    View(ViewData),
    Procedure(ObjectData),
    Function(ObjectData),
    TableColumn(ColumnData),
    ViewColumn(ColumnData),
    Index(IndexData),
    Trigger(TriggerData),
    ForeignKey(ForeignKeyData),
}

/// Payload of one catalog object
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeData {
    /// Rendered detail text, regenerated when empty
    pub details: String,
    pub payload: Payload,
}

fn detail_row(label: &str, value: &str) -> String {
    format!("  {:<20} {}\n", label, value)
}

impl NodeData {
    /// Fresh default payload for `kind`; grouping kinds have none
    pub fn new(kind: ObjectType) -> Option<NodeData> {
        let payload = match kind {
            ObjectType::Schema => Payload::Schema(SchemaData::default()),
            ObjectType::Table => Payload::Table(ViewData::default()),
            ObjectType::View => Payload::View(ViewData::default()),
            ObjectType::Procedure => Payload::Procedure(ObjectData::default()),
            ObjectType::Function => Payload::Function(ObjectData::default()),
            ObjectType::TableColumn => Payload::TableColumn(ColumnData::default()),
            ObjectType::ViewColumn => Payload::ViewColumn(ColumnData::default()),
            ObjectType::Index => Payload::Index(IndexData::default()),
            ObjectType::Trigger => Payload::Trigger(TriggerData::default()),
            ObjectType::ForeignKey => Payload::ForeignKey(ForeignKeyData::default()),
            _ => return None,
        };
        Some(Self::from_payload(payload))
    }

    /// Default payload for a named object; columns record their name
    pub fn for_object(kind: ObjectType, name: &str) -> Option<NodeData> {
        let mut data = Self::new(kind)?;
        if let Payload::TableColumn(column) | Payload::ViewColumn(column) = &mut data.payload {
            column.name = name.to_string();
        }
        Some(data)
    }

    pub fn from_payload(payload: Payload) -> NodeData {
        NodeData {
            details: String::new(),
            payload,
        }
    }

    pub fn shared(self) -> SharedData {
        Rc::new(RefCell::new(self))
    }

    pub fn get_type(&self) -> ObjectType {
        match self.payload {
            Payload::Schema(_) => ObjectType::Schema,
            Payload::Table(_) => ObjectType::Table,
            Payload::View(_) => ObjectType::View,
            Payload::Procedure(_) => ObjectType::Procedure,
            Payload::Function(_) => ObjectType::Function,
            Payload::TableColumn(_) => ObjectType::TableColumn,
            Payload::ViewColumn(_) => ObjectType::ViewColumn,
            Payload::Index(_) => ObjectType::Index,
            Payload::Trigger(_) => ObjectType::Trigger,
            Payload::ForeignKey(_) => ObjectType::ForeignKey,
        }
    }

    /// Human label of the object kind
    pub fn get_object_name(&self) -> String {
        self.get_type().to_string()
    }

    pub fn as_schema(&self) -> Option<&SchemaData> {
        match &self.payload {
            Payload::Schema(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_schema_mut(&mut self) -> Option<&mut SchemaData> {
        match &mut self.payload {
            Payload::Schema(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_view(&self) -> Option<&ViewData> {
        match &self.payload {
            Payload::Table(data) | Payload::View(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_view_mut(&mut self) -> Option<&mut ViewData> {
        match &mut self.payload {
            Payload::Table(data) | Payload::View(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectData> {
        match &self.payload {
            Payload::Table(data) | Payload::View(data) => Some(&data.object),
            Payload::Procedure(data) | Payload::Function(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ObjectData> {
        match &mut self.payload {
            Payload::Table(data) | Payload::View(data) => Some(&mut data.object),
            Payload::Procedure(data) | Payload::Function(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_column(&self) -> Option<&ColumnData> {
        match &self.payload {
            Payload::TableColumn(data) | Payload::ViewColumn(data) => Some(data),
            _ => None,
        }
    }

    /// Merge fetched values into this payload in place.
    ///
    /// Details are always taken; kind-specific fields only when both sides
    /// carry them (tables and views share their load state).
    pub fn copy_from(&mut self, other: &NodeData) {
        self.details = other.details.clone();

        if let (Some(mine), Some(theirs)) = (self.as_object_mut(), other.as_object()) {
            *mine = theirs.clone();
        }

        match (&mut self.payload, &other.payload) {
            (Payload::Schema(mine), Payload::Schema(theirs)) => *mine = theirs.clone(),
            (
                Payload::Table(mine) | Payload::View(mine),
                Payload::Table(theirs) | Payload::View(theirs),
            ) => {
                mine.loaded_mask = theirs.loaded_mask;
                mine.loading_mask = theirs.loading_mask;
                mine.columns_load_error = theirs.columns_load_error;
            }
            (
                Payload::TableColumn(mine) | Payload::ViewColumn(mine),
                Payload::TableColumn(theirs) | Payload::ViewColumn(theirs),
            ) => *mine = theirs.clone(),
            (Payload::Index(mine), Payload::Index(theirs)) => *mine = theirs.clone(),
            (Payload::Trigger(mine), Payload::Trigger(theirs)) => *mine = theirs.clone(),
            (Payload::ForeignKey(mine), Payload::ForeignKey(theirs)) => *mine = theirs.clone(),
            _ => {}
        }
    }

    pub fn is_update_complete(&mut self) -> bool {
        match self.as_view_mut() {
            Some(view) => view.is_update_complete(),
            None => false,
        }
    }

    fn header(&self, node: &TreeNode) -> String {
        format!("{}: {}\n\n", self.get_object_name(), node.caption)
    }

    /// Render the detail text of this object. `full` adds a header naming the
    /// object; `node` is the tree node holding this payload.
    pub fn get_details(&mut self, full: bool, node: &TreeNode) -> String {
        let header = self.header(node);
        let kind = self.get_type();

        match &self.payload {
            Payload::Schema(_) => {
                if full {
                    header
                } else {
                    self.details.clone()
                }
            }
            Payload::Procedure(_) | Payload::Function(_) => header + &self.details,
            Payload::Table(view) | Payload::View(view) => {
                let mut text = if full { header } else { String::new() };

                if view.loaded_mask.contains(LoadMask::COLUMN_DATA) {
                    let columns = if kind == ObjectType::Table {
                        node.child(0)
                    } else {
                        Some(node)
                    };
                    if let Some(columns) = columns.filter(|columns| columns.count() > 0) {
                        text.push_str("Columns:\n");
                        text.push_str(&children_details(columns));
                        text.push('\n');
                    }
                }

                if kind == ObjectType::Table && view.loaded_mask.contains(LoadMask::FK_DATA) {
                    if let Some(keys) = node.child(2).filter(|keys| keys.count() > 0) {
                        text.push_str("Related Tables:\n");
                        text.push_str(&children_details(keys));
                    }
                }

                if view.columns_load_error {
                    text.push_str(&self.details);
                }
                text
            }
            Payload::TableColumn(column) | Payload::ViewColumn(column) => {
                if self.details.is_empty() {
                    let mut data_type = column.data_type.clone();
                    if column.is_pk {
                        data_type.push_str(" PK");
                    }
                    self.details = detail_row(&column.name, &data_type);
                }
                if !full {
                    return self.details.clone();
                }
                let mut text = header;
                if !column.charset_collation.is_empty() {
                    text.push_str(&format!("Collation: {}\n\n", column.charset_collation));
                }
                text.push_str("Definition:\n");
                text.push_str(&self.details);
                text
            }
            Payload::Index(index) => {
                if self.details.is_empty() {
                    let mut rows = detail_row("Type", externalize_token(index.index_type));
                    rows.push_str(&detail_row("Unique", yes_no(index.unique)));
                    rows.push_str(&detail_row("Visible", yes_no(index.visible)));
                    for (position, column) in index.columns.iter().enumerate() {
                        let label = if position == 0 { "Columns" } else { "" };
                        rows.push_str(&detail_row(label, column));
                    }
                    self.details = rows;
                }
                with_definition(full, header, &self.details)
            }
            Payload::Trigger(trigger) => {
                if self.details.is_empty() {
                    let mut rows = detail_row("Event", externalize_token(trigger.event_manipulation));
                    rows.push_str(&detail_row("Timing", externalize_token(trigger.timing)));
                    self.details = rows;
                }
                with_definition(full, header, &self.details)
            }
            Payload::ForeignKey(key) => {
                if self.details.is_empty() {
                    let target = format!(
                        "{} ({} -> {})",
                        key.referenced_table,
                        key.from_cols.join(", "),
                        key.to_cols.join(", ")
                    );
                    let mut rows = detail_row("Target", &target);
                    rows.push_str(&detail_row("On Update", externalize_token(key.update_rule)));
                    rows.push_str(&detail_row("On Delete", externalize_token(key.delete_rule)));
                    self.details = rows;
                }
                with_definition(full, header, &self.details)
            }
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn with_definition(full: bool, header: String, details: &str) -> String {
    if full {
        format!("{}Definition:\n{}", header, details)
    } else {
        details.to_string()
    }
}

fn children_details(parent: &TreeNode) -> String {
    let mut text = String::new();
    for child in &parent.children {
        if let Some(data) = &child.data {
            text.push_str(&data.borrow_mut().get_details(false, child));
        }
    }
    text
}
