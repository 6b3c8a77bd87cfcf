//! Catalog tree: an in-memory mirror of a database's schema hierarchy
//!
//! Schemas, their objects and the objects' sub-data are added on demand
//! through a [`FetchDelegate`](crate::delegate::FetchDelegate). A second tree
//! can be linked to a base tree as a filtered view sharing the base payloads.

mod actions;
mod data;
mod filter;
mod kind;
mod loading;
mod token;
mod tree;


pub use actions::{quote_identifier_if_needed, MenuItem, MenuItemKind};
pub use data::*;
pub use filter::{get_filter_wildcard, FilterType, GlobPattern};
pub use kind::{ObjectType, ObjectTypeValidation};
pub use token::{externalize_token, internalize_token};
pub use tree::CatalogTree;

pub const FETCHING_CAPTION: &str = "fetching...";
pub const ERROR_FETCHING_CAPTION: &str = "could not be fetched";
pub const NOT_CONNECTED_CAPTION: &str = "Not connected";

pub const TABLES_CAPTION: &str = "Tables";
pub const VIEWS_CAPTION: &str = "Views";
pub const PROCEDURES_CAPTION: &str = "Stored Procedures";
pub const FUNCTIONS_CAPTION: &str = "Functions";

pub const COLUMNS_CAPTION: &str = "Columns";
pub const INDEXES_CAPTION: &str = "Indexes";
pub const TRIGGERS_CAPTION: &str = "Triggers";
pub const FOREIGN_KEYS_CAPTION: &str = "Foreign Keys";

pub const TABLES_NODE_INDEX: usize = 0;
pub const VIEWS_NODE_INDEX: usize = 1;
pub const PROCEDURES_NODE_INDEX: usize = 2;
pub const FUNCTIONS_NODE_INDEX: usize = 3;

pub const TABLE_COLUMNS_NODE_INDEX: usize = 0;
pub const TABLE_INDEXES_NODE_INDEX: usize = 1;
pub const TABLE_FOREIGN_KEYS_NODE_INDEX: usize = 2;
pub const TABLE_TRIGGERS_NODE_INDEX: usize = 3;

/// Plain caption of a collection node
pub fn collection_caption(kind: ObjectType) -> Option<&'static str> {
    match kind {
        ObjectType::TableCollection => Some(TABLES_CAPTION),
        ObjectType::ViewCollection => Some(VIEWS_CAPTION),
        ObjectType::ProcedureCollection => Some(PROCEDURES_CAPTION),
        ObjectType::FunctionCollection => Some(FUNCTIONS_CAPTION),
        ObjectType::ColumnCollection => Some(COLUMNS_CAPTION),
        ObjectType::IndexCollection => Some(INDEXES_CAPTION),
        ObjectType::TriggerCollection => Some(TRIGGERS_CAPTION),
        ObjectType::ForeignKeyCollection => Some(FOREIGN_KEYS_CAPTION),
        _ => None,
    }
}
