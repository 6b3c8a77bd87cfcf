//! In-memory catalog serving fetch requests from a TOML description
//!
//! ```toml
//! [[schemas]]
//! name = "sakila"
//!
//! [[schemas.tables]]
//! name = "actor"
//! columns = [{ name = "actor_id", data_type = "smallint", is_primary_key = true }]
//! indexes = [{ name = "PRIMARY", index_type = "BTREE", unique = true, columns = ["actor_id"] }]
//! ```
//!
//! Every request is recorded. In deferred mode replies are queued until
//! [`StaticCatalog::flush`], which models a data source answering late.

use std::cell::{Cell, RefCell};
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::catalog::{
    internalize_token, ColumnData, ForeignKeyData, IndexData, LoadMask, NodeData, ObjectType, Payload,
    TriggerData,
};
use crate::delegate::{DetailsBatch, FetchDelegate, FetchReply, ReplySender, SchemaContents};
use crate::error::CatalogError;

/// Column definition
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: String,
    pub default_value: String,
    pub collation: String,
    pub is_primary_key: bool,
    pub is_identity: bool,
    pub is_foreign_key: bool,
    pub is_indexed: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct IndexDef {
    pub name: String,
    pub index_type: String,
    pub unique: bool,
    pub visible: bool,
    pub columns: Vec<String>,
}

impl Default for IndexDef {
    fn default() -> Self {
        Self {
            name: String::new(),
            index_type: "BTREE".to_string(),
            unique: false,
            visible: true,
            columns: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TriggerDef {
    pub name: String,
    pub event: String,
    pub timing: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForeignKeyDef {
    pub name: String,
    pub referenced_table: String,
    pub from_columns: Vec<String>,
    pub to_columns: Vec<String>,
    pub on_update: String,
    pub on_delete: String,
}

/// Table definition
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub indexes: Vec<IndexDef>,
    pub triggers: Vec<TriggerDef>,
    pub foreign_keys: Vec<ForeignKeyDef>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ViewDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    /// Error reported instead of the columns
    pub broken: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RoutineDef {
    pub name: String,
    pub definition: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SchemaDef {
    pub name: String,
    pub tables: Vec<TableDef>,
    pub views: Vec<ViewDef>,
    pub procedures: Vec<RoutineDef>,
    pub functions: Vec<RoutineDef>,
}

impl SchemaDef {
    fn contents(&self, object_filter: Option<&LikePattern>) -> SchemaContents {
        let names = |list: Vec<&String>| -> Vec<String> {
            list.into_iter()
                .filter(|name| object_filter.map_or(true, |pattern| pattern.matches(name.as_str())))
                .cloned()
                .collect()
        };
        SchemaContents {
            tables: names(self.tables.iter().map(|table| &table.name).collect()),
            views: names(self.views.iter().map(|view| &view.name).collect()),
            procedures: names(self.procedures.iter().map(|routine| &routine.name).collect()),
            functions: names(self.functions.iter().map(|routine| &routine.name).collect()),
        }
    }
}

/// Whole catalog
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogFixture {
    pub schemas: Vec<SchemaDef>,
}

/// Request received by a [`StaticCatalog`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchRequest {
    SchemaList,
    DataForFilter {
        schema_filter: String,
        object_filter: String,
    },
    SchemaContents {
        schema: String,
    },
    ObjectDetails {
        schema: String,
        object: String,
        kind: ObjectType,
        mask: LoadMask,
    },
    RoutineDetails {
        schema: String,
        object: String,
        kind: ObjectType,
    },
}

/// SQL LIKE matcher: `%` any run, `_` one character, `\` escapes
struct LikePattern(Option<Regex>);

impl LikePattern {
    fn new(pattern: &str) -> Self {
        let mut expression = String::from("(?is)^");
        let mut chars = pattern.chars();
        let mut buffer = [0u8; 4];
        while let Some(ch) = chars.next() {
            match ch {
                '%' => expression.push_str(".*"),
                '_' => expression.push('.'),
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        expression.push_str(&regex::escape(escaped.encode_utf8(&mut buffer)));
                    }
                }
                other => expression.push_str(&regex::escape(other.encode_utf8(&mut buffer))),
            }
        }
        expression.push('$');
        Self(Regex::new(&expression).ok())
    }

    fn matches(&self, text: &str) -> bool {
        self.0.as_ref().is_some_and(|regex| regex.is_match(text))
    }
}

/// Fetch delegate answering from a [`CatalogFixture`]
#[derive(Default)]
pub struct StaticCatalog {
    fixture: CatalogFixture,
    requests: RefCell<Vec<FetchRequest>>,
    deferred: Cell<bool>,
    queue: RefCell<Vec<(ReplySender, FetchReply)>>,
}

impl StaticCatalog {
    pub fn new(fixture: CatalogFixture) -> Self {
        Self {
            fixture,
            ..Default::default()
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogError> {
        Ok(Self::new(toml::from_str(contents)?))
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn fixture(&self) -> &CatalogFixture {
        &self.fixture
    }

    /// Queue replies instead of sending them right away
    pub fn set_deferred(&self, deferred: bool) {
        self.deferred.set(deferred);
    }

    /// Send every queued reply. Returns how many were delivered.
    pub fn flush(&self) -> usize {
        let queued = std::mem::take(&mut *self.queue.borrow_mut());
        queued
            .into_iter()
            .filter(|(sender, reply)| sender.send(reply.clone()))
            .count()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.borrow().clone()
    }

    pub fn take_requests(&self) -> Vec<FetchRequest> {
        std::mem::take(&mut *self.requests.borrow_mut())
    }

    fn record(&self, request: FetchRequest) {
        log::trace!("fixture request {:?}", request);
        self.requests.borrow_mut().push(request);
    }

    fn reply(&self, sender: &ReplySender, reply: FetchReply) {
        if self.deferred.get() {
            self.queue.borrow_mut().push((sender.clone(), reply));
        } else {
            sender.send(reply);
        }
    }

    fn schema(&self, name: &str) -> Option<&SchemaDef> {
        self.fixture.schemas.iter().find(|schema| schema.name == name)
    }

    fn table_batches(&self, schema: &str, table: &TableDef, mask: LoadMask) -> Vec<DetailsBatch> {
        let mut batches = Vec::new();
        for category in mask.iter() {
            let (child_kind, names, details): (ObjectType, Vec<String>, Vec<NodeData>) = if category
                == LoadMask::COLUMN_DATA
            {
                (
                    ObjectType::TableColumn,
                    table.columns.iter().map(|column| column.name.clone()).collect(),
                    table
                        .columns
                        .iter()
                        .map(|column| column_payload(ObjectType::TableColumn, column))
                        .collect(),
                )
            } else if category == LoadMask::INDEX_DATA {
                (
                    ObjectType::Index,
                    table.indexes.iter().map(|index| index.name.clone()).collect(),
                    table.indexes.iter().map(index_payload).collect(),
                )
            } else if category == LoadMask::TRIGGER_DATA {
                (
                    ObjectType::Trigger,
                    table.triggers.iter().map(|trigger| trigger.name.clone()).collect(),
                    table.triggers.iter().map(trigger_payload).collect(),
                )
            } else {
                (
                    ObjectType::ForeignKey,
                    table.foreign_keys.iter().map(|key| key.name.clone()).collect(),
                    table.foreign_keys.iter().map(foreign_key_payload).collect(),
                )
            };

            batches.push(DetailsBatch {
                schema: schema.to_string(),
                object: table.name.clone(),
                object_kind: ObjectType::Table,
                child_kind,
                names,
                details,
                sorted: false,
                just_append: false,
            });
        }
        batches
    }
}

fn token(text: &str) -> u8 {
    internalize_token(&text.to_uppercase())
}

fn column_payload(kind: ObjectType, column: &ColumnDef) -> NodeData {
    let data = ColumnData {
        name: column.name.clone(),
        data_type: column.data_type.clone(),
        default_value: column.default_value.clone(),
        charset_collation: column.collation.clone(),
        is_pk: column.is_primary_key,
        is_fk: column.is_foreign_key,
        is_id: column.is_identity,
        is_idx: column.is_indexed,
    };
    let payload = if kind == ObjectType::ViewColumn {
        Payload::ViewColumn(data)
    } else {
        Payload::TableColumn(data)
    };
    NodeData::from_payload(payload)
}

fn index_payload(index: &IndexDef) -> NodeData {
    NodeData::from_payload(Payload::Index(IndexData {
        visible: index.visible,
        unique: index.unique,
        index_type: token(&index.index_type),
        columns: index.columns.clone(),
    }))
}

fn trigger_payload(trigger: &TriggerDef) -> NodeData {
    NodeData::from_payload(Payload::Trigger(TriggerData {
        event_manipulation: token(&trigger.event),
        timing: token(&trigger.timing),
    }))
}

fn foreign_key_payload(key: &ForeignKeyDef) -> NodeData {
    NodeData::from_payload(Payload::ForeignKey(ForeignKeyData {
        update_rule: token(&key.on_update),
        delete_rule: token(&key.on_delete),
        referenced_table: key.referenced_table.clone(),
        from_cols: key.from_columns.clone(),
        to_cols: key.to_columns.clone(),
    }))
}

impl FetchDelegate for StaticCatalog {
    fn fetch_schema_list(&self) -> Vec<String> {
        self.record(FetchRequest::SchemaList);
        self.fixture.schemas.iter().map(|schema| schema.name.clone()).collect()
    }

    fn fetch_data_for_filter(&self, schema_filter: &str, object_filter: &str, reply: ReplySender) -> bool {
        self.record(FetchRequest::DataForFilter {
            schema_filter: schema_filter.to_string(),
            object_filter: object_filter.to_string(),
        });

        let schema_pattern = LikePattern::new(schema_filter);
        let object_pattern = LikePattern::new(object_filter);
        for schema in self.fixture.schemas.iter().filter(|schema| schema_pattern.matches(&schema.name)) {
            self.reply(
                &reply,
                FetchReply::SchemaContents {
                    schema: schema.name.clone(),
                    contents: schema.contents(Some(&object_pattern)),
                    just_append: true,
                },
            );
        }
        true
    }

    fn fetch_schema_contents(&self, schema_name: &str, reply: ReplySender) -> bool {
        self.record(FetchRequest::SchemaContents {
            schema: schema_name.to_string(),
        });

        let answer = match self.schema(schema_name) {
            Some(schema) => FetchReply::SchemaContents {
                schema: schema.name.clone(),
                contents: schema.contents(None),
                just_append: false,
            },
            None => FetchReply::SchemaContentsFailed {
                schema: schema_name.to_string(),
            },
        };
        self.reply(&reply, answer);
        true
    }

    fn fetch_object_details(
        &self,
        schema_name: &str,
        object_name: &str,
        kind: ObjectType,
        mask: LoadMask,
        reply: ReplySender,
    ) -> bool {
        self.record(FetchRequest::ObjectDetails {
            schema: schema_name.to_string(),
            object: object_name.to_string(),
            kind,
            mask,
        });

        let failed = |mask: LoadMask, message: &str| FetchReply::ObjectDetailsFailed {
            schema: schema_name.to_string(),
            object: object_name.to_string(),
            kind,
            mask,
            message: message.to_string(),
        };
        let schema = self.schema(schema_name);

        match kind {
            ObjectType::Table => {
                match schema.and_then(|schema| schema.tables.iter().find(|table| table.name == object_name)) {
                    Some(table) => {
                        for batch in self.table_batches(schema_name, table, mask) {
                            self.reply(&reply, FetchReply::ObjectDetails(batch));
                        }
                    }
                    None => self.reply(&reply, failed(mask, "table not found")),
                }
            }
            ObjectType::View => {
                let Some(view) = schema.and_then(|schema| schema.views.iter().find(|view| view.name == object_name))
                else {
                    self.reply(&reply, failed(mask, "view not found"));
                    return true;
                };
                let extra = mask - LoadMask::COLUMN_DATA;
                if !extra.is_empty() {
                    self.reply(&reply, failed(extra, "views only have columns"));
                }
                if !mask.contains(LoadMask::COLUMN_DATA) {
                    return true;
                }
                let answer = match &view.broken {
                    Some(message) => failed(LoadMask::COLUMN_DATA, message),
                    None => FetchReply::ObjectDetails(DetailsBatch {
                        schema: schema_name.to_string(),
                        object: view.name.clone(),
                        object_kind: ObjectType::View,
                        child_kind: ObjectType::ViewColumn,
                        names: view.columns.iter().map(|column| column.name.clone()).collect(),
                        details: view
                            .columns
                            .iter()
                            .map(|column| column_payload(ObjectType::ViewColumn, column))
                            .collect(),
                        sorted: false,
                        just_append: false,
                    }),
                };
                self.reply(&reply, answer);
            }
            _ => return false,
        }
        true
    }

    fn fetch_routine_details(
        &self,
        schema_name: &str,
        object_name: &str,
        kind: ObjectType,
        reply: ReplySender,
    ) -> bool {
        self.record(FetchRequest::RoutineDetails {
            schema: schema_name.to_string(),
            object: object_name.to_string(),
            kind,
        });

        let routines = match (self.schema(schema_name), kind) {
            (Some(schema), ObjectType::Procedure) => &schema.procedures,
            (Some(schema), ObjectType::Function) => &schema.functions,
            _ => return false,
        };
        let Some(routine) = routines.iter().find(|routine| routine.name == object_name) else {
            log::debug!("fixture has no {} {}.{}", kind, schema_name, object_name);
            return false;
        };
        self.reply(
            &reply,
            FetchReply::RoutineDetails {
                schema: schema_name.to_string(),
                object: routine.name.clone(),
                kind,
                definition: routine.definition.clone(),
            },
        );
        true
    }
}
