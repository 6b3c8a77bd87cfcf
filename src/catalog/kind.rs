//! Object kinds known to the catalog tree

use serde::{Deserialize, Serialize};

/// Kind of a catalog tree node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    Schema,
    Table,
    View,
    Procedure,
    Function,
    TableCollection,
    ViewCollection,
    ProcedureCollection,
    FunctionCollection,
    ColumnCollection,
    IndexCollection,
    TriggerCollection,
    ForeignKeyCollection,
    Trigger,
    TableColumn,
    ViewColumn,
    ForeignKey,
    Index,
    ForeignKeyColumn,
    IndexColumn,
    Any,
    NoneType,
}

/// Groups of kinds used when deciding what an operation applies to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectTypeValidation {
    /// Schemas and the objects they hold
    DatabaseObject,
    /// Objects that live directly inside a schema
    SchemaObject,
    TableOrView,
    ColumnObject,
    RoutineObject,
}

impl ObjectType {
    /// The four object kinds held by a schema, in collection order
    pub const SCHEMA_OBJECTS: [ObjectType; 4] = [
        ObjectType::Table,
        ObjectType::View,
        ObjectType::Procedure,
        ObjectType::Function,
    ];

    pub fn is_collection(self) -> bool {
        matches!(
            self,
            ObjectType::TableCollection
                | ObjectType::ViewCollection
                | ObjectType::ProcedureCollection
                | ObjectType::FunctionCollection
                | ObjectType::ColumnCollection
                | ObjectType::IndexCollection
                | ObjectType::TriggerCollection
                | ObjectType::ForeignKeyCollection
        )
    }

    /// Composite objects carry loaded/loading masks
    pub fn is_composite(self) -> bool {
        matches!(self, ObjectType::Table | ObjectType::View)
    }

    /// Position of this kind's collection under a schema node
    pub fn schema_collection_index(self) -> Option<usize> {
        match self {
            ObjectType::Table => Some(0),
            ObjectType::View => Some(1),
            ObjectType::Procedure => Some(2),
            ObjectType::Function => Some(3),
            _ => None,
        }
    }

    /// Position of this kind's collection under a table node
    pub fn table_collection_index(self) -> Option<usize> {
        match self {
            ObjectType::TableColumn => Some(0),
            ObjectType::Index => Some(1),
            ObjectType::ForeignKey => Some(2),
            ObjectType::Trigger => Some(3),
            _ => None,
        }
    }

    /// Kind of the items a collection node groups
    pub fn collection_item(self) -> Option<ObjectType> {
        match self {
            ObjectType::TableCollection => Some(ObjectType::Table),
            ObjectType::ViewCollection => Some(ObjectType::View),
            ObjectType::ProcedureCollection => Some(ObjectType::Procedure),
            ObjectType::FunctionCollection => Some(ObjectType::Function),
            ObjectType::ColumnCollection => Some(ObjectType::TableColumn),
            ObjectType::IndexCollection => Some(ObjectType::Index),
            ObjectType::TriggerCollection => Some(ObjectType::Trigger),
            ObjectType::ForeignKeyCollection => Some(ObjectType::ForeignKey),
            _ => None,
        }
    }

    /// Check whether this kind belongs to the given group
    pub fn is(self, validation: ObjectTypeValidation) -> bool {
        match validation {
            ObjectTypeValidation::DatabaseObject => {
                self == ObjectType::Schema || self.schema_collection_index().is_some()
            }
            ObjectTypeValidation::SchemaObject => self.schema_collection_index().is_some(),
            ObjectTypeValidation::TableOrView => self.is_composite(),
            ObjectTypeValidation::ColumnObject => {
                matches!(self, ObjectType::TableColumn | ObjectType::ViewColumn)
            }
            ObjectTypeValidation::RoutineObject => {
                matches!(self, ObjectType::Procedure | ObjectType::Function)
            }
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ObjectType::Schema => "Schema",
            ObjectType::Table => "Table",
            ObjectType::View => "View",
            ObjectType::Procedure => "Procedure",
            ObjectType::Function => "Function",
            ObjectType::TableCollection => "Tables",
            ObjectType::ViewCollection => "Views",
            ObjectType::ProcedureCollection => "Procedures",
            ObjectType::FunctionCollection => "Functions",
            ObjectType::ColumnCollection => "Columns",
            ObjectType::IndexCollection => "Indexes",
            ObjectType::TriggerCollection => "Triggers",
            ObjectType::ForeignKeyCollection => "Foreign Keys",
            ObjectType::Trigger => "Trigger",
            ObjectType::TableColumn => "Column",
            ObjectType::ViewColumn => "Column",
            ObjectType::ForeignKey => "Foreign Key",
            ObjectType::Index => "Index",
            ObjectType::ForeignKeyColumn => "Foreign Key Column",
            ObjectType::IndexColumn => "Index Column",
            ObjectType::Any => "Any",
            ObjectType::NoneType => "None",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_groups() {
        assert!(ObjectType::Schema.is(ObjectTypeValidation::DatabaseObject));
        assert!(ObjectType::Function.is(ObjectTypeValidation::DatabaseObject));
        assert!(!ObjectType::Trigger.is(ObjectTypeValidation::DatabaseObject));
        assert!(!ObjectType::TableCollection.is(ObjectTypeValidation::DatabaseObject));
        assert!(!ObjectType::Any.is(ObjectTypeValidation::DatabaseObject));

        assert!(ObjectType::Function.is(ObjectTypeValidation::SchemaObject));
        assert!(!ObjectType::Schema.is(ObjectTypeValidation::SchemaObject));
        assert!(!ObjectType::TableColumn.is(ObjectTypeValidation::SchemaObject));

        assert!(ObjectType::View.is(ObjectTypeValidation::TableOrView));
        assert!(!ObjectType::Procedure.is(ObjectTypeValidation::TableOrView));

        assert!(ObjectType::ViewColumn.is(ObjectTypeValidation::ColumnObject));
        assert!(ObjectType::Procedure.is(ObjectTypeValidation::RoutineObject));
        assert!(!ObjectType::Table.is(ObjectTypeValidation::RoutineObject));
    }

    #[test]
    fn test_collection_positions() {
        for (index, kind) in ObjectType::SCHEMA_OBJECTS.iter().enumerate() {
            assert_eq!(kind.schema_collection_index(), Some(index));
        }
        assert_eq!(ObjectType::TableColumn.table_collection_index(), Some(0));
        assert_eq!(ObjectType::Trigger.table_collection_index(), Some(3));
        assert_eq!(ObjectType::ViewColumn.table_collection_index(), None);
        assert_eq!(
            ObjectType::ForeignKeyCollection.collection_item(),
            Some(ObjectType::ForeignKey)
        );
    }
}
