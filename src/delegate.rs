//! Collaborator interfaces of the catalog tree
//!
//! A [`FetchDelegate`] retrieves catalog data on request and answers through a
//! [`ReplySender`], either before returning or at any later point on the same
//! thread. An [`ActionDelegate`] receives user-triggered actions.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::catalog::{LoadMask, NodeData, ObjectType};

/// Object affected by a user action
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub kind: ObjectType,
    pub schema: String,
    pub name: String,
    /// Sub-object name, e.g. the column when the action targets a column
    pub detail: String,
}

/// Object names of one schema, as returned by the data source
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaContents {
    pub tables: Vec<String>,
    pub views: Vec<String>,
    pub procedures: Vec<String>,
    pub functions: Vec<String>,
}

/// One sub-data category of a table or view
#[derive(Clone, Debug, PartialEq)]
pub struct DetailsBatch {
    pub schema: String,
    pub object: String,
    pub object_kind: ObjectType,
    pub child_kind: ObjectType,
    pub names: Vec<String>,
    /// Payload per name, position for position. May be shorter than `names`.
    pub details: Vec<NodeData>,
    pub sorted: bool,
    pub just_append: bool,
}

/// Completion of a fetch request
#[derive(Clone, Debug, PartialEq)]
pub enum FetchReply {
    SchemaContents {
        schema: String,
        contents: SchemaContents,
        just_append: bool,
    },
    SchemaContentsFailed {
        schema: String,
    },
    ObjectDetails(DetailsBatch),
    ObjectDetailsFailed {
        schema: String,
        object: String,
        kind: ObjectType,
        mask: LoadMask,
        message: String,
    },
    RoutineDetails {
        schema: String,
        object: String,
        kind: ObjectType,
        definition: String,
    },
}

/// Sending side of a catalog tree's reply inbox
#[derive(Clone, Debug)]
pub struct ReplySender(UnboundedSender<FetchReply>);

pub(crate) fn reply_channel() -> (ReplySender, UnboundedReceiver<FetchReply>) {
    let (sender, receiver) = unbounded_channel();
    (ReplySender(sender), receiver)
}

impl ReplySender {
    /// Queue a reply; false once the receiving tree is gone
    pub fn send(&self, reply: FetchReply) -> bool {
        self.0.send(reply).is_ok()
    }

    pub fn schema_contents(&self, schema: &str, contents: SchemaContents, just_append: bool) -> bool {
        self.send(FetchReply::SchemaContents {
            schema: schema.to_string(),
            contents,
            just_append,
        })
    }

    pub fn schema_contents_failed(&self, schema: &str) -> bool {
        self.send(FetchReply::SchemaContentsFailed {
            schema: schema.to_string(),
        })
    }

    pub fn object_details(&self, batch: DetailsBatch) -> bool {
        self.send(FetchReply::ObjectDetails(batch))
    }

    pub fn object_details_failed(
        &self,
        schema: &str,
        object: &str,
        kind: ObjectType,
        mask: LoadMask,
        message: &str,
    ) -> bool {
        self.send(FetchReply::ObjectDetailsFailed {
            schema: schema.to_string(),
            object: object.to_string(),
            kind,
            mask,
            message: message.to_string(),
        })
    }

    pub fn routine_details(&self, schema: &str, object: &str, kind: ObjectType, definition: &str) -> bool {
        self.send(FetchReply::RoutineDetails {
            schema: schema.to_string(),
            object: object.to_string(),
            kind,
            definition: definition.to_string(),
        })
    }
}

/// Data source of the catalog tree
pub trait FetchDelegate {
    fn fetch_schema_list(&self) -> Vec<String>;

    /// Fetch schemas and objects matching SQL LIKE patterns; every matching
    /// schema is answered with an append-only schema contents reply.
    fn fetch_data_for_filter(&self, schema_filter: &str, object_filter: &str, reply: ReplySender) -> bool;

    fn fetch_schema_contents(&self, schema_name: &str, reply: ReplySender) -> bool;

    /// Fetch the sub-data in `mask`; one object details reply per category
    fn fetch_object_details(
        &self,
        schema_name: &str,
        object_name: &str,
        kind: ObjectType,
        mask: LoadMask,
        reply: ReplySender,
    ) -> bool;

    fn fetch_routine_details(
        &self,
        schema_name: &str,
        object_name: &str,
        kind: ObjectType,
        reply: ReplySender,
    ) -> bool;
}

/// Receiver of user-triggered actions
pub trait ActionDelegate {
    fn tree_refresh(&self);

    fn sidebar_action(&self, name: &str) -> bool;

    fn tree_activate_objects(&self, action: &str, changes: &[ChangeRecord]);

    fn tree_alter_objects(&self, changes: &[ChangeRecord]);

    fn tree_create_object(&self, kind: ObjectType, schema_name: &str, object_name: &str);

    fn tree_drop_objects(&self, changes: &[ChangeRecord]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_after_receiver_dropped() {
        let (sender, receiver) = reply_channel();
        assert!(sender.schema_contents_failed("sakila"));
        drop(receiver);
        assert!(!sender.schema_contents_failed("sakila"));
    }

    #[test]
    fn test_replies_keep_order() {
        let (sender, mut receiver) = reply_channel();
        sender.schema_contents("a", SchemaContents::default(), false);
        sender.routine_details("a", "p", ObjectType::Procedure, "BEGIN END");

        assert!(matches!(
            receiver.try_recv(),
            Ok(FetchReply::SchemaContents { schema, .. }) if schema == "a"
        ));
        assert!(matches!(
            receiver.try_recv(),
            Ok(FetchReply::RoutineDetails { definition, .. }) if definition == "BEGIN END"
        ));
        assert!(receiver.try_recv().is_err());
    }
}
