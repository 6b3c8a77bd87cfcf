//! Lazy loading: schema contents, object details, routine definitions,
//! expansion handling and live DDL notifications

use super::{
    collection_caption, CatalogTree, LoadMask, ObjectType, ObjectTypeValidation, ERROR_FETCHING_CAPTION,
    FETCHING_CAPTION,
};
use crate::delegate::{DetailsBatch, FetchReply, SchemaContents};
use crate::tree::NodeHandle;

impl CatalogTree {
    // === Schemas ===

    /// Reconcile the schema list. Schemas already fetched are marked stale and
    /// the expanded ones among them are fetched again.
    pub fn update_schemata(&mut self, names: &[String]) {
        if self.is_filtered_view() {
            self.forward_to_base(|base| base.update_schemata(names));
            return;
        }

        if self.is_no_connection() {
            self.root.remove_children();
        }

        let root = NodeHandle::root();
        self.reconcile_children(&root, names, ObjectType::Schema, true, false);

        let mut refetch = Vec::new();
        for (index, schema) in self.root.children.iter().enumerate() {
            let Some(data) = &schema.data else {
                continue;
            };
            let mut data = data.borrow_mut();
            let Some(state) = data.as_schema_mut() else {
                continue;
            };
            if state.fetched {
                state.fetched = false;
                if schema.expanded {
                    refetch.push(root.child(index));
                }
            }
        }

        self.mark_active_schema();
        self.sync_view();

        for schema in refetch {
            self.load_schema_content(&schema);
        }
        self.process_replies();
    }

    /// Pull the schema list from the fetch delegate
    pub fn refresh_schemata(&mut self) {
        if self.is_filtered_view() {
            self.forward_to_base(|base| base.refresh_schemata());
            return;
        }
        match self.fetch_delegate() {
            Some(delegate) => {
                let names = delegate.fetch_schema_list();
                log::debug!("refreshing {} schemas", names.len());
                self.update_schemata(&names);
            }
            None => log::debug!("no fetch delegate, schema list not refreshed"),
        }
    }

    /// Request the contents of a schema unless a request is in flight
    pub fn load_schema_content(&mut self, schema: &NodeHandle) {
        if self.is_filtered_view() {
            let Some(path) = self.get_node_path(schema) else {
                return;
            };
            self.forward_to_base(|base| {
                if let Some(base_schema) = base.get_node_from_path(&path) {
                    base.load_schema_content(&base_schema);
                }
            });
            return;
        }

        let Some(node) = self.root.resolve_mut(schema) else {
            log::debug!("schema {:?} is not in the tree", schema);
            return;
        };
        if node.kind != ObjectType::Schema {
            return;
        }
        {
            let Some(data) = &node.data else {
                return;
            };
            let mut data = data.borrow_mut();
            let Some(state) = data.as_schema_mut() else {
                return;
            };
            if state.fetching {
                log::trace!("schema {} already fetching", node.caption);
                return;
            }
            state.fetching = true;
        }

        for collection in node.children.iter_mut() {
            if let Some(caption) = collection_caption(collection.kind) {
                collection.caption = format!("{} {}", caption, FETCHING_CAPTION);
            }
        }
        let name = node.caption.clone();
        self.sync_view();

        let requested = match self.fetch_delegate() {
            Some(delegate) => delegate.fetch_schema_contents(&name, self.reply_sender.clone()),
            None => {
                log::debug!("no fetch delegate for schema {}", name);
                false
            }
        };
        if !requested {
            self.schema_contents_failed(&name);
        }
        self.process_replies();
    }

    /// Apply the object names of a schema.
    ///
    /// With `just_append` existing objects are kept and the schema is not
    /// marked fetched; an unknown schema is created in that mode, otherwise
    /// the reply is dropped.
    pub fn schema_contents_arrived(&mut self, schema_name: &str, contents: &SchemaContents, just_append: bool) {
        if self.is_filtered_view() {
            self.forward_to_base(|base| base.schema_contents_arrived(schema_name, contents, just_append));
            return;
        }

        let root = NodeHandle::root();
        let schema = match self.get_child_node(&root, schema_name, ObjectType::Schema, true) {
            Some(schema) => schema,
            None if just_append => match self.insert_sorted(&root, schema_name, ObjectType::Schema) {
                Some(schema) => schema,
                None => return,
            },
            None => {
                log::debug!("contents for unknown schema {} dropped", schema_name);
                return;
            }
        };

        let count_of = |tree: &CatalogTree, index: usize| tree.node(&schema.child(index)).map_or(0, |node| node.count());
        let old_tables = count_of(self, super::TABLES_NODE_INDEX);
        let old_views = count_of(self, super::VIEWS_NODE_INDEX);

        let lists: [&[String]; 4] = [
            &contents.tables,
            &contents.views,
            &contents.procedures,
            &contents.functions,
        ];
        for (index, kind) in ObjectType::SCHEMA_OBJECTS.iter().enumerate() {
            self.reconcile_children(&schema.child(index), lists[index], *kind, true, just_append);
        }

        if let Some(node) = self.root.resolve_mut(&schema) {
            if let Some(data) = &node.data {
                if let Some(state) = data.borrow_mut().as_schema_mut() {
                    if !just_append {
                        state.fetched = true;
                    }
                    state.fetching = false;
                }
            }
            for collection in node.children.iter_mut() {
                if let Some(caption) = collection_caption(collection.kind) {
                    collection.caption = caption.to_string();
                }
            }
        }

        let mut reload = Vec::new();
        for (index, old_count) in [(super::TABLES_NODE_INDEX, old_tables), (super::VIEWS_NODE_INDEX, old_views)] {
            if old_count == 0 {
                continue;
            }
            let collection = schema.child(index);
            let count = self.node(&collection).map_or(0, |node| node.count());
            reload.extend((0..count).map(|position| collection.child(position)));
        }
        for object in reload {
            self.reload_object_data(&object);
        }

        self.sync_view();
    }

    fn schema_contents_failed(&mut self, schema_name: &str) {
        let Some(schema) = self.get_child_node(&NodeHandle::root(), schema_name, ObjectType::Schema, true) else {
            log::debug!("failure for unknown schema {} dropped", schema_name);
            return;
        };
        let Some(node) = self.root.resolve_mut(&schema) else {
            return;
        };
        log::warn!("contents of schema {} could not be fetched", schema_name);

        if let Some(data) = &node.data {
            if let Some(state) = data.borrow_mut().as_schema_mut() {
                state.fetching = false;
            }
        }
        for collection in node.children.iter_mut() {
            if let Some(caption) = collection_caption(collection.kind) {
                collection.caption = format!("{} {}", caption, ERROR_FETCHING_CAPTION);
            }
        }
        self.sync_view();
    }

    // === Tables and views ===

    /// Request the sub-data in `mask` of a table or view not yet loaded or
    /// in flight. No-op when the object is not in the tree.
    pub fn load_table_details(&mut self, kind: ObjectType, schema_name: &str, object_name: &str, mask: LoadMask) {
        if self.is_filtered_view() {
            self.forward_to_base(|base| base.load_table_details(kind, schema_name, object_name, mask));
            return;
        }
        match self.get_node_for_object(schema_name, kind, object_name) {
            Some(handle) => self.load_table_details_at(&handle, mask),
            None => log::debug!("{} {}.{} is not in the tree", kind, schema_name, object_name),
        }
    }

    pub(super) fn load_table_details_at(&mut self, handle: &NodeHandle, mask: LoadMask) {
        let Some(node) = self.root.resolve(handle) else {
            return;
        };
        if !node.kind.is_composite() {
            return;
        }
        let (kind, name) = (node.kind, node.caption.clone());
        let Some(data) = node.data.clone() else {
            return;
        };
        let Some(delegate) = self.fetch_delegate() else {
            log::debug!("no fetch delegate for {} {}", kind, name);
            return;
        };

        let missing = {
            let mut data = data.borrow_mut();
            let Some(state) = data.as_view_mut() else {
                return;
            };
            let missing = mask.difference(state.get_loaded_mask() | state.get_loading_mask());
            if missing.is_empty() {
                log::trace!("{} {} has {:?} loaded or in flight", kind, name, mask);
                return;
            }
            state.set_loading_mask(missing);
            missing
        };

        let schema = self.get_schema_name(handle);
        if !delegate.fetch_object_details(&schema, &name, kind, missing, self.reply_sender.clone()) {
            log::debug!("fetch of {:?} for {} {}.{} refused", missing, kind, schema, name);
            if let Some(state) = data.borrow_mut().as_view_mut() {
                state.cancel_loading(missing);
            }
        }
        self.process_replies();
    }

    /// Invalidate the cached content of a changed object.
    ///
    /// Expanded tables and views drop their sub-data and fetch it again;
    /// collapsed ones are marked stale and reload on their next expansion.
    /// Routines drop their definition.
    pub fn reload_object_data(&mut self, handle: &NodeHandle) {
        let Some(node) = self.root.resolve(handle) else {
            return;
        };
        let (kind, expanded) = (node.kind, node.expanded);
        let Some(data) = node.data.clone() else {
            return;
        };

        match kind {
            ObjectType::Procedure | ObjectType::Function => {
                let mut data = data.borrow_mut();
                data.details.clear();
                if let Some(state) = data.as_object_mut() {
                    state.fetched = false;
                }
            }
            ObjectType::Table | ObjectType::View => {
                if expanded {
                    let mask = LoadMask::standard_for(kind);
                    if let Some(state) = data.borrow_mut().as_view_mut() {
                        state.set_reload_mask(mask);
                        state.set_unloaded_data(mask);
                        // replies still in flight address the old state
                        state.cancel_loading(mask);
                    }
                    self.discard_object_data(handle, mask);
                    self.load_table_details_at(handle, mask);
                } else if let Some(state) = data.borrow_mut().as_object_mut() {
                    state.fetched = false;
                }
            }
            _ => {}
        }
    }

    /// Remove the child nodes holding the sub-data in `mask`
    pub fn discard_object_data(&mut self, handle: &NodeHandle, mask: LoadMask) {
        let Some(node) = self.root.resolve_mut(handle) else {
            return;
        };
        match node.kind {
            ObjectType::Table => {
                for category in mask.iter() {
                    let index = category
                        .child_kind(ObjectType::Table)
                        .and_then(ObjectType::table_collection_index);
                    if let Some(collection) = index.and_then(|index| node.child_mut(index)) {
                        collection.remove_children();
                    }
                }
            }
            ObjectType::View if mask.contains(LoadMask::COLUMN_DATA) => node.remove_children(),
            _ => {}
        }
    }

    fn object_details_arrived(&mut self, batch: DetailsBatch) {
        let Some(owner) = self.get_node_for_object(&batch.schema, batch.object_kind, &batch.object) else {
            log::debug!("details for {}.{} arrived after removal", batch.schema, batch.object);
            return;
        };
        let category = LoadMask::for_child(batch.child_kind);
        let Some(child_kind) = category.child_kind(batch.object_kind) else {
            log::warn!("{} details cannot be stored under a {}", batch.child_kind, batch.object_kind);
            return;
        };
        let collection = match child_kind.table_collection_index() {
            Some(index) if batch.object_kind == ObjectType::Table => owner.child(index),
            _ => owner.clone(),
        };

        self.reconcile_children(&collection, &batch.names, child_kind, batch.sorted, batch.just_append);

        if let Some(node) = self.root.resolve(&collection) {
            for (name, details) in batch.names.iter().zip(&batch.details) {
                let target = self
                    .find_child_index(node, name, child_kind, false)
                    .and_then(|index| node.child(index))
                    .and_then(|child| child.data.as_ref());
                if let Some(target) = target {
                    target.borrow_mut().copy_from(details);
                }
            }
        }

        if let Some(data) = self.node_data(&owner) {
            let mut data = data.borrow_mut();
            if let Some(state) = data.as_view_mut() {
                state.set_loaded_data(category);
                state.object.fetched = true;
                if category == LoadMask::COLUMN_DATA {
                    state.columns_load_error = false;
                }
            }
        }
        self.sync_view();
    }

    fn object_details_failed(&mut self, schema: &str, object: &str, kind: ObjectType, mask: LoadMask, message: &str) {
        log::warn!("details of {} {}.{} could not be fetched: {}", kind, schema, object, message);
        let Some(owner) = self.get_node_for_object(schema, kind, object) else {
            return;
        };
        if let Some(data) = self.node_data(&owner) {
            let mut data = data.borrow_mut();
            let is_view = kind == ObjectType::View && mask.contains(LoadMask::COLUMN_DATA);
            if let Some(state) = data.as_view_mut() {
                state.cancel_loading(mask);
                if is_view {
                    state.columns_load_error = true;
                }
            }
            if is_view {
                data.details = message.to_string();
            }
        }
        self.sync_view();
    }

    // === Routines ===

    /// Request the definition of a procedure or function once
    pub fn load_routine_details(&mut self, handle: &NodeHandle) {
        if self.is_filtered_view() {
            let Some(path) = self.get_node_path(handle) else {
                return;
            };
            self.forward_to_base(|base| {
                if let Some(base_node) = base.get_node_from_path(&path) {
                    base.load_routine_details(&base_node);
                }
            });
            return;
        }

        let Some(node) = self.root.resolve(handle) else {
            return;
        };
        if !node.kind.is(ObjectTypeValidation::RoutineObject) {
            return;
        }
        let (kind, name) = (node.kind, node.caption.clone());
        let Some(data) = node.data.clone() else {
            return;
        };
        let Some(delegate) = self.fetch_delegate() else {
            log::debug!("no fetch delegate for {} {}", kind, name);
            return;
        };

        {
            let mut data = data.borrow_mut();
            let Some(state) = data.as_object_mut() else {
                return;
            };
            if state.fetched || state.fetching {
                return;
            }
            state.fetching = true;
        }

        let schema = self.get_schema_name(handle);
        if !delegate.fetch_routine_details(&schema, &name, kind, self.reply_sender.clone()) {
            log::debug!("definition fetch for {} {}.{} refused", kind, schema, name);
            if let Some(state) = data.borrow_mut().as_object_mut() {
                state.fetching = false;
            }
        }
        self.process_replies();
    }

    fn routine_details_arrived(&mut self, schema: &str, object: &str, kind: ObjectType, definition: &str) {
        let Some(handle) = self.get_node_for_object(schema, kind, object) else {
            log::debug!("definition of {}.{} arrived after removal", schema, object);
            return;
        };
        if let Some(data) = self.node_data(&handle) {
            let mut data = data.borrow_mut();
            data.details = definition.to_string();
            if let Some(state) = data.as_object_mut() {
                state.fetched = true;
                state.fetching = false;
            }
        }
    }

    // === Expansion ===

    /// Record an expansion change and load what the node needs.
    ///
    /// A filtered view sets its own flag and forwards to the matching base
    /// node. Ignored while events are disabled.
    pub fn expand_toggled(&mut self, handle: &NodeHandle, expanded: bool) {
        if !self.enabled_events {
            log::trace!("events disabled, expansion of {:?} ignored", handle);
            return;
        }

        if self.is_filtered_view() {
            if let Some(node) = self.root.resolve_mut(handle) {
                node.expanded = expanded;
            }
            let Some(path) = self.get_node_path(handle) else {
                return;
            };
            self.forward_to_base(|base| match base.get_node_from_path(&path) {
                Some(base_node) => base.expand_toggled(&base_node, expanded),
                None => log::debug!("no base node for {:?}", path),
            });
            return;
        }

        let Some(node) = self.root.resolve_mut(handle) else {
            return;
        };
        node.expanded = expanded;
        let kind = node.kind;
        if !expanded || node.data.is_none() {
            self.sync_view();
            return;
        }

        match kind {
            ObjectType::Schema => {
                let fetched = self
                    .node_data(handle)
                    .is_some_and(|data| data.borrow().as_schema().is_some_and(|state| state.fetched));
                if !fetched {
                    self.load_schema_content(handle);
                }
            }
            ObjectType::Table | ObjectType::View => self.expand_object(handle),
            _ => {}
        }
        self.sync_view();
    }

    fn expand_object(&mut self, handle: &NodeHandle) {
        let Some(node) = self.root.resolve(handle) else {
            return;
        };
        let kind = node.kind;
        let Some(data) = node.data.clone() else {
            return;
        };

        let stale = {
            let mut data = data.borrow_mut();
            match data.as_view_mut() {
                Some(state) if !state.object.fetched && !state.get_loaded_mask().is_empty() => {
                    state.set_unloaded_data(LoadMask::all());
                    true
                }
                _ => false,
            }
        };
        if stale {
            log::debug!("{} {} changed while collapsed, reloading", kind, node.caption);
            self.discard_object_data(handle, LoadMask::all());
        }

        self.load_table_details_at(handle, LoadMask::standard_for(kind));

        let failed = data.borrow().as_view().is_some_and(|state| state.columns_load_error);
        if kind == ObjectType::View && failed {
            if let Some(node) = self.root.resolve_mut(handle) {
                node.remove_children();
            }
        }
    }

    // === Live DDL ===

    /// Apply a DDL notification. An empty `old_name` creates the object, an
    /// empty `new_name` deletes it, otherwise the object was renamed or
    /// (with equal names) altered in place. Schemas use `old_name` and
    /// `new_name` as their own names.
    pub fn update_live_object_state(&mut self, kind: ObjectType, schema_name: &str, old_name: &str, new_name: &str) {
        if self.is_filtered_view() {
            self.forward_to_base(|base| base.update_live_object_state(kind, schema_name, old_name, new_name));
            return;
        }
        if !kind.is(ObjectTypeValidation::DatabaseObject) {
            log::debug!("live update for {} ignored", kind);
            return;
        }

        if old_name.is_empty() {
            if !new_name.is_empty() {
                let schema_name = if kind == ObjectType::Schema { new_name } else { schema_name };
                self.create_node_for_object(schema_name, kind, new_name);
            }
            return;
        }

        let lookup_schema = if kind == ObjectType::Schema { old_name } else { schema_name };
        let Some(handle) = self.get_node_for_object(lookup_schema, kind, old_name) else {
            log::debug!("live update for missing {} {}.{}", kind, schema_name, old_name);
            return;
        };

        if new_name.is_empty() {
            self.remove_node(&handle);
            self.sync_view();
            return;
        }

        let handle = if old_name != new_name {
            match self.rename_node(&handle, new_name) {
                Some(handle) => handle,
                None => return,
            }
        } else {
            handle
        };

        if kind == ObjectType::Schema {
            if self.identifiers_equal(&self.active_schema, old_name) {
                self.active_schema = new_name.to_string();
            }
        } else {
            self.reload_object_data(&handle);
        }
        self.sync_view();
    }

    // === Replies ===

    /// Apply every queued fetch reply. Returns the number handled.
    ///
    /// Called by every operation that issues a fetch; a host with an
    /// asynchronous delegate calls it when replies are pending.
    pub fn process_replies(&mut self) -> usize {
        if self.is_filtered_view() {
            let mut own = Vec::new();
            while let Ok(reply) = self.replies.try_recv() {
                own.push(reply);
            }
            return self
                .forward_to_base(move |base| {
                    for reply in own {
                        base.reply_sender.send(reply);
                    }
                    base.process_replies()
                })
                .unwrap_or(0);
        }

        if self.draining {
            return 0;
        }
        self.draining = true;
        let mut handled = 0;
        while let Ok(reply) = self.replies.try_recv() {
            self.apply_reply(reply);
            handled += 1;
        }
        self.draining = false;

        if handled > 0 {
            log::trace!("applied {} fetch replies", handled);
        }
        handled
    }

    fn apply_reply(&mut self, reply: FetchReply) {
        match reply {
            FetchReply::SchemaContents {
                schema,
                contents,
                just_append,
            } => self.schema_contents_arrived(&schema, &contents, just_append),
            FetchReply::SchemaContentsFailed { schema } => self.schema_contents_failed(&schema),
            FetchReply::ObjectDetails(batch) => self.object_details_arrived(batch),
            FetchReply::ObjectDetailsFailed {
                schema,
                object,
                kind,
                mask,
                message,
            } => self.object_details_failed(&schema, &object, kind, mask, &message),
            FetchReply::RoutineDetails {
                schema,
                object,
                kind,
                definition,
            } => self.routine_details_arrived(&schema, &object, kind, &definition),
        }
    }
}
