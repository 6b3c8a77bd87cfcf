//! Owned tree nodes addressed by index paths

use crate::catalog::{ObjectType, SharedData};

/// Position of a node as child indices from the root. The root is the empty path.
///
/// Handles are positional: any structural change to an ancestor's child list
/// may invalidate them, so hold names rather than handles across updates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodeHandle(Vec<usize>);

impl NodeHandle {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    pub fn last_index(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

/// Catalog tree node
#[derive(Clone, Debug)]
pub struct TreeNode {
    pub caption: String,
    pub kind: ObjectType,
    pub expanded: bool,
    /// Rendered emphasised (the active schema)
    pub bold: bool,
    pub data: Option<SharedData>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(caption: &str, kind: ObjectType) -> Self {
        Self {
            caption: caption.to_string(),
            kind,
            expanded: false,
            bold: false,
            data: None,
            children: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, index: usize) -> Option<&TreeNode> {
        self.children.get(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut TreeNode> {
        self.children.get_mut(index)
    }

    pub fn resolve(&self, handle: &NodeHandle) -> Option<&TreeNode> {
        handle
            .indices()
            .iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    pub fn resolve_mut(&mut self, handle: &NodeHandle) -> Option<&mut TreeNode> {
        handle
            .indices()
            .iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }

    pub fn insert_child(&mut self, position: usize, child: TreeNode) -> usize {
        let position = position.min(self.children.len());
        self.children.insert(position, child);
        position
    }

    pub fn add_child(&mut self, child: TreeNode) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    pub fn remove_child(&mut self, index: usize) -> Option<TreeNode> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    pub fn remove_children(&mut self) {
        self.children.clear();
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    /// Expanded subtree flattened for display, with depth below this node
    pub fn visible_nodes(&self) -> Vec<(usize, &TreeNode)> {
        let mut nodes = Vec::new();
        for child in &self.children {
            Self::flatten_node(child, 0, &mut nodes);
        }
        nodes
    }

    fn flatten_node<'a>(node: &'a TreeNode, depth: usize, nodes: &mut Vec<(usize, &'a TreeNode)>) {
        nodes.push((depth, node));
        if node.expanded {
            for child in &node.children {
                Self::flatten_node(child, depth + 1, nodes);
            }
        }
    }
}
