use eframe::egui::Pos2;
use serde_json::{Map, Value};

use super::raw::RawNode;

/// Index of a node in the tree arena. Stable for the lifetime of a [`PhyloTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Identity token correlating a node across render passes. Handed out once per
/// node, the first time it is drawn, and never reused within a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderId(u64);

/// A node's children are either all shown or all hidden.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Children {
    #[default]
    Leaf,
    Expanded(Vec<NodeId>),
    Collapsed(Vec<NodeId>),
}

impl Children {
    fn from_ids(ids: Vec<NodeId>) -> Self {
        if ids.is_empty() {
            Self::Leaf
        } else {
            Self::Expanded(ids)
        }
    }

    pub fn visible(&self) -> &[NodeId] {
        match self {
            Self::Expanded(ids) => ids,
            Self::Leaf | Self::Collapsed(_) => &[],
        }
    }

    pub fn hidden(&self) -> &[NodeId] {
        match self {
            Self::Collapsed(ids) => ids,
            Self::Leaf | Self::Expanded(_) => &[],
        }
    }

    pub fn all(&self) -> &[NodeId] {
        match self {
            Self::Expanded(ids) | Self::Collapsed(ids) => ids,
            Self::Leaf => &[],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeAttributes {
    pub label: String,
    pub signature: Option<String>,
    pub color: Option<String>,
    pub is_super_group: bool,
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug)]
pub struct TreeNode {
    pub id: String,
    pub attributes: NodeAttributes,
    pub position: Option<Pos2>,
    pub previous_position: Option<Pos2>,
    pub matched: bool,
    pub focused: bool,
    parent: Option<NodeId>,
    depth: usize,
    children: Children,
    render_id: Option<RenderId>,
}

impl TreeNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    pub fn render_id(&self) -> Option<RenderId> {
        self.render_id
    }

    pub fn is_collapsed(&self) -> bool {
        matches!(self.children, Children::Collapsed(_))
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self.children, Children::Expanded(_))
    }
}

/// Arena of haplogroup nodes with owned forward edges and a non-owning parent
/// index. Nodes are never removed; collapsing only moves a child list between
/// the shown and hidden states.
#[derive(Clone, Debug)]
pub struct PhyloTree {
    nodes: Vec<TreeNode>,
    root: NodeId,
    next_render_id: u64,
}

impl PhyloTree {
    /// Materializes the raw document. Every node starts expanded.
    pub fn from_raw(raw: &RawNode) -> Self {
        let mut nodes = Vec::with_capacity(raw.descendant_count());
        let mut pending: Vec<(&RawNode, Option<NodeId>, usize)> = vec![(raw, None, 0)];
        let mut child_lists: Vec<Vec<NodeId>> = Vec::new();

        while let Some((source, parent, depth)) = pending.pop() {
            let id = NodeId(nodes.len());
            nodes.push(TreeNode {
                id: source.name.clone(),
                attributes: NodeAttributes {
                    label: source.name.clone(),
                    signature: source.hg.clone().filter(|hg| !hg.trim().is_empty()),
                    color: source.colorcode.clone().filter(|color| !color.trim().is_empty()),
                    is_super_group: source.is_phylo_superhaplo,
                    extra: source.extra.clone(),
                },
                position: None,
                previous_position: None,
                matched: false,
                focused: false,
                parent,
                depth,
                children: Children::Leaf,
                render_id: None,
            });
            child_lists.push(Vec::with_capacity(source.children.len()));

            if let Some(parent) = parent {
                child_lists[parent.0].push(id);
            }
            for child in source.children.iter().rev() {
                pending.push((child, Some(id), depth + 1));
            }
        }

        for (node, ids) in nodes.iter_mut().zip(child_lists) {
            node.children = Children::from_ids(ids);
        }

        Self {
            nodes,
            root: NodeId(0),
            next_render_id: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    pub fn visible_children(&self, id: NodeId) -> &[NodeId] {
        self.nodes[id.0].children.visible()
    }

    pub fn hidden_children(&self, id: NodeId) -> &[NodeId] {
        self.nodes[id.0].children.hidden()
    }

    /// Depth-first lookup through shown and hidden children alike.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current.0];
            if node.id == id {
                return Some(current);
            }
            stack.extend(node.children.all().iter().rev());
        }
        None
    }

    /// Parents of `id`, nearest first, ending at the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[id.0].parent, move |&current| {
            self.nodes[current.0].parent
        })
    }

    /// Pre-order walk over every node, hidden subtrees included.
    pub fn preorder(&self) -> Vec<NodeId> {
        self.walk(|node| node.children.all())
    }

    /// Pre-order walk following only shown children.
    pub fn visible_nodes(&self) -> Vec<NodeId> {
        self.walk(|node| node.children.visible())
    }

    fn walk<'a>(&'a self, next: impl Fn(&'a TreeNode) -> &'a [NodeId]) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(next(&self.nodes[current.0]).iter().rev());
        }
        order
    }

    pub fn expand(&mut self, id: NodeId) -> bool {
        let node = &mut self.nodes[id.0];
        match std::mem::take(&mut node.children) {
            Children::Collapsed(ids) => {
                node.children = Children::Expanded(ids);
                true
            }
            other => {
                node.children = other;
                false
            }
        }
    }

    pub fn collapse(&mut self, id: NodeId) -> bool {
        let node = &mut self.nodes[id.0];
        match std::mem::take(&mut node.children) {
            Children::Expanded(ids) => {
                node.children = Children::Collapsed(ids);
                true
            }
            other => {
                node.children = other;
                false
            }
        }
    }

    /// Expands `id` and everything below it.
    pub fn expand_all_descendants(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            self.expand(current);
            stack.extend(self.nodes[current.0].children.visible().iter().copied());
        }
    }

    /// Opens every ancestor so that `id` becomes part of the shown tree.
    pub fn expand_path_to(&mut self, id: NodeId) {
        let ancestors = self.ancestors(id).collect::<Vec<_>>();
        for ancestor in ancestors {
            self.expand(ancestor);
        }
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.ancestors(id)
            .all(|ancestor| self.nodes[ancestor.0].is_expanded())
    }

    pub fn clear_marks(&mut self) {
        for node in &mut self.nodes {
            node.matched = false;
            node.focused = false;
        }
    }

    pub fn clear_focus(&mut self) {
        for node in &mut self.nodes {
            node.focused = false;
        }
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.nodes().find(|(_, node)| node.focused).map(|(id, _)| id)
    }

    /// Returns the node's render identity, handing out a new one on first use.
    pub fn ensure_render_id(&mut self, id: NodeId) -> RenderId {
        if let Some(render_id) = self.nodes[id.0].render_id {
            return render_id;
        }
        self.next_render_id += 1;
        let render_id = RenderId(self.next_render_id);
        self.nodes[id.0].render_id = Some(render_id);
        render_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phylo::testing::{id, names, sample_hierarchy};

    #[test]
    fn builds_parent_links_depths_and_order() {
        let tree = PhyloTree::from_raw(&sample_hierarchy());
        assert_eq!(tree.len(), 11);

        let root = tree.root();
        assert_eq!(tree.node(root).id, "mt-MRCA");
        assert_eq!(tree.node(root).depth(), 0);
        assert_eq!(
            names(&tree, tree.visible_children(root)),
            vec!["L0".to_owned(), "L1".to_owned()]
        );

        let l1c1a = id(&tree, "L1c1a");
        assert_eq!(tree.node(l1c1a).depth(), 4);
        assert_eq!(
            names(&tree, &tree.ancestors(l1c1a).collect::<Vec<_>>()),
            vec!["L1c1", "L1c", "L1", "mt-MRCA"]
        );
    }

    #[test]
    fn attributes_carry_payload() {
        let tree = PhyloTree::from_raw(&sample_hierarchy());
        let l0 = tree.node(id(&tree, "L0"));
        assert!(l0.attributes.is_super_group);
        assert_eq!(l0.attributes.color.as_deref(), Some("#e41a1c"));
        assert_eq!(l0.attributes.signature.as_deref(), Some("263G 1048T"));
        assert_eq!(tree.node(tree.root()).attributes.signature, None);
    }

    #[test]
    fn find_by_id_reaches_collapsed_nodes() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        let l1 = id(&tree, "L1");
        assert!(tree.collapse(l1));
        assert!(tree.find_by_id("L1c1a").is_some());
        assert!(!tree.is_visible(id(&tree, "L1c1a")));
        assert_eq!(tree.find_by_id("nope"), None);
    }

    #[test]
    fn collapse_then_expand_restores_the_same_children() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        let l1 = id(&tree, "L1");
        let before = tree.visible_children(l1).to_vec();

        assert!(tree.collapse(l1));
        assert!(tree.visible_children(l1).is_empty());
        assert_eq!(tree.hidden_children(l1), before.as_slice());

        assert!(tree.expand(l1));
        assert_eq!(tree.visible_children(l1), before.as_slice());
        assert!(tree.hidden_children(l1).is_empty());
    }

    #[test]
    fn expand_then_collapse_restores_the_hidden_children() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        let l0a = id(&tree, "L0a");
        assert!(tree.collapse(l0a));
        let hidden = tree.hidden_children(l0a).to_vec();
        assert!(!hidden.is_empty());

        assert!(tree.expand(l0a));
        assert_eq!(tree.visible_children(l0a), hidden.as_slice());
        assert!(tree.hidden_children(l0a).is_empty());

        assert!(tree.collapse(l0a));
        assert_eq!(tree.hidden_children(l0a), hidden.as_slice());
        assert!(tree.visible_children(l0a).is_empty());
    }

    #[test]
    fn leaves_neither_expand_nor_collapse() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        let leaf = id(&tree, "L0b");
        assert!(!tree.collapse(leaf));
        assert!(!tree.expand(leaf));
        assert_eq!(tree.node(leaf).children(), &Children::Leaf);
    }

    #[test]
    fn expand_path_opens_every_ancestor() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        for name in ["L1", "L1c", "L1c1"] {
            let node = id(&tree, name);
            tree.collapse(node);
        }
        let target = id(&tree, "L1c1a");
        tree.expand_path_to(target);
        assert!(tree.is_visible(target));
        assert!(tree.visible_nodes().contains(&target));
    }

    #[test]
    fn expand_all_descendants_opens_the_subtree_only() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        for name in ["L0", "L0a", "L1", "L1b"] {
            let node = id(&tree, name);
            tree.collapse(node);
        }
        tree.expand_all_descendants(id(&tree, "L1"));
        assert!(tree.node(id(&tree, "L1")).is_expanded());
        assert!(tree.node(id(&tree, "L1b")).is_expanded());
        assert!(tree.node(id(&tree, "L0")).is_collapsed());
    }

    #[test]
    fn render_ids_are_lazy_and_stable() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        let l0 = id(&tree, "L0");
        let l1 = id(&tree, "L1");
        assert_eq!(tree.node(l0).render_id(), None);

        let first = tree.ensure_render_id(l0);
        let second = tree.ensure_render_id(l1);
        assert_ne!(first, second);
        assert_eq!(tree.ensure_render_id(l0), first);

        tree.collapse(tree.root());
        tree.expand(tree.root());
        assert_eq!(tree.node(l0).render_id(), Some(first));
        assert_eq!(tree.node(id(&tree, "L0a")).render_id(), None);
    }

    #[test]
    fn visible_and_hidden_never_both_populated() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        let l0 = id(&tree, "L0");
        tree.collapse(l0);
        for (node_id, _) in tree.nodes() {
            assert!(
                tree.visible_children(node_id).is_empty()
                    || tree.hidden_children(node_id).is_empty()
            );
        }
    }
}
