use super::tree::{NodeId, PhyloTree};

/// Sets the initial expansion state: a subtree stays open while it is, or
/// contains, a super-group; everything past that boundary is collapsed all the
/// way down. The root's own children are always shown.
pub fn apply_initial_collapse(tree: &mut PhyloTree) {
    let root = tree.root();
    tree.expand(root);
    let children = tree.visible_children(root).to_vec();
    for child in children {
        collapse_below(tree, child);
    }
}

fn collapse_below(tree: &mut PhyloTree, id: NodeId) {
    let mut pending = vec![id];
    while let Some(current) = pending.pop() {
        if !tree.node(current).is_expanded() {
            continue;
        }

        if !holds_super_group(tree, current) {
            tree.collapse(current);
        }
        pending.extend(tree.node(current).children().all().iter().copied());
    }
}

fn holds_super_group(tree: &PhyloTree, id: NodeId) -> bool {
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        let node = tree.node(current);
        if node.attributes.is_super_group {
            return true;
        }
        stack.extend(node.children().all().iter().copied());
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phylo::testing::{id, names, sample_hierarchy};
    use crate::phylo::tree::Children;

    fn partition(tree: &PhyloTree) -> Vec<(String, Children)> {
        tree.nodes()
            .map(|(_, node)| (node.id.clone(), node.children().clone()))
            .collect()
    }

    #[test]
    fn expansion_stops_at_the_last_super_group() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        apply_initial_collapse(&mut tree);

        assert_eq!(
            names(&tree, &tree.visible_nodes()),
            vec!["mt-MRCA", "L0", "L0a", "L0b", "L1", "L1b", "L1c", "L1c1"]
        );
        assert!(tree.node(id(&tree, "L0a")).is_collapsed());
        assert!(tree.node(id(&tree, "L1b")).is_collapsed());
        assert!(tree.node(id(&tree, "L1c1")).is_collapsed());
        assert!(tree.node(id(&tree, "L1c")).is_expanded());
    }

    #[test]
    fn hidden_subtrees_are_collapsed_through_full_depth() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        let l1c1 = id(&tree, "L1c1");
        let l1c = id(&tree, "L1c");
        // drop the super-group marker so L1 has nothing worth keeping open
        tree.node_mut(l1c).attributes.is_super_group = false;
        apply_initial_collapse(&mut tree);

        assert!(tree.node(id(&tree, "L1")).is_collapsed());
        assert!(tree.node(l1c).is_collapsed());
        assert!(tree.node(l1c1).is_collapsed());
    }

    #[test]
    fn root_children_are_always_shown() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        for node_id in tree.preorder() {
            tree.node_mut(node_id).attributes.is_super_group = false;
        }
        apply_initial_collapse(&mut tree);
        assert_eq!(
            names(&tree, &tree.visible_nodes()),
            vec!["mt-MRCA", "L0", "L1"]
        );
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        apply_initial_collapse(&mut tree);
        let once = partition(&tree);
        apply_initial_collapse(&mut tree);
        assert_eq!(partition(&tree), once);
    }

    #[test]
    fn no_node_has_both_shown_and_hidden_children() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        apply_initial_collapse(&mut tree);
        for (node_id, _) in tree.nodes() {
            let shown = tree.visible_children(node_id);
            let hidden = tree.hidden_children(node_id);
            assert!(shown.is_empty() || hidden.is_empty());
        }
    }
}
