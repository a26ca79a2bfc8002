use super::raw::RawNode;

/// Finds the raw node named `node_id` (depth first, document order) so it can
/// seed a fresh tree with its descendants.
pub fn extract_subtree<'a>(hierarchy: &'a RawNode, node_id: &str) -> Option<&'a RawNode> {
    let mut stack = vec![hierarchy];
    while let Some(node) = stack.pop() {
        if node.name == node_id {
            return Some(node);
        }
        stack.extend(node.children.iter().rev());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phylo::testing::sample_hierarchy;
    use crate::phylo::tree::PhyloTree;

    #[test]
    fn returns_matched_node_with_descendants() {
        let hierarchy = sample_hierarchy();
        let subtree = extract_subtree(&hierarchy, "L1").expect("L1 exists");
        assert_eq!(subtree.name, "L1");
        assert_eq!(subtree.descendant_count(), 6);
    }

    #[test]
    fn whole_document_for_root_id() {
        let hierarchy = sample_hierarchy();
        let subtree = extract_subtree(&hierarchy, "mt-MRCA").expect("root exists");
        assert_eq!(subtree, &hierarchy);
    }

    #[test]
    fn missing_id_is_not_found() {
        let hierarchy = sample_hierarchy();
        assert!(extract_subtree(&hierarchy, "H2a2a1").is_none());
        assert!(extract_subtree(&hierarchy, "").is_none());
    }

    #[test]
    fn extracted_root_is_found_by_its_own_id() {
        let hierarchy = sample_hierarchy();
        let subtree = extract_subtree(&hierarchy, "L1c").expect("L1c exists");
        let tree = PhyloTree::from_raw(subtree);
        assert_eq!(tree.find_by_id("L1c"), Some(tree.root()));
        assert!(tree.node(tree.root()).parent().is_none());
    }
}
