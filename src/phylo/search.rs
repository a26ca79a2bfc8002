use super::tree::{NodeId, PhyloTree};

/// Which nodes a search may look at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchScope {
    /// Only nodes reachable through shown children.
    #[default]
    VisibleOnly,
    /// Every node; matches inside collapsed subtrees get their path opened.
    Full,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub matches: Vec<NodeId>,
    pub best: Option<NodeId>,
}

/// Marks every node whose id contains `term` (case-sensitive) and focuses the
/// closest-length match. Returns `None` for a blank term, which callers treat
/// as a reset rather than a search.
pub fn search(tree: &mut PhyloTree, term: &str, scope: SearchScope) -> Option<SearchOutcome> {
    if term.trim().is_empty() {
        return None;
    }

    tree.clear_marks();

    let candidates = match scope {
        SearchScope::Full => tree.preorder(),
        SearchScope::VisibleOnly => tree.visible_nodes(),
    };
    let term_len = term.chars().count();

    let mut outcome = SearchOutcome::default();
    let mut best_score = usize::MAX;

    for candidate in candidates {
        let node = tree.node_mut(candidate);
        if !node.id.contains(term) {
            continue;
        }

        node.matched = true;
        let score = node.id.chars().count().abs_diff(term_len);
        if score < best_score {
            best_score = score;
            outcome.best = Some(candidate);
        }
        outcome.matches.push(candidate);

        if scope == SearchScope::Full {
            tree.expand_path_to(candidate);
        }
    }

    if let Some(best) = outcome.best {
        tree.node_mut(best).focused = true;
    }

    Some(outcome)
}

/// Sorts matches into visual order along the order axis. Nodes that were not
/// laid out sort last, keeping their discovery order.
pub fn order_by_position(tree: &PhyloTree, matches: &mut [NodeId]) {
    matches.sort_by(|a, b| {
        let a = tree.node(*a).position.map(|position| position.y);
        let b = tree.node(*b).position.map(|position| position.y);
        match (a, b) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;
    use crate::phylo::collapse::apply_initial_collapse;
    use crate::phylo::testing::{flat_hierarchy, id, names, sample_hierarchy};

    #[test]
    fn blank_terms_are_not_searches() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        let l0 = id(&tree, "L0");
        tree.node_mut(l0).matched = true;

        assert_eq!(search(&mut tree, "", SearchScope::Full), None);
        assert_eq!(search(&mut tree, "   ", SearchScope::VisibleOnly), None);
        assert!(tree.node(l0).matched, "blank input leaves prior state alone");
    }

    #[test]
    fn single_exact_match_is_matched_and_focused() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        let outcome = search(&mut tree, "L1c1a", SearchScope::Full).expect("term is not blank");

        let target = id(&tree, "L1c1a");
        assert_eq!(outcome.matches, vec![target]);
        assert_eq!(outcome.best, Some(target));
        assert!(tree.node(target).matched);
        assert!(tree.node(target).focused);
        assert_eq!(tree.nodes().filter(|(_, node)| node.matched).count(), 1);
        assert_eq!(tree.nodes().filter(|(_, node)| node.focused).count(), 1);
    }

    #[test]
    fn closest_length_wins() {
        let mut tree = PhyloTree::from_raw(&flat_hierarchy(&["Aa", "Aabc", "Aab"]));
        let outcome = search(&mut tree, "Aab", SearchScope::Full).expect("term is not blank");

        assert_eq!(names(&tree, &outcome.matches), vec!["Aabc", "Aab"]);
        assert_eq!(outcome.best, Some(id(&tree, "Aab")));

        let mut tree = PhyloTree::from_raw(&flat_hierarchy(&["Aa", "Aab", "Aabc"]));
        let outcome = search(&mut tree, "Aa", SearchScope::Full).expect("term is not blank");
        assert_eq!(outcome.matches.len(), 3);
        assert_eq!(outcome.best, Some(id(&tree, "Aa")));
    }

    #[test]
    fn ties_go_to_the_first_match_found() {
        let mut tree = PhyloTree::from_raw(&flat_hierarchy(&["xAb", "Abx", "Ab1"]));
        let outcome = search(&mut tree, "Ab", SearchScope::Full).expect("term is not blank");
        assert_eq!(outcome.best, Some(id(&tree, "xAb")));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        let outcome = search(&mut tree, "l0", SearchScope::Full).expect("term is not blank");
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.best, None);
    }

    #[test]
    fn full_scope_opens_paths_to_hidden_matches() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        apply_initial_collapse(&mut tree);
        let hidden = id(&tree, "L1c1a");
        assert!(!tree.is_visible(hidden));

        let outcome = search(&mut tree, "L1c1", SearchScope::Full).expect("term is not blank");
        assert_eq!(names(&tree, &outcome.matches), vec!["L1c1", "L1c1a"]);
        assert!(tree.is_visible(hidden));
        assert_eq!(outcome.best, Some(id(&tree, "L1c1")));
    }

    #[test]
    fn visible_scope_ignores_hidden_nodes() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        apply_initial_collapse(&mut tree);

        let outcome =
            search(&mut tree, "L1c1", SearchScope::VisibleOnly).expect("term is not blank");
        assert_eq!(names(&tree, &outcome.matches), vec!["L1c1"]);
        assert!(!tree.is_visible(id(&tree, "L1c1a")));
        assert!(!tree.node(id(&tree, "L1c1a")).matched);
    }

    #[test]
    fn new_search_clears_previous_marks() {
        let mut tree = PhyloTree::from_raw(&sample_hierarchy());
        search(&mut tree, "L0", SearchScope::Full).expect("term is not blank");
        search(&mut tree, "L1b", SearchScope::Full).expect("term is not blank");

        assert!(!tree.node(id(&tree, "L0")).matched);
        assert!(!tree.node(id(&tree, "L0")).focused);
        assert!(tree.node(id(&tree, "L1b")).focused);
    }

    #[test]
    fn orders_matches_along_the_order_axis() {
        let mut tree = PhyloTree::from_raw(&flat_hierarchy(&["A1", "A2", "A3"]));
        let (a1, a2, a3) = (id(&tree, "A1"), id(&tree, "A2"), id(&tree, "A3"));
        tree.node_mut(a1).position = Some(pos2(80.0, 42.0));
        tree.node_mut(a2).position = Some(pos2(80.0, 0.0));

        let mut matches = vec![a1, a2, a3];
        order_by_position(&tree, &mut matches);
        assert_eq!(matches, vec![a2, a1, a3]);
    }
}
