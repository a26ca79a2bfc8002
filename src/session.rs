use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crate::navigation::{Direction, Navigator};
use crate::phylo::{
    Dataset, NodeId, PhyloTree, SearchScope, apply_initial_collapse, extract_subtree,
    order_by_position, search,
};
use crate::render::{Completion, Renderer};

/// Where a session starts: optionally a node to highlight, or to use as the
/// root of an independent subtree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LaunchTarget {
    pub node_id: Option<String>,
    pub node_as_root: bool,
}

impl LaunchTarget {
    pub fn full_tree() -> Self {
        Self::default()
    }

    pub fn highlight(node_id: impl Into<String>) -> Self {
        Self {
            node_id: Some(node_id.into()),
            node_as_root: false,
        }
    }

    pub fn subtree(node_id: impl Into<String>) -> Self {
        Self {
            node_id: Some(node_id.into()),
            node_as_root: true,
        }
    }
}

/// Work that has to wait until a render pass has settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowUp {
    ScrollTo(NodeId),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClickMode {
    Navigate,
    #[default]
    ExpandOneLevel,
    ExpandFully,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored,
    Unchanged,
    Collapsed,
    Expanded,
    NavigateTo(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchSummary {
    pub matches: usize,
    pub best: Option<NodeId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchReply {
    Ignored,
    Cleared,
    Found(SearchSummary),
}

/// One interactive view over a dataset: the tree state, the render passes
/// drawing it and the search cursor. Replaced wholesale when the viewer
/// switches between full tree and subtree.
pub struct Session {
    dataset: Arc<Dataset>,
    tree: PhyloTree,
    renderer: Renderer,
    navigator: Navigator,
    transition: Duration,
    view_root: Option<String>,
    follow_tx: Sender<FollowUp>,
    follow_rx: Receiver<FollowUp>,
}

impl Session {
    pub fn open(
        dataset: Arc<Dataset>,
        target: &LaunchTarget,
        transition: Duration,
        now_secs: f64,
    ) -> Self {
        let (follow_tx, follow_rx) = mpsc::channel();

        let mut view_root = None;
        let mut tree = None;
        if target.node_as_root
            && let Some(node_id) = &target.node_id
        {
            match extract_subtree(&dataset.hierarchy, node_id) {
                Some(subtree) => {
                    tree = Some(PhyloTree::from_raw(subtree));
                    view_root = Some(node_id.clone());
                }
                None => {
                    tracing::warn!(
                        node_id = %node_id,
                        "subtree root not found, showing the full tree"
                    );
                }
            }
        }
        let tree = tree.unwrap_or_else(|| PhyloTree::from_raw(&dataset.hierarchy));

        let mut session = Self {
            dataset,
            tree,
            renderer: Renderer::new(),
            navigator: Navigator::default(),
            transition,
            view_root,
            follow_tx,
            follow_rx,
        };
        apply_initial_collapse(&mut session.tree);

        let highlight = match &target.node_id {
            Some(node_id) if !target.node_as_root => {
                let found = session.tree.find_by_id(node_id);
                if found.is_none() {
                    tracing::warn!(node_id = %node_id, "highlight target not found");
                }
                found
            }
            _ => None,
        };

        let on_complete = highlight.map(|node| {
            session.tree.expand_path_to(node);
            session.tree.node_mut(node).matched = true;
            session.scroll_after(node)
        });
        session
            .renderer
            .render(&mut session.tree, Duration::ZERO, now_secs, on_complete);

        tracing::info!(
            root = %session.tree.node(session.tree.root()).id,
            nodes = session.tree.len(),
            shown = session.renderer.scene().nodes.len(),
            "session opened"
        );
        session
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn tree(&self) -> &PhyloTree {
        &self.tree
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Id of the subtree root when the session shows a subtree.
    pub fn view_root(&self) -> Option<&str> {
        self.view_root.as_deref()
    }

    pub fn transition(&self) -> Duration {
        self.transition
    }

    pub fn set_transition(&mut self, transition: Duration) {
        self.transition = transition;
    }

    pub fn is_busy(&self) -> bool {
        self.renderer.is_animating()
    }

    /// Advances the running pass and hands back work queued by passes that
    /// have settled.
    pub fn tick(&mut self, now_secs: f64) -> Vec<FollowUp> {
        self.renderer.advance(now_secs);
        self.follow_rx.try_iter().collect()
    }

    pub fn search(&mut self, term: &str, scope: SearchScope, now_secs: f64) -> SearchReply {
        if !self.accepts("search") {
            return SearchReply::Ignored;
        }

        let Some(outcome) = search(&mut self.tree, term, scope) else {
            self.clear_search(now_secs);
            return SearchReply::Cleared;
        };

        let on_complete = outcome.best.map(|best| self.scroll_after(best));
        self.renderer
            .render(&mut self.tree, Duration::ZERO, now_secs, on_complete);

        let mut matches = outcome.matches;
        order_by_position(&self.tree, &mut matches);
        let summary = SearchSummary {
            matches: matches.len(),
            best: outcome.best,
        };
        self.navigator = Navigator::new(matches, outcome.best);

        tracing::debug!(term, matches = summary.matches, "search finished");
        SearchReply::Found(summary)
    }

    pub fn clear_search(&mut self, now_secs: f64) -> bool {
        if !self.accepts("clear search") {
            return false;
        }

        self.tree.clear_marks();
        self.navigator.clear();
        self.renderer
            .render(&mut self.tree, self.transition, now_secs, None);
        true
    }

    /// Moves focus to the next or previous match and scrolls to it once the
    /// pass has settled.
    pub fn advance(&mut self, direction: Direction, now_secs: f64) -> Option<NodeId> {
        if !self.accepts("advance") {
            return None;
        }

        let node = self.navigator.advance(direction)?;
        self.tree.clear_focus();
        self.tree.node_mut(node).focused = true;

        let on_complete = self.scroll_after(node);
        self.renderer
            .render(&mut self.tree, self.transition, now_secs, Some(on_complete));
        Some(node)
    }

    pub fn expand_all(&mut self, now_secs: f64) -> bool {
        if !self.accepts("expand all") {
            return false;
        }

        self.tree.clear_marks();
        self.navigator.clear();
        let root = self.tree.root();
        self.tree.expand_all_descendants(root);
        self.renderer
            .render(&mut self.tree, self.transition, now_secs, None);
        true
    }

    /// Back to the full tree with the default collapse, without animation.
    pub fn reset(&mut self, now_secs: f64) -> bool {
        if !self.accepts("reset") {
            return false;
        }

        self.tree = PhyloTree::from_raw(&self.dataset.hierarchy);
        apply_initial_collapse(&mut self.tree);
        self.view_root = None;
        self.navigator.clear();
        self.renderer = Renderer::new();
        self.renderer
            .render(&mut self.tree, Duration::ZERO, now_secs, None);
        tracing::info!(nodes = self.tree.len(), "session reset to the full tree");
        true
    }

    pub fn click(&mut self, node: NodeId, mode: ClickMode, now_secs: f64) -> ClickOutcome {
        if !self.accepts("click") {
            return ClickOutcome::Ignored;
        }

        if mode == ClickMode::Navigate {
            return ClickOutcome::NavigateTo(self.tree.node(node).id.clone());
        }

        let outcome = if self.tree.collapse(node) {
            ClickOutcome::Collapsed
        } else if self.tree.node(node).is_collapsed() {
            match mode {
                ClickMode::ExpandFully => self.tree.expand_all_descendants(node),
                _ => {
                    self.tree.expand(node);
                }
            }
            ClickOutcome::Expanded
        } else {
            return ClickOutcome::Unchanged;
        };

        self.renderer
            .render(&mut self.tree, self.transition, now_secs, None);
        outcome
    }

    fn accepts(&self, action: &'static str) -> bool {
        if self.renderer.is_animating() {
            tracing::debug!(action, "ignoring action while a transition is in flight");
            return false;
        }
        true
    }

    fn scroll_after(&self, node: NodeId) -> Completion {
        let follow_tx = self.follow_tx.clone();
        Box::new(move || {
            let _ = follow_tx.send(FollowUp::ScrollTo(node));
        })
    }
}
