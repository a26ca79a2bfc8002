use crate::phylo::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Cursor over the current search matches, in visual order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Navigator {
    matches: Vec<NodeId>,
    current: usize,
}

impl Navigator {
    /// Starts at `best` when it is one of `matches`, otherwise at the first.
    pub fn new(matches: Vec<NodeId>, best: Option<NodeId>) -> Self {
        let current = best
            .and_then(|best| matches.iter().position(|candidate| *candidate == best))
            .unwrap_or(0);
        Self { matches, current }
    }

    pub fn matches(&self) -> &[NodeId] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        (!self.matches.is_empty()).then_some(self.current)
    }

    pub fn current(&self) -> Option<NodeId> {
        self.matches.get(self.current).copied()
    }

    /// Steps circularly through the matches. Does nothing without matches.
    pub fn advance(&mut self, direction: Direction) -> Option<NodeId> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }

        self.current = match direction {
            Direction::Forward => (self.current + 1) % len,
            Direction::Backward => (self.current + len - 1) % len,
        };
        self.current()
    }

    pub fn clear(&mut self) {
        self.matches.clear();
        self.current = 0;
    }
}
