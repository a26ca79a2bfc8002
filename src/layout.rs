use std::collections::HashMap;

use eframe::egui::{Pos2, Vec2, pos2, vec2};

use crate::phylo::{NodeId, PhyloTree};

/// Footprint of one node along the depth (horizontal) axis.
pub const NODE_WIDTH: f32 = 80.0;
/// Footprint of one node along the order (vertical) axis.
pub const NODE_HEIGHT: f32 = 21.0;

/// Space around the drawn tree inside the canvas.
pub const MARGIN_TOP: f32 = 40.0;
pub const MARGIN_RIGHT: f32 = 90.0;
pub const MARGIN_BOTTOM: f32 = 30.0;
pub const MARGIN_LEFT: f32 = 90.0;

/// Horizontal distance from a child back to the connector's vertical run.
const CONNECTOR_KINK: f32 = -2.0 * NODE_WIDTH / 3.0;

/// Positions of the shown nodes. `x` runs along depth, `y` along sibling order.
#[derive(Clone, Debug, Default)]
pub struct TreeLayout {
    pub order: Vec<NodeId>,
    pub positions: HashMap<NodeId, Pos2>,
    pub links: Vec<(NodeId, NodeId)>,
    pub max_depth: usize,
}

impl TreeLayout {
    pub fn position(&self, id: NodeId) -> Option<Pos2> {
        self.positions.get(&id).copied()
    }
}

/// Siblings sit one slot apart, cousins two.
pub fn sibling_separation(tree: &PhyloTree, a: NodeId, b: NodeId) -> f32 {
    if tree.node(a).parent() == tree.node(b).parent() {
        1.0
    } else {
        2.0
    }
}

#[derive(Clone, Debug)]
struct Walker {
    node: NodeId,
    parent: Option<usize>,
    children: Vec<usize>,
    number: usize,
    prelim: f32,
    modifier: f32,
    change: f32,
    shift: f32,
    thread: Option<usize>,
    ancestor: usize,
    apportion_anchor: Option<usize>,
}

struct Walk<'a, F> {
    tree: &'a PhyloTree,
    walkers: Vec<Walker>,
    separation: F,
}

/// Tidy layout of the shown tree (Buchheim, Jünger and Leipert's linear-time
/// take on Reingold-Tilford) with a fixed node footprint. Order coordinates
/// are shifted so that none is negative.
pub fn layout<F>(tree: &PhyloTree, separation: F) -> TreeLayout
where
    F: Fn(&PhyloTree, NodeId, NodeId) -> f32,
{
    let order = tree.visible_nodes();
    let mut slots = HashMap::with_capacity(order.len());
    let mut walkers = Vec::with_capacity(order.len());
    for (slot, &id) in order.iter().enumerate() {
        slots.insert(id, slot);
        walkers.push(Walker {
            node: id,
            parent: None,
            children: Vec::new(),
            number: 0,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            ancestor: slot,
            apportion_anchor: None,
        });
    }

    let mut links = Vec::with_capacity(order.len().saturating_sub(1));
    for (slot, &id) in order.iter().enumerate() {
        for (number, child) in tree.visible_children(id).iter().enumerate() {
            let Some(&child_slot) = slots.get(child) else {
                continue;
            };
            walkers[slot].children.push(child_slot);
            walkers[child_slot].parent = Some(slot);
            walkers[child_slot].number = number;
            links.push((id, *child));
        }
    }

    let mut walk = Walk {
        tree,
        walkers,
        separation,
    };

    // Post-order with siblings left to right: a node is only placed once its
    // left sibling and that sibling's contour threads are final.
    let mut pending = if order.is_empty() {
        Vec::new()
    } else {
        vec![(0usize, 0usize)]
    };
    while let Some((slot, next_child)) = pending.pop() {
        if let Some(&child) = walk.walkers[slot].children.get(next_child) {
            pending.push((slot, next_child + 1));
            pending.push((child, 0));
        } else {
            walk.first_walk(slot);
        }
    }

    let mut positions = HashMap::with_capacity(order.len());
    let mut max_depth = 0usize;
    let mut min_order = f32::INFINITY;
    if !order.is_empty() {
        let root_shift = -walk.walkers[0].prelim;
        let mut breadth = vec![0.0f32; order.len()];
        for slot in 0..order.len() {
            let parent_modifier = match walk.walkers[slot].parent {
                Some(parent) => walk.walkers[parent].modifier,
                None => root_shift,
            };
            breadth[slot] = walk.walkers[slot].prelim + parent_modifier;
            walk.walkers[slot].modifier += parent_modifier;
        }

        for (slot, &id) in order.iter().enumerate() {
            let depth = tree.node(id).depth() - tree.node(order[0]).depth();
            let position = pos2(depth as f32 * NODE_WIDTH, breadth[slot] * NODE_HEIGHT);
            min_order = min_order.min(position.y);
            max_depth = max_depth.max(depth);
            positions.insert(id, position);
        }
    }

    if min_order.is_finite() {
        let root_order = positions.get(&order[0]).map_or(0.0, |root| root.y);
        let offset = (root_order - min_order).abs();
        for position in positions.values_mut() {
            position.y += offset;
        }
    }

    TreeLayout {
        order,
        positions,
        links,
        max_depth,
    }
}

impl<F> Walk<'_, F>
where
    F: Fn(&PhyloTree, NodeId, NodeId) -> f32,
{
    fn separation(&self, a: usize, b: usize) -> f32 {
        (self.separation)(self.tree, self.walkers[a].node, self.walkers[b].node)
    }

    fn left_sibling(&self, v: usize) -> Option<usize> {
        let walker = &self.walkers[v];
        let parent = walker.parent?;
        walker
            .number
            .checked_sub(1)
            .map(|index| self.walkers[parent].children[index])
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.walkers[v].children.first().copied().or(self.walkers[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.walkers[v].children.last().copied().or(self.walkers[v].thread)
    }

    fn first_walk(&mut self, v: usize) {
        let left = self.left_sibling(v);
        let first = self.walkers[v].children.first().copied();
        let last = self.walkers[v].children.last().copied();

        if let (Some(first), Some(last)) = (first, last) {
            self.execute_shifts(v);
            let midpoint = (self.walkers[first].prelim + self.walkers[last].prelim) / 2.0;
            if let Some(left) = left {
                let prelim = self.walkers[left].prelim + self.separation(v, left);
                self.walkers[v].prelim = prelim;
                self.walkers[v].modifier = prelim - midpoint;
            } else {
                self.walkers[v].prelim = midpoint;
            }
        } else if let Some(left) = left {
            self.walkers[v].prelim = self.walkers[left].prelim + self.separation(v, left);
        }

        if let Some(parent) = self.walkers[v].parent {
            let anchor = self.walkers[parent]
                .apportion_anchor
                .unwrap_or(self.walkers[parent].children[0]);
            let anchor = self.apportion(v, left, anchor);
            self.walkers[parent].apportion_anchor = Some(anchor);
        }
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        let children = self.walkers[v].children.clone();
        for &child in children.iter().rev() {
            let walker = &mut self.walkers[child];
            walker.prelim += shift;
            walker.modifier += shift;
            change += walker.change;
            shift += walker.shift + change;
        }
    }

    fn apportion(&mut self, v: usize, left: Option<usize>, mut ancestor: usize) -> usize {
        let Some(left) = left else {
            return ancestor;
        };
        let Some(parent) = self.walkers[v].parent else {
            return ancestor;
        };

        let mut inner_right = v;
        let mut outer_right = v;
        let mut inner_left = left;
        let mut outer_left = self.walkers[parent].children[0];
        let mut sum_inner_right = self.walkers[inner_right].modifier;
        let mut sum_outer_right = self.walkers[outer_right].modifier;
        let mut sum_inner_left = self.walkers[inner_left].modifier;
        let mut sum_outer_left = self.walkers[outer_left].modifier;

        let mut next_inner_left = self.next_right(inner_left);
        let mut next_inner_right = self.next_left(inner_right);
        while let (Some(il), Some(ir)) = (next_inner_left, next_inner_right) {
            let (Some(ol), Some(or)) = (self.next_left(outer_left), self.next_right(outer_right))
            else {
                break;
            };
            inner_left = il;
            inner_right = ir;
            outer_left = ol;
            outer_right = or;
            self.walkers[outer_right].ancestor = v;

            let shift = self.walkers[inner_left].prelim + sum_inner_left
                - self.walkers[inner_right].prelim
                - sum_inner_right
                + self.separation(inner_left, inner_right);
            if shift > 0.0 {
                let from = self.next_ancestor(inner_left, v, ancestor);
                self.move_subtree(from, v, shift);
                sum_inner_right += shift;
                sum_outer_right += shift;
            }

            sum_inner_left += self.walkers[inner_left].modifier;
            sum_inner_right += self.walkers[inner_right].modifier;
            sum_outer_left += self.walkers[outer_left].modifier;
            sum_outer_right += self.walkers[outer_right].modifier;

            next_inner_left = self.next_right(inner_left);
            next_inner_right = self.next_left(inner_right);
        }

        if let Some(il) = next_inner_left
            && self.next_right(outer_right).is_none()
        {
            self.walkers[outer_right].thread = Some(il);
            self.walkers[outer_right].modifier += sum_inner_left - sum_outer_right;
        }

        if let Some(ir) = next_inner_right
            && self.next_left(outer_left).is_none()
        {
            self.walkers[outer_left].thread = Some(ir);
            self.walkers[outer_left].modifier += sum_inner_right - sum_outer_left;
            ancestor = v;
        }

        ancestor
    }

    fn next_ancestor(&self, inner_left: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.walkers[inner_left].ancestor;
        if self.walkers[candidate].parent == self.walkers[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    fn move_subtree(&mut self, from: usize, to: usize, shift: f32) {
        let span = self.walkers[to].number as f32 - self.walkers[from].number as f32;
        let change = shift / span;
        self.walkers[to].change -= change;
        self.walkers[to].shift += shift;
        self.walkers[from].change += change;
        self.walkers[to].prelim += shift;
        self.walkers[to].modifier += shift;
    }
}

/// Copies layout positions into the tree, keeping the prior ones as the
/// starting point for the next transition.
pub fn apply_layout(tree: &mut PhyloTree, layout: &TreeLayout) {
    for &id in &layout.order {
        let node = tree.node_mut(id);
        node.previous_position = node.position;
        node.position = layout.position(id);
    }
}

/// Background wedge for a node: its own footprint, flaring out to cover the
/// span of its shown children. Leaves and collapsed nodes keep the flare
/// points folded onto their own edge so every silhouette has eight corners.
pub fn silhouette(node: Pos2, child_span: Option<(f32, f32)>, is_root: bool) -> [Pos2; 8] {
    let near_width = if is_root { 1.5 * NODE_WIDTH } else { NODE_WIDTH };
    let near = node.x - near_width / 2.0;
    let shoulder = node.x + NODE_WIDTH / 6.0;
    let half_height = NODE_HEIGHT / 2.0;

    let bottom_shoulder = pos2(shoulder, node.y + half_height);
    let top_shoulder = pos2(shoulder, node.y - half_height);

    let flare = match child_span {
        Some((min_child, max_child)) => [
            pos2(node.x + NODE_WIDTH / 3.0, max_child + half_height),
            pos2(node.x + NODE_WIDTH / 2.0, max_child + half_height),
            pos2(node.x + NODE_WIDTH / 2.0, min_child - half_height),
            pos2(node.x + NODE_WIDTH / 3.0, min_child - half_height),
        ],
        None => [bottom_shoulder, bottom_shoulder, top_shoulder, top_shoulder],
    };

    [
        pos2(near, node.y + half_height),
        bottom_shoulder,
        flare[0],
        flare[1],
        flare[2],
        flare[3],
        top_shoulder,
        pos2(near, node.y - half_height),
    ]
}

/// Right-angle connector from `parent` to `child`: across to the kink, along
/// the order axis to the child's row, then across to the child.
pub fn connector_path(parent: Pos2, child: Pos2) -> [Pos2; 4] {
    let kink = child.x + CONNECTOR_KINK;
    [parent, pos2(kink, parent.y), pos2(kink, child.y), child]
}

/// Canvas extent needed to show the current layout including margins.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CanvasBounds {
    pub width: f32,
    pub height: f32,
}

impl CanvasBounds {
    pub fn from_layout(layout: &TreeLayout) -> Self {
        let max_order = layout
            .positions
            .values()
            .map(|position| position.y)
            .fold(0.0f32, f32::max);
        Self {
            width: layout.max_depth as f32 * NODE_WIDTH + MARGIN_LEFT + MARGIN_RIGHT,
            height: max_order + MARGIN_TOP + MARGIN_BOTTOM,
        }
    }
}

/// Offset from layout coordinates to canvas coordinates.
pub fn canvas_origin() -> Vec2 {
    vec2(MARGIN_LEFT, MARGIN_TOP)
}
