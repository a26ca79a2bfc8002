use std::collections::{HashMap, HashSet};

use eframe::egui::Pos2;

use super::scene::Scene;
use crate::layout::connector_path;
use crate::phylo::{NodeId, PhyloTree, RenderId};

/// Resting opacity of group silhouettes.
pub const POLYGON_OPACITY: f32 = 0.4;

/// Geometry that can be blended between two states of a pass.
pub trait Interpolate: Copy {
    fn interpolate(from: Self, to: Self, t: f32) -> Self;
}

impl Interpolate for Pos2 {
    fn interpolate(from: Self, to: Self, t: f32) -> Self {
        from.lerp(to, t)
    }
}

impl<const N: usize> Interpolate for [Pos2; N] {
    fn interpolate(from: Self, to: Self, t: f32) -> Self {
        std::array::from_fn(|index| from[index].lerp(to[index], t))
    }
}

pub fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Enter,
    Update,
    Exit,
}

/// One drawable as it appears at some instant of a pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drawn<G> {
    pub render_id: RenderId,
    pub node: NodeId,
    pub geometry: G,
    pub opacity: f32,
}

/// What is on screen at one instant. Nodes, links and polygons of nodes that
/// are leaving stay here until their pass finishes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub nodes: Vec<Drawn<Pos2>>,
    pub links: Vec<Drawn<[Pos2; 4]>>,
    pub polygons: Vec<Drawn<[Pos2; 8]>>,
}

impl Frame {
    pub fn node_position(&self, id: NodeId) -> Option<Pos2> {
        self.nodes
            .iter()
            .find(|drawn| drawn.node == id)
            .map(|drawn| drawn.geometry)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Track<G> {
    pub render_id: RenderId,
    pub node: NodeId,
    pub phase: Phase,
    pub from: G,
    pub to: G,
    pub from_opacity: f32,
    pub to_opacity: f32,
}

impl<G: Interpolate> Track<G> {
    fn settled(render_id: RenderId, node: NodeId, geometry: G, opacity: f32) -> Self {
        Self {
            render_id,
            node,
            phase: Phase::Update,
            from: geometry,
            to: geometry,
            from_opacity: opacity,
            to_opacity: opacity,
        }
    }

    fn sample(&self, t: f32) -> Drawn<G> {
        Drawn {
            render_id: self.render_id,
            node: self.node,
            geometry: G::interpolate(self.from, self.to, t),
            opacity: self.from_opacity + (self.to_opacity - self.from_opacity) * t,
        }
    }
}

/// Enter/update/exit reconciliation between what is on screen and the next
/// scene, keyed by render id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransitionPlan {
    pub nodes: Vec<Track<Pos2>>,
    pub links: Vec<Track<[Pos2; 4]>>,
    pub polygons: Vec<Track<[Pos2; 8]>>,
}

impl TransitionPlan {
    /// Plan that shows `next` as-is.
    pub fn settled(next: &Scene) -> Self {
        Self {
            nodes: next
                .nodes
                .iter()
                .map(|node| Track::settled(node.render_id, node.node, node.position, 1.0))
                .collect(),
            links: next
                .links
                .iter()
                .map(|link| Track::settled(link.render_id, link.child, link.path, 1.0))
                .collect(),
            polygons: next
                .polygons
                .iter()
                .map(|polygon| {
                    Track::settled(polygon.render_id, polygon.node, polygon.points, POLYGON_OPACITY)
                })
                .collect(),
        }
    }

    pub fn between(previous: &Frame, next: &Scene, tree: &PhyloTree) -> Self {
        let mut plan = Self::default();

        let previous_nodes = by_render_id(&previous.nodes);
        let previous_links = by_render_id(&previous.links);
        let previous_polygons = by_render_id(&previous.polygons);

        // Entering geometry grows out of the nearest ancestor that was on
        // screen; leaving geometry shrinks into the nearest one that stays.
        let enter_origin = |node: NodeId| {
            tree.ancestors(node)
                .find_map(|ancestor| {
                    previous
                        .node_position(ancestor)
                        .or(tree.node(ancestor).previous_position)
                })
                .or(tree.node(node).position)
        };
        let exit_target = |node: NodeId, fallback: Pos2| {
            tree.ancestors(node)
                .find_map(|ancestor| next.position(ancestor))
                .unwrap_or(fallback)
        };

        for node in &next.nodes {
            let track = match previous_nodes.get(&node.render_id) {
                Some(drawn) => Track {
                    render_id: node.render_id,
                    node: node.node,
                    phase: Phase::Update,
                    from: drawn.geometry,
                    to: node.position,
                    from_opacity: drawn.opacity,
                    to_opacity: 1.0,
                },
                None => Track {
                    render_id: node.render_id,
                    node: node.node,
                    phase: Phase::Enter,
                    from: enter_origin(node.node).unwrap_or(node.position),
                    to: node.position,
                    from_opacity: 0.0,
                    to_opacity: 1.0,
                },
            };
            plan.nodes.push(track);
        }

        for link in &next.links {
            let track = match previous_links.get(&link.render_id) {
                Some(drawn) => Track {
                    render_id: link.render_id,
                    node: link.child,
                    phase: Phase::Update,
                    from: drawn.geometry,
                    to: link.path,
                    from_opacity: drawn.opacity,
                    to_opacity: 1.0,
                },
                None => {
                    let origin = enter_origin(link.child).unwrap_or(link.path[0]);
                    Track {
                        render_id: link.render_id,
                        node: link.child,
                        phase: Phase::Enter,
                        from: connector_path(origin, origin),
                        to: link.path,
                        from_opacity: 0.0,
                        to_opacity: 1.0,
                    }
                }
            };
            plan.links.push(track);
        }

        for polygon in &next.polygons {
            let (phase, from, from_opacity) = match previous_polygons.get(&polygon.render_id) {
                Some(drawn) => (Phase::Update, drawn.geometry, drawn.opacity),
                None => (Phase::Enter, polygon.points, 0.0),
            };
            plan.polygons.push(Track {
                render_id: polygon.render_id,
                node: polygon.node,
                phase,
                from,
                to: polygon.points,
                from_opacity,
                to_opacity: POLYGON_OPACITY,
            });
        }

        let staying_nodes = ids(next.nodes.iter().map(|node| node.render_id));
        let staying_links = ids(next.links.iter().map(|link| link.render_id));
        let staying_polygons = ids(next.polygons.iter().map(|polygon| polygon.render_id));

        for drawn in previous
            .nodes
            .iter()
            .filter(|drawn| !staying_nodes.contains(&drawn.render_id))
        {
            plan.nodes.push(Track {
                render_id: drawn.render_id,
                node: drawn.node,
                phase: Phase::Exit,
                from: drawn.geometry,
                to: exit_target(drawn.node, drawn.geometry),
                from_opacity: drawn.opacity,
                to_opacity: 0.0,
            });
        }

        for drawn in previous
            .links
            .iter()
            .filter(|drawn| !staying_links.contains(&drawn.render_id))
        {
            let target = exit_target(drawn.node, drawn.geometry[0]);
            plan.links.push(Track {
                render_id: drawn.render_id,
                node: drawn.node,
                phase: Phase::Exit,
                from: drawn.geometry,
                to: connector_path(target, target),
                from_opacity: drawn.opacity,
                to_opacity: 0.0,
            });
        }

        for drawn in previous
            .polygons
            .iter()
            .filter(|drawn| !staying_polygons.contains(&drawn.render_id))
        {
            plan.polygons.push(Track {
                render_id: drawn.render_id,
                node: drawn.node,
                phase: Phase::Exit,
                from: drawn.geometry,
                to: drawn.geometry,
                from_opacity: drawn.opacity,
                to_opacity: 0.0,
            });
        }

        plan
    }

    /// Frame at linear progress `progress` in `[0, 1]`, eased. Exiting
    /// drawables are dropped once the pass is complete.
    pub fn sample(&self, progress: f32) -> Frame {
        let done = progress >= 1.0;
        let t = ease_cubic_in_out(progress);
        let keep = |phase: Phase| !(done && phase == Phase::Exit);

        Frame {
            nodes: self
                .nodes
                .iter()
                .filter(|track| keep(track.phase))
                .map(|track| track.sample(t))
                .collect(),
            links: self
                .links
                .iter()
                .filter(|track| keep(track.phase))
                .map(|track| track.sample(t))
                .collect(),
            polygons: self
                .polygons
                .iter()
                .filter(|track| keep(track.phase))
                .map(|track| track.sample(t))
                .collect(),
        }
    }
}

fn by_render_id<G: Copy>(drawn: &[Drawn<G>]) -> HashMap<RenderId, Drawn<G>> {
    drawn.iter().map(|entry| (entry.render_id, *entry)).collect()
}

fn ids(render_ids: impl Iterator<Item = RenderId>) -> HashSet<RenderId> {
    render_ids.collect()
}
