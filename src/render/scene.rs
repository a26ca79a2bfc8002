use eframe::egui::Pos2;

use crate::layout::{
    CanvasBounds, apply_layout, connector_path, layout, sibling_separation, silhouette,
};
use crate::phylo::{NodeId, PhyloTree, RenderId};

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub render_id: RenderId,
    pub node: NodeId,
    pub position: Pos2,
}

/// Connector into `child`. Links share their child's render id.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLink {
    pub render_id: RenderId,
    pub parent: NodeId,
    pub child: NodeId,
    pub path: [Pos2; 4],
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScenePolygon {
    pub render_id: RenderId,
    pub node: NodeId,
    pub points: [Pos2; 8],
}

/// Positioned drawables for the shown part of the tree, in layout
/// coordinates. This is the target state of a render pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub links: Vec<SceneLink>,
    pub polygons: Vec<ScenePolygon>,
    pub bounds: CanvasBounds,
}

impl Scene {
    /// Lays out the shown tree, stores the new positions on the nodes and
    /// assigns render ids to nodes drawn for the first time.
    pub fn build(tree: &mut PhyloTree) -> Self {
        let laid_out = layout(tree, sibling_separation);
        apply_layout(tree, &laid_out);

        let mut scene = Self {
            nodes: Vec::with_capacity(laid_out.order.len()),
            links: Vec::with_capacity(laid_out.links.len()),
            polygons: Vec::with_capacity(laid_out.order.len()),
            bounds: CanvasBounds::from_layout(&laid_out),
        };

        for &id in &laid_out.order {
            let Some(position) = laid_out.position(id) else {
                continue;
            };
            let render_id = tree.ensure_render_id(id);

            let child_span = tree
                .visible_children(id)
                .iter()
                .filter_map(|child| laid_out.position(*child))
                .fold(None, |span: Option<(f32, f32)>, child| match span {
                    Some((min, max)) => Some((min.min(child.y), max.max(child.y))),
                    None => Some((child.y, child.y)),
                });

            scene.nodes.push(SceneNode {
                render_id,
                node: id,
                position,
            });
            scene.polygons.push(ScenePolygon {
                render_id,
                node: id,
                points: silhouette(position, child_span, id == tree.root()),
            });
        }

        for &(parent, child) in &laid_out.links {
            let (Some(from), Some(to)) = (laid_out.position(parent), laid_out.position(child))
            else {
                continue;
            };
            let render_id = tree.ensure_render_id(child);
            scene.links.push(SceneLink {
                render_id,
                parent,
                child,
                path: connector_path(from, to),
            });
        }

        scene
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|node| node.node == id)
    }

    pub fn position(&self, id: NodeId) -> Option<Pos2> {
        self.node(id).map(|node| node.position)
    }
}
