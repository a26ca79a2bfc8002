use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui, pos2, vec2};

use crate::layout::{MARGIN_LEFT, MARGIN_TOP, NODE_WIDTH};
use crate::phylo::NodeId;
use crate::util::truncate_text;

use super::super::ViewModel;
use super::super::render_utils::{
    circle_visible, contrast_text, draw_background, parse_hex_color, with_opacity, world_to_screen,
};

const NODE_RADIUS: f32 = 4.5;
const LABEL_OFFSET: f32 = 8.0;
const LINK_COLOR: Color32 = Color32::from_rgb(204, 204, 204);
const COLLAPSED_FILL: Color32 = Color32::from_rgb(176, 196, 222);
const SYMBOL_COLOR: Color32 = Color32::from_rgb(80, 80, 80);
const LABEL_COLOR: Color32 = Color32::from_rgb(34, 34, 34);
const MATCHED_COLOR: Color32 = Color32::from_rgb(214, 120, 20);
const FOCUSED_COLOR: Color32 = Color32::from_rgb(200, 30, 45);

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui, now_secs: f64) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);
        self.apply_pending_scroll(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        let pan = self.pan;
        let zoom = self.zoom;
        let to_screen = |world: Pos2| world_to_screen(rect, pan, zoom, world);

        let tree = self.session.tree();
        let renderer = self.session.renderer();
        let frame = renderer.frame();

        let bounds = renderer.scene().bounds;
        let canvas = Rect::from_min_max(
            to_screen(pos2(-MARGIN_LEFT, -MARGIN_TOP)),
            to_screen(pos2(bounds.width - MARGIN_LEFT, bounds.height - MARGIN_TOP)),
        );
        painter.rect_filled(canvas, 0.0, Color32::WHITE);

        for polygon in &frame.polygons {
            let Some(color) = tree
                .node(polygon.node)
                .attributes
                .color
                .as_deref()
                .and_then(parse_hex_color)
            else {
                continue;
            };
            let fill = with_opacity(color, polygon.opacity);
            let points = polygon.geometry.map(to_screen);
            // Two convex pieces: the node's own footprint and the flare.
            painter.add(Shape::convex_polygon(
                vec![points[0], points[1], points[6], points[7]],
                fill,
                Stroke::NONE,
            ));
            painter.add(Shape::convex_polygon(points[1..7].to_vec(), fill, Stroke::NONE));
        }

        let link_width = (2.0 * zoom).clamp(0.8, 4.0);
        for link in &frame.links {
            painter.add(Shape::line(
                link.geometry.map(to_screen).to_vec(),
                Stroke::new(link_width, with_opacity(LINK_COLOR, link.opacity)),
            ));
        }

        let radius = (NODE_RADIUS * zoom).clamp(2.5, 14.0);
        let label_reach = NODE_WIDTH * zoom;
        let mut screen_nodes = Vec::with_capacity(frame.nodes.len());
        let draw_labels = zoom > 0.45;

        for drawn in &frame.nodes {
            let position = to_screen(drawn.geometry);
            if !circle_visible(rect, position, radius + label_reach) {
                continue;
            }
            screen_nodes.push((drawn.node, position));

            let node = tree.node(drawn.node);
            let fill = if node.is_collapsed() {
                COLLAPSED_FILL
            } else {
                Color32::WHITE
            };
            painter.circle_filled(position, radius, with_opacity(fill, drawn.opacity));
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(1.0, with_opacity(Color32::BLACK, drawn.opacity)),
            );

            let half = radius / 2.0;
            let symbol = Stroke::new(1.0, with_opacity(SYMBOL_COLOR, drawn.opacity));
            if node.is_collapsed() || node.is_expanded() {
                painter.line_segment(
                    [position - vec2(half, 0.0), position + vec2(half, 0.0)],
                    symbol,
                );
            }
            if node.is_collapsed() {
                painter.line_segment(
                    [position - vec2(0.0, half), position + vec2(0.0, half)],
                    symbol,
                );
            }

            if !draw_labels && !node.matched && !node.focused {
                continue;
            }
            let (label_color, font_size) = if node.focused {
                (FOCUSED_COLOR, 12.5)
            } else if node.matched {
                (MATCHED_COLOR, 12.0)
            } else {
                (LABEL_COLOR, 11.0)
            };
            painter.text(
                position - vec2(LABEL_OFFSET * zoom, 0.0),
                Align2::RIGHT_CENTER,
                truncate_text(&node.id, NODE_WIDTH / 1.25),
                FontId::proportional((font_size * zoom).clamp(7.0, 28.0)),
                with_opacity(label_color, drawn.opacity),
            );
        }

        let hovered = self.hovered_node(ui, &screen_nodes, radius + 3.0);
        if let Some((node_id, _)) = hovered {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
            self.draw_tooltip(ui, &painter, node_id);
        }

        let pending_click = if response.clicked_by(egui::PointerButton::Primary) {
            hovered.map(|(node_id, _)| node_id)
        } else {
            None
        };

        if let Some(node_id) = pending_click {
            self.apply_node_click(node_id, now_secs);
        }
    }

    fn draw_tooltip(&self, ui: &Ui, painter: &egui::Painter, node_id: NodeId) {
        let Some(pointer) = ui.input(|input| input.pointer.hover_pos()) else {
            return;
        };

        let node = self.session.tree().node(node_id);
        let background = node
            .attributes
            .color
            .as_deref()
            .and_then(parse_hex_color)
            .unwrap_or(Color32::WHITE);
        let text_color = contrast_text(background);
        let text = format!(
            "{}: {}",
            node.id,
            node.attributes.signature.as_deref().unwrap_or("NA")
        );

        let galley = painter.layout_no_wrap(text, FontId::proportional(12.0), text_color);
        let origin = pointer + vec2(12.0, -12.0 - galley.size().y);
        let frame = Rect::from_min_size(origin, galley.size()).expand(4.0);
        painter.rect_filled(frame, 4.0, background);
        painter.galley(origin, galley, text_color);
    }
}
