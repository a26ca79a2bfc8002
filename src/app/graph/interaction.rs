use eframe::egui::{self, Pos2, Rect, Ui};

use crate::phylo::NodeId;
use crate::session::ClickOutcome;

use super::super::ViewModel;
use super::super::render_utils::{pan_centering, screen_to_world};

/// Primary clicks belong to the nodes; the canvas pans on the other buttons.
const PAN_BUTTONS: [egui::PointerButton; 2] =
    [egui::PointerButton::Secondary, egui::PointerButton::Middle];

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.2, 4.0);
        let world_after = screen_to_world(rect, self.pan, self.zoom, pointer);
        self.pan += (world_after - world_before) * self.zoom;
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if PAN_BUTTONS.iter().any(|&button| response.dragged_by(button)) {
            self.pan += response.drag_delta();
        }
    }

    /// Centres the view on a node once its pass has settled.
    pub(in crate::app) fn apply_pending_scroll(&mut self, rect: Rect) {
        let Some(node) = self.pending_scroll.take() else {
            return;
        };
        let Some(position) = self.session.renderer().scene().position(node) else {
            tracing::debug!(node = node.index(), "scroll target is not shown");
            return;
        };
        self.pan = pan_centering(rect, self.zoom, position);
    }

    pub(in crate::app) fn hovered_node(
        &self,
        ui: &Ui,
        screen_nodes: &[(NodeId, Pos2)],
        radius: f32,
    ) -> Option<(NodeId, Pos2)> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        screen_nodes
            .iter()
            .filter_map(|&(node, position)| {
                let distance = position.distance(pointer);
                (distance <= radius).then_some((node, position, distance))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(node, position, _)| (node, position))
    }

    pub(in crate::app) fn apply_node_click(&mut self, node: NodeId, now_secs: f64) {
        match self.session.click(node, self.click_mode, now_secs) {
            ClickOutcome::NavigateTo(node_id) => self.set_selected(Some(node_id)),
            ClickOutcome::Ignored => {
                tracing::debug!(node = node.index(), "click ignored while animating");
            }
            ClickOutcome::Unchanged | ClickOutcome::Collapsed | ClickOutcome::Expanded => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_drag_does_not_pan() {
        assert!(!PAN_BUTTONS.contains(&egui::PointerButton::Primary));
        assert!(PAN_BUTTONS.contains(&egui::PointerButton::Secondary));
        assert!(PAN_BUTTONS.contains(&egui::PointerButton::Middle));
    }
}
