use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, Sense, Ui, vec2};
use serde_json::Value;

use crate::phylo::{Dataset, MutationKind, PhyloTree, accumulate, annotate, extract_subtree};
use crate::session::LaunchTarget;

use super::super::render_utils::parse_hex_color;
use super::super::{DetailsCache, ViewModel};

const HIGHLIGHT_BACKGROUND: Color32 = Color32::from_rgb(255, 229, 122);

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Haplogroup Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Set the click action to \"Show details\" and click a node.");
            return;
        };

        let dataset = Arc::clone(self.session.dataset());
        let Some(raw) = extract_subtree(&dataset.hierarchy, &selected_id) else {
            ui.label("Selected haplogroup is not part of the dataset.");
            return;
        };

        ui.label(RichText::new(raw.name.as_str()).strong().size(16.0));
        if let Some(code) = raw.colorcode.as_deref()
            && let Some(color) = parse_hex_color(code)
        {
            ui.horizontal(|ui| {
                let (swatch, _) = ui.allocate_exact_size(vec2(14.0, 14.0), Sense::hover());
                ui.painter().rect_filled(swatch, 2.0, color);
                ui.label(code);
            });
        }
        if raw.is_phylo_superhaplo {
            ui.label("Super-haplogroup");
        }
        ui.label(format!("Direct subgroups: {}", raw.children.len()));
        ui.label(format!(
            "Descendants: {}",
            raw.descendant_count().saturating_sub(1)
        ));

        ui.separator();
        ui.label("Highlight mutations")
            .on_hover_text("Space separated, e.g. 73G, 16129, T, . or .1");
        ui.text_edit_singleline(&mut self.mutation_filter);
        let terms = self.mutation_filter.split_whitespace().collect::<Vec<_>>();

        ui.add_space(4.0);
        ui.label(RichText::new("Signature").strong());
        match raw.hg.as_deref().filter(|hg| !hg.trim().is_empty()) {
            Some(signature) => signature_line(ui, signature, &terms),
            None => {
                ui.label("NA");
            }
        }

        let full_signature = match &self.details_cache {
            Some(cached) if cached.node_id == selected_id => cached.full_signature.clone(),
            _ => {
                let full_signature = full_signature(&dataset, &selected_id);
                self.details_cache = Some(DetailsCache {
                    node_id: selected_id.clone(),
                    full_signature: full_signature.clone(),
                });
                full_signature
            }
        };
        ui.add_space(4.0);
        ui.label(RichText::new("Full signature").strong());
        match full_signature.as_deref().filter(|signature| !signature.is_empty()) {
            Some(signature) => signature_line(ui, signature, &terms),
            None => {
                ui.label("NA");
            }
        }

        if !raw.extra.is_empty() {
            ui.separator();
            ui.label(RichText::new("Attributes").strong());
            let mut keys = raw.extra.keys().collect::<Vec<_>>();
            keys.sort();
            for key in keys {
                let value = match &raw.extra[key] {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                ui.label(format!("{key}: {value}"));
            }
        }

        ui.separator();
        ui.horizontal_wrapped(|ui| {
            if ui.button("View as subtree").clicked() {
                self.pending_launch = Some(LaunchTarget::subtree(selected_id.as_str()));
            }
            if ui.button("Highlight in full tree").clicked() {
                self.pending_launch = Some(LaunchTarget::highlight(selected_id.as_str()));
            }
            if ui.button("Close").clicked() {
                self.selected = None;
            }
        });
    }
}

/// The motif table wins; otherwise the signature is rebuilt from the path
/// to the root of the full tree.
fn full_signature(dataset: &Dataset, node_id: &str) -> Option<String> {
    if let Some(signature) = dataset.full_signature(node_id) {
        return Some(signature.to_owned());
    }

    let tree = PhyloTree::from_raw(&dataset.hierarchy);
    let node = tree.find_by_id(node_id)?;
    Some(accumulate(&tree, node))
}

fn signature_line(ui: &mut Ui, signature: &str, terms: &[&str]) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 6.0;
        for token in annotate(signature, terms) {
            let mut text = RichText::new(token.text).monospace();
            if token.kind == MutationKind::Back {
                text = text.italics();
            }
            if token.highlighted {
                text = text
                    .strong()
                    .color(Color32::BLACK)
                    .background_color(HIGHLIGHT_BACKGROUND);
            }
            ui.label(text);
        }
    });
}
