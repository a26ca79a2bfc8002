use eframe::egui::{self, Key, RichText, Ui};

use crate::navigation::Direction;
use crate::phylo::SearchScope;
use crate::session::{ClickMode, SearchReply};
use crate::util::rank_suggestions;

use super::super::{SuggestionCache, ViewModel};

const MAX_SUGGESTIONS: usize = 12;
const MAX_TRANSITION_MS: u64 = 2000;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui, now_secs: f64) {
        ui.heading("Tree Controls");
        ui.separator();
        ui.add_space(4.0);

        let busy = self.session.is_busy();
        let mut run_search = false;
        let mut clear_search = false;

        ui.label("Search haplogroup")
            .on_hover_text("Case-sensitive substring match on haplogroup names.");
        let search_response = ui.text_edit_singleline(&mut self.search);
        if search_response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter)) {
            run_search = true;
        }

        let mut include_hidden = self.search_scope == SearchScope::Full;
        if ui
            .checkbox(&mut include_hidden, "Include collapsed nodes")
            .on_hover_text("Also match nodes inside collapsed groups and open the way to them.")
            .changed()
        {
            self.search_scope = if include_hidden {
                SearchScope::Full
            } else {
                SearchScope::VisibleOnly
            };
        }

        ui.horizontal(|ui| {
            run_search |= ui.add_enabled(!busy, egui::Button::new("Search")).clicked();
            clear_search |= ui.add_enabled(!busy, egui::Button::new("Clear")).clicked();
        });

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            ui.add_space(4.0);
            ui.small("Suggestions");
            ui.horizontal_wrapped(|ui| {
                for suggestion in &suggestions {
                    if ui.small_button(suggestion.as_str()).clicked() {
                        self.search = suggestion.clone();
                    }
                }
            });
        }

        if run_search {
            self.run_search(now_secs);
        } else if clear_search {
            self.search.clear();
            if self.session.clear_search(now_secs) {
                self.search_message = None;
            }
        }

        if let Some(message) = &self.search_message {
            ui.add_space(4.0);
            ui.label(RichText::new(message.as_str()).strong());
        }

        let navigator = self.session.navigator();
        if let Some(index) = navigator.current_index() {
            let total = navigator.len();
            ui.horizontal(|ui| {
                if ui.add_enabled(!busy, egui::Button::new("Prev")).clicked() {
                    self.session.advance(Direction::Backward, now_secs);
                }
                if ui.add_enabled(!busy, egui::Button::new("Next")).clicked() {
                    self.session.advance(Direction::Forward, now_secs);
                }
                ui.label(format!("{} / {}", index + 1, total));
            });
        }

        ui.separator();
        ui.label("Node click action");
        ui.radio_value(&mut self.click_mode, ClickMode::Navigate, "Show details");
        ui.radio_value(
            &mut self.click_mode,
            ClickMode::ExpandOneLevel,
            "Expand one level",
        );
        ui.radio_value(&mut self.click_mode, ClickMode::ExpandFully, "Expand fully");

        ui.separator();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!busy, egui::Button::new("Reset tree"))
                .on_hover_text("Back to the full tree with the default collapse.")
                .clicked()
                && self.session.reset(now_secs)
            {
                self.reset_search_state();
                self.pan = egui::Vec2::ZERO;
            }
            if ui
                .add_enabled(!busy, egui::Button::new("Expand all"))
                .clicked()
                && self.session.expand_all(now_secs)
            {
                self.reset_search_state();
            }
        });

        ui.separator();
        let mut transition_ms = self.session.transition().as_millis() as u64;
        if ui
            .add(
                egui::Slider::new(&mut transition_ms, 0..=MAX_TRANSITION_MS)
                    .text("transition (ms)"),
            )
            .changed()
        {
            self.session
                .set_transition(std::time::Duration::from_millis(transition_ms));
        }

        if ui.button("Reset view").clicked() {
            self.pan = egui::Vec2::ZERO;
            self.zoom = 1.0;
        }
        ui.small("Right or middle drag to pan, scroll to zoom.");
    }

    fn run_search(&mut self, now_secs: f64) {
        let term = self.search.trim().to_owned();
        match self.session.search(&term, self.search_scope, now_secs) {
            SearchReply::Found(summary) => {
                self.search_message = Some(format!("{} match(es) found", summary.matches));
            }
            SearchReply::Cleared => self.reset_search_state(),
            SearchReply::Ignored => {}
        }
    }

    fn reset_search_state(&mut self) {
        self.search.clear();
        self.search_message = None;
        self.search_scope = SearchScope::VisibleOnly;
    }

    fn suggestions(&mut self) -> Vec<String> {
        let query = self.search.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let view_root = self.session.view_root();
        if let Some(cached) = &self.suggestion_cache
            && cached.query == query
            && cached.view_root.as_deref() == view_root
        {
            return cached.items.clone();
        }

        let items = rank_suggestions(
            self.session.tree().nodes().map(|(_, node)| node.id.as_str()),
            query,
            MAX_SUGGESTIONS,
        );
        self.suggestion_cache = Some(SuggestionCache {
            query: query.to_owned(),
            view_root: view_root.map(str::to_owned),
            items: items.clone(),
        });
        items
    }
}
