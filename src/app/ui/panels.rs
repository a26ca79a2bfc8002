use eframe::egui::{self, Align, Context, Layout};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        now_secs: f64,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.collect_follow_ups(now_secs);
        if self.session.is_busy() {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("mito-tree");
                    ui.separator();

                    let dataset = self.session.dataset();
                    let tree = self.session.tree();
                    ui.label(format!("source: {}", dataset.source.display()));
                    ui.label(format!("root: {}", tree.node(tree.root()).id));
                    ui.label(format!(
                        "shown: {} / {}",
                        self.session.renderer().scene().nodes.len(),
                        tree.len()
                    ));
                    ui.label(format!("motifs: {}", dataset.motifs.len()));

                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload dataset"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!("zoom {:.0}%", self.zoom * 100.0));
                        if self.session.view_root().is_some() {
                            ui.label("subtree view");
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui, now_secs));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if is_loading {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Reloading haplogroup tree...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                } else {
                    self.draw_graph(ui, now_secs);
                }
            });

        if let Some(target) = self.pending_launch.take() {
            self.relaunch(&target, now_secs);
        }
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected == selected {
            return;
        }

        self.selected = selected;
        self.details_cache = None;
    }
}
