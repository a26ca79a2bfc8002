use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use eframe::egui::{self, Context, Vec2};

use crate::phylo::{Dataset, DatasetPaths, NodeId, SearchScope, load_dataset};
use crate::session::{ClickMode, FollowUp, LaunchTarget, Session};

mod graph;
mod render_utils;
mod ui;

pub struct MitoTreeApp {
    paths: DatasetPaths,
    launch: LaunchTarget,
    transition: Duration,
    state: AppState,
    reload_rx: Option<Receiver<Result<Dataset, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Dataset, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    session: Session,
    search: String,
    search_scope: SearchScope,
    search_message: Option<String>,
    suggestion_cache: Option<SuggestionCache>,
    click_mode: ClickMode,
    selected: Option<String>,
    details_cache: Option<DetailsCache>,
    mutation_filter: String,
    pan: Vec2,
    zoom: f32,
    pending_scroll: Option<NodeId>,
    pending_launch: Option<LaunchTarget>,
}

struct SuggestionCache {
    query: String,
    view_root: Option<String>,
    items: Vec<String>,
}

struct DetailsCache {
    node_id: String,
    full_signature: Option<String>,
}

impl MitoTreeApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        paths: DatasetPaths,
        launch: LaunchTarget,
        transition: Duration,
    ) -> Self {
        let state = Self::start_load(paths.clone());
        Self {
            paths,
            launch,
            transition,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(paths: DatasetPaths) -> Receiver<Result<Dataset, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_dataset(&paths).map_err(|error| {
                tracing::warn!(error = %format!("{error:#}"), "dataset load failed");
                format!("{error:#}")
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(paths: DatasetPaths) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(paths),
        }
    }

    fn ready(
        dataset: Dataset,
        launch: &LaunchTarget,
        transition: Duration,
        now_secs: f64,
    ) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(
            Arc::new(dataset),
            launch,
            transition,
            now_secs,
        )))
    }
}

impl eframe::App for MitoTreeApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now_secs = ctx.input(|input| input.time);
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(dataset)) => {
                        transition = Some(Self::ready(
                            dataset,
                            &self.launch,
                            self.transition,
                            now_secs,
                        ));
                    }
                    Ok(Err(error)) => transition = Some(AppState::Error(error)),
                    Err(TryRecvError::Empty) => {
                        ctx.request_repaint_after(Duration::from_millis(50));
                    }
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading haplogroup tree...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the haplogroup tree");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.paths.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, now_secs, &mut reload_requested, is_reloading);
                let current_view = model.current_target();

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.paths.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(dataset)) => {
                            transition = Some(Self::ready(
                                dataset,
                                &current_view,
                                self.transition,
                                now_secs,
                            ));
                        }
                        Ok(Err(error)) => transition = Some(AppState::Error(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint_after(Duration::from_millis(50));
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}

impl ViewModel {
    fn new(
        dataset: Arc<Dataset>,
        launch: &LaunchTarget,
        transition: Duration,
        now_secs: f64,
    ) -> Self {
        let mut model = Self {
            session: Session::open(dataset, launch, transition, now_secs),
            search: String::new(),
            search_scope: SearchScope::default(),
            search_message: None,
            suggestion_cache: None,
            click_mode: ClickMode::default(),
            selected: None,
            details_cache: None,
            mutation_filter: String::new(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            pending_scroll: None,
            pending_launch: None,
        };
        model.collect_follow_ups(now_secs);
        model
    }

    /// What to reopen after a reload: the subtree being viewed, or the full tree.
    fn current_target(&self) -> LaunchTarget {
        match self.session.view_root() {
            Some(root) => LaunchTarget::subtree(root),
            None => LaunchTarget::full_tree(),
        }
    }

    fn collect_follow_ups(&mut self, now_secs: f64) {
        for follow_up in self.session.tick(now_secs) {
            match follow_up {
                FollowUp::ScrollTo(node) => self.pending_scroll = Some(node),
            }
        }
    }

    /// Replaces the session, e.g. to view a node as subtree root.
    fn relaunch(&mut self, target: &LaunchTarget, now_secs: f64) {
        let dataset = Arc::clone(self.session.dataset());
        let transition = self.session.transition();
        self.session = Session::open(dataset, target, transition, now_secs);
        self.search.clear();
        self.search_message = None;
        self.suggestion_cache = None;
        self.pan = Vec2::ZERO;
        self.pending_scroll = None;
        self.collect_follow_ups(now_secs);
    }
}
