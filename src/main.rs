mod app;
mod layout;
mod navigation;
mod phylo;
mod render;
mod session;
mod util;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::phylo::DatasetPaths;
use crate::session::LaunchTarget;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Hierarchical haplogroup tree.
    #[arg(long, default_value = "data/tree.json")]
    tree: PathBuf,

    /// Map of haplogroup id to its accumulated mutation signature.
    #[arg(long)]
    motifs: Option<PathBuf>,

    /// Haplogroup to highlight, or to use as root with --node-as-root.
    #[arg(long)]
    node_id: Option<String>,

    #[arg(long, requires = "node_id")]
    node_as_root: bool,

    /// Duration of animated transitions in milliseconds.
    #[arg(long, default_value_t = 500)]
    transition_ms: u64,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let paths = DatasetPaths {
        tree: args.tree,
        motifs: args.motifs,
    };
    let target = LaunchTarget {
        node_id: args.node_id,
        node_as_root: args.node_as_root,
    };
    let transition = Duration::from_millis(args.transition_ms);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "mito-tree",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::MitoTreeApp::new(
                cc,
                paths.clone(),
                target.clone(),
                transition,
            )))
        }),
    )
}
