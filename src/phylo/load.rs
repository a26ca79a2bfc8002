use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::raw::{RawNode, parse_hierarchy, parse_motifs, read_document};

#[derive(Clone, Debug)]
pub struct DatasetPaths {
    pub tree: PathBuf,
    pub motifs: Option<PathBuf>,
}

/// The immutable inputs of a session: the raw tree plus the optional map of
/// accumulated signatures keyed by node id.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub source: PathBuf,
    pub hierarchy: RawNode,
    pub motifs: HashMap<String, String>,
    pub node_count: usize,
}

pub fn load_dataset(paths: &DatasetPaths) -> Result<Dataset> {
    let raw = read_document(&paths.tree).context("failed to load the tree dataset")?;
    let hierarchy = parse_hierarchy(&raw)
        .with_context(|| format!("failed to parse {}", paths.tree.display()))?;

    let motifs = match &paths.motifs {
        Some(path) => {
            let raw = read_document(path).context("failed to load the motif dataset")?;
            parse_motifs(&raw).with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => HashMap::new(),
    };

    let dataset = Dataset::new(paths.tree.clone(), hierarchy, motifs);
    tracing::info!(
        source = %dataset.source.display(),
        nodes = dataset.node_count,
        motifs = dataset.motifs.len(),
        "loaded haplogroup dataset"
    );
    Ok(dataset)
}

impl Dataset {
    pub fn new(source: PathBuf, hierarchy: RawNode, motifs: HashMap<String, String>) -> Self {
        let node_count = hierarchy.descendant_count();
        let dataset = Self {
            source,
            hierarchy,
            motifs,
            node_count,
        };
        dataset.check_motif_coverage();
        dataset
    }

    fn check_motif_coverage(&self) {
        if self.motifs.is_empty() {
            return;
        }

        let mut names = Vec::with_capacity(self.node_count);
        self.hierarchy.collect_names(&mut names);
        let tree_ids = names.into_iter().collect::<HashSet<_>>();

        let missing = tree_ids
            .iter()
            .filter(|name| !self.motifs.contains_key(**name))
            .count();
        let unknown = self
            .motifs
            .keys()
            .filter(|key| !tree_ids.contains(key.as_str()))
            .count();

        if missing > 0 || unknown > 0 {
            tracing::warn!(
                missing,
                unknown,
                "haplogroups of the tree and the motif dataset are not identical"
            );
        }
    }

    pub fn full_signature(&self, id: &str) -> Option<&str> {
        self.motifs.get(id).map(String::as_str)
    }
}
