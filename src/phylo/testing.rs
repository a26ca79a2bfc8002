use serde_json::json;

use super::raw::RawNode;
use super::tree::{NodeId, PhyloTree};

/// ```text
/// mt-MRCA
/// |- L0 (super)
/// |  |- L0a
/// |  |  `- L0a1
/// |  `- L0b
/// `- L1
///    |- L1b
///    |  `- L1b1
///    `- L1c (super)
///       `- L1c1
///          `- L1c1a
/// ```
pub(crate) fn sample_hierarchy() -> RawNode {
    serde_json::from_value(json!({
        "name": "mt-MRCA",
        "HG": "",
        "children": [
            {
                "name": "L0",
                "HG": "263G 1048T",
                "colorcode": "#e41a1c",
                "is_phylo_superhaplo": true,
                "children": [
                    {
                        "name": "L0a",
                        "HG": "2758A 16129A",
                        "children": [{ "name": "L0a1", "HG": "4586C A16129" }]
                    },
                    { "name": "L0b", "HG": "93G" }
                ]
            },
            {
                "name": "L1",
                "HG": "3594T 7256T",
                "children": [
                    {
                        "name": "L1b",
                        "HG": "189G 236C",
                        "children": [{ "name": "L1b1", "HG": "16126C" }]
                    },
                    {
                        "name": "L1c",
                        "HG": "151T 152C",
                        "colorcode": "#377eb8",
                        "is_phylo_superhaplo": true,
                        "children": [
                            {
                                "name": "L1c1",
                                "HG": "10586A",
                                "children": [{ "name": "L1c1a", "HG": "16129A 5442.1T" }]
                            }
                        ]
                    }
                ]
            }
        ]
    }))
    .expect("fixture matches the node schema")
}

pub(crate) fn flat_hierarchy(names: &[&str]) -> RawNode {
    let children = names
        .iter()
        .map(|name| json!({ "name": name }))
        .collect::<Vec<_>>();
    serde_json::from_value(json!({ "name": "root", "children": children }))
        .expect("fixture matches the node schema")
}

pub(crate) fn id(tree: &PhyloTree, name: &str) -> NodeId {
    tree.find_by_id(name)
        .unwrap_or_else(|| panic!("fixture node {name} exists"))
}

pub(crate) fn names(tree: &PhyloTree, ids: &[NodeId]) -> Vec<String> {
    ids.iter().map(|&id| tree.node(id).id.clone()).collect()
}
