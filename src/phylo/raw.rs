use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// One node of the hierarchical tree document, before any view state exists.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawNode {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<RawNode>,
    #[serde(default, rename = "HG")]
    pub hg: Option<String>,
    #[serde(default)]
    pub colorcode: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_phylo_superhaplo: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawNode {
    pub fn descendant_count(&self) -> usize {
        let mut count = 0usize;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    pub fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            names.push(node.name.as_str());
            stack.extend(node.children.iter().rev());
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

pub(super) fn parse_hierarchy(raw: &str) -> Result<RawNode> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in tree document")?;
    if !parsed.is_object() {
        return Err(anyhow!("tree document must be a JSON object at the top level"));
    }

    RawNode::deserialize(parsed).context("tree document does not match the node schema")
}

pub(super) fn parse_motifs(raw: &str) -> Result<HashMap<String, String>> {
    serde_json::from_str(raw).context("invalid haplogroup motif map")
}

pub(super) fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_schema_fields_and_keeps_passthrough() {
        let raw = json!({
            "name": "mt-MRCA",
            "HG": "73G 263G",
            "colorcode": "#ffcc00",
            "is_phylo_superhaplo": true,
            "profiles": ["MK123"],
            "children": [{ "name": "L0" }]
        })
        .to_string();

        let node = parse_hierarchy(&raw).expect("valid document");
        assert_eq!(node.name, "mt-MRCA");
        assert_eq!(node.hg.as_deref(), Some("73G 263G"));
        assert_eq!(node.colorcode.as_deref(), Some("#ffcc00"));
        assert!(node.is_phylo_superhaplo);
        assert_eq!(node.extra.get("profiles"), Some(&json!(["MK123"])));
        assert_eq!(node.children.len(), 1);
        assert!(!node.children[0].is_phylo_superhaplo);
    }

    #[test]
    fn tolerates_null_children_and_flags() {
        let raw = r#"{"name": "L1", "children": null, "is_phylo_superhaplo": null}"#;
        let node = parse_hierarchy(raw).expect("nulls are tolerated");
        assert!(node.children.is_empty());
        assert!(!node.is_phylo_superhaplo);
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(parse_hierarchy("[1, 2, 3]").is_err());
        assert!(parse_hierarchy("{\"children\": []}").is_err());
        assert!(parse_hierarchy("{ not json").is_err());
    }

    #[test]
    fn counts_and_lists_names_in_document_order() {
        let node: RawNode = serde_json::from_value(json!({
            "name": "R",
            "children": [
                { "name": "A", "children": [{ "name": "A1" }] },
                { "name": "B" }
            ]
        }))
        .expect("valid document");

        assert_eq!(node.descendant_count(), 4);
        let mut names = Vec::new();
        node.collect_names(&mut names);
        assert_eq!(names, vec!["R", "A", "A1", "B"]);
    }

    #[test]
    fn parses_motif_maps() {
        let motifs = parse_motifs(r#"{"L0": "73G 146C", "L1": "73G"}"#).expect("valid map");
        assert_eq!(motifs.get("L0").map(String::as_str), Some("73G 146C"));
        assert!(parse_motifs("[]").is_err());
    }
}
