//! Mind-map repair: node defaulting and referential pruning.
//!
//! ## Rule Order
//!
//! 1. Require `nodes` and `links` arrays. A map without nodes cannot be
//!    repaired without inventing it.
//! 2. Walk the nodes in order, filling `key`, `text`, `description`, `color`
//!    and `emoji` where missing or empty. Present values are never replaced.
//!    A missing `text` becomes empty, never invented.
//! 3. Collect the final key set, then keep only links whose both ends are in
//!    it. Keys must be final before pruning, which is why defaulting runs
//!    first.

use super::{into_typed, parse};
use crate::config::LinkPolicy;
use crate::error::ValidationError;
use crate::output::MindMap;
use crate::prompts::{DEFAULT_NODE_EMOJI, MINDMAP_PALETTE};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

const NO_DESCRIPTION: &str = "No description available";

static RE_DIGIT_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+\s*$").unwrap());

/// Parse, repair and type-check a mind-map response.
pub fn mindmap(raw: &str, policy: LinkPolicy) -> Result<MindMap, ValidationError> {
    let value = repair_mindmap(parse(raw)?, policy)?;
    into_typed(value, "mind map")
}

/// Apply the repair rules to an already-parsed value.
pub fn repair_mindmap(value: Value, policy: LinkPolicy) -> Result<Value, ValidationError> {
    let mut root = match value {
        Value::Object(map) => map,
        other => {
            return Err(ValidationError::structural(format!(
                "expected an object with \"nodes\" and \"links\", got {}",
                kind(&other)
            )))
        }
    };

    let nodes = take_array(&mut root, "nodes")?;
    let links = take_array(&mut root, "links")?;

    let nodes = nodes
        .into_iter()
        .enumerate()
        .map(|(position, node)| fill_node(position, node))
        .collect::<Result<Vec<_>, _>>()?;

    let mut keys = HashSet::with_capacity(nodes.len());
    for node in &nodes {
        if let Some(key) = node.get("key").and_then(Value::as_i64) {
            if !keys.insert(key) {
                warn!("Mind map has duplicate node key {}", key);
            }
        }
    }

    let links = prune_links(links, &keys, policy)?;

    root.insert("nodes".to_string(), Value::Array(nodes));
    root.insert("links".to_string(), Value::Array(links));
    Ok(Value::Object(root))
}

fn take_array(root: &mut Map<String, Value>, field: &str) -> Result<Vec<Value>, ValidationError> {
    match root.remove(field) {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(ValidationError::structural(format!(
            "\"{field}\" must be an array, got {}",
            kind(&other)
        ))),
        None => Err(ValidationError::structural(format!(
            "mind map is missing \"{field}\""
        ))),
    }
}

/// Fill in the cosmetic fields of the node at `position` (0-based).
fn fill_node(position: usize, node: Value) -> Result<Value, ValidationError> {
    let ordinal = position + 1;
    let mut node = match node {
        Value::Object(map) => map,
        other => {
            return Err(ValidationError::structural(format!(
                "node {ordinal} is {}, not an object",
                kind(&other)
            )))
        }
    };

    // A node without usable text keeps its place with empty text.
    let text = match node.get("text") {
        Some(Value::String(s)) => s.clone(),
        _ => {
            node.insert("text".to_string(), Value::from(""));
            String::new()
        }
    };

    let key = node
        .get("key")
        .and_then(numeric_key)
        .unwrap_or(ordinal as i64);
    node.insert("key".to_string(), Value::from(key));

    let mut filled = Vec::new();
    if is_blank(node.get("description")) {
        let description = if text.trim().is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            text
        };
        node.insert("description".to_string(), Value::String(description));
        filled.push("description");
    }
    if is_blank(node.get("color")) {
        let color = MINDMAP_PALETTE[position % MINDMAP_PALETTE.len()];
        node.insert("color".to_string(), Value::from(color));
        filled.push("color");
    }
    if is_blank(node.get("emoji")) {
        node.insert("emoji".to_string(), Value::from(DEFAULT_NODE_EMOJI));
        filled.push("emoji");
    }
    if !filled.is_empty() {
        debug!("Node {} (key {}): defaulted {}", ordinal, key, filled.join(", "));
    }

    Ok(Value::Object(node))
}

fn prune_links(
    links: Vec<Value>,
    keys: &HashSet<i64>,
    policy: LinkPolicy,
) -> Result<Vec<Value>, ValidationError> {
    let total = links.len();
    let mut kept = Vec::with_capacity(total);

    for (i, link) in links.into_iter().enumerate() {
        match endpoints(&link) {
            Some((from, to)) if keys.contains(&from) && keys.contains(&to) => {
                kept.push(json!({ "from": from, "to": to }));
            }
            _ if policy == LinkPolicy::Reject => {
                return Err(ValidationError::structural(format!(
                    "link {} ({}) does not connect two existing nodes",
                    i + 1,
                    link
                )));
            }
            _ => debug!("Dropping dangling link {}", link),
        }
    }

    if kept.len() < total {
        warn!("Dropped {}/{} dangling mind-map links", total - kept.len(), total);
    }
    Ok(kept)
}

fn endpoints(link: &Value) -> Option<(i64, i64)> {
    let from = link.get("from").and_then(numeric_key)?;
    let to = link.get("to").and_then(numeric_key)?;
    Some((from, to))
}

/// An integer, an integral float, or a string of digits.
fn numeric_key(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) if RE_DIGIT_KEY.is_match(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Missing, null, non-string, or whitespace-only.
fn is_blank(value: Option<&Value>) -> bool {
    !matches!(value, Some(Value::String(s)) if !s.trim().is_empty())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{MindMapLink, MindMapNode};

    fn complete_node(key: i64, text: &str) -> Value {
        json!({
            "key": key,
            "text": text,
            "color": "#45B7D1",
            "emoji": "🌱",
            "description": "Plants turn sunlight, water and air into food they can use to grow."
        })
    }

    #[test]
    fn bare_node_gets_every_default() {
        let map = mindmap(r#"{"nodes":[{"text":"Topic"}],"links":[]}"#, LinkPolicy::Prune).unwrap();
        assert_eq!(
            map.nodes[0],
            MindMapNode {
                key: 1,
                text: "Topic".into(),
                color: MINDMAP_PALETTE[0].into(),
                emoji: DEFAULT_NODE_EMOJI.into(),
                description: "Topic".into(),
            }
        );
    }

    #[test]
    fn generated_key_is_one_based_position() {
        let raw = r#"{"nodes":[{"key":10,"text":"a"},{"text":"b"},{"key":"x","text":"c"}],"links":[]}"#;
        let map = mindmap(raw, LinkPolicy::Prune).unwrap();
        let keys: Vec<i64> = map.nodes.iter().map(|n| n.key).collect();
        assert_eq!(keys, vec![10, 2, 3]);
    }

    #[test]
    fn digit_string_key_is_reused() {
        let map = mindmap(r#"{"nodes":[{"key":"7","text":"a"}],"links":[]}"#, LinkPolicy::Prune).unwrap();
        assert_eq!(map.nodes[0].key, 7);
    }

    #[test]
    fn complete_node_is_unchanged() {
        let node = complete_node(4, "Photosynthesis");
        let repaired = repair_mindmap(json!({"nodes": [node.clone()], "links": []}), LinkPolicy::Prune).unwrap();
        assert_eq!(repaired["nodes"][0], node);
    }

    #[test]
    fn empty_fields_are_defaulted_present_ones_kept() {
        let raw = r##"{"nodes":[{"key":1,"text":"Cell","color":"","emoji":"🔬","description":"  "}],"links":[]}"##;
        let map = mindmap(raw, LinkPolicy::Prune).unwrap();
        let node = &map.nodes[0];
        assert_eq!(node.color, MINDMAP_PALETTE[0]);
        assert_eq!(node.emoji, "🔬");
        assert_eq!(node.description, "Cell");
    }

    #[test]
    fn empty_text_gets_placeholder_description() {
        let map = mindmap(r#"{"nodes":[{"text":""}],"links":[]}"#, LinkPolicy::Prune).unwrap();
        assert_eq!(map.nodes[0].description, NO_DESCRIPTION);
    }

    #[test]
    fn palette_cycles_by_position() {
        let nodes: Vec<Value> = (0..10).map(|i| json!({"text": format!("n{i}")})).collect();
        let map = mindmap(&json!({"nodes": nodes, "links": []}).to_string(), LinkPolicy::Prune).unwrap();
        assert_eq!(map.nodes[8].color, MINDMAP_PALETTE[8]);
        assert_eq!(map.nodes[9].color, MINDMAP_PALETTE[0]);
    }

    #[test]
    fn dangling_links_are_pruned() {
        let raw = json!({
            "nodes": [complete_node(1, "Root"), complete_node(2, "Leaf")],
            "links": [{"from": 1, "to": 2}, {"from": 1, "to": 99}]
        })
        .to_string();
        let map = mindmap(&raw, LinkPolicy::Prune).unwrap();
        assert_eq!(map.links, vec![MindMapLink { from: 1, to: 2 }]);
    }

    #[test]
    fn string_link_endpoints_resolve_against_defaulted_keys() {
        let raw = r#"{"nodes":[{"text":"Root"},{"text":"Leaf"}],"links":[{"from":"1","to":"2"},{"from":"root","to":"2"},"junk"]}"#;
        let map = mindmap(raw, LinkPolicy::Prune).unwrap();
        assert_eq!(map.links, vec![MindMapLink { from: 1, to: 2 }]);
    }

    #[test]
    fn reject_policy_fails_on_dangling_link() {
        let raw = json!({
            "nodes": [complete_node(1, "Root")],
            "links": [{"from": 1, "to": 2}]
        })
        .to_string();
        let err = mindmap(&raw, LinkPolicy::Reject).unwrap_err();
        assert!(matches!(err, ValidationError::Structural(_)));
        assert!(err.to_string().contains("link 1"));
    }

    #[test]
    fn missing_nodes_or_links_is_structural() {
        for raw in [
            r#"{"links":[]}"#,
            r#"{"nodes":[]}"#,
            r#"{"nodes":{},"links":[]}"#,
            r#"[{"text":"a"}]"#,
        ] {
            let err = mindmap(raw, LinkPolicy::Prune).unwrap_err();
            assert!(matches!(err, ValidationError::Structural(_)), "{raw}: {err:?}");
        }
    }

    #[test]
    fn node_without_text_is_kept_with_placeholder() {
        let raw = r#"{"nodes":[{"key":1,"text":"Root"},{"key":2,"label":"Leaf"},{"key":3,"text":7}],"links":[{"from":1,"to":2},{"from":1,"to":3}]}"#;
        let map = mindmap(raw, LinkPolicy::Prune).unwrap();
        assert_eq!(map.nodes.len(), 3);
        for node in &map.nodes[1..] {
            assert_eq!(node.text, "");
            assert_eq!(node.description, NO_DESCRIPTION);
        }
        assert_eq!(map.links.len(), 2);
    }

    #[test]
    fn positional_key_may_collide_with_supplied_key() {
        // Duplicates are logged, not renumbered: both nodes survive with key 2.
        let raw = r#"{"nodes":[{"key":2,"text":"a"},{"text":"b"}],"links":[{"from":2,"to":2}]}"#;
        let map = mindmap(raw, LinkPolicy::Reject).unwrap();
        let keys: Vec<i64> = map.nodes.iter().map(|n| n.key).collect();
        assert_eq!(keys, vec![2, 2]);
        assert_eq!(map.links, vec![MindMapLink { from: 2, to: 2 }]);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = mindmap(r#"{"nodes": [}"#, LinkPolicy::Prune).unwrap_err();
        assert!(matches!(err, ValidationError::Parse { .. }));
    }

    #[test]
    fn idempotent_on_own_output() {
        let raw = r##"{"nodes":[{"text":"Root"},{"key":"5","text":"Leaf","color":"#FFD93D"}],"links":[{"from":1,"to":5},{"from":5,"to":42}]}"##;
        let first = mindmap(raw, LinkPolicy::Prune).unwrap();
        let again = mindmap(&serde_json::to_string(&first).unwrap(), LinkPolicy::Prune).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn numeric_key_forms() {
        assert_eq!(numeric_key(&json!(3)), Some(3));
        assert_eq!(numeric_key(&json!(3.0)), Some(3));
        assert_eq!(numeric_key(&json!(3.5)), None);
        assert_eq!(numeric_key(&json!(" 12 ")), Some(12));
        assert_eq!(numeric_key(&json!("12a")), None);
        assert_eq!(numeric_key(&json!("99999999999999999999999")), None);
        assert_eq!(numeric_key(&Value::Null), None);
    }
}
