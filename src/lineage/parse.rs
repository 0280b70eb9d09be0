use anyhow::{Context, Result, anyhow};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::warn;

use super::tree::NodeType;

const TREE_ITEMS_KEY: &str = "tree_genealogy_items_json";
const ACCOUNT_ITEMS_KEY: &str = "account_genealogy_items_json";

const EDGE_FIELDS: &[&str] = &[
    "child_id",
    "child",
    "child_name",
    "parent",
    "parent_id",
    "child_weight",
    "parent_weight",
    "parent_level",
    "node_type",
    "deleted",
];

const NESTED_FIELDS: &[&str] = &["id", "issuer_id", "name", "node_type", "deleted", "children"];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeRecord {
    pub child_id: String,
    pub child: String,
    pub parent: Option<String>,
    pub child_weight: Option<f64>,
    pub parent_weight: Option<f64>,
    pub parent_level: Option<i64>,
    pub node_type: NodeType,
    pub deleted: bool,
    pub attributes: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NestedNode {
    pub id: Option<String>,
    pub name: String,
    pub node_type: NodeType,
    pub deleted: bool,
    pub children: Vec<NestedNode>,
    pub attributes: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LineagePayload {
    Edges(Vec<EdgeRecord>),
    Nested(NestedNode),
    Empty,
}

#[derive(Deserialize)]
struct RawEdge {
    #[serde(deserialize_with = "deserialize_id")]
    child_id: String,
    #[serde(default)]
    child: Option<String>,
    #[serde(default)]
    child_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    parent: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    parent_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_number")]
    child_weight: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_number")]
    parent_weight: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_integer")]
    parent_level: Option<i64>,
    #[serde(default)]
    node_type: Option<NodeType>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    deleted: Option<bool>,
}

#[derive(Deserialize)]
struct RawNested {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    issuer_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    node_type: Option<NodeType>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    deleted: Option<bool>,
}

fn id_from_value(value: Value) -> Option<std::result::Result<String, String>> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(Ok(text)),
        Value::Number(number) => Some(Ok(number.to_string())),
        other => Some(Err(format!("expected string or number id, got {other}"))),
    }
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match id_from_value(Value::deserialize(deserializer)?) {
        Some(result) => result.map_err(D::Error::custom),
        None => Err(D::Error::custom("id must not be null")),
    }
}

fn deserialize_optional_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    id_from_value(Value::deserialize(deserializer)?)
        .transpose()
        .map_err(D::Error::custom)
}

fn deserialize_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

fn deserialize_integer<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|value| value.is_finite() && value.fract() == 0.0)
                .map(|value| value as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

fn deserialize_flag<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<bool>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => Some(flag),
        Value::Number(number) => number.as_f64().map(|value| value != 0.0),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" | "" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn extra_attributes(object: &Map<String, Value>, known: &[&str]) -> Map<String, Value> {
    object
        .iter()
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

impl EdgeRecord {
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| anyhow!("lineage edge must be a JSON object"))?;
        let raw = RawEdge::deserialize(value).context("invalid lineage edge record")?;

        Ok(Self {
            child_id: raw.child_id,
            child: raw.child.or(raw.child_name).unwrap_or_default(),
            parent: raw
                .parent
                .or(raw.parent_id)
                .filter(|parent| !parent.is_empty()),
            child_weight: raw.child_weight,
            parent_weight: raw.parent_weight,
            parent_level: raw.parent_level,
            node_type: raw.node_type.unwrap_or_default(),
            deleted: raw.deleted.unwrap_or(false),
            attributes: extra_attributes(object, EDGE_FIELDS),
        })
    }
}

impl NestedNode {
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| anyhow!("nested lineage node must be a JSON object"))?;
        let raw = RawNested::deserialize(value).context("invalid nested lineage node")?;

        let children = match object.get("children") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(Self::from_value)
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(anyhow!("`children` of a nested lineage node must be an array")),
        };

        Ok(Self {
            id: raw.id.or(raw.issuer_id).filter(|id| !id.is_empty()),
            name: raw.name.unwrap_or_default(),
            node_type: raw.node_type.unwrap_or_default(),
            deleted: raw.deleted.unwrap_or(false),
            children,
            attributes: extra_attributes(object, NESTED_FIELDS),
        })
    }
}

pub fn parse_payload(raw: &str) -> Result<LineagePayload> {
    let parsed: Value = serde_json::from_str(raw).context("invalid lineage JSON")?;
    payload_from_value(parsed)
}

fn payload_from_value(value: Value) -> Result<LineagePayload> {
    match value {
        Value::Array(items) => {
            let edges = items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    EdgeRecord::from_value(item)
                        .with_context(|| format!("lineage edge #{index} is malformed"))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(LineagePayload::Edges(edges))
        }
        Value::Object(mut object) => {
            if let Some(embedded) = take_present(&mut object, TREE_ITEMS_KEY) {
                return match unwrap_embedded(embedded, TREE_ITEMS_KEY)? {
                    Value::Null => Ok(LineagePayload::Empty),
                    nested @ Value::Object(_) => {
                        Ok(LineagePayload::Nested(NestedNode::from_value(&nested)?))
                    }
                    other => payload_from_value(other),
                };
            }

            if let Some(embedded) = take_present(&mut object, ACCOUNT_ITEMS_KEY) {
                return match unwrap_embedded(embedded, ACCOUNT_ITEMS_KEY)? {
                    Value::Null => Ok(LineagePayload::Empty),
                    other => payload_from_value(other),
                };
            }

            if object.contains_key("children") || object.contains_key("name") {
                let nested = NestedNode::from_value(&Value::Object(object))?;
                return Ok(LineagePayload::Nested(nested));
            }

            warn!(
                keys = ?object.keys().collect::<Vec<_>>(),
                "lineage payload has no genealogy items; treating as no data"
            );
            Ok(LineagePayload::Empty)
        }
        Value::Null => {
            warn!("lineage payload is null; treating as no data");
            Ok(LineagePayload::Empty)
        }
        other => Err(anyhow!(
            "unexpected JSON type for lineage payload: {}",
            json_type_name(&other)
        )),
    }
}

fn take_present(object: &mut Map<String, Value>, key: &str) -> Option<Value> {
    match object.remove(key) {
        Some(Value::Null) | None => None,
        Some(value) => Some(value),
    }
}

/// Genealogy items may arrive inline or as a JSON document encoded in a string.
fn unwrap_embedded(value: Value, key: &str) -> Result<Value> {
    match value {
        Value::String(text) if text.trim().is_empty() => {
            warn!(key, "genealogy items are an empty string; treating as no data");
            Ok(Value::Null)
        }
        Value::String(text) => serde_json::from_str(&text)
            .with_context(|| format!("`{key}` does not contain valid JSON")),
        other => Ok(other),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_flat_edges_with_numeric_and_string_ids() {
        let raw = json!([
            {"child_id": 1, "child": "A", "parent": 0, "child_weight": 3, "parent_level": 1},
            {"child_id": "2", "child_name": "B", "parent_id": "1", "home_domain": "example.com"}
        ])
        .to_string();

        let LineagePayload::Edges(edges) = parse_payload(&raw).unwrap() else {
            panic!("expected edges");
        };
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].child_id, "1");
        assert_eq!(edges[0].parent.as_deref(), Some("0"));
        assert_eq!(edges[0].child_weight, Some(3.0));
        assert_eq!(edges[0].parent_level, Some(1));
        assert_eq!(edges[1].child, "B");
        assert_eq!(edges[1].parent.as_deref(), Some("1"));
        assert_eq!(edges[1].attributes.get("home_domain"), Some(&json!("example.com")));
        assert!(!edges[1].attributes.contains_key("child_name"));
    }

    #[test]
    fn both_field_spellings_are_accepted_with_short_form_winning() {
        let raw = json!([
            {"child_id": 1, "child": "A", "child_name": "A", "parent": 0, "parent_id": 0},
            {"child_id": 2, "child": "B", "child_name": "Bee", "parent": 1, "parent_id": 9},
            {"child_id": 3, "child_name": "C", "parent": null, "parent_id": 1}
        ])
        .to_string();

        let LineagePayload::Edges(edges) = parse_payload(&raw).unwrap() else {
            panic!("expected edges");
        };
        assert_eq!(edges[0].child, "A");
        assert_eq!(edges[0].parent.as_deref(), Some("0"));
        assert_eq!(edges[1].child, "B");
        assert_eq!(edges[1].parent.as_deref(), Some("1"));
        assert_eq!(edges[2].child, "C");
        assert_eq!(edges[2].parent.as_deref(), Some("1"));
    }

    #[test]
    fn nested_node_with_id_and_issuer_id_prefers_id() {
        let raw = json!({"id": "N1", "issuer_id": "GISSUER", "name": "R", "children": []}).to_string();
        let LineagePayload::Nested(root) = parse_payload(&raw).unwrap() else {
            panic!("expected nested tree");
        };
        assert_eq!(root.id.as_deref(), Some("N1"));
        assert!(!root.attributes.contains_key("issuer_id"));
    }

    #[test]
    fn pass_through_fields_are_read_leniently() {
        let raw = json!([
            {"child_id": 1, "parent": 0, "parent_level": 1.0, "deleted": "true"},
            {"child_id": 2, "parent": 0, "parent_level": "2", "deleted": 0},
            {"child_id": 3, "parent": 0, "parent_level": 1.5, "deleted": "maybe"}
        ])
        .to_string();

        let LineagePayload::Edges(edges) = parse_payload(&raw).unwrap() else {
            panic!("expected edges");
        };
        assert_eq!(edges[0].parent_level, Some(1));
        assert!(edges[0].deleted);
        assert_eq!(edges[1].parent_level, Some(2));
        assert!(!edges[1].deleted);
        assert_eq!(edges[2].parent_level, None);
        assert!(!edges[2].deleted);

        let nested = json!({"name": "R", "deleted": "TRUE"}).to_string();
        let LineagePayload::Nested(root) = parse_payload(&nested).unwrap() else {
            panic!("expected nested tree");
        };
        assert!(root.deleted);
    }

    #[test]
    fn null_parent_is_kept_absent() {
        let raw = json!([{"child_id": 7, "child": "X", "parent": null}]).to_string();
        let LineagePayload::Edges(edges) = parse_payload(&raw).unwrap() else {
            panic!("expected edges");
        };
        assert_eq!(edges[0].parent, None);
    }

    #[test]
    fn wrapped_tree_takes_precedence_and_may_be_string_encoded() {
        let tree = json!({
            "name": "ROOT",
            "issuer_id": "G1",
            "children": [{"name": "CHILD", "node_type": "ASSET", "deleted": true}]
        });
        let raw = json!({
            "account_genealogy_items_json": [{"child_id": 1, "parent": 0}],
            "tree_genealogy_items_json": tree.to_string()
        })
        .to_string();

        let LineagePayload::Nested(root) = parse_payload(&raw).unwrap() else {
            panic!("expected nested tree");
        };
        assert_eq!(root.id.as_deref(), Some("G1"));
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].node_type, NodeType::Asset);
        assert!(root.children[0].deleted);
    }

    #[test]
    fn wrapped_account_items_fall_back_to_edges() {
        let raw = json!({
            "account_genealogy_items_json": "[{\"child_id\": 1, \"child\": \"A\", \"parent\": 0}]",
            "tree_genealogy_items_json": null
        })
        .to_string();

        assert!(matches!(parse_payload(&raw).unwrap(), LineagePayload::Edges(edges) if edges.len() == 1));
    }

    #[test]
    fn missing_genealogy_keys_mean_no_data() {
        let raw = json!({"status": "PENDING"}).to_string();
        assert_eq!(parse_payload(&raw).unwrap(), LineagePayload::Empty);
    }

    #[test]
    fn unknown_node_type_is_other() {
        let raw = json!([{"child_id": 1, "parent": 0, "node_type": "LIQUIDITY_POOL"}]).to_string();
        let LineagePayload::Edges(edges) = parse_payload(&raw).unwrap() else {
            panic!("expected edges");
        };
        assert_eq!(edges[0].node_type, NodeType::Other);
    }

    #[test]
    fn rejects_scalars_and_bad_ids() {
        assert!(parse_payload("42").is_err());
        assert!(parse_payload("not json").is_err());
        let raw = json!([{"child_id": [1], "parent": 0}]).to_string();
        assert!(parse_payload(&raw).is_err());
    }
}
