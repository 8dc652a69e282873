//! Yahoo Fantasy Sports wire format.
//!
//! The v2 API answers in XML. Bodies are folded into a compact tree of
//! `serde_json::Value`: child elements become keys, repeated children become
//! arrays, text lands under `_text` and attributes under `_attributes`.
//! Whether a child is an object or an array depends on how many siblings
//! share its name, so readers go through `path::one_or_many`.
use crate::path::TEXT;
use roxmltree::{Document, Node};
use serde_json::{Map, Value};

pub const ATTRIBUTES: &str = "_attributes";

/// Parse an XML body into the compact tree. Blank bodies become `Value::Null`.
pub fn xml_to_tree(xml: &str) -> Result<Value, roxmltree::Error> {
    if xml.trim().is_empty() {
        return Ok(Value::Null);
    }
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    let mut top = Map::new();
    top.insert(root.tag_name().name().to_owned(), element_to_value(root));
    Ok(Value::Object(top))
}

fn element_to_value(node: Node) -> Value {
    let mut map = Map::new();

    let attributes: Map<String, Value> = node
        .attributes()
        .map(|a| (a.name().to_owned(), Value::String(a.value().to_owned())))
        .collect();
    if !attributes.is_empty() {
        map.insert(ATTRIBUTES.to_owned(), Value::Object(attributes));
    }

    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            let name = child.tag_name().name().to_owned();
            let value = element_to_value(child);
            match map.get_mut(&name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(name, value);
                }
            }
        } else if child.is_text()
            && let Some(t) = child.text()
        {
            text.push_str(t);
        }
    }

    // Indentation between child elements is not content.
    if !text.trim().is_empty() {
        map.insert(TEXT.to_owned(), Value::String(text));
    }

    Value::Object(map)
}
