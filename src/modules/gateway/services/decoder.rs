//! Decodes webservice replies into a generic field tree.
//!
//! Responses are small XML documents under the gateway's namespace. They
//! are decoded into a `serde_json::Value` so callers can inspect any
//! field the gateway sends without this crate modeling all of them:
//! elements become objects, attributes become `"@name"` keys, repeated
//! sibling elements become arrays and text-only elements become strings.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use super::transport::RawResponse;
use crate::core::catalog;
use crate::core::error::{CieloError, Result};

/// A reply parsed into the generic field tree
#[derive(Debug, Clone)]
pub struct DecodedResponse {
    /// Root element name (`transacao`, `retorno-token`)
    pub root: String,
    /// Contents of the root element
    pub tree: Value,
}

/// Decodes a raw reply, raising the gateway's `erro` envelope as a typed
/// error. Unparseable markup keeps the HTTP status and body for
/// diagnostics.
pub fn decode(raw: &RawResponse) -> Result<DecodedResponse> {
    let (root, tree) = parse_document(&raw.body)
        .map_err(|reason| CieloError::response_format(raw.http_status, reason, raw.body.clone()))?;

    if root == "erro" {
        let code = text_at(&tree, &["codigo"]).unwrap_or_default().to_string();
        if code.is_empty() {
            return Err(CieloError::response_format(
                raw.http_status,
                "erro envelope without codigo",
                raw.body.clone(),
            ));
        }
        let embedded = text_at(&tree, &["mensagem"]).unwrap_or_default();
        return Err(CieloError::Gateway {
            message: catalog::resolve(&code, embedded),
            code,
            raw: Some(raw.body.clone()),
        });
    }

    Ok(DecodedResponse { root, tree })
}

/// Looks up the text value at a nested element path of a decoded tree
pub fn text_at<'a>(tree: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut node = tree;
    for key in path {
        node = node.get(key)?;
    }
    match node {
        Value::String(text) => Some(text),
        Value::Object(map) => map.get("#text").and_then(Value::as_str),
        _ => None,
    }
}

fn parse_document(body: &str) -> std::result::Result<(String, Value), String> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(start) => {
                let name = element_name(&start);
                let value = read_element(&mut reader, &start)?;
                return Ok((name, value));
            }
            Event::Empty(start) => {
                let name = element_name(&start);
                let attrs = attributes_map(&start)?;
                let value = if attrs.is_empty() {
                    Value::String(String::new())
                } else {
                    Value::Object(attrs)
                };
                return Ok((name, value));
            }
            Event::Eof => return Err("document has no root element".to_string()),
            _ => continue,
        }
    }
}

fn read_element(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
) -> std::result::Result<Value, String> {
    let mut children = attributes_map(start)?;
    let mut text = String::new();

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(child) => {
                let name = element_name(&child);
                let value = read_element(reader, &child)?;
                insert_child(&mut children, name, value);
            }
            Event::Empty(child) => {
                let name = element_name(&child);
                let attrs = attributes_map(&child)?;
                let value = if attrs.is_empty() {
                    Value::String(String::new())
                } else {
                    Value::Object(attrs)
                };
                insert_child(&mut children, name, value);
            }
            Event::Text(content) => {
                text.push_str(&content.unescape().map_err(|e| e.to_string())?);
            }
            Event::CData(content) => {
                text.push_str(&String::from_utf8_lossy(&content.into_inner()));
            }
            Event::End(_) => break,
            Event::Eof => return Err("unexpected end of document".to_string()),
            _ => continue,
        }
    }

    if children.is_empty() {
        return Ok(Value::String(text));
    }
    if !text.is_empty() {
        children.insert("#text".to_string(), Value::String(text));
    }
    Ok(Value::Object(children))
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn attributes_map(start: &BytesStart<'_>) -> std::result::Result<Map<String, Value>, String> {
    let mut map = Map::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let key = format!("@{}", String::from_utf8_lossy(attribute.key.as_ref()));
        let value = attribute
            .unescape_value()
            .map_err(|e| e.to_string())?
            .into_owned();
        map.insert(key, Value::String(value));
    }
    Ok(map)
}

// Repeated siblings (e.g. multiple `cancelamento` entries) collapse into
// an array, matching how callers index the tree.
fn insert_child(map: &mut Map<String, Value>, name: String, value: Value) {
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
}
