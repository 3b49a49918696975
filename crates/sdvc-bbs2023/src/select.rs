//! # JSON-Pointer Selection
//!
//! Builds a selection document containing exactly the values a set of
//! JSON Pointers designates, plus the scaffolding JSON-LD needs to stay
//! meaningful: the document `@context`, and the `id`/`type` of every
//! ancestor node along a selected path. Blank-node identifiers (`_:`) are
//! never copied into the scaffolding, so holder-internal labels cannot
//! leak into a reveal document.
//!
//! Arrays are built sparsely while pointers are applied (unselected
//! positions hold `null`) and compacted afterwards.

use serde_json::{Map, Value};

use sdvc_core::pointer::parse_array_index;
use sdvc_core::{JsonPointer, Result, SuiteError};

const OP: &str = "select::select_json_ld";

/// Select the values designated by `pointers` from `document`.
///
/// Returns `None` when `pointers` is empty: no selection is not the same
/// as an empty selection.
pub fn select_json_ld(document: &Value, pointers: &[JsonPointer]) -> Result<Option<Value>> {
    if pointers.is_empty() {
        return Ok(None);
    }
    let root = document
        .as_object()
        .ok_or_else(|| SuiteError::generation(OP, "document must be a JSON object"))?;
    let mut selection = initial_selection(root);
    for pointer in pointers {
        if pointer.is_root() {
            selection = document.clone();
            continue;
        }
        select_path(document, &mut selection, pointer, pointer.tokens())?;
    }
    if let Some(context) = document.get("@context") {
        if let Value::Object(map) = &mut selection {
            map.insert("@context".to_string(), context.clone());
        }
    }
    compact_sparse_arrays(&mut selection);
    Ok(Some(selection))
}

/// The minimal stand-in for a node along a selected path: its
/// non-blank identifier and its type, nothing else.
fn initial_selection(source: &Map<String, Value>) -> Value {
    let mut out = Map::new();
    for id_key in ["id", "@id"] {
        if let Some(Value::String(id)) = source.get(id_key) {
            if !id.starts_with("_:") {
                out.insert(id_key.to_string(), Value::String(id.clone()));
            }
        }
    }
    for type_key in ["type", "@type"] {
        if let Some(types) = source.get(type_key) {
            out.insert(type_key.to_string(), types.clone());
        }
    }
    Value::Object(out)
}

fn container_for(value: &Value) -> Value {
    match value {
        Value::Array(_) => Value::Array(Vec::new()),
        Value::Object(map) => initial_selection(map),
        other => other.clone(),
    }
}

fn select_path(
    source: &Value,
    selection: &mut Value,
    pointer: &JsonPointer,
    tokens: &[String],
) -> Result<()> {
    let token = &tokens[0];
    let no_match = || {
        SuiteError::generation(
            OP,
            format!("pointer {:?} does not match the document at token {token:?}", pointer.as_str()),
        )
    };
    match source {
        Value::Object(map) => {
            let child = map.get(token.as_str()).ok_or_else(no_match)?;
            let sel_map = selection
                .as_object_mut()
                .ok_or_else(|| SuiteError::generation(OP, "selection shape diverged from document"))?;
            if tokens.len() == 1 {
                sel_map.insert(token.clone(), child.clone());
                return Ok(());
            }
            let entry = sel_map
                .entry(token.clone())
                .or_insert_with(|| container_for(child));
            select_path(child, entry, pointer, &tokens[1..])
        }
        Value::Array(items) => {
            let index = parse_array_index(token).ok_or_else(no_match)?;
            let child = items.get(index).ok_or_else(no_match)?;
            let sel_items = selection
                .as_array_mut()
                .ok_or_else(|| SuiteError::generation(OP, "selection shape diverged from document"))?;
            while sel_items.len() <= index {
                sel_items.push(Value::Null);
            }
            if tokens.len() == 1 {
                sel_items[index] = child.clone();
                return Ok(());
            }
            if sel_items[index].is_null() {
                sel_items[index] = container_for(child);
            }
            select_path(child, &mut sel_items[index], pointer, &tokens[1..])
        }
        _ => Err(no_match()),
    }
}

fn compact_sparse_arrays(value: &mut Value) {
    match value {
        Value::Array(items) => {
            items.retain(|item| !item.is_null());
            for item in items {
                compact_sparse_arrays(item);
            }
        }
        Value::Object(map) => {
            for (_, item) in map.iter_mut() {
                compact_sparse_arrays(item);
            }
        }
        _ => {}
    }
}
