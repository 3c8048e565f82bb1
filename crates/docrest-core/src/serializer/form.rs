//! Flat multi-value form input, expanded to nested JSON.
//!
//! Keys follow the HTML form conventions: `tags` repeated for a list,
//! `tags[0]` for an indexed list, `mpg.loaded` for a mapping and
//! `entries[1].loaded` for a list of mappings.

use crate::field::{FieldNode, FieldTree};
use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::BTreeMap;

///
/// FormData
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FormData {
    entries: Vec<(String, String)>,
}

impl FormData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(key, value);
        self
    }

    /// Every value submitted under exactly `key`.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expand into a JSON object keyed by the top-level names of `tree`.
    /// Keys that match no field are dropped.
    #[must_use]
    pub fn to_json(&self, tree: &FieldTree) -> JsonValue {
        let mut slots: IndexMap<&str, Slot> = IndexMap::new();

        for (key, value) in &self.entries {
            let Some((name, rest)) = split_name(key, tree) else {
                continue;
            };
            let Some(path) = parse_path(rest) else {
                continue;
            };
            slots.entry(name).or_default().insert(&path, value);
        }

        let mut out = JsonMap::new();
        for (name, slot) in slots {
            let is_list = tree
                .get(name)
                .is_some_and(|f| matches!(f.node, FieldNode::List(_)));
            out.insert(name.to_string(), slot.into_json(is_list));
        }

        JsonValue::Object(out)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn split_name<'k>(key: &'k str, tree: &FieldTree) -> Option<(&'k str, &'k str)> {
    let end = key.find(['[', '.']).unwrap_or(key.len());
    let (name, rest) = key.split_at(end);

    tree.contains_key(name).then_some((name, rest))
}

enum Seg {
    Index(usize),
    Key(String),
}

// `[0].loaded[2]` → Index(0), Key(loaded), Index(2)
fn parse_path(mut rest: &str) -> Option<Vec<Seg>> {
    let mut path = Vec::new();

    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix('[') {
            let close = tail.find(']')?;
            path.push(Seg::Index(tail[..close].parse().ok()?));
            rest = &tail[close + 1..];
        } else if let Some(tail) = rest.strip_prefix('.') {
            let end = tail.find(['[', '.']).unwrap_or(tail.len());
            if end == 0 {
                return None;
            }
            path.push(Seg::Key(tail[..end].to_string()));
            rest = &tail[end..];
        } else {
            return None;
        }
    }

    Some(path)
}

#[derive(Default)]
enum Slot {
    #[default]
    Empty,
    Leaf(Vec<String>),
    List(BTreeMap<usize, Self>),
    Object(IndexMap<String, Self>),
}

impl Slot {
    fn insert(&mut self, path: &[Seg], value: &str) {
        match path.split_first() {
            None => match self {
                Self::Leaf(values) => values.push(value.to_string()),
                _ => *self = Self::Leaf(vec![value.to_string()]),
            },
            Some((Seg::Index(i), rest)) => {
                if !matches!(self, Self::List(_)) {
                    *self = Self::List(BTreeMap::new());
                }
                if let Self::List(items) = self {
                    items.entry(*i).or_default().insert(rest, value);
                }
            }
            Some((Seg::Key(k), rest)) => {
                if !matches!(self, Self::Object(_)) {
                    *self = Self::Object(IndexMap::new());
                }
                if let Self::Object(map) = self {
                    map.entry(k.clone()).or_default().insert(rest, value);
                }
            }
        }
    }

    // Indexed lists are compacted in index order.
    fn into_json(self, is_list: bool) -> JsonValue {
        match self {
            Self::Empty => JsonValue::Null,
            Self::Leaf(values) if is_list => {
                JsonValue::Array(values.into_iter().map(JsonValue::String).collect())
            }
            Self::Leaf(mut values) => values.pop().map_or(JsonValue::Null, JsonValue::String),
            Self::List(items) => {
                JsonValue::Array(items.into_values().map(|s| s.into_json(false)).collect())
            }
            Self::Object(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(k, s)| (k, s.into_json(false)))
                    .collect(),
            ),
        }
    }
}
