//! JSON pretty-printing and dotted-path search.
//!
//! Paths are `.`-separated. A key selects an object member, a number selects
//! an array element, `#` on its own yields the array length and `#.rest`
//! applies `rest` to every element.

use super::ResponseFormatter;
use anyhow::Result;
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

fn select(value: &Value, path: &[&str]) -> Option<Value> {
    let Some((segment, rest)) = path.split_first() else {
        return Some(value.clone());
    };

    match value {
        Value::Array(items) if *segment == "#" => {
            if rest.is_empty() {
                Some(Value::from(items.len()))
            } else {
                Some(Value::Array(
                    items.iter().filter_map(|item| select(item, rest)).collect(),
                ))
            }
        }
        Value::Array(items) => {
            let index: usize = segment.parse().ok()?;
            select(items.get(index)?, rest)
        }
        Value::Object(map) => select(map.get(*segment)?, rest),
        _ => None,
    }
}

impl ResponseFormatter for JsonFormatter {
    fn title(&self) -> String {
        "[json]".to_string()
    }

    fn searchable(&self) -> bool {
        true
    }

    fn format(&self, output: &mut String, raw: &[u8]) -> Result<()> {
        let value: Value = serde_json::from_slice(raw)?;
        output.push_str(&serde_json::to_string_pretty(&value)?);
        Ok(())
    }

    fn search(&self, query: &str, raw: &[u8]) -> Result<Vec<String>> {
        let value: Value = serde_json::from_slice(raw)?;
        let path: Vec<&str> = query.trim().split('.').collect();

        let results = match select(&value, &path) {
            Some(Value::Array(items)) => items
                .iter()
                .map(serde_json::to_string_pretty)
                .collect::<Result<Vec<_>, _>>()?,
            Some(found) => vec![serde_json::to_string_pretty(&found)?],
            None => Vec::new(),
        };
        Ok(results)
    }
}
