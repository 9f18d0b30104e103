use serde_json::Value;

use crate::error::MenuError;
use crate::menu::MenuItem;

/// Turns a model's JSON answer into menu items.
///
/// Accepts a bare array or an object wrapping the array under `items` or
/// `menu`, optionally inside a markdown code fence. Prices may be numbers or
/// strings such as `"$5.99"`.
pub struct JsonMenuExtractor;

impl JsonMenuExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract_menu(&self, raw: &str) -> Result<Vec<MenuItem>, MenuError> {
        let json: Value = serde_json::from_str(strip_code_fence(raw))?;
        let entries = parse_entries(&json)?;

        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| parse_item(i, entry))
            .collect()
    }
}

impl Default for JsonMenuExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the language tag line, e.g. ```json
    let body = body.split_once('\n').map_or("", |(_, rest)| rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn parse_entries(json: &Value) -> Result<&Vec<Value>, MenuError> {
    if let Some(array) = json.as_array() {
        return Ok(array);
    }
    ["items", "menu"]
        .iter()
        .find_map(|key| json.get(*key).and_then(|v| v.as_array()))
        .ok_or_else(|| MenuError::Malformed("expected a list of menu items".to_string()))
}

fn parse_item(position: usize, entry: &Value) -> Result<MenuItem, MenuError> {
    let name = entry
        .get("name")
        .and_then(|n| n.as_str())
        .map(|n| n.trim().to_string())
        .ok_or_else(|| MenuError::Malformed(format!("item {} has no name", position)))?;

    let description = entry
        .get("description")
        .and_then(|d| d.as_str())
        .map(|d| d.trim().to_string())
        .unwrap_or_default();

    let price = entry
        .get("price")
        .and_then(parse_price)
        .ok_or_else(|| MenuError::Malformed(format!("item {:?} has no usable price", name)))?;

    Ok(MenuItem { name, description, price })
}

fn parse_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('$').replace(',', "").trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_array() {
        let items = JsonMenuExtractor::new()
            .extract_menu(r#"[{"name":"Pork Roll","description":"Taylor ham","price":4.5}]"#)
            .unwrap();
        assert_eq!(items, vec![MenuItem::new("Pork Roll", "Taylor ham", 4.5)]);
    }

    #[test]
    fn test_wrapped_and_fenced() {
        let raw = "```json\n{\"items\": [{\"name\": \"Soda\", \"price\": \"$1,001.25\"}]}\n```";
        let items = JsonMenuExtractor::new().extract_menu(raw).unwrap();
        assert_eq!(items, vec![MenuItem::new("Soda", "", 1001.25)]);

        let raw = r#"{"menu": [{"name": "Taco", "description": null, "price": 3}]}"#;
        let items = JsonMenuExtractor::new().extract_menu(raw).unwrap();
        assert_eq!(items, vec![MenuItem::new("Taco", "", 3.0)]);
    }

    #[test]
    fn test_malformed() {
        let extractor = JsonMenuExtractor::new();
        assert!(matches!(extractor.extract_menu("Sorry, I can't"), Err(MenuError::Malformed(_))));
        assert!(matches!(extractor.extract_menu(r#"{"ok": true}"#), Err(MenuError::Malformed(_))));
        assert!(matches!(
            extractor.extract_menu(r#"[{"name": "Soda", "price": "market price"}]"#),
            Err(MenuError::Malformed(_))
        ));
        assert!(matches!(extractor.extract_menu(r#"[{"price": 2}]"#), Err(MenuError::Malformed(_))));
    }
}
