//! Value formatting for prompt text.
//!
//! The model was tuned on prompts whose values were printed by Python, so
//! non-string JSON renders the way Python prints the decoded value:
//! `True`, `None`, `{'x': 1}`, `['a', 'b']`. A bare string renders as-is.

use serde_json::Value;

/// Text for a value interpolated directly into the prompt.
pub fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => repr(other),
    }
}

/// Nested-value rendering: strings are quoted, containers recurse.
pub fn repr(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(repr).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quote(k), repr(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

/// Numeric value truncated toward zero. Non-numbers read as 0.
pub fn truncated(value: &Value) -> i64 {
    match value.as_i64() {
        Some(v) => v,
        None => value.as_f64().map_or(0, |v| v.trunc() as i64),
    }
}

/// Numeric value as a float. Non-numbers read as 0.0.
pub fn float(value: &Value) -> f64 {
    value.as_f64().unwrap_or(0.0)
}

fn quote(s: &str) -> String {
    let delimiter = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(delimiter);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{float, repr, text, truncated};

    #[test]
    fn test_strings_render_bare_at_top_level() {
        assert_eq!(text(&json!("last seen at spawn")), "last seen at spawn");
        assert_eq!(text(&json!("12:34:56")), "12:34:56");
    }

    #[test]
    fn test_scalars_render_like_python() {
        assert_eq!(text(&json!(true)), "True");
        assert_eq!(text(&json!(false)), "False");
        assert_eq!(text(&json!(null)), "None");
        assert_eq!(text(&json!(3)), "3");
        assert_eq!(text(&json!(12.5)), "12.5");
    }

    #[test]
    fn test_containers_render_like_python() {
        assert_eq!(
            text(&json!({ "x": 1, "y": 64.5, "world": "overworld" })),
            "{'x': 1, 'y': 64.5, 'world': 'overworld'}"
        );
        assert_eq!(text(&json!(["a", 1, null, [true]])), "['a', 1, None, [True]]");
        assert_eq!(text(&json!({})), "{}");
        assert_eq!(text(&json!([])), "[]");
    }

    #[test]
    fn test_nested_strings_pick_quotes_and_escape() {
        assert_eq!(repr(&json!("it's")), "\"it's\"");
        assert_eq!(repr(&json!("say \"hi\"")), "'say \"hi\"'");
        assert_eq!(repr(&json!("both ' and \"")), "'both \\' and \"'");
        assert_eq!(repr(&json!("line\nbreak\\")), "'line\\nbreak\\\\'");
        assert_eq!(repr(&json!("\u{1}")), "'\\x01'");
    }

    #[test]
    fn test_numeric_readers_default_to_zero() {
        assert_eq!(truncated(&json!(-3.7)), -3);
        assert_eq!(truncated(&json!(42)), 42);
        assert_eq!(truncated(&json!("far")), 0);
        assert!((float(&json!(2.46)) - 2.46).abs() < f64::EPSILON);
        assert_eq!(float(&json!("far")), 0.0);
    }
}
