//! Shorthand reconstruction: rewrites colon-chain strings
//! (`"@func: arg"`, `"a: b: c"`) into their full nested-object form before
//! the main translation pipeline walks the tree. Only applied in
//! [`crate::ParseMode::Shorthand`].

use serde_json::Value;

/// `true` if `head` looks like a recognised specifier/variable chain
/// segment -- a function invocation (`@...`), macro invocation (`!...`), or
/// variable reference (`$...`).
fn looks_like_specifier(head: &str) -> bool {
    head.starts_with('@') || head.starts_with('!') || head.starts_with('$')
}

/// Rewrites every string found anywhere in `value`'s tree via
/// [`reconstruct_string`], recursing into object values and array items.
/// Object keys are left untouched -- they're already specifier positions.
pub fn reconstruct(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                out.insert(k.clone(), reconstruct(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(reconstruct).collect()),
        Value::String(s) => reconstruct_string(s),
        other => other.clone(),
    }
}

/// `"<specifier>: <tail>"` becomes `{"<specifier>": parse(<tail>)}`; a
/// string with no recognised colon-chain is left as a plain string (to be
/// recognised later as a variable/typed-literal/ordinary string).
fn reconstruct_string(s: &str) -> Value {
    if let Some(idx) = s.find(": ") {
        let head = &s[..idx];
        let tail = &s[idx + 2..];
        if looks_like_specifier(head) {
            return serde_json::json!({ head: parse_tail(tail) });
        }
    }
    Value::String(s.to_string())
}

/// The right-hand side of a colon-chain: itself possibly another chain
/// (`"a: b: c"` recurses once more into `"b: c"`), otherwise a JSON literal
/// written inline (`"[1, 2, 3]"`, `"5"`, `"true"`), otherwise a plain string.
fn parse_tail(tail: &str) -> Value {
    let trimmed = tail.trim();
    match reconstruct_string(trimmed) {
        Value::String(s) => serde_json::from_str::<Value>(&s).unwrap_or(Value::String(s)),
        chained => chained,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_function_call_shorthand() {
        let v: Value = serde_json::from_str("\"@plus: [1, 2]\"").unwrap();
        assert_eq!(reconstruct(&v), serde_json::json!({"@plus": [1, 2]}));
    }

    #[test]
    fn chains_nested_specifiers() {
        let v: Value = serde_json::from_str("\"@and: @eq: [1, 1]\"").unwrap();
        assert_eq!(
            reconstruct(&v),
            serde_json::json!({"@and": {"@eq": [1, 1]}})
        );
    }

    #[test]
    fn leaves_plain_strings_alone() {
        let v: Value = serde_json::from_str("\"hello world\"").unwrap();
        assert_eq!(reconstruct(&v), Value::String("hello world".to_string()));
    }

    #[test]
    fn recurses_into_object_values_only() {
        let v = serde_json::json!({"@and: true": 1, "k": "@plus: [1,2]"});
        let out = reconstruct(&v);
        // Keys untouched; only values go through reconstruction.
        assert!(out.get("@and: true").is_some());
        assert_eq!(out.get("k").unwrap(), &serde_json::json!({"@plus": [1, 2]}));
    }
}
