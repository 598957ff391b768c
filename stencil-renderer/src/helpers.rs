//! Utility filter namespace registered on every engine.
//!
//! The helper set plays the role a general-purpose utility library plays in
//! classic template toolchains: a fixed collection of string, array, and
//! object manipulation filters available to every template. It is an
//! explicit value passed into [`TemplateEngine::new`] rather than ambient
//! global state, so a render call declares exactly which helpers it exposes.
//!
//! [`TemplateEngine::new`]: crate::engine::TemplateEngine::new

use std::collections::HashMap;

use serde_json::Value;
use tera::Tera;

type FilterFn = fn(&Value, &HashMap<String, Value>) -> tera::Result<Value>;

/// Named filter registry applied to a [`Tera`] instance before rendering.
pub struct Helpers {
    filters: Vec<(&'static str, FilterFn)>,
}

impl Helpers {
    /// The standard helper set: case conversions plus array/object utilities.
    pub fn standard() -> Self {
        Helpers {
            filters: vec![
                ("camel_case", camel_case),
                ("pascal_case", pascal_case),
                ("snake_case", snake_case),
                ("kebab_case", kebab_case),
                ("uniq", uniq),
                ("compact", compact),
                ("chunk", chunk),
                ("pick", pick),
            ],
        }
    }

    /// Register every helper filter on `tera`.
    pub fn register(&self, tera: &mut Tera) {
        for (name, filter) in &self.filters {
            tera.register_filter(name, *filter);
        }
    }

    /// Names of all helpers, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|(name, _)| *name).collect()
    }
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

fn expect_str<'a>(value: &'a Value, filter: &str) -> tera::Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("`{filter}` expects a string value")))
}

fn expect_array<'a>(value: &'a Value, filter: &str) -> tera::Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| tera::Error::msg(format!("`{filter}` expects an array value")))
}

/// Split on non-alphanumerics and lower-to-upper case boundaries.
/// Every returned word is lowercase.
fn words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in input.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_numeric();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// String filters
// ---------------------------------------------------------------------------

fn camel_case(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let words = words(expect_str(value, "camel_case")?);
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            out.push_str(word);
        } else {
            out.push_str(&capitalize(word));
        }
    }
    Ok(Value::String(out))
}

fn pascal_case(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let out: String = words(expect_str(value, "pascal_case")?)
        .iter()
        .map(|w| capitalize(w))
        .collect();
    Ok(Value::String(out))
}

fn snake_case(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(
        words(expect_str(value, "snake_case")?).join("_"),
    ))
}

fn kebab_case(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(
        words(expect_str(value, "kebab_case")?).join("-"),
    ))
}

// ---------------------------------------------------------------------------
// Array filters
// ---------------------------------------------------------------------------

fn uniq(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let arr = expect_array(value, "uniq")?;
    let mut seen: Vec<&Value> = Vec::with_capacity(arr.len());
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        if !seen.contains(&item) {
            seen.push(item);
            out.push(item.clone());
        }
    }
    Ok(Value::Array(out))
}

fn compact(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let arr = expect_array(value, "compact")?;
    Ok(Value::Array(
        arr.iter().filter(|v| !v.is_null()).cloned().collect(),
    ))
}

fn chunk(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let arr = expect_array(value, "chunk")?;
    let size = args
        .get("size")
        .and_then(Value::as_u64)
        .filter(|n| *n > 0)
        .ok_or_else(|| tera::Error::msg("`chunk` requires a positive `size` argument"))?
        as usize;
    Ok(Value::Array(
        arr.chunks(size)
            .map(|c| Value::Array(c.to_vec()))
            .collect(),
    ))
}

// ---------------------------------------------------------------------------
// Object filters
// ---------------------------------------------------------------------------

fn pick(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let obj = value
        .as_object()
        .ok_or_else(|| tera::Error::msg("`pick` expects an object value"))?;
    let keys = args
        .get("keys")
        .and_then(Value::as_array)
        .ok_or_else(|| tera::Error::msg("`pick` requires a `keys` array argument"))?;

    let mut out = serde_json::Map::new();
    for key in keys {
        let Some(key) = key.as_str() else { continue };
        if let Some(v) = obj.get(key) {
            out.insert(key.to_string(), v.clone());
        }
    }
    Ok(Value::Object(out))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
