//! Item extraction from decoded response envelopes.

use serde_json::Value;

use crate::domain::model::Fields;
use crate::domain::ports::Inflections;

/// Finds the item records in `body` for a model with the given inflections.
///
/// Keys are tried in order: singular filename, plural filename, singular
/// property, plural property. Singular hits are wrapped as one item. A plural
/// value that arrives as an index-keyed object is flattened to its object
/// values in iteration order. Non-object entries are skipped.
pub fn extract_items(inflections: &Inflections, body: &Value) -> Vec<Fields> {
    let candidates = [
        (&inflections.filename.singular, true),
        (&inflections.filename.plural, false),
        (&inflections.property.singular, true),
        (&inflections.property.plural, false),
    ];

    for (key, singular) in candidates {
        let Some(value) = body.get(key.as_str()).filter(|v| is_truthy(v)) else {
            continue;
        };
        return if singular {
            value.as_object().cloned().into_iter().collect()
        } else {
            collect_records(value)
        };
    }

    Vec::new()
}

fn collect_records(value: &Value) -> Vec<Fields> {
    match value {
        Value::Array(items) => items.iter().filter_map(|v| v.as_object().cloned()).collect(),
        Value::Object(indexed) => indexed
            .values()
            .filter_map(|v| v.as_object().cloned())
            .collect(),
        _ => Vec::new(),
    }
}

/// Truthiness of an envelope value, as the resource API signals presence.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The `error` field of an envelope, rendered as a message.
pub fn remote_error_message(body: &Value) -> Option<String> {
    let error = body.get("error").filter(|v| is_truthy(v))?;
    Some(match error {
        Value::String(message) => message.clone(),
        Value::Object(obj) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::InflectionPair;
    use serde_json::json;

    fn inflections(filename: (&str, &str), property: (&str, &str)) -> Inflections {
        Inflections {
            filename: InflectionPair {
                singular: filename.0.to_string(),
                plural: filename.1.to_string(),
            },
            property: InflectionPair {
                singular: property.0.to_string(),
                plural: property.1.to_string(),
            },
            constructor: InflectionPair {
                singular: String::new(),
                plural: String::new(),
            },
        }
    }

    fn user() -> Inflections {
        inflections(("user", "users"), ("user", "users"))
    }

    #[test]
    fn test_plural_key_yields_list() {
        let body = json!({"users": [{"id": 1}, {"id": 2}]});

        let items = extract_items(&user(), &body);

        assert_eq!(items.len(), 2);
        assert_eq!(items[1].get("id"), Some(&json!(2)));
    }

    #[test]
    fn test_singular_key_yields_one_item() {
        let body = json!({"user": {"id": 7, "name": "Ada"}});

        let items = extract_items(&user(), &body);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("name"), Some(&json!("Ada")));
    }

    #[test]
    fn test_singular_key_wins_over_plural() {
        let body = json!({"users": [{"id": 1}, {"id": 2}], "user": {"id": 9}});

        let items = extract_items(&user(), &body);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("id"), Some(&json!(9)));
    }

    #[test]
    fn test_property_keys_are_fallbacks() {
        let names = inflections(("blog_post", "blog_posts"), ("blogPost", "blogPosts"));

        let single = extract_items(&names, &json!({"blogPost": {"id": 1}}));
        let many = extract_items(&names, &json!({"blogPosts": [{"id": 1}, {"id": 2}]}));

        assert_eq!(single.len(), 1);
        assert_eq!(many.len(), 2);
    }

    #[test]
    fn test_index_keyed_object_is_flattened() {
        let body = json!({"users": {"0": {"id": 1}, "1": {"id": 2}, "length": 2}});

        let items = extract_items(&user(), &body);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("id"), Some(&json!(1)));
        assert_eq!(items[1].get("id"), Some(&json!(2)));
    }

    #[test]
    fn test_missing_or_null_keys_yield_nothing() {
        assert!(extract_items(&user(), &json!({"teams": [{"id": 1}]})).is_empty());
        assert!(extract_items(&user(), &json!({"user": null, "users": []})).is_empty());
        assert!(extract_items(&user(), &json!([])).is_empty());
    }

    #[test]
    fn test_remote_error_message() {
        assert_eq!(
            remote_error_message(&json!({"error": "not allowed"})).as_deref(),
            Some("not allowed")
        );
        assert_eq!(
            remote_error_message(&json!({"error": {"message": "boom", "code": 3}})).as_deref(),
            Some("boom")
        );
        assert!(remote_error_message(&json!({"error": null})).is_none());
        assert!(remote_error_message(&json!({"users": []})).is_none());
    }
}
