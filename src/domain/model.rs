use chrono::{DateTime, TimeZone, Utc};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::domain::ports::ModelDefinition;

/// Field snapshot of a model instance, in wire order.
pub type Fields = serde_json::Map<String, Value>;

/// Key carrying per-item validation errors in server records. Never stored as a field.
pub const ERRORS_KEY: &str = "errors";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInstance {
    #[serde(rename = "type")]
    pub type_name: String,
    pub fields: Fields,
    #[serde(default)]
    pub saved: bool,
    #[serde(default)]
    pub errors: Option<Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ModelInstance {
    pub fn new(type_name: impl Into<String>, fields: Fields) -> Self {
        Self {
            type_name: type_name.into(),
            fields,
            saved: false,
            errors: None,
            created_at: None,
        }
    }

    /// Identifier rendered as a path segment. Null, `false`, `0` and `""` count as absent.
    pub fn id(&self) -> Option<String> {
        match self.fields.get("id")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            Value::Bool(true) => Some("true".to_string()),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// Overwrites every field present in `patch`.
    pub fn apply_patch(&mut self, patch: &Fields) {
        for (key, value) in patch {
            if key == ERRORS_KEY {
                continue;
            }
            self.fields.insert(key.clone(), value.clone());
        }
    }

    /// Copies the fields of `record` that this instance does not have yet.
    pub fn fill_missing(&mut self, record: &Fields) {
        for (key, value) in record {
            if key == ERRORS_KEY || self.fields.contains_key(key) {
                continue;
            }
            self.fields.insert(key.clone(), value.clone());
        }
    }

    /// Serializable snapshot sent to the server.
    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// Parses a `createdAt` wire value: RFC 3339 strings or epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

/// Shared handle to a canonical instance.
///
/// Clones alias the same record: a patch applied through one handle (for
/// example when the instance cache reconciles a later load) is visible to
/// every other holder. Use [`InstanceRef::snapshot`] for a detached copy.
#[derive(Clone)]
pub struct InstanceRef(Arc<RwLock<ModelInstance>>);

impl InstanceRef {
    pub fn new(instance: ModelInstance) -> Self {
        Self(Arc::new(RwLock::new(instance)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ModelInstance> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ModelInstance> {
        self.0.write()
    }

    pub fn snapshot(&self) -> ModelInstance {
        self.0.read().clone()
    }

    pub fn id(&self) -> Option<String> {
        self.0.read().id()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    /// True when both handles point at the same canonical instance.
    pub fn ptr_eq(&self, other: &InstanceRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for InstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InstanceRef").field(&*self.0.read()).finish()
    }
}

impl Serialize for InstanceRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.read().serialize(serializer)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub sort: Option<Value>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    pub nocase: bool,
    pub count: bool,
    pub scenario: Option<String>,
}

/// Read or bulk-remove request issued by the model layer.
#[derive(Debug, Clone)]
pub struct Query {
    pub model: Arc<dyn ModelDefinition>,
    pub by_id: Option<String>,
    pub raw_conditions: Fields,
    pub options: QueryOptions,
}

impl Query {
    pub fn new(model: Arc<dyn ModelDefinition>) -> Self {
        Self {
            model,
            by_id: None,
            raw_conditions: Fields::new(),
            options: QueryOptions::default(),
        }
    }

    pub fn by_id(mut self, id: impl Into<String>) -> Self {
        self.by_id = Some(id.into());
        self
    }

    pub fn with_conditions(mut self, conditions: Fields) -> Self {
        self.raw_conditions = conditions;
        self
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }
}

/// Outcome of a `load`, shaped by the query options.
#[derive(Debug, Clone)]
pub enum LoadResult {
    Items(Vec<InstanceRef>),
    Single(InstanceRef),
    Count(usize),
    /// `limit = 1` matched nothing.
    Nothing,
}

impl LoadResult {
    pub fn into_items(self) -> Vec<InstanceRef> {
        match self {
            LoadResult::Items(items) => items,
            LoadResult::Single(item) => vec![item],
            LoadResult::Count(_) | LoadResult::Nothing => Vec::new(),
        }
    }

    pub fn into_single(self) -> Option<InstanceRef> {
        match self {
            LoadResult::Single(item) => Some(item),
            LoadResult::Items(items) => items.into_iter().next(),
            LoadResult::Count(_) | LoadResult::Nothing => None,
        }
    }

    pub fn count(&self) -> Option<usize> {
        match self {
            LoadResult::Count(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, LoadResult::Nothing)
    }
}

/// Data handed to `insert`: one item or a batch. Returned in the same shape.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertInput {
    One(ModelInstance),
    Many(Vec<ModelInstance>),
}

impl InsertInput {
    pub fn len(&self) -> usize {
        match self {
            InsertInput::One(_) => 1,
            InsertInput::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn items(&self) -> &[ModelInstance] {
        match self {
            InsertInput::One(item) => std::slice::from_ref(item),
            InsertInput::Many(items) => items,
        }
    }

    pub fn items_mut(&mut self) -> &mut [ModelInstance] {
        match self {
            InsertInput::One(item) => std::slice::from_mut(item),
            InsertInput::Many(items) => items,
        }
    }

    pub fn into_vec(self) -> Vec<ModelInstance> {
        match self {
            InsertInput::One(item) => vec![item],
            InsertInput::Many(items) => items,
        }
    }
}

impl From<ModelInstance> for InsertInput {
    fn from(item: ModelInstance) -> Self {
        InsertInput::One(item)
    }
}

impl From<Vec<ModelInstance>> for InsertInput {
    fn from(items: Vec<ModelInstance>) -> Self {
        InsertInput::Many(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_id_treats_falsy_values_as_absent() {
        let with_number = ModelInstance::new("user", fields(json!({"id": 7})));
        let with_string = ModelInstance::new("user", fields(json!({"id": "abc"})));
        let with_null = ModelInstance::new("user", fields(json!({"id": null})));
        let with_zero = ModelInstance::new("user", fields(json!({"id": 0})));
        let without = ModelInstance::new("user", Fields::new());

        assert_eq!(with_number.id().as_deref(), Some("7"));
        assert_eq!(with_string.id().as_deref(), Some("abc"));
        assert_eq!(with_null.id(), None);
        assert_eq!(with_zero.id(), None);
        assert_eq!(without.id(), None);
    }

    #[test]
    fn test_fill_missing_keeps_existing_values() {
        let mut item = ModelInstance::new("user", fields(json!({"name": "Ada"})));
        item.fill_missing(&fields(
            json!({"name": "ignored", "teamId": 3, "errors": {"name": ["bad"]}}),
        ));

        assert_eq!(item.get("name"), Some(&json!("Ada")));
        assert_eq!(item.get("teamId"), Some(&json!(3)));
        assert!(item.get("errors").is_none());
    }

    #[test]
    fn test_apply_patch_overwrites() {
        let mut item = ModelInstance::new("user", fields(json!({"id": 1, "name": "Ada"})));
        item.apply_patch(&fields(json!({"name": "Grace", "age": 40})));

        assert_eq!(item.get("name"), Some(&json!("Grace")));
        assert_eq!(item.get("age"), Some(&json!(40)));
    }

    #[test]
    fn test_instance_ref_aliases_writes() {
        let first = InstanceRef::new(ModelInstance::new("user", fields(json!({"id": 1}))));
        let second = first.clone();

        second.write().set("name", json!("Linus"));

        assert!(first.ptr_eq(&second));
        assert_eq!(first.get("name"), Some(json!("Linus")));
    }

    #[test]
    fn test_parse_timestamp() {
        let from_string = parse_timestamp(&json!("2024-03-01T10:00:00Z")).unwrap();
        let from_millis = parse_timestamp(&json!(1_709_287_200_000i64)).unwrap();

        assert_eq!(from_string, from_millis);
        assert!(parse_timestamp(&json!("not a date")).is_none());
        assert!(parse_timestamp(&Value::Null).is_none());
    }

    #[test]
    fn test_load_result_accessors() {
        let item = InstanceRef::new(ModelInstance::new("user", Fields::new()));

        assert_eq!(LoadResult::Count(3).count(), Some(3));
        assert!(LoadResult::Nothing.into_single().is_none());
        assert_eq!(LoadResult::Single(item.clone()).into_items().len(), 1);
        assert!(LoadResult::Items(vec![item]).into_single().is_some());
    }
}
