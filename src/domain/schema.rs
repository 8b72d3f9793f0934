use crate::domain::model::{Fields, ModelInstance};
use crate::domain::ports::ModelDefinition;

/// Minimal model definition: a name plus an optional list of declared fields.
///
/// With declared fields, `create` keeps only those (and `id`), mirroring how
/// a schema-bound model drops unknown properties.
#[derive(Debug, Clone)]
pub struct SchemaModel {
    name: String,
    declared: Option<Vec<String>>,
}

impl SchemaModel {
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            declared: Some(fields.into_iter().map(Into::into).collect()),
        }
    }

    /// Accepts every field of the record.
    pub fn open(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared: None,
        }
    }

    fn declares(&self, key: &str) -> bool {
        match &self.declared {
            Some(fields) => key == "id" || fields.iter().any(|f| f == key),
            None => true,
        }
    }
}

impl ModelDefinition for SchemaModel {
    fn model_name(&self) -> &str {
        &self.name
    }

    fn create(&self, data: &Fields, _scenario: Option<&str>) -> ModelInstance {
        let fields = data
            .iter()
            .filter(|(key, _)| self.declares(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        ModelInstance::new(self.name.clone(), fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_declared_fields_filter_record() {
        let model = SchemaModel::new("user", ["name"]);
        let record = json!({"id": 1, "name": "Ada", "teamId": 9});

        let item = model.create(record.as_object().unwrap(), None);

        assert_eq!(item.type_name, "user");
        assert_eq!(item.get("id"), Some(&json!(1)));
        assert_eq!(item.get("name"), Some(&json!("Ada")));
        assert!(item.get("teamId").is_none());
    }

    #[test]
    fn test_open_model_keeps_everything() {
        let model = SchemaModel::open("user");
        let record = json!({"id": 1, "teamId": 9});

        let item = model.create(record.as_object().unwrap(), Some("update"));

        assert_eq!(item.fields.len(), 2);
    }
}
