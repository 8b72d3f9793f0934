use crate::domain::model::{
    Fields, InsertInput, InstanceRef, LoadResult, ModelInstance, Query, QueryOptions,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Construction contract owned by the model layer.
pub trait ModelDefinition: fmt::Debug + Send + Sync {
    fn model_name(&self) -> &str;

    /// Builds an instance from a raw record. Implementations may drop fields
    /// they do not declare; the adapter restores those afterwards.
    fn create(&self, data: &Fields, scenario: Option<&str>) -> ModelInstance;
}

/// Singular/plural pair of one naming style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InflectionPair {
    pub singular: String,
    pub plural: String,
}

/// Name variants of a logical model name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inflections {
    /// snake_case, used for URL segments.
    pub filename: InflectionPair,
    /// camelCase, used for wire properties.
    pub property: InflectionPair,
    /// PascalCase.
    pub constructor: InflectionPair,
}

pub trait NameResolver: Send + Sync {
    fn inflections(&self, model_name: &str) -> Inflections;
}

/// Parameters of a collection read or bulk remove.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReadParams {
    pub query: Option<Fields>,
    pub sort: Option<Value>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    pub nocase: bool,
}

impl ReadParams {
    /// Conditions are forwarded only when non-empty, paging only when non-zero.
    pub fn from_query(query: &Query) -> Self {
        let opts = &query.options;
        Self {
            query: if query.raw_conditions.is_empty() {
                None
            } else {
                Some(query.raw_conditions.clone())
            },
            sort: opts.sort.clone(),
            limit: opts.limit.filter(|n| *n > 0),
            skip: opts.skip.filter(|n| *n > 0),
            nocase: opts.nocase,
        }
    }
}

/// Remote resource API. Implementations own timeouts and authentication.
#[async_trait]
pub trait ResourceTransport: Send + Sync {
    async fn read(&self, path: &str, params: &ReadParams) -> Result<Value>;
    async fn create(&self, path: &str, data: &Value) -> Result<Value>;
    async fn update(&self, path: &str, data: &Value) -> Result<Value>;
    async fn remove(&self, path: &str, params: Option<&ReadParams>) -> Result<Value>;
}

/// Capability contract every backend adapter implements.
#[async_trait]
pub trait Adapter: Send + Sync {
    fn name(&self) -> &str;

    async fn load(&self, query: &Query) -> Result<LoadResult>;

    async fn insert(&self, data: InsertInput, options: &QueryOptions) -> Result<InsertInput>;

    async fn update(&self, data: &ModelInstance, query: &Query) -> Result<Option<InstanceRef>>;

    async fn remove(&self, query: &Query) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::SchemaModel;
    use serde_json::json;
    use std::sync::Arc;

    fn user_query() -> Query {
        Query::new(Arc::new(SchemaModel::open("user")))
    }

    #[test]
    fn test_zero_paging_is_not_forwarded() {
        let query = user_query().with_options(QueryOptions {
            limit: Some(0),
            skip: Some(0),
            ..QueryOptions::default()
        });

        let params = ReadParams::from_query(&query);

        assert_eq!(params, ReadParams::default());
    }

    #[test]
    fn test_paging_and_conditions_are_forwarded() {
        let query = user_query()
            .with_conditions(json!({"active": true}).as_object().cloned().unwrap())
            .with_options(QueryOptions {
                limit: Some(10),
                skip: Some(30),
                ..QueryOptions::default()
            });

        let params = ReadParams::from_query(&query);

        assert_eq!(params.limit, Some(10));
        assert_eq!(params.skip, Some(30));
        assert_eq!(params.query, json!({"active": true}).as_object().cloned());
    }
}
