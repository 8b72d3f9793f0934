//! Adapter persisting model instances through a remote resource API.
//!
//! Responses are unpacked into records, materialized through the model's own
//! construction contract and reconciled through a per-adapter
//! [`InstanceCache`], so one remote entity maps to one live instance.

mod naming;

pub use naming::ResourceNaming;

use async_trait::async_trait;
use chrono::SecondsFormat;
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::adapters::http::HttpTransport;
use crate::config::RestConfig;
use crate::core::cache::InstanceCache;
use crate::core::envelope::{extract_items, remote_error_message};
use crate::core::inflection::EnglishInflector;
use crate::core::registry::AdapterOptions;
use crate::domain::model::{
    parse_timestamp, Fields, InsertInput, InstanceRef, LoadResult, ModelInstance, Query,
    QueryOptions, ERRORS_KEY,
};
use crate::domain::ports::{Adapter, ModelDefinition, NameResolver, ReadParams, ResourceTransport};
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::Validate;

/// Factory linked into the default registry under `rest`.
pub fn create_adapter(options: AdapterOptions) -> Result<Box<dyn Adapter>> {
    let config = RestConfig::from_options(options)?;
    Ok(Box::new(RestAdapter::new(config)?))
}

pub struct RestAdapter {
    config: RestConfig,
    transport: Arc<dyn ResourceTransport>,
    naming: ResourceNaming,
    cache: InstanceCache,
}

impl RestAdapter {
    /// Adapter talking HTTP to `config.host`.
    pub fn new(config: RestConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::from_config(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: RestConfig, transport: Arc<dyn ResourceTransport>) -> Self {
        let naming = ResourceNaming::new(Arc::new(EnglishInflector), config.camelize);
        let cache = InstanceCache::new(config.cache_policy());
        Self {
            config,
            transport,
            naming,
            cache,
        }
    }

    pub fn with_name_resolver(mut self, resolver: Arc<dyn NameResolver>) -> Self {
        self.naming = ResourceNaming::new(resolver, self.config.camelize);
        self
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    pub fn cache(&self) -> &InstanceCache {
        &self.cache
    }

    pub fn naming(&self) -> &ResourceNaming {
        &self.naming
    }

    fn wrap_payload(&self, item: &ModelInstance) -> Value {
        let mut wrapped = Fields::new();
        wrapped.insert(self.naming.field_name(&item.type_name), item.to_json());
        Value::Object(wrapped)
    }
}

/// Turns a server record into a persisted instance.
fn materialize(model: &dyn ModelDefinition, record: &Fields, scenario: Option<&str>) -> ModelInstance {
    let mut item = model.create(record, scenario);
    // errors live on `item.errors`, never in the field map
    item.fields.remove(ERRORS_KEY);
    // keep denormalized and foreign-key fields the model does not declare
    item.fill_missing(record);
    item.saved = true;
    if let Some(errors) = record.get(ERRORS_KEY) {
        item.errors = Some(errors.clone());
    }
    item
}

fn check_remote_error(body: Value) -> Result<Value> {
    match remote_error_message(&body) {
        Some(message) => Err(AdapterError::remote(message, body)),
        None => Ok(body),
    }
}

#[async_trait]
impl Adapter for RestAdapter {
    fn name(&self) -> &str {
        "rest"
    }

    async fn load(&self, query: &Query) -> Result<LoadResult> {
        let model_name = query.model_name();
        let path = self.naming.resource_path(model_name);

        let body = match &query.by_id {
            Some(id) => {
                self.transport
                    .read(&format!("{}/{}", path, id), &ReadParams::default())
                    .await?
            }
            None => {
                self.transport
                    .read(&path, &ReadParams::from_query(query))
                    .await?
            }
        };
        let body = check_remote_error(body)?;

        let records = extract_items(&self.naming.inflections(model_name), &body);
        let items: Vec<InstanceRef> = self.cache.reconcile_many(
            model_name,
            records
                .iter()
                .map(|record| materialize(query.model.as_ref(), record, None)),
        );
        tracing::debug!(model = model_name, count = items.len(), "loaded records");

        let opts = &query.options;
        if opts.limit == Some(1) {
            return Ok(match items.into_iter().next() {
                None => LoadResult::Nothing,
                Some(_) if opts.count => LoadResult::Count(1),
                Some(item) => LoadResult::Single(item),
            });
        }

        if opts.count {
            Ok(LoadResult::Count(items.len()))
        } else {
            Ok(LoadResult::Items(items))
        }
    }

    /// Creates every item concurrently. Items are patched with the server's
    /// record (ids included) and returned in the shape they were given. The
    /// first failing item fails the whole call; creates already sent are
    /// left running and are not rolled back.
    async fn insert(&self, mut data: InsertInput, _options: &QueryOptions) -> Result<InsertInput> {
        let expected = data.len();
        if expected == 0 {
            return Ok(data);
        }

        let mut pending = JoinSet::new();
        for (index, item) in data.items().iter().enumerate() {
            let transport = Arc::clone(&self.transport);
            let path = self.naming.resource_path(&item.type_name);
            let body = self.wrap_payload(item);
            pending.spawn(async move { (index, transport.create(&path, &body).await) });
        }

        let mut completed = 0;
        while let Some(joined) = pending.join_next().await {
            let outcome = joined
                .map_err(AdapterError::from)
                .and_then(|(index, response)| Ok((index, check_remote_error(response?)?)));
            let (index, body) = match outcome {
                Ok(done) => done,
                Err(e) => {
                    pending.detach_all();
                    return Err(e);
                }
            };

            let item = &mut data.items_mut()[index];
            let inflections = self.naming.inflections(&item.type_name);
            let resource = extract_items(&inflections, &body)
                .into_iter()
                .next()
                .unwrap_or_default();
            item.apply_patch(&resource);
            item.saved = true;
            if let Some(errors) = resource.get(ERRORS_KEY) {
                item.errors = Some(errors.clone());
            }
            if item.id().is_some() {
                self.cache.reconcile(&item.type_name, item.clone());
            }

            completed += 1;
        }

        tracing::debug!(completed, expected, "insert batch completed");
        Ok(data)
    }

    async fn update(&self, data: &ModelInstance, query: &Query) -> Result<Option<InstanceRef>> {
        let id = data.id().ok_or_else(|| AdapterError::MissingIdentifier {
            type_name: data.type_name.clone(),
        })?;
        let path = format!("{}/{}", self.naming.resource_path(&data.type_name), id);

        let body = self.transport.update(&path, &self.wrap_payload(data)).await?;
        let body = check_remote_error(body)?;

        let inflections = self.naming.inflections(query.model_name());
        let Some(record) = extract_items(&inflections, &body).into_iter().next() else {
            return Ok(None);
        };

        let mut item = materialize(
            query.model.as_ref(),
            &record,
            query.options.scenario.as_deref(),
        );
        item.created_at = record.get("createdAt").and_then(parse_timestamp);
        if let Some(created_at) = item.created_at {
            item.set(
                "createdAt",
                Value::String(created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            );
        }

        let type_name = item.type_name.clone();
        Ok(Some(self.cache.reconcile(&type_name, item)))
    }

    async fn remove(&self, query: &Query) -> Result<Value> {
        let model_name = query.model_name();
        let path = self.naming.resource_path(model_name);

        match &query.by_id {
            Some(id) => {
                let body = self
                    .transport
                    .remove(&format!("{}/{}", path, id), None)
                    .await?;
                self.cache.evict(model_name, id);
                Ok(body)
            }
            None => {
                self.transport
                    .remove(&path, Some(&ReadParams::from_query(query)))
                    .await
            }
        }
    }
}
