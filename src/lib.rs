pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::{DataSourceConfig, RestConfig};

pub use adapters::{HttpTransport, RestAdapter};
pub use core::cache::{CachePolicy, InstanceCache};
pub use core::registry::{resolve, AdapterDescriptor, AdapterRegistry, StorageType};
pub use domain::model::{
    Fields, InsertInput, InstanceRef, LoadResult, ModelInstance, Query, QueryOptions,
};
pub use domain::ports::{Adapter, ModelDefinition, NameResolver, ReadParams, ResourceTransport};
pub use domain::schema::SchemaModel;
pub use utils::error::{AdapterError, Result};
