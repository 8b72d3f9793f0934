pub mod cache;
pub mod envelope;
pub mod inflection;
pub mod registry;

pub use crate::domain::model::{Fields, InstanceRef, LoadResult, ModelInstance, Query};
pub use crate::domain::ports::{Adapter, ModelDefinition, NameResolver, ResourceTransport};
pub use crate::utils::error::Result;
