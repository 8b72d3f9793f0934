// Domain layer: model types and ports (interfaces) shared by every adapter.

pub mod model;
pub mod ports;
pub mod schema;
