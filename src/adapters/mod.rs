// Adapters layer: concrete backends and the transports they talk through.

pub mod http;
pub mod rest;

pub use http::HttpTransport;
pub use rest::RestAdapter;
