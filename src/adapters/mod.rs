// Adapters layer: concrete data sources behind the DataProvider port.

pub mod fake;
pub mod http;

pub use fake::{FakeDataProvider, FakeResource};
pub use http::JsonPlaceholderProvider;
