pub mod screen;
pub mod terminal;

pub use screen::{provider_from_config, MainScreen};
