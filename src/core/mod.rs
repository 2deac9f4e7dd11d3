pub mod cancel;
pub mod dispatcher;
pub mod operators;
pub mod output;
pub mod samples;
pub mod vocabulary;

pub use crate::domain::model::{Comment, Post, User};
pub use crate::domain::ports::{DataProvider, DisplaySurface, OutputEvent};
pub use crate::utils::error::Result;
pub use cancel::{CancelToken, CancellationGroup};
pub use dispatcher::{CommandTable, DispatchOutcome, Dispatcher};
pub use output::{OutputBuffer, OutputHandle, SampleOutput};
pub use samples::{SampleKind, SampleRunner};
