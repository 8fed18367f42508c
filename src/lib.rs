pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;

pub use error::{Result, StoreError, TimelineError};
