pub mod client;
pub mod error;
pub mod model;

pub use client::MirrorClient;
pub use error::*;
pub use model::{LogOrder, LogPage, LogRecord};
