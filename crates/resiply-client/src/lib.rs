pub mod config;
pub mod error;
pub mod http;
pub mod traits;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use http::HttpBackend;
pub use traits::{ChatBackend, SuggestBackend};
