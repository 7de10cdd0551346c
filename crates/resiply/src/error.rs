use thiserror::Error;

/// Failures while wiring up the engine (settings, storage, backend client).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Storage error: {0}")]
    Persist(#[from] resiply_persist::PersistError),

    #[error("Backend client error: {0}")]
    Client(#[from] resiply_client::ClientError),

    #[error("Logging setup error: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Reasons a chat send is refused before anything is appended.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("Thread not found: {0}")]
    UnknownThread(String),

    #[error("A reply is still pending for thread {0}")]
    Busy(String),

    #[error("Sign-in required")]
    AuthRequired,
}

/// Checkout outcomes that leave the cart and order list untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Sign-in required")]
    AuthRequired,

    #[error("Nothing to purchase")]
    EmptyOrder,

    #[error("Thread not found: {0}")]
    UnknownThread(String),
}
