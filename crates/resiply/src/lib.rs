//! Client-side engine of the Resiply storefront: chat threads reconciled
//! with remote history, the cart, assistant reply handling and checkout.

pub mod attribution;
pub mod cart;
pub mod checkout;
pub mod debounce;
pub mod error;
pub mod interpreter;
pub mod orders;
pub mod session;
pub mod settings;
pub mod telemetry;
pub mod threads;

pub use attribution::{Attribution, AttributionMap};
pub use cart::{CartAction, CartSnapshot, CartStore};
pub use debounce::{
    AbortSignal, Debouncer, PendingRequest, RequestOutcome, RequestScope, SuggestionFeed,
};
pub use error::{CheckoutError, EngineError, Result, SendError};
pub use interpreter::{build_request, interpret, Effect, Interpretation};
pub use orders::{OrderDesk, OrderDetails, OrderLedger, Receipt};
pub use session::{ChatSession, PendingSend, SendStep};
pub use settings::{LoggingSettings, Settings, StorageSettings};
pub use threads::{merge, ThreadStore, TombstoneSet};

// Re-export the crates the public API is built on
pub use resiply_client as client;
pub use resiply_persist as persist;
pub use resiply_types as types;
