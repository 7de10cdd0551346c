//! Cart lines, checkout selection and their persistence.

mod sanitize;
mod state;
mod store;

pub use sanitize::sanitize;
pub use state::{CartAction, CartSnapshot};
pub use store::CartStore;
