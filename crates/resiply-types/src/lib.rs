pub mod cart;
pub mod config;
pub mod order;
pub mod plan;
pub mod thread;
pub mod wire;

pub use cart::{CartItem, CartLine, Product};
pub use config::{ChatConfig, ChatTexts, CheckoutConfig, SuggestConfig};
pub use order::{Amounts, Order};
pub use plan::{DailyPlan, PlanKind, RecipeInfo};
pub use thread::{Message, MessageRole, Thread, ThreadId};
pub use wire::{
    ChatLogsResponse, ChatRequest, ChatResponse, RecommendationRequest, RecommendationResponse,
    RemoteMessage, RemoteThread, ResponseType,
};
