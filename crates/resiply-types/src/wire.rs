//! Request and response payloads exchanged with the backend.

use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::plan::{DailyPlan, PlanKind, RecipeInfo};
use crate::thread::MessageRole;

/// `GET /recommendations/chat/logs` response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatLogsResponse {
    #[serde(default)]
    pub threads: Vec<RemoteThread>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteThread {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub messages: Vec<RemoteMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteMessage {
    #[serde(default)]
    pub id: Option<i64>,
    pub role: MessageRole,
    #[serde(default)]
    pub content: Option<String>,
}

/// `POST /recommendations/chat` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub member_id: String,
    pub user_message: String,
    pub current_plan: Vec<DailyPlan>,
    pub new_chat: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_log_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_message_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    #[default]
    Chat,
    PlanUpdate,
    CartAdd,
    Checkout,
    CalendarConflict,
    /// Any tag this client does not know; handled like plain chat.
    #[serde(other)]
    Unknown,
}

/// `POST /recommendations/chat` response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub response_type: ResponseType,
    #[serde(default)]
    pub updated_plan: Option<Vec<DailyPlan>>,
    #[serde(default)]
    pub plan_kind: Option<PlanKind>,
    #[serde(default)]
    pub cart_items: Option<Vec<CartItem>>,
    #[serde(default)]
    pub chat_log_id: Option<i64>,
    #[serde(default)]
    pub assistant_message_id: Option<i64>,
}

impl ChatResponse {
    pub fn chat(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn with_plan(mut self, plan: Vec<DailyPlan>) -> Self {
        self.updated_plan = Some(plan);
        self
    }

    pub fn with_cart_items(mut self, items: Vec<CartItem>) -> Self {
        self.cart_items = Some(items);
        self
    }

    pub fn with_chat_log_id(mut self, id: i64) -> Self {
        self.chat_log_id = Some(id);
        self
    }

    pub fn with_assistant_message_id(mut self, id: i64) -> Self {
        self.assistant_message_id = Some(id);
        self
    }
}

/// Recommendation hand-off used to open a pre-filled thread.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub period: String,
    #[serde(default)]
    pub meals: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub request: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub best_match: Option<RecipeInfo>,
    #[serde(default)]
    pub meal_plan: Vec<DailyPlan>,
    #[serde(default)]
    pub candidates: Vec<RecipeInfo>,
    #[serde(default)]
    pub assistant_message_id: Option<i64>,
}
