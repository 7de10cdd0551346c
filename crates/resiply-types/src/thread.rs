use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::plan::{DailyPlan, PlanKind, RecipeInfo};

/// Local threads use a millisecond timestamp; remote threads use `srv-{log id}`.
pub type ThreadId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single chat message with an optional structured payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: MessageRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<RecipeInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Vec<DailyPlan>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_kind: Option<PlanKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_items: Option<Vec<CartItem>>,
    #[serde(
        default,
        alias = "assistant_message_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub assistant_message_id: Option<i64>,
    /// Set when the assistant asked whether to proceed to payment.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub payment_prompt: bool,
}

impl Message {
    fn with_role(role: MessageRole, text: Option<String>) -> Self {
        Self {
            role,
            text,
            recipe: None,
            plan: None,
            plan_kind: None,
            cart_items: None,
            assistant_message_id: None,
            payment_prompt: false,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, Some(text.into()))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, Some(text.into()))
    }

    pub fn with_plan(mut self, plan: Vec<DailyPlan>, kind: PlanKind) -> Self {
        self.plan = Some(plan);
        self.plan_kind = Some(kind);
        self
    }

    pub fn with_recipe(mut self, recipe: RecipeInfo) -> Self {
        self.recipe = Some(recipe);
        self
    }

    pub fn with_cart_items(mut self, items: Vec<CartItem>) -> Self {
        self.cart_items = Some(items);
        self
    }

    pub fn with_assistant_message_id(mut self, id: Option<i64>) -> Self {
        self.assistant_message_id = id;
        self
    }

    pub fn as_payment_prompt(mut self) -> Self {
        self.payment_prompt = true;
        self
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// A non-empty plan that is not a preview.
    pub fn has_committed_plan(&self) -> bool {
        let non_empty = self.plan.as_ref().is_some_and(|p| !p.is_empty());
        non_empty && self.plan_kind != Some(PlanKind::Preview)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: ThreadId,
    /// Server-side conversation log id, set after the first round-trip.
    #[serde(default, alias = "chatLogId", skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Thread {
    pub fn new(id: impl Into<ThreadId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            remote_id: None,
            title: title.into(),
            messages: Vec::new(),
        }
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_remote_id(mut self, remote_id: i64) -> Self {
        self.remote_id = Some(remote_id);
        self
    }

    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_assistant())
    }

    /// Most recent message carrying a committed (non-preview) plan.
    pub fn current_plan_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.has_committed_plan())
    }
}
