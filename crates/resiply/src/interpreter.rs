//! Turns a structured assistant reply into a thread message plus side effects.
//!
//! [`interpret`] is pure; [`Interpretation::apply`] performs the effects
//! against the thread store, cart and attribution map exactly once.

use resiply_types::{
    CartItem, ChatConfig, ChatRequest, ChatResponse, Message, PlanKind, ResponseType, Thread,
};

use crate::attribution::AttributionMap;
use crate::cart::CartStore;
use crate::threads::ThreadStore;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Add-or-increment the item and mark it assistant-added for the thread.
    AddToCart(CartItem),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub message: Message,
    pub chat_log_id: Option<i64>,
    pub effects: Vec<Effect>,
}

pub fn interpret(response: ChatResponse, config: &ChatConfig) -> Interpretation {
    let ChatResponse {
        message: text,
        response_type,
        updated_plan,
        plan_kind,
        cart_items,
        chat_log_id,
        assistant_message_id,
    } = response;

    let payment_prompt =
        response_type == ResponseType::Checkout || config.is_payment_prompt(&text);
    let mut message = Message::assistant(text).with_assistant_message_id(assistant_message_id);
    if payment_prompt {
        message = message.as_payment_prompt();
    }
    let mut effects = Vec::new();

    match response_type {
        ResponseType::PlanUpdate => {
            if let Some(plan) = updated_plan {
                message = message.with_plan(plan, plan_kind.unwrap_or_default());
            }
        }
        ResponseType::CalendarConflict => {
            if let Some(plan) = updated_plan {
                message = message.with_plan(plan, PlanKind::Preview);
            }
        }
        ResponseType::CartAdd => {
            if let Some(items) = cart_items {
                let items: Vec<CartItem> = items
                    .into_iter()
                    .map(|mut item| {
                        item.quantity = Some(item.quantity_or_default());
                        item.image_url.get_or_insert_with(String::new);
                        item
                    })
                    .collect();
                effects.extend(items.iter().cloned().map(Effect::AddToCart));
                message = message.with_cart_items(items);
            }
        }
        ResponseType::Chat | ResponseType::Checkout => {}
        ResponseType::Unknown => {
            tracing::debug!("Unknown response type; treating as chat");
        }
    }

    Interpretation {
        message,
        chat_log_id,
        effects,
    }
}

impl Interpretation {
    /// Run the cart effects, then append the message (recording the chat
    /// log id). Nothing happens if the thread no longer exists.
    pub fn apply(
        self,
        thread_id: &str,
        threads: &mut ThreadStore,
        cart: &mut CartStore,
        attribution: &mut AttributionMap,
    ) -> bool {
        if threads.get(thread_id).is_none() {
            tracing::debug!(thread_id, "Reply arrived for a deleted thread; dropping");
            return false;
        }

        for effect in self.effects {
            match effect {
                Effect::AddToCart(item) => {
                    cart.add_or_increment(item.to_product(), item.quantity_or_default());
                    attribution.mark_active(thread_id, &item.id);
                }
            }
        }

        threads.append_with_remote(thread_id, self.message, self.chat_log_id)
    }
}

/// Request for the next turn of `thread`.
///
/// `thread` is expected to already hold the outgoing user message. The
/// current plan is the latest committed plan in the thread; previews are
/// never sent back.
pub fn build_request(thread: &Thread, member_id: &str, text: &str) -> ChatRequest {
    let plan_message = thread.current_plan_message();
    ChatRequest {
        member_id: member_id.to_string(),
        user_message: text.to_string(),
        current_plan: plan_message
            .and_then(|m| m.plan.clone())
            .unwrap_or_default(),
        new_chat: thread.remote_id.is_none(),
        chat_log_id: thread.remote_id,
        plan_message_id: plan_message.and_then(|m| m.assistant_message_id),
    }
}
