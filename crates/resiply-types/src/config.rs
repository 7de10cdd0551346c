use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shipping rules shared by the cart preview and the chat-driven checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    pub free_shipping_threshold: i64,
    pub base_shipping_fee: i64,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: 30_000,
            base_shipping_fee: 3_000,
        }
    }
}

impl CheckoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_free_shipping_threshold(mut self, threshold: i64) -> Self {
        self.free_shipping_threshold = threshold;
        self
    }

    pub fn with_base_shipping_fee(mut self, fee: i64) -> Self {
        self.base_shipping_fee = fee;
        self
    }
}

/// Fixed assistant texts emitted by the client itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatTexts {
    pub greeting: String,
    pub transport_error: String,
    pub login_required_chat: String,
    pub login_required_checkout: String,
    pub empty_order: String,
    pub payment_cancelled: String,
    /// User line recorded when the payment button is pressed.
    pub payment_confirm: String,
    /// User line recorded when the cancel button is pressed.
    pub payment_decline: String,
    pub checkout_done: String,
    pub no_recommendation: String,
}

impl Default for ChatTexts {
    fn default() -> Self {
        Self {
            greeting: "안녕하세요! 어떤 요리를 도와드릴까요?".to_string(),
            transport_error: "죄송합니다. 오류가 발생하여 답변을 드릴 수 없습니다.".to_string(),
            login_required_chat: "채팅을 이용하려면 로그인해 주세요.".to_string(),
            login_required_checkout: "결제를 진행하려면 로그인이 필요합니다.".to_string(),
            empty_order: "결제할 상품이 없습니다. 장바구니를 확인해주세요.".to_string(),
            payment_cancelled: "결제를 취소했습니다. 장바구니 내역은 유지됩니다.".to_string(),
            payment_confirm: "결제해줘".to_string(),
            payment_decline: "아니요".to_string(),
            checkout_done: "결제가 완료되었습니다.".to_string(),
            no_recommendation:
                "조건에 맞는 레시피를 찾지 못했습니다. 다른 재료로 다시 시도해 보시겠어요?"
                    .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub default_title: String,
    pub title_max_chars: usize,
    pub remote_id_prefix: String,
    pub remote_title_prefix: String,
    /// Suffix older builds persisted on truncated titles.
    pub legacy_title_suffix: String,
    pub payment_prompt_markers: Vec<String>,
    pub cancel_words: Vec<String>,
    pub payment_method: String,
    pub checkout_address: String,
    pub texts: ChatTexts,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_title: "새 채팅".to_string(),
            title_max_chars: 20,
            remote_id_prefix: "srv-".to_string(),
            remote_title_prefix: "채팅".to_string(),
            legacy_title_suffix: "...".to_string(),
            payment_prompt_markers: vec!["결제를 진행할까요".to_string(), "결제할까요".to_string()],
            cancel_words: ["아니요", "아니오", "취소", "취소할게", "괜찮아", "아니"]
                .into_iter()
                .map(String::from)
                .collect(),
            payment_method: "챗봇 자동결제".to_string(),
            checkout_address: "(간편결제)".to_string(),
            texts: ChatTexts::default(),
        }
    }
}

impl ChatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    pub fn with_title_max_chars(mut self, max: usize) -> Self {
        self.title_max_chars = max;
        self
    }

    pub fn with_remote_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.remote_id_prefix = prefix.into();
        self
    }

    pub fn with_texts(mut self, texts: ChatTexts) -> Self {
        self.texts = texts;
        self
    }

    pub fn is_payment_prompt(&self, text: &str) -> bool {
        self.payment_prompt_markers.iter().any(|m| text.contains(m.as_str()))
    }

    pub fn is_cancellation(&self, text: &str) -> bool {
        self.cancel_words.iter().any(|w| text.contains(w.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    pub debounce_ms: u64,
    pub limit: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 250,
            limit: 6,
        }
    }
}

impl SuggestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
