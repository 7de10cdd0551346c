//! Chat session orchestration: wires the thread store, cart, interpreter,
//! attribution map and order desk to the chat backend.

use std::collections::HashSet;
use std::sync::Arc;

use resiply_client::{ChatBackend, ClientError};
use resiply_persist::LocalStore;
use resiply_types::{
    Amounts, CartItem, CartLine, ChatConfig, ChatRequest, ChatResponse, CheckoutConfig, Message,
    RecommendationRequest, RecommendationResponse, RemoteThread, ThreadId,
};

use crate::attribution::AttributionMap;
use crate::cart::CartStore;
use crate::checkout::compute;
use crate::debounce::{PendingRequest, RequestScope};
use crate::error::{CheckoutError, SendError};
use crate::interpreter::{build_request, interpret};
use crate::orders::{OrderDesk, OrderDetails, Receipt};
use crate::threads::ThreadStore;

/// An accepted send waiting for the backend reply.
///
/// The thread stays busy until the request is handed back through
/// [`ChatSession::complete_send`] or [`ChatSession::abandon_send`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSend {
    pub thread_id: ThreadId,
    pub request: ChatRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendStep {
    /// The user declined a payment prompt; answered locally, no request.
    PaymentDeclined,
    Request(PendingSend),
}

pub struct ChatSession {
    threads: ThreadStore,
    cart: CartStore,
    orders: OrderDesk,
    attribution: AttributionMap,
    backend: Arc<dyn ChatBackend>,
    config: ChatConfig,
    member_id: Option<String>,
    pending: HashSet<ThreadId>,
}

impl ChatSession {
    pub fn new(
        store: Arc<dyn LocalStore>,
        backend: Arc<dyn ChatBackend>,
        chat: ChatConfig,
        checkout: CheckoutConfig,
    ) -> Self {
        let orders = OrderDesk::new(Arc::clone(&store), checkout)
            .with_receipt_header(chat.texts.checkout_done.clone());
        Self {
            threads: ThreadStore::load(Arc::clone(&store), chat.clone()),
            cart: CartStore::load(store),
            orders,
            attribution: AttributionMap::new(),
            backend,
            config: chat,
            member_id: None,
            pending: HashSet::new(),
        }
    }

    pub fn sign_in(&mut self, member_id: impl Into<String>) {
        let member_id = member_id.into();
        tracing::info!(member_id = %member_id, "Signed in");
        self.member_id = Some(member_id);
    }

    pub fn sign_out(&mut self) {
        self.member_id = None;
    }

    pub fn member_id(&self) -> Option<&str> {
        self.member_id.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.member_id.is_some()
    }

    pub fn threads(&self) -> &ThreadStore {
        &self.threads
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    pub fn attribution(&self) -> &AttributionMap {
        &self.attribution
    }

    pub fn orders(&self) -> &OrderDesk {
        &self.orders
    }

    pub fn is_pending(&self, thread_id: &str) -> bool {
        self.pending.contains(thread_id)
    }

    /// Amounts for the current selection, as shown on the cart page.
    pub fn cart_preview(&self) -> Amounts {
        compute(&self.cart.selected_lines(), self.orders.config())
    }

    pub fn create_thread(&mut self) -> ThreadId {
        self.threads.create_thread()
    }

    pub fn select_thread(&mut self, id: &str) -> bool {
        self.threads.select(id)
    }

    pub fn start_recommendation_thread(
        &mut self,
        request: &RecommendationRequest,
        recommendation: Option<&RecommendationResponse>,
    ) -> ThreadId {
        self.threads.start_recommendation_thread(request, recommendation)
    }

    pub fn delete_thread(&mut self, id: &str) -> bool {
        self.attribution.forget_thread(id);
        self.pending.remove(id);
        self.threads.delete_thread(id)
    }

    /// Validate and record the user's message.
    ///
    /// Returns the request to send unless the message declined a pending
    /// payment prompt. A signed-out user gets an explanatory assistant
    /// message and [`SendError::AuthRequired`]; the user text is not kept.
    pub fn begin_send(&mut self, thread_id: &str, text: &str) -> Result<SendStep, SendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SendError::EmptyMessage);
        }
        let answers_prompt = match self.threads.get(thread_id) {
            Some(thread) => thread
                .last_assistant()
                .is_some_and(|m| m.payment_prompt || self.config.is_payment_prompt(m.text())),
            None => return Err(SendError::UnknownThread(thread_id.to_string())),
        };
        if self.pending.contains(thread_id) {
            return Err(SendError::Busy(thread_id.to_string()));
        }
        let Some(member_id) = self.member_id.clone() else {
            let notice = self.config.texts.login_required_chat.clone();
            self.threads.append(thread_id, Message::assistant(notice));
            return Err(SendError::AuthRequired);
        };

        let declines_payment = answers_prompt && self.config.is_cancellation(text);

        self.threads.append(thread_id, Message::user(text));

        if declines_payment {
            self.decline(thread_id);
            return Ok(SendStep::PaymentDeclined);
        }

        let Some(thread) = self.threads.get(thread_id) else {
            return Err(SendError::UnknownThread(thread_id.to_string()));
        };
        let request = build_request(thread, &member_id, text);
        self.pending.insert(thread_id.to_string());
        Ok(SendStep::Request(PendingSend {
            thread_id: thread_id.to_string(),
            request,
        }))
    }

    /// Hand back the backend result. Every accepted send ends with exactly
    /// one assistant message, unless the thread was deleted meanwhile.
    pub fn complete_send(
        &mut self,
        pending: PendingSend,
        result: resiply_client::Result<ChatResponse>,
    ) -> bool {
        self.pending.remove(&pending.thread_id);
        let thread_id = pending.thread_id.as_str();

        match result {
            Ok(response) => interpret(response, &self.config).apply(
                thread_id,
                &mut self.threads,
                &mut self.cart,
                &mut self.attribution,
            ),
            Err(e) => {
                tracing::error!(thread_id, error = %e, "Chat request failed");
                self.threads.append(
                    thread_id,
                    Message::assistant(self.config.texts.transport_error.clone()),
                )
            }
        }
    }

    /// Release a send whose request was cancelled. Nothing is appended.
    pub fn abandon_send(&mut self, pending: PendingSend) {
        tracing::debug!(thread_id = %pending.thread_id, "Chat request abandoned");
        self.pending.remove(&pending.thread_id);
    }

    /// Full round-trip on the current task.
    pub async fn send(&mut self, thread_id: &str, text: &str) -> Result<(), SendError> {
        let pending = match self.begin_send(thread_id, text)? {
            SendStep::PaymentDeclined => return Ok(()),
            SendStep::Request(pending) => pending,
        };
        let backend = Arc::clone(&self.backend);
        let result = backend.send_chat(&pending.request).await;
        self.complete_send(pending, result);
        Ok(())
    }

    /// Fetch remote history and merge it into the current list.
    /// Signed-out sessions have no history and return 0.
    pub async fn refresh_remote(&mut self) -> Result<usize, ClientError> {
        let Some(member_id) = self.member_id.clone() else {
            return Ok(0);
        };
        let backend = Arc::clone(&self.backend);
        let remote = backend.chat_logs(&member_id).await?;
        Ok(self.apply_remote_history(&remote))
    }

    /// History fetch owned by `scope`, for callers that merge later through
    /// [`apply_remote_history`](Self::apply_remote_history).
    pub fn spawn_history_fetch(
        &self,
        scope: &mut RequestScope,
    ) -> Option<PendingRequest<resiply_client::Result<Vec<RemoteThread>>>> {
        let member_id = self.member_id.clone()?;
        let backend = Arc::clone(&self.backend);
        Some(scope.spawn(move |_| async move { backend.chat_logs(&member_id).await }))
    }

    /// Merge against the latest local list, whenever the history arrives.
    pub fn apply_remote_history(&mut self, remote: &[RemoteThread]) -> usize {
        self.threads.apply_remote(remote)
    }

    /// Chat-driven checkout.
    ///
    /// Items resolve to `explicit` when non-empty, else the thread's active
    /// assistant-added lines still in the cart, else the cart selection.
    /// Refusals append an explanatory message and mutate nothing else.
    pub fn checkout(
        &mut self,
        thread_id: &str,
        explicit: Option<&[CartItem]>,
    ) -> Result<Receipt, CheckoutError> {
        if self.threads.get(thread_id).is_none() {
            return Err(CheckoutError::UnknownThread(thread_id.to_string()));
        }
        if !self.is_signed_in() {
            let text = self.config.texts.login_required_checkout.clone();
            self.threads.append(thread_id, Message::assistant(text));
            return Err(CheckoutError::AuthRequired);
        }

        let items = self.resolve_items(thread_id, explicit);
        if items.is_empty() {
            let text = self.config.texts.empty_order.clone();
            self.threads.append(thread_id, Message::assistant(text));
            return Err(CheckoutError::EmptyOrder);
        }

        let details = OrderDetails::new(self.config.payment_method.clone())
            .with_address(self.config.checkout_address.clone());
        let receipt = self.orders.place_order(
            true,
            items,
            details,
            &mut self.cart,
            &mut self.attribution,
        )?;
        self.threads
            .append(thread_id, Message::assistant(receipt.text.clone()));
        Ok(receipt)
    }

    /// Checkout of the cart selection from the cart page.
    pub fn checkout_selection(&mut self, details: OrderDetails) -> Result<Receipt, CheckoutError> {
        let items = self.cart.selected_lines();
        self.orders.place_order(
            self.is_signed_in(),
            items,
            details,
            &mut self.cart,
            &mut self.attribution,
        )
    }

    /// Payment button: record the confirmation and check out.
    pub fn confirm_payment(&mut self, thread_id: &str) -> Result<Receipt, CheckoutError> {
        if self.threads.get(thread_id).is_none() {
            return Err(CheckoutError::UnknownThread(thread_id.to_string()));
        }
        let text = self.config.texts.payment_confirm.clone();
        self.threads.append(thread_id, Message::user(text));
        self.checkout(thread_id, None)
    }

    /// Cancel button on a payment prompt.
    pub fn decline_payment(&mut self, thread_id: &str) -> bool {
        if self.threads.get(thread_id).is_none() {
            return false;
        }
        let text = self.config.texts.payment_decline.clone();
        self.threads.append(thread_id, Message::user(text));
        self.decline(thread_id);
        true
    }

    fn decline(&mut self, thread_id: &str) {
        let demoted = self.attribution.demote_all(thread_id);
        tracing::info!(thread_id, demoted, "Payment declined");
        let text = self.config.texts.payment_cancelled.clone();
        self.threads.append(thread_id, Message::assistant(text));
    }

    fn resolve_items(&self, thread_id: &str, explicit: Option<&[CartItem]>) -> Vec<CartLine> {
        if let Some(items) = explicit.filter(|items| !items.is_empty()) {
            return items.iter().map(CartItem::to_line).collect();
        }

        let attributed: Vec<CartLine> = self
            .attribution
            .active_ids(thread_id)
            .iter()
            .filter_map(|id| self.cart.line(id).cloned())
            .collect();
        if !attributed.is_empty() {
            return attributed;
        }

        self.cart.selected_lines()
    }
}
