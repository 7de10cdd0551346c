use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use resiply::client::{ChatBackend, ClientError, Result as ClientResult};
use resiply::persist::{LocalStore, MemoryStore};
use resiply::types::{
    CartItem, ChatConfig, ChatRequest, ChatResponse, CheckoutConfig, DailyPlan, Message,
    MessageRole, PlanKind, Product, RecipeInfo, RemoteMessage, RemoteThread, ResponseType,
};
use resiply::{Attribution, ChatSession, CheckoutError, RequestScope, SendError, SendStep};

#[derive(Default)]
struct ScriptedBackend {
    replies: Mutex<VecDeque<ClientResult<ChatResponse>>>,
    requests: Mutex<Vec<ChatRequest>>,
    logs: Vec<RemoteThread>,
}

impl ScriptedBackend {
    fn with_replies(replies: Vec<ClientResult<ChatResponse>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    fn with_logs(logs: Vec<RemoteThread>) -> Self {
        Self {
            logs,
            ..Default::default()
        }
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn chat_logs(&self, _member_id: &str) -> ClientResult<Vec<RemoteThread>> {
        Ok(self.logs.clone())
    }

    async fn send_chat(&self, request: &ChatRequest) -> ClientResult<ChatResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ChatResponse::chat("네")))
    }
}

fn session_with(backend: Arc<ScriptedBackend>) -> (ChatSession, String) {
    let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
    let mut session = ChatSession::new(
        store,
        backend,
        ChatConfig::default(),
        CheckoutConfig::default(),
    );
    session.sign_in("member-1");
    let thread_id = session.threads().active_id().unwrap().to_string();
    (session, thread_id)
}

fn last_text(session: &ChatSession, thread_id: &str) -> String {
    let thread = session.threads().get(thread_id).unwrap();
    thread.messages.last().unwrap().text().to_string()
}

fn cart_reply() -> ChatResponse {
    ChatResponse::chat("장바구니에 담았어요")
        .with_type(ResponseType::CartAdd)
        .with_cart_items(vec![
            CartItem::new("101", "두부", 1_500).with_quantity(2),
            CartItem::new("202", "대파", 2_000),
        ])
        .with_chat_log_id(55)
}

fn plan() -> Vec<DailyPlan> {
    vec![DailyPlan::new(1).with_meal("저녁", RecipeInfo::new("된장찌개"))]
}

#[tokio::test]
async fn test_cart_add_updates_cart_and_attribution() {
    let backend = Arc::new(ScriptedBackend::with_replies(vec![Ok(cart_reply())]));
    let (mut session, thread_id) = session_with(Arc::clone(&backend));

    session.send(&thread_id, "찌개 재료 담아줘").await.unwrap();

    assert_eq!(session.cart().line("101").map(|l| l.quantity), Some(2));
    assert_eq!(session.cart().line("202").map(|l| l.quantity), Some(1));
    assert_eq!(
        session.attribution().state(&thread_id, "101"),
        Some(Attribution::Active)
    );

    let thread = session.threads().get(&thread_id).unwrap();
    assert_eq!(thread.remote_id, Some(55));
    assert_eq!(thread.title, "찌개 재료 담아줘");
    let reply = thread.messages.last().unwrap();
    assert_eq!(reply.cart_items.as_ref().map(Vec::len), Some(2));

    let request = &backend.requests()[0];
    assert!(request.new_chat);
    assert_eq!(request.member_id, "member-1");
}

#[tokio::test]
async fn test_second_turn_reuses_chat_log_and_committed_plan() {
    let backend = Arc::new(ScriptedBackend::with_replies(vec![
        Ok(ChatResponse::chat("식단입니다")
            .with_type(ResponseType::PlanUpdate)
            .with_plan(plan())
            .with_chat_log_id(8)
            .with_assistant_message_id(81)),
        Ok(ChatResponse::chat("일정이 겹쳐요")
            .with_type(ResponseType::CalendarConflict)
            .with_plan(vec![DailyPlan::new(2)])),
        Ok(ChatResponse::chat("수정했어요")),
    ]));
    let (mut session, thread_id) = session_with(Arc::clone(&backend));

    session.send(&thread_id, "식단 짜줘").await.unwrap();
    session.send(&thread_id, "화요일로 옮겨줘").await.unwrap();
    session.send(&thread_id, "그냥 원래대로").await.unwrap();

    let requests = backend.requests();
    assert!(!requests[1].new_chat);
    assert_eq!(requests[1].chat_log_id, Some(8));
    assert_eq!(requests[2].current_plan, plan());
    assert_eq!(requests[2].plan_message_id, Some(81));

    let thread = session.threads().get(&thread_id).unwrap();
    let preview = &thread.messages[4];
    assert_eq!(preview.plan_kind, Some(PlanKind::Preview));
}

#[tokio::test]
async fn test_transport_failure_still_answers() {
    let backend = Arc::new(ScriptedBackend::with_replies(vec![Err(ClientError::Status {
        status: 502,
        body: "bad gateway".to_string(),
    })]));
    let (mut session, thread_id) = session_with(backend);

    session.send(&thread_id, "안녕").await.unwrap();

    let thread = session.threads().get(&thread_id).unwrap();
    let n = thread.messages.len();
    assert_eq!(thread.messages[n - 2].text(), "안녕");
    assert_eq!(
        thread.messages[n - 1].text(),
        ChatConfig::default().texts.transport_error
    );
    assert!(!session.is_pending(&thread_id));
}

#[tokio::test]
async fn test_sends_are_serialized_per_thread() {
    let backend = Arc::new(ScriptedBackend::default());
    let (mut session, thread_id) = session_with(backend);
    let other = session.create_thread();

    let first = match session.begin_send(&thread_id, "하나").unwrap() {
        SendStep::Request(pending) => pending,
        other => panic!("unexpected step {other:?}"),
    };
    assert_eq!(
        session.begin_send(&thread_id, "둘"),
        Err(SendError::Busy(thread_id.clone()))
    );
    assert!(matches!(
        session.begin_send(&other, "다른 스레드"),
        Ok(SendStep::Request(_))
    ));

    session.complete_send(first, Ok(ChatResponse::chat("응답")));
    assert!(!session.is_pending(&thread_id));
    assert!(session.begin_send(&thread_id, "셋").is_ok());
}

#[tokio::test]
async fn test_reply_for_deleted_thread_is_dropped() {
    let backend = Arc::new(ScriptedBackend::default());
    let (mut session, thread_id) = session_with(backend);
    let keep = session.create_thread();

    let pending = match session.begin_send(&thread_id, "담아줘").unwrap() {
        SendStep::Request(pending) => pending,
        other => panic!("unexpected step {other:?}"),
    };
    session.delete_thread(&thread_id);

    assert!(!session.complete_send(pending, Ok(cart_reply())));
    assert!(session.cart().lines().is_empty());
    assert!(session.threads().get(&thread_id).is_none());
    assert!(session.threads().get(&keep).is_some());
}

#[tokio::test]
async fn test_rejections_leave_thread_untouched() {
    let backend = Arc::new(ScriptedBackend::default());
    let (mut session, thread_id) = session_with(Arc::clone(&backend));

    assert_eq!(session.send(&thread_id, "   ").await, Err(SendError::EmptyMessage));
    assert_eq!(
        session.send("nope", "hi").await,
        Err(SendError::UnknownThread("nope".to_string()))
    );

    session.sign_out();
    assert_eq!(session.send(&thread_id, "hi").await, Err(SendError::AuthRequired));
    assert_eq!(
        last_text(&session, &thread_id),
        ChatConfig::default().texts.login_required_chat
    );
    let thread = session.threads().get(&thread_id).unwrap();
    assert!(thread.messages.iter().all(|m| !m.is_user()));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_declining_payment_demotes_assistant_items() {
    let backend = Arc::new(ScriptedBackend::with_replies(vec![
        Ok(cart_reply()),
        Ok(ChatResponse::chat("담은 상품으로 결제를 진행할까요?").with_type(ResponseType::Checkout)),
    ]));
    let (mut session, thread_id) = session_with(Arc::clone(&backend));
    session.cart_mut().add_or_increment(
        Product::new("900", "직접 담은 우유", 3_000),
        1,
    );

    session.send(&thread_id, "재료 담아줘").await.unwrap();
    session.send(&thread_id, "결제해줘").await.unwrap();
    session.send(&thread_id, "아니요 괜찮아요").await.unwrap();

    assert_eq!(backend.requests().len(), 2);
    assert_eq!(
        last_text(&session, &thread_id),
        ChatConfig::default().texts.payment_cancelled
    );
    assert_eq!(
        session.attribution().state(&thread_id, "101"),
        Some(Attribution::Dormant)
    );
    assert_eq!(session.cart().lines().len(), 3);

    // Dormant items are not auto-selected; the plain selection is used instead.
    session.cart_mut().clear_selection();
    session.cart_mut().toggle_select("900");
    let receipt = session.confirm_payment(&thread_id).unwrap();
    let bought: Vec<&str> = receipt.order.items.iter().map(|l| l.id()).collect();
    assert_eq!(bought, vec!["900"]);
}

#[tokio::test]
async fn test_decline_button_records_user_line_then_acknowledgement() {
    let backend = Arc::new(ScriptedBackend::with_replies(vec![Ok(cart_reply())]));
    let (mut session, thread_id) = session_with(Arc::clone(&backend));
    session.send(&thread_id, "재료 담아줘").await.unwrap();
    let before = session.threads().get(&thread_id).unwrap().messages.len();

    assert!(session.decline_payment(&thread_id));
    assert!(!session.decline_payment("no-such-thread"));

    let messages = &session.threads().get(&thread_id).unwrap().messages;
    assert_eq!(messages.len(), before + 2);
    let texts = &ChatConfig::default().texts;
    assert_eq!(messages[before].role, MessageRole::User);
    assert_eq!(messages[before].text(), texts.payment_decline);
    assert_eq!(messages[before + 1].role, MessageRole::Assistant);
    assert_eq!(messages[before + 1].text(), texts.payment_cancelled);
    assert_eq!(
        session.attribution().state(&thread_id, "101"),
        Some(Attribution::Dormant)
    );
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn test_checkout_prefers_active_assistant_items() {
    let backend = Arc::new(ScriptedBackend::with_replies(vec![Ok(cart_reply())]));
    let (mut session, thread_id) = session_with(backend);
    session.cart_mut().add_or_increment(
        Product::new("900", "직접 담은 우유", 3_000),
        1,
    );
    session.send(&thread_id, "재료 담아줘").await.unwrap();

    let receipt = session.checkout(&thread_id, None).unwrap();

    let mut bought: Vec<&str> = receipt.order.items.iter().map(|l| l.id()).collect();
    bought.sort();
    assert_eq!(bought, vec!["101", "202"]);
    assert_eq!(receipt.order.amounts.subtotal, 5_000);
    assert_eq!(receipt.order.amounts.shipping_fee, 3_000);
    assert_eq!(receipt.order.payment_method, "챗봇 자동결제");
    assert_eq!(receipt.order.address, "(간편결제)");

    assert_eq!(session.cart().lines().len(), 1);
    assert!(session.cart().line("900").is_some());
    assert_eq!(session.attribution().state(&thread_id, "101"), None);
    assert_eq!(last_text(&session, &thread_id), receipt.text);
    assert_eq!(session.orders().ledger().recent().len(), 1);
}

#[tokio::test]
async fn test_checkout_with_explicit_items() {
    let backend = Arc::new(ScriptedBackend::with_replies(vec![Ok(cart_reply())]));
    let (mut session, thread_id) = session_with(backend);
    session.send(&thread_id, "재료 담아줘").await.unwrap();

    let explicit = vec![CartItem::new("101", "두부", 1_500)];
    let receipt = session.checkout(&thread_id, Some(&explicit)).unwrap();

    assert_eq!(receipt.order.items[0].quantity, 1);
    assert_eq!(session.cart().line("101").map(|l| l.quantity), Some(1));
    assert_eq!(
        session.attribution().state(&thread_id, "101"),
        Some(Attribution::Active)
    );
}

#[tokio::test]
async fn test_checkout_refusals() {
    let backend = Arc::new(ScriptedBackend::default());
    let (mut session, thread_id) = session_with(backend);

    assert_eq!(session.checkout(&thread_id, None), Err(CheckoutError::EmptyOrder));
    assert_eq!(
        last_text(&session, &thread_id),
        ChatConfig::default().texts.empty_order
    );

    session
        .cart_mut()
        .add_or_increment(Product::new("1", "쌀", 30_000), 1);
    session.sign_out();
    assert_eq!(session.checkout(&thread_id, None), Err(CheckoutError::AuthRequired));
    assert_eq!(session.cart().cart_count(), 1);
    assert!(session.orders().ledger().recent().is_empty());
}

#[tokio::test]
async fn test_cart_preview_matches_chat_checkout() {
    let backend = Arc::new(ScriptedBackend::default());
    let (mut session, thread_id) = session_with(backend);
    session
        .cart_mut()
        .add_or_increment(Product::new("A", "A", 10_000), 2);
    session
        .cart_mut()
        .add_or_increment(Product::new("B", "B", 25_000), 1);

    let preview = session.cart_preview();
    let receipt = session.checkout(&thread_id, None).unwrap();
    assert_eq!(preview, receipt.order.amounts);
    assert_eq!(preview.payable, 45_000);
}

#[tokio::test]
async fn test_remote_history_merges_into_latest_list() {
    let logs = vec![RemoteThread {
        id: 12,
        title: Some("주간 식단".to_string()),
        messages: vec![
            RemoteMessage {
                id: Some(1),
                role: MessageRole::User,
                content: Some("식단".to_string()),
            },
            RemoteMessage {
                id: Some(2),
                role: MessageRole::Assistant,
                content: Some("여기요".to_string()),
            },
        ],
    }];
    let backend = Arc::new(ScriptedBackend::with_logs(logs));
    let (mut session, thread_id) = session_with(backend);

    let mut scope = RequestScope::new();
    let pending = session.spawn_history_fetch(&mut scope).unwrap();
    let created = session.create_thread();
    let remote = pending.outcome().await.completed().unwrap().unwrap();

    session.apply_remote_history(&remote);
    assert!(session.threads().get(&created).is_some());
    assert!(session.threads().get(&thread_id).is_some());
    let srv = session.threads().get("srv-12").unwrap();
    assert_eq!(srv.title, "주간 식단");
    assert_eq!(srv.messages[1].assistant_message_id, Some(2));

    assert_eq!(session.refresh_remote().await.unwrap(), 3);
}

#[tokio::test]
async fn test_signed_out_sessions_skip_history() {
    let backend = Arc::new(ScriptedBackend::with_logs(vec![RemoteThread {
        id: 1,
        title: None,
        messages: Vec::new(),
    }]));
    let (mut session, _) = session_with(backend);
    session.sign_out();

    assert_eq!(session.refresh_remote().await.unwrap(), 0);
    assert!(session.spawn_history_fetch(&mut RequestScope::new()).is_none());
    assert!(session.threads().get("srv-1").is_none());
}

#[tokio::test]
async fn test_abandoned_send_appends_nothing() {
    let backend = Arc::new(ScriptedBackend::default());
    let (mut session, thread_id) = session_with(backend);

    let pending = match session.begin_send(&thread_id, "취소될 요청").unwrap() {
        SendStep::Request(pending) => pending,
        other => panic!("unexpected step {other:?}"),
    };
    session.abandon_send(pending);

    assert!(!session.is_pending(&thread_id));
    let last = session.threads().get(&thread_id).unwrap().messages.last().cloned();
    assert_eq!(last, Some(Message::user("취소될 요청")));
}
