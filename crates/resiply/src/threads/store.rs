use std::sync::Arc;

use resiply_persist::{JsonSlot, LocalStore, StorageKey};
use resiply_types::{
    ChatConfig, Message, PlanKind, RecommendationRequest, RecommendationResponse, RemoteThread,
    Thread, ThreadId,
};
use serde_json::Value;

use super::reconcile::{merge, remote_to_thread};
use super::tombstones::TombstoneSet;

/// Owner of the thread list, the tombstone set and the active thread.
///
/// The only writer of the thread and tombstone storage keys. Every
/// mutation is persisted before the method returns.
pub struct ThreadStore {
    threads: Vec<Thread>,
    tombstones: TombstoneSet,
    active: Option<ThreadId>,
    config: ChatConfig,
    threads_slot: JsonSlot<Vec<Thread>>,
    tombstone_slot: JsonSlot<TombstoneSet>,
    last_id: i64,
}

impl ThreadStore {
    /// Load persisted threads and tombstones. Corrupt entries are dropped.
    ///
    /// An empty list gets a fresh greeting thread; otherwise the newest
    /// thread becomes active.
    pub fn load(store: Arc<dyn LocalStore>, config: ChatConfig) -> Self {
        let threads_slot: JsonSlot<Vec<Thread>> =
            JsonSlot::new(Arc::clone(&store), StorageKey::Threads);
        let tombstone_slot: JsonSlot<TombstoneSet> = JsonSlot::new(store, StorageKey::Tombstones);

        let tombstones = load_tombstones(&tombstone_slot);
        let threads: Vec<Thread> = load_threads(&threads_slot)
            .into_iter()
            .filter(|t| !tombstones.contains(&t.id))
            .map(|t| strip_legacy_title(t, &config.legacy_title_suffix))
            .collect();

        let mut this = Self {
            active: threads.first().map(|t| t.id.clone()),
            threads,
            tombstones,
            config,
            threads_slot,
            tombstone_slot,
            last_id: 0,
        };

        if this.threads.is_empty() {
            this.create_thread();
        }

        tracing::debug!(
            threads = this.threads.len(),
            tombstones = this.tombstones.len(),
            "Thread store loaded"
        );
        this
    }

    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn tombstones(&self) -> &TombstoneSet {
        &self.tombstones
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn get(&self, id: &str) -> Option<&Thread> {
        self.threads.iter().find(|t| t.id == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&Thread> {
        self.active.as_deref().and_then(|id| self.get(id))
    }

    /// Make an existing thread active.
    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.active = Some(id.to_string());
        true
    }

    /// New thread with the greeting message, prepended and made active.
    pub fn create_thread(&mut self) -> ThreadId {
        let id = self.next_id();
        let thread = Thread::new(id.clone(), self.config.default_title.clone())
            .with_messages(vec![Message::assistant(self.config.texts.greeting.clone())]);
        self.insert_front(thread);
        tracing::info!(thread_id = %id, "Created thread");
        id
    }

    /// Thread opened from a recommendation hand-off.
    pub fn start_recommendation_thread(
        &mut self,
        request: &RecommendationRequest,
        recommendation: Option<&RecommendationResponse>,
    ) -> ThreadId {
        let none = "없음";
        let join_or_none = |items: &[String]| {
            if items.is_empty() {
                none.to_string()
            } else {
                items.join(", ")
            }
        };
        let user_text = format!(
            "[요리 추천 요청]\n기간: {}\n끼니: {}\n재료: {}\n요청사항: {}",
            request.period,
            join_or_none(&request.meals),
            join_or_none(&request.ingredients),
            request.request.as_deref().filter(|r| !r.is_empty()).unwrap_or(none),
        );

        let best_match = recommendation.and_then(|r| r.best_match.as_ref());
        let reply = match recommendation {
            Some(rec) if !rec.meal_plan.is_empty() => Message::assistant(format!(
                "{} 동안의 맞춤형 식단표입니다. 식재료 구매를 도와드릴까요?",
                request.period
            ))
            .with_plan(rec.meal_plan.clone(), PlanKind::Current)
            .with_assistant_message_id(rec.assistant_message_id),
            _ => match best_match {
                Some(recipe) => Message::assistant(format!(
                    "\"{}\" 요리를 추천해 드립니다.",
                    recipe.name
                ))
                .with_recipe(recipe.clone()),
                None => Message::assistant(self.config.texts.no_recommendation.clone()),
            },
        };

        let title = best_match
            .map(|r| r.name.clone())
            .unwrap_or_else(|| format!("{} 식단 추천", request.period));

        let id = self.next_id();
        self.insert_front(
            Thread::new(id.clone(), title).with_messages(vec![Message::user(user_text), reply]),
        );
        id
    }

    /// Append a message, deriving the title from the first user message.
    pub fn append(&mut self, thread_id: &str, message: Message) -> bool {
        self.append_with_remote(thread_id, message, None)
    }

    /// Like [`append`](Self::append), also recording the server log id.
    pub fn append_with_remote(
        &mut self,
        thread_id: &str,
        message: Message,
        remote_id: Option<i64>,
    ) -> bool {
        let default_title = &self.config.default_title;
        let max_chars = self.config.title_max_chars;

        let Some(thread) = self.threads.iter_mut().find(|t| t.id == thread_id) else {
            tracing::debug!(thread_id, "Dropping message for unknown thread");
            return false;
        };

        if thread.title == *default_title && message.is_user() {
            let derived = title_from(message.text(), max_chars);
            if !derived.is_empty() {
                thread.title = derived;
            }
        }
        if let Some(remote_id) = remote_id {
            thread.remote_id = Some(remote_id);
        }
        thread.messages.push(message);

        self.persist_threads();
        true
    }

    /// Remove a thread and tombstone its id.
    ///
    /// If it was active, the first remaining thread becomes active, or a
    /// new thread is created when none remain.
    pub fn delete_thread(&mut self, id: &str) -> bool {
        let before = self.threads.len();
        self.threads.retain(|t| t.id != id);
        let removed = self.threads.len() != before;

        if removed {
            self.persist_threads();
        }
        if self.tombstones.insert(id) {
            self.tombstone_slot.persist(&self.tombstones);
        }

        if self.active.as_deref() == Some(id) {
            match self.threads.first() {
                Some(next) => self.active = Some(next.id.clone()),
                None => {
                    self.active = None;
                    self.create_thread();
                }
            }
        }

        tracing::info!(thread_id = id, removed, "Deleted thread");
        removed
    }

    /// Merge freshly fetched remote history into the current local list.
    ///
    /// Runs against whatever the list is now, so history that arrives after
    /// local creates/deletes still produces the correct union.
    pub fn apply_remote(&mut self, remote: &[RemoteThread]) -> usize {
        let remote: Vec<Thread> = remote
            .iter()
            .map(|r| remote_to_thread(r, &self.config))
            .collect();

        self.threads = merge(&self.threads, &remote, &self.tombstones);
        self.persist_threads();

        let active_missing = self
            .active
            .as_deref()
            .map_or(true, |id| self.get(id).is_none());
        if active_missing {
            self.active = self.threads.first().map(|t| t.id.clone());
        }
        if self.threads.is_empty() {
            self.create_thread();
        }

        tracing::info!(
            remote = remote.len(),
            merged = self.threads.len(),
            "Merged remote thread history"
        );
        self.threads.len()
    }

    fn insert_front(&mut self, thread: Thread) {
        self.active = Some(thread.id.clone());
        self.threads.insert(0, thread);
        self.persist_threads();
    }

    fn persist_threads(&self) {
        self.threads_slot.persist(&self.threads);
    }

    /// Millisecond timestamp id, bumped past existing and tombstoned ids.
    fn next_id(&mut self) -> ThreadId {
        let mut candidate = chrono::Utc::now().timestamp_millis().max(self.last_id + 1);
        loop {
            let id = candidate.to_string();
            if self.get(&id).is_none() && !self.tombstones.contains(&id) {
                self.last_id = candidate;
                return id;
            }
            candidate += 1;
        }
    }
}

/// First `max_chars` characters of a user message, used as a thread title.
pub fn title_from(text: &str, max_chars: usize) -> String {
    text.trim().chars().take(max_chars).collect()
}

/// Render-time truncation. Stored titles are never shortened.
pub fn display_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        return title.to_string();
    }
    let mut short: String = title.chars().take(max_chars).collect();
    short.push_str("...");
    short
}

fn strip_legacy_title(mut thread: Thread, suffix: &str) -> Thread {
    if !suffix.is_empty() {
        if let Some(stripped) = thread.title.strip_suffix(suffix) {
            thread.title = stripped.to_string();
        }
    }
    thread
}

fn load_threads(slot: &JsonSlot<Vec<Thread>>) -> Vec<Thread> {
    let Some(value) = slot.load_value() else {
        return Vec::new();
    };
    let Value::Array(items) = value else {
        tracing::warn!(key = %slot.key(), "Persisted thread list is not an array");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Thread>(item) {
            Ok(thread) => Some(thread),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed persisted thread");
                None
            }
        })
        .collect()
}

fn load_tombstones(slot: &JsonSlot<TombstoneSet>) -> TombstoneSet {
    match slot.load_value() {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(_) => {
            tracing::warn!(key = %slot.key(), "Persisted tombstones are not an array");
            TombstoneSet::new()
        }
        None => TombstoneSet::new(),
    }
}
