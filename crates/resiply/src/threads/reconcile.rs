//! Merging remote thread history into the local thread list.

use std::cmp::Ordering;
use std::collections::HashSet;

use resiply_types::{ChatConfig, Message, MessageRole, RemoteThread, Thread};

use super::tombstones::TombstoneSet;

/// Union of `remote` and `local`, minus tombstoned ids, newest first.
///
/// Remote entries win over local entries with the same id. The result is
/// ordered by the numeric portion of each id, descending, so local
/// timestamp ids and remote `srv-{n}` ids share one ordering. Applying the
/// merge again with the same remote list and tombstones is a no-op.
pub fn merge(local: &[Thread], remote: &[Thread], tombstones: &TombstoneSet) -> Vec<Thread> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged: Vec<Thread> = Vec::with_capacity(local.len() + remote.len());

    for thread in remote.iter().chain(local.iter()) {
        if tombstones.contains(&thread.id) || !seen.insert(thread.id.as_str()) {
            continue;
        }
        merged.push(thread.clone());
    }

    merged.sort_by(|a, b| compare_ids(&b.id, &a.id).then_with(|| a.id.cmp(&b.id)));
    merged
}

/// Digits of an id with leading zeros removed; `""` reads as zero.
fn numeric_part(id: &str) -> String {
    let digits: String = id.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.trim_start_matches('0').to_string()
}

/// Compares ids by their numeric portion without overflowing on long ids.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    let (a, b) = (numeric_part(a), numeric_part(b));
    a.len().cmp(&b.len()).then_with(|| a.cmp(&b))
}

/// Local representation of a server-side conversation log.
pub fn remote_to_thread(remote: &RemoteThread, config: &ChatConfig) -> Thread {
    let title = remote
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} {}", config.remote_title_prefix, remote.id));

    let messages = remote
        .messages
        .iter()
        .map(|m| {
            let text = m.content.clone().unwrap_or_default();
            match m.role {
                MessageRole::User => Message::user(text),
                MessageRole::Assistant => {
                    Message::assistant(text).with_assistant_message_id(m.id)
                }
            }
        })
        .collect();

    Thread::new(format!("{}{}", config.remote_id_prefix, remote.id), title)
        .with_remote_id(remote.id)
        .with_messages(messages)
}
