/// Keys of the persisted local state and their owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Thread list, owned by the thread store.
    Threads,
    /// Deleted thread ids, owned by the thread store.
    Tombstones,
    /// `{items, selectedIds}`, owned by the cart store.
    Cart,
    /// Recent receipts, owned by the order ledger.
    Orders,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Threads => "resiply_chat_threads",
            StorageKey::Tombstones => "resiply_deleted_ids",
            StorageKey::Cart => "resiply.cart.v1",
            StorageKey::Orders => "orders",
        }
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
