mod reconcile;
mod store;
mod tombstones;

pub use reconcile::{compare_ids, merge, remote_to_thread};
pub use store::{display_title, title_from, ThreadStore};
pub use tombstones::TombstoneSet;
