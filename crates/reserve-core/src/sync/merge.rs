//! Identifier-keyed merge of local and remote collections

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

use crate::models::{Record, User};

/// Merge records, keeping the copy with the strictly newer `updated_at`.
///
/// Local order is kept; remote-only records are appended in remote order.
/// On an exact timestamp tie the local copy stays.
pub fn merge_records(local: Vec<Record>, remote: Vec<Record>) -> Vec<Record> {
    merge_by_id(
        local,
        remote,
        |record| record.id.clone(),
        |existing, incoming| incoming.updated_at > existing.updated_at,
    )
}

/// Merge users; the remote copy always replaces the local one.
pub fn merge_users(local: Vec<User>, remote: Vec<User>) -> Vec<User> {
    merge_by_id(local, remote, |user| user.id.clone(), |_, _| true)
}

fn merge_by_id<T, K>(
    local: Vec<T>,
    remote: Vec<T>,
    key: impl Fn(&T) -> K,
    remote_wins: impl Fn(&T, &T) -> bool,
) -> Vec<T>
where
    K: Eq + Hash,
{
    let mut index: HashMap<K, usize> = HashMap::with_capacity(local.len() + remote.len());
    let mut merged: Vec<T> = Vec::with_capacity(local.len() + remote.len());

    for item in local {
        match index.entry(key(&item)) {
            Entry::Occupied(slot) => merged[*slot.get()] = item,
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(item);
            }
        }
    }

    for item in remote {
        match index.entry(key(&item)) {
            Entry::Occupied(slot) => {
                let existing = &mut merged[*slot.get()];
                if remote_wins(existing, &item) {
                    *existing = item;
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(item);
            }
        }
    }

    merged
}
