use moka::future::Cache;
use once_cell::sync::OnceCell;
use std::time::Duration;

use crate::model::attendance::UserShiftFlags;

/// user id => shift flags, filled on first attendance mark of the user
static SHIFT_CACHE: OnceCell<Cache<u64, UserShiftFlags>> = OnceCell::new();

const DEFAULT_TTL_SECS: u64 = 600;

fn build(ttl: Duration) -> Cache<u64, UserShiftFlags> {
    Cache::builder()
        .max_capacity(50_000)
        .time_to_live(ttl)
        .build()
}

/// Sets the entry lifetime. Only the first call has an effect.
pub fn init(ttl_secs: u64) {
    let _ = SHIFT_CACHE.set(build(Duration::from_secs(ttl_secs)));
}

fn cache() -> &'static Cache<u64, UserShiftFlags> {
    SHIFT_CACHE.get_or_init(|| build(Duration::from_secs(DEFAULT_TTL_SECS)))
}

pub async fn get(user_id: u64) -> Option<UserShiftFlags> {
    cache().get(&user_id).await
}

pub async fn put(user_id: u64, flags: UserShiftFlags) {
    cache().insert(user_id, flags).await;
}

/// Drop a user's flags, e.g. after the account was deleted.
pub async fn invalidate(user_id: u64) {
    cache().invalidate(&user_id).await;
}
