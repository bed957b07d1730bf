use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Expected capacity and false-positive rate.
/// Tune these based on real user counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static NAME_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// Set once every registered name has been loaded.
static WARMED_UP: AtomicBool = AtomicBool::new(false);

#[inline]
fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Check if a user name might be registered (false positives possible).
///
/// Answers `true` for everything until the warm-up has completed.
pub fn might_exist(name: &str) -> bool {
    if !WARMED_UP.load(Ordering::Acquire) {
        return true;
    }
    let name = normalize(name);
    match NAME_FILTER.read() {
        Ok(filter) => filter.contains(&name),
        Err(_) => true,
    }
}

/// Insert a single name into the filter
pub fn insert(name: &str) {
    let name = normalize(name);
    if let Ok(mut filter) = NAME_FILTER.write() {
        filter.add(&name);
    }
}

/// Warm up the name filter using streaming + batching
pub async fn warmup_name_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>("SELECT name FROM users").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (name,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(normalize(&name));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch)?;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch)?;
    }

    WARMED_UP.store(true, Ordering::Release);
    log::info!("Name filter warmup complete: {} users", total);
    Ok(())
}

/// Insert a batch of normalized names
fn insert_batch(names: &[String]) -> Result<()> {
    let mut filter = NAME_FILTER
        .write()
        .map_err(|_| anyhow!("name filter poisoned"))?;

    for name in names {
        filter.add(name);
    }
    Ok(())
}
