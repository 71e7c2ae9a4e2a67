use chrono_tz::Tz;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;

/// Outcome of every zone name resolved so far. Unknown names are kept as
/// `None` so a bad name repeated on every row is only parsed once.
static ZONES: Lazy<Mutex<HashMap<String, Option<Tz>>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// IANA zone for `name`, surrounding whitespace ignored
pub fn resolve_zone(name: &str) -> Option<Tz> {
    let key = name.trim();
    if let Some(known) = cached_outcome(key) {
        return known;
    }

    let tz = key.parse::<Tz>().ok();
    if tz.is_none() {
        log::debug!("Unknown time zone {:?}", key);
    }
    if let Ok(mut zones) = ZONES.lock() {
        zones.insert(key.to_string(), tz);
    }
    tz
}

/// `None` when `key` was never resolved, `Some(None)` when it was and is unknown
fn cached_outcome(key: &str) -> Option<Option<Tz>> {
    ZONES.lock().ok().and_then(|zones| zones.get(key).copied())
}
