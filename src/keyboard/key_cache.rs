// Imports from the standard library
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A key on a layout, identified by what and where it is. Two keys on
/// different layouts that look and behave the same compare equal, which is
/// what the unique keys cache relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: i32,
    pub label: Option<String>,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Interns structurally equal keys so that layouts sharing rows (alphabet
/// and its shifted variants) also share key allocations. Disabled, it
/// passes every key through untouched. Layout builders clear it between
/// builds so stale keys never leak across unrelated layout sets.
#[derive(Debug, Default)]
pub struct UniqueKeysCache {
    enabled: AtomicBool,
    cache: Mutex<HashSet<Arc<Key>>>,
}

impl UniqueKeysCache {
    pub fn new() -> UniqueKeysCache {
        UniqueKeysCache::default()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.cache
            .lock()
            .expect("unique keys cache lock poisoned")
            .clear();
    }

    pub fn get_unique_key(&self, key: Key) -> Arc<Key> {
        if !self.enabled.load(Ordering::Relaxed) {
            return Arc::new(key);
        }
        let mut cache = self
            .cache
            .lock()
            .expect("unique keys cache lock poisoned");
        if let Some(existing) = cache.get(&key) {
            // Reuse the existing allocation that equals `key`.
            return Arc::clone(existing);
        }
        let key = Arc::new(key);
        cache.insert(Arc::clone(&key));
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter_key(code: i32) -> Key {
        Key {
            code,
            label: Some(char::from_u32(code as u32).into_iter().collect()),
            x: 0,
            y: 0,
            width: 60,
            height: 80,
        }
    }

    #[test]
    fn equal_keys_share_one_allocation() {
        let cache = UniqueKeysCache::new();
        cache.set_enabled(true);
        let first = cache.get_unique_key(letter_key('a' as i32));
        let second = cache.get_unique_key(letter_key('a' as i32));
        assert!(Arc::ptr_eq(&first, &second));
        let other = cache.get_unique_key(letter_key('b' as i32));
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[test]
    fn disabled_cache_passes_keys_through() {
        let cache = UniqueKeysCache::new();
        let first = cache.get_unique_key(letter_key('a' as i32));
        let second = cache.get_unique_key(letter_key('a' as i32));
        assert_eq!(first, second);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn clearing_forgets_interned_keys() {
        let cache = UniqueKeysCache::new();
        cache.set_enabled(true);
        let first = cache.get_unique_key(letter_key('a' as i32));
        cache.clear();
        let second = cache.get_unique_key(letter_key('a' as i32));
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
