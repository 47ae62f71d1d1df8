//! Process-wide device limits
//!
//! The engine owns these; the core only forwards get/set calls. One mutex
//! guards both limits for callers on multiple threads.

use std::sync::Mutex;

#[derive(Debug, Clone, Copy)]
struct Limits {
    memory: usize,
    cache: usize,
}

static LIMITS: Mutex<Limits> = Mutex::new(Limits {
    memory: usize::MAX,
    cache: usize::MAX,
});

pub fn memory_limit() -> usize {
    LIMITS.lock().unwrap().memory
}

/// Set the memory limit, returning the previous value.
pub fn set_memory_limit(limit: usize) -> usize {
    let mut limits = LIMITS.lock().unwrap();
    std::mem::replace(&mut limits.memory, limit)
}

pub fn cache_limit() -> usize {
    LIMITS.lock().unwrap().cache
}

/// Set the cache limit, returning the previous value.
pub fn set_cache_limit(limit: usize) -> usize {
    let mut limits = LIMITS.lock().unwrap();
    std::mem::replace(&mut limits.cache, limit)
}
