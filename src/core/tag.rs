//! Tags: ordered key/value annotations attached to log calls
//!
//! This module provides:
//! - `Tag`: an ordered, lock-protected set of unique keys with values and an
//!   optional severity override
//! - `TagPair`: one key/value (or flag) to apply to a tag
//! - `TagRegistry`: the thread → tag binding with a pool of recycled tags

use super::pool::{Pool, Poolable};
use super::severity::Severity;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// Shared handle to a tag
pub type TagHandle = Arc<Tag>;

#[derive(Debug, Default)]
struct TagInner {
    keys: Vec<String>,
    values: Vec<String>,
    severity: Severity,
    owner: Option<ThreadId>,
    text: Option<Arc<str>>,
    map: Option<Arc<HashMap<String, String>>>,
}

impl TagInner {
    fn invalidate(&mut self) {
        self.text = None;
        self.map = None;
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    fn render(&self) -> String {
        if self.keys.is_empty() {
            return String::new();
        }
        let mut out = String::with_capacity(2 + self.keys.len() * 8);
        out.push('[');
        for (i, (k, v)) in self.keys.iter().zip(&self.values).enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(k);
            if !v.is_empty() {
                out.push('=');
                out.push_str(v);
            }
        }
        out.push(']');
        out
    }
}

/// Ordered key/value annotations for log calls
///
/// Keys are unique and keep their insertion order. The rendered text
/// (`[k=v, k2=v2]`) and the map view are cached and rebuilt lazily after
/// a mutation.
///
/// # Example
///
/// ```
/// use rust_log_engine::core::Tag;
///
/// let tag = Tag::new();
/// tag.set("user", "42");
/// tag.set("region", "eu");
/// assert_eq!(&*tag.text(), "[user=42, region=eu]");
/// ```
#[derive(Debug, Default)]
pub struct Tag {
    inner: Mutex<TagInner>,
}

impl Tag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a shared tag from pairs
    pub fn from_pairs<I, P>(pairs: I) -> TagHandle
    where
        I: IntoIterator<Item = P>,
        P: Into<TagPair>,
    {
        let tag = Tag::new();
        tag.apply(pairs);
        Arc::new(tag)
    }

    /// Set `key` to `value`, replacing an existing value in place.
    /// Empty keys are ignored.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key.is_empty() {
            return;
        }
        let value = value.into();
        let mut inner = self.inner.lock();
        match inner.position(&key) {
            Some(i) => {
                if inner.values[i] == value {
                    return;
                }
                inner.values[i] = value;
            }
            None => {
                inner.keys.push(key);
                inner.values.push(value);
            }
        }
        inner.invalidate();
    }

    /// Set a key with an empty value
    pub fn set_flag(&self, key: impl Into<String>) {
        self.set(key, String::new());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let inner = self.inner.lock();
        inner.position(key).map(|i| inner.values[i].clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().position(key).is_some()
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        let mut inner = self.inner.lock();
        let i = inner.position(key)?;
        inner.keys.remove(i);
        let value = inner.values.remove(i);
        inner.invalidate();
        Some(value)
    }

    /// Apply a batch of pairs
    pub fn apply<I, P>(&self, pairs: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<TagPair>,
    {
        for pair in pairs {
            let pair = pair.into();
            self.set(pair.key, pair.value);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().keys.is_empty()
    }

    /// Keys and values in insertion order
    pub fn pairs(&self) -> Vec<(String, String)> {
        let inner = self.inner.lock();
        inner
            .keys
            .iter()
            .cloned()
            .zip(inner.values.iter().cloned())
            .collect()
    }

    /// Severity override, `Undefined` when none is set
    pub fn severity(&self) -> Severity {
        self.inner.lock().severity
    }

    /// Demand output at `severity` or more severe for calls carrying this tag,
    /// regardless of the engine's ceiling
    pub fn set_severity(&self, severity: Severity) {
        self.inner.lock().severity = severity;
    }

    pub fn clear_severity(&self) {
        self.set_severity(Severity::Undefined);
    }

    /// Rendered `[k=v, k2=v2]` text, empty for an empty tag
    pub fn text(&self) -> Arc<str> {
        let mut inner = self.inner.lock();
        if let Some(text) = &inner.text {
            return Arc::clone(text);
        }
        let text: Arc<str> = Arc::from(inner.render());
        inner.text = Some(Arc::clone(&text));
        text
    }

    /// Map view of the pairs
    pub fn to_map(&self) -> Arc<HashMap<String, String>> {
        let mut inner = self.inner.lock();
        if let Some(map) = &inner.map {
            return Arc::clone(map);
        }
        let map: HashMap<String, String> = inner
            .keys
            .iter()
            .cloned()
            .zip(inner.values.iter().cloned())
            .collect();
        let map = Arc::new(map);
        inner.map = Some(Arc::clone(&map));
        map
    }

    /// Thread this tag is bound to, if any
    pub fn owner(&self) -> Option<ThreadId> {
        self.inner.lock().owner
    }

    fn attach(&self, thread: ThreadId) -> Option<ThreadId> {
        self.inner.lock().owner.replace(thread)
    }

    fn detach(&self) {
        self.inner.lock().owner = None;
    }

    /// Clear everything: pairs, override, owner and caches
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.keys.clear();
        inner.values.clear();
        inner.severity = Severity::Undefined;
        inner.owner = None;
        inner.invalidate();
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl Poolable for TagHandle {
    fn reset(&mut self) {
        // Shared handles are never recycled, see TagRegistry::recycle
        if let Some(tag) = Arc::get_mut(self) {
            tag.clear();
        }
    }
}

/// One key/value to apply to a tag; a bare key is a flag with an empty value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPair {
    pub key: String,
    pub value: String,
}

impl TagPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn flag(key: impl Into<String>) -> Self {
        Self::new(key, String::new())
    }

    /// Build from a slice: one element is a flag, two are key and value.
    /// Anything past the second element is ignored.
    pub fn from_slice(parts: &[&str]) -> Option<Self> {
        match parts {
            [] => None,
            [key] => Some(Self::flag(*key)),
            [key, value, ..] => Some(Self::new(*key, *value)),
        }
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for TagPair {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

impl From<&str> for TagPair {
    fn from(key: &str) -> Self {
        Self::flag(key)
    }
}

/// Thread → tag bindings plus the pool tags are recycled through
///
/// Thread-safe: lookups go through a concurrent map keyed by `ThreadId`,
/// and each tag guards its own fields.
pub struct TagRegistry {
    bindings: DashMap<ThreadId, TagHandle>,
    pool: Pool<TagHandle>,
}

impl TagRegistry {
    pub fn new(pool_capacity: usize) -> Self {
        Self {
            bindings: DashMap::new(),
            pool: Pool::new(pool_capacity),
        }
    }

    /// Take a fresh, unbound tag from the pool
    pub fn create(&self) -> TagHandle {
        self.pool.checkout()
    }

    /// Bind `tag` (or a new tag when `None` and nothing is bound yet) to the
    /// calling thread and return it
    pub fn associate(&self, tag: Option<TagHandle>) -> TagHandle {
        let me = thread::current().id();
        let tag = match tag {
            Some(tag) => tag,
            None => {
                if let Some(existing) = self.bindings.get(&me) {
                    return Arc::clone(existing.value());
                }
                self.create()
            }
        };

        if let Some(previous_owner) = tag.attach(me) {
            if previous_owner != me {
                self.bindings
                    .remove_if(&previous_owner, |_, bound| Arc::ptr_eq(bound, &tag));
            }
        }

        if let Some(previous) = self.bindings.insert(me, Arc::clone(&tag)) {
            if !Arc::ptr_eq(&previous, &tag) {
                self.recycle(previous);
            }
        }
        tag
    }

    /// The calling thread's tag, without creating one
    pub fn ambient(&self) -> Option<TagHandle> {
        self.bindings
            .get(&thread::current().id())
            .map(|entry| Arc::clone(entry.value()))
    }

    /// The calling thread's tag with `pairs` applied. A tag is created and
    /// bound only when pairs are supplied.
    pub fn current<I, P>(&self, pairs: I) -> Option<TagHandle>
    where
        I: IntoIterator<Item = P>,
        P: Into<TagPair>,
    {
        let mut pairs = pairs.into_iter().peekable();
        if pairs.peek().is_none() {
            return self.ambient();
        }
        let tag = self.associate(None);
        tag.apply(pairs);
        Some(tag)
    }

    /// Detach the calling thread's tag and hand it back to the pool
    pub fn release(&self) {
        if let Some((_, tag)) = self.bindings.remove(&thread::current().id()) {
            self.recycle(tag);
        }
    }

    /// Number of threads with a bound tag
    pub fn bound_count(&self) -> usize {
        self.bindings.len()
    }

    /// Tags waiting in the pool
    pub fn pooled_count(&self) -> usize {
        self.pool.available()
    }

    /// Drop every binding
    pub fn clear(&self) {
        let threads: Vec<ThreadId> = self.bindings.iter().map(|e| *e.key()).collect();
        for thread in threads {
            if let Some((_, tag)) = self.bindings.remove(&thread) {
                self.recycle(tag);
            }
        }
    }

    fn recycle(&self, mut tag: TagHandle) {
        tag.detach();
        // Only the last reference goes back; a caller still holding the
        // handle keeps a live, detached tag.
        if Arc::get_mut(&mut tag).is_some() {
            self.pool.give_back(tag);
        }
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new(Pool::<TagHandle>::DEFAULT_CAPACITY)
    }
}
