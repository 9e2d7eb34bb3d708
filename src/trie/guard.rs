//! Owned read handle to a value stored in a trie version

use super::TrieNode;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Keeps a value readable independently of the [`Trie`](super::Trie) it came from
///
/// The guard pins the root of the version the value was read from, so the
/// whole snapshot stays alive for as long as the guard does.
pub struct ValueGuard<T, K = u8> {
    root: Arc<TrieNode<K>>,
    value: Arc<T>,
}

impl<T, K> ValueGuard<T, K> {
    pub(crate) fn new(root: Arc<TrieNode<K>>, value: Arc<T>) -> Self {
        ValueGuard { root, value }
    }

    /// Root of the version this value was read from
    pub fn root(&self) -> &Arc<TrieNode<K>> {
        &self.root
    }

    /// The guarded value
    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T, K> Deref for ValueGuard<T, K> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T, K> Clone for ValueGuard<T, K> {
    fn clone(&self) -> Self {
        ValueGuard {
            root: Arc::clone(&self.root),
            value: Arc::clone(&self.value),
        }
    }
}

impl<T: fmt::Debug, K> fmt::Debug for ValueGuard<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValueGuard").field(&*self.value).finish()
    }
}
