//! Persistent trie handle and the copy-on-write algorithms

use super::node::{Children, Payload};
use super::{TrieNode, ValueGuard};
use crate::{Error, Result};
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// An immutable version of a trie
///
/// Keys are sequences of key units `K` (bytes by default). Values can be
/// of any `'static` type, including types that cannot be cloned; lookups
/// name the type they expect.
///
/// Cloning a `Trie` only clones the root pointer.
#[derive(Debug)]
pub struct Trie<K = u8> {
    root: Option<Arc<TrieNode<K>>>,
}

impl<K: Ord + Clone> Trie<K> {
    /// Create a new empty trie
    pub fn new() -> Self {
        Trie { root: None }
    }

    fn from_root(root: Option<Arc<TrieNode<K>>>) -> Self {
        Trie { root }
    }

    /// Root node of this version, `None` when empty
    pub fn root(&self) -> Option<&Arc<TrieNode<K>>> {
        self.root.as_ref()
    }

    /// Check whether this version holds no keys at all
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Check whether two versions share the same root
    pub fn ptr_eq(&self, other: &Trie<K>) -> bool {
        match (&self.root, &other.root) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Get the value stored at `key` as a `T`
    ///
    /// Returns `None` both when the key is absent and when the stored value
    /// is not a `T`. Use [`try_get`](Self::try_get) to tell them apart.
    pub fn get<T: Any>(&self, key: impl AsRef<[K]>) -> Option<&T> {
        self.find(key.as_ref())?.downcast_value::<T>()
    }

    /// Check whether a value of any type is stored at `key`
    pub fn contains_key(&self, key: impl AsRef<[K]>) -> bool {
        self.find(key.as_ref())
            .is_some_and(|node| node.is_value_node())
    }

    /// Get the value stored at `key`, reporting why a lookup missed
    ///
    /// Byte and char keys appear in the error as quoted text, other key
    /// units in their `Debug` form.
    pub fn try_get<T: Any>(&self, key: impl AsRef<[K]>) -> Result<&T>
    where
        K: fmt::Debug + Any,
    {
        let key = key.as_ref();
        let node = self
            .find(key)
            .filter(|node| node.is_value_node())
            .ok_or_else(|| Error::NotFound(render_key(key)))?;

        node.downcast_value::<T>()
            .ok_or_else(|| Error::TypeMismatch {
                key: render_key(key),
                expected: type_name::<T>(),
            })
    }

    /// Get an owned handle to the value at `key` that outlives this trie
    pub fn get_guarded<T: Any + Send + Sync>(
        &self,
        key: impl AsRef<[K]>,
    ) -> Option<ValueGuard<T, K>> {
        let root = self.root.as_ref()?;
        let value = self.find(key.as_ref())?.downcast_arc::<T>()?;
        Some(ValueGuard::new(Arc::clone(root), value))
    }

    /// Return a new version with `value` stored at `key`
    ///
    /// Any previous value at `key` is replaced, whatever its type. Keys
    /// below `key` are kept.
    pub fn put<T: Any + Send + Sync>(&self, key: impl AsRef<[K]>, value: T) -> Self {
        let value: Payload = Arc::new(value);
        let root = put_path(self.root.as_ref(), key.as_ref(), value);
        Trie::from_root(Some(root))
    }

    /// Return a new version without the value at `key`
    ///
    /// Nodes left with neither a value nor children are pruned, up to the
    /// root. Removing an absent key returns a version sharing this root.
    pub fn remove(&self, key: impl AsRef<[K]>) -> Self {
        Trie::from_root(remove_path(self.root.as_ref(), key.as_ref()))
    }

    /// Total number of nodes in this version
    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.node_count())
    }

    // === Internal helpers ===

    fn find(&self, key: &[K]) -> Option<&Arc<TrieNode<K>>> {
        let mut node = self.root.as_ref()?;
        for unit in key {
            node = node.child(unit)?;
        }
        Some(node)
    }
}

impl<K> Clone for Trie<K> {
    fn clone(&self) -> Self {
        Trie {
            root: self.root.clone(),
        }
    }
}

impl<K: Ord + Clone> Default for Trie<K> {
    fn default() -> Self {
        Trie::new()
    }
}

/// Rebuilds the path to `key` bottom-up with `value` stored at its end.
///
/// Walks down once recording the existing node at each depth, so the depth
/// of the key never shows up on the call stack.
fn put_path<K: Ord + Clone>(
    root: Option<&Arc<TrieNode<K>>>,
    key: &[K],
    value: Payload,
) -> Arc<TrieNode<K>> {
    let mut path = Vec::with_capacity(key.len());
    let mut node = root;
    for unit in key {
        path.push(node);
        node = node.and_then(|node| node.child(unit));
    }

    // Key ends here: keep whatever hangs below
    let children = node.map(|node| node.children().clone()).unwrap_or_default();
    let mut new_child = Arc::new(TrieNode::with_value(children, value));

    for (unit, node) in key.iter().zip(path).rev() {
        let mut new_node = match node {
            Some(node) => (**node).clone(),
            None => TrieNode::branch(Children::new()),
        };
        new_node.children_mut().insert(unit.clone(), new_child);
        new_child = Arc::new(new_node);
    }
    new_child
}

/// Returns the new root after removing `key`, or `None` if nothing is left.
///
/// When nothing changes the very same root `Arc` is handed back.
fn remove_path<K: Ord + Clone>(
    root: Option<&Arc<TrieNode<K>>>,
    key: &[K],
) -> Option<Arc<TrieNode<K>>> {
    let root = root?;

    let mut path = Vec::with_capacity(key.len());
    let mut node = root;
    for unit in key {
        path.push(node);
        match node.child(unit) {
            Some(child) => node = child,
            None => return Some(Arc::clone(root)),
        }
    }

    let mut replacement = if node.children().is_empty() {
        None
    } else if node.is_value_node() {
        Some(Arc::new(node.without_value()))
    } else {
        // Nothing stored here, every ancestor stays as it is
        return Some(Arc::clone(root));
    };

    for (unit, parent) in key.iter().zip(path).rev() {
        let mut new_node = (**parent).clone();
        match replacement {
            Some(child) => {
                new_node.children_mut().insert(unit.clone(), child);
            }
            None => {
                new_node.children_mut().remove(unit);
            }
        }
        replacement = if new_node.is_prunable() {
            None
        } else {
            Some(Arc::new(new_node))
        };
    }
    replacement
}

/// Render a key for error messages; byte and char keys read as text
fn render_key<K: fmt::Debug + Any>(key: &[K]) -> String {
    let bytes: Option<Vec<u8>> = key
        .iter()
        .map(|unit| (unit as &dyn Any).downcast_ref::<u8>().copied())
        .collect();
    if let Some(bytes) = bytes {
        return format!("{:?}", String::from_utf8_lossy(&bytes));
    }

    let text: Option<String> = key
        .iter()
        .map(|unit| (unit as &dyn Any).downcast_ref::<char>().copied())
        .collect();
    match text {
        Some(text) => format!("{:?}", text),
        None => format!("{:?}", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trie_put_get() {
        let trie: Trie = Trie::new();
        let trie = trie.put("key1", 42u32);

        assert_eq!(trie.get::<u32>("key1"), Some(&42));
        assert_eq!(trie.get::<u32>("key2"), None);
        assert_eq!(trie.get::<u32>("key"), None);
    }

    #[test]
    fn test_trie_empty_key() {
        let trie: Trie = Trie::new();
        assert_eq!(trie.get::<u32>(""), None);

        let trie = trie.put("", 1u32).put("a", 2u32);
        assert_eq!(trie.get::<u32>(""), Some(&1));
        assert_eq!(trie.get::<u32>("a"), Some(&2));

        let trie = trie.remove("");
        assert_eq!(trie.get::<u32>(""), None);
        assert_eq!(trie.get::<u32>("a"), Some(&2));
        assert!(!trie.root().unwrap().is_value_node());
    }

    #[test]
    fn test_trie_multiple_keys() {
        let trie: Trie = Trie::new()
            .put("apple", 1u32)
            .put("application", 2u32)
            .put("banana", 3u32);

        assert_eq!(trie.get::<u32>("apple"), Some(&1));
        assert_eq!(trie.get::<u32>("application"), Some(&2));
        assert_eq!(trie.get::<u32>("banana"), Some(&3));
        assert_eq!(trie.get::<u32>("app"), None);
    }

    #[test]
    fn test_trie_overwrite_keeps_children() {
        let trie: Trie = Trie::new().put("ab", 1u32).put("a", 2u32);
        let trie = trie.put("a", String::from("replaced"));

        assert_eq!(trie.get::<String>("a").map(String::as_str), Some("replaced"));
        assert_eq!(trie.get::<u32>("a"), None);
        assert_eq!(trie.get::<u32>("ab"), Some(&1));
    }

    #[test]
    fn test_trie_put_leaves_original_untouched() {
        let v1: Trie = Trie::new().put("ab", 1u32);
        let v2 = v1.put("ab", 2u32).put("ac", 3u32);

        assert_eq!(v1.get::<u32>("ab"), Some(&1));
        assert_eq!(v1.get::<u32>("ac"), None);
        assert_eq!(v2.get::<u32>("ab"), Some(&2));
        assert_eq!(v2.get::<u32>("ac"), Some(&3));
    }

    #[test]
    fn test_trie_put_clones_only_the_path() {
        let v1: Trie = Trie::new().put("ab", 1u32).put("xy", 2u32);
        let v2 = v1.put("ac", 3u32);

        let old_root = v1.root().unwrap();
        let new_root = v2.root().unwrap();
        assert!(!Arc::ptr_eq(old_root, new_root));
        assert!(Arc::ptr_eq(
            old_root.child(&b'x').unwrap(),
            new_root.child(&b'x').unwrap()
        ));
        assert!(Arc::ptr_eq(
            old_root.child(&b'a').unwrap().child(&b'b').unwrap(),
            new_root.child(&b'a').unwrap().child(&b'b').unwrap()
        ));
    }

    #[test]
    fn test_trie_remove() {
        let trie: Trie = Trie::new().put("key", 7u32);
        let removed = trie.remove("key");

        assert_eq!(removed.get::<u32>("key"), None);
        assert!(removed.is_empty());
        assert_eq!(trie.get::<u32>("key"), Some(&7));
    }

    #[test]
    fn test_trie_remove_prunes_upward() {
        let trie: Trie = Trie::new().put("a", 1u32).put("abcd", 2u32);
        assert_eq!(trie.node_count(), 5);

        let trie = trie.remove("abcd");
        assert_eq!(trie.get::<u32>("a"), Some(&1));
        assert_eq!(trie.node_count(), 2);

        let trie = trie.remove("a");
        assert!(trie.is_empty());
        assert_eq!(trie.node_count(), 0);
    }

    #[test]
    fn test_trie_remove_inner_value_keeps_children() {
        let trie: Trie = Trie::new().put("a", 1u32).put("ab", 2u32);
        let removed = trie.remove("a");

        assert_eq!(removed.get::<u32>("a"), None);
        assert_eq!(removed.get::<u32>("ab"), Some(&2));
        assert_eq!(removed.node_count(), 3);
        assert!(Arc::ptr_eq(
            trie.root().unwrap().child(&b'a').unwrap().child(&b'b').unwrap(),
            removed.root().unwrap().child(&b'a').unwrap().child(&b'b').unwrap()
        ));
    }

    #[test]
    fn test_trie_remove_missing_key_is_noop() {
        let trie: Trie = Trie::new().put("ab", 1u32);

        assert!(trie.remove("ac").ptr_eq(&trie));
        assert!(trie.remove("abc").ptr_eq(&trie));
        assert!(trie.remove("x").ptr_eq(&trie));
        // "a" exists only as a branch
        assert!(trie.remove("a").ptr_eq(&trie));

        let empty: Trie = Trie::new();
        assert!(empty.remove("a").is_empty());
    }

    #[test]
    fn test_trie_try_get() {
        let trie: Trie = Trie::new().put("ab", 1u32);

        assert_eq!(trie.try_get::<u32>("ab"), Ok(&1));
        assert!(matches!(trie.try_get::<u32>("a"), Err(Error::NotFound(_))));
        assert!(matches!(trie.try_get::<u32>("zz"), Err(Error::NotFound(_))));
        assert_eq!(
            trie.try_get::<u64>("ab"),
            Err(Error::TypeMismatch {
                key: String::from("\"ab\""),
                expected: "u64",
            })
        );
    }

    #[test]
    fn test_trie_error_key_rendering() {
        let chars: Trie<char> = Trie::new();
        let err = chars.try_get::<u32>(['h', 'é']).unwrap_err();
        assert_eq!(err, Error::NotFound(String::from("\"hé\"")));

        let bytes: Trie = Trie::new().put("ké", 1u32);
        let err = bytes.try_get::<u64>("ké").unwrap_err();
        assert_eq!(err.to_string(), "Type mismatch at key \"ké\": value is not a u64");

        let wide: Trie<u32> = Trie::new();
        let err = wide.try_get::<u32>([1u32, 2]).unwrap_err();
        assert_eq!(err, Error::NotFound(String::from("[1, 2]")));
    }

    #[test]
    fn test_trie_long_key() {
        let key = vec![b'x'; 100_000];
        let mut longer = key.clone();
        longer.push(b'y');

        let v1: Trie = Trie::new().put(&key, 1u32);
        let v2 = v1.put(&longer, 2u32);
        assert_eq!(v1.get::<u32>(&key), Some(&1));
        assert_eq!(v2.get::<u32>(&longer), Some(&2));
        assert_eq!(v2.node_count(), 100_002);

        // unrelated remove deep down leaves the version untouched
        let mut missing = key.clone();
        missing.push(b'z');
        assert!(v2.remove(&missing).ptr_eq(&v2));

        let v3 = v2.remove(&key);
        assert_eq!(v3.get::<u32>(&key), None);
        assert_eq!(v3.get::<u32>(&longer), Some(&2));

        let v4 = v3.remove(&longer);
        assert!(v4.is_empty());
        assert_eq!(v2.get::<u32>(&key), Some(&1));

        drop(v1);
        drop(v2);
        drop(v3);
    }

    #[test]
    fn test_trie_contains_key() {
        let trie: Trie = Trie::new().put("ab", "v");

        assert!(trie.contains_key("ab"));
        assert!(!trie.contains_key("a"));
        assert!(!trie.contains_key(""));
    }

    #[test]
    fn test_trie_char_keys() {
        let key: Vec<char> = "héllo".chars().collect();
        let trie: Trie<char> = Trie::new().put(&key, 5u8);

        assert_eq!(trie.get::<u8>(&key), Some(&5));
        assert_eq!(trie.node_count(), key.len() + 1);
    }
}
