//! Trie node types

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Children of a node, indexed by the next key unit
pub type Children<K> = BTreeMap<K, Arc<TrieNode<K>>>;

/// Type-erased, shared, read-only value stored in a value node
pub type Payload = Arc<dyn Any + Send + Sync>;

/// A node in the copy-on-write trie
///
/// Nodes are never modified once they are reachable from a trie. Each
/// node consumes exactly one key unit; there is no prefix compression.
#[derive(Clone, Debug)]
pub enum TrieNode<K> {
    /// A pure branching point
    Branch {
        /// Children indexed by the next key unit
        children: Children<K>,
    },
    /// A node that terminates a stored key
    Value {
        /// Children indexed by the next key unit
        children: Children<K>,
        /// The stored value
        value: Payload,
    },
}

impl<K: Ord> TrieNode<K> {
    /// Create a branch node
    pub fn branch(children: Children<K>) -> Self {
        TrieNode::Branch { children }
    }

    /// Create a value node
    pub fn with_value(children: Children<K>, value: Payload) -> Self {
        TrieNode::Value { children, value }
    }

    /// Children of this node, indexed by the next key unit
    pub fn children(&self) -> &Children<K> {
        match self {
            TrieNode::Branch { children } | TrieNode::Value { children, .. } => children,
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut Children<K> {
        match self {
            TrieNode::Branch { children } | TrieNode::Value { children, .. } => children,
        }
    }

    /// Get the child for a key unit
    pub fn child(&self, unit: &K) -> Option<&Arc<TrieNode<K>>> {
        self.children().get(unit)
    }

    /// Check if a key terminates at this node
    pub fn is_value_node(&self) -> bool {
        matches!(self, TrieNode::Value { .. })
    }

    /// Get the type-erased value at this node (if any)
    pub fn value(&self) -> Option<&Payload> {
        match self {
            TrieNode::Value { value, .. } => Some(value),
            TrieNode::Branch { .. } => None,
        }
    }

    /// Get the value at this node as a `T`
    ///
    /// Returns `None` if this is a branch node or the stored value is of
    /// another type.
    pub fn downcast_value<T: Any>(&self) -> Option<&T> {
        self.value()?.downcast_ref::<T>()
    }

    /// Like [`downcast_value`](Self::downcast_value), but hands out a shared
    /// owner of the value instead of a borrow.
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(self.value()?).downcast::<T>().ok()
    }

    /// A node holding neither a value nor children has no reason to exist
    pub fn is_prunable(&self) -> bool {
        !self.is_value_node() && self.children().is_empty()
    }

    /// Number of nodes in the subtree rooted here, including this one
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children().values().map(|child| &**child));
        }
        count
    }
}

impl<K: Ord + Clone> TrieNode<K> {
    /// Copy of this node with the value stripped; children stay shared
    pub fn without_value(&self) -> Self {
        TrieNode::branch(self.children().clone())
    }
}

impl<K> Drop for TrieNode<K> {
    // Unlink children through a work list; the default drop recurses once
    // per level and overflows the stack on long keys.
    fn drop(&mut self) {
        let children = match self {
            TrieNode::Branch { children } | TrieNode::Value { children, .. } => {
                std::mem::take(children)
            }
        };
        let mut stack: Vec<Arc<TrieNode<K>>> = children.into_values().collect();

        while let Some(node) = stack.pop() {
            // Subtrees still shared with another version are left alone
            if let Some(mut node) = Arc::into_inner(node) {
                let children = match &mut node {
                    TrieNode::Branch { children } | TrieNode::Value { children, .. } => {
                        std::mem::take(children)
                    }
                };
                stack.extend(children.into_values());
            }
        }
    }
}
