//! Copy-on-write trie with structural sharing between versions
//!
//! - Every put/remove returns a new [`Trie`]; the receiver is left as is
//! - Only the nodes on the path to the changed key are cloned
//! - Untouched subtrees are shared by `Arc` across all versions

mod guard;
mod node;
mod tree;

pub use guard::ValueGuard;
pub use node::{Children, Payload, TrieNode};
pub use tree::Trie;
