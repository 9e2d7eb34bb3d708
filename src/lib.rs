//! # cow_trie
//!
//! A persistent, copy-on-write trie.
//!
//! Every mutation returns a new version of the trie while all earlier
//! versions stay valid and readable. Versions share every subtree a
//! mutation did not touch, which makes the trie a building block for
//! snapshot isolation and versioned indexes.
//!
//! ## Core Concepts
//!
//! - **Trie**: an immutable handle to one version
//! - **Nodes**: immutable, reference-counted, one per key unit
//! - **Values**: any `'static` type, stored once and never copied
//!
//! ## Example
//!
//! ```
//! use cow_trie::Trie;
//!
//! let v1: Trie = Trie::new().put("hello", 1u32);
//! let v2 = v1.put("help", String::from("me")).remove("hello");
//!
//! assert_eq!(v1.get::<u32>("hello"), Some(&1));
//! assert_eq!(v2.get::<u32>("hello"), None);
//! assert_eq!(v2.get::<String>("help").map(String::as_str), Some("me"));
//! ```

pub mod trie;

mod error;

pub use error::{Error, Result};
pub use trie::{Trie, TrieNode, ValueGuard};
