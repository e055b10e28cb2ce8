//! # Splay-tree collections that provide memory-efficient cloning
//!
//! `splay-collections` provides a sorted map and a sorted set built on
//! persistent [splay trees](https://en.wikipedia.org/wiki/Splay_tree).  The
//! collections use structural sharing, which means a clone `s.clone()` is
//! O(1) and shares its internal representation with `s`.  The
//! representations of a collection and its clones gradually diverge as they
//! are updated; an update clones the handful of shared nodes on its search
//! path and never touches nodes reachable from other clones.
//!
//! Splay trees self-adjust: every update, and the explicitly memoizing
//! lookups, rotate the accessed element to the root, so recently used
//! elements are cheap to reach again.  Operations are amortized O(log n);
//! an individual operation may be slower while the tree pays down a skewed
//! shape left by earlier accesses.

mod splay;
pub use splay::SplayMap;
pub use splay::SplaySet;
