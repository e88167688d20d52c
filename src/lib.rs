//! This crate provides a queue of owned strings, implemented as an intrusive
//! cyclic doubly-linked list.
//!
//! The [`Queue`] allows inserting and removing elements at both ends in
//! constant time. Its other operations (deleting the middle element,
//! collapsing duplicates, swapping pairs, reversing and sorting) work by
//! rewiring links only: no element is ever copied or moved in memory.
//!
//! Here is a quick example showing how the queue works.
//!
//! ```
//! use cyclic_queue::Queue;
//! use std::iter::FromIterator;
//!
//! let mut queue = Queue::from_iter(["b", "d", "a", "d"]);
//!
//! queue.insert_head("c").unwrap(); // becomes [c, b, d, a, d]
//! queue.sort(); // becomes [a, b, c, d, d]
//! assert_eq!(queue.delete_dup(), 2); // becomes [a, b, c]
//!
//! let mut buf = [0; 8];
//! let element = queue.remove_tail(Some(&mut buf[..])).unwrap();
//! assert_eq!(element.value(), "c");
//! assert_eq!(&buf[..2], b"c\0");
//! element.release();
//!
//! assert_eq!(Vec::from_iter(queue), vec!["a", "b"]);
//! ```
//!
//! # Memory Layout
//!
//! The memory layout of the queue is like the following graph:
//! ```text
//!          ┌─────────────────────────────────────────────────────────────────────┐
//!          ↓                                                          Sentinel   │
//!    ╔═══════════╗           ╔═══════════╗                        ┌───────────┐  │
//!    ║   next    ║ ────────→ ║   next    ║ ────────→ ┄┄ ────────→ │   next    │ ─┘
//!    ╟───────────╢           ╟───────────╢     Node 2, 3, ...     ├───────────┤
//! ┌─ ║   prev    ║ ←──────── ║   prev    ║ ←──────── ┄┄ ←──────── │   prev    │
//! │  ╟───────────╢           ╟───────────╢                        └───────────┘
//! │  ║   value   ║ ─┐        ║   value   ║ ─┐                         ↑   ↑
//! │  ╚═══════════╝  │        ╚═══════════╝  │                         │   │
//! │      Node 0     ↓            Node 1     ↓                         │   │
//! │              "text 0"               "text 1"                      │   │
//! └───────────────────────────────────────────────────────────────────┘   │
//! ╔═══════════╗                                                           │
//! ║ sentinel  ║ ──────────────────────────────────────────────────────────┘
//! ╚═══════════╝
//!     Queue
//! ```
//!
//! The links (`next` and `prev`) come first in every node, so a pointer to
//! the link of a node is also a pointer to the node. The ring itself is
//! built and rewired by the payload-agnostic functions of [`link`]; the
//! [`Queue`] owns the nodes and their texts.
//!
//! The sentinel is a bare link without text. In an empty queue its `next`
//! and `prev` point to itself; otherwise `sentinel.next` is the front element
//! and `sentinel.prev` is the back one. The length is not cached: [`len`]
//! counts the elements by walking the ring.
//!
//! # Remove and Delete
//!
//! Removing an element (by [`remove_head`] or [`remove_tail`]) unlinks it
//! and hands the [`Element`] over to the caller, who releases it by
//! [`Element::release`] or by dropping it. Deleting elements (by
//! [`delete_mid`] or [`delete_dup`]) unlinks and frees them at once.
//!
//! # Checking the Ring
//!
//! With the `check-ring` feature enabled, every mutating operation of the
//! queue walks the whole ring afterwards and panics if some link does not
//! point back to its neighbour:
//! ```text
//! [dependencies]
//! cyclic_queue = { features = ["check-ring"] }
//! ```
//!
//! Drivers that cannot hold a queue at all (e.g. after a failed creation)
//! may use the nullable entry points in [`ops`].
//!
//! [`len`]: Queue::len
//! [`remove_head`]: Queue::remove_head
//! [`remove_tail`]: Queue::remove_tail
//! [`delete_mid`]: Queue::delete_mid
//! [`delete_dup`]: Queue::delete_dup

#[doc(inline)]
pub use queue::iterator::{IntoIter, Iter};
#[doc(inline)]
pub use queue::{Element, Queue};
pub use error::QueueError;

mod error;
pub mod link;
pub mod ops;
pub mod queue;
