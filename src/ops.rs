//! Entry points for drivers that may hold no queue at all.
//!
//! Every function here takes the queue as an `Option`. An absent queue is
//! never an error: it is reported through the same channel as the ordinary
//! failure of the operation (`false`, `None` or `0`), and nothing is
//! allocated. Allocation failure is reported the same way, leaving the
//! queue as it was.
//!
//! # Examples
//!
//! ```
//! use cyclic_queue::ops;
//!
//! let mut queue = ops::new();
//! assert!(ops::insert_tail(queue.as_mut(), "b"));
//! assert!(ops::insert_head(queue.as_mut(), "a"));
//! assert_eq!(ops::size(queue.as_ref()), 2);
//!
//! let mut buf = [0_u8; 4];
//! let element = ops::remove_head(queue.as_mut(), Some(&mut buf[..]));
//! assert_eq!(&buf[..2], b"a\0");
//! ops::release_element(element);
//!
//! ops::free(queue);
//!
//! assert!(!ops::insert_tail(None, "c"));
//! assert_eq!(ops::size(None), 0);
//! ```

use crate::{Element, Queue};

/// Create an empty queue, or `None` if it cannot be allocated.
pub fn new() -> Option<Queue> {
    Queue::try_new().ok()
}

/// Free the queue and every element it still holds. Does nothing to an
/// absent queue.
pub fn free(queue: Option<Queue>) {
    drop(queue);
}

/// Insert a copy of `text` at the front. Returns `false` if the queue is
/// absent or the allocation fails.
pub fn insert_head(queue: Option<&mut Queue>, text: &str) -> bool {
    queue.map_or(false, |queue| queue.insert_head(text).is_ok())
}

/// Insert a copy of `text` at the back. Returns `false` if the queue is
/// absent or the allocation fails.
pub fn insert_tail(queue: Option<&mut Queue>, text: &str) -> bool {
    queue.map_or(false, |queue| queue.insert_tail(text).is_ok())
}

/// Unlink the front element and hand it out, copying its text into `buf`
/// (truncated and NUL-terminated) if one is given.
///
/// Returns `None` without touching `buf` if the queue is absent or empty.
pub fn remove_head(queue: Option<&mut Queue>, buf: Option<&mut [u8]>) -> Option<Element> {
    queue?.remove_head(buf)
}

/// Unlink the back element and hand it out, copying its text into `buf`
/// (truncated and NUL-terminated) if one is given.
///
/// Returns `None` without touching `buf` if the queue is absent or empty.
pub fn remove_tail(queue: Option<&mut Queue>, buf: Option<&mut [u8]>) -> Option<Element> {
    queue?.remove_tail(buf)
}

/// Free a removed element, text first.
pub fn release_element(element: Option<Element>) {
    if let Some(element) = element {
        element.release();
    }
}

/// The number of elements, or `0` for an absent queue.
pub fn size(queue: Option<&Queue>) -> usize {
    queue.map_or(0, Queue::len)
}

/// Delete the middle element. Returns `false` if the queue is absent or
/// empty.
pub fn delete_mid(queue: Option<&mut Queue>) -> bool {
    queue.map_or(false, Queue::delete_mid)
}

/// Delete every run of equal texts in a sorted queue. Returns `false` only
/// if the queue is absent; an empty queue succeeds trivially.
pub fn delete_dup(queue: Option<&mut Queue>) -> bool {
    match queue {
        Some(queue) => {
            queue.delete_dup();
            true
        }
        None => false,
    }
}

/// Swap every two adjacent elements.
pub fn swap(queue: Option<&mut Queue>) {
    if let Some(queue) = queue {
        queue.swap_pairs();
    }
}

/// Reverse the order of the elements.
pub fn reverse(queue: Option<&mut Queue>) {
    if let Some(queue) = queue {
        queue.reverse();
    }
}

/// Sort the elements ascending by their bytes, keeping equal ones in order.
pub fn sort(queue: Option<&mut Queue>) {
    if let Some(queue) = queue {
        queue.sort();
    }
}
