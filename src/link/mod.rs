//! The intrusive ring primitive.
//!
//! A [`Link`] is a pair of non-owning pointers `next` and `prev`. Links are
//! embedded at the start of whatever node type owns them, and a payload-free
//! link serves as the sentinel of a ring: the ring is empty iff the
//! sentinel's `next` points back to itself.
//!
//! For every link `x` in a well-formed ring, `x.next.prev == x` and
//! `x.prev.next == x`. All functions here preserve that invariant provided
//! their safety contracts hold. None of them allocate, free, or know about
//! payloads; ownership of the nodes lives one layer up.
//!
//! # Naming Conventions
//!
//! - `ring`: the sentinel link of a ring;
//! - `anchor`: a link already in a ring, next to which another one is linked;
//! - `node`: a link being linked into (or out of) a ring.

use std::ptr::NonNull;

pub use iterator::{Links, LinksSafe};

mod iterator;

/// A payload-free link of a cyclic doubly-linked ring.
#[repr(C)]
#[derive(Debug)]
pub struct Link {
    pub(crate) next: NonNull<Link>,
    pub(crate) prev: NonNull<Link>,
}

impl Link {
    /// Create a link whose pointers are dangling.
    ///
    /// The link must be placed at its final address and then passed to
    /// [`init`] (or linked into a ring) before anything reads through it.
    pub const fn dangling() -> Self {
        Link {
            next: NonNull::dangling(),
            prev: NonNull::dangling(),
        }
    }

    pub fn next(&self) -> NonNull<Link> {
        self.next
    }

    pub fn prev(&self) -> NonNull<Link> {
        self.prev
    }
}

/// Make `ring` a self-referential (empty) ring.
///
/// # Safety
///
/// `ring` must be valid for writes and must not be part of another ring,
/// or that ring becomes ill-formed.
#[inline]
pub unsafe fn init(mut ring: NonNull<Link>) {
    ring.as_mut().next = ring;
    ring.as_mut().prev = ring;
}

/// Point `prev` and `next` at each other.
///
/// # Safety
///
/// Both links must be valid for writes.
#[inline]
pub unsafe fn connect(mut prev: NonNull<Link>, mut next: NonNull<Link>) {
    prev.as_mut().next = next;
    next.as_mut().prev = prev;
}

/// Link `node` right after `anchor`.
///
/// # Safety
///
/// `anchor` must belong to a well-formed ring and `node` must not be linked
/// into any ring.
#[inline]
pub unsafe fn insert_after(anchor: NonNull<Link>, node: NonNull<Link>) {
    let next = anchor.as_ref().next;
    #[cfg(debug_assertions)]
    assert_adjacent(anchor, next);
    connect(node, next);
    connect(anchor, node);
    #[cfg(debug_assertions)]
    {
        assert_adjacent(anchor, node);
        assert_adjacent(node, next);
    }
}

/// Link `node` right before `anchor`.
///
/// When `anchor` is a sentinel, this appends `node` at the back of the ring.
///
/// # Safety
///
/// Same as [`insert_after`].
#[inline]
pub unsafe fn insert_before(anchor: NonNull<Link>, node: NonNull<Link>) {
    insert_after(anchor.as_ref().prev, node);
}

/// Unlink `node` from its ring, leaving it as a detached, self-referential
/// link.
///
/// # Safety
///
/// `node` must belong to a well-formed ring and must not be its sentinel.
#[inline]
pub unsafe fn unlink(node: NonNull<Link>) {
    let (prev, next) = (node.as_ref().prev, node.as_ref().next);
    #[cfg(debug_assertions)]
    {
        assert_adjacent(prev, node);
        assert_adjacent(node, next);
    }
    connect(prev, next);
    init(node);
}

/// Move `node` from its current ring to the back of `ring`.
///
/// # Safety
///
/// `node` must belong to a well-formed ring without being its sentinel, and
/// `ring` must be a well-formed ring.
#[inline]
pub unsafe fn move_tail(node: NonNull<Link>, ring: NonNull<Link>) {
    connect(node.as_ref().prev, node.as_ref().next);
    insert_before(ring, node);
}

/// Returns `true` if the ring has no node besides its sentinel.
///
/// # Safety
///
/// `ring` must be a well-formed ring.
#[inline]
pub unsafe fn is_empty(ring: NonNull<Link>) -> bool {
    ring.as_ref().next == ring
}

/// Returns `true` if the ring holds exactly one node.
///
/// # Safety
///
/// `ring` must be a well-formed ring.
#[inline]
pub unsafe fn is_singular(ring: NonNull<Link>) -> bool {
    !is_empty(ring) && ring.as_ref().next.as_ref().next == ring
}

/// Move every node of `src` right after `dest_after`, keeping their order,
/// and leave `src` empty.
///
/// # Safety
///
/// `src` must be a well-formed ring, and `dest_after` must belong to a
/// different well-formed ring.
pub unsafe fn splice(src: NonNull<Link>, dest_after: NonNull<Link>) {
    if is_empty(src) {
        return;
    }
    let (first, last) = (src.as_ref().next, src.as_ref().prev);
    let at = dest_after.as_ref().next;
    #[cfg(debug_assertions)]
    assert_adjacent(dest_after, at);
    connect(dest_after, first);
    connect(last, at);
    init(src);
}

/// Like [`splice`], but places the nodes right before `dest_before`.
///
/// When `dest_before` is a sentinel, the nodes are appended at the back.
///
/// # Safety
///
/// Same as [`splice`].
#[inline]
pub unsafe fn splice_tail(src: NonNull<Link>, dest_before: NonNull<Link>) {
    splice(src, dest_before.as_ref().prev);
}

/// Find the middle node of `ring` with a slow and a fast cursor.
///
/// For a ring of *n* nodes, the returned node is the ⌊*n* / 2⌋-th one,
/// 0-indexed from the front. For an empty ring the sentinel is returned.
///
/// # Safety
///
/// `ring` must be a well-formed ring.
pub unsafe fn find_mid(ring: NonNull<Link>) -> NonNull<Link> {
    let mut slow = ring.as_ref().next;
    let mut fast = slow;
    while fast != ring && fast.as_ref().next != ring {
        fast = fast.as_ref().next.as_ref().next;
        slow = slow.as_ref().next;
    }
    slow
}

/// Iterate over the nodes of `ring`, front to back, excluding the sentinel.
///
/// # Safety
///
/// `ring` must be a well-formed ring, and its structure must not change
/// while the returned iterator is alive.
#[inline]
pub unsafe fn iter<'a>(ring: NonNull<Link>) -> Links<'a> {
    Links::new(ring)
}

/// Iterate over the nodes of `ring`, front to back, where the yielded node
/// may be unlinked or freed before the next one is requested.
///
/// # Safety
///
/// `ring` must be a well-formed ring. Apart from the node last yielded,
/// the nodes of the ring must stay in place during the iteration.
#[inline]
pub unsafe fn iter_safe(ring: NonNull<Link>) -> LinksSafe {
    LinksSafe::new(ring)
}

/// Count the nodes of `ring` in *O*(*n*) time.
///
/// # Safety
///
/// `ring` must be a well-formed ring.
pub unsafe fn count(ring: NonNull<Link>) -> usize {
    iter(ring).count()
}

/// Walk the whole ring and check that every link agrees with its
/// neighbours in both directions.
///
/// # Safety
///
/// Every pointer reachable from `ring` by following `next` must be valid
/// for reads, and following `next` must lead back to `ring`.
pub unsafe fn is_well_formed(ring: NonNull<Link>) -> bool {
    let mut forward = 0_usize;
    let mut current = ring;
    loop {
        let next = current.as_ref().next;
        if next.as_ref().prev != current || current.as_ref().prev.as_ref().next != current {
            return false;
        }
        current = next;
        if current == ring {
            break;
        }
        forward += 1;
    }
    let backward = iter(ring).rev().count();
    forward == backward
}

#[cfg(debug_assertions)]
pub(crate) fn assert_adjacent(prev: NonNull<Link>, next: NonNull<Link>) {
    unsafe {
        assert_eq!(prev.as_ref().next, next);
        assert_eq!(next.as_ref().prev, prev);
    }
}
