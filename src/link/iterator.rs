use crate::link::Link;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;

/// A double-ended iterator over the nodes of a ring.
///
/// It uses a pair of links `start..end` to represent a half-open range of
/// the ring, where `start` is inclusive and `end` is not. Initially `start`
/// is the front node and `end` is the sentinel.
#[derive(Clone)]
pub struct Links<'a> {
    start: NonNull<Link>,
    end: NonNull<Link>,
    _marker: PhantomData<&'a Link>,
}

impl<'a> Links<'a> {
    pub(crate) unsafe fn new(ring: NonNull<Link>) -> Self {
        Self {
            start: ring.as_ref().next,
            end: ring,
            _marker: PhantomData,
        }
    }
}

impl<'a> Iterator for Links<'a> {
    type Item = NonNull<Link>;

    /// Return `start` and reset the iterating range to `(start.next)..end`,
    /// or return `None` if `start..end` is already empty.
    fn next(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        let current = self.start;
        // SAFETY: `start..end` is a valid non-empty range of a ring.
        self.start = unsafe { current.as_ref().next };
        Some(current)
    }
}

impl<'a> DoubleEndedIterator for Links<'a> {
    /// Reset the iterating range to `start..(end.prev)` and return `end.prev`,
    /// or return `None` if `start..end` is already empty.
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: `start..end` is a valid non-empty range of a ring.
        self.end = unsafe { self.end.as_ref().prev };
        Some(self.end)
    }
}

impl<'a> FusedIterator for Links<'a> {}

/// A forward iterator over the nodes of a ring that tolerates removal.
///
/// The successor of a node is captured before the node is yielded, so the
/// consumer may unlink or free the yielded node.
pub struct LinksSafe {
    next: NonNull<Link>,
    end: NonNull<Link>,
}

impl LinksSafe {
    pub(crate) unsafe fn new(ring: NonNull<Link>) -> Self {
        Self {
            next: ring.as_ref().next,
            end: ring,
        }
    }
}

impl Iterator for LinksSafe {
    type Item = NonNull<Link>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == self.end {
            return None;
        }
        let current = self.next;
        // SAFETY: `current` is still linked, it has not been yielded yet.
        self.next = unsafe { current.as_ref().next };
        Some(current)
    }
}

impl FusedIterator for LinksSafe {}
