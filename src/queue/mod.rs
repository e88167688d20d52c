use std::alloc::{self, Layout};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::error::QueueError;
use crate::link::{self, Link};
use crate::Iter;

pub mod iterator;

mod algorithms;

/// A queue of owned strings, built on an intrusive cyclic doubly-linked ring.
///
/// The `Queue` holds a pointer to a payload-free sentinel link. Every element
/// is a heap node that embeds a [`Link`] followed by its text, and the queue
/// exclusively owns the nodes linked into its ring.
///
/// The number of elements is not cached, [`Queue::len`] walks the ring.
///
/// # Naming Conventions
///
/// - *remove*: unlink an element and hand it to the caller as an [`Element`];
/// - *delete*: unlink an element and free it within the same operation.
pub struct Queue {
    sentinel: NonNull<Link>,
    _marker: PhantomData<Box<Node>>,
}

/// A queue node: the link must stay the first field, so that a pointer to
/// the link is also a pointer to the node.
#[repr(C)]
pub(crate) struct Node {
    pub(crate) link: Link,
    pub(crate) value: Box<str>,
}

/// An element removed from a [`Queue`].
///
/// The queue no longer tracks it, the caller owns its node and text buffer.
/// Both are freed by [`Element::release`], or equivalently when the element
/// is dropped.
pub struct Element {
    node: Box<Node>,
}

// private methods
impl Queue {
    pub(crate) fn sentinel(&self) -> NonNull<Link> {
        self.sentinel
    }
    pub(crate) fn front_link(&self) -> NonNull<Link> {
        // SAFETY: `sentinel.next` is always valid (either the sentinel itself,
        // or the first element in the queue).
        unsafe { self.sentinel.as_ref().next }
    }
    pub(crate) fn back_link(&self) -> NonNull<Link> {
        // SAFETY: `sentinel.prev` is always valid (either the sentinel itself,
        // or the last element in the queue).
        unsafe { self.sentinel.as_ref().prev }
    }

    /// Allocate a node holding a copy of `text` and link it after `anchor`.
    ///
    /// It is unsafe because it does not check whether `anchor` belongs to
    /// the queue.
    unsafe fn insert_after(&mut self, anchor: NonNull<Link>, text: &str) -> Result<(), QueueError> {
        let node = Node::try_new_detached(text).map_err(|err| {
            log::warn!("cannot insert {} bytes of text: {}", text.len(), err);
            err
        })?;
        link::insert_after(anchor, node);
        self.check_ring();
        Ok(())
    }

    /// Unlink a non-sentinel `node` and hand it out as an element, copying
    /// its text into `buf` first.
    ///
    /// It is unsafe because it does not check whether `node` belongs to the
    /// queue, or whether it is the sentinel.
    unsafe fn remove(&mut self, node: NonNull<Link>, buf: Option<&mut [u8]>) -> Element {
        link::unlink(node);
        let element = Element {
            node: Box::from_raw(node.cast::<Node>().as_ptr()),
        };
        debug_assert_eq!(element.node.link.next(), node, "a removed node must be detached");
        if let Some(buf) = buf {
            copy_to_buffer(element.value(), buf);
        }
        self.check_ring();
        element
    }

    /// Walk the whole ring after a mutation, with `feature = "check-ring"`.
    #[inline]
    pub(crate) fn check_ring(&self) {
        #[cfg(feature = "check-ring")]
        assert!(self.is_well_formed(), "the ring of the queue is ill-formed");
    }
}

impl Queue {
    /// Create an empty `Queue`.
    ///
    /// # Aborts
    ///
    /// Aborts on allocation failure of the sentinel, through
    /// [`std::alloc::handle_alloc_error`]. See [`Queue::try_new`] for a
    /// fallible version.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// let queue = Queue::new();
    /// assert!(queue.is_empty());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::try_new().unwrap_or_else(|err| alloc::handle_alloc_error(err.layout()))
    }

    /// Create an empty `Queue`, or return an error if the sentinel cannot be
    /// allocated. A queue is never handed out partially initialized.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// let queue = Queue::try_new().unwrap();
    /// assert_eq!(queue.len(), 0);
    /// ```
    pub fn try_new() -> Result<Self, QueueError> {
        let sentinel = try_alloc::<Link>().map_err(|err| {
            log::warn!("cannot create a queue: {}", err);
            err
        })?;
        // SAFETY: `sentinel` is freshly allocated and not part of any ring.
        unsafe { link::init(sentinel) };
        Ok(Self {
            sentinel,
            _marker: PhantomData,
        })
    }

    /// Returns `true` if the `Queue` is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// assert!(queue.is_empty());
    ///
    /// queue.insert_head("foo").unwrap();
    /// assert!(!queue.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        // SAFETY: the sentinel always heads a well-formed ring.
        unsafe { link::is_empty(self.sentinel) }
    }

    /// Returns `true` if the `Queue` holds exactly one element.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    #[inline]
    pub fn is_singular(&self) -> bool {
        // SAFETY: the sentinel always heads a well-formed ring.
        unsafe { link::is_singular(self.sentinel) }
    }

    /// Returns the number of elements in the `Queue`.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time, the count is not cached.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// queue.insert_tail("b").unwrap();
    /// queue.insert_head("a").unwrap();
    /// assert_eq!(queue.len(), 2);
    /// ```
    pub fn len(&self) -> usize {
        // SAFETY: the sentinel always heads a well-formed ring.
        unsafe { link::count(self.sentinel) }
    }

    /// Removes and frees all elements from the `Queue`.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["a", "b"]);
    /// queue.clear();
    /// assert!(queue.is_empty());
    /// ```
    pub fn clear(&mut self) {
        // SAFETY: each node is yielded once and is never touched again after
        // being freed, and the sentinel is reset afterwards.
        unsafe {
            for node in link::iter_safe(self.sentinel) {
                Node::free(node);
            }
            link::init(self.sentinel);
        }
    }

    /// Provides the text of the front element, or `None` if the queue is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// assert_eq!(queue.front(), None);
    ///
    /// queue.insert_head("x").unwrap();
    /// assert_eq!(queue.front(), Some("x"));
    /// ```
    pub fn front(&self) -> Option<&str> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the front link of a non-empty queue is an element node.
        Some(unsafe { Node::value(self.front_link()) })
    }

    /// Provides the text of the back element, or `None` if the queue is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// assert_eq!(queue.back(), None);
    ///
    /// queue.insert_head("x").unwrap();
    /// queue.insert_head("y").unwrap();
    /// assert_eq!(queue.back(), Some("x"));
    /// ```
    pub fn back(&self) -> Option<&str> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the back link of a non-empty queue is an element node.
        Some(unsafe { Node::value(self.back_link()) })
    }

    /// Copies `text` into a freshly allocated element and links it at the
    /// front of the queue.
    ///
    /// On error, nothing was linked and nothing leaked.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time (plus the text copy).
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    ///
    /// queue.insert_head("2").unwrap();
    /// assert_eq!(queue.front(), Some("2"));
    ///
    /// queue.insert_head("1").unwrap();
    /// assert_eq!(queue.front(), Some("1"));
    /// ```
    pub fn insert_head(&mut self, text: &str) -> Result<(), QueueError> {
        // SAFETY: the sentinel belongs to the queue.
        unsafe { self.insert_after(self.sentinel, text) }
    }

    /// Copies `text` into a freshly allocated element and links it at the
    /// back of the queue.
    ///
    /// On error, nothing was linked and nothing leaked.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time (plus the text copy).
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queue = Queue::new();
    /// queue.insert_tail("1").unwrap();
    /// queue.insert_tail("3").unwrap();
    /// assert_eq!(queue.back(), Some("3"));
    /// ```
    pub fn insert_tail(&mut self, text: &str) -> Result<(), QueueError> {
        // SAFETY: the back link belongs to the queue.
        unsafe { self.insert_after(self.back_link(), text) }
    }

    /// Unlinks the front element and hands it over, or returns `None` if the
    /// queue is empty.
    ///
    /// If `buf` is given and an element is removed, its text is copied into
    /// `buf`: at most `buf.len() - 1` bytes followed by a NUL byte, silently
    /// truncated. An empty `buf` is never written. If nothing is removed,
    /// `buf` is left untouched.
    ///
    /// The element is not freed; see [`Element::release`].
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time (plus the text copy).
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["gerbil", "bear"]);
    /// let mut buf = [0xff_u8; 4];
    ///
    /// let element = queue.remove_head(Some(&mut buf[..])).unwrap();
    /// assert_eq!(element.value(), "gerbil");
    /// assert_eq!(&buf, b"ger\0");
    /// element.release();
    ///
    /// assert_eq!(queue.remove_head(None).unwrap().value(), "bear");
    /// assert!(queue.remove_head(Some(&mut buf[..])).is_none());
    /// ```
    pub fn remove_head(&mut self, buf: Option<&mut [u8]>) -> Option<Element> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the front link of a non-empty queue is an element node.
        Some(unsafe { self.remove(self.front_link(), buf) })
    }

    /// Unlinks the back element and hands it over, or returns `None` if the
    /// queue is empty.
    ///
    /// `buf` is handled like in [`Queue::remove_head`].
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time (plus the text copy).
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["gerbil", "bear"]);
    /// let mut buf = [0_u8; 16];
    ///
    /// let element = queue.remove_tail(Some(&mut buf[..])).unwrap();
    /// assert_eq!(&buf[..5], b"bear\0");
    /// assert_eq!(element.into_value(), "bear");
    /// assert_eq!(queue.len(), 1);
    /// ```
    pub fn remove_tail(&mut self, buf: Option<&mut [u8]>) -> Option<Element> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the back link of a non-empty queue is an element node.
        Some(unsafe { self.remove(self.back_link(), buf) })
    }

    /// Provides a forward iterator over the texts of the elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let queue = Queue::from_iter(["a", "b", "c"]);
    ///
    /// let mut iter = queue.iter();
    /// assert_eq!(iter.next(), Some("a"));
    /// assert_eq!(iter.next_back(), Some("c"));
    /// assert_eq!(iter.next(), Some("b"));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Moves all elements from `other` to the back of the queue.
    ///
    /// This reuses all the nodes from `other` and moves them into `self`.
    /// After this operation, `other` becomes empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["a"]);
    /// let mut other = Queue::from_iter(["b", "c"]);
    ///
    /// queue.append(&mut other);
    /// assert_eq!(Vec::from_iter(queue.iter()), vec!["a", "b", "c"]);
    /// assert!(other.is_empty());
    /// ```
    pub fn append(&mut self, other: &mut Self) {
        // SAFETY: both sentinels head well-formed rings, and they are
        // different rings since `self` and `other` are both borrowed mutably.
        unsafe { link::splice_tail(other.sentinel, self.sentinel) };
        self.check_ring();
    }

    /// Moves all elements from `other` to the front of the queue.
    ///
    /// After this operation, `other` becomes empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["c"]);
    /// let mut other = Queue::from_iter(["a", "b"]);
    ///
    /// queue.prepend(&mut other);
    /// assert_eq!(Vec::from_iter(queue.iter()), vec!["a", "b", "c"]);
    /// assert!(other.is_empty());
    /// ```
    pub fn prepend(&mut self, other: &mut Self) {
        // SAFETY: see `append`.
        unsafe { link::splice(other.sentinel, self.sentinel) };
        self.check_ring();
    }

    /// Walk the whole ring and check that `x.next.prev == x` and
    /// `x.prev.next == x` hold for every link, the sentinel included.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    pub fn is_well_formed(&self) -> bool {
        // SAFETY: every link reachable from the sentinel is owned by the queue.
        unsafe { link::is_well_formed(self.sentinel) }
    }
}

impl Debug for Queue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: the sentinel was allocated with the layout of `Link` by
        // `try_alloc`, and no node refers to it any more.
        drop(unsafe { Box::from_raw(self.sentinel.as_ptr()) });
    }
}

// The queue exclusively owns its nodes, and every mutation goes through
// `&mut Queue`.
unsafe impl Send for Queue {}

unsafe impl Sync for Queue {}

impl Node {
    /// Create a detached node holding a copy of `text`.
    ///
    /// The node memory is obtained first; if the text buffer cannot be
    /// obtained afterwards, the node memory is returned before reporting.
    pub(crate) fn try_new_detached(text: &str) -> Result<NonNull<Link>, QueueError> {
        let node = try_alloc::<Node>()?;
        let value = match copy_text(text) {
            Ok(value) => value,
            Err(err) => {
                // SAFETY: `node` was just allocated with this layout and holds
                // nothing yet.
                unsafe { alloc::dealloc(node.as_ptr().cast(), Layout::new::<Node>()) };
                return Err(err);
            }
        };
        let link = node.cast::<Link>();
        // SAFETY: `node` is valid for writes, and `link` points to its first
        // field since `Node` is `#[repr(C)]`.
        unsafe {
            node.as_ptr().write(Node {
                link: Link::dangling(),
                value,
            });
            link::init(link);
        }
        Ok(link)
    }

    /// Borrow the text of the node that embeds `link`.
    ///
    /// It is unsafe because `link` must be embedded in a live node (i.e. not
    /// a sentinel), and the returned lifetime is unbounded.
    pub(crate) unsafe fn value<'a>(link: NonNull<Link>) -> &'a str {
        &(*link.cast::<Node>().as_ptr()).value
    }

    /// Free the node that embeds `link`, text buffer first.
    ///
    /// It is unsafe because `link` must be embedded in a live node that no
    /// ring refers to any more (or whose ring is about to be reset).
    pub(crate) unsafe fn free(link: NonNull<Link>) {
        drop(Box::from_raw(link.cast::<Node>().as_ptr()));
    }
}

impl Element {
    /// The text of the element.
    pub fn value(&self) -> &str {
        &self.node.value
    }

    /// Free the node and take its text.
    pub fn into_value(self) -> String {
        let Node { value, .. } = *self.node;
        value.into_string()
    }

    /// Free the element, its text buffer first and then its node.
    ///
    /// Since this consumes the element, it cannot be released twice.
    #[inline]
    pub fn release(self) {
        drop(self)
    }
}

impl AsRef<str> for Element {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

impl Debug for Element {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Element").field(&self.value()).finish()
    }
}

// A removed element is detached, nothing but its owner can reach it.
unsafe impl Send for Element {}

unsafe impl Sync for Element {}

/// Allocate uninitialized memory for a `T`.
fn try_alloc<T>() -> Result<NonNull<T>, QueueError> {
    let layout = Layout::new::<T>();
    // SAFETY: `T` is either `Link` or `Node`, neither is zero-sized.
    let ptr = unsafe { alloc::alloc(layout) };
    NonNull::new(ptr.cast::<T>()).ok_or(QueueError::Alloc { layout })
}

/// Duplicate `text` into a buffer of exactly its length.
fn copy_text(text: &str) -> Result<Box<str>, QueueError> {
    let mut value = String::new();
    value
        .try_reserve_exact(text.len())
        .map_err(|_| QueueError::Alloc {
            layout: Layout::for_value(text),
        })?;
    value.push_str(text);
    Ok(value.into_boxed_str())
}

/// Copy at most `buf.len() - 1` bytes of `value` and a NUL terminator.
fn copy_to_buffer(value: &str, buf: &mut [u8]) {
    let cap = match buf.len().checked_sub(1) {
        Some(cap) => cap,
        None => return,
    };
    let len = value.len().min(cap);
    buf[..len].copy_from_slice(&value.as_bytes()[..len]);
    buf[len] = 0;
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::Queue;
    use std::iter::FromIterator;

    pub(crate) fn queue_eq<'a, I>(queue: &Queue, expected: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        assert!(queue.is_well_formed());
        assert_eq!(Vec::from_iter(queue.iter()), Vec::from_iter(expected));
    }

    #[test]
    fn queue_create() {
        let mut queue = Queue::new();
        assert!(queue.is_empty());
        assert!(!queue.is_singular());
        queue.insert_tail("1").unwrap();
        assert!(!queue.is_empty());
        assert!(queue.is_singular());
        assert_eq!(queue.remove_tail(None).unwrap().into_value(), "1");
        assert!(queue.is_empty());
        assert!(queue.is_well_formed());
    }

    #[test]
    fn queue_insert_and_remove() {
        let mut queue = Queue::new();
        assert_eq!(queue.front(), None);
        assert_eq!(queue.back(), None);
        assert!(queue.remove_head(None).is_none());
        assert!(queue.remove_tail(None).is_none());

        queue.insert_head("1").unwrap();
        queue.insert_head("2").unwrap();
        queue.insert_tail("3").unwrap();
        queue_eq(&queue, ["2", "1", "3"]);
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.remove_head(None).unwrap().value(), "2");
        assert_eq!(queue.remove_tail(None).unwrap().value(), "3");
        assert_eq!(queue.front(), Some("1"));
        assert_eq!(queue.back(), Some("1"));
        assert_eq!(queue.remove_head(None).unwrap().value(), "1");
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn queue_insert_empty_text() {
        let mut queue = Queue::new();
        queue.insert_tail("").unwrap();
        let mut buf = [0xff_u8; 3];
        let element = queue.remove_tail(Some(&mut buf[..])).unwrap();
        assert_eq!(element.value(), "");
        assert_eq!(buf, [0, 0xff, 0xff]);
    }

    #[test]
    fn queue_round_trip() {
        let mut queue = Queue::from_iter(["x", "y"]);
        let text = "a longer string with spaces";
        queue.insert_tail(text).unwrap();
        let mut buf = vec![0_u8; text.len() + 1];
        let element = queue.remove_tail(Some(&mut buf[..])).unwrap();
        assert_eq!(&buf[..text.len()], text.as_bytes());
        assert_eq!(buf[text.len()], 0);
        assert_eq!(element.value(), text);
        element.release();
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn queue_remove_truncates() {
        let mut queue = Queue::from_iter(["abcdef", "abcdef"]);

        let mut buf = [0xff_u8; 4];
        queue.remove_head(Some(&mut buf[..])).unwrap().release();
        assert_eq!(&buf, b"abc\0");

        let mut buf = [0xff_u8; 1];
        queue.remove_head(Some(&mut buf[..])).unwrap().release();
        assert_eq!(buf, [0]);
    }

    #[test]
    fn queue_remove_into_empty_buffer() {
        let mut queue = Queue::from_iter(["abc"]);
        let mut buf = [0xff_u8; 4];
        let element = queue.remove_head(Some(&mut buf[..0])).unwrap();
        assert_eq!(element.value(), "abc");
        assert_eq!(buf, [0xff; 4]);
    }

    #[test]
    fn queue_remove_from_empty_leaves_buffer() {
        let mut queue = Queue::new();
        let mut buf = [0xff_u8; 4];
        assert!(queue.remove_head(Some(&mut buf[..])).is_none());
        assert!(queue.remove_tail(Some(&mut buf[..])).is_none());
        assert_eq!(buf, [0xff; 4]);
    }

    #[test]
    fn queue_clear_and_reuse() {
        let mut queue = Queue::from_iter(["a", "b", "c"]);
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.is_well_formed());
        queue.insert_head("d").unwrap();
        queue_eq(&queue, ["d"]);
    }

    #[test]
    fn queue_append_and_prepend() {
        let mut queue = Queue::from_iter(["b"]);
        let mut other = Queue::from_iter(["c", "d"]);
        queue.append(&mut other);
        assert!(other.is_empty());
        queue_eq(&queue, ["b", "c", "d"]);

        let mut other = Queue::from_iter(["a"]);
        queue.prepend(&mut other);
        queue_eq(&queue, ["a", "b", "c", "d"]);

        let mut empty = Queue::new();
        queue.append(&mut empty);
        queue.prepend(&mut empty);
        assert_eq!(queue.len(), 4);

        other.append(&mut queue);
        assert!(queue.is_empty());
        queue_eq(&other, ["a", "b", "c", "d"]);
    }

    #[test]
    fn queue_debug() {
        let queue = Queue::from_iter(["a", "b"]);
        assert_eq!(format!("{:?}", queue), r#"["a", "b"]"#);
        let mut queue = queue;
        let element = queue.remove_head(None).unwrap();
        assert_eq!(format!("{:?}", element), r#"Element("a")"#);
    }
}
