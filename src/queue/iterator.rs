use crate::link::{self, Links};
use crate::queue::{Element, Node, Queue};
use std::alloc;
use std::fmt;
use std::iter::{FromIterator, FusedIterator};

/// An iterator over the texts of the elements of a `Queue`.
///
/// Though the `Iter` does not hold a reference to the queue, it actually
/// *borrows* (immutably) from it, which keeps the ring from being rewired
/// during the iteration.
///
/// # Examples
///
/// ```compile_fail
/// use cyclic_queue::Queue;
/// use std::iter::FromIterator;
///
/// let mut queue = Queue::from_iter(["a", "b"]);
/// let mut iter = queue.iter();
///
/// // Won't compile, because the queue is already borrowed immutably.
/// queue.reverse();
/// println!("{:?}", iter.next());
/// ```
#[derive(Clone)]
pub struct Iter<'a> {
    links: Links<'a>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(queue: &'a Queue) -> Self {
        // SAFETY: the ring stays untouched while `queue` is borrowed.
        let links = unsafe { link::iter(queue.sentinel()) };
        Self { links }
    }
}

impl<'a> fmt::Debug for Iter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.clone().collect::<Vec<_>>()).finish()
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        // SAFETY: `links` never yields the sentinel, only element nodes.
        self.links.next().map(|link| unsafe { Node::value(link) })
    }

    fn last(mut self) -> Option<Self::Item>
    where
        Self: Sized,
    {
        self.next_back()
    }
}

impl<'a> DoubleEndedIterator for Iter<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        // SAFETY: `links` never yields the sentinel, only element nodes.
        self.links.next_back().map(|link| unsafe { Node::value(link) })
    }
}

impl<'a> FusedIterator for Iter<'a> {}

/// An owning iterator over the texts of the elements of a `Queue`.
///
/// This `struct` is created by the [`into_iter`] method on [`Queue`]
/// (provided by the `IntoIterator` trait).
///
/// [`into_iter`]: Queue::into_iter
pub struct IntoIter {
    queue: Queue,
}

impl fmt::Debug for IntoIter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter")
            .field("queue", &self.queue)
            .finish()
    }
}

impl Iterator for IntoIter {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.remove_head(None).map(Element::into_value)
    }

    fn last(mut self) -> Option<Self::Item>
    where
        Self: Sized,
    {
        self.next_back()
    }
}

impl DoubleEndedIterator for IntoIter {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.queue.remove_tail(None).map(Element::into_value)
    }
}

impl FusedIterator for IntoIter {}

impl IntoIterator for Queue {
    type Item = String;
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { queue: self }
    }
}

impl<'a> IntoIterator for &'a Queue {
    type Item = &'a str;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Queue {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut queue = Queue::new();
        queue.extend(iter);
        queue
    }
}

/// Appends every text at the back of the queue.
///
/// Allocation failure is handled like in the std collections, through
/// [`std::alloc::handle_alloc_error`]. Use [`Queue::insert_tail`] to handle
/// it instead.
impl<S: AsRef<str>> Extend<S> for Queue {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for text in iter {
            if let Err(err) = self.insert_tail(text.as_ref()) {
                alloc::handle_alloc_error(err.layout());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Queue;
    use std::iter::FromIterator;

    #[test]
    fn queue_iter() {
        let texts = ["a", "b", "c", "d"];
        let queue = Queue::from_iter(texts.iter());
        assert!(queue.iter().eq(texts.iter().copied()));
        assert!(queue.iter().rev().eq(texts.iter().rev().copied()));

        for mid in 0..=texts.len() {
            let mut iter = queue.iter();
            for &text in &texts[..mid] {
                assert_eq!(iter.next(), Some(text));
            }
            for &text in texts[mid..].iter().rev() {
                assert_eq!(iter.next_back(), Some(text));
            }
            assert_eq!(iter.next(), None);
            assert_eq!(iter.next_back(), None);
        }
        assert_eq!(queue.iter().last(), Some("d"));
        assert_eq!(Queue::new().iter().next(), None);
    }

    #[test]
    fn queue_into_iter() {
        let queue = Queue::from_iter(vec![String::from("x"), String::from("y"), String::from("z")]);
        let mut iter = queue.into_iter();
        assert_eq!(iter.next_back().as_deref(), Some("z"));
        assert_eq!(iter.next().as_deref(), Some("x"));
        assert_eq!(iter.next().as_deref(), Some("y"));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn queue_extend() {
        let mut queue = Queue::from_iter(["a"]);
        queue.extend(["b", "c"]);
        let owned: Vec<String> = queue.into_iter().collect();
        assert_eq!(owned, vec!["a", "b", "c"]);
    }

    #[test]
    fn queue_iter_debug() {
        let queue = Queue::from_iter(["a", "b"]);
        let mut iter = queue.iter();
        iter.next();
        assert_eq!(format!("{:?}", iter), r#"Iter(["b"])"#);
    }
}
