use crate::link;
use crate::queue::{Node, Queue};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::mem;

mod sort;

impl PartialEq for Queue {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other)
    }
}

impl Eq for Queue {}

impl PartialOrd for Queue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queue {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other)
    }
}

impl Clone for Queue {
    fn clone(&self) -> Self {
        self.iter().collect()
    }
}

impl Hash for Queue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut len = 0_usize;
        for text in self {
            text.hash(state);
            len += 1;
        }
        len.hash(state);
    }
}

impl Queue {
    /// Deletes the middle element, i.e. the ⌊*n* / 2⌋-th one (0-indexed)
    /// of a queue with *n* elements, and frees it.
    ///
    /// Returns `false` if the queue is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["a", "b", "c", "d", "e", "f"]);
    ///
    /// assert!(queue.delete_mid());
    /// assert_eq!(Vec::from_iter(queue), vec!["a", "b", "c", "e", "f"]);
    /// ```
    pub fn delete_mid(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        // SAFETY: the middle of a non-empty queue is an element node.
        unsafe {
            let mid = link::find_mid(self.sentinel());
            let (prev, next) = (mid.as_ref().prev, mid.as_ref().next);
            link::connect(prev, next);
            Node::free(mid);
        }
        self.check_ring();
        true
    }

    /// Deletes every element whose text equals its neighbour's, assuming the
    /// queue is sorted ascending. Every run of two or more equal texts is
    /// deleted entirely; texts that occur once are kept.
    ///
    /// Returns the number of elements deleted.
    ///
    /// The order is not validated. On a queue that is not sorted, only
    /// adjacent equal texts are deleted.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["a", "a", "b", "c", "c"]);
    ///
    /// assert_eq!(queue.delete_dup(), 4);
    /// assert_eq!(Vec::from_iter(queue), vec!["b"]);
    /// ```
    pub fn delete_dup(&mut self) -> usize {
        let sentinel = self.sentinel();
        let mut deleted = 0;
        // SAFETY: `current..run_end` is a range of element nodes in the ring,
        // it is bypassed before its nodes are freed, and `run_end` is never
        // freed here.
        unsafe {
            let mut current = sentinel.as_ref().next;
            while current != sentinel {
                let value = Node::value(current);
                let mut run_end = current.as_ref().next;
                while run_end != sentinel && Node::value(run_end) == value {
                    run_end = run_end.as_ref().next;
                }
                if run_end != current.as_ref().next {
                    link::connect(current.as_ref().prev, run_end);
                    let mut node = current;
                    while node != run_end {
                        let next = node.as_ref().next;
                        Node::free(node);
                        node = next;
                        deleted += 1;
                    }
                }
                current = run_end;
            }
        }
        if deleted > 0 {
            log::trace!("deleted {} duplicated elements", deleted);
        }
        self.check_ring();
        deleted
    }

    /// Swaps every two adjacent elements, front to back, by relinking their
    /// nodes. With an odd number of elements, the last one stays in place.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["1", "2", "3", "4", "5"]);
    ///
    /// queue.swap_pairs();
    /// assert_eq!(Vec::from_iter(queue), vec!["2", "1", "4", "3", "5"]);
    /// ```
    pub fn swap_pairs(&mut self) {
        let sentinel = self.sentinel();
        let mut swapped = 0_usize;
        // SAFETY: `first` and `second` are adjacent element nodes, and
        // `prev`, `next` are their valid neighbours (possibly the sentinel).
        unsafe {
            let mut first = sentinel.as_ref().next;
            while first != sentinel && first.as_ref().next != sentinel {
                let second = first.as_ref().next;
                let (prev, next) = (first.as_ref().prev, second.as_ref().next);
                link::connect(prev, second);
                link::connect(second, first);
                link::connect(first, next);
                first = next;
                swapped += 1;
            }
        }
        if swapped > 0 {
            log::trace!("swapped {} pairs", swapped);
        }
        self.check_ring();
    }

    /// Reverses the order of the elements in place, by exchanging `prev` and
    /// `next` of every link, the sentinel included. Nothing is allocated or
    /// freed.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["1", "2", "3"]);
    ///
    /// queue.reverse();
    /// assert_eq!(Vec::from_iter(queue), vec!["3", "2", "1"]);
    /// ```
    pub fn reverse(&mut self) {
        let sentinel = self.sentinel();
        // SAFETY: the iteration captures `next` before the links of the
        // yielded node are exchanged.
        unsafe {
            for mut node in link::iter_safe(sentinel).chain(Some(sentinel)) {
                let node = node.as_mut();
                mem::swap(&mut node.next, &mut node.prev);
            }
        }
        self.check_ring();
    }

    /// Sorts the queue ascending by the bytes of the texts.
    ///
    /// This sort is stable (i.e., does not reorder equal elements).
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n* * log(*n*)) time and *O*(1)
    /// memory.
    ///
    /// # Current Implementation
    ///
    /// The current algorithm is a bottom-up merge sort. Nodes are relinked,
    /// never copied, and the pending sorted runs are chained through the
    /// `prev` links of their first nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["banana", "apple", "cherry"]);
    ///
    /// queue.sort();
    /// assert_eq!(Vec::from_iter(queue), vec!["apple", "banana", "cherry"]);
    /// ```
    pub fn sort(&mut self) {
        self.sort_by(bytewise);
    }

    /// Sorts the queue with a comparator function.
    ///
    /// This sort is stable (i.e., does not reorder equal elements).
    ///
    /// The comparator function must define a total ordering for the
    /// texts in the queue. If the ordering is not total, the order
    /// of the elements is unspecified.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n* * log(*n*)) time and *O*(1)
    /// memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["ccc", "a", "bb", "b"]);
    ///
    /// // sort by length, equal lengths keep their order
    /// queue.sort_by(|a, b| a.len().cmp(&b.len()));
    /// assert_eq!(Vec::from_iter(queue.iter()), vec!["a", "b", "bb", "ccc"]);
    ///
    /// // reverse sorting
    /// queue.sort_by(|a, b| b.cmp(a));
    /// assert_eq!(Vec::from_iter(queue), vec!["ccc", "bb", "b", "a"]);
    /// ```
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&str, &str) -> Ordering,
    {
        if self.is_empty() || self.is_singular() {
            return;
        }
        // SAFETY: the queue holds at least two element nodes.
        unsafe { sort::merge_sort(self.sentinel(), &mut compare) };
        self.check_ring();
    }

    /// Sorts the queue ascending by the bytes of the texts, with a quicksort.
    ///
    /// This sort is unstable (i.e., may reorder equal elements). Equal texts
    /// are indistinguishable by value, so this only matters to holders of
    /// node addresses.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n* * log(*n*)) time on average,
    /// with at most *O*(log(*n*)) recursion depth.
    ///
    /// # Current Implementation
    ///
    /// The pivot is the median of the first, middle and last elements. The
    /// nodes are moved into three temporary rings, less than, equal to and
    /// greater than the pivot, which are spliced back in order. Only the
    /// smaller outer part is sorted recursively, the larger one iteratively.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::iter::FromIterator;
    ///
    /// let mut queue = Queue::from_iter(["d", "a", "c", "b", "a"]);
    ///
    /// queue.sort_unstable();
    /// assert_eq!(Vec::from_iter(queue), vec!["a", "a", "b", "c", "d"]);
    /// ```
    pub fn sort_unstable(&mut self) {
        // SAFETY: the sentinel heads a well-formed ring of element nodes.
        unsafe { sort::quick_sort(self.sentinel(), &mut bytewise) };
        self.check_ring();
    }
}

fn bytewise(a: &str, b: &str) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

#[cfg(test)]
mod tests {
    use crate::queue::tests::queue_eq;
    use crate::Queue;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::iter::FromIterator;

    #[test]
    fn queue_delete_mid() {
        fn test_delete_mid(input: &[&str], expected: &[&str]) {
            let mut queue = Queue::from_iter(input);
            assert_eq!(queue.delete_mid(), !input.is_empty());
            queue_eq(&queue, expected.iter().copied());
        }
        test_delete_mid(&[], &[]);
        test_delete_mid(&["a"], &[]);
        test_delete_mid(&["a", "b"], &["a"]);
        test_delete_mid(&["a", "b", "c"], &["a", "c"]);
        test_delete_mid(&["a", "b", "c", "d", "e"], &["a", "b", "d", "e"]);
        test_delete_mid(&["a", "b", "c", "d", "e", "f"], &["a", "b", "c", "e", "f"]);
    }

    #[test]
    fn queue_delete_dup() {
        fn test_delete_dup(input: &[&str], expected: &[&str]) {
            let mut queue = Queue::from_iter(input);
            assert_eq!(queue.delete_dup(), input.len() - expected.len());
            queue_eq(&queue, expected.iter().copied());
        }
        test_delete_dup(&[], &[]);
        test_delete_dup(&["a"], &["a"]);
        test_delete_dup(&["a", "a"], &[]);
        test_delete_dup(&["a", "a", "b", "c", "c"], &["b"]);
        test_delete_dup(&["a", "a", "b", "b", "b", "c"], &["c"]);
        test_delete_dup(&["a", "b", "c"], &["a", "b", "c"]);
        // a run reaching the last element
        test_delete_dup(&["a", "b", "b", "b"], &["a"]);
        test_delete_dup(&["x", "x", "x", "x"], &[]);
        // "" and "a" differ, "a" and "ab" differ
        test_delete_dup(&["", "", "a", "ab", "ab"], &["a"]);
    }

    #[test]
    fn queue_swap_pairs() {
        fn test_swap_pairs(input: &[&str], expected: &[&str]) {
            let mut queue = Queue::from_iter(input);
            queue.swap_pairs();
            queue_eq(&queue, expected.iter().copied());
        }
        test_swap_pairs(&[], &[]);
        test_swap_pairs(&["1"], &["1"]);
        test_swap_pairs(&["1", "2"], &["2", "1"]);
        test_swap_pairs(&["1", "2", "3", "4"], &["2", "1", "4", "3"]);
        test_swap_pairs(&["1", "2", "3", "4", "5"], &["2", "1", "4", "3", "5"]);
    }

    #[test]
    fn queue_reverse() {
        for n in 0..8 {
            let texts: Vec<String> = (0..n).map(|i| i.to_string()).collect();
            let mut queue = Queue::from_iter(&texts);
            let original = queue.clone();
            queue.reverse();
            assert!(queue.is_well_formed());
            assert!(queue.iter().eq(texts.iter().rev().map(String::as_str)));
            queue.reverse();
            assert_eq!(queue, original);
        }
    }

    #[test]
    fn queue_sort() {
        fn test_sort(input: &[&str], expected: &[&str]) {
            let mut queue = Queue::from_iter(input);
            queue.sort();
            queue_eq(&queue, expected.iter().copied());

            let mut queue = Queue::from_iter(input);
            queue.sort_unstable();
            queue_eq(&queue, expected.iter().copied());
        }
        test_sort(&[], &[]);
        test_sort(&["a"], &["a"]);
        test_sort(&["b", "a"], &["a", "b"]);
        test_sort(&["banana", "apple", "cherry"], &["apple", "banana", "cherry"]);
        test_sort(&["c", "b", "a", "c", "a"], &["a", "a", "b", "c", "c"]);
        test_sort(&["B", "a", "A", "b"], &["A", "B", "a", "b"]);
        test_sort(&["ab", "a", "", "abc"], &["", "a", "ab", "abc"]);
    }

    #[test]
    fn queue_sort_idempotent() {
        let texts: Vec<String> = (0..100).map(|i| ((i * 37) % 23).to_string()).collect();
        let mut queue = Queue::from_iter(&texts);
        queue.sort();
        let once = queue.clone();
        queue.sort();
        assert_eq!(queue, once);
        queue.sort_unstable();
        assert_eq!(queue, once);
    }

    #[test]
    fn queue_sort_stable() {
        // sort by the first byte only, ties must keep their input order
        let mut queue = Queue::from_iter(["b2", "a1", "b1", "a3", "a2", "c1", "b3"]);
        queue.sort_by(|a, b| a.as_bytes()[0].cmp(&b.as_bytes()[0]));
        queue_eq(&queue, ["a1", "a3", "a2", "b2", "b1", "b3", "c1"]);
    }

    #[test]
    fn queue_eq_and_hash() {
        fn hash(queue: &Queue) -> u64 {
            let mut hasher = DefaultHasher::new();
            queue.hash(&mut hasher);
            hasher.finish()
        }
        let queue = Queue::from_iter(["a", "b"]);
        let cloned = queue.clone();
        assert_eq!(queue, cloned);
        assert_eq!(hash(&queue), hash(&cloned));
        assert_ne!(queue, Queue::from_iter(["a"]));
        assert!(Queue::from_iter(["a"]) < queue);
        assert!(Queue::new() < Queue::from_iter([""]));
    }
}
