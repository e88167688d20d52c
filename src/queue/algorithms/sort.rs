use crate::link::{self, Link};
use crate::queue::Node;
use std::cmp::Ordering;
use std::ptr::{self, NonNull};

/// Sort the element nodes of `ring` with a bottom-up merge sort.
///
/// While sorting, the ring is cut open: the `next` links of every run form a
/// forward sequence terminated by the sentinel, and the `prev` link of the
/// first node of a run points to the previous pending run. The sentinel is
/// the bottom of this stack of pending runs.
///
/// Pending runs have power-of-two sizes, and two runs of the same size are
/// merged as soon as a third one follows them, which keeps the merges
/// balanced (at worst 2:1) without knowing the length upfront.
///
/// # Safety
///
/// `ring` must be the sentinel of a well-formed ring of at least two element
/// nodes.
pub(super) unsafe fn merge_sort<F>(ring: NonNull<Link>, compare: &mut F)
where
    F: FnMut(&str, &str) -> Ordering,
{
    let nil = ring;
    let mut list = ring.as_ref().next;
    let mut pending = nil;
    let mut count = 0_usize;
    let mut merges = 0_usize;

    while list != nil {
        // Find the run to merge: each trailing one bit of `count` stands for
        // a run that must wait for its sibling.
        let mut tail: *mut NonNull<Link> = &mut pending;
        let mut bits = count;
        while bits & 1 == 1 {
            tail = ptr::addr_of_mut!((*(*tail).as_ptr()).prev);
            bits >>= 1;
        }
        if bits != 0 {
            let newer = *tail;
            let older = newer.as_ref().prev;
            let mut merged = merge(compare, nil, older, newer);
            merged.as_mut().prev = older.as_ref().prev;
            *tail = merged;
            merges += 1;
        }

        // Push the next node as a run of one.
        let mut node = list;
        list = list.as_ref().next;
        node.as_mut().prev = pending;
        node.as_mut().next = nil;
        pending = node;
        count += 1;
    }

    // Merge all the pending runs, the most recent first.
    let mut list = pending;
    let mut pending = list.as_ref().prev;
    loop {
        let older = pending.as_ref().prev;
        if older == nil {
            break;
        }
        list = merge(compare, nil, pending, list);
        pending = older;
        merges += 1;
    }
    let list = merge(compare, nil, pending, list);
    merges += 1;

    // Restore the `prev` links and close the ring.
    let mut prev = ring;
    let mut node = list;
    while node != nil {
        node.as_mut().prev = prev;
        prev = node;
        node = node.as_ref().next;
    }
    link::connect(ring, list);
    link::connect(prev, ring);

    log::trace!("merge sort: {} nodes, {} merges", count, merges);
}

/// Merge the runs `a` and `b`, both terminated by `nil` and `a` being the
/// older one, then return the front of the merged run.
///
/// Only `next` links are written. Ties are taken from `a`.
unsafe fn merge<F>(
    compare: &mut F,
    nil: NonNull<Link>,
    mut a: NonNull<Link>,
    mut b: NonNull<Link>,
) -> NonNull<Link>
where
    F: FnMut(&str, &str) -> Ordering,
{
    let mut front = nil;
    let mut tail: *mut NonNull<Link> = &mut front;
    loop {
        if compare(Node::value(a), Node::value(b)) != Ordering::Greater {
            *tail = a;
            tail = ptr::addr_of_mut!((*a.as_ptr()).next);
            a = a.as_ref().next;
            if a == nil {
                *tail = b;
                break;
            }
        } else {
            *tail = b;
            tail = ptr::addr_of_mut!((*b.as_ptr()).next);
            b = b.as_ref().next;
            if b == nil {
                *tail = a;
                break;
            }
        }
    }
    front
}

/// Sort the element nodes of `ring` with a quicksort.
///
/// # Safety
///
/// `ring` must be the sentinel of a well-formed ring of element nodes.
pub(super) unsafe fn quick_sort<F>(ring: NonNull<Link>, compare: &mut F)
where
    F: FnMut(&str, &str) -> Ordering,
{
    quick_sort_between(ring, ring, compare);
}

/// Sort the element nodes strictly between `before` and `after`.
///
/// The range is cut out into a temporary ring, its pivot is picked, and its
/// nodes are partitioned into three temporary rings (less than, equal to,
/// and greater than the pivot) living on the stack. The three are spliced
/// back in order between `before` and `after`; the nodes equal to the pivot
/// are already in place. The smaller side is sorted recursively and the
/// larger one by the next round of the loop, so the recursion is at most
/// log2(*n*) deep.
///
/// # Safety
///
/// `before` and `after` must belong to the same well-formed ring, with only
/// element nodes from `before.next` up to `after.prev`. They may be the
/// same link (i.e. the sentinel, for the whole ring).
unsafe fn quick_sort_between<F>(
    mut before: NonNull<Link>,
    mut after: NonNull<Link>,
    compare: &mut F,
) where
    F: FnMut(&str, &str) -> Ordering,
{
    loop {
        let first = before.as_ref().next;
        if first == after || first.as_ref().next == after {
            return;
        }
        let last = after.as_ref().prev;

        let mut work = Link::dangling();
        let work = NonNull::from(&mut work);
        link::connect(before, after);
        link::connect(work, first);
        link::connect(last, work);

        let mut less = Link::dangling();
        let less = NonNull::from(&mut less);
        link::init(less);
        let mut equal = Link::dangling();
        let equal = NonNull::from(&mut equal);
        link::init(equal);
        let mut greater = Link::dangling();
        let greater = NonNull::from(&mut greater);
        link::init(greater);

        let pivot = median_of_three(work, compare);
        link::move_tail(pivot, equal);
        let pivot_value = Node::value(pivot);
        let (mut less_len, mut greater_len) = (0_usize, 0_usize);
        for node in link::iter_safe(work) {
            match compare(Node::value(node), pivot_value) {
                Ordering::Less => {
                    link::move_tail(node, less);
                    less_len += 1;
                }
                Ordering::Equal => link::move_tail(node, equal),
                Ordering::Greater => {
                    link::move_tail(node, greater);
                    greater_len += 1;
                }
            }
        }

        let (first_equal, last_equal) = (equal.as_ref().next, equal.as_ref().prev);
        link::splice_tail(less, after);
        link::splice_tail(equal, after);
        link::splice_tail(greater, after);

        if less_len < greater_len {
            quick_sort_between(before, first_equal, compare);
            before = last_equal;
        } else {
            quick_sort_between(last_equal, after, compare);
            after = first_equal;
        }
    }
}

/// Pick the median of the first, middle and last element nodes.
unsafe fn median_of_three<F>(ring: NonNull<Link>, compare: &mut F) -> NonNull<Link>
where
    F: FnMut(&str, &str) -> Ordering,
{
    let (first, mid, last) = (ring.as_ref().next, link::find_mid(ring), ring.as_ref().prev);
    let (a, b, c) = (Node::value(first), Node::value(mid), Node::value(last));
    let not_greater = |ord: Ordering| ord != Ordering::Greater;

    if not_greater(compare(a, b)) == not_greater(compare(b, c)) {
        mid
    } else if not_greater(compare(b, a)) == not_greater(compare(a, c)) {
        first
    } else {
        last
    }
}

#[cfg(test)]
mod tests {
    use crate::queue::tests::queue_eq;
    use crate::Queue;
    use proptest::prelude::*;
    use std::iter::FromIterator;

    fn first_byte(a: &str, b: &str) -> std::cmp::Ordering {
        a.bytes().next().cmp(&b.bytes().next())
    }

    #[test]
    fn merge_sort_small() {
        for input in [
            &[][..],
            &["a"][..],
            &["b", "a"][..],
            &["a", "b"][..],
            &["c", "a", "b"][..],
            &["b", "b", "a", "a"][..],
            &["e", "d", "c", "b", "a"][..],
        ] {
            let mut queue = Queue::from_iter(input);
            queue.sort();
            let mut expected = input.to_vec();
            expected.sort();
            queue_eq(&queue, expected);
            assert!(queue.is_well_formed());
        }
    }

    #[test]
    fn merge_sort_keeps_ties_in_order() {
        let input: Vec<String> = (0..100_u8)
            .map(|i| format!("{}{}", (b'a' + i % 5 * 3 % 5) as char, i))
            .collect();
        let mut queue = Queue::from_iter(&input);
        queue.sort_by(first_byte);

        let mut expected = input.clone();
        expected.sort_by(|a, b| first_byte(a, b));
        assert!(queue.iter().eq(expected.iter().map(String::as_str)));
    }

    #[test]
    fn quick_sort_small() {
        for input in [
            &[][..],
            &["a"][..],
            &["a", "a"][..],
            &["b", "a", "c"][..],
            &["c", "b", "a", "b", "c"][..],
        ] {
            let mut queue = Queue::from_iter(input);
            queue.sort_unstable();
            let mut expected = input.to_vec();
            expected.sort();
            queue_eq(&queue, expected);
            assert!(queue.is_well_formed());
        }
    }

    #[test]
    fn quick_sort_all_equal() {
        let mut queue = Queue::new();
        for _ in 0..200_000 {
            queue.insert_tail("same").unwrap();
        }
        queue.sort_unstable();
        assert_eq!(queue.len(), 200_000);
        assert!(queue.iter().all(|text| text == "same"));
        assert!(queue.is_well_formed());
    }

    #[test]
    fn quick_sort_presorted() {
        let ascending: Vec<String> = (0..100_000).map(|i| format!("{:06}", i)).collect();

        let mut queue = Queue::from_iter(&ascending);
        queue.sort_unstable();
        assert!(queue.iter().eq(ascending.iter().map(String::as_str)));

        let mut queue = Queue::from_iter(ascending.iter().rev());
        queue.sort_unstable();
        assert!(queue.iter().eq(ascending.iter().map(String::as_str)));
        assert!(queue.is_well_formed());
    }

    #[test]
    fn quick_sort_few_distinct() {
        let input: Vec<&str> = (0..50_000).map(|i| ["b", "a", "c"][i % 3]).collect();
        let mut queue = Queue::from_iter(&input);
        queue.sort_unstable();

        let mut expected = input.clone();
        expected.sort();
        queue_eq(&queue, expected);
    }

    proptest! {
        #[test]
        fn merge_sort_matches_slice_sort(input in prop::collection::vec("[a-d]{0,3}", 0..200)) {
            let mut queue = Queue::from_iter(&input);
            queue.sort_by(first_byte);

            let mut expected = input.clone();
            expected.sort_by(|a, b| first_byte(a, b));
            prop_assert!(queue.iter().eq(expected.iter().map(String::as_str)));
            prop_assert!(queue.is_well_formed());
            prop_assert!(queue.iter().rev().eq(expected.iter().rev().map(String::as_str)));
        }

        #[test]
        fn quick_sort_matches_slice_sort(input in prop::collection::vec("[a-d]{0,3}", 0..200)) {
            let mut queue = Queue::from_iter(&input);
            queue.sort_unstable();

            let mut expected = input.clone();
            expected.sort();
            prop_assert!(queue.iter().eq(expected.iter().map(String::as_str)));
            prop_assert!(queue.is_well_formed());
        }
    }
}
