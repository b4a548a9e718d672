//! Compacting collection over the temporaries region (§4.3).
//!
//! Mark phase walks roots kind-aware via a supplied [`ObjectWalker`] (the
//! object codec, C2, implements this); compact phase slides live objects
//! down to fill gaps and rewrites every root and protected-pointer offset
//! through a forwarding table.

use super::protect::ProtectedList;
use super::Heap;
use std::collections::HashMap;

/// Bridges the heap to kind-aware child discovery without this module
/// depending on the object/codec layer (C2), decoupling the GC mechanism
/// from per-kind payload shape.
pub trait ObjectWalker {
    /// Total encoded length of the object whose kind tag starts at
    /// `offset` (§3.1: "the object knows its own total byte length").
    fn size_at(&self, heap: &Heap, offset: usize) -> usize;

    /// Offsets of any child object references inside this object's
    /// payload (empty for numbers, text, grob; non-empty for containers,
    /// §4.3 mark phase).
    fn children_at(&self, heap: &Heap, offset: usize) -> Vec<usize>;
}

/// Runs one collection: mark every object reachable from the stack,
/// return stack, and protected pointers, then compact live objects to
/// the front of the temporaries region, rewriting every reference
/// through the resulting forwarding table. Returns the number of bytes
/// reclaimed.
pub fn collect(heap: &mut Heap, walker: &impl ObjectWalker, protected: &ProtectedList) -> usize {
    let live = mark(heap, walker, protected);
    compact(heap, walker, &live, protected)
}

fn mark(heap: &Heap, walker: &impl ObjectWalker, protected: &ProtectedList) -> Vec<bool> {
    let mut reachable = vec![false; heap.temporaries_end()];
    let mut worklist: Vec<usize> = heap.roots().chain(protected.offsets()).collect();
    while let Some(offset) = worklist.pop() {
        if offset >= heap.globals_end() && offset < reachable.len() && !reachable[offset] {
            reachable[offset] = true;
            worklist.extend(walker.children_at(heap, offset));
        }
    }
    reachable
}

fn compact(
    heap: &mut Heap,
    walker: &impl ObjectWalker,
    live: &[bool],
    protected: &ProtectedList,
) -> usize {
    let globals_end = heap.globals_end();
    let temporaries_end = heap.temporaries_end();
    let mut forwarding: HashMap<usize, usize> = HashMap::new();
    let mut write_cursor = globals_end;
    let mut read_cursor = globals_end;
    let reclaimed_before = temporaries_end - globals_end;

    while read_cursor < temporaries_end {
        let size = walker.size_at(heap, read_cursor);
        if live.get(read_cursor).copied().unwrap_or(false) {
            if write_cursor != read_cursor {
                let bytes = heap.read(read_cursor, size).to_vec();
                heap.write(write_cursor, &bytes);
                forwarding.insert(read_cursor, write_cursor);
            }
            write_cursor += size;
        }
        read_cursor += size;
    }

    heap.truncate_temporaries(write_cursor);

    for slot in heap.roots_mut() {
        if let Some(&new_offset) = forwarding.get(slot) {
            *slot = new_offset;
        }
    }
    protected.relocate(&forwarding);

    reclaimed_before - (write_cursor - globals_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A trivial walker for fixed-size, childless objects, enough to
    /// exercise mark/compact mechanics without the full object codec.
    struct FixedSizeWalker(usize);

    impl ObjectWalker for FixedSizeWalker {
        fn size_at(&self, _heap: &Heap, _offset: usize) -> usize {
            self.0
        }

        fn children_at(&self, _heap: &Heap, _offset: usize) -> Vec<usize> {
            Vec::new()
        }
    }

    #[test]
    fn unreachable_temporaries_are_reclaimed() {
        let mut heap = Heap::new(256);
        let walker = FixedSizeWalker(8);
        let a = heap.allocate(8, |_| {}).unwrap();
        let b = heap.allocate(8, |_| {}).unwrap();
        heap.push_stack(b); // only b is reachable; a is garbage
        let protected = ProtectedList::new();

        let reclaimed = collect(&mut heap, &walker, &protected);

        assert_eq!(reclaimed, 8);
        assert_eq!(heap.temporaries_end(), 8);
        assert_eq!(heap.stack_at(0), Some(0));
        let _ = a;
    }

    #[test]
    fn reachable_objects_survive_compaction() {
        let mut heap = Heap::new(256);
        let walker = FixedSizeWalker(8);
        let a = heap.allocate(8, |_| {}).unwrap();
        let b = heap.allocate(8, |_| {}).unwrap();
        heap.push_stack(a);
        heap.push_stack(b);
        let protected = ProtectedList::new();

        let reclaimed = collect(&mut heap, &walker, &protected);

        assert_eq!(reclaimed, 0);
        assert_eq!(heap.temporaries_end(), 16);
    }
}
