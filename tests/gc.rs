//! Heap allocation and GC compaction under pressure (C3, §4.3), exercised
//! through the public `Heap`/`gc` API the way `object::codec::CodecWalker`
//! does internally.

use db48x::heap::gc::{self, ObjectWalker};
use db48x::heap::protect::ProtectedList;
use db48x::heap::Heap;

/// Every object here is a fixed-size 8-byte blob with no children, enough
/// to drive allocation/compaction without needing the object codec
/// (private to its own crate module) wired in from outside the crate.
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
fn allocation_triggers_gc_when_headroom_runs_low() {
    let mut heap = Heap::new(64);
    let walker = FixedSizeWalker(8);
    let protected = ProtectedList::new();

    // Fill most of the heap with garbage, keeping only the last allocation
    // reachable from the stack.
    let mut last = None;
    for _ in 0..4 {
        let at = heap
            .allocate(8, |h| {
                let _ = gc::collect(h, &walker, &ProtectedList::new());
            })
            .unwrap();
        last = Some(at);
    }
    heap.push_stack(last.unwrap());

    let reclaimed = gc::collect(&mut heap, &walker, &protected);
    assert!(reclaimed > 0, "earlier garbage allocations should have been reclaimed");
    assert_eq!(heap.stack_depth(), 1);
}

#[test]
fn protected_offsets_survive_compaction_even_off_stack() {
    let mut heap = Heap::new(128);
    let walker = FixedSizeWalker(8);
    let protected = ProtectedList::new();

    let garbage = heap.allocate(8, |_| {}).unwrap();
    let guarded = heap.allocate(8, |_| {}).unwrap();
    let kept = heap.allocate(8, |_| {}).unwrap();
    heap.push_stack(kept);

    let guard = protected.protect(guarded);
    let reclaimed = gc::collect(&mut heap, &walker, &protected);

    // garbage's 8 bytes were reclaimed; guarded + kept (16 bytes) remain.
    assert_eq!(reclaimed, 8);
    assert_eq!(heap.temporaries_end(), 16);
    assert_eq!(guard.offset(), 0, "guarded object compacts down to the front");
    let _ = garbage;
}

#[test]
fn repeated_collections_on_an_empty_live_set_are_idempotent() {
    let mut heap = Heap::new(32);
    let walker = FixedSizeWalker(8);
    let protected = ProtectedList::new();

    heap.allocate(8, |_| {}).unwrap();
    heap.allocate(8, |_| {}).unwrap();

    let first = gc::collect(&mut heap, &walker, &protected);
    let second = gc::collect(&mut heap, &walker, &protected);

    assert_eq!(first, 16);
    assert_eq!(second, 0);
    assert_eq!(heap.temporaries_end(), 0);
}
