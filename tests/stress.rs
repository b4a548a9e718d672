//! Larger structural inputs: deep programs, wide lists/arrays, and
//! repeated GC pressure, beyond what the per-module unit tests cover.

use db48x::heap::gc;
use db48x::heap::gc::ObjectWalker;
use db48x::heap::protect::ProtectedList;
use db48x::heap::Heap;
use db48x::object::Object;
use db48x::parser::{self, renderer};
use db48x::{Directory, Evaluator};

#[test]
fn a_long_chain_of_additions_evaluates_without_overflowing_the_stack_machine() {
    let mut eval = Evaluator::new();
    let mut vars = Directory::new();
    let settings = eval.settings().clone();

    let mut program = "\u{ab} 0 ".to_string();
    for i in 1..=500 {
        program.push_str(&format!("{i} + "));
    }
    program.push('\u{bb}');

    let obj = parser::parse(&program, &settings).unwrap();
    eval.evaluate(obj, &mut vars).unwrap();

    let expected: i64 = (1..=500).sum();
    assert_eq!(renderer::render(eval.stack().top().unwrap(), &settings), expected.to_string());
}

#[test]
fn a_wide_list_round_trips_through_parse_and_render() {
    let settings = db48x::Settings::default();
    let items: Vec<String> = (0..200).map(|i| i.to_string()).collect();
    let text = format!("{{ {} }}", items.join(" "));

    let obj = parser::parse(&text, &settings).unwrap();
    match &obj {
        Object::List(l) => assert_eq!(l.len(), 200),
        other => panic!("expected a list, got {other:?}"),
    }

    let rendered = renderer::render(&obj, &settings);
    let reparsed = parser::parse(&rendered, &settings).unwrap();
    assert_eq!(obj, reparsed);
}

#[test]
fn deeply_nested_programs_evaluate_correctly() {
    let mut eval = Evaluator::new();
    let mut vars = Directory::new();
    let settings = eval.settings().clone();

    let mut program = "1".to_string();
    for _ in 0..50 {
        program = format!("\u{ab} {program} 1 + \u{bb}");
    }

    let obj = parser::parse(&program, &settings).unwrap();
    eval.evaluate(obj, &mut vars).unwrap();

    assert_eq!(renderer::render(eval.stack().top().unwrap(), &settings), "51");
}

#[test]
fn heap_survives_many_allocate_and_collect_cycles_under_pressure() {
    struct FixedSizeWalker(usize);
    impl ObjectWalker for FixedSizeWalker {
        fn size_at(&self, _heap: &Heap, _offset: usize) -> usize {
            self.0
        }
        fn children_at(&self, _heap: &Heap, _offset: usize) -> Vec<usize> {
            Vec::new()
        }
    }

    let mut heap = Heap::new(256);
    let walker = FixedSizeWalker(8);
    let protected = ProtectedList::new();

    // Only the most recent allocation is kept reachable each round, so the
    // live set never grows; everything else is garbage the periodic GC
    // inside `allocate` must reclaim to keep the run from exhausting the
    // fixed-size heap.
    for _ in 0..1000 {
        let at = heap
            .allocate(8, |h| {
                gc::collect(h, &walker, &ProtectedList::new());
            })
            .unwrap();
        heap.pop_stack();
        heap.push_stack(at);
    }

    let reclaimed = gc::collect(&mut heap, &walker, &protected);
    assert!(heap.temporaries_end() <= heap.capacity());
    let _ = reclaimed;
}
