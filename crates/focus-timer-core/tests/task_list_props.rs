//! Property tests for task list index bookkeeping.

use focus_timer_core::TaskList;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(String),
    Delete(usize),
    Activate(usize),
    Reorder(usize, usize),
    CompleteActive,
    ClearCompleted,
    Advance,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[ a-z]{0,6}".prop_map(Op::Add),
        (0usize..8).prop_map(Op::Delete),
        (0usize..8).prop_map(Op::Activate),
        (0usize..8, 0usize..8).prop_map(|(a, b)| Op::Reorder(a, b)),
        Just(Op::CompleteActive),
        Just(Op::ClearCompleted),
        Just(Op::Advance),
    ]
}

fn id_at(list: &TaskList, index: usize) -> Option<String> {
    list.get(index).map(|t| t.id.clone())
}

fn apply(list: &mut TaskList, op: &Op) {
    match op {
        Op::Add(name) => {
            list.add(name, None);
        }
        Op::Delete(i) => {
            if let Some(id) = id_at(list, *i) {
                list.delete(&id);
            }
        }
        Op::Activate(i) => {
            if let Some(id) = id_at(list, *i) {
                list.set_active(&id);
            }
        }
        Op::Reorder(from, to) => {
            list.reorder(*from, *to);
        }
        Op::CompleteActive => {
            list.complete_active();
        }
        Op::ClearCompleted => {
            list.clear_completed();
        }
        Op::Advance => {
            list.advance();
        }
    }
}

proptest! {
    #[test]
    fn active_index_always_in_bounds(ops in proptest::collection::vec(op(), 0..40)) {
        let mut list = TaskList::new();
        for op in &ops {
            apply(&mut list, op);
            if let Some(i) = list.active_index() {
                prop_assert!(i < list.len());
            }
            if list.is_empty() {
                prop_assert_eq!(list.active_index(), None);
            }
        }
    }

    #[test]
    fn reorder_keeps_active_identity(
        names in proptest::collection::vec("[a-z]{1,4}", 1..8),
        active in 0usize..8,
        from in 0usize..8,
        to in 0usize..8,
    ) {
        let mut list = TaskList::new();
        for name in &names {
            list.add(name, None);
        }
        let active = active % list.len();
        let active_id = id_at(&list, active).unwrap();
        list.set_active(&active_id);

        list.reorder(from, to);
        prop_assert_eq!(list.active().map(|t| t.id.clone()), Some(active_id));
    }

    #[test]
    fn deleting_another_task_keeps_active_identity(
        count in 2usize..8,
        active in 0usize..8,
        victim in 0usize..8,
    ) {
        let mut list = TaskList::new();
        for i in 0..count {
            list.add(&format!("task {i}"), None);
        }
        let active = active % count;
        let victim = victim % count;
        prop_assume!(active != victim);
        let active_id = id_at(&list, active).unwrap();
        list.set_active(&active_id);

        let victim_id = id_at(&list, victim).unwrap();
        list.delete(&victim_id);
        prop_assert_eq!(list.active().map(|t| t.id.clone()), Some(active_id));
    }

    #[test]
    fn blank_names_are_rejected(name in "[ \t]{0,5}") {
        let mut list = TaskList::new();
        prop_assert!(list.add(&name, Some(10)).is_none());
        prop_assert!(list.is_empty());
        prop_assert_eq!(list.active_index(), None);
    }
}
