//! Property-based tests for the task model.
//!
//! Uses proptest to verify:
//! 1. `active` and `completed` views partition the `all` view, in order.
//! 2. Filtering never changes the collection.
//! 3. `normalize_text` accepts exactly the non-blank inputs and trims them.
//! 4. Newest-first sorting is total and stable under re-sorting.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use taskosaurus_proto::filter::FilterMode;
use taskosaurus_proto::task::{Task, TaskId, normalize_text, sort_newest_first};

// --- Strategies ---

fn arb_created_at() -> impl Strategy<Value = DateTime<Utc>> {
    // 2000-01-01 .. 2100-01-01, with millisecond precision.
    (946_684_800_000_i64..4_102_444_800_000_i64).prop_map(|ms| {
        Utc.timestamp_millis_opt(ms)
            .single()
            .unwrap_or_else(Utc::now)
    })
}

fn arb_task() -> impl Strategy<Value = Task> {
    (
        "[a-z0-9]{1,12}",
        "[^\x00]{1,40}",
        any::<bool>(),
        arb_created_at(),
    )
        .prop_map(|(id, text, completed, created_at)| Task {
            id: TaskId::from(id),
            text,
            completed,
            created_at,
        })
}

fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(arb_task(), 0..50)
}

proptest! {
    #[test]
    fn active_and_completed_partition_all(tasks in arb_tasks()) {
        let all = FilterMode::All.apply(&tasks);
        let active = FilterMode::Active.apply(&tasks);
        let completed = FilterMode::Completed.apply(&tasks);

        prop_assert_eq!(all.len(), tasks.len());
        prop_assert_eq!(active.len() + completed.len(), tasks.len());
        prop_assert!(active.iter().all(|t| !t.completed));
        prop_assert!(completed.iter().all(|t| t.completed));

        // Each view keeps the collection's relative order.
        let mut merged_positions: Vec<usize> = active
            .iter()
            .chain(completed.iter())
            .map(|t| tasks.iter().position(|x| std::ptr::eq(x, *t)).unwrap_or(usize::MAX))
            .collect();
        merged_positions.sort_unstable();
        prop_assert_eq!(merged_positions, (0..tasks.len()).collect::<Vec<_>>());
        prop_assert!(active.windows(2).all(|w| {
            let a = tasks.iter().position(|x| std::ptr::eq(x, w[0]));
            let b = tasks.iter().position(|x| std::ptr::eq(x, w[1]));
            a < b
        }), "active view must preserve collection order");
    }

    #[test]
    fn filtering_never_mutates(tasks in arb_tasks()) {
        let before = tasks.clone();
        for mode in FilterMode::ALL {
            let _ = mode.apply(&tasks);
        }
        prop_assert_eq!(tasks, before);
    }

    #[test]
    fn normalize_accepts_exactly_non_blank(text in "\\PC{0,40}") {
        match normalize_text(&text) {
            Ok(normalized) => {
                prop_assert!(!text.trim().is_empty());
                prop_assert_eq!(normalized.as_str(), text.trim());
            }
            Err(_) => prop_assert!(text.trim().is_empty()),
        }
    }

    #[test]
    fn whitespace_only_is_rejected(text in "[ \t\n\r]{0,20}") {
        prop_assert!(normalize_text(&text).is_err());
    }

    #[test]
    fn newest_first_is_sorted_and_idempotent(mut tasks in arb_tasks()) {
        sort_newest_first(&mut tasks);
        prop_assert!(tasks.windows(2).all(|w| {
            (w[0].created_at, &w[0].id) >= (w[1].created_at, &w[1].id)
        }), "tasks must be sorted newest first");

        let once = tasks.clone();
        sort_newest_first(&mut tasks);
        prop_assert_eq!(tasks, once);
    }
}
