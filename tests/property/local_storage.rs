//! Property-based tests for the local storage backend.
//!
//! Uses proptest to verify:
//! 1. Whatever a session writes, a fresh backend over the same directory
//!    reads back identically (ids, text, completed flags, order).
//! 2. Random bytes in the document never panic; they surface as a
//!    persistence error.

use proptest::prelude::*;

use taskosaurus::backend::{BackendError, LocalBackend, TaskBackend};
use taskosaurus_proto::api::TaskPatch;

/// One mutation applied to the store; indices are taken modulo the
/// collection length.
#[derive(Debug, Clone)]
enum Op {
    Add(String),
    Toggle(usize),
    Edit(usize, String),
    Remove(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => "[a-zA-Z0-9 ]{1,24}".prop_filter("non-blank", |s| !s.trim().is_empty()).prop_map(Op::Add),
        2 => any::<usize>().prop_map(Op::Toggle),
        1 => (any::<usize>(), "[a-z]{1,12}").prop_map(|(i, s)| Op::Edit(i, s)),
        1 => any::<usize>().prop_map(Op::Remove),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn reopen_yields_identical_collection(ops in prop::collection::vec(arb_op(), 0..20)) {
        let dir = tempfile::tempdir().unwrap();
        let rt = runtime();

        let written = rt.block_on(async {
            let backend = LocalBackend::new(dir.path());
            for op in ops {
                let tasks = backend.fetch_all().await.unwrap();
                match op {
                    Op::Add(text) => {
                        backend.create(&text).await.unwrap();
                    }
                    Op::Toggle(i) if !tasks.is_empty() => {
                        let task = &tasks[i % tasks.len()];
                        backend
                            .update(&task.id, &TaskPatch::completed(!task.completed))
                            .await
                            .unwrap();
                    }
                    Op::Edit(i, text) if !tasks.is_empty() => {
                        let task = &tasks[i % tasks.len()];
                        backend.update(&task.id, &TaskPatch::text(text)).await.unwrap();
                    }
                    Op::Remove(i) if !tasks.is_empty() => {
                        let task = &tasks[i % tasks.len()];
                        backend.delete(&task.id).await.unwrap();
                    }
                    _ => {}
                }
            }
            backend.fetch_all().await.unwrap()
        });

        let read = rt.block_on(LocalBackend::new(dir.path()).fetch_all()).unwrap();
        prop_assert_eq!(read, written);
    }

    #[test]
    fn garbage_document_is_persistence_error(bytes in prop::collection::vec(any::<u8>(), 1..256)) {
        // Skip inputs that happen to be a valid (possibly empty) task array.
        prop_assume!(serde_json::from_slice::<Vec<serde_json::Value>>(&bytes).is_err());

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("taskosaurus.tasks.json"), &bytes).unwrap();

        let result = runtime().block_on(LocalBackend::new(dir.path()).fetch_all());
        prop_assert!(matches!(result, Err(BackendError::Persistence(_))));
    }
}
