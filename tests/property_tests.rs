//! Property-based tests for the rental lifecycle.
//!
//! These tests use proptest to drive random operation sequences against an
//! in-memory ledger and check that the lifecycle rules hold for all of them.

use bookledger::core::{Guard, State};
use bookledger::{book_id, BookContract, BookState, ContractError, MemoryLedger};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashSet};

#[derive(Clone, Debug)]
enum Op {
    Request(String),
    Confirm,
    Return,
}

prop_compose! {
    fn arbitrary_state()(variant in 0..4u8) -> BookState {
        BookState::ALL[variant as usize]
    }
}

fn identity() -> impl Strategy<Value = String> {
    "[A-Za-z]{1,8}"
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        identity().prop_map(Op::Request),
        Just(Op::Confirm),
        Just(Op::Return),
    ]
}

/// State the lifecycle should reach, or `None` if the move is illegal.
fn expected_next(state: BookState, op: &Op) -> Option<BookState> {
    match (op, state) {
        (Op::Request(_), BookState::Registered | BookState::Returned) => Some(BookState::InRequest),
        (Op::Confirm, BookState::InRequest) => Some(BookState::Rented),
        (Op::Return, BookState::Rented) => Some(BookState::Returned),
        _ => None,
    }
}

fn run(
    ledger: &MemoryLedger,
    contract: &BookContract,
    key: &str,
    op: &Op,
) -> Result<bookledger::Book, ContractError> {
    ledger.submit(|tx| match op {
        Op::Request(requester) => contract.request_rental(tx, key, requester),
        Op::Confirm => contract.confirm_rental(tx, key),
        Op::Return => contract.return_book(tx, key),
    })
}

proptest! {
    #[test]
    fn guard_is_deterministic(state in arbitrary_state()) {
        let guard = Guard::new(|s: &BookState| s.holds_renter());
        prop_assert_eq!(guard.check(&state), guard.check(&state));
    }

    #[test]
    fn state_name_parses_back(state in arbitrary_state()) {
        let parsed: BookState = state.name().parse().unwrap();
        prop_assert_eq!(parsed, state);
    }

    #[test]
    fn second_registration_always_fails(name in identity(), owner in identity()) {
        let ledger = MemoryLedger::new();
        let contract = BookContract::new();
        let key = book_id(&name, &owner);

        ledger.submit(|tx| contract.register_book(tx, &name, &owner)).unwrap();
        let before = ledger.committed_value(&key);

        let second = ledger.submit(|tx| contract.register_book(tx, &name, &owner));

        prop_assert!(
            matches!(second, Err(ContractError::AlreadyExists { key: ref k }) if *k == key),
            "unexpected result {:?}",
            second
        );
        prop_assert_eq!(ledger.committed_value(&key), before);
    }

    #[test]
    fn transitions_follow_the_lifecycle(ops in prop::collection::vec(arbitrary_op(), 0..24)) {
        let ledger = MemoryLedger::new();
        let contract = BookContract::new();
        ledger.submit(|tx| contract.register_book(tx, "Dune", "alice")).unwrap();
        let key = book_id("Dune", "alice");

        let mut state = BookState::Registered;
        for op in &ops {
            let before = ledger.committed_value(&key);
            let result = run(&ledger, &contract, &key, op);

            match expected_next(state, op) {
                Some(next) => {
                    let book = result.unwrap();
                    prop_assert_eq!(book.state, next);
                    if let Op::Request(requester) = op {
                        prop_assert_eq!(&book.renter, requester);
                    }
                    state = next;
                }
                None => {
                    match result {
                        Err(ContractError::InvalidStateTransition { actual, .. }) => {
                            prop_assert_eq!(actual, state);
                        }
                        other => {
                            prop_assert!(false, "expected rejection, got {:?}", other);
                        }
                    }
                    prop_assert_eq!(ledger.committed_value(&key), before);
                }
            }
        }
    }

    #[test]
    fn renter_is_set_exactly_while_held(ops in prop::collection::vec(arbitrary_op(), 0..24)) {
        let ledger = MemoryLedger::new();
        let contract = BookContract::new();
        let registered = ledger.submit(|tx| contract.register_book(tx, "Dune", "alice")).unwrap();
        prop_assert!(registered.renter_consistent());

        for op in &ops {
            if let Ok(book) = run(&ledger, &contract, "Dune_alice", op) {
                prop_assert_eq!(!book.renter.is_empty(), book.state.holds_renter());
            }
        }
    }

    #[test]
    fn history_has_one_entry_per_write(ops in prop::collection::vec(arbitrary_op(), 0..24)) {
        let ledger = MemoryLedger::new();
        let contract = BookContract::new();
        ledger.submit(|tx| contract.register_book(tx, "Dune", "alice")).unwrap();

        let mut written = vec![BookState::Registered];
        for op in &ops {
            if let Ok(book) = run(&ledger, &contract, "Dune_alice", op) {
                written.push(book.state);
            }
        }

        let history = ledger.evaluate(|tx| contract.history(tx, "Dune_alice")).unwrap();
        prop_assert_eq!(history.len(), written.len());
        prop_assert_eq!(history.get_path(), written.iter().collect::<Vec<_>>());

        let tx_ids: HashSet<&str> = history.entries().iter().map(|e| e.tx_id.as_str()).collect();
        prop_assert_eq!(tx_ids.len(), history.len());
        for pair in history.entries().windows(2) {
            prop_assert!(pair[0].timestamp <= pair[1].timestamp);
        }
        prop_assert_eq!(ledger.open_cursors(), 0);
    }

    #[test]
    fn range_scan_returns_every_book(
        books in prop::collection::btree_set((identity(), identity()), 0..12),
        requests in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let ledger = MemoryLedger::new();
        let contract = BookContract::new();
        let books: Vec<(String, String)> = books.into_iter().collect();

        let mut latest = BTreeMap::new();
        for (name, owner) in &books {
            let book = ledger.submit(|tx| contract.register_book(tx, name, owner)).unwrap();
            latest.insert(book.key(), book);
        }
        if !books.is_empty() {
            let mut requested = BTreeSet::new();
            for index in &requests {
                let (name, owner) = index.get(&books);
                let key = book_id(name, owner);
                if requested.insert(key.clone()) {
                    let book = ledger
                        .submit(|tx| contract.request_rental(tx, &key, "reader"))
                        .unwrap();
                    latest.insert(key, book);
                }
            }
        }

        let all = ledger.evaluate(|tx| contract.query_all_books(tx)).unwrap();
        prop_assert_eq!(all.len(), latest.len());
        for (result, (key, book)) in all.iter().zip(latest.iter()) {
            prop_assert_eq!(&result.key, key);
            prop_assert_eq!(&result.record, book);
        }
    }
}
