//! Rental Workflow
//!
//! This example walks one book through its full lifecycle on an in-memory
//! ledger, then prints the book's history and the whole table.
//!
//! Key concepts:
//! - Every operation receives the ledger explicitly
//! - Rejected transitions write nothing
//! - History lists every committed change with its transaction id
//!
//! Run with: cargo run --example rental_workflow

use bookledger::{BookContract, ContractError, MemoryLedger};

fn main() -> Result<(), ContractError> {
    println!("=== Rental Workflow Example ===\n");

    let ledger = MemoryLedger::new();
    let contract = BookContract::new();

    let book = ledger.submit(|tx| contract.register_book(tx, "Dune", "alice"))?;
    let key = book.key();
    println!("Registered {key}: {}", book.state);

    ledger.submit(|tx| contract.register_book(tx, "Emma", "carol"))?;

    let book = ledger.submit(|tx| contract.request_rental(tx, &key, "bob"))?;
    println!("Requested by {}: {}", book.renter, book.state);

    // Returning a book that is only requested is not allowed
    match ledger.submit(|tx| contract.return_book(tx, &key)) {
        Err(err) => println!("Rejected: {err}"),
        Ok(book) => println!("Unexpectedly returned: {book:?}"),
    }

    let book = ledger.submit(|tx| contract.confirm_rental(tx, &key))?;
    println!("Confirmed for {}: {}", book.renter, book.state);

    let book = ledger.submit(|tx| contract.return_book(tx, &key))?;
    println!("Returned: {}", book.state);

    println!("\nHistory of {key}:");
    let history = ledger.evaluate(|tx| contract.history(tx, &key))?;
    for entry in history.entries() {
        let state = entry
            .record
            .as_ref()
            .map_or("<deleted>".to_string(), |book| book.state.to_string());
        println!("  {} {} {state}", entry.timestamp, entry.tx_id);
    }

    println!("\nAll books:");
    for result in ledger.evaluate(|tx| contract.query_all_books(tx))? {
        println!("  {} -> {:?}", result.key, result.record);
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
