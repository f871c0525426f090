//! bst-demo
//!
//! Walks through the life of a small persistent tree: building it one `put`
//! at a time, replacing a value, deleting entries and rebalancing, logging
//! every version through `tracing`.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --features demo --bin bst-demo
//! ```

use fork_bst::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn log_tree(label: &str, tree: &Bst<i32, &str>) {
    tracing::info!(
        label,
        size = tree.size(),
        height = tree.height(),
        "tree version\n{}",
        tree.fancy()
    );
}

fn main() -> Result<(), BstError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bst_demo=info,fork_bst=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let empty = Bst::new();
    let single = empty.put(30, "John");
    log_tree("single", &single);

    let six = single
        .put(40, "Mary")
        .put(25, "Peter")
        .put(37, "Monica")
        .put(34, "Nicolas")
        .put(31, "Martin");
    log_tree("six", &six);

    let replaced = six.put(31, "Kathy");
    tracing::info!(
        before = ?six.find(&31),
        after = ?replaced.find(&31),
        "replaced value of key 31"
    );

    let balanced = replaced.balanced();
    log_tree("balanced", &balanced);

    match balanced.delete(&99) {
        Some(_) => tracing::warn!("key 99 unexpectedly present"),
        None => tracing::info!("key 99 absent, nothing deleted"),
    }

    let mut buffer = vec![None; balanced.size()];
    let written = balanced.save_in_order(&mut buffer)?;
    for entry in buffer.iter().flatten() {
        tracing::info!(%entry, "in order");
    }
    tracing::info!(written, "exported entries");

    let table = OrderedTable::from(balanced).put(50, "Mary");
    tracing::info!(
        keys = table.keys().len(),
        values = table.values().len(),
        "duplicate values collapse in the value set"
    );

    Ok(())
}
