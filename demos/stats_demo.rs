use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use clap::Parser;
use robin_hash::HashTable;
use robin_hash::hash_table::Entry;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Fraction of the initial slots to fill before reporting.
    #[arg(short = 'l', long = "load", default_value_t = 0.45)]
    load: f64,
}

fn hash_u64(value: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating HashTable with target capacity: {}",
        args.target_capacity
    );

    let mut table: HashTable<u64> = HashTable::with_capacity(args.target_capacity);
    let initial_capacity = table.capacity();

    println!("Actual capacity: {}", initial_capacity);
    println!("Filling table with u64 values...");

    let num_values = (initial_capacity as f64 * args.load.clamp(0.0, 1.0)) as usize;
    let mut num_resizes = 0;
    for i in 0..num_values {
        let value = i as u64;
        let hash = hash_u64(value);
        let capacity = table.capacity();

        match table.entry(hash, |&v| v == value) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(_) => {
                panic!("Value already exists in table: {}", value);
            }
        }

        if table.capacity() != capacity {
            num_resizes += 1;
        }
    }

    println!("Inserted {} values into table", table.len());
    println!(
        "Final load factor: {:.2}%",
        (table.len() as f64 / table.capacity() as f64) * 100.0
    );

    table.probe_histogram().print();
    table.debug_stats().print();
    println!(
        "Resizes while filling: {} (capacity {} -> {})",
        num_resizes,
        initial_capacity,
        table.capacity()
    );
}
