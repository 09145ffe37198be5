//! Writes small sample People.csv and Products.csv into the working
//! directory so the server can be exercised right away.

use std::path::Path;

fn main() {
    deckgen::seed::write_samples(Path::new(".")).expect("Failed to write sample stores");
    println!("Wrote sample People.csv and Products.csv");
}
