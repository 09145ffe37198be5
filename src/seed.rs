//! Sample-data generation for the two CSV stores. Kept in the library
//! so tests can seed into a temp directory; the `seed` bin writes into
//! the working directory.

use std::path::Path;

use crate::errors::AppError;

const PEOPLE_HEADER: [&str; 11] = [
    "Name", "Category", "Title", "SubTitle", "FootNote", "Updated", "Section 1", "Section 2",
    "Section 3", "QRCodeURL", "ImgURL",
];

const PRODUCTS_HEADER: [&str; 5] = ["Product", "Category", "Section 1", "Section 2", "Section 3"];

/// Write sample `People.csv` and `Products.csv` into `dir`. The people
/// categories line up with the product categories so a specific search
/// finds a joined row out of the box.
pub fn write_samples(dir: &Path) -> Result<(), AppError> {
    let mut people = csv::Writer::from_path(dir.join("People.csv"))?;
    people.write_record(PEOPLE_HEADER)?;
    let people_rows = [
        [
            "John",
            "Hardware",
            "Laptop briefing",
            "Q3 refresh",
            "Internal use only",
            "2026-08-01",
            "Thin and light",
            "16GB RAM",
            "Ships in September",
            "https://example.com/john",
            "",
        ],
        [
            "Alice",
            "Accessories",
            "Peripheral lineup",
            "Mice and keyboards",
            "Draft",
            "2026-07-15",
            "Wireless",
            "Ergonomic",
            "Budget friendly",
            "",
            "",
        ],
        [
            "Bob",
            "Hardware",
            "Workstation overview",
            "Power users",
            "Confidential",
            "2026-06-30",
            "Tower chassis",
            "Dual GPU",
            "On request",
            "",
            "",
        ],
    ];
    for row in people_rows {
        people.write_record(row)?;
    }
    people.flush()?;

    let mut products = csv::Writer::from_path(dir.join("Products.csv"))?;
    products.write_record(PRODUCTS_HEADER)?;
    let product_rows = [
        [
            "Laptop",
            "Hardware",
            "What is the form factor?",
            "How much memory?",
            "When is availability?",
        ],
        [
            "Mouse",
            "Accessories",
            "What connectivity?",
            "What is the shape?",
            "What is the price point?",
        ],
    ];
    for row in product_rows {
        products.write_record(row)?;
    }
    products.flush()?;

    Ok(())
}
