//! XML Reader Example
//!
//! This example demonstrates how to read an XML document using the `xmlentity` crate,
//! walk over its entities, and read attributes as typed values.
use xmlentity::{Document, Evaluate};

const DOCUMENT: &str = include_str!("example.xml");

fn main() {
    //
    // Parse the XML document from the source string.
    // `Document::load` does the same for a file.
    //
    // If an error occurs, the error message is designed to be human-readable;
    //      | </catalog>
    //      = At 57:3
    //      = Closing tag does not match opening tag: expected </book>, found </catalog>
    let document = match Document::parse_str(DOCUMENT) {
        Ok(doc) => doc,
        Err(e) => panic!("Error parsing XML document:\n{e}"),
    };

    let Some(catalog) = document.root() else {
        return;
    };
    println!(
        "{} ({} entries)",
        catalog.attribute_value("name").unwrap_or("Unnamed catalog"),
        catalog.children().len()
    );

    //
    // Same-named children are stored next to each other, in the order they were read.
    // `find_child` returns the first, and `next_child` steps to the following one.
    let mut book = catalog.find_child("book");
    while let Some(entity) = book {
        let title = entity.find_child("title").map_or("", |title| title.content());

        //
        // Numeric attributes are evaluated, so `0x0000002A` and `6 * 7` both read as 42.
        let stock = document
            .read_attribute::<u32>(entity, "stock")
            .unwrap()
            .unwrap_or_default();
        let featured = document
            .read_attribute::<bool>(entity, "featured")
            .unwrap()
            .unwrap_or_default();

        let price = match entity.find_child("price") {
            Some(price) => document.evaluator().evaluate(price.content()).unwrap_or(f64::NAN),
            None => f64::NAN,
        };

        println!(
            "{:<24} {price:>6.2} {stock:>3} in stock{}",
            title,
            if featured { " (featured)" } else { "" }
        );

        book = catalog.next_child(entity, "book");
    }
}
