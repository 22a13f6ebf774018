//! XML Formatter Example
//!
//! This example demonstrates how to reformat an XML document using the `xmlentity` crate.
use xmlentity::{Document, FormatOptions, write_xml};

const SRC: &str = "<test b='2' a=\"1\"><test2>test &amp more</test2><!-- dropped --></test>";

fn main() {
    //
    // Parse the XML document from the source string.
    // Comments in the source are skipped by the reader.
    let mut doc = match Document::parse_str(SRC) {
        Ok(doc) => doc,
        Err(e) => panic!("Error parsing XML document:\n{e}"),
    };

    //
    // We can turn a tree into a formatted XML string.
    // Attributes and children come out sorted by name, one attribute per line.
    let formatted = doc.to_xml().unwrap();
    println!("Formatted XML:\n{formatted}");

    //
    // The indentation can be changed with `FormatOptions`.
    // `write_xml` writes an entity tree to any `std::io::Write`.
    let options = FormatOptions {
        indent: "    ".to_string(),
    };
    if let Some(root) = doc.root() {
        let mut stdout = std::io::stdout().lock();
        write_xml(&mut stdout, root, &options).unwrap();
    }
}
