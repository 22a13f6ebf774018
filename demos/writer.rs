//! XML Writer Example
//!
//! This example builds a document with the stack-based builder, and writes it to a file.
//!
//! It demonstrates how to use the `xmlentity` crate to create XML documents programmatically:
//! - `new_root` / `begin` open entities, `end` closes the innermost one
//! - `attribute`, `content` and `comment` act on the innermost open entity
//! - Names are legalized, so any string can be used as a name
use xmlentity::Document;

fn main() {
    let mut doc = Document::new();

    //
    // Open the root entity. Any previous content of the document is discarded.
    doc.new_root("catalog");
    doc.comment("Written by the xmlentity writer example");
    doc.attribute("name", "Downtown Books");

    //
    // Values can be text, booleans, integers or floats.
    // Unsigned integers are written as hexadecimal: `stock = "0x00000010"`
    for (id, title, price, stock) in [
        ("bk101", "XML Developer's Guide", 44.95, 16u32),
        ("bk102", "Midnight Rain", 5.95, 3),
    ] {
        doc.begin("book");
        doc.attribute("id", id);
        doc.attribute("stock", stock);
        doc.attribute("featured", stock > 10);

        doc.begin("title");
        doc.content(title);
        doc.end();

        doc.begin("price");
        doc.content(price);
        doc.end();

        doc.end();
    }

    //
    // Illegal names are fixed up: this entity is written as `<_st_edition>`
    doc.begin("1st edition");
    doc.content("Text is escaped: <, >, & and quotes");
    doc.end();

    //
    // Comments attach to the root here, and are written above its opening tag.
    // `--` cannot appear in an XML comment, so it is replaced with a dash character.
    doc.comment("Stock levels change daily -- check again before ordering");
    doc.end();

    //
    // `save` closes any entities that are still open, formats the document in memory,
    // then writes it in one go.
    let path = std::env::temp_dir().join("xmlentity_writer.xml");
    if let Err(e) = doc.save(&path) {
        panic!("Error saving XML document:\n{e}");
    }

    println!("Wrote {}:", path.display());
    println!("{}", std::fs::read_to_string(&path).unwrap());
}
