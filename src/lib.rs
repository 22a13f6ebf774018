//! In-memory XML entity trees.
//!
//! A [`Document`] holds a tree of [`Entity`] values. It can be populated with a stack-based builder,
//! or read from XML text; either way it can then be queried and written back out as formatted XML.
//!
//! ```rust
//! use xmlentity::Document;
//!
//! let mut doc = Document::new();
//! doc.new_root("bookstore");
//! doc.comment("Stock list");
//!     doc.begin("book");
//!     doc.attribute("isbn", "0-201-63361-2");
//!     doc.attribute("price", 39.95);
//!     doc.content("Design Patterns");
//!     doc.end();
//! doc.end();
//!
//! let xml = doc.to_xml().unwrap();
//! let copy = xmlentity::Document::parse_str(&xml).unwrap();
//!
//! let book = copy.root().unwrap().find_child("book").unwrap();
//! assert_eq!(book.content(), "Design Patterns");
//! assert_eq!(copy.read_attribute::<f64>(book, "price").unwrap(), Some(39.95));
//! ```
//!
//! The reader understands elements, attributes, text content, comments and the `<?xml ... ?>` declaration.
//! `<! ... >` blocks are skipped, and only UTF-8 input is accepted.
//!
//! Diagnostics, such as a missing declaration, are reported through [`tracing`](https://docs.rs/tracing).
#![warn(missing_docs)]

mod document;
pub use document::*;

mod error;
pub use error::*;

mod eval;
pub use eval::{Calculator, EvalError, Evaluate};

mod legal;
pub use legal::{decode_content, legalize_comment, legalize_content, legalize_name};

mod node;
pub use node::*;

mod parser;
pub use parser::MAX_DEPTH;

pub mod to_xml;
pub use to_xml::{FormatOptions, write_xml};
