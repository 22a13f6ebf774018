use xmlentity::Document;

const SRC: &str = include_str!("good.xml");
const CMP: &str = include_str!("good.xml.parsed");

fn parse(src: &str) -> Document {
    match Document::parse_str(src) {
        Ok(doc) => doc,
        Err(e) => panic!("{e}"),
    }
}

#[test]
fn test_good() {
    let mut document = parse(SRC);

    let str = document.to_xml().unwrap();
    //    std::fs::write("tests/good.xml.parsed", &str).unwrap();
    if str != CMP {
        let mut src_lines = str.lines();
        for (i, line) in CMP.lines().enumerate() {
            match src_lines.next() {
                None => {
                    panic!(
                        "Diff at line {}: Not enough rows in parsed document!",
                        i + 1
                    );
                }

                Some(l) => {
                    if line == l {
                        continue;
                    } else {
                        eprintln!("Diff at line {}", i + 1);

                        eprintln!("Expected: {line}");
                        eprintln!("Got: {l}");
                        break;
                    }
                }
            }
        }

        panic!("Parsed document does not match expected output");
    }
}

#[test]
fn test_reparse() {
    let document = parse(SRC);
    let document2 = parse(CMP);
    assert_eq!(document.root(), document2.root());
}

#[test]
fn test_query() {
    let document = parse(SRC);
    let root = document.root().unwrap();
    assert_eq!(root.name(), "bookstore");
    assert_eq!(root.attribute_value("name"), Some("Main Street"));
    assert_eq!(document.read_attribute::<bool>(root, "open").unwrap(), Some(true));

    let books: Vec<_> = root.children_named("book").collect();
    assert_eq!(books.len(), 2);
    assert_eq!(
        document.read_attribute::<u32>(books[0], "isbn").unwrap(),
        Some(0xBEEF)
    );
    assert_eq!(books[1].find_child("title").unwrap().content(), "Harry Potter");
    assert!(books[1].find_child("year").is_none());

    let note = root.find_child("note").unwrap();
    assert_eq!(note.content(), "Tom & Jerry <3");

    let quote = root.find_child("quote").unwrap();
    assert_eq!(quote.attribute_value("said"), Some("\"Hi\""));
    assert_eq!(quote.content(), "It's");
}
