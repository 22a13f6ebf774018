//! XML formatting module
//!
//! Use [`Document::to_xml`](crate::Document::to_xml) or [`Document::save`](crate::Document::save)
//! unless you need to write the XML to some other writer.
use crate::{Entity, legalize_content};
use std::io::Write;

/// The declaration written at the top of every document.
pub const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Prefix for the continuation lines of a multi-line comment, the width of `<!-- `.
const COMMENT_CONTINUATION: &str = "     ";

/// Layout settings for written documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Indentation added per nesting level. Defaults to a single space.
    pub indent: String,
}
impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: " ".to_string(),
        }
    }
}

/// Flatten an entity tree as a formatted XML document using the given writer.
///
/// Children and attributes are written in name order. Attribute and content text is escaped with
/// [`legalize_content`](crate::legalize_content); names are written as stored.
///
/// # Errors
/// This function will return an error if the writer fails to write the XML string.
pub fn write_xml(
    writer: &mut dyn Write,
    root: &Entity,
    options: &FormatOptions,
) -> std::io::Result<()> {
    writeln!(writer, "{DECLARATION}")?;

    let mut stack = vec![(EntityTask::Open(root), 0)];
    while let Some((task, depth)) = stack.pop() {
        let tab = options.indent.repeat(depth);

        match task {
            EntityTask::Close(entity) => {
                writeln!(writer, "{tab}</{}>", entity.name())?;
            }

            EntityTask::Open(entity) => {
                write_comments(writer, entity, &tab)?;

                write!(writer, "{tab}<{}", entity.name())?;
                write_attributes(writer, entity, &tab, &options.indent)?;

                if entity.content().is_empty() && entity.children().is_empty() {
                    writer.write_all(b"/>\n")?;
                    continue;
                }

                writer.write_all(b">\n")?;
                if !entity.content().is_empty() {
                    let inner = options.indent.repeat(depth + 1);
                    for line in legalize_content(entity.content()).split('\n') {
                        writeln!(writer, "{inner}{line}")?;
                    }
                }

                stack.push((EntityTask::Close(entity), depth));
                for child in entity.children().into_iter().rev() {
                    stack.push((EntityTask::Open(child), depth + 1));
                }
            }
        }
    }

    Ok(())
}

fn write_comments(writer: &mut dyn Write, entity: &Entity, tab: &str) -> std::io::Result<()> {
    for comment in entity.comments() {
        let block = format!(
            "<!-- {} -->",
            comment.replace('\n', &format!("\n{COMMENT_CONTINUATION}"))
        );
        for line in block.split('\n') {
            writeln!(writer, "{tab}{line}")?;
        }
    }
    Ok(())
}

/// Writes one attribute per line, with the `=` signs aligned.
fn write_attributes(
    writer: &mut dyn Write,
    entity: &Entity,
    tab: &str,
    indent: &str,
) -> std::io::Result<()> {
    let attributes = entity.attributes();
    if attributes.is_empty() {
        return Ok(());
    }

    let width = attributes
        .iter()
        .map(|attribute| attribute.name().chars().count())
        .max()
        .unwrap_or_default();

    for attribute in attributes {
        let value = legalize_content(attribute.value());
        write!(
            writer,
            "\n{tab}{indent}{name:<width$} = \"{value}\"",
            name = attribute.name()
        )?;
    }
    write!(writer, "\n{tab}")
}

enum EntityTask<'doc> {
    Open(&'doc Entity),
    Close(&'doc Entity),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Attribute;

    fn render(root: &Entity, options: &FormatOptions) -> String {
        let mut output = Vec::new();
        write_xml(&mut output, root, options).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_write_declaration_and_empty_root() {
        let root = Entity::new("root");
        let result = render(&root, &FormatOptions::default());
        assert_eq!(result, format!("{DECLARATION}\n<root/>\n"));
    }

    #[test]
    fn test_write_aligned_attributes() {
        let mut root = Entity::new("root");
        root.insert_attribute(Attribute::new("version", "2"));
        root.insert_attribute(Attribute::new("id", "a\"b"));

        let result = render(&root, &FormatOptions::default());
        assert!(result.ends_with("<root\n id      = \"a&quotb\"\n version = \"2\"\n/>\n"));
    }

    #[test]
    fn test_write_nested_entities() {
        let mut child = Entity::new("child");
        child.push_content("one\ntwo < three");

        let mut root = Entity::new("root");
        root.insert_child(child);
        root.insert_child(Entity::new("a"));

        let result = render(&root, &FormatOptions::default());
        assert!(result.ends_with("<root>\n <a/>\n <child>\n  one\n  two &lt three\n </child>\n</root>\n"));
    }

    #[test]
    fn test_write_multiline_content() {
        let mut child = Entity::new("child");
        child.push_content("first\n\nthird");

        let mut root = Entity::new("root");
        root.insert_child(child);

        let result = render(&root, &FormatOptions::default());
        assert!(result.ends_with("<root>\n <child>\n  first\n  \n  third\n </child>\n</root>\n"));
    }

    #[test]
    fn test_write_custom_indent() {
        let mut root = Entity::new("root");
        root.insert_child(Entity::new("child"));

        let options = FormatOptions {
            indent: "\t".to_string(),
        };
        let result = render(&root, &options);
        assert!(result.ends_with("<root>\n\t<child/>\n</root>\n"));
    }

    #[test]
    fn test_write_comments() {
        let mut child = Entity::new("child");
        child.push_comment("first line\nsecond line".to_string());

        let mut root = Entity::new("root");
        root.insert_child(child);

        let result = render(&root, &FormatOptions::default());
        assert!(result.ends_with(
            "<root>\n <!-- first line\n      second line -->\n <child/>\n</root>\n"
        ));
    }
}
