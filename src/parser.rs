//! Recursive-descent reader producing an entity tree from XML text.
//!
//! The reader is deliberately small: it understands elements, attributes, text content, comments and
//! a single leading `<?xml ... ?>` declaration. `<! ... >` blocks (such as a DOCTYPE) are skipped structurally.
//!
//! Nested entities are read with an explicit stack rather than by recursion, and nesting is limited to
//! [`MAX_DEPTH`] levels.
use crate::{
    Attribute, Entity, NameMap,
    error::{ErrorContext, XmlError, XmlErrorKind, XmlResult},
    legal::decode_reference,
};
use tracing::{trace, warn};

/// Maximum nesting depth of entities in a document.
pub const MAX_DEPTH: usize = 256;

/// Parses a complete document held in memory, returning its root entity.
///
/// # Errors
/// Returns an error if the bytes are not UTF-8 or do not form a document.
pub(crate) fn parse_bytes(bytes: &[u8]) -> XmlResult<Entity> {
    match std::str::from_utf8(bytes) {
        Ok(src) => parse_str(src),
        Err(e) => {
            let src = String::from_utf8_lossy(bytes);
            Err(XmlError::new(
                XmlErrorKind::InvalidUtf8,
                ErrorContext::new(&src, e.valid_up_to()),
            ))
        }
    }
}

/// Parses a complete document, returning its root entity.
///
/// # Errors
/// Returns an error if the text does not form a document.
pub(crate) fn parse_str(src: &str) -> XmlResult<Entity> {
    let mut reader = Reader::new(src);
    reader.read_header()?;

    let Some(root) = reader.read_entity()? else {
        return Err(reader.error(XmlErrorKind::NoRootEntity));
    };

    reader.skip_trivia(true);
    if !reader.at_end() {
        let (line, _) = ErrorContext::new(src, reader.pos).position();
        warn!(line, "Ignoring data after the root entity");
    }

    Ok(root)
}

/// A cursor over the source text.
///
/// All delimiters are ASCII, so every position the cursor stops at is a character boundary.
pub(crate) struct Reader<'src> {
    src: &'src str,
    bytes: &'src [u8],
    pos: usize,
}
impl<'src> Reader<'src> {
    pub(crate) fn new(src: &'src str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        self.bytes[self.pos..].starts_with(pattern.as_bytes())
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn error(&self, kind: XmlErrorKind) -> XmlError {
        self.error_at(self.pos, kind)
    }

    fn error_at(&self, offset: usize, kind: XmlErrorKind) -> XmlError {
        XmlError::new(kind, ErrorContext::new(self.src, offset))
    }

    /// Consumes one whitespace character or byte-order mark.
    fn read_space(&mut self) -> bool {
        match self.peek(0) {
            Some(b' ' | b'\t' | b'\r' | b'\n') => {
                self.pos += 1;
                true
            }
            _ if self.starts_with("\u{FEFF}") => {
                self.pos += 3;
                true
            }
            _ => false,
        }
    }

    /// Consumes one `<!-- ... -->` comment.
    fn read_comment(&mut self) -> bool {
        if !self.starts_with("<!--") {
            return false;
        }

        match self.src[self.pos + 4..].find("-->") {
            Some(end) => {
                self.pos += 4 + end + 3;
                true
            }
            None => {
                // Unterminated; nothing after it can be read
                self.pos = self.bytes.len();
                false
            }
        }
    }

    /// Consumes one `<! ... >` block, counting nested angle brackets.
    fn read_special(&mut self) -> bool {
        if !self.starts_with("<!") || self.peek(2) == Some(b'-') {
            return false;
        }

        let mut depth = 1;
        let mut pos = self.pos + 2;
        while let Some(&b) = self.bytes.get(pos) {
            pos += 1;
            match b {
                b'<' => depth += 1,
                b'>' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos = pos;
                        return true;
                    }
                }
                _ => {}
            }
        }

        self.pos = self.bytes.len();
        false
    }

    /// Skips whitespace and comments, and `<! ... >` blocks if `allow_special` is set.
    pub(crate) fn skip_trivia(&mut self, allow_special: bool) {
        while self.read_space() || self.read_comment() || (allow_special && self.read_special()) {}
    }

    /// Reads a tag or attribute name, verbatim.
    ///
    /// Returns an empty string if no name is present.
    fn read_name(&mut self) -> &'src str {
        self.skip_trivia(false);

        let start = self.pos;
        while let Some(b) = self.peek(0) {
            if b <= b' ' || matches!(b, b'=' | b'<' | b'>' | b'?' | b'!' | b'/') {
                break;
            }
            self.pos += 1;
        }

        let src: &'src str = self.src;
        &src[start..self.pos]
    }

    /// Reads text up to `<`, `>` or the `end` delimiter, decoding entity references.
    fn read_content(&mut self, end: Option<u8>) -> String {
        let mut content = String::new();
        let is_delimiter = |b: u8| b == b'<' || b == b'>' || Some(b) == end;

        while let Some(b) = self.peek(0) {
            if is_delimiter(b) {
                break;
            }

            if b == b'&' {
                self.pos += 1;
                match decode_reference(&self.src[self.pos..]) {
                    Some((c, len)) => {
                        content.push(c);
                        self.pos += len;
                    }
                    None => content.push('&'),
                }
                continue;
            }

            let start = self.pos;
            while let Some(b) = self.peek(0) {
                if b == b'&' || is_delimiter(b) {
                    break;
                }
                self.pos += 1;
            }
            content.push_str(&self.src[start..self.pos]);
        }

        content
    }

    /// Reads one `name = "value"` pair into `attributes`.
    ///
    /// Returns `Ok(false)` if there is no attribute at the cursor.
    fn read_attribute(&mut self, attributes: &mut NameMap<Attribute>) -> XmlResult<bool> {
        let name = self.read_name();
        if name.is_empty() {
            return Ok(false);
        }
        let name_start = self.pos - name.len();

        self.skip_trivia(false);
        if self.peek(0) != Some(b'=') {
            return Err(self.error(XmlErrorKind::NoAssignment));
        }
        self.pos += 1;

        self.skip_trivia(false);
        let quote = match self.peek(0) {
            Some(quote @ (b'"' | b'\'')) => quote,
            _ => return Err(self.error(XmlErrorKind::NoValue)),
        };
        self.pos += 1;

        let value = self.read_content(Some(quote));
        if self.peek(0) != Some(quote) {
            return Err(self.error(XmlErrorKind::OpenString));
        }
        self.pos += 1;

        if attributes.contains(name) {
            return Err(self.error_at(
                name_start,
                XmlErrorKind::DuplicateAttribute(name.to_string()),
            ));
        }

        attributes.insert(Attribute::new(name, value));
        Ok(true)
    }

    /// Reads the optional `<?xml ... ?>` declaration.
    pub(crate) fn read_header(&mut self) -> XmlResult<()> {
        self.skip_trivia(false);

        let is_declaration = self.starts_with("<?xml")
            && matches!(self.peek(5), Some(b' ' | b'\t' | b'\r' | b'\n' | b'?'));
        if !is_declaration {
            warn!("No <?xml> declaration, assuming defaults");
            return Ok(());
        }

        let start = self.pos;
        self.pos += 5;

        let mut attributes = NameMap::new();
        while self.read_attribute(&mut attributes)? {}

        self.skip_trivia(false);
        if !self.starts_with("?>") {
            return Err(self.error(XmlErrorKind::UnterminatedDeclaration));
        }
        self.pos += 2;

        if !attributes.contains("version") {
            return Err(self.error_at(start, XmlErrorKind::NoVersion));
        }

        match attributes.find("encoding").map(Attribute::value) {
            None => warn!("No encoding in <?xml> declaration, assuming UTF-8"),
            Some(encoding) if encoding.eq_ignore_ascii_case("UTF-8") => {}
            Some(encoding) => {
                return Err(self.error_at(
                    start,
                    XmlErrorKind::UnsupportedEncoding(encoding.to_string()),
                ));
            }
        }

        Ok(())
    }

    /// Reads an opening tag with its attributes.
    ///
    /// Returns `Ok(None)` if the cursor is not at an opening tag.
    fn read_opening_tag(&mut self) -> XmlResult<Option<OpeningTag>> {
        if self.peek(0) != Some(b'<') || self.peek(1) == Some(b'/') {
            return Ok(None);
        }

        let start = self.pos;
        self.pos += 1;

        let name = self.read_name();
        if name.is_empty() {
            return Err(self.error(XmlErrorKind::InvalidTag));
        }

        trace!(name, "reading entity");
        let mut entity = Entity::new(name);
        while self.read_attribute(entity.attributes_mut())? {}

        self.skip_trivia(false);
        if self.starts_with("/>") {
            self.pos += 2;
            return Ok(Some(OpeningTag::Empty(entity)));
        }

        if self.peek(0) != Some(b'>') {
            return Err(self.error(XmlErrorKind::InvalidTag));
        }
        self.pos += 1;

        Ok(Some(OpeningTag::Open(OpenEntity { start, entity })))
    }

    /// Reads an entity and everything inside it.
    ///
    /// Open entities are kept on an explicit stack, limited to [`MAX_DEPTH`] levels.
    /// Returns `Ok(None)` if the cursor is not at an opening tag.
    pub(crate) fn read_entity(&mut self) -> XmlResult<Option<Entity>> {
        self.skip_trivia(true);
        let mut stack = match self.read_opening_tag()? {
            None => return Ok(None),
            Some(OpeningTag::Empty(entity)) => return Ok(Some(entity)),
            Some(OpeningTag::Open(open)) => vec![open],
        };

        let mut closed_child = false;
        loop {
            let mut found_body = std::mem::take(&mut closed_child);
            if !found_body {
                if self.at_end() {
                    break;
                }
                self.skip_trivia(false);

                if self.starts_with("</") {
                    self.pos += 2;
                    let Some(open) = stack.pop() else {
                        break;
                    };

                    let entity = self.read_closing_tag(open.entity)?;
                    match stack.last_mut() {
                        Some(parent) => parent.entity.insert_child(entity),
                        None => return Ok(Some(entity)),
                    }

                    closed_child = true;
                    continue;
                }

                self.skip_trivia(true);
                match self.read_opening_tag()? {
                    Some(OpeningTag::Open(child)) => {
                        if stack.len() >= MAX_DEPTH {
                            let kind = XmlErrorKind::TooDeep(MAX_DEPTH);
                            return Err(self.error_at(child.start, kind));
                        }
                        stack.push(child);
                        continue;
                    }
                    Some(OpeningTag::Empty(child)) => {
                        if let Some(parent) = stack.last_mut() {
                            parent.entity.insert_child(child);
                        }
                        found_body = true;
                    }
                    None => {}
                }
            }

            let text = self.read_content(None);
            if !text.is_empty() {
                if let Some(current) = stack.last_mut() {
                    current.entity.push_content(&text);
                }
                found_body = true;
            }

            if !found_body {
                break;
            }
        }

        let (start, name) = match stack.last() {
            Some(open) => (open.start, open.entity.name().to_string()),
            None => (self.pos, String::new()),
        };
        Err(self.error_at(start, XmlErrorKind::NoClosingTag(name)))
    }

    /// Reads the remainder of `</name>`, which must close `entity`.
    fn read_closing_tag(&mut self, mut entity: Entity) -> XmlResult<Entity> {
        let close = self.read_name();
        if close.is_empty() {
            return Err(self.error(XmlErrorKind::InvalidClosingTag));
        }
        let close_start = self.pos - close.len();

        while self.read_space() {}
        if self.peek(0) != Some(b'>') {
            return Err(self.error(XmlErrorKind::InvalidClosingTag));
        }

        if close != entity.name() {
            return Err(self.error_at(
                close_start,
                XmlErrorKind::MismatchedTag {
                    open: entity.name().to_string(),
                    close: close.to_string(),
                },
            ));
        }
        self.pos += 1;

        entity.trim_content();
        Ok(entity)
    }
}

/// An entity whose closing tag has not been read yet.
struct OpenEntity {
    start: usize,
    entity: Entity,
}

enum OpeningTag {
    /// `<name/>`
    Empty(Entity),

    /// `<name>`
    Open(OpenEntity),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> XmlResult<Entity> {
        parse_str(src)
    }

    fn error_kind(src: &str) -> XmlErrorKind {
        match parse(src) {
            Ok(root) => panic!("Expected an error, parsed {root:?}"),
            Err(e) => e.kind,
        }
    }

    #[test]
    fn test_simple_document() {
        let root = parse(r#"<?xml version="1.0" encoding="UTF-8"?><a x="1"><b>text</b></a>"#).unwrap();
        assert_eq!(root.name(), "a");
        assert_eq!(root.attribute_value("x"), Some("1"));
        assert_eq!(root.find_child("b").unwrap().content(), "text");
    }

    #[test]
    fn test_no_declaration() {
        let root = parse("<a/>").unwrap();
        assert_eq!(root.name(), "a");
        assert!(root.children().is_empty());
    }

    #[test]
    fn test_declaration_errors() {
        assert!(matches!(
            error_kind(r#"<?xml encoding="UTF-8"?><a/>"#),
            XmlErrorKind::NoVersion
        ));
        assert!(matches!(
            error_kind(r#"<?xml version="1.0" encoding="ISO-8859-1"?><a/>"#),
            XmlErrorKind::UnsupportedEncoding(e) if e == "ISO-8859-1"
        ));
        assert!(matches!(
            error_kind(r#"<?xml version="1.0" <a/>"#),
            XmlErrorKind::UnterminatedDeclaration
        ));
    }

    #[test]
    fn test_lowercase_encoding_and_missing_encoding() {
        assert!(parse(r#"<?xml version="1.0" encoding="utf-8"?><a/>"#).is_ok());
        assert!(parse(r#"<?xml version='1.0'?><a/>"#).is_ok());
    }

    #[test]
    fn test_byte_order_mark_and_trivia() {
        let src = "\u{FEFF}<!-- leading -->\n<?xml version=\"1.0\"?>\n<!DOCTYPE a [<!ENTITY e \"x\">]>\n<a><!-- inner --></a>";
        let root = parse(src).unwrap();
        assert_eq!(root.name(), "a");
        assert_eq!(root.content(), "");
    }

    #[test]
    fn test_attribute_errors() {
        assert!(matches!(error_kind("<a x/>"), XmlErrorKind::NoAssignment));
        assert!(matches!(error_kind("<a x=1/>"), XmlErrorKind::NoValue));
        assert!(matches!(error_kind(r#"<a x="1/>"#), XmlErrorKind::OpenString));
        assert!(matches!(
            error_kind(r#"<a x="1" x="2"/>"#),
            XmlErrorKind::DuplicateAttribute(name) if name == "x"
        ));
    }

    #[test]
    fn test_attribute_value_decoding() {
        let root = parse(r#"<a v='&lt&quot;x&quot&amp&apos' w = "it's"/>"#).unwrap();
        assert_eq!(root.attribute_value("v"), Some("<\";x\"&'"));
        assert_eq!(root.attribute_value("w"), Some("it's"));
    }

    #[test]
    fn test_tag_errors() {
        assert!(matches!(
            error_kind("<a><b></a>"),
            XmlErrorKind::MismatchedTag { open, close } if open == "b" && close == "a"
        ));
        assert!(matches!(error_kind("<a><b/>"), XmlErrorKind::NoClosingTag(name) if name == "a"));
        assert!(matches!(error_kind("<a>x > y</a>"), XmlErrorKind::NoClosingTag(_)));
        assert!(matches!(error_kind("<a></>"), XmlErrorKind::InvalidClosingTag));
        assert!(matches!(error_kind("<a></a"), XmlErrorKind::InvalidClosingTag));
        assert!(matches!(error_kind("< >"), XmlErrorKind::InvalidTag));
        assert!(matches!(error_kind("<a x='1' ="), XmlErrorKind::InvalidTag));
        assert!(matches!(error_kind("just text"), XmlErrorKind::NoRootEntity));
        assert!(matches!(error_kind(""), XmlErrorKind::NoRootEntity));
    }

    fn nested(depth: usize) -> String {
        format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth))
    }

    #[test]
    fn test_depth_limit() {
        let mut entity = &parse(&nested(MAX_DEPTH)).unwrap();
        let mut depth = 1;
        while let Some(child) = entity.find_child("a") {
            entity = child;
            depth += 1;
        }
        assert_eq!(depth, MAX_DEPTH);

        let error = parse(&nested(MAX_DEPTH + 1)).unwrap_err();
        assert!(matches!(error.kind, XmlErrorKind::TooDeep(MAX_DEPTH)));
        assert_eq!(error.context.position(), (1, 3 * MAX_DEPTH + 1));

        assert!(matches!(
            error_kind(&nested(10_000)),
            XmlErrorKind::TooDeep(_)
        ));
    }

    #[test]
    fn test_nested_content_between_children() {
        let root = parse("<a> one <b><c/>inner</b> two <b/> three </a>").unwrap();
        assert_eq!(root.content(), "one  two  three");
        assert_eq!(root.children_named("b").count(), 2);

        let b = root.find_child("b").unwrap();
        assert_eq!(b.content(), "inner");
        assert!(b.find_child("c").is_some());
    }

    #[test]
    fn test_error_line_number() {
        let error = parse("<a>\n  <b>\n  </c>\n</a>").unwrap_err();
        assert_eq!(error.line(), 3);
        assert_eq!(error.context.snippet, "  </c>");
    }

    #[test]
    fn test_content_and_children() {
        let src = "<a>\n  head\n  <b/>\n  tail &amp more\n  <c>inner</c>\n</a>";
        let root = parse(src).unwrap();
        assert_eq!(root.content(), "head\n  \n  tail & more");
        assert!(root.find_child("b").is_some());
        assert_eq!(root.find_child("c").unwrap().content(), "inner");
    }

    #[test]
    fn test_children_sorted_by_name() {
        let root = parse("<r><z/><y/><x n='1'/><x n='2'/></r>").unwrap();
        let names: Vec<_> = root.children().iter().map(Entity::name).collect();
        assert_eq!(names, ["x", "x", "y", "z"]);

        let first = root.find_child("x").unwrap();
        assert_eq!(first.attribute_value("n"), Some("1"));
        let second = root.next_child(first, "x").unwrap();
        assert_eq!(second.attribute_value("n"), Some("2"));
        assert!(root.next_child(second, "x").is_none());
    }

    #[test]
    fn test_names_are_verbatim() {
        let root = parse("<1st attr.x='v'/>").unwrap();
        assert_eq!(root.name(), "1st");
        assert!(root.attributes().find("attr.x").is_some());
    }

    #[test]
    fn test_invalid_utf8() {
        let error = parse_bytes(b"<a>\xFF</a>").unwrap_err();
        assert!(matches!(error.kind, XmlErrorKind::InvalidUtf8));
        assert_eq!(error.context.position(), (1, 4));
    }
}
