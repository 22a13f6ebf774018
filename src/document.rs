use crate::{
    Calculator, Entity, Evaluate, FromAttribute, ToXmlValue,
    error::{XmlError, XmlErrorKind, XmlResult},
    legal::{legalize_comment, legalize_name},
    node::Attribute,
    parser,
    to_xml::{FormatOptions, write_xml},
};
use std::path::Path;
use tracing::debug;

/// An XML document held in memory as a tree of [`Entity`] values.
///
/// A document is populated either by the stack-based builder ([`Document::new_root`], [`Document::begin`],
/// [`Document::end`], ...), or by reading XML text ([`Document::load`], [`Document::parse_str`]).
///
/// Builder calls act on the innermost open entity. While no entity is open they do nothing.
///
/// Other things to note:
/// - Names given to the builder are legalized with [`legalize_name`](crate::legalize_name)
/// - Names read from XML text are kept as written
/// - Children and attributes are kept in name order; the builder accepts duplicate names
/// - Numeric attributes are read through the document's evaluator, [`Calculator`] by default
///
/// # Example
/// ```rust
/// use xmlentity::Document;
///
/// let mut doc = Document::new();
/// doc.new_root("config");
/// doc.attribute("version", 2);
///     doc.begin("name");
///     doc.content("example");
///     doc.end();
/// doc.end();
///
/// let xml = doc.to_xml().unwrap();
/// let copy = Document::parse_str(&xml).unwrap();
/// assert_eq!(copy.root(), doc.root());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document<E = Calculator> {
    root: Option<Entity>,
    stack: Vec<Entity>,
    evaluator: E,
}
impl Document {
    /// Creates an empty document using the default [`Calculator`] evaluator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document by parsing the given XML text.
    ///
    /// # Errors
    /// Returns an error if the text is not a valid document.
    ///
    /// # Example
    /// ```rust
    /// use xmlentity::Document;
    ///
    /// let doc = Document::parse_str(r#"<item id="7">text</item>"#).unwrap();
    /// let root = doc.root().unwrap();
    /// assert_eq!(root.content(), "text");
    /// assert_eq!(doc.read_attribute::<i32>(root, "id").unwrap(), Some(7));
    /// ```
    pub fn parse_str(src: &str) -> XmlResult<Self> {
        let mut document = Self::new();
        document.load_str(src)?;
        Ok(document)
    }
}
impl<E: Evaluate> Document<E> {
    /// Creates an empty document that reads numeric attributes with the given evaluator.
    #[must_use]
    pub fn with_evaluator(evaluator: E) -> Self {
        Self {
            root: None,
            stack: vec![],
            evaluator,
        }
    }

    /// Returns the evaluator used by [`Document::read_attribute`].
    #[must_use]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Returns the root entity, if there is one.
    ///
    /// While the root is still open, this is the partially built entity. Children that have not been
    /// closed yet are not part of it.
    #[must_use]
    pub fn root(&self) -> Option<&Entity> {
        self.root.as_ref().or(self.stack.first())
    }

    /// Returns true if the builder has an open entity.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Returns the number of open entities.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Discards the current tree and opens a new root entity.
    pub fn new_root(&mut self, name: &str) {
        self.clear();
        self.stack.push(Entity::new(legalize_name(name)));
    }

    /// Opens a child of the current entity. Does nothing if no entity is open.
    pub fn begin(&mut self, name: &str) {
        if self.is_open() {
            self.stack.push(Entity::new(legalize_name(name)));
        }
    }

    /// Closes the current entity.
    ///
    /// Closing the root entity completes the document; further builder calls are ignored until
    /// [`Document::new_root`] is called again.
    pub fn end(&mut self) {
        let Some(entity) = self.stack.pop() else {
            return;
        };

        match self.stack.last_mut() {
            Some(parent) => parent.insert_child(entity),
            None => self.root = Some(entity),
        }
    }

    /// Adds an attribute to the current entity.
    ///
    /// An existing attribute with the same name is kept; both are stored.
    pub fn attribute(&mut self, name: &str, value: impl ToXmlValue) {
        if let Some(entity) = self.stack.last_mut() {
            entity.insert_attribute(Attribute::new(legalize_name(name), value.to_xml_value()));
        }
    }

    /// Appends text to the content of the current entity.
    pub fn content(&mut self, value: impl ToXmlValue) {
        let text = value.to_xml_value();
        if text.is_empty() {
            return;
        }

        if let Some(entity) = self.stack.last_mut() {
            entity.push_content(&text);
        }
    }

    /// Adds a comment block to the current entity. It is written just before the entity's opening tag.
    ///
    /// `---` and `--` are replaced with an em dash and an en dash.
    pub fn comment(&mut self, text: &str) {
        if let Some(entity) = self.stack.last_mut() {
            entity.push_comment(legalize_comment(text));
        }
    }

    /// Closes every open entity, then discards the tree.
    pub fn clear(&mut self) {
        self.stack.clear();
        self.root = None;
    }

    /// Closes every open entity.
    fn close_all(&mut self) {
        while self.is_open() {
            self.end();
        }
    }

    /// Create a formatted XML string from this document, using the default [`FormatOptions`].
    ///
    /// Any open entities are closed first.
    ///
    /// # Errors
    /// Returns [`XmlErrorKind::NoRoot`] if the document is empty.
    pub fn to_xml(&mut self) -> XmlResult<String> {
        self.to_xml_with_options(&FormatOptions::default())
    }

    /// Create a formatted XML string from this document.
    ///
    /// Any open entities are closed first.
    ///
    /// # Errors
    /// Returns [`XmlErrorKind::NoRoot`] if the document is empty.
    ///
    /// # Example
    /// ```rust
    /// use xmlentity::{Document, FormatOptions};
    ///
    /// let mut doc = Document::new();
    /// doc.new_root("list");
    /// doc.begin("item");
    ///
    /// let options = FormatOptions { indent: "    ".to_string() };
    /// let xml = doc.to_xml_with_options(&options).unwrap();
    /// assert!(xml.ends_with("<list>\n    <item/>\n</list>\n"));
    /// ```
    pub fn to_xml_with_options(&mut self, options: &FormatOptions) -> XmlResult<String> {
        self.close_all();
        let Some(root) = &self.root else {
            return Err(XmlErrorKind::NoRoot.into());
        };

        let mut buffer = vec![];
        write_xml(&mut buffer, root, options)?;
        String::from_utf8(buffer).map_err(|_| XmlErrorKind::InvalidUtf8.into())
    }

    /// Writes the document to a file, using the default [`FormatOptions`].
    ///
    /// # Errors
    /// Returns an error if the document is empty, or the file cannot be written.
    pub fn save(&mut self, path: impl AsRef<Path>) -> XmlResult<()> {
        self.save_with_options(path, &FormatOptions::default())
    }

    /// Writes the document to a file.
    ///
    /// Any open entities are closed first. The document is formatted in full before the file is created,
    /// so a failure while formatting leaves the file untouched.
    ///
    /// # Errors
    /// Returns an error if the document is empty, or the file cannot be written.
    pub fn save_with_options(
        &mut self,
        path: impl AsRef<Path>,
        options: &FormatOptions,
    ) -> XmlResult<()> {
        let path = path.as_ref();
        let xml = self
            .to_xml_with_options(options)
            .map_err(|e| e.with_path(path.to_path_buf()))?;

        std::fs::write(path, &xml).map_err(|e| XmlError::from(e).with_path(path.to_path_buf()))?;
        debug!(path = %path.display(), bytes = xml.len(), "saved document");
        Ok(())
    }

    /// Replaces the contents of this document with a document read from a file.
    ///
    /// The document is left empty if reading fails.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, or does not contain a valid document.
    /// The error context carries the path and the position of the problem.
    pub fn load(&mut self, path: impl AsRef<Path>) -> XmlResult<()> {
        let path = path.as_ref();
        self.clear();

        let bytes = std::fs::read(path).map_err(|e| XmlError::from(e).with_path(path.to_path_buf()))?;
        let root = parser::parse_bytes(&bytes).map_err(|e| e.with_path(path.to_path_buf()))?;

        debug!(path = %path.display(), root = root.name(), "loaded document");
        self.root = Some(root);
        Ok(())
    }

    /// Replaces the contents of this document with a document parsed from the given text.
    ///
    /// The document is left empty if parsing fails.
    ///
    /// # Errors
    /// Returns an error if the text is not a valid document.
    pub fn load_str(&mut self, src: &str) -> XmlResult<()> {
        self.clear();
        self.root = Some(parser::parse_str(src)?);
        Ok(())
    }

    /// Reads an attribute of `entity` as a typed value, using the document's evaluator.
    ///
    /// Returns `Ok(None)` if the attribute does not exist.
    ///
    /// # Errors
    /// Returns an error if the attribute exists but cannot be converted.
    pub fn read_attribute<T: FromAttribute>(
        &self,
        entity: &Entity,
        name: &str,
    ) -> XmlResult<Option<T>> {
        entity.read_attribute(name, &self.evaluator)
    }
}
