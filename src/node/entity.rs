use super::{Attribute, FromAttribute, NameMap, Named};
use crate::{Evaluate, XmlResult, legalize_name};

/// An element of the document tree, with a name, text content, comments, attributes and children:
/// `<name attr = "value">content</name>`
///
/// Children and attributes are kept in name order, not in the order they were added or parsed.
/// Entries sharing a name are adjacent, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    name: String,
    content: String,
    comments: Vec<String>,
    children: NameMap<Entity>,
    attributes: NameMap<Attribute>,
}
impl Entity {
    /// Creates an entity with the given name, used verbatim.
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: String::new(),
            comments: vec![],
            children: NameMap::new(),
            attributes: NameMap::new(),
        }
    }

    pub(crate) fn insert_child(&mut self, child: Entity) {
        self.children.insert(child);
    }

    pub(crate) fn insert_attribute(&mut self, attribute: Attribute) {
        self.attributes.insert(attribute);
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut NameMap<Attribute> {
        &mut self.attributes
    }

    pub(crate) fn push_content(&mut self, text: &str) {
        self.content.push_str(text);
    }

    pub(crate) fn trim_content(&mut self) {
        let trimmed = self.content.trim();
        if trimmed.len() != self.content.len() {
            self.content = trimmed.to_string();
        }
    }

    pub(crate) fn push_comment(&mut self, comment: String) {
        self.comments.push(comment);
    }

    /// Returns the name of the entity.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the text content of the entity, or an empty string.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the comment blocks attached to the entity, in the order they were added.
    #[must_use]
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Returns the children of the entity, in name order.
    #[must_use]
    pub fn children(&self) -> &NameMap<Entity> {
        &self.children
    }

    /// Returns the attributes of the entity, in name order.
    #[must_use]
    pub fn attributes(&self) -> &NameMap<Attribute> {
        &self.attributes
    }

    /// Finds the first child with the given name.
    /// The name is legalized before the lookup.
    #[must_use]
    pub fn find_child(&self, name: &str) -> Option<&Entity> {
        self.children.find(&legalize_name(name))
    }

    /// Returns the child following `previous`, if it has the given name.
    ///
    /// Used with [`Entity::find_child`] to walk over same-named children one at a time:
    /// ```rust
    /// use xmlentity::Document;
    ///
    /// let mut doc = Document::new();
    /// doc.new_root("root");
    /// for n in 0..3 {
    ///     doc.begin("item");
    ///     doc.content(n);
    ///     doc.end();
    /// }
    /// doc.end();
    ///
    /// let root = doc.root().unwrap();
    /// let mut item = root.find_child("item");
    /// let mut seen = vec![];
    /// while let Some(child) = item {
    ///     seen.push(child.content().to_string());
    ///     item = root.next_child(child, "item");
    /// }
    /// assert_eq!(seen, ["0", "1", "2"]);
    /// ```
    #[must_use]
    pub fn next_child(&self, previous: &Entity, name: &str) -> Option<&Entity> {
        let name = legalize_name(name);
        self.children
            .successor(previous)
            .filter(|next| next.name == name)
    }

    /// Iterates over all children with the given name, in insertion order.
    /// The name is legalized before the lookup.
    pub fn children_named(&self, name: &str) -> impl Iterator<Item = &Entity> {
        self.children.get_all(&legalize_name(name)).iter()
    }

    /// Finds the first attribute with the given name.
    /// The name is legalized before the lookup.
    #[must_use]
    pub fn find_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.find(&legalize_name(name))
    }

    /// Returns the raw value of the first attribute with the given name.
    #[must_use]
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.find_attribute(name).map(Attribute::value)
    }

    /// Reads an attribute as a typed value, evaluating numeric text with `evaluator`.
    ///
    /// Returns `Ok(None)` if the attribute does not exist.
    ///
    /// # Errors
    /// Returns an error if the attribute exists but cannot be converted.
    ///
    /// # Example
    /// ```rust
    /// use xmlentity::{Calculator, Document};
    ///
    /// let mut doc = Document::new();
    /// doc.new_root("root");
    /// doc.attribute("width", "2 * 8");
    /// doc.attribute("mask", 255u32);
    /// doc.end();
    ///
    /// let root = doc.root().unwrap();
    /// assert_eq!(root.read_attribute::<i32>("width", &Calculator).unwrap(), Some(16));
    /// assert_eq!(root.read_attribute::<u32>("mask", &Calculator).unwrap(), Some(255));
    /// assert_eq!(root.read_attribute::<i32>("height", &Calculator).unwrap(), None);
    /// ```
    pub fn read_attribute<T: FromAttribute>(
        &self,
        name: &str,
        evaluator: &dyn Evaluate,
    ) -> XmlResult<Option<T>> {
        self.find_attribute(name)
            .map(|attribute| T::from_attribute(attribute.value(), evaluator))
            .transpose()
    }
}
impl Named for Entity {
    fn name(&self) -> &str {
        &self.name
    }
}
