use super::Named;

/// An attribute set on an entity, with a name and value:
/// `name = "value"`
///
/// The value is stored raw; it is escaped only when the entity is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    value: String,
}
impl Attribute {
    pub(crate) fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the name of the attribute.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw value of the attribute.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}
impl Named for Attribute {
    fn name(&self) -> &str {
        &self.name
    }
}
