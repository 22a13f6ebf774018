//! The types of nodes and related data that can appear in a document tree.

mod name_map;
pub use name_map::*;

mod entity;
pub use entity::*;

mod attribute;
pub use attribute::*;

mod value;
pub use value::*;

/// An item stored in a [`NameMap`], ordered by its name.
pub trait Named {
    /// Returns the name the item is ordered by.
    fn name(&self) -> &str;
}
