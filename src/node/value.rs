//! Conversions between Rust values and attribute/content text.
use crate::{Evaluate, XmlResult};

/// A value that can be written as attribute or content text.
///
/// - Text is written verbatim
/// - `bool` is written as `0` or `1`
/// - Signed integers and floats are written as decimal text
/// - `u32` is written as `0x` followed by 8 uppercase hexadecimal digits
pub trait ToXmlValue {
    /// Returns the text representation of the value.
    fn to_xml_value(&self) -> String;
}

impl ToXmlValue for str {
    fn to_xml_value(&self) -> String {
        self.to_string()
    }
}
impl ToXmlValue for String {
    fn to_xml_value(&self) -> String {
        self.clone()
    }
}
impl ToXmlValue for char {
    fn to_xml_value(&self) -> String {
        self.to_string()
    }
}
impl ToXmlValue for bool {
    fn to_xml_value(&self) -> String {
        if *self { "1" } else { "0" }.to_string()
    }
}
impl ToXmlValue for u32 {
    fn to_xml_value(&self) -> String {
        format!("0x{self:08X}")
    }
}
impl<T: ToXmlValue + ?Sized> ToXmlValue for &T {
    fn to_xml_value(&self) -> String {
        (**self).to_xml_value()
    }
}
impl<T: ToXmlValue> ToXmlValue for Option<T> {
    fn to_xml_value(&self) -> String {
        self.as_ref().map(ToXmlValue::to_xml_value).unwrap_or_default()
    }
}

macro_rules! decimal_value {
    ($($t:ty),+) => {
        $(
            impl ToXmlValue for $t {
                fn to_xml_value(&self) -> String {
                    self.to_string()
                }
            }
        )+
    };
}
decimal_value!(i8, i16, i32, i64, isize, f32, f64);

/// A value that can be read from attribute text.
///
/// Numeric types hand the text to an [`Evaluate`] implementation, so values such as `0x000000FF` or `2 * pi`
/// are accepted. Conversions to integers truncate toward zero and saturate at the bounds of the type.
pub trait FromAttribute: Sized {
    /// Converts the raw attribute text into a value.
    ///
    /// # Errors
    /// Returns an error if the text cannot be evaluated.
    fn from_attribute(value: &str, evaluator: &dyn Evaluate) -> XmlResult<Self>;
}

impl FromAttribute for String {
    fn from_attribute(value: &str, _: &dyn Evaluate) -> XmlResult<Self> {
        Ok(value.to_string())
    }
}
impl FromAttribute for bool {
    fn from_attribute(value: &str, evaluator: &dyn Evaluate) -> XmlResult<Self> {
        let value = i64::from_attribute(value, evaluator)?;
        Ok(value != 0)
    }
}

macro_rules! evaluated_value {
    ($($t:ty),+) => {
        $(
            impl FromAttribute for $t {
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::unnecessary_cast
                )]
                fn from_attribute(value: &str, evaluator: &dyn Evaluate) -> XmlResult<Self> {
                    Ok(evaluator.evaluate(value)? as $t)
                }
            }
        )+
    };
}
evaluated_value!(i32, i64, u32, f32, f64);
