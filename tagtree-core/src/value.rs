//! Typed attribute values.
//!
//! Attributes are stored as text. The accessors on
//! [`ElementRef`](crate::tree::ElementRef) convert through
//! [`AttributeValue`], which is implemented for the four types the format
//! persists: `i32`, `i64`, `f64` and `bool`.

/// A type that can be read from and written to an attribute string.
pub trait AttributeValue: Sized {
    /// Name used in `InvalidFormat` errors.
    const TYPE_NAME: &'static str;

    /// Parse the attribute text, `None` if it is not a valid value.
    fn parse_attribute(text: &str) -> Option<Self>;

    /// Render for storage in an attribute.
    fn to_attribute(&self) -> String;
}

impl AttributeValue for i32 {
    const TYPE_NAME: &'static str = "int";

    fn parse_attribute(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    fn to_attribute(&self) -> String {
        self.to_string()
    }
}

impl AttributeValue for i64 {
    const TYPE_NAME: &'static str = "long";

    fn parse_attribute(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    fn to_attribute(&self) -> String {
        self.to_string()
    }
}

impl AttributeValue for f64 {
    const TYPE_NAME: &'static str = "double";

    fn parse_attribute(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    fn to_attribute(&self) -> String {
        self.to_string()
    }
}

/// Case-insensitive `true` / `false`; anything else is invalid.
impl AttributeValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn parse_attribute(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("true") {
            Some(true)
        } else if text.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    fn to_attribute(&self) -> String {
        self.to_string()
    }
}
