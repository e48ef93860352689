//! Construction of application objects from elements.
//!
//! An element may name the kind of object it describes in a `class`
//! attribute. The application registers one factory per class name and asks
//! the registry to build objects; the parser and tree never consult it.
//!
//! ```
//! use tagtree_core::{parse_str, FactoryRegistry};
//!
//! #[derive(Debug, PartialEq)]
//! enum Widget {
//!     Button { label: String },
//!     Spacer(i32),
//! }
//!
//! let mut registry = FactoryRegistry::new();
//! registry.register("button", |el| {
//!     Ok(Widget::Button { label: el.attribute_throws("label")?.to_string() })
//! });
//! registry.register("spacer", |el| Ok(Widget::Spacer(el.get_int_default("size", 4)?)));
//!
//! let doc = parse_str(r#"<w class="button" label="OK"></w>"#).unwrap();
//! let widget = registry.instantiate(doc.root_element()).unwrap();
//! assert_eq!(widget, Widget::Button { label: "OK".into() });
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, StructuralError};
use crate::tree::ElementRef;

/// Attribute naming the factory to use.
pub const CLASS_ATTRIBUTE: &str = "class";

pub type Factory<T> = Box<dyn Fn(ElementRef<'_>) -> Result<T>>;

/// Class name -> factory closure.
pub struct FactoryRegistry<T> {
    factories: HashMap<String, Factory<T>>,
}

impl<T> FactoryRegistry<T> {
    pub fn new() -> Self {
        FactoryRegistry {
            factories: HashMap::new(),
        }
    }

    /// Register `factory` for `class`, returning the one it replaces.
    pub fn register<F>(&mut self, class: impl Into<String>, factory: F) -> Option<Factory<T>>
    where
        F: Fn(ElementRef<'_>) -> Result<T> + 'static,
    {
        self.factories.insert(class.into(), Box::new(factory))
    }

    pub fn unregister(&mut self, class: &str) -> bool {
        self.factories.remove(class).is_some()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.factories.contains_key(class)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build an object from `element` using the factory named by its
    /// `class` attribute.
    ///
    /// `MissingAttribute` without a `class` attribute, `UnknownClass` if no
    /// factory is registered under that name; factory errors pass through.
    pub fn instantiate(&self, element: ElementRef<'_>) -> Result<T> {
        let class = element.attribute_throws(CLASS_ATTRIBUTE)?;
        let factory = self.factories.get(class).ok_or_else(|| StructuralError::UnknownClass {
            name: class.to_string(),
        })?;
        log::trace!("instantiating class {} from <{}>", class, element.tag_name());
        factory(element)
    }
}

impl<T> Default for FactoryRegistry<T> {
    fn default() -> Self {
        FactoryRegistry::new()
    }
}

impl<T> fmt::Debug for FactoryRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut classes: Vec<_> = self.factories.keys().collect();
        classes.sort();
        f.debug_struct("FactoryRegistry").field("classes", &classes).finish()
    }
}
