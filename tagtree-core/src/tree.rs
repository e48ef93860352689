//! Element tree.
//!
//! A [`Document`] owns every element in an index-based arena. Ownership
//! edges are the `children` lists; the `parent` link is a plain index kept in
//! sync with them, so there is no reference cycle and no interior mutability.
//!
//! Reading goes through the borrowed [`ElementRef`] view, mutation of a
//! single element through [`ElementMut`], and child-list edits through
//! methods on [`Document`] (they touch two elements at once).
//!
//! # Example
//!
//! ```
//! use tagtree_core::Document;
//!
//! let mut doc = Document::new("layout").unwrap();
//! let window = doc.create_element("window").unwrap();
//! doc.element_mut(window).add_int_attribute("width", 640).unwrap();
//! doc.add_child(doc.root(), window).unwrap();
//!
//! let found = doc.root_element().find_child_by_name("WINDOW").unwrap();
//! assert_eq!(found.get_int_throws("width").unwrap(), 640);
//! assert_eq!(found.parent().map(|p| p.id()), Some(doc.root()));
//! ```

use std::fmt;

use crate::error::{Result, StructuralError};
use crate::lexer::is_identifier_char;
use crate::value::AttributeValue;

// ============================================================================
// Core Types
// ============================================================================

/// Handle to an element in its document's arena.
///
/// A handle is a slot index plus the generation of the slot, so a handle to
/// a destroyed element never resolves to whatever reuses its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    index: u32,
    generation: u32,
}

impl ElementId {
    fn new(index: usize, generation: u32) -> Result<Self> {
        let index = u32::try_from(index).map_err(|_| StructuralError::ArenaFull)?;
        Ok(ElementId { index, generation })
    }

    fn index(self) -> usize {
        self.index as usize
    }
}

/// A name/value attribute pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Internal element storage.
#[derive(Debug, Clone)]
struct ElementData {
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    tag_name: String,
    /// Insertion order is serialization order.
    attributes: Vec<Attribute>,
    contents: Option<String>,
    comment: Option<String>,
}

impl ElementData {
    fn new(tag_name: String) -> Self {
        ElementData {
            parent: None,
            children: Vec::new(),
            tag_name,
            attributes: Vec::new(),
            contents: None,
            comment: None,
        }
    }
}

/// One arena slot. `data` is `None` while the slot is on the free list.
#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    data: Option<ElementData>,
}

/// Names must read back as a single identifier: non-empty, no lexer
/// whitespace, symbol or quote, and no leading `!` (which would turn
/// `<!name` into a comment opener).
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.starts_with('!') || !name.chars().all(is_identifier_char) {
        return Err(StructuralError::InvalidName {
            name: name.to_string(),
        }
        .into());
    }
    Ok(())
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

// ============================================================================
// Document
// ============================================================================

/// An element tree together with the arena that owns its elements.
///
/// An element lives until it is destroyed: [`Document::remove_child`] and
/// [`Document::replace_child`] destroy the subtree they take out, and
/// [`Document::destroy`] frees a detached subtree. Destroyed slots are
/// reused by later [`Document::create_element`] calls, and handles to them
/// stop resolving. [`Document::detach_child`] unlinks a subtree without
/// destroying it so it can be attached elsewhere.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: ElementId,
}

impl Document {
    /// Create a document whose root element is `tag_name`.
    pub fn new(tag_name: &str) -> Result<Self> {
        let mut doc = Document::empty();
        doc.create_element(tag_name)?;
        Ok(doc)
    }

    /// An arena with no elements. The first element created becomes the root.
    pub(crate) fn empty() -> Self {
        Document {
            slots: Vec::new(),
            free: Vec::new(),
            root: ElementId {
                index: 0,
                generation: 0,
            },
        }
    }

    /// The root element's id.
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// The root element.
    pub fn root_element(&self) -> ElementRef<'_> {
        self.element(self.root)
    }

    /// Number of live elements, attached or not.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Does `id` name a live element of this arena?
    ///
    /// A handle taken from another document can still resolve here if it
    /// happens to match a live slot; handles are only checked against this
    /// arena.
    pub fn contains(&self, id: ElementId) -> bool {
        self.try_data(id).is_some()
    }

    /// Look up an element, `None` if `id` is destroyed or out of range.
    pub fn get(&self, id: ElementId) -> Option<ElementRef<'_>> {
        self.contains(id).then_some(ElementRef { doc: self, id })
    }

    /// Read access to an element.
    ///
    /// # Panics
    ///
    /// If `id` does not name a live element of this document.
    pub fn element(&self, id: ElementId) -> ElementRef<'_> {
        assert!(self.contains(id), "{id:?} is not a live element of this document");
        ElementRef { doc: self, id }
    }

    /// Write access to a single element.
    ///
    /// # Panics
    ///
    /// If `id` does not name a live element of this document.
    pub fn element_mut(&mut self, id: ElementId) -> ElementMut<'_> {
        assert!(self.contains(id), "{id:?} is not a live element of this document");
        ElementMut { doc: self, id }
    }

    /// Create a detached element.
    ///
    /// Fails with `InvalidName` if the tag could not be read back as a
    /// single identifier, `ArenaFull` if the arena has no index left.
    pub fn create_element(&mut self, tag_name: &str) -> Result<ElementId> {
        validate_name(tag_name)?;
        let data = ElementData::new(tag_name.to_string());

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.data = Some(data);
            return ElementId::new(index, slot.generation);
        }

        let id = ElementId::new(self.slots.len(), 0)?;
        self.slots.push(Slot {
            generation: 0,
            data: Some(data),
        });
        Ok(id)
    }

    /// Create a detached element with initial contents.
    ///
    /// Contents holding a literal `"` are dropped with a warning, exactly as
    /// [`ElementMut::add_contents`] does.
    pub fn create_element_with_contents(&mut self, tag_name: &str, contents: &str) -> Result<ElementId> {
        let id = self.create_element(tag_name)?;
        self.element_mut(id).add_contents(contents);
        Ok(id)
    }

    fn try_data(&self, id: ElementId) -> Option<&ElementData> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_ref())
    }

    fn data(&self, id: ElementId) -> &ElementData {
        match self.try_data(id) {
            Some(data) => data,
            None => panic!("{id:?} is not a live element of this document"),
        }
    }

    fn data_mut(&mut self, id: ElementId) -> &mut ElementData {
        match self
            .slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_mut())
        {
            Some(data) => data,
            None => panic!("{id:?} is not a live element of this document"),
        }
    }

    fn check_live(&self, id: ElementId) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(StructuralError::UnknownElement {
                id: format!("{id:?}"),
            }
            .into())
        }
    }

    // ---- Child list edits ----

    /// Append `child` to `parent`'s children.
    ///
    /// A child that already has a parent is moved: it is detached from its
    /// old parent first. Attaching the root, or an element beneath itself or
    /// one of its descendants, fails with `InvalidAttach`; a destroyed or
    /// out-of-range id fails with `UnknownElement`.
    pub fn add_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        self.check_attachable(parent, child)?;
        self.unlink(child);
        self.data_mut(parent).children.push(child);
        self.data_mut(child).parent = Some(parent);
        Ok(())
    }

    /// Replace `existing` (matched by identity) among `parent`'s children.
    ///
    /// Returns `Ok(false)` if `existing` is not a child of `parent`.
    /// Otherwise `new`, if given, takes its index, and `existing` is
    /// destroyed together with its subtree.
    pub fn replace_child(
        &mut self,
        parent: ElementId,
        existing: ElementId,
        new: Option<ElementId>,
    ) -> Result<bool> {
        self.check_live(parent)?;
        if !self.contains(existing) || !self.data(parent).children.contains(&existing) {
            return Ok(false);
        }
        if new == Some(existing) {
            return Ok(true);
        }
        if let Some(new) = new {
            self.check_attachable(parent, new)?;
            self.unlink(new);
        }

        let children = &mut self.data_mut(parent).children;
        let Some(index) = children.iter().position(|&c| c == existing) else {
            return Ok(false);
        };
        match new {
            Some(new) => children[index] = new,
            None => {
                children.remove(index);
            }
        }
        self.data_mut(existing).parent = None;
        if let Some(new) = new {
            self.data_mut(new).parent = Some(parent);
        }
        self.free_subtree(existing);
        Ok(true)
    }

    /// Remove `child` from `parent` and destroy it with its subtree.
    ///
    /// Returns `false` if it was not a child of `parent`, or either id is
    /// not live.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        if !self.detach_child(parent, child) {
            return false;
        }
        self.free_subtree(child);
        true
    }

    /// Unlink `child` from `parent` and keep it alive, detached, so it can
    /// be attached again. Returns `false` if it was not a child of `parent`,
    /// or either id is not live.
    pub fn detach_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        if !self.contains(parent) || !self.contains(child) {
            return false;
        }
        let children = &mut self.data_mut(parent).children;
        match children.iter().position(|&c| c == child) {
            Some(index) => {
                children.remove(index);
                self.data_mut(child).parent = None;
                true
            }
            None => false,
        }
    }

    /// Destroy a detached element and its subtree.
    ///
    /// Returns `false` for the root, an attached element, or an id that is
    /// not live.
    pub fn destroy(&mut self, id: ElementId) -> bool {
        if id == self.root || self.try_data(id).map_or(true, |data| data.parent.is_some()) {
            return false;
        }
        self.free_subtree(id);
        true
    }

    /// Unlink `id` from its current parent, if any.
    fn unlink(&mut self, id: ElementId) {
        if let Some(parent) = self.data(id).parent {
            self.detach_child(parent, id);
        }
    }

    /// Return `id` and every element beneath it to the free list.
    fn free_subtree(&mut self, id: ElementId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            let slot = &mut self.slots[id.index()];
            if let Some(data) = slot.data.take() {
                pending.extend(data.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index());
            }
        }
    }

    fn check_attachable(&self, parent: ElementId, child: ElementId) -> Result<()> {
        self.check_live(parent)?;
        self.check_live(child)?;
        if child == self.root {
            return Err(StructuralError::InvalidAttach {
                reason: "the document root cannot become a child",
            }
            .into());
        }
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(StructuralError::InvalidAttach {
                    reason: "an element cannot be attached beneath itself",
                }
                .into());
            }
            cursor = self.data(id).parent;
        }
        Ok(())
    }
}

// ============================================================================
// ElementRef (read view)
// ============================================================================

/// Borrowed read-only view of one element.
#[derive(Clone, Copy)]
pub struct ElementRef<'doc> {
    doc: &'doc Document,
    id: ElementId,
}

impl<'doc> ElementRef<'doc> {
    fn data(&self) -> &'doc ElementData {
        self.doc.data(self.id)
    }

    fn view(&self, id: ElementId) -> ElementRef<'doc> {
        ElementRef { doc: self.doc, id }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn document(&self) -> &'doc Document {
        self.doc
    }

    pub fn tag_name(&self) -> &'doc str {
        &self.data().tag_name
    }

    pub fn contents(&self) -> Option<&'doc str> {
        self.data().contents.as_deref()
    }

    pub fn comment(&self) -> Option<&'doc str> {
        self.data().comment.as_deref()
    }

    pub fn parent(&self) -> Option<ElementRef<'doc>> {
        self.data().parent.map(|id| self.view(id))
    }

    // ---- Attributes ----

    pub fn attribute(&self, name: &str) -> Option<&'doc str> {
        self.data()
            .attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Like [`attribute`](Self::attribute), failing with `MissingAttribute`.
    pub fn attribute_throws(&self, name: &str) -> Result<&'doc str> {
        self.attribute(name).ok_or_else(|| {
            StructuralError::MissingAttribute {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&'doc str, &'doc str)> + 'doc {
        self.data()
            .attributes
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
    }

    pub fn attribute_count(&self) -> usize {
        self.data().attributes.len()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    // ---- Typed attributes ----

    /// Parse a required attribute.
    ///
    /// `MissingAttribute` if absent, `InvalidFormat` if unparsable.
    pub fn get_throws<T: AttributeValue>(&self, name: &str) -> Result<T> {
        let text = self.attribute_throws(name)?;
        parse_typed(name, text)
    }

    /// Parse an optional attribute, `default` if absent.
    ///
    /// A present but unparsable value still fails with `InvalidFormat`.
    pub fn get_default<T: AttributeValue>(&self, name: &str, default: T) -> Result<T> {
        match self.attribute(name) {
            Some(text) => parse_typed(name, text),
            None => Ok(default),
        }
    }

    pub fn get_int_throws(&self, name: &str) -> Result<i32> {
        self.get_throws(name)
    }

    pub fn get_int_default(&self, name: &str, default: i32) -> Result<i32> {
        self.get_default(name, default)
    }

    pub fn get_long_throws(&self, name: &str) -> Result<i64> {
        self.get_throws(name)
    }

    pub fn get_long_default(&self, name: &str, default: i64) -> Result<i64> {
        self.get_default(name, default)
    }

    pub fn get_double_throws(&self, name: &str) -> Result<f64> {
        self.get_throws(name)
    }

    pub fn get_double_default(&self, name: &str, default: f64) -> Result<f64> {
        self.get_default(name, default)
    }

    pub fn get_bool_throws(&self, name: &str) -> Result<bool> {
        self.get_throws(name)
    }

    /// Never fails: anything but case-insensitive `true`/`false` yields `default`.
    pub fn get_bool_default(&self, name: &str, default: bool) -> bool {
        self.attribute(name)
            .and_then(bool::parse_attribute)
            .unwrap_or(default)
    }

    // ---- Children ----

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn child(&self, index: usize) -> Option<ElementRef<'doc>> {
        self.data().children.get(index).map(|&id| self.view(id))
    }

    pub fn children(&self) -> impl Iterator<Item = ElementRef<'doc>> + 'doc {
        let doc = self.doc;
        self.data()
            .children
            .iter()
            .map(move |&id| ElementRef { doc, id })
    }

    /// First child whose tag matches `name`, ignoring case.
    pub fn find_child_by_name(&self, name: &str) -> Option<ElementRef<'doc>> {
        self.children().find(|c| eq_ignore_case(c.tag_name(), name))
    }

    pub fn find_child_by_name_throws(&self, name: &str) -> Result<ElementRef<'doc>> {
        self.find_child_by_name(name).ok_or_else(|| {
            StructuralError::NotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// First child whose attribute `attribute` equals `value`, ignoring case.
    pub fn find_child_by_attribute(&self, attribute: &str, value: &str) -> Option<ElementRef<'doc>> {
        self.children()
            .find(|c| c.attribute(attribute).is_some_and(|v| eq_ignore_case(v, value)))
    }

    pub fn find_child_by_attribute_throws(&self, attribute: &str, value: &str) -> Result<ElementRef<'doc>> {
        self.find_child_by_attribute(attribute, value).ok_or_else(|| {
            StructuralError::NotFound {
                name: format!("{attribute}={value}"),
            }
            .into()
        })
    }

    /// Compare tag, attributes, contents, comment and children of the two
    /// subtrees.
    ///
    /// Ids and documents may differ. Walks with an explicit stack, so depth
    /// is not limited by the call stack.
    pub fn structure_eq(&self, other: &ElementRef<'_>) -> bool {
        let mut pending = vec![(*self, *other)];
        while let Some((x, y)) = pending.pop() {
            let (a, b) = (x.data(), y.data());
            if a.tag_name != b.tag_name
                || a.attributes != b.attributes
                || a.contents != b.contents
                || a.comment != b.comment
                || a.children.len() != b.children.len()
            {
                return false;
            }
            pending.extend(x.children().zip(y.children()));
        }
        true
    }
}

fn parse_typed<T: AttributeValue>(name: &str, text: &str) -> Result<T> {
    T::parse_attribute(text).ok_or_else(|| {
        StructuralError::InvalidFormat {
            name: name.to_string(),
            value: text.to_string(),
            expected_type: T::TYPE_NAME,
        }
        .into()
    })
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data();
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("tag_name", &data.tag_name)
            .field("attributes", &data.attributes)
            .field("contents", &data.contents)
            .field("comment", &data.comment)
            .field("children", &data.children)
            .finish()
    }
}

// ============================================================================
// ElementMut (single-element writes)
// ============================================================================

/// Mutable access to one element's attributes, contents and comment.
pub struct ElementMut<'doc> {
    doc: &'doc mut Document,
    id: ElementId,
}

impl ElementMut<'_> {
    fn data(&mut self) -> &mut ElementData {
        self.doc.data_mut(self.id)
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Reborrow as a read view.
    pub fn view(&self) -> ElementRef<'_> {
        ElementRef {
            doc: &*self.doc,
            id: self.id,
        }
    }

    /// Insert an attribute, or overwrite it in place if it already exists.
    ///
    /// Fails with `InvalidName` if `name` is empty or contains whitespace.
    pub fn add_attribute(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        validate_name(name)?;
        let value = value.into();
        let attributes = &mut self.data().attributes;
        match attributes.iter().position(|a| a.name == name) {
            Some(index) => attributes[index].value = value,
            None => attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
        Ok(())
    }

    /// Store a typed value as attribute text.
    pub fn add_typed_attribute<T: AttributeValue>(&mut self, name: &str, value: T) -> Result<()> {
        self.add_attribute(name, value.to_attribute())
    }

    pub fn add_int_attribute(&mut self, name: &str, value: i32) -> Result<()> {
        self.add_typed_attribute(name, value)
    }

    pub fn add_long_attribute(&mut self, name: &str, value: i64) -> Result<()> {
        self.add_typed_attribute(name, value)
    }

    pub fn add_double_attribute(&mut self, name: &str, value: f64) -> Result<()> {
        self.add_typed_attribute(name, value)
    }

    pub fn add_bool_attribute(&mut self, name: &str, value: bool) -> Result<()> {
        self.add_typed_attribute(name, value)
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let attributes = &mut self.data().attributes;
        let index = attributes.iter().position(|a| a.name == name)?;
        Some(attributes.remove(index).value)
    }

    /// Append to the contents, or set them if there are none yet.
    ///
    /// Text holding a literal `"` cannot be written back out, so it is
    /// dropped with a warning instead of failing. Returns whether the text
    /// was appended.
    pub fn add_contents(&mut self, text: &str) -> bool {
        let data = self.data();
        if text.contains('"') {
            log::warn!(
                "dropping contents for <{}>: text contains a literal '\"': {:?}",
                data.tag_name,
                text
            );
            return false;
        }
        data.contents.get_or_insert_with(String::new).push_str(text);
        true
    }

    pub fn clear_contents(&mut self) {
        self.data().contents = None;
    }

    /// Set the comment written just before this element's opening tag.
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.data().comment = Some(comment.into());
    }

    pub fn clear_comment(&mut self) {
        self.data().comment = None;
    }
}

// ============================================================================
// Tests
// ============================================================================
