//! NBT (Named Binary Tag) data model
//!
//! NBT is the typed binary container format Minecraft and its mods use for
//! save data. This module holds the in-memory tree and the codecs built on it.
//!
//! ## Format Overview
//!
//! Every value is one of twelve payload types identified by a one-byte tag id:
//! - fixed-width big-endian integers and floats (Byte, Short, Int, Long, Float, Double)
//! - length-prefixed strings (Java Modified UTF-8)
//! - homogeneous lists carrying their element id once
//! - compounds: named values terminated by an End tag
//! - typed arrays of bytes, ints or longs
//!
//! A file is a single named root compound, optionally gzip-compressed.
//!
//! ## Example
//!
//! ```rust
//! use opac2ftb::nbt::{self, Compound, Tag};
//!
//! let mut root = Compound::new();
//! root.insert("username", "Steve");
//! root.insert("confirmedActivity", 1_700_000_000i64);
//!
//! let bytes = nbt::to_bytes(&root)?;
//! let decoded = nbt::from_bytes(&bytes)?;
//! assert_eq!(decoded, root);
//!
//! let text = nbt::to_snbt(&Tag::Compound(root))?;
//! assert_eq!(text, r#"{ username: "Steve", confirmedActivity: 1700000000L }"#);
//! # Ok::<(), opac2ftb::Error>(())
//! ```

pub mod bind;
mod mutf8;
pub mod reader;
pub mod snbt;
pub mod writer;

use num_enum::TryFromPrimitive;

use crate::error::{Error, Result};

pub use bind::{FromTag, IntoTag};
pub use reader::{from_bytes, NbtReader};
pub use snbt::to_snbt;
pub use writer::{to_bytes, NbtWriter};

/// Tag id preceding every payload in the binary format
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum TagId {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

impl TagId {
    pub fn name(self) -> &'static str {
        match self {
            TagId::End => "End",
            TagId::Byte => "Byte",
            TagId::Short => "Short",
            TagId::Int => "Int",
            TagId::Long => "Long",
            TagId::Float => "Float",
            TagId::Double => "Double",
            TagId::ByteArray => "ByteArray",
            TagId::String => "String",
            TagId::List => "List",
            TagId::Compound => "Compound",
            TagId::IntArray => "IntArray",
            TagId::LongArray => "LongArray",
        }
    }
}

/// A single NBT value
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(List),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Tag {
    pub fn id(&self) -> TagId {
        match self {
            Tag::Byte(_) => TagId::Byte,
            Tag::Short(_) => TagId::Short,
            Tag::Int(_) => TagId::Int,
            Tag::Long(_) => TagId::Long,
            Tag::Float(_) => TagId::Float,
            Tag::Double(_) => TagId::Double,
            Tag::ByteArray(_) => TagId::ByteArray,
            Tag::String(_) => TagId::String,
            Tag::List(_) => TagId::List,
            Tag::Compound(_) => TagId::Compound,
            Tag::IntArray(_) => TagId::IntArray,
            Tag::LongArray(_) => TagId::LongArray,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Tag::Compound(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Tag::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::String(s) => Some(s),
            _ => None,
        }
    }

    /// Widen any integer payload to i64
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Tag::Byte(v) => Some(v as i64),
            Tag::Short(v) => Some(v as i64),
            Tag::Int(v) => Some(v as i64),
            Tag::Long(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! impl_tag_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Tag {
                fn from(value: $ty) -> Self {
                    Tag::$variant(value)
                }
            }
        )*
    };
}

impl_tag_from! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    List => List,
    Compound => Compound,
}

impl From<bool> for Tag {
    fn from(value: bool) -> Self {
        Tag::Byte(value as i8)
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::String(value.to_string())
    }
}

/// Homogeneous list of tags
///
/// The element id is fixed by the first pushed value. An empty list keeps
/// whatever id it was created with (End by default), matching what the
/// game writes for empty lists.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    element: TagId,
    items: Vec<Tag>,
}

impl Default for List {
    fn default() -> Self {
        Self::new()
    }
}

impl List {
    pub fn new() -> Self {
        List {
            element: TagId::End,
            items: Vec::new(),
        }
    }

    /// Empty list with a declared element type
    pub fn of(element: TagId) -> Self {
        List {
            element,
            items: Vec::new(),
        }
    }

    pub fn element_id(&self) -> TagId {
        self.element
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.items.iter()
    }

    /// Append a value, rejecting one whose type differs from the list's
    pub fn push(&mut self, tag: impl Into<Tag>) -> Result<()> {
        let tag = tag.into();
        if self.items.is_empty() && self.element == TagId::End {
            self.element = tag.id();
        } else if tag.id() != self.element {
            return Err(Error::UnencodableValue(format!(
                "{} element in a list of {}",
                tag.id().name(),
                self.element.name()
            )));
        }
        self.items.push(tag);
        Ok(())
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Named values in insertion order
///
/// Order is the order entries were inserted (for decoded data, the order
/// they appear on disk), so rendering a compound is reproducible.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Compound {
    entries: Vec<(String, Tag)>,
}

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value. A replaced entry keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, tag: impl Into<Tag>) -> Option<Tag> {
        let name = name.into();
        let tag = tag.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, tag)),
            None => {
                self.entries.push((name, tag));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}
