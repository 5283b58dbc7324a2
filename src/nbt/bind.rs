//! Binding between tag trees and typed schemas
//!
//! `FromTag` reads a typed value out of a decoded tree. Struct impls use
//! [`field`] so that missing entries fall back to `Default` while a present
//! entry of the wrong type is reported as malformed input, with the path of
//! the offending field.

use super::{Compound, List, Tag, TagId};
use crate::error::{Error, Result};

/// Build a typed value from a tag
pub trait FromTag: Sized {
    fn from_tag(tag: &Tag) -> Result<Self>;
}

/// Build a tag from a typed value
pub trait IntoTag {
    fn to_tag(&self) -> Result<Tag>;
}

fn mismatch(expected: TagId, found: &Tag) -> Error {
    Error::MalformedInput(format!(
        "expected {}, found {}",
        expected.name(),
        found.id().name()
    ))
}

/// Prefix the field path onto a nested binding error
pub(crate) fn within(name: &str, err: Error) -> Error {
    match err {
        Error::MalformedInput(msg) => Error::MalformedInput(format!("{}: {}", name, msg)),
        other => other,
    }
}

/// Borrow a tag as a compound or report what was found instead
pub fn expect_compound(tag: &Tag) -> Result<&Compound> {
    tag.as_compound().ok_or_else(|| mismatch(TagId::Compound, tag))
}

/// Read an optional field, defaulting when it is absent
pub fn field<T: FromTag + Default>(compound: &Compound, name: &str) -> Result<T> {
    match compound.get(name) {
        Some(tag) => T::from_tag(tag).map_err(|e| within(name, e)),
        None => Ok(T::default()),
    }
}

/// Read every entry of a compound as a named value, keeping entry order
pub fn entries<T: FromTag>(compound: &Compound) -> Result<Vec<(String, T)>> {
    compound
        .iter()
        .map(|(name, tag)| Ok((name.to_string(), T::from_tag(tag).map_err(|e| within(name, e))?)))
        .collect()
}

impl FromTag for i32 {
    fn from_tag(tag: &Tag) -> Result<Self> {
        match *tag {
            Tag::Byte(v) => Ok(v as i32),
            Tag::Short(v) => Ok(v as i32),
            Tag::Int(v) => Ok(v),
            _ => Err(mismatch(TagId::Int, tag)),
        }
    }
}

impl FromTag for i64 {
    fn from_tag(tag: &Tag) -> Result<Self> {
        tag.as_i64().ok_or_else(|| mismatch(TagId::Long, tag))
    }
}

impl FromTag for bool {
    fn from_tag(tag: &Tag) -> Result<Self> {
        tag.as_i64()
            .map(|v| v != 0)
            .ok_or_else(|| mismatch(TagId::Byte, tag))
    }
}

impl FromTag for String {
    fn from_tag(tag: &Tag) -> Result<Self> {
        tag.as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch(TagId::String, tag))
    }
}

impl<T: FromTag> FromTag for Vec<T> {
    fn from_tag(tag: &Tag) -> Result<Self> {
        let list = tag.as_list().ok_or_else(|| mismatch(TagId::List, tag))?;
        list.iter()
            .enumerate()
            .map(|(i, item)| T::from_tag(item).map_err(|e| within(&format!("[{}]", i), e)))
            .collect()
    }
}

impl<T: IntoTag> IntoTag for [T] {
    fn to_tag(&self) -> Result<Tag> {
        let mut list = List::new();
        for item in self {
            list.push(item.to_tag()?)?;
        }
        Ok(Tag::List(list))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl FromTag for Point {
        fn from_tag(tag: &Tag) -> Result<Self> {
            let c = expect_compound(tag)?;
            Ok(Point {
                x: field(c, "x")?,
                y: field(c, "y")?,
            })
        }
    }

    #[test]
    fn test_missing_field_defaults() {
        let mut c = Compound::new();
        c.insert("x", 4i32);
        assert_eq!(Point::from_tag(&Tag::Compound(c)).unwrap(), Point { x: 4, y: 0 });
    }

    #[test]
    fn test_wrong_type_names_the_path() {
        let mut bad = Compound::new();
        bad.insert("x", "four");
        let mut list = List::new();
        list.push(Compound::new()).unwrap();
        list.push(bad).unwrap();
        let mut root = Compound::new();
        root.insert("points", list);

        let err = field::<Vec<Point>>(&root, "points").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed NBT input: points: [1]: x: expected Int, found String"
        );
    }

    #[test]
    fn test_bool_from_byte() {
        assert!(bool::from_tag(&Tag::Byte(1)).unwrap());
        assert!(!bool::from_tag(&Tag::Byte(0)).unwrap());
        assert!(bool::from_tag(&Tag::String("1".into())).is_err());
    }

    #[test]
    fn test_entries_keep_order() {
        let mut c = Compound::new();
        c.insert("z", 1i32);
        c.insert("a", 2i32);
        let named: Vec<(String, i32)> = entries(&c).unwrap();
        assert_eq!(named, vec![("z".to_string(), 1), ("a".to_string(), 2)]);
    }
}
