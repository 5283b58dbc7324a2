//! Binary NBT encoder

use byteorder::{BigEndian, WriteBytesExt};
use std::io::Write;

use super::{mutf8, Compound, List, Tag, TagId};
use crate::error::{Error, Result};

/// Encode a root compound (with an empty root name) as uncompressed NBT
pub fn to_bytes(root: &Compound) -> Result<Vec<u8>> {
    let mut writer = NbtWriter::new(Vec::new());
    writer.write_root("", root)?;
    Ok(writer.into_inner())
}

/// Writer producing the big-endian binary form
pub struct NbtWriter<W> {
    inner: W,
}

impl<W: Write> NbtWriter<W> {
    pub fn new(inner: W) -> Self {
        NbtWriter { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_root(&mut self, name: &str, root: &Compound) -> Result<()> {
        self.inner.write_u8(TagId::Compound as u8)?;
        self.write_string(name)?;
        self.write_compound(root)
    }

    pub fn write_payload(&mut self, tag: &Tag) -> Result<()> {
        match tag {
            Tag::Byte(v) => self.inner.write_i8(*v)?,
            Tag::Short(v) => self.inner.write_i16::<BigEndian>(*v)?,
            Tag::Int(v) => self.inner.write_i32::<BigEndian>(*v)?,
            Tag::Long(v) => self.inner.write_i64::<BigEndian>(*v)?,
            Tag::Float(v) => self.inner.write_f32::<BigEndian>(*v)?,
            Tag::Double(v) => self.inner.write_f64::<BigEndian>(*v)?,
            Tag::ByteArray(values) => {
                self.write_len(values.len())?;
                for v in values {
                    self.inner.write_i8(*v)?;
                }
            }
            Tag::String(s) => self.write_string(s)?,
            Tag::List(list) => self.write_list(list)?,
            Tag::Compound(compound) => self.write_compound(compound)?,
            Tag::IntArray(values) => {
                self.write_len(values.len())?;
                for v in values {
                    self.inner.write_i32::<BigEndian>(*v)?;
                }
            }
            Tag::LongArray(values) => {
                self.write_len(values.len())?;
                for v in values {
                    self.inner.write_i64::<BigEndian>(*v)?;
                }
            }
        }
        Ok(())
    }

    fn write_compound(&mut self, compound: &Compound) -> Result<()> {
        for (name, value) in compound.iter() {
            self.inner.write_u8(value.id() as u8)?;
            self.write_string(name)?;
            self.write_payload(value)?;
        }
        self.inner.write_u8(TagId::End as u8)?;
        Ok(())
    }

    fn write_list(&mut self, list: &List) -> Result<()> {
        self.inner.write_u8(list.element_id() as u8)?;
        self.write_len(list.len())?;
        for item in list {
            self.write_payload(item)?;
        }
        Ok(())
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        let bytes = mutf8::encode(s);
        let len = u16::try_from(bytes.len()).map_err(|_| {
            Error::UnencodableValue(format!("string of {} bytes exceeds 65535", bytes.len()))
        })?;
        self.inner.write_u16::<BigEndian>(len)?;
        self.inner.write_all(&bytes)?;
        Ok(())
    }

    fn write_len(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len)
            .map_err(|_| Error::UnencodableValue(format!("{} elements exceed i32::MAX", len)))?;
        self.inner.write_i32::<BigEndian>(len)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nbt::from_bytes;

    #[test]
    fn test_write_matches_game_layout() {
        let mut root = Compound::new();
        root.insert("x", 5i32);
        let bytes = to_bytes(&root).unwrap();
        assert_eq!(
            bytes,
            vec![0x0A, 0x00, 0x00, 0x03, 0x00, 0x01, b'x', 0x00, 0x00, 0x00, 0x05, 0x00]
        );
    }

    #[test]
    fn test_every_tag_type_survives_decode() {
        let mut inner = Compound::new();
        inner.insert("nul", "a\0b");
        inner.insert("emoji", "\u{1F600}");

        let mut longs = List::new();
        longs.push(1i64).unwrap();
        longs.push(-1i64).unwrap();

        let mut root = Compound::new();
        root.insert("b", -3i8);
        root.insert("s", 300i16);
        root.insert("i", i32::MIN);
        root.insert("l", i64::MAX);
        root.insert("f", 1.5f32);
        root.insert("d", -0.25f64);
        root.insert("ba", Tag::ByteArray(vec![1, -1]));
        root.insert("ia", Tag::IntArray(vec![7, 8, 9]));
        root.insert("la", Tag::LongArray(vec![i64::MIN]));
        root.insert("list", longs);
        root.insert("empty", List::new());
        root.insert("inner", inner);

        let decoded = from_bytes(&to_bytes(&root).unwrap()).unwrap();
        assert_eq!(decoded, root);
    }

    #[test]
    fn test_oversized_string() {
        let mut root = Compound::new();
        root.insert("s", "x".repeat(70_000));
        assert!(matches!(to_bytes(&root), Err(Error::UnencodableValue(_))));
    }
}
