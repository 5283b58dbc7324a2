//! Binary NBT decoder

use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::GzDecoder;
use std::io::{self, Cursor, Read};

use super::{mutf8, Compound, List, Tag, TagId};
use crate::error::{Error, Result};

/// Maximum compound/list nesting accepted from input
pub const MAX_DEPTH: usize = 512;

/// Upper bound for speculative pre-allocation from an untrusted length
const MAX_PREALLOC: usize = 4096;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Check if data is gzip-compressed
pub fn is_gzip(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}

/// Decode a complete NBT file, inflating it first if it is gzip-compressed
///
/// Returns the root compound; the root name (almost always empty) is dropped.
pub fn from_bytes(data: &[u8]) -> Result<Compound> {
    if is_gzip(data) {
        let mut inflated = Vec::new();
        GzDecoder::new(data)
            .read_to_end(&mut inflated)
            .map_err(|e| Error::MalformedInput(format!("gzip stream: {}", e)))?;
        tracing::trace!(compressed = data.len(), inflated = inflated.len(), "inflated gzip NBT");
        return from_bytes(&inflated);
    }

    let mut reader = NbtReader::new(Cursor::new(data));
    let (_, root) = reader.read_root()?;

    let consumed = reader.into_inner().position() as usize;
    if consumed < data.len() {
        tracing::debug!(trailing = data.len() - consumed, "ignoring bytes after root compound");
    }
    Ok(root)
}

/// Recursive-descent reader over any byte source
pub struct NbtReader<R> {
    inner: R,
    depth: usize,
}

impl<R: Read> NbtReader<R> {
    pub fn new(inner: R) -> Self {
        NbtReader { inner, depth: 0 }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read the named root compound
    pub fn read_root(&mut self) -> Result<(String, Compound)> {
        let id = self.read_tag_id()?;
        if id != TagId::Compound {
            return Err(Error::MalformedInput(format!(
                "root tag is {}, expected Compound",
                id.name()
            )));
        }
        let name = self.read_string()?;
        let root = self.read_compound()?;
        Ok((name, root))
    }

    /// Read the payload of a value whose tag id is already known
    pub fn read_payload(&mut self, id: TagId) -> Result<Tag> {
        Ok(match id {
            TagId::End => {
                return Err(Error::MalformedInput("End tag outside a compound".into()));
            }
            TagId::Byte => Tag::Byte(self.inner.read_i8().map_err(truncated)?),
            TagId::Short => Tag::Short(self.inner.read_i16::<BigEndian>().map_err(truncated)?),
            TagId::Int => Tag::Int(self.inner.read_i32::<BigEndian>().map_err(truncated)?),
            TagId::Long => Tag::Long(self.inner.read_i64::<BigEndian>().map_err(truncated)?),
            TagId::Float => Tag::Float(self.inner.read_f32::<BigEndian>().map_err(truncated)?),
            TagId::Double => Tag::Double(self.inner.read_f64::<BigEndian>().map_err(truncated)?),
            TagId::ByteArray => {
                let len = self.read_len("byte array")?;
                let bytes = self.read_bytes(len)?;
                Tag::ByteArray(bytes.into_iter().map(|b| b as i8).collect())
            }
            TagId::String => Tag::String(self.read_string()?),
            TagId::List => Tag::List(self.read_list()?),
            TagId::Compound => Tag::Compound(self.read_compound()?),
            TagId::IntArray => {
                let len = self.read_len("int array")?;
                let mut values = Vec::with_capacity(len.min(MAX_PREALLOC));
                for _ in 0..len {
                    values.push(self.inner.read_i32::<BigEndian>().map_err(truncated)?);
                }
                Tag::IntArray(values)
            }
            TagId::LongArray => {
                let len = self.read_len("long array")?;
                let mut values = Vec::with_capacity(len.min(MAX_PREALLOC));
                for _ in 0..len {
                    values.push(self.inner.read_i64::<BigEndian>().map_err(truncated)?);
                }
                Tag::LongArray(values)
            }
        })
    }

    fn read_tag_id(&mut self) -> Result<TagId> {
        let raw = self.inner.read_u8().map_err(truncated)?;
        TagId::try_from(raw).map_err(|_| Error::MalformedInput(format!("unknown tag id {}", raw)))
    }

    fn read_compound(&mut self) -> Result<Compound> {
        self.enter()?;
        let mut compound = Compound::new();
        loop {
            let id = self.read_tag_id()?;
            if id == TagId::End {
                break;
            }
            let name = self.read_string()?;
            let value = self.read_payload(id)?;
            compound.insert(name, value);
        }
        self.depth -= 1;
        Ok(compound)
    }

    fn read_list(&mut self) -> Result<List> {
        self.enter()?;
        let element = self.read_tag_id()?;
        let len = self.read_len("list")?;
        if element == TagId::End && len > 0 {
            return Err(Error::MalformedInput(format!(
                "list of End tags with {} elements",
                len
            )));
        }

        let mut list = List::of(element);
        for _ in 0..len {
            let value = self.read_payload(element)?;
            list.push(value)?;
        }
        self.depth -= 1;
        Ok(list)
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.inner.read_u16::<BigEndian>().map_err(truncated)? as usize;
        let bytes = self.read_bytes(len)?;
        mutf8::decode(&bytes)
            .ok_or_else(|| Error::MalformedInput("string is not valid (modified) UTF-8".into()))
    }

    fn read_len(&mut self, what: &str) -> Result<usize> {
        let len = self.inner.read_i32::<BigEndian>().map_err(truncated)?;
        if len < 0 {
            return Err(Error::MalformedInput(format!(
                "negative {} length {}",
                what, len
            )));
        }
        Ok(len as usize)
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(len.min(MAX_PREALLOC));
        (&mut self.inner).take(len as u64).read_to_end(&mut buf)?;
        if buf.len() < len {
            return Err(Error::MalformedInput(format!(
                "expected {} bytes, found {}",
                len,
                buf.len()
            )));
        }
        Ok(buf)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::MalformedInput(format!(
                "nesting deeper than {}",
                MAX_DEPTH
            )));
        }
        Ok(())
    }
}

fn truncated(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::MalformedInput("unexpected end of data".into())
    } else {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `{ name: "Bananrama" }` as written by the game (root name "hello world")
    const HELLO_WORLD: &[u8] = &[
        0x0A, 0x00, 0x0B, b'h', b'e', b'l', b'l', b'o', b' ', b'w', b'o', b'r', b'l', b'd',
        0x08, 0x00, 0x04, b'n', b'a', b'm', b'e', 0x00, 0x09, b'B', b'a', b'n', b'a', b'n',
        b'r', b'a', b'm', b'a', 0x00,
    ];

    #[test]
    fn test_read_hello_world() {
        let mut reader = NbtReader::new(Cursor::new(HELLO_WORLD));
        let (name, root) = reader.read_root().unwrap();
        assert_eq!(name, "hello world");
        assert_eq!(root.get("name"), Some(&Tag::String("Bananrama".into())));
    }

    #[test]
    fn test_big_endian_integers() {
        let data = [
            0x0A, 0x00, 0x00, // root
            0x03, 0x00, 0x01, b'i', 0xFF, 0xFF, 0xFF, 0xFE, // i: -2
            0x04, 0x00, 0x01, b'l', 0, 0, 0, 0, 0, 0, 0x01, 0x00, // l: 256
            0x00,
        ];
        let root = from_bytes(&data).unwrap();
        assert_eq!(root.get("i"), Some(&Tag::Int(-2)));
        assert_eq!(root.get("l"), Some(&Tag::Long(256)));
    }

    #[test]
    fn test_list_of_compounds() {
        let data = [
            0x0A, 0x00, 0x00,
            0x09, 0x00, 0x01, b'p', 0x0A, 0x00, 0x00, 0x00, 0x02,
            0x03, 0x00, 0x01, b'x', 0x00, 0x00, 0x00, 0x05, 0x00,
            0x00,
            0x00,
        ];
        let root = from_bytes(&data).unwrap();
        let list = root.get("p").and_then(Tag::as_list).unwrap();
        assert_eq!(list.element_id(), TagId::Compound);
        assert_eq!(list.len(), 2);
        let first = list.iter().next().and_then(Tag::as_compound).unwrap();
        assert_eq!(first.get("x"), Some(&Tag::Int(5)));
    }

    #[test]
    fn test_empty_list_with_end_element() {
        let data = [0x0A, 0x00, 0x00, 0x09, 0x00, 0x01, b'e', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let root = from_bytes(&data).unwrap();
        assert!(root.get("e").and_then(Tag::as_list).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_input() {
        let cut = &HELLO_WORLD[..HELLO_WORLD.len() - 4];
        assert!(matches!(from_bytes(cut), Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_unknown_tag_id() {
        let data = [0x0A, 0x00, 0x00, 0x0D, 0x00, 0x01, b'x', 0x00];
        let err = from_bytes(&data).unwrap_err();
        assert!(err.to_string().contains("unknown tag id 13"));
    }

    #[test]
    fn test_root_must_be_compound() {
        let data = [0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01];
        assert!(matches!(from_bytes(&data), Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_negative_array_length() {
        let data = [0x0A, 0x00, 0x00, 0x0B, 0x00, 0x01, b'a', 0xFF, 0xFF, 0xFF, 0xFF, 0x00];
        let err = from_bytes(&data).unwrap_err();
        assert!(err.to_string().contains("negative int array length"));
    }

    #[test]
    fn test_nesting_limit() {
        let mut data = vec![0x0A, 0x00, 0x00];
        for _ in 0..MAX_DEPTH + 1 {
            data.extend_from_slice(&[0x0A, 0x00, 0x01, b'c']);
        }
        let err = from_bytes(&data).unwrap_err();
        assert!(err.to_string().contains("nesting deeper than"));
    }
}
