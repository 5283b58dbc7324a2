//! Stringified NBT (SNBT) output
//!
//! Rendering rules:
//! - compounds as `{ key: value, key: value }`, `{}` when empty
//! - lists as `[ value, value ]`, `[]` when empty
//! - typed arrays as `[B; 1b, 2b]`, `[I; 1, 2]`, `[L; 1L, 2L]`
//! - numeric suffixes `b`, `s`, (none for Int), `L`, `f`, `d`
//! - keys bare when they only contain `A-Z a-z 0-9 _ - . +`, quoted otherwise
//! - strings always double-quoted with `"` and `\` escaped
//!
//! The output depends only on the tree, so rendering is deterministic.

use std::fmt::Write;

use super::{Compound, List, Tag};
use crate::error::{Error, Result};

/// Render a tag tree as SNBT text
pub fn to_snbt(tag: &Tag) -> Result<String> {
    let mut out = String::new();
    write_tag(&mut out, tag)?;
    Ok(out)
}

fn write_tag(out: &mut String, tag: &Tag) -> Result<()> {
    match tag {
        Tag::Byte(v) => push_fmt(out, format_args!("{}b", v)),
        Tag::Short(v) => push_fmt(out, format_args!("{}s", v)),
        Tag::Int(v) => push_fmt(out, format_args!("{}", v)),
        Tag::Long(v) => push_fmt(out, format_args!("{}L", v)),
        Tag::Float(v) => {
            if !v.is_finite() {
                return Err(Error::UnencodableValue(format!("float {}", v)));
            }
            push_fmt(out, format_args!("{:?}f", v));
        }
        Tag::Double(v) => {
            if !v.is_finite() {
                return Err(Error::UnencodableValue(format!("double {}", v)));
            }
            push_fmt(out, format_args!("{:?}d", v));
        }
        Tag::String(s) => write_quoted(out, s),
        Tag::List(list) => write_list(out, list)?,
        Tag::Compound(compound) => write_compound(out, compound)?,
        Tag::ByteArray(values) => write_array(out, 'B', values.iter().map(|v| format!("{}b", v))),
        Tag::IntArray(values) => write_array(out, 'I', values.iter().map(|v| v.to_string())),
        Tag::LongArray(values) => write_array(out, 'L', values.iter().map(|v| format!("{}L", v))),
    }
    Ok(())
}

fn write_compound(out: &mut String, compound: &Compound) -> Result<()> {
    if compound.is_empty() {
        out.push_str("{}");
        return Ok(());
    }

    out.push_str("{ ");
    for (i, (key, value)) in compound.iter().enumerate() {
        if key.is_empty() {
            return Err(Error::UnencodableValue("empty compound key".into()));
        }
        if i > 0 {
            out.push_str(", ");
        }
        if is_bare_key(key) {
            out.push_str(key);
        } else {
            write_quoted(out, key);
        }
        out.push_str(": ");
        write_tag(out, value)?;
    }
    out.push_str(" }");
    Ok(())
}

fn write_list(out: &mut String, list: &List) -> Result<()> {
    if list.is_empty() {
        out.push_str("[]");
        return Ok(());
    }

    out.push_str("[ ");
    for (i, item) in list.iter().enumerate() {
        if item.id() != list.element_id() {
            return Err(Error::UnencodableValue(format!(
                "{} element in a list of {}",
                item.id().name(),
                list.element_id().name()
            )));
        }
        if i > 0 {
            out.push_str(", ");
        }
        write_tag(out, item)?;
    }
    out.push_str(" ]");
    Ok(())
}

fn write_array(out: &mut String, prefix: char, items: impl Iterator<Item = String>) {
    out.push('[');
    out.push(prefix);
    out.push(';');
    for (i, item) in items.enumerate() {
        out.push_str(if i == 0 { " " } else { ", " });
        out.push_str(&item);
    }
    out.push(']');
}

fn write_quoted(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

fn push_fmt(out: &mut String, args: std::fmt::Arguments<'_>) {
    // Writing into a String cannot fail
    let _ = out.write_fmt(args);
}

/// Whether a compound key can be written without quotes
pub fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
}
