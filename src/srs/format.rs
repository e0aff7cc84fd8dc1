//! Format constants and primitive encodings.

use std::io::{Read, Write};

use crate::{Error, Result};

/// Magic bytes at the start of every `.srs` file.
pub const MAGIC: [u8; 3] = *b"SRS";

/// Rule-set format version written by [`SrsWriter`](super::SrsWriter).
pub const RULE_SET_VERSION_1: u8 = 1;

/// Rule type byte for a default rule.
pub const RULE_TYPE_DEFAULT: u8 = 0;

/// Rule type byte for a logical rule (not produced, rejected on read).
pub const RULE_TYPE_LOGICAL: u8 = 1;

/// Rule item identifiers
pub const ITEM_DOMAIN: u8 = 2;
pub const ITEM_DOMAIN_KEYWORD: u8 = 3;
pub const ITEM_DOMAIN_REGEX: u8 = 4;
pub const ITEM_FINAL: u8 = 0xFF;

/// Largest capacity reserved up front from an untrusted length prefix.
pub(crate) const MAX_PREALLOC: usize = 4096;

/// Write an unsigned LEB128 varint.
pub fn write_uvarint<W: Write + ?Sized>(writer: &mut W, value: u64) -> Result<()> {
    let mut buf = Vec::with_capacity(prost::encoding::encoded_len_varint(value));
    prost::encoding::encode_varint(value, &mut buf);
    writer.write_all(&buf)?;
    Ok(())
}

/// Read an unsigned LEB128 varint, advancing the slice past it.
pub fn read_uvarint(reader: &mut &[u8]) -> Result<u64> {
    prost::encoding::decode_varint(reader)
        .map_err(|e| Error::InvalidRuleSet(format!("invalid varint: {}", e)))
}

pub(crate) fn read_u8<R: Read + ?Sized>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub(crate) fn read_len(reader: &mut &[u8]) -> Result<usize> {
    let len = read_uvarint(reader)?;
    usize::try_from(len).map_err(|_| Error::InvalidRuleSet(format!("length {} too large", len)))
}

/// Split `len` bytes off the front of the slice.
pub(crate) fn take_bytes<'a>(reader: &mut &'a [u8], len: usize) -> Option<&'a [u8]> {
    if reader.len() < len {
        return None;
    }
    let (bytes, rest) = reader.split_at(len);
    *reader = rest;
    Some(bytes)
}

/// Write a string list: count, then each string length-prefixed.
pub fn write_strings<W: Write + ?Sized>(writer: &mut W, values: &[String]) -> Result<()> {
    write_uvarint(writer, values.len() as u64)?;
    for value in values {
        write_uvarint(writer, value.len() as u64)?;
        writer.write_all(value.as_bytes())?;
    }
    Ok(())
}

/// Read a string list written by [`write_strings`].
pub fn read_strings(reader: &mut &[u8]) -> Result<Vec<String>> {
    let count = read_len(reader)?;
    let mut values = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        let len = read_len(reader)?;
        let bytes = take_bytes(reader, len)
            .ok_or_else(|| Error::InvalidRuleSet("truncated string".to_string()))?;
        let value = String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::InvalidRuleSet(format!("invalid UTF-8 string: {}", e)))?;
        values.push(value);
    }
    Ok(values)
}
