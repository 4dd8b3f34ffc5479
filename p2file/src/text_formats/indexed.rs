use crate::{byte_slice::ByteSlice, error::{Error, Result}};
use super::codepoint;

/// A table of LE32 string offsets followed by the NUL-terminated strings.
/// The first offset doubles as the table size.
pub fn decode(buf: &[u8]) -> Result<Vec<String>> {
	let first = buf.read_u32_field(0, "first string offset")?;
	if first % 4 != 0 {
		return Err(Error::Invalid(format!("expected offset divisible by 4, got {first:#x}")));
	}
	(0..first as usize / 4).map(|i| {
		let offset = buf.read_u32_field(i * 4, "string offset")? as usize;
		let tail = buf.get(offset..).ok_or(Error::Truncated {what: "indexed string", offset, len: buf.len()})?;
		let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
		let mut line = String::new();
		for &b in &tail[..end] {
			codepoint::push_code(&mut line, b as u32);
		}
		Ok(line)
	}).collect()
}
