use log::debug;
use crate::{byte_slice::ByteSlice, error::{Error, Result}, Decoder, DynData};
use super::{Archive, ArchiveEntry};

pub const MAGIC: &[u8; 4] = b"BIGF";

pub const ENTRY_BIG: Decoder = Decoder {
	id: "big",
	desc: "BIGF archive, big-endian header with named entries",
	detect: |buf| buf.starts_with(MAGIC),
	decode: |buf, _| decode(buf).map(DynData::Archive)
};

pub fn decode(buf: &[u8]) -> Result<Archive> {
	let length = buf.read_u32_field_be(4, "archive length")?;
	let count = buf.read_u32_field_be(8, "entry count")? as usize;
	let header_len = buf.read_u32_field_be(12, "header length")?;
	debug!("length: {length} bytes, {count} files, {header_len} header bytes");
	if count > buf.len() / 9 {
		return Err(Error::Invalid(format!("impossibly large entry count {count}")));
	}
	let mut entries = Vec::with_capacity(count);
	let mut pos = 16;
	for _ in 0..count {
		let offset = buf.read_u32_field_be(pos, "entry offset")? as usize;
		let len = buf.read_u32_field_be(pos + 4, "entry length")? as usize;
		let name_start = pos + 8;
		let name_len = buf.get(name_start..)
			.and_then(|rest| rest.iter().position(|x| *x == 0))
			.ok_or(Error::Truncated {what: "entry name", offset: name_start, len: buf.len()})?;
		let name = String::from_utf8_lossy(&buf[name_start..name_start + name_len]).into_owned();
		let data = buf.read_bytes_field(offset, len, "entry data")?;
		debug!("entry: offset={offset}, length={len}, name='{name}'");
		entries.push(ArchiveEntry {name, data: data.into()});
		pos = name_start + name_len + 1;
	}
	Ok(Archive {format: "big", entries: entries.into()})
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	pub fn big(files: &[(&str, &[u8])]) -> Vec<u8> {
		let header_len = 16 + files.iter().map(|(name, _)| 8 + name.len() + 1).sum::<usize>();
		let mut header = Vec::new();
		let mut data = Vec::new();
		for (name, content) in files {
			header.extend_from_slice(&((header_len + data.len()) as u32).to_be_bytes());
			header.extend_from_slice(&(content.len() as u32).to_be_bytes());
			header.extend_from_slice(name.as_bytes());
			header.push(0);
			data.extend_from_slice(content);
		}
		let mut out = MAGIC.to_vec();
		out.extend_from_slice(&((header_len + data.len()) as u32).to_be_bytes());
		out.extend_from_slice(&(files.len() as u32).to_be_bytes());
		out.extend_from_slice(&(header_len as u32).to_be_bytes());
		out.extend(header);
		out.extend(data);
		out
	}

	#[test]
	fn entries_are_read_by_offset() {
		let buf = big(&[("ARMOUR1.FAT", b"one"), ("W15_5A.FAT", b"second")]);
		let arc = decode(&buf).unwrap();
		assert_eq!(arc.entries.len(), 2);
		assert_eq!(arc.entries[0].name, "ARMOUR1.FAT");
		assert_eq!(&*arc.entries[0].data, b"one");
		assert_eq!(arc.entries[1].name, "W15_5A.FAT");
		assert_eq!(&*arc.entries[1].data, b"second");
	}

	#[test]
	fn entries_outside_the_buffer_are_rejected() {
		let mut buf = big(&[("A", b"abc")]);
		buf.truncate(buf.len() - 1);
		assert!(matches!(decode(&buf), Err(Error::Truncated {what: "entry data", ..})));
	}
}
