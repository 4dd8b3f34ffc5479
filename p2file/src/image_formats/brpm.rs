use log::debug;
use crate::{Tag, archive_formats::iff::{FormTree, NodeId}, byte_slice::ByteSlice, error::{Error, Result}, image::Frame};

pub const BRPM: Tag = Tag(*b"BRPM");
const PMIF: Tag = Tag(*b"PMIF");
const PMDT: Tag = Tag(*b"PMDT");

/// A BRender pixmap form, decoded once all of its chunks are known.
/// Forms of another type, or without both chunks, are not pixmaps.
pub fn decode_form(tree: &FormTree, id: NodeId) -> Result<Option<Frame>> {
	if tree.node(id).form_tag() != Some(BRPM) {
		return Ok(None);
	}
	match (tree.find_chunk(id, PMIF), tree.find_chunk(id, PMDT)) {
		(Some(pmif), Some(pmdt)) => decode(pmif, pmdt).map(Some),
		_ => Ok(None)
	}
}

pub fn decode(pmif: &[u8], pmdt: &[u8]) -> Result<Frame> {
	if pmif.len() != 14 {
		return Err(Error::Invalid(format!("PMIF chunk is {} bytes, expected 14", pmif.len())));
	}
	let width = pmif.read_u16_field(0, "pixmap width")?;
	let expect = |offset: usize, name: &str, expected: u16| -> Result<()> {
		let value = pmif.read_u16_field(offset, "pixmap info")?;
		if value != expected {
			return Err(Error::Invalid(format!("unexpected PMIF {name} value {value:#06x}, expected {expected:#06x}")));
		}
		Ok(())
	};
	expect(2, "type", 0x203)?;
	expect(4, "flags", 0)?;
	expect(6, "row width", width)?;
	let height = pmif.read_u16_field(8, "pixmap height")?;
	debug!("pixmap {width}x{height}, {} data bytes, extra fields {:#06x} {:#06x}",
		pmdt.len(), pmif.read_u16_field(10, "pixmap info")?, pmif.read_u16_field(12, "pixmap info")?);
	if pmdt.len() != width as usize * height as usize {
		return Err(Error::Invalid(format!("PMDT chunk is {} bytes, expected {width}x{height}", pmdt.len())));
	}
	Frame::from_gray(width as u32, height as u32, pmdt)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::archive_formats::iff::{WalkOptions, tests::{chunk, form}};

	fn pmif(width: u16, kind: u16, height: u16) -> Vec<u8> {
		[width, kind, 0, width, height, 0, 0].iter().flat_map(|v| v.to_le_bytes()).collect()
	}

	#[test]
	fn pixmap_form() {
		let buf = form(b"BRPM", &[chunk(b"PMIF", &pmif(3, 0x203, 2)), chunk(b"PMDT", &[0, 50, 100, 150, 200, 250])]);
		let tree = FormTree::parse(&buf, &WalkOptions::default()).unwrap();
		let frame = decode_form(&tree, FormTree::ROOT).unwrap().unwrap();
		assert_eq!((frame.width, frame.height), (3, 2));
		assert_eq!(frame.pixels[4].g, 200);
	}

	#[test]
	fn other_forms_and_partial_pixmaps_are_ignored() {
		let buf = form(b"BRPM", &[chunk(b"PMIF", &pmif(3, 0x203, 2))]);
		let tree = FormTree::parse(&buf, &WalkOptions::default()).unwrap();
		assert!(decode_form(&tree, FormTree::ROOT).unwrap().is_none());
		let buf = form(b"TEST", &[chunk(b"PMIF", &pmif(3, 0x203, 2)), chunk(b"PMDT", &[0; 6])]);
		let tree = FormTree::parse(&buf, &WalkOptions::default()).unwrap();
		assert!(decode_form(&tree, FormTree::ROOT).unwrap().is_none());
	}

	#[test]
	fn header_checks() {
		assert!(decode(&pmif(3, 0x204, 2), &[0; 6]).is_err());
		assert!(decode(&pmif(3, 0x203, 2), &[0; 5]).is_err());
		assert!(decode(&pmif(3, 0x203, 2)[..12], &[0; 6]).is_err());
	}
}
