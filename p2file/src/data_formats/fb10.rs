use log::debug;
use crate::{byte_iter::ByteIter, error::{Error, Result}};

// control byte driven LZ77 variant, the same family as the DBPF "QFS" compression

pub const MAGIC: [u8; 2] = [0x10, 0xFB];

pub fn is_compressed(buf: &[u8]) -> bool {
	buf.starts_with(&MAGIC)
}

pub fn decompress(buf: &[u8]) -> Result<Box<[u8]>> {
	if !is_compressed(buf) {
		return Err(Error::BadSignature {expected: "fb10 magic 10 fb"});
	}
	let total = buf.len();
	let mut src = buf.iter().copied();
	src.expect_bytes::<2>("fb10 magic", total)?;
	let [size2, size1, size0] = src.expect_bytes::<3>("fb10 size hint", total)?;
	// only informational, the output grows as the stream dictates
	let size_hint = (size2 as usize) << 16 | (size1 as usize) << 8 | size0 as usize;
	debug!("fb10 uncompressed size: {size_hint} (compressed size: {total})");

	let mut out = Vec::new();
	while let Some(control) = src.next() {
		let (num_literals, num_to_copy, distance) = match control {
			0x00..=0x7F => {
				let [b1] = src.expect_bytes::<1>("fb10 2-byte control", total)?;
				let c = control as usize;
				(c & 0x03, ((c >> 2) & 0x07) + 3, ((c & 0x60) << 3) + b1 as usize + 1)
			}
			0x80..=0xBF => {
				let [b1, b2] = src.expect_bytes::<2>("fb10 3-byte control", total)?;
				let (c, b1) = (control as usize, b1 as usize);
				((b1 >> 6) & 0x03, (c & 0x3F) + 4, ((b1 & 0x3F) << 8) + b2 as usize + 1)
			}
			0xC0..=0xDF => {
				let [b1, b2, b3] = src.expect_bytes::<3>("fb10 4-byte control", total)?;
				let c = control as usize;
				(c & 0x03, ((c & 0x0C) << 6) + b3 as usize + 5, ((c & 0x10) << 12) + ((b1 as usize) << 8) + b2 as usize + 1)
			}
			0xE0..=0xFB => {
				copy_literals(&mut src, &mut out, (control as usize - 0xDF) * 4, total)?;
				continue;
			}
			0xFC..=0xFF => {
				copy_literals(&mut src, &mut out, control as usize & 0x03, total)?;
				break;
			}
		};
		copy_literals(&mut src, &mut out, num_literals, total)?;
		copy_back_reference(&mut out, distance, num_to_copy)?;
	}
	Ok(out.into_boxed_slice())
}

fn copy_literals(src: &mut impl ByteIter, out: &mut Vec<u8>, count: usize, total: usize) -> Result<()> {
	if count > src.len() {
		return Err(Error::Truncated {what: "fb10 literal run", offset: total - src.len(), len: total});
	}
	out.extend(src.take(count));
	Ok(())
}

// byte by byte on purpose: the source may overlap the bytes being written
fn copy_back_reference(out: &mut Vec<u8>, distance: usize, count: usize) -> Result<()> {
	if distance > out.len() {
		return Err(Error::BadBackReference {distance, produced: out.len()});
	}
	for _ in 0..count {
		let byte = out[out.len() - distance];
		out.push(byte);
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn stream(body: &[u8]) -> Vec<u8> {
		let mut buf = vec![0x10, 0xFB, 0x00, 0x00, 0x00];
		buf.extend_from_slice(body);
		buf
	}

	#[test]
	fn literal_run_copies_four_per_step() {
		let mut body = vec![0xE1];
		body.extend(1..=8u8);
		body.push(0xFC);
		assert_eq!(&*decompress(&stream(&body)).unwrap(), &[1, 2, 3, 4, 5, 6, 7, 8]);
	}

	#[test]
	fn distance_one_repeats_the_previous_byte() {
		// 0x09: one literal, then copy 5 bytes from distance 1
		let out = decompress(&stream(&[0x09, 0x00, b'A', 0xFC])).unwrap();
		assert_eq!(&*out, b"AAAAAA");
	}

	#[test]
	fn three_byte_control_reaches_far() {
		// 0x81: no literals, copy 5 bytes from distance 4
		let out = decompress(&stream(&[0xE0, b'a', b'b', b'c', b'd', 0x81, 0x00, 0x03, 0xFC])).unwrap();
		assert_eq!(&*out, b"abcdabcda");
	}

	#[test]
	fn four_byte_control_counts_from_five() {
		// 0xC0: no literals, copy b3 + 5 = 6 bytes from distance 2
		let out = decompress(&stream(&[0xE0, b'w', b'x', b'y', b'z', 0xC0, 0x00, 0x01, 0x01, 0xFC])).unwrap();
		assert_eq!(&*out, b"wxyzyzyzyz");
	}

	#[test]
	fn end_control_emits_trailing_literals_and_stops() {
		let out = decompress(&stream(&[0xFE, b'h', b'i', 0xE1])).unwrap();
		assert_eq!(&*out, b"hi");
	}

	#[test]
	fn input_exhaustion_ends_the_stream() {
		let out = decompress(&stream(&[0xE0, 1, 2, 3, 4])).unwrap();
		assert_eq!(&*out, &[1, 2, 3, 4]);
	}

	#[test]
	fn truncation_is_a_format_violation() {
		assert!(matches!(decompress(&stream(&[0xE1, 1, 2, 3])), Err(Error::Truncated {..})));
		assert!(matches!(decompress(&stream(&[0x80, 0x00])), Err(Error::Truncated {..})));
		assert!(matches!(decompress(&stream(&[0xC0, 0x00, 0x00])), Err(Error::Truncated {..})));
		assert!(matches!(decompress(&[0x10, 0xFB, 0x00]), Err(Error::Truncated {..})));
	}

	#[test]
	fn back_reference_before_start_is_rejected() {
		assert!(matches!(decompress(&stream(&[0x00, 0x00])), Err(Error::BadBackReference {distance: 1, produced: 0})));
	}

	#[test]
	fn missing_magic_is_rejected() {
		assert!(!is_compressed(&[0x10]));
		assert!(matches!(decompress(&[0xFB, 0x10, 0, 0, 0]), Err(Error::BadSignature {..})));
	}
}
