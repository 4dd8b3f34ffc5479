use std::fmt::Write;
use crate::{Asset, Decoder, DynData, byte_slice::ByteSlice, error::Result};

const RECORD_LEN: usize = 15;

pub const ENTRY_MOVIELIST: Decoder = Decoder {
	id: "movielist",
	desc: "Movie list (CD number and TGV file name records)",
	detect: is_movie_list,
	decode: |buf, _| Ok(DynData::Assets(vec![Asset::text("-movielist.txt", to_text(&decode(buf)?))]))
};

pub fn is_movie_list(buf: &[u8]) -> bool {
	buf.len() >= RECORD_LEN && buf.len() % RECORD_LEN == 0
		&& buf[2..RECORD_LEN].windows(4).any(|w| w == b".tgv")
		&& !crate::has_signature(buf)
		&& !crate::image_formats::base::is_base(buf)
}

pub struct MovieEntry {
	pub cd: u16,
	pub name: String
}

pub fn decode(buf: &[u8]) -> Result<Vec<MovieEntry>> {
	(0..buf.len() / RECORD_LEN).map(|i| {
		let pos = i * RECORD_LEN;
		let name = buf.read_bytes_field(pos + 2, RECORD_LEN - 2, "movie file name")?;
		let name = name.split(|&b| b == 0).next().unwrap_or_default();
		Ok(MovieEntry {
			cd: buf.read_u16_field(pos, "movie cd number")?,
			name: String::from_utf8_lossy(name).into_owned()
		})
	}).collect()
}

pub fn to_text(entries: &[MovieEntry]) -> String {
	let mut out = String::from("== Movie List ==\n");
	for (i, entry) in entries.iter().enumerate() {
		let _ = writeln!(out, " Entry {i:3}: CD {}, Filename: '{}'", entry.cd, entry.name);
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record(cd: u16, name: &str) -> Vec<u8> {
		let mut out = cd.to_le_bytes().to_vec();
		out.extend_from_slice(name.as_bytes());
		out.resize(RECORD_LEN, 0);
		out
	}

	#[test]
	fn lists_entries() {
		let buf = [record(1, "intro.tgv"), record(3, "end_a.tgv")].concat();
		assert!(is_movie_list(&buf));
		let text = to_text(&decode(&buf).unwrap());
		assert_eq!(text, "== Movie List ==\n Entry   0: CD 1, Filename: 'intro.tgv'\n Entry   1: CD 3, Filename: 'end_a.tgv'\n");
	}

	#[test]
	fn needs_whole_records_and_a_movie_name() {
		assert!(!is_movie_list(&record(1, "intro.txt")));
		let mut buf = record(1, "intro.tgv");
		buf.push(0);
		assert!(!is_movie_list(&buf));
		assert!(!is_movie_list(&buf[..14]));
	}
}
