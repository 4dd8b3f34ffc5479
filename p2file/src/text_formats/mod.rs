pub mod codepoint;
pub mod heuristic;
pub mod huffman;
pub mod indexed;
pub mod movie_list;
pub mod string_list;

use std::fmt::Write;
use crate::error::Result;
pub use heuristic::{TextEncoding, text_encoding};

pub struct DecodedText {
	pub items: Vec<String>,
	/// Graphviz source of the Huffman tree, when there was one
	pub tree_dot: Option<String>
}

pub fn decode(buf: &[u8], encoding: TextEncoding) -> Result<Option<DecodedText>> {
	Ok(match encoding {
		TextEncoding::None => None,
		TextEncoding::StringList => Some(DecodedText {items: string_list::decode(buf), tree_dot: None}),
		TextEncoding::Indexed => Some(DecodedText {items: indexed::decode(buf)?, tree_dot: None}),
		TextEncoding::Huffman => {
			let text = huffman::HuffmanText::parse(buf)?;
			Some(DecodedText {items: text.entries()?, tree_dot: Some(text.tree().to_dot())})
		}
	})
}

pub fn format_items(items: &[String]) -> String {
	let mut out = String::new();
	for (i, item) in items.iter().enumerate() {
		let _ = write!(out, "== Item #{i} (0x{i:08x}) ==\n{item}\n\n");
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn items_are_numbered() {
		let items = ["YES".to_string(), "NO".to_string()];
		assert_eq!(format_items(&items), "== Item #0 (0x00000000) ==\nYES\n\n== Item #1 (0x00000001) ==\nNO\n\n");
	}

	#[test]
	fn huffman_text_carries_its_tree() {
		let buf = huffman::tests::block(512, &huffman::tests::HI_IDS, &[(0, 0), (1, 0)], &[0b0001_1000]);
		let text = decode(&buf, TextEncoding::Huffman).unwrap().unwrap();
		assert_eq!(text.items, ["Hi"]);
		assert!(text.tree_dot.is_some());
		assert!(decode(&buf, TextEncoding::None).unwrap().is_none());
	}
}
