use std::fmt::Write;
use log::{debug, warn};
use crate::{bit_stream::BitStream, byte_slice::ByteSlice, error::{Error, Result}};
use super::codepoint;

pub const NEWLINE_MARKER: u32 = 0xFE;
pub const PLACEHOLDER_MARKER: u32 = 0xF9;
pub const PLACEHOLDER_PLANET_NAME: u32 = 0x81;
pub const PLACEHOLDER_REPORTER_NAME: u32 = 0x82;
pub const END_MARKER: u32 = 0xFF;

// node indices are stored as u16 by the game, 0xFFFE and 0xFFFF are its sentinels
const MAX_TREE_SIZE: u32 = 0xFFFE;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Node {
	Unused,
	/// no children means leaf, otherwise internal
	Allocated([Option<u32>; 2])
}

impl Node {
	const LEAF: Node = Node::Allocated([None, None]);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct IndexEntry {
	pub byte_offset: u32,
	pub bit_offset: u32
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HuffmanTree {
	nodes: Box<[Node]>,
	root: u32
}

impl HuffmanTree {
	/// The first id is the root. The rest are attached last to first, each one to the
	/// highest-numbered allocated node that still has an open slot. This is the only
	/// order that reproduces the game's trees.
	pub fn build(size: u32, ids: &[u32]) -> Result<Self> {
		let (&root, rest) = ids.split_first().ok_or_else(|| Error::Invalid("huffman tree has no nodes".into()))?;
		let mut nodes = vec![Node::Unused; size as usize];
		*nodes.get_mut(root as usize).ok_or_else(|| Error::Invalid(format!("huffman root {root} outside tree of {size}")))? = Node::LEAF;
		for &id in rest.iter().rev() {
			if id >= size {
				return Err(Error::Invalid(format!("huffman id {id} outside tree of {size}")));
			}
			let (parent, slot) = nodes.iter().enumerate().rev()
				.find_map(|(j, node)| match node {
					Node::Allocated(children) => children.iter().position(Option::is_none).map(|k| (j, k)),
					Node::Unused => None
				})
				.ok_or(Error::TreeSlotUnavailable {id})?;
			if let Node::Allocated(children) = &mut nodes[parent] {
				children[slot] = Some(id);
			}
			nodes[id as usize] = Node::LEAF;
		}
		if nodes[root as usize] == Node::LEAF {
			return Err(Error::Invalid(format!("huffman root {root} has no children")));
		}
		Ok(Self {nodes: nodes.into(), root})
	}

	pub fn root(&self) -> u32 {
		self.root
	}

	pub fn is_leaf(&self, id: u32) -> bool {
		self.nodes.get(id as usize) == Some(&Node::LEAF)
	}

	pub fn children(&self, id: u32) -> Option<[Option<u32>; 2]> {
		match self.nodes.get(id as usize)? {
			Node::Allocated(children) if *children != [None, None] => Some(*children),
			_ => None
		}
	}

	fn node_label(&self, id: u32) -> String {
		match self.nodes[id as usize] {
			Node::Unused => "<unused>".into(),
			Node::LEAF => match id {
				NEWLINE_MARKER => "<newline>".into(),
				PLACEHOLDER_MARKER => "<placeholder:".into(),
				END_MARKER => "<end>".into(),
				_ => {
					let mut label = String::new();
					codepoint::push_code(&mut label, id);
					label.replace('\\', "\\\\").replace('"', "\\\"")
				}
			},
			Node::Allocated(_) => id.to_string()
		}
	}

	/// Graphviz source of the tree, edges labelled with the bit that selects them.
	pub fn to_dot(&self) -> String {
		let mut out = String::from("digraph huffman {\n");
		for (i, node) in self.nodes.iter().enumerate() {
			let Node::Allocated(children) = node else {continue};
			for (bit, child) in children.iter().enumerate() {
				if let Some(child) = child {
					let _ = writeln!(out, "\"{}\" -> \"{}\" [ label = \"{bit}\" ];", self.node_label(i as u32), self.node_label(*child));
				}
			}
		}
		out.push_str("}\n");
		out
	}
}

/// A Huffman coded text block: an index of bit positions into one shared stream.
pub struct HuffmanText<'a> {
	buf: &'a [u8],
	index: Box<[IndexEntry]>,
	tree: HuffmanTree
}

impl<'a> HuffmanText<'a> {
	pub fn parse(buf: &'a [u8]) -> Result<Self> {
		let tree_start = buf.read_u32_field(0, "huffman tree offset")? as usize;
		let num_entries = buf.read_u32_field(4, "huffman entry count")? as usize;
		debug!("tree start: {tree_start:#010x} ({tree_start}), num_entries: {num_entries:#010x} ({num_entries})");
		if num_entries == 0 || num_entries > buf.len() / 8 {
			return Err(Error::Invalid(format!("impossible huffman entry count {num_entries}")));
		}
		let index = (0..num_entries)
			.map(|i| Ok(IndexEntry {
				byte_offset: buf.read_u32_field(8 + i * 8, "entry byte offset")?,
				bit_offset: buf.read_u32_field(12 + i * 8, "entry bit offset")?
			}))
			.collect::<Result<Box<[_]>>>()?;

		let mut pos = 8 + num_entries * 8;
		if pos != tree_start {
			warn!("tree start points to {tree_start:#x}, but the index ends at {pos:#x}");
		}
		let uncompressed_bytes = buf.read_u32_field(pos, "uncompressed size estimate")?;
		let tree_size = buf.read_u32_field(pos + 4, "tree array size")?;
		debug!("estimated uncompressed bytes in stream: {uncompressed_bytes}, tree array size: {tree_size}");
		if tree_size > MAX_TREE_SIZE {
			return Err(Error::Invalid(format!("huffman tree array size {tree_size} too large")));
		}
		pos += 8;

		let ids_end = index[0].byte_offset as usize;
		if ids_end > buf.len() {
			return Err(Error::Truncated {what: "huffman tree ids", offset: ids_end, len: buf.len()});
		}
		let mut ids = Vec::new();
		while pos + 4 <= ids_end {
			let value = buf.read_u32_field(pos, "huffman tree id")?;
			pos += 4;
			if value >= tree_size {
				warn!("ignoring invalid tree id {value:#010x} (array size={tree_size})");
				continue;
			}
			ids.push(value);
		}
		let tree = HuffmanTree::build(tree_size, &ids)?;
		Ok(Self {buf, index, tree})
	}

	/// The last index entry only marks where the stream ends.
	pub fn count(&self) -> usize {
		self.index.len() - 1
	}

	pub fn tree(&self) -> &HuffmanTree {
		&self.tree
	}

	pub fn entry(&self, i: usize) -> Result<String> {
		let start = *self.index.get(i).ok_or_else(|| Error::Invalid(format!("no huffman entry {i}, the block has {}", self.count())))?;
		let mut bits = BitStream::new(self.buf);
		bits.seek(start.byte_offset, start.bit_offset);
		let mut out = String::new();
		let mut placeholder = false;
		let mut node = self.tree.root;
		loop {
			if self.tree.is_leaf(node) {
				if placeholder {
					// e.g. BOOTH.IFF BOOT/NEWS/TXT2
					match node {
						PLACEHOLDER_PLANET_NAME => out.push_str("planet>"),
						PLACEHOLDER_REPORTER_NAME => out.push_str("reporter>"),
						_ => {
							let _ = write!(out, "<id 0x{node:x}>");
						}
					}
					placeholder = false;
				} else {
					match node {
						END_MARKER => break,
						NEWLINE_MARKER => out.push('\n'),
						PLACEHOLDER_MARKER => {
							out.push_str("<placeholder:");
							placeholder = true;
						}
						_ => codepoint::push_code(&mut out, node)
					}
				}
				node = self.tree.root;
				continue;
			}
			let children = self.tree.children(node).ok_or(Error::UnusedTreeNode(node))?;
			let Some(bit) = bits.read_bit() else {
				break;
			};
			node = children[bit as usize].ok_or_else(|| Error::Invalid(format!("huffman node {node} has no child for bit {bit}")))?;
		}
		Ok(out)
	}

	pub fn entries(&self) -> Result<Vec<String>> {
		(0..self.count()).map(|i| self.entry(i)).collect()
	}
}
