use log::{debug, warn};
use crate::{byte_slice::ByteSlice, data_formats::{decode_payload, Codec}, error::{Error, Result}, Tag};

const HEADER_SIZE: usize = 8;

pub type NodeId = usize;

#[derive(Clone, Copy, Debug)]
pub struct WalkOptions {
	pub max_depth: usize
}

impl Default for WalkOptions {
	fn default() -> Self {
		Self {max_depth: 64}
	}
}

pub enum NodeKind {
	Form {
		form_tag: Tag,
		/// dash-joined form tags of every enclosing form, empty at the first level
		path: String,
		children: Vec<NodeId>
	},
	Chunk {
		codec: Codec,
		data: Box<[u8]>
	}
}

pub struct FormNode {
	pub tag: Tag,
	/// absolute offset of the payload in the parsed buffer
	pub offset: usize,
	pub declared_len: usize,
	pub parent: Option<NodeId>,
	pub kind: NodeKind
}

impl FormNode {
	pub fn form_tag(&self) -> Option<Tag> {
		match &self.kind {
			NodeKind::Form {form_tag, ..} => Some(*form_tag),
			NodeKind::Chunk {..} => None
		}
	}

	pub fn data(&self) -> Option<&[u8]> {
		match &self.kind {
			NodeKind::Chunk {data, ..} => Some(data),
			NodeKind::Form {..} => None
		}
	}
}

pub enum WalkEvent<'a> {
	EnterForm(NodeId, &'a FormNode),
	Chunk(NodeId, &'a FormNode),
	LeaveForm(NodeId, &'a FormNode)
}

/// A parsed nested-form container. Nodes live in an arena and refer to each other by index.
pub struct FormTree {
	nodes: Vec<FormNode>,
	/// bytes past the (possibly clamped) declared length, never parsed
	pub trailing: Option<(usize, Box<[u8]>)>
}

struct OpenForm {
	id: NodeId,
	cursor: usize,
	end: usize,
	depth: usize
}

pub fn is_form(buf: &[u8]) -> bool {
	buf.len() >= HEADER_SIZE && buf.starts_with(&Tag::FORM.0)
}

impl FormTree {
	pub const ROOT: NodeId = 0;

	pub fn parse(buf: &[u8], options: &WalkOptions) -> Result<Self> {
		if !is_form(buf) {
			return Err(Error::BadSignature {expected: "FORM"});
		}
		let mut form_len = buf.read_u32_field_be(4, "top-level form length")? as usize;
		let max_len = buf.len() - HEADER_SIZE;
		if form_len > max_len {
			// seen for MISSION?.IFF where the header claims 0x04000000 bytes
			warn!("form length is {form_len:#010x} ({form_len} bytes); setting to {max_len} bytes (= remaining bytes in file)");
			form_len = max_len;
		}
		let end = HEADER_SIZE + form_len;
		let form_tag = buf.read_tag_field(HEADER_SIZE, "form tag")?;
		if form_len < 4 {
			return Err(Error::Truncated {what: "form tag", offset: HEADER_SIZE, len: end});
		}
		debug!("starting to parse form {form_tag}, expected length = {form_len:#010x}");

		let mut tree = Self {
			nodes: vec![FormNode {
				tag: Tag::FORM,
				offset: HEADER_SIZE,
				declared_len: form_len,
				parent: None,
				kind: NodeKind::Form {form_tag, path: String::new(), children: Vec::new()}
			}],
			trailing: (end < buf.len()).then(|| (end, buf[end..].into()))
		};
		if let Some((offset, trailing)) = &tree.trailing {
			warn!("{} unhandled trailing bytes at {offset:#010x}", trailing.len());
		}

		let mut stack = vec![OpenForm {id: Self::ROOT, cursor: HEADER_SIZE + 4, end, depth: 0}];
		while let Some(open) = stack.last_mut() {
			if open.cursor >= open.end {
				stack.pop();
				continue;
			}
			let parent = open.id;
			let depth = open.depth;
			let form_body = &buf[..open.end];
			let tag = form_body.read_tag_field(open.cursor, "chunk tag")?;
			let len = form_body.read_u32_field_be(open.cursor + 4, "chunk length")? as usize;
			let offset = open.cursor + HEADER_SIZE;
			if len == 0 {
				return Err(Error::ZeroLengthChunk {tag, offset});
			}
			let payload = form_body.read_bytes_field(offset, len, "chunk payload")?;
			open.cursor = offset + len + len % 2;

			let kind = if tag == Tag::FORM {
				if depth + 1 > options.max_depth {
					return Err(Error::TooDeep(options.max_depth));
				}
				let form_tag = payload.read_tag_field(0, "nested form tag")?;
				debug!("nested form {form_tag} at {offset:#010x}, {len} bytes");
				stack.push(OpenForm {id: tree.nodes.len(), cursor: offset + 4, end: offset + len, depth: depth + 1});
				NodeKind::Form {form_tag, path: tree.child_path(parent), children: Vec::new()}
			} else {
				let (codec, data) = decode_payload(payload)?;
				debug!("chunk {tag} at {offset:#010x}, {len} bytes, {codec:?}");
				NodeKind::Chunk {codec, data}
			};
			let id = tree.nodes.len();
			tree.nodes.push(FormNode {tag, offset, declared_len: len, parent: Some(parent), kind});
			if let NodeKind::Form {children, ..} = &mut tree.nodes[parent].kind {
				children.push(id);
			}
		}
		Ok(tree)
	}

	fn child_path(&self, parent: NodeId) -> String {
		match &self.nodes[parent].kind {
			NodeKind::Form {form_tag, path, ..} if path.is_empty() => form_tag.to_string(),
			NodeKind::Form {form_tag, path, ..} => format!("{path}-{form_tag}"),
			NodeKind::Chunk {..} => unreachable!("chunks have no children")
		}
	}

	pub fn node(&self, id: NodeId) -> &FormNode {
		&self.nodes[id]
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn children(&self, id: NodeId) -> &[NodeId] {
		match &self.nodes[id].kind {
			NodeKind::Form {children, ..} => children,
			NodeKind::Chunk {..} => &[]
		}
	}

	/// First chunk directly inside form `id` with the given tag.
	pub fn find_chunk(&self, id: NodeId, tag: Tag) -> Option<&[u8]> {
		self.children(id).iter()
			.map(|&child| &self.nodes[child])
			.find(|node| node.tag == tag)
			.and_then(FormNode::data)
	}

	/// Name of a chunk for output files and the text heuristic, e.g. `BOOTH.IFF-chunk-0x0018d544-BOOT-STD_-TXT1`.
	pub fn chunk_name(&self, prefix: &str, id: NodeId) -> String {
		let node = &self.nodes[id];
		let (path, form_tag) = match node.parent.map(|parent| &self.nodes[parent].kind) {
			Some(NodeKind::Form {form_tag, path, ..}) => (path.as_str(), form_tag.to_string()),
			_ => ("", String::new())
		};
		let sep = if path.is_empty() {""} else {"-"};
		format!("{prefix}-chunk-{:#010x}-{path}{sep}{form_tag}-{}", node.offset, node.tag)
	}

	/// Visits every node in document order, forms before and after their children.
	pub fn walk<F: FnMut(WalkEvent) -> Result<()>>(&self, mut f: F) -> Result<()> {
		let mut stack = vec![(Self::ROOT, 0usize)];
		f(WalkEvent::EnterForm(Self::ROOT, &self.nodes[Self::ROOT]))?;
		while let Some((form, next_child)) = stack.last_mut() {
			let form = *form;
			let Some(&child) = self.children(form).get(*next_child) else {
				stack.pop();
				f(WalkEvent::LeaveForm(form, &self.nodes[form]))?;
				continue;
			};
			*next_child += 1;
			let node = &self.nodes[child];
			if let NodeKind::Form {..} = node.kind {
				f(WalkEvent::EnterForm(child, node))?;
				stack.push((child, 0));
			} else {
				f(WalkEvent::Chunk(child, node))?;
			}
		}
		Ok(())
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	pub fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
		let mut out = tag.to_vec();
		out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
		out.extend_from_slice(payload);
		if payload.len() % 2 == 1 {
			out.push(0);
		}
		out
	}

	pub fn form(form_tag: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
		let mut body = form_tag.to_vec();
		for child in children {
			body.extend_from_slice(child);
		}
		chunk(b"FORM", &body)
	}

	fn chunk_tags(tree: &FormTree) -> Vec<String> {
		let mut tags = Vec::new();
		tree.walk(|event| {
			match event {
				WalkEvent::EnterForm(_, node) => tags.push(format!("<{}", node.form_tag().unwrap())),
				WalkEvent::Chunk(_, node) => tags.push(node.tag.to_string()),
				WalkEvent::LeaveForm(_, node) => tags.push(format!("{}>", node.form_tag().unwrap()))
			}
			Ok(())
		}).unwrap();
		tags
	}

	#[test]
	fn odd_length_child_is_followed_by_padding() {
		let buf = form(b"TEST", &[chunk(b"ODD1", b"abc"), chunk(b"EVEN", b"wxyz")]);
		assert_eq!(buf.len(), 8 + 4 + (8 + 4) + (8 + 4));
		let tree = FormTree::parse(&buf, &WalkOptions::default()).unwrap();
		let children = tree.children(FormTree::ROOT);
		assert_eq!(children.len(), 2);
		assert_eq!(tree.node(children[0]).data().unwrap(), b"abc");
		assert_eq!(tree.node(children[1]).tag, Tag(*b"EVEN"));
		assert_eq!(tree.node(children[1]).offset, 8 + 4 + 12 + 8);
		assert_eq!(tree.node(children[1]).data().unwrap(), b"wxyz");
		assert!(tree.trailing.is_none());
	}

	#[test]
	fn nested_forms_are_walked_in_document_order() {
		let inner = form(b"STD_", &[chunk(b"TXT1", b"YES\0NO\0")]);
		let buf = form(b"BOOT", &[chunk(b"HEAD", b"hh"), inner, chunk(b"TAIL", b"tt")]);
		let tree = FormTree::parse(&buf, &WalkOptions::default()).unwrap();
		assert_eq!(chunk_tags(&tree), ["<BOOT", "HEAD", "<STD_", "TXT1", "STD_>", "TAIL", "BOOT>"]);
	}

	#[test]
	fn chunk_names_carry_the_form_path() {
		let inner = form(b"STD_", &[chunk(b"TXT1", b"YES\0")]);
		let buf = form(b"BOOT", &[chunk(b"HEAD", b"hh"), inner]);
		let tree = FormTree::parse(&buf, &WalkOptions::default()).unwrap();
		let mut names = Vec::new();
		tree.walk(|event| {
			if let WalkEvent::Chunk(id, _) = event {
				names.push(tree.chunk_name("BOOTH.IFF", id));
			}
			Ok(())
		}).unwrap();
		assert_eq!(names, ["BOOTH.IFF-chunk-0x00000014-BOOT-HEAD", "BOOTH.IFF-chunk-0x0000002a-BOOT-STD_-TXT1"]);
	}

	#[test]
	fn zero_length_chunk_is_rejected() {
		let mut buf = form(b"TEST", &[chunk(b"GOOD", b"ok")]);
		buf.extend_from_slice(b"NULL\0\0\0\0");
		let len = (buf.len() - 8) as u32;
		buf[4..8].copy_from_slice(&len.to_be_bytes());
		assert!(matches!(FormTree::parse(&buf, &WalkOptions::default()), Err(Error::ZeroLengthChunk {tag: Tag(t), ..}) if &t == b"NULL"));
	}

	#[test]
	fn oversized_top_level_length_is_clamped() {
		let mut buf = form(b"MISS", &[chunk(b"TEXT", b"hi")]);
		buf[4..8].copy_from_slice(&0x0400_0000u32.to_be_bytes());
		let tree = FormTree::parse(&buf, &WalkOptions::default()).unwrap();
		assert_eq!(tree.children(FormTree::ROOT).len(), 1);
		assert!(tree.trailing.is_none());
	}

	#[test]
	fn bytes_past_the_declared_length_are_trailing_data() {
		let mut buf = form(b"TEST", &[chunk(b"DATA", b"ok")]);
		buf.extend_from_slice(b"junk");
		let tree = FormTree::parse(&buf, &WalkOptions::default()).unwrap();
		let (offset, trailing) = tree.trailing.as_ref().unwrap();
		assert_eq!(*offset, buf.len() - 4);
		assert_eq!(&**trailing, b"junk");
	}

	#[test]
	fn child_overrunning_its_form_is_rejected() {
		let mut buf = form(b"TEST", &[chunk(b"DATA", b"okay")]);
		let last = buf.len() - 5;
		buf[last] = 0x40;
		assert!(matches!(FormTree::parse(&buf, &WalkOptions::default()), Err(Error::Truncated {..})));
	}

	#[test]
	fn nesting_depth_is_bounded() {
		let mut buf = form(b"LEAF", &[chunk(b"DATA", b"ok")]);
		for _ in 0..4 {
			buf = form(b"NEST", &[buf]);
		}
		assert!(FormTree::parse(&buf, &WalkOptions {max_depth: 4}).is_ok());
		assert!(matches!(FormTree::parse(&buf, &WalkOptions {max_depth: 3}), Err(Error::TooDeep(3))));
	}

	#[test]
	fn compressed_chunks_are_decoded() {
		let packed = [0x10, 0xFB, 0x00, 0x00, 0x06, 0x09, 0x00, b'A', 0xFC];
		let buf = form(b"TEST", &[chunk(b"PACK", &packed)]);
		let tree = FormTree::parse(&buf, &WalkOptions::default()).unwrap();
		let node = tree.node(tree.children(FormTree::ROOT)[0]);
		assert!(matches!(node.kind, NodeKind::Chunk {codec: Codec::Fb10, ..}));
		assert_eq!(node.data().unwrap(), b"AAAAAA");
		assert_eq!(node.declared_len, packed.len());
	}

	#[test]
	fn non_forms_are_rejected() {
		assert!(matches!(FormTree::parse(b"BIGF\0\0\0\0", &WalkOptions::default()), Err(Error::BadSignature {..})));
		assert!(!is_form(b"FORM"));
	}
}
