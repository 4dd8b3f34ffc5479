use log::{debug, info};
use crate::{
	Asset, AssetKind, DynData, Error, Result, Tag, classify,
	archive_formats::iff::{FormNode, FormTree, NodeId, WalkEvent, WalkOptions},
	image_formats::brpm,
	model_formats::br3d,
	text_formats::{self, format_items, text_encoding}
};

const BMTD: Tag = Tag(*b"BMTD");

#[derive(Clone, Copy, Debug, Default)]
pub struct ExtractOptions {
	pub walk: WalkOptions,
	/// also emit every chunk payload as `.bin`, whether or not something decoded it
	pub raw_chunks: bool
}

/// Everything derived from one input buffer, named by output prefix.
pub struct Extraction {
	pub outputs: Vec<Asset>,
	/// false when no decoder recognised the top-level buffer
	pub claimed: bool
}

struct Extractor<'a> {
	options: &'a ExtractOptions,
	outputs: Vec<Asset>,
	depth: usize
}

impl Extractor<'_> {
	fn push(&mut self, name: String, kind: AssetKind) {
		debug!("output {name}");
		self.outputs.push(Asset {name, kind});
	}

	fn handle_data(&mut self, buf: &[u8], prefix: &str) -> Result<bool> {
		let Some(decoder) = classify(buf) else {
			return Ok(false);
		};
		if self.depth >= self.options.walk.max_depth {
			return Err(Error::TooDeep(self.options.walk.max_depth));
		}
		info!("{prefix}: {}", decoder.desc());
		self.depth += 1;
		let result = decoder.decode(buf, &self.options.walk).and_then(|data| self.handle_decoded(data, prefix));
		self.depth -= 1;
		result.map(|()| true)
	}

	fn handle_decoded(&mut self, data: DynData, prefix: &str) -> Result<()> {
		match data {
			DynData::Assets(assets) => {
				for asset in assets {
					self.push(format!("{prefix}{}", asset.name), asset.kind);
				}
			}
			DynData::Archive(archive) => {
				for entry in archive.entries.into_vec() {
					let name = format!("{prefix}-{}", entry.name);
					self.handle_data(&entry.data, &name)?;
					self.push(name, AssetKind::Binary(entry.data));
				}
			}
			DynData::Form(tree) => self.handle_form(&tree, prefix)?
		}
		Ok(())
	}

	fn handle_form(&mut self, tree: &FormTree, prefix: &str) -> Result<()> {
		tree.walk(|event| match event {
			WalkEvent::EnterForm(_, node) => {
				debug!("form {:?} at {:#010x}", node.form_tag(), node.offset);
				Ok(())
			}
			WalkEvent::Chunk(id, node) => self.handle_chunk(tree, id, node, prefix),
			WalkEvent::LeaveForm(id, _) => self.handle_complete_form(tree, id, prefix)
		})?;
		if let Some((offset, data)) = &tree.trailing {
			self.push(format!("{prefix}-chunk-{offset:#010x}-taildata.bin"), AssetKind::Binary(data.clone()));
		}
		Ok(())
	}

	fn handle_chunk(&mut self, tree: &FormTree, id: NodeId, node: &FormNode, prefix: &str) -> Result<()> {
		let Some(data) = node.data() else {
			return Ok(());
		};
		let name = tree.chunk_name(prefix, id);
		if self.options.raw_chunks {
			self.push(format!("{name}.bin"), AssetKind::Binary(data.into()));
		}
		if node.tag == BMTD {
			info!("{name}: XMI MIDI");
			self.push(format!("{name}-midi.xmi"), AssetKind::Binary(data.into()));
			return Ok(());
		}
		if self.handle_data(data, &name)? {
			return Ok(());
		}
		match text_formats::decode(data, text_encoding(&name))? {
			Some(text) => {
				if let Some(dot) = text.tree_dot {
					self.push(format!("{name}-huffman.dot"), AssetKind::Text(dot));
				}
				if !text.items.is_empty() {
					self.push(format!("{name}-lines.txt"), AssetKind::Text(format_items(&text.items)));
				}
			}
			None => {
				debug!("{name}: unhandled chunk of {} bytes", data.len());
				if !self.options.raw_chunks {
					self.push(format!("{name}.bin"), AssetKind::Binary(data.into()));
				}
			}
		}
		Ok(())
	}

	/// Forms whose meaning depends on several of their chunks at once.
	fn handle_complete_form(&mut self, tree: &FormTree, id: NodeId, prefix: &str) -> Result<()> {
		let name = || if id == FormTree::ROOT {prefix.to_string()} else {tree.chunk_name(prefix, id)};
		if let Some(mesh) = br3d::decode_form(tree, id)? {
			let name = name();
			let mtl_file = format!("{name}-mesh.mtl");
			self.push(format!("{name}-mesh.obj"), AssetKind::Text(mesh.to_obj(&mtl_file)));
			self.push(mtl_file, AssetKind::Text(mesh.to_mtl()));
		}
		if let Some(frame) = brpm::decode_form(tree, id)? {
			self.push(format!("{}-brpm.png", name()), AssetKind::Image(frame));
		}
		Ok(())
	}
}

/// Decodes `buf` and everything nested inside it. Output names start with `prefix`,
/// normally the input's file name.
pub fn extract(buf: &[u8], prefix: &str, options: &ExtractOptions) -> Result<Extraction> {
	let mut extractor = Extractor {options, outputs: Vec::new(), depth: 0};
	let claimed = extractor.handle_data(buf, prefix)?;
	if !claimed {
		info!("{prefix}: not a recognised format");
	}
	Ok(Extraction {outputs: extractor.outputs, claimed})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::archive_formats::{big::tests::big, iff::tests::{chunk, form}};

	fn names(extraction: &Extraction) -> Vec<&str> {
		extraction.outputs.iter().map(|asset| asset.name.as_str()).collect()
	}

	#[test]
	fn bigf_entries_are_dispatched_then_written() {
		let inner = form(b"TEST", &[chunk(b"DATA", b"??")]);
		let buf = big(&[("A.IFF", &inner)]);
		let extraction = extract(&buf, "X.BIG", &ExtractOptions::default()).unwrap();
		assert!(extraction.claimed);
		assert_eq!(names(&extraction), ["X.BIG-A.IFF-chunk-0x00000014-TEST-DATA.bin", "X.BIG-A.IFF"]);
	}

	#[test]
	fn raw_chunks_are_written_once() {
		let buf = form(b"TEST", &[chunk(b"DATA", b"??"), chunk(b"BMTD", b"mid")]);
		let options = ExtractOptions {raw_chunks: true, ..Default::default()};
		let extraction = extract(&buf, "M.IFF", &options).unwrap();
		assert_eq!(names(&extraction), [
			"M.IFF-chunk-0x00000014-TEST-DATA.bin",
			"M.IFF-chunk-0x0000001e-TEST-BMTD.bin",
			"M.IFF-chunk-0x0000001e-TEST-BMTD-midi.xmi"
		]);
	}

	#[test]
	fn dispatch_depth_is_bounded() {
		let mut buf = form(b"LEAF", &[chunk(b"DATA", b"ok")]);
		for _ in 0..3 {
			buf = big(&[("N", &buf)]);
		}
		let options = ExtractOptions {walk: WalkOptions {max_depth: 3}, raw_chunks: false};
		assert!(matches!(extract(&buf, "D", &options), Err(Error::TooDeep(3))));
		let options = ExtractOptions {walk: WalkOptions {max_depth: 4}, raw_chunks: false};
		assert!(extract(&buf, "D", &options).is_ok());
	}

	#[test]
	fn models_are_written_as_obj_and_mtl() {
		let buf = br3d::tests::model("hull");
		let extraction = extract(&buf, "SHIP.IFF", &ExtractOptions::default()).unwrap();
		let names = names(&extraction);
		let [.., obj, mtl] = names.as_slice() else {
			panic!("no model outputs in {names:?}");
		};
		assert_eq!(*obj, "SHIP.IFF-mesh.obj");
		assert_eq!(*mtl, "SHIP.IFF-mesh.mtl");
		let AssetKind::Text(obj) = &extraction.outputs[extraction.outputs.len() - 2].kind else {
			panic!("obj is not text");
		};
		assert!(obj.starts_with("mtllib SHIP.IFF-mesh.mtl\n"));
		assert!(obj.ends_with("f 1/1 3/3 2/2\n"));
	}

	#[test]
	fn unknown_buffers_are_not_claimed() {
		let extraction = extract(b"just some bytes", "README", &ExtractOptions::default()).unwrap();
		assert!(!extraction.claimed);
		assert!(extraction.outputs.is_empty());
	}
}
