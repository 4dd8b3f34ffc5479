use std::fmt::Write;
use log::{debug, info};
use crate::{Tag, archive_formats::iff::{FormTree, NodeId}, byte_slice::ByteSlice, error::{Error, Result}};

pub const BR3D: Tag = Tag(*b"BR3D");
const BMAT: Tag = Tag(*b"BMAT");
const MNAM: Tag = Tag(*b"MNAM");
const MCMP: Tag = Tag(*b"MCMP");
const NAME: Tag = Tag(*b"3DNM");
const NUM_VERTICES: Tag = Tag(*b"3VTS");
const NUM_MATERIALS: Tag = Tag(*b"MATS");
const NUM_FACES: Tag = Tag(*b"3FCS");
const FLAGS: Tag = Tag(*b"3FLG");
const VERTICES: Tag = Tag(*b"VERS");
const FACE_MATERIALS: Tag = Tag(*b"FMTS");
const FACES: Tag = Tag(*b"FACS");

const VERTEX_FLOATS: usize = 10;
const FACE_MATERIAL_LEN: usize = 32;
const FACE_WORDS: usize = 18;

/// Colour maps live as BRender pixmaps in SPACETEX.IFF.
const TEXTURE_ARCHIVE: &str = "SPACETEX.IFF";

pub struct Material {
	pub name: String,
	pub colormap: String,
	/// one-based vertex indices
	pub faces: Vec<[u32; 3]>
}

impl Material {
	/// Output name of the pixmap the colour map refers to, `HULL.PIX` becomes `SPACETEX.IFF-hull.iff-brpm.png`.
	pub fn texture_file(&self) -> String {
		let stem = self.colormap.split('.').next().unwrap_or_default();
		format!("{TEXTURE_ARCHIVE}-{}.iff-brpm.png", stem.to_ascii_lowercase())
	}
}

pub struct Vertex {
	pub position: [f32; 3],
	pub uv: [f32; 2],
	/// the other five floats, the last three of which look like a normal
	pub extra: [f32; 5]
}

pub struct Mesh {
	pub name: String,
	pub flags: u16,
	pub vertices: Vec<Vertex>,
	pub materials: Vec<Material>
}

fn c_string(buf: &[u8]) -> String {
	let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
	String::from_utf8_lossy(&buf[..end]).into_owned()
}

fn require(tree: &FormTree, id: NodeId, tag: Tag) -> Result<&[u8]> {
	tree.find_chunk(id, tag).ok_or_else(|| Error::Invalid(format!("BR3D form has no {tag} chunk")))
}

fn check_size(what: &str, chunk: &[u8], count: usize, item_len: usize) -> Result<()> {
	if chunk.len() != count * item_len {
		return Err(Error::Invalid(format!("invalid {what} size: {} bytes for {count} items of {item_len}", chunk.len())));
	}
	Ok(())
}

fn materials(tree: &FormTree, id: NodeId) -> Vec<Material> {
	tree.children(id).iter()
		.filter(|&&child| tree.node(child).form_tag() == Some(BMAT))
		.map(|&child| {
			let name = tree.find_chunk(child, MNAM).map(c_string).unwrap_or_default();
			let colormap = tree.find_chunk(child, MCMP).map(c_string).unwrap_or_default();
			debug!("material '{name}' -> '{colormap}'");
			Material {name, colormap, faces: Vec::new()}
		})
		.collect()
}

/// A BRender model form. Faces are grouped by the material named in `FMTS`.
pub fn decode_form(tree: &FormTree, id: NodeId) -> Result<Option<Mesh>> {
	if tree.node(id).form_tag() != Some(BR3D) {
		return Ok(None);
	}
	let mut materials = materials(tree, id);
	let name = c_string(require(tree, id, NAME)?);
	let num_vertices = require(tree, id, NUM_VERTICES)?.read_u16_field(0, "vertex count")? as usize;
	let num_materials = require(tree, id, NUM_MATERIALS)?.read_u16_field(0, "material count")?;
	let num_faces = require(tree, id, NUM_FACES)?.read_u16_field(0, "face count")? as usize;
	let flags = require(tree, id, FLAGS)?.read_u16_field(0, "model flags")?;
	info!("model '{name}', vertices: {num_vertices}, faces: {num_faces}, materials: {num_materials}, flags: {flags:#06x}");

	let vertex_data = require(tree, id, VERTICES)?;
	check_size("vertex data", vertex_data, num_vertices, VERTEX_FLOATS * 4)?;
	let face_materials = require(tree, id, FACE_MATERIALS)?;
	check_size("face material", face_materials, num_faces, FACE_MATERIAL_LEN)?;
	let face_data = require(tree, id, FACES)?;
	check_size("face data", face_data, num_faces, FACE_WORDS * 2)?;

	let vertices = vertex_data.chunks_exact(VERTEX_FLOATS * 4).map(|vertex| {
		let f: [f32; VERTEX_FLOATS] = std::array::from_fn(|i| f32::from_le_bytes([vertex[i * 4], vertex[i * 4 + 1], vertex[i * 4 + 2], vertex[i * 4 + 3]]));
		Vertex {position: [f[0], f[1], f[2]], uv: [f[3], f[4]], extra: [f[5], f[6], f[7], f[8], f[9]]}
	}).collect();

	for (face, material_name) in face_data.chunks_exact(FACE_WORDS * 2).zip(face_materials.chunks_exact(FACE_MATERIAL_LEN)) {
		let material_name = c_string(material_name);
		let material = materials.iter_mut()
			.find(|material| material.name == material_name)
			.ok_or_else(|| Error::Invalid(format!("could not find material: {material_name}")))?;
		let corner = |i: usize| u16::from_le_bytes([face[i * 2], face[i * 2 + 1]]) as u32 + 1;
		material.faces.push([corner(0), corner(1), corner(2)]);
	}
	Ok(Some(Mesh {name, flags, vertices, materials}))
}

impl Mesh {
	pub fn to_mtl(&self) -> String {
		let mut out = String::new();
		for material in &self.materials {
			let texture = material.texture_file();
			let _ = write!(out, concat!(
				"newmtl {}\n",
				"Ka 1.000 1.000 1.000\n",
				"Kd 1.000 1.000 1.000\n",
				"Ks 0.000 0.000 0.000\n",
				"d 1.0\n",
				"illum 2\n",
				"map_Ka {texture}\n",
				"map_Kd {texture}\n\n"
			), material.name, texture = texture);
		}
		out
	}

	/// Wavefront OBJ source; `mtl_file` is the name the material library is written under.
	pub fn to_obj(&self, mtl_file: &str) -> String {
		let mut out = format!("mtllib {mtl_file}\n");
		for vertex in &self.vertices {
			let [x, y, z] = vertex.position;
			let _ = writeln!(out, "v {x:.10} {y:.10} {z:.10}");
			let _ = writeln!(out, "vt {:.10} {:.10}", vertex.uv[0], 1.0 - vertex.uv[1]);
		}
		for material in &self.materials {
			let _ = writeln!(out, "o {}-{}", self.name, material.name);
			let _ = writeln!(out, "usemtl {}", material.name);
			for [a, b, c] in &material.faces {
				let _ = writeln!(out, "f {a}/{a} {b}/{b} {c}/{c}");
			}
		}
		out
	}
}
