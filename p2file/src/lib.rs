use archive_formats::{Archive, iff::{FormTree, WalkOptions}};
use image::Frame;
use sound_formats::Sound;

mod error;
pub use error::{Error, Result, Tag};
pub mod byte_slice;
pub mod byte_iter;
pub mod bit_stream;
pub mod image;
pub mod data_formats;
pub mod archive_formats;
pub mod text_formats;
pub mod image_formats;
pub mod model_formats;
pub mod sound_formats;
pub mod extract;
pub use extract::{extract, ExtractOptions, Extraction};

#[derive(Clone, Copy)]
pub struct Decoder {
	id: &'static str,
	desc: &'static str,
	detect: fn(buf: &[u8]) -> bool,
	decode: fn(buf: &[u8], options: &WalkOptions) -> Result<DynData>
}

impl Decoder {
	pub fn id(&self) -> &'static str {
		self.id
	}

	pub fn desc(&self) -> &'static str {
		self.desc
	}

	pub fn detect(&self, buf: &[u8]) -> bool {
		(self.detect)(buf)
	}

	pub fn decode(&self, buf: &[u8], options: &WalkOptions) -> Result<DynData> {
		(self.decode)(buf, options)
	}
}

impl std::fmt::Debug for Decoder {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Decoder({})", self.id)
	}
}

pub enum DynData {
	Archive(Archive),
	Form(FormTree),
	Assets(Vec<Asset>)
}

pub enum AssetKind {
	Binary(Box<[u8]>),
	Text(String),
	Image(Frame),
	Sound(Sound)
}

/// A finished output; `name` is appended to the output prefix of the buffer it came from.
pub struct Asset {
	pub name: String,
	pub kind: AssetKind
}

impl Asset {
	pub fn binary(name: String, data: Box<[u8]>) -> Self {
		Self {name, kind: AssetKind::Binary(data)}
	}

	pub fn text(name: impl Into<String>, text: String) -> Self {
		Self {name: name.into(), kind: AssetKind::Text(text)}
	}

	pub fn image(name: String, frame: Frame) -> Self {
		Self {name, kind: AssetKind::Image(frame)}
	}

	pub fn sound(name: String, sound: Sound) -> Self {
		Self {name, kind: AssetKind::Sound(sound)}
	}
}

/// Checked in this order; at most one can match any buffer.
pub static DECODERS: [Decoder; 7] = [
	archive_formats::big::ENTRY_BIG,
	archive_formats::ENTRY_IFF,
	image_formats::shp::ENTRY_SHP,
	sound_formats::fat::ENTRY_FAT,
	image_formats::font::ENTRY_FONT,
	image_formats::base::ENTRY_BASE,
	text_formats::movie_list::ENTRY_MOVIELIST
];

const SIGNATURES: [&[u8; 4]; 5] = [
	archive_formats::big::MAGIC,
	b"FORM",
	image_formats::shp::MAGIC,
	sound_formats::fat::MAGIC,
	image_formats::font::MAGIC
];

/// Whether the buffer starts with one of the four byte format signatures.
pub(crate) fn has_signature(buf: &[u8]) -> bool {
	SIGNATURES.iter().any(|sig| buf.starts_with(*sig))
}

/// The decoder for this buffer, or `None` when it is not a recognised format.
pub fn classify(buf: &[u8]) -> Option<&'static Decoder> {
	let found = DECODERS.iter().find(|decoder| decoder.detect(buf));
	debug_assert!(
		DECODERS.iter().filter(|decoder| decoder.detect(buf)).count() <= 1,
		"more than one decoder claims this buffer"
	);
	found
}
