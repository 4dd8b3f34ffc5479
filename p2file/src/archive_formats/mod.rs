pub mod big;
pub mod iff;

use crate::{Decoder, DynData};
use iff::FormTree;

pub struct ArchiveEntry {
	pub name: String,
	pub data: Box<[u8]>
}

pub struct Archive {
	pub format: &'static str,
	pub entries: Box<[ArchiveEntry]>
}

pub const ENTRY_IFF: Decoder = Decoder {
	id: "iff",
	desc: "IFF-style nested FORM container",
	detect: iff::is_form,
	decode: |buf, options| FormTree::parse(buf, options).map(DynData::Form)
};
