use crate::{Asset, Decoder, DynData, data_formats::fb10, error::Result, image::{Frame, Palette, PALETTE_SIZE}};

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 480;

pub const ENTRY_BASE: Decoder = Decoder {
	id: "base",
	desc: "Base backdrop: VGA palette followed by fb10 compressed 640x480 pixels",
	detect: is_base,
	decode: |buf, _| decode(buf).map(DynData::Assets)
};

pub fn is_base(buf: &[u8]) -> bool {
	buf.len() >= PALETTE_SIZE + fb10::MAGIC.len()
		&& fb10::is_compressed(&buf[PALETTE_SIZE..])
		&& !crate::has_signature(buf)
}

pub fn decode(buf: &[u8]) -> Result<Vec<Asset>> {
	let (raw_palette, packed) = buf.split_at(PALETTE_SIZE);
	let palette = Palette::from_rgb(raw_palette)?;
	let pixels = fb10::decompress(packed)?;
	Ok(vec![
		Asset::binary(".pal".into(), raw_palette.into()),
		Asset::image("-base.png".into(), Frame::from_clut8(WIDTH, HEIGHT, &palette, &pixels)?)
	])
}
