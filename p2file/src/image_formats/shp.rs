use log::{debug, info, warn};
use crate::{Asset, Decoder, DynData, byte_iter::ByteIter, byte_slice::ByteSlice, error::{Error, Result}, image::{Frame, Palette, Pixel, PALETTE_SIZE}};

pub const MAGIC: &[u8; 4] = b"1.40";

// frames with displacements past this are garbage, e.g. 0x7fffffff in one of the BEX.IFF sets
const MAX_DISPLACEMENT: i32 = 1024;
const MAX_DIMENSION: i32 = 4096;

pub const ENTRY_SHP: Decoder = Decoder {
	id: "shp",
	desc: "SHP run-length encoded indexed images with optional palettes",
	detect: |buf| buf.starts_with(MAGIC),
	decode: |buf, _| decode(buf).map(DynData::Assets)
};

fn items(buf: &[u8]) -> Result<Vec<(usize, &[u8])>> {
	let count = buf.read_u32_field(4, "shp item count")? as usize;
	if count > buf.len() / 8 {
		return Err(Error::Invalid(format!("shp claims {count} items in {} bytes", buf.len())));
	}
	let offsets = (0..count).map(|i| {
		let offset = buf.read_u32_field(8 + i * 8, "shp item offset")? as usize;
		let zero = buf.read_u32_field(12 + i * 8, "shp item padding")?;
		if zero != 0 {
			return Err(Error::Invalid(format!("expected zero after shp item {i} offset, got {zero:#x}")));
		}
		Ok(offset)
	}).collect::<Result<Vec<_>>>()?;
	offsets.iter().enumerate().map(|(i, &offset)| {
		let end = offsets.get(i + 1).copied().unwrap_or(buf.len());
		let item = buf.get(offset..end).ok_or_else(|| Error::Invalid(format!("shp item {i} spans {offset:#x}..{end:#x}, file is {:#x} bytes", buf.len())))?;
		Ok((offset, item))
	}).collect()
}

/// Palette items are emitted and collected first; the last one colours every image.
pub fn decode(buf: &[u8]) -> Result<Vec<Asset>> {
	let items = items(buf)?;
	info!("shp file size: {}, number of items: {}", buf.len(), items.len());
	let mut assets = Vec::new();
	let mut palette = None;
	for (i, &(offset, item)) in items.iter().enumerate() {
		if item.len() == PALETTE_SIZE {
			debug!("palette @ index {i}, offset {offset:#010x}");
			assets.push(Asset::binary(format!("-palette-{offset:#010x}.pal"), item.into()));
			palette = Some(Palette::from_rgb(item)?);
		}
	}
	let palette = palette.unwrap_or_else(Palette::grayscale);
	for (i, &(_, item)) in items.iter().enumerate() {
		if item.len() == PALETTE_SIZE {
			continue;
		}
		let dx = item.read_i32_field(8, "shp displacement x")?;
		let dy = item.read_i32_field(12, "shp displacement y")?;
		let x_dim = item.read_i32_field(16, "shp x dimension")?;
		let y_dim = item.read_i32_field(20, "shp y dimension")?;
		let width = (x_dim as i64 + 1 - dx as i64).clamp(0, i32::MAX as i64) as i32;
		let height = (y_dim as i64 + 1 - dy as i64).clamp(0, i32::MAX as i64) as i32;
		debug!("shp image {i}: {width}x{height}, {} bytes, displacement {dx},{dy}", item.len());
		if dx > MAX_DISPLACEMENT || dy > MAX_DISPLACEMENT {
			warn!("skipping shp image {i} with displacement {dx},{dy}");
			continue;
		}
		if !(1..=MAX_DIMENSION).contains(&width) || !(1..=MAX_DIMENSION).contains(&height) {
			warn!("skipping shp image {i} with size {width}x{height}");
			continue;
		}
		let indices = unpack_rle(&item[24..], width as u32, height as u32)?;
		let mut frame = Frame::empty(width as u32, height as u32);
		for (dst, src) in frame.pixels.iter_mut().zip(indices.iter()) {
			*dst = src.map_or(Pixel::TRANSPARENT, |index| palette.lookup(index));
		}
		assets.push(Asset::image(format!("-{i}.png"), frame));
	}
	Ok(assets)
}

fn span(out: &mut [Option<u8>], pos: usize, n: usize) -> Result<&mut [Option<u8>]> {
	let len = out.len();
	out.get_mut(pos..pos + n).ok_or_else(|| Error::Invalid(format!("shp run of {n} at pixel {pos} overflows {len} pixels")))
}

/// Opcode byte b: low bit selects the family, b >> 1 is the count.
/// Pixels never written stay `None`.
pub fn unpack_rle(src: &[u8], width: u32, height: u32) -> Result<Box<[Option<u8>]>> {
	let total = src.len();
	let mut src = src.iter().copied();
	let mut out = vec![None; (width * height) as usize];
	let mut pos = 0;
	let mut y = 0;
	while y < height {
		let [b] = src.expect_bytes::<1>("shp opcode", total)?;
		let n = (b >> 1) as usize;
		match (b & 1, n) {
			(0, 0) => {
				y += 1;
				pos = (y * width) as usize;
			}
			(0, _) => {
				let [value] = src.expect_bytes::<1>("shp fill value", total)?;
				span(&mut out, pos, n)?.fill(Some(value));
				pos += n;
			}
			(_, 0) => {
				let [skip] = src.expect_bytes::<1>("shp skip count", total)?;
				pos += skip as usize;
			}
			_ => {
				if n > src.len() {
					return Err(Error::Truncated {what: "shp literal run", offset: total - src.len(), len: total});
				}
				for (dst, value) in span(&mut out, pos, n)?.iter_mut().zip(src.by_ref().take(n)) {
					*dst = Some(value);
				}
				pos += n;
			}
		}
	}
	Ok(out.into_boxed_slice())
}
