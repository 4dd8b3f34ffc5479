use log::{debug, info};
use crate::{Asset, Decoder, DynData, byte_slice::ByteSlice, error::{Error, Result}, image::{Frame, Pixel}};

pub const MAGIC: &[u8; 4] = b"1.\0\0";

const MAX_HEIGHT: u32 = 1024;
// 256 MiB of RGBA
const MAX_ATLAS_PIXELS: usize = 1 << 26;
const MARKER: Pixel = Pixel {r: 0xFF, g: 0x00, b: 0xFF, a: 0xFF};

pub const ENTRY_FONT: Decoder = Decoder {
	id: "font",
	desc: "Bitmap font with per glyph widths",
	detect: |buf| buf.starts_with(MAGIC),
	decode: |buf, _| {
		let font = Font::parse(buf)?;
		Ok(DynData::Assets(vec![
			Asset::binary("-font.txt".into(), font.codes().collect()),
			Asset::image("-font.png".into(), font.atlas()?)
		]))
	}
};

pub struct Glyph<'a> {
	pub code: u32,
	pub width: u32,
	pub pixels: &'a [u8]
}

pub struct Font<'a> {
	pub height: u32,
	pub glyphs: Vec<Glyph<'a>>
}

impl<'a> Font<'a> {
	pub fn parse(buf: &'a [u8]) -> Result<Self> {
		let num_chars = buf.read_u32_field(4, "glyph count")? as usize;
		let height = buf.read_u32_field(8, "font height")?;
		let unknown = buf.read_u32_field(12, "font header")?;
		info!("num chars: {num_chars}, height: {height}, unknown: {unknown:#010x}");
		if height > MAX_HEIGHT {
			return Err(Error::Invalid(format!("font height {height} too large")));
		}
		if num_chars > buf.len() / 4 {
			return Err(Error::Invalid(format!("font claims {num_chars} glyphs in {} bytes", buf.len())));
		}
		let glyphs = (0..num_chars).map(|i| {
			let offset = buf.read_u32_field(16 + i * 4, "glyph offset")? as usize;
			let width = buf.read_u32_field(offset, "glyph width")? & 0xFFFF;
			let pixels = buf.read_bytes_field(offset + 4, width as usize * height as usize, "glyph pixels")?;
			debug!("glyph {i:3} / {i:#04x}: offset {offset:#010x}, width {width}");
			Ok(Glyph {code: i as u32, width, pixels})
		}).collect::<Result<_>>()?;
		Ok(Self {height, glyphs})
	}

	fn present(&self) -> impl Iterator<Item = &Glyph<'a>> {
		self.glyphs.iter().filter(|glyph| glyph.width > 0)
	}

	/// Codes of the glyphs in atlas order, one byte each.
	pub fn codes(&self) -> impl Iterator<Item = u8> + '_ {
		self.present().map(|glyph| glyph.code as u8)
	}

	/// Glyphs side by side, separated by one column whose top pixel is a magenta marker.
	/// Intensities are stretched so the brightest pixel in the font becomes 255.
	/// Glyph offsets may share pixel data, so the atlas can be far larger than the file.
	pub fn atlas(&self) -> Result<Frame> {
		let too_large = || Error::Invalid(format!("font atlas of {} glyphs, {} pixels high is too large", self.glyphs.len(), self.height));
		let total_width = self.present()
			.try_fold(1usize, |sum, glyph| sum.checked_add(glyph.width as usize + 1))
			.ok_or_else(too_large)?;
		match total_width.checked_mul(self.height as usize) {
			Some(pixels) if pixels <= MAX_ATLAS_PIXELS => (),
			_ => return Err(too_large())
		}
		let total_width = total_width as u32;
		let max = self.present().flat_map(|glyph| glyph.pixels.iter().copied()).max().unwrap_or(0).max(1) as u32;
		info!("font pixel intensity range: 0-{max}");
		let mut frame = Frame::empty(total_width, self.height);
		let mut x = 0;
		for glyph in self.present() {
			for y in 0..self.height {
				let separator = if y == 0 {MARKER} else {Pixel::TRANSPARENT};
				let row = &mut frame.row_mut(y)[x as usize..(x + glyph.width + 2) as usize];
				row[0] = separator;
				row[row.len() - 1] = separator;
				let src = &glyph.pixels[(y * glyph.width) as usize..((y + 1) * glyph.width) as usize];
				for (dst, &value) in row[1..].iter_mut().zip(src) {
					let v = (value as u32 * 255 / max) as u8;
					*dst = Pixel {r: v, g: v, b: v, a: v};
				}
			}
			x += glyph.width + 1;
		}
		Ok(frame)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	// glyph 0 is 2x2, glyph 1 has no pixels, glyph 2 is 1x2
	fn font() -> Vec<u8> {
		let mut buf = MAGIC.to_vec();
		for v in [3u32, 2, 0, 28, 36, 40] {
			buf.extend_from_slice(&v.to_le_bytes());
		}
		buf.extend_from_slice(&2u32.to_le_bytes());
		buf.extend_from_slice(&[0, 2, 4, 1]);
		buf.extend_from_slice(&0u32.to_le_bytes());
		buf.extend_from_slice(&1u32.to_le_bytes());
		buf.extend_from_slice(&[3, 0]);
		buf
	}

	#[test]
	fn atlas_layout() {
		let buf = font();
		let font = Font::parse(&buf).unwrap();
		assert_eq!(font.codes().collect::<Vec<_>>(), [0, 2]);
		let atlas = font.atlas().unwrap();
		assert_eq!((atlas.width, atlas.height), (1 + 3 + 2, 2));
		assert_eq!(atlas.row(0)[0], MARKER);
		assert_eq!(atlas.row(0)[3], MARKER);
		assert_eq!(atlas.row(0)[5], MARKER);
		assert_eq!(atlas.row(1)[0], Pixel::TRANSPARENT);
		assert_eq!(atlas.row(0)[2], Pixel {r: 127, g: 127, b: 127, a: 127});
		assert_eq!(atlas.row(1)[1].r, 255);
		assert_eq!(atlas.row(0)[4].r, 191);
	}

	#[test]
	fn shared_glyph_data_cannot_blow_up_the_atlas() {
		// every glyph points at the same 1000x1000 block
		let num_chars = 5000u32;
		let glyph_offset = 16 + 4 * num_chars;
		let mut buf = MAGIC.to_vec();
		for v in [num_chars, 1000, 0] {
			buf.extend_from_slice(&v.to_le_bytes());
		}
		for _ in 0..num_chars {
			buf.extend_from_slice(&glyph_offset.to_le_bytes());
		}
		buf.extend_from_slice(&1000u32.to_le_bytes());
		buf.resize(buf.len() + 1000 * 1000, 1);
		let font = Font::parse(&buf).unwrap();
		assert_eq!(font.glyphs.len(), 5000);
		assert!(matches!(font.atlas(), Err(Error::Invalid(_))));
	}

	#[test]
	fn glyphs_must_fit() {
		let mut buf = font();
		buf.truncate(buf.len() - 1);
		assert!(matches!(Font::parse(&buf), Err(Error::Truncated {..})));
	}
}
