use bytemuck::{Pod, Zeroable};
use crate::error::{Error, Result};

pub const PALETTE_SIZE: usize = 256 * 3;

#[repr(C)]
#[derive(Zeroable, Pod, Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Pixel {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: u8
}

impl Pixel {
	pub const TRANSPARENT: Pixel = Pixel {r: 0, g: 0, b: 0, a: 0};

	pub const fn gray(v: u8) -> Self {
		Self {r: v, g: v, b: v, a: 0xFF}
	}
}

fn bits_6_to_8(x: u8) -> u8 {
	x << 2 | (x & 1) << 1 | (x & 1)
}

/// 256 colour lookup table read from a raw RGB palette.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Palette(Box<[Pixel; 256]>);

impl Palette {
	pub fn grayscale() -> Self {
		Self(Box::new(std::array::from_fn(|i| Pixel::gray(i as u8))))
	}

	/// VGA DAC palettes only use 6 bits per component; those are widened, anything
	/// with a larger component is taken as 8 bit already.
	pub fn from_rgb(buf: &[u8]) -> Result<Self> {
		if buf.len() < PALETTE_SIZE {
			return Err(Error::Truncated {what: "palette", offset: 0, len: buf.len()});
		}
		let buf = &buf[..PALETTE_SIZE];
		let six_bit = buf.iter().all(|&c| c < 64);
		let widen = |c: u8| if six_bit {bits_6_to_8(c)} else {c};
		Ok(Self(Box::new(std::array::from_fn(|i| Pixel {
			r: widen(buf[i * 3]),
			g: widen(buf[i * 3 + 1]),
			b: widen(buf[i * 3 + 2]),
			a: 0xFF
		}))))
	}

	pub fn lookup(&self, index: u8) -> Pixel {
		self.0[index as usize]
	}
}

#[derive(Clone)]
pub struct Frame {
	pub width: u32,
	pub height: u32,
	pub pixels: Box<[Pixel]>
}

impl Frame {
	pub fn empty(width: u32, height: u32) -> Self {
		Self {
			width, height,
			pixels: vec![Pixel::TRANSPARENT; (width * height) as usize].into()
		}
	}

	pub fn from_clut8(width: u32, height: u32, palette: &Palette, buf: &[u8]) -> Result<Self> {
		let needed_size = (width * height) as usize;
		if buf.len() < needed_size {
			return Err(Error::Truncated {what: "indexed pixels", offset: buf.len(), len: needed_size});
		}
		Ok(Self {
			width, height,
			pixels: buf[..needed_size].iter().map(|&x| palette.lookup(x)).collect()
		})
	}

	pub fn from_gray(width: u32, height: u32, buf: &[u8]) -> Result<Self> {
		Self::from_clut8(width, height, &Palette::grayscale(), buf)
	}

	pub fn row(&self, y: u32) -> &[Pixel] {
		let w = self.width as usize;
		&self.pixels[y as usize * w..y as usize * w + w]
	}

	pub fn row_mut(&mut self, y: u32) -> &mut [Pixel] {
		let w = self.width as usize;
		&mut self.pixels[y as usize * w..y as usize * w + w]
	}

	pub fn as_rgba_bytes(&self) -> &[u8] {
		bytemuck::cast_slice(&self.pixels)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn six_bit_palettes_are_widened() {
		let mut raw = vec![0u8; PALETTE_SIZE];
		raw[3..6].copy_from_slice(&[63, 32, 1]);
		let palette = Palette::from_rgb(&raw).unwrap();
		assert_eq!(palette.lookup(1), Pixel {r: 255, g: 128, b: 7, a: 255});
		raw[6] = 200;
		let palette = Palette::from_rgb(&raw).unwrap();
		assert_eq!(palette.lookup(1), Pixel {r: 63, g: 32, b: 1, a: 255});
		assert_eq!(palette.lookup(2).r, 200);
	}

	#[test]
	fn clut_frames_need_every_pixel() {
		let frame = Frame::from_gray(2, 2, &[0, 1, 2, 3, 4]).unwrap();
		assert_eq!(frame.row(1), [Pixel::gray(2), Pixel::gray(3)]);
		assert_eq!(frame.as_rgba_bytes().len(), 16);
		assert!(Frame::from_gray(2, 2, &[0, 1, 2]).is_err());
	}
}
