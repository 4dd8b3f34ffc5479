/// MSB-first bit cursor over a byte buffer.
pub struct BitStream<'a> {
	buf: &'a [u8],
	pos: usize
}

impl<'a> BitStream<'a> {
	pub fn new(buf: &'a [u8]) -> Self {
		Self {buf, pos: 0}
	}

	pub fn seek(&mut self, byte_offset: u32, bit_offset: u32) {
		self.pos = (byte_offset as usize).saturating_mul(8).saturating_add(bit_offset as usize);
	}

	pub fn position(&self) -> usize {
		self.pos
	}

	pub fn available(&self) -> bool {
		self.pos < self.buf.len() * 8
	}

	pub fn read_bit(&mut self) -> Option<u8> {
		let byte = *self.buf.get(self.pos / 8)?;
		let bit = (byte >> (7 - self.pos % 8)) & 1;
		self.pos += 1;
		Some(bit)
	}
}
