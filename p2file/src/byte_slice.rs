use crate::error::{Error, Result};

macro_rules! impl_byte_readers {
	($($t:ty),*) => {paste::paste! {$(
		fn [<read_ $t _field>](&self, offset: usize, what: &'static str) -> Result<$t> {
			self.[<get_ $t _at>](offset).ok_or_else(#[cold] || Error::Truncated {what, offset, len: self.len()})
		}
		fn [<read_ $t _field_be>](&self, offset: usize, what: &'static str) -> Result<$t> {
			self.[<get_ $t _at_be>](offset).ok_or_else(#[cold] || Error::Truncated {what, offset, len: self.len()})
		}
		fn [<get_ $t _at>](&self, offset: usize) -> Option<$t> {
			Some($t::from_le_bytes(self.get(offset..offset.checked_add(size_of::<$t>())?)?.try_into().ok()?))
		}
		fn [<get_ $t _at_be>](&self, offset: usize) -> Option<$t> {
			Some($t::from_be_bytes(self.get(offset..offset.checked_add(size_of::<$t>())?)?.try_into().ok()?))
		}
	)*}}
}

/// Bounds-checked field access on raw buffers.
pub trait ByteSlice {
	fn read_u8_field(&self, offset: usize, what: &'static str) -> Result<u8>;
	fn read_u16_field(&self, offset: usize, what: &'static str) -> Result<u16>;
	fn read_u32_field(&self, offset: usize, what: &'static str) -> Result<u32>;
	fn read_i32_field(&self, offset: usize, what: &'static str) -> Result<i32>;
	fn read_u8_field_be(&self, offset: usize, what: &'static str) -> Result<u8>;
	fn read_u16_field_be(&self, offset: usize, what: &'static str) -> Result<u16>;
	fn read_u32_field_be(&self, offset: usize, what: &'static str) -> Result<u32>;
	fn read_i32_field_be(&self, offset: usize, what: &'static str) -> Result<i32>;
	fn get_u8_at(&self, offset: usize) -> Option<u8>;
	fn get_u16_at(&self, offset: usize) -> Option<u16>;
	fn get_u32_at(&self, offset: usize) -> Option<u32>;
	fn get_i32_at(&self, offset: usize) -> Option<i32>;
	fn get_u8_at_be(&self, offset: usize) -> Option<u8>;
	fn get_u16_at_be(&self, offset: usize) -> Option<u16>;
	fn get_u32_at_be(&self, offset: usize) -> Option<u32>;
	fn get_i32_at_be(&self, offset: usize) -> Option<i32>;
	fn read_bytes_field(&self, offset: usize, len: usize, what: &'static str) -> Result<&[u8]>;
	fn read_tag_field(&self, offset: usize, what: &'static str) -> Result<crate::Tag>;
}

impl ByteSlice for [u8] {
	impl_byte_readers!(u8, u16, u32, i32);

	fn read_bytes_field(&self, offset: usize, len: usize, what: &'static str) -> Result<&[u8]> {
		offset.checked_add(len)
			.and_then(|end| self.get(offset..end))
			.ok_or_else(#[cold] || Error::Truncated {what, offset, len: self.len()})
	}

	fn read_tag_field(&self, offset: usize, what: &'static str) -> Result<crate::Tag> {
		Ok(crate::Tag(self.read_bytes_field(offset, 4, what)?.try_into().unwrap_or_default()))
	}
}
