use crate::error::{Error, Result};

/// Sequential reads from a byte iterator; `None` once the input runs dry.
pub trait ByteIter: Iterator<Item = u8> + ExactSizeIterator {
	fn next_bytes<const LEN: usize>(&mut self) -> Option<[u8; LEN]>;
	fn next_u16(&mut self) -> Option<u16>;
	fn next_u32(&mut self) -> Option<u32>;
	fn next_u16_be(&mut self) -> Option<u16>;
	fn next_u32_be(&mut self) -> Option<u32>;

	/// Like `next_bytes`, but a short read is a truncation error named after `what`.
	fn expect_bytes<const LEN: usize>(&mut self, what: &'static str, total_len: usize) -> Result<[u8; LEN]> {
		let offset = total_len - self.len();
		self.next_bytes::<LEN>().ok_or(Error::Truncated {what, offset, len: total_len})
	}
}

macro_rules! impl_for_types {
	($($t:ty),*) => {paste::paste! {$(
		fn [<next_ $t>](&mut self) -> Option<$t> {
			self.next_bytes::<{size_of::<$t>()}>().map(|x| $t::from_le_bytes(x))
		}
		fn [<next_ $t _be>](&mut self) -> Option<$t> {
			self.next_bytes::<{size_of::<$t>()}>().map(|x| $t::from_be_bytes(x))
		}
	)*}}
}

impl<T: Iterator<Item = u8> + ExactSizeIterator> ByteIter for T {
	fn next_bytes<const LEN: usize>(&mut self) -> Option<[u8; LEN]> {
		if LEN <= self.len() {
			let mut arr = [0u8; LEN];
			for (i, x) in self.take(LEN).enumerate() {
				arr[i] = x;
			}
			Some(arr)
		} else {
			None
		}
	}

	impl_for_types!(u16, u32);
}
