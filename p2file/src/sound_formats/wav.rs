/// RIFF/WAVE container around 16-bit little endian mono PCM.
pub fn encode(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
	const CHANNELS: u16 = 1;
	const BITS: u16 = 16;
	let block_align = CHANNELS * BITS / 8;
	let data_len = (samples.len() * 2) as u32;
	let mut out = Vec::with_capacity(44 + data_len as usize);
	out.extend_from_slice(b"RIFF");
	out.extend_from_slice(&(36 + data_len).to_le_bytes());
	out.extend_from_slice(b"WAVE");
	out.extend_from_slice(b"fmt ");
	out.extend_from_slice(&16u32.to_le_bytes());
	out.extend_from_slice(&1u16.to_le_bytes());
	out.extend_from_slice(&CHANNELS.to_le_bytes());
	out.extend_from_slice(&sample_rate.to_le_bytes());
	out.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
	out.extend_from_slice(&block_align.to_le_bytes());
	out.extend_from_slice(&BITS.to_le_bytes());
	out.extend_from_slice(b"data");
	out.extend_from_slice(&data_len.to_le_bytes());
	out.extend(samples.iter().flat_map(|s| s.to_le_bytes()));
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::byte_slice::ByteSlice;

	#[test]
	fn header_fields() {
		let wav = encode(22050, &[1, -2]);
		assert_eq!(wav.len(), 48);
		assert_eq!(&wav[..4], b"RIFF");
		assert_eq!(wav.get_u32_at(4), Some(40));
		assert_eq!(wav.get_u32_at(24), Some(22050));
		assert_eq!(wav.get_u32_at(28), Some(44100));
		assert_eq!(wav.get_u32_at(40), Some(4));
		assert_eq!(&wav[44..], [1, 0, 0xFE, 0xFF]);
	}
}
