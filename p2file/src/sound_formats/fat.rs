use log::{debug, info, warn};
use crate::{Asset, Decoder, DynData, byte_slice::ByteSlice, error::{Error, Result}};
use super::{Sound, vox};

pub const MAGIC: &[u8; 4] = b"1.00";
const ENTRY_SIZE: usize = 16;

const FLAG_ENCODING: usize = 0;
const FLAG_SAMPLE_RATE: usize = 8;
const RATE_11KHZ: u8 = 0x00;
const RATE_22KHZ: u8 = 0x01;
const RATE_16KHZ: u8 = 0x03;
// flags 2..=7 of every known sound
const EXPECTED_MID_FLAGS: [u8; 6] = [0x00, 0x00, 0x00, 0x01, 0x00, 0x01];

pub const ENTRY_FAT: Decoder = Decoder {
	id: "fat",
	desc: "FAT sound table, 16-bit PCM or 4-bit VOX ADPCM",
	detect: |buf| buf.starts_with(MAGIC),
	decode: |buf, _| Ok(DynData::Assets(decode(buf)?.into_iter()
		.enumerate()
		.map(|(i, sound)| Asset::sound(format!("-snd{i}.wav"), sound))
		.collect()))
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Encoding {
	Pcm16,
	VoxAdpcm
}

#[derive(Clone, Debug)]
pub struct SoundEntry {
	pub offset: usize,
	pub uncompressed_size: usize,
	/// high byte of the size word, then the eight flag bytes
	pub flags: [u8; 9]
}

impl SoundEntry {
	pub fn encoding(&self) -> Result<Encoding> {
		match self.flags[FLAG_ENCODING] {
			0x00 => Ok(Encoding::Pcm16),
			0x01 => Ok(Encoding::VoxAdpcm),
			x => Err(Error::Invalid(format!("unknown sound encoding {x:#04x}")))
		}
	}

	pub fn sample_rate(&self) -> Result<u32> {
		match self.flags[FLAG_SAMPLE_RATE] {
			RATE_11KHZ => Ok(11025),
			RATE_22KHZ => Ok(22050),
			RATE_16KHZ => Ok(16000),
			x => Err(Error::Invalid(format!("unknown sample rate flag {x:#04x}")))
		}
	}

	pub fn total_samples(&self) -> usize {
		self.uncompressed_size / 2
	}

	pub fn compressed_size(&self) -> Result<usize> {
		Ok(match self.encoding()? {
			Encoding::Pcm16 => self.uncompressed_size,
			Encoding::VoxAdpcm => self.total_samples() / 2
		})
	}

	/// SPEECH.BIG W15_5A.fat and the CRIUS.IFF sound set of the German release set flag 6
	/// and play back at twice the rate the header states.
	fn fix_up(&mut self, i: usize) {
		if self.flags[6] == 0x01 {
			self.flags[6] = 0x00;
			if self.flags[FLAG_SAMPLE_RATE] == RATE_11KHZ {
				warn!("sound {i}: flag 6 set, fixing up sample rate 11kHz -> 22kHz");
				self.flags[FLAG_SAMPLE_RATE] = RATE_22KHZ;
			} else {
				warn!("sound {i}: flag 6 set with sample rate flag {:#04x}, leaving it as is", self.flags[FLAG_SAMPLE_RATE]);
			}
		}
	}

	fn validate(&self, i: usize) -> Result<()> {
		if self.flags[2..=7] != EXPECTED_MID_FLAGS {
			return Err(Error::Invalid(format!("sound {i}: unexpected mid flags {:02x?}", &self.flags[2..=7])));
		}
		self.encoding()?;
		self.sample_rate()?;
		Ok(())
	}
}

pub fn entries(buf: &[u8]) -> Result<Vec<SoundEntry>> {
	let count = buf.read_u32_field(4, "sound count")? as usize;
	info!("file size: {}, number of sounds in file: {count}", buf.len());
	if count > buf.len() / ENTRY_SIZE {
		return Err(Error::Invalid(format!("sound table claims {count} entries in {} bytes", buf.len())));
	}
	(0..count).map(|i| {
		let pos = 8 + i * ENTRY_SIZE;
		let offset = buf.read_u32_field(pos, "sound offset")? as usize;
		let size = buf.read_u32_field(pos + 4, "sound size")?;
		let mut flags = [0; 9];
		flags[0] = (size >> 24) as u8;
		flags[1..].copy_from_slice(buf.read_bytes_field(pos + 8, 8, "sound flags")?);
		let mut entry = SoundEntry {offset, uncompressed_size: (size & 0xFFFFFF) as usize, flags};
		entry.fix_up(i);
		entry.validate(i)?;
		Ok(entry)
	}).collect()
}

pub fn decode(buf: &[u8]) -> Result<Vec<Sound>> {
	entries(buf)?.iter().enumerate().map(|(i, entry)| {
		let encoding = entry.encoding()?;
		let sample_rate = entry.sample_rate()?;
		let wanted = entry.compressed_size()?;
		let available = buf.get(entry.offset..).ok_or(Error::Truncated {what: "sound data", offset: entry.offset, len: buf.len()})?;
		if available.len() < wanted {
			warn!("sound {i}: {wanted} bytes expected at {:#010x}, only {} left", entry.offset, available.len());
		}
		let data = &available[..wanted.min(available.len())];
		debug!("sound {i}: offset {:#010x}, size {}, {encoding:?}, {sample_rate} Hz, {} samples", entry.offset, entry.uncompressed_size, entry.total_samples());
		let samples = match encoding {
			Encoding::Pcm16 => data.chunks_exact(2).map(|x| i16::from_le_bytes([x[0], x[1]])).collect(),
			Encoding::VoxAdpcm => vox::decode(data)
		};
		Ok(Sound {sample_rate, samples})
	}).collect()
}
