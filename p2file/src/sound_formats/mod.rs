pub mod fat;
pub mod vox;
pub mod wav;

/// Decoded mono 16-bit PCM.
pub struct Sound {
	pub sample_rate: u32,
	pub samples: Box<[i16]>
}

impl Sound {
	pub fn to_wav(&self) -> Vec<u8> {
		wav::encode(self.sample_rate, &self.samples)
	}
}
