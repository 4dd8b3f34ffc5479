// Dialogic/OKI 4-bit ADPCM, 12-bit decoder output widened to 16 bits

const STEPS: [i32; 49] = [
	16, 17, 19, 21, 23, 25, 28, 31, 34, 37, 41, 45, 50, 55, 60, 66, 73, 80, 88, 97,
	107, 118, 130, 143, 157, 173, 190, 209, 230, 253, 279, 307, 337, 371, 408, 449,
	494, 544, 598, 658, 724, 796, 876, 963, 1060, 1166, 1282, 1411, 1552
];

const STEP_CHANGES: [i32; 8] = [-1, -1, -1, -1, 2, 4, 6, 8];

const MIN_SAMPLE: i32 = -2048;
const MAX_SAMPLE: i32 = 2047;

#[derive(Default)]
pub struct VoxDecoder {
	last_output: i32,
	step_index: usize
}

impl VoxDecoder {
	pub fn decode_nibble(&mut self, code: u8) -> i16 {
		let step = STEPS[self.step_index];
		let mut s = ((code as i32 & 7) * 2 + 1) * step >> 3;
		if code & 8 != 0 {
			s = -s;
		}
		s = (s + self.last_output).clamp(MIN_SAMPLE, MAX_SAMPLE);
		self.step_index = (self.step_index as i32 + STEP_CHANGES[code as usize & 7]).clamp(0, STEPS.len() as i32 - 1) as usize;
		self.last_output = s;
		(s << 4) as i16
	}
}

/// Two samples per byte, high nibble first.
pub fn decode(buf: &[u8]) -> Box<[i16]> {
	let mut decoder = VoxDecoder::default();
	buf.iter().flat_map(|&b| [b >> 4, b & 0xF]).map(|code| decoder.decode_nibble(code)).collect()
}
