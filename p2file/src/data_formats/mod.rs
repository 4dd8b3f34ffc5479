use log::debug;
use crate::error::Result;

pub mod fb10;
pub mod deflate;

/// Which codec a chunk payload was stored with.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Codec {
	Stored,
	Fb10,
	Deflate
}

impl Codec {
	pub fn detect(buf: &[u8]) -> Self {
		if fb10::is_compressed(buf) {
			Self::Fb10
		} else if deflate::is_compressed(buf) {
			Self::Deflate
		} else {
			Self::Stored
		}
	}
}

/// Returns a freshly owned copy of the payload, decompressed if a codec signature matches.
pub fn decode_payload(buf: &[u8]) -> Result<(Codec, Box<[u8]>)> {
	let codec = Codec::detect(buf);
	let data = match codec {
		Codec::Fb10 => fb10::decompress(buf)?,
		Codec::Deflate => deflate::decompress(buf)?,
		Codec::Stored => buf.into()
	};
	if codec != Codec::Stored {
		debug!("{codec:?} payload: {} -> {} bytes", buf.len(), data.len());
	}
	Ok((codec, data))
}
