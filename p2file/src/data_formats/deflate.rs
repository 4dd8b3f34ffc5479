use log::debug;
use zune_inflate::DeflateDecoder;
use crate::error::{Error, Result};

// only the four FLG values zlib actually writes, so ordinary data starting with 'x' is left alone
const ZLIB_HEADERS: [[u8; 2]; 4] = [[0x78, 0x01], [0x78, 0x5E], [0x78, 0x9C], [0x78, 0xDA]];

pub fn is_compressed(buf: &[u8]) -> bool {
	buf.len() > 2 && ZLIB_HEADERS.iter().any(|header| buf.starts_with(header))
}

pub fn decompress(buf: &[u8]) -> Result<Box<[u8]>> {
	if !is_compressed(buf) {
		return Err(Error::BadSignature {expected: "zlib header"});
	}
	let out = DeflateDecoder::new(buf).decode_zlib().map_err(|e| Error::Inflate(format!("{e:?}")))?;
	debug!("inflated {} bytes to {}", buf.len(), out.len());
	Ok(out.into_boxed_slice())
}
