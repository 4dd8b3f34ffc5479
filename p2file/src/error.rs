use std::fmt::{Debug, Display};
use thiserror::Error;

/// A four character chunk tag, displayed the way it appears in the file.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
	pub const FORM: Tag = Tag(*b"FORM");
}

impl Display for Tag {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for b in self.0 {
			if b.is_ascii_graphic() || b == b' ' {
				write!(f, "{}", b as char)?;
			} else {
				write!(f, "\\x{b:02x}")?;
			}
		}
		Ok(())
	}
}

impl Debug for Tag {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "'{self}'")
	}
}

/// Every variant is a format violation: the input for the current file is unusable.
/// Recoverable anomalies are logged and corrected where they happen instead.
#[derive(Debug, Error)]
pub enum Error {
	#[error("bad signature, expected {expected}")]
	BadSignature {expected: &'static str},

	#[error("zero length chunk {tag} at {offset:#x}, there's probably something wrong with parsing")]
	ZeroLengthChunk {tag: Tag, offset: usize},

	#[error("could not read {what} at {offset:#x}, buffer is only {len:#x} bytes")]
	Truncated {what: &'static str, offset: usize, len: usize},

	#[error("back-reference distance {distance} reaches before the start of the output ({produced} bytes so far)")]
	BadBackReference {distance: usize, produced: usize},

	#[error("could not insert node {id} into huffman tree")]
	TreeSlotUnavailable {id: u32},

	#[error("huffman walk stepped onto unused node {0}")]
	UnusedTreeNode(u32),

	#[error("container nesting deeper than {0} levels")]
	TooDeep(usize),

	#[error("inflate failed: {0}")]
	Inflate(String),

	#[error("{0}")]
	Invalid(String)
}

pub type Result<T> = std::result::Result<T, Error>;
