use super::codepoint;

/// NUL separated strings; bytes after the last NUL are not a string.
pub fn decode(buf: &[u8]) -> Vec<String> {
	buf.split_inclusive(|&b| b == 0)
		.filter_map(|s| s.strip_suffix(&[0]))
		.map(|s| {
			let mut line = String::new();
			for &b in s {
				match b {
					b'\n' | b'\r' | b'\t' => line.push(b as char),
					_ => codepoint::push_code(&mut line, b as u32)
				}
			}
			line
		})
		.collect()
}
