/// How a chunk that no decoder claimed stores its text, keyed on the chunk's output name.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TextEncoding {
	None,
	StringList,
	Huffman,
	Indexed
}

use TextEncoding::*;

type Rules = &'static [(TextEncoding, &'static [&'static str])];

const BOOTH: Rules = &[
	(StringList, &["BOOT-STD_-TXT1", "BOOT-LOG2-TXT1"]),
	(Huffman, &["BOOT-NEWS-TXT2", "BOOT-BBS_-TXT2", "BOOT-RECD-DAT1", "BOOT-RECD-DAT2", "BOOT-RECD-DAT3", "BOOT-RECD-DAT4"]),
	(Indexed, &["BOOT-STD_-TEXT"])
];

const MISSION: Rules = &[
	(Huffman, &["BOOT-TEXT"]),
	(Indexed, &["BOOT-DATA"])
];

const INSTALL: Rules = &[
	(Indexed, &["BOOT-LNG1"])
];

const GAMEFLOW: Rules = &[
	(Huffman, &["INIT-TXT2"]),
	(Indexed, &["INIT-TEXT", "INIT-TXT3"])
];

fn rules_for(name: &str) -> Rules {
	if name.starts_with("BOOTH.IFF") {
		BOOTH
	} else if name.starts_with("MISSION") && name.find(".IFF") == Some(8) {
		// MISSION0.IFF .. MISSION9.IFF, MISSIONM.IFF, MISSIONR.IFF
		MISSION
	} else if name.starts_with("INSTALL.IFF") {
		INSTALL
	} else if name.starts_with("GAMEFLOW.IFF") {
		GAMEFLOW
	} else {
		&[]
	}
}

pub fn text_encoding(name: &str) -> TextEncoding {
	rules_for(name).iter()
		.find(|(_, paths)| paths.iter().any(|path| name.contains(path)))
		.map_or(None, |(encoding, _)| *encoding)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn known_chunks() {
		assert_eq!(text_encoding("BOOTH.IFF-chunk-0x0018d544-BOOT-STD_-TXT1"), StringList);
		assert_eq!(text_encoding("BOOTH.IFF-chunk-0x0078adb6-BOOT-NEWS-TXT2"), Huffman);
		assert_eq!(text_encoding("BOOTH.IFF-chunk-0x0018b8f2-BOOT-STD_-TEXT"), Indexed);
		assert_eq!(text_encoding("MISSIONM.IFF-chunk-0x00000014-BOOT-TEXT"), Huffman);
		assert_eq!(text_encoding("MISSION3.IFF-chunk-0x00003022-BOOT-DATA"), Indexed);
		assert_eq!(text_encoding("INSTALL.IFF-chunk-0x000d7214-BOOT-LNG1"), Indexed);
		assert_eq!(text_encoding("GAMEFLOW.IFF-chunk-0x00022876-INIT-TXT2"), Huffman);
		assert_eq!(text_encoding("GAMEFLOW.IFF-chunk-0x00023be6-INIT-TXT3"), Indexed);
	}

	#[test]
	fn everything_else_is_none() {
		assert_eq!(text_encoding("MISSION10.IFF-chunk-0x00000014-BOOT-TEXT"), None);
		assert_eq!(text_encoding("SPACETEX.IFF-chunk-0x00000014-BOOT-TEXT"), None);
		assert_eq!(text_encoding("GAMEFLOW.IFF-chunk-0x00000014-BOOT-TEXT"), None);
		assert_eq!(text_encoding("X.BIG-BOOTH.IFF-chunk-0x00000014-BOOT-STD_-TXT1"), None);
	}
}
