use phf::phf_map;

// DOS code page 437, the game's extended characters (localised builds use the accented ones)
static EXTENDED: phf::Map<u8, &'static str> = phf_map! {
	0x80u8 => "Ç", 0x81u8 => "ü", 0x82u8 => "é", 0x83u8 => "â", 0x84u8 => "ä", 0x85u8 => "à", 0x86u8 => "å", 0x87u8 => "ç",
	0x88u8 => "ê", 0x89u8 => "ë", 0x8Au8 => "è", 0x8Bu8 => "ï", 0x8Cu8 => "î", 0x8Du8 => "ì", 0x8Eu8 => "Ä", 0x8Fu8 => "Å",
	0x90u8 => "É", 0x91u8 => "æ", 0x92u8 => "Æ", 0x93u8 => "ô", 0x94u8 => "ö", 0x95u8 => "ò", 0x96u8 => "û", 0x97u8 => "ù",
	0x98u8 => "ÿ", 0x99u8 => "Ö", 0x9Au8 => "Ü", 0x9Bu8 => "¢", 0x9Cu8 => "£", 0x9Du8 => "¥", 0x9Eu8 => "₧", 0x9Fu8 => "ƒ",
	0xA0u8 => "á", 0xA1u8 => "í", 0xA2u8 => "ó", 0xA3u8 => "ú", 0xA4u8 => "ñ", 0xA5u8 => "Ñ", 0xA6u8 => "ª", 0xA7u8 => "º",
	0xA8u8 => "¿", 0xADu8 => "¡", 0xE1u8 => "ß"
};

pub fn get_utf8(code: u32) -> Option<&'static str> {
	u8::try_from(code).ok().and_then(|code| EXTENDED.get(&code).copied())
}

/// Printable ASCII as is, extended codes through the table, anything else as a hex escape.
pub fn push_code(out: &mut String, code: u32) {
	match code {
		32..=126 => out.push(code as u8 as char),
		_ => match get_utf8(code) {
			Some(s) => out.push_str(s),
			None => out.push_str(&format!("<0x{code:x}>"))
		}
	}
}
