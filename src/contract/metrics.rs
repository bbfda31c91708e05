//! Helvetica-Bold glyph metrics and WinAnsi encoding for the built-in engine.

/// Advance widths (1/1000 em) for ASCII 0x20..=0x7E, from the Adobe AFM.
const ASCII_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

pub const ASCENT: f32 = 0.718;
/// PDFKit's Helvetica line height: ascender - descender + line gap.
pub const LINE_HEIGHT: f32 = 1.156;

fn base_letter(ch: char) -> Option<char> {
    let base = match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'A',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'Ñ' => 'N',
        'Ç' => 'C',
        _ => return None,
    };
    Some(base)
}

/// Advance width of one character in 1/1000 em.
pub fn char_width(ch: char) -> u16 {
    if let Some(base) = base_letter(ch) {
        return char_width(base);
    }
    match ch {
        ' '..='~' => ASCII_WIDTHS[ch as usize - 0x20],
        '–' => 556,
        '—' => 1000,
        '¿' => 611,
        '¡' => 333,
        '°' => 400,
        '‘' | '’' => 278,
        '“' | '”' => 500,
        '•' => 350,
        '€' => 556,
        _ => 556,
    }
}

/// Width of `text` in points at `size`.
pub fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(|ch| u32::from(char_width(ch))).sum();
    units as f32 * size / 1000.0
}

/// Encode for a font using `/WinAnsiEncoding`. Characters outside the
/// encoding become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' => ch as u8,
            '\t' | '\n' | '\r' => b' ',
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\u{00A0}'..='\u{00FF}' => ch as u32 as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_widths_line_up() {
        assert_eq!(char_width(' '), 278);
        assert_eq!(char_width('0'), 556);
        assert_eq!(char_width('A'), 722);
        assert_eq!(char_width('W'), 944);
        assert_eq!(char_width('m'), 889);
        assert_eq!(char_width('~'), 584);
    }

    #[test]
    fn test_accented_letters_use_base_width() {
        assert_eq!(char_width('É'), char_width('E'));
        assert_eq!(char_width('ñ'), char_width('n'));
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let at_ten = text_width("SEDAN", 10.0);
        let at_twenty = text_width("SEDAN", 20.0);
        assert!((at_twenty - 2.0 * at_ten).abs() < 0.001);
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("MÉXICO"), vec![b'M', 0xC9, b'X', b'I', b'C', b'O']);
        assert_eq!(encode_win_ansi("–"), vec![0x96]);
        assert_eq!(encode_win_ansi("中"), vec![b'?']);
    }
}
