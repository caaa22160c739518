/// Encodes text for the standard fonts' WinAnsiEncoding. Characters with no
/// WinAnsi code point become `?`.
pub fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c {
            '\u{2026}' => 0x85,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{20AC}' => 0x80,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_and_latin1_pass_through() {
        assert_eq!(to_win_ansi("Abc 123"), b"Abc 123".to_vec());
        assert_eq!(to_win_ansi("caf\u{e9}"), vec![b'c', b'a', b'f', 0xE9]);
    }

    #[test]
    fn typographic_punctuation_is_mapped() {
        assert_eq!(to_win_ansi("a\u{2014}b\u{2026}"), vec![b'a', 0x97, b'b', 0x85]);
    }

    #[test]
    fn unmapped_characters_become_question_marks() {
        assert_eq!(to_win_ansi("\u{4e2d}"), b"?".to_vec());
    }
}
