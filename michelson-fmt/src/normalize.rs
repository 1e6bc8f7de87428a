/// Replaces the `big_map` type keyword with `map` in a script-language text
/// buffer, so storage snapshots compare equal to the sandbox's own output.
///
/// This is a plain word-boundary text substitution, not an AST transform:
/// it runs on printed S-form before the text is handed to the sandbox
/// client or compared against the sandbox's response.
pub fn replace_big_maps(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if text[i..].starts_with("big_map") {
            let before_ok = i == 0 || !is_word_byte(bytes[i - 1]);
            let after = i + "big_map".len();
            let after_ok = after >= bytes.len() || !is_word_byte(bytes[after]);
            if before_ok && after_ok {
                out.push_str("map");
                i = after;
                continue;
            }
        }
        let ch = text[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_standalone_keyword() {
        assert_eq!(replace_big_maps("big_map nat nat"), "map nat nat");
    }

    #[test]
    fn does_not_replace_inside_longer_identifier() {
        assert_eq!(
            replace_big_maps("my_big_map_helper"),
            "my_big_map_helper"
        );
    }

    #[test]
    fn replaces_multiple_occurrences() {
        assert_eq!(
            replace_big_maps("(Pair (big_map nat nat) big_map)"),
            "(Pair (map nat nat) map)"
        );
    }
}
