pub const TAB_REPLACEMENT: &str = "    ";

/// Replace tabs with four spaces and strip trailing whitespace from every
/// line. A `\r` among the stripped characters is put back as the line's
/// last byte so CRLF files stay CRLF.
pub fn normalize_whitespace(content: &str) -> String {
    content
        .split('\n')
        .map(normalize_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_line(line: &str) -> String {
    let expanded = line.replace('\t', TAB_REPLACEMENT);
    let body = expanded.trim_end_matches(char::is_whitespace);
    let cr = if expanded[body.len()..].contains('\r') {
        "\r"
    } else {
        ""
    };
    format!("{body}{cr}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn expands_tabs_and_strips_trailing_space() {
        let input = "int main() {  \n\treturn 0;\t\n}\t \n";
        assert_eq!(
            normalize_whitespace(input),
            "int main() {\n    return 0;\n}\n"
        );
    }

    #[test]
    fn keeps_crlf_line_endings() {
        assert_eq!(normalize_whitespace("a \r\nb\t\r\n"), "a\r\nb\r\n");
    }

    #[test]
    fn is_idempotent() {
        let input = "\tx = 1;   \n  \nx \r \n\t\ty\t";
        let once = normalize_whitespace(input);
        assert_eq!(normalize_whitespace(&once), once);
        assert!(once.lines().all(|line| !line.ends_with(' ')));
        assert!(!once.contains('\t'));
    }

    #[test]
    fn stray_carriage_return_before_blanks_settles_in_one_pass() {
        let once = normalize_whitespace("x \r \nint y;\n");
        assert_eq!(once, "x\r\nint y;\n");
        assert_eq!(normalize_whitespace(&once), once);
    }

    #[test]
    fn strips_unicode_trailing_spaces() {
        let out = normalize_whitespace("int x;\u{a0}\nint y;\u{3000}\r\n\u{a0}z");
        assert_eq!(out, "int x;\nint y;\r\n\u{a0}z");
        assert!(out
            .split('\n')
            .all(|line| !line.trim_end_matches('\r').ends_with(char::is_whitespace)));
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize_whitespace(""), "");
    }
}
