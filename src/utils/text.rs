pub fn truncate_utf8_prefix(value: &str, max_bytes: usize) -> String {
    if max_bytes == 0 {
        return String::new();
    }
    if value.len() <= max_bytes {
        return value.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{non_blank, truncate_utf8_prefix};

    #[test]
    fn truncate_utf8_prefix_handles_ascii() {
        assert_eq!(truncate_utf8_prefix("hello", 3), "hel");
    }

    #[test]
    fn truncate_utf8_prefix_does_not_split_utf8() {
        assert_eq!(truncate_utf8_prefix("a\u{e9}b", 2), "a");
        assert_eq!(truncate_utf8_prefix("a\u{e9}b", 3), "a\u{e9}");
    }

    #[test]
    fn non_blank_treats_whitespace_as_missing() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" tok ")), Some("tok"));
    }
}
