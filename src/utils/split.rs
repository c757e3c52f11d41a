/// Whitespace tokenizer for inline requests.
///
/// Double quotes group a segment, including its whitespace, into a single argument and are not
/// part of the argument themselves. Inside quotes a backslash takes the following byte literally,
/// so `"a \" b"` yields `a " b`. An empty pair of quotes yields an empty argument.
///
/// Returns `None` when a quote is left open.
pub fn split_quoted(line: &[u8]) -> Option<Vec<Vec<u8>>> {
    let mut args = Vec::new();
    let mut current: Option<Vec<u8>> = None;
    let mut quoted = false;
    let mut bytes = line.iter().copied();

    while let Some(byte) = bytes.next() {
        match byte {
            b'"' => {
                if quoted {
                    // A closing quote ends the argument even when it is empty.
                    args.push(current.take().unwrap_or_default());
                } else if let Some(arg) = current.take() {
                    args.push(arg);
                }
                quoted = !quoted;
            }
            b'\\' if quoted => {
                let escaped = bytes.next()?;
                current.get_or_insert_with(Vec::new).push(escaped);
            }
            byte if byte.is_ascii_whitespace() && !quoted => {
                if let Some(arg) = current.take() {
                    args.push(arg);
                }
            }
            byte => current.get_or_insert_with(Vec::new).push(byte),
        }
    }

    if quoted {
        return None;
    }

    if let Some(arg) = current {
        args.push(arg);
    }

    Some(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(line: &str) -> Option<Vec<String>> {
        split_quoted(line.as_bytes()).map(|args| {
            args.into_iter()
                .map(|arg| String::from_utf8(arg).unwrap())
                .collect()
        })
    }

    #[test]
    fn plain_words() {
        assert_eq!(
            split("set  key\tvalue "),
            Some(vec!["set".to_string(), "key".to_string(), "value".to_string()])
        );
    }

    #[test]
    fn quoted_segment_keeps_spaces() {
        assert_eq!(
            split(r#"set key "hello world""#),
            Some(vec![
                "set".to_string(),
                "key".to_string(),
                "hello world".to_string()
            ])
        );
    }

    #[test]
    fn quote_splits_adjacent_text() {
        assert_eq!(
            split(r#"a"b c"d"#),
            Some(vec!["a".to_string(), "b c".to_string(), "d".to_string()])
        );
    }

    #[test]
    fn escaped_quote() {
        assert_eq!(
            split(r#"set k "say \"hi\"""#),
            Some(vec![
                "set".to_string(),
                "k".to_string(),
                r#"say "hi""#.to_string()
            ])
        );
    }

    #[test]
    fn backslash_outside_quotes_is_literal() {
        assert_eq!(split(r"a\b"), Some(vec![r"a\b".to_string()]));
    }

    #[test]
    fn empty_quotes() {
        assert_eq!(
            split(r#"set k """#),
            Some(vec!["set".to_string(), "k".to_string(), String::new()])
        );
    }

    #[test]
    fn unbalanced_quotes() {
        assert_eq!(split(r#"set k "value"#), None);
        assert_eq!(split(r#"set k "value\"#), None);
    }

    #[test]
    fn empty_line() {
        assert_eq!(split("   "), Some(vec![]));
    }
}
