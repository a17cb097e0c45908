/// Replaces `$NAME` and `${NAME}` with the value of that environment
/// variable, or with nothing when it is unset. A `$` that does not start a
/// name is kept as it is.
pub fn expand_env(line: &str) -> String {
    expand_with(line, |name| {
        if name.contains(['=', '\0']) {
            return None;
        }
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    })
}

enum Name<'a> {
    Found(&'a str, usize),
    Malformed(usize),
    Missing,
}

fn expand_with<F>(line: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];

        rest = match variable_name(after) {
            Name::Found(name, width) => {
                out.push_str(&lookup(name).unwrap_or_default());
                &after[width..]
            }
            // `${}` and an unterminated `${` vanish
            Name::Malformed(width) => &after[width..],
            Name::Missing => {
                out.push('$');
                after
            }
        };
    }

    out.push_str(rest);
    out
}

fn variable_name(s: &str) -> Name<'_> {
    let bytes = s.as_bytes();

    match bytes.first() {
        None => Name::Missing,
        Some(b'{') => {
            if bytes.len() > 2 && is_special(bytes[1]) && bytes[2] == b'}' {
                return Name::Found(&s[1..2], 3);
            }
            match s[1..].find('}') {
                Some(0) => Name::Malformed(2),
                Some(end) => Name::Found(&s[1..end + 1], end + 2),
                None => Name::Malformed(1),
            }
        }
        Some(&b) if is_special(b) => Name::Found(&s[..1], 1),
        Some(_) => {
            let len = bytes
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                .count();
            match len {
                0 => Name::Missing,
                len => Name::Found(&s[..len], len),
            }
        }
    }
}

fn is_special(b: u8) -> bool {
    matches!(b, b'*' | b'#' | b'$' | b'@' | b'!' | b'?' | b'-') || b.is_ascii_digit()
}
