//! Redis-style glob matching for key enumeration.
//!
//! Supported syntax: `*`, `?`, `[abc]`, `[^abc]`, `[a-z]` and `\` escapes.
//! Matching is byte-wise, as in Redis.

pub(crate) fn glob_match(pattern: &str, key: &str) -> bool {
    matches(pattern.as_bytes(), key.as_bytes())
}

fn matches(mut p: &[u8], mut s: &[u8]) -> bool {
    while let Some(&c) = p.first() {
        match c {
            b'*' => {
                while p.first() == Some(&b'*') {
                    p = &p[1..];
                }
                if p.is_empty() {
                    return true;
                }
                return (0..=s.len()).any(|i| matches(p, &s[i..]));
            }
            b'?' => {
                if s.is_empty() {
                    return false;
                }
                p = &p[1..];
                s = &s[1..];
            }
            b'[' => {
                let Some((&ch, rest)) = s.split_first() else {
                    return false;
                };
                let (matched, after) = match_class(&p[1..], ch);
                if !matched {
                    return false;
                }
                p = after;
                s = rest;
            }
            b'\\' if p.len() >= 2 => {
                if s.first() != Some(&p[1]) {
                    return false;
                }
                p = &p[2..];
                s = &s[1..];
            }
            _ => {
                if s.first() != Some(&c) {
                    return false;
                }
                p = &p[1..];
                s = &s[1..];
            }
        }
    }
    s.is_empty()
}

/// Match one byte against a `[...]` class. `p` starts after the `[`.
/// Returns the outcome and the pattern remaining after the closing `]`.
fn match_class(mut p: &[u8], ch: u8) -> (bool, &[u8]) {
    let negate = p.first() == Some(&b'^');
    if negate {
        p = &p[1..];
    }

    let mut matched = false;
    loop {
        match p {
            // unterminated class: the pattern end closes it
            [] => break,
            [b']', rest @ ..] => {
                p = rest;
                break;
            }
            [b'\\', esc, rest @ ..] => {
                matched |= *esc == ch;
                p = rest;
            }
            [lo, b'-', hi, rest @ ..] if *hi != b']' => {
                let (lo, hi) = if lo <= hi { (*lo, *hi) } else { (*hi, *lo) };
                matched |= (lo..=hi).contains(&ch);
                p = rest;
            }
            [other, rest @ ..] => {
                matched |= *other == ch;
                p = rest;
            }
        }
    }

    (matched != negate, p)
}
