//! Locating JSON inside free-form model output.
//!
//! Models wrap JSON in prose or code fences. These helpers return the first
//! syntactically balanced `[...]` or `{...}` substring, skipping brackets that
//! appear inside string literals.

/// First balanced JSON array in `text`, if any.
pub fn find_json_array(text: &str) -> Option<&str> {
    find_balanced(text, '[', ']')
}

/// First balanced JSON object in `text`, if any.
pub fn find_json_object(text: &str) -> Option<&str> {
    find_balanced(text, '{', '}')
}

/// Single pass from the first opener. Every opener seen outside a string is
/// a candidate start; the earliest one whose run closes wins.
fn find_balanced(text: &str, open: char, close: char) -> Option<&str> {
    let first = text.find(open)?;
    let mut openers: Vec<usize> = Vec::new();
    let mut best: Option<(usize, usize)> = None;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[first..].char_indices() {
        let i = first + offset;
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            c if c == open => openers.push(i),
            c if c == close => {
                let Some(start) = openers.pop() else {
                    continue;
                };
                let end = i + c.len_utf8();
                if openers.is_empty() {
                    return Some(&text[start..end]);
                }
                if best.is_none_or(|(s, _)| start < s) {
                    best = Some((start, end));
                }
            }
            _ => {}
        }
    }

    best.map(|(start, end)| &text[start..end])
}
