//! Markdown escaping.

/// Characters with a meaning in Markdown inline syntax.
const SPECIAL: &[char] = &[
    '\\', '`', '*', '_', '{', '}', '[', ']', '(', ')', '#', '+', '-', '.', '!', '<', '>',
];

/// Lines indented this far are code blocks and are left untouched.
const CODE_INDENT: usize = 4;

/// Backslash-escapes Markdown syntax in `s`.
///
/// Lines starting with four or more spaces render as code blocks, so their
/// contents are kept verbatim.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    let mut leading = 0;
    let mut in_text = false;
    for c in s.chars() {
        if c == ' ' && !in_text {
            leading += 1;
        } else {
            in_text = true;
            if c == '\n' {
                leading = 0;
                in_text = false;
            }
        }
        if leading < CODE_INDENT && SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes `s` and indents every line by `spaces`.
pub fn escape_block(s: &str, spaces: usize) -> String {
    let escaped = escape(s);
    if spaces == 0 {
        return escaped;
    }
    let pad = " ".repeat(spaces);
    format!("{pad}{}", escaped.replace('\n', &format!("\n{pad}")))
}
