//! Display formatting for table cells.

use crate::metrics::ELLIPSIS;
use regex::Regex;
use std::sync::LazyLock;

static ABSOLUTE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://").expect("BUG: invalid ABSOLUTE_URL regex literal")
});

const LINK_LABEL_MAX: usize = 42;

pub fn is_absolute_url(value: &str) -> bool {
    ABSOLUTE_URL.is_match(value)
}

/// `1234567` -> `"1,234,567"`.
pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// Human label for a post link: host without `www.` plus the path, with
/// repeated slashes collapsed and the trailing slash dropped, shortened in
/// the middle to 42 characters.
pub fn short_link_label(raw: &str) -> String {
    let stripped = ABSOLUTE_URL.replace(raw, "");
    let rest = stripped.strip_prefix("www.").unwrap_or(&stripped);

    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    let rest = &rest[..end];
    let (host, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };

    let mut label = host.to_string();
    let mut previous_slash = false;
    for ch in path.chars() {
        if ch == '/' && previous_slash {
            continue;
        }
        previous_slash = ch == '/';
        label.push(ch);
    }
    if label.len() > host.len() && label.ends_with('/') {
        label.pop();
    }

    ellipsize_middle(&label, LINK_LABEL_MAX)
}

fn ellipsize_middle(text: &str, max: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max {
        return text.to_string();
    }
    let keep = max - 1;
    let left = keep.div_ceil(2);
    let right = keep / 2;
    let mut out: String = chars[..left].iter().collect();
    out.push(ELLIPSIS);
    out.extend(&chars[chars.len() - right..]);
    out
}
