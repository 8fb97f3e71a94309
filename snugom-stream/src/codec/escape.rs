//! RediSearch literal escaping.
//!
//! | Mode                    | Value          | TEXT literal        | TAG literal       |
//! |-------------------------|----------------|---------------------|-------------------|
//! | `Exact`                 | `"Ada Byron"`  | `"Ada Byron"` quoted| `Ada Byron`       |
//! | `Prefix`                | `"rust-lang/c"`| `rust lang c*`      | `rust\-lang/c*`   |
//! | `Suffix`                | `"gate way"`   | `*gate way`         | `*gate way`       |
//! | `Contains`              | `"data base"`  | `*data* *base*`     | `*data base*`     |
//! | `Fuzzy` (TEXT only)     | `"jon smth"`   | `%jon% %smth%`      |                   |
//!
//! TEXT values are split where the indexer splits them (whitespace, `-`, `/`)
//! and every token is escaped on its own. A multi-token pattern is a
//! conjunction of per-token patterns, so the renderer groups it in
//! parentheses. TAG values are matched whole and only need the tag
//! delimiters escaped.

/// Characters with a meaning in TEXT query syntax.
const TEXT_SPECIAL: &[char] = &[
    '\\', '(', ')', '|', '\'', '"', '[', ']', '{', '}', ':', '@', '?', '~', '&', '!', '.', '*', '%', ',', '<', '>',
    ';', '$', '=', '^', '+', '#',
];

/// Characters with a meaning inside `@field:{...}`.
const TAG_SPECIAL: &[char] = &['$', '{', '}', '\\', '|', '.', '-', '*'];

/// Characters a field alias may contain that the query parser would read as syntax.
const ALIAS_SPECIAL: &[char] = &['.', '$'];

fn escape_with(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if special.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Escape a value for a TAG query (`@field:{value}`).
///
/// ```
/// use snugom_stream::codec::escape_tag;
///
/// assert_eq!(escape_tag("on sale"), "on sale");
/// assert_eq!(escape_tag("x-large"), "x\\-large");
/// assert_eq!(escape_tag("v1.2|beta"), "v1\\.2\\|beta");
/// ```
pub fn escape_tag(value: &str) -> String {
    escape_with(value, TAG_SPECIAL)
}

/// `@alias` reference with `.` and `$` escaped.
///
/// ```
/// use snugom_stream::codec::field_ref;
///
/// assert_eq!(field_ref("age"), "@age");
/// assert_eq!(field_ref("address.city"), "@address\\.city");
/// ```
pub fn field_ref(alias: &str) -> String {
    format!("@{}", escape_with(alias, ALIAS_SPECIAL))
}

/// Escaped TEXT tokens of `value`.
fn text_tokens(value: &str) -> Vec<String> {
    value
        .split(|ch: char| ch.is_whitespace() || ch == '-' || ch == '/')
        .filter(|token| !token.is_empty())
        .map(|token| escape_with(token, TEXT_SPECIAL))
        .collect()
}

/// Join the tokens of `value`, letting `mark` decorate each one by position.
/// A value without tokens becomes the bare wildcard.
fn mark_tokens(value: &str, mark: impl Fn(usize, usize, String) -> String) -> String {
    let tokens = text_tokens(value);
    if tokens.is_empty() {
        return "*".to_string();
    }
    let last = tokens.len() - 1;
    tokens
        .into_iter()
        .enumerate()
        .map(|(index, token)| mark(index, last, token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Leading tokens match whole, the last one as a prefix.
///
/// ```
/// use snugom_stream::codec::text_prefix;
///
/// assert_eq!(text_prefix("rust"), "rust*");
/// assert_eq!(text_prefix("rust-lang/c"), "rust lang c*");
/// assert_eq!(text_prefix("key:val"), "key\\:val*");
/// ```
pub fn text_prefix(value: &str) -> String {
    mark_tokens(value, |index, last, token| {
        if index == last { format!("{}*", token) } else { token }
    })
}

/// The first token matches as a suffix, the rest whole.
pub fn text_suffix(value: &str) -> String {
    mark_tokens(value, |index, _, token| if index == 0 { format!("*{}", token) } else { token })
}

/// Every token matches as an infix.
pub fn text_contains(value: &str) -> String {
    mark_tokens(value, |_, _, token| format!("*{}*", token))
}

/// Every token matches within Levenshtein distance 1.
///
/// ```
/// use snugom_stream::codec::text_fuzzy;
///
/// assert_eq!(text_fuzzy("jon smth"), "%jon% %smth%");
/// ```
pub fn text_fuzzy(value: &str) -> String {
    mark_tokens(value, |_, _, token| format!("%{}%", token))
}

/// Quoted phrase; only quotes and backslashes need escaping inside it.
///
/// ```
/// use snugom_stream::codec::text_exact;
///
/// assert_eq!(text_exact("Ada Byron"), "\"Ada Byron\"");
/// assert_eq!(text_exact("a \"b\""), "\"a \\\"b\\\"\"");
/// ```
pub fn text_exact(value: &str) -> String {
    format!("\"{}\"", escape_with(value, &['\\', '"']))
}

/// Integral values print without a fractional part.
pub fn format_numeric(value: f64) -> String {
    if value.is_infinite() {
        return if value.is_sign_positive() { "+inf" } else { "-inf" }.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}
