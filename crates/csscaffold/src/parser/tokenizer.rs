//! Splitting of compound property values.

/// Split `value` at every `delimiter` that is not nested inside parentheses.
///
/// Parenthesized content is kept intact, so `color-stop(0.5,#fff)` stays a
/// single argument. Unbalanced closing parentheses never push the depth below
/// zero. Arguments are returned untrimmed.
///
/// ```
/// use csscaffold::parser::split_top_level;
///
/// assert_eq!(split_top_level("a,b(c,d),e", ','), vec!["a", "b(c,d)", "e"]);
/// ```
pub fn split_top_level(value: &str, delimiter: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == delimiter && depth == 0 => {
                parts.push(&value[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);

    parts
}

/// Split a comma-separated argument list, trimming each argument.
pub fn split_arguments(value: &str) -> Vec<&str> {
    split_top_level(value, ',').into_iter().map(str::trim).collect()
}

/// Return the inside of `name(...)`, allowing whitespace before the `(`.
///
/// Surplus closing parentheses at the end are dropped along with the one
/// that closes the call. Returns `None` when `token` is not a call to `name`.
pub fn unwrap_function<'a>(token: &'a str, name: &str) -> Option<&'a str> {
    let rest = token.trim().strip_prefix(name)?;
    let rest = rest.trim_start().strip_prefix('(')?;
    if !rest.ends_with(')') {
        return None;
    }
    Some(rest.trim_end_matches(')').trim())
}
