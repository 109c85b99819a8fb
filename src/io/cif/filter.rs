/// Drop disordered or partially occupied site lines before parsing.
///
/// CSD exports mark such sites by suffixing the atom label with `*` or `?`;
/// removing the whole line is the established text-level cleanup for them.
/// Lines without a first token pass through untouched.
pub fn filter_disorder(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| match line.split_whitespace().next() {
            Some(first) => !first.ends_with('*') && !first.ends_with('?'),
            None => true,
        })
        .cloned()
        .collect()
}
