// line-oriented text helpers

/// split `text` by lines, similar to `str::split_once`
///
/// the splitting line is the first line containing `marker`; line endings
/// are kept. returns `(text, "", "")` when no line contains the marker.
pub fn partition_lines<'a>(text: &'a str, marker: &str) -> (&'a str, &'a str, &'a str) {
    let mut start = 0;
    for line in text.split_inclusive('\n') {
        let end = start + line.len();
        if line.contains(marker) {
            return (&text[..start], &text[start..end], &text[end..]);
        }
        start = end;
    }
    (text, "", "")
}
