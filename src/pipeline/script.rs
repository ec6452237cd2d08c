/// Split a narration script into scene segments.
///
/// Any character in `delimiters` ends a segment. Segments are trimmed and
/// empty ones dropped, so trailing punctuation does not produce a blank scene.
pub fn split_narration(text: &str, delimiters: &str) -> Vec<String> {
    text.split(|c: char| delimiters.contains(c))
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Break `text` into lines of at most `max_chars` characters
pub fn wrap_subtitle(text: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.trim().chars().collect();
    chars
        .chunks(max_chars.max(1))
        .map(|line| line.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
