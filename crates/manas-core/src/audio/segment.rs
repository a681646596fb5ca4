//! Sentence segmentation for chunked speech synthesis

const TERMINALS: &[char] = &['.', '!', '?'];
const CLOSERS: &[char] = &['"', '\'', ')', ']', '\u{201D}', '\u{2019}', '\u{00BB}'];

/// Titles that end in a period without ending the sentence
const ABBREVIATIONS: &[&str] = &["mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "e.g", "i.e"];

/// Split text into sentence-like chunks.
///
/// A sentence ends at a run of `.`, `!` or `?` (plus any closing quotes or
/// brackets) that is followed by whitespace or the end of the text, or at a
/// newline. Blank chunks are dropped, so the result depends only on the
/// punctuation and line breaks in `text`.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' || c == '\r' {
            flush(&mut current, &mut sentences);
            continue;
        }

        current.push(c);
        if !TERMINALS.contains(&c) {
            continue;
        }

        let single_period = c == '.' && !matches!(chars.peek(), Some(next) if TERMINALS.contains(next));
        while let Some(&next) = chars.peek() {
            if TERMINALS.contains(&next) || CLOSERS.contains(&next) {
                current.push(next);
                chars.next();
            } else {
                break;
            }
        }

        let at_boundary = chars.peek().map_or(true, |next| next.is_whitespace());
        if at_boundary && !(single_period && ends_with_abbreviation(&current)) {
            flush(&mut current, &mut sentences);
        }
    }

    flush(&mut current, &mut sentences);
    sentences
}

fn flush(current: &mut String, sentences: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    current.clear();
}

fn ends_with_abbreviation(chunk: &str) -> bool {
    let word = chunk
        .trim_end_matches(|c: char| TERMINALS.contains(&c) || CLOSERS.contains(&c))
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    ABBREVIATIONS.contains(&word.as_str())
}
