use crate::block::InlineSpan;

/// A candidate inline construct found in the unconsumed part of a line.
/// `start` and `end` are byte offsets into that remainder.
#[derive(Debug)]
struct Match {
    start: usize,
    end: usize,
    span: InlineSpan,
}

type Matcher = fn(&str) -> Option<Match>;

// Order matters: on equal start offsets the earlier matcher wins.
const MATCHERS: [Matcher; 3] = [match_bold, match_code, match_image];

/// Split one line of text into inline spans.
///
/// Repeatedly takes the earliest bold, code or image construct in the
/// remaining text, emitting any text before it as a plain span. Captured
/// bold and code content is literal and never scanned again.
pub fn inline_format(line: &str) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    let mut remaining = line;

    while !remaining.is_empty() {
        let Some(found) = earliest_match(remaining) else {
            spans.push(InlineSpan::Text(remaining.to_string()));
            break;
        };

        if found.start > 0 {
            spans.push(InlineSpan::Text(remaining[..found.start].to_string()));
        }
        spans.push(found.span);
        remaining = &remaining[found.end..];
    }

    spans
}

fn earliest_match(text: &str) -> Option<Match> {
    let mut best: Option<Match> = None;
    for matcher in MATCHERS {
        if let Some(candidate) = matcher(text) {
            if best.as_ref().is_none_or(|b| candidate.start < b.start) {
                best = Some(candidate);
            }
        }
    }
    best
}

fn match_bold(text: &str) -> Option<Match> {
    let (start, content, end) = match_delimited(text, "**")?;
    Some(Match {
        start,
        end,
        span: InlineSpan::Bold(content.to_string()),
    })
}

fn match_code(text: &str) -> Option<Match> {
    let (start, content, end) = match_delimited(text, "`")?;
    Some(Match {
        start,
        end,
        span: InlineSpan::Code(content.to_string()),
    })
}

/// First `![alt](src)` anywhere in `text`, as (alt, src).
pub(crate) fn find_image(text: &str) -> Option<(String, String)> {
    match match_image(text)?.span {
        InlineSpan::InlineImage { alt, src } => Some((alt, src)),
        _ => None,
    }
}

/// `![alt](src)`: alt may be empty and runs to the first `]`, src must be
/// non-empty and runs to the first `)`.
fn match_image(text: &str) -> Option<Match> {
    let mut from = 0;
    while let Some(offset) = text[from..].find("![") {
        let start = from + offset;
        let alt_start = start + 2;

        if let Some(alt_len) = text[alt_start..].find(']') {
            let alt_end = alt_start + alt_len;
            if text[alt_end..].starts_with("](") {
                let src_start = alt_end + 2;
                if let Some(src_len) = text[src_start..].find(')') {
                    if src_len > 0 {
                        let src_end = src_start + src_len;
                        return Some(Match {
                            start,
                            end: src_end + 1,
                            span: InlineSpan::InlineImage {
                                alt: text[alt_start..alt_end].to_string(),
                                src: text[src_start..src_end].to_string(),
                            },
                        });
                    }
                }
            }
        }

        from = start + 1;
    }
    None
}

/// Leftmost `delim content delim` with the shortest non-empty content that
/// does not cross a line terminator. Returns (start, content, end).
fn match_delimited<'a>(text: &'a str, delim: &str) -> Option<(usize, &'a str, usize)> {
    let mut from = 0;
    while let Some(offset) = text[from..].find(delim) {
        let start = from + offset;
        let content_start = start + delim.len();

        if let Some(len) = lazy_close(&text[content_start..], delim) {
            let content_end = content_start + len;
            return Some((
                start,
                &text[content_start..content_end],
                content_end + delim.len(),
            ));
        }

        // delimiters are ASCII, so one byte on is still a char boundary
        from = start + 1;
    }
    None
}

fn lazy_close(rest: &str, delim: &str) -> Option<usize> {
    for (idx, c) in rest.char_indices() {
        if idx > 0 && rest[idx..].starts_with(delim) {
            return Some(idx);
        }
        if is_line_terminator(c) {
            return None;
        }
    }
    None
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}
