use std::collections::HashMap;
use std::fmt;
use std::num::IntErrorKind;

/// Inclusive, 1-based page interval. After parsing, `1 <= start <= end <= page_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

/// Ranges chosen per document name, in the order the user typed them.
pub type SelectionMap = HashMap<String, Vec<PageRange>>;

impl PageRange {
    pub fn new(start: u32, end: u32) -> Self {
        PageRange { start, end }
    }

    pub fn single(page: u32) -> Self {
        PageRange::new(page, page)
    }

    /// 0-based page indexes covered by this range
    pub fn indexes(&self) -> std::ops::Range<u32> {
        self.start.saturating_sub(1)..self.end
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRanges {
    pub ranges: Vec<PageRange>,
    /// Tokens that were not a page number or an `a:b` range, verbatim
    pub errors: Vec<String>,
}

/// Parse a comma-separated list of pages and ranges like "1, 2, 20, 45:57".
///
/// Malformed tokens end up in `errors`. Tokens that are well formed but fall
/// outside the document are dropped without being reported; ranges reaching
/// past either end are truncated.
pub fn parse_ranges(text: &str, page_count: u32) -> ParsedRanges {
    let mut parsed = ParsedRanges::default();

    for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let Some((start, end)) = parse_token(token) else {
            parsed.errors.push(token.to_string());
            continue;
        };

        let (start, end) = if start > end { (end, start) } else { (start, end) };

        let start = start.max(1);
        let end = end.min(i64::from(page_count));
        if start > i64::from(page_count) || end < start {
            continue;
        }

        // Both bounds now sit inside 1..=page_count.
        parsed.ranges.push(PageRange::new(start as u32, end as u32));
    }

    parsed
}

fn parse_token(token: &str) -> Option<(i64, i64)> {
    if token.contains(':') {
        let parts: Vec<&str> = token.split(':').collect();
        if parts.len() != 2 {
            return None;
        }
        let start = parse_page_number(parts[0])?;
        let end = parse_page_number(parts[1])?;
        Some((start, end))
    } else if let Some(page) = parse_page_number(token) {
        Some((page, page))
    } else {
        // "a-b" is how labels render a range; accept it back for unsigned bounds.
        let (start, end) = token.split_once('-')?;
        Some((parse_unsigned(start)?, parse_unsigned(end)?))
    }
}

/// Integers past the i64 range saturate; clamping brings them back in bounds.
fn parse_page_number(s: &str) -> Option<i64> {
    match s.trim().parse::<i64>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

fn parse_unsigned(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    parse_page_number(s)
}

/// Render ranges as a short label, e.g. `[(1,1),(2,5)]` -> "1, 2-5"
pub fn format_ranges(ranges: &[PageRange]) -> String {
    ranges
        .iter()
        .map(PageRange::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Range text covering a whole document: "1" or "1:<n>"
pub fn default_range_text(page_count: u32) -> String {
    if page_count == 1 {
        "1".to_string()
    } else {
        format!("1:{}", page_count)
    }
}
