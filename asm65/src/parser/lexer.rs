//! Line splitting and comment stripping

/// One non-empty source line, split on whitespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 1-based line number in the original text
    pub number: usize,
    pub tokens: Vec<&'a str>,
}

/// Parse entire source into token lines, dropping blanks and `;` comments
pub fn parse_source(source: &str) -> Vec<SourceLine<'_>> {
    source
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let code = raw.split(';').next().unwrap_or("").trim();
            if code.is_empty() {
                return None;
            }
            Some(SourceLine {
                number: idx + 1,
                tokens: code.split_whitespace().collect(),
            })
        })
        .collect()
}
