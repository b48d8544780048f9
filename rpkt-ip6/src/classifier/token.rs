/// A word of a filter pattern together with its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub index: usize,
    pub text: &'a str,
}

/// Split a filter pattern into words.
///
/// Every single space separates two words, so consecutive spaces produce
/// empty words which the parser rejects.
pub fn tokenize(pattern: &str) -> Vec<Token<'_>> {
    pattern
        .split(' ')
        .enumerate()
        .map(|(index, text)| Token { index, text })
        .collect()
}
