use packrat::{Position, Token, TokenKind};

/// Build tokens from whitespace separated words, ending with `ENDMARKER`.
///
/// `NL`, `INDENT` and `DEDENT` stand for layout tokens. Words starting with
/// a digit are numbers, quoted words are strings, identifier-like words are
/// names and everything else is an operator. Columns count words, not
/// characters.
pub fn tokens(src: &str) -> Vec<Token> {
    let mut line = 1;
    let mut column = 1;
    let mut toks = Vec::new();
    for word in src.split_whitespace() {
        let (kind, text) = match word {
            "NL" => (TokenKind::Newline, ""),
            "INDENT" => (TokenKind::Indent, ""),
            "DEDENT" => (TokenKind::Dedent, ""),
            _ if word.starts_with(|c: char| c.is_ascii_digit()) => (TokenKind::Number, word),
            _ if word.starts_with(|c| c == '"' || c == '\'') => (TokenKind::String, word),
            _ if word.starts_with(|c: char| c.is_alphabetic() || c == '_') => (TokenKind::Name, word),
            _ => (TokenKind::Op, word),
        };
        let start = Position::new(line, column);
        toks.push(Token::new(kind, text, start, Position::new(line, column + 1)));
        if kind == TokenKind::Newline {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    toks.push(Token::new(
        TokenKind::EndMarker,
        "",
        Position::new(line, column),
        Position::new(line, column),
    ));
    toks
}
