use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The grammar text could not be parsed at the given location.
    #[error("failed to parse grammar at {line}:{column} near `{near}`")]
    ParseError {
        line: usize,
        column: usize,
        near: String,
    },
}

impl Error {
    /// Build an error pointing at `rest`, which must be a suffix of `input`.
    pub(crate) fn at(input: &str, rest: &str) -> Error {
        let offset = input.len().saturating_sub(rest.len());
        let consumed = &input[..offset];
        let line = consumed.matches('\n').count() + 1;
        let column = match consumed.rfind('\n') {
            Some(idx) => consumed[idx + 1..].chars().count() + 1,
            None => consumed.chars().count() + 1,
        };
        let near = rest.lines().next().unwrap_or("").chars().take(24).collect();
        Error::ParseError { line, column, near }
    }

    pub(crate) fn from_nom(input: &str, err: nom::Err<nom::error::Error<&str>>) -> Error {
        match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => Error::at(input, e.input),
            nom::Err::Incomplete(_) => Error::at(input, ""),
        }
    }
}
