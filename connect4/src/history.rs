use crate::error::GameError;

/// Parses a move history such as `"3,3,4"` into column indices. Commas and
/// whitespace both separate moves; an empty string is an empty history.
pub fn parse_history(history: &str) -> Result<Vec<usize>, GameError> {
    history
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(position, token)| {
            token.parse::<usize>().map_err(|_| GameError::ParseMove {
                position,
                reason: format!("expected a column number, found {token:?}"),
            })
        })
        .collect()
}

pub fn format_history(columns: impl IntoIterator<Item = usize>) -> String {
    columns
        .into_iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
