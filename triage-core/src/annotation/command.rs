//! Operator command parsing.

/// One operator decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Zero-based category index (the operator types `index + 1`).
    Category(usize),
    Undo,
    Skip,
    Quit,
}

impl Command {
    /// Parse one line of operator input.
    ///
    /// Digits selecting an existing category, `u`/`undo`, and `quit` are
    /// recognized; anything else, including an empty line, is a skip.
    pub fn parse(input: &str, category_count: usize) -> Self {
        let input = input.trim();
        match input {
            "u" | "undo" => Self::Undo,
            "quit" => Self::Quit,
            _ if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) => {
                match input.parse::<usize>() {
                    Ok(n) if (1..=category_count).contains(&n) => Self::Category(n - 1),
                    _ => Self::Skip,
                }
            }
            _ => Self::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("1", Command::Category(0) ; "first category")]
    #[test_case("3", Command::Category(2) ; "last category")]
    #[test_case(" 2\n", Command::Category(1) ; "surrounding whitespace")]
    #[test_case("u", Command::Undo ; "short undo")]
    #[test_case("undo", Command::Undo ; "long undo")]
    #[test_case("quit", Command::Quit ; "quit")]
    #[test_case("0", Command::Skip ; "zero")]
    #[test_case("4", Command::Skip ; "out of range")]
    #[test_case("99999999999999999999999", Command::Skip ; "overflow")]
    #[test_case("", Command::Skip ; "empty line")]
    #[test_case("s", Command::Skip ; "explicit skip letter")]
    #[test_case("Quit", Command::Skip ; "quit is case sensitive")]
    #[test_case("-1", Command::Skip ; "negative")]
    #[test_case("1.0", Command::Skip ; "decimal")]
    fn test_parse(input: &str, expected: Command) {
        assert_eq!(Command::parse(input, 3), expected);
    }
}
