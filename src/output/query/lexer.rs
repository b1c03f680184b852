use super::QueryError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Structural tokens
    Dot,
    Pipe,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,

    // Operators
    Equal,        // ==
    NotEqual,     // !=
    GreaterThan,  // >
    GreaterEqual, // >=
    LessThan,     // <
    LessEqual,    // <=

    // Keywords
    And,
    Or,
    True,
    False,
    Null,

    // Identifiers and literals
    Identifier(String),
    String(String),
    Number(f64),
}

/// Token plus its byte offset in the expression, for error messages
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedToken {
    pub token: Token,
    pub offset: usize,
}

/// Tokenizes a query expression
///
/// ```ignore
/// let tokens = tokenize(".[] | select(.status == \"TODO\")")?;
/// assert_eq!(tokens[0].token, Token::Dot);
/// ```
pub fn tokenize(input: &str) -> Result<Vec<LocatedToken>, QueryError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        let token = match ch {
            ' ' | '\t' | '\r' | '\n' => continue,

            '.' => Token::Dot,
            '|' => Token::Pipe,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '[' => Token::LeftBracket,
            ']' => Token::RightBracket,

            '=' => {
                if chars.next_if(|(_, c)| *c == '=').is_none() {
                    return Err(QueryError::syntax(pos, "expected '==' for equality"));
                }
                Token::Equal
            }
            '!' => {
                if chars.next_if(|(_, c)| *c == '=').is_none() {
                    return Err(QueryError::syntax(pos, "expected '!='"));
                }
                Token::NotEqual
            }
            '>' => {
                if chars.next_if(|(_, c)| *c == '=').is_some() {
                    Token::GreaterEqual
                } else {
                    Token::GreaterThan
                }
            }
            '<' => {
                if chars.next_if(|(_, c)| *c == '=').is_some() {
                    Token::LessEqual
                } else {
                    Token::LessThan
                }
            }

            '"' => Token::String(read_string(pos, &mut chars)?),

            c if c.is_ascii_digit() || c == '-' => {
                let mut end = pos + c.len_utf8();
                while let Some((i, d)) = chars.next_if(|(_, d)| d.is_ascii_digit() || *d == '.') {
                    end = i + d.len_utf8();
                }
                let text = &input[pos..end];
                let number = text
                    .parse::<f64>()
                    .map_err(|_| QueryError::syntax(pos, format!("invalid number '{}'", text)))?;
                Token::Number(number)
            }

            c if c.is_alphabetic() || c == '_' => {
                let mut end = pos + c.len_utf8();
                while let Some((i, d)) = chars.next_if(|(_, d)| d.is_alphanumeric() || *d == '_') {
                    end = i + d.len_utf8();
                }
                match &input[pos..end] {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "true" => Token::True,
                    "false" => Token::False,
                    "null" => Token::Null,
                    word => Token::Identifier(word.to_string()),
                }
            }

            other => {
                return Err(QueryError::syntax(
                    pos,
                    format!("unexpected character '{}'", other),
                ))
            }
        };

        tokens.push(LocatedToken { token, offset: pos });
    }

    Ok(tokens)
}

fn read_string(
    start: usize,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Result<String, QueryError> {
    let mut value = String::new();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '"' => return Ok(value),
            '\\' => match chars.next() {
                Some((_, '"')) => value.push('"'),
                Some((_, '\\')) => value.push('\\'),
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, other)) => {
                    return Err(QueryError::syntax(
                        pos,
                        format!("unknown escape '\\{}'", other),
                    ))
                }
                None => break,
            },
            c => value.push(c),
        }
    }

    Err(QueryError::syntax(start, "unterminated string literal"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_path_tokens() {
        assert_eq!(
            kinds(".data.people[0]"),
            vec![
                Token::Dot,
                Token::Identifier("data".into()),
                Token::Dot,
                Token::Identifier("people".into()),
                Token::LeftBracket,
                Token::Number(0.0),
                Token::RightBracket,
            ]
        );
    }

    #[test]
    fn test_select_tokens() {
        assert_eq!(
            kinds("select(.n >= -2 and .s != \"a\\\"b\")"),
            vec![
                Token::Identifier("select".into()),
                Token::LeftParen,
                Token::Dot,
                Token::Identifier("n".into()),
                Token::GreaterEqual,
                Token::Number(-2.0),
                Token::And,
                Token::Dot,
                Token::Identifier("s".into()),
                Token::NotEqual,
                Token::String("a\"b".into()),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn test_offsets() {
        let tokens = tokenize(". | .id").unwrap();
        let offsets: Vec<usize> = tokens.iter().map(|t| t.offset).collect();
        assert_eq!(offsets, vec![0, 2, 4, 5]);
    }

    #[test]
    fn test_single_equals_is_rejected() {
        assert!(tokenize(".a = 1").is_err());
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize(".a == \"oops").unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_unexpected_character() {
        assert!(tokenize(".a + 1").is_err());
    }
}
