use super::lexer::{LocatedToken, Token};
use super::QueryError;
use serde_json::Value;

/// Parsed query expression
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `.`
    Identity,
    /// `.name` or `.["name"]`
    Field(String),
    /// `.[n]`, negative counts from the end
    Index(i64),
    /// `.[]`
    Iterate,
    /// `a | b`
    Pipe(Box<Filter>, Box<Filter>),
    /// `select(f)`
    Select(Box<Filter>),
    /// `not`
    Not,
    /// `a == b`, `a < b`, ...
    Compare(Box<Filter>, CompareOp, Box<Filter>),
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
    Literal(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

/// Parses tokens into a [`Filter`]
///
/// Grammar, lowest precedence first:
///
/// ```text
/// pipe    := or ('|' or)*
/// or      := and ('or' and)*
/// and     := compare ('and' compare)*
/// compare := postfix (op postfix)?
/// postfix := primary suffix*
/// primary := '.' [ident | string | '[' ... ']'] | literal | 'select' '(' pipe ')'
///          | 'not' | '(' pipe ')'
/// suffix  := '.' ident | '.' string | '[' ']' | '[' number ']' | '[' string ']'
/// ```
pub fn parse(tokens: Vec<LocatedToken>, source_len: usize) -> Result<Filter, QueryError> {
    let mut parser = Parser {
        tokens,
        current: 0,
        source_len,
    };

    if parser.tokens.is_empty() {
        return Err(QueryError::syntax(0, "empty query"));
    }

    let filter = parser.parse_pipe()?;

    if let Some(token) = parser.tokens.get(parser.current) {
        return Err(QueryError::syntax(
            token.offset,
            format!("unexpected {}", describe(&token.token)),
        ));
    }

    Ok(filter)
}

/// Parser state for tracking current position
struct Parser {
    tokens: Vec<LocatedToken>,
    current: usize,
    source_len: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current).map(|t| &t.token)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.current)
            .map(|t| t.offset)
            .unwrap_or(self.source_len)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.current).map(|t| t.token.clone());
        if token.is_some() {
            self.current += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), QueryError> {
        if self.eat(&expected) {
            return Ok(());
        }
        let found = match self.peek() {
            Some(token) => describe(token),
            None => "end of query".to_string(),
        };
        Err(QueryError::syntax(
            self.offset(),
            format!("expected {}, found {}", describe(&expected), found),
        ))
    }

    fn parse_pipe(&mut self) -> Result<Filter, QueryError> {
        let mut left = self.parse_or()?;
        while self.eat(&Token::Pipe) {
            let right = self.parse_or()?;
            left = Filter::Pipe(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Filter, QueryError> {
        let mut left = self.parse_and()?;
        while self.eat(&Token::Or) {
            let right = self.parse_and()?;
            left = Filter::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Filter, QueryError> {
        let mut left = self.parse_compare()?;
        while self.eat(&Token::And) {
            let right = self.parse_compare()?;
            left = Filter::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_compare(&mut self) -> Result<Filter, QueryError> {
        let left = self.parse_postfix()?;

        let op = match self.peek() {
            Some(Token::Equal) => CompareOp::Equal,
            Some(Token::NotEqual) => CompareOp::NotEqual,
            Some(Token::LessThan) => CompareOp::LessThan,
            Some(Token::LessEqual) => CompareOp::LessEqual,
            Some(Token::GreaterThan) => CompareOp::GreaterThan,
            Some(Token::GreaterEqual) => CompareOp::GreaterEqual,
            _ => return Ok(left),
        };
        self.advance();

        let right = self.parse_postfix()?;
        Ok(Filter::Compare(Box::new(left), op, Box::new(right)))
    }

    fn parse_postfix(&mut self) -> Result<Filter, QueryError> {
        let mut filter = self.parse_primary()?;

        loop {
            let step = match self.peek() {
                Some(Token::Dot) => {
                    let dot = self.offset();
                    self.advance();
                    match self.peek() {
                        Some(Token::LeftBracket) => self.parse_bracket()?,
                        _ => match self.keyword_field(dot) {
                            Some(field) => field,
                            None => self.parse_key()?,
                        },
                    }
                }
                Some(Token::LeftBracket) => self.parse_bracket()?,
                _ => break,
            };
            filter = chain(filter, step);
        }

        Ok(filter)
    }

    fn parse_primary(&mut self) -> Result<Filter, QueryError> {
        let offset = self.offset();

        match self.advance() {
            Some(Token::Dot) => match self.peek() {
                Some(Token::Identifier(_)) | Some(Token::String(_)) => self.parse_key(),
                Some(Token::LeftBracket) => self.parse_bracket(),
                _ => Ok(self.keyword_field(offset).unwrap_or(Filter::Identity)),
            },
            Some(Token::String(s)) => Ok(Filter::Literal(Value::String(s))),
            Some(Token::Number(n)) => Ok(Filter::Literal(number_value(n))),
            Some(Token::True) => Ok(Filter::Literal(Value::Bool(true))),
            Some(Token::False) => Ok(Filter::Literal(Value::Bool(false))),
            Some(Token::Null) => Ok(Filter::Literal(Value::Null)),
            Some(Token::LeftParen) => {
                let inner = self.parse_pipe()?;
                self.expect(Token::RightParen)?;
                Ok(inner)
            }
            Some(Token::Identifier(name)) => match name.as_str() {
                "select" => {
                    self.expect(Token::LeftParen)?;
                    let predicate = self.parse_pipe()?;
                    self.expect(Token::RightParen)?;
                    Ok(Filter::Select(Box::new(predicate)))
                }
                "not" => Ok(Filter::Not),
                other => Err(QueryError::syntax(
                    offset,
                    format!("unknown function '{}'", other),
                )),
            },
            Some(token) => Err(QueryError::syntax(
                offset,
                format!("unexpected {}", describe(&token)),
            )),
            None => Err(QueryError::syntax(offset, "unexpected end of query")),
        }
    }

    /// `.and`, `.null` and friends: a keyword directly against its dot is a field
    fn keyword_field(&mut self, dot_offset: usize) -> Option<Filter> {
        let located = self.tokens.get(self.current)?;
        if located.offset != dot_offset + 1 {
            return None;
        }
        let name = keyword_text(&located.token)?;
        self.current += 1;
        Some(Filter::Field(name.to_string()))
    }

    /// Key after a dot: `name` or `"quoted name"`
    fn parse_key(&mut self) -> Result<Filter, QueryError> {
        let offset = self.offset();
        match self.advance() {
            Some(Token::Identifier(name)) | Some(Token::String(name)) => Ok(Filter::Field(name)),
            Some(token) => Err(QueryError::syntax(
                offset,
                format!("expected field name, found {}", describe(&token)),
            )),
            None => Err(QueryError::syntax(offset, "expected field name")),
        }
    }

    /// `[]`, `[n]` or `["key"]`
    fn parse_bracket(&mut self) -> Result<Filter, QueryError> {
        self.expect(Token::LeftBracket)?;
        let offset = self.offset();

        let filter = match self.advance() {
            Some(Token::RightBracket) => return Ok(Filter::Iterate),
            Some(Token::Number(n)) if n.fract() == 0.0 => Filter::Index(n as i64),
            Some(Token::String(key)) => Filter::Field(key),
            Some(token) => {
                return Err(QueryError::syntax(
                    offset,
                    format!("expected index or key, found {}", describe(&token)),
                ))
            }
            None => return Err(QueryError::syntax(offset, "unterminated '['")),
        };

        self.expect(Token::RightBracket)?;
        Ok(filter)
    }
}

fn chain(left: Filter, right: Filter) -> Filter {
    match left {
        Filter::Identity => right,
        left => Filter::Pipe(Box::new(left), Box::new(right)),
    }
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn keyword_text(token: &Token) -> Option<&'static str> {
    match token {
        Token::And => Some("and"),
        Token::Or => Some("or"),
        Token::True => Some("true"),
        Token::False => Some("false"),
        Token::Null => Some("null"),
        _ => None,
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Dot => "'.'".to_string(),
        Token::Pipe => "'|'".to_string(),
        Token::LeftParen => "'('".to_string(),
        Token::RightParen => "')'".to_string(),
        Token::LeftBracket => "'['".to_string(),
        Token::RightBracket => "']'".to_string(),
        Token::Equal => "'=='".to_string(),
        Token::NotEqual => "'!='".to_string(),
        Token::GreaterThan => "'>'".to_string(),
        Token::GreaterEqual => "'>='".to_string(),
        Token::LessThan => "'<'".to_string(),
        Token::LessEqual => "'<='".to_string(),
        Token::And => "'and'".to_string(),
        Token::Or => "'or'".to_string(),
        Token::True => "'true'".to_string(),
        Token::False => "'false'".to_string(),
        Token::Null => "'null'".to_string(),
        Token::Identifier(name) => format!("identifier '{}'", name),
        Token::String(s) => format!("string \"{}\"", s),
        Token::Number(n) => format!("number {}", n),
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;
    use serde_json::json;

    fn parse_str(input: &str) -> Result<Filter, QueryError> {
        parse(tokenize(input)?, input.len())
    }

    fn field(name: &str) -> Box<Filter> {
        Box::new(Filter::Field(name.to_string()))
    }

    #[test]
    fn test_identity() {
        assert_eq!(parse_str(".").unwrap(), Filter::Identity);
    }

    #[test]
    fn test_field_chain() {
        assert_eq!(
            parse_str(".data.people").unwrap(),
            Filter::Pipe(field("data"), field("people"))
        );
    }

    #[test]
    fn test_iterate_then_field() {
        assert_eq!(
            parse_str(".[].name").unwrap(),
            Filter::Pipe(Box::new(Filter::Iterate), field("name"))
        );
    }

    #[test]
    fn test_index_and_quoted_key() {
        assert_eq!(parse_str(".[2]").unwrap(), Filter::Index(2));
        assert_eq!(parse_str(".[-1]").unwrap(), Filter::Index(-1));
        assert_eq!(
            parse_str(".[\"first name\"]").unwrap(),
            Filter::Field("first name".into())
        );
        assert_eq!(parse_str(".\"a b\"").unwrap(), Filter::Field("a b".into()));
    }

    #[test]
    fn test_keywords_after_dot_are_fields() {
        assert_eq!(parse_str(".and").unwrap(), Filter::Field("and".into()));
        assert_eq!(
            parse_str(".a.null").unwrap(),
            Filter::Pipe(field("a"), field("null"))
        );
        assert_eq!(
            parse_str(".or == true").unwrap(),
            Filter::Compare(
                field("or"),
                CompareOp::Equal,
                Box::new(Filter::Literal(json!(true)))
            )
        );
    }

    #[test]
    fn test_spaced_keyword_stays_an_operator() {
        assert_eq!(
            parse_str(". and true").unwrap(),
            Filter::And(
                Box::new(Filter::Identity),
                Box::new(Filter::Literal(json!(true)))
            )
        );
    }

    #[test]
    fn test_select_with_comparison() {
        assert_eq!(
            parse_str(".[] | select(.status == \"DONE\")").unwrap(),
            Filter::Pipe(
                Box::new(Filter::Iterate),
                Box::new(Filter::Select(Box::new(Filter::Compare(
                    field("status"),
                    CompareOp::Equal,
                    Box::new(Filter::Literal(json!("DONE")))
                ))))
            )
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let parsed = parse_str(".a == 1 or .b == 2 and .c == 3").unwrap();
        match parsed {
            Filter::Or(_, right) => assert!(matches!(*right, Filter::And(_, _))),
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_syntax_errors() {
        for bad in [".bogus(", "", "select(.a", ".[", ".a ==", "foo", ".a )", ". ."] {
            assert!(parse_str(bad).is_err(), "expected error for {:?}", bad);
        }
    }

    #[test]
    fn test_error_reports_offset() {
        let err = parse_str(".bogus(").unwrap_err();
        assert!(err.to_string().contains("position 6"), "{}", err);
    }
}
