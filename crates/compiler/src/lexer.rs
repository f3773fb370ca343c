//! Lexer for Moonlet source using logos.

use std::fmt;

use logos::Logos;

use crate::error::CompileError;

/// A source token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")] // Skip horizontal whitespace
pub enum Token {
    // === Trivia ===
    #[regex(r"--[^\n]*")]
    Comment,

    #[token("\n")]
    Newline,

    // === Keywords ===
    #[token("and")]
    And,
    #[token("break")]
    Break,
    #[token("do")]
    Do,
    #[token("else")]
    Else,
    #[token("elseif")]
    Elseif,
    #[token("end")]
    End,
    #[token("false")]
    False,
    #[token("for")]
    For,
    #[token("function")]
    Function,
    #[token("goto")]
    Goto,
    #[token("if")]
    If,
    #[token("in")]
    In,
    #[token("local")]
    Local,
    #[token("nil")]
    Nil,
    #[token("not")]
    Not,
    #[token("or")]
    Or,
    #[token("repeat")]
    Repeat,
    #[token("return")]
    Return,
    #[token("then")]
    Then,
    #[token("true")]
    True,
    #[token("until")]
    Until,
    #[token("while")]
    While,

    // === Symbols ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("=")]
    Assign,
    #[token("{")]
    LBrace,
    #[token("[")]
    LBracket,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("..")]
    DotDot,
    #[token("==")]
    EqEq,
    #[token("~=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,

    // === Literals ===
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", parse_number)]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", parse_number)]
    Number(f64),

    #[regex(r#""([^"\\\n]|\\[^\n])*""#, unescape)]
    #[regex(r#"'([^'\\\n]|\\[^\n])*'"#, unescape)]
    Str(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Name(String),

    /// Appended after the last real token.
    Eof,
}

/// A token with its 1-based source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

fn parse_number(lex: &mut logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn unescape(lex: &mut logos::Lexer<Token>) -> Option<String> {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        out.push(match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            _ => return None,
        });
    }
    Some(out)
}

/// Lex source text into tokens, ending with [`Token::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, CompileError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        match result {
            Ok(Token::Comment) => {}
            Ok(Token::Newline) => line += 1,
            Ok(token) => tokens.push(Spanned { token, line }),
            Err(()) => {
                return Err(CompileError::Lex {
                    line,
                    text: lexer.slice().to_string(),
                })
            }
        }
    }

    tokens.push(Spanned {
        token: Token::Eof,
        line,
    });
    Ok(tokens)
}

/// How a token reads in an error message.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Token::Number(n) => return write!(f, "number {n}"),
            Token::Str(s) => return write!(f, "string {s:?}"),
            Token::Name(name) => return write!(f, "name '{name}'"),
            Token::Eof => return f.write_str("end of input"),
            Token::Comment => "comment",
            Token::Newline => "newline",
            Token::And => "and",
            Token::Break => "break",
            Token::Do => "do",
            Token::Else => "else",
            Token::Elseif => "elseif",
            Token::End => "end",
            Token::False => "false",
            Token::For => "for",
            Token::Function => "function",
            Token::Goto => "goto",
            Token::If => "if",
            Token::In => "in",
            Token::Local => "local",
            Token::Nil => "nil",
            Token::Not => "not",
            Token::Or => "or",
            Token::Repeat => "repeat",
            Token::Return => "return",
            Token::Then => "then",
            Token::True => "true",
            Token::Until => "until",
            Token::While => "while",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::Assign => "=",
            Token::LBrace => "{",
            Token::LBracket => "[",
            Token::Dot => ".",
            Token::Colon => ":",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::DotDot => "..",
            Token::EqEq => "==",
            Token::NotEq => "~=",
            Token::Lt => "<",
            Token::LtEq => "<=",
            Token::Gt => ">",
            Token::GtEq => ">=",
        };
        write!(f, "'{symbol}'")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn keywords_and_names() {
        assert_eq!(
            kinds("local endx = end"),
            vec![
                Token::Local,
                Token::Name("endx".into()),
                Token::Assign,
                Token::End,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("3 0.5 .25 1e3 2."),
            vec![
                Token::Number(3.0),
                Token::Number(0.5),
                Token::Number(0.25),
                Token::Number(1000.0),
                Token::Number(2.0),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn overflowing_number_is_rejected() {
        assert!(matches!(
            tokenize("x = 1e999"),
            Err(CompileError::Lex { line: 1, .. })
        ));
    }

    #[test]
    fn strings_both_quotes() {
        assert_eq!(
            kinds(r#""a\"b" 'it\'s' "tab\there""#),
            vec![
                Token::Str("a\"b".into()),
                Token::Str("it's".into()),
                Token::Str("tab\there".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn bad_escape_is_rejected() {
        assert!(tokenize(r#"s = "\q""#).is_err());
    }

    #[test]
    fn unterminated_string_is_rejected() {
        assert!(matches!(
            tokenize("s = \"open\nx = 1"),
            Err(CompileError::Lex { line: 1, .. })
        ));
    }

    #[test]
    fn operators_longest_match() {
        assert_eq!(
            kinds("a .. b <= c ~= d == e"),
            vec![
                Token::Name("a".into()),
                Token::DotDot,
                Token::Name("b".into()),
                Token::LtEq,
                Token::Name("c".into()),
                Token::NotEq,
                Token::Name("d".into()),
                Token::EqEq,
                Token::Name("e".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn comments_and_lines() {
        let tokens = tokenize("-- header\nx = 1 -- trailing\n\ny = 2").unwrap();
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[3].line, 4);
        assert_eq!(tokens.last().map(|t| t.line), Some(4));
    }

    #[test]
    fn minus_is_not_a_comment() {
        assert_eq!(
            kinds("a - b"),
            vec![
                Token::Name("a".into()),
                Token::Minus,
                Token::Name("b".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn unknown_character() {
        assert_eq!(
            tokenize("x = 1\ny = #z"),
            Err(CompileError::Lex {
                line: 2,
                text: "#".into()
            })
        );
    }
}
