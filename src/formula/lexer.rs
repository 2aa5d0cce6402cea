//! Tokenizer for the formula language

use crate::formula::error::FormulaError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
}

impl TokenKind {
    /// Human-readable description used in syntax errors
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::Number(n) => format!("number {}", n),
            TokenKind::Ident(name) => format!("identifier '{}'", name),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::Caret => "'^'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Comma => "','".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token in the source
    pub offset: usize,
    /// Byte length of the token
    pub len: usize,
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Split a formula into tokens, rejecting anything outside the allow-list
pub(crate) fn tokenize(src: &str) -> Result<Vec<Token>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let single = match c {
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Star),
            '/' => Some(TokenKind::Slash),
            '^' => Some(TokenKind::Caret),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            ',' => Some(TokenKind::Comma),
            _ => None,
        };
        if let Some(kind) = single {
            chars.next();
            tokens.push(Token {
                kind,
                offset: start,
                len: 1,
            });
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let end = scan_number(src, start);
            let text = &src[start..end];
            let value = text
                .parse::<f64>()
                .map_err(|_| FormulaError::InvalidNumber {
                    text: text.to_string(),
                    src: src.to_string(),
                    span: (start, end - start).into(),
                })?;
            while chars.peek().is_some_and(|&(i, _)| i < end) {
                chars.next();
            }
            tokens.push(Token {
                kind: TokenKind::Number(value),
                offset: start,
                len: end - start,
            });
            continue;
        }

        if is_ident_start(c) {
            let mut end = start;
            while let Some(&(i, ch)) = chars.peek() {
                if !is_ident_continue(ch) {
                    break;
                }
                end = i + ch.len_utf8();
                chars.next();
            }
            tokens.push(Token {
                kind: TokenKind::Ident(src[start..end].to_string()),
                offset: start,
                len: end - start,
            });
            continue;
        }

        return Err(FormulaError::UnexpectedCharacter {
            found: c,
            src: src.to_string(),
            span: (start, c.len_utf8()).into(),
        });
    }

    Ok(tokens)
}

/// Find the end of a numeric literal starting at `start`.
///
/// Digits and dots are consumed greedily so that `1.2.3` surfaces as a single
/// malformed number. An exponent is only taken when digits follow it, which
/// keeps `2e` readable as `2` followed by the identifier `e`.
fn scan_number(src: &str, start: usize) -> usize {
    let bytes = src.as_bytes();
    let mut end = start;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
        end += 1;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        if exp < bytes.len() && bytes[exp].is_ascii_digit() {
            while exp < bytes.len() && bytes[exp].is_ascii_digit() {
                exp += 1;
            }
            end = exp;
        }
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_simple_expression() {
        assert_eq!(
            kinds("L / d"),
            vec![
                TokenKind::Ident("L".to_string()),
                TokenKind::Slash,
                TokenKind::Ident("d".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_numbers() {
        assert_eq!(kinds("3.5"), vec![TokenKind::Number(3.5)]);
        assert_eq!(kinds(".25"), vec![TokenKind::Number(0.25)]);
        assert_eq!(kinds("1e3"), vec![TokenKind::Number(1000.0)]);
        assert_eq!(kinds("2.5E-2"), vec![TokenKind::Number(0.025)]);
    }

    #[test]
    fn test_exponent_without_digits_is_identifier() {
        assert_eq!(
            kinds("2e"),
            vec![TokenKind::Number(2.0), TokenKind::Ident("e".to_string())]
        );
    }

    #[test]
    fn test_token_offsets() {
        let tokens = tokenize("ab + 12").unwrap();
        assert_eq!((tokens[0].offset, tokens[0].len), (0, 2));
        assert_eq!((tokens[1].offset, tokens[1].len), (3, 1));
        assert_eq!((tokens[2].offset, tokens[2].len), (5, 2));
    }

    #[test]
    fn test_unicode_identifier() {
        assert_eq!(
            kinds("uzunluk_ğ * 2"),
            vec![
                TokenKind::Ident("uzunluk_ğ".to_string()),
                TokenKind::Star,
                TokenKind::Number(2.0),
            ]
        );
    }

    #[test]
    fn test_rejects_disallowed_character() {
        let err = tokenize("a ; b").unwrap_err();
        assert!(matches!(err, FormulaError::UnexpectedCharacter { found: ';', .. }));
    }

    #[test]
    fn test_rejects_malformed_number() {
        let err = tokenize("1.2.3").unwrap_err();
        assert!(matches!(err, FormulaError::InvalidNumber { ref text, .. } if text == "1.2.3"));
    }
}
