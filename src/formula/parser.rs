//! Recursive-descent parser producing a resolved `Expr`

use crate::formula::ast::{BinaryOp, Expr, Function};
use crate::formula::error::FormulaError;
use crate::formula::lexer::{tokenize, Token, TokenKind};

/// Deepest nesting of parentheses, calls, signs and exponents accepted
pub const MAX_NESTING_DEPTH: usize = 64;

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    variables: &'a [&'a str],
}

/// Parse `src`, resolving identifiers against the declared `variables`.
///
/// Variable `i` in `variables` becomes `Expr::Variable(i)`. The constants
/// `pi` and `e` are available unless shadowed by a variable of that name.
pub fn parse(src: &str, variables: &[&str]) -> Result<Expr, FormulaError> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }

    let mut parser = Parser {
        src,
        tokens,
        pos: 0,
        depth: 0,
        variables,
    };
    let expr = parser.expr()?;

    if let Some(token) = parser.peek() {
        return Err(parser.unexpected(token, "an operator or end of formula"));
    }
    Ok(expr)
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().is_some_and(|t| &t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(&self, token: &Token, expected: &'static str) -> FormulaError {
        FormulaError::UnexpectedToken {
            found: token.kind.describe(),
            expected,
            src: self.src.to_string(),
            span: (token.offset, token.len).into(),
        }
    }

    fn end_of_input(&self, expected: &'static str) -> FormulaError {
        FormulaError::UnexpectedEnd {
            expected,
            src: self.src.to_string(),
            span: (self.src.len(), 0).into(),
        }
    }

    /// Run `step` one nesting level down, failing past `MAX_NESTING_DEPTH`
    fn nested<T>(
        &mut self,
        step: impl FnOnce(&mut Self) -> Result<T, FormulaError>,
    ) -> Result<T, FormulaError> {
        if self.depth >= MAX_NESTING_DEPTH {
            let span = match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
                Some(token) => (token.offset, token.len).into(),
                None => (0usize, 0usize).into(),
            };
            return Err(FormulaError::TooDeep {
                limit: MAX_NESTING_DEPTH,
                src: self.src.to_string(),
                span,
            });
        }
        self.depth += 1;
        let result = step(self);
        self.depth -= 1;
        result
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, FormulaError> {
        match self.next() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(self.unexpected(&token, expected)),
            None => Err(self.end_of_input(expected)),
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.term()?;
        loop {
            let op = if self.eat(&TokenKind::Plus) {
                BinaryOp::Add
            } else if self.eat(&TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.unary()?;
        loop {
            let op = if self.eat(&TokenKind::Star) {
                BinaryOp::Mul
            } else if self.eat(&TokenKind::Slash) {
                BinaryOp::Div
            } else {
                return Ok(lhs);
            };
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    // unary := ('+' | '-') unary | power
    fn unary(&mut self) -> Result<Expr, FormulaError> {
        if self.eat(&TokenKind::Minus) {
            return Ok(Expr::Negate(Box::new(self.nested(Self::unary)?)));
        }
        if self.eat(&TokenKind::Plus) {
            return self.nested(Self::unary);
        }
        self.power()
    }

    // power := primary ('^' unary)?
    fn power(&mut self) -> Result<Expr, FormulaError> {
        let base = self.primary()?;
        if self.eat(&TokenKind::Caret) {
            let exponent = self.nested(Self::unary)?;
            return Ok(Expr::Binary {
                op: BinaryOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        let expected = "a number, variable, function call or '('";
        let token = match self.next() {
            Some(token) => token,
            None => return Err(self.end_of_input(expected)),
        };

        match token.kind {
            TokenKind::Number(n) => Ok(Expr::Number(n)),
            TokenKind::LParen => {
                let inner = self.nested(Self::expr)?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Ident(ref name) => {
                if self.peek().is_some_and(|t| t.kind == TokenKind::LParen) {
                    self.call(name, &token)
                } else {
                    self.resolve(name, &token)
                }
            }
            _ => Err(self.unexpected(&token, expected)),
        }
    }

    fn call(&mut self, name: &str, token: &Token) -> Result<Expr, FormulaError> {
        let function = Function::lookup(name).ok_or_else(|| FormulaError::UnknownFunction {
            name: name.to_string(),
            src: self.src.to_string(),
            span: (token.offset, token.len).into(),
        })?;

        self.expect(TokenKind::LParen, "'('")?;
        let args = self.nested(Self::arguments)?;
        let close = self.expect(TokenKind::RParen, "',' or ')'")?;

        if args.len() != function.arity() {
            return Err(FormulaError::WrongArity {
                name: name.to_string(),
                expected: function.arity(),
                found: args.len(),
                src: self.src.to_string(),
                span: (token.offset, close.offset + close.len - token.offset).into(),
            });
        }
        Ok(Expr::Call { function, args })
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, FormulaError> {
        let mut args = vec![self.expr()?];
        while self.eat(&TokenKind::Comma) {
            args.push(self.expr()?);
        }
        Ok(args)
    }

    fn resolve(&self, name: &str, token: &Token) -> Result<Expr, FormulaError> {
        if let Some(slot) = self.variables.iter().position(|v| *v == name) {
            return Ok(Expr::Variable(slot));
        }
        match name {
            "pi" => Ok(Expr::Number(std::f64::consts::PI)),
            "e" => Ok(Expr::Number(std::f64::consts::E)),
            _ => Err(FormulaError::UndeclaredVariable {
                name: name.to_string(),
                src: self.src.to_string(),
                span: (token.offset, token.len).into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str, names: &[&str], values: &[f64]) -> f64 {
        parse(src, names).unwrap().eval(values)
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("1 + 2 * 3", &[], &[]), 7.0);
        assert_eq!(eval("(1 + 2) * 3", &[], &[]), 9.0);
        assert_eq!(eval("8 / 4 / 2", &[], &[]), 1.0);
        assert_eq!(eval("10 - 4 - 3", &[], &[]), 3.0);
    }

    #[test]
    fn test_power_is_right_associative_and_binds_tighter_than_negation() {
        assert_eq!(eval("2 ^ 3 ^ 2", &[], &[]), 512.0);
        assert_eq!(eval("-2 ^ 2", &[], &[]), -4.0);
        assert_eq!(eval("2 ^ -1", &[], &[]), 0.5);
    }

    #[test]
    fn test_variables_resolve_to_slots() {
        let expr = parse("L / d", &["L", "d"]).unwrap();
        assert_eq!(expr.eval(&[10.0, 4.0]), 2.5);
    }

    #[test]
    fn test_functions_and_constants() {
        assert!((eval("sqrt(16) + abs(-1)", &[], &[]) - 5.0).abs() < 1e-12);
        assert!((eval("cos(pi)", &[], &[]) + 1.0).abs() < 1e-12);
        assert!((eval("log(e)", &[], &[]) - 1.0).abs() < 1e-12);
        assert_eq!(eval("max(x, 3)", &["x"], &[7.0]), 7.0);
    }

    #[test]
    fn test_variable_shadows_constant() {
        assert_eq!(eval("e * 2", &["e"], &[1.5]), 3.0);
    }

    #[test]
    fn test_undeclared_variable() {
        let err = parse("L / d + unknown", &["L", "d"]).unwrap_err();
        assert_eq!(err.undeclared_name(), Some("unknown"));
        assert!(err.to_string().contains("unknown"));
    }

    #[test]
    fn test_unknown_function() {
        let err = parse("system(1)", &[]).unwrap_err();
        assert!(matches!(err, FormulaError::UnknownFunction { ref name, .. } if name == "system"));
    }

    #[test]
    fn test_wrong_arity() {
        let err = parse("sqrt(1, 2)", &[]).unwrap_err();
        assert!(matches!(
            err,
            FormulaError::WrongArity {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let at_limit = format!(
            "{}x{}",
            "(".repeat(MAX_NESTING_DEPTH),
            ")".repeat(MAX_NESTING_DEPTH)
        );
        assert_eq!(eval(&at_limit, &["x"], &[3.0]), 3.0);

        let too_deep = format!("{}x{}", "(".repeat(3000), ")".repeat(3000));
        let err = parse(&too_deep, &["x"]).unwrap_err();
        assert!(matches!(err, FormulaError::TooDeep { limit, .. } if limit == MAX_NESTING_DEPTH));
        assert!(err.is_compile_time());
    }

    #[test]
    fn test_nesting_limit_covers_signs_calls_and_exponents() {
        let deep = MAX_NESTING_DEPTH + 1;
        let signs = format!("{}1", "-".repeat(deep));
        let pluses = format!("{}1", "+".repeat(deep));
        let calls = format!("{}1{}", "abs(".repeat(deep), ")".repeat(deep));
        let powers = vec!["1"; deep + 1].join("^");
        for src in [signs, pluses, calls, powers] {
            assert!(
                matches!(parse(&src, &[]), Err(FormulaError::TooDeep { .. })),
                "accepted {}",
                src
            );
        }
        let signs = format!("{}2", "-".repeat(MAX_NESTING_DEPTH - 1));
        assert_eq!(eval(&signs, &[], &[]), -2.0);
    }

    #[test]
    fn test_long_flat_chain_is_not_nesting() {
        let sum = vec!["1"; 300].join(" + ");
        assert_eq!(eval(&sum, &[], &[]), 300.0);
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(parse("", &[]), Err(FormulaError::Empty)));
        assert!(matches!(parse("   ", &[]), Err(FormulaError::Empty)));
        assert!(matches!(
            parse("1 +", &[]),
            Err(FormulaError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            parse("(1 + 2", &[]),
            Err(FormulaError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            parse("1 2", &[]),
            Err(FormulaError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            parse("* 2", &[]),
            Err(FormulaError::UnexpectedToken { .. })
        ));
    }
}
