//! Expression parsing: a fixed precedence ladder, one method per level.
//!
//! Bindings from loosest to tightest:
//!
//! | Level | Operators |
//! |-------|-----------|
//! | 1 | `sau` |
//! | 2 | `si` |
//! | 3 | `not` (prefix) |
//! | 4 | `=`, `!=`, `<`, `<=`, `>`, `>=` (single comparison per chain) |
//! | 5 | `+`, `-` |
//! | 6 | `*`, `/`, `%` |
//! | 7 | `^` (left-to-right) |
//! | 8 | unary `-` |
//! | 9 | literals, variables, `sqrt(...)`, `[...]`, `(...)` |
//!
//! Relational operators are non-associative: `a < b < c` stops after the
//! first comparison and leaves the rest for the caller to trip over.

use pscc_lex::TokenKind;

use crate::ast::*;
use crate::{ParseError, Parser};

impl Parser {
    /// Entry point: the `sau` level.
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_logic_term()?;
        while self.at(TokenKind::Or) {
            let op_token = self.bump();
            let right = self.parse_logic_term()?;
            left = Expr::binary(BinOp::Or, left, right, op_token.span);
        }
        Ok(left)
    }

    /// The `si` level.
    fn parse_logic_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not_factor()?;
        while self.at(TokenKind::And) {
            let op_token = self.bump();
            let right = self.parse_not_factor()?;
            left = Expr::binary(BinOp::And, left, right, op_token.span);
        }
        Ok(left)
    }

    /// Prefix `not`; recursive so `not not a` works.
    fn parse_not_factor(&mut self) -> Result<Expr, ParseError> {
        if self.at(TokenKind::Not) {
            let op_token = self.bump();
            let operand = self.parse_not_factor()?;
            return Ok(Expr::unary(UnOp::Not, operand, op_token.span));
        }
        self.parse_relational()
    }

    /// Relational level: at most one comparison per chain.
    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_arithmetic()?;
        if let Some(op) = relational_op(self.current_kind()) {
            let op_token = self.bump();
            let right = self.parse_arithmetic()?;
            return Ok(Expr::binary(op, left, right, op_token.span));
        }
        Ok(left)
    }

    /// `+`, `-` level.
    fn parse_arithmetic(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term_arithmetic()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let op_token = self.bump();
            let right = self.parse_term_arithmetic()?;
            left = Expr::binary(op, left, right, op_token.span);
        }
        Ok(left)
    }

    /// `*`, `/`, `%` level.
    fn parse_term_arithmetic(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_pow()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Mul => BinOp::Mul,
                TokenKind::Div => BinOp::Div,
                TokenKind::Mod => BinOp::Mod,
                _ => break,
            };
            let op_token = self.bump();
            let right = self.parse_pow()?;
            left = Expr::binary(op, left, right, op_token.span);
        }
        Ok(left)
    }

    /// `^` level, iterated left-to-right.
    fn parse_pow(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;
        while self.at(TokenKind::Pow) {
            let op_token = self.bump();
            let right = self.parse_factor()?;
            left = Expr::binary(BinOp::Pow, left, right, op_token.span);
        }
        Ok(left)
    }

    /// Unary minus, binding tighter than `^`.
    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        if self.at(TokenKind::Minus) {
            let op_token = self.bump();
            let operand = self.parse_factor()?;
            return Ok(Expr::unary(UnOp::Neg, operand, op_token.span));
        }
        self.parse_primary()
    }

    /// Literals, variables, `sqrt(expr)`, `[expr]`, `(expr)`.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.bump();
        match token.kind {
            TokenKind::Number => {
                let kind = if token.lexeme.contains('.') {
                    LiteralKind::Real
                } else {
                    LiteralKind::Int
                };
                Ok(Expr::literal(kind, token.lexeme, token.span))
            }
            TokenKind::Str => Ok(Expr::literal(
                LiteralKind::Str,
                unquote(&token.lexeme),
                token.span,
            )),
            TokenKind::Id => Ok(Expr::Var(Ident {
                name: token.lexeme,
                span: token.span,
            })),
            TokenKind::True | TokenKind::False => {
                let text = if token.kind == TokenKind::True {
                    "adevarat"
                } else {
                    "fals"
                };
                Ok(Expr::literal(LiteralKind::Bool, text, token.span))
            }
            TokenKind::Sqrt => {
                if self.accept(TokenKind::LParen).is_none() {
                    return Err(ParseError::Expected {
                        what: "'(' după 'sqrt'".into(),
                        line: token.line(),
                    });
                }
                let operand = self.parse_expression()?;
                if self.accept(TokenKind::RParen).is_none() {
                    return Err(ParseError::Expected {
                        what: "')' după expresia din 'sqrt'".into(),
                        line: self.current_line(),
                    });
                }
                Ok(Expr::unary(UnOp::Sqrt, operand, token.span))
            }
            TokenKind::LBracket => {
                let operand = self.parse_expression()?;
                if self.accept(TokenKind::RBracket).is_none() {
                    return Err(ParseError::Expected {
                        what: "']' pentru închiderea părții întregi".into(),
                        line: self.current_line(),
                    });
                }
                Ok(Expr::unary(UnOp::Floor, operand, token.span))
            }
            TokenKind::LParen => {
                let inner = self.parse_expression()?;
                if self.accept(TokenKind::RParen).is_none() {
                    return Err(ParseError::Expected {
                        what: "')' pentru închiderea parantezei".into(),
                        line: self.current_line(),
                    });
                }
                Ok(inner)
            }
            _ => {
                let line = token.line();
                Err(ParseError::UnexpectedTerm {
                    lexeme: token.lexeme,
                    line,
                })
            }
        }
    }
}

/// Map a relational token to its operator, if any.
fn relational_op(kind: TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::Eq => Some(BinOp::Eq),
        TokenKind::Neq => Some(BinOp::Ne),
        TokenKind::Lt => Some(BinOp::Lt),
        TokenKind::Lte => Some(BinOp::Le),
        TokenKind::Gt => Some(BinOp::Gt),
        TokenKind::Gte => Some(BinOp::Ge),
        _ => None,
    }
}

/// Strip the surrounding quotes of a string lexeme and resolve the quote
/// escapes; `\n` stays textual until WRITE unescapes it.
fn unquote(lexeme: &str) -> String {
    let inner = if lexeme.len() >= 2 {
        &lexeme[1..lexeme.len() - 1]
    } else {
        lexeme
    };
    inner.replace("\\\"", "\"").replace("\\'", "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;
    use pscc_lex::tokenize;

    fn parse_expr(source: &str) -> Expr {
        let mut parser = Parser::new(tokenize(source).expect("lexing failed"));
        parser.parse_expression().expect("parsing failed")
    }

    fn parse_expr_err(source: &str) -> ParseError {
        let mut parser = Parser::new(tokenize(source).expect("lexing failed"));
        parser.parse_expression().unwrap_err()
    }

    fn as_binary(expr: &Expr) -> &BinaryExpr {
        match expr {
            Expr::Binary(bin) => bin,
            other => panic!("expected binary expression, got {other:?}"),
        }
    }

    #[test]
    fn test_mul_binds_tighter_than_add() {
        // a + b * c parses as a + (b * c)
        let expr = parse_expr("a + b * c");
        let top = as_binary(&expr);
        assert_eq!(top.op, BinOp::Add);
        assert_eq!(as_binary(&top.rhs).op, BinOp::Mul);
    }

    #[test]
    fn test_additive_is_left_associative() {
        // a - b - c parses as (a - b) - c
        let expr = parse_expr("a - b - c");
        let top = as_binary(&expr);
        assert_eq!(top.op, BinOp::Sub);
        assert_eq!(as_binary(&top.lhs).op, BinOp::Sub);
    }

    #[test]
    fn test_pow_is_left_iterated() {
        // 2 ^ 3 ^ 2 parses as (2 ^ 3) ^ 2
        let expr = parse_expr("2 ^ 3 ^ 2");
        let top = as_binary(&expr);
        assert_eq!(top.op, BinOp::Pow);
        assert_eq!(as_binary(&top.lhs).op, BinOp::Pow);
    }

    #[test]
    fn test_unary_minus_binds_tighter_than_pow() {
        // -2 ^ 2 parses as (-2) ^ 2
        let expr = parse_expr("-2 ^ 2");
        let top = as_binary(&expr);
        assert_eq!(top.op, BinOp::Pow);
        assert!(matches!(&*top.lhs, Expr::Unary(un) if un.op == UnOp::Neg));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        // a sau b si c parses as a sau (b si c)
        let expr = parse_expr("a sau b si c");
        let top = as_binary(&expr);
        assert_eq!(top.op, BinOp::Or);
        assert_eq!(as_binary(&top.rhs).op, BinOp::And);
    }

    #[test]
    fn test_comparison_below_logic() {
        // a = 1 si b = 2 parses as (a = 1) si (b = 2)
        let expr = parse_expr("a = 1 si b = 2");
        let top = as_binary(&expr);
        assert_eq!(top.op, BinOp::And);
        assert_eq!(as_binary(&top.lhs).op, BinOp::Eq);
        assert_eq!(as_binary(&top.rhs).op, BinOp::Eq);
    }

    #[test]
    fn test_relational_is_single_shot() {
        // Only one comparison is consumed; the second `<` stays behind.
        let mut parser = Parser::new(tokenize("a < b < c").unwrap());
        let expr = parser.parse_expression().unwrap();
        assert_eq!(as_binary(&expr).op, BinOp::Lt);
        assert!(parser.at(pscc_lex::TokenKind::Lt));
    }

    #[test]
    fn test_not_is_recursive() {
        let expr = parse_expr("not not a");
        let Expr::Unary(outer) = &expr else {
            panic!("expected unary")
        };
        assert_eq!(outer.op, UnOp::Not);
        assert!(matches!(&*outer.operand, Expr::Unary(inner) if inner.op == UnOp::Not));
    }

    #[test]
    fn test_number_literal_typing() {
        let Expr::Literal(int_lit) = parse_expr("42") else {
            panic!("expected literal")
        };
        assert_eq!(int_lit.kind, LiteralKind::Int);

        let Expr::Literal(real_lit) = parse_expr("4.5") else {
            panic!("expected literal")
        };
        assert_eq!(real_lit.kind, LiteralKind::Real);
    }

    #[test]
    fn test_boolean_literals_normalize_case() {
        let Expr::Literal(lit) = parse_expr("ADEVARAT") else {
            panic!("expected literal")
        };
        assert_eq!(lit.kind, LiteralKind::Bool);
        assert_eq!(lit.text, "adevarat");
    }

    #[test]
    fn test_string_literal_strips_quotes_and_escapes() {
        let Expr::Literal(lit) = parse_expr(r#""Suma este: \"s\"""#) else {
            panic!("expected literal")
        };
        assert_eq!(lit.kind, LiteralKind::Str);
        assert_eq!(lit.text, r#"Suma este: "s""#);
    }

    #[test]
    fn test_string_keeps_backslash_n_textual() {
        let Expr::Literal(lit) = parse_expr(r#""a\nb""#) else {
            panic!("expected literal")
        };
        assert_eq!(lit.text, "a\\nb");
    }

    #[test]
    fn test_sqrt_lowered_to_unary() {
        let expr = parse_expr("sqrt(a + 1)");
        let Expr::Unary(un) = &expr else {
            panic!("expected unary")
        };
        assert_eq!(un.op, UnOp::Sqrt);
        assert!(matches!(&*un.operand, Expr::Binary(_)));
    }

    #[test]
    fn test_brackets_lowered_to_floor() {
        let expr = parse_expr("[n / 10]");
        let Expr::Unary(un) = &expr else {
            panic!("expected unary")
        };
        assert_eq!(un.op, UnOp::Floor);
        assert_eq!(as_binary(&un.operand).op, BinOp::Div);
    }

    #[test]
    fn test_parentheses_regroup() {
        // (a + b) * c keeps the addition on the left
        let expr = parse_expr("(a + b) * c");
        let top = as_binary(&expr);
        assert_eq!(top.op, BinOp::Mul);
        assert_eq!(as_binary(&top.lhs).op, BinOp::Add);
    }

    #[test]
    fn test_sqrt_requires_parentheses() {
        let err = parse_expr_err("sqrt 2");
        assert_eq!(err.to_string(), "Așteptam '(' după 'sqrt' la linia 1");
    }

    #[test]
    fn test_unclosed_bracket_reports_line() {
        let err = parse_expr_err("[a / 2");
        assert_eq!(
            err.to_string(),
            "Așteptam ']' pentru închiderea părții întregi la linia 1"
        );
    }

    #[test]
    fn test_unexpected_term() {
        let err = parse_expr_err("a + sfarsit_daca");
        assert_eq!(
            err.to_string(),
            "Termen neașteptat 'sfarsit_daca' la linia 1"
        );
    }
}
