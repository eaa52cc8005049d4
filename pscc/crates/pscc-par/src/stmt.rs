//! Statement parsing: dispatch on the leading token, one method per
//! statement shape.

use pscc_lex::TokenKind;
use pscc_util::Span;

use crate::ast::*;
use crate::{ParseError, Parser};

impl Parser {
    /// Parse one statement, selected by the token at the cursor.
    pub fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current_kind() {
            TokenKind::Id => self.parse_assign(),
            TokenKind::CatTimp => self.parse_while(),
            TokenKind::Citeste => self.parse_read(),
            TokenKind::Scrie => self.parse_write(),
            TokenKind::Pentru => self.parse_for(),
            TokenKind::Daca => self.parse_if(),
            TokenKind::Repeta => self.parse_repeat_until(),
            TokenKind::Executa => self.parse_do_while(),
            _ => Err(ParseError::UnknownStatement {
                lexeme: self.current().lexeme.clone(),
                line: self.current_line(),
            }),
        }
    }

    /// Statements until `EOF` or the given closing token; the caller
    /// consumes the closer itself.
    fn parse_block(&mut self, end: TokenKind) -> Result<Block, ParseError> {
        let mut stmts = Vec::new();
        while self.current_kind() != TokenKind::Eof && self.current_kind() != end {
            stmts.push(self.parse_statement()?);
        }
        Ok(Block { stmts })
    }

    /// `nume <- expresie`
    fn parse_assign(&mut self) -> Result<Stmt, ParseError> {
        let name_token = self.bump();
        let target = Ident {
            name: name_token.lexeme,
            span: name_token.span,
        };

        if self.accept(TokenKind::Assign).is_none() {
            return Err(ParseError::Expected {
                what: format!("'<-' după {}", target.name),
                line: target.span.line,
            });
        }

        let value = self.parse_expression()?;
        let span = target.span;
        Ok(Stmt::Assign(AssignStmt {
            target,
            value,
            span,
        }))
    }

    /// `cat timp C executa ... sfarsit_cat_timp`
    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let span = self.current().span;
        self.expect(TokenKind::CatTimp)?;

        let cond = self.parse_expression()?;

        if self.accept(TokenKind::Executa).is_none() {
            return Err(ParseError::Expected {
                what: "'executa'".into(),
                line: self.current_line(),
            });
        }

        let body = self.parse_block(TokenKind::SfarsitCat)?;

        if self.accept(TokenKind::SfarsitCat).is_none() {
            return Err(ParseError::MissingTerminator {
                keyword: "sfarsit_cat_timp",
                construct: "bucla curentă",
            });
        }

        Ok(Stmt::While(WhileStmt { cond, body, span }))
    }

    /// `executa ... cat timp C` - runs the body, then continues while C.
    fn parse_do_while(&mut self) -> Result<Stmt, ParseError> {
        let span = self.current().span;
        self.expect(TokenKind::Executa)?;

        let body = self.parse_block(TokenKind::CatTimp)?;

        self.expect(TokenKind::CatTimp)?;
        let cond = self.parse_expression()?;

        Ok(Stmt::DoWhile(DoWhileStmt { body, cond, span }))
    }

    /// `repeta ... pana cand C` - runs the body at least once, stops when C.
    fn parse_repeat_until(&mut self) -> Result<Stmt, ParseError> {
        let span = self.current().span;
        self.expect(TokenKind::Repeta)?;

        let body = self.parse_block(TokenKind::PanaCand)?;

        self.expect(TokenKind::PanaCand)?;
        let cond = self.parse_expression()?;

        Ok(Stmt::RepeatUntil(RepeatUntilStmt { body, cond, span }))
    }

    /// `daca C atunci ... [altfel ...] sfarsit_daca`
    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let span = self.current().span;
        self.expect(TokenKind::Daca)?;

        let cond = self.parse_expression()?;

        if self.accept(TokenKind::Atunci).is_none() {
            return Err(ParseError::Expected {
                what: "'atunci' după condiție".into(),
                line: self.current_line(),
            });
        }

        let mut then_stmts = Vec::new();
        while !matches!(
            self.current_kind(),
            TokenKind::Altfel | TokenKind::SfarsitDaca | TokenKind::Eof
        ) {
            then_stmts.push(self.parse_statement()?);
        }

        let mut else_stmts = Vec::new();
        if self.accept(TokenKind::Altfel).is_some() {
            while !matches!(self.current_kind(), TokenKind::SfarsitDaca | TokenKind::Eof) {
                else_stmts.push(self.parse_statement()?);
            }
        }

        if self.accept(TokenKind::SfarsitDaca).is_none() {
            return Err(ParseError::MissingTerminator {
                keyword: "sfarsit_daca",
                construct: "structura alternativă curentă",
            });
        }

        Ok(Stmt::If(IfStmt {
            cond,
            then_block: Block { stmts: then_stmts },
            else_block: Block { stmts: else_stmts },
            span,
        }))
    }

    /// `pentru i <- a, b[, s] executa ... sfarsit_pentru`
    ///
    /// The step defaults to the literal `1` when the source omits it, so
    /// downstream passes always see four fixed child positions.
    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let span = self.current().span;
        self.expect(TokenKind::Pentru)?;

        if !self.at(TokenKind::Id) {
            return Err(ParseError::Expected {
                what: "o variabilă după 'pentru'".into(),
                line: span.line,
            });
        }
        let name_token = self.bump();
        let iterator = Ident {
            name: name_token.lexeme,
            span: name_token.span,
        };

        self.expect(TokenKind::Assign)?;
        let start = self.parse_expression()?;

        self.expect(TokenKind::Comma)?;
        let stop = self.parse_expression()?;

        let step = if self.accept(TokenKind::Comma).is_some() {
            self.parse_expression()?
        } else {
            Expr::literal(LiteralKind::Int, "1", Span::DUMMY)
        };

        if self.accept(TokenKind::Executa).is_none() {
            return Err(ParseError::Expected {
                what: "'executa'".into(),
                line: self.current_line(),
            });
        }

        let body = self.parse_block(TokenKind::SfarsitPentru)?;
        self.expect(TokenKind::SfarsitPentru)?;

        Ok(Stmt::For(ForStmt {
            iterator,
            start,
            stop,
            step,
            body,
            span,
        }))
    }

    /// `citeste id (, id)*`
    fn parse_read(&mut self) -> Result<Stmt, ParseError> {
        let span = self.current().span;
        self.expect(TokenKind::Citeste)?;

        if !self.at(TokenKind::Id) {
            return Err(ParseError::Expected {
                what: "un nume de variabilă după 'citeste'".into(),
                line: span.line,
            });
        }

        let mut targets = Vec::new();
        let first = self.bump();
        targets.push(Ident {
            name: first.lexeme,
            span: first.span,
        });

        while self.accept(TokenKind::Comma).is_some() {
            if !self.at(TokenKind::Id) {
                return Err(ParseError::Expected {
                    what: "variabilă după ','".into(),
                    line: self.current_line(),
                });
            }
            let token = self.bump();
            targets.push(Ident {
                name: token.lexeme,
                span: token.span,
            });
        }

        Ok(Stmt::Read(ReadStmt { targets, span }))
    }

    /// `scrie expr (, expr)*`
    fn parse_write(&mut self) -> Result<Stmt, ParseError> {
        let span = self.current().span;
        self.expect(TokenKind::Scrie)?;

        let mut values = vec![self.parse_expression()?];
        while self.accept(TokenKind::Comma).is_some() {
            values.push(self.parse_expression()?);
        }

        Ok(Stmt::Write(WriteStmt { values, span }))
    }
}
