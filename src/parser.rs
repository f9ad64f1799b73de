//! Recursive-descent parser with panic-mode recovery.

use std::rc::Rc;

use crate::ast::{BinaryOp, Expr, LogicalOp, Stmt, UnaryOp};
use crate::ctx::Context;
use crate::diag::Diagnostic;
use crate::token::{Literal, Token, TokenKind};
use crate::value::Value;

type ParseResult<T> = Result<T, Diagnostic>;

/// Consumes a scanned token buffer and produces the statement AST.
///
/// Syntax errors are recorded as diagnostics; after each failed statement
/// the parser synchronizes at the next statement boundary and keeps going,
/// so one invocation reports as many errors as possible.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    ctx: Rc<Context>,
    diags: Vec<Diagnostic>,
}

impl Parser {
    /// The token buffer must end with an `Eof` token, as produced by
    /// `Scanner::scan_tokens`.
    pub fn new(tokens: Vec<Token>, ctx: Rc<Context>) -> Parser {
        Parser {
            tokens,
            current: 0,
            ctx,
            diags: Vec::new(),
        }
    }

    /// Parses a whole program. The diagnostics vector is empty exactly when
    /// the program parsed cleanly.
    pub fn parse_program(mut self) -> (Vec<Stmt>, Vec<Diagnostic>) {
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            match self.statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(diag) => {
                    self.diags.push(diag);
                    self.synchronize();
                }
            }
        }
        (stmts, self.diags)
    }

    /// Parses a single expression, for the `evaluate` pipeline mode.
    pub fn parse_expression(mut self) -> Result<Expr, Vec<Diagnostic>> {
        match self.expression() {
            Ok(expr) if self.diags.is_empty() => Ok(expr),
            Ok(_) => Err(self.diags),
            Err(diag) => {
                self.diags.push(diag);
                Err(self.diags)
            }
        }
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        match self.peek().kind {
            TokenKind::Print => {
                self.advance();
                self.print_statement()
            }
            TokenKind::Var => {
                self.advance();
                self.var_declaration()
            }
            TokenKind::LeftBrace => {
                self.advance();
                self.block()
            }
            TokenKind::If => {
                self.advance();
                self.if_statement()
            }
            TokenKind::While => {
                self.advance();
                self.while_statement()
            }
            TokenKind::For => {
                self.advance();
                self.for_statement()
            }
            _ => self.expression_statement(),
        }
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(Box::new(expr)))
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name_token = self
            .consume(TokenKind::Identifier, "Expect variable name.")?
            .clone();
        let name = self.ctx.symbol(&name_token.lexeme);

        let init = if self.matches(TokenKind::Equal) {
            Some(Box::new(self.expression()?))
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::VarDecl(name, init))
    }

    fn block(&mut self) -> ParseResult<Stmt> {
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            match self.statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(diag) => {
                    self.diags.push(diag);
                    self.synchronize();
                }
            }
        }
        self.consume(TokenKind::RightBrace, "Expect '}'.")?;
        Ok(Stmt::Block(stmts))
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let cond = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(TokenKind::Else) {
            // A declaration is not a valid branch body.
            if self.check(TokenKind::Var) {
                return Err(self.error_at_peek("Expect expression."));
            }
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If(Box::new(cond), then_branch, else_branch))
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let cond = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after while condition.")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While(Box::new(cond), body))
    }

    /// `for` has no AST node; it lowers to `while` wrapped in blocks.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(TokenKind::Semicolon) {
            None
        } else if self.matches(TokenKind::Var) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(TokenKind::Semicolon) {
            Expr::Literal(Value::Bool(true))
        } else {
            self.expression()?
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;
        if let Some(inc) = increment {
            body = Stmt::Block(vec![body, Stmt::Expr(Box::new(inc))]);
        }
        body = Stmt::While(Box::new(condition), Box::new(body));
        if let Some(init) = initializer {
            body = Stmt::Block(vec![init, body]);
        }
        Ok(body)
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expr(Box::new(expr)))
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.logic_or()?;
        if self.check(TokenKind::Equal) {
            let equals = self.advance().clone();
            let value = self.assignment()?;
            return match expr {
                Expr::Variable(name, line) => Ok(Expr::Assign(name, Box::new(value), line)),
                other => {
                    // Reported without aborting the parse.
                    self.diags.push(Diagnostic::at_lexeme(
                        equals.line,
                        &equals.lexeme,
                        "Invalid assignment target.",
                    ));
                    Ok(other)
                }
            };
        }
        Ok(expr)
    }

    fn logic_or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.logic_and()?;
        while self.matches(TokenKind::Or) {
            let rhs = self.logic_and()?;
            expr = Expr::Logical(LogicalOp::Or, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn logic_and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.matches(TokenKind::And) {
            let rhs = self.equality()?;
            expr = Expr::Logical(LogicalOp::And, Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::EqualEqual => BinaryOp::Equal,
                TokenKind::BangEqual => BinaryOp::NotEqual,
                _ => break,
            };
            let line = self.advance().line;
            let rhs = self.comparison()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs), line);
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Greater => BinaryOp::Greater,
                TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
                TokenKind::Less => BinaryOp::Less,
                TokenKind::LessEqual => BinaryOp::LessEqual,
                _ => break,
            };
            let line = self.advance().line;
            let rhs = self.term()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs), line);
        }
        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => break,
            };
            let line = self.advance().line;
            let rhs = self.factor()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs), line);
        }
        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                _ => break,
            };
            let line = self.advance().line;
            let rhs = self.unary()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs), line);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        let op = match self.peek().kind {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Negate,
            _ => return self.primary(),
        };
        let line = self.advance().line;
        let operand = self.unary()?;
        Ok(Expr::Unary(op, Box::new(operand), line))
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal(Value::Bool(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal(Value::Bool(false)))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Expr::Literal(Value::Nil))
            }
            TokenKind::Number => {
                self.advance();
                let n = match token.literal {
                    Some(Literal::Number(repr)) => repr
                        .parse::<f64>()
                        .expect("scanner produced an unparseable number literal"),
                    _ => panic!("number token without a numeric literal"),
                };
                Ok(Expr::Literal(Value::Number(n)))
            }
            TokenKind::Str => {
                self.advance();
                let content = match token.literal {
                    Some(Literal::Str(content)) => content,
                    _ => panic!("string token without a string literal"),
                };
                Ok(Expr::Literal(Value::Str(Rc::from(content))))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::Variable(self.ctx.symbol(&token.lexeme), token.line))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
                Ok(Expr::Grouping(Box::new(expr)))
            }
            _ => Err(self.error_at_token(&token, "Expect expression.")),
        }
    }

    /// Discards tokens until just past a `;` or before a statement keyword.
    fn synchronize(&mut self) {
        if self.is_at_end() {
            return;
        }
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn error_at_token(&self, token: &Token, message: &str) -> Diagnostic {
        if token.kind == TokenKind::Eof {
            Diagnostic::at_end(token.line, message)
        } else {
            Diagnostic::at_lexeme(token.line, &token.lexeme, message)
        }
    }

    fn error_at_peek(&self, message: &str) -> Diagnostic {
        self.error_at_token(self.peek(), message)
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<&Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_at_peek(message))
        }
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }
}
