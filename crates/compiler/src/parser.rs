//! Recursive-descent parser producing the syntax tree.
//!
//! Binary operators use precedence climbing with Lua's priorities; see
//! [`BinOp::priority`].

use crate::ast::{BinOp, Block, Call, Expr, FunctionDecl, Stat, UnOp, UNARY_PRIORITY};
use crate::error::CompileError;
use crate::lexer::{Spanned, Token};
use moonlet_common::opcode::MAX_COUNT;

/// Deepest nesting of blocks and expressions accepted. Every operator or
/// call appended to a chain counts as one more level, because code
/// generation walks the resulting tree recursively.
pub const MAX_NESTING: usize = 200;

/// Longest argument, parameter or return list.
const MAX_LIST: usize = MAX_COUNT as usize;

pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    /// Number of enclosing function bodies.
    function_depth: usize,
    /// Current block and expression nesting.
    depth: usize,
}

/// Parse a whole chunk.
pub fn parse(tokens: Vec<Spanned>) -> Result<Block, CompileError> {
    let mut parser = Parser::new(tokens);
    let block = parser.block()?;
    parser.expect(Token::Eof, "end of input")?;
    Ok(block)
}

impl Parser {
    pub fn new(mut tokens: Vec<Spanned>) -> Self {
        if !matches!(tokens.last(), Some(Spanned { token: Token::Eof, .. })) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Spanned {
                token: Token::Eof,
                line,
            });
        }
        Self {
            tokens,
            pos: 0,
            function_depth: 0,
            depth: 0,
        }
    }

    // ---- Token cursor ----

    fn peek(&self) -> &Token {
        &self.current().token
    }

    fn current(&self) -> &Spanned {
        // The trailing Eof is never consumed past.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn line(&self) -> usize {
        self.current().line
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == token
    }

    fn accept(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), CompileError> {
        if self.accept(&token) {
            Ok(())
        } else {
            Err(self.error_expected(expected))
        }
    }

    fn expect_name(&mut self) -> Result<String, CompileError> {
        match self.peek() {
            Token::Name(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error_expected("a name")),
        }
    }

    fn error_expected(&self, expected: &'static str) -> CompileError {
        CompileError::Expected {
            line: self.line(),
            expected,
            found: self.peek().to_string(),
        }
    }

    /// Go one nesting level deeper. Callers restore `depth` on success;
    /// an error ends the parse.
    fn enter(&mut self) -> Result<(), CompileError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(CompileError::TooDeep {
                line: self.line(),
                limit: MAX_NESTING,
            });
        }
        Ok(())
    }

    fn check_list(&self, len: usize, what: &'static str, line: usize) -> Result<(), CompileError> {
        if len > MAX_LIST {
            return Err(CompileError::TooMany {
                line,
                what,
                limit: MAX_LIST,
            });
        }
        Ok(())
    }

    fn unsupported(&self, feature: &'static str) -> CompileError {
        CompileError::Unsupported {
            line: self.line(),
            feature,
        }
    }

    // ---- Blocks and statements ----

    fn block_follows(&self) -> bool {
        matches!(
            self.peek(),
            Token::End | Token::Else | Token::Elseif | Token::Until | Token::Eof
        )
    }

    fn block(&mut self) -> Result<Block, CompileError> {
        self.enter()?;
        let mut stats = Vec::new();

        while !self.block_follows() {
            if self.check(&Token::Return) {
                stats.push(self.return_stat()?);
                break;
            }
            if let Some(stat) = self.statement()? {
                stats.push(stat);
            }
        }

        self.depth -= 1;
        Ok(Block::new(stats))
    }

    fn return_stat(&mut self) -> Result<Stat, CompileError> {
        let line = self.line();
        self.advance();
        if self.function_depth == 0 {
            return Err(CompileError::ReturnOutsideFunction { line });
        }

        let values = if self.block_follows() || self.check(&Token::Semicolon) {
            Vec::new()
        } else {
            self.expr_list()?
        };
        self.check_list(values.len(), "return values", line)?;
        self.accept(&Token::Semicolon);

        if !self.block_follows() {
            return Err(self.error_expected("end of block after 'return'"));
        }
        Ok(Stat::Return(values))
    }

    fn statement(&mut self) -> Result<Option<Stat>, CompileError> {
        let stat = match self.peek() {
            Token::Semicolon => {
                self.advance();
                return Ok(None);
            }
            Token::If => self.if_stat()?,
            Token::While => self.while_stat()?,
            Token::Do => {
                self.advance();
                let body = self.block()?;
                self.expect(Token::End, "'end'")?;
                Stat::Do(body)
            }
            Token::For => self.for_stat()?,
            Token::Function => {
                self.advance();
                Stat::Function(self.function_body(false)?)
            }
            Token::Local => {
                self.advance();
                if self.accept(&Token::Function) {
                    Stat::Function(self.function_body(true)?)
                } else {
                    self.local_stat()?
                }
            }
            Token::Break => return Err(self.unsupported("break statements")),
            Token::Goto => return Err(self.unsupported("goto statements")),
            Token::Repeat => return Err(self.unsupported("repeat-until loops")),
            _ => self.expr_stat()?,
        };
        Ok(Some(stat))
    }

    fn if_stat(&mut self) -> Result<Stat, CompileError> {
        let mut branches = Vec::new();

        self.advance();
        loop {
            let cond = self.expr()?;
            self.expect(Token::Then, "'then'")?;
            branches.push((cond, self.block()?));
            if !self.accept(&Token::Elseif) {
                break;
            }
        }

        let else_block = if self.accept(&Token::Else) {
            Some(self.block()?)
        } else {
            None
        };
        self.expect(Token::End, "'end'")?;

        Ok(Stat::If {
            branches,
            else_block,
        })
    }

    fn while_stat(&mut self) -> Result<Stat, CompileError> {
        self.advance();
        let cond = self.expr()?;
        self.expect(Token::Do, "'do'")?;
        let body = self.block()?;
        self.expect(Token::End, "'end'")?;
        Ok(Stat::While { cond, body })
    }

    fn for_stat(&mut self) -> Result<Stat, CompileError> {
        self.advance();
        let var = self.expect_name()?;
        if self.check(&Token::Comma) || self.check(&Token::In) {
            return Err(self.unsupported("generic for loops"));
        }
        self.expect(Token::Assign, "'='")?;
        let start = self.expr()?;
        self.expect(Token::Comma, "','")?;
        let end = self.expr()?;
        let step = if self.accept(&Token::Comma) {
            Some(self.expr()?)
        } else {
            None
        };
        self.expect(Token::Do, "'do'")?;
        let body = self.block()?;
        self.expect(Token::End, "'end'")?;

        Ok(Stat::NumericFor {
            var,
            start,
            end,
            step,
            body,
        })
    }

    /// After `function` (or `local function`): name, parameters, body, `end`.
    fn function_body(&mut self, local: bool) -> Result<FunctionDecl, CompileError> {
        let line = self.line();
        let name = self.expect_name()?;
        if self.check(&Token::Dot) || self.check(&Token::Colon) {
            return Err(self.unsupported("method declarations"));
        }

        self.expect(Token::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                params.push(self.expect_name()?);
                if !self.accept(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RParen, "')'")?;
        self.check_list(params.len(), "parameters", line)?;

        self.function_depth += 1;
        let body = self.block();
        self.function_depth -= 1;
        let body = body?;
        self.expect(Token::End, "'end'")?;

        Ok(FunctionDecl {
            name,
            params,
            body,
            local,
        })
    }

    fn local_stat(&mut self) -> Result<Stat, CompileError> {
        let mut names = vec![self.expect_name()?];
        while self.accept(&Token::Comma) {
            names.push(self.expect_name()?);
        }
        let values = if self.accept(&Token::Assign) {
            self.expr_list()?
        } else {
            Vec::new()
        };
        Ok(Stat::Local { names, values })
    }

    /// A call statement or an assignment.
    fn expr_stat(&mut self) -> Result<Stat, CompileError> {
        let line = self.line();
        let first = self.suffixed_expr()?;

        if self.check(&Token::Assign) || self.check(&Token::Comma) {
            let mut targets = vec![assignment_target(first, line)?];
            while self.accept(&Token::Comma) {
                let line = self.line();
                let target = self.suffixed_expr()?;
                targets.push(assignment_target(target, line)?);
            }
            self.expect(Token::Assign, "'='")?;
            let values = self.expr_list()?;
            return Ok(Stat::Assign { targets, values });
        }

        match first {
            Expr::Call(call) => Ok(Stat::Call(call)),
            _ => Err(CompileError::NotAStatement {
                line,
                found: self.peek().to_string(),
            }),
        }
    }

    // ---- Expressions ----

    fn expr_list(&mut self) -> Result<Vec<Expr>, CompileError> {
        let mut exprs = vec![self.expr()?];
        while self.accept(&Token::Comma) {
            exprs.push(self.expr()?);
        }
        Ok(exprs)
    }

    pub fn expr(&mut self) -> Result<Expr, CompileError> {
        self.sub_expr(0)
    }

    /// Parse operators whose left priority is above `limit`.
    fn sub_expr(&mut self, limit: u8) -> Result<Expr, CompileError> {
        let entry = self.depth;
        self.enter()?;
        let mut lhs = match unary_op(self.peek()) {
            Some(op) => {
                self.advance();
                let operand = self.sub_expr(UNARY_PRIORITY)?;
                Expr::Unary {
                    op,
                    operand: Box::new(operand),
                }
            }
            None => self.simple_expr()?,
        };

        while let Some(op) = binary_op(self.peek()) {
            let (left, right) = op.priority();
            if left <= limit {
                break;
            }
            self.advance();
            self.enter()?;
            let rhs = self.sub_expr(right)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        self.depth = entry;
        Ok(lhs)
    }

    fn simple_expr(&mut self) -> Result<Expr, CompileError> {
        let expr = match self.peek() {
            Token::Nil => Expr::Nil,
            Token::True => Expr::True,
            Token::False => Expr::False,
            Token::Number(n) => Expr::Number(*n),
            Token::Str(s) => Expr::Str(s.clone()),
            Token::Function => return Err(self.unsupported("anonymous functions")),
            Token::LBrace => return Err(self.unsupported("tables")),
            _ => return self.suffixed_expr(),
        };
        self.advance();
        Ok(expr)
    }

    /// A name or parenthesized expression followed by any number of calls.
    fn suffixed_expr(&mut self) -> Result<Expr, CompileError> {
        let entry = self.depth;
        let mut expr = match self.peek() {
            Token::Name(name) => {
                let name = name.clone();
                self.advance();
                Expr::Name(name)
            }
            Token::LParen => {
                self.advance();
                let inner = self.expr()?;
                self.expect(Token::RParen, "')'")?;
                inner
            }
            _ => return Err(self.error_expected("an expression")),
        };

        loop {
            match self.peek() {
                Token::LParen => {
                    let line = self.line();
                    self.advance();
                    self.enter()?;
                    let args = if self.check(&Token::RParen) {
                        Vec::new()
                    } else {
                        self.expr_list()?
                    };
                    self.expect(Token::RParen, "')'")?;
                    self.check_list(args.len(), "arguments", line)?;
                    expr = Expr::Call(Call {
                        callee: Box::new(expr),
                        args,
                    });
                }
                Token::Str(s) => {
                    let arg = Expr::Str(s.clone());
                    self.advance();
                    self.enter()?;
                    expr = Expr::Call(Call {
                        callee: Box::new(expr),
                        args: vec![arg],
                    });
                }
                Token::Dot | Token::Colon | Token::LBracket => {
                    return Err(self.unsupported("tables"));
                }
                _ => {
                    self.depth = entry;
                    return Ok(expr);
                }
            }
        }
    }

    #[cfg(test)]
    fn at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }
}

fn assignment_target(expr: Expr, line: usize) -> Result<String, CompileError> {
    match expr {
        Expr::Name(name) => Ok(name),
        _ => Err(CompileError::InvalidAssignmentTarget { line }),
    }
}

fn unary_op(token: &Token) -> Option<UnOp> {
    match token {
        Token::Minus => Some(UnOp::Neg),
        Token::Not => Some(UnOp::Not),
        _ => None,
    }
}

fn binary_op(token: &Token) -> Option<BinOp> {
    Some(match token {
        Token::Plus => BinOp::Add,
        Token::Minus => BinOp::Sub,
        Token::Star => BinOp::Mul,
        Token::Slash => BinOp::Div,
        Token::DotDot => BinOp::Concat,
        Token::EqEq => BinOp::Eq,
        Token::NotEq => BinOp::Ne,
        Token::Lt => BinOp::Lt,
        Token::LtEq => BinOp::Le,
        Token::Gt => BinOp::Gt,
        Token::GtEq => BinOp::Ge,
        Token::And => BinOp::And,
        Token::Or => BinOp::Or,
        _ => return None,
    })
}
