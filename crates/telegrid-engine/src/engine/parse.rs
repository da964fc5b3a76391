//! Recursive-descent formula parser.
//!
//! Turns a formula body (the text after the `=` marker) into an [`Expr`]
//! tree. Grammar: decimal literals, cell references, the allow-listed
//! constants and functions, binary `+ - * / %`, unary sign, parentheses.
//! `%` is the binary modulo operator.

use super::ast::{BinaryOp, Constant, Expr, Function};
use super::cell_ref::CellRef;
use crate::error::{FormulaError, FormulaResult};

/// Parse a formula body into an expression tree.
pub fn parse_expression(input: &str) -> FormulaResult<Expr> {
    let mut parser = Parser::new(input)?;
    let expr = parser.parse_expr()?;
    if !matches!(parser.current(), Token::Eof) {
        return Err(FormulaError::Parse(format!(
            "unexpected {} after expression",
            parser.current().describe()
        )));
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Comma,
    LeftParen,
    RightParen,
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Ident(name) => format!("'{}'", name),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Percent => "'%'".to_string(),
            Token::Comma => "','".to_string(),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Eof => "end of formula".to_string(),
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    current: Token,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> FormulaResult<Self> {
        let mut parser = Parser {
            input,
            pos: 0,
            current: Token::Eof,
        };
        parser.current = parser.scan_token()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn scan_token(&mut self) -> FormulaResult<Token> {
        self.skip_whitespace();

        let Some(c) = self.peek_char() else {
            return Ok(Token::Eof);
        };

        match c {
            '+' => {
                self.advance();
                return Ok(Token::Plus);
            }
            '-' => {
                self.advance();
                return Ok(Token::Minus);
            }
            '*' => {
                self.advance();
                return Ok(Token::Star);
            }
            '/' => {
                self.advance();
                return Ok(Token::Slash);
            }
            '%' => {
                self.advance();
                return Ok(Token::Percent);
            }
            ',' => {
                self.advance();
                return Ok(Token::Comma);
            }
            '(' => {
                self.advance();
                return Ok(Token::LeftParen);
            }
            ')' => {
                self.advance();
                return Ok(Token::RightParen);
            }
            _ => {}
        }

        if c.is_ascii_digit() || (c == '.' && self.peek_char_at(1).is_some_and(|c| c.is_ascii_digit())) {
            return self.scan_number();
        }

        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.scan_identifier());
        }

        Err(FormulaError::Parse(format!("unexpected character '{}'", c)))
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek_char().is_some_and(|c| c == 'e' || c == 'E') {
            // Only consume the exponent marker when digits actually follow.
            let mut lookahead = 1;
            if self
                .peek_char_at(1)
                .is_some_and(|c| c == '+' || c == '-')
            {
                lookahead = 2;
            }
            if self.peek_char_at(lookahead).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..lookahead {
                    self.advance();
                }
                while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let num_str = &self.input[start..self.pos];
        let num = num_str
            .parse::<f64>()
            .map_err(|_| FormulaError::Parse(format!("malformed number '{}'", num_str)))?;
        Ok(Token::Number(num))
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek_char()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        Token::Ident(self.input[start..self.pos].to_string())
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current(&self) -> &Token {
        &self.current
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = std::mem::replace(&mut self.current, Token::Eof);
        self.current = self.scan_token()?;
        Ok(token)
    }

    fn expect_right_paren(&mut self) -> FormulaResult<()> {
        if matches!(self.current(), Token::RightParen) {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "expected ')', got {}",
                self.current().describe()
            )))
        }
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, -
    // 2. Multiplication/Division/Modulo: *, /, %
    // 3. Unary sign: -, +
    // 4. Primary: literals, references, constants, calls, parentheses

    fn parse_expr(&mut self) -> FormulaResult<Expr> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Rem,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        if matches!(self.current(), Token::Minus) {
            self.consume()?;
            let operand = self.parse_unary()?;
            return Ok(Expr::Negate(Box::new(operand)));
        }

        // Prefix plus is a no-op.
        if matches!(self.current(), Token::Plus) {
            self.consume()?;
            return self.parse_unary();
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> FormulaResult<Expr> {
        match self.current().clone() {
            Token::Number(n) => {
                self.consume()?;
                Ok(Expr::Number(n))
            }

            Token::LeftParen => {
                self.consume()?;
                let expr = self.parse_expr()?;
                self.expect_right_paren()?;
                Ok(expr)
            }

            Token::Ident(name) => {
                self.consume()?;
                if matches!(self.current(), Token::LeftParen) {
                    return self.parse_call(&name);
                }
                if let Some(cell_ref) = CellRef::from_str(&name) {
                    return Ok(Expr::Reference(cell_ref));
                }
                if let Some(constant) = Constant::from_name(&name) {
                    return Ok(Expr::Constant(constant));
                }
                Err(FormulaError::UnknownIdentifier(name))
            }

            token => Err(FormulaError::Parse(format!(
                "expected an expression, got {}",
                token.describe()
            ))),
        }
    }

    fn parse_call(&mut self, name: &str) -> FormulaResult<Expr> {
        let Some(function) = Function::from_name(name) else {
            return Err(FormulaError::UnknownFunction(name.to_string()));
        };

        self.consume()?; // '('
        let mut args = Vec::new();
        if !matches!(self.current(), Token::RightParen) {
            loop {
                args.push(self.parse_expr()?);
                if matches!(self.current(), Token::Comma) {
                    self.consume()?;
                } else {
                    break;
                }
            }
        }
        self.expect_right_paren()?;

        Ok(Expr::Call { function, args })
    }
}
