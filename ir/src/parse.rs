//! Parser for the textual form produced by [`print`](crate::print).
//!
//! This is the external-text boundary used by IR injection: malformed input
//! surfaces as a [`Error::Parse`](crate::Error) with the offending position,
//! propagated verbatim to the caller.

use std::collections::HashMap;

use crate::attr::Attr;
use crate::builder::OpSpec;
use crate::error::{ParseSnafu, Result, ResultIndexOutOfRangeSnafu, UnknownValueSnafu};
use crate::module::Module;
use crate::op::{BlockId, OpId, Value};

/// Parse textual IR into a fresh module.
///
/// Accepts either an explicit `module { ... }` wrapper or a bare op list
/// (wrapped into an implicit module).
pub fn parse_module(text: &str) -> Result<Module> {
    let tokens = lex(text)?;
    let mut parser = Parser { tokens, pos: 0, module: Module::new(), values: HashMap::new() };
    parser.parse_top()?;
    Ok(parser.module)
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Int(i64),
    Str(String),
    ValueRef(String),
    Symbol(String),
    Caret,
    Colon,
    Eq,
    Comma,
    Dot,
    Hash,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Eof,
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    line: usize,
    column: usize,
}

fn lex(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let (mut line, mut column) = (1usize, 1usize);

    macro_rules! bump {
        () => {{
            let c = chars.next();
            if c == Some('\n') {
                line += 1;
                column = 1;
            } else if c.is_some() {
                column += 1;
            }
            c
        }};
    }

    while let Some(&c) = chars.peek() {
        let (tok_line, tok_column) = (line, column);
        match c {
            ' ' | '\t' | '\r' | '\n' => {
                bump!();
                continue;
            }
            '/' => {
                // Line comment.
                bump!();
                if chars.peek() != Some(&'/') {
                    return ParseSnafu { message: "unexpected `/`", line: tok_line, column: tok_column }.fail();
                }
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    bump!();
                }
                continue;
            }
            '"' => {
                bump!();
                let mut s = String::new();
                loop {
                    match bump!() {
                        Some('"') => break,
                        Some('\\') => match bump!() {
                            Some('n') => s.push('\n'),
                            Some('t') => s.push('\t'),
                            Some(c @ ('"' | '\\')) => s.push(c),
                            _ => {
                                return ParseSnafu { message: "invalid escape", line, column }.fail();
                            }
                        },
                        Some(c) => s.push(c),
                        None => {
                            return ParseSnafu { message: "unterminated string", line: tok_line, column: tok_column }
                                .fail();
                        }
                    }
                }
                tokens.push(Token { tok: Tok::Str(s), line: tok_line, column: tok_column });
            }
            '%' | '@' => {
                bump!();
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        bump!();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    return ParseSnafu {
                        message: format!("expected name after `{c}`"),
                        line: tok_line,
                        column: tok_column,
                    }
                    .fail();
                }
                let tok = if c == '%' { Tok::ValueRef(name) } else { Tok::Symbol(name) };
                tokens.push(Token { tok, line: tok_line, column: tok_column });
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut s = String::new();
                s.push(c);
                bump!();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() {
                        s.push(c);
                        bump!();
                    } else {
                        break;
                    }
                }
                let value = s.parse::<i64>().map_err(|_| {
                    ParseSnafu { message: format!("invalid integer `{s}`"), line: tok_line, column: tok_column }
                        .build()
                })?;
                tokens.push(Token { tok: Tok::Int(value), line: tok_line, column: tok_column });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut s = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        s.push(c);
                        bump!();
                    } else {
                        break;
                    }
                }
                tokens.push(Token { tok: Tok::Ident(s), line: tok_line, column: tok_column });
            }
            _ => {
                bump!();
                let tok = match c {
                    '^' => Tok::Caret,
                    ':' => Tok::Colon,
                    '=' => Tok::Eq,
                    ',' => Tok::Comma,
                    '.' => Tok::Dot,
                    '#' => Tok::Hash,
                    '(' => Tok::LParen,
                    ')' => Tok::RParen,
                    '{' => Tok::LBrace,
                    '}' => Tok::RBrace,
                    '[' => Tok::LBracket,
                    ']' => Tok::RBracket,
                    other => {
                        return ParseSnafu {
                            message: format!("unexpected character `{other}`"),
                            line: tok_line,
                            column: tok_column,
                        }
                        .fail();
                    }
                };
                tokens.push(Token { tok, line: tok_line, column: tok_column });
            }
        }
    }
    tokens.push(Token { tok: Tok::Eof, line, column });
    Ok(tokens)
}

#[derive(Debug, Clone)]
enum DefKind {
    Op { op: OpId, num_results: usize },
    Arg(Value),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    module: Module,
    values: HashMap<String, DefKind>,
}

impl Parser {
    fn peek(&self) -> &Tok {
        &self.tokens[self.pos].tok
    }

    fn peek_at(&self, offset: usize) -> &Tok {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index].tok
    }

    fn here(&self) -> (usize, usize) {
        let t = &self.tokens[self.pos];
        (t.line, t.column)
    }

    fn advance(&mut self) -> Tok {
        let tok = self.tokens[self.pos].tok.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T> {
        let (line, column) = self.here();
        ParseSnafu { message: message.into(), line, column }.fail()
    }

    fn expect(&mut self, tok: Tok, what: &str) -> Result<()> {
        if *self.peek() == tok {
            self.advance();
            Ok(())
        } else {
            self.error(format!("expected {what}"))
        }
    }

    fn parse_top(&mut self) -> Result<()> {
        let body = self.module.body();
        if let Tok::Ident(name) = self.peek()
            && name == "module"
            && !matches!(self.peek_at(1), Tok::Dot)
        {
            self.advance();
            if self.brace_is_attr_dict() {
                let attrs = self.parse_attr_dict()?;
                let root = self.module.root();
                for (key, value) in attrs {
                    self.module.op_mut(root).set_attr(key, value);
                }
            }
            if matches!(self.peek(), Tok::LBrace) {
                self.advance();
                self.parse_block_ops_until_rbrace(body)?;
            }
        } else {
            while !matches!(self.peek(), Tok::Eof) {
                self.parse_op(body)?;
            }
        }
        if matches!(self.peek(), Tok::Eof) { Ok(()) } else { self.error("expected end of input") }
    }

    /// Lookahead: does the upcoming `{ ... }` hold an attribute dictionary
    /// (first entry is `ident =`) rather than a region?
    fn brace_is_attr_dict(&self) -> bool {
        matches!(self.peek(), Tok::LBrace)
            && matches!(self.peek_at(1), Tok::Ident(_))
            && matches!(self.peek_at(2), Tok::Eq)
    }

    fn parse_op(&mut self, block: BlockId) -> Result<()> {
        // Optional result definition: `%name = ` or `%name:3 = `.
        let mut def: Option<(String, usize)> = None;
        if let Tok::ValueRef(name) = self.peek().clone() {
            self.advance();
            let num_results = if matches!(self.peek(), Tok::Colon) {
                self.advance();
                match self.advance() {
                    Tok::Int(n) if n > 0 => n as usize,
                    _ => return self.error("expected result count after `:`"),
                }
            } else {
                1
            };
            self.expect(Tok::Eq, "`=` after result definition")?;
            def = Some((name, num_results));
        }

        let name = self.parse_op_name()?;

        let mut spec = OpSpec::new(name);
        if let Tok::Symbol(sym) = self.peek().clone() {
            self.advance();
            spec = spec.attr("sym_name", Attr::str(sym));
        }

        if matches!(self.peek(), Tok::LParen) {
            self.advance();
            while !matches!(self.peek(), Tok::RParen) {
                let operand = self.parse_value_ref()?;
                spec = spec.operand(operand);
                if matches!(self.peek(), Tok::Comma) {
                    self.advance();
                }
            }
            self.advance();
        }

        if self.brace_is_attr_dict() {
            for (key, value) in self.parse_attr_dict()? {
                spec = spec.attr(key, value);
            }
        }

        if let Some((_, num_results)) = &def {
            spec = spec.results(*num_results);
        }

        let op = self.module.create_op(spec);
        self.module.insert_at_end(block, op);
        if let Some((name, num_results)) = def {
            self.values.insert(name, DefKind::Op { op, num_results });
        }

        let mut region = 0usize;
        while matches!(self.peek(), Tok::LBrace) {
            self.advance();
            self.module.op_mut(op).regions.push(Vec::new());
            self.parse_region_body(op, region)?;
            region += 1;
        }
        Ok(())
    }

    fn parse_op_name(&mut self) -> Result<String> {
        let mut name = match self.advance() {
            Tok::Ident(s) => s,
            _ => return self.error("expected op name"),
        };
        while matches!(self.peek(), Tok::Dot) {
            self.advance();
            match self.advance() {
                Tok::Ident(s) => {
                    name.push('.');
                    name.push_str(&s);
                }
                _ => return self.error("expected identifier after `.`"),
            }
        }
        Ok(name)
    }

    fn parse_value_ref(&mut self) -> Result<Value> {
        let (line, column) = self.here();
        let name = match self.advance() {
            Tok::ValueRef(name) => name,
            _ => return self.error("expected value reference"),
        };
        let index = if matches!(self.peek(), Tok::Hash) {
            self.advance();
            match self.advance() {
                Tok::Int(n) if n >= 0 => n as usize,
                _ => return self.error("expected result index after `#`"),
            }
        } else {
            0
        };
        match self.values.get(&name) {
            Some(DefKind::Op { op, num_results }) => {
                if index >= *num_results {
                    return ResultIndexOutOfRangeSnafu { name, index, count: *num_results, line, column }.fail();
                }
                Ok(Value::Result { op: *op, index })
            }
            Some(DefKind::Arg(value)) if index == 0 => Ok(*value),
            Some(DefKind::Arg(_)) => self.error("block arguments have no result index"),
            None => UnknownValueSnafu { name, line, column }.fail(),
        }
    }

    /// Parse region content after the opening `{`.
    fn parse_region_body(&mut self, op: OpId, region: usize) -> Result<()> {
        let mut block: Option<BlockId> = None;
        loop {
            match self.peek().clone() {
                Tok::RBrace => {
                    self.advance();
                    if block.is_none() {
                        self.module.append_block(op, region, 0);
                    }
                    return Ok(());
                }
                Tok::Caret => {
                    self.advance();
                    self.expect(Tok::LParen, "`(` after `^`")?;
                    let mut names = Vec::new();
                    while let Tok::ValueRef(name) = self.peek().clone() {
                        self.advance();
                        names.push(name);
                        if matches!(self.peek(), Tok::Comma) {
                            self.advance();
                        }
                    }
                    self.expect(Tok::RParen, "`)` after block arguments")?;
                    self.expect(Tok::Colon, "`:` after block header")?;
                    let new_block = self.module.append_block(op, region, names.len());
                    for (index, name) in names.into_iter().enumerate() {
                        self.values.insert(name, DefKind::Arg(Value::Arg { block: new_block, index }));
                    }
                    block = Some(new_block);
                }
                Tok::Eof => return self.error("unexpected end of input in region"),
                _ => {
                    let target = match block {
                        Some(b) => b,
                        None => {
                            let b = self.module.append_block(op, region, 0);
                            block = Some(b);
                            b
                        }
                    };
                    self.parse_op(target)?;
                }
            }
        }
    }

    fn parse_block_ops_until_rbrace(&mut self, block: BlockId) -> Result<()> {
        loop {
            match self.peek() {
                Tok::RBrace => {
                    self.advance();
                    return Ok(());
                }
                Tok::Eof => return self.error("unexpected end of input in module body"),
                _ => self.parse_op(block)?,
            }
        }
    }

    fn parse_attr_dict(&mut self) -> Result<Vec<(String, Attr)>> {
        self.expect(Tok::LBrace, "`{`")?;
        let mut attrs = Vec::new();
        loop {
            match self.advance() {
                Tok::RBrace => return Ok(attrs),
                Tok::Ident(key) => {
                    self.expect(Tok::Eq, "`=` in attribute")?;
                    let value = self.parse_attr_value()?;
                    attrs.push((key, value));
                    if matches!(self.peek(), Tok::Comma) {
                        self.advance();
                    }
                }
                _ => return self.error("expected attribute name or `}`"),
            }
        }
    }

    fn parse_attr_value(&mut self) -> Result<Attr> {
        match self.advance() {
            Tok::Ident(s) if s == "true" => Ok(Attr::Bool(true)),
            Tok::Ident(s) if s == "false" => Ok(Attr::Bool(false)),
            Tok::Int(v) => Ok(Attr::Int(v)),
            Tok::Str(s) => Ok(Attr::Str(s)),
            Tok::Symbol(s) => Ok(Attr::SymbolRef(s)),
            Tok::LBracket => {
                if matches!(self.peek(), Tok::LBracket) {
                    let mut rows = Vec::new();
                    while !matches!(self.peek(), Tok::RBracket) {
                        self.expect(Tok::LBracket, "`[`")?;
                        rows.push(self.parse_int_list_until_rbracket()?);
                        if matches!(self.peek(), Tok::Comma) {
                            self.advance();
                        }
                    }
                    self.advance();
                    Ok(Attr::IntArrayArray(rows))
                } else {
                    Ok(Attr::IntArray(self.parse_int_list_until_rbracket()?))
                }
            }
            _ => self.error("expected attribute value"),
        }
    }

    fn parse_int_list_until_rbracket(&mut self) -> Result<Vec<i64>> {
        let mut values = Vec::new();
        loop {
            match self.advance() {
                Tok::RBracket => return Ok(values),
                Tok::Int(v) => {
                    values.push(v);
                    if matches!(self.peek(), Tok::Comma) {
                        self.advance();
                    }
                }
                _ => return self.error("expected integer or `]`"),
            }
        }
    }
}
