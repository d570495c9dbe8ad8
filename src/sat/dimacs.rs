//! DIMACS CNF parsing.
//!
//! The independent-support driver needs the formula as plain data — not
//! streamed straight into a solver — because it has to instantiate the same
//! clause set twice, at two different variable offsets, to build the
//! duplicated formula `F ⊕ F'`. This also recognises MiniSat's `c ind ...`
//! convention for declaring the sampling set in the header comments.

use std::fs;
use std::io::{self, Read};
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

use flate2::read::GzDecoder;

use crate::error::{AppError, Result};

/// A parsed CNF instance: variables are still plain signed DIMACS integers
/// (1-based, sign encodes polarity). Callers shift them onto `Lit`s with
/// whatever offset they need via `Lit::from_dimacs`.
#[derive(Debug, Default, Clone)]
pub struct Cnf {
    pub num_vars: usize,
    pub clauses: Vec<Vec<i32>>,
    /// The sampling set declared by `c ind v1 v2 ... 0` header lines, if
    /// any were present. `None` means "no declaration found" — the caller
    /// decides what that implies (commonly: the whole variable range).
    pub sampling_set: Option<Vec<i32>>,
}

pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Cnf> {
    let path = path.as_ref();
    let read = |path: &Path| -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        fs::File::open(path)?.read_to_end(&mut buf)?;
        Ok(buf)
    };
    let bytes = read(path).map_err(|source| AppError::Io { path: path.display().to_string(), source })?;

    let text = if bytes.len() >= 2 && bytes[0] == 0x1f && bytes[1] == 0x8b {
        let mut gz = GzDecoder::new(&bytes[..]);
        let mut s = String::new();
        gz.read_to_string(&mut s)
            .map_err(|source| AppError::Io { path: path.display().to_string(), source })?;
        s
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    };

    parse(&text)
}

pub fn parse(text: &str) -> Result<Cnf> {
    let mut p = Parser::new(text);
    p.parse()
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    offset: usize,
    declared_vars: usize,
    declared_clauses: usize,
    max_var_seen: usize,
    clauses: Vec<Vec<i32>>,
    sampling_set: Option<Vec<i32>>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Parser {
            chars: text.chars().peekable(),
            offset: 0,
            declared_vars: 0,
            declared_clauses: 0,
            max_var_seen: 0,
            clauses: Vec::new(),
            sampling_set: None,
        }
    }

    fn err(&self, message: impl Into<String>) -> AppError {
        AppError::Dimacs { offset: self.offset, message: message.into() }
    }

    fn bump(&mut self) -> Option<char> {
        self.offset += 1;
        self.chars.next()
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn consume_literal(&mut self, target: &str) -> Result<()> {
        for tc in target.chars() {
            match self.peek() {
                Some(c) if c == tc => {
                    self.bump();
                }
                _ => return Err(self.err(format!("expected '{}'", target))),
            }
        }
        Ok(())
    }

    fn read_uint(&mut self) -> Result<usize> {
        self.skip_whitespace();
        let mut len = 0usize;
        let mut value = 0usize;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            value = value * 10 + d as usize;
            len += 1;
            self.bump();
        }
        if len == 0 {
            return Err(self.err("expected an unsigned integer"));
        }
        Ok(value)
    }

    fn read_int(&mut self) -> Result<i32> {
        self.skip_whitespace();
        let sign = match self.peek() {
            Some('+') => {
                self.bump();
                1
            }
            Some('-') => {
                self.bump();
                -1
            }
            _ => 1,
        };
        let value = self.read_uint()? as i32;
        Ok(sign * value)
    }

    /// A `c ind` line declares (part of) the sampling set, terminated by a
    /// trailing `0`; multiple such lines accumulate into one set.
    fn parse_ind_line(&mut self) -> Result<()> {
        let mut vars = self.sampling_set.take().unwrap_or_default();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => {
                    let v = self.read_int()?;
                    if v == 0 {
                        break;
                    }
                    vars.push(v);
                }
                _ => break,
            }
        }
        self.skip_line();
        self.sampling_set = Some(vars);
        Ok(())
    }

    fn parse_comment_or_header(&mut self) -> Result<bool> {
        self.skip_whitespace();
        match self.peek() {
            Some('c') => {
                self.bump();
                self.skip_whitespace();
                if self.try_consume_word("ind") {
                    self.parse_ind_line()?;
                } else {
                    self.skip_line();
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn try_consume_word(&mut self, word: &str) -> bool {
        let saved = self.chars.clone();
        let saved_offset = self.offset;
        for wc in word.chars() {
            if self.peek() != Some(wc) {
                self.chars = saved;
                self.offset = saved_offset;
                return false;
            }
            self.bump();
        }
        match self.peek() {
            None => true,
            Some(c) if c.is_whitespace() => true,
            _ => {
                self.chars = saved;
                self.offset = saved_offset;
                false
            }
        }
    }

    fn parse_clause(&mut self) -> Result<Vec<i32>> {
        let mut lits = Vec::new();
        loop {
            let lit = self.read_int()?;
            if lit == 0 {
                return Ok(lits);
            }
            self.max_var_seen = self.max_var_seen.max(lit.unsigned_abs() as usize);
            lits.push(lit);
        }
    }

    fn parse(&mut self) -> Result<Cnf> {
        while self.parse_comment_or_header()? {}

        self.consume_literal("p cnf")?;
        self.declared_vars = self.read_uint()?;
        self.declared_clauses = self.read_uint()?;

        loop {
            while self.parse_comment_or_header()? {}
            self.skip_whitespace();
            if self.peek().is_none() {
                break;
            }
            let clause = self.parse_clause()?;
            self.clauses.push(clause);
        }

        if self.clauses.len() != self.declared_clauses {
            log::warn!(
                "DIMACS header declared {} clauses, {} were present",
                self.declared_clauses,
                self.clauses.len()
            );
        }

        let num_vars = self.declared_vars.max(self.max_var_seen);
        if let Some(ids) = &self.sampling_set {
            for &id in ids {
                let idx = id.unsigned_abs() as usize;
                if idx == 0 || idx > num_vars {
                    return Err(self.err(format!(
                        "sampling set variable {} is out of range for a formula declaring {} variables",
                        id, num_vars
                    )));
                }
            }
        }

        Ok(Cnf {
            num_vars,
            clauses: std::mem::take(&mut self.clauses),
            sampling_set: self.sampling_set.take(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_small_instance() {
        let cnf = parse("c a comment\np cnf 3 2\n1 -2 0\n2 3 0\n").unwrap();
        assert_eq!(cnf.num_vars, 3);
        assert_eq!(cnf.clauses, vec![vec![1, -2], vec![2, 3]]);
        assert!(cnf.sampling_set.is_none());
    }

    #[test]
    fn parses_independent_support_header() {
        let cnf = parse("p cnf 4 1\nc ind 1 2 0\n1 2 3 4 0\n").unwrap();
        assert_eq!(cnf.sampling_set, Some(vec![1, 2]));
    }

    #[test]
    fn accumulates_multiple_ind_lines() {
        let cnf = parse("p cnf 4 1\nc ind 1 2 0\nc ind 3 0\n1 2 3 4 0\n").unwrap();
        assert_eq!(cnf.sampling_set, Some(vec![1, 2, 3]));
    }

    #[test]
    fn rejects_missing_header() {
        assert!(parse("1 2 0\n").is_err());
    }

    #[test]
    fn rejects_out_of_range_sampling_set_variable() {
        let err = parse("p cnf 2 1\nc ind 1 5 0\n1 2 0\n").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
