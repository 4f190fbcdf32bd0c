// SPDX-License-Identifier: Apache-2.0

//! Byte-level scanner underneath the Liberty parser.
//!
//! Liberty files are ASCII, so the scanner works on bytes and keeps a small
//! lookahead buffer on top of an arbitrary byte iterator; this lets the same
//! code read from a string in tests and from a (possibly gzipped) file.

/// Bytes that terminate an unquoted word.
const WORD_TERMINATORS: &[u8] = b"(){}:;,\"";

pub struct AsciiStream<I: Iterator<Item = u8>> {
    iter: I,
    buffer: Vec<u8>,
    raw_pos: usize,
    lineno: usize,
    colno: usize,
}

impl<I: Iterator<Item = u8>> AsciiStream<I> {
    pub fn new(iter: I) -> Self {
        Self {
            iter,
            buffer: Vec::new(),
            raw_pos: 0,
            lineno: 0,
            colno: 0,
        }
    }

    pub fn human_pos(&self) -> String {
        // lineno and colno are zero-based.
        format!("{}:{}", self.lineno + 1, self.colno + 1)
    }

    fn ensure_buffer(&mut self, n: usize) {
        while self.buffer.len().saturating_sub(self.raw_pos) < n {
            match self.iter.next() {
                Some(b) => self.buffer.push(b),
                None => break,
            }
        }
    }

    fn consume(&mut self, n: usize) {
        self.ensure_buffer(n);
        let n = n.min(self.buffer.len() - self.raw_pos);
        for &b in &self.buffer[self.raw_pos..self.raw_pos + n] {
            if b == b'\n' {
                self.lineno += 1;
                self.colno = 0;
            } else {
                self.colno += 1;
            }
        }
        self.raw_pos += n;
        if self.raw_pos > 64 * 1024 {
            self.buffer.drain(0..self.raw_pos);
            self.raw_pos = 0;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.peek_ahead(0)
    }

    fn peek_ahead(&mut self, n: usize) -> Option<u8> {
        self.ensure_buffer(n + 1);
        self.buffer.get(self.raw_pos + n).copied()
    }

    fn peek_is_noskip(&mut self, expected: &[u8]) -> bool {
        expected
            .iter()
            .enumerate()
            .all(|(i, &want)| self.peek_ahead(i) == Some(want))
    }

    /// Skips whitespace, `/* */` and `//` comments, and backslash line
    /// continuations.
    fn skip_trivia(&mut self) -> Result<(), String> {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.consume(1),
                Some(b'\\') => self.consume(1),
                Some(b'/') if self.peek_is_noskip(b"/*") => {
                    let start = self.human_pos();
                    self.consume(2);
                    loop {
                        if self.peek_is_noskip(b"*/") {
                            self.consume(2);
                            break;
                        }
                        if self.peek().is_none() {
                            return Err(format!("Unterminated comment starting at {}", start));
                        }
                        self.consume(1);
                    }
                }
                Some(b'/') if self.peek_is_noskip(b"//") => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.consume(1);
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    pub fn at_eof(&mut self) -> Result<bool, String> {
        self.skip_trivia()?;
        Ok(self.peek().is_none())
    }

    pub fn peek_is(&mut self, expected: &[u8]) -> Result<bool, String> {
        self.skip_trivia()?;
        Ok(self.peek_is_noskip(expected))
    }

    pub fn try_pop(&mut self, expected: &[u8]) -> Result<bool, String> {
        if self.peek_is(expected)? {
            self.consume(expected.len());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn pop_or_error(&mut self, expected: &[u8], context: &str) -> Result<(), String> {
        if self.try_pop(expected)? {
            Ok(())
        } else {
            Err(format!(
                "Expected {:?} in {} @ {} rest: {:?}",
                String::from_utf8_lossy(expected),
                context,
                self.human_pos(),
                self.peek_line()
            ))
        }
    }

    /// Returns the remainder of the current line for error messages.
    pub fn peek_line(&mut self) -> String {
        let mut line = Vec::new();
        let mut i = 0;
        while let Some(b) = self.peek_ahead(i) {
            if b == b'\n' || i >= 80 {
                break;
            }
            line.push(b);
            i += 1;
        }
        String::from_utf8_lossy(&line).into_owned()
    }

    /// Pops a double-quoted string; the quotes are dropped and the contents
    /// are kept verbatim apart from backslash-newline continuations.
    pub fn pop_string(&mut self) -> Result<String, String> {
        let start = {
            self.skip_trivia()?;
            self.human_pos()
        };
        self.pop_or_error(b"\"", "string value start")?;
        let mut s = Vec::new();
        loop {
            match self.peek() {
                None => return Err(format!("Unterminated string starting at {}", start)),
                Some(b'"') => {
                    self.consume(1);
                    break;
                }
                Some(b'\\') if self.peek_ahead(1) == Some(b'\n') => self.consume(2),
                Some(b) => {
                    s.push(b);
                    self.consume(1);
                }
            }
        }
        Ok(String::from_utf8_lossy(&s).into_owned())
    }

    /// Pops an unquoted word: identifiers, numbers, and bare expressions such
    /// as `IQ'` all scan the same way and are classified by the parser.
    pub fn pop_word(&mut self, context: &str) -> Result<String, String> {
        self.skip_trivia()?;
        let mut word = Vec::new();
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace()
                || WORD_TERMINATORS.contains(&b)
                || self.peek_is_noskip(b"/*")
                || self.peek_is_noskip(b"//")
            {
                break;
            }
            word.push(b);
            self.consume(1);
        }
        if word.is_empty() {
            Err(format!(
                "Expected word in {} @ {} rest: {:?}",
                context,
                self.human_pos(),
                self.peek_line()
            ))
        } else {
            Ok(String::from_utf8_lossy(&word).into_owned())
        }
    }
}
