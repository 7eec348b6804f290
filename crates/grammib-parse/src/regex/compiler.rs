//! Regular expression pattern compiler.
//!
//! Parses the pattern grammar
//!
//! ```text
//! Expr   ::= Term ('|' Expr)?
//! Term   ::= Fact+
//! Fact   ::= Atom AtomModifier?
//! Atom   ::= '.' | '(' Expr ')' | '[' CharSet ']' | Char | EscapeChar
//! AtomMod::= ('?'|'*'|'+'|'{' num (',' num?)? '}') ('?'|'+')?
//! ```
//!
//! into an [`Element`] tree. The `^` and `$` anchors are rejected.

use alloc::boxed::Box;
use alloc::vec::Vec;

use super::element::{
    AltElement, CharClass, CombineElement, Element, RepeatElement, RepeatMode, SetElement, SetItem,
    UNBOUNDED,
};
use super::{RegexError, RegexErrorKind};

/// Compile a pattern. Case-insensitive compilation lower-cases literal
/// characters and range endpoints up front.
pub(crate) fn compile(pattern: &str, ignore_case: bool) -> Result<Element, RegexError> {
    let mut compiler = Compiler {
        chars: pattern.chars().collect(),
        pos: 0,
        ignore_case,
    };
    let element = compiler.parse_expr()?;
    if let Some(c) = compiler.current() {
        return Err(compiler.error(RegexErrorKind::UnexpectedCharacter { ch: c }));
    }
    Ok(element)
}

struct Compiler {
    chars: Vec<char>,
    pos: usize,
    ignore_case: bool,
}

/// The result of parsing one escape.
enum Escaped {
    Char(char),
    Class(CharClass),
}

impl Compiler {
    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn error(&self, kind: RegexErrorKind) -> RegexError {
        RegexError {
            kind,
            position: self.pos,
        }
    }

    fn fold_case(&self, c: char) -> char {
        if self.ignore_case {
            c.to_ascii_lowercase()
        } else {
            c
        }
    }

    fn parse_expr(&mut self) -> Result<Element, RegexError> {
        let term = self.parse_term()?;
        if self.current() == Some('|') {
            self.pos += 1;
            let rest = self.parse_expr()?;
            Ok(Element::Alternative(Box::new(AltElement {
                left: term,
                right: rest,
            })))
        } else {
            Ok(term)
        }
    }

    fn parse_term(&mut self) -> Result<Element, RegexError> {
        let mut element = self.parse_fact()?;
        loop {
            match self.current() {
                None | Some('|') | Some(')') => return Ok(element),
                _ => {
                    let next = self.parse_fact()?;
                    element = Element::Combine(Box::new(CombineElement {
                        left: element,
                        right: next,
                    }));
                }
            }
        }
    }

    fn parse_fact(&mut self) -> Result<Element, RegexError> {
        let atom = self.parse_atom()?;
        match self.current() {
            Some('?' | '*' | '+' | '{') => self.parse_modifier(atom),
            _ => Ok(atom),
        }
    }

    fn parse_modifier(&mut self, atom: Element) -> Result<Element, RegexError> {
        let (min, max) = match self.advance() {
            Some('?') => (0, 1),
            Some('*') => (0, UNBOUNDED),
            Some('+') => (1, UNBOUNDED),
            Some('{') => self.parse_repeat_count()?,
            _ => return Err(self.error(RegexErrorKind::UnterminatedPattern)),
        };
        let mode = match self.current() {
            Some('?') => {
                self.pos += 1;
                RepeatMode::Reluctant
            }
            Some('+') => {
                self.pos += 1;
                RepeatMode::Possessive
            }
            _ => RepeatMode::Greedy,
        };
        Ok(Element::Repeat(Box::new(RepeatElement::new(
            atom, min, max, mode,
        ))))
    }

    fn parse_repeat_count(&mut self) -> Result<(u32, u32), RegexError> {
        let min = self.parse_number()?;
        let max = match self.current() {
            Some(',') => {
                self.pos += 1;
                if self.current() == Some('}') {
                    UNBOUNDED
                } else {
                    self.parse_number()?
                }
            }
            _ => min,
        };
        if self.advance() != Some('}') {
            return Err(self.error(RegexErrorKind::UnterminatedPattern));
        }
        if max < min {
            return Err(self.error(RegexErrorKind::InvalidRepeatCount));
        }
        Ok((min, max))
    }

    fn parse_number(&mut self) -> Result<u32, RegexError> {
        let mut value: u32 = 0;
        let mut digits = 0;
        while let Some(c) = self.current() {
            let Some(d) = c.to_digit(10) else { break };
            value = value
                .saturating_mul(10)
                .saturating_add(d);
            digits += 1;
            self.pos += 1;
        }
        if digits == 0 {
            return Err(self.error(RegexErrorKind::InvalidRepeatCount));
        }
        Ok(value)
    }

    fn parse_atom(&mut self) -> Result<Element, RegexError> {
        match self.current() {
            None => Err(self.error(RegexErrorKind::UnterminatedPattern)),
            Some('.') => {
                self.pos += 1;
                Ok(Element::Set(SetElement::dot()))
            }
            Some('(') => {
                self.pos += 1;
                let inner = self.parse_expr()?;
                if self.advance() != Some(')') {
                    return Err(self.error(RegexErrorKind::UnterminatedPattern));
                }
                Ok(inner)
            }
            Some('[') => {
                self.pos += 1;
                self.parse_char_set()
            }
            Some(c @ ('^' | '$')) => Err(self.error(RegexErrorKind::UnsupportedSpecial { ch: c })),
            Some(c @ ('?' | '*' | '+' | '{' | ')' | ']' | '}' | '|')) => {
                Err(self.error(RegexErrorKind::UnexpectedCharacter { ch: c }))
            }
            Some('\\') => {
                self.pos += 1;
                match self.parse_escape()? {
                    Escaped::Char(c) => Ok(Element::Str(alloc::vec![self.fold_case(c)])),
                    Escaped::Class(class) => Ok(Element::Set(SetElement::class(class))),
                }
            }
            Some(c) => {
                self.pos += 1;
                Ok(Element::Str(alloc::vec![self.fold_case(c)]))
            }
        }
    }

    fn parse_char_set(&mut self) -> Result<Element, RegexError> {
        let inverted = if self.current() == Some('^') {
            self.pos += 1;
            true
        } else {
            false
        };
        let mut items: Vec<SetItem> = Vec::new();
        loop {
            match self.current() {
                None => return Err(self.error(RegexErrorKind::UnterminatedPattern)),
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                _ => {
                    let first = self.parse_set_char()?;
                    match first {
                        Escaped::Class(class) => items.push(SetItem::Class(class)),
                        Escaped::Char(lo) => {
                            // A trailing '-' is a literal; otherwise it forms
                            // a range with the next set character.
                            if self.current() == Some('-')
                                && self.chars.get(self.pos + 1) != Some(&']')
                                && self.chars.get(self.pos + 1).is_some()
                            {
                                self.pos += 1;
                                match self.parse_set_char()? {
                                    Escaped::Char(hi) => items.push(SetItem::Range(
                                        self.fold_case(lo),
                                        self.fold_case(hi),
                                    )),
                                    Escaped::Class(_) => {
                                        return Err(self.error(
                                            RegexErrorKind::UnexpectedCharacter { ch: '-' },
                                        ));
                                    }
                                }
                            } else {
                                items.push(SetItem::Char(self.fold_case(lo)));
                            }
                        }
                    }
                }
            }
        }
        Ok(Element::Set(SetElement { inverted, items }))
    }

    /// One character inside a set: a literal or an escape.
    fn parse_set_char(&mut self) -> Result<Escaped, RegexError> {
        match self.advance() {
            None => Err(self.error(RegexErrorKind::UnterminatedPattern)),
            Some('\\') => self.parse_escape(),
            Some(c) => Ok(Escaped::Char(c)),
        }
    }

    /// Parse the escape following a backslash.
    fn parse_escape(&mut self) -> Result<Escaped, RegexError> {
        let Some(c) = self.advance() else {
            return Err(self.error(RegexErrorKind::UnterminatedPattern));
        };
        match c {
            '0' => {
                // Octal escape, one to three digits, at most 0377.
                let mut value: u32 = 0;
                let mut digits = 0;
                while digits < 3 {
                    let Some(d) = self.current().and_then(|c| c.to_digit(8)) else {
                        break;
                    };
                    let next = value * 8 + d;
                    if next > 0o377 {
                        break;
                    }
                    value = next;
                    digits += 1;
                    self.pos += 1;
                }
                match char::from_u32(value) {
                    Some(c) => Ok(Escaped::Char(c)),
                    None => Err(self.error(RegexErrorKind::UnsupportedEscape { ch: '0' })),
                }
            }
            'x' => self.parse_hex_escape(2, 'x'),
            'u' => self.parse_hex_escape(4, 'u'),
            't' => Ok(Escaped::Char('\t')),
            'n' => Ok(Escaped::Char('\n')),
            'r' => Ok(Escaped::Char('\r')),
            'f' => Ok(Escaped::Char('\x0c')),
            'a' => Ok(Escaped::Char('\x07')),
            'e' => Ok(Escaped::Char('\x1b')),
            'd' => Ok(Escaped::Class(CharClass::Digit)),
            'D' => Ok(Escaped::Class(CharClass::NonDigit)),
            's' => Ok(Escaped::Class(CharClass::Whitespace)),
            'S' => Ok(Escaped::Class(CharClass::NonWhitespace)),
            'w' => Ok(Escaped::Class(CharClass::Word)),
            'W' => Ok(Escaped::Class(CharClass::NonWord)),
            c if c.is_ascii_alphabetic() => {
                Err(self.error(RegexErrorKind::UnsupportedEscape { ch: c }))
            }
            c => Ok(Escaped::Char(c)),
        }
    }

    fn parse_hex_escape(&mut self, digits: usize, intro: char) -> Result<Escaped, RegexError> {
        let mut value: u32 = 0;
        for _ in 0..digits {
            let Some(d) = self.current().and_then(|c| c.to_digit(16)) else {
                return Err(self.error(RegexErrorKind::UnsupportedEscape { ch: intro }));
            };
            value = value * 16 + d;
            self.pos += 1;
        }
        match char::from_u32(value) {
            Some(c) => Ok(Escaped::Char(c)),
            None => Err(self.error(RegexErrorKind::UnsupportedEscape { ch: intro })),
        }
    }
}
