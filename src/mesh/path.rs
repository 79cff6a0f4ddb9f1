//! Lexer for the path data of mesh gradient sides.
//!
//! Each stop of a mesh patch carries one side of the patch as a single
//! path command with its coordinates, e.g. `l 10,0` or
//! `c 3,-1 7,-1 10,0`.  The starting point of the side is implicit.
//! Tensor points are a list of four coordinate pairs relative to the
//! corners of the patch.
//!
//! Numbers follow the SVG path grammar: commas and whitespace are
//! optional separators, so `c1-2,3E2-4 5 6` is valid.

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;
use tinyvec::ArrayVec;

use crate::point::Point;

use super::node::PathType;

/// Errors from parsing side paths and tensor lists.  Positions are byte
/// offsets into the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshPathError {
    #[error("empty path data")]
    Empty,

    #[error("unknown path command '{command}' at position {position}")]
    UnknownCommand { command: char, position: usize },

    #[error("unexpected token at position {position}")]
    UnexpectedToken { position: usize },

    #[error("unexpected end of data at position {position}")]
    UnexpectedEof { position: usize },

    #[error("too many points, expected at most {expected}")]
    TooManyPoints { expected: usize },
}

/// One side of a patch as written in the path data.
#[derive(Debug, Clone, PartialEq)]
pub struct SidePath {
    pub path_type: PathType,

    /// The coordinates after the command, not yet resolved against the
    /// starting point.  Lines have at most one point and curves at most
    /// three; sides that close a patch omit the last one.
    pub points: ArrayVec<[Point; 3]>,
}

struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn position(&mut self) -> usize {
        match self.chars.peek() {
            Some(&(pos, _)) => pos,
            None => self.input.len(),
        }
    }

    fn lookahead(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn match_char(&mut self, c: char) -> bool {
        if self.lookahead() == Some(c) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn lookahead_is_digit(&mut self) -> bool {
        self.lookahead().map_or(false, |c| c.is_ascii_digit())
    }

    fn error(&mut self) -> MeshPathError {
        let position = self.position();

        if self.lookahead().is_some() {
            MeshPathError::UnexpectedToken { position }
        } else {
            MeshPathError::UnexpectedEof { position }
        }
    }

    fn optional_whitespace(&mut self) {
        while self.lookahead().map_or(false, char::is_whitespace) {
            self.chars.next();
        }
    }

    fn optional_comma_whitespace(&mut self) {
        self.optional_whitespace();
        if self.match_char(',') {
            self.optional_whitespace();
        }
    }

    fn is_exhausted(&mut self) -> bool {
        self.lookahead().is_none()
    }

    fn skip_digits(&mut self) -> bool {
        let mut any = false;
        while self.lookahead_is_digit() {
            self.chars.next();
            any = true;
        }
        any
    }

    /// Scans one number and lets the standard library convert it, so that
    /// values written with `{}` come back bit for bit.
    fn number(&mut self) -> Result<f64, MeshPathError> {
        let start = self.position();

        if !self.match_char('+') {
            self.match_char('-');
        }

        let has_integer_part = self.skip_digits();

        if self.match_char('.') {
            if !self.skip_digits() && !has_integer_part {
                return Err(self.error());
            }
        } else if !has_integer_part {
            return Err(self.error());
        }

        if self.match_char('e') || self.match_char('E') {
            if !self.match_char('+') {
                self.match_char('-');
            }

            if !self.skip_digits() {
                return Err(self.error());
            }
        }

        let end = self.position();

        self.input[start..end]
            .parse::<f64>()
            .map_err(|_| MeshPathError::UnexpectedToken { position: start })
    }

    fn coordinate_pair(&mut self) -> Result<Point, MeshPathError> {
        let x = self.number()?;
        self.optional_comma_whitespace();
        let y = self.number()?;

        Ok(Point::new(x, y))
    }
}

/// Parses the path of one side: a command letter followed by up to three
/// coordinate pairs.
pub fn parse_side_path(s: &str) -> Result<SidePath, MeshPathError> {
    let mut lexer = Lexer::new(s);

    lexer.optional_whitespace();

    let position = lexer.position();
    let command = lexer.lookahead().ok_or(MeshPathError::Empty)?;

    let path_type = match PathType::from_char(command) {
        Some(PathType::Unset) | None => {
            return Err(MeshPathError::UnknownCommand { command, position })
        }
        Some(t) => t,
    };
    lexer.chars.next();

    let max_points = if path_type.is_line() { 1 } else { 3 };
    let mut points = ArrayVec::new();

    lexer.optional_whitespace();

    while !lexer.is_exhausted() {
        if points.len() == max_points {
            return Err(MeshPathError::TooManyPoints {
                expected: max_points,
            });
        }

        points.push(lexer.coordinate_pair()?);
        lexer.optional_comma_whitespace();
    }

    Ok(SidePath { path_type, points })
}

/// Parses the four tensor offsets of a patch.
pub fn parse_tensor_points(s: &str) -> Result<[Point; 4], MeshPathError> {
    let mut lexer = Lexer::new(s);
    let mut points = [Point::default(); 4];

    lexer.optional_whitespace();

    for p in points.iter_mut() {
        *p = lexer.coordinate_pair()?;
        lexer.optional_comma_whitespace();
    }

    if lexer.is_exhausted() {
        Ok(points)
    } else {
        Err(MeshPathError::TooManyPoints { expected: 4 })
    }
}
