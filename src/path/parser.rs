//! Parser for the path-data mini-language.
//!
//! Supported commands (uppercase absolute, lowercase relative to the current
//! point): `M L H V C S Q T A Z`. Numbers may be separated by whitespace,
//! commas, or nothing at all when the sign or decimal point makes the split
//! unambiguous (`10-5`, `.5.5`). Extra operand groups repeat the previous
//! command; after a move they continue as lines.
//!
//! Every command is lowered to the segment set of [`PathSegment`]:
//! horizontal/vertical lines become `LineTo`, smooth and quadratic curves
//! become exact `CubicCurveTo`s.

use kurbo::{Point, Vec2};

use super::{Path, PathSegment};
use crate::error::ParseError;

/// Parses path data into an absolute-coordinate [`Path`].
///
/// # Example
///
/// ```
/// let path = adaptive_icon::path::parse("M 0,0 L 10,0 L 10,10 Z").unwrap();
/// assert_eq!(path.len(), 4);
/// assert!(path.is_closed());
/// ```
pub fn parse(data: &str) -> Result<Path, ParseError> {
    let mut parser = Parser::new(data);
    parser.run()?;
    if parser.path.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(parser.path)
}

/// Number of operands consumed by one repetition of `command`.
fn arity(command: char) -> Option<usize> {
    match command.to_ascii_uppercase() {
        'M' | 'L' | 'T' => Some(2),
        'H' | 'V' => Some(1),
        'S' | 'Q' => Some(4),
        'C' => Some(6),
        'A' => Some(7),
        'Z' => Some(0),
        _ => None,
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    path: Path,
    current: Point,
    subpath_start: Point,
    /// Second control point of the previous cubic, for `S`.
    last_cubic: Option<Point>,
    /// Control point of the previous quadratic, for `T`.
    last_quad: Option<Point>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            path: Path::new(),
            current: Point::ZERO,
            subpath_start: Point::ZERO,
            last_cubic: None,
            last_quad: None,
        }
    }

    fn run(&mut self) -> Result<(), ParseError> {
        let mut operands = Vec::new();
        loop {
            self.skip_separators();
            let Some(c) = self.peek() else {
                return Ok(());
            };
            let offset = self.pos;

            if starts_number(c) {
                return Err(ParseError::MissingCommand { offset });
            }
            let Some(group_len) = arity(c) else {
                return Err(ParseError::UnknownCommand { command: c, offset });
            };
            self.pos += c.len_utf8();

            operands.clear();
            if group_len > 0 {
                self.read_operands(&mut operands)?;
                if operands.is_empty() || operands.len() % group_len != 0 {
                    return Err(ParseError::MissingOperands {
                        command: c,
                        expected: group_len,
                        found: operands.len(),
                        offset,
                    });
                }
            }

            self.apply(c, &operands, group_len);
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_separators(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() || c == ',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn read_operands(&mut self, out: &mut Vec<f64>) -> Result<(), ParseError> {
        loop {
            self.skip_separators();
            match self.peek() {
                Some(c) if starts_number(c) => out.push(self.read_number()?),
                _ => return Ok(()),
            }
        }
    }

    fn read_number(&mut self) -> Result<f64, ParseError> {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        let mut end = start;

        if matches!(bytes.get(end), Some(b'+' | b'-')) {
            end += 1;
        }
        let mut digits = 0;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
            digits += 1;
        }
        if bytes.get(end) == Some(&b'.') {
            end += 1;
            while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                end += 1;
                digits += 1;
            }
        }
        if digits > 0 && matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exp_end = end + 1;
            if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
                exp_end += 1;
            }
            if bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
                while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
                    exp_end += 1;
                }
                end = exp_end;
            }
        }

        let text = &self.src[start..end];
        let value = if digits == 0 {
            None
        } else {
            text.parse::<f64>().ok().filter(|v| v.is_finite())
        };
        match value {
            Some(v) => {
                self.pos = end;
                Ok(v)
            }
            None => Err(ParseError::InvalidNumber {
                text: text.to_string(),
                offset: start,
            }),
        }
    }

    fn resolve(&self, relative: bool, x: f64, y: f64) -> Point {
        if relative {
            self.current + Vec2::new(x, y)
        } else {
            Point::new(x, y)
        }
    }

    fn apply(&mut self, command: char, operands: &[f64], group_len: usize) {
        let relative = command.is_ascii_lowercase();
        let upper = command.to_ascii_uppercase();

        if group_len == 0 {
            self.path.push(PathSegment::ClosePath);
            self.current = self.subpath_start;
            self.last_cubic = None;
            self.last_quad = None;
            return;
        }

        for (i, group) in operands.chunks_exact(group_len).enumerate() {
            let mut last_cubic = None;
            let mut last_quad = None;

            match upper {
                'M' => {
                    let p = self.resolve(relative, group[0], group[1]);
                    if i == 0 {
                        self.path.push(PathSegment::MoveTo(p));
                        self.subpath_start = p;
                    } else {
                        self.path.push(PathSegment::LineTo(p));
                    }
                    self.current = p;
                }
                'L' => {
                    let p = self.resolve(relative, group[0], group[1]);
                    self.line_to(p);
                }
                'H' => {
                    let x = if relative { self.current.x + group[0] } else { group[0] };
                    self.line_to(Point::new(x, self.current.y));
                }
                'V' => {
                    let y = if relative { self.current.y + group[0] } else { group[0] };
                    self.line_to(Point::new(self.current.x, y));
                }
                'C' => {
                    let ctrl1 = self.resolve(relative, group[0], group[1]);
                    let ctrl2 = self.resolve(relative, group[2], group[3]);
                    let to = self.resolve(relative, group[4], group[5]);
                    self.cubic_to(ctrl1, ctrl2, to);
                    last_cubic = Some(ctrl2);
                }
                'S' => {
                    let ctrl1 = reflect(self.last_cubic, self.current);
                    let ctrl2 = self.resolve(relative, group[0], group[1]);
                    let to = self.resolve(relative, group[2], group[3]);
                    self.cubic_to(ctrl1, ctrl2, to);
                    last_cubic = Some(ctrl2);
                }
                'Q' => {
                    let ctrl = self.resolve(relative, group[0], group[1]);
                    let to = self.resolve(relative, group[2], group[3]);
                    self.quad_to(ctrl, to);
                    last_quad = Some(ctrl);
                }
                'T' => {
                    let ctrl = reflect(self.last_quad, self.current);
                    let to = self.resolve(relative, group[0], group[1]);
                    self.quad_to(ctrl, to);
                    last_quad = Some(ctrl);
                }
                'A' => {
                    let to = self.resolve(relative, group[5], group[6]);
                    self.path.push(PathSegment::ArcTo {
                        radii: Vec2::new(group[0].abs(), group[1].abs()),
                        x_rotation: group[2],
                        large_arc: group[3] != 0.0,
                        sweep: group[4] != 0.0,
                        to,
                    });
                    self.current = to;
                }
                _ => unreachable!("arity() only admits known commands"),
            }

            self.last_cubic = last_cubic;
            self.last_quad = last_quad;
        }
    }

    fn line_to(&mut self, p: Point) {
        self.path.push(PathSegment::LineTo(p));
        self.current = p;
    }

    fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        self.path.push(PathSegment::CubicCurveTo { ctrl1, ctrl2, to });
        self.current = to;
    }

    /// Degree-elevates a quadratic into the equivalent cubic.
    fn quad_to(&mut self, ctrl: Point, to: Point) {
        let from = self.current;
        let ctrl1 = from + (ctrl - from) * (2.0 / 3.0);
        let ctrl2 = to + (ctrl - to) * (2.0 / 3.0);
        self.cubic_to(ctrl1, ctrl2, to);
    }
}

fn starts_number(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+')
}

/// Mirrors the previous control point through the current point.
fn reflect(previous: Option<Point>, current: Point) -> Point {
    match previous {
        Some(ctrl) => current + (current - ctrl),
        None => current,
    }
}
