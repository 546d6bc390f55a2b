//! Aspect ratio expressions.
//!
//! Annotations declare their height/width ratio as a small arithmetic
//! expression such as `"3/4"` or `"(1080 / 1920)"`. Only number literals,
//! `+ - * /`, unary minus and parentheses are accepted.

/// Ratio used whenever an expression is absent or unusable.
pub const DEFAULT_ASPECT_RATIO: f32 = 1.0;

/// Deepest run of parentheses and unary signs an expression may nest.
const MAX_DEPTH: usize = 64;

/// Evaluate an arithmetic expression over literals.
///
/// Returns `None` for syntax errors or trailing input.
pub fn evaluate(expr: &str) -> Option<f64> {
    let mut parser = Parser {
        bytes: expr.as_bytes(),
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    parser.skip_ws();
    if parser.pos != parser.bytes.len() {
        return None;
    }
    Some(value)
}

/// Evaluate a ratio expression, accepting only finite positive results.
pub fn parse_ratio(expr: &str) -> Option<f32> {
    let value = evaluate(expr)?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded <= 0.0 {
        return None;
    }
    Some(rounded as f32)
}

/// Resolve an optional expression to a ratio, degrading to 1.
pub fn aspect_ratio(expr: Option<&str>) -> f32 {
    let Some(expr) = expr.map(str::trim).filter(|e| !e.is_empty()) else {
        return DEFAULT_ASPECT_RATIO;
    };
    match parse_ratio(expr) {
        Some(ratio) => ratio,
        None => {
            log::warn!("unusable aspect expression {expr:?}, falling back to 1");
            DEFAULT_ASPECT_RATIO
        }
    }
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_whitespace())
        {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.bytes.get(self.pos).copied()
    }

    fn expr(&mut self) -> Option<f64> {
        let mut acc = self.term()?;
        while let Some(op @ (b'+' | b'-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            acc = if op == b'+' { acc + rhs } else { acc - rhs };
        }
        Some(acc)
    }

    fn term(&mut self) -> Option<f64> {
        let mut acc = self.factor()?;
        while let Some(op @ (b'*' | b'/')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            acc = if op == b'*' { acc * rhs } else { acc / rhs };
        }
        Some(acc)
    }

    fn factor(&mut self) -> Option<f64> {
        match self.peek()? {
            b'(' => {
                self.pos += 1;
                let value = self.nested(Self::expr)?;
                if self.peek()? != b')' {
                    return None;
                }
                self.pos += 1;
                Some(value)
            }
            b'-' => {
                self.pos += 1;
                self.nested(Self::factor).map(|v| -v)
            }
            b'+' => {
                self.pos += 1;
                self.nested(Self::factor)
            }
            _ => self.number(),
        }
    }

    fn nested(&mut self, parse: fn(&mut Self) -> Option<f64>) -> Option<f64> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn number(&mut self) -> Option<f64> {
        let start = self.pos;
        let mut seen_dot = false;
        while let Some(&b) = self.bytes.get(self.pos) {
            match b {
                b'0'..=b'9' => self.pos += 1,
                b'.' if !seen_dot => {
                    seen_dot = true;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        let literal = std::str::from_utf8(&self.bytes[start..self.pos]).ok()?;
        if literal.is_empty() || literal == "." {
            return None;
        }
        literal.parse().ok()
    }
}
