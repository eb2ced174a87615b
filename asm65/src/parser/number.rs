//! Numeric literal parsing with multiple format support

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    Hexadecimal, // $FF
    Binary,      // %11111111
    Octal,       // 0377
    Decimal,     // 255, -1
}

/// A parsed literal together with how it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal {
    pub value: i32,
    pub format: NumberFormat,
    pub digits: usize,
}

impl Literal {
    /// Four hex digits always ask for a 16-bit operand, whatever the value.
    pub fn is_wide(&self) -> bool {
        self.format == NumberFormat::Hexadecimal && self.digits == 4
    }
}

/// A value position in the source: either a literal or a symbol name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term<'a> {
    Number(Literal),
    Symbol(&'a str),
}

impl<'a> Term<'a> {
    pub fn parse(s: &'a str) -> Option<Term<'a>> {
        if let Some(lit) = NumberParser::parse(s) {
            return Some(Term::Number(lit));
        }
        if is_identifier(s) {
            return Some(Term::Symbol(s));
        }
        None
    }
}

pub struct NumberParser;

impl NumberParser {
    /// Parse a number string in any supported format
    pub fn parse(s: &str) -> Option<Literal> {
        if let Some(hex) = s.strip_prefix('$') {
            return Self::parse_radix(hex, 16, 4, NumberFormat::Hexadecimal);
        }
        if let Some(bin) = s.strip_prefix('%') {
            return Self::parse_radix(bin, 2, 16, NumberFormat::Binary);
        }
        // "0" on its own and "09" fall through to decimal
        if let Some(oct) = s.strip_prefix('0') {
            if let Some(lit) = Self::parse_radix(oct, 8, 6, NumberFormat::Octal) {
                return Some(lit);
            }
        }
        Self::parse_decimal(s)
    }

    /// Parse just the value, for places where the written width is irrelevant.
    pub fn parse_value(s: &str) -> Option<i32> {
        Self::parse(s).map(|lit| lit.value)
    }

    fn parse_radix(
        digits: &str,
        radix: u32,
        max_digits: usize,
        format: NumberFormat,
    ) -> Option<Literal> {
        if digits.is_empty()
            || digits.len() > max_digits
            || !digits.chars().all(|c| c.is_digit(radix))
        {
            return None;
        }
        let value = i32::from_str_radix(digits, radix).ok()?;
        Some(Literal {
            value,
            format,
            digits: digits.len(),
        })
    }

    fn parse_decimal(s: &str) -> Option<Literal> {
        let digits = s.strip_prefix('-').unwrap_or(s);
        if digits.is_empty() || digits.len() > 5 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let value = s.parse::<i32>().ok()?;
        Some(Literal {
            value,
            format: NumberFormat::Decimal,
            digits: digits.len(),
        })
    }
}

/// Letter or underscore first, then letters, digits or underscores.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
