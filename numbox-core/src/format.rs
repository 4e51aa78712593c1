//! Printf-style element formats used by the boxed `Display` renderings.
//!
//! A format is a single conversion: `%[flags][width][.precision]conv` with
//! flags from `-+0 ` and `conv` one of `f F e E g G`.

use std::fmt;
use std::iter::Peekable;
use std::str::{Chars, FromStr};

use serde::{Deserialize, Serialize};

use crate::error::NumboxError;

/// Format applied to each element when a container is displayed.
pub const DEFAULT_FORMAT: &str = "%10.3f";

/// Largest accepted field width or precision.
pub const MAX_FIELD: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Fixed,
    Exponent,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NumberFormat {
    spec: String,
    left_align: bool,
    zero_pad: bool,
    plus_sign: bool,
    space_sign: bool,
    width: usize,
    precision: Option<usize>,
    conversion: Conversion,
    uppercase: bool,
}

impl Default for NumberFormat {
    fn default() -> Self {
        // The default literal is known to parse.
        Self::parse(DEFAULT_FORMAT).unwrap_or(NumberFormat {
            spec: DEFAULT_FORMAT.to_string(),
            left_align: false,
            zero_pad: false,
            plus_sign: false,
            space_sign: false,
            width: 10,
            precision: Some(3),
            conversion: Conversion::Fixed,
            uppercase: false,
        })
    }
}

impl NumberFormat {
    pub fn parse(spec: &str) -> Result<Self, NumboxError> {
        let invalid = |why: &str| NumboxError::InvalidFormat(format!("{:?}: {}", spec, why));
        let rest = spec
            .strip_prefix('%')
            .ok_or_else(|| invalid("must start with '%'"))?;
        let mut chars = rest.chars().peekable();

        let (mut left_align, mut zero_pad, mut plus_sign, mut space_sign) =
            (false, false, false, false);
        while let Some(&c) = chars.peek() {
            match c {
                '-' => left_align = true,
                '0' => zero_pad = true,
                '+' => plus_sign = true,
                ' ' => space_sign = true,
                _ => break,
            }
            chars.next();
        }

        let width = digits(&mut chars).ok_or_else(|| invalid("width too large"))?;

        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let p = digits(&mut chars).ok_or_else(|| invalid("precision too large"))?;
            precision = Some(p);
        }

        let conv = chars.next().ok_or_else(|| invalid("missing conversion"))?;
        let (conversion, uppercase) = match conv {
            'f' | 'F' => (Conversion::Fixed, conv == 'F'),
            'e' | 'E' => (Conversion::Exponent, conv == 'E'),
            'g' | 'G' => (Conversion::General, conv == 'G'),
            other => return Err(invalid(&format!("unsupported conversion '{}'", other))),
        };
        if chars.next().is_some() {
            return Err(invalid("trailing characters after conversion"));
        }

        Ok(NumberFormat {
            spec: spec.to_string(),
            left_align,
            zero_pad,
            plus_sign,
            space_sign,
            width,
            precision,
            conversion,
            uppercase,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.spec
    }

    /// Renders a single value.
    pub fn render(&self, value: f64) -> String {
        let body = if value.is_nan() {
            "nan".to_string()
        } else if value.is_infinite() {
            "inf".to_string()
        } else {
            let magnitude = value.abs();
            let precision = self.precision.unwrap_or(6);
            match self.conversion {
                Conversion::Fixed => format!("{:.*}", precision, magnitude),
                Conversion::Exponent => c_exponent(magnitude, precision),
                Conversion::General => c_general(magnitude, precision),
            }
        };
        let body = if self.uppercase {
            body.to_uppercase()
        } else {
            body
        };

        let sign = if value.is_sign_negative() && !value.is_nan() {
            "-"
        } else if self.plus_sign {
            "+"
        } else if self.space_sign {
            " "
        } else {
            ""
        };

        let len = sign.len() + body.len();
        if len >= self.width {
            return format!("{}{}", sign, body);
        }
        let pad = self.width - len;
        if self.left_align {
            format!("{}{}{}", sign, body, " ".repeat(pad))
        } else if self.zero_pad && value.is_finite() {
            format!("{}{}{}", sign, "0".repeat(pad), body)
        } else {
            format!("{}{}{}", " ".repeat(pad), sign, body)
        }
    }

    /// Rendered width of `value`, counted in characters.
    pub(crate) fn rendered_width(&self, value: f64) -> usize {
        self.render(value).chars().count()
    }
}

// Consumes a run of decimal digits. `None` once the value passes `MAX_FIELD`.
fn digits(chars: &mut Peekable<Chars<'_>>) -> Option<usize> {
    let mut n = 0usize;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        n = n.checked_mul(10)?.checked_add(d as usize)?;
        if n > MAX_FIELD {
            return None;
        }
        chars.next();
    }
    Some(n)
}

// `%e` style: mantissa, 'e', signed exponent of at least two digits.
fn c_exponent(magnitude: f64, precision: usize) -> String {
    let rust = format!("{:.*e}", precision, magnitude);
    match rust.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => rust,
    }
}

// `%g` style: shortest of fixed/exponent by the C rule, trailing zeros removed.
fn c_general(magnitude: f64, precision: usize) -> String {
    let p = precision.max(1);
    let exponent = if magnitude == 0.0 {
        0
    } else {
        let sci = format!("{:.*e}", p - 1, magnitude);
        sci
            .split_once('e')
            .and_then(|(_, e)| e.parse::<i32>().ok())
            .unwrap_or(0)
    };
    if exponent < -4 || exponent >= p as i32 {
        let rendered = c_exponent(magnitude, p - 1);
        match rendered.split_once('e') {
            Some((mantissa, exp)) => format!("{}e{}", strip_zeros(mantissa), exp),
            None => rendered,
        }
    } else {
        let decimals = (p as i32 - 1 - exponent).max(0) as usize;
        strip_zeros(&format!("{:.*}", decimals, magnitude)).to_string()
    }
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

impl FromStr for NumberFormat {
    type Err = NumboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NumberFormat::parse(s)
    }
}

impl TryFrom<String> for NumberFormat {
    type Error = NumboxError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        NumberFormat::parse(&s)
    }
}

impl From<NumberFormat> for String {
    fn from(f: NumberFormat) -> Self {
        f.spec
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec)
    }
}

/// Draws `lines` (rows of already formatted cells) inside a bracket box:
///
/// ```text
/// ⎡             ⎤
/// ⎜ cell cell   ⎟
/// ⎣             ⎦
/// ```
pub(crate) fn boxed(lines: &[String]) -> String {
    let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    out.push('⎡');
    out.push_str(&" ".repeat(inner + 2));
    out.push_str("⎤\n");
    for line in lines {
        let pad = inner - line.chars().count();
        out.push_str("⎜ ");
        out.push_str(line);
        out.push_str(&" ".repeat(pad + 1));
        out.push_str("⎟\n");
    }
    out.push('⎣');
    out.push_str(&" ".repeat(inner + 2));
    out.push_str("⎦\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format() {
        let f = NumberFormat::default();
        assert_eq!(f.as_str(), "%10.3f");
        assert_eq!(f.render(3.14159), "     3.142");
        assert_eq!(f.render(-2.0), "    -2.000");
    }

    #[test]
    fn test_flags_and_width() {
        assert_eq!(NumberFormat::parse("%-8.2f").unwrap().render(1.5), "1.50    ");
        assert_eq!(NumberFormat::parse("%08.2f").unwrap().render(-1.5), "-0001.50");
        assert_eq!(NumberFormat::parse("%+.1f").unwrap().render(2.0), "+2.0");
        assert_eq!(NumberFormat::parse("%.0f").unwrap().render(2.4), "2");
    }

    #[test]
    fn test_exponent_conversion() {
        let f = NumberFormat::parse("%.3e").unwrap();
        assert_eq!(f.render(12345.678), "1.235e+04");
        assert_eq!(f.render(0.00012), "1.200e-04");
        assert_eq!(NumberFormat::parse("%E").unwrap().render(1.0), "1.000000E+00");
    }

    #[test]
    fn test_general_conversion() {
        let f = NumberFormat::parse("%g").unwrap();
        assert_eq!(f.render(100.0), "100");
        assert_eq!(f.render(0.5), "0.5");
        assert_eq!(f.render(1234567.0), "1.23457e+06");
        assert_eq!(f.render(0.00001), "1e-05");
        assert_eq!(f.render(0.0), "0");
    }

    #[test]
    fn test_non_finite() {
        let f = NumberFormat::parse("%6.2f").unwrap();
        assert_eq!(f.render(f64::INFINITY), "   inf");
        assert_eq!(f.render(f64::NEG_INFINITY), "  -inf");
        assert_eq!(f.render(f64::NAN), "   nan");
    }

    #[test]
    fn test_invalid_formats() {
        for spec in ["10.3f", "%", "%d", "%10.3fx", "%q"] {
            match NumberFormat::parse(spec) {
                Err(NumboxError::InvalidFormat(msg)) => assert!(msg.contains(spec)),
                other => panic!("Expected InvalidFormat for {:?}, got {:?}", spec, other),
            }
        }
    }

    #[test]
    fn test_oversized_fields_rejected() {
        for spec in [
            "%99999999999999999999f",
            "%.99999999999999999999f",
            "%18446744073709551616.1f",
            "%4000000000f",
            "%129f",
            "%.129e",
        ] {
            assert!(
                matches!(NumberFormat::parse(spec), Err(NumboxError::InvalidFormat(_))),
                "{:?} accepted",
                spec
            );
        }
        let widest = NumberFormat::parse("%128.128f").unwrap();
        assert_eq!(widest.render(1.0).len(), 130);
    }

    #[test]
    fn test_boxed_alignment() {
        let out = boxed(&["1 2".to_string(), "10 20".to_string()]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|&w| w == widths[0]));
        assert!(lines[0].starts_with('⎡') && lines[3].starts_with('⎣'));
    }
}
