//! printf-style interpolation of resolved translations
//!
//! Supports the conversions `%s %d %i %u %f %F %e %E %x %X %o %b %c %%`,
//! argument numbers (`%2$s`), the flags `-`, `+`, `0`, space and `'c` (custom
//! padding character), a width and a precision.
//!
//! The tokens `%label`, `%name` and `%value` are form-field placeholders that
//! are substituted later by other code; they are masked before formatting
//! and restored afterwards so they never consume an argument.

use thiserror::Error;

/// Placeholders that interpolation leaves untouched.
pub const PROTECTED_PLACEHOLDERS: [&str; 3] = ["%label", "%name", "%value"];

const SENTINELS: [&str; 3] = ["\u{1}label\u{1}", "\u{1}name\u{1}", "\u{1}value\u{1}"];

/// Largest accepted field width or precision.
pub const MAX_FIELD_WIDTH: usize = 4096;

/// Interpolation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The template references more arguments than were supplied
    #[error("too few arguments: argument {position} is missing")]
    MissingArgument {
        /// One-based argument number
        position: usize,
    },

    /// An unsupported conversion character
    #[error("unknown conversion '%{0}'")]
    UnknownConversion(char),

    /// The template ends inside a conversion
    #[error("incomplete conversion at the end of the template")]
    Incomplete,

    /// `%0$s` style argument number
    #[error("argument numbers start at 1")]
    ZeroArgumentNumber,

    /// A width or precision above [`MAX_FIELD_WIDTH`]
    #[error("field width exceeds {max}")]
    WidthTooLarge {
        /// Accepted maximum
        max: usize,
    },
}

/// A single interpolation argument
#[derive(Debug, Clone, PartialEq)]
pub enum FormatArg {
    /// Text
    Str(String),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
}

impl From<&str> for FormatArg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for FormatArg {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for FormatArg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FormatArg {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for FormatArg {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for FormatArg {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl FormatArg {
    /// Parses a command-line style argument: integers, then floats, then text.
    pub fn parse_loose(raw: &str) -> Self {
        if let Ok(value) = raw.parse::<i64>() {
            Self::Int(value)
        } else if let Ok(value) = raw.parse::<f64>() {
            Self::Float(value)
        } else {
            Self::Str(raw.to_string())
        }
    }

    fn as_text(&self) -> String {
        match self {
            Self::Str(value) => value.clone(),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn as_int(&self) -> i64 {
        match self {
            Self::Str(value) => leading_int(value),
            Self::Int(value) => *value,
            Self::Float(value) => *value as i64,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn as_float(&self) -> f64 {
        match self {
            Self::Str(value) => value
                .trim()
                .parse()
                .unwrap_or_else(|_| leading_int(value) as f64),
            Self::Int(value) => *value as f64,
            Self::Float(value) => *value,
        }
    }
}

/// Leading integer of a string, `0` when there is none.
fn leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().unwrap_or(0);
    if negative {
        -value
    } else {
        value
    }
}

/// Interpolates `args` into `template`, keeping protected placeholders.
///
/// Without arguments the template is returned unchanged.
pub fn interpolate(template: &str, args: &[FormatArg]) -> Result<String, FormatError> {
    if args.is_empty() {
        return Ok(template.to_string());
    }

    let mut masked = template.to_string();
    for (placeholder, sentinel) in PROTECTED_PLACEHOLDERS.iter().zip(SENTINELS) {
        masked = masked.replace(placeholder, sentinel);
    }

    let mut formatted = sprintf(&masked, args)?;
    for (placeholder, sentinel) in PROTECTED_PLACEHOLDERS.iter().zip(SENTINELS) {
        formatted = formatted.replace(sentinel, placeholder);
    }
    Ok(formatted)
}

#[derive(Debug, Default)]
struct Spec {
    left_align: bool,
    plus: bool,
    pad: Option<char>,
    width: usize,
    precision: Option<usize>,
}

/// Formats `template` with printf conversions.
pub fn sprintf(template: &str, args: &[FormatArg]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut next_arg = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }

        // argument number or width: digits, optionally followed by '$'
        let mut lookahead = chars.clone();
        let mut digits = String::new();
        while let Some(d) = lookahead.peek().filter(|d| d.is_ascii_digit()) {
            digits.push(*d);
            lookahead.next();
        }
        let position = if !digits.is_empty() && lookahead.peek() == Some(&'$') {
            lookahead.next();
            chars = lookahead;
            let number: usize = digits.parse().unwrap_or(usize::MAX);
            if number == 0 {
                return Err(FormatError::ZeroArgumentNumber);
            }
            Some(number - 1)
        } else {
            None
        };

        let mut spec = Spec::default();
        loop {
            match chars.peek() {
                Some('-') => spec.left_align = true,
                Some('+') => spec.plus = true,
                Some('0') => spec.pad = Some('0'),
                Some(' ') => spec.pad = Some(' '),
                Some('\'') => {
                    chars.next();
                    spec.pad = Some(chars.next().ok_or(FormatError::Incomplete)?);
                    continue;
                }
                _ => break,
            }
            chars.next();
        }

        while let Some(d) = chars.peek().and_then(|d| d.to_digit(10)) {
            spec.width = spec.width.saturating_mul(10).saturating_add(d as usize);
            chars.next();
        }
        check_field_width(spec.width)?;

        if chars.peek() == Some(&'.') {
            chars.next();
            let mut precision = 0usize;
            while let Some(d) = chars.peek().and_then(|d| d.to_digit(10)) {
                precision = precision.saturating_mul(10).saturating_add(d as usize);
                chars.next();
            }
            spec.precision = Some(check_field_width(precision)?);
        }

        let conversion = chars.next().ok_or(FormatError::Incomplete)?;
        let index = position.unwrap_or_else(|| {
            let index = next_arg;
            next_arg += 1;
            index
        });
        let arg = args
            .get(index)
            .ok_or(FormatError::MissingArgument { position: index + 1 })?;

        let body = convert(conversion, arg, &spec)?;
        out.push_str(&pad(body, &spec, is_numeric(conversion)));
    }

    Ok(out)
}

const fn check_field_width(width: usize) -> Result<usize, FormatError> {
    if width > MAX_FIELD_WIDTH {
        Err(FormatError::WidthTooLarge {
            max: MAX_FIELD_WIDTH,
        })
    } else {
        Ok(width)
    }
}

const fn is_numeric(conversion: char) -> bool {
    matches!(conversion, 'd' | 'i' | 'u' | 'f' | 'F' | 'e' | 'E')
}

#[allow(clippy::cast_sign_loss)]
fn convert(conversion: char, arg: &FormatArg, spec: &Spec) -> Result<String, FormatError> {
    let signed = |text: String, negative: bool| {
        if spec.plus && !negative {
            format!("+{text}")
        } else {
            text
        }
    };

    Ok(match conversion {
        's' => {
            let text = arg.as_text();
            match spec.precision {
                Some(limit) => text.chars().take(limit).collect(),
                None => text,
            }
        }
        'd' | 'i' => {
            let value = arg.as_int();
            signed(value.to_string(), value < 0)
        }
        'u' => (arg.as_int() as u64).to_string(),
        'f' | 'F' => {
            let value = arg.as_float();
            let precision = spec.precision.unwrap_or(6);
            signed(format!("{value:.precision$}"), value < 0.0)
        }
        'e' | 'E' => {
            let value = arg.as_float();
            let precision = spec.precision.unwrap_or(6);
            let text = format!("{value:.precision$e}");
            let text = match text.split_once('e') {
                Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                    format!("{mantissa}e+{exponent}")
                }
                _ => text,
            };
            let text = if conversion == 'E' {
                text.to_uppercase()
            } else {
                text
            };
            signed(text, value < 0.0)
        }
        'x' => format!("{:x}", arg.as_int() as u64),
        'X' => format!("{:X}", arg.as_int() as u64),
        'o' => format!("{:o}", arg.as_int() as u64),
        'b' => format!("{:b}", arg.as_int() as u64),
        'c' => u32::try_from(arg.as_int())
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default(),
        other => return Err(FormatError::UnknownConversion(other)),
    })
}

fn pad(body: String, spec: &Spec, numeric: bool) -> String {
    let length = body.chars().count();
    if length >= spec.width {
        return body;
    }

    let fill = spec.pad.unwrap_or(' ');
    let padding: String = std::iter::repeat(fill).take(spec.width - length).collect();

    if spec.left_align {
        // zero padding on the right would change the number
        if fill == '0' && numeric {
            let spaces: String = std::iter::repeat(' ').take(spec.width - length).collect();
            return body + &spaces;
        }
        return body + &padding;
    }

    if fill == '0' && numeric && (body.starts_with('-') || body.starts_with('+')) {
        let (sign, digits) = body.split_at(1);
        return format!("{sign}{padding}{digits}");
    }

    padding + &body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[FormatArg]) -> Vec<FormatArg> {
        values.to_vec()
    }

    #[test]
    fn test_sequential_conversions() {
        let out = sprintf("%s has %d cats", &args(&["Jan".into(), 3.into()])).unwrap();
        assert_eq!(out, "Jan has 3 cats");
    }

    #[test]
    fn test_argument_swapping() {
        let out = sprintf("%2$s before %1$s", &args(&["one".into(), "two".into()])).unwrap();
        assert_eq!(out, "two before one");
    }

    #[test]
    fn test_width_and_padding() {
        assert_eq!(sprintf("[%5d]", &[42.into()]).unwrap(), "[   42]");
        assert_eq!(sprintf("[%-5d]", &[42.into()]).unwrap(), "[42   ]");
        assert_eq!(sprintf("[%05d]", &[(-42).into()]).unwrap(), "[-0042]");
        assert_eq!(sprintf("[%'*6s]", &["ab".into()]).unwrap(), "[****ab]");
        assert_eq!(sprintf("[%+d]", &[5.into()]).unwrap(), "[+5]");
    }

    #[test]
    fn test_floats() {
        assert_eq!(sprintf("%.2f", &[3.14159.into()]).unwrap(), "3.14");
        assert_eq!(sprintf("%f", &[1.5.into()]).unwrap(), "1.500000");
        assert_eq!(sprintf("%.2e", &[1234.5.into()]).unwrap(), "1.23e+3");
        assert_eq!(sprintf("%s", &[2.5.into()]).unwrap(), "2.5");
    }

    #[test]
    fn test_integer_bases() {
        assert_eq!(sprintf("%x %X %o %b", &[255.into(), 255.into(), 8.into(), 5.into()]).unwrap(), "ff FF 10 101");
        assert_eq!(sprintf("%c", &[65.into()]).unwrap(), "A");
        assert_eq!(sprintf("%u", &[(-1).into()]).unwrap(), u64::MAX.to_string());
    }

    #[test]
    fn test_string_coercions() {
        assert_eq!(sprintf("%d", &["12 apples".into()]).unwrap(), "12");
        assert_eq!(sprintf("%d", &["none".into()]).unwrap(), "0");
        assert_eq!(sprintf("%.3s", &["abcdef".into()]).unwrap(), "abc");
    }

    #[test]
    fn test_percent_literal() {
        assert_eq!(sprintf("100%% of %s", &["it".into()]).unwrap(), "100% of it");
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            sprintf("%s and %s", &["one".into()]),
            Err(FormatError::MissingArgument { position: 2 })
        );
        assert_eq!(sprintf("%q", &["x".into()]), Err(FormatError::UnknownConversion('q')));
        assert_eq!(sprintf("tail %", &["x".into()]), Err(FormatError::Incomplete));
        assert_eq!(sprintf("%0$s", &["x".into()]), Err(FormatError::ZeroArgumentNumber));
    }

    #[test]
    fn test_oversized_width_is_rejected() {
        let too_large = Err(FormatError::WidthTooLarge {
            max: MAX_FIELD_WIDTH,
        });
        assert_eq!(sprintf("%99999999999999999999s", &["x".into()]), too_large);
        assert_eq!(sprintf("%1000000000000s", &["x".into()]), too_large);
        assert_eq!(sprintf("%.5000f", &[1.5.into()]), too_large);

        let widest = sprintf(&format!("%{MAX_FIELD_WIDTH}s"), &["x".into()]).unwrap();
        assert_eq!(widest.len(), MAX_FIELD_WIDTH);
    }

    #[test]
    fn test_protected_placeholders_survive() {
        let out = interpolate("%label must have %d characters (%value)", &[5.into()]).unwrap();
        assert_eq!(out, "%label must have 5 characters (%value)");
        let out = interpolate("%s: %name", &["Field".into()]).unwrap();
        assert_eq!(out, "Field: %name");
    }

    #[test]
    fn test_no_arguments_leaves_template_alone() {
        assert_eq!(interpolate("50% off %s", &[]).unwrap(), "50% off %s");
    }

    #[test]
    fn test_parse_loose() {
        assert_eq!(FormatArg::parse_loose("5"), FormatArg::Int(5));
        assert_eq!(FormatArg::parse_loose("2.5"), FormatArg::Float(2.5));
        assert_eq!(FormatArg::parse_loose("five"), FormatArg::Str("five".into()));
    }
}
