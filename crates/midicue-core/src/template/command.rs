//! printf-style command line templates: `plaympeg %(data1)03i-playback.mp3`.

use super::Field;
use crate::error::TemplateError;
use crate::event::Event;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Decimal,
    Octal,
    HexLower,
    HexUpper,
    Char,
    Str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormatSpec {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alt: bool,
    width: usize,
    precision: Option<usize>,
    conversion: Conversion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field { field: Field, spec: FormatSpec },
}

/// Parsed command line template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl CommandTemplate {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }

            match chars.next() {
                Some((_, '%')) => literal.push('%'),
                Some((_, '(')) => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some((_, ')')) => break,
                            Some((_, ch)) => name.push(ch),
                            None => {
                                return Err(TemplateError::BadSpec {
                                    offset,
                                    reason: "unterminated placeholder name".into(),
                                })
                            }
                        }
                    }
                    let field =
                        Field::from_name(&name).ok_or(TemplateError::UnknownField(name))?;

                    let mut spec = FormatSpec {
                        left: false,
                        plus: false,
                        space: false,
                        zero: false,
                        alt: false,
                        width: 0,
                        precision: None,
                        conversion: Conversion::Decimal,
                    };

                    while let Some(&(_, flag)) = chars.peek() {
                        match flag {
                            '-' => spec.left = true,
                            '+' => spec.plus = true,
                            ' ' => spec.space = true,
                            '0' => spec.zero = true,
                            '#' => spec.alt = true,
                            _ => break,
                        }
                        chars.next();
                    }

                    spec.width = take_number(&mut chars).unwrap_or(0);
                    if chars.next_if(|&(_, ch)| ch == '.').is_some() {
                        spec.precision = Some(take_number(&mut chars).unwrap_or(0));
                    }
                    // Length modifiers are accepted and ignored.
                    while chars.next_if(|&(_, ch)| matches!(ch, 'h' | 'l' | 'L')).is_some() {}

                    spec.conversion = match chars.next() {
                        Some((_, 'd' | 'i' | 'u')) => Conversion::Decimal,
                        Some((_, 'o')) => Conversion::Octal,
                        Some((_, 'x')) => Conversion::HexLower,
                        Some((_, 'X')) => Conversion::HexUpper,
                        Some((_, 'c')) => Conversion::Char,
                        Some((_, 's' | 'r')) => Conversion::Str,
                        Some((_, other)) => {
                            return Err(TemplateError::BadSpec {
                                offset,
                                reason: format!("unsupported conversion '{}'", other),
                            })
                        }
                        None => {
                            return Err(TemplateError::BadSpec {
                                offset,
                                reason: "missing conversion type".into(),
                            })
                        }
                    };

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field { field, spec });
                }
                _ => {
                    return Err(TemplateError::BadSpec {
                        offset,
                        reason: "placeholders must be named, e.g. %(data1)i".into(),
                    })
                }
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn render(&self, event: &Event) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len() + 8);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { field, spec } => {
                    out.push_str(&format_value(*field, field.value(event), spec)?)
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn take_number<I>(chars: &mut std::iter::Peekable<I>) -> Option<usize>
where
    I: Iterator<Item = (usize, char)>,
{
    let mut number: Option<usize> = None;
    while let Some((_, digit)) = chars.next_if(|&(_, ch)| ch.is_ascii_digit()) {
        let d = digit as usize - '0' as usize;
        number = Some(number.unwrap_or(0).saturating_mul(10).saturating_add(d));
    }
    number
}

fn format_value(field: Field, value: Option<u8>, spec: &FormatSpec) -> Result<String, TemplateError> {
    let text = match spec.conversion {
        Conversion::Str => {
            let text = value.map_or_else(|| "None".to_string(), |v| v.to_string());
            match spec.precision {
                Some(p) => text.chars().take(p).collect(),
                None => text,
            }
        }
        Conversion::Char => {
            let v = value.ok_or(TemplateError::MissingField(field.name()))?;
            char::from(v).to_string()
        }
        numeric => {
            let v = value.ok_or(TemplateError::MissingField(field.name()))?;
            return Ok(format_integer(v, numeric, spec));
        }
    };
    Ok(pad(String::new(), text, spec.width, spec.left, false))
}

fn format_integer(value: u8, conversion: Conversion, spec: &FormatSpec) -> String {
    let (mut digits, prefix) = match conversion {
        Conversion::Octal => (format!("{:o}", value), "0o"),
        Conversion::HexLower => (format!("{:x}", value), "0x"),
        Conversion::HexUpper => (format!("{:X}", value), "0X"),
        _ => (value.to_string(), ""),
    };

    if let Some(precision) = spec.precision {
        if digits.len() < precision {
            digits = format!("{}{}", "0".repeat(precision - digits.len()), digits);
        }
    }

    let mut head = String::new();
    if spec.plus {
        head.push('+');
    } else if spec.space {
        head.push(' ');
    }
    if spec.alt {
        head.push_str(prefix);
    }

    pad(head, digits, spec.width, spec.left, spec.zero)
}

/// Zero padding goes between sign/prefix and digits; left alignment wins over it.
fn pad(head: String, body: String, width: usize, left: bool, zero: bool) -> String {
    let len = head.chars().count() + body.chars().count();
    if len >= width {
        return head + &body;
    }
    let fill = width - len;
    if left {
        format!("{}{}{}", head, body, " ".repeat(fill))
    } else if zero {
        format!("{}{}{}", head, "0".repeat(fill), body)
    } else {
        format!("{}{}{}", " ".repeat(fill), head, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn event(raw: &[u8]) -> Event {
        Event::decode(raw, Duration::ZERO, Duration::ZERO).unwrap()
    }

    fn render(template: &str, raw: &[u8]) -> String {
        CommandTemplate::parse(template).unwrap().render(&event(raw)).unwrap()
    }

    #[test]
    fn test_zero_padded_integer() {
        assert_eq!(render("echo %(data1)03i", &[0xCF, 7]), "echo 007");
        assert_eq!(render("plaympeg %(data1)03i-playback.mp3", &[0xCF, 42]), "plaympeg 042-playback.mp3");
    }

    #[test]
    fn test_all_fields() {
        assert_eq!(
            render("%(channel)d %(status)d %(data1)d %(data2)d", &[0xBF, 14, 3]),
            "16 176 14 3"
        );
    }

    #[test]
    fn test_flags_and_conversions() {
        assert_eq!(render("[%(data1)5d]", &[0xC0, 7]), "[    7]");
        assert_eq!(render("[%(data1)-5d]", &[0xC0, 7]), "[7    ]");
        assert_eq!(render("[%(data1)+d]", &[0xC0, 7]), "[+7]");
        assert_eq!(render("[%(data1)x]", &[0xC0, 255 & 0x7F]), "[7f]");
        assert_eq!(render("[%(status)X]", &[0xC0, 1]), "[C0]");
        assert_eq!(render("[%(data1)#06x]", &[0xC0, 10]), "[0x000a]");
        assert_eq!(render("[%(data1)o]", &[0xC0, 8]), "[10]");
        assert_eq!(render("[%(data1).3d]", &[0xC0, 5]), "[005]");
        assert_eq!(render("[%(data1)c]", &[0xC0, 65]), "[A]");
        assert_eq!(render("[%(data1)s]", &[0xC0, 65]), "[65]");
        assert_eq!(render("100%% %(data1)ld", &[0xC0, 9]), "100% 9");
    }

    #[test]
    fn test_absent_field() {
        let t = CommandTemplate::parse("x %(data2)03i").unwrap();
        assert_eq!(
            t.render(&event(&[0xCF, 7])).unwrap_err(),
            TemplateError::MissingField("data2")
        );
        assert_eq!(render("x %(data2)s", &[0xCF, 7]), "x None");
        assert_eq!(render("ch %(channel)s", &[0xF8]), "ch None");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            CommandTemplate::parse("%(velocity)d").unwrap_err(),
            TemplateError::UnknownField("velocity".into())
        );
        assert!(matches!(
            CommandTemplate::parse("echo %d").unwrap_err(),
            TemplateError::BadSpec { offset: 5, .. }
        ));
        assert!(CommandTemplate::parse("echo %(data1").is_err());
        assert!(CommandTemplate::parse("echo %(data1)").is_err());
        assert!(CommandTemplate::parse("echo %(data1)q").is_err());
        assert!(CommandTemplate::parse("trailing %").is_err());
    }

    #[test]
    fn test_plain_text_round_trips() {
        let t = CommandTemplate::parse("evince 'my sheet.pdf'").unwrap();
        assert_eq!(t.render(&event(&[0xCF, 1])).unwrap(), "evince 'my sheet.pdf'");
        assert_eq!(t.to_string(), "evince 'my sheet.pdf'");
    }
}
