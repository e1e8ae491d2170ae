//! Presentation transforms for single decoded fields

use crate::record::FieldValue;

/// A stateless transform applied to one field for display.
///
/// Returns `None` when the input cannot be presented; never a placeholder.
pub trait ValueFormatter: Send + Sync {
    fn format(&self, value: Option<&FieldValue>) -> Option<FieldValue>;
}

/// Returns the value unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl ValueFormatter for Passthrough {
    fn format(&self, value: Option<&FieldValue>) -> Option<FieldValue> {
        value.cloned()
    }
}

/// Renders a centiseconds-since-boot counter as `D:HH:MM:SS`.
///
/// Accepts an integer or a numeric string. Negative input clamps to zero;
/// days are not padded.
#[derive(Debug, Clone, Copy, Default)]
pub struct UptimeFormatter;

impl ValueFormatter for UptimeFormatter {
    fn format(&self, value: Option<&FieldValue>) -> Option<FieldValue> {
        let centiseconds = match value? {
            FieldValue::Int(v) => *v,
            FieldValue::Text(s) => s.trim().parse::<i64>().ok()?,
        };
        Some(FieldValue::Text(format_centiseconds(centiseconds)))
    }
}

/// Format a centisecond count as `D:HH:MM:SS`
pub fn format_centiseconds(centiseconds: i64) -> String {
    let seconds = centiseconds.max(0) / 100;
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;
    format!("{}:{:02}:{:02}:{:02}", days, hours, minutes, secs)
}

/// Formatter selection for a displayed reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatterKind {
    Passthrough,
    Uptime,
}

impl FormatterKind {
    pub fn formatter(self) -> &'static dyn ValueFormatter {
        match self {
            FormatterKind::Passthrough => &Passthrough,
            FormatterKind::Uptime => &UptimeFormatter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text(s: &str) -> Option<FieldValue> {
        Some(FieldValue::Text(s.to_string()))
    }

    #[rstest]
    #[case(Some(FieldValue::Int(366100)), text("0:01:01:01"))]
    #[case(Some(FieldValue::Int(9006100)), text("1:01:01:01"))]
    #[case(Some(FieldValue::Int(-500)), text("0:00:00:00"))]
    #[case(Some(FieldValue::Int(-5000)), text("0:00:00:00"))]
    #[case(Some(FieldValue::Int(0)), text("0:00:00:00"))]
    #[case(Some(FieldValue::Int(24 * 3600 * 100)), text("1:00:00:00"))]
    #[case(Some(FieldValue::Int(99)), text("0:00:00:00"))]
    #[case(text("366100"), text("0:01:01:01"))]
    #[case(text(" 366100 "), text("0:01:01:01"))]
    #[case(text("not-a-number"), None)]
    #[case(text(""), None)]
    #[case(None, None)]
    fn test_uptime_formatter(#[case] input: Option<FieldValue>, #[case] expected: Option<FieldValue>) {
        assert_eq!(UptimeFormatter.format(input.as_ref()), expected);
    }

    #[test]
    fn test_many_days_are_not_padded() {
        assert_eq!(format_centiseconds(123 * 86_400 * 100 + 5 * 100), "123:00:00:05");
    }

    #[test]
    fn test_passthrough() {
        let value = FieldValue::Int(42);
        assert_eq!(Passthrough.format(Some(&value)), Some(FieldValue::Int(42)));
        assert_eq!(Passthrough.format(None), None);
    }

    #[test]
    fn test_formatter_kind() {
        let value = FieldValue::Int(366100);
        assert_eq!(
            FormatterKind::Uptime.formatter().format(Some(&value)),
            text("0:01:01:01")
        );
        assert_eq!(
            FormatterKind::Passthrough.formatter().format(Some(&value)),
            Some(value)
        );
    }
}
