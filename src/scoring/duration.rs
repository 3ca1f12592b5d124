use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("invalid duration '{0}': expected H:MM:SS or M:SS")]
    Duration(String),
    #[error("invalid number '{0}'")]
    Number(String),
}

/// Parse a clock-style duration into whole seconds.
///
/// Accepts `H:MM:SS` (any number of hours) or `M:SS` (any number of minutes).
/// Minutes in the three-part form and seconds in both forms must be in 0..=59.
pub fn parse_duration(text: &str) -> Result<u64, FormatError> {
    let err = || FormatError::Duration(text.to_string());
    let parts: Vec<&str> = text.trim().split(':').collect();

    let component = |s: &str| -> Result<u64, FormatError> {
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(err());
        }
        s.parse::<u64>().map_err(|_| err())
    };

    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => {
            let minutes = component(*m)?;
            if minutes > 59 {
                return Err(err());
            }
            (component(*h)?, minutes, component(*s)?)
        }
        [m, s] => (0, component(*m)?, component(*s)?),
        _ => return Err(err()),
    };

    if seconds > 59 {
        return Err(err());
    }

    hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(err)
}

/// Parse a decimal that may use either `.` or `,` as the fractional separator
pub fn parse_decimal(text: &str) -> Result<f64, FormatError> {
    let normalized = text.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FormatError::Number(text.to_string())),
    }
}

/// Format seconds-per-unit as "M:SS", truncating both components
pub fn format_pace(seconds_per_unit: f64) -> String {
    let total = whole_seconds(seconds_per_unit);
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format elapsed seconds as "HH:MM:SS", truncating to whole seconds
pub fn format_clock(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    }
}
