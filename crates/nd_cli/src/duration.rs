use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A duration written like `90`, `30s`, `5m` or `1h15m30s`. Bare numbers are
/// seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut total = 0u64;
        let mut digits = String::new();
        let mut parts = 0;

        for c in s.chars().filter(|c| !c.is_whitespace()) {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let value: u64 = digits
                .parse()
                .map_err(|_| format!("Expected a number before '{}'", c))?;
            let unit = match c {
                's' => 1,
                'm' => 60,
                'h' => 3600,
                'd' => 86400,
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            total = value
                .checked_mul(unit)
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(|| "Duration is too large".to_string())?;
            digits.clear();
            parts += 1;
        }

        if !digits.is_empty() {
            let secs = digits
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total = total
                .checked_add(secs)
                .ok_or_else(|| "Duration is too large".to_string())?;
            parts += 1;
        }

        if parts == 0 {
            return Err("Duration must include a number".to_string());
        }
        if total == 0 {
            return Err("Duration must be greater than zero".to_string());
        }
        Ok(HumanDuration(Duration::from_secs(total)))
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0.as_secs())
    }
}
