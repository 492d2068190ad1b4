//! Named structural patterns shared across record schemas.
//!
//! Each pattern is compiled once, on first use. The sources are anchored so a
//! match always covers the whole value.

use once_cell::sync::OnceCell;
use regex::Regex;

/// A named, lazily compiled regular expression.
pub struct Pattern {
    pub name: &'static str,
    pub source: &'static str,
    /// Human readable description used in violation messages.
    pub expected: &'static str,
    compiled: OnceCell<Regex>,
}

impl Pattern {
    pub const fn new(name: &'static str, source: &'static str, expected: &'static str) -> Self {
        Self {
            name,
            source,
            expected,
            compiled: OnceCell::new(),
        }
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.compiled
            .get_or_init(|| Regex::new(self.source).expect("built-in pattern must compile"))
            .is_match(value)
    }
}

impl std::fmt::Debug for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pattern")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish()
    }
}

/// USSD dial string: `*N(*N)*#`, e.g. `*123#` or `*123*1#`.
pub static USSD_CODE: Pattern = Pattern::new(
    "ussd_code",
    r"^\*[0-9]+(\*[0-9]+)*#$",
    "a USSD code such as *123*1#",
);

/// Shortcode: 4 to 6 digits.
pub static SHORTCODE: Pattern = Pattern::new("shortcode", r"^[0-9]{4,6}$", "4 to 6 digits");

/// One-time password: exactly 6 digits.
pub static OTP_CODE: Pattern = Pattern::new("otp_code", r"^[0-9]{6}$", "exactly 6 digits");

/// E.164-like phone number: `+` followed by 2 to 15 digits, no leading zero.
pub static PHONE_NUMBER: Pattern = Pattern::new(
    "phone_number",
    r"^\+[1-9][0-9]{1,14}$",
    "an international phone number such as +14155550123",
);

/// ISO 4217 style currency code: three upper-case letters.
pub static CURRENCY_CODE: Pattern = Pattern::new(
    "currency_code",
    r"^[A-Z]{3}$",
    "three upper-case letters such as USD",
);

/// Email address with a dotted domain.
pub static EMAIL: Pattern = Pattern::new(
    "email",
    r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    "a valid email address",
);
