//! Structural rules for a username/password pair.
//!
//! Each rule is a named predicate with the message reported when it fails.
//! Every failing rule is reported, not just the first.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A pair that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCredentials {
    username: String,
    password: String,
}

impl ValidCredentials {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

struct Rule {
    check: fn(&str) -> bool,
    message: &'static str,
}

lazy_static! {
    static ref UPPERCASE_RE: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref LOWERCASE_RE: Regex = Regex::new(r"[a-z]").unwrap();
    static ref DIGIT_RE: Regex = Regex::new(r"[0-9]").unwrap();
    static ref SPECIAL_RE: Regex = Regex::new(r"[^A-Za-z0-9]").unwrap();
}

// Lengths are UTF-16 code units, so a character outside the BMP counts as two.
fn len(s: &str) -> usize {
    s.encode_utf16().count()
}

fn username_long_enough(s: &str) -> bool {
    len(s) >= USERNAME_MIN
}

fn username_short_enough(s: &str) -> bool {
    len(s) <= USERNAME_MAX
}

fn password_long_enough(s: &str) -> bool {
    len(s) >= PASSWORD_MIN
}

fn has_uppercase(s: &str) -> bool {
    UPPERCASE_RE.is_match(s)
}

fn has_lowercase(s: &str) -> bool {
    LOWERCASE_RE.is_match(s)
}

fn has_digit(s: &str) -> bool {
    DIGIT_RE.is_match(s)
}

fn has_special(s: &str) -> bool {
    SPECIAL_RE.is_match(s)
}

const USERNAME_RULES: &[Rule] = &[
    Rule {
        check: username_long_enough,
        message: "String must contain at least 3 character(s)",
    },
    Rule {
        check: username_short_enough,
        message: "String must contain at most 50 character(s)",
    },
];

const PASSWORD_RULES: &[Rule] = &[
    Rule {
        check: password_long_enough,
        message: "String must contain at least 12 character(s)",
    },
    Rule {
        check: has_uppercase,
        message: "Must contain uppercase",
    },
    Rule {
        check: has_lowercase,
        message: "Must contain lowercase",
    },
    Rule {
        check: has_digit,
        message: "Must contain number",
    },
    Rule {
        check: has_special,
        message: "Must contain special character",
    },
];

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Checks one field and returns its text when it is a string, whether or not the rules passed.
fn check_field<'a>(
    field: &'static str,
    value: Option<&'a Value>,
    rules: &[Rule],
    errors: &mut Vec<FieldError>,
) -> Option<&'a str> {
    let text = match value {
        None => {
            errors.push(FieldError::new(field, "Required"));
            return None;
        }
        Some(Value::String(text)) => text.as_str(),
        Some(other) => {
            errors.push(FieldError::new(
                field,
                format!("Expected string, received {}", json_type(other)),
            ));
            return None;
        }
    };
    errors.extend(
        rules
            .iter()
            .filter(|rule| !(rule.check)(text))
            .map(|rule| FieldError::new(field, rule.message)),
    );
    Some(text)
}

/// Validates a candidate pair taken from an untyped JSON body.
///
/// A `None` field is reported as missing, a non-string one by its JSON type.
/// Each field is checked independently, so a bad username never hides password errors.
pub fn validate(
    username: Option<&Value>,
    password: Option<&Value>,
) -> Result<ValidCredentials, Vec<FieldError>> {
    let mut errors = Vec::new();
    let username = check_field("username", username, USERNAME_RULES, &mut errors);
    let password = check_field("password", password, PASSWORD_RULES, &mut errors);

    match (username, password) {
        (Some(u), Some(p)) if errors.is_empty() => Ok(ValidCredentials {
            username: u.to_string(),
            password: p.to_string(),
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GOOD_PASSWORD: &str = "StrongP@ssword123!";

    fn check(username: &str, password: &str) -> Result<ValidCredentials, Vec<FieldError>> {
        validate(Some(&json!(username)), Some(&json!(password)))
    }

    fn messages(errors: &[FieldError], field: &str) -> Vec<String> {
        errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.clone())
            .collect()
    }

    #[test]
    fn accepts_valid_pair() {
        let creds = check("chuks", GOOD_PASSWORD).expect("should be valid");
        assert_eq!(creds.username(), "chuks");
        assert_eq!(creds.password(), GOOD_PASSWORD);
    }

    #[test]
    fn username_length_bounds_are_inclusive() {
        assert!(check("abc", GOOD_PASSWORD).is_ok());
        assert!(check(&"a".repeat(50), GOOD_PASSWORD).is_ok());

        let errors = check("ab", GOOD_PASSWORD).unwrap_err();
        assert_eq!(
            messages(&errors, "username"),
            vec!["String must contain at least 3 character(s)"]
        );

        let errors = check(&"a".repeat(51), GOOD_PASSWORD).unwrap_err();
        assert_eq!(
            messages(&errors, "username"),
            vec!["String must contain at most 50 character(s)"]
        );
    }

    #[test]
    fn username_content_is_unrestricted() {
        assert!(check("a b@#", GOOD_PASSWORD).is_ok());
        assert!(check("ñandú", GOOD_PASSWORD).is_ok());
    }

    #[test]
    fn username_length_is_not_bytes() {
        // two code units, six bytes
        let errors = check("日本", GOOD_PASSWORD).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "username");
    }

    #[test]
    fn astral_characters_count_as_two_units() {
        // one emoji plus one letter is three UTF-16 units
        assert!(check("😀a", GOOD_PASSWORD).is_ok());
        // eight characters, twelve units
        assert!(check("chuks", "Aa1!😀😀😀😀").is_ok());

        let errors = check("😀", GOOD_PASSWORD).unwrap_err();
        assert_eq!(
            messages(&errors, "username"),
            vec!["String must contain at least 3 character(s)"]
        );
        assert!(check(&"😀".repeat(25), GOOD_PASSWORD).is_ok());
        assert!(check(&format!("{}a", "😀".repeat(25)), GOOD_PASSWORD).is_err());
    }

    #[test]
    fn short_password_reports_every_violation() {
        let errors = check("chuks2", "short").unwrap_err();
        assert!(messages(&errors, "username").is_empty());
        assert_eq!(
            messages(&errors, "password"),
            vec![
                "String must contain at least 12 character(s)",
                "Must contain uppercase",
                "Must contain number",
                "Must contain special character",
            ]
        );
    }

    #[test]
    fn each_character_class_is_required() {
        let cases = [
            ("strongp@ssword123!", "Must contain uppercase"),
            ("STRONGP@SSWORD123!", "Must contain lowercase"),
            ("StrongP@sswordabc!", "Must contain number"),
            ("StrongPassword1234", "Must contain special character"),
        ];
        for (password, expected) in cases {
            let errors = check("chuks", password).unwrap_err();
            assert_eq!(messages(&errors, "password"), vec![expected], "{}", password);
        }
    }

    #[test]
    fn non_ascii_counts_as_special() {
        assert!(check("chuks", "StrongPässword123").is_ok());
    }

    #[test]
    fn both_fields_fail_together() {
        let errors = check("ab", "short").unwrap_err();
        assert_eq!(messages(&errors, "username").len(), 1);
        assert_eq!(messages(&errors, "password").len(), 4);
    }

    #[test]
    fn missing_fields_are_required() {
        let errors = validate(None, None).unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::new("username", "Required"),
                FieldError::new("password", "Required"),
            ]
        );
    }

    #[test]
    fn wrong_type_is_reported_and_other_field_still_checked() {
        let errors = validate(Some(&json!(42)), Some(&json!("short"))).unwrap_err();
        assert_eq!(
            messages(&errors, "username"),
            vec!["Expected string, received number"]
        );
        assert_eq!(messages(&errors, "password").len(), 4);
    }

    #[test]
    fn wrong_type_names_the_json_type() {
        let cases = [
            (json!(null), "null"),
            (json!(true), "boolean"),
            (json!(1.5), "number"),
            (json!(["chuks"]), "array"),
            (json!({"name": "chuks"}), "object"),
        ];
        for (value, kind) in cases {
            let errors = validate(Some(&json!("chuks")), Some(&value)).unwrap_err();
            assert_eq!(
                errors,
                vec![FieldError::new(
                    "password",
                    format!("Expected string, received {}", kind)
                )]
            );
        }
    }
}
