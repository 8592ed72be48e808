use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

use crate::models::student::{USER_TYPE_NEW_BACHELOR, USER_TYPE_UNIVERSITY_STUDENT};

static PERSON_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-ZÀ-ÿ\s'-]+$").expect("valid regex"));
static CAMEROON_PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+237)?[26]\d{8}$").expect("valid regex"));
static ACADEMIC_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{4})$").expect("valid regex"));

pub const GENDERS: [&str; 3] = ["M", "F", "Autre"];
pub const MIN_AGE: i32 = 15;
pub const MAX_AGE: i32 = 100;
pub const FIRST_BAC_YEAR: i32 = 1950;
pub const FIRST_ACADEMIC_YEAR: i32 = 2000;

fn invalid(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// First/last names: 2-100 characters after trimming, letters, spaces, hyphens, apostrophes.
pub fn validate_person_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if !(2..=100).contains(&len) {
        return Err(invalid("name_length", "Name must be between 2 and 100 characters".into()));
    }
    if !PERSON_NAME.is_match(trimmed) {
        return Err(invalid(
            "name_format",
            "Name can only contain letters, spaces, hyphens and apostrophes".into(),
        ));
    }
    Ok(())
}

pub fn validate_user_type(user_type: &str) -> Result<(), ValidationError> {
    if user_type == USER_TYPE_NEW_BACHELOR || user_type == USER_TYPE_UNIVERSITY_STUDENT {
        Ok(())
    } else {
        Err(invalid(
            "user_type",
            format!("User type must be '{USER_TYPE_NEW_BACHELOR}' or '{USER_TYPE_UNIVERSITY_STUDENT}'"),
        ))
    }
}

/// Strips spaces, dashes and parentheses.
pub fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect()
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if CAMEROON_PHONE.is_match(&normalize_phone(phone)) {
        Ok(())
    } else {
        Err(invalid(
            "phone",
            "Invalid Cameroon phone number (expected +237 6XXXXXXXX or 2XXXXXXXX)".into(),
        ))
    }
}

pub fn validate_gender(gender: &str) -> Result<(), ValidationError> {
    if GENDERS.contains(&gender) {
        Ok(())
    } else {
        Err(invalid("gender", "Gender must be 'M', 'F' or 'Autre'".into()))
    }
}

/// Whole years elapsed between `born` and `today`.
pub fn age_on(born: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        age -= 1;
    }
    age
}

pub fn validate_date_of_birth(born: &NaiveDate) -> Result<(), ValidationError> {
    let age = age_on(*born, Utc::now().date_naive());
    if age < MIN_AGE {
        return Err(invalid("date_of_birth", format!("You must be at least {MIN_AGE} years old")));
    }
    if age > MAX_AGE {
        return Err(invalid("date_of_birth", "Invalid date of birth".into()));
    }
    Ok(())
}

pub fn validate_bac_year(year: i32) -> Result<(), ValidationError> {
    let latest = Utc::now().year() + 1;
    if (FIRST_BAC_YEAR..=latest).contains(&year) {
        Ok(())
    } else {
        Err(invalid(
            "bac_year",
            format!("Bac year must be between {FIRST_BAC_YEAR} and {latest}"),
        ))
    }
}

/// `YYYY-YYYY` with consecutive years, starting no earlier than 2000 and no later than next year.
pub fn validate_academic_year(year: &str) -> Result<(), ValidationError> {
    validate_academic_year_at(year, Utc::now().year())
}

fn validate_academic_year_at(year: &str, current_year: i32) -> Result<(), ValidationError> {
    let Some(caps) = ACADEMIC_YEAR.captures(year) else {
        return Err(invalid("academic_year", "Academic year must be in format YYYY-YYYY".into()));
    };
    let first: i32 = caps[1].parse().unwrap_or(0);
    let second: i32 = caps[2].parse().unwrap_or(0);
    if second != first + 1 {
        return Err(invalid("academic_year", "Academic years must be consecutive".into()));
    }
    if first < FIRST_ACADEMIC_YEAR || first > current_year + 1 {
        return Err(invalid(
            "academic_year",
            format!(
                "Academic year must start between {FIRST_ACADEMIC_YEAR} and {}",
                current_year + 1
            ),
        ));
    }
    Ok(())
}
