use crate::models::student::StudentProfileRow;

const BUCKET_WEIGHT: f64 = 25.0;

/// Profile completion on four equal buckets: personal details, academic
/// situation (depends on `user_type`), at least one grade, professional values.
/// The sum is truncated toward zero and always lies in `0..=100`.
pub fn completion_percentage(profile: &StudentProfileRow, grade_count: i64, has_values: bool) -> i32 {
    let basic = [
        filled(Some(&profile.first_name)),
        filled(Some(&profile.last_name)),
        filled(profile.phone.as_ref()),
        filled(profile.gender.as_ref()),
        profile.date_of_birth.is_some(),
        filled(profile.city.as_ref()),
        filled(profile.region.as_ref()),
    ];

    let situation: Vec<bool> = if profile.is_university_student() {
        vec![
            filled(profile.university_establishment.as_ref()),
            filled(profile.university_department.as_ref()),
            filled(profile.university_level.as_ref()),
        ]
    } else {
        vec![
            filled(profile.bac_series.as_ref()),
            filled(profile.current_education_level.as_ref()),
        ]
    };

    let mut total = bucket(&basic) + bucket(&situation);
    if grade_count > 0 {
        total += BUCKET_WEIGHT;
    }
    if has_values {
        total += BUCKET_WEIGHT;
    }
    (total as i32).clamp(0, 100)
}

fn filled(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn bucket(fields: &[bool]) -> f64 {
    if fields.is_empty() {
        return 0.0;
    }
    let count = fields.iter().filter(|f| **f).count() as f64;
    count / fields.len() as f64 * BUCKET_WEIGHT
}
