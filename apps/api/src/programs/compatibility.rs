//! Student ↔ program compatibility.
//!
//! Five sub-scores, each bounded to 0–100, combined with one fixed weight set:
//! RIASEC 30 %, grades 25 %, values 20 %, employment 15 %, financial 10 %.
//! The same scorer backs the per-program check and recommendation generation.

use serde::Serialize;

use crate::models::program::ProgramRow;
use crate::models::student::{AcademicGradeRow, ValueRatings, WorkValue};

/// Neutral sub-score used whenever the inputs for a criterion are missing.
pub const NEUTRAL_SCORE: i32 = 50;

/// Criterion weights in percent; they sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Weights {
    pub riasec: i32,
    pub grades: i32,
    pub values: i32,
    pub employment: i32,
    pub financial: i32,
}

pub const WEIGHTS: Weights = Weights {
    riasec: 30,
    grades: 25,
    values: 20,
    employment: 15,
    financial: 10,
};

impl Weights {
    pub fn fraction(percent: i32) -> f64 {
        percent as f64 / 100.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Inputs / outputs
// ────────────────────────────────────────────────────────────────────────────

/// Everything about the student the scorer looks at.
#[derive(Debug, Clone, Copy)]
pub struct StudentSignals<'a> {
    pub holland_code: Option<&'a str>,
    pub bac_grade: Option<i32>,
    pub max_annual_budget: Option<i32>,
    pub grades: &'a [AcademicGradeRow],
    pub values: Option<ValueRatings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubScores {
    pub riasec: i32,
    pub grades: i32,
    pub values: i32,
    pub employment: i32,
    pub financial: i32,
}

impl SubScores {
    pub fn total(&self) -> i32 {
        let weighted = self.riasec * WEIGHTS.riasec
            + self.grades * WEIGHTS.grades
            + self.values * WEIGHTS.values
            + self.employment * WEIGHTS.employment
            + self.financial * WEIGHTS.financial;
        (weighted / 100).clamp(0, 100)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Ranking {
    #[serde(rename = "Fortement recommandé")]
    HighlyRecommended,
    #[serde(rename = "Recommandé")]
    Recommended,
    #[serde(rename = "À considérer")]
    ToConsider,
    #[serde(rename = "Non recommandé")]
    NotRecommended,
}

impl Ranking {
    pub fn from_total(total: i32) -> Self {
        match total {
            t if t >= 80 => Ranking::HighlyRecommended,
            t if t >= 65 => Ranking::Recommended,
            t if t >= 50 => Ranking::ToConsider,
            _ => Ranking::NotRecommended,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Ranking::HighlyRecommended => "Fortement recommandé",
            Ranking::Recommended => "Recommandé",
            Ranking::ToConsider => "À considérer",
            Ranking::NotRecommended => "Non recommandé",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compatibility {
    pub scores: SubScores,
    pub total: i32,
}

impl Compatibility {
    pub fn ranking(&self) -> Ranking {
        Ranking::from_total(self.total)
    }
}

pub fn evaluate(student: &StudentSignals<'_>, program: &ProgramRow) -> Compatibility {
    let scores = SubScores {
        riasec: student
            .holland_code
            .map_or(NEUTRAL_SCORE, |code| riasec_score(code, &program.riasec_match)),
        grades: grades_score(student.bac_grade, student.grades, program),
        values: values_score(student.values.as_ref(), &program.riasec_match),
        employment: employment_score(program.employment_rate),
        financial: financial_score(program.annual_tuition, student.max_annual_budget),
    };
    Compatibility {
        total: scores.total(),
        scores,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sub-scores
// ────────────────────────────────────────────────────────────────────────────

/// Positional letter overlap between two Holland codes.
pub fn riasec_score(student_code: &str, program_code: &str) -> i32 {
    let s: Vec<char> = student_code.chars().collect();
    let p: Vec<char> = program_code.chars().collect();
    if s.is_empty() || p.is_empty() {
        return 0;
    }

    let mut score = 0;
    if s[0] == p[0] {
        score += 60;
    }
    if s.len() > 1 && p.len() > 1 {
        if s[1] == p[1] {
            score += 30;
        } else if s[0] == p[1] {
            score += 20;
        }
    }
    if s.len() > 2 && p.len() > 2 {
        if s[2] == p[2] {
            score += 10;
        } else if s[1] == p[2] {
            score += 5;
        }
    }
    score.min(100)
}

fn bac_part(bac_grade: i32, min_bac_grade: i32) -> i32 {
    if bac_grade >= min_bac_grade {
        if bac_grade >= 15 {
            100
        } else if bac_grade >= min_bac_grade + 2 {
            80
        } else {
            60
        }
    } else {
        (50 - (min_bac_grade - bac_grade) * 10).max(0)
    }
}

fn subject_part(grades: &[AcademicGradeRow], required: &[String]) -> i32 {
    if required.is_empty() {
        return NEUTRAL_SCORE;
    }
    let matching: Vec<i32> = grades
        .iter()
        .filter(|g| required.iter().any(|s| s == &g.subject))
        .map(|g| g.grade)
        .collect();
    if matching.is_empty() {
        return NEUTRAL_SCORE;
    }

    let average = matching.iter().sum::<i32>() as f64 / matching.len() as f64;
    if average >= 15.0 {
        100
    } else if average >= 12.0 {
        80
    } else if average >= 10.0 {
        60
    } else {
        40
    }
}

/// 70 % bac grade against the program minimum, 30 % required-subject average.
pub fn grades_score(bac_grade: Option<i32>, grades: &[AcademicGradeRow], program: &ProgramRow) -> i32 {
    let (Some(bac), Some(min)) = (bac_grade, program.min_bac_grade) else {
        return NEUTRAL_SCORE;
    };
    let bac = bac_part(bac, min);
    let subjects = subject_part(grades, program.required_subjects());
    ((bac * 7 + subjects * 3) / 10).clamp(0, 100)
}

/// Values each RIASEC letter cares about, weighted in tenths.
pub fn value_weights(letter: char) -> &'static [(WorkValue, i32)] {
    use WorkValue::*;
    match letter {
        'I' => &[(Autonomy, 4), (Creativity, 3), (Prestige, 2), (Variety, 1)],
        'A' => &[(Creativity, 5), (Autonomy, 3), (Variety, 2)],
        'S' => &[(HelpingOthers, 5), (WorkLifeBalance, 3), (JobSecurity, 2)],
        'E' => &[(Prestige, 4), (Salary, 3), (Autonomy, 2), (Variety, 1)],
        'C' => &[(JobSecurity, 4), (WorkLifeBalance, 3), (Salary, 2), (Prestige, 1)],
        _ => &[(Autonomy, 3), (JobSecurity, 3), (Salary, 2), (Variety, 2)],
    }
}

pub fn values_score(values: Option<&ValueRatings>, program_code: &str) -> i32 {
    let Some(values) = values else {
        return NEUTRAL_SCORE;
    };
    let letter = program_code.chars().next().unwrap_or('R');
    let weights = value_weights(letter);

    // a 1..=5 rating maps onto 0..=100 in steps of 25
    let (sum, total_weight) = weights.iter().fold((0, 0), |(sum, tw), (value, w)| {
        let normalized = (values.get(*value) - 1) * 25;
        (sum + normalized * w, tw + w)
    });
    if total_weight <= 0 {
        return NEUTRAL_SCORE;
    }
    (sum / total_weight).clamp(0, 100)
}

pub fn employment_score(employment_rate: Option<i32>) -> i32 {
    employment_rate.map_or(NEUTRAL_SCORE, |r| r.clamp(0, 100))
}

/// Tuition against the declared budget ceiling.
pub fn financial_score(annual_tuition: i32, max_annual_budget: Option<i32>) -> i32 {
    let Some(budget) = max_annual_budget.filter(|b| *b > 0) else {
        return NEUTRAL_SCORE;
    };
    let (tuition, budget) = (annual_tuition as i64 * 10, budget as i64);
    if tuition <= budget * 10 {
        100
    } else if tuition <= budget * 12 {
        70
    } else if tuition <= budget * 15 {
        40
    } else {
        20
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Explanations
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct CriterionScore {
    pub criterion: &'static str,
    pub score: i32,
    pub weight: f64,
    pub weighted_score: f64,
    pub details: String,
}

/// Context used to describe each criterion to the student.
pub struct CriterionContext<'a> {
    pub holland_code: Option<&'a str>,
    pub bac_grade: Option<i32>,
    pub max_annual_budget: Option<i32>,
}

fn fmt_opt(value: Option<i32>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

/// Thousands grouped with spaces, as amounts are printed in FCFA.
pub fn format_fcfa(amount: i32) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    if amount < 0 {
        grouped.insert(0, '-');
    }
    format!("{grouped} FCFA")
}

pub fn criteria(
    compat: &Compatibility,
    ctx: &CriterionContext<'_>,
    program: &ProgramRow,
) -> Vec<CriterionScore> {
    let s = &compat.scores;
    let entry = |criterion, score: i32, weight: i32, details: String| CriterionScore {
        criterion,
        score,
        weight: Weights::fraction(weight),
        weighted_score: score as f64 * Weights::fraction(weight),
        details,
    };

    let financial_details = match ctx.max_annual_budget {
        Some(budget) if budget > 0 => format!(
            "Frais annuels: {}, Budget: {}",
            format_fcfa(program.annual_tuition),
            format_fcfa(budget)
        ),
        _ => format!("Frais: {}", format_fcfa(program.annual_tuition)),
    };

    vec![
        entry(
            "RIASEC Match",
            s.riasec,
            WEIGHTS.riasec,
            format!(
                "Votre code Holland ({}) vs Programme ({})",
                ctx.holland_code.unwrap_or("N/A"),
                program.riasec_match
            ),
        ),
        entry(
            "Résultats académiques",
            s.grades,
            WEIGHTS.grades,
            format!(
                "Note bac: {}/20, Requis: {}/20",
                fmt_opt(ctx.bac_grade),
                fmt_opt(program.min_bac_grade)
            ),
        ),
        entry(
            "Valeurs professionnelles",
            s.values,
            WEIGHTS.values,
            "Alignement entre vos valeurs et le profil du programme".to_string(),
        ),
        entry(
            "Perspectives d'emploi",
            s.employment,
            WEIGHTS.employment,
            format!("Taux d'emploi: {}%", fmt_opt(program.employment_rate)),
        ),
        entry(
            "Accessibilité financière",
            s.financial,
            WEIGHTS.financial,
            financial_details,
        ),
    ]
}

pub const NO_STRENGTH: &str = "Aucun point fort majeur identifié";
pub const NO_WEAKNESS: &str = "Aucune faiblesse majeure identifiée";

fn or_default(items: Vec<String>, fallback: &str) -> Vec<String> {
    if items.is_empty() {
        vec![fallback.to_string()]
    } else {
        items
    }
}

/// Strengths and weaknesses for the per-program check: one line per criterion
/// scoring at least 70 or below 50.
pub fn criterion_highlights(criteria: &[CriterionScore]) -> (Vec<String>, Vec<String>) {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    for c in criteria {
        if c.score >= 70 {
            strengths.push(format!("{}: {}%", c.criterion, c.score));
        } else if c.score < 50 {
            weaknesses.push(format!("{}: {}%", c.criterion, c.score));
        }
    }
    (or_default(strengths, NO_STRENGTH), or_default(weaknesses, NO_WEAKNESS))
}

pub fn check_advice(compat: &Compatibility) -> String {
    let ranking = compat.ranking();
    let follow_up = match ranking {
        Ranking::HighlyRecommended => {
            "Vos profil et intérêts correspondent très bien à ce programme. C'est un excellent choix!"
        }
        Ranking::Recommended => {
            "Ce programme correspond bien à votre profil. Nous vous encourageons à postuler."
        }
        Ranking::ToConsider => {
            "Ce programme pourrait vous convenir, mais examinez attentivement les points faibles identifiés."
        }
        Ranking::NotRecommended => {
            "Ce programme ne semble pas optimal pour votre profil. Considérez d'autres options mieux adaptées."
        }
    };
    format!(
        "Avec un score de {}%, ce programme est {}. {follow_up}",
        compat.total,
        ranking.label().to_lowercase()
    )
}

/// Narrative notes stored alongside a generated recommendation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationNotes {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub advice: String,
}

pub fn recommendation_notes(compat: &Compatibility) -> RecommendationNotes {
    let s = &compat.scores;
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    match s.riasec {
        r if r >= 70 => strengths.push(format!("Excellente compatibilité de personnalité ({r}%)")),
        r if r >= 50 => strengths.push(format!("Bonne compatibilité de personnalité ({r}%)")),
        r => weaknesses.push(format!("Compatibilité de personnalité limitée ({r}%)")),
    }

    match s.grades {
        g if g >= 70 => strengths.push(format!("Votre profil académique est très adapté ({g}%)")),
        g if g >= 50 => strengths.push(format!("Votre profil académique est adapté ({g}%)")),
        g => weaknesses.push(format!(
            "Votre profil académique pourrait nécessiter un effort supplémentaire ({g}%)"
        )),
    }

    if s.values >= 70 {
        strengths.push(format!(
            "Alignement fort avec vos valeurs professionnelles ({}%)",
            s.values
        ));
    } else if s.values < 50 {
        weaknesses.push(format!(
            "Alignement limité avec vos valeurs professionnelles ({}%)",
            s.values
        ));
    }

    if s.employment >= 70 {
        strengths.push(format!(
            "Excellent taux d'insertion professionnelle ({}%)",
            s.employment
        ));
    } else if s.employment < 50 {
        weaknesses.push(format!(
            "Taux d'insertion professionnelle à considérer ({}%)",
            s.employment
        ));
    }

    if s.financial >= 80 {
        strengths.push("Les frais sont bien adaptés à votre budget".to_string());
    } else if s.financial < 50 {
        weaknesses.push("Les frais dépassent votre budget prévu".to_string());
    }

    let advice = match compat.total {
        t if t >= 75 => "Cette formation est fortement recommandée pour votre profil. Elle correspond bien à vos aspirations et capacités.",
        t if t >= 60 => "Cette formation est recommandée pour votre profil. Assurez-vous de bien comprendre les exigences.",
        t if t >= 45 => "Cette formation pourrait vous convenir, mais nécessite une attention particulière aux domaines moins compatibles.",
        _ => "Cette formation présente des défis importants par rapport à votre profil. Explorez d'autres options mieux adaptées.",
    };

    RecommendationNotes {
        strengths,
        weaknesses,
        advice: advice.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::Utc;
    use sqlx::types::Json;
    use uuid::Uuid;

    use super::*;

    pub(crate) fn program(code: &str, riasec: &str, level: &str) -> ProgramRow {
        ProgramRow {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: format!("Programme {code}"),
            university: Some("Université de Bertoua".to_string()),
            level: level.to_string(),
            domain: Some("Sciences".to_string()),
            duration_years: Some(3),
            department: "Informatique".to_string(),
            description: "Formation".to_string(),
            objectives: None,
            career_prospects: None,
            required_bac_series: Json(vec!["C".to_string(), "D".to_string()]),
            min_bac_grade: Some(10),
            required_subjects: Some(Json(vec!["Mathématiques".to_string()])),
            riasec_match: riasec.to_string(),
            registration_fee: 50_000,
            annual_tuition: 100_000,
            total_cost_3years: 300_000,
            employment_rate: Some(75),
            average_starting_salary: None,
            capacity: 100,
            is_active: true,
            master_program_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn grade(subject: &str, value: i32) -> AcademicGradeRow {
        AcademicGradeRow {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            subject: subject.to_string(),
            grade: value,
            coefficient: 1,
            academic_year: "2023-2024".to_string(),
            term: "1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn values(all: i32) -> ValueRatings {
        ValueRatings {
            autonomy: all,
            creativity: all,
            helping_others: all,
            job_security: all,
            salary: all,
            work_life_balance: all,
            prestige: all,
            variety: all,
        }
    }

    #[test]
    fn test_riasec_positional_points() {
        assert_eq!(riasec_score("IRC", "IRC"), 100);
        assert_eq!(riasec_score("IRC", "IRE"), 90);
        assert_eq!(riasec_score("ISA", "RIA"), 20 + 10);
        assert_eq!(riasec_score("ISA", "CAS"), 5);
        assert_eq!(riasec_score("ISA", "I"), 60);
        assert_eq!(riasec_score("", "RIA"), 0);
        assert_eq!(riasec_score("RIA", ""), 0);
    }

    #[test]
    fn test_grades_neutral_without_minimum() {
        let mut p = program("X", "IRC", "Licence");
        p.min_bac_grade = None;
        assert_eq!(grades_score(Some(18), &[], &p), 50);
        assert_eq!(grades_score(None, &[], &program("X", "IRC", "Licence")), 50);
    }

    #[test]
    fn test_grades_blend_bac_and_subjects() {
        let p = program("X", "IRC", "Licence");
        // bac 16 -> 100, maths avg 13 -> 80: 70 + 24
        let grades = vec![grade("Mathématiques", 12), grade("Mathématiques", 14), grade("Français", 5)];
        assert_eq!(grades_score(Some(16), &grades, &p), 94);
        // bac 11 (min 10) -> 60, no matching grades -> 50: 42 + 15
        assert_eq!(grades_score(Some(11), &[grade("Histoire", 18)], &p), 57);
        // below minimum by 2 -> 30, subjects 40: 21 + 12
        assert_eq!(grades_score(Some(8), &[grade("Mathématiques", 9)], &p), 33);
        // far below minimum floors at 0
        let mut strict = program("Y", "IRC", "Licence");
        strict.min_bac_grade = Some(16);
        strict.required_subjects = None;
        assert_eq!(grades_score(Some(9), &[], &strict), 15);
    }

    #[test]
    fn test_values_weighted_by_program_letter() {
        assert_eq!(values_score(None, "SAE"), 50);
        assert_eq!(values_score(Some(&values(5)), "SAE"), 100);
        assert_eq!(values_score(Some(&values(1)), "C"), 0);

        let mut v = values(1);
        v.creativity = 5;
        // A: creativity .5 of weight 1.0
        assert_eq!(values_score(Some(&v), "AIS"), 50);
        // unknown letter falls back to the R table, which ignores creativity
        assert_eq!(values_score(Some(&v), "XYZ"), 0);
        assert_eq!(values_score(Some(&v), ""), 0);
    }

    #[test]
    fn test_financial_buckets() {
        assert_eq!(financial_score(100_000, None), 50);
        assert_eq!(financial_score(100_000, Some(100_000)), 100);
        assert_eq!(financial_score(120_000, Some(100_000)), 70);
        assert_eq!(financial_score(150_000, Some(100_000)), 40);
        assert_eq!(financial_score(150_001, Some(100_000)), 20);
    }

    #[test]
    fn test_total_and_ranking() {
        let scores = SubScores {
            riasec: 100,
            grades: 94,
            values: 75,
            employment: 75,
            financial: 100,
        };
        // 30 + 23.5 + 15 + 11.25 + 10 = 89.75
        assert_eq!(scores.total(), 89);
        assert_eq!(Ranking::from_total(89), Ranking::HighlyRecommended);
        assert_eq!(Ranking::from_total(65), Ranking::Recommended);
        assert_eq!(Ranking::from_total(50), Ranking::ToConsider);
        assert_eq!(Ranking::from_total(49).label(), "Non recommandé");
    }

    #[test]
    fn test_evaluate_bounds_every_score() {
        let grades = vec![grade("Mathématiques", 20)];
        for code in ["RIA", "SEC", "C", ""] {
            for budget in [None, Some(1), Some(10_000_000)] {
                let signals = StudentSignals {
                    holland_code: Some("ISA"),
                    bac_grade: Some(20),
                    max_annual_budget: budget,
                    grades: &grades,
                    values: Some(values(3)),
                };
                let c = evaluate(&signals, &program("P", code, "Licence"));
                for s in [c.scores.riasec, c.scores.grades, c.scores.values, c.scores.employment, c.scores.financial, c.total] {
                    assert!((0..=100).contains(&s));
                }
            }
        }
    }

    #[test]
    fn test_missing_test_is_neutral() {
        let signals = StudentSignals {
            holland_code: None,
            bac_grade: None,
            max_annual_budget: None,
            grades: &[],
            values: None,
        };
        let mut p = program("P", "IRC", "Licence");
        p.employment_rate = None;
        let c = evaluate(&signals, &p);
        assert_eq!(c.total, 50);
    }

    #[test]
    fn test_recommendation_notes() {
        let compat = Compatibility {
            scores: SubScores {
                riasec: 90,
                grades: 40,
                values: 60,
                employment: 30,
                financial: 100,
            },
            total: 65,
        };
        let notes = recommendation_notes(&compat);
        assert_eq!(
            notes.strengths,
            vec![
                "Excellente compatibilité de personnalité (90%)",
                "Les frais sont bien adaptés à votre budget"
            ]
        );
        assert_eq!(notes.weaknesses.len(), 2);
        assert!(notes.advice.starts_with("Cette formation est recommandée"));
    }

    #[test]
    fn test_criteria_highlights_fall_back() {
        let p = program("P", "IRC", "Licence");
        let compat = Compatibility {
            scores: SubScores {
                riasec: 60,
                grades: 60,
                values: 60,
                employment: 60,
                financial: 60,
            },
            total: 60,
        };
        let ctx = CriterionContext {
            holland_code: Some("IRC"),
            bac_grade: Some(12),
            max_annual_budget: Some(150_000),
        };
        let rows = criteria(&compat, &ctx, &p);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4].details, "Frais annuels: 100 000 FCFA, Budget: 150 000 FCFA");
        let (strengths, weaknesses) = criterion_highlights(&rows);
        assert_eq!(strengths, vec![NO_STRENGTH]);
        assert_eq!(weaknesses, vec![NO_WEAKNESS]);
        assert!(check_advice(&compat).starts_with("Avec un score de 60%, ce programme est à considérer."));
    }

    #[test]
    fn test_format_fcfa() {
        assert_eq!(format_fcfa(0), "0 FCFA");
        assert_eq!(format_fcfa(999), "999 FCFA");
        assert_eq!(format_fcfa(1_250_000), "1 250 000 FCFA");
    }
}
