//! RIASEC inventory scoring.
//!
//! Each dimension is the sum of its answers (reverse-scored items flipped to
//! `6 - answer`) as a truncated percentage of the maximum `count * 5`.
//! The Holland code is the three best dimensions; equal scores keep the
//! canonical R, I, A, S, E, C order.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::riasec::{RiasecTestRow, ScoredQuestion};

pub const TEST_VERSION: &str = "1.0";
pub const QUESTION_COUNT: usize = 30;
pub const MIN_ANSWER: i32 = 1;
pub const MAX_ANSWER: i32 = 5;
pub const DIMENSION_ORDER: [char; 6] = ['R', 'I', 'A', 'S', 'E', 'C'];

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnswerInput {
    pub question_number: i32,
    pub answer: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiasecScores {
    pub realistic: i32,
    pub investigative: i32,
    pub artistic: i32,
    pub social: i32,
    pub enterprising: i32,
    pub conventional: i32,
}

impl RiasecScores {
    pub fn get(&self, code: char) -> i32 {
        match code {
            'R' => self.realistic,
            'I' => self.investigative,
            'A' => self.artistic,
            'S' => self.social,
            'E' => self.enterprising,
            'C' => self.conventional,
            _ => 0,
        }
    }

    fn set(&mut self, code: char, value: i32) {
        match code {
            'R' => self.realistic = value,
            'I' => self.investigative = value,
            'A' => self.artistic = value,
            'S' => self.social = value,
            'E' => self.enterprising = value,
            'C' => self.conventional = value,
            _ => {}
        }
    }

    pub fn from_test(test: &RiasecTestRow) -> Self {
        RiasecScores {
            realistic: test.realistic_score,
            investigative: test.investigative_score,
            artistic: test.artistic_score,
            social: test.social_score,
            enterprising: test.enterprising_score,
            conventional: test.conventional_score,
        }
    }

    /// Dimensions by descending score; the sort is stable over the canonical order.
    pub fn ranked(&self) -> Vec<(char, i32)> {
        let mut ranked: Vec<(char, i32)> = DIMENSION_ORDER.iter().map(|&c| (c, self.get(c))).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    pub fn holland_code(&self) -> String {
        self.ranked().into_iter().take(3).map(|(c, _)| c).collect()
    }
}

/// Scores a complete answer sheet against the question bank.
pub fn score_answers(questions: &[ScoredQuestion], answers: &BTreeMap<i32, i32>) -> RiasecScores {
    let mut sums = [0i32; 6];
    let mut counts = [0i32; 6];

    for question in questions {
        let Some(code) = question.dimension_code.chars().next() else {
            continue;
        };
        let Some(idx) = DIMENSION_ORDER.iter().position(|&c| c == code) else {
            continue;
        };
        let value = match answers.get(&question.question_number) {
            Some(&answer) if question.reverse_scored != 0 => 6 - answer,
            Some(&answer) => answer,
            None => 0,
        };
        sums[idx] += value;
        counts[idx] += 1;
    }

    let mut scores = RiasecScores::default();
    for (idx, &code) in DIMENSION_ORDER.iter().enumerate() {
        let score = if counts[idx] > 0 {
            sums[idx] * 100 / (counts[idx] * MAX_ANSWER)
        } else {
            0
        };
        scores.set(code, score.clamp(0, 100));
    }
    scores
}

/// Checks a submitted answer sheet: exactly one answer in 1..=5 for every question 1..=30.
pub fn validate_answers(answers: &[AnswerInput]) -> Result<BTreeMap<i32, i32>, AppError> {
    if answers.len() != QUESTION_COUNT {
        return Err(AppError::Validation(format!(
            "Exactly {QUESTION_COUNT} answers are required, got {}",
            answers.len()
        )));
    }

    let mut seen = HashSet::with_capacity(QUESTION_COUNT);
    let mut sheet = BTreeMap::new();
    for a in answers {
        if !(1..=QUESTION_COUNT as i32).contains(&a.question_number) {
            return Err(AppError::Validation(format!(
                "Question number must be between 1 and {QUESTION_COUNT}, got {}",
                a.question_number
            )));
        }
        if !(MIN_ANSWER..=MAX_ANSWER).contains(&a.answer) {
            return Err(AppError::Validation(format!(
                "Answer to question {} must be between {MIN_ANSWER} and {MAX_ANSWER}",
                a.question_number
            )));
        }
        if !seen.insert(a.question_number) {
            return Err(AppError::Validation(format!(
                "Duplicate answer for question {}",
                a.question_number
            )));
        }
        sheet.insert(a.question_number, a.answer);
    }
    Ok(sheet)
}

/// Normalizes a user-supplied Holland code: uppercase, 1 to 3 RIASEC letters.
pub fn parse_holland_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_uppercase();
    let len = code.chars().count();
    if (1..=3).contains(&len) && code.chars().all(|c| DIMENSION_ORDER.contains(&c)) {
        Some(code)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 30 questions, interleaved R I A S E C, none reversed.
    fn bank() -> Vec<ScoredQuestion> {
        (1..=30)
            .map(|n| ScoredQuestion {
                question_number: n,
                dimension_code: DIMENSION_ORDER[((n - 1) % 6) as usize].to_string(),
                reverse_scored: 0,
            })
            .collect()
    }

    fn sheet(f: impl Fn(i32) -> i32) -> BTreeMap<i32, i32> {
        (1..=30).map(|n| (n, f(n))).collect()
    }

    #[test]
    fn test_all_max_answers_score_100() {
        let scores = score_answers(&bank(), &sheet(|_| 5));
        for c in DIMENSION_ORDER {
            assert_eq!(scores.get(c), 100);
        }
    }

    #[test]
    fn test_all_min_answers_score_20() {
        let scores = score_answers(&bank(), &sheet(|_| 1));
        assert_eq!(scores.realistic, 20);
        assert_eq!(scores.conventional, 20);
    }

    #[test]
    fn test_percentage_truncates() {
        // R answers: 4,4,4,4,5 -> 21/25 = 84
        let scores = score_answers(&bank(), &sheet(|n| if n == 25 { 5 } else { 4 }));
        assert_eq!(scores.realistic, 84);
        assert_eq!(scores.investigative, 80);
    }

    #[test]
    fn test_reverse_scored_questions_flip() {
        let mut questions = bank();
        questions[0].reverse_scored = 1;
        // question 1 answered 1 -> counts as 5
        let scores = score_answers(&questions, &sheet(|n| if n == 1 { 1 } else { 5 }));
        assert_eq!(scores.realistic, 100);
    }

    #[test]
    fn test_dimension_without_questions_scores_zero() {
        let questions: Vec<_> = bank().into_iter().filter(|q| q.dimension_code != "C").collect();
        let scores = score_answers(&questions, &sheet(|_| 3));
        assert_eq!(scores.conventional, 0);
        assert_eq!(scores.realistic, 60);
    }

    #[test]
    fn test_holland_code_top_three() {
        let scores = RiasecScores {
            realistic: 40,
            investigative: 90,
            artistic: 75,
            social: 80,
            enterprising: 10,
            conventional: 55,
        };
        assert_eq!(scores.holland_code(), "ISA");
    }

    #[test]
    fn test_holland_code_ties_keep_canonical_order() {
        let flat = RiasecScores {
            realistic: 60,
            investigative: 60,
            artistic: 60,
            social: 60,
            enterprising: 60,
            conventional: 60,
        };
        assert_eq!(flat.holland_code(), "RIA");

        let tie = RiasecScores {
            conventional: 80,
            social: 80,
            ..flat
        };
        assert_eq!(tie.holland_code(), "SCR");
    }

    #[test]
    fn test_validate_answers_accepts_full_sheet() {
        let answers: Vec<AnswerInput> = (1..=30)
            .map(|n| AnswerInput {
                question_number: n,
                answer: 3,
            })
            .collect();
        let sheet = validate_answers(&answers).unwrap();
        assert_eq!(sheet.len(), 30);
    }

    #[test]
    fn test_validate_answers_rejects_bad_sheets() {
        let full: Vec<AnswerInput> = (1..=30)
            .map(|n| AnswerInput {
                question_number: n,
                answer: 3,
            })
            .collect();

        assert!(validate_answers(&full[..29]).is_err());

        let mut duplicate = full.clone();
        duplicate[29].question_number = 1;
        assert!(validate_answers(&duplicate).is_err());

        let mut out_of_range = full.clone();
        out_of_range[4].answer = 6;
        assert!(validate_answers(&out_of_range).is_err());

        let mut bad_number = full;
        bad_number[0].question_number = 31;
        assert!(validate_answers(&bad_number).is_err());
    }

    #[test]
    fn test_parse_holland_code() {
        assert_eq!(parse_holland_code("ias").as_deref(), Some("IAS"));
        assert_eq!(parse_holland_code("R").as_deref(), Some("R"));
        assert!(parse_holland_code("").is_none());
        assert!(parse_holland_code("RIAS").is_none());
        assert!(parse_holland_code("XYZ").is_none());
    }
}
