use std::collections::BTreeMap;

use serde::Serialize;

use crate::programs::store::ProgramStatsRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramStatistics {
    pub total_programs: usize,
    pub by_level: BTreeMap<String, u32>,
    pub by_department: BTreeMap<String, u32>,
    pub average_tuition: f64,
    pub average_employment_rate: f64,
    pub riasec_distribution: BTreeMap<String, u32>,
}

pub fn summarize(rows: &[ProgramStatsRow]) -> ProgramStatistics {
    let mut by_level = BTreeMap::new();
    let mut by_department = BTreeMap::new();
    let mut riasec_distribution = BTreeMap::new();

    for row in rows {
        *by_level.entry(row.level.clone()).or_insert(0) += 1;
        *by_department.entry(row.department.clone()).or_insert(0) += 1;
        let letter = row
            .riasec_match
            .chars()
            .next()
            .map_or_else(|| "Unknown".to_string(), |c| c.to_string());
        *riasec_distribution.entry(letter).or_insert(0) += 1;
    }

    let average_tuition = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|r| r.annual_tuition as f64).sum::<f64>() / rows.len() as f64
    };

    let rates: Vec<f64> = rows.iter().filter_map(|r| r.employment_rate).map(f64::from).collect();
    let average_employment_rate = if rates.is_empty() {
        0.0
    } else {
        rates.iter().sum::<f64>() / rates.len() as f64
    };

    ProgramStatistics {
        total_programs: rows.len(),
        by_level,
        by_department,
        average_tuition,
        average_employment_rate,
        riasec_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(level: &str, department: &str, riasec: &str, tuition: i32, rate: Option<i32>) -> ProgramStatsRow {
        ProgramStatsRow {
            level: level.to_string(),
            department: department.to_string(),
            riasec_match: riasec.to_string(),
            annual_tuition: tuition,
            employment_rate: rate,
        }
    }

    #[test]
    fn test_empty_catalog() {
        let stats = summarize(&[]);
        assert_eq!(stats.total_programs, 0);
        assert_eq!(stats.average_tuition, 0.0);
        assert_eq!(stats.average_employment_rate, 0.0);
    }

    #[test]
    fn test_counts_and_averages() {
        let rows = vec![
            row("Licence", "Informatique", "IRC", 100_000, Some(80)),
            row("Master", "Informatique", "IRE", 200_000, None),
            row("Licence", "Droit", "ESC", 60_000, Some(60)),
            row("Licence", "Droit", "", 40_000, None),
        ];
        let stats = summarize(&rows);
        assert_eq!(stats.total_programs, 4);
        assert_eq!(stats.by_level["Licence"], 3);
        assert_eq!(stats.by_department["Droit"], 2);
        assert_eq!(stats.riasec_distribution["I"], 2);
        assert_eq!(stats.riasec_distribution["Unknown"], 1);
        assert_eq!(stats.average_tuition, 100_000.0);
        // only programs with a rate count
        assert_eq!(stats.average_employment_rate, 70.0);
    }
}
