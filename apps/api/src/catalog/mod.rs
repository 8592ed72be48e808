//! Université de Bertoua establishment / department / program-level catalog.
//!
//! Static reference data embedded at build time and parsed once at startup.

pub mod handlers;

use anyhow::Context;
use serde::{Deserialize, Serialize};

const CATALOG_JSON: &str = include_str!("../../data/ubertoua.json");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelProgram {
    pub level: String,
    pub name: String,
    #[serde(default)]
    pub ue: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub programs: Vec<LevelProgram>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Establishment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub departments: Vec<Department>,
}

/// `{id, name}` pair returned by the listing endpoints.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UniversityCatalog {
    pub university: String,
    pub establishments: Vec<Establishment>,
}

impl UniversityCatalog {
    pub fn embedded() -> anyhow::Result<Self> {
        Self::from_json(CATALOG_JSON)
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("invalid university catalog")
    }

    fn establishment(&self, id: &str) -> Option<&Establishment> {
        self.establishments.iter().find(|e| e.id == id)
    }

    fn department(&self, establishment_id: &str, department_id: &str) -> Option<&Department> {
        self.establishment(establishment_id)?
            .departments
            .iter()
            .find(|d| d.id == department_id)
    }

    pub fn establishments(&self) -> Vec<CatalogEntry> {
        self.establishments
            .iter()
            .map(|e| CatalogEntry {
                id: e.id.clone(),
                name: e.name.clone(),
            })
            .collect()
    }

    /// Departments of an establishment. Schools without departments list
    /// themselves as their only entry; unknown ids yield nothing.
    pub fn departments(&self, establishment_id: &str) -> Vec<CatalogEntry> {
        let Some(establishment) = self.establishment(establishment_id) else {
            return Vec::new();
        };
        if establishment.departments.is_empty() {
            return vec![CatalogEntry {
                id: establishment.id.clone(),
                name: establishment.name.clone(),
            }];
        }
        establishment
            .departments
            .iter()
            .map(|d| CatalogEntry {
                id: d.id.clone(),
                name: d.name.clone(),
            })
            .collect()
    }

    pub fn programs(&self, establishment_id: &str, department_id: &str, level: &str) -> Vec<LevelProgram> {
        self.department(establishment_id, department_id)
            .map(|d| d.programs.iter().filter(|p| p.level == level).cloned().collect())
            .unwrap_or_default()
    }

    /// Teaching units of the first program at `level`.
    pub fn teaching_units(&self, establishment_id: &str, department_id: &str, level: &str) -> Vec<String> {
        self.department(establishment_id, department_id)
            .and_then(|d| d.programs.iter().find(|p| p.level == level))
            .map(|p| p.ue.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_parses() {
        let catalog = UniversityCatalog::embedded().unwrap();
        assert_eq!(catalog.university, "Université de Bertoua");
        let ids: Vec<String> = catalog.establishments().into_iter().map(|e| e.id).collect();
        assert!(ids.contains(&"FS".to_string()));
        assert!(ids.contains(&"ENS".to_string()));
    }

    #[test]
    fn test_establishment_without_departments_lists_itself() {
        let catalog = UniversityCatalog::embedded().unwrap();
        let departments = catalog.departments("ENS");
        assert_eq!(departments.len(), 1);
        assert_eq!(departments[0].id, "ENS");
        assert!(catalog.departments("NOPE").is_empty());
    }

    #[test]
    fn test_programs_and_units_by_level() {
        let catalog = UniversityCatalog::embedded().unwrap();
        let programs = catalog.programs("FSJP", "DROIT_PUBLIC", "Licence 3");
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0].name, "Droit Public");
        assert_eq!(
            catalog.teaching_units("FSJP", "DROIT_PUBLIC", "Licence 3")[0],
            "Droit constitutionnel"
        );
        assert!(catalog.programs("FSJP", "DROIT_PUBLIC", "Master 2").is_empty());
        assert!(catalog.teaching_units("FSJP", "NOPE", "Licence 3").is_empty());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(UniversityCatalog::from_json("{\"university\": 1}").is_err());
    }
}
