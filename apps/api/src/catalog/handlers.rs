use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogEntry, LevelProgram};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LevelQuery {
    #[serde(default)]
    pub level: String,
}

impl LevelQuery {
    fn required(&self) -> Result<&str, AppError> {
        let level = self.level.trim();
        if level.is_empty() {
            return Err(AppError::Validation(
                "level: query parameter is required".to_string(),
            ));
        }
        Ok(level)
    }
}

#[derive(Debug, Serialize)]
pub struct TeachingUnits {
    pub ue: Vec<String>,
}

/// GET /api/v1/ubertoua/establishments
pub async fn handle_establishments(State(state): State<AppState>) -> Json<Vec<CatalogEntry>> {
    Json(state.catalog.establishments())
}

/// GET /api/v1/ubertoua/establishments/:establishment_id/departments
pub async fn handle_departments(
    State(state): State<AppState>,
    Path(establishment_id): Path<String>,
) -> Result<Json<Vec<CatalogEntry>>, AppError> {
    let departments = state.catalog.departments(&establishment_id);
    if departments.is_empty() {
        return Err(AppError::NotFound(format!(
            "No departments found for establishment: {establishment_id}"
        )));
    }
    Ok(Json(departments))
}

/// GET /api/v1/ubertoua/establishments/:establishment_id/departments/:department_id/programs?level=
pub async fn handle_programs(
    State(state): State<AppState>,
    Path((establishment_id, department_id)): Path<(String, String)>,
    Query(query): Query<LevelQuery>,
) -> Result<Json<Vec<LevelProgram>>, AppError> {
    let level = query.required()?;
    let programs = state
        .catalog
        .programs(&establishment_id, &department_id, level);
    if programs.is_empty() {
        return Err(AppError::NotFound(format!(
            "No programs found for {establishment_id}/{department_id} at level {level}"
        )));
    }
    Ok(Json(programs))
}

/// GET /api/v1/ubertoua/establishments/:establishment_id/departments/:department_id/ue?level=
pub async fn handle_teaching_units(
    State(state): State<AppState>,
    Path((establishment_id, department_id)): Path<(String, String)>,
    Query(query): Query<LevelQuery>,
) -> Result<Json<TeachingUnits>, AppError> {
    let level = query.required()?;
    let ue = state
        .catalog
        .teaching_units(&establishment_id, &department_id, level);
    if ue.is_empty() {
        return Err(AppError::NotFound(format!(
            "No UE found for {establishment_id}/{department_id} at level {level}"
        )));
    }
    Ok(Json(TeachingUnits { ue }))
}
