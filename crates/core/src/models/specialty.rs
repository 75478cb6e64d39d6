//! Medical specialties and which providers practice them.

use serde::{Deserialize, Serialize};

use super::common::{default_true, Columns, NewRecord, Record, RecordPatch};
use crate::db::schema::{Table, PROVIDER_SPECIALTY, SPECIALTY};
use crate::db::value::Value;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Specialty {
    #[sqlx(rename = "id_specialty")]
    pub id: i64,
    pub specialty: String,
}

impl Record for Specialty {
    const TABLE: &'static Table = &SPECIALTY;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSpecialty {
    pub specialty: String,
}

impl NewRecord for NewSpecialty {
    type Record = Specialty;

    fn values(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .put("specialty", self.specialty.clone())
            .into_vec())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpecialtyPatch {
    #[serde(default)]
    pub specialty: Option<String>,
}

impl RecordPatch for SpecialtyPatch {
    type Record = Specialty;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new().set("specialty", &self.specialty).into_vec())
    }
}

/// Links a provider to a specialty. Both flags default to true.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ProviderSpecialty {
    #[sqlx(rename = "id_provider_specialty")]
    pub id: i64,
    pub id_provider: i64,
    pub id_specialty: i64,
    pub board_certified: bool,
    pub primary_specialty: bool,
}

impl Record for ProviderSpecialty {
    const TABLE: &'static Table = &PROVIDER_SPECIALTY;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProviderSpecialty {
    pub id_provider: i64,
    pub id_specialty: i64,
    #[serde(default = "default_true")]
    pub board_certified: bool,
    #[serde(default = "default_true")]
    pub primary_specialty: bool,
}

impl NewProviderSpecialty {
    pub fn new(id_provider: i64, id_specialty: i64) -> Self {
        Self {
            id_provider,
            id_specialty,
            board_certified: true,
            primary_specialty: true,
        }
    }
}

impl NewRecord for NewProviderSpecialty {
    type Record = ProviderSpecialty;

    fn values(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .put("id_provider", self.id_provider)
            .put("id_specialty", self.id_specialty)
            .put("board_certified", self.board_certified)
            .put("primary_specialty", self.primary_specialty)
            .into_vec())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSpecialtyPatch {
    #[serde(default)]
    pub id_provider: Option<i64>,
    #[serde(default)]
    pub id_specialty: Option<i64>,
    #[serde(default)]
    pub board_certified: Option<bool>,
    #[serde(default)]
    pub primary_specialty: Option<bool>,
}

impl RecordPatch for ProviderSpecialtyPatch {
    type Record = ProviderSpecialty;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .set("id_provider", &self.id_provider)
            .set("id_specialty", &self.id_specialty)
            .set("board_certified", &self.board_certified)
            .set("primary_specialty", &self.primary_specialty)
            .into_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_default_to_true() {
        let new: NewProviderSpecialty =
            serde_json::from_str(r#"{"id_provider": 1, "id_specialty": 2}"#).unwrap();
        assert!(new.board_certified);
        assert!(new.primary_specialty);
    }

    #[test]
    fn flags_can_be_disabled() {
        let new: NewProviderSpecialty = serde_json::from_str(
            r#"{"id_provider": 1, "id_specialty": 2, "board_certified": false}"#,
        )
        .unwrap();
        assert!(!new.board_certified);
        assert!(new.primary_specialty);
    }

    #[test]
    fn new_provider_specialty_values() {
        let values = NewProviderSpecialty::new(4, 7).values().unwrap();
        assert_eq!(
            values,
            vec![
                ("id_provider", Value::Integer(4)),
                ("id_specialty", Value::Integer(7)),
                ("board_certified", Value::Bool(true)),
                ("primary_specialty", Value::Bool(true)),
            ]
        );
    }

    #[test]
    fn empty_patch_has_no_changes() {
        assert!(SpecialtyPatch::default().changes().unwrap().is_empty());
        assert!(ProviderSpecialtyPatch::default().changes().unwrap().is_empty());
    }
}
