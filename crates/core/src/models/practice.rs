//! Practice locations, practice types and what providers do at them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common::{default_true, double_option, Columns, NewRecord, Record, RecordPatch};
use crate::db::schema::{
    Table, PRACTICE_LOCATION, PRACTICE_TYPE, PROVIDER_ACTIVITIES, PROVIDER_PRACTICE_LOCATION,
};
use crate::db::value::Value;
use crate::error::Result;

/// A site where care is delivered.
///
/// Persisted in `practice_locaton`, whose name column carries the same spelling.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PracticeLocation {
    #[sqlx(rename = "id_practice_location")]
    pub id: i64,
    #[sqlx(rename = "practice_locaton")]
    pub practice_location: Option<String>,
    pub practice_type: Option<String>,
    pub cost_center: Option<String>,
    pub region: Option<String>,
    #[sqlx(rename = "CAO")]
    pub cao: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl Record for PracticeLocation {
    const TABLE: &'static Table = &PRACTICE_LOCATION;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewPracticeLocation {
    #[serde(alias = "practice_locaton")]
    pub practice_location: Option<String>,
    pub practice_type: Option<String>,
    pub cost_center: Option<String>,
    pub region: Option<String>,
    pub cao: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl NewRecord for NewPracticeLocation {
    type Record = PracticeLocation;

    fn values(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .put("practice_locaton", self.practice_location.clone())
            .put("practice_type", self.practice_type.clone())
            .put("cost_center", self.cost_center.clone())
            .put("region", self.region.clone())
            .put("CAO", self.cao.clone())
            .put("address", self.address.clone())
            .put("city", self.city.clone())
            .put("state", self.state.clone())
            .put("zip", self.zip.clone())
            .into_vec())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PracticeLocationPatch {
    #[serde(default, alias = "practice_locaton", deserialize_with = "double_option")]
    pub practice_location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub practice_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cost_center: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub region: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cao: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub state: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub zip: Option<Option<String>>,
}

impl RecordPatch for PracticeLocationPatch {
    type Record = PracticeLocation;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .set("practice_locaton", &self.practice_location)
            .set("practice_type", &self.practice_type)
            .set("cost_center", &self.cost_center)
            .set("region", &self.region)
            .set("CAO", &self.cao)
            .set("address", &self.address)
            .set("city", &self.city)
            .set("state", &self.state)
            .set("zip", &self.zip)
            .into_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PracticeType {
    #[sqlx(rename = "id_practice_type")]
    pub id: i64,
    pub practice_type: Option<String>,
}

impl Record for PracticeType {
    const TABLE: &'static Table = &PRACTICE_TYPE;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewPracticeType {
    pub practice_type: Option<String>,
}

impl NewRecord for NewPracticeType {
    type Record = PracticeType;

    fn values(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .put("practice_type", self.practice_type.clone())
            .into_vec())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PracticeTypePatch {
    #[serde(default, deserialize_with = "double_option")]
    pub practice_type: Option<Option<String>>,
}

impl RecordPatch for PracticeTypePatch {
    type Record = PracticeType;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .set("practice_type", &self.practice_type)
            .into_vec())
    }
}

/// An assignment to a practice location. It names the location only.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ProviderPracticeLocation {
    #[sqlx(rename = "id_provider_practice_location")]
    pub id: i64,
    pub id_practice_location: i64,
    pub effective_date: Option<NaiveDate>,
    pub term_date: Option<NaiveDate>,
    pub primary_location: bool,
}

impl Record for ProviderPracticeLocation {
    const TABLE: &'static Table = &PROVIDER_PRACTICE_LOCATION;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProviderPracticeLocation {
    pub id_practice_location: i64,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub term_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub primary_location: bool,
}

impl NewProviderPracticeLocation {
    pub fn new(id_practice_location: i64) -> Self {
        Self {
            id_practice_location,
            effective_date: None,
            term_date: None,
            primary_location: true,
        }
    }
}

impl NewRecord for NewProviderPracticeLocation {
    type Record = ProviderPracticeLocation;

    fn values(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .put("id_practice_location", self.id_practice_location)
            .put("effective_date", self.effective_date)
            .put("term_date", self.term_date)
            .put("primary_location", self.primary_location)
            .into_vec())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderPracticeLocationPatch {
    #[serde(default)]
    pub id_practice_location: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub effective_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub term_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub primary_location: Option<bool>,
}

impl RecordPatch for ProviderPracticeLocationPatch {
    type Record = ProviderPracticeLocation;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .set("id_practice_location", &self.id_practice_location)
            .set("effective_date", &self.effective_date)
            .set("term_date", &self.term_date)
            .set("primary_location", &self.primary_location)
            .into_vec())
    }
}

/// What a provider does, with FTE split and weekly patient-care hours.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ProviderActivities {
    #[sqlx(rename = "id_provider_activities")]
    pub id: i64,
    pub id_provider: i64,
    pub id_provider_practice_location: Option<i64>,
    pub id_practice_type: Option<i64>,
    pub primary_activities: bool,
    pub title: Option<String>,
    pub effective_date: Option<NaiveDate>,
    pub term_date: Option<NaiveDate>,
    #[sqlx(rename = "clinical_FTE")]
    pub clinical_fte: Option<f64>,
    #[sqlx(rename = "admin_FTE")]
    pub admin_fte: Option<f64>,
    #[sqlx(rename = "research_FTE")]
    pub research_fte: Option<f64>,
    #[sqlx(rename = "teaching_FTE")]
    pub teaching_fte: Option<f64>,
    pub weekly_patient_care_hours: Option<f64>,
    pub description: Option<String>,
}

impl Record for ProviderActivities {
    const TABLE: &'static Table = &PROVIDER_ACTIVITIES;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProviderActivities {
    pub id_provider: i64,
    #[serde(default)]
    pub id_provider_practice_location: Option<i64>,
    #[serde(default)]
    pub id_practice_type: Option<i64>,
    #[serde(default = "default_true")]
    pub primary_activities: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub term_date: Option<NaiveDate>,
    #[serde(default)]
    pub clinical_fte: Option<f64>,
    #[serde(default)]
    pub admin_fte: Option<f64>,
    #[serde(default)]
    pub research_fte: Option<f64>,
    #[serde(default)]
    pub teaching_fte: Option<f64>,
    #[serde(default)]
    pub weekly_patient_care_hours: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewProviderActivities {
    pub fn new(id_provider: i64) -> Self {
        Self {
            id_provider,
            id_provider_practice_location: None,
            id_practice_type: None,
            primary_activities: true,
            title: None,
            effective_date: None,
            term_date: None,
            clinical_fte: None,
            admin_fte: None,
            research_fte: None,
            teaching_fte: None,
            weekly_patient_care_hours: None,
            description: None,
        }
    }
}

impl NewRecord for NewProviderActivities {
    type Record = ProviderActivities;

    fn values(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .put("id_provider", self.id_provider)
            .put("id_provider_practice_location", self.id_provider_practice_location)
            .put("id_practice_type", self.id_practice_type)
            .put("primary_activities", self.primary_activities)
            .put("title", self.title.clone())
            .put("effective_date", self.effective_date)
            .put("term_date", self.term_date)
            .put("clinical_FTE", self.clinical_fte)
            .put("admin_FTE", self.admin_fte)
            .put("research_FTE", self.research_fte)
            .put("teaching_FTE", self.teaching_fte)
            .put("weekly_patient_care_hours", self.weekly_patient_care_hours)
            .put("description", self.description.clone())
            .into_vec())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderActivitiesPatch {
    #[serde(default)]
    pub id_provider: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub id_provider_practice_location: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub id_practice_type: Option<Option<i64>>,
    #[serde(default)]
    pub primary_activities: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub effective_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub term_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub clinical_fte: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub admin_fte: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub research_fte: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub teaching_fte: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub weekly_patient_care_hours: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl RecordPatch for ProviderActivitiesPatch {
    type Record = ProviderActivities;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .set("id_provider", &self.id_provider)
            .set(
                "id_provider_practice_location",
                &self.id_provider_practice_location,
            )
            .set("id_practice_type", &self.id_practice_type)
            .set("primary_activities", &self.primary_activities)
            .set("title", &self.title)
            .set("effective_date", &self.effective_date)
            .set("term_date", &self.term_date)
            .set("clinical_FTE", &self.clinical_fte)
            .set("admin_FTE", &self.admin_fte)
            .set("research_FTE", &self.research_fte)
            .set("teaching_FTE", &self.teaching_fte)
            .set("weekly_patient_care_hours", &self.weekly_patient_care_hours)
            .set("description", &self.description)
            .into_vec())
    }
}
