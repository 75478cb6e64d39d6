//! Employers and provider employment history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common::{double_option, Columns, NewRecord, Record, RecordPatch};
use crate::db::schema::{Table, EMPLOYER, PROVIDER_EMPLOYMENT};
use crate::db::value::Value;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Employer {
    #[sqlx(rename = "id_employer")]
    pub id: i64,
    pub company: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Record for Employer {
    const TABLE: &'static Table = &EMPLOYER;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewEmployer {
    pub company: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl NewRecord for NewEmployer {
    type Record = Employer;

    fn values(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .put("company", self.company.clone())
            .put("address", self.address.clone())
            .put("city", self.city.clone())
            .put("state", self.state.clone())
            .put("zip", self.zip.clone())
            .put("phone", self.phone.clone())
            .put("email", self.email.clone())
            .into_vec())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployerPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub company: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub state: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub zip: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
}

impl RecordPatch for EmployerPatch {
    type Record = Employer;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .set("company", &self.company)
            .set("address", &self.address)
            .set("city", &self.city)
            .set("state", &self.state)
            .set("zip", &self.zip)
            .set("phone", &self.phone)
            .set("email", &self.email)
            .into_vec())
    }
}

/// A provider's tenure with an employer.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ProviderEmployment {
    #[sqlx(rename = "id_provider_employment")]
    pub id: i64,
    pub id_provider: i64,
    pub id_employer: i64,
    pub effective_date: Option<NaiveDate>,
    pub term_date: Option<NaiveDate>,
}

impl Record for ProviderEmployment {
    const TABLE: &'static Table = &PROVIDER_EMPLOYMENT;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProviderEmployment {
    pub id_provider: i64,
    pub id_employer: i64,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub term_date: Option<NaiveDate>,
}

impl NewRecord for NewProviderEmployment {
    type Record = ProviderEmployment;

    fn values(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .put("id_provider", self.id_provider)
            .put("id_employer", self.id_employer)
            .put("effective_date", self.effective_date)
            .put("term_date", self.term_date)
            .into_vec())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderEmploymentPatch {
    #[serde(default)]
    pub id_provider: Option<i64>,
    #[serde(default)]
    pub id_employer: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub effective_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub term_date: Option<Option<NaiveDate>>,
}

impl RecordPatch for ProviderEmploymentPatch {
    type Record = ProviderEmployment;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .set("id_provider", &self.id_provider)
            .set("id_employer", &self.id_employer)
            .set("effective_date", &self.effective_date)
            .set("term_date", &self.term_date)
            .into_vec())
    }
}
