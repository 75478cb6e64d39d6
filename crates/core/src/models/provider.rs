//! Providers and the per-provider records that hang off them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common::{double_option, Columns, NewRecord, Record, RecordPatch};
use crate::db::schema::{
    Table, PROVIDER, PROVIDER_CAQH, PROVIDER_EDUCATION, PROVIDER_PROFESSIONAL_LIABILITY,
};
use crate::db::value::Value;
use crate::error::Result;

/// A healthcare provider.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Provider {
    #[sqlx(rename = "id_provider")]
    pub id: i64,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<String>,
    #[sqlx(rename = "SSN")]
    pub ssn: Option<String>,
    #[sqlx(rename = "NPI")]
    pub npi: Option<String>,
    #[sqlx(rename = "CA_DEA")]
    pub ca_dea: Option<String>,
    pub home_phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub work_email: Option<String>,
    pub personal_email: Option<String>,
    pub fax_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl Record for Provider {
    const TABLE: &'static Table = &PROVIDER;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewProvider {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<String>,
    pub ssn: Option<String>,
    pub npi: Option<String>,
    pub ca_dea: Option<String>,
    pub home_phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub work_email: Option<String>,
    pub personal_email: Option<String>,
    pub fax_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl NewRecord for NewProvider {
    type Record = Provider;

    fn values(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .put("first_name", self.first_name.clone())
            .put("middle_name", self.middle_name.clone())
            .put("last_name", self.last_name.clone())
            .put("birthday", self.birthday)
            .put("gender", self.gender.clone())
            .put("SSN", self.ssn.clone())
            .put("NPI", self.npi.clone())
            .put("CA_DEA", self.ca_dea.clone())
            .put("home_phone", self.home_phone.clone())
            .put("mobile_phone", self.mobile_phone.clone())
            .put("work_email", self.work_email.clone())
            .put("personal_email", self.personal_email.clone())
            .put("fax_number", self.fax_number.clone())
            .put("address", self.address.clone())
            .put("city", self.city.clone())
            .put("state", self.state.clone())
            .put("zip", self.zip.clone())
            .into_vec())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub middle_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub birthday: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub gender: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub ssn: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub npi: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub ca_dea: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub home_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub mobile_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub work_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub personal_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub fax_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub state: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub zip: Option<Option<String>>,
}

impl RecordPatch for ProviderPatch {
    type Record = Provider;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .set("first_name", &self.first_name)
            .set("middle_name", &self.middle_name)
            .set("last_name", &self.last_name)
            .set("birthday", &self.birthday)
            .set("gender", &self.gender)
            .set("SSN", &self.ssn)
            .set("NPI", &self.npi)
            .set("CA_DEA", &self.ca_dea)
            .set("home_phone", &self.home_phone)
            .set("mobile_phone", &self.mobile_phone)
            .set("work_email", &self.work_email)
            .set("personal_email", &self.personal_email)
            .set("fax_number", &self.fax_number)
            .set("address", &self.address)
            .set("city", &self.city)
            .set("state", &self.state)
            .set("zip", &self.zip)
            .into_vec())
    }
}

/// A school or training program a provider completed.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ProviderEducation {
    #[sqlx(rename = "id_provider_education")]
    pub id: i64,
    pub id_provider: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub education_type: Option<String>,
    pub school: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub degree: Option<String>,
    pub degree_type: Option<String>,
    pub year_began: Option<i64>,
    pub year_complete: Option<i64>,
}

impl Record for ProviderEducation {
    const TABLE: &'static Table = &PROVIDER_EDUCATION;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewProviderEducation {
    pub id_provider: i64,
    #[serde(rename = "type")]
    pub education_type: Option<String>,
    pub school: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub degree: Option<String>,
    pub degree_type: Option<String>,
    pub year_began: Option<i64>,
    pub year_complete: Option<i64>,
}

impl NewRecord for NewProviderEducation {
    type Record = ProviderEducation;

    fn values(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .put("id_provider", self.id_provider)
            .put("type", self.education_type.clone())
            .put("school", self.school.clone())
            .put("address", self.address.clone())
            .put("city", self.city.clone())
            .put("state", self.state.clone())
            .put("zip", self.zip.clone())
            .put("country", self.country.clone())
            .put("degree", self.degree.clone())
            .put("degree_type", self.degree_type.clone())
            .put("year_began", self.year_began)
            .put("year_complete", self.year_complete)
            .into_vec())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderEducationPatch {
    #[serde(default)]
    pub id_provider: Option<i64>,
    #[serde(default, rename = "type", deserialize_with = "double_option")]
    pub education_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub school: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub state: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub zip: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub country: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub degree: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub degree_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub year_began: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub year_complete: Option<Option<i64>>,
}

impl RecordPatch for ProviderEducationPatch {
    type Record = ProviderEducation;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .set("id_provider", &self.id_provider)
            .set("type", &self.education_type)
            .set("school", &self.school)
            .set("address", &self.address)
            .set("city", &self.city)
            .set("state", &self.state)
            .set("zip", &self.zip)
            .set("country", &self.country)
            .set("degree", &self.degree)
            .set("degree_type", &self.degree_type)
            .set("year_began", &self.year_began)
            .set("year_complete", &self.year_complete)
            .into_vec())
    }
}

/// Malpractice coverage held by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ProviderProfessionalLiability {
    #[sqlx(rename = "id_provider_professional_liability")]
    pub id: i64,
    pub id_provider: i64,
    pub carrier: Option<String>,
    pub effective_date: Option<NaiveDate>,
    pub term_date: Option<NaiveDate>,
}

impl Record for ProviderProfessionalLiability {
    const TABLE: &'static Table = &PROVIDER_PROFESSIONAL_LIABILITY;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewProviderProfessionalLiability {
    pub id_provider: i64,
    pub carrier: Option<String>,
    pub effective_date: Option<NaiveDate>,
    pub term_date: Option<NaiveDate>,
}

impl NewRecord for NewProviderProfessionalLiability {
    type Record = ProviderProfessionalLiability;

    fn values(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .put("id_provider", self.id_provider)
            .put("carrier", self.carrier.clone())
            .put("effective_date", self.effective_date)
            .put("term_date", self.term_date)
            .into_vec())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderProfessionalLiabilityPatch {
    #[serde(default)]
    pub id_provider: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub carrier: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub effective_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub term_date: Option<Option<NaiveDate>>,
}

impl RecordPatch for ProviderProfessionalLiabilityPatch {
    type Record = ProviderProfessionalLiability;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .set("id_provider", &self.id_provider)
            .set("carrier", &self.carrier)
            .set("effective_date", &self.effective_date)
            .set("term_date", &self.term_date)
            .into_vec())
    }
}

/// CAQH credentialing dates tracked for a provider.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ProviderCaqh {
    #[sqlx(rename = "id_provider_CAQH")]
    pub id: i64,
    pub id_provider: i64,
    pub auth_received_date: Option<NaiveDate>,
    pub added_date: Option<NaiveDate>,
    pub last_updated_date: Option<NaiveDate>,
}

impl Record for ProviderCaqh {
    const TABLE: &'static Table = &PROVIDER_CAQH;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewProviderCaqh {
    pub id_provider: i64,
    pub auth_received_date: Option<NaiveDate>,
    pub added_date: Option<NaiveDate>,
    pub last_updated_date: Option<NaiveDate>,
}

impl NewRecord for NewProviderCaqh {
    type Record = ProviderCaqh;

    fn values(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .put("id_provider", self.id_provider)
            .put("auth_received_date", self.auth_received_date)
            .put("added_date", self.added_date)
            .put("last_updated_date", self.last_updated_date)
            .into_vec())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderCaqhPatch {
    #[serde(default)]
    pub id_provider: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub auth_received_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub added_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_updated_date: Option<Option<NaiveDate>>,
}

impl RecordPatch for ProviderCaqhPatch {
    type Record = ProviderCaqh;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .set("id_provider", &self.id_provider)
            .set("auth_received_date", &self.auth_received_date)
            .set("added_date", &self.added_date)
            .set("last_updated_date", &self.last_updated_date)
            .into_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_provider_maps_identifier_columns() {
        let new = NewProvider {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            ssn: Some("123456789".into()),
            npi: Some("1234567890".into()),
            ..Default::default()
        };
        let values = new.values().unwrap();
        assert_eq!(values.len(), PROVIDER.columns.len());
        assert!(values.contains(&("SSN", Value::Text("123456789".into()))));
        assert!(values.contains(&("NPI", Value::Text("1234567890".into()))));
        assert!(values.contains(&("CA_DEA", Value::Null)));
    }

    #[test]
    fn new_provider_deserializes_with_defaults() {
        let new: NewProvider = serde_json::from_str(
            r#"{"first_name": "Ada", "last_name": "Lovelace", "birthday": "1815-12-10"}"#,
        )
        .unwrap();
        assert_eq!(new.birthday, NaiveDate::from_ymd_opt(1815, 12, 10));
        assert!(new.ssn.is_none());
    }

    #[test]
    fn every_new_record_covers_its_table() {
        let education = NewProviderEducation::default().values().unwrap();
        assert_eq!(education.len(), PROVIDER_EDUCATION.columns.len());
        let liability = NewProviderProfessionalLiability::default().values().unwrap();
        assert_eq!(liability.len(), PROVIDER_PROFESSIONAL_LIABILITY.columns.len());
        let caqh = NewProviderCaqh::default().values().unwrap();
        assert_eq!(caqh.len(), PROVIDER_CAQH.columns.len());
    }

    #[test]
    fn provider_names_are_optional() {
        let new: NewProvider =
            serde_json::from_str(r#"{"ssn": "123456789", "npi": "1234567890"}"#).unwrap();
        let values = new.values().unwrap();
        assert!(values.contains(&("first_name", Value::Null)));
        assert!(values.contains(&("last_name", Value::Null)));

        let patch: ProviderPatch = serde_json::from_str(r#"{"first_name": null}"#).unwrap();
        assert_eq!(patch.changes().unwrap(), vec![("first_name", Value::Null)]);
    }

    #[test]
    fn provider_patch_clears_nullable_column() {
        let patch: ProviderPatch = serde_json::from_str(r#"{"ca_dea": null}"#).unwrap();
        assert_eq!(patch.changes().unwrap(), vec![("CA_DEA", Value::Null)]);
    }

    #[test]
    fn education_type_uses_type_key() {
        let patch: ProviderEducationPatch =
            serde_json::from_str(r#"{"type": "residency"}"#).unwrap();
        assert_eq!(
            patch.changes().unwrap(),
            vec![("type", Value::Text("residency".into()))]
        );
    }
}
