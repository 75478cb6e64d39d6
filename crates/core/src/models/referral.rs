//! Referral sources and the typed relationships providers have with them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common::{double_option, Columns, NewRecord, Record, RecordPatch};
use crate::db::schema::{Table, PROVIDER_RELATIONSHIP, REFERRAL_SOURCE, RELATIONSHIP_TYPE};
use crate::db::value::Value;
use crate::error::Result;

/// A person or organization that refers patients. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ReferralSource {
    #[sqlx(rename = "id_referral_source")]
    pub id: i64,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub work_phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub work_email: Option<String>,
    pub fax_number: Option<String>,
    pub website: Option<String>,
}

impl Record for ReferralSource {
    const TABLE: &'static Table = &REFERRAL_SOURCE;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewReferralSource {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub work_phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub work_email: Option<String>,
    pub fax_number: Option<String>,
    pub website: Option<String>,
}

impl NewRecord for NewReferralSource {
    type Record = ReferralSource;

    fn values(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .put("first_name", self.first_name.clone())
            .put("middle_name", self.middle_name.clone())
            .put("last_name", self.last_name.clone())
            .put("company", self.company.clone())
            .put("work_phone", self.work_phone.clone())
            .put("mobile_phone", self.mobile_phone.clone())
            .put("work_email", self.work_email.clone())
            .put("fax_number", self.fax_number.clone())
            .put("website", self.website.clone())
            .into_vec())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferralSourcePatch {
    #[serde(default, deserialize_with = "double_option")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub middle_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub company: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub work_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub mobile_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub work_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub fax_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub website: Option<Option<String>>,
}

impl RecordPatch for ReferralSourcePatch {
    type Record = ReferralSource;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .set("first_name", &self.first_name)
            .set("middle_name", &self.middle_name)
            .set("last_name", &self.last_name)
            .set("company", &self.company)
            .set("work_phone", &self.work_phone)
            .set("mobile_phone", &self.mobile_phone)
            .set("work_email", &self.work_email)
            .set("fax_number", &self.fax_number)
            .set("website", &self.website)
            .into_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct RelationshipType {
    #[sqlx(rename = "id_relationship_type")]
    pub id: i64,
    pub relationship_type: Option<String>,
}

impl Record for RelationshipType {
    const TABLE: &'static Table = &RELATIONSHIP_TYPE;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRelationshipType {
    pub relationship_type: Option<String>,
}

impl NewRecord for NewRelationshipType {
    type Record = RelationshipType;

    fn values(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .put("relationship_type", self.relationship_type.clone())
            .into_vec())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelationshipTypePatch {
    #[serde(default, deserialize_with = "double_option")]
    pub relationship_type: Option<Option<String>>,
}

impl RecordPatch for RelationshipTypePatch {
    type Record = RelationshipType;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .set("relationship_type", &self.relationship_type)
            .into_vec())
    }
}

/// Ties a provider to a referral source under a relationship type.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ProviderRelationship {
    #[sqlx(rename = "id_provider_relationship")]
    pub id: i64,
    pub id_provider: i64,
    pub id_referral_source: i64,
    pub id_relationship_type: i64,
    pub effective_date: Option<NaiveDate>,
}

impl Record for ProviderRelationship {
    const TABLE: &'static Table = &PROVIDER_RELATIONSHIP;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProviderRelationship {
    pub id_provider: i64,
    pub id_referral_source: i64,
    pub id_relationship_type: i64,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
}

impl NewRecord for NewProviderRelationship {
    type Record = ProviderRelationship;

    fn values(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .put("id_provider", self.id_provider)
            .put("id_referral_source", self.id_referral_source)
            .put("id_relationship_type", self.id_relationship_type)
            .put("effective_date", self.effective_date)
            .into_vec())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderRelationshipPatch {
    #[serde(default)]
    pub id_provider: Option<i64>,
    #[serde(default)]
    pub id_referral_source: Option<i64>,
    #[serde(default)]
    pub id_relationship_type: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub effective_date: Option<Option<NaiveDate>>,
}

impl RecordPatch for ProviderRelationshipPatch {
    type Record = ProviderRelationship;

    fn changes(&self) -> Result<Vec<(&'static str, Value)>> {
        Ok(Columns::new()
            .set("id_provider", &self.id_provider)
            .set("id_referral_source", &self.id_referral_source)
            .set("id_relationship_type", &self.id_relationship_type)
            .set("effective_date", &self.effective_date)
            .into_vec())
    }
}
