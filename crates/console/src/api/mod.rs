//! JSON CRUD API, one resource per directory table.
//!
//! Mounted under `/api/v1` by the parent router. Reads are open to any
//! signed-in user; writes require an administrator.

pub mod records;

use std::sync::Arc;

use axum::Router;

use provdir_core::models::{employment::*, practice::*, provider::*, referral::*, specialty::*, user::*};

use crate::AppState;
use records::table_routes;

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(table_routes::<NewRole, RolePatch>())
        .merge(table_routes::<NewUser, UserPatch>())
        .merge(table_routes::<NewProvider, ProviderPatch>())
        .merge(table_routes::<NewSpecialty, SpecialtyPatch>())
        .merge(table_routes::<NewProviderSpecialty, ProviderSpecialtyPatch>())
        .merge(table_routes::<NewProviderEducation, ProviderEducationPatch>())
        .merge(table_routes::<NewReferralSource, ReferralSourcePatch>())
        .merge(table_routes::<NewRelationshipType, RelationshipTypePatch>())
        .merge(table_routes::<NewProviderRelationship, ProviderRelationshipPatch>())
        .merge(table_routes::<NewEmployer, EmployerPatch>())
        .merge(table_routes::<NewProviderEmployment, ProviderEmploymentPatch>())
        .merge(table_routes::<
            NewProviderProfessionalLiability,
            ProviderProfessionalLiabilityPatch,
        >())
        .merge(table_routes::<NewProviderCaqh, ProviderCaqhPatch>())
        .merge(table_routes::<NewPracticeLocation, PracticeLocationPatch>())
        .merge(table_routes::<NewPracticeType, PracticeTypePatch>())
        .merge(table_routes::<NewProviderPracticeLocation, ProviderPracticeLocationPatch>())
        .merge(table_routes::<NewProviderActivities, ProviderActivitiesPatch>())
}
