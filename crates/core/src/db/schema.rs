//! Static description of every directory table.
//!
//! The store validates writes against these definitions (required columns,
//! text length limits, unique columns, references) before touching the
//! database, and walks the `references` edges to find dependents on delete.
//! The SQL in `migrations/sqlite` must stay in step with this file.

/// Storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
    Boolean,
    Date,
}

/// A non-id column of a directory table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    /// Maximum length in characters, for bounded text columns.
    pub max_len: Option<usize>,
    pub required: bool,
    pub unique: bool,
    /// Name of the parent table this column points at.
    pub references: Option<&'static str>,
    /// Record field name, when it differs from the column name beyond case.
    pub field: Option<&'static str>,
}

impl Column {
    const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            max_len: None,
            required: false,
            unique: false,
            references: None,
            field: None,
        }
    }

    pub const fn text(name: &'static str, max_len: usize) -> Self {
        Self {
            max_len: Some(max_len),
            ..Self::new(name, ColumnKind::Text)
        }
    }

    pub const fn long_text(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Text)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Integer)
    }

    pub const fn real(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Real)
    }

    /// Boolean columns are always NOT NULL with a default.
    pub const fn boolean(name: &'static str) -> Self {
        Self {
            required: true,
            ..Self::new(name, ColumnKind::Boolean)
        }
    }

    pub const fn date(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Date)
    }

    pub const fn foreign_key(name: &'static str, table: &'static str) -> Self {
        Self {
            references: Some(table),
            ..Self::new(name, ColumnKind::Integer)
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    pub const fn field(self, field: &'static str) -> Self {
        Self {
            field: Some(field),
            ..self
        }
    }

    /// Whether a filter key names this column, by column or field name, ignoring case.
    pub fn matches_key(&self, key: &str) -> bool {
        self.name.eq_ignore_ascii_case(key)
            || self.field.is_some_and(|f| f.eq_ignore_ascii_case(key))
    }
}

/// A directory table: its name, id column and data columns.
#[derive(Debug, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    /// Human-readable entity name used in error messages.
    pub entity: &'static str,
    pub id_column: &'static str,
    pub columns: &'static [Column],
}

impl Table {
    /// Look up a data column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns of other tables that reference this table.
    pub fn dependents(&'static self) -> Vec<(&'static Table, &'static Column)> {
        TABLES
            .iter()
            .flat_map(|t| {
                t.columns
                    .iter()
                    .filter(|c| c.references == Some(self.name))
                    .map(move |c| (*t, c))
            })
            .collect()
    }
}

pub static USER: Table = Table {
    name: "user",
    entity: "user",
    id_column: "id_user",
    columns: &[
        Column::text("first_name", 60),
        Column::text("last_name", 60),
        Column::text("username", 60).required().unique(),
        Column::text("password_hash", 128).required(),
        Column::integer("department_id"),
        Column::foreign_key("role_id", "roles"),
        Column::boolean("is_admin"),
    ],
};

pub static ROLES: Table = Table {
    name: "roles",
    entity: "role",
    id_column: "id_role",
    columns: &[
        Column::text("name", 60).required().unique(),
        Column::text("description", 200),
    ],
};

pub static PROVIDER: Table = Table {
    name: "provider",
    entity: "provider",
    id_column: "id_provider",
    columns: &[
        Column::text("first_name", 60),
        Column::text("middle_name", 60),
        Column::text("last_name", 60),
        Column::date("birthday"),
        Column::text("gender", 6),
        Column::text("SSN", 9).unique(),
        Column::text("NPI", 10).unique(),
        Column::text("CA_DEA", 11).unique(),
        Column::text("home_phone", 10),
        Column::text("mobile_phone", 10),
        Column::text("work_email", 120).unique(),
        Column::text("personal_email", 120).unique(),
        Column::text("fax_number", 10),
        Column::text("address", 255),
        Column::text("city", 45),
        Column::text("state", 45),
        Column::text("zip", 10),
    ],
};

pub static SPECIALTY: Table = Table {
    name: "specialty",
    entity: "specialty",
    id_column: "id_specialty",
    columns: &[Column::text("specialty", 100).required().unique()],
};

pub static PROVIDER_SPECIALTY: Table = Table {
    name: "provider_specialty",
    entity: "provider specialty",
    id_column: "id_provider_specialty",
    columns: &[
        Column::foreign_key("id_provider", "provider").required(),
        Column::foreign_key("id_specialty", "specialty").required(),
        Column::boolean("board_certified"),
        Column::boolean("primary_specialty"),
    ],
};

pub static PROVIDER_EDUCATION: Table = Table {
    name: "provider_education",
    entity: "provider education",
    id_column: "id_provider_education",
    columns: &[
        Column::foreign_key("id_provider", "provider").required(),
        Column::text("type", 45),
        Column::text("school", 255),
        Column::text("address", 255),
        Column::text("city", 45),
        Column::text("state", 45),
        Column::text("zip", 10),
        Column::text("country", 255),
        Column::text("degree", 255),
        Column::text("degree_type", 45),
        Column::integer("year_began"),
        Column::integer("year_complete"),
    ],
};

pub static REFERRAL_SOURCE: Table = Table {
    name: "referral_source",
    entity: "referral source",
    id_column: "id_referral_source",
    columns: &[
        Column::text("first_name", 60),
        Column::text("middle_name", 60),
        Column::text("last_name", 60),
        Column::text("company", 150),
        Column::text("work_phone", 10),
        Column::text("mobile_phone", 10),
        Column::text("work_email", 120),
        Column::text("fax_number", 10),
        Column::text("website", 255),
    ],
};

pub static RELATIONSHIP_TYPE: Table = Table {
    name: "relationship_type",
    entity: "relationship type",
    id_column: "id_relationship_type",
    columns: &[Column::text("relationship_type", 45)],
};

pub static PROVIDER_RELATIONSHIP: Table = Table {
    name: "provider_relationship",
    entity: "provider relationship",
    id_column: "id_provider_relationship",
    columns: &[
        Column::foreign_key("id_provider", "provider").required(),
        Column::foreign_key("id_referral_source", "referral_source").required(),
        Column::foreign_key("id_relationship_type", "relationship_type").required(),
        Column::date("effective_date"),
    ],
};

pub static EMPLOYER: Table = Table {
    name: "employer",
    entity: "employer",
    id_column: "id_employer",
    columns: &[
        Column::text("company", 150),
        Column::text("address", 255),
        Column::text("city", 45),
        Column::text("state", 45),
        Column::text("zip", 10),
        Column::text("phone", 10),
        Column::text("email", 120),
    ],
};

pub static PROVIDER_EMPLOYMENT: Table = Table {
    name: "provider_employment",
    entity: "provider employment",
    id_column: "id_provider_employment",
    columns: &[
        Column::foreign_key("id_provider", "provider").required(),
        Column::foreign_key("id_employer", "employer").required(),
        Column::date("effective_date"),
        Column::date("term_date"),
    ],
};

pub static PROVIDER_PROFESSIONAL_LIABILITY: Table = Table {
    name: "provider_professional_liability",
    entity: "provider professional liability",
    id_column: "id_provider_professional_liability",
    columns: &[
        Column::foreign_key("id_provider", "provider").required(),
        Column::text("carrier", 150),
        Column::date("effective_date"),
        Column::date("term_date"),
    ],
};

pub static PROVIDER_CAQH: Table = Table {
    name: "provider_CAQH",
    entity: "provider CAQH",
    id_column: "id_provider_CAQH",
    columns: &[
        Column::foreign_key("id_provider", "provider").required(),
        Column::date("auth_received_date"),
        Column::date("added_date"),
        Column::date("last_updated_date"),
    ],
};

pub static PRACTICE_LOCATION: Table = Table {
    name: "practice_locaton",
    entity: "practice location",
    id_column: "id_practice_location",
    columns: &[
        Column::text("practice_locaton", 255).field("practice_location"),
        Column::text("practice_type", 255),
        Column::text("cost_center", 10),
        Column::text("region", 10),
        Column::text("CAO", 60),
        Column::text("address", 255),
        Column::text("city", 45),
        Column::text("state", 45),
        Column::text("zip", 10),
    ],
};

pub static PRACTICE_TYPE: Table = Table {
    name: "practice_type",
    entity: "practice type",
    id_column: "id_practice_type",
    columns: &[Column::text("practice_type", 100)],
};

pub static PROVIDER_PRACTICE_LOCATION: Table = Table {
    name: "provider_practice_locaton",
    entity: "provider practice location",
    id_column: "id_provider_practice_location",
    columns: &[
        Column::foreign_key("id_practice_location", "practice_locaton").required(),
        Column::date("effective_date"),
        Column::date("term_date"),
        Column::boolean("primary_location"),
    ],
};

pub static PROVIDER_ACTIVITIES: Table = Table {
    name: "provider_activities",
    entity: "provider activities",
    id_column: "id_provider_activities",
    columns: &[
        Column::foreign_key("id_provider", "provider").required(),
        Column::foreign_key("id_provider_practice_location", "provider_practice_locaton"),
        Column::foreign_key("id_practice_type", "practice_type"),
        Column::boolean("primary_activities"),
        Column::text("title", 120),
        Column::date("effective_date"),
        Column::date("term_date"),
        Column::real("clinical_FTE"),
        Column::real("admin_FTE"),
        Column::real("research_FTE"),
        Column::real("teaching_FTE"),
        Column::real("weekly_patient_care_hours"),
        Column::long_text("description"),
    ],
};

/// Every directory table, parents before children.
pub static TABLES: &[&Table] = &[
    &ROLES,
    &USER,
    &PROVIDER,
    &SPECIALTY,
    &PROVIDER_SPECIALTY,
    &PROVIDER_EDUCATION,
    &REFERRAL_SOURCE,
    &RELATIONSHIP_TYPE,
    &PROVIDER_RELATIONSHIP,
    &EMPLOYER,
    &PROVIDER_EMPLOYMENT,
    &PROVIDER_PROFESSIONAL_LIABILITY,
    &PROVIDER_CAQH,
    &PRACTICE_LOCATION,
    &PRACTICE_TYPE,
    &PROVIDER_PRACTICE_LOCATION,
    &PROVIDER_ACTIVITIES,
];

/// Find a table by its persisted name.
pub fn table(name: &str) -> Option<&'static Table> {
    TABLES.iter().copied().find(|t| t.name == name)
}
