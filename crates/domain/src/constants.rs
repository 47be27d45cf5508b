//! Domain constants
//!
//! Centralized location for the lead vocabulary and the fixed values the CRM
//! payload carries.

/// Lead status assigned to every delivered record.
pub const LEAD_STATUS_UNWORKED: &str = "unworked";

/// Default source attribution (payload `source` and note `created_by`).
pub const DEFAULT_SOURCE_ATTRIBUTION: &str = "Real Intent";

/// Category of the pinned enrichment note.
pub const NOTE_CATEGORY: &str = "info";

/// Timestamp layout used for `registered_date` and note `created_date`.
pub const CRM_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Default OAuth scopes requested during authorization.
pub const DEFAULT_SCOPES: &[&str] = &["contacts.write", "contacts.readonly"];

/// Default number of records delivered concurrently.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Default identity endpoint used to validate a token.
pub const DEFAULT_VERIFY_PATH: &str = "/me";

/// Default lead creation endpoint.
pub const DEFAULT_LEADS_PATH: &str = "/leads";

// Lead field names
pub const FIELD_MD5: &str = "md5";
pub const FIELD_FIRST_NAME: &str = "first_name";
pub const FIELD_LAST_NAME: &str = "last_name";
pub const FIELD_EMAIL_1: &str = "email_1";
pub const FIELD_EMAIL_2: &str = "email_2";
pub const FIELD_EMAIL_3: &str = "email_3";
pub const FIELD_PHONE_1: &str = "phone_1";
pub const FIELD_PHONE_2: &str = "phone_2";
pub const FIELD_PHONE_3: &str = "phone_3";
pub const FIELD_ADDRESS: &str = "address";
pub const FIELD_CITY: &str = "city";
pub const FIELD_STATE: &str = "state";
pub const FIELD_ZIP_CODE: &str = "zip_code";

/// Contact fields of the export, in column order.
pub const CONTACT_FIELDS: &[&str] = &[
    FIELD_FIRST_NAME,
    FIELD_LAST_NAME,
    FIELD_EMAIL_1,
    FIELD_EMAIL_2,
    FIELD_EMAIL_3,
    FIELD_PHONE_1,
    FIELD_PHONE_2,
    FIELD_PHONE_3,
    FIELD_ADDRESS,
    FIELD_CITY,
    FIELD_STATE,
    FIELD_ZIP_CODE,
];

/// Enrichment fields rendered into the notes block, in display order, with
/// their human-readable labels.
pub const NOTE_FIELDS: &[(&str, &str)] = &[
    ("insight", "AI-Enhanced Insight"),
    ("phone_1_dnc", "Cell Phone DNC Status"),
    ("phone_2_dnc", "Home Phone DNC Status"),
    ("phone_3_dnc", "Work Phone DNC Status"),
    (FIELD_EMAIL_2, "Secondary Email"),
    (FIELD_EMAIL_3, "Alternative Email"),
    ("age", "Age"),
    ("gender", "Gender"),
    ("head_of_household", "Head of Household"),
    ("birth_month_and_year", "Birth Month and Year"),
    ("credit_range", "Credit Range"),
    ("household_income", "Household Income"),
    ("household_net_worth", "Household Net Worth"),
    ("home_owner_status", "Home Owner Status"),
    ("median_home_value", "Median Home Value"),
    ("occupation", "Occupation"),
    ("education", "Education Level"),
    ("marital_status", "Marital Status"),
    ("n_household_children", "Number of Children"),
    ("n_household_adults", "Number of Adults"),
    ("investments", "Investments"),
    ("investment_type", "Investment Type"),
];

/// PII fields hashed into a lead identifier when the export has no `md5`.
pub const IDENTITY_FIELDS: &[&str] = &[
    FIELD_FIRST_NAME,
    FIELD_LAST_NAME,
    FIELD_EMAIL_1,
    FIELD_PHONE_1,
    FIELD_ADDRESS,
    FIELD_CITY,
    FIELD_STATE,
    FIELD_ZIP_CODE,
];

/// Whether `name` belongs to the recognized lead vocabulary.
pub fn is_recognized_field(name: &str) -> bool {
    name == FIELD_MD5
        || CONTACT_FIELDS.contains(&name)
        || NOTE_FIELDS.iter().any(|(field, _)| *field == name)
}
