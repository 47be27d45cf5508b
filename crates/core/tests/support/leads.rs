//! Lead record fixtures

use leadsync_domain::LeadRecord;
use serde_json::json;

/// A fully populated export row.
pub fn complete(md5: &str, first_name: &str) -> LeadRecord {
    serde_json::from_value(json!({
        "md5": md5,
        "first_name": first_name,
        "last_name": "Tester",
        "email_1": format!("{}@example.com", first_name.to_lowercase()),
        "phone_1": 3125550100.0,
        "address": "1 Main St",
        "city": "Springfield",
        "state": "IL",
        "zip_code": "62701",
        "age": 41,
        "household_income": "$100K-$150K"
    }))
    .unwrap_or_default()
}

/// A row whose `phone_2` cell holds an object, which cannot be transformed.
pub fn malformed(md5: &str) -> LeadRecord {
    serde_json::from_value(json!({
        "md5": md5,
        "first_name": "Broken",
        "phone_2": {"number": "3125550101"}
    }))
    .unwrap_or_default()
}
