/// Normalize a phone value from the export.
///
/// Spreadsheet exports often turn phone numbers into floats
/// (`3125550100.0`). An integral finite number is rendered without the
/// fraction; anything else is returned trimmed. No digit-count validation
/// happens here, the CRM decides what it accepts.
#[must_use]
pub fn clean_phone(value: &str) -> String {
    let trimmed = value.trim();
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() && number.fract() == 0.0 => format!("{number:.0}"),
        _ => trimmed.to_string(),
    }
}
