use chrono::{DateTime, Utc};
use leadsync_domain::constants::{
    CRM_TIMESTAMP_FORMAT, FIELD_ADDRESS, FIELD_CITY, FIELD_EMAIL_1, FIELD_FIRST_NAME,
    FIELD_LAST_NAME, FIELD_PHONE_1, FIELD_PHONE_2, FIELD_PHONE_3, FIELD_STATE, FIELD_ZIP_CODE,
    LEAD_STATUS_UNWORKED, NOTE_CATEGORY, NOTE_FIELDS,
};
use leadsync_domain::{
    AgentRef, AssignedAgents, ContactBlock, CrmPayload, DeliveryConfig, LeadInfo, LeadRecord,
    MailingAddress, Note, PhoneNumbers,
};

use super::phone::clean_phone;
use super::TransformError;

/// Builds CRM payloads from lead records.
///
/// Holds only the static settings of a batch (agents, tags, source), so a
/// single instance can be shared by every delivery task.
#[derive(Debug, Clone)]
pub struct RecordTransformer {
    settings: DeliveryConfig,
}

impl RecordTransformer {
    pub fn new(settings: DeliveryConfig) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &DeliveryConfig {
        &self.settings
    }

    /// Transform `record`, stamping it with the current time
    ///
    /// # Errors
    /// [`TransformError::MalformedField`] when a field holds an array or an
    /// object.
    pub fn transform(&self, record: &LeadRecord) -> Result<CrmPayload, TransformError> {
        self.transform_at(record, Utc::now())
    }

    /// Transform `record` with an explicit timestamp
    ///
    /// # Errors
    /// [`TransformError::MalformedField`] when a field holds an array or an
    /// object.
    pub fn transform_at(
        &self,
        record: &LeadRecord,
        now: DateTime<Utc>,
    ) -> Result<CrmPayload, TransformError> {
        let timestamp = now.format(CRM_TIMESTAMP_FORMAT).to_string();
        let contact = build_contact(record)?;
        let tags = self.build_tags(record)?;
        let notes = self.build_note(record, &timestamp)?.into_iter().collect();

        Ok(CrmPayload {
            registered_date: timestamp,
            info: LeadInfo {
                status: LEAD_STATUS_UNWORKED.to_string(),
                source: self.settings.source.clone(),
                contact,
            },
            assigned_agents: AssignedAgents {
                primary_agent: AgentRef::new(self.settings.primary_agent.clone()),
                listing_agent: AgentRef::new(self.settings.listing_agent.clone()),
                partner: AgentRef::new(self.settings.partner.clone()),
            },
            tags,
            notes,
        })
    }

    fn build_tags(&self, record: &LeadRecord) -> Result<Vec<String>, TransformError> {
        let mut tags: Vec<String> = Vec::with_capacity(self.settings.tags.len() + 1);
        let zip = if self.settings.add_zip_tags { record.text(FIELD_ZIP_CODE)? } else { None };

        for tag in self.settings.tags.iter().cloned().chain(zip) {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        Ok(tags)
    }

    fn build_note(
        &self,
        record: &LeadRecord,
        timestamp: &str,
    ) -> Result<Option<Note>, TransformError> {
        let mut lines = Vec::new();
        for (field, label) in NOTE_FIELDS {
            if let Some(value) = record.text(field)? {
                lines.push(format!("{label}: {value}"));
            }
        }

        if lines.is_empty() {
            return Ok(None);
        }

        Ok(Some(Note {
            content: lines.join("\n"),
            category: NOTE_CATEGORY.to_string(),
            created_by: self.settings.source.clone(),
            created_date: timestamp.to_string(),
            is_pinned: true,
        }))
    }
}

fn build_contact(record: &LeadRecord) -> Result<ContactBlock, TransformError> {
    let email = record.text(FIELD_EMAIL_1)?;
    let is_validated_email = email.as_ref().map(|_| true);

    let phone_numbers = PhoneNumbers {
        cell_phone: record.text(FIELD_PHONE_1)?.map(|p| clean_phone(&p)),
        home_phone: record.text(FIELD_PHONE_2)?.map(|p| clean_phone(&p)),
        work_phone: record.text(FIELD_PHONE_3)?.map(|p| clean_phone(&p)),
    };

    let mailing_address = match (
        record.text(FIELD_ADDRESS)?,
        record.text(FIELD_CITY)?,
        record.text(FIELD_STATE)?,
        record.text(FIELD_ZIP_CODE)?,
    ) {
        (Some(street), Some(city), Some(state), Some(postal_or_zip)) => {
            Some(MailingAddress { street, city, state, postal_or_zip })
        }
        _ => None,
    };

    Ok(ContactBlock {
        first_name: record.text(FIELD_FIRST_NAME)?,
        last_name: record.text(FIELD_LAST_NAME)?,
        email,
        is_validated_email,
        phone_numbers,
        mailing_address,
    })
}
