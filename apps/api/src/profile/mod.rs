//! Candidate profile assembly: upload → validation → extraction → LLM →
//! view model. HTTP plumbing lives in `handlers`; the pure merge of
//! extracted data and form fields lives here.

pub mod handlers;
pub mod prompts;

use chrono::Utc;
use uuid::Uuid;

use crate::models::profile::{CandidateProfile, ContactInfo, ExtractedResume};

/// Optional form fields submitted alongside the file. When present they win
/// over whatever the extraction produced — the candidate knows their own
/// name better than the model does.
#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub headline: Option<String>,
}

/// Merges LLM-extracted résumé data with the submitted form fields into the
/// profile view model.
pub fn build_profile(extracted: ExtractedResume, fields: ProfileFields) -> CandidateProfile {
    let name = fields
        .name
        .or(extracted.name)
        .unwrap_or_else(|| "Unnamed Candidate".to_string());
    let headline = fields.headline.or(extracted.headline);

    let summary = extracted
        .summary
        .or_else(|| headline.clone())
        .unwrap_or_default();

    CandidateProfile {
        id: Uuid::new_v4(),
        generated_at: Utc::now(),
        contact: ContactInfo {
            name,
            email: fields.email.or(extracted.email),
            phone: extracted.phone,
            location: extracted.location,
            headline,
        },
        summary,
        experience: extracted.experience,
        education: extracted.education,
        skills: extracted.skills,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::ExperienceEntry;

    #[test]
    fn form_fields_override_extracted_contact() {
        let extracted = ExtractedResume {
            name: Some("J. Doe".to_string()),
            email: Some("old@example.com".to_string()),
            ..Default::default()
        };
        let fields = ProfileFields {
            name: Some("Jane Doe".to_string()),
            email: Some("jane@example.com".to_string()),
            headline: None,
        };

        let profile = build_profile(extracted, fields);
        assert_eq!(profile.contact.name, "Jane Doe");
        assert_eq!(profile.contact.email.as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn extracted_values_fill_missing_form_fields() {
        let extracted = ExtractedResume {
            name: Some("Jane Doe".to_string()),
            headline: Some("Staff Engineer".to_string()),
            summary: Some("12 years building storage systems.".to_string()),
            skills: vec!["Rust".to_string()],
            ..Default::default()
        };

        let profile = build_profile(extracted, ProfileFields::default());
        assert_eq!(profile.contact.name, "Jane Doe");
        assert_eq!(profile.contact.headline.as_deref(), Some("Staff Engineer"));
        assert_eq!(profile.summary, "12 years building storage systems.");
        assert_eq!(profile.skills, vec!["Rust"]);
    }

    #[test]
    fn headline_backfills_empty_summary() {
        let extracted = ExtractedResume {
            headline: Some("Backend Engineer".to_string()),
            ..Default::default()
        };
        let profile = build_profile(extracted, ProfileFields::default());
        assert_eq!(profile.summary, "Backend Engineer");
    }

    #[test]
    fn experience_is_carried_through_unchanged() {
        let extracted = ExtractedResume {
            experience: vec![ExperienceEntry {
                title: "Engineer".to_string(),
                company: "Acme".to_string(),
                date_start: Some("2020-01".to_string()),
                date_end: None,
                bullets: vec!["Cut p99 latency by 40%".to_string()],
            }],
            ..Default::default()
        };
        let profile = build_profile(extracted, ProfileFields::default());
        assert_eq!(profile.experience.len(), 1);
        assert_eq!(profile.experience[0].company, "Acme");
    }

    #[test]
    fn fully_empty_extraction_still_builds() {
        let profile = build_profile(ExtractedResume::default(), ProfileFields::default());
        assert_eq!(profile.contact.name, "Unnamed Candidate");
        assert!(profile.summary.is_empty());
        assert!(profile.experience.is_empty());
    }
}
