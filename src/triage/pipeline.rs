use super::departments::{contact_for, DEFAULT_DEPARTMENT};
use super::fields::{
    self, classify_departments, fallback_suggestions, fallback_summary, interim_suggestions,
    severity_score, summarize, Derived,
};
use super::image_review::review_complaint_image;
use super::llm::ChatModel;
use super::records::{ComplainerRecord, OfficerRecord, RecordStore};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything one complaint produced: the two rendered views plus the
/// derived fields, each tagged with whether it was inferred or fell back.
#[derive(Debug, Clone)]
pub struct TriagedComplaint {
    pub complainer_view: String,
    pub officer_view: String,
    pub departments: Derived<Vec<String>>,
    pub severity: Derived<u8>,
    pub summary: Derived<String>,
    pub suggestions: Vec<String>,
    pub officer_brief: String,
    pub image_analysis: Option<String>,
    pub timestamp: String,
}

/// Complaint triage pipeline: classify, score, summarize, suggest, review
/// the attached image, render both record views, and append them to the
/// ledger. Degrades field by field — with no chat model at all every
/// derived field comes from its deterministic fallback.
pub struct ComplaintTriage {
    chat: Option<Arc<dyn ChatModel>>,
    records: RecordStore,
}

impl ComplaintTriage {
    pub fn new(records: RecordStore) -> Self {
        Self {
            chat: None,
            records,
        }
    }

    pub fn with_chat_model(mut self, chat: Arc<dyn ChatModel>) -> Self {
        self.chat = Some(chat);
        self
    }

    pub async fn process(
        &self,
        complaint: &str,
        location: &str,
        image_path: Option<&str>,
    ) -> TriagedComplaint {
        info!(location, has_image = image_path.is_some(), "processing complaint");
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
        let chat = self.chat.as_deref();

        let departments = match chat {
            Some(c) => classify_departments(c, complaint).await,
            None => Derived::Fallback(vec![DEFAULT_DEPARTMENT.to_string()]),
        };
        let severity = match chat {
            Some(c) => severity_score(c, complaint).await,
            None => Derived::Fallback(3),
        };
        let summary = match chat {
            Some(c) => summarize(c, complaint).await,
            None => Derived::Fallback(fallback_summary(complaint)),
        };

        let mut suggestions = Vec::new();
        for department in departments.value() {
            let derived = match chat {
                Some(c) => interim_suggestions(c, complaint, department).await,
                None => Derived::Fallback(fallback_suggestions()),
            };
            suggestions.extend(derived.into_value());
        }

        let image_analysis = match image_path {
            Some(path) if !path.is_empty() => {
                Some(review_complaint_image(chat, path, complaint).await)
            }
            _ => None,
        };

        let officer_brief =
            fields::officer_brief(summary.value(), *severity.value(), departments.value());
        debug!(brief = officer_brief.as_str(), "complaint routed");

        let complainer_view = build_complainer_view(
            complaint,
            location,
            departments.value(),
            &suggestions,
            image_analysis.as_deref(),
            &timestamp,
        );
        let officer_view = build_officer_view(
            complaint,
            location,
            summary.value(),
            *severity.value(),
            departments.value(),
            image_analysis.as_deref(),
            &timestamp,
        );

        let contact_details: BTreeMap<String, _> = departments
            .value()
            .iter()
            .filter_map(|d| contact_for(d).map(|c| (d.clone(), c)))
            .collect();
        let complainer_record = ComplainerRecord {
            departments_forwarded: departments.value().clone(),
            contact_details,
            suggestions: suggestions.clone(),
            timestamp: timestamp.clone(),
            image_analysis: image_analysis.clone(),
        };
        let officer_record = OfficerRecord {
            timestamp: timestamp.clone(),
            severity: *severity.value(),
            summary: summary.value().clone(),
            original_text: complaint.to_string(),
            location: location.to_string(),
            departments: departments.value().clone(),
            image_analysis: image_analysis.clone(),
        };
        // The citizen still gets their copy even when the ledger is sick.
        if let Err(e) = self
            .records
            .append(&complainer_view, &officer_view, &complainer_record, &officer_record)
            .await
        {
            warn!("failed to append complaint records: {}", e);
        }

        TriagedComplaint {
            complainer_view,
            officer_view,
            departments,
            severity,
            summary,
            suggestions,
            officer_brief,
            image_analysis,
            timestamp,
        }
    }
}

/// Render the citizen's copy. Line layout is part of the record contract;
/// downstream tooling greps these files.
pub(crate) fn build_complainer_view(
    complaint: &str,
    location: &str,
    departments: &[String],
    suggestions: &[String],
    image_analysis: Option<&str>,
    timestamp: &str,
) -> String {
    let mut view = String::from("--- COMPLAINER COPY ---\n");
    view.push_str(&format!(
        "Original Complaint: {}\nLocation: {}\nDepartments Forwarded: {}\n",
        complaint,
        location,
        departments.join(", ")
    ));
    view.push_str("Contact Details:\n");
    for department in departments {
        if let Some(contact) = contact_for(department) {
            view.push_str(&format!(
                "  {}: Phone - {}, Email - {}\n",
                department, contact.phone, contact.email
            ));
        }
    }
    view.push_str("Suggestions:\n");
    for suggestion in suggestions {
        view.push_str(&format!("  - {}\n", suggestion));
    }
    if departments.iter().any(|d| d == "Health Ministry") {
        view.push_str(
            "In the meantime, you can use the app's '/health-check/' feature to get an early diagnosis of the problem.\n",
        );
    }
    if let Some(analysis) = image_analysis {
        view.push_str(&format!("Image Validation: {}\n", analysis));
    }
    view.push_str(&format!("Timestamp: {}\nStatus: Pending\n\n", timestamp));
    view
}

/// Render the officer's copy.
pub(crate) fn build_officer_view(
    complaint: &str,
    location: &str,
    summary: &str,
    severity: u8,
    departments: &[String],
    image_analysis: Option<&str>,
    timestamp: &str,
) -> String {
    let mut view = String::from("--- OFFICER COPY ---\n");
    view.push_str(&format!(
        "Timestamp: {}\nSeverity: {}/5\nSummary: {}\nLocation: {}\n",
        timestamp, severity, summary, location
    ));
    view.push_str(&format!(
        "Original Complaint: {}\nDepartments: {}\n",
        complaint,
        departments.join(", ")
    ));
    if let Some(analysis) = image_analysis {
        view.push_str(&format!("Image Review: {}\n", analysis));
    }
    view
}
