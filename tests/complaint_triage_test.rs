use async_trait::async_trait;
use civic_lens::triage::{ChatModel, ComplaintTriage, RecordStore};
use image::{Rgb, RgbImage};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// Initialize logging for tests
fn init_logger() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}

/// Chat model that replays canned replies in call order.
struct Scripted {
    replies: Mutex<VecDeque<String>>,
}

impl Scripted {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        }
    }
}

#[async_trait]
impl ChatModel for Scripted {
    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("more chat calls than scripted replies"))
    }
}

fn records_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("civic-lens-triage-{}-{}", std::process::id(), tag))
}

#[tokio::test]
async fn full_triage_renders_both_views_and_appends_records() {
    init_logger();
    let dir = records_dir("full");
    let chat = Scripted::new(&[
        "Sanitation, Health Ministry",
        "4",
        "Garbage has piled up near the school for a week.",
        "- Keep children away from the pile\n- Cover the waste if possible",
        "- Wash hands after any contact\n- Report any illness",
    ]);
    let triage = ComplaintTriage::new(RecordStore::new(&dir)).with_chat_model(Arc::new(chat));

    let triaged = triage
        .process("Garbage is piling up near the school", "Ward 12", None)
        .await;

    assert!(!triaged.departments.is_fallback());
    assert_eq!(
        triaged.departments.value(),
        &vec!["Sanitation".to_string(), "Health Ministry".to_string()]
    );
    assert_eq!(*triaged.severity.value(), 4);
    assert_eq!(triaged.suggestions.len(), 4);
    assert!(triaged.image_analysis.is_none());

    let view = &triaged.complainer_view;
    assert!(view.starts_with("--- COMPLAINER COPY ---\n"));
    assert!(view.contains("Original Complaint: Garbage is piling up near the school\n"));
    assert!(view.contains("Location: Ward 12\n"));
    assert!(view.contains("Departments Forwarded: Sanitation, Health Ministry\n"));
    assert!(view.contains("  Sanitation: Phone - 1800-333-122, Email - cleanliness@civic.gov.in\n"));
    assert!(view.contains("  Health Ministry: Phone - 1800-777-999, Email - health@civic.gov.in\n"));
    assert!(view.contains("  - Keep children away from the pile\n"));
    assert!(view.contains("  - Report any illness\n"));
    assert!(view.contains(
        "In the meantime, you can use the app's '/health-check/' feature to get an early diagnosis of the problem.\n"
    ));
    assert!(!view.contains("Image Validation:"));
    assert!(view.ends_with("Status: Pending\n\n"));

    let officer = &triaged.officer_view;
    assert!(officer.starts_with("--- OFFICER COPY ---\n"));
    assert!(officer.contains("Severity: 4/5\n"));
    assert!(officer.contains("Summary: Garbage has piled up near the school for a week.\n"));
    assert!(officer.contains("Departments: Sanitation, Health Ministry\n"));

    let complainer_txt = std::fs::read_to_string(dir.join("complainer_output.txt")).unwrap();
    assert_eq!(complainer_txt.matches("--- COMPLAINER COPY ---").count(), 1);
    let officer_txt = std::fs::read_to_string(dir.join("officer_output.txt")).unwrap();
    assert_eq!(officer_txt.matches("--- OFFICER COPY ---").count(), 1);

    let complainer_json = std::fs::read_to_string(dir.join("complainer_output.json")).unwrap();
    assert_eq!(complainer_json.lines().count(), 1);
    let record: serde_json::Value = serde_json::from_str(complainer_json.trim()).unwrap();
    assert_eq!(
        record["departments_forwarded"],
        serde_json::json!(["Sanitation", "Health Ministry"])
    );
    assert!(record["image_analysis"].is_null());
    assert_eq!(
        record["contact_details"]["Sanitation"]["phone"],
        serde_json::json!("1800-333-122")
    );

    let officer_json = std::fs::read_to_string(dir.join("officer_output.json")).unwrap();
    let record: serde_json::Value = serde_json::from_str(officer_json.trim()).unwrap();
    assert_eq!(record["severity"], serde_json::json!(4));
    assert_eq!(
        record["original_text"],
        serde_json::json!("Garbage is piling up near the school")
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn without_a_chat_model_every_field_falls_back() {
    init_logger();
    let dir = records_dir("fallback");
    let triage = ComplaintTriage::new(RecordStore::new(&dir));

    let triaged = triage
        .process("Streetlight broken on 5th avenue", "5th Avenue", None)
        .await;

    assert!(triaged.departments.is_fallback());
    assert_eq!(triaged.departments.value(), &vec!["Road Development".to_string()]);
    assert!(triaged.severity.is_fallback());
    assert_eq!(*triaged.severity.value(), 3);
    assert!(triaged.summary.is_fallback());
    assert_eq!(triaged.summary.value(), "Streetlight broken on 5th avenue...");
    assert_eq!(
        triaged.suggestions,
        vec![
            "Contact local authorities".to_string(),
            "Document the issue with photos".to_string(),
            "Keep track of any developments".to_string(),
        ]
    );

    let view = &triaged.complainer_view;
    assert!(view.contains("  Road Development: Phone - 1800-443-556, Email - roads@civic.gov.in\n"));
    assert!(!view.contains("/health-check/"));
    assert!(triaged.officer_view.contains("Severity: 3/5\n"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn missing_image_surfaces_in_both_views() {
    init_logger();
    let dir = records_dir("missing-image");
    let chat = Scripted::new(&[
        "Road Development",
        "2",
        "A pothole on the main road.",
        "- Mark the spot with a cone",
    ]);
    let triage = ComplaintTriage::new(RecordStore::new(&dir)).with_chat_model(Arc::new(chat));

    let triaged = triage
        .process(
            "Pothole on main road",
            "Main Road",
            Some("/nonexistent/evidence.jpg"),
        )
        .await;

    assert_eq!(
        triaged.image_analysis.as_deref(),
        Some("The image could not be found on the server.")
    );
    assert!(triaged
        .complainer_view
        .contains("Image Validation: The image could not be found on the server.\n"));
    assert!(triaged
        .officer_view
        .contains("Image Review: The image could not be found on the server.\n"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn attached_image_is_reviewed_by_the_chat_model() {
    init_logger();
    let dir = records_dir("image-review");
    let png = std::env::temp_dir().join(format!(
        "civic-lens-evidence-{}.png",
        std::process::id()
    ));
    RgbImage::from_pixel(8, 8, Rgb([90, 90, 90]))
        .save(&png)
        .expect("temp png should save");

    let chat = Scripted::new(&[
        "Sanitation",
        "5",
        "A large garbage pile.",
        "- Avoid the area",
        "The image shows a garbage pile, consistent with the complaint.",
    ]);
    let triage = ComplaintTriage::new(RecordStore::new(&dir)).with_chat_model(Arc::new(chat));

    let triaged = triage
        .process(
            "Huge garbage pile",
            "Ward 3",
            Some(png.to_string_lossy().as_ref()),
        )
        .await;

    assert_eq!(
        triaged.image_analysis.as_deref(),
        Some("The image shows a garbage pile, consistent with the complaint.")
    );

    let _ = std::fs::remove_file(&png);
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn empty_image_path_is_treated_as_absent() {
    init_logger();
    let dir = records_dir("empty-path");
    let triage = ComplaintTriage::new(RecordStore::new(&dir));

    let triaged = triage.process("Water leakage", "Block B", Some("")).await;

    assert!(triaged.image_analysis.is_none());
    assert!(!triaged.complainer_view.contains("Image Validation:"));

    let _ = std::fs::remove_dir_all(&dir);
}
