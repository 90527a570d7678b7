pub mod core;
pub mod health;
pub mod inference;
pub mod nlp;
pub mod triage;
pub mod verify;

// --- Primary core exports ---
pub use core::types;
pub use core::types::*;
pub use core::AppState;

pub use health::{SkinAssessment, SkinTriage};
pub use inference::{DeepfakeModel, SkinClassifier};
pub use triage::{ComplaintTriage, TriagedComplaint};
pub use verify::{PostAnalyzer, LOCAL_IMAGES_KEY};
