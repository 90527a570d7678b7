pub mod departments;
pub mod fields;
pub mod image_review;
pub mod llm;
pub mod pipeline;
pub mod records;

pub use departments::{contact_for, DepartmentContact, DEFAULT_DEPARTMENT, DEPARTMENT_DIRECTORY};
pub use fields::Derived;
pub use llm::{ChatModel, OpenAiChatClient};
pub use pipeline::{ComplaintTriage, TriagedComplaint};
pub use records::{ComplainerRecord, OfficerRecord, RecordStore};
