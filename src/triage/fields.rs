use super::departments::{department_names, is_known_department, DEFAULT_DEPARTMENT};
use super::llm::ChatModel;
use tracing::warn;

/// A triage field together with how it was obtained. Every LLM-derived
/// field has a deterministic fallback, and callers can tell the two apart
/// instead of guessing from magic default values.
#[derive(Debug, Clone, PartialEq)]
pub enum Derived<T> {
    Inferred(T),
    Fallback(T),
}

impl<T> Derived<T> {
    pub fn value(&self) -> &T {
        match self {
            Derived::Inferred(v) | Derived::Fallback(v) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Derived::Inferred(v) | Derived::Fallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Derived::Fallback(_))
    }
}

/// Route a complaint to one or more departments. Replies are split on
/// commas and validated against the directory; unknown names are dropped.
pub async fn classify_departments(chat: &dyn ChatModel, complaint: &str) -> Derived<Vec<String>> {
    let prompt = format!(
        "Given this complaint:\n{}\nClassify it into one or more of the following departments:\n{}.\nReturn only department names as a comma-separated list.",
        complaint,
        department_names().join(", ")
    );
    match chat.complete(&prompt).await {
        Ok(reply) => Derived::Inferred(
            reply
                .split(',')
                .map(str::trim)
                .filter(|name| is_known_department(name))
                .map(String::from)
                .collect(),
        ),
        Err(e) => {
            warn!("department classification failed: {}", e);
            Derived::Fallback(vec![DEFAULT_DEPARTMENT.to_string()])
        }
    }
}

/// Severity on a 1–5 scale. All digits in the reply are concatenated before
/// parsing, so "4/5" reads as 45 and clamps to 5.
pub async fn severity_score(chat: &dyn ChatModel, complaint: &str) -> Derived<u8> {
    let prompt = format!(
        "Assess the severity of this civic complaint on a scale of 1 (least) to 5 (most severe).\nComplaint:\n{}\nSeverity (number only):",
        complaint
    );
    match chat.complete(&prompt).await {
        Ok(reply) => match parse_severity_digits(&reply) {
            Some(score) => Derived::Inferred(score),
            None => {
                warn!("severity reply contained no digits");
                Derived::Fallback(3)
            }
        },
        Err(e) => {
            warn!("severity scoring failed: {}", e);
            Derived::Fallback(3)
        }
    }
}

pub(crate) fn parse_severity_digits(reply: &str) -> Option<u8> {
    let digits: String = reply.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    Some(match digits.parse::<u64>() {
        Ok(n) => n.clamp(1, 5) as u8,
        Err(_) => 5, // more digits than u64 can hold — saturate
    })
}

/// Short summary for the officer record. Falls back to the complaint's
/// first 100 characters.
pub async fn summarize(chat: &dyn ChatModel, complaint: &str) -> Derived<String> {
    let prompt = format!(
        "Summarize this civic complaint in two or three sentences, keeping the concrete details:\n{}",
        complaint
    );
    match chat.complete(&prompt).await {
        Ok(summary) => Derived::Inferred(summary),
        Err(e) => {
            warn!("summarization failed: {}", e);
            Derived::Fallback(fallback_summary(complaint))
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Deterministic summary used when no chat model is configured at all.
pub(crate) fn fallback_summary(complaint: &str) -> String {
    format!("{}...", truncate_chars(complaint, 100))
}

/// Deterministic suggestions used when no chat model is configured at all.
pub(crate) fn fallback_suggestions() -> Vec<String> {
    vec![
        "Contact local authorities".to_string(),
        "Document the issue with photos".to_string(),
        "Keep track of any developments".to_string(),
    ]
}

/// What the complainer can do while the department responds, asked from
/// that department's perspective. At most four points.
pub async fn interim_suggestions(
    chat: &dyn ChatModel,
    complaint: &str,
    department: &str,
) -> Derived<Vec<String>> {
    let prompt = format!(
        "Answer in 3-4 short points. Don't use salutations.\nJust list suggestions the complainer could do while waiting for the department to deal with it.\nYou are a government representative who received a complaint: {}\nAnswer from perspective of {}",
        complaint, department
    );
    match chat.complete(&prompt).await {
        Ok(reply) => Derived::Inferred(
            reply
                .lines()
                .map(|line| line.trim_matches(['-', '•', ' ', '\t']))
                .filter(|line| !line.is_empty())
                .take(4)
                .map(String::from)
                .collect(),
        ),
        Err(e) => {
            warn!("suggestion generation failed: {}", e);
            Derived::Fallback(fallback_suggestions())
        }
    }
}

/// One-line routing brief for the officer record. Not LLM-derived.
pub fn officer_brief(summary: &str, severity: u8, departments: &[String]) -> String {
    let dept_str = if departments.is_empty() {
        "relevant authority".to_string()
    } else {
        departments.join(", ")
    };
    format!(
        "A complaint has been received regarding {}. The issue is rated {}/5 in severity and is forwarded to the {}.",
        summary, severity, dept_str
    )
}
