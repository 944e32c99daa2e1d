//! Response parser - extracts a question package from raw generated text
//!
//! The provider's output is untrusted: it may wrap JSON in code fences,
//! surround it with prose, or violate the requested shape entirely.
//! Parsing is all-or-nothing: any entry violating its shape fails the
//! whole package, never a partial result. Failures return `None` across
//! this boundary, never an error or panic.

use serde_json::Value;
use tracing::debug;

/// Validated parse result: question texts plus optional per-question
/// scale label sets (empty inner vec = none supplied)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPackage {
    pub questions: Vec<String>,
    pub scale_labels: Vec<Vec<String>>,
}

/// The two output shapes the prompts allow, resolved in a single
/// validation pass over every entry
enum EntryShape {
    /// Every entry is a bare non-empty string
    Plain(Vec<String>),
    /// Every entry is an object with a `text` field and optional
    /// five-label `scaleLabels`
    Labeled(Vec<(String, Vec<String>)>),
}

/// Parse raw generated text into a question package
///
/// Reused unchanged for all three rounds; round 3 simply never supplies
/// scale labels.
pub fn parse(raw: &str) -> Option<QuestionPackage> {
    let body = extract_json(raw)?;
    let value: Value = serde_json::from_str(body).ok()?;

    let entries = value.get("questions")?.as_array()?;
    if entries.is_empty() || entries.len() > 10 {
        debug!(count = entries.len(), "question count outside 1-10");
        return None;
    }

    match classify(entries)? {
        EntryShape::Plain(questions) => Some(QuestionPackage {
            questions,
            scale_labels: Vec::new(),
        }),
        EntryShape::Labeled(entries) => {
            let (questions, scale_labels) = entries.into_iter().unzip();
            Some(QuestionPackage {
                questions,
                scale_labels,
            })
        }
    }
}

/// Strip code-fence markers and slice from the first `{` to the last `}`
fn extract_json(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&trimmed[start..=end])
}

/// Resolve the shape shared by every entry; a mixture is a hard failure
fn classify(entries: &[Value]) -> Option<EntryShape> {
    if entries.iter().all(Value::is_string) {
        let mut questions = Vec::with_capacity(entries.len());
        for entry in entries {
            let text = entry.as_str()?.trim();
            if text.is_empty() {
                return None;
            }
            questions.push(text.to_string());
        }
        return Some(EntryShape::Plain(questions));
    }

    if entries.iter().all(Value::is_object) {
        let mut labeled = Vec::with_capacity(entries.len());
        for entry in entries {
            let text = entry.get("text")?.as_str()?.trim();
            if text.is_empty() {
                return None;
            }
            let labels = match entry.get("scaleLabels") {
                None | Some(Value::Null) => Vec::new(),
                Some(value) => parse_label_set(value)?,
            };
            labeled.push((text.to_string(), labels));
        }
        return Some(EntryShape::Labeled(labeled));
    }

    debug!("entries mix shapes or are neither strings nor objects");
    None
}

/// A label set, if present, must be exactly 5 non-empty strings
fn parse_label_set(value: &Value) -> Option<Vec<String>> {
    let array = value.as_array()?;
    if array.len() != 5 {
        return None;
    }
    let mut labels = Vec::with_capacity(5);
    for label in array {
        let text = label.as_str()?.trim();
        if text.is_empty() {
            return None;
        }
        labels.push(text.to_string());
    }
    Some(labels)
}
