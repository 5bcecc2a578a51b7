use serde::ser::{Serialize, SerializeMap, Serializer};

/// One employee/AI exchange from a dialogue transcript.
///
/// Serializes as an object keyed by the speaker labels, employee first:
/// `{"客服": "...", "顾客": "..."}`. A trailing employee line with no reply is a
/// partial turn and serializes with the employee key only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueTurn {
    pub employee_label: String,
    pub employee: String,
    pub ai_label: String,
    pub ai: Option<String>,
}

impl DialogueTurn {
    pub fn is_complete(&self) -> bool {
        self.ai.is_some()
    }
}

impl Serialize for DialogueTurn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.ai.is_some() { 2 } else { 1 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(&self.employee_label, &self.employee)?;
        if let Some(ai) = &self.ai {
            map.serialize_entry(&self.ai_label, ai)?;
        }
        map.end()
    }
}
