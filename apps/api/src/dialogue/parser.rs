//! Transcript parsing.
//!
//! Speaker labels come from the first two non-empty lines: the first label is
//! the employee, the second (distinct) label is the AI. Every later line must
//! carry one of those two labels or it is skipped.

use crate::dialogue::TranscriptError;
use crate::models::dialogue::DialogueTurn;

/// The two speaker labels of a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roles {
    pub employee: String,
    pub ai: String,
}

/// Splits `"<label>: <utterance>"` at the first ASCII or full-width colon.
fn split_speaker(line: &str) -> Option<(&str, &str)> {
    let idx = line.find([':', '：'])?;
    let (label, rest) = line.split_at(idx);
    let separator = rest.chars().next()?;
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    Some((label, rest[separator.len_utf8()..].trim()))
}

pub fn infer_roles(text: &str) -> Result<Roles, TranscriptError> {
    let mut labels = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(2)
        .map(|line| split_speaker(line).map(|(label, _)| label));

    match (labels.next().flatten(), labels.next().flatten()) {
        (Some(employee), Some(ai)) if employee != ai => Ok(Roles {
            employee: employee.to_string(),
            ai: ai.to_string(),
        }),
        _ => Err(TranscriptError::RoleInference),
    }
}

/// Parses a transcript into ordered turns. An employee line opens a turn (an
/// unanswered earlier one is discarded), the next AI line completes it. A
/// trailing unanswered employee line is kept as a partial turn.
pub fn parse_transcript(text: &str) -> Result<Vec<DialogueTurn>, TranscriptError> {
    let roles = infer_roles(text)?;

    let mut turns = Vec::new();
    let mut open: Option<String> = None;

    for line in text.lines() {
        let Some((label, utterance)) = split_speaker(line.trim()) else {
            continue;
        };

        if label == roles.employee {
            open = Some(utterance.to_string());
        } else if label == roles.ai {
            if let Some(employee) = open.take() {
                turns.push(DialogueTurn {
                    employee_label: roles.employee.clone(),
                    employee,
                    ai_label: roles.ai.clone(),
                    ai: Some(utterance.to_string()),
                });
            }
        }
    }

    if let Some(employee) = open {
        turns.push(DialogueTurn {
            employee_label: roles.employee,
            employee,
            ai_label: roles.ai,
            ai: None,
        });
    }

    Ok(turns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_json(turns: &[DialogueTurn]) -> serde_json::Value {
        serde_json::to_value(turns).unwrap()
    }

    #[test]
    fn test_pairs_turns_and_keeps_trailing_partial() {
        let turns = parse_transcript("Emp: hi\nAI: hello\nEmp: bye").unwrap();
        assert_eq!(
            to_json(&turns),
            serde_json::json!([{"Emp": "hi", "AI": "hello"}, {"Emp": "bye"}])
        );
        assert!(turns[0].is_complete());
        assert!(!turns[1].is_complete());
    }

    #[test]
    fn test_no_colon_lines_fail_role_inference() {
        let result = parse_transcript("hello there\nhow are you\nfine");
        assert!(matches!(result, Err(TranscriptError::RoleInference)));
    }

    #[test]
    fn test_same_label_twice_fails_role_inference() {
        let result = parse_transcript("Emp: hi\nEmp: anyone?\nAI: yes");
        assert!(matches!(result, Err(TranscriptError::RoleInference)));
    }

    #[test]
    fn test_single_line_fails_role_inference() {
        assert!(matches!(
            parse_transcript("Emp: hi"),
            Err(TranscriptError::RoleInference)
        ));
        assert!(matches!(parse_transcript(""), Err(TranscriptError::RoleInference)));
    }

    #[test]
    fn test_blank_lines_are_skipped_for_inference() {
        let turns = parse_transcript("\n\n  客服: 您好\n\n顾客：我要退货\n").unwrap();
        assert_eq!(
            to_json(&turns),
            serde_json::json!([{"客服": "您好", "顾客": "我要退货"}])
        );
    }

    #[test]
    fn test_unknown_labels_and_plain_lines_are_dropped() {
        let text = "Emp: hi\nAI: hello\nNarrator: meanwhile\njust text\nEmp: again\nAI: sure";
        let turns = parse_transcript(text).unwrap();
        assert_eq!(
            to_json(&turns),
            serde_json::json!([
                {"Emp": "hi", "AI": "hello"},
                {"Emp": "again", "AI": "sure"}
            ])
        );
    }

    #[test]
    fn test_unanswered_employee_line_is_replaced() {
        let turns = parse_transcript("Emp: first\nAI: ok\nEmp: lost\nEmp: kept\nAI: reply").unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].employee, "kept");
        assert_eq!(turns[1].ai.as_deref(), Some("reply"));
    }

    #[test]
    fn test_ai_line_without_open_turn_is_skipped() {
        let turns = parse_transcript("Emp: hi\nAI: hello\nAI: anyone?\nEmp: yes\nAI: good").unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].ai.as_deref(), Some("good"));
    }

    #[test]
    fn test_utterance_keeps_later_colons() {
        let turns = parse_transcript("Emp: time is 10:30\nAI: noted: 10:30").unwrap();
        assert_eq!(turns[0].employee, "time is 10:30");
        assert_eq!(turns[0].ai.as_deref(), Some("noted: 10:30"));
    }
}
