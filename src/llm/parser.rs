//! Parse decision-provider replies into actions
//!
//! Replies are expected to contain a JSON object `{"action", "reason"}`,
//! possibly wrapped in prose. Anything else is an `LlmError`.

use crate::actions::Action;
use crate::core::error::{Result, SimError};
use serde::Deserialize;

/// A validated provider decision
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDecision {
    pub action: Action,
    pub reason: String,
}

#[derive(Deserialize)]
struct RawDecision {
    action: String,
    #[serde(default)]
    reason: Option<String>,
}

/// Parse a full provider reply
pub fn parse_decision(response: &str) -> Result<ProviderDecision> {
    let json_str = extract_json(response)?;
    let raw: RawDecision = serde_json::from_str(json_str).map_err(|e| {
        SimError::LlmError(format!("Failed to parse decision: {} - Response: {}", e, response))
    })?;

    let action = Action::from_tag(&raw.action)
        .map_err(|_| SimError::LlmError(format!("Unknown action '{}'", raw.action)))?;

    let reason = raw
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| "Thinking something over...".to_string());

    Ok(ProviderDecision { action, reason })
}

/// Extract JSON object from LLM response (handles surrounding text)
pub fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| SimError::LlmError("No JSON found in response".into()))?;
    let end = response
        .rfind('}')
        .ok_or_else(|| SimError::LlmError("No closing brace found in response".into()))?;
    if end < start {
        return Err(SimError::LlmError("Malformed JSON in response".into()));
    }
    Ok(&response[start..=end])
}

/// System prompt listing the canonical actions and the reply shape
pub const DECISION_SYSTEM_PROMPT: &str = r#"You are an animal living on the savanna. Choose exactly one of these actions:

1. hunt - hunt prey (predators only)
2. escape - run away (when a predator is near)
3. eat - look for food (when hungry)
4. drink - look for water (when thirsty)
5. rest - rest and recover (when hurt)
6. routine - follow your daily routine
7. explore - explore somewhere new

Reply with JSON only:
{
    "action": "action name",
    "reason": "one short sentence, in character"
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = "Sure!\n{\"action\": \"eat\", \"reason\": \"hungry\"}\nDone.";
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('{') && json.ends_with('}'));
    }

    #[test]
    fn test_extract_json_no_json() {
        assert!(extract_json("I would like to rest").is_err());
        assert!(extract_json("} backwards {").is_err());
    }

    #[test]
    fn test_parse_decision_case_insensitive() {
        let d = parse_decision(r#"{"action": "Drink", "reason": "So thirsty"}"#).unwrap();
        assert_eq!(d.action, Action::Drink);
        assert_eq!(d.reason, "So thirsty");
    }

    #[test]
    fn test_parse_decision_rejects_unknown_action() {
        let err = parse_decision(r#"{"action": "fly", "reason": "wings"}"#).unwrap_err();
        assert!(matches!(err, SimError::LlmError(_)));
    }

    #[test]
    fn test_parse_decision_missing_reason() {
        let d = parse_decision(r#"{"action": "explore"}"#).unwrap();
        assert_eq!(d.action, Action::Explore);
        assert!(!d.reason.is_empty());
    }

    #[test]
    fn test_parse_decision_malformed() {
        assert!(parse_decision(r#"{"action": }"#).is_err());
    }
}
