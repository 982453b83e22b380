//! Structured proposal extraction from coach output.
//!
//! The coach is instructed to emit a `GOAL_PROPOSAL:` line followed by one
//! JSON object. Extraction is a two-phase scan: find the sentinel, then
//! parse exactly one JSON value from the first `{` after it. The streaming
//! deserializer reports how many bytes the value consumed, which gives the
//! exact span to strip from the display text -- no regex involved, and
//! nested objects parse correctly.
//!
//! Extraction never fails loudly: malformed or missing payloads return the
//! input unchanged with no proposal.

use tracing::{debug, warn};

use creo_types::goal::GoalProposal;

/// Sentinel token the coach places before a machine-readable proposal.
pub const PROPOSAL_SENTINEL: &str = "GOAL_PROPOSAL:";

/// Split finalized coach text into display text and an optional proposal.
///
/// Only the first sentinel occurrence is considered; anything between the
/// sentinel and the object other than whitespace disqualifies the match.
/// On success the sentinel-and-object span is removed and surrounding
/// whitespace trimmed. On a parse failure the original text is returned
/// unchanged and the failure is logged.
pub fn extract_proposal(text: &str) -> (String, Option<GoalProposal>) {
    let Some(sentinel_at) = text.find(PROPOSAL_SENTINEL) else {
        return (text.to_string(), None);
    };

    let after = &text[sentinel_at + PROPOSAL_SENTINEL.len()..];
    let Some(brace_rel) = after.find('{') else {
        debug!("proposal sentinel without an object, leaving text unchanged");
        return (text.to_string(), None);
    };
    if !after[..brace_rel].chars().all(char::is_whitespace) {
        debug!("proposal sentinel not followed by an object, leaving text unchanged");
        return (text.to_string(), None);
    }

    let object_start = sentinel_at + PROPOSAL_SENTINEL.len() + brace_rel;
    let mut values =
        serde_json::Deserializer::from_str(&text[object_start..]).into_iter::<GoalProposal>();

    match values.next() {
        Some(Ok(proposal)) => {
            let object_end = object_start + values.byte_offset();
            let mut display = String::with_capacity(text.len());
            display.push_str(&text[..sentinel_at]);
            display.push_str(&text[object_end..]);
            (display.trim().to_string(), Some(proposal))
        }
        Some(Err(e)) => {
            warn!(error = %e, "failed to parse goal proposal payload");
            (text.to_string(), None)
        }
        None => (text.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use creo_types::goal::Platform;

    #[test]
    fn test_extracts_proposal_and_strips_span() {
        let text = "Here's your plan.\nGOAL_PROPOSAL: {\"title\":\"Hit 10k\",\"platform\":\"Instagram\",\"targetValue\":10000,\"unit\":\"Followers\"}";
        let (display, proposal) = extract_proposal(text);

        assert_eq!(display, "Here's your plan.");
        let proposal = proposal.unwrap();
        assert_eq!(proposal.title, "Hit 10k");
        assert_eq!(proposal.platform, Platform::Instagram);
        assert_eq!(proposal.target_value, 10000.0);
        assert_eq!(proposal.unit, "Followers");
    }

    #[test]
    fn test_no_sentinel_returns_text_unchanged() {
        let (display, proposal) = extract_proposal("no sentinel here");
        assert_eq!(display, "no sentinel here");
        assert!(proposal.is_none());
    }

    #[test]
    fn test_malformed_json_fails_open() {
        let text = "Almost!\nGOAL_PROPOSAL: {\"title\": }";
        let (display, proposal) = extract_proposal(text);
        assert_eq!(display, text);
        assert!(proposal.is_none());
    }

    #[test]
    fn test_missing_fields_fail_open() {
        let text = "GOAL_PROPOSAL: {\"title\":\"only a title\"}";
        let (display, proposal) = extract_proposal(text);
        assert_eq!(display, text);
        assert!(proposal.is_none());
    }

    #[test]
    fn test_trailing_text_preserved() {
        let text = "Plan:\nGOAL_PROPOSAL: {\"title\":\"T\",\"platform\":\"X\",\"targetValue\":5,\"unit\":\"Posts\"}\nGood luck!";
        let (display, proposal) = extract_proposal(text);
        assert_eq!(display, "Plan:\n\nGood luck!");
        assert_eq!(proposal.unwrap().platform, Platform::X);
    }

    #[test]
    fn test_braces_inside_strings_parse_correctly() {
        let text = "GOAL_PROPOSAL: {\"title\":\"Post {daily}\",\"platform\":\"TikTok\",\"targetValue\":30,\"unit\":\"Videos\"}";
        let (display, proposal) = extract_proposal(text);
        assert_eq!(display, "");
        assert_eq!(proposal.unwrap().title, "Post {daily}");
    }

    #[test]
    fn test_second_sentinel_ignored() {
        let text = "GOAL_PROPOSAL: {\"title\":\"A\",\"platform\":\"X\",\"targetValue\":1,\"unit\":\"U\"} and GOAL_PROPOSAL: {\"title\":\"B\"}";
        let (display, proposal) = extract_proposal(text);
        assert_eq!(proposal.unwrap().title, "A");
        assert!(display.contains("GOAL_PROPOSAL: {\"title\":\"B\"}"));
    }

    #[test]
    fn test_sentinel_followed_by_prose_is_not_a_match() {
        let text = "GOAL_PROPOSAL: coming soon, stay tuned {maybe}";
        let (display, proposal) = extract_proposal(text);
        assert_eq!(display, text);
        assert!(proposal.is_none());
    }

    #[test]
    fn test_unknown_platform_degrades_to_other() {
        let text = "GOAL_PROPOSAL: {\"title\":\"T\",\"platform\":\"Threads\",\"targetValue\":10,\"unit\":\"Posts\"}";
        let (_, proposal) = extract_proposal(text);
        assert_eq!(proposal.unwrap().platform, Platform::Other);
    }
}
