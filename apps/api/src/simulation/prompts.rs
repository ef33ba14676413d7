// All LLM prompt constants for the role-simulation flow.

/// System prompt for scenario generation. Enforces JSON-only output.
pub const SCENARIO_SYSTEM: &str =
    "You are a workplace role-play designer for a career-coaching platform. \
    Design realistic, specific professional scenarios. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Scenario generation template. Replace `{language}` and `{target_role}`.
pub const SCENARIO_PROMPT_TEMPLATE: &str = r#"Design a role simulation for a candidate targeting this role: {target_role}

Write all free-text fields in this language: {language}

Return a JSON object with this EXACT schema (no extra fields):
{
  "title": "Short scenario title",
  "setting": "Two or three sentences establishing the situation",
  "counterpart": "Who the participant is talking to, e.g. 'a skeptical VP of Engineering'",
  "objective": "What the participant must achieve in the conversation",
  "opening_line": "The counterpart's first line, in character"
}

Rules:
- The scenario must exercise a realistic pressure point of the target role.
- The opening line must be in character and under 60 words."#;

/// System prompt for the in-character counterpart. Replace `{language}`,
/// `{total_rounds}` and `{scenario}`.
pub const COUNTERPART_SYSTEM_TEMPLATE: &str = r#"You are playing the counterpart in a workplace role simulation of {total_rounds} rounds, in this language: {language}.

The scenario:
{scenario}

Stay in character. React to the participant's last message: push back where a real counterpart would, concede where they earn it. Keep each reply under 80 words.

You MUST respond with valid JSON only, no markdown fences, no text outside the object."#;

/// Asks for the counterpart's reply for the given round.
pub const REPLY_PROMPT: &str = r#"Reply in character for round {round_number} of {total_rounds}.

Return a JSON object with this EXACT schema:
{
  "reply": "The counterpart's next line"
}"#;

/// Asks for the debrief once the round budget is exhausted.
pub const DEBRIEF_PROMPT: &str = r#"The simulation is over. Step out of character and debrief the participant across the full transcript.

Return a JSON object with this EXACT schema (no extra fields):
{
  "overall_score": 0.0,
  "summary": "Three to five sentences on how the participant handled the scenario",
  "what_went_well": ["Move that worked, with the moment it happened"],
  "to_improve": ["Concrete behavior to change next time"],
  "verdict": "Did the participant achieve the objective? One short paragraph."
}

Rules:
- overall_score is between 0.0 and 10.0.
- Ground every point in the transcript."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_carry_placeholders() {
        assert!(SCENARIO_PROMPT_TEMPLATE.contains("{target_role}"));
        assert!(SCENARIO_PROMPT_TEMPLATE.contains("{language}"));
        assert!(COUNTERPART_SYSTEM_TEMPLATE.contains("{scenario}"));
        assert!(REPLY_PROMPT.contains("{round_number}"));
    }
}
