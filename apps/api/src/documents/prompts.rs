// All LLM prompt constants for issued documents and the mentor endpoint.

/// System prompt shared by document generation. Enforces JSON-only output.
pub const DOCUMENT_SYSTEM: &str =
    "You are a senior career advisor writing formal assessment documents for a \
    career-coaching platform. Everything you write must be grounded in the \
    user record you are given. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT invent facts not present in the user record.";

/// Performance profile template. Replace `{language}` and `{user_record}`.
pub const PERFORMANCE_PROFILE_PROMPT_TEMPLATE: &str = r#"Write a performance profile for this user, in this language: {language}

USER RECORD (source of truth — ONLY use facts from this):
{user_record}

Return a JSON object with this EXACT schema (no extra fields):
{
  "headline": "One line positioning the candidate",
  "summary": "Three to five sentences synthesizing the diagnosis evaluation and simulation debrief",
  "competencies": [
    {"name": "Communication", "score": 7.5, "comment": "Grounded in a specific observed moment"}
  ],
  "development_priorities": ["Most impactful area to invest in next"]
}

Rules:
- 4 to 6 competencies, scores between 0.0 and 10.0.
- Every comment must trace back to the diagnosis or simulation record."#;

/// Recommendation letter template. Replace `{language}` and `{user_record}`.
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"Write a professional recommendation letter for this user, in this language: {language}

USER RECORD (source of truth — ONLY use facts from this):
{user_record}

Return a JSON object with this EXACT schema (no extra fields):
{
  "opening": "One paragraph introducing the candidate and the basis of the assessment",
  "body_paragraphs": ["Paragraph grounded in observed performance"],
  "closing": "One paragraph with the recommendation itself"
}

Rules:
- 2 to 4 body paragraphs.
- The letter speaks for the coaching program, not for a former employer."#;

/// Mentor Q&A template. Replace `{language}`, `{user_record}` and `{question}`.
pub const MENTOR_PROMPT_TEMPLATE: &str = r#"You are the user's career mentor. Answer their question using the record below, in this language: {language}

USER RECORD:
{user_record}

QUESTION:
{question}

Return a JSON object with this EXACT schema:
{
  "answer": "Practical, specific advice grounded in the user's record"
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_carry_placeholders() {
        assert!(PERFORMANCE_PROFILE_PROMPT_TEMPLATE.contains("{user_record}"));
        assert!(RECOMMENDATION_PROMPT_TEMPLATE.contains("{user_record}"));
        assert!(MENTOR_PROMPT_TEMPLATE.contains("{question}"));
    }
}
