// All LLM prompt constants for the diagnosis interview flow.

/// System prompt for CV analysis. Enforces JSON-only output.
pub const CV_ANALYSIS_SYSTEM: &str =
    "You are an expert career coach and CV analyst. \
    Analyze a candidate's CV and extract a structured skill baseline. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// CV analysis prompt template. Replace `{language}` and `{cv_text}` before sending.
pub const CV_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following CV and extract a structured baseline.

Write all free-text fields in this language: {language}

Return a JSON object with this EXACT schema (no extra fields):
{
  "summary": "Two or three sentences describing the candidate's profile",
  "seniority": "junior|mid|senior|executive",
  "strengths": ["Specific strength grounded in the CV"],
  "gaps": ["Concrete gap or risk for the candidate's target market"],
  "suggested_roles": ["Role title the candidate is competitive for"]
}

Rules:
- Ground every strength and gap in the CV text. Do NOT invent facts.
- 3 to 6 strengths, 2 to 5 gaps, 2 to 4 suggested roles.

CV:
{cv_text}"#;

/// System prompt for the interviewer. Replace `{language}`, `{total_questions}`
/// and `{cv_analysis}` before sending.
pub const INTERVIEWER_SYSTEM_TEMPLATE: &str = r#"You are a senior hiring manager conducting a structured diagnostic interview of {total_questions} questions, in this language: {language}.

The candidate's CV analysis:
{cv_analysis}

Ask one question at a time. Probe the gaps identified in the analysis, verify the claimed strengths, and adapt to previous answers. Keep each question under 60 words. A candidate may answer "I don't know" — move on without repeating the topic.

You MUST respond with valid JSON only, no markdown fences, no text outside the object."#;

/// Asks for the next question given the transcript so far.
pub const NEXT_QUESTION_PROMPT: &str = r#"Ask interview question number {question_number} of {total_questions}.

Return a JSON object with this EXACT schema:
{
  "question": "The next interview question"
}"#;

/// Asks for the final evaluation once the question budget is exhausted.
pub const EVALUATION_PROMPT: &str = r#"The interview is over. Evaluate the candidate across the full transcript.

Return a JSON object with this EXACT schema (no extra fields):
{
  "overall_score": 0.0,
  "summary": "Three to five sentences on overall performance",
  "strengths": ["Demonstrated strength with evidence from an answer"],
  "improvement_areas": ["Concrete area to improve, with why"],
  "recommendation": "One paragraph of next-step coaching advice"
}

Rules:
- overall_score is between 0.0 and 10.0.
- Skipped questions count against depth, not against honesty.
- Ground every point in the transcript. Do NOT invent answers."#;

/// Canned answer substituted when the candidate skips a question, in the
/// diagnosis language. Unknown languages fall back to English.
pub fn skip_message(language: &str) -> &'static str {
    match language {
        "fr" => "Je ne sais pas, passons à la question suivante.",
        "es" => "No lo sé, pasemos a la siguiente pregunta.",
        "de" => "Ich weiß es nicht, fahren wir mit der nächsten Frage fort.",
        "pt" => "Não sei, vamos para a próxima pergunta.",
        _ => "I don't know, let's move on to the next question.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_message_known_languages() {
        assert!(skip_message("fr").starts_with("Je ne sais pas"));
        assert!(skip_message("es").starts_with("No lo sé"));
        assert!(skip_message("de").starts_with("Ich weiß es nicht"));
        assert!(skip_message("pt").starts_with("Não sei"));
    }

    #[test]
    fn test_skip_message_falls_back_to_english() {
        assert_eq!(skip_message("xx"), skip_message("en"));
        assert!(skip_message("en").starts_with("I don't know"));
    }

    #[test]
    fn test_templates_carry_placeholders() {
        assert!(CV_ANALYSIS_PROMPT_TEMPLATE.contains("{cv_text}"));
        assert!(CV_ANALYSIS_PROMPT_TEMPLATE.contains("{language}"));
        assert!(INTERVIEWER_SYSTEM_TEMPLATE.contains("{total_questions}"));
        assert!(NEXT_QUESTION_PROMPT.contains("{question_number}"));
    }
}
