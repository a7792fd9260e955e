// Profile extraction prompt templates.
// All prompts for the profile module are defined here.

pub const PROFILE_EXTRACT_SYSTEM: &str = "\
You are a precise resume data extractor. \
Parse raw resume text into structured JSON for a candidate profile page. \
You MUST respond with valid JSON only — no markdown fences, no explanations. \
Never invent facts: if a field is not present in the text, return null or an \
empty list for it.";

pub const PROFILE_EXTRACT_PROMPT: &str = r#"Extract the following resume text into a structured JSON object.

RESUME TEXT:
{resume_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "name": "string" | null,
  "email": "string" | null,
  "phone": "string" | null,
  "location": "string" | null,
  "headline": "string" | null,
  "summary": "string" | null,
  "experience": [
    {
      "title": "string",
      "company": "string",
      "date_start": "YYYY-MM" | null,
      "date_end": "YYYY-MM" | null (null = current),
      "bullets": ["string"]
    }
  ],
  "education": [
    {"institution": "string", "degree": "string" | null, "year": "YYYY" | null}
  ],
  "skills": ["string"]
}

RULES:
1. Keep bullet text verbatim from the resume; do not rewrite or embellish.
2. Order experience most-recent first.
3. Dates: use "YYYY-MM" when the month is known, "YYYY-01" if only the year.
4. Return ONLY the JSON object — nothing else, no code fences."#;
