// All LLM prompt templates for the Evaluation module.

/// ATS evaluation prompt. Replace `{resume_text}` and `{jd_text}` before sending.
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"Act like a skilled and very experienced ATS (Application Tracking System)
with a deep understanding of the tech field, software engineering, data science, data analysis
and big data engineering. Your task is to evaluate the resume against the given job description.
The job market is very competitive and you should provide the best assistance for improving resumes.
Assign the percentage match based on the job description and list the missing keywords with high accuracy.

resume: {resume_text}
description: {jd_text}

Respond with a valid JSON object having exactly this structure:
{"JD Match": "%", "MissingKeywords": ["keyword1", "keyword2"], "Profile Summary": "summary text",
"TechnicalSkills": "score", "SoftSkills": "score", "Experience": "score", "Education": "score", "Projects": "score"}

Every score is a number from 0 to 100.
IMPORTANT: Do not include any text outside the JSON object."#;

/// Keyword improvement prompt. Replace `{missing_keywords}` and `{jd_text}` before sending.
pub const SUGGESTIONS_PROMPT_TEMPLATE: &str = r#"Given the following keywords missing from a resume and the job description,
provide specific suggestions on how to incorporate these keywords into the resume effectively.
Consider the context of the job description when making suggestions.

Missing Keywords: {missing_keywords}

Job Description:
{jd_text}

For each keyword, include:
1. Where in the resume to add the keyword (e.g. skills section, work experience)
2. How to phrase it naturally within the context of the resume
3. If applicable, a brief example of how to demonstrate experience with the keyword

Format your response as a bulleted list for easy reading."#;

pub fn build_evaluation_prompt(resume_text: &str, jd_text: &str) -> String {
    // jd first: a resume containing the literal "{jd_text}" must not be expanded
    EVALUATION_PROMPT_TEMPLATE
        .replace("{jd_text}", jd_text)
        .replacen("{resume_text}", resume_text, 1)
}

pub fn build_suggestions_prompt(missing_keywords: &[String], jd_text: &str) -> String {
    SUGGESTIONS_PROMPT_TEMPLATE
        .replace("{missing_keywords}", &missing_keywords.join(", "))
        .replace("{jd_text}", jd_text)
}
