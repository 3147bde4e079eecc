/// Response shape the model must follow. Kept as a TypeScript-style interface
/// because models follow that notation closely.
pub const FEEDBACK_FORMAT: &str = r#"interface Feedback {
  overallScore: number; // max 100
  ATS: {
    score: number; // rate based on ATS suitability
    tips: { type: "good" | "improve"; tip: string }[]; // give 3-4 tips
  };
  toneAndStyle: {
    score: number; // max 100
    tips: { type: "good" | "improve"; tip: string; explanation: string }[]; // give 3-4 tips
  };
  content: {
    score: number; // max 100
    tips: { type: "good" | "improve"; tip: string; explanation: string }[]; // give 3-4 tips
  };
  structure: {
    score: number; // max 100
    tips: { type: "good" | "improve"; tip: string; explanation: string }[]; // give 3-4 tips
  };
  skills: {
    score: number; // max 100
    tips: { type: "good" | "improve"; tip: string; explanation: string }[]; // give 3-4 tips
  };
}"#;

pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"You are an expert in ATS (Applicant Tracking System) and resume analysis.
Analyze and rate the attached resume and suggest how to improve it.
The rating can be low if the resume is bad. Be thorough and detailed.
Do not be afraid to point out mistakes or areas for improvement.
If there is a lot to improve, do not hesitate to give low scores.
If available, use the job description for the job the user is applying to for more specific feedback.

Job title: {job_title}
Job description: {job_description}

{evidence_instruction}

Provide the feedback using the following format:
{feedback_format}

Return the analysis as a JSON object, without any other text and without backticks."#;
