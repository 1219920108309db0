//! Tutor prompt construction.
//!
//! [`build_prompt`] is a pure function of the field key, its descriptive
//! context, and the student's answer. The Part A question has a fixed
//! rubric; every other field gets a generic Socratic hint that quotes the
//! field's context.

/// Field key of the Part A scarcity question, which has its own rubric.
pub const PART_A_FIELD: &str = "partA";

/// System role sent with every provider call.
pub const TUTOR_SYSTEM_PROMPT: &str = "You are a Socratic Economics Tutor. Be encouraging, concise, and do not reveal full answers directly.";

/// Returned when the provider answers with no content.
pub const FALLBACK_FEEDBACK: &str = "Try expanding on your reasoning.";

/// Sentence limit appended to Part A prompts.
pub const PART_A_SENTENCE_LIMIT: &str = "Limit your response to exactly 3 sentences.";

/// Sentence limit appended to every other prompt.
pub const HINT_SENTENCE_LIMIT: &str = "Limit your response to between 3 and 5 sentences.";

const ROLE_LINE: &str = "Role: Socratic Economics Tutor. Topic: Dover Forest.";

const PART_A_INSTRUCTION: &str = "Evaluate the student's answer based on the following:
As long as the student covers 'unlimited wants' and 'limited resources' with the use of examples, it is a good answer.
Provide encouraging feedback if they meet this. If they missed one, ask a socratic question to lead them to it.
Do not give the answer directly.";

/// Build the user-turn prompt for a feedback request.
pub fn build_prompt(field_key: &str, prompt_context: &str, student_answer: &str) -> String {
    let (instruction, sentence_limit) = if field_key == PART_A_FIELD {
        (PART_A_INSTRUCTION.to_string(), PART_A_SENTENCE_LIMIT)
    } else {
        (
            format!(
                "Provide a rough hint or ask a probing question.\n\
                 Do not be overly detailed as this is an introductory course.\n\
                 Context: {prompt_context}."
            ),
            HINT_SENTENCE_LIMIT,
        )
    };

    format!(
        "{ROLE_LINE}\nInstruction: {instruction}\nStudent's Answer: \"{student_answer}\".\n{sentence_limit}\n"
    )
}
