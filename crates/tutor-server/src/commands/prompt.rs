//! The `dover-tutor prompt` command.

use anyhow::Result;

use tutor_core::prompt::{build_prompt, TUTOR_SYSTEM_PROMPT};

pub fn execute(field_key: &str, context: &str, answer: &str) -> Result<()> {
    println!("[system]\n{TUTOR_SYSTEM_PROMPT}\n");
    println!("[user]\n{}", build_prompt(field_key, context, answer));
    Ok(())
}
