//! The `dover-tutor ask` command.

use std::path::PathBuf;

use anyhow::Result;

use tutor_core::feedback::FeedbackRequest;
use tutor_providers::build_service;
use tutor_providers::config::load_config_from;

pub async fn execute(
    field_key: String,
    context: String,
    answer: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let service = build_service(&config)?;

    let request = FeedbackRequest::new(&field_key, &context, &answer);
    let response = service.feedback(&request).await?;

    println!("{}", response.text);
    Ok(())
}
