//! The `dover-tutor init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("tutor.toml").exists() {
        println!("tutor.toml already exists, skipping.");
    } else {
        std::fs::write("tutor.toml", SAMPLE_CONFIG)?;
        println!("Created tutor.toml");
    }

    println!("\nNext steps:");
    println!("  1. Put OPENAI_API_KEY or GEMINI_API_KEY in .env.local");
    println!("  2. Run: dover-tutor prompt --field-key partA --answer \"...\"");
    println!("  3. Run: dover-tutor serve");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# dover-tutor configuration

# "openai" or "gemini"
provider = "openai"
# model = "gpt-4o-mini"
# temperature = 0.4
# request_timeout_secs = 60

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[server]
host = "127.0.0.1"
port = 5173

[submissions]
path = "dover_submissions.json"

[auth]
teacher_domain = "@ri.edu.sg"
"#;

#[cfg(test)]
mod tests {
    use super::SAMPLE_CONFIG;
    use tutor_providers::config::{ProviderConfig, TutorConfig};

    #[test]
    fn sample_config_parses() {
        let config: TutorConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.provider, "openai");
        assert_eq!(config.server.port, 5173);
        assert!(matches!(
            config.providers.get("gemini"),
            Some(ProviderConfig::Gemini { .. })
        ));
    }
}
