//! The `sns-validate` run: load config, read the message, validate, report.

use std::io::Read;

use anyhow::Context;
use sns_validator::{MessageValidator, TextEncoding, ValidatorConfig};
use tracing::{debug, info};

use crate::args::Cli;
use crate::exit_codes;

pub async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(exit_codes::USAGE);
        }
    };
    debug!(?config, "resolved configuration");

    let validator = match MessageValidator::new(config) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(exit_codes::USAGE);
        }
    };

    let body = match read_input(&cli) {
        Ok(body) => body,
        Err(e) => {
            eprintln!("error: {e:#}");
            return Ok(exit_codes::NO_INPUT);
        }
    };

    match validator.validate_json(&body).await {
        Ok(message) => {
            info!(message_id = message.message_id.as_deref().unwrap_or_default(), "accepted");
            if !cli.quiet {
                let out = serde_json::to_string_pretty(&message.to_json_value())
                    .context("failed to serialize accepted message")?;
                println!("{out}");
            }
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => {
            eprintln!("rejected: {e}");
            Ok(e.exit_code())
        }
    }
}

/// Environment first, then flags on top.
fn build_config(cli: &Cli) -> anyhow::Result<ValidatorConfig> {
    let mut config = ValidatorConfig::try_from_env()?;

    if let Some(pattern) = &cli.host_pattern {
        config = config.with_host_pattern(pattern.clone());
    }
    if let Some(encoding) = &cli.encoding {
        let encoding: TextEncoding = encoding.parse()?;
        config = config.with_encoding(encoding);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout_secs(secs);
    }

    Ok(config)
}

fn read_input(cli: &Cli) -> anyhow::Result<String> {
    match cli.input_path() {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}
