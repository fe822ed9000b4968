use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sns-validate",
    version,
    about = "Validate an Amazon SNS HTTP(S) message: structure, certificate origin and signature"
)]
pub struct Cli {
    /// Message JSON file (reads stdin when omitted or `-`)
    pub input: Option<PathBuf>,

    /// Regex the signing certificate host must match
    #[arg(long, env = "SNS_VALIDATOR_HOST_PATTERN")]
    pub host_pattern: Option<String>,

    /// Encoding of signed values: utf8, latin1 or utf16le
    #[arg(long, env = "SNS_VALIDATOR_ENCODING")]
    pub encoding: Option<String>,

    /// Certificate fetch timeout in seconds
    #[arg(long, env = "SNS_VALIDATOR_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Do not print the accepted message
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Input path, or `None` for stdin.
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input
            .as_ref()
            .filter(|p| p.as_os_str() != std::ffi::OsStr::new("-"))
    }
}
