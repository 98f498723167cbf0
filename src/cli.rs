use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "datagouv-assistant",
    version,
    about = "Assistant IA pour les données publiques françaises (data.gouv.fr)"
)]
pub struct Cli {
    /// Question to ask about French open data.
    pub question: Vec<String>,

    /// Path to a TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Tool-provider endpoint URL.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Model name passed to the backend.
    #[arg(long)]
    pub model: Option<String>,

    /// System instruction override.
    #[arg(long)]
    pub system: Option<String>,

    /// Maximum model/tool round-trips before giving up.
    #[arg(long)]
    pub max_tool_rounds: Option<usize>,

    /// Overall deadline for one question, in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl Cli {
    pub fn question(&self) -> String {
        self.question.join(" ")
    }
}
