use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "genny")]
#[command(about = "College admissions advisor chat with web search and profile uploads", long_about = None)]
pub struct Args {
    #[arg(short = 'm', long = "model", help = "Model to use for answers")]
    pub model: Option<String>,

    #[arg(
        long = "api-endpoint",
        help = "Custom API base URL (e.g., http://localhost:11434/v1)"
    )]
    pub api_endpoint: Option<String>,

    #[arg(
        long = "max-iterations",
        help = "Maximum model calls per question before giving up"
    )]
    pub max_iterations: Option<usize>,

    #[arg(long = "store", help = "Path of the student profile sheet")]
    pub store: Option<PathBuf>,

    #[arg(
        short = 'u',
        long = "upload",
        help = "Profile documents to load before the first question"
    )]
    pub uploads: Vec<PathBuf>,

    #[arg(long = "no-search", help = "Do not offer the web search tool")]
    pub no_search: bool,

    #[arg(short = 'v', long = "verbose", help = "Show debug logging")]
    pub verbose: bool,

    #[arg(long = "config-init", help = "Write an example config file and exit")]
    pub config_init: bool,

    #[arg(help = "Ask a single question and exit")]
    pub question: Vec<String>,
}
