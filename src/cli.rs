use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "qa")]
#[command(
    about = "Quick assistant: ask a hosted model, let it call tools, read the answer",
    long_about = None
)]
pub struct Args {
    #[arg(short = 'm', long = "model", help = "Model to use for this run")]
    pub model: Option<String>,

    #[arg(
        long = "api-endpoint",
        help = "Custom API base URL (e.g., http://localhost:11434/v1)"
    )]
    pub api_endpoint: Option<String>,

    #[arg(long = "no-tools", help = "Do not offer any tools to the model")]
    pub no_tools: bool,

    #[arg(long = "no-stream", help = "Wait for whole responses instead of streaming")]
    pub no_stream: bool,

    #[arg(
        long = "max-rounds",
        help = "Maximum model rounds per query before giving up"
    )]
    pub max_rounds: Option<usize>,

    #[arg(short = 'v', long = "verbose", help = "Print diagnostics to stderr")]
    pub verbose: bool,

    #[arg(long = "list-tools", help = "List the available tools and exit")]
    pub list_tools: bool,

    #[arg(help = "Query to ask; omit to start the interactive launcher")]
    pub query: Vec<String>,
}
