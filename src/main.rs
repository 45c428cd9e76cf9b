mod chat;
#[cfg(feature = "gateway")]
mod gateway;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use silencio_core::bootstrap::{AppBuilder, IngestOptions, ingest_with_config};
use silencio_corpus::document::SplitStrategy;

/// Retrieval-augmented question answering over a single film-analysis corpus.
#[derive(Debug, Parser)]
#[command(name = "silencio", version, about)]
struct Cli {
    /// Config file (else `SILENCIO_CONFIG`, else `config/default.toml`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Split, embed, and write the corpus file.
    Ingest(IngestArgs),

    /// Answer one question and exit.
    Ask {
        question: String,
        /// Passages to retrieve
        #[arg(long)]
        top_k: Option<usize>,
        /// Print the passages the answer was grounded on
        #[arg(long)]
        sources: bool,
    },

    /// Interactive session reading questions from stdin.
    Chat {
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long)]
        sources: bool,
    },

    /// Serve the HTTP gateway.
    #[cfg(feature = "gateway")]
    Serve {
        #[arg(long)]
        bind: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Debug, clap::Args)]
struct IngestArgs {
    /// Source text file
    #[arg(long)]
    input: Option<PathBuf>,
    /// Corpus file to write
    #[arg(long)]
    output: Option<PathBuf>,
    /// Maximum chunk length in characters
    #[arg(long)]
    chunk_size: Option<usize>,
    /// Characters shared by consecutive chunks
    #[arg(long)]
    chunk_overlap: Option<usize>,
    /// Embedding model override
    #[arg(long)]
    model: Option<String>,
    /// `recursive` or `paragraph`
    #[arg(long)]
    strategy: Option<SplitStrategy>,
}

impl IngestArgs {
    fn apply(self, options: &mut IngestOptions) {
        if let Some(input) = self.input {
            options.input = input;
        }
        if let Some(output) = self.output {
            options.output = output;
        }
        if let Some(size) = self.chunk_size {
            options.chunk_size = size;
        }
        if let Some(overlap) = self.chunk_overlap {
            options.chunk_overlap = overlap;
        }
        if let Some(strategy) = self.strategy {
            options.strategy = strategy;
        }
        options.model = self.model.or(options.model.take());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();
    let cli = Cli::parse();
    #[cfg_attr(not(feature = "gateway"), allow(unused_mut))]
    let mut app = AppBuilder::from_env(cli.config.as_deref()).await?;

    match cli.command {
        Command::Ingest(args) => {
            let mut options = IngestOptions::from_config(app.config());
            args.apply(&mut options);
            let count = ingest_with_config(app.config(), &options).await?;
            println!("{count} chunks written to {}", options.output.display());
        }
        Command::Ask {
            question,
            top_k,
            sources,
        } => {
            let assistant = app.build_assistant()?;
            let top_k = top_k.unwrap_or(app.config().assistant.top_k);
            let answer = assistant.ask(&question, top_k).await;
            println!("{}", chat::format_answer(&answer, sources));
        }
        Command::Chat { top_k, sources } => {
            let assistant = app.build_assistant()?;
            let config = app.config();
            let top_k = top_k.unwrap_or(config.assistant.top_k);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            chat::run_chat(
                &assistant,
                &config.assistant.example_questions,
                top_k,
                sources,
                stdin,
                &mut stdout,
            )
            .await?;
        }
        #[cfg(feature = "gateway")]
        Command::Serve { bind, port } => {
            if let Some(bind) = bind {
                app.config_mut().gateway.bind = bind;
            }
            if let Some(port) = port {
                app.config_mut().gateway.port = port;
            }
            serve(&app).await?;
        }
    }
    Ok(())
}

#[cfg(feature = "gateway")]
async fn serve(app: &AppBuilder) -> anyhow::Result<()> {
    use std::sync::Arc;

    let assistant = Arc::new(app.build_assistant()?);
    let config = app.config();
    let handler = gateway::AssistantHandler::new(assistant, config.assistant.top_k);

    let gw = &config.gateway;
    let gateway = silencio_gateway::GatewayServer::new(Arc::new(handler))
        .with_rate_limit(gw.rate_limit)
        .with_max_body_size(gw.max_body_size)
        .bind(&gw.bind, gw.port)
        .await?;
    gateway
        .serve(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("received shutdown signal"),
                Err(e) => {
                    tracing::error!("failed to listen for ctrl-c: {e:#}");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
        .context("gateway failed")
}

/// Logs go to stderr so stdout carries only answers.
fn init_subscriber() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
