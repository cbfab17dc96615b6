use clap::Parser;
use packsmith::agents::{run_pack_generation_pipeline, PipelineOptions, ProgressCallback};
use packsmith::config::Config;
use packsmith::llm::LLM;
use packsmith::models::SubjectType;
use packsmith::resolver::EnvModelResolver;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Generate a 9-sticker pack spec from a free-text request.
#[derive(Parser, Debug)]
#[command(name = "packsmith", version, about)]
struct Args {
    /// Free-text pack request, e.g. "beach day with dog"
    request: String,

    /// Subject type detected from the photo
    #[arg(long, default_value = "unknown")]
    subject_type: SubjectType,

    /// Maximum critic iterations before the pack is rejected
    #[arg(long, default_value_t = 2)]
    max_critic_iterations: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "packsmith=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Load configuration
    let config = Config::from_env()?;
    let llm = LLM::new(&config.llm)?;
    let resolver = EnvModelResolver;

    let on_progress: ProgressCallback = Box::new(|stage| {
        Box::pin(async move {
            info!(stage = %stage, "Pipeline progress");
        })
    });

    let result = run_pack_generation_pipeline(
        &llm,
        &resolver,
        &args.request,
        args.subject_type,
        PipelineOptions {
            max_critic_iterations: args.max_critic_iterations,
            on_progress: Some(on_progress),
        },
    )
    .await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.ok {
        std::process::exit(1);
    }
    Ok(())
}
