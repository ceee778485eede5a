//! Somnia CLI
//!
//! Command-line dream journal: record dreams, read them back, search them by
//! meaning and report on emotions over time.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use somnia_core::config::DEFAULT_LLM_ENDPOINT;
use somnia_core::{
    CreativeFormat, DreamStore, EmotionTag, EnrichmentPipeline, JournalConfig, MetricsAggregator,
    OpenAiGenerator, SemanticRetriever, Storage, TextEmbedder,
};

/// Somnia - AI dream journal CLI
#[derive(Parser, Debug)]
#[command(name = "somnia")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Record, enrich and search your dreams")]
#[command(long_about = "Somnia records dreams and enriches each one with an emotion label, a creative rewrite and an interpretation.\n\nStored dreams can be searched by meaning and summarized by emotion over time.")]
struct Cli {
    /// Custom data directory (overrides SOMNIA_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record a dream and enrich it
    Record {
        /// Dream title
        title: String,
        /// Dream content (or use --file)
        content: Option<String>,
        /// Read the content from a file
        #[arg(long, conflicts_with = "content")]
        file: Option<PathBuf>,
        /// Creative format: poema, historia corta, guion corto
        #[arg(long, short)]
        format: String,
    },

    /// List recorded dreams, newest first
    List,

    /// Show one dream in full
    Show {
        /// Dream id
        id: i64,
    },

    /// Find dreams similar in meaning to a query
    Search {
        /// Free-form query
        query: String,
        /// Number of results (overrides SOMNIA_SEARCH_TOP_K)
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Emotion counts and daily breakdown
    Metrics,

    /// List the creative formats
    Formats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout is for results, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();

    let mut config = JournalConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }

    match cli.command {
        Commands::Record {
            title,
            content,
            file,
            format,
        } => run_record(&config, title, content, file, format).await,
        Commands::List => run_list(&config),
        Commands::Show { id } => run_show(&config, id),
        Commands::Search { query, top_k } => run_search(&config, query, top_k).await,
        Commands::Metrics => run_metrics(&config),
        Commands::Formats => {
            run_formats();
            Ok(())
        }
    }
}

fn open_storage(config: &JournalConfig) -> anyhow::Result<Arc<Storage>> {
    let storage = Storage::new(config.database_path()).context("Failed to open dream database")?;
    Ok(Arc::new(storage))
}

/// Local embedder, loaded up front so a model download failure is reported
/// once instead of surfacing mid-command
#[cfg(feature = "embeddings")]
async fn embedder() -> Arc<dyn TextEmbedder> {
    let embedder = somnia_core::FastEmbedder::new();
    match tokio::task::spawn_blocking(move || embedder.init()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Embedding model unavailable, continuing without it: {}", e),
        Err(e) => warn!("Embedding model load task failed: {}", e),
    }
    Arc::new(embedder)
}

#[cfg(not(feature = "embeddings"))]
async fn embedder() -> Arc<dyn TextEmbedder> {
    Arc::new(unavailable::UnavailableEmbedder)
}

#[cfg(not(feature = "embeddings"))]
mod unavailable {
    use async_trait::async_trait;
    use somnia_core::{EmbeddingError, TextEmbedder};

    /// Stands in when built without local embeddings: dreams are stored
    /// without vectors and search reports the failure
    pub struct UnavailableEmbedder;

    #[async_trait]
    impl TextEmbedder for UnavailableEmbedder {
        fn model_id(&self) -> &str {
            "unavailable"
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Err(EmbeddingError::ModelInit(
                "built without the embeddings feature".to_string(),
            ))
        }
    }
}

fn generator(config: &JournalConfig) -> anyhow::Result<Arc<OpenAiGenerator>> {
    let api_key = match &config.api_key {
        Some(key) => key.clone(),
        None => {
            if config.llm_endpoint == DEFAULT_LLM_ENDPOINT {
                warn!("No API key set (SOMNIA_OPENAI_API_KEY or OPENAI_API_KEY); generation will fail");
            }
            String::new()
        }
    };
    let generator = OpenAiGenerator::new(
        config.llm_endpoint.clone(),
        api_key,
        config.llm_model.clone(),
        config.llm_timeout,
    )?;
    Ok(Arc::new(generator))
}

/// Run record command
async fn run_record(
    config: &JournalConfig,
    title: String,
    content: Option<String>,
    file: Option<PathBuf>,
    format: String,
) -> anyhow::Result<()> {
    let content = match (content, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("Provide the dream content or --file <PATH>"),
    };

    let storage = open_storage(config)?;
    let pipeline = EnrichmentPipeline::new(generator(config)?, embedder().await, storage);

    let submission = pipeline.submit(&title, &content, &format).await?;

    println!("{}", "=== Somnia Dream ===".cyan().bold());
    println!();
    println!("{}: {}", "Title".white().bold(), submission.draft.title);
    println!("{}: {}", "Emotion".white().bold(), emotion_colored(submission.emotion));
    println!();
    println!("{}", format!("=== {} ===", submission.draft.format).yellow().bold());
    println!("{}", submission.creative_text());
    println!();
    println!("{}", "=== Analysis ===".yellow().bold());
    println!("{}", submission.rendered_analysis());
    println!();

    if let Err(e) = &submission.embedding {
        println!("{}: {}", "Embedding".white().bold(), e.to_string().yellow());
    }

    match &submission.saved {
        Ok(id) => {
            println!("{}: {}", "Saved as".white().bold(), id.to_string().green());
            Ok(())
        }
        Err(e) => {
            println!("{}", "The dream was NOT saved.".red().bold());
            Err(anyhow::anyhow!("{}", e))
        }
    }
}

/// Run list command
fn run_list(config: &JournalConfig) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let dreams = storage.fetch_all()?;

    println!("{}", "=== Somnia Journal ===".cyan().bold());
    println!();

    if dreams.is_empty() {
        println!("{}", "No dreams recorded yet.".dimmed());
        return Ok(());
    }

    for dream in dreams {
        println!(
            "{} {} {} [{}] ({})",
            format!("#{}", dream.id).dimmed(),
            dream.date_recorded.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            dream.title.white().bold(),
            emotion_colored(dream.emotion),
            dream.creative_format,
        );
        println!("    {}", dream.preview);
    }

    Ok(())
}

/// Run show command
fn run_show(config: &JournalConfig, id: i64) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let Some(dream) = storage.fetch_by_id(id)? else {
        anyhow::bail!("No dream with id {}", id);
    };

    println!("{}", format!("=== {} ===", dream.title).cyan().bold());
    println!();
    println!("{}: {}", "Recorded".white().bold(), dream.date_recorded.format("%Y-%m-%d %H:%M:%S"));
    println!("{}: {}", "Emotion".white().bold(), emotion_colored(dream.emotion));
    println!(
        "{}: {}",
        "Embedding".white().bold(),
        dream.embedding_model.as_deref().unwrap_or("none")
    );
    println!();
    println!("{}", dream.content);
    println!();
    println!("{}", format!("=== {} ===", dream.creative_format).yellow().bold());
    println!("{}", dream.creative_text);
    println!();
    println!("{}", "=== Analysis ===".yellow().bold());
    println!("{}", dream.rendered_analysis());

    Ok(())
}

/// Run search command
async fn run_search(
    config: &JournalConfig,
    query: String,
    top_k: Option<usize>,
) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let retriever = SemanticRetriever::new(embedder().await, storage)
        .with_top_k(top_k.unwrap_or(config.search_top_k));

    let results = retriever.search(&query).await?;

    println!("{}", "=== Somnia Search ===".cyan().bold());
    println!();

    if results.is_empty() {
        println!("{}", "No matching dreams.".dimmed());
    }
    for (rank, hit) in results.hits.iter().enumerate() {
        println!(
            "{:>2}. {} {} {} [{}]",
            rank + 1,
            format!("{:.3}", hit.score).green(),
            format!("#{}", hit.id).dimmed(),
            hit.title.white().bold(),
            emotion_colored(hit.emotion),
        );
    }
    if results.skipped > 0 {
        println!();
        println!("{}", skipped_notice(results.skipped).yellow());
    }

    Ok(())
}

/// Skipped vectors come from another model or have another dimension
fn skipped_notice(skipped: usize) -> String {
    format!(
        "{} dream(s) skipped: not comparable with the current embedding model",
        skipped
    )
}

/// Run metrics command
fn run_metrics(config: &JournalConfig) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let report = MetricsAggregator::new(storage).report()?;

    println!("{}", "=== Somnia Metrics ===".cyan().bold());
    println!();

    if report.is_empty() {
        println!("{}", "No dreams recorded yet.".dimmed());
        return Ok(());
    }

    println!("{}: {}", "Total Dreams".white().bold(), report.total);
    println!("{}: {}", "Unclassified / Errors".white().bold(), report.excluded);
    println!();
    println!("{}", "=== Emotion Distribution ===".yellow().bold());
    for (emotion, count) in report.counts.iter() {
        print_distribution_bar(emotion.label(), count, report.total);
    }

    println!();
    println!("{}", "=== By Day ===".yellow().bold());
    for day in report.daily_breakdown() {
        let summary: Vec<String> = day
            .counts
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(emotion, count)| format!("{} {}", emotion.label(), count))
            .collect();
        let mut line = summary.join(", ");
        if day.excluded > 0 {
            if !line.is_empty() {
                line.push_str(", ");
            }
            line.push_str(&format!("sin clasificar {}", day.excluded));
        }
        println!("  {}  {}", day.day.format("%Y-%m-%d").to_string().dimmed(), line);
    }

    Ok(())
}

/// Run formats command
fn run_formats() {
    for format in CreativeFormat::ALL {
        println!("{}", format.as_str());
    }
}

fn emotion_colored(tag: EmotionTag) -> colored::ColoredString {
    let label = tag.label();
    match tag {
        EmotionTag::Category(_) => label.green(),
        EmotionTag::Unclassified => label.yellow(),
        EmotionTag::ServiceError => label.red(),
    }
}

fn print_distribution_bar(label: &str, count: usize, total: usize) {
    let percentage = if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    let bar_width: usize = 30;
    let filled = ((percentage / 100.0) * bar_width as f64) as usize;
    let empty = bar_width.saturating_sub(filled);
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(empty));

    println!(
        "  {:10} [{}] {:>4} ({:>5.1}%)",
        label,
        bar.magenta(),
        count,
        percentage
    );
}
