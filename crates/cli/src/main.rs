use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cli::inputs::expand_inputs;
use cli::report;
use readmit_core::config;
use readmit_core::config::AppConfig;
use readmit_core::models::SourceFile;
use readmit_core::pipeline::Pipeline;
use std::path::PathBuf;
use std::sync::Arc;
use storage::{FsBlobStore, SqliteAnalysisStore};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze { paths, json } => run_analyze(cfg, paths, json).await,
        Commands::Ingest { paths, owner, json } => run_ingest(cfg, paths, owner, json).await,
        Commands::Show { document_id, json } => run_show(cfg, document_id, json).await,
        Commands::List { owner, json } => run_list(cfg, owner, json).await,
    }
}

#[derive(Parser)]
#[command(name = "readmit")]
#[command(about = "Clinical document intake and readmission risk analysis", long_about = None)]
#[command(after_help = "Image OCR needs a build with `--features ocr` (Tesseract and Leptonica).")]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text and score readmission risk without storing anything
    Analyze {
        /// Files or directories (directories are walked for supported documents)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Store documents, analyze them and persist the analyses
    Ingest {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Owner the documents are filed under
        #[arg(long)]
        owner: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the stored analysis of a document
    Show {
        document_id: i64,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// List stored documents, newest first
    List {
        /// Only documents of this owner
        #[arg(long)]
        owner: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

async fn load_sources(cfg: &AppConfig, paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    let files = expand_inputs(paths, &cfg.scan.exclude)?;
    let mut sources = Vec::with_capacity(files.len());
    for path in &files {
        let source = SourceFile::from_path(path)
            .await
            .with_context(|| format!("read {}", path.display()))?;
        sources.push(source);
    }
    Ok(sources)
}

async fn run_analyze(cfg: AppConfig, paths: Vec<PathBuf>, json: bool) -> Result<()> {
    let sources = load_sources(&cfg, &paths).await?;
    let names: Vec<String> = sources.iter().map(|s| s.name.clone()).collect();
    let pipeline = Arc::new(Pipeline::new(&cfg));
    let outputs = pipeline.run_batch(sources).await?;

    if json {
        let rows: Vec<serde_json::Value> = names
            .iter()
            .zip(&outputs)
            .map(|(name, output)| {
                serde_json::json!({
                    "file": name,
                    "extracted": output.extracted,
                    "assessment": output.assessment,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for (name, output) in names.iter().zip(&outputs) {
            println!("{}", report::render_output(name, output));
        }
    }
    Ok(())
}

async fn open_store(cfg: &AppConfig) -> Result<SqliteAnalysisStore> {
    let pool = storage::connect(&cfg.database.path).await.context("db connect")?;
    storage::migrate(&pool).await.context("db migrate")?;
    Ok(SqliteAnalysisStore::new(pool))
}

async fn run_ingest(cfg: AppConfig, paths: Vec<PathBuf>, owner: String, json: bool) -> Result<()> {
    let store = open_store(&cfg).await?;
    let blobs = FsBlobStore::new(&cfg.storage.root);
    let pipeline = Arc::new(Pipeline::new(&cfg));
    let sources = load_sources(&cfg, &paths).await?;

    let mut outcomes = Vec::new();
    let mut failures = 0usize;
    for source in sources {
        let name = source.name.clone();
        match Arc::clone(&pipeline)
            .ingest(&blobs, &store, &owner, source)
            .await
        {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                error!(file = %name, error = ?e, "ingest failed");
                failures += 1;
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for outcome in &outcomes {
            println!(
                "document {} stored at {}",
                outcome.document.id, outcome.document.file_url
            );
            println!("{}", report::render_output(&outcome.document.name, &outcome.output));
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} document(s) failed to ingest");
    }
    Ok(())
}

async fn run_show(cfg: AppConfig, document_id: i64, json: bool) -> Result<()> {
    let store = open_store(&cfg).await?;
    let record = store
        .get_analysis(document_id)
        .await?
        .with_context(|| format!("no analysis stored for document {document_id}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("document {}", record.document_id);
        if record.extraction_failed {
            println!("extraction failed: {}", record.extracted_text);
        }
        let assessment = readmit_core::models::RiskAssessment {
            risk_score: record.risk_score,
            risk_level: record.risk_level,
            explanation: record.explanation,
            findings: record.findings,
            recommendations: record.recommendations,
        };
        print!("{}", report::render_assessment(&assessment));
    }
    Ok(())
}

async fn run_list(cfg: AppConfig, owner: Option<String>, json: bool) -> Result<()> {
    let store = open_store(&cfg).await?;
    let rows = store.list_documents(owner.as_deref()).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", report::render_summaries(&rows));
    }
    Ok(())
}
