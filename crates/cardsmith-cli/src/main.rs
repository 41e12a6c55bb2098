mod csv_io;

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use cardsmith_engine::{
    CleanerConfig, EngineConfig, EnrichEngine, OllamaClient, DEFAULT_CHAT_URL,
};

#[derive(Parser)]
#[command(
    name = "cardsmith",
    about = "Enrich a flashcard word list with LLM-generated definitions"
)]
struct Cli {
    /// Input CSV with at least a 'word' column
    #[arg(long = "in")]
    input: PathBuf,
    /// System prompt file
    #[arg(long)]
    system: PathBuf,
    /// Output CSV path
    #[arg(long)]
    out: PathBuf,
    /// Ollama model name
    #[arg(long, default_value = "qwen2.5:32b")]
    model: String,
    /// Ollama /api/chat URL
    #[arg(long, default_value = DEFAULT_CHAT_URL)]
    url: String,
    /// Words per request
    #[arg(long, default_value = "100")]
    batch: usize,
    /// Words per retry request
    #[arg(long = "retry-batch", default_value = "25")]
    retry_batch: usize,
    /// Max retry rounds for missing outputs
    #[arg(long, default_value = "2")]
    retries: usize,
    /// Temperature (0 recommended)
    #[arg(long, default_value = "0.0")]
    temperature: f64,
    /// Top-p (1 recommended)
    #[arg(long = "top-p", default_value = "1.0")]
    top_p: f64,
    /// Disable cleaned_definition post-fixes
    #[arg(long = "no-clean")]
    no_clean: bool,
    /// Strip "(it)" parentheticals instead of keeping them
    #[arg(long = "strip-it-parens")]
    strip_it_parens: bool,
    /// Sleep between retry requests (seconds)
    #[arg(long, default_value = "0.0")]
    sleep: f64,
    /// Request timeout (seconds)
    #[arg(long, default_value = "600")]
    timeout: u64,
}

fn main() {
    let cli = Cli::parse();
    std::process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let system_prompt = match std::fs::read_to_string(&cli.system) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read system prompt {:?}: {}", cli.system, e);
            return 2;
        }
    };

    let rows = match csv_io::read_input_csv(&cli.input) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("{}", e);
            return 2;
        }
    };
    if rows.is_empty() {
        eprintln!("No input rows found.");
        return 2;
    }

    // Duplicate rows are requested once and resolved from the shared
    // mapping below.
    let mut seen = HashSet::new();
    let words: Vec<String> = rows
        .iter()
        .map(|r| r.word.clone())
        .filter(|w| seen.insert(w.clone()))
        .collect();

    let client = OllamaClient::new(
        &cli.url,
        &cli.model,
        &system_prompt,
        Duration::from_secs(cli.timeout),
    )
    .with_sampling(Some(cli.temperature), Some(cli.top_p));

    let config = EngineConfig {
        batch_size: cli.batch,
        retry_batch_size: cli.retry_batch,
        max_retries: cli.retries,
        apply_clean: !cli.no_clean,
        cleaner: CleanerConfig {
            keep_it_parens: !cli.strip_it_parens,
        },
        retry_sleep: Duration::from_secs_f64(cli.sleep),
    };

    let engine = EnrichEngine::new(&client, config);
    let outcome = match engine.run(&words) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Run aborted: {}", e);
            return 2;
        }
    };

    let out_rows: Vec<csv_io::RowOut> = rows
        .iter()
        .map(|r| {
            let def = outcome.results.get(&r.word);
            csv_io::RowOut {
                word: r.word.clone(),
                duolingo_definition: r.duolingo_definition.clone(),
                model_definition: def.map(|d| d.raw.clone()).unwrap_or_default(),
                cleaned_definition: def.map(|d| d.cleaned.clone()).unwrap_or_default(),
            }
        })
        .collect();

    if let Err(e) = csv_io::write_output_csv(&cli.out, &out_rows) {
        eprintln!("{}", e);
        return 2;
    }

    let missing_count = out_rows
        .iter()
        .filter(|r| r.model_definition.trim().is_empty())
        .count();

    eprintln!("Wrote {} rows to {:?}", out_rows.len(), cli.out);
    if outcome.parse_errors > 0 {
        eprintln!("Parse errors in model output: {}", outcome.parse_errors);
    }
    if missing_count > 0 {
        eprintln!("Missing model definitions: {}", missing_count);
        return 1;
    }
    0
}
