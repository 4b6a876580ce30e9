/*!
 * Command-line interface for promptpack
 */

use std::fs;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;

use promptpack::clipboard;
use promptpack::config::{Args, Config, OutputFormat};
use promptpack::crawler::Crawler;
use promptpack::error::Result;
use promptpack::overview;
use promptpack::report::{ReportFormat, Reporter, ScanReport};
use promptpack::settings::Settings;
use promptpack::tokenizer;
use promptpack::utils::count_files;
use promptpack::writer::XmlWriter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    setup_logging(args.quiet, args.verbose);

    // Shell completion generation short-circuits everything else
    if let Some(shell) = args.generate {
        let mut cmd = Args::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    // Load persisted settings; a broken settings file degrades to
    // defaults rather than blocking the run
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("cannot load settings: {}, using defaults", err);
            Settings::default()
        }
    };

    let save_settings = args.save_settings;
    let config = Config::from_args(args, &settings);
    config.validate()?;

    let selected_rules = settings.select_rules(&config.selected_rules)?;

    if save_settings {
        save_effective_settings(&config, &settings)?;
    }

    // Create progress bar with advanced Unicode styling
    let progress = ProgressBar::new(0);
    progress.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%) ⏱️  Elapsed: {elapsed_precise}")
        .unwrap());
    progress.enable_steady_tick(std::time::Duration::from_millis(100));
    progress.set_prefix("📊 Setup");

    progress.set_message(format!(
        "📂 Crawling directory: {}",
        config.target_dir.display()
    ));

    if config.respect_gitignore {
        progress.set_message("🔍 Respecting .gitignore files in the project".to_string());
    }

    // Count files for progress tracking
    let total_files = match count_files(&config.target_dir, &config) {
        Ok(count) => {
            progress.set_message(format!("🔎 Found {} files to process", count));
            count
        }
        Err(e) => {
            progress.set_message(format!("⚠️ Warning: Failed to count files: {}", e));
            0
        }
    };

    progress.set_length(total_files);
    progress.set_prefix("📊 Processing");
    progress.set_message("Starting crawl...");

    let crawler = Crawler::new(config.clone(), Arc::new(progress.clone()));
    let writer = XmlWriter::new(config.clone());

    let start_time = Instant::now();

    // Crawl directory and render the document
    let root_node = crawler.crawl()?;
    let document = match config.format {
        OutputFormat::Xml => writer.render(&root_node, &selected_rules)?,
        OutputFormat::Tree => overview::render_tree_text(&root_node),
        OutputFormat::Overview => overview::render_overview(&root_node),
    };

    fs::write(&config.output_file, &document)?;

    // Token analysis, when a model is configured
    let mut stats = crawler.statistics();
    let mut analysis = None;
    let mut cache_stats = None;

    if let Some(model) = config.model {
        progress.set_prefix("📊 Tokenizing");
        progress.set_message(format!("Counting tokens with {}", model.model_id()));

        let project_dir = config.target_dir.to_string_lossy().to_string();
        let counter = tokenizer::create_tokenizer(model, &project_dir)?;

        // Per-file counts for the report
        root_node.for_each_file(&mut |file| {
            if let Some(text) = file.content.as_text() {
                match counter.count_tokens(text) {
                    Ok(count) => {
                        let key = file.path.to_string_lossy().to_string();
                        if let Some(info) = stats.file_details.get_mut(&key) {
                            info.tokens = Some(count.tokens);
                        }
                    }
                    Err(err) => {
                        log::debug!("cannot count tokens for {}: {}", file.path.display(), err)
                    }
                }
            }
        });

        let document_analysis = tokenizer::analyze(counter.as_ref(), model, &document)?;
        if document_analysis.tokens > counter.model_context_window() {
            log::warn!(
                "document is {} tokens, exceeding the {} token context window of {}",
                document_analysis.tokens,
                counter.model_context_window(),
                model.model_id()
            );
        }
        analysis = Some(document_analysis);
        cache_stats = counter.cache_stats();
    }

    let total_duration = start_time.elapsed();

    // Clear the progress bar
    progress.finish_and_clear();

    if config.clip {
        match clipboard::copy_to_clipboard(&document) {
            Ok(()) => log::info!("output copied to clipboard"),
            Err(err) => log::warn!("cannot copy to clipboard: {}", err),
        }
    }

    // Prepare the crawl report
    let scan_report = ScanReport {
        output_file: config.output_file.display().to_string(),
        duration: total_duration,
        files_processed: stats.files_processed,
        total_lines: stats.total_lines,
        total_chars: stats.total_chars,
        file_details: stats.file_details,
        model: config.model,
        analysis,
        cache: cache_stats,
        skipped: stats.skipped,
    };

    // Create a reporter and print the report
    let reporter = Reporter::new(ReportFormat::ConsoleTable);
    reporter.print_report(&scan_report);

    Ok(())
}

/// Persist the effective ignore patterns, model, and path style
fn save_effective_settings(config: &Config, settings: &Settings) -> Result<()> {
    let mut updated = settings.clone();
    updated.ignore_patterns.directories = config.rules.dir_patterns().to_vec();
    updated.ignore_patterns.files = config.rules.file_patterns().to_vec();
    updated.excluded_extensions = config.rules.denied_extensions_dotted();
    updated.model = config.model;
    updated.use_relative_paths = config.relative_paths;
    updated.save()?;

    log::info!("settings saved to {}", Settings::path()?.display());
    Ok(())
}

/// Configure the logger from the quiet and verbosity flags
fn setup_logging(quiet: bool, verbose: u8) {
    let level = if quiet {
        LevelFilter::Off
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}
