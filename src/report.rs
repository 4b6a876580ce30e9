/*!
 * Reporting functionality for promptpack
 *
 * Provides functionality for generating formatted reports of crawl
 * results using the tabled library for clean, consistent table
 * rendering.
 */

use std::collections::HashMap;
use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::crawler::SkippedEntry;
use crate::tokenizer::{CacheStats, Model, TokenAnalysis};
use crate::utils::tail_truncate;

/// Information about a file in the report
#[derive(Debug, Clone, Default)]
pub struct FileReportInfo {
    /// Number of lines in the file
    pub lines: usize,
    /// Number of characters in the file
    pub chars: usize,
    /// Number of tokens in the file (if tokenizer is enabled)
    pub tokens: Option<usize>,
}

/// Statistics for a crawl run
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Output file path
    pub output_file: String,
    /// Time taken to crawl and render
    pub duration: Duration,
    /// Number of files processed
    pub files_processed: usize,
    /// Total number of lines
    pub total_lines: usize,
    /// Total number of characters
    pub total_chars: usize,
    /// Details for each file
    pub file_details: HashMap<String, FileReportInfo>,
    /// Model used for token analysis
    pub model: Option<Model>,
    /// Token analysis of the rendered document
    pub analysis: Option<TokenAnalysis>,
    /// Token cache statistics (if tokenizer caching was used)
    pub cache: Option<CacheStats>,
    /// Entries skipped because of filesystem errors
    pub skipped: Vec<SkippedEntry>,
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator for crawl results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string based on crawl statistics
    pub fn generate_report(&self, report: &ScanReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &ScanReport) {
        println!("\n{}", self.generate_report(report));
    }

    /// Fit a slash-separated path into a column, keeping trailing
    /// segments
    fn format_path(&self, path: &str, max_len: usize) -> String {
        if path.chars().count() <= max_len {
            return path.to_string();
        }

        let parts: Vec<&str> = path.split('/').collect();
        let mut kept: Vec<&str> = Vec::new();
        let mut current_len = 3;

        for part in parts.iter().rev() {
            let part_len = part.chars().count() + 1;
            if current_len + part_len > max_len {
                break;
            }
            kept.push(part);
            current_len += part_len;
        }

        // Not even the file name fits.
        if kept.is_empty() {
            return tail_truncate(path, max_len);
        }

        let mut result = String::from("...");
        for part in kept.iter().rev() {
            result.push('/');
            result.push_str(part);
        }
        result
    }

    // Create a summary table using the tabled crate
    fn create_summary_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let mut rows = Vec::new();

        rows.push(SummaryRow {
            key: "📂 Output File".to_string(),
            value: report.output_file.clone(),
        });

        rows.push(SummaryRow {
            key: "⏱️ Process Time".to_string(),
            value: format!("{:.4?}", report.duration),
        });

        rows.push(SummaryRow {
            key: "📄 Files Processed".to_string(),
            value: self.format_number(report.files_processed),
        });

        rows.push(SummaryRow {
            key: "📝 Total Lines".to_string(),
            value: self.format_number(report.total_lines),
        });

        // Use the counted total when a model was active, otherwise the
        // chars/4 estimate.
        let token_text = if let Some(analysis) = &report.analysis {
            format!("{} tokens (counted)", self.format_number(analysis.tokens))
        } else {
            let estimated_tokens = report.total_chars / 4;
            format!(
                "{} tokens (estimated)",
                self.format_number(estimated_tokens)
            )
        };

        rows.push(SummaryRow {
            key: "📦 LLM Tokens".to_string(),
            value: token_text,
        });

        if let Some(model) = report.model {
            rows.push(SummaryRow {
                key: "🤖 Model".to_string(),
                value: model.model_id().to_string(),
            });
        }

        if let Some(analysis) = &report.analysis {
            rows.push(SummaryRow {
                key: "💰 Input Cost".to_string(),
                value: format!("${:.4}", analysis.input_cost),
            });
            rows.push(SummaryRow {
                key: "💸 Output Cost".to_string(),
                value: format!("${:.4}", analysis.output_cost),
            });
        }

        if let Some(cache) = report.cache {
            let total = cache.hits + cache.misses;
            let hit_rate = if total > 0 {
                format!("{:.1}%", (cache.hits as f64 / total as f64) * 100.0)
            } else {
                "0.0%".to_string()
            };

            rows.push(SummaryRow {
                key: "🔄 Cache Hit Rate".to_string(),
                value: format!("{} ({} hits / {} total)", hit_rate, cache.hits, total),
            });
        }

        if !report.skipped.is_empty() {
            rows.push(SummaryRow {
                key: "⚠️ Skipped Entries".to_string(),
                value: self.format_number(report.skipped.len()),
            });
        }

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    // Create a files table using the tabled crate
    fn create_files_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Est. Tokens")]
            tokens: String,
        }

        // Sort files by character count
        let mut files: Vec<_> = report.file_details.iter().collect();
        files.sort_by(|(path_a, a), (path_b, b)| {
            b.chars.cmp(&a.chars).then_with(|| path_a.cmp(path_b))
        });

        // Determine if we show all files or just top 10
        let files_to_show = if report.file_details.len() > 15 {
            &files[0..10]
        } else {
            &files[..]
        };

        let rows: Vec<FileRow> = files_to_show
            .iter()
            .map(|(path, info)| {
                let display_path = self.format_path(path, 60);

                // Use actual token count if available, otherwise estimate
                let token_count = if let Some(tokens) = info.tokens {
                    self.format_number(tokens)
                } else {
                    let estimated_tokens = info.chars / 4;
                    self.format_number(estimated_tokens)
                };

                FileRow {
                    path: display_path,
                    lines: self.format_number(info.lines),
                    tokens: token_count,
                }
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    // Create a table of skipped entries
    fn create_skipped_table(&self, skipped: &[SkippedEntry]) -> String {
        #[derive(Tabled)]
        struct SkippedRow {
            #[tabled(rename = "Path")]
            path: String,

            #[tabled(rename = "Reason")]
            reason: String,
        }

        let rows: Vec<SkippedRow> = skipped
            .iter()
            .map(|entry| SkippedRow {
                path: self.format_path(&entry.path.to_string_lossy(), 60),
                reason: entry.reason.to_string(),
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    // Create a table of the document's first tokens
    fn create_sample_table(&self, report: &ScanReport) -> Option<String> {
        #[derive(Tabled)]
        struct SampleRow {
            #[tabled(rename = "#")]
            index: usize,

            #[tabled(rename = "ID")]
            id: u32,

            #[tabled(rename = "Text")]
            piece: String,
        }

        let sample = &report.analysis.as_ref()?.sample;
        if sample.is_empty() {
            return None;
        }

        let rows: Vec<SampleRow> = sample
            .iter()
            .enumerate()
            .map(|(index, token)| SampleRow {
                index: index + 1,
                id: token.id,
                // Debug formatting keeps newlines and tabs visible.
                piece: format!("{:?}", token.piece),
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        Some(table.to_string())
    }

    // Generate a console table report
    fn generate_console_report(&self, report: &ScanReport) -> String {
        let summary_table = self.create_summary_table(report);
        let files_table = self.create_files_table(report);

        let summary_title = "✅  PACK COMPLETE";
        let files_title = if report.file_details.len() > 15 {
            "📋  TOP 10 LARGEST FILES BY CHARACTER COUNT"
        } else {
            "📋  PROCESSED FILES"
        };

        let mut output = format!(
            "{}\n{}\n\n{}\n{}",
            files_title, files_table, summary_title, summary_table
        );

        if !report.skipped.is_empty() {
            output.push_str(&format!(
                "\n\n⚠️  SKIPPED ENTRIES\n{}",
                self.create_skipped_table(&report.skipped)
            ));
        }

        if let Some(sample_table) = self.create_sample_table(report) {
            output.push_str(&format!("\n\n🔤  FIRST TOKENS\n{}", sample_table));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reporter() -> Reporter {
        Reporter::new(ReportFormat::ConsoleTable)
    }

    #[test]
    fn test_numbers_get_unit_suffixes() {
        let reporter = reporter();
        assert_eq!(reporter.format_number(999), "999");
        assert_eq!(reporter.format_number(1_500), "1.5K");
        assert_eq!(reporter.format_number(2_400_000), "2.4M");
    }

    #[test]
    fn test_long_paths_keep_trailing_segments() {
        let reporter = reporter();
        let path = "repo/deeply/nested/directory/structure/with/a/file.rs";

        let formatted = reporter.format_path(path, 30);
        assert!(formatted.starts_with("..."));
        assert!(formatted.ends_with("file.rs"));
        assert!(formatted.chars().count() <= 30);

        assert_eq!(reporter.format_path("short.rs", 30), "short.rs");
    }

    #[test]
    fn test_report_includes_costs_and_skips() {
        use crate::crawler::SkipReason;
        use crate::tokenizer::TokenAnalysis;
        use std::path::PathBuf;

        let report = ScanReport {
            output_file: "out.xml".to_string(),
            duration: Duration::from_millis(12),
            files_processed: 2,
            total_lines: 10,
            total_chars: 400,
            file_details: HashMap::new(),
            model: Some(Model::Gpt4),
            analysis: Some(TokenAnalysis {
                tokens: 1234,
                input_cost: 0.037,
                output_cost: 0.074,
                sample: Vec::new(),
            }),
            cache: None,
            skipped: vec![SkippedEntry {
                path: PathBuf::from("repo/locked"),
                reason: SkipReason::Unlistable("permission denied".to_string()),
            }],
        };

        let text = reporter().generate_report(&report);
        assert!(text.contains("gpt-4"));
        assert!(text.contains("$0.0370"));
        assert!(text.contains("$0.0740"));
        assert!(text.contains("SKIPPED ENTRIES"));
        assert!(text.contains("permission denied"));
        assert!(text.contains("1.2K tokens (counted)"));
    }
}
