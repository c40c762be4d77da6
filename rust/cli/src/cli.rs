//! Command-line argument definitions.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "rangekpi",
    version,
    about = "Classify poker ranges and split them into KPI buckets"
)]
pub struct RangeKpiCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse every scenario file in the input folder, classify, save and report
    Analyze {
        /// Input folder (defaults to the configured input_folder)
        #[arg(long)]
        input: Option<String>,
        /// Output folder (defaults to the configured output_folder)
        #[arg(long)]
        output: Option<String>,
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
        /// Classify rows on a single thread
        #[arg(long)]
        sequential: bool,
    },
    /// Partition a previously parsed file into KPI buckets
    Report {
        /// Parsed file; the newest one in the output folder when omitted
        #[arg(long)]
        file: Option<String>,
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
    /// Classify a single 5-card hand
    Classify {
        /// Five cards, e.g. AhKhQhJhTh
        hand: String,
    },
    /// Convert a parsed file to csv, json or sqlite
    Export {
        #[arg(long)]
        input: String,
        #[arg(long)]
        format: String,
        #[arg(long)]
        output: String,
    },
    /// Show the resolved configuration and where each value came from
    Cfg,
}

/// Output format of KPI reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
        }
    }
}

/// Subcommand names, used in the short usage listing.
pub const COMMANDS: &[&str] = &["analyze", "report", "classify", "export", "cfg"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_list_matches_subcommands() {
        use clap::CommandFactory;
        let cmd = RangeKpiCli::command();
        let names: Vec<&str> = cmd.get_subcommands().map(|s| s.get_name()).collect();
        assert_eq!(names, COMMANDS);
    }

    #[test]
    fn analyze_defaults_to_text_and_parallel() {
        let cli = RangeKpiCli::try_parse_from(["rangekpi", "analyze"]).unwrap();
        match cli.cmd {
            Commands::Analyze {
                format, sequential, ..
            } => {
                assert_eq!(format, ReportFormat::Text);
                assert!(!sequential);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
