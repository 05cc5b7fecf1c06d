use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

mod output;

use chronofile_core::{NamingStyle, ProgressEvent, RunConfig, config_file};
use chronofile_pdf_mupdf::MupdfBackend;
use output::ColorMode;

/// Rename date-bearing PDF documents (payslips, statements) after the
/// period found in their text, so the directory sorts chronologically.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Back up, extract text, and rename the PDFs in a directory
    Run {
        #[command(flatten)]
        opts: CommonOpts,

        /// Skip the backup step
        #[arg(long)]
        no_backup: bool,
    },

    /// Show the renames a run would perform, without changing anything
    Plan {
        #[command(flatten)]
        opts: CommonOpts,
    },
}

#[derive(Args, Debug)]
struct CommonOpts {
    /// Directory holding the PDFs
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Label preceding an explicit date range (default: "Statement Period")
    #[arg(long)]
    label: Option<String>,

    /// Primary date format, chrono strftime syntax (default: %m/%d/%Y)
    #[arg(long)]
    date_format: Option<String>,

    /// Fallback date format tried when the primary fails (default: %m/%d/%y)
    #[arg(long)]
    date_format_fallback: Option<String>,

    /// 1-indexed line positions for the fixed-layout fallback
    #[arg(long, num_args = 2, value_names = ["FIRST", "SECOND"])]
    fixed_lines: Option<Vec<usize>>,

    /// Single-date format for the fixed-layout fallback (default: %d-%b-%Y)
    #[arg(long)]
    fixed_line_format: Option<String>,

    /// Reject loose-scan dates before this year (default: 2000)
    #[arg(long)]
    year_min: Option<i32>,

    /// Always use range naming, even for single-day periods
    #[arg(long)]
    always_range: bool,

    /// Name of the backup subdirectory (default: backup)
    #[arg(long)]
    backup_dir: Option<String>,

    /// Name of the extracted-text subdirectory (default: output_text)
    #[arg(long)]
    text_dir: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl CommonOpts {
    /// Resolve configuration: CLI flags > config file > defaults.
    fn build_config(&self) -> RunConfig {
        let mut config = RunConfig::new(&self.dir);
        config_file::load_config(&self.dir).apply(&mut config);

        if let Some(v) = &self.label {
            config.resolver.date_label = v.clone();
        }
        if let Some(v) = &self.date_format {
            config.resolver.date_format_primary = v.clone();
        }
        if let Some(v) = &self.date_format_fallback {
            config.resolver.date_format_fallback = v.clone();
        }
        if let Some(v) = &self.fixed_lines {
            config.resolver.fixed_line_positions = [v[0], v[1]];
        }
        if let Some(v) = &self.fixed_line_format {
            config.resolver.fixed_line_format = v.clone();
        }
        if let Some(v) = self.year_min {
            config.resolver.year_min = v;
        }
        if self.always_range {
            config.naming = NamingStyle::AlwaysRange;
        }
        if let Some(v) = &self.backup_dir {
            config.backup_dir_name = v.clone();
        }
        if let Some(v) = &self.text_dir {
            config.output_text_dir_name = v.clone();
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run { opts, no_backup } => {
            let mut config = opts.build_config();
            config.backup = !no_backup;
            run(config, ColorMode(!opts.no_color))
        }
        Command::Plan { opts } => {
            let config = opts.build_config();
            plan(config, ColorMode(!opts.no_color))
        }
    }
}

fn run(config: RunConfig, color: ColorMode) -> anyhow::Result<()> {
    let backend = MupdfBackend::new();

    let bar = ProgressBar::hidden();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/dim}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=> "),
    );

    let progress = |event: ProgressEvent| match event {
        ProgressEvent::BackupComplete { files } => {
            bar.println(format!("Backed up {files} files"));
        }
        ProgressEvent::Extracting { index, total, name } => {
            if bar.is_hidden() && total > 0 {
                bar.set_length(total as u64);
                bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
            }
            bar.set_position(index as u64);
            bar.set_message(name);
        }
        ProgressEvent::Renamed { from, to } => {
            bar.println(output::format_rename(&from, &to, color));
        }
        ProgressEvent::Skipped { name, reason } => {
            bar.println(output::format_skip(&name, &reason, color));
        }
    };

    let summary = chronofile_core::run(&config, &backend, progress)?;
    bar.finish_and_clear();

    let mut stdout = std::io::stdout();
    output::print_summary(&mut stdout, &summary, color)?;
    stdout.flush()?;
    Ok(())
}

fn plan(config: RunConfig, color: ColorMode) -> anyhow::Result<()> {
    let backend = MupdfBackend::new();
    let plan = chronofile_core::plan(&config, &backend)?;

    let mut stdout = std::io::stdout();
    output::print_plan(&mut stdout, &plan, color)?;
    stdout.flush()?;
    Ok(())
}
