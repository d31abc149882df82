//! CLI for sef: is relative measurement worth it for your competitors?

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sef")]
#[command(about = "sef — estimate δ, κ, ρ and the Signal Enhancement Factor from CSV datasets")]
#[command(version = sef_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the SEF framework on one dataset: parameters, normality,
    /// SEF, quadrant and applicability for each measurement column.
    Analyze {
        /// CSV file with a header row
        csv: String,

        /// Column holding the group labels
        #[arg(long)]
        group_column: String,

        /// Reference group label (defaults to the first label in the file)
        #[arg(long)]
        class_a: Option<String>,

        /// Comparison group label (defaults to the second label in the file)
        #[arg(long)]
        class_b: Option<String>,

        /// Comma-separated measurement column(s)
        #[arg(long)]
        measurement: String,

        /// Assumed correlation between the groups
        #[arg(long, conflicts_with = "paired", allow_hyphen_values = true)]
        rho: Option<f64>,

        /// Measure ρ from position-aligned rows instead of assuming it
        #[arg(long)]
        paired: bool,

        /// Refuse groups with fewer valid observations than this
        #[arg(long, default_value = "10")]
        min_samples: usize,

        /// Significance level for the normality tests
        #[arg(long, default_value = "0.05")]
        alpha: f64,

        /// Also report parameters after a log transformation
        #[arg(long)]
        log_transform: bool,

        /// δ threshold separating high from low performance quadrants
        #[arg(long, default_value = "0.5", allow_hyphen_values = true)]
        delta_threshold: f64,

        /// κ threshold separating low from high variance asymmetry quadrants
        #[arg(long, default_value = "1.0")]
        kappa_threshold: f64,

        /// Write the text report to this path
        #[arg(long)]
        output: Option<String>,

        /// Write a one-row-per-measurement CSV summary
        #[arg(long = "csv")]
        csv_out: Option<String>,

        /// Write full results as JSON
        #[arg(long)]
        json: Option<String>,
    },

    /// Run every scenario listed in a JSON scenario file
    Batch {
        /// Scenario file
        scenarios: String,

        /// Directory for report.txt, summary.csv and results.json
        #[arg(long)]
        output_dir: Option<String>,
    },

    /// Evaluate SEF = (1 + κ) / (1 + κ − 2√κ·ρ) directly
    Compute {
        /// Variance ratio var_B / var_A
        #[arg(long, allow_hyphen_values = true)]
        kappa: f64,

        /// Correlation in [-1, 1]
        #[arg(long, allow_hyphen_values = true)]
        rho: f64,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run the normality battery (Shapiro-Wilk, D'Agostino K², Jarque-Bera, KS)
    Normality {
        csv: String,

        /// Measurement column to test
        #[arg(long)]
        column: String,

        /// Restrict to rows whose --group-column equals --label
        #[arg(long, requires = "label")]
        group_column: Option<String>,

        #[arg(long, requires = "group_column")]
        label: Option<String>,

        #[arg(long, default_value = "0.05")]
        alpha: f64,
    },

    /// List columns, numeric coverage and label counts
    Inspect {
        csv: String,

        /// Show label counts for this column
        #[arg(long)]
        group_column: Option<String>,
    },

    /// Assess class imbalance and bootstrap the minority class
    Balance {
        csv: String,

        #[arg(long)]
        group_column: String,

        #[arg(long)]
        class_a: String,

        #[arg(long)]
        class_b: String,

        /// Measurement column used for the variance-ratio check
        #[arg(long)]
        measurement: Option<String>,

        /// Seed for the resampler
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Write the balanced table here; without it only the assessment is shown
        #[arg(long)]
        output: Option<String>,
    },

    /// Download a CSV dataset over HTTP
    Fetch {
        url: String,

        #[arg(long)]
        output: String,

        /// Request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout_sec: u64,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            csv,
            group_column,
            class_a,
            class_b,
            measurement,
            rho,
            paired,
            min_samples,
            alpha,
            log_transform,
            delta_threshold,
            kappa_threshold,
            output,
            csv_out,
            json,
        } => commands::analyze::run(commands::analyze::AnalyzeCommandConfig {
            csv_path: &csv,
            group_column: &group_column,
            class_a: class_a.as_deref(),
            class_b: class_b.as_deref(),
            measurements: commands::split_list(&measurement),
            rho,
            paired,
            min_samples,
            alpha,
            log_transform,
            delta_threshold,
            kappa_threshold,
            output_path: output.as_deref(),
            csv_path_out: csv_out.as_deref(),
            json_path: json.as_deref(),
        }),
        Commands::Batch {
            scenarios,
            output_dir,
        } => commands::batch::run(&scenarios, output_dir.as_deref()),
        Commands::Compute { kappa, rho, json } => commands::compute::run(kappa, rho, json),
        Commands::Normality {
            csv,
            column,
            group_column,
            label,
            alpha,
        } => commands::normality::run(
            &csv,
            &column,
            group_column.as_deref().zip(label.as_deref()),
            alpha,
        ),
        Commands::Inspect { csv, group_column } => {
            commands::inspect::run(&csv, group_column.as_deref())
        }
        Commands::Balance {
            csv,
            group_column,
            class_a,
            class_b,
            measurement,
            seed,
            output,
        } => commands::balance::run(commands::balance::BalanceCommandConfig {
            csv_path: &csv,
            group_column: &group_column,
            class_a: &class_a,
            class_b: &class_b,
            measurement: measurement.as_deref(),
            seed,
            output_path: output.as_deref(),
        }),
        Commands::Fetch {
            url,
            output,
            timeout_sec,
        } => commands::fetch::run(&url, &output, timeout_sec),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
