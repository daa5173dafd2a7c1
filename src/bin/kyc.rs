//! CLI for submitting, reviewing and inspecting merchant KYC.

use std::fs;
use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use merchant_kyc::config::Config;
use merchant_kyc::error::KycError;
use merchant_kyc::kyc::KycServiceBlocking;
use merchant_kyc::models::{
    IncorporationDatePolicy, KycStatus, MerchantId, ReviewRequest, ReviewerId, StatusList,
    StatusView, Submission, SubmissionId, SubmissionReceipt, SubmissionRequest,
};
use merchant_kyc::storage::{BlockingStorage, FileStorage};
use owo_colors::OwoColorize;

/// Merchant KYC CLI: submit, review and inspect KYC submissions.
#[derive(Debug, Parser)]
#[command(name = "kyc", version, about)]
struct Cli {
    /// Override the storage directory (default: `KYC_DATA_DIR` or XDG data dir).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Override the merchant directory base URL.
    #[arg(long, global = true, value_name = "URL")]
    directory_url: Option<String>,
    /// Reject submissions with a malformed incorporation date.
    #[arg(long, global = true)]
    strict_dates: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Submit KYC details for a merchant.
    Submit(SubmitArgs),
    /// Show a merchant's current KYC status.
    Status {
        /// Merchant to look up.
        merchant_id: MerchantId,
    },
    /// Show every stored field of a submission.
    Show {
        /// Submission to display.
        submission_id: SubmissionId,
    },
    /// Approve, reject or reset a merchant's latest submission.
    Review {
        /// Merchant whose latest submission is reviewed.
        merchant_id: MerchantId,
        /// New status: approved, rejected or pending.
        status: String,
        /// Reviewer making the change.
        #[arg(long)]
        reviewer_id: Option<ReviewerId>,
        /// Review notes.
        #[arg(long)]
        notes: Option<String>,
    },
    /// List submissions in a status, most recent first.
    List {
        /// Status to list.
        #[arg(long, default_value = "pending")]
        status: String,
        /// Maximum number of entries (1-100).
        #[arg(long, default_value_t = 100)]
        limit: i64,
    },
    /// Run the HTTP API.
    #[cfg(feature = "server")]
    Serve,
}

/// Arguments for the `submit` subcommand.
#[derive(Debug, Args)]
struct SubmitArgs {
    /// Read the whole submission from a JSON file instead of flags.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["merchant_id", "business_name"])]
    json: Option<PathBuf>,
    /// Merchant submitting KYC.
    #[arg(long, required_unless_present = "json")]
    merchant_id: Option<MerchantId>,
    /// Business name.
    #[arg(long, required_unless_present = "json")]
    business_name: Option<String>,
    /// `registered` (default) or `startup`.
    #[arg(long, default_value = "")]
    business_type: String,
    /// Incorporation date (YYYY-MM-DD).
    #[arg(long)]
    incorporation_date: Option<String>,
    /// Director full name.
    #[arg(long)]
    director_name: Option<String>,
    /// Director email address.
    #[arg(long)]
    director_email: Option<String>,
    /// Supporting document, repeatable.
    #[arg(long = "document", value_name = "LABEL=REF", value_parser = parse_document)]
    documents: Vec<(String, String)>,
}

impl SubmitArgs {
    /// Builds the submission request from flags or the JSON file.
    fn into_request(self) -> merchant_kyc::error::Result<SubmissionRequest> {
        if let Some(path) = self.json {
            let contents = fs::read_to_string(path)?;
            return serde_json::from_str(&contents).map_err(KycError::from);
        }
        Ok(SubmissionRequest {
            merchant_id: self.merchant_id.unwrap_or_default(),
            business_name: self.business_name.unwrap_or_default(),
            business_type: self.business_type,
            incorporation_date: self.incorporation_date.unwrap_or_default(),
            director_name: self.director_name.unwrap_or_default(),
            director_email: self.director_email.unwrap_or_default(),
            documents: self.documents.into_iter().collect(),
            ..SubmissionRequest::default()
        })
    }
}

/// Parses a `LABEL=REF` document argument for clap.
fn parse_document(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((label, reference)) if !label.trim().is_empty() && !reference.trim().is_empty() => {
            Ok((label.trim().to_owned(), reference.trim().to_owned()))
        }
        Some(_) | None => Err(format!("expected LABEL=REF, got '{raw}'")),
    }
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => return report("invalid configuration", &err),
    };

    #[cfg(feature = "server")]
    if matches!(cli.command, Command::Serve) {
        return cmd_serve(&config);
    }

    let storage = match create_storage(config.data_dir.clone()) {
        Ok(storage) => storage,
        Err(err) => return report("failed to initialize storage", &err),
    };

    let engine = match KycServiceBlocking::builder()
        .storage(storage)
        .directory_url(config.directory_url.clone())
        .timeout(config.sync_timeout)
        .incorporation_dates(config.incorporation_dates)
        .build()
    {
        Ok(engine) => engine,
        Err(err) => return report("failed to build engine", &err),
    };

    dispatch(&engine, cli.command)
}

/// Reads configuration from the environment and applies flag overrides.
fn load_config(cli: &Cli) -> merchant_kyc::error::Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(ref dir) = cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(ref url) = cli.directory_url {
        config.directory_url.clone_from(url);
    }
    if cli.strict_dates {
        config.incorporation_dates = IncorporationDatePolicy::Strict;
    }
    Ok(config)
}

/// Creates the storage backend, using `data_dir` if provided or the
/// default XDG data directory otherwise.
fn create_storage(data_dir: Option<PathBuf>) -> merchant_kyc::error::Result<FileStorage> {
    let dir = match data_dir {
        Some(dir) => dir,
        None => FileStorage::default_dir()?,
    };
    FileStorage::new(dir)
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch<S: BlockingStorage>(
    engine: &KycServiceBlocking<S>,
    command: Command,
) -> io::Result<ExitCode> {
    match command {
        Command::Submit(args) => cmd_submit(engine, args),
        Command::Status { merchant_id } => cmd_status(engine, merchant_id),
        Command::Show { submission_id } => cmd_show(engine, submission_id),
        Command::Review {
            merchant_id,
            status,
            reviewer_id,
            notes,
        } => cmd_review(
            engine,
            &ReviewRequest {
                merchant_id,
                status,
                reviewer_id,
                review_notes: notes,
            },
        ),
        Command::List { status, limit } => cmd_list(engine, &status, limit),
        // Handled in `run` before any blocking engine exists.
        #[cfg(feature = "server")]
        Command::Serve => Ok(ExitCode::SUCCESS),
    }
}

/// Executes the `submit` subcommand.
fn cmd_submit<S: BlockingStorage>(
    engine: &KycServiceBlocking<S>,
    args: SubmitArgs,
) -> io::Result<ExitCode> {
    let request = match args.into_request() {
        Ok(request) => request,
        Err(err) => return report("failed to read submission", &err),
    };
    let spinner = make_spinner("Storing submission and syncing merchant directory...");
    let result = engine.submit(&request);
    spinner.finish_and_clear();
    match result {
        Ok(receipt) => {
            print_receipt(&receipt)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("submission failed", &err),
    }
}

/// Executes the `status` subcommand.
fn cmd_status<S: BlockingStorage>(
    engine: &KycServiceBlocking<S>,
    merchant_id: MerchantId,
) -> io::Result<ExitCode> {
    match engine.status(merchant_id) {
        Ok(Some(view)) => {
            print_status_view(&view)?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(None) => {
            writeln!(
                io::stdout().lock(),
                "{} {}",
                format_args!("Merchant {merchant_id} has no KYC submission").dimmed(),
                "(not_started)".yellow()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("status lookup failed", &err),
    }
}

/// Executes the `show` subcommand.
fn cmd_show<S: BlockingStorage>(
    engine: &KycServiceBlocking<S>,
    submission_id: SubmissionId,
) -> io::Result<ExitCode> {
    match engine.submission(submission_id) {
        Ok(Some(submission)) => {
            print_submission(&submission)?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(None) => {
            writeln!(
                io::stderr().lock(),
                "{} submission {submission_id} not found",
                "error:".red().bold()
            )?;
            Ok(ExitCode::FAILURE)
        }
        Err(err) => report("submission lookup failed", &err),
    }
}

/// Executes the `review` subcommand.
fn cmd_review<S: BlockingStorage>(
    engine: &KycServiceBlocking<S>,
    request: &ReviewRequest,
) -> io::Result<ExitCode> {
    let spinner = make_spinner("Updating status and syncing merchant directory...");
    let result = engine.review(request);
    spinner.finish_and_clear();
    match result {
        Ok(view) => {
            writeln!(io::stdout().lock(), "{}", "KYC status updated.".green().bold())?;
            print_status_view(&view)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("review failed", &err),
    }
}

/// Executes the `list` subcommand.
fn cmd_list<S: BlockingStorage>(
    engine: &KycServiceBlocking<S>,
    status: &str,
    limit: i64,
) -> io::Result<ExitCode> {
    match engine.list_by_status(status, limit) {
        Ok(list) => {
            print_status_list(&list)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report("listing failed", &err),
    }
}

/// Executes the `serve` subcommand on a fresh tokio runtime.
#[cfg(feature = "server")]
fn cmd_serve(config: &Config) -> io::Result<ExitCode> {
    let runtime = tokio::runtime::Runtime::new()?;
    match runtime.block_on(merchant_kyc::server::serve(config)) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => report("server failed", &err),
    }
}

/// Prints an error with context and returns a failure exit code.
fn report(context: &str, err: &KycError) -> io::Result<ExitCode> {
    writeln!(
        io::stderr().lock(),
        "{} {context}: {err}",
        "error:".red().bold()
    )?;
    Ok(ExitCode::FAILURE)
}

/// Creates a spinner with the given message.
fn make_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(core::time::Duration::from_millis(80));
    spinner
}

/// Returns the table colour used for a status.
const fn status_color(status: KycStatus) -> Color {
    match status {
        KycStatus::Pending => Color::Yellow,
        KycStatus::Approved => Color::Green,
        KycStatus::Rejected => Color::Red,
    }
}

/// Renders an optional value, using an em-dash placeholder when absent.
fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "\u{2014}".to_owned(), |inner| inner.to_string())
}

/// Prints the acknowledgement of a submission.
fn print_receipt(receipt: &SubmissionReceipt) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", receipt.message.green().bold())?;
    writeln!(
        out,
        "  submission {} is {}",
        receipt.submission_id.bold(),
        receipt.status.yellow()
    )?;
    Ok(())
}

/// Prints a status view as a two-column table.
fn print_status_view(view: &StatusView) -> io::Result<()> {
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Field").fg(Color::Cyan),
        Cell::new("Value").fg(Color::Cyan),
    ]);
    _ = table.add_row(vec![Cell::new("Merchant"), Cell::new(view.merchant_id)]);
    _ = table.add_row(vec![Cell::new("Submission"), Cell::new(view.submission_id)]);
    _ = table.add_row(vec![
        Cell::new("Status"),
        Cell::new(view.status).fg(status_color(view.status)),
    ]);
    _ = table.add_row(vec![Cell::new("Submitted"), Cell::new(view.submitted_at)]);
    _ = table.add_row(vec![Cell::new("Reviewed"), Cell::new(or_dash(view.reviewed_at))]);
    _ = table.add_row(vec![Cell::new("Reviewer"), Cell::new(or_dash(view.reviewer_id))]);
    _ = table.add_row(vec![
        Cell::new("Notes"),
        Cell::new(or_dash(view.review_notes.as_deref())),
    ]);
    writeln!(io::stdout().lock(), "{table}")?;
    Ok(())
}

/// Prints every stored field of a submission.
fn print_submission(submission: &Submission) -> io::Result<()> {
    let profile = &submission.profile;
    let review = submission.review.as_ref();
    let rows: Vec<(&str, String)> = vec![
        ("Submission", submission.id.to_string()),
        ("Merchant", submission.merchant_id.to_string()),
        ("Status", submission.status.to_string()),
        ("Business name", profile.business_name.clone()),
        ("Business type", profile.business_type.to_string()),
        ("CAC number", profile.cac_number.clone()),
        ("TIN number", profile.tin_number.clone()),
        ("Address", profile.business_address.clone()),
        ("City", profile.city.clone()),
        ("State", profile.state.clone()),
        ("Postal code", profile.postal_code.clone()),
        ("Incorporated", or_dash(profile.incorporation_date)),
        ("Category", profile.business_category.clone()),
        ("Director", profile.director_name.clone()),
        ("Director BVN", profile.director_bvn.clone()),
        ("Director phone", profile.director_phone.clone()),
        ("Director email", profile.director_email.clone()),
        ("Created", submission.created_at.to_string()),
        ("Updated", submission.updated_at.to_string()),
        ("Reviewed", or_dash(review.map(|stamp| stamp.reviewed_at))),
        ("Reviewer", or_dash(review.and_then(|stamp| stamp.reviewer_id))),
        ("Notes", or_dash(review.and_then(|stamp| stamp.notes.as_deref()))),
    ];

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Field").fg(Color::Cyan),
        Cell::new("Value").fg(Color::Cyan),
    ]);
    for (name, value) in rows {
        let value_cell = if value.is_empty() {
            Cell::new("\u{2014}").fg(Color::DarkGrey)
        } else {
            Cell::new(value)
        };
        _ = table.add_row(vec![Cell::new(name), value_cell]);
    }
    for (label, reference) in &profile.documents {
        _ = table.add_row(vec![
            Cell::new(format!("Document: {label}")),
            Cell::new(reference),
        ]);
    }

    writeln!(io::stdout().lock(), "{table}")?;
    Ok(())
}

/// Prints a status listing in a table.
fn print_status_list(list: &StatusList) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if list.submissions.is_empty() {
        writeln!(out, "{}", "No submissions found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Submission").fg(Color::Cyan),
        Cell::new("Merchant").fg(Color::Cyan),
        Cell::new("Status").fg(Color::Cyan),
        Cell::new("Submitted").fg(Color::Cyan),
        Cell::new("Reviewed").fg(Color::Cyan),
    ]);
    for view in &list.submissions {
        _ = table.add_row(vec![
            Cell::new(view.submission_id),
            Cell::new(view.merchant_id),
            Cell::new(view.status).fg(status_color(view.status)),
            Cell::new(view.submitted_at.format("%Y-%m-%d %H:%M")),
            Cell::new(or_dash(view.reviewed_at.map(|at| at.format("%Y-%m-%d %H:%M")))),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "KYC Submissions".green().bold(),
        format_args!("({})", list.total).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            // Last-resort error output; nothing left to do if stderr failed.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
