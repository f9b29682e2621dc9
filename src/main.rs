use std::process::ExitCode;

use pulldata::{
    Config, CredentialStore, InstalledAppFlow, PublishReport, PullDataError, PublisherBuilder,
    SheetsClient, SourceKind, WorkbookSource,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(report) => {
            log_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,reqwest=warn,hyper=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn run() -> Result<PublishReport, PullDataError> {
    let config = Config::load_default_location()?;

    let publisher = PublisherBuilder::new()
        .with_output_dir(&config.output.dir)
        .with_file_stem(&config.output.file_stem)
        .build()?;

    match config.source.kind {
        SourceKind::Sheets => {
            let flow = InstalledAppFlow::new(&config.auth.client_secret_path)?
                .with_open_browser(config.auth.open_browser);
            let store =
                CredentialStore::new(&config.auth.token_path, config.auth.scopes.clone(), flow);
            tracing::debug!("Credential file: {}", store.path().display());
            let credential = store.get_credential()?;

            let mut source = SheetsClient::new(&config.sheets.spreadsheet_id, &credential)?;
            publisher.publish(&mut source)
        }
        SourceKind::Workbook => {
            let path = config.source.path.as_ref().ok_or_else(|| {
                PullDataError::Config("source.path is required for a workbook source".to_string())
            })?;
            tracing::info!("Reading ranges from {}", path.display());
            let mut source = WorkbookSource::open(path)?;
            publisher.publish(&mut source)
        }
    }
}

fn log_report(report: &PublishReport) {
    for fetch in &report.fetches {
        if fetch.status.is_failed() {
            tracing::warn!("{}: {}", fetch.category, fetch.status);
        } else {
            tracing::debug!("{}: {}", fetch.category, fetch.status);
        }
    }
    for section in &report.sections {
        if section.skipped > 0 {
            tracing::info!(
                "{}: {} rendered, {} pending",
                section.category,
                section.rendered,
                section.skipped
            );
        }
    }
    tracing::info!("Done.");
}
