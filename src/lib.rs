//! pulldata - Multilingual HTML fragments from a Google Sheets roster
//!
//! This crate reads five fixed ranges (organizations and four staff categories)
//! from a Google spreadsheet, maps each row to a named record, and renders
//! three HTML fragment files (English, Vietnamese, Spanish) made of collapsible
//! `<details>` sections. Only the section captions differ between languages.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pulldata::{
//!     Config, CredentialStore, InstalledAppFlow, PublisherBuilder, SheetsClient,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default_location()?;
//!
//!     // Stored token, refreshed or obtained interactively when needed
//!     let flow = InstalledAppFlow::new(&config.auth.client_secret_path)?;
//!     let store = CredentialStore::new(&config.auth.token_path, config.auth.scopes.clone(), flow);
//!     let credential = store.get_credential()?;
//!
//!     let mut source = SheetsClient::new(&config.sheets.spreadsheet_id, &credential)?;
//!     let publisher = PublisherBuilder::new()
//!         .with_output_dir(&config.output.dir)
//!         .with_file_stem(&config.output.file_stem)
//!         .build()?;
//!
//!     let report = publisher.publish(&mut source)?;
//!     for (locale, path) in report.files.iter() {
//!         println!("{}: {}", locale, path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Offline Rendering
//!
//! The same ranges can be read from a local `.xlsx` export of the spreadsheet:
//!
//! ```rust,no_run
//! use pulldata::{Locale, PublisherBuilder, WorkbookSource};
//!
//! # fn main() -> Result<(), pulldata::PullDataError> {
//! let mut source = WorkbookSource::open("export.xlsx")?;
//! let publisher = PublisherBuilder::new().build()?;
//!
//! let collected = publisher.collect(&mut source)?;
//! let html = publisher.render_to_strings(&collected.dataset)?;
//! println!("{}", html.get(Locale::Es));
//! # Ok(())
//! # }
//! ```

mod api;
mod auth;
mod builder;
mod config;
mod error;
mod fetch;
pub mod html;
mod output;
pub mod records;
mod types;

// 公開API
pub use api::{Category, FetchStatus, Locale, LocaleMap, SectionLayout};
pub use auth::{
    Authorizer, ClientConfig, Credential, CredentialStore, InstalledAppFlow, TokenGrant,
    SHEETS_READONLY_SCOPE,
};
pub use builder::{Collected, FetchReport, PublishReport, Publisher, PublisherBuilder};
pub use config::{Config, SourceKind, CONFIG_FILE_NAME};
pub use error::PullDataError;
pub use fetch::{fetch_category, CategoryFetch, RowSource, SheetsClient, WorkbookSource};
pub use output::{OutputSet, SectionStats};
pub use records::Dataset;
pub use types::{A1Range, CellCoord, Row};
