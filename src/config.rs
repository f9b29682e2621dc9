//! Configuration
//!
//! 実行時設定（`pulldata.toml`）を読み込むモジュール。
//! ファイルがない場合はバイナリに埋め込まれたデフォルト設定を使用します。

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::auth::SHEETS_READONLY_SCOPE;
use crate::error::PullDataError;

/// 設定ファイル名（カレントディレクトリから探す）
pub const CONFIG_FILE_NAME: &str = "pulldata.toml";

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[sheets]
spreadsheet_id = "1F1bM6jpW2_07Yys5UzRZr3rnQ75P16emwfehf1Xy9tM"

[auth]
token_path = "token.json"
client_secret_path = "credentials.json"
scopes = ["https://www.googleapis.com/auth/spreadsheets.readonly"]
open_browser = true

[output]
dir = "."
file_stem = "PulledDataPage"

[source]
kind = "sheets"
"#;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub token_path: PathBuf,
    pub client_secret_path: PathBuf,
    pub scopes: Vec<String>,
    /// 認可URLをブラウザで自動的に開くか（falseならログに出すだけ）
    pub open_browser: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_path: PathBuf::from("token.json"),
            client_secret_path: PathBuf::from("credentials.json"),
            scopes: vec![SHEETS_READONLY_SCOPE.to_string()],
            open_browser: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub file_stem: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            file_stem: "PulledDataPage".to_string(),
        }
    }
}

/// データの取得元の種類
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Google Sheets API
    #[default]
    Sheets,
    /// ローカルの`.xlsx`
    Workbook,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// `kind = "workbook"`のときのファイルパス
    pub path: Option<PathBuf>,
}

impl Config {
    /// 埋め込みのデフォルト設定
    pub fn embedded() -> Result<Self, PullDataError> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    pub fn from_toml(contents: &str) -> Result<Self, PullDataError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// 設定ファイルを読み込む
    ///
    /// 検索順序:
    /// 1. `path`が存在すればそのファイル
    /// 2. 存在しなければ埋め込みのデフォルト設定
    pub fn load(path: &Path) -> Result<Self, PullDataError> {
        if path.exists() {
            tracing::info!("Loading config from: {}", path.display());
            let contents = std::fs::read_to_string(path)?;
            return Self::from_toml(&contents);
        }

        tracing::info!("Using default embedded configuration");
        Self::embedded()
    }

    /// カレントディレクトリの`pulldata.toml`を読み込む
    pub fn load_default_location() -> Result<Self, PullDataError> {
        Self::load(Path::new(CONFIG_FILE_NAME))
    }

    fn validate(&self) -> Result<(), PullDataError> {
        if self.sheets.spreadsheet_id.trim().is_empty() {
            return Err(PullDataError::Config(
                "sheets.spreadsheet_id must not be empty".to_string(),
            ));
        }
        if self.auth.scopes.is_empty() {
            return Err(PullDataError::Config(
                "auth.scopes must contain at least one scope".to_string(),
            ));
        }
        if self.source.kind == SourceKind::Workbook && self.source.path.is_none() {
            return Err(PullDataError::Config(
                "source.path is required when source.kind = \"workbook\"".to_string(),
            ));
        }
        Ok(())
    }
}
