//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// pulldataクレート全体で使用するエラー型
///
/// 認証、データ取得、レコード変換、HTML出力の各段階で発生する
/// すべてのエラーを統一的に扱うために使用されます。
///
/// # 致命的なエラーと回復可能なエラー
///
/// - `Fetch`: カテゴリ単位の取得失敗。パイプラインは「データなし」として継続します。
/// - それ以外: 実行を中断します（`is_fatal()`が`true`を返す）。
///
/// # 使用例
///
/// ```rust,no_run
/// use pulldata::PullDataError;
/// use std::fs::File;
///
/// fn open_token(path: &str) -> Result<(), PullDataError> {
///     let _file = File::open(path)?;  // Ioエラーが自動的に変換される
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum PullDataError {
    /// I/O操作中に発生したエラー
    ///
    /// 出力ファイルの作成・書き込み、トークンファイルの読み書きなどで
    /// `std::io::Error`が発生した場合に使用されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP通信中に発生したエラー（reqwest由来）
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSONのシリアライズ・デシリアライズエラー
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ローカルのワークブック（.xlsx）の読み込みエラー（calamine由来）
    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// 設定ファイルの解析エラー
    #[error("Failed to parse config file: {0}")]
    ConfigFile(#[from] toml::de::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `PublisherBuilder::build()`時や設定ファイル読み込み時に、
    /// 無効な値が検出された場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// 認証情報を取得・更新できなかったエラー
    ///
    /// 対話的な認可フローの拒否、トークン更新の失敗、
    /// クライアントシークレットの欠落などが原因となります。
    #[error("Authorization failed: {0}")]
    Auth(String),

    /// リモートからの範囲取得に失敗したエラー
    ///
    /// このエラーだけは回復可能として扱われ、該当カテゴリは空として出力されます。
    #[error("Failed to fetch range '{range}': {message}")]
    Fetch {
        /// 取得対象の範囲（A1記法）
        range: String,
        /// 失敗の詳細
        message: String,
    },

    /// 行に必要なセルが不足しているエラー
    ///
    /// カテゴリのテンプレートが参照する列が行に存在しない場合に発生します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use pulldata::PullDataError;
    ///
    /// let error = PullDataError::MissingCell {
    ///     category: "Federal Staff".to_string(),
    ///     row: 3,
    ///     column: 5,
    ///     field: "image_url",
    ///     found: 4,
    /// };
    ///
    /// println!("{}", error);
    /// ```
    #[error(
        "{category} row {row} is missing column {column} ({field}): only {found} cell(s) present"
    )]
    MissingCell {
        /// カテゴリの表示名
        category: String,
        /// 行番号（範囲内で0始まり）
        row: usize,
        /// 不足している列インデックス（0始まり）
        column: usize,
        /// 列に対応するフィールド名
        field: &'static str,
        /// 行に実際に存在したセル数
        found: usize,
    },

    /// A1記法の範囲指定が不正なエラー
    #[error("Invalid range: {0}")]
    InvalidRange(String),
}

impl PullDataError {
    /// 実行を中断すべきエラーかどうかを判定
    ///
    /// `Fetch`のみが回復可能で、それ以外はすべて致命的です。
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PullDataError::Fetch { .. })
    }
}
