//! Data Fetcher
//!
//! 名前付き範囲（A1記法）から行を取得するモジュール。
//!
//! - `SheetsClient`: Google Sheets API v4（`spreadsheets.values.get`）から取得
//! - `WorkbookSource`: 同じスプレッドシートを書き出したローカルの`.xlsx`から取得（calamine）
//!
//! どちらも`RowSource`トレイトを実装し、`fetch_category()`が取得失敗を
//! 「データなし」に縮退させつつ、`FetchStatus`として観測可能にします。

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::time::Duration;

use crate::api::{Category, FetchStatus};
use crate::auth::Credential;
use crate::error::PullDataError;
use crate::types::{A1Range, Row};

/// 行の取得元
pub trait RowSource {
    /// 範囲内の行を元の順序のまま返す
    ///
    /// 範囲にデータがない場合は空の`Vec`を返します（エラーではありません）。
    fn fetch_range(&mut self, range: &str) -> Result<Vec<Row>, PullDataError>;
}

/// カテゴリ単位の取得結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFetch {
    pub category: Category,
    pub rows: Vec<Row>,
    pub status: FetchStatus,
}

/// カテゴリの範囲を取得する
///
/// 取得元のエラーのうち回復可能なもの（`PullDataError::Fetch`）は警告ログを出力して
/// 空の結果に縮退させ、`FetchStatus::Failed`として報告します。
/// それ以外のエラーはそのまま返します。
pub fn fetch_category<S: RowSource + ?Sized>(
    source: &mut S,
    category: Category,
) -> Result<CategoryFetch, PullDataError> {
    let range = category.range();
    tracing::debug!("Fetching {}", range);

    let (rows, status) = match source.fetch_range(range) {
        Ok(rows) if rows.is_empty() => {
            tracing::info!("No data found. ({})", range);
            (rows, FetchStatus::Empty)
        }
        Ok(rows) => {
            let count = rows.len();
            (rows, FetchStatus::Fetched(count))
        }
        Err(e) if !e.is_fatal() => {
            tracing::warn!("{}; rendering {} as empty", e, category.name());
            (Vec::new(), FetchStatus::Failed(e.to_string()))
        }
        Err(e) => return Err(e),
    };

    Ok(CategoryFetch {
        category,
        rows,
        status,
    })
}

/// Google Sheets API v4 クライアント
///
/// 1つの固定スプレッドシートに対して、読み取り専用で範囲を取得します。
#[derive(Debug)]
pub struct SheetsClient {
    http: reqwest::blocking::Client,
    base_url: String,
    spreadsheet_id: String,
    access_token: String,
}

impl SheetsClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://sheets.googleapis.com/v4/spreadsheets";

    /// 有効な認証情報を使ってクライアントを生成する
    pub fn new(spreadsheet_id: &str, credential: &Credential) -> Result<Self, PullDataError> {
        let access_token = credential
            .access_token()
            .ok_or_else(|| PullDataError::Auth("credential has no access token".to_string()))?
            .to_string();

        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            access_token,
        })
    }

    /// APIのベースURLを差し替える（末尾の`/`は除去）
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// 範囲取得のURL
    pub fn values_url(&self, range: &str) -> String {
        format!(
            "{}/{}/values/{}",
            self.base_url,
            urlencoding::encode(&self.spreadsheet_id),
            urlencoding::encode(range)
        )
    }
}

impl RowSource for SheetsClient {
    fn fetch_range(&mut self, range: &str) -> Result<Vec<Row>, PullDataError> {
        let fetch_error = |message: String| PullDataError::Fetch {
            range: range.to_string(),
            message,
        };

        let response = self
            .http
            .get(self.values_url(range))
            .bearer_auth(&self.access_token)
            .send()
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(fetch_error(format!("{} {}", status, api_error_message(&body))));
        }

        let value_range: ValueRange = response
            .json()
            .map_err(|e| fetch_error(format!("malformed response: {}", e)))?;
        tracing::debug!(
            "{} returned {} row(s)",
            value_range.range.as_deref().unwrap_or(range),
            value_range.values.len()
        );
        Ok(value_range.into_rows())
    }
}

/// `spreadsheets.values.get`のレスポンス
///
/// 範囲にデータがない場合、`values`フィールド自体が省略されます。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    pub(crate) fn into_rows(self) -> Vec<Row> {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(json_cell_to_string).collect())
            .collect()
    }
}

fn json_cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// エラーレスポンス（`{"error": {"code", "message", "status"}}`）からメッセージを取り出す
fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        #[serde(default)]
        message: String,
        #[serde(default)]
        status: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(b) if !b.error.status.is_empty() => format!("{}: {}", b.error.status, b.error.message),
        Ok(b) => b.error.message,
        Err(_) => body.trim().chars().take(200).collect(),
    }
}

/// ローカルの`.xlsx`ワークブックを取得元とする
///
/// Sheets APIと同じく、行末の空セルと範囲末尾の空行を除去して返します。
/// 存在しないシートの指定は回復可能な取得エラーとして扱います。
pub struct WorkbookSource<RS: Read + Seek> {
    workbook: Sheets<RS>,
}

impl WorkbookSource<BufReader<File>> {
    /// ファイルパスからワークブックを開く
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PullDataError> {
        let workbook = open_workbook_auto(path)?;
        Ok(Self { workbook })
    }
}

impl<RS: Read + Seek + Clone> WorkbookSource<RS> {
    /// メモリ上のデータなどからワークブックを開く
    pub fn from_reader(reader: RS) -> Result<Self, PullDataError> {
        let workbook = open_workbook_auto_from_rs(reader)?;
        Ok(Self { workbook })
    }
}

impl<RS: Read + Seek> RowSource for WorkbookSource<RS> {
    fn fetch_range(&mut self, range: &str) -> Result<Vec<Row>, PullDataError> {
        let a1 = A1Range::parse(range)?;

        let sheet = self
            .workbook
            .worksheet_range(&a1.sheet)
            .map_err(|e| PullDataError::Fetch {
                range: range.to_string(),
                message: e.to_string(),
            })?;

        // 空のシート
        let Some((max_row, max_col)) = sheet.end() else {
            return Ok(Vec::new());
        };
        let last_row = a1.end_row.map_or(max_row, |r| r.min(max_row));
        let last_col = a1.end_col.map_or(max_col, |c| c.min(max_col));
        if a1.start.row > last_row || a1.start.col > last_col {
            return Ok(Vec::new());
        }

        let mut rows: Vec<Row> = (a1.start.row..=last_row)
            .map(|r| {
                let mut cells: Row = (a1.start.col..=last_col)
                    .map(|c| sheet.get_value((r, c)).map(cell_to_string).unwrap_or_default())
                    .collect();
                while cells.last().is_some_and(|c| c.is_empty()) {
                    cells.pop();
                }
                cells
            })
            .collect();

        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }

        Ok(rows)
    }
}

/// セル値を表示用の文字列に変換
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{:?}", e),
        Data::Empty => String::new(),
        #[allow(unreachable_patterns)]
        _ => String::new(),
    }
}

/// 整数値の浮動小数点数は小数点なしで出力（`3.0` -> `3`）
fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}
