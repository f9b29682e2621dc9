//! Builder Module
//!
//! Fluent Builder APIを提供し、`Publisher`インスタンスを段階的に構築する。

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::api::{Category, FetchStatus, LocaleMap};
use crate::error::PullDataError;
use crate::fetch::{fetch_category, RowSource};
use crate::output::{self, OutputSet, SectionStats};
use crate::records::Dataset;

/// 出力処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct PublishConfig {
    /// 出力ディレクトリ
    pub output_dir: PathBuf,

    /// 出力ファイル名の語幹
    pub file_stem: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_stem: "PulledDataPage".to_string(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// # 使用例
///
/// ```rust,no_run
/// use pulldata::PublisherBuilder;
///
/// # fn main() -> Result<(), pulldata::PullDataError> {
/// let publisher = PublisherBuilder::new()
///     .with_output_dir("public")
///     .with_file_stem("PulledDataPage")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct PublisherBuilder {
    config: PublishConfig,
}

impl PublisherBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 出力ディレクトリ: カレントディレクトリ
    /// - ファイル名の語幹: `PulledDataPage`
    pub fn new() -> Self {
        Self::default()
    }

    /// 出力ディレクトリを指定する
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// 出力ファイル名の語幹を指定する（`{stem}_{locale}.html`）
    pub fn with_file_stem(mut self, stem: impl Into<String>) -> Self {
        self.config.file_stem = stem.into();
        self
    }

    /// 設定を検証し、`Publisher`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Publisher)` - 設定が有効な場合
    /// * `Err(PullDataError::Config)` - 以下の場合
    ///   * ファイル名の語幹が空、またはパス区切り文字を含む
    ///   * 出力ディレクトリがディレクトリ以外の既存ファイルを指している
    pub fn build(self) -> Result<Publisher, PullDataError> {
        let stem = &self.config.file_stem;
        if stem.trim().is_empty() {
            return Err(PullDataError::Config(
                "File stem must not be empty".to_string(),
            ));
        }
        if stem.contains(['/', '\\']) {
            return Err(PullDataError::Config(format!(
                "File stem must not contain path separators: '{}'",
                stem
            )));
        }

        let dir = &self.config.output_dir;
        if dir.exists() && !dir.is_dir() {
            return Err(PullDataError::Config(format!(
                "Output path is not a directory: {}",
                dir.display()
            )));
        }

        Ok(Publisher {
            config: self.config,
        })
    }
}

/// カテゴリごとの取得状況
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    pub category: Category,
    pub status: FetchStatus,
}

/// 取得とレコード変換の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected {
    pub dataset: Dataset,
    /// `Category::ALL`の順
    pub fetches: Vec<FetchReport>,
}

/// `Publisher::publish`の結果
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReport {
    /// 書き込んだファイル
    pub files: LocaleMap<PathBuf>,
    pub fetches: Vec<FetchReport>,
    pub sections: Vec<SectionStats>,
}

impl PublishReport {
    /// 取得に失敗し、空として出力したカテゴリ
    pub fn failed_categories(&self) -> Vec<Category> {
        self.fetches
            .iter()
            .filter(|f| f.status.is_failed())
            .map(|f| f.category)
            .collect()
    }
}

/// 取得・出力処理のファサード
///
/// # 使用例
///
/// ```rust,no_run
/// use pulldata::{PublisherBuilder, WorkbookSource};
///
/// # fn main() -> Result<(), pulldata::PullDataError> {
/// let publisher = PublisherBuilder::new().build()?;
/// let mut source = WorkbookSource::open("export.xlsx")?;
/// let report = publisher.publish(&mut source)?;
/// println!("{}", report.files.get(pulldata::Locale::En).display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Publisher {
    config: PublishConfig,
}

impl Publisher {
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    pub fn file_stem(&self) -> &str {
        &self.config.file_stem
    }

    /// 5つの範囲を順に取得し、レコードに変換する
    ///
    /// 取得の失敗は`FetchReport`に記録して空として扱います。
    /// セルが不足している行があれば`PullDataError::MissingCell`を返します。
    pub fn collect<S: RowSource + ?Sized>(&self, source: &mut S) -> Result<Collected, PullDataError> {
        // 1. すべての範囲を取得
        let mut fetched = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            fetched.push(fetch_category(source, category)?);
        }

        // 2. レコードに変換（出力前に全行を検証する）
        let mut dataset = Dataset::new();
        let mut fetches = Vec::with_capacity(fetched.len());
        for fetch in fetched {
            dataset.insert_rows(fetch.category, &fetch.rows)?;
            tracing::debug!(
                "{}: {} records ({} cells per row)",
                fetch.category,
                dataset.len(fetch.category),
                fetch.category.required_cells()
            );
            fetches.push(FetchReport {
                category: fetch.category,
                status: fetch.status,
            });
        }

        Ok(Collected { dataset, fetches })
    }

    /// 任意の出力先（ロケールごと）に全セクションを書き込む
    pub fn render_to<W: Write>(
        &self,
        dataset: &Dataset,
        sinks: &mut LocaleMap<W>,
    ) -> Result<Vec<SectionStats>, PullDataError> {
        output::render_dataset(dataset, sinks)
    }

    /// 全セクションをロケールごとの`String`として出力する
    pub fn render_to_strings(&self, dataset: &Dataset) -> Result<LocaleMap<String>, PullDataError> {
        let mut sinks = output::memory_sinks();
        self.render_to(dataset, &mut sinks)?;
        Ok(sinks.map(|_, buf| String::from_utf8_lossy(&buf).into_owned()))
    }

    /// 取得から出力ファイルの書き込みまでを実行する
    ///
    /// # 処理フロー
    ///
    /// 1. 5つの範囲を取得し、レコードに変換
    /// 2. 出力ディレクトリに一時ファイルを作成
    /// 3. 全セクションを全ロケールに書き込む
    /// 4. 一時ファイルを最終的なファイル名に置き換える
    ///
    /// どの段階で失敗しても、既存の出力ファイルは変更されません。
    pub fn publish<S: RowSource + ?Sized>(
        &self,
        source: &mut S,
    ) -> Result<PublishReport, PullDataError> {
        let Collected { dataset, fetches } = self.collect(source)?;
        if dataset.is_empty() {
            tracing::warn!("No records fetched; every section will be empty");
        }

        let mut output = OutputSet::create(&self.config.output_dir, &self.config.file_stem)?;
        for (locale, target) in output.targets().iter() {
            tracing::debug!("Rendering {} output for {}", locale, target.display());
        }
        let sections = self.render_to(&dataset, output.sinks())?;
        let files = output.commit()?;

        for (locale, path) in files.iter() {
            tracing::info!("Wrote {} output: {}", locale, path.display());
        }

        Ok(PublishReport {
            files,
            fetches,
            sections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Locale;
    use crate::types::Row;
    use std::collections::HashMap;

    /// 範囲ごとに固定の結果を返す取得元
    #[derive(Default)]
    struct FixedSource {
        ranges: HashMap<&'static str, Vec<Row>>,
        failing: Vec<&'static str>,
        calls: Vec<String>,
    }

    impl FixedSource {
        fn with(mut self, category: Category, rows: &[&[&str]]) -> Self {
            self.ranges.insert(
                category.range(),
                rows.iter()
                    .map(|r| r.iter().map(|c| c.to_string()).collect())
                    .collect(),
            );
            self
        }

        fn failing(mut self, category: Category) -> Self {
            self.failing.push(category.range());
            self
        }
    }

    impl RowSource for FixedSource {
        fn fetch_range(&mut self, range: &str) -> Result<Vec<Row>, PullDataError> {
            self.calls.push(range.to_string());
            if self.failing.contains(&range) {
                return Err(PullDataError::Fetch {
                    range: range.to_string(),
                    message: "HTTP 503".to_string(),
                });
            }
            Ok(self.ranges.get(range).cloned().unwrap_or_default())
        }
    }

    #[test]
    fn test_builder_defaults() {
        let publisher = PublisherBuilder::new().build().unwrap();
        assert_eq!(publisher.output_dir(), Path::new("."));
        assert_eq!(publisher.file_stem(), "PulledDataPage");
    }

    #[test]
    fn test_builder_rejects_bad_stem() {
        let result = PublisherBuilder::new().with_file_stem("").build();
        assert!(matches!(result, Err(PullDataError::Config(_))));

        let result = PublisherBuilder::new().with_file_stem("a/b").build();
        assert!(matches!(result, Err(PullDataError::Config(_))));
    }

    #[test]
    fn test_builder_rejects_file_as_output_dir() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = PublisherBuilder::new().with_output_dir(file.path()).build();
        assert!(matches!(result, Err(PullDataError::Config(_))));
    }

    #[test]
    fn test_collect_fetches_in_order_and_reports_status() {
        let mut source = FixedSource::default()
            .with(Category::Organizations, &[&["Acme Org", "http://img/a.png"]])
            .failing(Category::CityStaff);

        let publisher = PublisherBuilder::new().build().unwrap();
        let collected = publisher.collect(&mut source).unwrap();

        let expected: Vec<String> = Category::ALL.iter().map(|c| c.range().to_string()).collect();
        assert_eq!(source.calls, expected);

        assert_eq!(collected.dataset.organizations.len(), 1);
        let statuses: Vec<&FetchStatus> = collected.fetches.iter().map(|f| &f.status).collect();
        assert_eq!(statuses[0], &FetchStatus::Fetched(1));
        assert_eq!(statuses[1], &FetchStatus::Empty);
        assert!(statuses[3].is_failed());
    }

    #[test]
    fn test_collect_short_row_is_fatal() {
        let mut source = FixedSource::default()
            .with(Category::FederalStaff, &[&["Jane Doe", "", "DC", "", "Senator"]]);
        let publisher = PublisherBuilder::new().build().unwrap();

        let err = publisher.collect(&mut source).unwrap_err();
        match err {
            PullDataError::MissingCell {
                row, column, found, ..
            } => {
                assert_eq!(row, 0);
                assert_eq!(column, 5);
                assert_eq!(found, 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_render_to_strings() {
        let mut source = FixedSource::default()
            .with(Category::CityStaff, &[&["Kim", "Mayor", "City"]]);
        let publisher = PublisherBuilder::new().build().unwrap();
        let collected = publisher.collect(&mut source).unwrap();

        let out = publisher.render_to_strings(&collected.dataset).unwrap();
        for (_, html) in out.iter() {
            assert!(html.contains("<li>Mayor Kim</li>"));
        }
        assert!(out.get(Locale::Vi).contains("Nhân viên thành phố"));
    }

    #[test]
    fn test_publish_writes_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FixedSource::default()
            .with(Category::Organizations, &[&["Acme Org", "http://img/a.png"]])
            .failing(Category::EducationStaff);

        let publisher = PublisherBuilder::new()
            .with_output_dir(dir.path())
            .with_file_stem("Page")
            .build()
            .unwrap();
        let report = publisher.publish(&mut source).unwrap();

        for locale in Locale::ALL {
            let path = dir.path().join(locale.file_name("Page"));
            assert_eq!(report.files.get(locale), &path);
            let html = std::fs::read_to_string(&path).unwrap();
            assert!(html.contains("<h5 class=\"card-title\">Acme Org</h5>"));
        }
        assert_eq!(report.failed_categories(), vec![Category::EducationStaff]);
        assert_eq!(report.sections.len(), 5);
    }

    #[test]
    fn test_publish_failure_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FixedSource::default()
            .with(Category::EducationStaff, &[&["Ann", "Trustee"]]);
        let publisher = PublisherBuilder::new()
            .with_output_dir(dir.path())
            .build()
            .unwrap();

        assert!(publisher.publish(&mut source).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
