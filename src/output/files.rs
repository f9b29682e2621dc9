//! Output Files
//!
//! ロケールごとの出力ファイルを一時ファイルとして作成し、
//! すべてのセクションの出力に成功した場合のみ最終的なファイル名に置き換える。
//! 途中で失敗した場合、一時ファイルはドロップ時に削除され、既存の出力は変更されません。

use crate::api::LocaleMap;
use crate::error::PullDataError;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// ロケールごとの出力ファイルの組
///
/// # 使用例
///
/// ```rust,no_run
/// use pulldata::{OutputSet, PullDataError};
/// use std::io::Write;
/// use std::path::Path;
///
/// # fn main() -> Result<(), PullDataError> {
/// let mut output = OutputSet::create(Path::new("."), "PulledDataPage")?;
/// for (_, sink) in output.sinks().iter_mut() {
///     sink.write_all(b"<details></details>")?;
/// }
/// let written = output.commit()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OutputSet {
    targets: LocaleMap<PathBuf>,
    writers: LocaleMap<BufWriter<NamedTempFile>>,
}

impl OutputSet {
    /// 出力ディレクトリ内に一時ファイルを作成する
    ///
    /// # 引数
    ///
    /// * `dir` - 出力ディレクトリ（存在しなければエラー）
    /// * `stem` - ファイル名の語幹（例: `PulledDataPage` → `PulledDataPage_en.html`）
    pub fn create(dir: &Path, stem: &str) -> Result<Self, PullDataError> {
        let targets = LocaleMap::from_fn(|locale| dir.join(locale.file_name(stem)));
        // 同じディレクトリに作成し、persist()がrenameで完結するようにする
        let writers = LocaleMap::try_from_fn(|locale| {
            let prefix = format!(".{}_{}.", stem, locale.tag());
            let mut builder = tempfile::Builder::new();
            builder.prefix(&prefix).suffix(".tmp");
            // 通常のファイル作成と同じくumaskを適用させる
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                builder.permissions(std::fs::Permissions::from_mode(0o666));
            }
            builder.tempfile_in(dir).map(BufWriter::new)
        })?;

        Ok(Self { targets, writers })
    }

    /// ロケールごとの書き込み先
    pub fn sinks(&mut self) -> &mut LocaleMap<BufWriter<NamedTempFile>> {
        &mut self.writers
    }

    /// 最終的な出力先パス
    pub fn targets(&self) -> &LocaleMap<PathBuf> {
        &self.targets
    }

    /// すべての一時ファイルをフラッシュし、最終的なファイル名に置き換える
    ///
    /// # 戻り値
    ///
    /// * `Ok(LocaleMap<PathBuf>)` - 書き込んだファイルのパス
    /// * `Err(PullDataError::Io)` - フラッシュまたは置き換えに失敗した場合
    pub fn commit(self) -> Result<LocaleMap<PathBuf>, PullDataError> {
        let Self { targets, writers } = self;

        // 先にすべてフラッシュし、1つでも失敗すれば何も置き換えない
        let mut temps = writers.try_map(|_, mut writer| {
            writer.flush()?;
            writer.into_inner().map_err(|e| e.into_error())
        })?;

        for (locale, temp) in temps.iter_mut() {
            temp.as_file().sync_all()?;
            inherit_permissions(temp, targets.get(locale))?;
            tracing::debug!("Prepared {} output at {}", locale, temp.path().display());
        }

        temps.try_map(|locale, temp| {
            let target = targets.get(locale).clone();
            temp.persist(&target).map_err(|e| PullDataError::Io(e.error))?;
            Ok(target)
        })
    }
}

/// 置き換え対象のファイルが既にあれば、その権限を一時ファイルに引き継ぐ
fn inherit_permissions(temp: &NamedTempFile, target: &Path) -> Result<(), PullDataError> {
    match std::fs::metadata(target) {
        Ok(meta) => temp.as_file().set_permissions(meta.permissions())?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
