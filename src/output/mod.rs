//! Output Module
//!
//! カテゴリごとのセクション出力を提供するモジュール。
//! 各セクションはロケールごとの出力先（`LocaleMap<W>`）すべてに同時に書き込まれます。

mod files;
mod sections;

use crate::api::{Category, Locale, LocaleMap};
use crate::error::PullDataError;
use crate::records::{ColumnMap, Dataset, Record};
use std::io::Write;

pub use files::OutputSet;

/// セクション出力の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionStats {
    pub category: Category,
    /// 出力した行数
    pub rendered: usize,
    /// スキップした行数（教育関係職員の`Pending`）
    pub skipped: usize,
}

/// コンソールプレビューの列見出し
fn preview_columns(category: Category) -> &'static str {
    match category {
        Category::Organizations => "Name, Image Link",
        Category::FederalStaff => "Name, Location, Image Link",
        Category::StateCountyStaff | Category::CityStaff => "Name, Position, Category",
        Category::EducationStaff => "Name, Position",
    }
}

/// 1つのセクションをすべてのロケールの出力先に書き込む
///
/// 行の書式はカテゴリごとに`match`で切り替えます。
///
/// # 引数
///
/// * `category` - 出力するセクション
/// * `dataset` - 出力するレコード
/// * `sinks` - ロケールごとの出力先
/// * `first` - 文書の最初のセクションかどうか（`<details>`前の改行の有無）
///
/// # 戻り値
///
/// * `Ok(SectionStats)` - 出力に成功した場合
/// * `Err(PullDataError)` - 書き込みエラーが発生した場合
pub fn render_section<W: Write>(
    category: Category,
    dataset: &Dataset,
    sinks: &mut LocaleMap<W>,
    first: bool,
) -> Result<SectionStats, PullDataError> {
    let layout = category.layout();

    // 1. <details> と見出し
    let details = if first {
        sections::DETAILS_OPEN_FIRST
    } else {
        sections::DETAILS_OPEN
    };
    for (locale, sink) in sinks.iter_mut() {
        sink.write_all(details.as_bytes())?;
        sink.write_all(sections::section_open(layout, category.caption(locale)).as_bytes())?;
    }

    tracing::info!("{}", category.name());
    tracing::info!("{}", preview_columns(category));
    tracing::debug!(
        "{} columns: {}",
        category.name(),
        ColumnMap::for_category(category).describe()
    );

    // 2. 行（全ロケール共通）
    let mut stats = SectionStats {
        category,
        rendered: 0,
        skipped: 0,
    };
    match category {
        Category::Organizations => {
            for org in &dataset.organizations {
                tracing::info!("{}", org.preview());
                write_fragment(sinks, &sections::organization_card(org))?;
                stats.rendered += 1;
            }
        }
        Category::FederalStaff => {
            for staff in &dataset.federal_staff {
                tracing::info!("{}", staff.preview());
                write_fragment(sinks, &sections::federal_card(staff))?;
                stats.rendered += 1;
            }
        }
        Category::StateCountyStaff | Category::CityStaff => {
            let staff = if category == Category::CityStaff {
                &dataset.city_staff
            } else {
                &dataset.state_county_staff
            };
            for person in staff {
                tracing::info!("{}", person.preview());
                write_fragment(sinks, &sections::list_item(&person.position, &person.name))?;
                stats.rendered += 1;
            }
        }
        Category::EducationStaff => {
            for person in &dataset.education_staff {
                if person.is_pending() {
                    tracing::info!("Status \"Pending\": {}", person.preview());
                    stats.skipped += 1;
                    continue;
                }
                tracing::info!("{}", person.preview());
                write_fragment(sinks, &sections::list_item(&person.position, &person.name))?;
                stats.rendered += 1;
            }
        }
    }

    // 3. 末尾
    write_fragment(sinks, sections::section_close(layout))?;

    Ok(stats)
}

/// ロケールに依存しない断片をすべての出力先に書き込む
fn write_fragment<W: Write>(sinks: &mut LocaleMap<W>, fragment: &str) -> Result<(), PullDataError> {
    for (_, sink) in sinks.iter_mut() {
        sink.write_all(fragment.as_bytes())?;
    }
    Ok(())
}

/// 全カテゴリを固定順序で出力する
///
/// 各セクションはすべてのロケールに書き込まれてから次のセクションに進みます。
/// 最後に各出力先をフラッシュします。
pub fn render_dataset<W: Write>(
    dataset: &Dataset,
    sinks: &mut LocaleMap<W>,
) -> Result<Vec<SectionStats>, PullDataError> {
    let mut stats = Vec::with_capacity(Category::ALL.len());
    for (idx, category) in Category::ALL.into_iter().enumerate() {
        stats.push(render_section(category, dataset, sinks, idx == 0)?);
    }
    for (_, sink) in sinks.iter_mut() {
        sink.flush()?;
    }
    Ok(stats)
}

/// 出力先をメモリ上のバッファとして用意する
pub(crate) fn memory_sinks() -> LocaleMap<Vec<u8>> {
    LocaleMap::from_fn(|_: Locale| Vec::new())
}
