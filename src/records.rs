//! Records Module
//!
//! 取得した行（位置依存のセル列）を、カテゴリごとの名前付きレコードに変換するモジュール。
//! 列の位置と意味の対応は`ColumnMap`に集約し、テンプレート側は列順序に依存しません。

use crate::api::Category;
use crate::error::PullDataError;
use crate::types::{col_index_to_letter, Row};

/// カテゴリごとの列マッピング（フィールド名 → 列インデックス）
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    category: Category,
    columns: &'static [(&'static str, usize)],
}

const ORGANIZATION_COLUMNS: &[(&str, usize)] = &[("name", 0), ("image_url", 1)];
const FEDERAL_COLUMNS: &[(&str, usize)] = &[
    ("name", 0),
    ("location", 2),
    ("title", 4),
    ("image_url", 5),
];
const LISTED_COLUMNS: &[(&str, usize)] = &[("name", 0), ("position", 1), ("group", 2)];
const EDUCATION_COLUMNS: &[(&str, usize)] = &[("name", 0), ("position", 1), ("status", 4)];

impl ColumnMap {
    pub fn for_category(category: Category) -> Self {
        let columns = match category {
            Category::Organizations => ORGANIZATION_COLUMNS,
            Category::FederalStaff => FEDERAL_COLUMNS,
            Category::StateCountyStaff | Category::CityStaff => LISTED_COLUMNS,
            Category::EducationStaff => EDUCATION_COLUMNS,
        };
        Self { category, columns }
    }

    /// 必要な最小セル数（参照する最大列インデックス + 1）
    pub fn required_cells(&self) -> usize {
        self.columns.iter().map(|(_, idx)| idx + 1).max().unwrap_or(0)
    }

    /// フィールド名と列文字（例: `image_url (F)`）の一覧
    pub fn describe(&self) -> String {
        self.columns
            .iter()
            .map(|(field, idx)| format!("{} ({})", field, col_index_to_letter(*idx as u32)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// 行からフィールドの値を取り出す
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - セルが存在する場合、その値
    /// * `Err(PullDataError::MissingCell)` - 行が短くセルが存在しない場合
    ///
    /// フィールド名がマッピングに存在しないのはプログラムの誤りなので`Config`エラーとします。
    pub fn cell(
        &self,
        row: &[String],
        row_index: usize,
        field: &'static str,
    ) -> Result<String, PullDataError> {
        let column = self
            .columns
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, idx)| *idx)
            .ok_or_else(|| {
                PullDataError::Config(format!(
                    "no column mapped for field '{}' in {}",
                    field,
                    self.category.name()
                ))
            })?;

        row.get(column)
            .cloned()
            .ok_or_else(|| PullDataError::MissingCell {
                category: self.category.name().to_string(),
                row: row_index,
                column,
                field,
                found: row.len(),
            })
    }
}

/// 行からレコードへの変換
pub trait Record: Sized {
    /// 行をレコードに変換
    ///
    /// 州・郡職員と市職員は同じレコード型を共有するため、呼び出し側が`ColumnMap`を渡します。
    fn from_row(map: &ColumnMap, row: &[String], row_index: usize) -> Result<Self, PullDataError>;

    /// コンソール表示用のカンマ区切りプレビュー
    fn preview(&self) -> String;
}

/// 団体（Organizations）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub name: String,
    pub image_url: String,
}

impl Record for Organization {
    fn from_row(map: &ColumnMap, row: &[String], row_index: usize) -> Result<Self, PullDataError> {
        Ok(Self {
            name: map.cell(row, row_index, "name")?,
            image_url: map.cell(row, row_index, "image_url")?,
        })
    }

    fn preview(&self) -> String {
        format!("{}, {}", self.name, self.image_url)
    }
}

/// 連邦職員（Federal Staff）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederalStaff {
    pub name: String,
    pub location: String,
    /// カード上部の肩書き（`<p class="superheader">`）
    pub title: String,
    pub image_url: String,
}

impl Record for FederalStaff {
    fn from_row(map: &ColumnMap, row: &[String], row_index: usize) -> Result<Self, PullDataError> {
        Ok(Self {
            name: map.cell(row, row_index, "name")?,
            location: map.cell(row, row_index, "location")?,
            title: map.cell(row, row_index, "title")?,
            image_url: map.cell(row, row_index, "image_url")?,
        })
    }

    fn preview(&self) -> String {
        format!("{}, {}, {}", self.name, self.location, self.image_url)
    }
}

/// 州・郡職員および市職員（リスト表示）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedStaff {
    pub name: String,
    pub position: String,
    pub group: String,
}

impl Record for ListedStaff {
    fn from_row(map: &ColumnMap, row: &[String], row_index: usize) -> Result<Self, PullDataError> {
        Ok(Self {
            name: map.cell(row, row_index, "name")?,
            position: map.cell(row, row_index, "position")?,
            group: map.cell(row, row_index, "group")?,
        })
    }

    fn preview(&self) -> String {
        format!("{}, {}, {}", self.name, self.position, self.group)
    }
}

/// 教育関係職員（Education Staff）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EducationStaff {
    pub name: String,
    pub position: String,
    pub status: String,
}

impl EducationStaff {
    /// ステータスが完全一致で`Pending`の場合のみ保留扱い
    pub fn is_pending(&self) -> bool {
        self.status == "Pending"
    }
}

impl Record for EducationStaff {
    fn from_row(map: &ColumnMap, row: &[String], row_index: usize) -> Result<Self, PullDataError> {
        Ok(Self {
            name: map.cell(row, row_index, "name")?,
            position: map.cell(row, row_index, "position")?,
            status: map.cell(row, row_index, "status")?,
        })
    }

    fn preview(&self) -> String {
        format!("{}, {}", self.name, self.position)
    }
}

/// 全カテゴリのレコード
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub organizations: Vec<Organization>,
    pub federal_staff: Vec<FederalStaff>,
    pub state_county_staff: Vec<ListedStaff>,
    pub city_staff: Vec<ListedStaff>,
    pub education_staff: Vec<EducationStaff>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// カテゴリの行をレコードに変換して格納する
    ///
    /// 1行でもセルが不足していれば`MissingCell`を返し、何も格納しません。
    pub fn insert_rows(&mut self, category: Category, rows: &[Row]) -> Result<(), PullDataError> {
        let map = ColumnMap::for_category(category);
        match category {
            Category::Organizations => self.organizations = parse_all(&map, rows)?,
            Category::FederalStaff => self.federal_staff = parse_all(&map, rows)?,
            Category::StateCountyStaff => self.state_county_staff = parse_all(&map, rows)?,
            Category::CityStaff => self.city_staff = parse_all(&map, rows)?,
            Category::EducationStaff => self.education_staff = parse_all(&map, rows)?,
        }
        Ok(())
    }

    /// カテゴリのレコード数
    pub fn len(&self, category: Category) -> usize {
        match category {
            Category::Organizations => self.organizations.len(),
            Category::FederalStaff => self.federal_staff.len(),
            Category::StateCountyStaff => self.state_county_staff.len(),
            Category::CityStaff => self.city_staff.len(),
            Category::EducationStaff => self.education_staff.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.len(*c) == 0)
    }
}

fn parse_all<T: Record>(map: &ColumnMap, rows: &[Row]) -> Result<Vec<T>, PullDataError> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| T::from_row(map, row, idx))
        .collect()
}
