//! Public API Types
//!
//! 公開APIで使用する列挙型と、ロケールごとの固定マッピングを定義するモジュール。

use std::fmt;

/// 出力言語（ロケール）
///
/// 出力ファイルは各ロケールにつき1つ生成されます。
/// 行データ自体は翻訳されず、見出し（`<summary>`）のみがロケールごとに異なります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    /// 英語（`_en`）
    En,
    /// ベトナム語（`_vi`）
    Vi,
    /// スペイン語（`_es`）
    Es,
}

impl Locale {
    /// すべてのロケール（出力ファイルを開く順序）
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Vi, Locale::Es];

    /// ロケールタグ（ファイル名の接尾辞にも使用）
    pub fn tag(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Vi => "vi",
            Locale::Es => "es",
        }
    }

    /// 出力ファイル名を生成（例: `PulledDataPage` → `PulledDataPage_en.html`）
    pub fn file_name(self, stem: &str) -> String {
        format!("{}_{}.html", stem, self.tag())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// ロケールごとに1つの値を保持する固定マッピング
///
/// 3つの並列変数を個別に扱う代わりに、ロケールをキーとして汎用的に反復処理します。
///
/// # 使用例
///
/// ```rust
/// use pulldata::{Locale, LocaleMap};
///
/// let names = LocaleMap::from_fn(|locale| locale.file_name("Page"));
/// assert_eq!(names.get(Locale::Vi), "Page_vi.html");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocaleMap<T> {
    en: T,
    vi: T,
    es: T,
}

impl<T> LocaleMap<T> {
    /// 各ロケールについて関数を呼び出してマッピングを構築
    pub fn from_fn<F: FnMut(Locale) -> T>(mut f: F) -> Self {
        Self {
            en: f(Locale::En),
            vi: f(Locale::Vi),
            es: f(Locale::Es),
        }
    }

    /// 失敗し得る関数でマッピングを構築（最初のエラーで中断）
    pub fn try_from_fn<E, F: FnMut(Locale) -> Result<T, E>>(mut f: F) -> Result<Self, E> {
        Ok(Self {
            en: f(Locale::En)?,
            vi: f(Locale::Vi)?,
            es: f(Locale::Es)?,
        })
    }

    pub fn get(&self, locale: Locale) -> &T {
        match locale {
            Locale::En => &self.en,
            Locale::Vi => &self.vi,
            Locale::Es => &self.es,
        }
    }

    pub fn get_mut(&mut self, locale: Locale) -> &mut T {
        match locale {
            Locale::En => &mut self.en,
            Locale::Vi => &mut self.vi,
            Locale::Es => &mut self.es,
        }
    }

    /// `Locale::ALL`の順序で反復
    pub fn iter(&self) -> impl Iterator<Item = (Locale, &T)> {
        [
            (Locale::En, &self.en),
            (Locale::Vi, &self.vi),
            (Locale::Es, &self.es),
        ]
        .into_iter()
    }

    /// `Locale::ALL`の順序で可変参照を反復
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Locale, &mut T)> {
        [
            (Locale::En, &mut self.en),
            (Locale::Vi, &mut self.vi),
            (Locale::Es, &mut self.es),
        ]
        .into_iter()
    }

    /// 値を変換した新しいマッピングを返す
    pub fn map<U, F: FnMut(Locale, T) -> U>(self, mut f: F) -> LocaleMap<U> {
        LocaleMap {
            en: f(Locale::En, self.en),
            vi: f(Locale::Vi, self.vi),
            es: f(Locale::Es, self.es),
        }
    }

    /// 失敗し得る変換（最初のエラーで中断）
    pub fn try_map<U, E, F: FnMut(Locale, T) -> Result<U, E>>(
        self,
        mut f: F,
    ) -> Result<LocaleMap<U>, E> {
        Ok(LocaleMap {
            en: f(Locale::En, self.en)?,
            vi: f(Locale::Vi, self.vi)?,
            es: f(Locale::Es, self.es)?,
        })
    }
}

/// セクションのレイアウト
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionLayout {
    /// 画像付きカードのグリッド（`grid-profiles`）
    Grid,
    /// 箇条書きリスト（`list-container`）
    List,
}

/// データカテゴリ
///
/// 各カテゴリは固定のスプレッドシート範囲、必要セル数、
/// ロケールごとの見出しを持ちます。出力順序は`Category::ALL`の順序です。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// 団体
    Organizations,
    /// 連邦職員
    FederalStaff,
    /// 州・郡職員
    StateCountyStaff,
    /// 市職員
    CityStaff,
    /// 教育関係職員
    EducationStaff,
}

impl Category {
    /// すべてのカテゴリ（取得順序・出力順序）
    pub const ALL: [Category; 5] = [
        Category::Organizations,
        Category::FederalStaff,
        Category::StateCountyStaff,
        Category::CityStaff,
        Category::EducationStaff,
    ];

    /// 表示名（ログおよびエラーメッセージ用）
    pub fn name(self) -> &'static str {
        match self {
            Category::Organizations => "Organizations",
            Category::FederalStaff => "Federal Staff",
            Category::StateCountyStaff => "State and County Staff",
            Category::CityStaff => "City Staff",
            Category::EducationStaff => "Education Staff",
        }
    }

    /// 取得対象の範囲（A1記法、ヘッダー行を除く2行目から）
    pub fn range(self) -> &'static str {
        match self {
            Category::Organizations => "Organizations!A2:D",
            Category::FederalStaff => "Federal Staff!A2:J",
            Category::StateCountyStaff => "State and County Staff!A2:F",
            Category::CityStaff => "City Staff!A2:F",
            Category::EducationStaff => "Education Staff!A2:F",
        }
    }

    /// 1行あたりに必要な最小セル数（テンプレートが参照する最大列インデックス + 1）
    pub fn required_cells(self) -> usize {
        crate::records::ColumnMap::for_category(self).required_cells()
    }

    pub fn layout(self) -> SectionLayout {
        match self {
            Category::Organizations | Category::FederalStaff => SectionLayout::Grid,
            Category::StateCountyStaff | Category::CityStaff | Category::EducationStaff => {
                SectionLayout::List
            }
        }
    }

    /// ロケールごとの見出し（`<summary>`の中身）
    pub fn caption(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Category::Organizations, Locale::En) => "Organizations",
            (Category::Organizations, Locale::Vi) => "Các tổ chức",
            (Category::Organizations, Locale::Es) => "Organizaciones",
            (Category::FederalStaff, Locale::En) => "Federal Staff",
            (Category::FederalStaff, Locale::Vi) => "Nhân viên liên bang",
            (Category::FederalStaff, Locale::Es) => "Personal Federal",
            (Category::StateCountyStaff, Locale::En) => "State and County Staff",
            (Category::StateCountyStaff, Locale::Vi) => "Nhân viên Tiểu bang và Quận",
            (Category::StateCountyStaff, Locale::Es) => "Personal estatal y del condado",
            (Category::CityStaff, Locale::En) => "City Staff",
            (Category::CityStaff, Locale::Vi) => "Nhân viên thành phố",
            (Category::CityStaff, Locale::Es) => "Personal de la Ciudad",
            (Category::EducationStaff, Locale::En) => "Education Staff",
            (Category::EducationStaff, Locale::Vi) => "Nhân viên giáo dục",
            (Category::EducationStaff, Locale::Es) => "personal educativo",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// カテゴリ単位の取得結果
///
/// 取得失敗は「データなし」として扱われますが、正当に空だった範囲とは
/// 区別して報告されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// 1行以上取得できた（行数）
    Fetched(usize),
    /// 範囲にデータがなかった
    Empty,
    /// 取得に失敗し、空として扱った（エラーメッセージ）
    Failed(String),
}

impl FetchStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchStatus::Failed(_))
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStatus::Fetched(n) => write!(f, "{} row(s)", n),
            FetchStatus::Empty => f.write_str("no data"),
            FetchStatus::Failed(msg) => write!(f, "failed ({})", msg),
        }
    }
}
