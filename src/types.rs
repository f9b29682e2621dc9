//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use crate::error::PullDataError;

/// 1行分のセル値（左から順に並んだ文字列）
///
/// セルの意味は位置によってカテゴリごとに固定されており、自己記述的ではありません。
/// 位置と意味の対応は`records::ColumnMap`が一元管理します。
pub type Row = Vec<String>;

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// 列インデックスを文字列に変換（0 -> "A", 25 -> "Z", 26 -> "AA"）
pub fn col_index_to_letter(mut col: u32) -> String {
    let mut result = String::new();
    loop {
        let remainder = col % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}

/// 列文字列をインデックスに変換（"A" -> 0, "AA" -> 26）
///
/// 大文字・小文字を区別しません。英字以外を含む場合や空文字列の場合は`None`。
pub fn col_letter_to_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut index: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

/// A1記法の範囲指定（例: `Federal Staff!A2:J`）
///
/// 終了行を省略した場合（`A2:D`）はシートの最終行までを意味します。
/// シート名のみの場合（`Organizations`）はシート全体を意味します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    /// シート名（引用符は除去済み）
    pub sheet: String,
    /// 開始セル
    pub start: CellCoord,
    /// 終了列（含む）。`None`は最終列まで
    pub end_col: Option<u32>,
    /// 終了行（含む）。`None`は最終行まで
    pub end_row: Option<u32>,
}

impl A1Range {
    /// A1記法の文字列を解析
    ///
    /// # 対応する形式
    ///
    /// - `Sheet!A2:D`（終了行省略）
    /// - `Sheet!A2:D10`
    /// - `'Sheet ''quoted'''!B3:C`（引用符付きシート名）
    /// - `Sheet`（シート全体）
    ///
    /// # 戻り値
    ///
    /// * `Ok(A1Range)` - 解析に成功した場合
    /// * `Err(PullDataError::InvalidRange)` - 形式が不正な場合
    pub fn parse(spec: &str) -> Result<Self, PullDataError> {
        let invalid = |reason: &str| PullDataError::InvalidRange(format!("'{}': {}", spec, reason));

        let (sheet_part, cells_part) = match spec.rfind('!') {
            Some(pos) => (&spec[..pos], Some(&spec[pos + 1..])),
            None => (spec, None),
        };

        let sheet = unquote_sheet_name(sheet_part).ok_or_else(|| invalid("bad sheet name"))?;
        if sheet.is_empty() {
            return Err(invalid("empty sheet name"));
        }

        let Some(cells) = cells_part else {
            return Ok(Self {
                sheet,
                start: CellCoord::new(0, 0),
                end_col: None,
                end_row: None,
            });
        };

        let (start_ref, end_ref) = match cells.split_once(':') {
            Some((s, e)) => (s, Some(e)),
            None => (cells, None),
        };

        let (start_col, start_row) =
            parse_cell_ref(start_ref).ok_or_else(|| invalid("bad start cell"))?;
        let start = CellCoord::new(start_row.unwrap_or(0), start_col);

        let (end_col, end_row) = match end_ref {
            Some(e) => {
                let (col, row) = parse_cell_ref(e).ok_or_else(|| invalid("bad end cell"))?;
                (Some(col), row)
            }
            // 単一セル指定
            None => (Some(start_col), start_row),
        };

        if let Some(end_col) = end_col {
            if end_col < start.col {
                return Err(invalid("end column precedes start column"));
            }
        }
        if let Some(end_row) = end_row {
            if end_row < start.row {
                return Err(invalid("end row precedes start row"));
            }
        }

        Ok(Self {
            sheet,
            start,
            end_col,
            end_row,
        })
    }
}

/// セル参照（`A2`, `D`, `AB10`）を(列, 行)に分解
///
/// 行は1始まりの表記を0始まりに変換して返します。行番号省略時は`None`。
fn parse_cell_ref(s: &str) -> Option<(u32, Option<u32>)> {
    let split = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
    let (letters, digits) = s.split_at(split);
    let col = col_letter_to_index(letters)?;
    if digits.is_empty() {
        return Some((col, None));
    }
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((col, Some(row - 1)))
}

/// シート名の引用符を除去（`'It''s'` -> `It's`）
fn unquote_sheet_name(s: &str) -> Option<String> {
    if let Some(inner) = s.strip_prefix('\'') {
        let inner = inner.strip_suffix('\'')?;
        Some(inner.replace("''", "'"))
    } else {
        Some(s.to_string())
    }
}
