//! Section Templates
//!
//! カテゴリごとのHTMLテンプレート（見出し・行・末尾）を提供するモジュール。
//! 行の内容はロケールに依存せず、見出し（`<summary>`）だけがロケールごとに異なります。

use crate::api::SectionLayout;
use crate::html::{escape_attr, escape_text};
use crate::records::{FederalStaff, Organization};

/// 最初のセクションの`<details>`（先頭に改行なし）
pub(crate) const DETAILS_OPEN_FIRST: &str = "        <details>\n";

/// 2番目以降のセクションの`<details>`
pub(crate) const DETAILS_OPEN: &str = "\n        <details>\n";

const GRID_OPEN: &str = concat!(
    "            <section class=\"grid-profiles\">\n",
    "                <div class=\"squeeze\">\n",
    "                    <div class=\"modified-wrap\">\n",
    "                        <div class=\"guts kinda-full\">\n",
    "                            <div class=\"columns limit with-max with-margin to-4 then-3 finally-2\">",
);

const GRID_CLOSE: &str = concat!(
    "\n                            </div>\n",
    "                        </div>\n",
    "                    </div>\n",
    "                </div>\n",
    "            </section>\n",
    "        </details>",
);

const LIST_OPEN: &str = concat!(
    "            <div class=\"list-container\">\n",
    "                <ul>",
);

const LIST_CLOSE: &str = concat!(
    "\n                </ul>\n",
    "            </div>\n",
    "        </details>",
);

/// `<summary>`とレイアウトの開始タグ
pub(crate) fn section_open(layout: SectionLayout, caption: &str) -> String {
    let body = match layout {
        SectionLayout::Grid => GRID_OPEN,
        SectionLayout::List => LIST_OPEN,
    };
    format!("            <summary>{}</summary>\n{}", caption, body)
}

pub(crate) fn section_close(layout: SectionLayout) -> &'static str {
    match layout {
        SectionLayout::Grid => GRID_CLOSE,
        SectionLayout::List => LIST_CLOSE,
    }
}

/// 団体カード
pub(crate) fn organization_card(org: &Organization) -> String {
    format!(
        concat!(
            "\n                                <div class=\"column item\">\n",
            "                                    <div class=\"text-stuff\">\n",
            "                                        <div class=\"top has-image full-style\">\n",
            "                                            <img src=\"{src}\" alt=\"{alt}\" width=\"400\" height=\"400\" class=\"alignnone size-full wp-image-615\" />\n",
            "                                            <div class=\"words-modified\">\n",
            "                                                <h5 class=\"card-title\">{name}</h5>\n",
            "                                            </div>\n",
            "                                        </div>\n",
            "                                    </div>\n",
            "                                </div>",
        ),
        src = escape_attr(&org.image_url),
        alt = escape_attr(&org.name),
        name = escape_text(&org.name),
    )
}

/// 連邦職員カード
pub(crate) fn federal_card(staff: &FederalStaff) -> String {
    format!(
        concat!(
            "\n                                <div class=\"column item\">\n",
            "                                    <div class=\"text-stuff\">\n",
            "                                        <div class=\"top has-image full-style\">\n",
            "                                            <img src=\"{src}\" alt=\"{alt}\" width=\"400\" height=\"400\" class=\"alignnone size-full wp-image-615\" />\n",
            "                                            <div class=\"words\">\n",
            "                                                <h3>{name}</h3>\n",
            "                                                <p class=\"superheader\">{title}</p>\n",
            "                                            </div>\n",
            "                                        </div>\n",
            "                                    </div>\n",
            "                                </div>",
        ),
        src = escape_attr(&staff.image_url),
        alt = escape_attr(&staff.name),
        name = escape_text(&staff.name),
        title = escape_text(&staff.title),
    )
}

/// リスト項目（役職 氏名）
pub(crate) fn list_item(position: &str, name: &str) -> String {
    format!(
        "\n                    <li>{} {}</li>",
        escape_text(position),
        escape_text(name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_card() {
        let card = organization_card(&Organization {
            name: "Acme Org".to_string(),
            image_url: "http://img/a.png".to_string(),
        });
        assert!(card.starts_with("\n                                <div class=\"column item\">"));
        assert!(card.contains("<img src=\"http://img/a.png\" alt=\"Acme Org\" width=\"400\""));
        assert!(card.contains("<h5 class=\"card-title\">Acme Org</h5>"));
        assert!(card.ends_with("</div>"));
    }

    #[test]
    fn test_federal_card() {
        let card = federal_card(&FederalStaff {
            name: "Jane Doe".to_string(),
            location: "DC".to_string(),
            title: "Senator".to_string(),
            image_url: "j.png".to_string(),
        });
        assert!(card.contains("<img src=\"j.png\" alt=\"Jane Doe\""));
        assert!(card.contains("<h3>Jane Doe</h3>"));
        assert!(card.contains("<p class=\"superheader\">Senator</p>"));
        // 所在地はカードに出力しない
        assert!(!card.contains("DC"));
    }

    #[test]
    fn test_list_item_escapes() {
        assert_eq!(
            list_item("Mayor", "A <script>"),
            "\n                    <li>Mayor A &lt;script&gt;</li>"
        );
    }

    #[test]
    fn test_section_open_and_close() {
        let open = section_open(SectionLayout::List, "City Staff");
        assert_eq!(
            open,
            "            <summary>City Staff</summary>\n            <div class=\"list-container\">\n                <ul>"
        );
        assert!(section_close(SectionLayout::Grid).ends_with("</section>\n        </details>"));
        assert!(section_close(SectionLayout::List).ends_with("</div>\n        </details>"));
    }
}
