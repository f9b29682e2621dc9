//! Security Tests
//!
//! セル値によるHTMLインジェクション、出力先のパストラバーサルへの対策を検証します。

use pulldata::records::{EducationStaff, FederalStaff, ListedStaff, Organization};
use pulldata::{Dataset, Locale, PublisherBuilder, PullDataError};

fn render(dataset: &Dataset) -> String {
    let publisher = PublisherBuilder::new().build().unwrap();
    let html = publisher.render_to_strings(dataset).unwrap();
    html.get(Locale::En).clone()
}

/// 名前に含まれるタグがエスケープされることを確認
#[test]
fn test_script_in_name_is_escaped() {
    let mut dataset = Dataset::new();
    dataset.city_staff.push(ListedStaff {
        name: "<script>alert(1)</script>".to_string(),
        position: "Mayor".to_string(),
        group: "City".to_string(),
    });

    let html = render(&dataset);
    assert!(!html.contains("<script>"));
    assert!(html.contains("<li>Mayor &lt;script&gt;alert(1)&lt;/script&gt;</li>"));
}

/// 属性値を閉じる引用符がエスケープされることを確認
#[test]
fn test_attribute_breakout_is_escaped() {
    let mut dataset = Dataset::new();
    dataset.organizations.push(Organization {
        name: "O'Brien & Sons".to_string(),
        image_url: "x.png\" onerror=\"alert(1)".to_string(),
    });

    let html = render(&dataset);
    assert!(!html.contains("onerror=\"alert"));
    assert!(html.contains("src=\"x.png&quot; onerror=&quot;alert(1)\""));
    assert!(html.contains("alt=\"O&#39;Brien &amp; Sons\""));
    assert!(html.contains("<h5 class=\"card-title\">O'Brien &amp; Sons</h5>"));
}

/// 連邦職員の肩書きがエスケープされることを確認
#[test]
fn test_federal_title_is_escaped() {
    let mut dataset = Dataset::new();
    dataset.federal_staff.push(FederalStaff {
        name: "Jane".to_string(),
        location: "DC".to_string(),
        title: "Senator <b>".to_string(),
        image_url: "j.png".to_string(),
    });

    let html = render(&dataset);
    assert!(html.contains("<p class=\"superheader\">Senator &lt;b&gt;</p>"));
}

/// 状態が`Pending`に見えても完全一致でなければ出力されることを確認
#[test]
fn test_pending_match_is_exact() {
    let mut dataset = Dataset::new();
    dataset.education_staff.push(EducationStaff {
        name: "Ann".to_string(),
        position: "Trustee".to_string(),
        status: "Pending ".to_string(),
    });

    let html = render(&dataset);
    assert!(html.contains("<li>Trustee Ann</li>"));
}

/// パス区切り文字を含むファイル名の語幹が拒否されることを確認
#[test]
fn test_path_traversal_in_file_stem() {
    for stem in ["../escape", "..\\escape", "/etc/passwd"] {
        let result = PublisherBuilder::new().with_file_stem(stem).build();
        assert!(
            matches!(result, Err(PullDataError::Config(_))),
            "stem {:?} should be rejected",
            stem
        );
    }
}
