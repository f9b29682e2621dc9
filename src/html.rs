//! HTML Escaping
//!
//! スプレッドシートのセル内容をHTMLテンプレートに埋め込む前にエスケープする。
//! セル内容は信頼できない入力として扱い、`<`や`&`によるマークアップ破壊を防ぎます。

/// テキストノード用のエスケープ（`&`, `<`, `>`）
pub fn escape_text(s: &str) -> String {
    escape(s, false)
}

/// 属性値用のエスケープ（テキスト用に加えて`"`と`'`）
pub fn escape_attr(s: &str) -> String {
    escape(s, true)
}

fn escape(s: &str, quotes: bool) -> String {
    // エスケープ不要な場合はそのままコピー
    if !s.contains(|c: char| matches!(c, '&' | '<' | '>') || (quotes && matches!(c, '"' | '\''))) {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len() + 16);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            '\'' if quotes => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(escape_text("Nguyễn Văn A"), "Nguyễn Văn A");
        assert_eq!(escape_attr("http://img/a.png"), "http://img/a.png");
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("<b>Tom & Jerry</b>"), "&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;");
        // テキストノードでは引用符はそのまま
        assert_eq!(escape_text("O'Brien \"Jr\""), "O'Brien \"Jr\"");
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(
            escape_attr("x\" onerror=\"alert('1')"),
            "x&quot; onerror=&quot;alert(&#39;1&#39;)"
        );
    }

    #[test]
    fn test_already_escaped_is_escaped_again() {
        assert_eq!(escape_text("&amp;"), "&amp;amp;");
    }

    #[allow(unused_doc_comments)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_escaped_attr_has_no_markup_chars(s in ".*") {
                let escaped = escape_attr(&s);
                prop_assert!(!escaped.contains('<'));
                prop_assert!(!escaped.contains('>'));
                prop_assert!(!escaped.contains('"'));
                prop_assert!(!escaped.contains('\''));
            }

            #[test]
            fn test_escape_preserves_safe_input(s in "[a-zA-Z0-9 .,:/_-]*") {
                prop_assert_eq!(escape_text(&s), s.clone());
                prop_assert_eq!(escape_attr(&s), s);
            }
        }
    }
}
