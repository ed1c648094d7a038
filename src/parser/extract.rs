use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::{debug, info};

use super::text::clean;

pub const UNKNOWN_TITLE: &str = "未知職稱";
pub const NO_RESEARCH: &str = "尚未提供";

static SECTION: LazyLock<Selector> = LazyLock::new(|| sel("div.i-member-section"));
static SECTION_TITLE: LazyLock<Selector> = LazyLock::new(|| sel("h3.i-member-status-title"));
static ITEM: LazyLock<Selector> = LazyLock::new(|| sel("div.i-member-item"));

// Tagged value spans first, bare heading/paragraph markup second. The spans
// must carry exactly this class attribute: reordered or extra classes fall
// through to the bare markup.
static NAME_SPAN: LazyLock<Selector> =
    LazyLock::new(|| sel(r#"span[class="i-member-value member-data-value-name"]"#));
static NAME_HEADING: LazyLock<Selector> = LazyLock::new(|| sel("h3"));
static RESEARCH_SPAN: LazyLock<Selector> =
    LazyLock::new(|| sel(r#"span[class="i-member-value member-data-value-7"]"#));
static RESEARCH_PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| sel("p"));

fn sel(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

/// One faculty entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub title: String,
    pub name: String,
    pub research: String,
}

/// Walk every member section of the page and collect its entries in
/// document order. Missing structure never fails: sections without a heading
/// get [`UNKNOWN_TITLE`], entries without research get [`NO_RESEARCH`], and
/// entries without a name are dropped.
pub fn extract(doc: &Html) -> Vec<Record> {
    let sections: Vec<ElementRef> = doc.select(&SECTION).collect();
    info!(sections = sections.len(), "member sections found");

    let mut records = Vec::new();
    for section in sections {
        let title = section
            .select(&SECTION_TITLE)
            .next()
            .map(|h| clean(&text_of(h)))
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        let items: Vec<ElementRef> = section.select(&ITEM).collect();
        info!(title = %title, items = items.len(), "member items in section");

        for item in items {
            match extract_item(&title, item) {
                Some(record) => records.push(record),
                None => debug!(title = %title, "item without a name skipped"),
            }
        }
    }
    records
}

fn extract_item(title: &str, item: ElementRef) -> Option<Record> {
    let name = first_match(item, &[&*NAME_SPAN, &*NAME_HEADING])
        .map(|node| clean(&text_of(node)))
        .unwrap_or_default();
    if name.is_empty() {
        return None;
    }

    let research = first_match(item, &[&*RESEARCH_SPAN, &*RESEARCH_PARAGRAPH])
        .map(|node| clean(&text_of(node)))
        .unwrap_or_else(|| NO_RESEARCH.to_string());

    Some(Record {
        title: title.to_string(),
        name,
        research,
    })
}

/// Try each selector in order; the first one with any match wins, and
/// within it the first match in document order.
fn first_match<'a>(scope: ElementRef<'a>, strategies: &[&Selector]) -> Option<ElementRef<'a>> {
    strategies
        .iter()
        .find_map(|selector| scope.select(selector).next())
}

fn text_of(node: ElementRef) -> String {
    node.text().collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(html: &str) -> Vec<Record> {
        extract(&Html::parse_document(html))
    }

    fn record(title: &str, name: &str, research: &str) -> Record {
        Record {
            title: title.to_string(),
            name: name.to_string(),
            research: research.to_string(),
        }
    }

    fn fixture(name: &str) -> Vec<Record> {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap();
        run(&html)
    }

    #[test]
    fn no_sections_yields_nothing() {
        assert!(run("<html><body><p>暫無資料</p></body></html>").is_empty());
        assert!(run("").is_empty());
    }

    #[test]
    fn tagged_spans_for_every_field() {
        let records = run(r#"
            <div class="i-member-section">
              <h3 class="i-member-status-title"> 副教授 </h3>
              <div class="i-member-item">
                <h3>不該被採用</h3>
                <span class="i-member-value member-data-value-name">王小明</span>
                <span class="i-member-value member-data-value-7">影像處理</span>
                <p>不該被採用</p>
              </div>
            </div>"#);
        assert_eq!(records, vec![record("副教授", "王小明", "影像處理")]);
    }

    #[test]
    fn nameless_item_is_dropped() {
        let with_name = r#"
            <div class="i-member-section">
              <h3 class="i-member-status-title">教授</h3>
              <div class="i-member-item"><h3>甲</h3><p>A</p></div>
              <div class="i-member-item"><h3>乙</h3><p>B</p></div>
            </div>"#;
        let without_name = r#"
            <div class="i-member-section">
              <h3 class="i-member-status-title">教授</h3>
              <div class="i-member-item"><h3>甲</h3><p>A</p></div>
              <div class="i-member-item"><p>B</p></div>
            </div>"#;
        assert_eq!(run(with_name).len(), 2);
        assert_eq!(run(without_name), vec![record("教授", "甲", "A")]);
    }

    #[test]
    fn heading_name_without_research_gets_placeholder() {
        let records = run(r#"
            <div class="i-member-section">
              <h3 class="i-member-status-title">講師</h3>
              <div class="i-member-item"><h3>陳大文</h3></div>
            </div>"#);
        assert_eq!(records, vec![record("講師", "陳大文", NO_RESEARCH)]);
        assert_eq!(records[0].research, "尚未提供");
    }

    #[test]
    fn missing_section_heading_gets_placeholder() {
        let records = run(r#"
            <div class="i-member-section">
              <div class="i-member-item"><h3>甲</h3><p>A</p></div>
              <div class="i-member-item"><h3>乙</h3><p>B</p></div>
            </div>"#);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.title == "未知職稱"));
    }

    #[test]
    fn fields_fall_back_independently() {
        let records = run(r#"
            <div class="i-member-section">
              <h3 class="i-member-status-title">助理教授</h3>
              <div class="i-member-item">
                <span class="i-member-value member-data-value-name">林美華</span>
                <p>自然語言處理</p>
              </div>
              <div class="i-member-item">
                <h3>張志強</h3>
                <span class="i-member-value member-data-value-7">網路安全</span>
              </div>
            </div>"#);
        assert_eq!(
            records,
            vec![
                record("助理教授", "林美華", "自然語言處理"),
                record("助理教授", "張志強", "網路安全"),
            ]
        );
    }

    #[test]
    fn first_paragraph_wins() {
        let records = run(r#"
            <div class="i-member-section">
              <div class="i-member-item"><h3>甲</h3><p>第一段</p><p>第二段</p></div>
            </div>"#);
        assert_eq!(records[0].research, "第一段");
    }

    #[test]
    fn empty_name_span_skips_without_heading_fallback() {
        let records = run(r#"
            <div class="i-member-section">
              <div class="i-member-item">
                <span class="i-member-value member-data-value-name"> &nbsp; </span>
                <h3>不會被使用</h3>
              </div>
            </div>"#);
        assert!(records.is_empty());
    }

    #[test]
    fn empty_research_span_is_kept_empty() {
        let records = run(r#"
            <div class="i-member-section">
              <div class="i-member-item">
                <h3>甲</h3>
                <span class="i-member-value member-data-value-7"></span>
                <p>不會被使用</p>
              </div>
            </div>"#);
        assert_eq!(records[0].research, "");
    }

    #[test]
    fn span_class_must_match_exactly() {
        let records = run(r#"
            <div class="i-member-section">
              <div class="i-member-item">
                <span class="member-data-value-name i-member-value">順序不同</span>
                <h3>標題姓名</h3>
                <span class="i-member-value member-data-value-7 extra">多一個類別</span>
                <p>段落研究</p>
              </div>
            </div>"#);
        assert_eq!(records, vec![record(UNKNOWN_TITLE, "標題姓名", "段落研究")]);
    }

    #[test]
    fn nested_text_is_flattened_and_cleaned() {
        let records = run(
            "<div class=\"i-member-section\"><h3 class=\"i-member-status-title\">\n教授\r\n</h3>\
             <div class=\"i-member-item\"><h3><a href=\"/t/1\">李\n四</a></h3>\
             <p>機器&nbsp;學習<br>\n與資料探勘</p></div></div>",
        );
        assert_eq!(records, vec![record("教授", "李四", "機器 學習與資料探勘")]);
    }

    #[test]
    fn two_sections_keep_document_order() {
        let records = run(r#"
            <div class="i-member-section">
              <h3 class="i-member-status-title">教授</h3>
              <div class="i-member-item"><h3>甲</h3><p>A</p></div>
              <div class="i-member-item"><h3>乙</h3><p>B</p></div>
            </div>
            <div class="i-member-section">
              <h3 class="i-member-status-title">副教授</h3>
              <div class="i-member-item"><p>沒有姓名</p></div>
            </div>"#);
        assert_eq!(
            records,
            vec![record("教授", "甲", "A"), record("教授", "乙", "B")]
        );
    }

    #[test]
    fn tagged_markup_fixture() {
        let records = fixture("tagged_page");
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], record("副教授", "王小明", "影像處理、電腦視覺"));
        assert_eq!(records[1].name, "林美華");
        assert_eq!(records[2].title, "助理教授");
        assert_eq!(records[2].research, NO_RESEARCH);
    }

    #[test]
    fn plain_markup_fixture() {
        let records = fixture("plain_page");
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["陳大文", "張志強"]);
        assert!(records.iter().all(|r| r.title == UNKNOWN_TITLE));
        assert_eq!(records[1].research, "網路安全 與 區塊鏈");
    }
}
