// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 表格提取
//!
//! 独立于文本标准化管线，直接在DOM树上提取`<table>`的行列数据。
//! 单个表格解析失败不影响其他表格，整体失败返回空列表。

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static TABLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static TBODY_TR_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("tbody > tr").unwrap());
static TR_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static CELL_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("th, td").unwrap());

/// 表格矩阵：行优先的单元格文本
pub type TableMatrix = Vec<Vec<String>>;

/// 从HTML中提取所有表格数据
///
/// 每个表格优先取 `<tbody>` 下的行，没有则取全部 `<tr>`。
/// 单元格文本为全部后代文本节点的拼接，空白折叠。无有效行的表格被省略。
pub fn extract_tables(html: &str) -> Vec<TableMatrix> {
    let document = Html::parse_document(html);
    let mut tables = Vec::new();

    for table in document.select(&TABLE_SEL) {
        let mut rows: Vec<ElementRef> = table.select(&TBODY_TR_SEL).collect();
        if rows.is_empty() {
            rows = table.select(&TR_SEL).collect();
        }

        let mut matrix: TableMatrix = Vec::new();
        for row in rows {
            let mut cells = Vec::new();
            for cell in row.select(&CELL_SEL) {
                let text: String = cell.text().collect::<Vec<_>>().join(" ");
                let text = WS_RE.replace_all(text.trim(), " ").to_string();
                cells.push(text);
            }
            if !cells.is_empty() {
                matrix.push(cells);
            }
        }
        if !matrix.is_empty() {
            tables.push(matrix);
        }
    }

    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_table() {
        let html = r#"
            <table>
              <tr><th>指标</th><th>要求</th><th>当前</th><th>结果</th></tr>
              <tr><td>魔力</td><td>1000</td><td>1500</td><td>通过</td></tr>
            </table>
        "#;
        let tables = extract_tables(html);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0][0], vec!["指标", "要求", "当前", "结果"]);
        assert_eq!(tables[0][1], vec!["魔力", "1000", "1500", "通过"]);
    }

    #[test]
    fn test_nested_markup_in_cells() {
        let html = r#"<table><tbody>
            <tr><td><b>上传量</b></td><td><span>50</span> <span>GB</span></td></tr>
        </tbody></table>"#;
        let tables = extract_tables(html);
        assert_eq!(tables[0][0], vec!["上传量", "50 GB"]);
    }

    #[test]
    fn test_empty_table_omitted() {
        let html = "<table></table><p>无表格内容</p>";
        assert!(extract_tables(html).is_empty());
    }

    #[test]
    fn test_garbage_input_yields_empty_list() {
        let tables = extract_tables("<<<<>>>> not html at all");
        assert!(tables.is_empty());
    }
}
