// ==========================================
// 商品目录后台 - CSV 行扫描器
// ==========================================
// 两遍处理:
// 1. 逐字符扫描，遇 `"` 翻转引号状态，引号外的 `,` 才分隔字段
//    （双引号转义 `""` 不做还原）
// 2. 每个字段删除全部 `"` 后去首尾空白
// 已知损耗: 字段值中的字面引号无法保留
// ==========================================

/// 扫描后的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedLine {
    pub line_number: usize, // 1 起始，对应原始文本行号
    pub fields: Vec<String>,
}

/// 第一遍: 按引号状态切分字段（保留引号字符与空白）
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// 第二遍: 删除全部引号并去空白（含行尾 `\r`）
pub fn clean_field(raw: &str) -> String {
    raw.replace('"', "").trim().to_string()
}

/// 完整扫描一行
pub fn scan_line(line: &str) -> Vec<String> {
    split_line(line).iter().map(|f| clean_field(f)).collect()
}

/// 扫描整段文本
///
/// 返回 (表头行, 数据行)；整段文本为空时表头为 None。
/// 首行恒作为表头（位置模式下直接丢弃），其后的空白行跳过。
pub fn scan_text(text: &str) -> (Option<ScannedLine>, Vec<ScannedLine>) {
    let mut lines = text
        .split('\n')
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .skip_while(|(_, line)| line.trim().is_empty());

    let header = match lines.next() {
        Some((line_number, line)) => ScannedLine {
            line_number,
            fields: scan_line(line),
        },
        None => return (None, Vec::new()),
    };

    let rows = lines
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(line_number, line)| ScannedLine {
            line_number,
            fields: scan_line(line),
        })
        .collect();

    (Some(header), rows)
}
