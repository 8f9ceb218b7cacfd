// ==========================================
// 商品目录后台 - 请购单领域模型
// ==========================================
// 职责: 请购单记录 / 请购正文渲染 / 数量标记提取与改写
// 红线: 正文中的 `Quantity Requested: <n>` 是数量的唯一事实来源
// 说明: 存储表没有结构化的数量列与商品外键，
//       数量只在存储边界序列化为正文文本
// ==========================================

use crate::domain::types::{RequestPriority, RequestStatus};
use chrono::{DateTime, Utc};
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// 正文中数量标记的前缀
pub const QUANTITY_TOKEN_PREFIX: &str = "Quantity Requested:";

/// 请购标题前缀
pub const SUBJECT_PREFIX: &str = "Product Request: ";

static QUANTITY_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Quantity Requested:[ \t]*([0-9]+)").expect("valid regex"));

/// 从正文中提取请购数量
///
/// 未找到标记时返回 None；超出 u32 的数字按 u32::MAX 截断
pub fn extract_quantity(message: &str) -> Option<u32> {
    QUANTITY_TOKEN_RE
        .captures(message)
        .and_then(|caps| caps.get(1))
        // 捕获组只含 ASCII 数字，解析失败只可能是溢出
        .map(|m| m.as_str().parse::<u32>().unwrap_or(u32::MAX))
}

/// 改写正文中的数量标记（仅第一处）
///
/// 正文中不存在标记时，在末尾追加一行标记
pub fn replace_quantity(message: &str, quantity: u32) -> String {
    let token = format!("{} {}", QUANTITY_TOKEN_PREFIX, quantity);
    if QUANTITY_TOKEN_RE.is_match(message) {
        QUANTITY_TOKEN_RE
            .replacen(message, 1, NoExpand(&token))
            .into_owned()
    } else if message.is_empty() {
        token
    } else {
        format!("{}\n{}", message.trim_end_matches('\n'), token)
    }
}

/// 请购标题
pub fn request_subject(product_name: &str) -> String {
    format!("{}{}", SUBJECT_PREFIX, product_name)
}

// ==========================================
// RequestRecord - 已落库请购单
// ==========================================
// 对齐: requests 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub subject: String,
    pub message: String,
    pub priority: RequestPriority,
    pub status: RequestStatus,
    pub assigned_to: Option<String>, // 提交人用户 ID
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: i32, // 写入计数（乐观锁）
}

impl RequestRecord {
    /// 当前请购数量（正文无标记时按 1 处理）
    pub fn quantity(&self) -> u32 {
        extract_quantity(&self.message).unwrap_or(1)
    }

    /// 是否属于指定提交人（用户 ID 相同，或邮箱忽略大小写相同）
    pub fn belongs_to(&self, requester: &Requester) -> bool {
        let same_user = match (&self.assigned_to, &requester.id) {
            (Some(owner), Some(id)) => !id.is_empty() && owner == id,
            _ => false,
        };
        let email = requester.email.trim();
        let same_email =
            !email.is_empty() && self.customer_email.trim().eq_ignore_ascii_case(email);
        same_user || same_email
    }

    /// 标题是否引用了指定商品名（子串匹配，非外键）
    pub fn references_product(&self, product_name: &str) -> bool {
        let name = product_name.trim();
        !name.is_empty() && self.subject.contains(name)
    }
}

// ==========================================
// NewRequest - 待创建请购单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub subject: String,
    pub message: String,
    pub priority: RequestPriority,
    pub status: RequestStatus,
    pub assigned_to: Option<String>,
}

// ==========================================
// RequestPatch - 请购单局部更新
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPatch {
    pub message: Option<String>,
    pub status: Option<RequestStatus>,
    pub priority: Option<RequestPriority>,
    pub updated_at: DateTime<Utc>,
}

impl RequestPatch {
    /// 仅改写正文
    pub fn message(message: String, updated_at: DateTime<Utc>) -> Self {
        Self {
            message: Some(message),
            status: None,
            priority: None,
            updated_at,
        }
    }
}

// ==========================================
// Requester - 提交人上下文
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Requester {
    pub name: String,
    pub email: String,
    pub id: Option<String>,
}

// ==========================================
// RequestMessage - 结构化请购正文
// ==========================================
// 用途: 新建请购时渲染正文；数量以结构化字段持有
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMessage {
    pub product_name: String,
    pub sku: String,
    pub distributor: String,
    pub product_line: String,
    pub price_display: String, // 已格式化的展示价格（如 $1,234.56）
    pub quantity: u32,
    pub availability: String,
    pub notes: Option<String>,
}

impl RequestMessage {
    /// 渲染为存储用正文
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("Product: {}", self.product_name),
            format!("SKU: {}", or_na(&self.sku)),
            format!("Distributor: {}", or_na(&self.distributor)),
            format!("Product Line: {}", or_na(&self.product_line)),
            format!("Price: {}", self.price_display),
            format!("{} {}", QUANTITY_TOKEN_PREFIX, self.quantity),
            format!("Availability: {}", self.availability),
        ];

        if let Some(notes) = self.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            lines.push(String::new());
            lines.push(format!("Additional Message: {}", notes));
        }

        lines.join("\n")
    }
}

fn or_na(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "N/A"
    } else {
        trimmed
    }
}
