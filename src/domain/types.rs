// ==========================================
// 商品目录后台 - 领域类型定义
// ==========================================
// 职责: 商品可售状态 / 请购优先级 / 请购状态 / 导入模式
// 序列化格式: 与存储层一致的小写线上格式
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 可售状态 (Availability)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Availability {
    #[default]
    #[serde(rename = "open")]
    Open, // 正常可订
    #[serde(rename = "pre-order")]
    PreOrder, // 预订
    #[serde(rename = "closed")]
    Closed, // 已关闭
}

impl Availability {
    /// 线上/存储格式
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Open => "open",
            Availability::PreOrder => "pre-order",
            Availability::Closed => "closed",
        }
    }

    /// 宽松解析（大小写不敏感，空值/未知值回落为 open）
    pub fn parse_lenient(value: &str) -> Self {
        Self::from_db_str(value).unwrap_or_default()
    }

    /// 严格解析（未知值返回 None）
    pub fn from_db_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Some(Availability::Open),
            "pre-order" | "preorder" | "pre_order" => Some(Availability::PreOrder),
            "closed" => Some(Availability::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 请购优先级 (Request Priority)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl RequestPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestPriority::Low => "low",
            RequestPriority::Medium => "medium",
            RequestPriority::High => "high",
            RequestPriority::Urgent => "urgent",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(RequestPriority::Low),
            "medium" => Some(RequestPriority::Medium),
            "high" => Some(RequestPriority::High),
            "urgent" => Some(RequestPriority::Urgent),
            _ => None,
        }
    }
}

impl fmt::Display for RequestPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 请购状态 (Request Status)
// ==========================================
// 红线: completed / cancelled 的请购单不再参与合并
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending, // 待处理
    InProgress, // 处理中
    Completed,  // 已完成
    Cancelled,  // 已取消
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(RequestStatus::Pending),
            "in_progress" => Some(RequestStatus::InProgress),
            "completed" => Some(RequestStatus::Completed),
            "cancelled" => Some(RequestStatus::Cancelled),
            _ => None,
        }
    }

    /// 是否为未关闭请购单
    pub fn is_open(&self) -> bool {
        !matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 导入模式 (Import Mode)
// ==========================================
// Header: 首行为列名，按列名映射
// Positional: 首行无条件跳过，按固定列序映射
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    #[default]
    Header,
    Positional,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Header => "header",
            ImportMode::Positional => "positional",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "header" => Some(ImportMode::Header),
            "positional" => Some(ImportMode::Positional),
            _ => None,
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_parse_lenient() {
        assert_eq!(Availability::parse_lenient("Pre-Order"), Availability::PreOrder);
        assert_eq!(Availability::parse_lenient("preorder"), Availability::PreOrder);
        assert_eq!(Availability::parse_lenient("CLOSED"), Availability::Closed);
        assert_eq!(Availability::parse_lenient(""), Availability::Open);
        assert_eq!(Availability::parse_lenient("someday"), Availability::Open);
    }

    #[test]
    fn test_availability_serde_wire_format() {
        let json = serde_json::to_string(&Availability::PreOrder).unwrap();
        assert_eq!(json, "\"pre-order\"");
    }

    #[test]
    fn test_request_status_is_open() {
        assert!(RequestStatus::Pending.is_open());
        assert!(RequestStatus::InProgress.is_open());
        assert!(!RequestStatus::Completed.is_open());
        assert!(!RequestStatus::Cancelled.is_open());
    }

    #[test]
    fn test_request_status_round_trip_db_str() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::InProgress,
            RequestStatus::Completed,
            RequestStatus::Cancelled,
        ] {
            assert_eq!(RequestStatus::from_db_str(status.as_str()), Some(status));
        }
    }
}
