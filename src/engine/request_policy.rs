// ==========================================
// 商品目录后台 - 请购前置条件
// ==========================================
// 红线: 任一前置条件不满足时不得访问存储
// 规则:
// - 商品已审批 (approved)
// - 可售状态不是 closed
// - pre-order 且有截止日时，截止日必须晚于今天
// - 数量 >= 1
// ==========================================

use crate::domain::{Availability, ProductRecord};
use crate::engine::pricing::{stock_status, StockStatus};
use chrono::NaiveDate;
use thiserror::Error;

/// 前置条件不满足的原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreconditionViolation {
    #[error("商品未审批，不可请购")]
    NotApproved,

    #[error("商品已关闭，不可请购")]
    Closed,

    #[error("预订已截止 (orders_due_date={due})")]
    PreOrderClosed { due: NaiveDate },

    #[error("请购数量必须 >= 1 (实际 {0})")]
    InvalidQuantity(i64),
}

/// 校验请购前置条件
pub fn check_request_preconditions(
    product: &ProductRecord,
    quantity: i64,
    today: NaiveDate,
) -> Result<(), PreconditionViolation> {
    if !product.approved {
        return Err(PreconditionViolation::NotApproved);
    }

    match product.availability {
        Availability::Closed => return Err(PreconditionViolation::Closed),
        Availability::PreOrder => {
            if let Some(due) = product.orders_due_date {
                if due <= today {
                    return Err(PreconditionViolation::PreOrderClosed { due });
                }
            }
        }
        Availability::Open => {}
    }

    if quantity < 1 {
        return Err(PreconditionViolation::InvalidQuantity(quantity));
    }

    Ok(())
}

/// 商品当前是否可提交请购（列表页按钮可用性）
///
/// 前置条件满足，且有库存或处于预订
pub fn is_requestable(product: &ProductRecord, today: NaiveDate) -> bool {
    check_request_preconditions(product, 1, today).is_ok()
        && stock_status(product) != StockStatus::OutOfStock
}
