//! 模型公共类型

use serde::{Deserialize, Serialize};

/// 启用/禁用状态
///
/// 数据库存 INTEGER (1 = 启用, 2 = 禁用), JSON 同样以数字收发,
/// 其他取值在反序列化阶段报错。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(try_from = "i64", into = "i64")]
#[repr(i64)]
pub enum Status {
    Enabled = 1,
    Disabled = 2,
}

impl Status {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Status::Enabled)
    }
}

impl TryFrom<i64> for Status {
    type Error = String;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Status::Enabled),
            2 => Ok(Status::Disabled),
            other => Err(format!("invalid status value: {other}, expected 1 or 2")),
        }
    }
}

impl From<Status> for i64 {
    fn from(s: Status) -> Self {
        s as i64
    }
}

/// 权限节点类型
///
/// menu 构成树的骨架, 可以挂子节点; button 是叶子动作点,
/// 不允许作为父节点。数据库存小写文本。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PermissionKind {
    Menu,
    Button,
}

impl PermissionKind {
    pub fn is_menu(&self) -> bool {
        matches!(self, PermissionKind::Menu)
    }
}
