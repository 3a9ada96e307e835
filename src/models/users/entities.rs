use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 用户角色（与平台认证服务签发的令牌保持一致）
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum UserRole {
    User,    // 普通用户（学生）
    Teacher, // 教师
    Admin,   // 管理员
}

impl UserRole {
    pub const USER: &'static str = "user";
    pub const TEACHER: &'static str = "teacher";
    pub const ADMIN: &'static str = "admin";

    /// 可以出题、批改和查看统计的角色
    pub fn teacher_roles() -> &'static [&'static UserRole] {
        &[&Self::Teacher, &Self::Admin]
    }

    pub fn is_instructor(&self) -> bool {
        matches!(self, UserRole::Teacher | UserRole::Admin)
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户角色: '{s}'. 支持的角色: user, teacher, admin"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::User => write!(f, "{}", UserRole::USER),
            UserRole::Teacher => write!(f, "{}", UserRole::TEACHER),
            UserRole::Admin => write!(f, "{}", UserRole::ADMIN),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UserRole::USER => Ok(UserRole::User),
            UserRole::TEACHER => Ok(UserRole::Teacher),
            UserRole::ADMIN => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

/// 当前请求的用户身份
///
/// 由 RequireJWT 中间件从访问令牌中解析并放入请求扩展。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentUser {
    pub id: i64,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_instructor(&self) -> bool {
        self.role.is_instructor()
    }
}
