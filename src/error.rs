use thiserror::Error;

/// Error kinds for every content operation that goes through the `Store`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// Backend failure. Carries the raw driver message so admins can report it verbatim.
    #[error("{0}")]
    Db(String),

    #[error("{0} 不存在")]
    NotFound(String),

    /// The row changed since the caller loaded it.
    #[error("该记录已被他人修改（加载时版本 {expected}，当前版本 {found}），请刷新后重试")]
    Conflict { expected: i64, found: i64 },

    /// Referential business rule, e.g. a menu category still used by menu items.
    #[error("{0}")]
    InUse(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    Invalid(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Db(e.to_string())
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(e: r2d2::Error) -> Self {
        StoreError::Db(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
