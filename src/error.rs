//! 引擎错误类型
//!
//! 所有错误都是致命的：引擎内部不重试，直接传播给调用方。

use crate::types::Side;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// 非法走法：空起点、同色叠塔、越界等
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    /// 数据模型不变量被破坏
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 调用约定被违反（例如非最大化方调用搜索）
    #[error("Invalid invocation: {0}")]
    InvalidInvocation(String),

    #[error("No legal moves for player {0}")]
    NoLegalMoves(Side),

    #[error("Search timed out after {0:.2}s")]
    Timeout(f64),

    #[error("Search cancelled")]
    Cancelled,

    #[error("Invalid notation: {0}")]
    Notation(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
