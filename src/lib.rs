//! Towers AI Engine
//!
//! 塔棋规则引擎与 Alpha-Beta 搜索 - 支持 TFN 和 JSON 快照输入输出

pub mod ai;
pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod notation;
pub mod rules;
pub mod snapshot;
pub mod test_positions;
pub mod types;

pub use ai::{
    evaluate, evaluate_detail, find_best_move, score_moves_with_timeout, score_position,
    search_with_timeout, terminal_score, AIEngine, AIStrategy, EvalDetail, FullWidthAI,
    MinimaxAI, RandomAI, ScoredMove, SearchResult, SearchStats, AVAILABLE_STRATEGIES,
    DEFAULT_STRATEGY,
};
pub use board::{Board, Cell, PlayerState, Vault};
pub use config::Config;
pub use error::{EngineError, Result};
pub use game::Game;
pub use notation::{apply_move_to_tfn, legal_moves_from_tfn, parse_tfn, to_tfn};
pub use rules::LoggedMove;
pub use snapshot::{GameSnapshot, PlayersSnapshot};
pub use types::{GameResult, Position, Side, TowerMove, BOARD_SIZE};
