//! AI 策略模块
//!
//! 提供 Alpha-Beta minimax、无剪枝对照实现和随机策略，以及局面评估。

pub mod eval;
mod fullwidth;
mod minimax;
mod random;
mod timed;

pub use eval::{evaluate, evaluate_detail, score_position, terminal_score, EvalDetail};
pub use fullwidth::FullWidthAI;
pub use minimax::MinimaxAI;
pub use random::RandomAI;
pub use timed::{score_moves_with_timeout, search_with_timeout};

use crate::board::Board;
use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::types::TowerMove;
use std::cmp::Ordering;

/// 可用策略名称
pub const AVAILABLE_STRATEGIES: &[&str] = &["minimax", "fullwidth", "random"];

/// 默认策略
pub const DEFAULT_STRATEGY: &str = "minimax";

/// 走法评分
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMove {
    pub mv: TowerMove,
    pub score: f64,
}

/// 搜索统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub leaves: u64,
    pub cutoffs: u64,
}

/// 一次搜索的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    pub best: ScoredMove,
    pub stats: SearchStats,
}

/// AI 策略接口
pub trait AIStrategy {
    /// 选择走法（返回带评分的走法列表，分数降序）
    fn select_moves(&self, board: &Board, config: &Config, n: usize) -> Result<Vec<ScoredMove>>;

    /// 选择最佳走法
    fn select_best_move(&self, board: &Board, config: &Config) -> Result<ScoredMove> {
        self.select_moves(board, config, 1)?
            .into_iter()
            .next()
            .ok_or(EngineError::NoLegalMoves(board.current_turn()))
    }
}

/// 按分数降序排序；稳定排序，并列时保持生成顺序
pub(crate) fn sort_scored(scored: &mut [ScoredMove]) {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

/// 搜索最佳走法（电脑方行棋）
pub fn find_best_move(board: &Board, config: &Config) -> Result<TowerMove> {
    Ok(MinimaxAI::new().search(board, config)?.best.mv)
}

/// AI 引擎 - 统一的 AI 接口
pub struct AIEngine {
    strategy: Box<dyn AIStrategy>,
}

impl AIEngine {
    pub fn minimax() -> Self {
        AIEngine {
            strategy: Box::new(MinimaxAI::new()),
        }
    }

    pub fn full_width() -> Self {
        AIEngine {
            strategy: Box::new(FullWidthAI),
        }
    }

    pub fn random(seed: Option<u64>) -> Self {
        AIEngine {
            strategy: Box::new(RandomAI::new(seed)),
        }
    }

    /// 从策略名称创建
    pub fn from_strategy(name: &str, seed: Option<u64>) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "minimax" | "alphabeta" => Ok(Self::minimax()),
            "fullwidth" => Ok(Self::full_width()),
            "random" => Ok(Self::random(seed)),
            _ => Err(EngineError::InvalidInvocation(format!(
                "unknown strategy: {}. Available: {}",
                name,
                AVAILABLE_STRATEGIES.join(", ")
            ))),
        }
    }

    pub fn select_moves(&self, board: &Board, config: &Config, n: usize) -> Result<Vec<ScoredMove>> {
        self.strategy.select_moves(board, config, n)
    }

    pub fn select_best_move(&self, board: &Board, config: &Config) -> Result<ScoredMove> {
        self.strategy.select_best_move(board, config)
    }

    /// 从 TFN 选择走法（返回带评分的走法字符串）
    pub fn select_moves_tfn(&self, tfn: &str, config: &Config, n: usize) -> Result<Vec<(String, f64)>> {
        let board = Board::from_tfn(tfn)?;
        let moves = self.strategy.select_moves(&board, config, n)?;
        Ok(moves
            .into_iter()
            .map(|sm| (sm.mv.to_tfn_str(), sm.score))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_positions;

    #[test]
    fn test_find_best_move() {
        let board = Board::from_tfn(test_positions::WIN_IN_ONE).unwrap();
        let mut config = Config::default();
        config.rules.safety_zone_count = 1;
        config.search.max_depth = 2;
        let mv = find_best_move(&board, &config).unwrap();
        assert_eq!(mv.to_tfn_str(), "c1c0");
    }

    #[test]
    fn test_all_strategies_from_name() {
        for name in AVAILABLE_STRATEGIES {
            assert!(AIEngine::from_strategy(name, Some(1)).is_ok(), "{}", name);
        }
        assert!(AIEngine::from_strategy("AlphaBeta", None).is_ok());
        assert!(AIEngine::from_strategy("mcts", None).is_err());
    }

    #[test]
    fn test_select_moves_tfn() {
        let mut config = Config::default();
        config.search.max_depth = 2;
        let ai = AIEngine::minimax();
        let moves = ai.select_moves_tfn(test_positions::START, &config, 3).unwrap();
        assert_eq!(moves.len(), 3);
        assert!(moves[0].1 >= moves[2].1);
    }

    #[test]
    fn test_engines_agree_on_best_move() {
        let board = Board::from_tfn(test_positions::RACE_HOME).unwrap();
        let mut config = Config::default();
        config.search.max_depth = 2;
        let a = AIEngine::minimax().select_best_move(&board, &config).unwrap();
        let b = AIEngine::full_width().select_best_move(&board, &config).unwrap();
        assert_eq!(a, b);
    }
}
