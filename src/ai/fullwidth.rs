//! 无剪枝 minimax
//!
//! 朴素的全宽搜索，作为 Alpha-Beta 的对照实现。只适合小深度。

use super::eval;
use super::{sort_scored, AIStrategy, ScoredMove};
use crate::board::Board;
use crate::config::Config;
use crate::error::{EngineError, Result};

pub struct FullWidthAI;

impl FullWidthAI {
    fn minimax(board: &mut Board, config: &Config, depth: u32) -> Result<f64> {
        if let Some(score) = eval::terminal_score(board, config) {
            return Ok(score);
        }
        if depth >= config.search.max_depth {
            return eval::evaluate(board, config);
        }

        let side = board.current_turn();
        let maximizing = board.player(side).is_maximizing;
        let mut best = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };

        for mv in board.legal_moves(side) {
            let mut child = board.clone();
            child.apply_move_and_turn(&mv, config.rules.max_stack_size)?;
            let score = Self::minimax(&mut child, config, depth + 1)?;
            best = if maximizing {
                best.max(score)
            } else {
                best.min(score)
            };
        }
        Ok(best)
    }

    /// 每个根节点走法的精确分数，按分数降序（稳定排序）
    pub fn score_root_moves(&self, board: &Board, config: &Config) -> Result<Vec<ScoredMove>> {
        let side = board.current_turn();
        if !board.player(side).is_maximizing {
            return Err(EngineError::InvalidInvocation(format!(
                "full-width search called for minimizing player {}",
                side
            )));
        }

        let mut scored = Vec::new();
        for mv in board.legal_moves(side) {
            let mut child = board.clone();
            child.apply_move_and_turn(&mv, config.rules.max_stack_size)?;
            let score = Self::minimax(&mut child, config, 1)?;
            scored.push(ScoredMove { mv, score });
        }
        sort_scored(&mut scored);
        Ok(scored)
    }
}

impl AIStrategy for FullWidthAI {
    fn select_moves(&self, board: &Board, config: &Config, n: usize) -> Result<Vec<ScoredMove>> {
        let mut scored = self.score_root_moves(board, config)?;
        if scored.is_empty() {
            return Err(EngineError::NoLegalMoves(board.current_turn()));
        }
        scored.truncate(n.max(1));
        Ok(scored)
    }
}
