//! 随机 AI 策略

use super::{sort_scored, AIStrategy, ScoredMove};
use crate::board::Board;
use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::types::TowerMove;
use rand::prelude::*;
use std::cell::RefCell;

/// 随机 AI - 随机选择合法走法
///
/// 不要求由最大化方行棋，可作为自对弈的对手。
pub struct RandomAI {
    rng: RefCell<StdRng>,
}

impl RandomAI {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        RandomAI {
            rng: RefCell::new(rng),
        }
    }

    /// 当前随机数发生器的副本
    pub fn rng(&self) -> StdRng {
        self.rng.borrow().clone()
    }

    /// 均匀选择一个走法
    pub fn choose<R: Rng + ?Sized>(moves: &[TowerMove], rng: &mut R) -> Option<TowerMove> {
        moves.choose(rng).copied()
    }
}

impl AIStrategy for RandomAI {
    fn select_moves(&self, board: &Board, _config: &Config, n: usize) -> Result<Vec<ScoredMove>> {
        let side = board.current_turn();
        let moves = board.legal_moves(side);
        if moves.is_empty() {
            return Err(EngineError::NoLegalMoves(side));
        }

        let mut rng = self.rng.borrow_mut();
        let mut scored: Vec<ScoredMove> = moves
            .into_iter()
            .map(|mv| ScoredMove {
                mv,
                score: rng.gen::<f64>(),
            })
            .collect();

        sort_scored(&mut scored);
        scored.truncate(n.max(1));
        Ok(scored)
    }
}
