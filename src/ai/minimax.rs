//! Minimax AI 策略
//!
//! Alpha-Beta 剪枝的定深 minimax。搜索在棋盘副本上原地走子/撤销，
//! 每一层的走法在返回前都会被精确撤销。

use super::eval;
use super::{sort_scored, AIStrategy, ScoredMove, SearchResult, SearchStats};
use crate::board::Board;
use crate::config::Config;
use crate::error::{EngineError, Result};
use log::{debug, trace};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// 每隔多少个节点检查一次取消标志
const STOP_CHECK_INTERVAL: u64 = 1024;

/// Minimax AI - 使用 Alpha-Beta 剪枝
#[derive(Default)]
pub struct MinimaxAI {
    stop: Option<Arc<AtomicBool>>,
}

impl MinimaxAI {
    pub fn new() -> Self {
        MinimaxAI { stop: None }
    }

    /// 带取消标志：标志置位后搜索以 `Cancelled` 中止
    pub fn with_stop_flag(stop: Arc<AtomicBool>) -> Self {
        MinimaxAI { stop: Some(stop) }
    }

    fn searcher<'a>(&'a self, config: &'a Config) -> Searcher<'a> {
        Searcher {
            config,
            stop: self.stop.as_deref(),
            stats: SearchStats::default(),
        }
    }

    /// 搜索最佳走法
    ///
    /// 必须由最大化方（电脑）行棋；并列时取生成顺序中的第一个。
    pub fn search(&self, board: &Board, config: &Config) -> Result<SearchResult> {
        let start = Instant::now();
        let mut board = board.clone();
        let side = board.current_turn();
        if !board.player(side).is_maximizing {
            return Err(EngineError::InvalidInvocation(format!(
                "search called for minimizing player {}",
                side
            )));
        }

        let moves = board.legal_moves(side);
        if moves.is_empty() {
            return Err(EngineError::NoLegalMoves(side));
        }

        let max_stack = config.rules.max_stack_size;
        let mut searcher = self.searcher(config);
        let mut alpha = f64::NEG_INFINITY;
        let beta = f64::INFINITY;
        let mut best: Option<ScoredMove> = None;

        for mv in moves {
            let logged = board.apply_move_and_turn(&mv, max_stack)?;
            let result = searcher.minimax(&mut board, 1, alpha, beta);
            board.undo_move(&logged);
            let score = result?;
            trace!("root {} -> {}", mv, score);

            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(ScoredMove { mv, score });
            }
            alpha = alpha.max(score);
        }

        let best = best.ok_or(EngineError::NoLegalMoves(side))?;
        let stats = searcher.stats;
        debug!(
            "best {} score={} nodes={} leaves={} cutoffs={} elapsed={:?}",
            best.mv,
            best.score,
            stats.nodes,
            stats.leaves,
            stats.cutoffs,
            start.elapsed()
        );
        Ok(SearchResult { best, stats })
    }

    /// 对每个根节点走法做全窗口搜索，得到精确分数（调试用）
    pub fn score_root_moves(&self, board: &Board, config: &Config) -> Result<Vec<ScoredMove>> {
        let mut board = board.clone();
        let side = board.current_turn();
        if !board.player(side).is_maximizing {
            return Err(EngineError::InvalidInvocation(format!(
                "root scoring called for minimizing player {}",
                side
            )));
        }

        let max_stack = config.rules.max_stack_size;
        let mut searcher = self.searcher(config);
        let mut scored = Vec::new();

        for mv in board.legal_moves(side) {
            let logged = board.apply_move_and_turn(&mv, max_stack)?;
            let result = searcher.minimax(&mut board, 1, f64::NEG_INFINITY, f64::INFINITY);
            board.undo_move(&logged);
            scored.push(ScoredMove { mv, score: result? });
        }

        sort_scored(&mut scored);
        Ok(scored)
    }
}

impl AIStrategy for MinimaxAI {
    fn select_moves(&self, board: &Board, config: &Config, n: usize) -> Result<Vec<ScoredMove>> {
        if n <= 1 {
            return Ok(vec![self.search(board, config)?.best]);
        }
        let mut scored = self.score_root_moves(board, config)?;
        if scored.is_empty() {
            return Err(EngineError::NoLegalMoves(board.current_turn()));
        }
        scored.truncate(n);
        Ok(scored)
    }

    fn select_best_move(&self, board: &Board, config: &Config) -> Result<ScoredMove> {
        Ok(self.search(board, config)?.best)
    }
}

/// 单次搜索的可变状态
struct Searcher<'a> {
    config: &'a Config,
    stop: Option<&'a AtomicBool>,
    stats: SearchStats,
}

impl Searcher<'_> {
    /// 叶子判定：先判胜负，再看是否到达最大深度
    fn terminal_score(&mut self, board: &mut Board, depth: u32) -> Result<Option<f64>> {
        if let Some(score) = eval::terminal_score(board, self.config) {
            self.stats.leaves += 1;
            return Ok(Some(score));
        }
        if depth >= self.config.search.max_depth {
            self.stats.leaves += 1;
            return Ok(Some(eval::evaluate(board, self.config)?));
        }
        Ok(None)
    }

    fn minimax(&mut self, board: &mut Board, depth: u32, mut alpha: f64, mut beta: f64) -> Result<f64> {
        self.stats.nodes += 1;
        if self.stats.nodes % STOP_CHECK_INTERVAL == 0
            && self.stop.is_some_and(|s| s.load(Ordering::Relaxed))
        {
            return Err(EngineError::Cancelled);
        }

        if let Some(score) = self.terminal_score(board, depth)? {
            return Ok(score);
        }

        let side = board.current_turn();
        let maximizing = board.player(side).is_maximizing;
        let max_stack = self.config.rules.max_stack_size;
        let moves = board.legal_moves(side);

        if maximizing {
            let mut max_eval = f64::NEG_INFINITY;
            for mv in &moves {
                let logged = board.apply_move_and_turn(mv, max_stack)?;
                let result = self.minimax(board, depth + 1, alpha, beta);
                board.undo_move(&logged);

                max_eval = max_eval.max(result?);
                alpha = alpha.max(max_eval);
                if beta <= alpha {
                    self.stats.cutoffs += 1;
                    break;
                }
            }
            Ok(max_eval)
        } else {
            let mut min_eval = f64::INFINITY;
            for mv in &moves {
                let logged = board.apply_move_and_turn(mv, max_stack)?;
                let result = self.minimax(board, depth + 1, alpha, beta);
                board.undo_move(&logged);

                min_eval = min_eval.min(result?);
                beta = beta.min(min_eval);
                if beta <= alpha {
                    self.stats.cutoffs += 1;
                    break;
                }
            }
            Ok(min_eval)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{FullWidthAI, RandomAI};
    use crate::test_positions;
    use crate::types::{Side, TowerMove};

    fn config_with_depth(depth: u32) -> Config {
        let mut config = Config::default();
        config.search.max_depth = depth;
        config
    }

    #[test]
    fn test_wins_in_one() {
        let board = Board::from_tfn(test_positions::WIN_IN_ONE).unwrap();
        let mut config = config_with_depth(3);
        config.rules.safety_zone_count = 1;
        let result = MinimaxAI::new().search(&board, &config).unwrap();
        assert_eq!(result.best.mv, TowerMove::from_tfn_str("c1c0").unwrap());
        assert_eq!(result.best.score, f64::INFINITY);
    }

    #[test]
    fn test_rejects_minimizing_player() {
        let board = Board::from_tfn(test_positions::START).unwrap();
        let mut board_b = board.clone();
        board_b.switch_turn();
        let err = MinimaxAI::new()
            .search(&board_b, &config_with_depth(2))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInvocation(_)));
    }

    #[test]
    fn test_no_legal_moves() {
        let board = Board::from_tfn(test_positions::A_BOXED_IN).unwrap();
        let err = MinimaxAI::new()
            .search(&board, &config_with_depth(2))
            .unwrap_err();
        assert!(matches!(err, EngineError::NoLegalMoves(Side::A)));
    }

    #[test]
    fn test_search_leaves_board_untouched() {
        let board = Board::from_tfn(test_positions::MID_STACKS).unwrap();
        let snapshot = board.clone();
        MinimaxAI::new().search(&board, &config_with_depth(3)).unwrap();
        assert_eq!(board, snapshot);
    }

    #[test]
    fn test_undo_is_exact_inside_search() {
        // 手动走一遍搜索的走子/撤销路径，每层比对
        fn walk(board: &mut Board, config: &Config, depth: u32) {
            if depth == 0 {
                return;
            }
            let side = board.current_turn();
            for mv in board.legal_moves(side) {
                let before = board.clone();
                let logged = board
                    .apply_move_and_turn(&mv, config.rules.max_stack_size)
                    .unwrap();
                let mut probe = board.clone();
                if eval::terminal_score(&mut probe, config).is_none() {
                    walk(board, config, depth - 1);
                }
                board.undo_move(&logged);
                assert_eq!(*board, before);
            }
        }

        let config = config_with_depth(3);
        let mut board = Board::from_tfn(test_positions::MID_STACKS).unwrap();
        walk(&mut board, &config, 3);
    }

    #[test]
    fn test_alpha_beta_matches_full_width() {
        let mut boards = vec![
            Board::from_tfn(test_positions::START).unwrap(),
            Board::from_tfn(test_positions::MID_STACKS).unwrap(),
            Board::from_tfn(test_positions::RACE_HOME).unwrap(),
        ];
        boards.extend(test_positions::random_positions(Side::A, 12, 24, 99));

        for depth in 1..=3 {
            let config = config_with_depth(depth);
            for board in &boards {
                if board.legal_moves(board.current_turn()).is_empty() {
                    continue;
                }
                let pruned = MinimaxAI::new().score_root_moves(board, &config).unwrap();
                let full = FullWidthAI.score_root_moves(board, &config).unwrap();
                assert_eq!(pruned, full, "depth {} on {}", depth, board.to_tfn());

                let best = MinimaxAI::new().search(board, &config).unwrap().best;
                let reference = FullWidthAI.select_best_move(board, &config).unwrap();
                assert_eq!(best, reference, "depth {} on {}", depth, board.to_tfn());
            }
        }
    }

    #[test]
    fn test_pruning_reduces_nodes() {
        let board = Board::from_tfn(test_positions::MID_STACKS).unwrap();
        let result = MinimaxAI::new().search(&board, &config_with_depth(3)).unwrap();
        assert!(result.stats.cutoffs > 0);
        assert!(result.stats.nodes > 0);
    }

    #[test]
    fn test_stop_flag_cancels() {
        let stop = Arc::new(AtomicBool::new(true));
        let board = Board::from_tfn(test_positions::MID_STACKS).unwrap();
        let err = MinimaxAI::with_stop_flag(stop)
            .search(&board, &config_with_depth(6))
            .unwrap_err();
        assert!(matches!(err, EngineError::Cancelled));
    }

    #[test]
    fn test_select_moves_agrees_with_search() {
        let board = Board::from_tfn(test_positions::MID_STACKS).unwrap();
        let config = config_with_depth(2);
        let ai = MinimaxAI::new();
        let top = ai.select_moves(&board, &config, 5).unwrap();
        assert_eq!(top.len(), 5);
        assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(top[0], ai.select_best_move(&board, &config).unwrap());
    }

    #[test]
    fn test_self_play_completes() {
        let config = config_with_depth(2);
        let ai = MinimaxAI::new();
        let opponent = RandomAI::new(Some(3));
        let mut board = Board::from_tfn(test_positions::START).unwrap();

        for _ in 0..60 {
            let side = board.current_turn();
            let mut probe = board.clone();
            if eval::terminal_score(&mut probe, &config).is_some() {
                break;
            }
            if board.legal_moves(side).is_empty() {
                break;
            }
            let chosen = if board.player(side).is_maximizing {
                ai.select_best_move(&board, &config).unwrap()
            } else {
                opponent.select_best_move(&board, &config).unwrap()
            };
            assert!(board.is_legal(&chosen.mv));
            board
                .apply_move_and_turn(&chosen.mv, config.rules.max_stack_size)
                .unwrap();
        }
    }
}
