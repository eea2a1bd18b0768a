//! 局面评估
//!
//! 以电脑方（最大化方）视角打分。先判胜负（±∞），再算启发式：
//! 场上塔数、折返塔离安全区的距离、金库中的对方棋子。

use crate::board::Board;
use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::types::{Position, Side};
use serde::Serialize;

/// 评估分项
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EvalDetail {
    pub material: f64,
    pub proximity: f64,
    pub imminent: f64,
    pub accounted: f64,
    pub total: f64,
}

/// 单方的统计
#[derive(Debug, Clone, Copy, Default)]
struct SideTally {
    towers: u32,
    distance_sum: u32,
    proximity: f64,
}

/// 胜负分：电脑方胜 +∞，玩家方胜 -∞，未分胜负 None
///
/// 会通过 `check_win` 设置获胜方的 `is_winner`。
pub fn terminal_score(board: &mut Board, config: &Config) -> Option<f64> {
    let bot = board.bot_side();
    if board.check_win(bot, config) {
        return Some(f64::INFINITY);
    }
    if board.check_win(bot.opposite(), config) {
        return Some(f64::NEG_INFINITY);
    }
    None
}

/// 先判胜负再估值
pub fn score_position(board: &mut Board, config: &Config) -> Result<f64> {
    match terminal_score(board, config) {
        Some(score) => Ok(score),
        None => evaluate(board, config),
    }
}

/// 静态评估（不判胜负）
pub fn evaluate(board: &Board, config: &Config) -> Result<f64> {
    Ok(evaluate_detail(board, config)?.total)
}

/// 静态评估，返回分项
pub fn evaluate_detail(board: &Board, config: &Config) -> Result<EvalDetail> {
    let weights = &config.weights;
    let rules = &config.rules;
    let track_safety = rules.safety_zone_count > 0;

    let mut tally = [SideTally::default(); 2];

    for (idx, cell) in board.cells().iter().enumerate() {
        let owner = match cell.top() {
            Some(side) => side,
            None => continue,
        };
        let t = &mut tally[owner.index()];
        t.towers += 1;

        if track_safety && cell.reversed {
            let pos = Position::from_index(idx);
            let distance = distance_to_safety(pos, owner);
            if !(1..=5).contains(&distance) {
                return Err(EngineError::InvalidState(format!(
                    "reversed tower at {} is {} rows from safety",
                    pos, distance
                )));
            }
            t.distance_sum += distance;
            t.proximity += weights.proximity.by_distance[distance as usize - 1];
        }
    }

    let bot = tally[board.bot_side().index()];
    let user = tally[board.bot_side().opposite().index()];

    let mut detail = EvalDetail {
        material: (bot.towers as f64 - weights.material.opponent * user.towers as f64)
            * weights.material.total,
        ..Default::default()
    };

    if track_safety {
        let p = &weights.proximity;
        detail.proximity = ((bot.proximity - p.opponent * user.proximity) * p.total).round();

        let threshold = weights.total_distance.threshold;
        let imminent = |t: SideTally| {
            if t.distance_sum <= threshold {
                1.0
            } else {
                0.0
            }
        };
        detail.imminent = (imminent(bot) - weights.defensive.multiplier * imminent(user))
            * weights.total_distance.weight;
    }

    if rules.opponent_vault_threshold > 0 {
        let bot_vault = board.player(board.bot_side()).vault.opponent as f64;
        let user_vault = board.player(board.bot_side().opposite()).vault.opponent as f64;
        detail.accounted = (bot_vault - user_vault) * weights.accounted.total;
    }

    detail.total = detail.material + detail.proximity + detail.imminent + detail.accounted;
    Ok(detail)
}

/// 折返塔距本方底线的行数
#[inline]
fn distance_to_safety(pos: Position, owner: Side) -> u32 {
    (pos.row - owner.origin_row()).unsigned_abs() as u32
}
