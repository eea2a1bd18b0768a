//! 塔棋测试局面库
//!
//! 提供命名的 TFN 测试局面，方便测试和调试
//!
//! 除特别说明外，均为 A 方行棋、电脑执 A。

use crate::ai::RandomAI;
use crate::board::Board;
use crate::config::Config;
use crate::types::Side;
use rand::prelude::*;

// =============================================================================
// 开局
// =============================================================================

/// 初始局面 - 双方各六座单层塔排在自己的起始行
pub const START: &str = "B-B-B-B-B-B-/6/6/6/6/A+A+A+A+A+A+ 0:0:0:- 0:0:0:- a a";

// =============================================================================
// 走法生成
// =============================================================================

/// 角上孤塔 (a2)，用于检查横走的环绕顺序
pub const LONE_A_CORNER: &str = "B-5/6/6/A+5/6/6 0:0:0:- 0:0:0:- a a";

/// A 方折返塔在 c2 往回走，f4 有一座 B 塔
pub const A_RETURNING: &str = "6/5B-/6/2A-*3/6/6 0:0:0:- 0:0:0:- a a";

/// A 方所有塔都无路可走 (A 刚横走过，被锁)
pub const A_BOXED_IN: &str = "A-*2B-2/A+5/A+5/6/6/6 0:0:0:L 0:0:0:- a a";

// =============================================================================
// 中局
// =============================================================================

/// 混合塔、折返塔、金库计数和横走锁
pub const MID_STACKS: &str =
    "B-2BA-*2/1A+4/2AB-3/B+*5/3A+1B-/A+5 1:0:1:- 0:1:0:L a a";

/// 双方折返塔争先回家
pub const RACE_HOME: &str = "6/6/4A-*1/6/1B+*A-*3/6 0:0:0:- 0:0:0:- a a";

// =============================================================================
// 胜负
// =============================================================================

/// 一步回家 (c1c0)，安全区为 1 时直接获胜
pub const WIN_IN_ONE: &str = "B-5/6/6/6/2A-*3/6 0:0:0:- 0:0:0:- a a";

/// 非法局面：折返塔停在自己的起始行
pub const INVALID_REVERSED_HOME: &str = "B-5/6/6/6/6/A-*5 0:0:0:- 0:0:0:- a a";

// =============================================================================
// 随机局面
// =============================================================================

/// 从初始局面随机对弈生成局面
///
/// 只保留未分胜负、轮到电脑方且电脑方有棋可走的局面，数量可能少于 `count`。
pub fn random_positions(bot: Side, count: usize, max_plies: usize, seed: u64) -> Vec<Board> {
    let config = Config::default();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions = Vec::with_capacity(count);

    for _ in 0..count {
        let mut board = Board::start(bot, bot);
        // 偶数步后轮回电脑方
        let plies = rng.gen_range(1..=(max_plies / 2).max(1)) * 2;

        for _ in 0..plies {
            let moves = board.legal_moves(board.current_turn());
            let Some(mv) = RandomAI::choose(&moves, &mut rng) else {
                break;
            };
            if board
                .apply_move_and_turn(&mv, config.rules.max_stack_size)
                .is_err()
            {
                break;
            }
            if is_decided(&board, &config) {
                break;
            }
        }

        if board.current_turn() == bot
            && !is_decided(&board, &config)
            && !board.legal_moves(bot).is_empty()
        {
            positions.push(board);
        }
    }

    positions
}

fn is_decided(board: &Board, config: &Config) -> bool {
    let mut probe = board.clone();
    probe.check_win(Side::A, config) || probe.check_win(Side::B, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_positions_parse() {
        for tfn in [
            START,
            LONE_A_CORNER,
            A_RETURNING,
            A_BOXED_IN,
            MID_STACKS,
            RACE_HOME,
            WIN_IN_ONE,
        ] {
            assert!(Board::from_tfn(tfn).is_ok(), "{}", tfn);
        }
        assert!(Board::from_tfn(INVALID_REVERSED_HOME).is_ok());
    }

    #[test]
    fn test_random_positions_are_playable() {
        let boards = random_positions(Side::B, 8, 16, 3);
        assert!(!boards.is_empty());
        for board in &boards {
            assert_eq!(board.current_turn(), Side::B);
            assert!(board.player(Side::B).is_maximizing);
            assert!(board.validate().is_ok());
        }
    }
}
