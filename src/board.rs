//! 塔棋棋盘数据模型
//!
//! 36 个格子的定长数组 + 两个玩家状态。只包含数据和访问器，
//! 走法规则见 `rules` 模块。

use crate::error::{EngineError, Result};
use crate::notation::{parse_tfn, to_tfn};
use crate::types::{Position, Side, COUNTER_CAP, NUM_CELLS};
use serde::{Deserialize, Serialize};

/// 格子：一座塔（可能为空）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// 塔层归属，自底向上
    pub stack: Vec<Side>,
    /// 移动方向：+1、-1，空格为 0
    pub direction: i8,
    /// 已到达对方底线、正在折返（"点"）
    pub reversed: bool,
}

impl Cell {
    /// 新塔
    pub fn tower(stack: Vec<Side>, direction: i8, reversed: bool) -> Self {
        Cell {
            stack,
            direction,
            reversed,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// 塔顶归属方，即这座塔的控制方
    #[inline]
    pub fn top(&self) -> Option<Side> {
        self.stack.last().copied()
    }

    /// 清空格子
    #[inline]
    pub fn clear(&mut self) {
        self.stack.clear();
        self.direction = 0;
        self.reversed = false;
    }

    /// 检查格子不变量
    pub fn check(&self) -> std::result::Result<(), String> {
        if self.stack.is_empty() {
            if self.direction != 0 {
                return Err("empty cell must have direction 0".to_string());
            }
            if self.reversed {
                return Err("empty cell cannot be reversed".to_string());
            }
        } else if self.direction != 1 && self.direction != -1 {
            return Err(format!("tower direction must be +1 or -1, got {}", self.direction));
        }
        Ok(())
    }
}

/// 金库：叠塔溢出时从底部移除并计入的棋子
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    pub own: u8,
    pub opponent: u8,
}

/// 玩家状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// 最大化方（电脑），整局固定
    pub is_maximizing: bool,
    pub has_turn: bool,
    /// 横向走法锁：上一步是横走时，下一步不能再横走
    pub last_move_was_lateral: bool,
    /// 已送回安全区的塔数
    pub towers_secured: u8,
    pub vault: Vault,
    pub is_winner: bool,
}

/// 棋盘（游戏状态）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; NUM_CELLS],
    players: [PlayerState; 2],
}

impl Board {
    /// 空棋盘
    pub fn empty(turn: Side, bot: Side) -> Self {
        let mut players = [PlayerState::default(); 2];
        players[turn.index()].has_turn = true;
        players[bot.index()].is_maximizing = true;
        Board {
            cells: std::array::from_fn(|_| Cell::default()),
            players,
        }
    }

    /// 标准开局：A 占满第 0 行，B 占满第 5 行
    pub fn start(turn: Side, bot: Side) -> Self {
        let mut board = Board::empty(turn, bot);
        for side in [Side::A, Side::B] {
            for col in 0..6 {
                let pos = Position::new(side.origin_row(), col);
                board.set_cell(pos, Cell::tower(vec![side], side.forward(), false));
            }
        }
        board
    }

    /// 从格子和玩家状态构建，并检查不变量
    pub fn from_parts(cells: Vec<Cell>, players: [PlayerState; 2]) -> Result<Self> {
        let cells: [Cell; NUM_CELLS] = cells.try_into().map_err(|v: Vec<Cell>| {
            EngineError::InvalidState(format!("expected {} cells, got {}", NUM_CELLS, v.len()))
        })?;
        let board = Board { cells, players };
        board.validate()?;
        Ok(board)
    }

    /// 从 TFN 记谱创建棋盘
    pub fn from_tfn(tfn: &str) -> Result<Board> {
        parse_tfn(tfn)
    }

    /// 转换为 TFN 记谱
    pub fn to_tfn(&self) -> String {
        to_tfn(self)
    }

    /// 检查全局不变量
    pub fn validate(&self) -> Result<()> {
        for (idx, cell) in self.cells.iter().enumerate() {
            cell.check().map_err(|e| {
                EngineError::InvalidState(format!("cell {}: {}", Position::from_index(idx), e))
            })?;
        }

        let turns = self.players.iter().filter(|p| p.has_turn).count();
        if turns != 1 {
            return Err(EngineError::InvalidState(format!(
                "exactly one player must have the turn, got {}",
                turns
            )));
        }
        let bots = self.players.iter().filter(|p| p.is_maximizing).count();
        if bots != 1 {
            return Err(EngineError::InvalidState(format!(
                "exactly one player must be maximizing, got {}",
                bots
            )));
        }
        for (side, p) in [Side::A, Side::B].iter().zip(self.players.iter()) {
            if p.towers_secured > COUNTER_CAP
                || p.vault.own > COUNTER_CAP
                || p.vault.opponent > COUNTER_CAP
            {
                return Err(EngineError::InvalidState(format!(
                    "player {} counters exceed {}",
                    side, COUNTER_CAP
                )));
            }
        }
        Ok(())
    }

    /// 获取某位置的格子
    #[inline]
    pub fn cell(&self, pos: Position) -> &Cell {
        &self.cells[pos.to_index()]
    }

    #[inline]
    pub(crate) fn cell_mut(&mut self, pos: Position) -> &mut Cell {
        &mut self.cells[pos.to_index()]
    }

    /// 覆盖某位置的格子（布局、测试用）
    pub fn set_cell(&mut self, pos: Position, cell: Cell) {
        self.cells[pos.to_index()] = cell;
    }

    pub fn cells(&self) -> &[Cell; NUM_CELLS] {
        &self.cells
    }

    /// 某位置的塔顶归属
    #[inline]
    pub fn top_owner(&self, pos: Position) -> Option<Side> {
        if !pos.is_valid() {
            return None;
        }
        self.cells[pos.to_index()].top()
    }

    #[inline]
    pub fn player(&self, side: Side) -> &PlayerState {
        &self.players[side.index()]
    }

    #[inline]
    pub fn player_mut(&mut self, side: Side) -> &mut PlayerState {
        &mut self.players[side.index()]
    }

    pub fn players(&self) -> &[PlayerState; 2] {
        &self.players
    }

    #[inline]
    pub(crate) fn set_players(&mut self, players: [PlayerState; 2]) {
        self.players = players;
    }

    /// 当前行棋方
    #[inline]
    pub fn current_turn(&self) -> Side {
        if self.players[0].has_turn {
            Side::A
        } else {
            Side::B
        }
    }

    /// 电脑方（最大化方）
    #[inline]
    pub fn bot_side(&self) -> Side {
        if self.players[0].is_maximizing {
            Side::A
        } else {
            Side::B
        }
    }

    /// 某方控制的所有塔的位置（按格子编号排序）
    pub fn towers(&self, side: Side) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.top() == Some(side))
            .map(|(idx, _)| Position::from_index(idx))
    }

    /// 某方控制的塔数
    pub fn tower_count(&self, side: Side) -> usize {
        self.cells.iter().filter(|c| c.top() == Some(side)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_board() {
        let board = Board::start(Side::A, Side::A);
        assert_eq!(board.tower_count(Side::A), 6);
        assert_eq!(board.tower_count(Side::B), 6);
        assert_eq!(board.current_turn(), Side::A);
        assert_eq!(board.bot_side(), Side::A);
        assert_eq!(board.cell(Position::new(5, 3)).direction, -1);
        assert!(board.validate().is_ok());
    }

    #[test]
    fn test_cell_invariants() {
        assert!(Cell::default().check().is_ok());
        assert!(Cell::tower(vec![], 1, false).check().is_err());
        assert!(Cell::tower(vec![], 0, true).check().is_err());
        assert!(Cell::tower(vec![Side::A], 0, false).check().is_err());
        assert!(Cell::tower(vec![Side::B, Side::A], -1, true).check().is_ok());
    }

    #[test]
    fn test_from_parts_rejects_bad_cell_count() {
        let players = *Board::empty(Side::A, Side::A).players();
        let err = Board::from_parts(vec![Cell::default(); 35], players).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
    }

    #[test]
    fn test_validate_turn_and_bot() {
        let mut board = Board::empty(Side::A, Side::B);
        board.player_mut(Side::B).has_turn = true;
        assert!(board.validate().is_err());

        let mut board = Board::empty(Side::A, Side::B);
        board.player_mut(Side::A).is_maximizing = true;
        assert!(board.validate().is_err());

        let mut board = Board::empty(Side::A, Side::B);
        board.player_mut(Side::A).vault.opponent = 7;
        assert!(board.validate().is_err());
    }

    #[test]
    fn test_towers_order() {
        let board = Board::start(Side::B, Side::A);
        let a: Vec<Position> = board.towers(Side::A).collect();
        assert_eq!(a.len(), 6);
        assert_eq!(a[0], Position::new(0, 0));
        assert_eq!(a[5], Position::new(0, 5));
    }
}
