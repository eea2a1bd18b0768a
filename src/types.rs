//! 塔棋核心类型定义
//!
//! 定义塔棋中所有基础数据类型

use serde::{Deserialize, Serialize};
use std::fmt;

/// 棋盘边长（6x6）
pub const BOARD_SIZE: i8 = 6;

/// 格子总数
pub const NUM_CELLS: usize = 36;

/// 计数器上限（金库、安全区）
pub const COUNTER_CAP: u8 = 6;

/// 玩家/阵营
///
/// 塔的每一层都记录归属方，因此 `Side` 同时也是棋子标记。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// 获取对方阵营
    pub fn opposite(&self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// 玩家数组下标
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    /// 出发方向：A 向 row 增大方向走，B 反之
    #[inline]
    pub fn forward(&self) -> i8 {
        match self {
            Side::A => 1,
            Side::B => -1,
        }
    }

    /// 本方底线（安全区）
    #[inline]
    pub fn origin_row(&self) -> i8 {
        match self {
            Side::A => 0,
            Side::B => BOARD_SIZE - 1,
        }
    }

    /// 对方底线（折返线）
    #[inline]
    pub fn far_row(&self) -> i8 {
        self.opposite().origin_row()
    }

    /// 从记谱字符解析（回合/电脑方字段，小写）
    pub fn from_tfn_char(c: char) -> Option<Side> {
        match c {
            'a' => Some(Side::A),
            'b' => Some(Side::B),
            _ => None,
        }
    }

    /// 转换为记谱字符（小写）
    pub fn to_tfn_char(&self) -> char {
        match self {
            Side::A => 'a',
            Side::B => 'b',
        }
    }

    /// 塔层标记（大写）
    pub fn from_token(c: char) -> Option<Side> {
        match c {
            'A' => Some(Side::A),
            'B' => Some(Side::B),
            _ => None,
        }
    }

    pub fn to_token(&self) -> char {
        match self {
            Side::A => 'A',
            Side::B => 'B',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_token())
    }
}

/// 棋盘位置 (row, col)
///
/// row: 0-5 (0 是 A 方底线，5 是 B 方底线)
/// col: 0-5 (从左到右，横向走法在两侧边缘循环)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: i8,
    pub col: i8,
}

impl Position {
    pub fn new(row: i8, col: i8) -> Self {
        Position { row, col }
    }

    /// 检查位置是否在棋盘范围内
    #[inline]
    pub fn is_valid(&self) -> bool {
        (0..BOARD_SIZE).contains(&self.row) && (0..BOARD_SIZE).contains(&self.col)
    }

    /// 格子编号 `row * 6 + col`
    #[inline]
    pub fn to_index(&self) -> usize {
        (self.row as usize) * (BOARD_SIZE as usize) + self.col as usize
    }

    #[inline]
    pub fn from_index(idx: usize) -> Position {
        Position {
            row: (idx / BOARD_SIZE as usize) as i8,
            col: (idx % BOARD_SIZE as usize) as i8,
        }
    }

    /// 纵向偏移，出界返回 None
    #[inline]
    pub fn step_rows(&self, delta: i8) -> Option<Position> {
        let pos = Position::new(self.row + delta, self.col);
        pos.is_valid().then_some(pos)
    }

    /// 横向偏移，列号按 6 取模循环
    #[inline]
    pub fn wrap_cols(&self, delta: i8) -> Position {
        Position::new(self.row, (self.col + delta).rem_euclid(BOARD_SIZE))
    }

    /// 从记谱坐标解析（如 "a0"）
    pub fn from_tfn_str(s: &str) -> Option<Position> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let col = match bytes[0] {
            b'a'..=b'f' => (bytes[0] - b'a') as i8,
            _ => return None,
        };
        let row = match bytes[1] {
            b'0'..=b'5' => (bytes[1] - b'0') as i8,
            _ => return None,
        };
        Some(Position { row, col })
    }

    /// 转换为记谱坐标（如 "a0"）
    pub fn to_tfn_str(&self) -> String {
        let col_char = (b'a' + self.col as u8) as char;
        format!("{}{}", col_char, self.row)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_tfn_str())
    }
}

/// 走法：起点格 + 终点格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TowerMove {
    pub from_pos: Position,
    pub to_pos: Position,
}

impl TowerMove {
    pub fn new(from: Position, to: Position) -> Self {
        TowerMove {
            from_pos: from,
            to_pos: to,
        }
    }

    /// 是否为横向走法（同一行）
    #[inline]
    pub fn is_lateral(&self) -> bool {
        self.from_pos.row == self.to_pos.row
    }

    /// 从记谱走法字符串解析，格式 `a0a1`
    pub fn from_tfn_str(s: &str) -> Option<TowerMove> {
        let s = s.trim();
        if s.len() != 4 || !s.is_ascii() {
            return None;
        }
        let from_pos = Position::from_tfn_str(&s[0..2])?;
        let to_pos = Position::from_tfn_str(&s[2..4])?;
        Some(TowerMove { from_pos, to_pos })
    }

    pub fn to_tfn_str(&self) -> String {
        format!("{}{}", self.from_pos.to_tfn_str(), self.to_pos.to_tfn_str())
    }
}

impl fmt::Display for TowerMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_tfn_str())
    }
}

/// 游戏结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Ongoing,
    AWins,
    BWins,
}

impl GameResult {
    pub fn winner(side: Side) -> GameResult {
        match side {
            Side::A => GameResult::AWins,
            Side::B => GameResult::BWins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_from_tfn_str() {
        assert_eq!(Position::from_tfn_str("a0"), Some(Position::new(0, 0)));
        assert_eq!(Position::from_tfn_str("c4"), Some(Position::new(4, 2)));
        assert_eq!(Position::from_tfn_str("f5"), Some(Position::new(5, 5)));
        assert_eq!(Position::from_tfn_str("g0"), None);
        assert_eq!(Position::from_tfn_str("a6"), None);
    }

    #[test]
    fn test_position_index() {
        for idx in 0..NUM_CELLS {
            let pos = Position::from_index(idx);
            assert!(pos.is_valid());
            assert_eq!(pos.to_index(), idx);
        }
        assert_eq!(Position::new(2, 3).to_index(), 15);
    }

    #[test]
    fn test_wrap_cols() {
        let pos = Position::new(3, 0);
        assert_eq!(pos.wrap_cols(-1), Position::new(3, 5));
        assert_eq!(pos.wrap_cols(-2), Position::new(3, 4));
        assert_eq!(Position::new(3, 5).wrap_cols(2), Position::new(3, 1));
    }

    #[test]
    fn test_step_rows_edges() {
        assert_eq!(Position::new(4, 1).step_rows(2), None);
        assert_eq!(Position::new(1, 1).step_rows(-2), None);
        assert_eq!(Position::new(1, 1).step_rows(-1), Some(Position::new(0, 1)));
    }

    #[test]
    fn test_move_from_tfn_str() {
        let m = TowerMove::from_tfn_str("a0a1").unwrap();
        assert_eq!(m.from_pos, Position::new(0, 0));
        assert_eq!(m.to_pos, Position::new(1, 0));
        assert!(!m.is_lateral());
        assert!(TowerMove::from_tfn_str("a0f0").unwrap().is_lateral());
        assert!(TowerMove::from_tfn_str("a0a").is_none());
        assert_eq!(m.to_string(), "a0a1");
    }

    #[test]
    fn test_side_geometry() {
        assert_eq!(Side::A.origin_row(), 0);
        assert_eq!(Side::A.far_row(), 5);
        assert_eq!(Side::B.origin_row(), 5);
        assert_eq!(Side::B.far_row(), 0);
        assert_eq!(Side::B.forward(), -1);
    }
}
