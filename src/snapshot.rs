//! JSON 快照
//!
//! 与外部序列化层约定的局面结构：36 个格子（塔层、方向、折返标记）
//! 和两个玩家的全部计数器。

use crate::board::{Board, Cell, PlayerState};
use crate::error::Result;
use crate::types::Side;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayersSnapshot {
    pub a: PlayerState,
    pub b: PlayerState,
}

/// 局面快照，格子按编号 `row * 6 + col` 排列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub cells: Vec<Cell>,
    pub players: PlayersSnapshot,
}

impl Board {
    pub fn to_snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            cells: self.cells().to_vec(),
            players: PlayersSnapshot {
                a: *self.player(Side::A),
                b: *self.player(Side::B),
            },
        }
    }

    /// 从快照构建，检查全部不变量
    pub fn from_snapshot(snapshot: GameSnapshot) -> Result<Board> {
        Board::from_parts(snapshot.cells, [snapshot.players.a, snapshot.players.b])
    }

    pub fn from_json(json: &str) -> Result<Board> {
        let snapshot: GameSnapshot = serde_json::from_str(json)?;
        Board::from_snapshot(snapshot)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_snapshot())?)
    }
}
