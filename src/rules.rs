//! 走法规则
//!
//! 走法生成、执行（叠塔、折返、安全区回收、金库计数）、撤销和胜负判定。

use crate::board::{Board, Cell, PlayerState};
use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::types::{Position, Side, TowerMove, COUNTER_CAP};

/// 已执行的走法，保存撤销所需的全部信息
///
/// 只记录会被修改的字段：起点、终点两个格子和两个玩家状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedMove {
    pub mv: TowerMove,
    pub from_cell: Cell,
    pub to_cell: Cell,
    pub players: [PlayerState; 2],
}

#[inline]
fn bump(counter: &mut u8) {
    *counter = (*counter + 1).min(COUNTER_CAP);
}

impl Board {
    /// 某个塔的所有合法目标格
    ///
    /// 顺序：前 1、前 2、左 1、左 2、右 1、右 2。横向候选按列循环，
    /// 仅在塔主上一步不是横走时生成。目标格塔顶不能是己方。
    pub fn legal_targets(&self, from: Position) -> Vec<Position> {
        let mut targets = Vec::with_capacity(6);
        let cell = self.cell(from);
        let owner = match cell.top() {
            Some(side) => side,
            None => return targets,
        };

        let can_land = |pos: Position| self.top_owner(pos) != Some(owner);

        for steps in [1, 2] {
            if let Some(pos) = from.step_rows(cell.direction * steps) {
                if can_land(pos) {
                    targets.push(pos);
                }
            }
        }

        if !self.player(owner).last_move_was_lateral {
            for delta in [-1, -2, 1, 2] {
                let pos = from.wrap_cols(delta);
                if can_land(pos) {
                    targets.push(pos);
                }
            }
        }

        targets
    }

    /// 某方的所有合法走法（按格子编号，再按目标顺序）
    pub fn legal_moves(&self, side: Side) -> Vec<TowerMove> {
        let mut moves = Vec::with_capacity(32);
        for from in self.towers(side) {
            for to in self.legal_targets(from) {
                moves.push(TowerMove::new(from, to));
            }
        }
        moves
    }

    /// 走法是否合法
    pub fn is_legal(&self, mv: &TowerMove) -> bool {
        mv.from_pos.is_valid()
            && mv.to_pos.is_valid()
            && self.legal_targets(mv.from_pos).contains(&mv.to_pos)
    }

    /// 当前行棋方能否走这一步
    pub fn is_playable(&self, mv: &TowerMove) -> bool {
        self.top_owner(mv.from_pos) == Some(self.current_turn()) && self.is_legal(mv)
    }

    /// 执行走法（不切换回合），返回撤销记录
    ///
    /// 不检查几何合法性，只拒绝空起点和同色叠塔。
    pub fn apply_move(&mut self, mv: &TowerMove, max_stack_size: usize) -> Result<LoggedMove> {
        let (from, to) = (mv.from_pos, mv.to_pos);
        if !from.is_valid() || !to.is_valid() || from == to {
            return Err(EngineError::InvalidMove(format!("bad coordinates {}", mv)));
        }
        let mover = self
            .top_owner(from)
            .ok_or_else(|| EngineError::InvalidMove(format!("no tower at {}", from)))?;
        if self.top_owner(to) == Some(mover) {
            return Err(EngineError::InvalidMove(format!(
                "{} cannot stack onto own tower at {}",
                mover, to
            )));
        }

        let logged = LoggedMove {
            mv: *mv,
            from_cell: self.cell(from).clone(),
            to_cell: self.cell(to).clone(),
            players: *self.players(),
        };

        let source = std::mem::take(self.cell_mut(from));
        let mut target = std::mem::take(self.cell_mut(to));

        // 叠塔：溢出时从底部移除，计入行棋方金库
        if target.is_empty() {
            target.stack = source.stack;
        } else {
            let vault = &mut self.player_mut(mover).vault;
            for token in source.stack {
                target.stack.push(token);
                if target.stack.len() > max_stack_size {
                    let removed = target.stack.remove(0);
                    if removed == mover {
                        bump(&mut vault.own);
                    } else {
                        bump(&mut vault.opponent);
                    }
                }
            }
        }
        target.direction = source.direction;
        target.reversed = source.reversed;

        // 到达对方底线：折返
        if to.row == mover.far_row() && !target.reversed {
            target.direction = -target.direction;
            target.reversed = true;
        }

        // 折返后回到本方底线：送入安全区
        if to.row == mover.origin_row() && target.reversed {
            target.clear();
            bump(&mut self.player_mut(mover).towers_secured);
        }

        *self.cell_mut(to) = target;
        self.player_mut(mover).last_move_was_lateral = mv.is_lateral();

        Ok(logged)
    }

    /// 切换回合
    #[inline]
    pub fn switch_turn(&mut self) {
        for side in [Side::A, Side::B] {
            let p = self.player_mut(side);
            p.has_turn = !p.has_turn;
        }
    }

    /// 执行走法并切换回合
    pub fn apply_move_and_turn(
        &mut self,
        mv: &TowerMove,
        max_stack_size: usize,
    ) -> Result<LoggedMove> {
        let logged = self.apply_move(mv, max_stack_size)?;
        self.switch_turn();
        Ok(logged)
    }

    /// 撤销走法，精确恢复两个格子和两个玩家状态
    pub fn undo_move(&mut self, logged: &LoggedMove) {
        *self.cell_mut(logged.mv.from_pos) = logged.from_cell.clone();
        *self.cell_mut(logged.mv.to_pos) = logged.to_cell.clone();
        self.set_players(logged.players);
    }

    /// 判断某方是否获胜，获胜时置 `is_winner`
    ///
    /// `opponent_vault_threshold` 或 `safety_zone_count` 为 0 时，对应的胜利条件关闭。
    ///
    /// 清盘条件只在该方刚走完（不是该方回合）时判定：对方无塔，
    /// 或己方无塔（所有塔都已送回安全区）。
    pub fn check_win(&mut self, side: Side, config: &Config) -> bool {
        let rules = &config.rules;
        let player = self.player(side);

        let vault_win = rules.opponent_vault_threshold > 0
            && player.vault.opponent >= rules.opponent_vault_threshold;
        let safety_win =
            rules.safety_zone_count > 0 && player.towers_secured >= rules.safety_zone_count;
        let wipeout_win = !player.has_turn
            && (self.tower_count(side.opposite()) == 0 || self.tower_count(side) == 0);

        let won = vault_win || safety_win || wipeout_win;
        if won {
            self.player_mut(side).is_winner = true;
        }
        won
    }
}
