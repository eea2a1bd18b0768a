//! 对局循环
//!
//! 真实对局中的单步走子：校验合法性、走子换手、胜负判定、悔棋。

use crate::ai::{search_with_timeout, ScoredMove};
use crate::board::Board;
use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::rules::LoggedMove;
use crate::types::{GameResult, Side, TowerMove};
use log::info;

pub struct Game {
    board: Board,
    config: Config,
    history: Vec<LoggedMove>,
    result: GameResult,
}

impl Game {
    /// 标准开局，电脑执 A 先行
    pub fn new(config: Config) -> Result<Self> {
        Game::with_board(Board::start(Side::A, Side::A), config)
    }

    pub fn with_board(board: Board, config: Config) -> Result<Self> {
        config.validate()?;
        board.validate()?;
        Ok(Game {
            board,
            config,
            history: Vec::new(),
            result: GameResult::Ongoing,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn history(&self) -> impl Iterator<Item = &TowerMove> {
        self.history.iter().map(|l| &l.mv)
    }

    /// 走一步
    ///
    /// 走完后先判行棋方、再判对方。若对方无子可走，判行棋方胜。
    pub fn play(&mut self, mv: TowerMove) -> Result<GameResult> {
        if self.result != GameResult::Ongoing {
            return Err(EngineError::InvalidMove(format!(
                "game is over ({:?})",
                self.result
            )));
        }
        let mover = self.board.current_turn();
        if !self.board.is_playable(&mv) {
            return Err(EngineError::InvalidMove(format!(
                "{} is not legal for {}",
                mv, mover
            )));
        }

        let logged = self
            .board
            .apply_move_and_turn(&mv, self.config.rules.max_stack_size)?;
        self.history.push(logged);

        if self.board.check_win(mover, &self.config) {
            self.result = GameResult::winner(mover);
        } else if self.board.check_win(mover.opposite(), &self.config) {
            self.result = GameResult::winner(mover.opposite());
        } else if self.board.legal_moves(mover.opposite()).is_empty() {
            self.board.player_mut(mover).is_winner = true;
            self.result = GameResult::winner(mover);
        }

        if self.result != GameResult::Ongoing {
            info!("{:?} after {} moves", self.result, self.history.len());
        }
        Ok(self.result)
    }

    /// 电脑走一步（带时间限制的搜索）
    pub fn bot_move(&mut self) -> Result<(ScoredMove, GameResult)> {
        let side = self.board.current_turn();
        if !self.board.player(side).is_maximizing {
            return Err(EngineError::InvalidInvocation(format!(
                "it is {}'s turn, not the bot's",
                side
            )));
        }
        let result = search_with_timeout(&self.board, &self.config)?;
        let outcome = self.play(result.best.mv)?;
        Ok((result.best, outcome))
    }

    /// 悔棋，返回被撤销的走法
    pub fn undo(&mut self) -> Option<TowerMove> {
        let logged = self.history.pop()?;
        self.board.undo_move(&logged);
        self.result = GameResult::Ongoing;
        Some(logged.mv)
    }
}
