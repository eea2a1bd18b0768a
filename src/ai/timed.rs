//! 限时搜索
//!
//! 搜索算法本身是同步的；时间限制在调用侧施加：工作线程执行搜索，
//! 超时后置位取消标志并丢弃结果（不返回半成品走法）。

use super::minimax::MinimaxAI;
use super::{ScoredMove, SearchResult};
use crate::board::Board;
use crate::config::Config;
use crate::error::{EngineError, Result};
use log::warn;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// 在工作线程中搜索，等待 `config.search.timeout_seconds`
///
/// 时间限制为 0 时直接在当前线程同步搜索。
pub fn search_with_timeout(board: &Board, config: &Config) -> Result<SearchResult> {
    run_with_deadline(board, config, |ai, board, config| ai.search(board, config))
}

/// 限时的根节点逐一评分（`MinimaxAI::score_root_moves`）
pub fn score_moves_with_timeout(board: &Board, config: &Config) -> Result<Vec<ScoredMove>> {
    run_with_deadline(board, config, |ai, board, config| {
        ai.score_root_moves(board, config)
    })
}

fn run_with_deadline<T, F>(board: &Board, config: &Config, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&MinimaxAI, &Board, &Config) -> Result<T> + Send + 'static,
{
    let timeout = config.search.timeout_seconds;
    if timeout <= 0.0 {
        return job(&MinimaxAI::new(), board, config);
    }
    let deadline = Duration::try_from_secs_f64(timeout).map_err(|e| {
        EngineError::Config(format!("timeout_seconds {} is out of range: {}", timeout, e))
    })?;

    let stop = Arc::new(AtomicBool::new(false));
    let ai = MinimaxAI::with_stop_flag(Arc::clone(&stop));
    let (tx, rx) = mpsc::channel();
    let board = board.clone();
    let worker_config = config.clone();

    thread::spawn(move || {
        // 接收端可能已因超时被丢弃
        let _ = tx.send(job(&ai, &board, &worker_config));
    });

    match rx.recv_timeout(deadline) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            stop.store(true, Ordering::Relaxed);
            warn!("search exceeded {:.2}s, discarding", timeout);
            Err(EngineError::Timeout(timeout))
        }
        Err(RecvTimeoutError::Disconnected) => Err(EngineError::InvalidState(
            "search worker exited without a result".to_string(),
        )),
    }
}
