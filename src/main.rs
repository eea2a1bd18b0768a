//! Towers AI CLI
//!
//! 命令行界面，用于测试 AI
//!
//! 支持两种模式：
//! 1. 单次命令模式：每次执行一个命令
//! 2. Server 模式：长驻进程，通过 stdin/stdout 通信

use clap::{Args, Parser, Subcommand};
use log::info;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use towers_ai::{
    apply_move_to_tfn, evaluate_detail, legal_moves_from_tfn, search_with_timeout,
    score_moves_with_timeout, terminal_score, AIEngine, AIStrategy, Board, Config, EngineError,
    EvalDetail, Game, GameResult, GameSnapshot, RandomAI, Result, SearchStats, TowerMove,
    DEFAULT_STRATEGY,
};

#[derive(Parser)]
#[command(name = "towers-ai")]
#[command(about = "Stacking towers AI Engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// 配置文件和覆盖项
#[derive(Args, Clone, Default)]
struct ConfigArgs {
    /// JSON 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 搜索深度
    #[arg(long)]
    depth: Option<u32>,

    /// 时间限制（秒），0 表示不限时
    #[arg(long)]
    timeout: Option<f64>,
}

impl ConfigArgs {
    fn load(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(depth) = self.depth {
            config.search.max_depth = depth;
        }
        if let Some(timeout) = self.timeout {
            config.search.timeout_seconds = timeout;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 获取合法走法
    Moves {
        /// TFN 字符串
        #[arg(long)]
        tfn: String,
    },

    /// 选择最佳走法
    Best {
        /// TFN 字符串
        #[arg(long)]
        tfn: String,

        /// AI 策略 (minimax, fullwidth, random)
        #[arg(long, default_value = DEFAULT_STRATEGY)]
        strategy: String,

        /// 返回的走法数量
        #[arg(long, default_value = "1")]
        n: usize,

        /// 随机种子
        #[arg(long)]
        seed: Option<u64>,

        /// JSON 输出
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// 评估局面分数（电脑方视角）
    Score {
        /// TFN 字符串
        #[arg(long)]
        tfn: String,

        /// JSON 输出
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// 执行走法，输出新的 TFN
    Apply {
        /// TFN 字符串
        #[arg(long)]
        tfn: String,

        /// 走法，如 a0a1
        #[arg(long = "move")]
        mv: String,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// 搜索调试（每个根节点走法的精确分数）
    Search {
        /// TFN 字符串
        #[arg(long)]
        tfn: String,

        /// JSON 输出
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// 自对弈：电脑 (A) 对随机走子 (B)
    Play {
        /// 最多走多少步
        #[arg(long, default_value = "200")]
        max_moves: usize,

        /// 随机方的种子
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// 启动 server 模式（stdin/stdout 通信）
    Server {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Serialize, Deserialize)]
struct MoveResult {
    #[serde(rename = "move")]
    mv: String,
    score: f64,
}

#[derive(Serialize, Deserialize)]
struct MovesResponse {
    moves: Vec<MoveResult>,
    total: usize,
}

/// search 命令的单个走法
#[derive(Serialize, Deserialize)]
struct SearchMoveInfo {
    #[serde(rename = "move")]
    mv: String,
    /// 走完后的静态评估
    eval: f64,
    /// 搜索分数
    score: f64,
}

// Server 模式的请求和响应结构
#[derive(Deserialize)]
struct ServerRequest {
    cmd: String,
    #[serde(default)]
    tfn: Option<String>,
    #[serde(default)]
    snapshot: Option<GameSnapshot>,
    #[serde(default, rename = "move")]
    mv: Option<String>,
    #[serde(default)]
    strategy: Option<String>,
    #[serde(default)]
    n: Option<usize>,
    #[serde(default)]
    depth: Option<u32>,
    #[serde(default)]
    timeout: Option<f64>,
}

#[derive(Serialize, Default)]
struct ServerResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    moves: Option<Vec<MoveResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    legal_moves: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nodes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cutoffs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    // eval 命令的字段
    #[serde(skip_serializing_if = "Option::is_none")]
    eval: Option<EvalDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    terminal: Option<f64>,
    // apply 命令的字段
    #[serde(skip_serializing_if = "Option::is_none")]
    tfn: Option<String>,
}

impl ServerResponse {
    fn success_moves(moves: Vec<MoveResult>, stats: Option<SearchStats>, elapsed_ms: f64) -> Self {
        Self {
            ok: true,
            moves: Some(moves),
            nodes: stats.map(|s| s.nodes),
            cutoffs: stats.map(|s| s.cutoffs),
            elapsed_ms: Some(elapsed_ms),
            ..Default::default()
        }
    }

    fn success_legal_moves(legal_moves: Vec<String>) -> Self {
        Self {
            ok: true,
            legal_moves: Some(legal_moves),
            ..Default::default()
        }
    }

    fn success_eval(detail: EvalDetail, terminal: Option<f64>) -> Self {
        Self {
            ok: true,
            eval: Some(detail),
            terminal,
            ..Default::default()
        }
    }

    fn success_tfn(tfn: String) -> Self {
        Self {
            ok: true,
            tfn: Some(tfn),
            ..Default::default()
        }
    }

    fn error(msg: &str) -> Self {
        Self {
            ok: false,
            error: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Moves { tfn } => {
            let moves = legal_moves_from_tfn(&tfn)?;
            println!("Legal moves ({}):", moves.len());
            for mv in &moves {
                println!("  {}", mv);
            }
        }

        Commands::Best {
            tfn,
            strategy,
            n,
            seed,
            json,
            config,
        } => {
            let config = config.load()?;
            let board = Board::from_tfn(&tfn)?;
            let start = Instant::now();
            let (moves, stats) = select_moves(&board, &config, &strategy, n, seed)?;
            let elapsed = start.elapsed().as_secs_f64();

            if json {
                let response = MovesResponse {
                    total: moves.len(),
                    moves,
                };
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("Best moves (strategy={}):", strategy);
                for m in &moves {
                    println!("  {} (score: {:.2})", m.mv, m.score);
                }
            }
            match stats {
                Some(s) => eprintln!(
                    "Stats: nodes={}, leaves={}, cutoffs={}, time={:.3}s",
                    s.nodes, s.leaves, s.cutoffs, elapsed
                ),
                None => eprintln!("Stats: time={:.3}s", elapsed),
            }
        }

        Commands::Score { tfn, json, config } => {
            let config = config.load()?;
            let mut board = Board::from_tfn(&tfn)?;
            let terminal = terminal_score(&mut board, &config);
            let detail = evaluate_detail(&board, &config)?;

            if json {
                let response = ServerResponse::success_eval(detail, terminal);
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("局面评估 ({} 方视角): {:.2}", board.bot_side(), detail.total);
                println!(
                    "  material={:.2} proximity={:.2} imminent={:.2} accounted={:.2}",
                    detail.material, detail.proximity, detail.imminent, detail.accounted
                );
                if let Some(score) = terminal {
                    println!("  terminal: {}", score);
                }
            }
        }

        Commands::Apply { tfn, mv, config } => {
            let config = config.load()?;
            println!(
                "{}",
                apply_move_to_tfn(&tfn, &mv, config.rules.max_stack_size)?
            );
        }

        Commands::Search { tfn, json, config } => {
            let config = config.load()?;
            let board = Board::from_tfn(&tfn)?;
            let current = evaluate_detail(&board, &config)?.total;
            let first_moves = do_search(&board, &config)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&first_moves)?);
            } else {
                println!("Search result (depth={}):", config.search.max_depth);
                println!("Current eval: {:.2}", current);
                println!("\nFirst moves ({}):", first_moves.len());
                for info in &first_moves {
                    println!(
                        "  {}: eval={:.2}, score={:.2}",
                        info.mv, info.eval, info.score
                    );
                }
            }
        }

        Commands::Play {
            max_moves,
            seed,
            config,
        } => {
            let config = config.load()?;
            let result = self_play(config, max_moves, seed)?;
            println!("Result: {:?}", result);
        }

        Commands::Server { config } => {
            let config = config.load()?;
            run_server(&config)?;
        }
    }
    Ok(())
}

/// 选择走法；minimax 走限时搜索，取单个走法时带回统计
fn select_moves(
    board: &Board,
    config: &Config,
    strategy: &str,
    n: usize,
    seed: Option<u64>,
) -> Result<(Vec<MoveResult>, Option<SearchStats>)> {
    let ai = AIEngine::from_strategy(strategy, seed)?;
    let is_minimax = matches!(strategy.to_lowercase().as_str(), "minimax" | "alphabeta");

    if is_minimax && n <= 1 {
        let result = search_with_timeout(board, config)?;
        let best = MoveResult {
            mv: result.best.mv.to_tfn_str(),
            score: result.best.score,
        };
        return Ok((vec![best], Some(result.stats)));
    }

    let scored = if is_minimax {
        let mut scored = score_moves_with_timeout(board, config)?;
        if scored.is_empty() {
            return Err(EngineError::NoLegalMoves(board.current_turn()));
        }
        scored.truncate(n);
        scored
    } else {
        ai.select_moves(board, config, n)?
    };

    let moves = scored
        .into_iter()
        .map(|sm| MoveResult {
            mv: sm.mv.to_tfn_str(),
            score: sm.score,
        })
        .collect();
    Ok((moves, None))
}

/// 执行搜索并返回每个根节点走法的详细信息
fn do_search(board: &Board, config: &Config) -> Result<Vec<SearchMoveInfo>> {
    let scored = score_moves_with_timeout(board, config)?;

    scored
        .into_iter()
        .map(|sm| {
            let mut after = board.clone();
            after.apply_move_and_turn(&sm.mv, config.rules.max_stack_size)?;
            Ok(SearchMoveInfo {
                mv: sm.mv.to_tfn_str(),
                eval: evaluate_detail(&after, config)?.total,
                score: sm.score,
            })
        })
        .collect()
}

/// 电脑 (A) 对随机走子 (B)
fn self_play(config: Config, max_moves: usize, seed: Option<u64>) -> Result<GameResult> {
    let mut game = Game::new(config)?;
    let opponent = RandomAI::new(seed);

    for ply in 0..max_moves {
        let board = game.board();
        let side = board.current_turn();
        if board.legal_moves(side).is_empty() {
            return Err(EngineError::NoLegalMoves(side));
        }

        let (mv, result) = if board.player(side).is_maximizing {
            let (best, result) = game.bot_move()?;
            (best.mv, result)
        } else {
            let mv = opponent.select_best_move(game.board(), game.config())?.mv;
            (mv, game.play(mv)?)
        };
        println!("{:>3}. {} {}  {}", ply + 1, side, mv, game.board().to_tfn());

        if result != GameResult::Ongoing {
            return Ok(result);
        }
    }

    info!("no result after {} moves", max_moves);
    Ok(GameResult::Ongoing)
}

/// Server 模式主循环
/// 从 stdin 读取 JSON 请求，返回 JSON 响应到 stdout
fn run_server(config: &Config) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;

        // 空行跳过
        if line.trim().is_empty() {
            continue;
        }

        // 解析请求
        let response = match serde_json::from_str::<ServerRequest>(&line) {
            Ok(request) => {
                if request.cmd == "quit" {
                    break;
                }
                handle_request(&request, config)
                    .unwrap_or_else(|e| ServerResponse::error(&e.to_string()))
            }
            Err(e) => ServerResponse::error(&format!("Invalid JSON: {}", e)),
        };

        // 返回响应
        writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_request(request: &ServerRequest, base: &Config) -> Result<ServerResponse> {
    let mut config = base.clone();
    if let Some(depth) = request.depth {
        config.search.max_depth = depth;
    }
    if let Some(timeout) = request.timeout {
        config.search.timeout_seconds = timeout;
    }
    config.validate()?;

    match request.cmd.as_str() {
        "best" => {
            let board = request_board(request)?;
            let strategy = request.strategy.as_deref().unwrap_or(DEFAULT_STRATEGY);
            let start = Instant::now();
            let (moves, stats) = select_moves(&board, &config, strategy, request.n.unwrap_or(1), None)?;
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            Ok(ServerResponse::success_moves(moves, stats, elapsed_ms))
        }
        "moves" => {
            let board = request_board(request)?;
            let moves = board
                .legal_moves(board.current_turn())
                .iter()
                .map(TowerMove::to_tfn_str)
                .collect();
            Ok(ServerResponse::success_legal_moves(moves))
        }
        "eval" => {
            let mut board = request_board(request)?;
            let terminal = terminal_score(&mut board, &config);
            let detail = evaluate_detail(&board, &config)?;
            Ok(ServerResponse::success_eval(detail, terminal))
        }
        "apply" => {
            let board = request_board(request)?;
            let mv = request
                .mv
                .as_deref()
                .ok_or_else(|| EngineError::InvalidInvocation("apply needs a move".into()))?;
            let tfn = apply_move_to_tfn(&board.to_tfn(), mv, config.rules.max_stack_size)?;
            Ok(ServerResponse::success_tfn(tfn))
        }
        other => Err(EngineError::InvalidInvocation(format!(
            "Unknown command: {}",
            other
        ))),
    }
}

/// 请求中的局面：TFN 或 JSON 快照二选一
fn request_board(request: &ServerRequest) -> Result<Board> {
    match (&request.tfn, &request.snapshot) {
        (Some(tfn), None) => Board::from_tfn(tfn),
        (None, Some(snapshot)) => Board::from_snapshot(snapshot.clone()),
        _ => Err(EngineError::InvalidInvocation(
            "request needs exactly one of 'tfn' or 'snapshot'".into(),
        )),
    }
}
