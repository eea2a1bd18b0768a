//! TFN 记谱解析和生成
//!
//! 塔棋局面记谱 (TFN)
//!
//! 格式: `<棋盘> <A 方状态> <B 方状态> <回合> <电脑方>`
//!
//! 棋盘从第 5 行写到第 0 行，行间用 `/` 分隔：
//! - 空格：数字 (1-6)
//! - 塔：自底向上的归属标记 `A`/`B`，接方向 `+`/`-`，折返塔再接 `*`
//!
//! 玩家状态：`安全区:金库己方:金库对方:横走锁`，锁为 `L` 或 `-`。

use crate::board::{Board, Cell, PlayerState, Vault};
use crate::error::{EngineError, Result};
use crate::types::{Position, Side, TowerMove, BOARD_SIZE, NUM_CELLS};

fn notation_err(msg: impl Into<String>) -> EngineError {
    EngineError::Notation(msg.into())
}

/// 解析 TFN 字符串
pub fn parse_tfn(tfn: &str) -> Result<Board> {
    let parts: Vec<&str> = tfn.split_whitespace().collect();
    if parts.len() != 5 {
        return Err(notation_err(format!(
            "expected '<board> <a> <b> <turn> <bot>', got: {}",
            tfn
        )));
    }

    let cells = parse_board(parts[0])?;
    let mut a = parse_player(parts[1])?;
    let mut b = parse_player(parts[2])?;
    let turn = parse_side(parts[3], "turn")?;
    let bot = parse_side(parts[4], "bot")?;

    a.has_turn = turn == Side::A;
    b.has_turn = turn == Side::B;
    a.is_maximizing = bot == Side::A;
    b.is_maximizing = bot == Side::B;

    Board::from_parts(cells, [a, b]).map_err(|e| notation_err(e.to_string()))
}

fn parse_side(s: &str, field: &str) -> Result<Side> {
    let mut chars = s.chars();
    match (chars.next().and_then(Side::from_tfn_char), chars.next()) {
        (Some(side), None) => Ok(side),
        _ => Err(notation_err(format!("invalid {}: {}", field, s))),
    }
}

/// 解析棋盘字符串
fn parse_board(board_str: &str) -> Result<Vec<Cell>> {
    let rows: Vec<&str> = board_str.split('/').collect();
    if rows.len() != BOARD_SIZE as usize {
        return Err(notation_err(format!(
            "expected {} rows, got {}",
            BOARD_SIZE,
            rows.len()
        )));
    }

    let mut cells = vec![Cell::default(); NUM_CELLS];

    for (row_idx, row_str) in rows.iter().enumerate() {
        // 记谱从上往下是 row 5 到 row 0
        let row = BOARD_SIZE - 1 - row_idx as i8;
        let mut col: i8 = 0;
        let mut chars = row_str.chars().peekable();

        while let Some(ch) = chars.next() {
            if col >= BOARD_SIZE {
                return Err(notation_err(format!("row {} has too many cells", row)));
            }

            if let Some(run) = ch.to_digit(10) {
                if run == 0 || run > BOARD_SIZE as u32 {
                    return Err(notation_err(format!("invalid empty run '{}'", ch)));
                }
                col += run as i8;
                continue;
            }

            let first = Side::from_token(ch)
                .ok_or_else(|| notation_err(format!("invalid character in board: {}", ch)))?;
            let mut stack = vec![first];
            while let Some(side) = chars.peek().copied().and_then(Side::from_token) {
                stack.push(side);
                chars.next();
            }

            let direction = match chars.next() {
                Some('+') => 1,
                Some('-') => -1,
                other => {
                    return Err(notation_err(format!(
                        "tower at {} needs a direction, got {:?}",
                        Position::new(row, col),
                        other
                    )))
                }
            };
            let reversed = chars.next_if_eq(&'*').is_some();

            cells[Position::new(row, col).to_index()] = Cell::tower(stack, direction, reversed);
            col += 1;
        }

        if col != BOARD_SIZE {
            return Err(notation_err(format!(
                "row {} has {} columns, expected {}",
                row, col, BOARD_SIZE
            )));
        }
    }

    Ok(cells)
}

/// 解析玩家状态字符串
fn parse_player(s: &str) -> Result<PlayerState> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 4 {
        return Err(notation_err(format!("invalid player state: {}", s)));
    }

    let number = |field: &str| -> Result<u8> {
        field
            .parse::<u8>()
            .map_err(|_| notation_err(format!("invalid counter '{}' in {}", field, s)))
    };

    let last_move_was_lateral = match parts[3] {
        "L" => true,
        "-" => false,
        other => return Err(notation_err(format!("invalid lateral lock: {}", other))),
    };

    Ok(PlayerState {
        towers_secured: number(parts[0])?,
        vault: Vault {
            own: number(parts[1])?,
            opponent: number(parts[2])?,
        },
        last_move_was_lateral,
        ..Default::default()
    })
}

fn player_to_tfn(p: &PlayerState) -> String {
    format!(
        "{}:{}:{}:{}",
        p.towers_secured,
        p.vault.own,
        p.vault.opponent,
        if p.last_move_was_lateral { 'L' } else { '-' }
    )
}

/// 从棋盘生成 TFN 字符串
pub fn to_tfn(board: &Board) -> String {
    let mut rows = Vec::with_capacity(BOARD_SIZE as usize);

    // 从 row 5 到 row 0
    for row in (0..BOARD_SIZE).rev() {
        let mut row_str = String::new();
        let mut empty_count = 0;

        for col in 0..BOARD_SIZE {
            let cell = board.cell(Position::new(row, col));
            if cell.is_empty() {
                empty_count += 1;
                continue;
            }
            if empty_count > 0 {
                row_str.push_str(&empty_count.to_string());
                empty_count = 0;
            }
            row_str.extend(cell.stack.iter().map(Side::to_token));
            row_str.push(if cell.direction > 0 { '+' } else { '-' });
            if cell.reversed {
                row_str.push('*');
            }
        }

        if empty_count > 0 {
            row_str.push_str(&empty_count.to_string());
        }

        rows.push(row_str);
    }

    format!(
        "{} {} {} {} {}",
        rows.join("/"),
        player_to_tfn(board.player(Side::A)),
        player_to_tfn(board.player(Side::B)),
        board.current_turn().to_tfn_char(),
        board.bot_side().to_tfn_char()
    )
}

/// 在 TFN 上执行走法（含回合切换），返回新的 TFN
pub fn apply_move_to_tfn(tfn: &str, move_str: &str, max_stack_size: usize) -> Result<String> {
    let mut board = parse_tfn(tfn)?;
    let mv = TowerMove::from_tfn_str(move_str)
        .ok_or_else(|| notation_err(format!("invalid move string: {}", move_str)))?;

    if !board.is_playable(&mv) {
        return Err(EngineError::InvalidMove(format!("{} is not playable here", mv)));
    }
    board.apply_move_and_turn(&mv, max_stack_size)?;
    Ok(to_tfn(&board))
}

/// 从 TFN 获取当前行棋方的所有合法走法
pub fn legal_moves_from_tfn(tfn: &str) -> Result<Vec<String>> {
    let board = parse_tfn(tfn)?;
    Ok(board
        .legal_moves(board.current_turn())
        .iter()
        .map(|m| m.to_tfn_str())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_positions;

    #[test]
    fn test_parse_start() {
        let board = parse_tfn(test_positions::START).unwrap();
        assert_eq!(board, Board::start(Side::A, Side::A));
    }

    #[test]
    fn test_parse_towers() {
        let board = parse_tfn("6/1AB-*4/6/6/6/5A+ 1:2:3:L 0:0:0:- b a").unwrap();

        let tower = board.cell(Position::new(4, 1));
        assert_eq!(tower.stack, vec![Side::A, Side::B]);
        assert_eq!(tower.direction, -1);
        assert!(tower.reversed);
        assert_eq!(board.top_owner(Position::new(0, 5)), Some(Side::A));

        let a = board.player(Side::A);
        assert_eq!(a.towers_secured, 1);
        assert_eq!(a.vault, Vault { own: 2, opponent: 3 });
        assert!(a.last_move_was_lateral);
        assert!(a.is_maximizing);
        assert!(!a.has_turn);
        assert_eq!(board.current_turn(), Side::B);
    }

    #[test]
    fn test_tfn_roundtrip() {
        for tfn in [
            test_positions::START,
            test_positions::MID_STACKS,
            test_positions::A_RETURNING,
            test_positions::LONE_A_CORNER,
        ] {
            let board = parse_tfn(tfn).unwrap();
            assert_eq!(to_tfn(&board), tfn);
        }
    }

    #[test]
    fn test_parse_errors() {
        let bad = [
            "6/6/6/6/6 0:0:0:- 0:0:0:- a a",
            "6/6/6/6/6/5 0:0:0:- 0:0:0:- a a",
            "6/6/6/6/6/A5 0:0:0:- 0:0:0:- a a",
            "6/6/6/6/6/A+A+A+A+A+A+A+ 0:0:0:- 0:0:0:- a a",
            "6/6/6/6/6/C+5 0:0:0:- 0:0:0:- a a",
            "6/6/6/6/6/6 0:0:0 0:0:0:- a a",
            "6/6/6/6/6/6 0:0:0:X 0:0:0:- a a",
            "6/6/6/6/6/6 9:0:0:- 0:0:0:- a a",
            "6/6/6/6/6/6 0:0:0:- 0:0:0:- c a",
            "6/6/6/6/6/6 0:0:0:- 0:0:0:- a",
        ];
        for tfn in bad {
            let err = parse_tfn(tfn).unwrap_err();
            assert!(matches!(err, EngineError::Notation(_)), "{}", tfn);
        }
    }

    #[test]
    fn test_apply_move() {
        let new_tfn = apply_move_to_tfn(test_positions::START, "c0c2", 3).unwrap();
        let board = parse_tfn(&new_tfn).unwrap();
        assert_eq!(board.current_turn(), Side::B);
        assert_eq!(board.top_owner(Position::new(2, 2)), Some(Side::A));
        assert!(board.cell(Position::new(0, 2)).is_empty());

        for bad in ["c0c3", "c5c4"] {
            let err = apply_move_to_tfn(test_positions::START, bad, 3).unwrap_err();
            assert!(matches!(err, EngineError::InvalidMove(_)), "{}", bad);
        }
    }

    #[test]
    fn test_legal_moves_from_start() {
        let moves = legal_moves_from_tfn(test_positions::START).unwrap();
        // 每座塔只能前进 1 或 2 格
        assert_eq!(moves.len(), 12);
        assert_eq!(moves[0], "a0a1");
        assert_eq!(moves[1], "a0a2");
    }
}
