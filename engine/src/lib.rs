//! Connect 4 search engine: a static evaluator and three interchangeable
//! depth-limited searches (minimax, alpha-beta, expectimax).
//!
//! Callers either work with a [`Board`] and a [`Strategy`] directly, or feed a
//! move history string (e.g. `X3O3X2`) plus a search depth to [`best_move`].
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod board;
pub mod eval;
pub mod search;

pub use board::{Board, Cell, Player, COLS, ROWS};
pub use eval::{children, evaluate};
pub use search::{SearchOutcome, Strategy};

/// Deepest search a request may ask for.
pub const MAX_LEVEL: u8 = 8;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid move string at position {position}: {reason}")]
    ParseMove { position: usize, reason: String },
    #[error("column {column} is full")]
    ColumnFull { column: usize },
    #[error("column {column} is out of bounds")]
    ColumnOutOfBounds { column: usize },
    #[error("a board needs at least one row and one column, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("depth {level} is out of range (1-{max})")]
    DepthOutOfRange { level: u8, max: u8 },
    #[error("unknown strategy {0:?}")]
    UnknownStrategy(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedMove {
    pub player: Player,
    pub column: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub position: String,
    pub level: u8,
    #[serde(default)]
    pub strategy: Strategy,
    /// Defaults to the side that did not make the last move.
    #[serde(default)]
    pub player: Option<Player>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveResponse {
    /// `None` means there is nothing to play and the side forfeits.
    pub column: Option<usize>,
    pub score: f64,
    pub nodes: u64,
    pub strategy: Strategy,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub player: Player,
    pub score: i32,
    pub terminal: bool,
    pub winner: Option<Player>,
}

pub fn parse_history(history: &str) -> Result<Vec<TypedMove>, GameError> {
    if history.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut moves = Vec::new();
    let chars: Vec<char> = history.trim().chars().collect();
    let mut idx = 0;
    while idx < chars.len() {
        let symbol = chars[idx];
        let player = match symbol {
            'X' | 'x' => Player::One,
            'O' | 'o' => Player::Two,
            _ => {
                return Err(GameError::ParseMove {
                    position: idx,
                    reason: format!("expected X or O, found {symbol}"),
                })
            }
        };
        idx += 1;
        let Some(&column_char) = chars.get(idx) else {
            return Err(GameError::ParseMove {
                position: idx,
                reason: "missing column number".to_string(),
            });
        };
        let Some(column) = column_char.to_digit(10).map(|d| d as usize) else {
            return Err(GameError::ParseMove {
                position: idx,
                reason: format!("expected column digit, found {column_char}"),
            });
        };
        if column >= COLS {
            return Err(GameError::ParseMove {
                position: idx,
                reason: format!("column must be 0-{}", COLS - 1),
            });
        }
        moves.push(TypedMove { player, column });
        idx += 1;
    }
    Ok(moves)
}

/// Side to move after `moves`: the opponent of the last mover, player one on
/// an empty history.
pub fn next_player(moves: &[TypedMove]) -> Player {
    moves
        .last()
        .map(|mv| mv.player.opponent())
        .unwrap_or(Player::One)
}

pub fn best_move(request: MoveRequest) -> Result<MoveResponse, GameError> {
    best_move_within(request, MAX_LEVEL)
}

/// [`best_move`] with a tighter depth ceiling; `max_level` is clamped to
/// [`MAX_LEVEL`].
pub fn best_move_within(request: MoveRequest, max_level: u8) -> Result<MoveResponse, GameError> {
    let max = max_level.min(MAX_LEVEL);
    if !(1..=max).contains(&request.level) {
        return Err(GameError::DepthOutOfRange {
            level: request.level,
            max,
        });
    }
    let moves = parse_history(&request.position)?;
    let board = Board::from_history(&moves)?;
    let player = request.player.unwrap_or_else(|| next_player(&moves));
    let outcome = request
        .strategy
        .analyze(player, &board, u32::from(request.level));
    Ok(MoveResponse {
        column: outcome.column,
        score: outcome.score,
        nodes: outcome.nodes,
        strategy: request.strategy,
    })
}

/// Static evaluation of a history for `player` (default: side to move).
pub fn evaluate_position(position: &str, player: Option<Player>) -> Result<Evaluation, GameError> {
    let moves = parse_history(position)?;
    let board = Board::from_history(&moves)?;
    let player = player.unwrap_or_else(|| next_player(&moves));
    Ok(Evaluation {
        player,
        score: evaluate(player, &board),
        terminal: board.terminal(),
        winner: board.winner(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(position: &str, level: u8, strategy: Strategy) -> MoveRequest {
        MoveRequest {
            position: position.to_string(),
            level,
            strategy,
            player: None,
        }
    }

    #[test]
    fn parse_and_replay_history() {
        let moves = parse_history("o2X2O1x3").unwrap();
        assert_eq!(moves.len(), 4);
        assert_eq!(
            moves[0],
            TypedMove {
                player: Player::Two,
                column: 2
            }
        );
        let board = Board::from_history(&moves).unwrap();
        assert_eq!(board.get(4, 2), Some(Cell::Disc(Player::One)));
        assert_eq!(next_player(&moves), Player::Two);
        assert_eq!(next_player(&[]), Player::One);
    }

    #[test]
    fn rejects_malformed_history() {
        assert!(matches!(
            parse_history("R3"),
            Err(GameError::ParseMove { position: 0, .. })
        ));
        assert!(matches!(
            parse_history("X3O"),
            Err(GameError::ParseMove { position: 3, .. })
        ));
        assert!(matches!(
            parse_history("XO"),
            Err(GameError::ParseMove { position: 1, .. })
        ));
        assert!(parse_history("X7").is_err());
    }

    #[test]
    fn replay_surfaces_full_column() {
        let moves = parse_history("X0O0X0O0X0O0X0").unwrap();
        assert!(matches!(
            Board::from_history(&moves),
            Err(GameError::ColumnFull { column: 0 })
        ));
    }

    #[test]
    fn rejects_bad_depth() {
        let res = best_move(request("", 0, Strategy::Minimax));
        assert!(matches!(res, Err(GameError::DepthOutOfRange { level: 0, max: 8 })));
        let res = best_move(request("", MAX_LEVEL + 1, Strategy::Minimax));
        assert!(matches!(res, Err(GameError::DepthOutOfRange { .. })));
        let res = best_move_within(request("", 5, Strategy::Minimax), 4);
        assert!(matches!(res, Err(GameError::DepthOutOfRange { level: 5, max: 4 })));
    }

    #[test]
    fn choose_blocking_move() {
        // X threatens four on the bottom row; O must block column 3.
        for (strategy, level) in [(Strategy::Minimax, 2), (Strategy::AlphaBeta, 4)] {
            let res = best_move(request("X0O0X1O1X2", level, strategy)).unwrap();
            assert_eq!(res.column, Some(3), "{strategy}");
        }
    }

    #[test]
    fn takes_immediate_win_horizontal() {
        for strategy in [Strategy::Minimax, Strategy::AlphaBeta] {
            let res = best_move(request("X0O0X1O1X2O2", 3, strategy)).unwrap();
            assert_eq!(res.column, Some(3), "{strategy}");
        }
    }

    #[test]
    fn explicit_player_overrides_turn_order() {
        let mut req = request("X0O0X1O1X2O2", 1, Strategy::Minimax);
        req.player = Some(Player::Two);
        let res = best_move(req).unwrap();
        assert_eq!(res.column, Some(3));
    }

    #[test]
    fn finished_game_forfeits() {
        let res = best_move(request("X0O1X0O1X0O1X0", 3, Strategy::Expectimax)).unwrap();
        assert_eq!(res.column, None);
        assert_eq!(res.nodes, 1);
    }

    #[test]
    fn evaluates_positions() {
        let eval = evaluate_position("", None).unwrap();
        assert_eq!(eval.player, Player::One);
        assert_eq!(eval.score, 0);
        assert!(!eval.terminal);

        let eval = evaluate_position("X0O1X0O1X0O1X0", Some(Player::Two)).unwrap();
        assert_eq!(eval.winner, Some(Player::One));
        assert!(eval.terminal);
        assert!(eval.score < 0);
    }

    #[test]
    fn request_defaults_and_response_shape() {
        let req: MoveRequest = serde_json::from_str(r#"{"position":"X3","level":2}"#).unwrap();
        assert_eq!(req.strategy, Strategy::AlphaBeta);
        assert_eq!(req.player, None);

        let req: MoveRequest = serde_json::from_str(
            r#"{"position":"","level":1,"strategy":"expectimax","player":"two"}"#,
        )
        .unwrap();
        assert_eq!(req.strategy, Strategy::Expectimax);
        assert_eq!(req.player, Some(Player::Two));

        let json = serde_json::to_value(MoveResponse {
            column: None,
            score: -1.5,
            nodes: 1,
            strategy: Strategy::Minimax,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"column": null, "score": -1.5, "nodes": 1, "strategy": "minimax"})
        );
    }
}
