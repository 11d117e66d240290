//! Depth-limited game-tree search.
//!
//! Minimax, alpha-beta and expectimax share one recursion. They differ only in
//! how the children of a node are folded into a value, which [`Combine`]
//! captures per ply. The root player is always the maximiser; the modelled
//! opponent is minimised adversarially or averaged over uniformly random
//! replies.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::board::{Board, Player};
use crate::eval::{children, evaluate};
use crate::GameError;

/// Terminal reached by the root player's own first move.
const ROOT_WIN_BONUS: f64 = 100.0;
/// Terminal reached by a later move of the root player.
const DEEP_WIN_BONUS: f64 = 50.0;
/// Terminal reached by the opponent's immediate reply.
const REPLY_LOSS_PENALTY: f64 = 90.0;
/// Terminal reached by a later opponent move.
const DEEP_LOSS_PENALTY: f64 = 50.0;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Minimax,
    #[default]
    AlphaBeta,
    Expectimax,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Minimax, Strategy::AlphaBeta, Strategy::Expectimax];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Minimax => "minimax",
            Strategy::AlphaBeta => "alphabeta",
            Strategy::Expectimax => "expectimax",
        }
    }

    /// Column `player` should drop into, or `None` to forfeit.
    pub fn search(self, player: Player, board: &Board, depth_limit: u32) -> Option<usize> {
        self.analyze(player, board, depth_limit).column
    }

    /// Runs the search and reports the root value and tree size alongside the
    /// chosen column.
    pub fn analyze(self, player: Player, board: &Board, depth_limit: u32) -> SearchOutcome {
        let ctx = Context {
            root: player,
            root_depth: depth_limit,
            strategy: self,
        };
        let mut nodes = 0;
        let best = ctx.value(&mut nodes, player, board, depth_limit, Bounds::OPEN);
        debug!(
            strategy = self.name(),
            ?player,
            depth = depth_limit,
            column = ?best.column,
            score = best.score,
            nodes,
            "search finished"
        );
        SearchOutcome {
            column: best.column,
            score: best.score,
            nodes,
        }
    }

    fn opponent_combine(self) -> Combine {
        match self {
            Strategy::Minimax | Strategy::AlphaBeta => Combine::Minimize,
            Strategy::Expectimax => Combine::Average,
        }
    }

    fn prunes(self) -> bool {
        matches!(self, Strategy::AlphaBeta)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimax" => Ok(Strategy::Minimax),
            "alphabeta" | "alpha-beta" => Ok(Strategy::AlphaBeta),
            "expectimax" => Ok(Strategy::Expectimax),
            _ => Err(GameError::UnknownStrategy(s.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    /// `None` when the root had nothing to expand.
    pub column: Option<usize>,
    pub score: f64,
    /// Number of positions the recursion visited, root included.
    pub nodes: u64,
}

/// How the values of a node's children become the node's value.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Combine {
    Maximize,
    Minimize,
    /// Uniform expectation with a fixed `1 / cols` weight per child.
    Average,
}

impl Combine {
    fn improves(self, candidate: f64, best: f64) -> bool {
        match self {
            Combine::Maximize => candidate > best,
            Combine::Minimize => candidate < best,
            Combine::Average => false,
        }
    }

    fn worst(self) -> f64 {
        match self {
            Combine::Maximize => f64::NEG_INFINITY,
            Combine::Minimize => f64::INFINITY,
            Combine::Average => 0.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct Bounds {
    alpha: f64,
    beta: f64,
}

impl Bounds {
    const OPEN: Bounds = Bounds {
        alpha: f64::NEG_INFINITY,
        beta: f64::INFINITY,
    };

    fn tighten(&mut self, combine: Combine, best: f64) {
        match combine {
            Combine::Maximize => self.alpha = self.alpha.max(best),
            Combine::Minimize => self.beta = self.beta.min(best),
            Combine::Average => {}
        }
    }

    fn exhausted(&self) -> bool {
        self.alpha >= self.beta
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct Scored {
    score: f64,
    column: Option<usize>,
}

impl Scored {
    fn leaf(score: f64) -> Self {
        Self {
            score,
            column: None,
        }
    }
}

/// Immutable per-search state threaded through the recursion.
#[derive(Copy, Clone, Debug)]
struct Context {
    root: Player,
    root_depth: u32,
    strategy: Strategy,
}

impl Context {
    /// Value of `board`, which `mover` has just moved into (at the root:
    /// whose turn it is), with `depth` plies left.
    fn value(
        &self,
        nodes: &mut u64,
        mover: Player,
        board: &Board,
        depth: u32,
        bounds: Bounds,
    ) -> Scored {
        *nodes += 1;
        let terminal = board.terminal();
        if depth == 0 || terminal {
            return Scored::leaf(self.leaf_score(mover, board, depth, terminal));
        }
        if depth == self.root_depth || mover != self.root {
            self.expand(nodes, Combine::Maximize, board, depth, bounds)
        } else {
            self.expand(nodes, self.strategy.opponent_combine(), board, depth, bounds)
        }
    }

    fn leaf_score(&self, mover: Player, board: &Board, depth: u32, terminal: bool) -> f64 {
        let base = f64::from(evaluate(self.root, board));
        if !terminal {
            return base;
        }
        let plies = self.root_depth - depth;
        if mover == self.root {
            base + if plies == 1 { ROOT_WIN_BONUS } else { DEEP_WIN_BONUS }
        } else {
            base - if plies == 2 { REPLY_LOSS_PENALTY } else { DEEP_LOSS_PENALTY }
        }
    }

    fn expand(
        &self,
        nodes: &mut u64,
        combine: Combine,
        board: &Board,
        depth: u32,
        mut bounds: Bounds,
    ) -> Scored {
        let mover = match combine {
            Combine::Maximize => self.root,
            Combine::Minimize | Combine::Average => self.root.opponent(),
        };
        let offspring = children(mover, board);

        if combine == Combine::Average {
            // Not renormalised by the number of legal replies.
            let weight = 1.0 / board.cols() as f64;
            let score: f64 = offspring
                .iter()
                .map(|(_, child)| weight * self.value(nodes, mover, child, depth - 1, bounds).score)
                .sum();
            return Scored::leaf(score);
        }

        let mut best = Scored::leaf(combine.worst());
        for (column, child) in &offspring {
            let score = self.value(nodes, mover, child, depth - 1, bounds).score;
            if depth == self.root_depth {
                trace!(column, score, "root child");
            }
            if combine.improves(score, best.score) {
                best = Scored {
                    score,
                    column: Some(*column),
                };
            }
            if self.strategy.prunes() {
                bounds.tighten(combine, best.score);
                if bounds.exhausted() {
                    break;
                }
            }
        }
        best
    }
}
