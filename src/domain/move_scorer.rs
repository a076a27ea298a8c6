// ============================================================
// Layer 3 — Move Scorer
// ============================================================
// Ranks the legal moves of a position by how much the
// evaluator's score changes after each one:
//
//   delta   = eval(next) − eval(current)
//   quality = 1 / (1 + e^(−delta))        ∈ (0, 1)
//
// Scores are from White's point of view, so for Black to move
// delta is negated before the sigmoid: a move that lowers the
// evaluation is a good move for Black.
//
// All successor positions are scored in one evaluator call.

use anyhow::{anyhow, Context, Result};
use shakmaty::{
    fen::Fen, CastlingMode, Chess, Color, EnPassantMode, Position, Square,
};

use crate::domain::position::{encode_fen, BoardTensor};
use crate::domain::traits::PositionEvaluator;

/// One legal move and how the evaluator rates it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMove {
    /// Move in UCI notation, e.g. "e2e4"
    pub uci:      String,
    /// Position after the move
    pub next_fen: String,
    /// Evaluation of `next_fen`
    pub score:    f32,
    /// Change in evaluation for the side that moved
    pub delta:    f32,
    pub quality:  f32,
}

pub struct MoveScorer<E> {
    evaluator: E,
}

impl<E: PositionEvaluator> MoveScorer<E> {
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }

    /// Score every legal move in `fen`, or only those leaving `from`.
    /// Sorted best first.
    pub fn score_moves(&mut self, fen: &str, from: Option<Square>) -> Result<Vec<ScoredMove>> {
        let pos = parse_position(fen)?;
        let current = self.evaluator.evaluate(fen)?;
        // Scores stay White-relative; only the delta is flipped, so
        // Black's moves rank by what they gain for Black.
        let sign = match pos.turn() {
            Color::White => 1.0,
            Color::Black => -1.0,
        };

        let mut successors: Vec<(String, String)> = Vec::new();
        let mut boards:     Vec<BoardTensor>      = Vec::new();
        for m in pos.legal_moves() {
            if from.is_some() && m.from() != from {
                continue;
            }
            let mut next = pos.clone();
            next.play_unchecked(&m);
            let next_fen = Fen(next.into_setup(EnPassantMode::Legal)).to_string();

            boards.push(encode_fen(&next_fen)?);
            successors.push((m.to_uci(CastlingMode::Standard).to_string(), next_fen));
        }

        let scores = self.evaluator.evaluate_boards(&boards)?;
        let mut scored: Vec<ScoredMove> = successors
            .into_iter()
            .zip(scores)
            .map(|((uci, next_fen), score)| {
                let delta = sign * (score - current);
                ScoredMove { uci, next_fen, score, delta, quality: sigmoid(delta) }
            })
            .collect();

        scored.sort_by(|a, b| b.quality.total_cmp(&a.quality));
        tracing::debug!("Scored {} moves for '{fen}'", scored.len());
        Ok(scored)
    }

    /// Highest-quality move, or None if there is no legal move.
    pub fn best_move(&mut self, fen: &str, from: Option<Square>) -> Result<Option<ScoredMove>> {
        Ok(self.score_moves(fen, from)?.into_iter().next())
    }
}

/// Parse a square name such as "e2".
pub fn parse_square(name: &str) -> Result<Square> {
    name.trim()
        .parse::<Square>()
        .with_context(|| format!("'{name}' is not a square"))
}

fn parse_position(fen: &str) -> Result<Chess> {
    let setup = Fen::from_ascii(fen.trim().as_bytes())
        .with_context(|| format!("Invalid FEN '{fen}'"))?;
    setup
        .into_position(CastlingMode::Standard)
        .map_err(|e| anyhow!("Illegal position '{fen}': {e}"))
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Material count in pawns, White positive
    struct MaterialEvaluator;

    impl PositionEvaluator for MaterialEvaluator {
        fn evaluate_boards(&mut self, boards: &[BoardTensor]) -> Result<Vec<f32>> {
            const VALUES: [f32; 6] = [1.0, 3.0, 3.0, 5.0, 9.0, 0.0];
            Ok(boards
                .iter()
                .map(|b| {
                    (0..12)
                        .map(|c| {
                            let v = if c < 6 { VALUES[c] } else { -VALUES[c - 6] };
                            let n: f32 = (0..8)
                                .flat_map(|r| (0..8).map(move |col| (r, col)))
                                .map(|(r, col)| b.get(c, r, col))
                                .sum();
                            v * n
                        })
                        .sum()
                })
                .collect())
        }
    }

    #[test]
    fn test_start_position_has_twenty_moves() {
        let mut scorer = MoveScorer::new(MaterialEvaluator);
        let moves = scorer.score_moves(START, None).unwrap();
        assert_eq!(moves.len(), 20);
        // No captures available: every move is neutral
        assert!(moves.iter().all(|m| m.delta == 0.0 && m.quality == 0.5));
    }

    #[test]
    fn test_from_square_filter() {
        let mut scorer = MoveScorer::new(MaterialEvaluator);
        let moves = scorer.score_moves(START, Some(parse_square("e2").unwrap())).unwrap();
        let mut ucis: Vec<&str> = moves.iter().map(|m| m.uci.as_str()).collect();
        ucis.sort();
        assert_eq!(ucis, ["e2e3", "e2e4"]);
        assert!(moves.iter().any(|m| m.next_fen.starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b")));
    }

    #[test]
    fn test_white_prefers_capturing_the_queen() {
        // White rook on a1 can take the black queen on a8
        let fen = "q3k3/8/8/8/8/8/8/R3K3 w - - 0 1";
        let mut scorer = MoveScorer::new(MaterialEvaluator);
        let best = scorer.best_move(fen, None).unwrap().unwrap();
        assert_eq!(best.uci, "a1a8");
        assert_eq!(best.delta, 9.0);
        assert!(best.quality > 0.99);
    }

    #[test]
    fn test_black_prefers_capturing_the_queen() {
        let fen = "r3k3/8/8/8/8/8/8/Q3K3 b - - 0 1";
        let mut scorer = MoveScorer::new(MaterialEvaluator);
        let best = scorer.best_move(fen, None).unwrap().unwrap();
        assert_eq!(best.uci, "a8a1");
        assert_eq!(best.delta, 9.0);
        // The reported score is still from White's side
        assert_eq!(best.score, -9.0);
        assert!(best.quality > 0.99);
    }

    #[test]
    fn test_no_legal_moves() {
        // Black is checkmated
        let fen = "k7/1Q6/1K6/8/8/8/8/8 b - - 0 1";
        let mut scorer = MoveScorer::new(MaterialEvaluator);
        assert!(scorer.best_move(fen, None).unwrap().is_none());
    }

    #[test]
    fn test_bad_input() {
        let mut scorer = MoveScorer::new(MaterialEvaluator);
        assert!(scorer.score_moves("garbage", None).is_err());
        assert!(parse_square("z9").is_err());
    }
}
