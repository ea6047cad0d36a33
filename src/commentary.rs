//! Commentary request model and service URL construction.

use std::fmt::{Display, Formatter};

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Player {
    White,
    Black,
}

impl Display for Player {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Player::White => write!(f, "white"),
            Player::Black => write!(f, "black"),
        }
    }
}

/// Describes one move to narrate. Built by the game-loop side once the
/// move has been made; never mutated afterwards.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CommentaryRequest {
    /// Move in standard algebraic notation
    pub san_move: String,

    /// Side that made the move
    pub player: Player,

    /// Engine evaluation after the move, in centipawns
    pub evaluation: Option<i32>,

    /// Evaluation swing caused by the move, in centipawns
    pub eval_change: Option<i32>,

    /// Resulting position, if the narrator should see the board
    pub fen: Option<String>,

    /// One-based move index
    pub move_number: Option<u32>,
}

/// How dramatic the narration should be, derived from the evaluation
/// swing of the move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Blunder,
    Brilliant,
    Tactical,
}

impl Trigger {
    /// A swing of 300 centipawns or more is a blunder or a brilliancy
    /// depending on its sign; anything else narrates as tactical play.
    pub fn classify(eval_change: Option<i32>) -> Trigger {
        match eval_change {
            Some(delta) if delta.abs() >= 300 => {
                if delta < 0 {
                    Trigger::Blunder
                } else {
                    Trigger::Brilliant
                }
            }
            _ => Trigger::Tactical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Blunder => "BLUNDER",
            Trigger::Brilliant => "BRILLIANT",
            Trigger::Tactical => "TACTICAL",
        }
    }
}

/// Build the streaming request URL for one move's commentary.
pub fn commentary_url(base: &str, request: &CommentaryRequest) -> Result<Url> {
    let mut url = service_url(base, "commentary")?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("san_move", &request.san_move);
        query.append_pair("player", &request.player.to_string());
        if let Some(evaluation) = request.evaluation {
            query.append_pair("evaluation", &evaluation.to_string());
        }
        if let Some(delta) = request.eval_change {
            query.append_pair("eval_change", &delta.to_string());
        }
        if let Some(fen) = &request.fen {
            query.append_pair("fen", fen);
        }
        if let Some(move_number) = request.move_number {
            query.append_pair("move_number", &move_number.to_string());
        }
        query.append_pair("trigger", Trigger::classify(request.eval_change).as_str());
    }

    Ok(url)
}

/// Build the streaming request URL for the game introduction.
pub fn introduction_url(base: &str, white_agent: &str, black_agent: &str) -> Result<Url> {
    let mut url = service_url(base, "introduction")?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("white_agent", white_agent);
        query.append_pair("black_agent", black_agent);
    }

    Ok(url)
}

fn service_url(base: &str, endpoint: &str) -> Result<Url> {
    let joined = format!("{}/{endpoint}", base.trim_end_matches('/'));
    Url::parse(&joined).with_context(|| format!("Invalid commentary service URL: {joined}"))
}
