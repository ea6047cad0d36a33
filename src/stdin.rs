//! Interactive driver.
//!
//! Stands in for the game loop at its boundary: line commands on stdin
//! produce the same triggers a real game client would — an introduction
//! at game start, a commentary request per move, and an immediate stop.

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::arbiter::CommentaryAction;
use crate::commentary::{CommentaryRequest, Player};
use crate::config::Config;
use crate::event::{Event, EventBus};

const HELP_TEXT: &str = r#"
===================================================================
Commands:
Narrate the game introduction:      intro
Narrate a move:                     move <san> <white|black> [eval] [eval_change]
Silence narration immediately:      stop
Show this help:                     help
==================================================================="#;

pub fn init(bus: &EventBus, config: &Config) {
    let bus = bus.clone();
    let config = config.clone();

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut move_number: u32 = 0;

        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_command(line, &config, &mut move_number) {
                Ok(Some(action)) => bus.send(Event::Commentary(action)),
                Ok(None) => println!("{HELP_TEXT}"),
                Err(message) => {
                    warn!("{message}");
                    println!("{HELP_TEXT}");
                }
            }
        }
    });
}

fn parse_command(
    line: &str,
    config: &Config,
    move_number: &mut u32,
) -> Result<Option<CommentaryAction>, String> {
    let mut parts = line.split_whitespace();

    match parts.next() {
        Some("intro") => Ok(Some(CommentaryAction::StartIntroduction {
            white: config.white_agent.clone(),
            black: config.black_agent.clone(),
        })),

        Some("move") => {
            let san_move = parts
                .next()
                .ok_or_else(|| "Missing move notation".to_string())?
                .to_string();

            let player = match parts.next() {
                Some("white") | None => Player::White,
                Some("black") => Player::Black,
                Some(other) => return Err(format!("Unknown player: {other}")),
            };

            let evaluation = parse_optional_int(parts.next())?;
            let eval_change = parse_optional_int(parts.next())?;

            *move_number += 1;

            Ok(Some(CommentaryAction::Narrate {
                request: CommentaryRequest {
                    san_move,
                    player,
                    evaluation,
                    eval_change,
                    fen: None,
                    move_number: Some(*move_number),
                },
            }))
        }

        Some("stop") => Ok(Some(CommentaryAction::Stop)),

        Some("help") => Ok(None),

        Some(other) => Err(format!("Unknown command: {other}")),

        None => Ok(None),
    }
}

fn parse_optional_int(value: Option<&str>) -> Result<Option<i32>, String> {
    match value {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|_| format!("Not a number: {raw}")),
    }
}
