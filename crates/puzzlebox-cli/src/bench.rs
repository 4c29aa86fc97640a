//! Interactive bench for the mock board.
//!
//! Reads one command per line from stdin:
//!
//! ```text
//! place <gate> <uid|category>   put a token on a gate
//! remove <gate>                 take the token off a gate
//! clear                         empty the board
//! press                         press the trigger
//! status                        show board, lights and narration
//! help                          list commands
//! quit                          leave
//! ```

use std::str::FromStr;

use anyhow::{Context, Result, bail};
use puzzlebox_core::{Category, GateIndex, TokenIdentity};
use puzzlebox_engine::CategoryRegistry;
use puzzlebox_hardware::mock::{
    MockBoardHandle, MockIndicatorsHandle, MockNarratorHandle, MockTriggerHandle,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

pub const HELP: &str = "\
commands:
  place <gate> <uid|category>   put a token on a gate (0-5)
  remove <gate>                 take the token off a gate
  clear                         empty the board
  press                         press the trigger
  status                        show board, lights and narration
  help                          list commands
  quit                          leave";

/// Token named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRef {
    Uid(TokenIdentity),
    /// Any registered token of this category that is not on the board yet.
    Category(Category),
}

impl FromStr for TokenRef {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(category) = s.parse::<Category>() {
            return Ok(TokenRef::Category(category));
        }
        let uid = s
            .parse::<TokenIdentity>()
            .with_context(|| format!("'{s}' is neither a UID nor a category"))?;
        Ok(TokenRef::Uid(uid))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchCommand {
    Place { gate: GateIndex, token: TokenRef },
    Remove(GateIndex),
    Clear,
    Press,
    Status,
    Help,
    Quit,
}

impl BenchCommand {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "place" | "put" => {
                let gate = parse_gate(words.next())?;
                let token = words.next().context("missing token")?.parse()?;
                BenchCommand::Place { gate, token }
            }
            "remove" | "rm" => BenchCommand::Remove(parse_gate(words.next())?),
            "clear" => BenchCommand::Clear,
            "press" | "p" => BenchCommand::Press,
            "status" | "s" => BenchCommand::Status,
            "help" | "?" => BenchCommand::Help,
            "quit" | "exit" | "q" => BenchCommand::Quit,
            other => bail!("unknown command '{other}', try 'help'"),
        };

        if let Some(extra) = words.next() {
            bail!("unexpected argument '{extra}'");
        }
        Ok(Some(command))
    }
}

fn parse_gate(word: Option<&str>) -> Result<GateIndex> {
    let word = word.context("missing gate number")?;
    let index: usize = word
        .parse()
        .with_context(|| format!("invalid gate number '{word}'"))?;
    Ok(GateIndex::new(index)?)
}

/// Operator side of the mock devices.
pub struct Bench {
    board: MockBoardHandle,
    button: MockTriggerHandle,
    audio: MockNarratorHandle,
    lights: MockIndicatorsHandle,
    registry: CategoryRegistry,
}

impl Bench {
    pub fn new(
        board: MockBoardHandle,
        button: MockTriggerHandle,
        audio: MockNarratorHandle,
        lights: MockIndicatorsHandle,
        registry: CategoryRegistry,
    ) -> Self {
        Self {
            board,
            button,
            audio,
            lights,
            registry,
        }
    }

    /// Serve stdin until `quit` or end of input.
    pub async fn run(self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
            match BenchCommand::parse(&line) {
                Ok(Some(command)) => match self.execute(command).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => println!("error: {e:#}"),
                },
                Ok(None) => {}
                Err(e) => println!("error: {e:#}"),
            }
        }
        Ok(())
    }

    /// Carry out one command. Returns `false` when the bench should close.
    pub async fn execute(&self, command: BenchCommand) -> Result<bool> {
        debug!(?command, "bench command");

        match command {
            BenchCommand::Place { gate, token } => {
                let identity = self.resolve(token).await?;
                self.board.place_token(gate, identity).await;
                println!(
                    "{gate}: {identity} ({})",
                    self.registry.resolve(&identity)
                );
            }
            BenchCommand::Remove(gate) => self.board.remove_token(gate).await,
            BenchCommand::Clear => self.board.clear().await,
            BenchCommand::Press => self.button.press().await?,
            BenchCommand::Status => println!("{}", self.status().await),
            BenchCommand::Help => println!("{HELP}"),
            BenchCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    async fn resolve(&self, token: TokenRef) -> Result<TokenIdentity> {
        let category = match token {
            TokenRef::Uid(identity) => return Ok(identity),
            TokenRef::Category(category) => category,
        };

        let mut on_board = Vec::new();
        for gate in GateIndex::all() {
            if let Some(identity) = self.board.token_at(gate).await {
                on_board.push(identity);
            }
        }

        self.registry
            .entries()
            .into_iter()
            .find(|(identity, c)| *c == category && !on_board.contains(identity))
            .map(|(identity, _)| identity)
            .with_context(|| format!("no free {category} token registered"))
    }

    /// Board contents, indicator states and narration.
    pub async fn status(&self) -> String {
        let mut out = String::new();

        for gate in GateIndex::all() {
            let line = match self.board.token_at(gate).await {
                Some(identity) => {
                    format!("{gate}: {identity} {}", self.registry.resolve(&identity))
                }
                None => format!("{gate}: -"),
            };
            out.push_str(&line);
            out.push('\n');
        }

        let lights: String = self
            .lights
            .lit()
            .await
            .iter()
            .map(|lit| if *lit { '#' } else { '.' })
            .collect();
        out.push_str(&format!("lights: {lights}\n"));

        match self.audio.now_playing().await {
            Some(track) => out.push_str(&format!("narration: {track}")),
            None => out.push_str("narration: idle"),
        }
        out
    }
}
