//! Line input from the terminal

use anyhow::Context;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

pub struct Prompt {
    lines: tokio::io::Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `label` and read one trimmed line; `None` at end of input
    pub async fn ask(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        print!("{}", label);
        std::io::stdout().flush().context("failed to write prompt")?;
        let line = self
            .lines
            .next_line()
            .await
            .context("failed to read from stdin")?;
        Ok(line.map(|l| l.trim().to_string()))
    }

    /// Like `ask`, but end of input is an error
    pub async fn require(&mut self, label: &str) -> anyhow::Result<String> {
        self.ask(label)
            .await?
            .ok_or_else(|| anyhow::anyhow!("input closed"))
    }
}
