use anyhow::Context as _;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::oneshot;

use crate::actors::{Addr, HouseMsg, Status};
use crate::metrics::Metrics;
use crate::models::Coffee;

// ============================================================================
// Terminal Driver
// ============================================================================
//
// Reads commands line by line and turns them into messages for the house:
//
//   [count] guest|g [a|m|c] [max-coffee-count]   seat guests
//   status|s                                     number of seated guests
//   metrics                                      dump metrics
//   quit|q                                       close the house
//
// End of input closes the house as well.
//
// ============================================================================

static GUEST_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)?\s*(?:guest|g)\s*([AaMmCc])?\s*(\d+)?$")
        .expect("hardcoded regex pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    Guest {
        count: u32,
        coffee: Coffee,
        max_coffee_count: u32,
    },
    Status,
    Metrics,
    Quit,
    Unknown(String),
}

impl TerminalCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "status" | "s" => return TerminalCommand::Status,
            "metrics" => return TerminalCommand::Metrics,
            "quit" | "q" => return TerminalCommand::Quit,
            _ => {}
        }

        Self::parse_guest(line).unwrap_or_else(|| TerminalCommand::Unknown(line.to_string()))
    }

    fn parse_guest(line: &str) -> Option<Self> {
        let captures = GUEST_COMMAND.captures(line)?;

        let count = match captures.get(1) {
            Some(count) => count.as_str().parse().ok()?,
            None => 1,
        };
        let coffee = match captures.get(2) {
            Some(coffee) => coffee.as_str().parse().ok()?,
            None => Coffee::Akkaccino,
        };
        let max_coffee_count = match captures.get(3) {
            Some(max) => max.as_str().parse().ok()?,
            None => u32::MAX,
        };

        Some(TerminalCommand::Guest {
            count,
            coffee,
            max_coffee_count,
        })
    }
}

/// Interactive front end of a running coffee house
pub struct CoffeeHouseApp {
    name: String,
    house: Addr<HouseMsg>,
    status_timeout: Duration,
    metrics: Arc<Metrics>,
}

impl CoffeeHouseApp {
    pub fn new(
        name: impl Into<String>,
        house: Addr<HouseMsg>,
        status_timeout: Duration,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            name: name.into(),
            house,
            status_timeout,
            metrics,
        }
    }

    /// Process commands until `quit` or end of input, then close the house
    pub async fn run<R>(&self, input: R) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        tracing::info!("{} running. Enter commands into the terminal, e.g. `q` or `quit`", self.name);

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            match TerminalCommand::parse(&line) {
                TerminalCommand::Guest {
                    count,
                    coffee,
                    max_coffee_count,
                } => self.create_guest(count, coffee, max_coffee_count)?,
                TerminalCommand::Status => match self.status().await {
                    Ok(status) => tracing::info!("Status: guest count = {}", status.guest_count),
                    Err(e) => tracing::error!("Can't get status: {:#}", e),
                },
                TerminalCommand::Metrics => println!("{}", self.metrics.render()?),
                TerminalCommand::Quit => break,
                TerminalCommand::Unknown(command) if command.is_empty() => {}
                TerminalCommand::Unknown(command) => {
                    tracing::warn!("Unknown command {}!", command)
                }
            }
        }

        tracing::info!("🛑 Closing {}", self.name);
        self.house.stop();
        self.house.closed().await;
        Ok(())
    }

    pub fn create_guest(&self, count: u32, coffee: Coffee, max_coffee_count: u32) -> anyhow::Result<()> {
        self.house.tell(HouseMsg::CreateGuest {
            coffee,
            count,
            caffeine_limit: max_coffee_count,
        })?;
        Ok(())
    }

    /// Ask the house for its status, giving up after the configured timeout
    pub async fn status(&self) -> anyhow::Result<Status> {
        let (reply, response) = oneshot::channel();
        self.house.tell(HouseMsg::GetStatus(reply))?;

        let status = tokio::time::timeout(self.status_timeout, response)
            .await
            .context("status request timed out")?
            .context("coffee house closed before answering")?;
        Ok(status)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
