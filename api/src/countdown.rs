use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

pub const KICKOFF_PASSED: &str = "Game in progress or completed";
pub const GAME_TIME: &str = "Game time!";

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Time left until a scheduled kickoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Countdown {
    Remaining(Duration),
    Reached,
}

impl Countdown {
    pub fn between(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        match (target - now).to_std() {
            Ok(d) if !d.is_zero() => Countdown::Remaining(d),
            _ => Countdown::Reached,
        }
    }

    pub fn remaining(&self) -> Duration {
        match self {
            Countdown::Remaining(d) => *d,
            Countdown::Reached => Duration::ZERO,
        }
    }

    /// Label for the next-game view: "2 days, 3 hours until kickoff".
    pub fn label(&self) -> String {
        match self {
            Countdown::Remaining(d) => format!("{} until kickoff", format_remaining(*d)),
            Countdown::Reached => KICKOFF_PASSED.to_owned(),
        }
    }

    /// Label for a countdown tick; a reached countdown shows the kickoff banner.
    pub fn tick_label(&self) -> String {
        match self {
            Countdown::Remaining(_) => self.label(),
            Countdown::Reached => GAME_TIME.to_owned(),
        }
    }
}

/// The largest non-zero unit, plus the next unit down when it isn't zero.
fn format_remaining(d: Duration) -> String {
    let secs = d.as_secs();
    let units = [
        (secs / DAY, "day"),
        (secs % DAY / HOUR, "hour"),
        (secs % HOUR / MINUTE, "minute"),
        (secs % MINUTE, "second"),
    ];

    let Some(lead) = units.iter().position(|(n, _)| *n > 0) else {
        return "less than a second".to_owned();
    };

    let mut parts = vec![plural(units[lead])];
    if let Some(&(n, unit)) = units.get(lead + 1)
        && n > 0
    {
        parts.push(plural((n, unit)));
    }
    parts.join(", ")
}

fn plural((n, unit): (u64, &str)) -> String {
    if n == 1 {
        format!("{n} {unit}")
    } else {
        format!("{n} {unit}s")
    }
}
