use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinerClass {
    Small,
    Normal,
    Strong,
}

#[derive(Debug, Clone, Copy)]
pub struct MinerSpec {
    pub title: &'static str,
    pub price: u64,
    pub power: u64,
    pub progress: u64,
    /// Cycle length in seconds.
    pub break_time: i64,
    pub lifetime: i64,
}

impl MinerClass {
    pub const ALL: [MinerClass; 3] = [MinerClass::Small, MinerClass::Normal, MinerClass::Strong];

    pub fn spec(self) -> MinerSpec {
        match self {
            MinerClass::Small => MinerSpec {
                title: "Miner",
                price: 5,
                power: 1,
                progress: 0,
                break_time: 1,
                lifetime: 30,
            },
            MinerClass::Normal => MinerSpec {
                title: "Miner+",
                price: 50,
                power: 3,
                progress: 1,
                break_time: 2,
                lifetime: 45,
            },
            MinerClass::Strong => MinerSpec {
                title: "Gigabyte",
                price: 450,
                power: 10,
                progress: 5,
                break_time: 3,
                lifetime: 60,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MinerClass::Small => "small",
            MinerClass::Normal => "normal",
            MinerClass::Strong => "strong",
        }
    }
}

impl fmt::Display for MinerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown miner class {0}")]
pub struct UnknownMinerClass(pub String);

impl FromStr for MinerClass {
    type Err = UnknownMinerClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MinerClass::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| UnknownMinerClass(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Miner {
    pub class: MinerClass,
    pub start_at: i64,
    pub end_at: i64,
}

impl Miner {
    pub fn hire(class: MinerClass, now: i64) -> Self {
        Self {
            class,
            start_at: now,
            end_at: now + class.spec().lifetime,
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.end_at <= now
    }

    /// Un-multiplied income over `[from, to)`, limited to the miner's own
    /// `[start_at, end_at)` window. Cycles are counted from `start_at`, so
    /// splitting an interval never drops a partially elapsed cycle.
    pub fn income(&self, from: i64, to: i64) -> u64 {
        let lo = from.max(self.start_at);
        let hi = to.min(self.end_at);
        if hi <= lo {
            return 0;
        }
        let spec = self.class.spec();
        let done_before = self.cycles_until(lo, spec.break_time);
        let done_after = self.cycles_until(hi, spec.break_time);
        cumulative_yield(done_after, &spec) - cumulative_yield(done_before, &spec)
    }

    fn cycles_until(&self, at: i64, break_time: i64) -> u64 {
        let elapsed = (at - self.start_at).max(0);
        (elapsed / break_time.max(1)) as u64
    }
}

fn cumulative_yield(cycles: u64, spec: &MinerSpec) -> u64 {
    let ramp = cycles * cycles.saturating_sub(1) / 2;
    cycles * spec.power + ramp * spec.progress
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_classes_only() {
        assert_eq!("small".parse::<MinerClass>().ok(), Some(MinerClass::Small));
        assert_eq!("strong".parse::<MinerClass>().ok(), Some(MinerClass::Strong));
        assert!("giant".parse::<MinerClass>().is_err());
    }

    #[test]
    fn full_window_matches_closed_form() {
        let miner = Miner::hire(MinerClass::Normal, 100);
        let spec = MinerClass::Normal.spec();
        let cycles = (spec.lifetime / spec.break_time) as u64;
        let expected = cycles * spec.power + cycles * (cycles - 1) / 2 * spec.progress;
        assert_eq!(miner.income(0, 10_000), expected);
    }

    #[test]
    fn income_is_clamped_to_window() {
        let miner = Miner::hire(MinerClass::Small, 50);
        assert_eq!(miner.income(0, 50), 0);
        assert_eq!(miner.income(80, 200), 0);
        assert_eq!(miner.income(40, 55), 5);
    }

    #[test]
    fn per_second_slices_add_up_to_whole_interval() {
        let miner = Miner::hire(MinerClass::Strong, 0);
        let whole = miner.income(0, 60);
        let sliced: u64 = (0..60).map(|t| miner.income(t, t + 1)).sum();
        assert_eq!(whole, sliced);
        assert!(whole > 0);
    }

    #[test]
    fn expiry_is_inclusive_of_end() {
        let miner = Miner::hire(MinerClass::Small, 10);
        assert!(!miner.is_expired(39));
        assert!(miner.is_expired(40));
    }
}
