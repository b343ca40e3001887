use crate::model::{Scenario, ScoringMode, Variable};
use rand::Rng;
use rand::seq::SliceRandom;

pub const MIN_YES: i64 = 1;
pub const MAX_YES: i64 = 99;
pub const EVEN_ODDS: i64 = 50;

pub const RATIONALES: [&str; 5] = [
    "Scenario inputs increase likelihood.",
    "Weight of variables adjusted odds upward.",
    "Neutral factors yield average outcome.",
    "Key factors absent, odds remain low.",
    "Real-world precedent supports result.",
];

/// Computed odds for one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub title: String,
    pub yes: u8,
    pub no: u8,
    pub pressure: i64,
    pub rationale: Option<&'static str>,
}

pub fn contributing<'a>(
    variables: &'a [Variable],
    mode: ScoringMode,
) -> impl Iterator<Item = &'a Variable> {
    variables.iter().filter(move |v| mode.contributes(v))
}

pub fn total_pressure(variables: &[Variable], mode: ScoringMode) -> i64 {
    contributing(variables, mode).map(|v| i64::from(v.value)).sum()
}

/// Yes percentage for a contributing sum of `pressure` over `count` variables.
pub fn yes_percentage(pressure: i64, count: usize, mode: ScoringMode) -> u8 {
    let yes = match mode {
        ScoringMode::Additive => EVEN_ODDS.saturating_add(pressure),
        ScoringMode::Pressure | ScoringMode::Weighted => match i64::try_from(count) {
            Ok(n) if n > 0 => pressure.div_euclid(n),
            _ => EVEN_ODDS,
        },
    };
    // Always within 1..=99, so the narrowing cannot fail.
    u8::try_from(yes.clamp(MIN_YES, MAX_YES)).unwrap_or(50)
}

pub fn score(scenario: &Scenario, mode: ScoringMode) -> Outcome {
    let count = contributing(&scenario.variables, mode).count();
    let pressure = total_pressure(&scenario.variables, mode);
    let yes = yes_percentage(pressure, count, mode);
    Outcome {
        title: scenario.title.clone(),
        yes,
        no: 100 - yes,
        pressure,
        rationale: None,
    }
}

/// Scores every scenario; additive mode also attaches a rationale line.
pub fn score_all<R: Rng + ?Sized>(
    scenarios: &[Scenario],
    mode: ScoringMode,
    rng: &mut R,
) -> Vec<Outcome> {
    scenarios
        .iter()
        .map(|scenario| {
            let mut outcome = score(scenario, mode);
            if mode == ScoringMode::Additive {
                outcome.rationale = pick_rationale(rng);
            }
            outcome
        })
        .collect()
}

pub fn pick_rationale<R: Rng + ?Sized>(rng: &mut R) -> Option<&'static str> {
    RATIONALES.choose(rng).copied()
}
