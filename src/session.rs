use crate::error::{Result, SessionError};
use crate::history::History;
use crate::model::{Flag, Scenario, ScoringMode, Variable, clamp_value, coerce_value};
use crate::scoring::{Outcome, score_all};
use crate::{debug_log, info_log};

/// One discrete user event, independent of the front-end that produced it.
/// Indices are zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    AddScenario,
    AddVariable { scenario: usize },
    SetTitle { scenario: usize, title: String },
    SetLabel { scenario: usize, variable: usize, label: String },
    SetValue { scenario: usize, variable: usize, raw: String },
    ToggleFlag { scenario: usize, variable: usize, flag: Flag },
    Generate,
    ClearAll,
    Undo,
    Show,
    Exit,
}

/// What an applied action changed, so front-ends can pick what to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Edited,
    Generated,
    Undone,
    NothingToUndo,
    Unchanged,
}

/// The single owned state container: scenarios, last results, undo history.
#[derive(Debug)]
pub struct Session {
    mode: ScoringMode,
    scenarios: Vec<Scenario>,
    results: Vec<Outcome>,
    history: History,
}

impl Session {
    /// A session holding one fresh scenario, as the page first loads.
    pub fn new(mode: ScoringMode) -> Self {
        Self::with_history_limit(mode, None)
    }

    pub fn with_history_limit(mode: ScoringMode, limit: Option<usize>) -> Self {
        Self {
            mode,
            scenarios: vec![Scenario::new(mode)],
            results: Vec::new(),
            history: History::with_limit(limit),
        }
    }

    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn results(&self) -> &[Outcome] {
        &self.results
    }

    pub fn history_depth(&self) -> usize {
        self.history.len()
    }

    pub fn apply(&mut self, action: UserAction) -> Result<Applied> {
        debug_log!("apply {:?}", action);
        match action {
            UserAction::AddScenario => self.add_scenario().map(|()| Applied::Edited),
            UserAction::AddVariable { scenario } => {
                self.add_variable(scenario).map(|_| Applied::Edited)
            }
            UserAction::SetTitle { scenario, title } => {
                self.set_title(scenario, title).map(|()| Applied::Edited)
            }
            UserAction::SetLabel {
                scenario,
                variable,
                label,
            } => self
                .set_label(scenario, variable, label)
                .map(|()| Applied::Edited),
            UserAction::SetValue {
                scenario,
                variable,
                raw,
            } => self
                .set_value(scenario, variable, &raw)
                .map(|_| Applied::Edited),
            UserAction::ToggleFlag {
                scenario,
                variable,
                flag,
            } => self
                .toggle_flag(scenario, variable, flag)
                .map(|_| Applied::Edited),
            UserAction::Generate => {
                self.generate();
                Ok(Applied::Generated)
            }
            UserAction::ClearAll => self.clear_all().map(|()| Applied::Edited),
            UserAction::Undo => Ok(if self.undo()? {
                Applied::Undone
            } else {
                Applied::NothingToUndo
            }),
            UserAction::Show | UserAction::Exit => Ok(Applied::Unchanged),
        }
    }

    pub fn save_history(&mut self) -> Result<()> {
        self.history.push(&self.scenarios)
    }

    pub fn add_scenario(&mut self) -> Result<()> {
        self.save_history()?;
        self.scenarios.push(Scenario::new(self.mode));
        info_log!("added scenario #{}", self.scenarios.len());
        Ok(())
    }

    /// Appends a default variable, returning its index.
    pub fn add_variable(&mut self, scenario: usize) -> Result<usize> {
        let target = self.scenario_mut(scenario)?;
        target.variables.push(Variable::default());
        Ok(target.variables.len() - 1)
    }

    pub fn set_title(&mut self, scenario: usize, title: impl Into<String>) -> Result<()> {
        self.scenario_mut(scenario)?.title = title.into();
        Ok(())
    }

    pub fn set_label(
        &mut self,
        scenario: usize,
        variable: usize,
        label: impl Into<String>,
    ) -> Result<()> {
        self.variable_mut(scenario, variable)?.label = label.into();
        Ok(())
    }

    /// Coerces `raw` and clamps it into the slider range. Returns the stored value.
    pub fn set_value(&mut self, scenario: usize, variable: usize, raw: &str) -> Result<i32> {
        let value = clamp_value(coerce_value(raw));
        self.variable_mut(scenario, variable)?.value = value;
        Ok(value)
    }

    /// Flips a flag in place and returns its new state.
    pub fn toggle_flag(&mut self, scenario: usize, variable: usize, flag: Flag) -> Result<bool> {
        let target = self.variable_mut(scenario, variable)?;
        target.toggle(flag);
        Ok(target.flag(flag))
    }

    /// Replaces the results wholesale with fresh outcomes for every scenario.
    pub fn generate(&mut self) -> &[Outcome] {
        self.results = score_all(&self.scenarios, self.mode, &mut rand::thread_rng());
        info_log!("generated {} outcomes", self.results.len());
        &self.results
    }

    pub fn clear_all(&mut self) -> Result<()> {
        self.save_history()?;
        self.scenarios.clear();
        self.results.clear();
        info_log!("cleared all scenarios");
        Ok(())
    }

    /// Restores the latest snapshot. Returns false, leaving state untouched,
    /// when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        match self.history.pop()? {
            Some(scenarios) => {
                self.scenarios = scenarios;
                self.results.clear();
                info_log!("undo restored {} scenarios", self.scenarios.len());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn scenario_mut(&mut self, scenario: usize) -> Result<&mut Scenario> {
        self.scenarios
            .get_mut(scenario)
            .ok_or(SessionError::NoSuchScenario(scenario))
    }

    fn variable_mut(&mut self, scenario: usize, variable: usize) -> Result<&mut Variable> {
        self.scenario_mut(scenario)?
            .variables
            .get_mut(variable)
            .ok_or(SessionError::NoSuchVariable { scenario, variable })
    }
}

/// A front-end able to drive a [`Session`].
pub trait SessionInterface {
    /// Blocks until the user produces an action. `None` means the input was
    /// rejected and should be asked for again.
    fn read_action(&mut self, session: &Session) -> Option<UserAction>;
    fn display_scenarios(&mut self, session: &Session);
    fn display_results(&mut self, session: &Session);
    fn display_undo(&mut self, session: &Session, restored: bool);
    fn display_error(&mut self, error: &SessionError);
    fn display_exit_message(&mut self);
}

pub fn session_loop<I: SessionInterface + ?Sized>(session: &mut Session, interface: &mut I) {
    interface.display_scenarios(session);

    loop {
        let Some(action) = interface.read_action(session) else {
            continue;
        };

        match action {
            UserAction::Exit => {
                interface.display_exit_message();
                break;
            }
            UserAction::Show => interface.display_scenarios(session),
            action => match session.apply(action) {
                Ok(Applied::Generated) => interface.display_results(session),
                Ok(Applied::Undone) => interface.display_undo(session, true),
                Ok(Applied::NothingToUndo) => interface.display_undo(session, false),
                Ok(Applied::Edited | Applied::Unchanged) => interface.display_scenarios(session),
                Err(e) => {
                    debug_log!("action failed: {}", e);
                    interface.display_error(&e);
                }
            },
        }
    }
}
