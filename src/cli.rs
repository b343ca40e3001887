use crate::error::{Result, SessionError};
use crate::model::{Flag, ScoringMode, Variable};
use crate::scoring::Outcome;
use crate::session::{Session, SessionInterface, UserAction};
use crate::{debug_log, info_log};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Folymarket scenario odds simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run the full-screen terminal interface instead of line commands
    #[arg(long)]
    pub tui: bool,

    /// Which odds formula to use
    #[arg(short, long, value_enum, default_value_t = ScoringMode::Weighted)]
    pub mode: ScoringMode,

    /// Keep at most this many undo snapshots
    #[arg(long = "history-limit", value_parser = clap::value_parser!(u16).range(1..))]
    pub history_limit: Option<u16>,

    /// Write logs here instead of the user cache directory
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

pub const HELP_TEXT: &str = "\
Commands (indices start at 1):
  add                        add a scenario
  var <s>                    add a variable to scenario s
  title <s> <text>           set scenario title
  label <s> <v> <text>       set variable label
  set <s> <v> <value>        set variable value (0-100)
  toggle <s> <v> <flag>      flag: active | pressure | impact
  generate                   compute outcomes
  clear                      clear all scenarios
  undo                       undo the last add/clear
  show                       list scenarios
  exit                       quit";

fn parse_index(token: Option<&str>, what: &str) -> Result<usize> {
    let token = token.ok_or_else(|| SessionError::InvalidCommand(format!("missing {what}")))?;
    match token.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(SessionError::InvalidCommand(format!(
            "{what} must be a number starting at 1, got '{token}'"
        ))),
    }
}

/// Splits off the first `n` whitespace-separated words and returns the rest
/// of the line verbatim (trimmed), so titles keep their inner spacing.
fn split_words(line: &str, n: usize) -> (Vec<&str>, &str) {
    let mut words = Vec::with_capacity(n);
    let mut rest = line.trim_start();
    for _ in 0..n {
        if rest.is_empty() {
            break;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        words.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    (words, rest.trim_end())
}

/// Parses one line-mode command into an action.
pub fn parse_command(line: &str) -> Result<UserAction> {
    let (head, _) = split_words(line, 1);
    let Some(verb) = head.first() else {
        return Err(SessionError::InvalidCommand("empty command".to_string()));
    };

    match verb.to_ascii_lowercase().as_str() {
        "add" => Ok(UserAction::AddScenario),
        "var" | "variable" => {
            let (words, _) = split_words(line, 2);
            let scenario = parse_index(words.get(1).copied(), "scenario")?;
            Ok(UserAction::AddVariable { scenario })
        }
        "title" => {
            let (words, rest) = split_words(line, 2);
            let scenario = parse_index(words.get(1).copied(), "scenario")?;
            Ok(UserAction::SetTitle {
                scenario,
                title: rest.to_string(),
            })
        }
        "label" => {
            let (words, rest) = split_words(line, 3);
            let scenario = parse_index(words.get(1).copied(), "scenario")?;
            let variable = parse_index(words.get(2).copied(), "variable")?;
            Ok(UserAction::SetLabel {
                scenario,
                variable,
                label: rest.to_string(),
            })
        }
        "set" => {
            let (words, rest) = split_words(line, 3);
            let scenario = parse_index(words.get(1).copied(), "scenario")?;
            let variable = parse_index(words.get(2).copied(), "variable")?;
            Ok(UserAction::SetValue {
                scenario,
                variable,
                raw: rest.to_string(),
            })
        }
        "toggle" => {
            let (words, rest) = split_words(line, 3);
            let scenario = parse_index(words.get(1).copied(), "scenario")?;
            let variable = parse_index(words.get(2).copied(), "variable")?;
            let flag = Flag::parse(rest).ok_or_else(|| {
                SessionError::InvalidCommand(format!(
                    "unknown flag '{rest}' (use active, pressure or impact)"
                ))
            })?;
            Ok(UserAction::ToggleFlag {
                scenario,
                variable,
                flag,
            })
        }
        "generate" | "gen" => Ok(UserAction::Generate),
        "clear" => Ok(UserAction::ClearAll),
        "undo" => Ok(UserAction::Undo),
        "show" | "list" => Ok(UserAction::Show),
        "exit" | "quit" => Ok(UserAction::Exit),
        other => Err(SessionError::InvalidCommand(format!(
            "unknown command '{other}' (type 'help')"
        ))),
    }
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

pub fn format_variable(index: usize, variable: &Variable, mode: ScoringMode) -> String {
    let label = if variable.label.is_empty() {
        "(unnamed)"
    } else {
        variable.label.as_str()
    };
    let flags: Vec<String> = mode
        .flags()
        .iter()
        .map(|&flag| format!("{} {}", checkbox(variable.flag(flag)), flag.label(mode)))
        .collect();
    let value = if mode == ScoringMode::Additive {
        format!("(+{}%)", variable.value)
    } else if mode.shows_slider(variable) {
        format!("= {}", variable.value)
    } else {
        String::new()
    };
    let mut line = format!("  {}. {label} {value}", index + 1);
    for flag in flags {
        line.push_str("  ");
        line.push_str(&flag);
    }
    line
}

pub fn format_scenarios(session: &Session) -> Vec<String> {
    let mut lines = Vec::new();
    if session.scenarios().is_empty() {
        lines.push("No scenarios. Type 'add' to create one.".to_string());
        return lines;
    }
    for (i, scenario) in session.scenarios().iter().enumerate() {
        lines.push(format!("Scenario {}: {}", i + 1, scenario.display_title(i)));
        if scenario.variables.is_empty() {
            lines.push("  (no variables)".to_string());
        }
        for (j, variable) in scenario.variables.iter().enumerate() {
            lines.push(format_variable(j, variable, session.mode()));
        }
    }
    lines
}

pub fn format_outcome(index: usize, outcome: &Outcome) -> Vec<String> {
    let title = if outcome.title.trim().is_empty() {
        format!("Scenario #{}", index + 1)
    } else {
        outcome.title.clone()
    };
    let mut lines = vec![format!(
        "{title}: Yes {}% / No {}% (pressure {})",
        outcome.yes, outcome.no, outcome.pressure
    )];
    if let Some(rationale) = outcome.rationale {
        lines.push(format!("  {rationale}"));
    }
    lines
}

/// Line-mode implementation of [`SessionInterface`] over any reader and writer.
pub struct CliInterface<R: BufRead, W: Write = io::Stdout> {
    reader: R,
    writer: W,
}

impl<R: BufRead> CliInterface<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            writer: io::stdout(),
        }
    }
}

impl<R: BufRead, W: Write> CliInterface<R, W> {
    pub fn with_writer(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.writer, "{line}") {
            debug_log!("write failed: {}", e);
        }
    }
}

impl<R: BufRead, W: Write> SessionInterface for CliInterface<R, W> {
    fn read_action(&mut self, _session: &Session) -> Option<UserAction> {
        self.emit("\nEnter a command ('help' for a list):");
        let mut input = String::new();
        match self.reader.read_line(&mut input) {
            Ok(0) => return Some(UserAction::Exit),
            Ok(_) => {}
            Err(e) => {
                info_log!("input error, exiting: {}", e);
                return Some(UserAction::Exit);
            }
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("help") {
            self.emit(HELP_TEXT);
            return None;
        }
        match parse_command(input) {
            Ok(action) => Some(action),
            Err(e) => {
                self.emit(&e.to_string());
                None
            }
        }
    }

    fn display_scenarios(&mut self, session: &Session) {
        for line in format_scenarios(session) {
            self.emit(&line);
        }
    }

    fn display_results(&mut self, session: &Session) {
        self.emit(&format!("Outcomes ({} mode):", session.mode().name()));
        if session.results().is_empty() {
            self.emit("  (no scenarios)");
        }
        for (i, outcome) in session.results().iter().enumerate() {
            for line in format_outcome(i, outcome) {
                self.emit(&format!("  {line}"));
            }
        }
    }

    fn display_undo(&mut self, session: &Session, restored: bool) {
        if restored {
            self.emit("Undone.");
            self.display_scenarios(session);
        } else {
            self.emit("Nothing to undo.");
        }
    }

    fn display_error(&mut self, error: &SessionError) {
        self.emit(&format!("Error: {error}"));
    }

    fn display_exit_message(&mut self) {
        self.emit("Exiting.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["folymarket"]);
        assert!(!cli.tui);
        assert_eq!(cli.mode, ScoringMode::Weighted);
        assert_eq!(cli.history_limit, None);
        assert_eq!(cli.log_file, None);
    }

    #[test]
    fn test_cli_with_options() {
        let cli = Cli::parse_from([
            "folymarket",
            "--tui",
            "--mode",
            "additive",
            "--history-limit",
            "5",
            "--log-file",
            "/tmp/f.log",
        ]);
        assert!(cli.tui);
        assert_eq!(cli.mode, ScoringMode::Additive);
        assert_eq!(cli.history_limit, Some(5));
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/f.log")));
    }

    #[test]
    fn test_cli_rejects_zero_history_limit() {
        assert!(Cli::try_parse_from(["folymarket", "--history-limit", "0"]).is_err());
    }

    #[test]
    fn test_parse_simple_verbs() {
        assert_eq!(parse_command("add").unwrap(), UserAction::AddScenario);
        assert_eq!(parse_command("GENERATE").unwrap(), UserAction::Generate);
        assert_eq!(parse_command("gen").unwrap(), UserAction::Generate);
        assert_eq!(parse_command("clear").unwrap(), UserAction::ClearAll);
        assert_eq!(parse_command("undo").unwrap(), UserAction::Undo);
        assert_eq!(parse_command("show").unwrap(), UserAction::Show);
        assert_eq!(parse_command("quit").unwrap(), UserAction::Exit);
    }

    #[test]
    fn test_parse_indices_are_one_based() {
        assert_eq!(
            parse_command("var 2").unwrap(),
            UserAction::AddVariable { scenario: 1 }
        );
        assert_eq!(
            parse_command("set 1 3 75").unwrap(),
            UserAction::SetValue {
                scenario: 0,
                variable: 2,
                raw: "75".to_string()
            }
        );
        assert!(parse_command("var 0").is_err());
        assert!(parse_command("var x").is_err());
        assert!(parse_command("var").is_err());
    }

    #[test]
    fn test_parse_title_keeps_inner_spacing() {
        assert_eq!(
            parse_command("title 1   Will the  bill pass?  ").unwrap(),
            UserAction::SetTitle {
                scenario: 0,
                title: "Will the  bill pass?".to_string()
            }
        );
        assert_eq!(
            parse_command("label 1 2 Media coverage").unwrap(),
            UserAction::SetLabel {
                scenario: 0,
                variable: 1,
                label: "Media coverage".to_string()
            }
        );
    }

    #[test]
    fn test_parse_set_allows_empty_value() {
        assert_eq!(
            parse_command("set 1 1").unwrap(),
            UserAction::SetValue {
                scenario: 0,
                variable: 0,
                raw: String::new()
            }
        );
    }

    #[test]
    fn test_parse_toggle_flags() {
        assert_eq!(
            parse_command("toggle 1 1 active").unwrap(),
            UserAction::ToggleFlag {
                scenario: 0,
                variable: 0,
                flag: Flag::Pressure
            }
        );
        assert_eq!(
            parse_command("toggle 2 1 impact").unwrap(),
            UserAction::ToggleFlag {
                scenario: 1,
                variable: 0,
                flag: Flag::Impactful
            }
        );
        assert!(parse_command("toggle 1 1 weight").is_err());
    }

    #[test]
    fn test_parse_unknown_and_empty() {
        assert!(matches!(
            parse_command("frobnicate"),
            Err(SessionError::InvalidCommand(_))
        ));
        assert!(parse_command("   ").is_err());
    }

    #[test]
    fn test_read_action_help_then_command() {
        let session = Session::new(ScoringMode::Weighted);
        let mut interface = CliInterface::with_writer(Cursor::new("help\nadd\n"), Vec::new());
        assert_eq!(interface.read_action(&session), None);
        assert_eq!(interface.read_action(&session), Some(UserAction::AddScenario));
        let out = String::from_utf8(interface.into_writer()).unwrap();
        assert!(out.contains("Commands (indices start at 1):"));
    }

    #[test]
    fn test_read_action_eof_exits() {
        let session = Session::new(ScoringMode::Weighted);
        let mut interface = CliInterface::with_writer(Cursor::new(""), Vec::new());
        assert_eq!(interface.read_action(&session), Some(UserAction::Exit));
    }

    #[test]
    fn test_read_action_invalid_reports_error() {
        let session = Session::new(ScoringMode::Weighted);
        let mut interface = CliInterface::with_writer(Cursor::new("toggle 1\n"), Vec::new());
        assert_eq!(interface.read_action(&session), None);
        let out = String::from_utf8(interface.into_writer()).unwrap();
        assert!(out.contains("invalid command: missing variable"));
    }

    #[test]
    fn test_format_variable_per_mode() {
        let mut variable = Variable::new("Polls", 70);
        assert_eq!(
            format_variable(0, &variable, ScoringMode::Weighted),
            "  1. Polls = 70  [x] pressure  [x] impactful"
        );
        variable.has_pressure = false;
        assert_eq!(
            format_variable(0, &variable, ScoringMode::Pressure),
            "  1. Polls   [ ] pressure"
        );
        assert_eq!(
            format_variable(2, &variable, ScoringMode::Additive),
            "  3. Polls (+70%)  [ ] active"
        );
    }

    #[test]
    fn test_format_outcome_with_rationale() {
        let outcome = Outcome {
            title: String::new(),
            yes: 60,
            no: 40,
            pressure: 10,
            rationale: Some("Neutral factors yield average outcome."),
        };
        assert_eq!(
            format_outcome(1, &outcome),
            vec![
                "Scenario #2: Yes 60% / No 40% (pressure 10)".to_string(),
                "  Neutral factors yield average outcome.".to_string(),
            ]
        );
    }

    #[test]
    fn test_format_empty_session() {
        let mut session = Session::new(ScoringMode::Weighted);
        session.clear_all().unwrap();
        assert_eq!(
            format_scenarios(&session),
            vec!["No scenarios. Type 'add' to create one.".to_string()]
        );
    }
}
