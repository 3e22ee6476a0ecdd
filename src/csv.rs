use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::dialog::{Command, DialogView};
use crate::eligibility::Feature;
use crate::model::{Account, BalanceKind, Bank, TransferKind};
use crate::script::Step;
use crate::workflow::{Event, Outcome};
use crate::Amount;

/// Errors that can occur when reading an event script
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized event '{event}'")]
    UnrecognizedEvent { line: usize, event: String },

    #[error("line {line}: {event} missing value")]
    MissingValue { line: usize, event: String },

    #[error("line {line}: {event} has invalid value '{value}'")]
    InvalidValue {
        line: usize,
        event: String,
        value: String,
    },
}

#[derive(Debug, Deserialize)]
struct InputRow {
    event: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    extra: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutputRow {
    stage: &'static str,
    progress: String,
    label: &'static str,
    reason: &'static str,
    shortfall: String,
    savings: String,
    deposit: String,
}

/// Read script steps from a csv file with `event,value,extra` columns
pub fn read_script(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<Step, ScriptError>>, ScriptError> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|source| ScriptError::Open {
            path: path.display().to_string(),
            source,
        })?;

    Ok(reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| ScriptError::Parse { line, source })?;
            parse_row(line, row)
        }))
}

fn parse_row(line: usize, row: InputRow) -> Result<Step, ScriptError> {
    let InputRow {
        event,
        value,
        extra,
    } = row;

    let required = |value: Option<String>| {
        value.ok_or_else(|| ScriptError::MissingValue {
            line,
            event: event.clone(),
        })
    };
    let invalid = |value: String| ScriptError::InvalidValue {
        line,
        event: event.clone(),
        value,
    };
    let text = |value: Option<String>| value.unwrap_or_default();

    let step = match event.as_str() {
        "login" => Step::Login {
            username: required(value)?,
            pin: text(extra),
        },
        "logout" => Step::Logout,
        "credit_savings" | "credit_deposit" => {
            let kind = if event == "credit_savings" {
                BalanceKind::Savings
            } else {
                BalanceKind::Deposit
            };
            let value = required(value)?;
            let amount = match value.parse::<i64>().ok().filter(|units| *units >= 0) {
                Some(units) => Amount::checked_from_units(units),
                None => None,
            };
            let Some(amount) = amount else {
                return Err(invalid(value));
            };
            Step::Credit { kind, amount }
        }
        "menu" => {
            let value = required(value)?;
            let feature = value.parse::<Feature>().map_err(|_| invalid(value))?;
            Step::Menu(feature)
        }
        "open" => {
            let value = required(value)?;
            let kind = match value.as_str() {
                "transfer" => TransferKind::ThirdParty,
                "withdrawal" => TransferKind::Withdrawal,
                _ => return Err(invalid(value)),
            };
            Step::Dialog(Command::Open(kind))
        }
        "amount" => Step::Dialog(Command::Event(Event::SetAmount(text(value)))),
        "account_number" => Step::Dialog(Command::Event(Event::SetAccountNumber(text(value)))),
        "owner" => Step::Dialog(Command::Event(Event::SetOwnerName(text(value)))),
        "bank" => {
            let value = required(value)?;
            let bank = value.parse::<Bank>().map_err(|_| invalid(value))?;
            Step::Dialog(Command::Event(Event::SelectBank(bank)))
        }
        "continue" => Step::Dialog(Command::Event(Event::Continue)),
        "back" => Step::Dialog(Command::Event(Event::Back)),
        "confirm" => Step::Dialog(Command::Event(Event::Confirm)),
        "pin" => Step::Dialog(Command::Event(Event::EnterPin(text(value)))),
        "submit" => Step::Dialog(Command::Event(Event::SubmitPin)),
        "wait" => Step::Dialog(Command::Wait),
        "close" => Step::Dialog(Command::Close),
        _ => {
            return Err(ScriptError::UnrecognizedEvent {
                line,
                event: event.clone(),
            });
        }
    };
    Ok(step)
}

/// Write the final dialog state as csv
pub fn write_report(
    writer: impl io::Write,
    view: &DialogView,
    account: Option<Account>,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);

    let reason = match view.outcome {
        Some(Outcome::Failed(reason)) => reason.as_str(),
        _ => "",
    };
    let row = OutputRow {
        stage: view.stage.as_str(),
        progress: format!("{:.2}", view.progress),
        label: view.label(),
        reason,
        shortfall: view
            .outcome
            .and_then(|outcome| outcome.shortfall())
            .map(|shortfall| shortfall.to_string())
            .unwrap_or_default(),
        savings: account.map(|a| a.savings.to_string()).unwrap_or_default(),
        deposit: account.map(|a| a.deposit.to_string()).unwrap_or_default(),
    };
    writer.serialize(&row)?;
    writer.flush()?;
    Ok(())
}
