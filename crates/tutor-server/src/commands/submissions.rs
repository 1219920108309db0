//! The `dover-tutor submissions` commands.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use comfy_table::{Cell, Table};

use tutor_core::submission::{JsonFileStore, Submission, SubmissionLog};
use tutor_providers::config::load_config_from;

pub enum Action {
    List { tutor: Option<String>, format: String },
    Show { id: String },
    Delete { id: String },
    Clear { yes: bool },
}

pub fn execute(store: Option<PathBuf>, config_path: Option<PathBuf>, action: Action) -> Result<()> {
    let path = match store {
        Some(path) => path,
        None => load_config_from(config_path.as_deref())?.submissions.path,
    };
    let log = SubmissionLog::new(JsonFileStore::new(path));

    match action {
        Action::List { tutor, format } => {
            let records = log.list_for_tutor(tutor.as_deref())?;
            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&records)?),
                _ => print_table(&records),
            }
        }
        Action::Show { id } => match log.get(&id)? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => anyhow::bail!("no submission with id {id}"),
        },
        Action::Delete { id } => {
            if log.delete(&id)? {
                println!("Deleted submission {id}");
            } else {
                anyhow::bail!("no submission with id {id}");
            }
        }
        Action::Clear { yes } => {
            anyhow::ensure!(yes, "refusing to delete ALL submissions without --yes");
            let count = log.list()?.len();
            log.clear()?;
            println!("Deleted {count} submission(s)");
        }
    }

    Ok(())
}

fn print_table(records: &[Submission]) {
    if records.is_empty() {
        println!("No submissions found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Submitted", "Name", "Tutor", "Role", "Allocation"]);

    for record in records {
        let submitted = Utc
            .timestamp_millis_opt(record.timestamp)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| record.timestamp.to_string());
        let allocation = record
            .answers
            .allocation
            .0
            .iter()
            .map(|row| row.percentage.to_string())
            .collect::<Vec<_>>()
            .join("/");
        let tutor = if record.tutor().is_empty() {
            "No Tutor"
        } else {
            record.tutor()
        };

        table.add_row(vec![
            Cell::new(&record.id),
            Cell::new(submitted),
            Cell::new(record.student_name()),
            Cell::new(tutor),
            Cell::new(&record.answers.group_role),
            Cell::new(allocation),
        ]);
    }

    println!("{table}");
    println!("{} submission(s)", records.len());
}
