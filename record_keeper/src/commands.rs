//! Dispatch of the non-interactive contact subcommands.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::cli::{ContactAction, ContactFields};
use crate::contacts::{ContactBook, ContactDraft};
use crate::error::StoreError;
use crate::settings::Settings;
use crate::shell::TaskSession;
use crate::tasks::TaskList;

impl From<ContactFields> for ContactDraft {
    fn from(fields: ContactFields) -> Self {
        ContactDraft::new(fields.name, fields.phone, fields.email, fields.address)
    }
}

/// Runs one contact operation against the configured contact file.
pub fn run_contacts(action: ContactAction, settings: &Settings, out: &mut impl Write) -> Result<()> {
    let path = &settings.storage.contacts_path;
    let mut book = ContactBook::open(path, settings.storage.persist)
        .with_context(|| format!("failed to open contacts at {}", path.display()))?;

    match action {
        ContactAction::Add(fields) => match book.add(fields.into()) {
            Ok(contact) => writeln!(out, "Contact added: {contact} ({})", contact.id)?,
            Err(err) => input_error(err, out)?,
        },
        ContactAction::List => {
            for contact in book.list() {
                writeln!(out, "{contact}")?;
            }
        }
        ContactAction::Search { term } => {
            let matches = book.search(&term);
            if matches.is_empty() {
                writeln!(out, "No matching contacts.")?;
            }
            for contact in matches {
                writeln!(out, "{contact}")?;
            }
        }
        ContactAction::Update { old_name, fields } => match book.update(&old_name, fields.into()) {
            Ok(true) => writeln!(out, "Contact updated successfully")?,
            Ok(false) => writeln!(out, "Contact not found")?,
            Err(err) => input_error(err, out)?,
        },
        ContactAction::Delete { name } => match book.delete(&name) {
            Ok(removed) => writeln!(out, "Deleted {removed} contact(s)")?,
            Err(err) => input_error(err, out)?,
        },
        ContactAction::RemoveId { id } => {
            if book.delete_by_id(&id)? {
                writeln!(out, "Contact deleted")?;
            } else {
                writeln!(out, "Contact not found")?;
            }
        }
    }

    book.flush()?;
    Ok(())
}

/// Runs the interactive task session against the configured task file.
pub fn run_tasks(settings: &Settings, input: impl BufRead, output: impl Write) -> Result<()> {
    let path = &settings.storage.tasks_path;
    let mut tasks = TaskList::open(path, settings.storage.persist)
        .with_context(|| format!("failed to open tasks at {}", path.display()))?;

    TaskSession::new(&mut tasks, input, output).run()
}

fn input_error(err: StoreError, out: &mut impl Write) -> Result<()> {
    if err.is_input_error() {
        writeln!(out, "Input error: {err}")?;
        Ok(())
    } else {
        Err(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn settings_in(dir: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.storage.contacts_path = dir.join("contacts.json");
        settings.storage.tasks_path = dir.join("tasks.json");
        settings
    }

    fn fields(name: &str, phone: &str) -> ContactFields {
        ContactFields {
            name: name.into(),
            phone: phone.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            address: "Somewhere".into(),
        }
    }

    fn run(action: ContactAction, settings: &Settings) -> String {
        let mut out = Vec::new();
        run_contacts(action, settings, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn contact_commands_round_trip_through_the_file() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());

        run(ContactAction::Add(fields("Ada", "555-0100")), &settings);
        run(ContactAction::Add(fields("Grace", "555-0199")), &settings);

        assert_eq!(run(ContactAction::List, &settings), "Ada - 555-0100\nGrace - 555-0199\n");
        assert_eq!(
            run(ContactAction::Search { term: "grace".into() }, &settings),
            "Grace - 555-0199\n"
        );

        let out = run(
            ContactAction::Update {
                old_name: "Ada".into(),
                fields: fields("Ada King", "555-0101"),
            },
            &settings,
        );
        assert_eq!(out, "Contact updated successfully\n");

        let out = run(ContactAction::Delete { name: "Grace".into() }, &settings);
        assert_eq!(out, "Deleted 1 contact(s)\n");
        assert_eq!(run(ContactAction::List, &settings), "Ada King - 555-0101\n");
    }

    #[test]
    fn blank_field_is_reported_not_fatal() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());

        let out = run(ContactAction::Add(fields("", "1")), &settings);
        assert_eq!(out, "Input error: name is required\n");
        assert!(!settings.storage.contacts_path.exists());
    }

    #[test]
    fn blank_delete_name_is_reported() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());

        let out = run(ContactAction::Delete { name: " ".into() }, &settings);
        assert_eq!(out, "Input error: name is required\n");
        assert!(!settings.storage.contacts_path.exists());
    }

    #[test]
    fn malformed_contact_file_is_fatal() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());
        std::fs::write(&settings.storage.contacts_path, "not json").unwrap();

        let mut out = Vec::new();
        let err = run_contacts(ContactAction::List, &settings, &mut out).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Malformed { .. })
        ));
    }

    #[test]
    fn task_session_uses_configured_file() {
        let dir = tempdir().unwrap();
        let settings = settings_in(dir.path());

        let mut out = Vec::new();
        run_tasks(&settings, "add\nBuy milk\n2%\nquit\n".as_bytes(), &mut out).unwrap();

        let tasks = TaskList::open(&settings.storage.tasks_path, settings.storage.persist).unwrap();
        assert_eq!(tasks.list()[0].title, "Buy milk");
    }
}
