//! Interactive task session driven by line-oriented prompts.

use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::tasks::{TaskList, TaskPatch};

const COMMANDS: &str = "Commands: add, update, complete, delete, list, quit";

/// Reads commands from `input` until `quit` or end of input, writing prompts
/// and results to `output`.
pub struct TaskSession<'a, R, W> {
    tasks: &'a mut TaskList,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> TaskSession<'a, R, W> {
    pub fn new(tasks: &'a mut TaskList, input: R, output: W) -> Self {
        Self {
            tasks,
            input,
            output,
        }
    }

    pub fn run(mut self) -> Result<()> {
        loop {
            writeln!(self.output, "{COMMANDS}")?;
            let Some(command) = self.prompt("Enter command: ")? else {
                debug!("end of input, leaving session");
                break;
            };

            match command.to_lowercase().as_str() {
                "add" => self.add()?,
                "update" => self.update()?,
                "complete" => self.complete()?,
                "delete" => self.delete()?,
                "list" => self.list()?,
                "quit" => break,
                _ => writeln!(self.output, "Unknown command.")?,
            }
        }

        self.tasks.flush()?;
        Ok(())
    }

    fn add(&mut self) -> Result<()> {
        let title = self.ask("Enter title: ")?;
        let description = self.ask("Enter description: ")?;
        match self.tasks.add(&title, &description) {
            Ok(task) => writeln!(self.output, "Task added. ID: {}", task.id)?,
            Err(err) => self.input_error(err)?,
        }
        Ok(())
    }

    fn update(&mut self) -> Result<()> {
        let id = self.ask("Enter task ID: ")?;
        let title = self.ask("Enter new title (leave empty to keep current): ")?;
        let description = self.ask("Enter new description (leave empty to keep current): ")?;
        let status =
            self.ask("Enter new status (pending/completed, leave empty to keep current): ")?;

        let outcome = TaskPatch::from_input(&title, &description, &status)
            .and_then(|patch| self.tasks.update(&id, patch));
        self.report(outcome, "Task updated.")
    }

    fn complete(&mut self) -> Result<()> {
        let id = self.ask("Enter task ID: ")?;
        let outcome = self.tasks.complete(&id);
        self.report(outcome, "Task marked as completed.")
    }

    fn delete(&mut self) -> Result<()> {
        let id = self.ask("Enter task ID: ")?;
        let outcome = self.tasks.delete(&id);
        self.report(outcome, "Task deleted.")
    }

    fn list(&mut self) -> Result<()> {
        for task in self.tasks.list() {
            writeln!(self.output, "{task}")?;
        }
        Ok(())
    }

    fn report(&mut self, outcome: Result<bool, StoreError>, done: &str) -> Result<()> {
        match outcome {
            Ok(true) => writeln!(self.output, "{done}")?,
            Ok(false) => writeln!(self.output, "Task not found.")?,
            Err(err) => self.input_error(err)?,
        }
        Ok(())
    }

    /// Prints input mistakes and keeps the session alive; anything else is fatal.
    fn input_error(&mut self, err: StoreError) -> Result<()> {
        if err.is_input_error() {
            warn!(%err, "rejected input");
            writeln!(self.output, "Input error: {err}")?;
            Ok(())
        } else {
            Err(err.into())
        }
    }

    /// Like [`Self::prompt`] but end of input reads as an empty answer.
    fn ask(&mut self, label: &str) -> Result<String> {
        Ok(self.prompt(label)?.unwrap_or_default())
    }

    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
