use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::batch::BatchPlan;
use crate::classify::{Classification, InputClassifier};
use crate::config::IneligiblePolicy;
use crate::error::{Result, ToolsError};
use crate::operation::{CatalogEntry, ExtraParameter, Operation, OperationCatalog};

const MENU_TITLE: &str = "FFmpeg Tools";
const CHOICE_PROMPT: &str = "- ";
const SHUTDOWN_PROMPT: &str = "Shutdown computer after? [y/n]: ";
const PAUSE_PROMPT: &str = "Press enter to exit...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    AwaitingOperationChoice,
    AwaitingInputValidation,
    AwaitingExtraParameter,
    AwaitingShutdownChoice,
    Running,
    Done,
}

#[derive(Debug)]
pub enum MenuOutcome {
    /// The user picked Exit
    Exit,
    /// Everything needed to start the batch
    Ready {
        plan: BatchPlan,
        classification: Classification,
    },
}

/// Interactive prompts over any line reader and writer
pub struct MenuController<'a, R, W> {
    catalog: &'a OperationCatalog,
    input: R,
    output: W,
    state: MenuState,
}

impl<'a, R: BufRead, W: Write> MenuController<'a, R, W> {
    pub fn new(catalog: &'a OperationCatalog, input: R, output: W) -> Self {
        Self {
            catalog,
            input,
            output,
            state: MenuState::AwaitingOperationChoice,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Print the numbered operation list
    pub fn render(&mut self) -> Result<()> {
        writeln!(self.output, "{}", MENU_TITLE)?;
        writeln!(self.output, "v{}\n", env!("CARGO_PKG_VERSION"))?;
        for (index, entry) in self.catalog.entries().iter().enumerate() {
            writeln!(self.output, "{}{}{}", index + 1, " ".repeat(8), entry.title())?;
        }
        writeln!(self.output)?;
        self.output.flush()?;
        Ok(())
    }

    /// Keep asking until the answer is a number in range
    pub fn choose_operation(&mut self) -> Result<CatalogEntry> {
        loop {
            let line = self.read_line(CHOICE_PROMPT)?;
            let Ok(index) = line.trim().parse::<usize>() else {
                debug!("Ignoring menu answer {:?}", line);
                continue;
            };
            match self.catalog.select(index) {
                Ok(entry) => return Ok(entry),
                Err(e) => debug!("Ignoring menu answer {}: {}", index, e),
            }
        }
    }

    /// Ask for the operation's extra value, if it has one. Answers that
    /// don't parse are reported and asked again.
    pub fn ask_extra(&mut self, operation: Operation) -> Result<Option<ExtraParameter>> {
        let Some(prompt) = operation.extra_parameter_prompt() else {
            return Ok(None);
        };

        loop {
            let line = self.read_line(prompt)?;
            match operation.parse_extra(&line) {
                Ok(extra) => return Ok(Some(extra)),
                Err(e) => writeln!(self.output, "{}", e)?,
            }
        }
    }

    /// Only a bare `y` or `n` is accepted
    pub fn ask_shutdown(&mut self) -> Result<bool> {
        loop {
            match self.read_line(SHUTDOWN_PROMPT)?.as_str() {
                "y" => return Ok(true),
                "n" => return Ok(false),
                _ => continue,
            }
        }
    }

    /// Walk the user from the operation list to a ready-to-run plan
    pub fn collect(&mut self, inputs: &[PathBuf], classifier: &InputClassifier) -> Result<MenuOutcome> {
        self.state = MenuState::AwaitingOperationChoice;
        self.render()?;

        let operation = match self.choose_operation()? {
            CatalogEntry::Exit => {
                info!("Exit selected");
                self.state = MenuState::Done;
                return Ok(MenuOutcome::Exit);
            }
            CatalogEntry::Run(operation) => operation,
        };
        info!("Selected operation: {}", operation.title());
        writeln!(self.output, "\n{}\n", operation.title())?;

        self.state = MenuState::AwaitingInputValidation;
        let classification = classifier.classify(inputs, operation)?;
        if classifier.policy() == IneligiblePolicy::Warn {
            for ignored in &classification.ignored {
                writeln!(self.output, "Skipping {}: not a supported video file", ignored.display())?;
            }
        }

        self.state = MenuState::AwaitingExtraParameter;
        let extra = self.ask_extra(operation)?;

        self.state = MenuState::AwaitingShutdownChoice;
        let shutdown_after = self.ask_shutdown()?;

        self.state = MenuState::Running;
        Ok(MenuOutcome::Ready {
            plan: BatchPlan { operation, extra, shutdown_after },
            classification,
        })
    }

    /// Hold the window open until the user presses enter
    pub fn pause(&mut self) -> Result<()> {
        self.state = MenuState::Done;
        writeln!(self.output)?;
        // A closed input just means there is nobody to wait for
        match self.read_line(PAUSE_PROMPT) {
            Ok(_) | Err(ToolsError::Usage(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn mark_done(&mut self) {
        self.state = MenuState::Done;
    }

    /// Prompt and read one line without its line ending. End of input is a
    /// usage error since nothing else can be asked.
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ToolsError::Usage("Input closed before an answer was given".to_string()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
