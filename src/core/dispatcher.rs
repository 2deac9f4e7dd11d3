use crate::core::cancel::CancellationGroup;
use crate::core::operators::debounce;
use crate::core::output::OutputHandle;
use crate::utils::error::{AppError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub type Action = Arc<dyn Fn() + Send + Sync>;

pub const UNKNOWN_COMMAND: &str = "unknown command, try one of:";

/// Immutable mapping from command name to action, built once.
#[derive(Clone, Default)]
pub struct CommandTable {
    commands: BTreeMap<String, Action>,
}

impl CommandTable {
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Action)>,
        S: Into<String>,
    {
        let mut commands = BTreeMap::new();
        for (name, action) in pairs {
            let name = name.into();
            if commands.contains_key(&name) {
                return Err(AppError::DuplicateCommand { name });
            }
            commands.insert(name, action);
        }
        Ok(Self { commands })
    }

    pub fn get(&self, name: &str) -> Option<&Action> {
        self.commands.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn help_text(&self) -> String {
        let mut help = String::from(UNKNOWN_COMMAND);
        for name in self.commands.keys() {
            help.push('\n');
            help.push_str(name);
        }
        help
    }
}

impl fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandTable").field("commands", &self.names()).finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Executed(String),
    Unknown(String),
}

pub struct Dispatcher {
    table: CommandTable,
    samples: Arc<CancellationGroup>,
    output: OutputHandle,
}

impl Dispatcher {
    pub fn new(table: CommandTable, samples: Arc<CancellationGroup>, output: OutputHandle) -> Self {
        Self { table, samples, output }
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    /// Stops the running sample, resets the output and runs `text` if it
    /// names a command. Unknown text prints the list of commands.
    pub fn dispatch(&self, text: &str) -> DispatchOutcome {
        self.samples.cancel_all();
        self.output.clear();

        match self.table.get(text) {
            Some(action) => {
                tracing::info!("▶️ dispatching command: {}", text);
                action();
                DispatchOutcome::Executed(text.to_string())
            }
            None => {
                tracing::debug!("unknown command: {:?}", text);
                self.output.append_line(self.table.help_text());
                DispatchOutcome::Unknown(text.to_string())
            }
        }
    }

    /// Feeds `input` through a debounce of `period` into [`dispatch`](Self::dispatch).
    /// The loop lives in `scope` and stops with it.
    pub fn spawn_debounced(self: &Arc<Self>, input: mpsc::Receiver<String>, period: Duration, scope: &CancellationGroup) {
        let dispatcher = Arc::clone(self);
        scope.spawn(move |_token| async move {
            let mut settled = debounce(input, period);
            while let Some(text) = settled.recv().await {
                dispatcher.dispatch(&text);
            }
            tracing::debug!("command input closed");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::NullDisplay;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_action(counter: &Arc<AtomicUsize>) -> Action {
        let counter = Arc::clone(counter);
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let counter = Arc::new(AtomicUsize::new(0));
        let result = CommandTable::from_pairs(vec![
            ("timer", counting_action(&counter)),
            ("timer", counting_action(&counter)),
        ]);
        assert!(matches!(result, Err(AppError::DuplicateCommand { name }) if name == "timer"));
    }

    #[test]
    fn test_help_lists_every_name_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let table = CommandTable::from_pairs(vec![
            ("maybe", counting_action(&counter)),
            ("timer", counting_action(&counter)),
        ])
        .unwrap();

        let help = table.help_text();
        let mut lines = help.lines();
        assert_eq!(lines.next(), Some(UNKNOWN_COMMAND));
        assert_eq!(lines.collect::<Vec<_>>(), vec!["maybe", "timer"]);
    }

    #[tokio::test]
    async fn test_dispatch_is_exact_and_case_sensitive() {
        let group = Arc::new(CancellationGroup::new("samples"));
        let (output, _task) = OutputHandle::spawn(NullDisplay, group.generation_counter());
        let counter = Arc::new(AtomicUsize::new(0));
        let table = CommandTable::from_pairs(vec![("timer", counting_action(&counter))]).unwrap();
        let dispatcher = Dispatcher::new(table, group, output.clone());

        assert_eq!(dispatcher.dispatch("timer"), DispatchOutcome::Executed("timer".to_string()));
        assert_eq!(dispatcher.dispatch("Timer"), DispatchOutcome::Unknown("Timer".to_string()));
        assert_eq!(dispatcher.dispatch("timer "), DispatchOutcome::Unknown("timer ".to_string()));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        output.sync().await;
        assert_eq!(output.lines(), vec![UNKNOWN_COMMAND, "timer"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_input_dispatches_once() {
        let group = Arc::new(CancellationGroup::new("samples"));
        let scope = CancellationGroup::new("screen");
        let (output, _task) = OutputHandle::spawn(NullDisplay, group.generation_counter());
        let counter = Arc::new(AtomicUsize::new(0));
        let table = CommandTable::from_pairs(vec![("maybe", counting_action(&counter))]).unwrap();
        let dispatcher = Arc::new(Dispatcher::new(table, group, output));

        let (tx, rx) = mpsc::channel(16);
        dispatcher.spawn_debounced(rx, Duration::from_millis(300), &scope);

        for text in ["m", "ma", "may", "mayb", "maybe"] {
            tx.send(text.to_string()).await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
