use crate::domain::entities::{Command, CommandKind, CommandRegistry, User};
use crate::domain::traits::Guild;
use crate::application::errors::BotError;
use super::ClassService;

/// What a command produced: the replies to send, in order, and the platform
/// failure that cut it short, if any
#[derive(Debug, Default)]
pub struct CommandOutcome {
    pub replies: Vec<String>,
    pub error: Option<BotError>,
}

impl CommandOutcome {
    pub fn replies(replies: Vec<String>) -> Self {
        Self { replies, error: None }
    }

    pub fn failed(error: BotError) -> Self {
        Self { replies: Vec::new(), error: Some(error) }
    }

    /// Keep a reply, or the error that ends the command. Returns whether the
    /// command may go on.
    pub fn record(&mut self, result: Result<String, BotError>) -> bool {
        match result {
            Ok(reply) => {
                self.replies.push(reply);
                true
            }
            Err(e) => {
                self.error = Some(e);
                false
            }
        }
    }
}

/// Service for looking up and executing commands
pub struct CommandService {
    registry: CommandRegistry,
    prefix: String,
}

impl CommandService {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            registry: CommandRegistry::new(),
            prefix: prefix.into(),
        }
    }

    pub fn register(&mut self, command: Command) {
        self.registry.register(command);
    }

    pub fn register_defaults(&mut self) {
        for command in CommandRegistry::with_defaults().all() {
            self.register(command.clone());
        }
    }

    pub fn find(&self, name: &str) -> Option<&Command> {
        self.registry.find(name)
    }

    /// Run a command that already passed the middleware gates.
    ///
    /// Course commands produce one reply per course, in argument order. A
    /// platform failure stops the remaining courses; the replies for courses
    /// already applied are kept alongside the error.
    pub async fn execute<G: Guild + ?Sized>(
        &self,
        command: &Command,
        args: &[String],
        user: &User,
        guild: &G,
    ) -> CommandOutcome {
        let classes = ClassService::new(guild);

        if command.kind.takes_courses() && args.is_empty() {
            return CommandOutcome::replies(vec![self.usage(command)]);
        }

        let mut outcome = CommandOutcome::default();
        match command.kind {
            CommandKind::Join => {
                for course in args {
                    if !outcome.record(classes.join(user, course).await) {
                        break;
                    }
                }
            }
            CommandKind::Drop => {
                for course in args {
                    if !outcome.record(classes.drop(user, course).await) {
                        break;
                    }
                }
            }
            CommandKind::Purge => {
                for course in args {
                    if !outcome.record(classes.purge(course).await) {
                        break;
                    }
                }
            }
            CommandKind::Enrolled => {
                outcome.record(classes.enrolled(user).await);
            }
            CommandKind::List => {
                outcome.record(classes.available().await);
            }
            CommandKind::Help => {
                outcome.replies.push(self.get_help(args.first().map(|s| s.as_str())));
            }
        }
        outcome
    }

    pub fn usage(&self, command: &Command) -> String {
        format!("Usage: {}{}", self.prefix, command.usage.as_deref().unwrap_or(command.name.as_str()))
    }

    pub fn get_help(&self, command: Option<&str>) -> String {
        if let Some(name) = command {
            if let Some(cmd) = self.registry.find(name) {
                let mut help = format!("{}{} - {}", self.prefix, cmd.name, cmd.description.as_deref().unwrap_or("No description"));
                if cmd.usage.is_some() {
                    help.push_str(&format!("\n{}", self.usage(cmd)));
                }
                return help;
            }
            return format!("Command {}{} not found", self.prefix, name);
        }

        // List all commands
        let mut help = "Available commands:\n".to_string();
        for cmd in self.registry.all() {
            help.push_str(&format!("  {}{} - {}\n", self.prefix, cmd.name, cmd.description.as_deref().unwrap_or("")));
        }
        help
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}
