use std::collections::BTreeMap;

/// What a command does once it passes the gates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Join,
    Drop,
    Purge,
    Enrolled,
    List,
    Help,
}

impl CommandKind {
    /// Commands that act on one or more course arguments
    pub fn takes_courses(&self) -> bool {
        matches!(self, CommandKind::Join | CommandKind::Drop | CommandKind::Purge)
    }
}

/// Where and by whom a command may be run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandScope {
    /// Only in the class management channel
    ManageChannel,
    /// Anywhere, by members who can manage channels and roles
    Privileged,
    /// Anywhere, by anyone
    Anywhere,
}

/// Represents a bot command
#[derive(Debug, Clone)]
pub struct Command {
    pub name: String,
    pub description: Option<String>,
    pub usage: Option<String>,
    pub kind: CommandKind,
    pub scope: CommandScope,
}

impl Command {
    pub fn new(name: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            usage: None,
            kind,
            scope: CommandScope::ManageChannel,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn with_scope(mut self, scope: CommandScope) -> Self {
        self.scope = scope;
        self
    }
}

/// Command registry for managing available commands
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The classroom command set
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(Command::new("joinclass", CommandKind::Join)
            .with_description("Join one or more classes")
            .with_usage("joinclass <course>..."));

        registry.register(Command::new("dropclass", CommandKind::Drop)
            .with_description("Leave one or more classes")
            .with_usage("dropclass <course>..."));

        registry.register(Command::new("purgeclass", CommandKind::Purge)
            .with_description("Delete the role and channel of one or more classes")
            .with_usage("purgeclass <course>...")
            .with_scope(CommandScope::Privileged));

        registry.register(Command::new("enrolledclass", CommandKind::Enrolled)
            .with_description("List the classes you are enrolled in")
            .with_usage("enrolledclass"));

        registry.register(Command::new("listclass", CommandKind::List)
            .with_description("List every class on this server")
            .with_usage("listclass"));

        registry.register(Command::new("help", CommandKind::Help)
            .with_description("Show this message")
            .with_usage("help")
            .with_scope(CommandScope::Anywhere));

        registry
    }

    pub fn register(&mut self, command: Command) {
        self.commands.insert(command.name.clone(), command);
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Look up what the user typed; names are case-sensitive
    pub fn find(&self, input: &str) -> Option<&Command> {
        self.get(input)
    }

    pub fn all(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
