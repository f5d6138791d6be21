use crate::session::Session;
use futures::future::BoxFuture;
use std::collections::HashMap;

/// A verb implementation. It receives the session and reads its argument
/// from `session.param`.
pub type CommandFn = for<'a> fn(&'a mut Session) -> BoxFuture<'a, anyhow::Result<()>>;

#[derive(Clone, Copy)]
pub struct CommandDesc {
    /// Allowed before login.
    pub open: bool,
    /// `None` marks a verb that is recognised but not supported.
    pub handler: Option<CommandFn>,
}

impl CommandDesc {
    pub fn new(open: bool, handler: CommandFn) -> Self {
        Self {
            open,
            handler: Some(handler),
        }
    }

    pub fn unsupported(open: bool) -> Self {
        Self {
            open,
            handler: None,
        }
    }
}

/// Verb registry, built once before the listener accepts and shared
/// read-only between sessions.
#[derive(Default)]
pub struct CommandTable {
    commands: HashMap<&'static str, CommandDesc>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `verb`, which must be given in upper case.
    pub fn insert(&mut self, verb: &'static str, desc: CommandDesc) {
        self.commands.insert(verb, desc);
    }

    /// Looks `verb` up without regard to case.
    pub fn get(&self, verb: &str) -> Option<&CommandDesc> {
        self.commands.get(verb.to_ascii_uppercase().as_str())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}
