use std::sync::{Arc, Mutex};

use crate::kernel::error::{Error, Result};
use crate::plugin_system::{Plugin, PluginContext, VersionRange};


/// Shared journal of lifecycle calls across test plugins
pub(super) type Journal = Arc<Mutex<Vec<String>>>;

#[derive(Clone, Copy, PartialEq)]
pub(super) enum Behavior {
    Ok,
    FailInit,
    PanicInit,
    FailRegister,
    FailShutdown,
}

pub(super) struct TestPlugin {
    pub name: &'static str,
    pub api_range: &'static str,
    pub behavior: Behavior,
    pub journal: Journal,
}

impl TestPlugin {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            api_range: "^0.1",
            behavior: Behavior::Ok,
            journal: Arc::clone(journal),
        }
    }

    pub fn behaving(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    fn log(&self, event: &str) {
        self.journal.lock().unwrap().push(format!("{}:{}", event, self.name));
    }
}

impl Plugin for TestPlugin {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn compatible_api_versions(&self) -> Vec<VersionRange> {
        vec![VersionRange::from_constraint(self.api_range).unwrap()]
    }

    fn init(&self, _ctx: &PluginContext) -> Result<()> {
        self.log("init");
        match self.behavior {
            Behavior::FailInit => Err(Error::from("init refused")),
            Behavior::PanicInit => panic!("init exploded"),
            _ => Ok(()),
        }
    }

    fn register_apis(&self, _ctx: &PluginContext) -> Result<()> {
        self.log("register");
        if self.behavior == Behavior::FailRegister {
            return Err("register refused".into());
        }
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        self.log("shutdown");
        if self.behavior == Behavior::FailShutdown {
            return Err("shutdown refused".into());
        }
        Ok(())
    }
}

pub(super) fn new_journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}
