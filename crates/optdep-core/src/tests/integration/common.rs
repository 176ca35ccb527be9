#![cfg(test)]

use std::sync::{Arc, Mutex};

use crate::api::{ApiAccess, Provider};
use crate::kernel::error::Result;
use crate::plugin_system::{Plugin, PluginContext, VersionRange};

pub const LOREM_API: &str = "LoremClass";

/// Trait both sides of the lorem API agree on
pub trait Lorem: Send + Sync {
    fn words(&self, count: usize) -> String;
}

pub struct LoremImpl {
    pub prefix: String,
}

impl Lorem for LoremImpl {
    fn words(&self, count: usize) -> String {
        let mut out = vec![self.prefix.clone()];
        out.extend(std::iter::repeat("ipsum".to_string()).take(count.saturating_sub(1)));
        out.join(" ")
    }
}

/// Publishes a `LoremImpl` in phase 2
pub struct LoremProvider {
    pub name: &'static str,
    pub prefix: &'static str,
}

impl Plugin for LoremProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> &str {
        "0.1.0"
    }

    fn compatible_api_versions(&self) -> Vec<VersionRange> {
        vec![VersionRange::from_constraint("^0.1").unwrap()]
    }

    fn init(&self, _ctx: &PluginContext) -> Result<()> {
        Ok(())
    }

    fn register_apis(&self, ctx: &PluginContext) -> Result<()> {
        let api = Arc::new(LoremImpl { prefix: self.prefix.to_string() });
        let provider = Provider::builder(Arc::clone(&api))
            .method("Words", |api: &LoremImpl, (count,): (usize,)| api.words(count))
            .interface::<dyn Lorem>(api);
        ctx.registry().register(LOREM_API, provider)?;
        Ok(())
    }
}

/// Subscribes in phase 1 and records what every provider says
pub struct LoremConsumer {
    pub heard: Arc<Mutex<Vec<String>>>,
}

impl Plugin for LoremConsumer {
    fn name(&self) -> &'static str {
        "lorem-consumer"
    }

    fn version(&self) -> &str {
        "0.1.0"
    }

    fn compatible_api_versions(&self) -> Vec<VersionRange> {
        vec![VersionRange::from_constraint("^0.1").unwrap()]
    }

    fn init(&self, ctx: &PluginContext) -> Result<()> {
        let heard = Arc::clone(&self.heard);
        ctx.registry().subscribe(LOREM_API, move |api: ApiAccess| {
            let words = api
                .get_method::<(usize,), String>("Words")
                .ok_or("provider has no Words(usize) method")?;
            heard.lock().unwrap().push(words.call((3,)));
            Ok(())
        })?;
        Ok(())
    }
}
