use std::sync::Arc;

use super::{
    config::{Config, ConfigError},
    upstream::Upstream,
};

pub struct State {
    pub config: Config,
    pub upstream: Upstream,
}

impl State {
    pub fn new(config: Config) -> Result<Arc<Self>, ConfigError> {
        let upstream = Upstream::new(&config)?;

        Ok(Arc::new(Self { config, upstream }))
    }
}
