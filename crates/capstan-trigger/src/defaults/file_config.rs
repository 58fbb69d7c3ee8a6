//! File-backed configuration service.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::errors::ConfigError;
use crate::traits::{Config, ConfigArgs, ConfigService};

/// Configuration service that resolves a repository's manifest path
/// against a local root directory. Suitable for single-node deployments
/// and tests; remote configuration plugins implement the same trait over
/// HTTP.
pub struct FileConfigService {
    root: PathBuf,
}

impl FileConfigService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ConfigService for FileConfigService {
    async fn find(&self, args: &ConfigArgs<'_>) -> Result<Config, ConfigError> {
        let path = self.root.join(&args.repo.config);
        match tokio::fs::read_to_string(&path).await {
            Ok(data) => Ok(Config { data }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(ConfigError::NotFound {
                    path: args.repo.config.clone(),
                })
            }
            Err(err) => Err(ConfigError::Service {
                message: err.to_string(),
            }),
        }
    }
}
