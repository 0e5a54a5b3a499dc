// src/resolve.rs
use std::path::PathBuf;

use tracing::debug;

use crate::error::{NdviError, Result};

/// Environment variable consulted by [`EnvInput`] by default.
pub const DEFAULT_INPUT_ENV: &str = "NDVI_DEFAULT_INPUT";

/// Supplies the input raster path when none was given on the command line.
/// Resolvers only name a path; whether it can be opened is the loader's
/// business.
pub trait InputResolver {
    /// Human-readable name used in error messages.
    fn source(&self) -> String;

    fn resolve(&self) -> Option<PathBuf>;
}

/// A path known up front.
#[derive(Debug, Clone)]
pub struct ExplicitInput(pub PathBuf);

impl InputResolver for ExplicitInput {
    fn source(&self) -> String {
        "--input_file".to_string()
    }

    fn resolve(&self) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

/// `default_input` from the configuration file.
#[derive(Debug, Clone)]
pub struct ConfiguredInput(pub Option<PathBuf>);

impl InputResolver for ConfiguredInput {
    fn source(&self) -> String {
        "default_input in the configuration file".to_string()
    }

    fn resolve(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// A path held in an environment variable.
#[derive(Debug, Clone)]
pub struct EnvInput {
    var: String,
}

impl EnvInput {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvInput {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_ENV)
    }
}

impl InputResolver for EnvInput {
    fn source(&self) -> String {
        format!("the {} environment variable", self.var)
    }

    fn resolve(&self) -> Option<PathBuf> {
        std::env::var_os(&self.var)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }
}

/// Tries each resolver in order and takes the first path offered.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn InputResolver>>,
}

impl ResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resolver: impl InputResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn resolve(&self) -> Result<PathBuf> {
        for resolver in &self.resolvers {
            if let Some(path) = resolver.resolve() {
                debug!(source = %resolver.source(), path = %path.display(), "resolved input");
                return Ok(path);
            }
        }

        let tried = self
            .resolvers
            .iter()
            .map(|r| r.source())
            .collect::<Vec<_>>();
        let hint = if tried.is_empty() {
            "no input sources are configured".to_string()
        } else {
            format!("tried {}", tried.join(", "))
        };
        Err(NdviError::Config(format!(
            "no input file specified ({hint}); please provide an input image using --input_file"
        )))
    }
}
