//! Backend module for chat completion
//!
//! This module provides the ChatInvoker abstraction, the HTTP and mock
//! implementations, and model discovery.

mod discovery;
mod mock;
mod openai;
mod traits;

use std::sync::Arc;

pub use discovery::ModelCatalog;
pub use mock::{MockBackend, MockConfig};
pub use openai::OpenAiBackend;
pub use traits::*;

use crate::config::{ModelSettings, Provider};
use crate::error::{Error, Result};

/// Create the invoker for the configured provider, bound to `model`
pub fn build_invoker(settings: &ModelSettings, model: &str) -> Result<SharedInvoker> {
    if model.trim().is_empty() {
        return Err(Error::ModelNotSelected);
    }

    Ok(match settings.provider {
        Provider::Openai => Arc::new(OpenAiBackend::new(settings, model)?),
        Provider::Mock => Arc::new(MockBackend::with_config(MockConfig {
            model: model.to_string(),
            ..MockConfig::default()
        })),
    })
}
