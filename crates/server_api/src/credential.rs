/// Where the generation API key comes from. Consulted on every request, so a
/// key exported after startup is picked up without a restart.
pub trait CredentialSource: Send + Sync {
    /// Name reported to the caller when no key is available.
    fn name(&self) -> &str;
    fn api_key(&self) -> Option<String>;
}

pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Reads an environment variable, falling back to a key from the settings file.
/// Empty values count as unset.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
    configured: Option<String>,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>, configured: Option<String>) -> Self {
        Self {
            var: var.into(),
            configured,
        }
    }
}

impl CredentialSource for EnvCredential {
    fn name(&self) -> &str {
        &self.var
    }

    fn api_key(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .and_then(non_empty)
            .or_else(|| self.configured.clone().and_then(non_empty))
    }
}

#[derive(Debug, Clone)]
pub struct StaticCredential {
    name: String,
    key: Option<String>,
}

impl StaticCredential {
    pub fn new(name: impl Into<String>, key: Option<String>) -> Self {
        Self {
            name: name.into(),
            key,
        }
    }
}

impl CredentialSource for StaticCredential {
    fn name(&self) -> &str {
        &self.name
    }

    fn api_key(&self) -> Option<String> {
        self.key.clone().and_then(non_empty)
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
