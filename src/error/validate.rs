//! Plugin YAML and changelog validation errors

use super::EcopackError;

pub fn plugin_yaml(path: impl Into<String>, message: impl Into<String>) -> EcopackError {
    EcopackError::PluginYamlInvalid {
        path: path.into(),
        message: message.into(),
    }
}

pub fn changelog_outdated(version: impl Into<String>, path: impl Into<String>) -> EcopackError {
    EcopackError::ChangelogOutdated {
        version: version.into(),
        path: path.into(),
    }
}

/// Creates a parse error for a document that is not the expected shape
pub fn parse_failed(what: impl Into<String>, reason: impl Into<String>) -> EcopackError {
    EcopackError::ParseFailed {
        what: what.into(),
        reason: reason.into(),
    }
}
