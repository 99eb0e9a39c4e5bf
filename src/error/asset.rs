//! Asset resolution errors

use super::EcopackError;

/// Creates an asset not found error
pub fn not_found(reference: impl Into<String>) -> EcopackError {
    EcopackError::AssetNotFound {
        reference: reference.into(),
    }
}
