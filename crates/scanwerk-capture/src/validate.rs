// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Admission validator — format allow-list and size ceiling.

use std::sync::Arc;

use scanwerk_core::config::ValidationPolicy;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::RawAsset;
use tracing::{debug, warn};

/// Every policy rule `asset` breaks, in check order (type, then size).
///
/// An unknown or estimated size never counts as a violation.
pub fn violations(asset: &RawAsset, policy: &ValidationPolicy) -> Vec<ScanwerkError> {
    let mut found = Vec::new();

    if !policy.allows(asset.declared_mime_type()) {
        found.push(ScanwerkError::UnsupportedType(
            asset.declared_mime_type().to_owned(),
        ));
    }

    // Estimated sizes are informational only.
    if let Some(size) = asset.declared_size_bytes().filter(|_| !asset.size_is_estimate()) {
        if size > policy.max_size_bytes() {
            found.push(ScanwerkError::SizeExceeded {
                size,
                limit: policy.max_size_bytes(),
            });
        }
    }

    found
}

/// Admit `asset` unchanged, or fail with the first violated rule.
pub fn validate(asset: RawAsset, policy: &ValidationPolicy) -> Result<RawAsset> {
    let mut found = violations(&asset, policy);
    if found.is_empty() {
        debug!(
            mime = asset.declared_mime_type(),
            size = ?asset.declared_size_bytes(),
            "asset admitted"
        );
        return Ok(asset);
    }
    if found.len() > 1 {
        debug!(count = found.len(), "asset violates several rules, surfacing the first");
    }
    let first = found.swap_remove(0);
    warn!(error = %first, "asset rejected");
    Err(first)
}

/// Holds the process-wide policy for the pipeline.
#[derive(Clone)]
pub struct AdmissionValidator {
    policy: Arc<ValidationPolicy>,
}

impl AdmissionValidator {
    pub fn new(policy: Arc<ValidationPolicy>) -> Self {
        Self { policy }
    }

    pub fn admit(&self, asset: RawAsset) -> Result<RawAsset> {
        validate(asset, &self.policy)
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanwerk_core::types::Payload;

    fn policy() -> ValidationPolicy {
        ValidationPolicy::new(["image/jpeg", "image/png"], 10_000_000).unwrap()
    }

    fn asset(mime: &str, size: Option<u64>) -> RawAsset {
        let asset = RawAsset::new(Payload::Bytes(vec![0; 4]), mime).unwrap();
        match size {
            Some(size) => asset.with_size(size),
            None => asset,
        }
    }

    #[test]
    fn disallowed_type_fails_regardless_of_size() {
        for size in [None, Some(0), Some(500), Some(50_000_000)] {
            let err = validate(asset("image/gif", size), &policy()).unwrap_err();
            match err {
                ScanwerkError::UnsupportedType(mime) => assert_eq!(mime, "image/gif"),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn oversized_allowed_type_fails_with_both_numbers() {
        let err = validate(asset("image/jpeg", Some(15_000_000)), &policy()).unwrap_err();
        assert!(matches!(
            err,
            ScanwerkError::SizeExceeded {
                size: 15_000_000,
                limit: 10_000_000
            }
        ));
    }

    #[test]
    fn estimated_size_is_not_held_to_the_ceiling() {
        let estimated = RawAsset::new(Payload::Bytes(vec![0; 4]), "image/jpeg")
            .unwrap()
            .with_estimated_size(48_000_000);
        let admitted = validate(estimated, &policy()).unwrap();
        assert_eq!(admitted.declared_size_bytes(), Some(48_000_000));
        assert!(admitted.size_is_estimate());
    }

    #[test]
    fn size_at_the_limit_is_admitted() {
        let input = asset("image/png", Some(10_000_000));
        assert_eq!(validate(input.clone(), &policy()).unwrap(), input);
    }

    #[test]
    fn unknown_size_is_provisionally_admitted() {
        let input = asset("image/png", None);
        assert_eq!(validate(input.clone(), &policy()).unwrap(), input);
    }

    #[test]
    fn both_checks_run() {
        let found = violations(&asset("image/gif", Some(20_000_000)), &policy());
        assert_eq!(found.len(), 2);
        assert!(matches!(found[0], ScanwerkError::UnsupportedType(_)));
        assert!(matches!(found[1], ScanwerkError::SizeExceeded { .. }));
    }

    #[test]
    fn validator_uses_shared_policy() {
        let validator = AdmissionValidator::new(Arc::new(policy()));
        assert!(validator.admit(asset("image/jpeg", Some(1))).is_ok());
        assert_eq!(validator.policy().max_size_bytes(), 10_000_000);
    }
}
