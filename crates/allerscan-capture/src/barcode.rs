// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Typed barcode entry.

use allerscan_core::error::Result;
use allerscan_core::types::ScanRequest;

/// Barcode text field. Non-digits are dropped as they are typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BarcodeEntry {
    value: String,
}

impl BarcodeEntry {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_input(&mut self, raw: &str) {
        self.value = raw.chars().filter(char::is_ascii_digit).collect();
    }

    pub fn can_submit(&self) -> bool {
        !self.value.is_empty()
    }

    /// Validate and emit; the field is cleared only on success.
    pub fn submit(&mut self) -> Result<ScanRequest> {
        let request = ScanRequest::barcode(&self.value)?;
        self.value.clear();
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allerscan_core::error::AllerscanError;

    #[test]
    fn input_keeps_digits_only() {
        let mut entry = BarcodeEntry::default();
        entry.set_input(" 5-012 345abc678900 ");
        assert_eq!(entry.value(), "5012345678900");
    }

    #[test]
    fn submit_emits_and_clears() {
        let mut entry = BarcodeEntry::default();
        entry.set_input("0123456789012");
        let request = entry.submit().expect("submit");
        assert_eq!(request, ScanRequest::Barcode("0123456789012".into()));
        assert!(entry.value().is_empty());
    }

    #[test]
    fn empty_submit_is_validation_error() {
        let mut entry = BarcodeEntry::default();
        entry.set_input("abc");
        assert!(!entry.can_submit());
        assert!(matches!(entry.submit(), Err(AllerscanError::Validation(_))));
    }
}
