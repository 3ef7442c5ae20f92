//! Batch import summary.

use serde::{Deserialize, Serialize};

/// A failed item in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportError {
    pub item_id: String,
    pub error: String,
    /// Attempts used; 0 when the item was rejected before any attempt.
    pub attempts: u32,
}

/// Aggregate outcome of a batch.
///
/// `successful_imports + failed_imports == total_listings` always holds and
/// `errors` lists failed items in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total_listings: usize,
    pub successful_imports: usize,
    pub failed_imports: usize,
    /// Successes that needed more than one attempt.
    #[serde(default)]
    pub recovered_imports: usize,
    pub errors: Vec<ImportError>,
}

impl ImportSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, attempts: u32) {
        self.total_listings += 1;
        self.successful_imports += 1;
        if attempts > 1 {
            self.recovered_imports += 1;
        }
    }

    pub fn record_failure(
        &mut self,
        item_id: impl Into<String>,
        error: impl Into<String>,
        attempts: u32,
    ) {
        self.total_listings += 1;
        self.failed_imports += 1;
        self.errors.push(ImportError {
            item_id: item_id.into(),
            error: error.into(),
            attempts,
        });
    }

    pub fn is_consistent(&self) -> bool {
        self.successful_imports + self.failed_imports == self.total_listings
            && self.errors.len() == self.failed_imports
            && self.recovered_imports <= self.successful_imports
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed_imports == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_json_shape() {
        let mut summary = ImportSummary::new();
        summary.record_success(1);
        summary.record_success(3);
        summary.record_failure("A2", "throttled", 3);

        assert!(summary.is_consistent());
        assert!(!summary.all_succeeded());
        assert_eq!(summary.recovered_imports, 1);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["totalListings"], 3);
        assert_eq!(json["successfulImports"], 2);
        assert_eq!(json["failedImports"], 1);
        assert_eq!(json["errors"][0]["itemId"], "A2");
        assert_eq!(json["errors"][0]["attempts"], 3);
    }
}
