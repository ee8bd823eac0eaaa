//! Canonical status and test-type vocabularies

use serde::{Deserialize, Serialize};

use crate::impl_domain_enum_conversions;

/// Normalized outcome of a test suite, case or step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestStatus {
    Success,
    Skipped,
    Failure,
    Custom,
}

impl_domain_enum_conversions!(TestStatus {
    Success => "Success",
    Skipped => "Skipped",
    Failure => "Failure",
    Custom => "Custom",
});

/// Kind of test execution reported to the graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestType {
    Functional,
    Integration,
    Manual,
    Performance,
    Regression,
    Security,
    #[default]
    Unit,
    Custom,
}

impl_domain_enum_conversions!(TestType {
    Functional => "Functional",
    Integration => "Integration",
    Manual => "Manual",
    Performance => "Performance",
    Regression => "Regression",
    Security => "Security",
    Unit => "Unit",
    Custom => "Custom",
});
