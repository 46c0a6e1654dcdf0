//! JSON suite and few-shot file loading

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::domain::{validate_suite, FewShotExample, TestCase};

#[derive(Deserialize)]
#[serde(untagged)]
enum SuiteFile {
    Cases(Vec<TestCase>),
    Wrapped { tests: Vec<TestCase> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FewShotFile {
    Examples(Vec<FewShotExample>),
    Wrapped { examples: Vec<FewShotExample> },
}

/// Parse and validate a suite: a JSON array of test cases or an object with a `tests` key
pub fn parse_suite(json: &str) -> anyhow::Result<Vec<TestCase>> {
    let suite = match serde_json::from_str(json).context("Invalid suite file")? {
        SuiteFile::Cases(cases) => cases,
        SuiteFile::Wrapped { tests } => tests,
    };

    validate_suite(&suite)?;
    Ok(suite)
}

/// Parse few-shot examples: a JSON array or an object with an `examples` key
pub fn parse_few_shot(json: &str) -> anyhow::Result<Vec<FewShotExample>> {
    let examples = match serde_json::from_str(json).context("Invalid few-shot file")? {
        FewShotFile::Examples(examples) => examples,
        FewShotFile::Wrapped { examples } => examples,
    };

    Ok(examples)
}

pub fn load_suite(path: &Path) -> anyhow::Result<Vec<TestCase>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read suite {}", path.display()))?;
    parse_suite(&json).with_context(|| format!("Failed to load suite {}", path.display()))
}

pub fn load_few_shot(path: &Path) -> anyhow::Result<Vec<FewShotExample>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read few-shot examples {}", path.display()))?;
    parse_few_shot(&json)
        .with_context(|| format!("Failed to load few-shot examples {}", path.display()))
}
