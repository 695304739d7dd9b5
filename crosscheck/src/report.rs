use crate::data::{HttpMethod, ResponseBody};
use std::io::{self, Write};

const SEPARATOR: &str = "==================================================";

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed { status_code: u16, body: ResponseBody },
    // no response at all: DNS failure, refused connection, timeout
    NotEvaluated { error: String },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Verdict {
    Passed,
    Failed,
    NotEvaluated,
}

#[derive(Debug, Clone)]
pub struct CheckReport {
    pub base_url: String,
    pub endpoint_key: String,
    pub variant: String,
    pub method: HttpMethod,
    pub url: String,
    pub expected_status: u16,
    pub outcome: Outcome,
}

impl CheckReport {
    pub fn verdict(&self) -> Verdict {
        match &self.outcome {
            Outcome::Completed { status_code, .. } if *status_code == self.expected_status => {
                Verdict::Passed
            }
            Outcome::Completed { .. } => Verdict::Failed,
            Outcome::NotEvaluated { .. } => Verdict::NotEvaluated,
        }
    }

    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match &self.outcome {
            Outcome::Completed { status_code, body } => {
                writeln!(out, "Testing {} {}", self.method, self.url)?;
                writeln!(
                    out,
                    "Expected status code: {}, Got: {}",
                    self.expected_status, status_code
                )?;
                if self.verdict() == Verdict::Passed {
                    writeln!(out, "Test passed!")?;
                } else {
                    writeln!(out, "Test failed.")?;
                }
                writeln!(out, "Response: {}", body)?;
            }
            Outcome::NotEvaluated { error } => {
                writeln!(out, "Request to {} failed: {}", self.url, error)?;
            }
        }

        writeln!(out, "{}", SEPARATOR)
    }
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub not_evaluated: usize,
}

impl RunSummary {
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Passed => self.passed += 1,
            Verdict::Failed => self.failed += 1,
            Verdict::NotEvaluated => self.not_evaluated += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.not_evaluated
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.not_evaluated == 0
    }

    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "Summary: {} passed, {} failed, {} not evaluated ({} checks)",
            self.passed,
            self.failed,
            self.not_evaluated,
            self.total()
        )
    }
}
