//! Test execution engine.
//!
//! Cases run in-process: each gets a fresh [`Console`] over its `stdin`
//! text and an in-memory stdout. A call that fails under the active mode
//! prints its diagnostic and ends the case with exit status 1, which is what
//! the C boundary does to a real process.

use ecert_core::output::until_nul;
use ecert_core::{Console, DEFAULT_STRING_CAPACITY, RuntimeError};
use ecert_membrane::{DiagnosticStyle, HealingPolicy, RuntimeConfig, RuntimeMode};
use serde_json::{Value, json};

use crate::diff;
use crate::error::HarnessError;
use crate::fixtures::{FixtureCase, FixtureSet, RuntimeCall};
use crate::verify::VerificationResult;

/// Exit status of a case whose last call was fatal.
pub const FATAL_EXIT: i32 = 1;

static RUNNER_POLICY: HealingPolicy = HealingPolicy::new();

/// Observable outcome of running a call script.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRun {
    pub stdout: String,
    pub returns: Vec<Value>,
    pub exit: i32,
    /// Heals applied (hardened mode only).
    pub heals: u64,
}

impl CaseRun {
    /// Comparable text form. Return values are included only when `with_returns`.
    #[must_use]
    pub fn render(&self, with_returns: bool) -> String {
        render(
            &self.stdout,
            self.exit,
            with_returns.then_some(self.returns.as_slice()),
        )
    }
}

fn render(stdout: &str, exit: i32, returns: Option<&[Value]>) -> String {
    let mut out = format!("{stdout}\n[exit {exit}]");
    if let Some(returns) = returns {
        out.push_str(&format!("\n[returns {}]", Value::Array(returns.to_vec())));
    }
    out
}

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    /// Mode being tested.
    pub mode: RuntimeMode,
}

impl TestRunner {
    #[must_use]
    pub fn new(campaign: impl Into<String>, mode: RuntimeMode) -> Self {
        Self {
            campaign: campaign.into(),
            mode,
        }
    }

    /// Run all cases of the set that apply to this runner's mode.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .filter(|case| case.applies_to(self.mode))
            .map(|case| self.run_case(&fixture_set.family, case))
            .collect()
    }

    fn run_case(&self, family: &str, case: &FixtureCase) -> VerificationResult {
        let with_returns = case.expected_returns.is_some();
        let expected = render(
            &case.expected_stdout,
            case.expected_exit,
            case.expected_returns.as_deref(),
        );
        let config = RuntimeConfig::new(
            self.mode,
            case.diagnostic
                .as_deref()
                .map_or(DiagnosticStyle::Corrected, DiagnosticStyle::from_str_loose),
        );
        let actual = match execute_calls(&case.stdin, &case.calls, config) {
            Ok(run) => run.render(with_returns),
            Err(err) => format!("harness error: {err}"),
        };

        let case_name = if case.mode.eq_ignore_ascii_case("both") {
            format!("{} [{}]", case.name, self.mode.as_str())
        } else {
            case.name.clone()
        };
        let passed = actual == expected;
        VerificationResult {
            case_name,
            family: family.to_string(),
            section: case.section.clone(),
            mode: self.mode.as_str().to_string(),
            passed,
            diff: (!passed).then(|| diff::render_diff(&expected, &actual)),
            expected,
            actual,
        }
    }
}

/// Execute `calls` against a console reading `stdin`.
pub fn execute_calls(
    stdin: &str,
    calls: &[RuntimeCall],
    config: RuntimeConfig,
) -> Result<CaseRun, HarnessError> {
    for call in calls {
        if let RuntimeCall::ValidateBooleanOp { op_char, .. } = call {
            operator_byte(*op_char)?;
        }
    }

    let mut console =
        Console::new(stdin.as_bytes(), Vec::new(), config).with_policy(&RUNNER_POLICY);
    let mut returns = Vec::new();
    let mut exit = 0;
    for call in calls {
        if let Err(err) = step(&mut console, call, &mut returns) {
            console.report_fatal(call.symbol(), &err)?;
            exit = FATAL_EXIT;
            break;
        }
    }

    let heals = console.heals();
    let (_, out) = console.into_parts();
    Ok(CaseRun {
        stdout: String::from_utf8_lossy(&out).into_owned(),
        returns,
        exit,
        heals,
    })
}

fn operator_byte(op: char) -> Result<u8, HarnessError> {
    u8::try_from(op).map_err(|_| HarnessError::Operator(op))
}

fn step(
    console: &mut Console<&[u8], Vec<u8>>,
    call: &RuntimeCall,
    returns: &mut Vec<Value>,
) -> Result<(), RuntimeError> {
    match call {
        RuntimeCall::GetInteger => returns.push(json!(console.get_integer()?)),
        RuntimeCall::GetBool => returns.push(json!(console.get_bool()?)),
        RuntimeCall::GetFloat => returns.push(Value::from(f64::from(console.get_float()?))),
        RuntimeCall::GetString { capacity } => {
            let mut buf = vec![0u8; capacity.unwrap_or(DEFAULT_STRING_CAPACITY)];
            let len = console.get_string_into(&mut buf)?;
            let text = String::from_utf8_lossy(until_nul(&buf)).into_owned();
            returns.push(json!({ "len": len, "text": text }));
        }
        RuntimeCall::GetStagedString => {
            let token = console.get_string()?;
            returns.push(json!(String::from_utf8_lossy(&token)));
        }
        RuntimeCall::PutInteger { value } => console.put_integer(*value)?,
        RuntimeCall::PutBool { value } => console.put_bool(*value)?,
        RuntimeCall::PutFloat { value } => console.put_float(*value)?,
        RuntimeCall::PutString { value } => console.put_string(value.as_bytes())?,
        RuntimeCall::ValidateBooleanOp {
            left,
            op_char,
            right,
            line,
        } => {
            // Checked up front by `execute_calls`.
            let op = operator_byte(*op_char).unwrap_or(b'?');
            console.validate_boolean_op(*left, op, *right, *line)?;
        }
    }
    Ok(())
}
