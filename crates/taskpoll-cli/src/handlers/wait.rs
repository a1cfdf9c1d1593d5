//! Wait command handler

use crate::commands::WaitArgs;
use crate::config::{PollSettings, Verbosity};
use crate::error::{CliError, CliResult};
use taskpoll::{
    BoundedPoller, FileTextSource, MarkerCondition, MarkerRules, Named, NoopTrigger,
    OperationTrigger, PollCondition, PollOutcome, PollReport, TextSource,
};

type WaitCondition = Named<MarkerCondition<Box<dyn TextSource>>>;

/// Exit status when the attempt bound is reached
pub const EXIT_TIMED_OUT: u8 = 2;

/// Poll the configured source until it settles
pub fn execute_wait(args: &WaitArgs, verbosity: Verbosity) -> CliResult<PollOutcome> {
    let settings = PollSettings::from_args(&args.policy)?;
    let mut condition = build_condition(args, settings.markers)?;
    let trigger = build_trigger(args)?;
    let name = condition.description();

    tracing::info!(
        operation = %name,
        sleep_interval_ms = settings.poll.sleep_interval_ms(),
        max_attempts = settings.poll.max_attempts(),
        "waiting"
    );

    let mut poller = BoundedPoller::new(settings.poll);
    let report = poller.poll_with_stats(&mut condition, trigger)?;

    if !verbosity.is_quiet() {
        println!("{}", format_summary(&name, &report));
    }
    Ok(report.outcome)
}

/// One-line summary of a finished poll
#[must_use]
pub fn format_summary(name: &str, report: &PollReport) -> String {
    match report.outcome {
        PollOutcome::Success => format!(
            "{name} completed after {} evaluation(s) in {:.1}s",
            report.stats.evaluations,
            report.stats.elapsed.as_secs_f64()
        ),
        PollOutcome::TimedOut(attempts) => {
            format!("{name} timed out: still in progress after {attempts} attempt(s)")
        }
    }
}

/// Process exit status for an outcome
#[must_use]
pub const fn exit_status(outcome: PollOutcome) -> u8 {
    match outcome {
        PollOutcome::Success => 0,
        PollOutcome::TimedOut(_) => EXIT_TIMED_OUT,
    }
}

fn build_condition(args: &WaitArgs, markers: MarkerRules) -> CliResult<WaitCondition> {
    let condition = MarkerCondition::new(build_source(args)?, markers);
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| condition.description());
    Ok(Named::new(condition, name))
}

fn build_source(args: &WaitArgs) -> CliResult<Box<dyn TextSource>> {
    if let Some(path) = &args.file {
        return Ok(Box::new(FileTextSource::new(path.clone())));
    }
    match &args.url {
        Some(url) => http_source(url),
        None => Err(CliError::invalid_argument("one of --file or --url is required")),
    }
}

#[cfg(feature = "http")]
fn http_source(url: &str) -> CliResult<Box<dyn TextSource>> {
    Ok(Box::new(taskpoll::HttpTextSource::new(url)?))
}

#[cfg(not(feature = "http"))]
fn http_source(_url: &str) -> CliResult<Box<dyn TextSource>> {
    Err(CliError::invalid_argument(
        "--url requires the `http` feature",
    ))
}

fn build_trigger(args: &WaitArgs) -> CliResult<Box<dyn OperationTrigger>> {
    match &args.refresh_url {
        Some(url) => http_trigger(url, args),
        None => Ok(Box::new(NoopTrigger)),
    }
}

#[cfg(feature = "http")]
fn http_trigger(url: &str, args: &WaitArgs) -> CliResult<Box<dyn OperationTrigger>> {
    use crate::commands::RefreshMethodArg;
    use taskpoll::{HttpMethod, HttpTrigger};

    let method = match args.refresh_method {
        RefreshMethodArg::Get => HttpMethod::Get,
        RefreshMethodArg::Post => HttpMethod::Post,
    };
    Ok(Box::new(HttpTrigger::new(url, method)?))
}

#[cfg(not(feature = "http"))]
fn http_trigger(_url: &str, _args: &WaitArgs) -> CliResult<Box<dyn OperationTrigger>> {
    Err(CliError::invalid_argument(
        "--refresh-url requires the `http` feature",
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::{PolicyArgs, RefreshMethodArg};
    use std::fs;
    use std::time::Duration;
    use taskpoll::{PollError, PollStats};

    fn file_args(path: std::path::PathBuf, policy: PolicyArgs) -> WaitArgs {
        WaitArgs {
            file: Some(path),
            url: None,
            refresh_url: None,
            refresh_method: RefreshMethodArg::Get,
            name: Some("import".into()),
            policy,
        }
    }

    fn policy(in_progress: &str, completed: &str, max_attempts: i64) -> PolicyArgs {
        PolicyArgs {
            interval_ms: Some(0),
            max_attempts: Some(max_attempts),
            in_progress: vec![in_progress.into()],
            completed: vec![completed.into()],
            ..PolicyArgs::default()
        }
    }

    #[test]
    fn test_wait_completes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.txt");
        fs::write(&path, "state: Done").unwrap();
        let outcome =
            execute_wait(&file_args(path, policy("Running", "Done", 3)), Verbosity::Quiet)
                .unwrap();
        assert_eq!(outcome, PollOutcome::Success);
    }

    #[test]
    fn test_wait_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.txt");
        fs::write(&path, "state: Running").unwrap();
        let outcome =
            execute_wait(&file_args(path, policy("Running", "Done", 3)), Verbosity::Quiet)
                .unwrap();
        assert_eq!(outcome, PollOutcome::TimedOut(3));
    }

    #[test]
    fn test_wait_unexpected_page_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.txt");
        fs::write(&path, "<title>Login</title>").unwrap();
        let err = execute_wait(&file_args(path, policy("Running", "Done", 3)), Verbosity::Quiet)
            .unwrap_err();
        match err {
            CliError::Poll(PollError::Observation { evaluations, .. }) => {
                assert_eq!(evaluations, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_name_is_the_poll_description() {
        let args = file_args("status.txt".into(), PolicyArgs::default());
        let condition = build_condition(&args, MarkerRules::task_progress_page()).unwrap();
        assert_eq!(condition.description(), "import");

        let mut args = args;
        args.name = None;
        let condition = build_condition(&args, MarkerRules::task_progress_page()).unwrap();
        assert_eq!(condition.description(), "operation at status.txt");
    }

    #[test]
    fn test_wait_requires_source() {
        let mut args = file_args("unused".into(), PolicyArgs::default());
        args.file = None;
        let err = execute_wait(&args, Verbosity::Quiet).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
    }

    #[test]
    fn test_format_summary() {
        let report = PollReport {
            outcome: PollOutcome::Success,
            stats: PollStats {
                evaluations: 3,
                triggers: 2,
                sleeps: 2,
                elapsed: Duration::from_millis(2_000),
            },
        };
        assert_eq!(
            format_summary("import", &report),
            "import completed after 3 evaluation(s) in 2.0s"
        );

        let report = PollReport {
            outcome: PollOutcome::TimedOut(100),
            stats: PollStats::default(),
        };
        assert!(format_summary("reindex", &report).contains("after 100 attempt(s)"));
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(PollOutcome::Success), 0);
        assert_eq!(exit_status(PollOutcome::TimedOut(1)), EXIT_TIMED_OUT);
    }
}
