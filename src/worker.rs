use std::{fmt, fs};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use chrono::{DateTime, Local};
use log::{error, info};
use crate::config::Config;
use crate::errors::RunError;
use crate::initialization::Mgr;
use crate::manager_chart::RenderError;
use crate::manager_meteo::FetchError;
use crate::manager_twitter::errors::PublishError;
use crate::models::forecast::Forecast;
use crate::runlog::RunLog;

/// Wall-clock time of day at which the job fires
const FIRE_HOUR: u32 = 6;
const FIRE_MINUTE: u32 = 0;

/// How often the loop checks whether the trigger is due
const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Caption of the daily post
pub const CAPTION: &str = "Weather in Prague today";

/// Name of the chart image inside a run directory
pub const GRAPH_FILENAME: &str = "graph.png";

/// Weather collaborator as seen from the orchestrator
pub trait ForecastProvider {
    fn fetch_forecast(&self) -> Result<Forecast, FetchError>;
}

/// Chart collaborator as seen from the orchestrator
pub trait ChartRenderer {
    fn render_chart(&self, forecast: &Forecast, output_path: &Path) -> Result<(), RenderError>;
}

/// Publish collaborator as seen from the orchestrator
pub trait Publisher {
    fn publish_image_post(&self, image_path: &Path, caption: &str) -> Result<(), PublishError>;
}

/// Lifecycle of one run. Any state can fall through to Failed on a
/// collaborator error, Done and Failed are terminal, there are no retries
/// and no backward transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Fetching,
    Rendering,
    Publishing,
    Done,
    Failed,
}

/// Implementation of the Display Trait for run log lines
impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RunState::Pending    => write!(f, "pending"),
            RunState::Fetching   => write!(f, "fetching"),
            RunState::Rendering  => write!(f, "rendering"),
            RunState::Publishing => write!(f, "publishing"),
            RunState::Done       => write!(f, "done"),
            RunState::Failed     => write!(f, "failed"),
        }
    }
}

/// Runs the daily job orchestrator, blocking forever.
///
/// A single thread polls the wall clock once per minute and fires the job
/// when the 06:00 target has passed, then advances the target to the next
/// future 06:00. The job runs synchronously to completion inside the loop,
/// so at most one job is ever active and triggers cannot stack. A trigger
/// missed because the process was down at fire time is skipped, not fired
/// late on startup.
///
/// Collaborator failures abort the affected run only, the loop itself never
/// exits.
///
/// # Arguments
///
/// * 'config' - the configuration
/// * 'mgr' - the manager bundle
pub fn run(config: &Config, mgr: &Mgr) {
    let mut next_fire = next_fire_time(Local::now());
    info!("next trigger scheduled for {}", next_fire.format("%Y-%m-%d %H:%M"));

    loop {
        thread::sleep(POLL_INTERVAL);
        let local_now = Local::now();
        if local_now < next_fire {
            continue;
        }

        info!("trigger fired, starting run");
        match execute_job(local_now, &config.files.log_root, &mgr.meteo, &mgr.chart, &mgr.twitter) {
            Ok(state) => info!("run finished, state: {}", state),
            Err(e) => error!("run aborted before its log was set up: {}", e),
        }

        next_fire = next_fire_time(local_now);
        info!("next trigger scheduled for {}", next_fire.format("%Y-%m-%d %H:%M"));
    }
}

/// Returns the next strictly future fire time.
///
/// When the fire time does not exist on a day (DST transition) that day is
/// skipped.
///
/// # Arguments
///
/// * 'now' - the current date and time
fn next_fire_time(now: DateTime<Local>) -> DateTime<Local> {
    let mut date = now.date_naive();
    loop {
        if let Some(candidate) = date
            .and_hms_opt(FIRE_HOUR, FIRE_MINUTE, 0)
            .and_then(|t| t.and_local_timezone(Local).earliest())
        {
            if candidate > now {
                return candidate;
            }
        }
        date = date.succ_opt().unwrap();
    }
}

/// Returns the run directory name for a trigger timestamp.
///
/// Pure function of the timestamp, unique for any two timestamps at least a
/// minute apart, and sorts by date and time on disk.
///
/// # Arguments
///
/// * 'now' - the trigger timestamp
pub fn run_dir_name(now: DateTime<Local>) -> String {
    format!("tweet_{}__{}", now.format("%d_%m_%Y"), now.format("%H_%M"))
}

/// Creates the run directory under the log root.
///
/// Fails if the directory already exists. That can only happen when the
/// process is restarted and re-triggered within the same minute, a known
/// limitation that is reported rather than silently handled.
///
/// # Arguments
///
/// * 'log_root' - root directory holding all run directories
/// * 'now' - the trigger timestamp
pub fn create_run_directory(log_root: &str, now: DateTime<Local>) -> Result<PathBuf, RunError> {
    let run_dir = Path::new(log_root).join(run_dir_name(now));
    fs::create_dir(&run_dir)?;

    Ok(run_dir)
}

/// Executes one run of the fetch, render, publish pipeline.
///
/// The steps are strictly ordered and a failing collaborator aborts all
/// remaining steps for this run. Failures are written to the run log and
/// never retried, the job simply waits for the next day's trigger. Only a
/// failure to set up the run directory or its log file propagates as an
/// error.
///
/// # Arguments
///
/// * 'now' - the trigger timestamp
/// * 'log_root' - root directory holding all run directories
/// * 'provider' - the weather collaborator
/// * 'renderer' - the chart collaborator
/// * 'publisher' - the publish collaborator
pub fn execute_job<F, R, P>(
    now: DateTime<Local>,
    log_root: &str,
    provider: &F,
    renderer: &R,
    publisher: &P) -> Result<RunState, RunError>
where
    F: ForecastProvider,
    R: ChartRenderer,
    P: Publisher,
{
    let run_dir = create_run_directory(log_root, now)?;
    let mut runlog = RunLog::create(&run_dir)?;

    runlog.info(&format!("run started, state: {}", RunState::Pending));

    runlog.info(&format!("requesting forecast, state: {}", RunState::Fetching));
    let forecast = match provider.fetch_forecast() {
        Ok(forecast) => forecast,
        Err(e) => return Ok(abort_run(&mut runlog, &e.to_string())),
    };

    runlog.info(&format!("rendering chart, state: {}", RunState::Rendering));
    let graph_path = run_dir.join(GRAPH_FILENAME);
    if let Err(e) = renderer.render_chart(&forecast, &graph_path) {
        return Ok(abort_run(&mut runlog, &e.to_string()));
    }

    runlog.info(&format!("publishing post, state: {}", RunState::Publishing));
    if let Err(e) = publisher.publish_image_post(&graph_path, CAPTION) {
        return Ok(abort_run(&mut runlog, &e.to_string()));
    }

    runlog.info(&format!("run complete, state: {}", RunState::Done));

    Ok(RunState::Done)
}

/// Records a collaborator failure in the run log and returns the terminal
/// Failed state
///
/// # Arguments
///
/// * 'runlog' - this run's log
/// * 'error' - the collaborator error message
fn abort_run(runlog: &mut RunLog, error: &str) -> RunState {
    runlog.error(error);
    runlog.error(&format!("run aborted, state: {}", RunState::Failed));

    RunState::Failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use chrono::{TimeZone, Timelike};
    use crate::models::forecast::HOURS_PER_DAY;
    use crate::runlog::RUN_LOG_FILENAME;

    struct StubProvider {
        fail: bool,
        calls: Cell<usize>,
    }
    impl ForecastProvider for StubProvider {
        fn fetch_forecast(&self) -> Result<Forecast, FetchError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err(FetchError("network timeout".to_string()))
            } else {
                Ok(sample_forecast())
            }
        }
    }

    struct StubRenderer {
        fail: bool,
        calls: RefCell<Vec<PathBuf>>,
    }
    impl ChartRenderer for StubRenderer {
        fn render_chart(&self, _forecast: &Forecast, output_path: &Path) -> Result<(), RenderError> {
            self.calls.borrow_mut().push(output_path.to_path_buf());
            if self.fail {
                Err(RenderError("backend failure".to_string()))
            } else {
                fs::write(output_path, b"png").map_err(|e| RenderError(e.to_string()))
            }
        }
    }

    struct StubPublisher {
        fail: bool,
        calls: RefCell<Vec<(PathBuf, String)>>,
    }
    impl Publisher for StubPublisher {
        fn publish_image_post(&self, image_path: &Path, caption: &str) -> Result<(), PublishError> {
            self.calls.borrow_mut().push((image_path.to_path_buf(), caption.to_string()));
            if self.fail {
                Err(PublishError("http 401 Unauthorized".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn stubs(fetch_fail: bool, render_fail: bool, publish_fail: bool)
             -> (StubProvider, StubRenderer, StubPublisher) {
        (
            StubProvider { fail: fetch_fail, calls: Cell::new(0) },
            StubRenderer { fail: render_fail, calls: RefCell::new(Vec::new()) },
            StubPublisher { fail: publish_fail, calls: RefCell::new(Vec::new()) },
        )
    }

    fn sample_forecast() -> Forecast {
        Forecast {
            temperature: [12.5; HOURS_PER_DAY],
            rain: [0.1; HOURS_PER_DAY],
            pressure: [1013.0; HOURS_PER_DAY],
            uv_index: [3.0; HOURS_PER_DAY],
        }
    }

    fn trigger_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap()
    }

    #[test]
    fn run_dir_name_is_a_pure_function_of_the_timestamp() {
        assert_eq!(run_dir_name(trigger_time()), "tweet_01_03_2024__06_00");
        assert_eq!(run_dir_name(trigger_time()), run_dir_name(trigger_time()));
    }

    #[test]
    fn run_dir_name_is_unique_per_minute() {
        let a = Local.with_ymd_and_hms(2024, 3, 1, 6, 0, 59).unwrap();
        let b = Local.with_ymd_and_hms(2024, 3, 1, 6, 1, 0).unwrap();

        assert_ne!(run_dir_name(a), run_dir_name(b));
    }

    #[test]
    fn next_fire_before_fire_hour_is_same_day() {
        let now = Local.with_ymd_and_hms(2024, 3, 1, 5, 30, 0).unwrap();
        let fire = next_fire_time(now);

        assert_eq!(fire.date_naive(), now.date_naive());
        assert_eq!((fire.hour(), fire.minute()), (6, 0));
    }

    #[test]
    fn next_fire_after_fire_hour_is_next_day() {
        let now = Local.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let fire = next_fire_time(now);

        assert_eq!(fire.date_naive(), now.date_naive().succ_opt().unwrap());
        assert_eq!((fire.hour(), fire.minute()), (6, 0));
    }

    #[test]
    fn missed_trigger_is_skipped_not_fired_late() {
        let now = Local.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap();
        let fire = next_fire_time(now);

        assert!(fire > now);
        assert_eq!(fire.date_naive(), now.date_naive().succ_opt().unwrap());
    }

    #[test]
    fn successful_run_fetches_renders_and_publishes_once() {
        let root = tempfile::tempdir().unwrap();
        let log_root = root.path().to_str().unwrap();
        let (provider, renderer, publisher) = stubs(false, false, false);

        let state = execute_job(trigger_time(), log_root, &provider, &renderer, &publisher).unwrap();

        assert_eq!(state, RunState::Done);

        let run_dir = root.path().join("tweet_01_03_2024__06_00");
        let graph_path = run_dir.join(GRAPH_FILENAME);
        assert!(graph_path.exists());

        assert_eq!(provider.calls.get(), 1);
        assert_eq!(renderer.calls.borrow().len(), 1);

        let published = publisher.calls.borrow();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, graph_path);
        assert_eq!(published[0].1, "Weather in Prague today");

        let log = fs::read_to_string(run_dir.join(RUN_LOG_FILENAME)).unwrap();
        assert!(log.contains("run complete, state: done"));
    }

    #[test]
    fn fetch_failure_aborts_remaining_steps() {
        let root = tempfile::tempdir().unwrap();
        let log_root = root.path().to_str().unwrap();
        let (provider, renderer, publisher) = stubs(true, false, false);

        let state = execute_job(trigger_time(), log_root, &provider, &renderer, &publisher).unwrap();

        assert_eq!(state, RunState::Failed);
        assert_eq!(renderer.calls.borrow().len(), 0);
        assert_eq!(publisher.calls.borrow().len(), 0);

        let run_dir = root.path().join("tweet_01_03_2024__06_00");
        assert!(!run_dir.join(GRAPH_FILENAME).exists());

        let log = fs::read_to_string(run_dir.join(RUN_LOG_FILENAME)).unwrap();
        assert!(log.contains("network timeout"));
        assert!(log.contains("run aborted, state: failed"));
    }

    #[test]
    fn render_failure_skips_publish() {
        let root = tempfile::tempdir().unwrap();
        let log_root = root.path().to_str().unwrap();
        let (provider, renderer, publisher) = stubs(false, true, false);

        let state = execute_job(trigger_time(), log_root, &provider, &renderer, &publisher).unwrap();

        assert_eq!(state, RunState::Failed);
        assert_eq!(renderer.calls.borrow().len(), 1);
        assert_eq!(publisher.calls.borrow().len(), 0);
    }

    #[test]
    fn publish_failure_is_recorded_in_the_run_log() {
        let root = tempfile::tempdir().unwrap();
        let log_root = root.path().to_str().unwrap();
        let (provider, renderer, publisher) = stubs(false, false, true);

        let state = execute_job(trigger_time(), log_root, &provider, &renderer, &publisher).unwrap();

        assert_eq!(state, RunState::Failed);

        let run_dir = root.path().join("tweet_01_03_2024__06_00");
        let log = fs::read_to_string(run_dir.join(RUN_LOG_FILENAME)).unwrap();
        assert!(log.contains("http 401 Unauthorized"));
    }

    #[test]
    fn exactly_one_run_directory_per_execution() {
        let root = tempfile::tempdir().unwrap();
        let log_root = root.path().to_str().unwrap();
        let (provider, renderer, publisher) = stubs(false, false, false);

        execute_job(trigger_time(), log_root, &provider, &renderer, &publisher).unwrap();

        let entries = fs::read_dir(root.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn same_minute_re_trigger_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let log_root = root.path().to_str().unwrap();
        let (provider, renderer, publisher) = stubs(false, false, false);

        execute_job(trigger_time(), log_root, &provider, &renderer, &publisher).unwrap();
        let second = execute_job(trigger_time(), log_root, &provider, &renderer, &publisher);

        assert!(second.is_err());
        assert_eq!(provider.calls.get(), 1);
    }
}
