use std::fs::File;
use std::io::Write;
use std::path::Path;
use chrono::Local;
use log::warn;

pub const RUN_LOG_FILENAME: &str = "log.log";

/// Log sink scoped to a single run.
///
/// Every run gets its own instance writing into that run's directory, so no
/// logging state is shared between runs or with the process wide logger.
pub struct RunLog {
    file: File,
}

impl RunLog {
    /// Creates the log file inside the given run directory
    ///
    /// # Arguments
    ///
    /// * 'run_dir' - the directory owned by the run
    pub fn create(run_dir: &Path) -> Result<RunLog, std::io::Error> {
        let file = File::create(run_dir.join(RUN_LOG_FILENAME))?;

        Ok(RunLog { file })
    }

    pub fn info(&mut self, message: &str) {
        self.write("INFO", message);
    }

    pub fn error(&mut self, message: &str) {
        self.write("ERROR", message);
    }

    /// Appends one timestamped line and flushes it. A failing write is
    /// reported on the process log since there is no better place left.
    fn write(&mut self, level: &str, message: &str) {
        let line = format!("{} - {} - {}",
                           Local::now().format("%Y-%m-%d %H:%M:%S"), level, message);

        if let Err(e) = writeln!(self.file, "{}", line) {
            warn!("could not write to run log: {}", e);
        }
        let _ = self.file.flush();
    }
}
