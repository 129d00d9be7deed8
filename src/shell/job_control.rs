//! Background job tracking.
//!
//! Jobs live in a fixed number of slots and keep their slot index for as
//! long as they are alive, so the index shown by `jobs` is what `fg` and
//! `bg` take. A finished job's slot may be handed to a later job.

use std::fmt;

use failure::{Fail, ResultExt};
use log::{debug, info, warn};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{self, WaitPidFlag};
use nix::unistd::Pid;

use crate::core::status::TerminationStatus;
use crate::errors::{Error, ErrorKind, Result};

/// Maximum number of background jobs tracked at once.
pub const JOB_CAPACITY: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pid: Pid,
    label: String,
    alive: bool,
}

impl Job {
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// The program name the job was launched with.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.pid, self.label)
    }
}

pub struct JobTable {
    slots: Vec<Job>,
    capacity: usize,
}

impl JobTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns `true` if `insert` would find a slot.
    pub fn has_capacity(&self) -> bool {
        self.slots.len() < self.capacity || self.slots.iter().any(|job| !job.is_alive())
    }

    /// Starts tracking `pid`. Returns `false`, tracking nothing, when every
    /// slot holds a live job.
    pub fn insert(&mut self, pid: Pid, label: &str) -> bool {
        let job = Job {
            pid,
            label: label.to_string(),
            alive: true,
        };

        if self.slots.len() < self.capacity {
            self.slots.push(job);
        } else if let Some(slot) = self.slots.iter_mut().find(|job| !job.is_alive()) {
            *slot = job;
        } else {
            warn!("job table full, not tracking {} ({})", pid, label);
            return false;
        }

        debug!("tracking background job {} ({})", pid, label);
        true
    }

    pub fn mark_dead(&mut self, pid: Pid) {
        if let Some(job) = self
            .slots
            .iter_mut()
            .find(|job| job.alive && job.pid == pid)
        {
            job.alive = false;
        }
    }

    /// Returns `true` if `pid` is tracked and has not been seen to finish.
    pub fn is_alive(&self, pid: Pid) -> bool {
        self.list().any(|(_, job)| job.pid() == pid)
    }

    /// Returns the live job in slot `index`.
    pub fn get(&self, index: usize) -> Option<&Job> {
        self.slots.get(index).filter(|job| job.is_alive())
    }

    /// Live jobs with their slot indices.
    pub fn list(&self) -> impl Iterator<Item = (usize, &Job)> {
        self.slots.iter().enumerate().filter(|(_, job)| job.is_alive())
    }

    /// Reaps every child that has finished, tracked or not, without
    /// blocking. Tracked children are marked dead.
    pub fn sweep(&mut self) -> Result<Vec<(Pid, TerminationStatus)>> {
        let any_child = Pid::from_raw(-1);
        let mut finished = Vec::new();
        loop {
            match wait::waitpid(any_child, Some(WaitPidFlag::WNOHANG)) {
                Ok(status) => match TerminationStatus::from_wait_status(status) {
                    Some((pid, status)) => {
                        debug!("{} finished with {}", pid, status);
                        self.mark_dead(pid);
                        finished.push((pid, status));
                    }
                    None => break,
                },
                Err(Errno::ECHILD) => break,
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(Error::from(e.context(ErrorKind::Nix))),
            }
        }

        Ok(finished)
    }

    /// Asks every live job to terminate. Does not wait for them.
    pub fn terminate_all(&mut self) {
        for (_, job) in self.list() {
            info!("terminating background job {}", job);
            let temp_result = signal::kill(job.pid(), Signal::SIGTERM);
            log_if_err!(temp_result, "failed to terminate {}", job.pid());
        }
    }

    /// Continues the job in slot `index` and waits for it to finish.
    pub fn bring_to_foreground(&mut self, index: usize) -> Result<TerminationStatus> {
        let pid = self.find_job(index)?.pid();
        debug!("putting job [{}] {} in foreground", index, pid);

        signal::kill(pid, Signal::SIGCONT).context(ErrorKind::Nix)?;
        let status = wait_for_process(pid)?;
        self.mark_dead(pid);
        Ok(status)
    }

    /// Continues the job in slot `index` without waiting for it.
    pub fn continue_in_background(&mut self, index: usize) -> Result<()> {
        let pid = self.find_job(index)?.pid();
        debug!("continuing job [{}] {} in background", index, pid);

        signal::kill(pid, Signal::SIGCONT).context(ErrorKind::Nix)?;
        Ok(())
    }

    fn find_job(&self, index: usize) -> Result<&Job> {
        self.get(index)
            .ok_or_else(|| Error::no_such_job(index.to_string()))
    }
}

impl Default for JobTable {
    fn default() -> Self {
        Self::with_capacity(JOB_CAPACITY)
    }
}

impl fmt::Debug for JobTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} jobs\tcapacity: {}", self.slots.len(), self.capacity)?;
        for (index, job) in self.list() {
            writeln!(f, "[{}] {}", index, job)?;
        }

        Ok(())
    }
}

/// Blocks until `pid` terminates.
pub fn wait_for_process(pid: Pid) -> Result<TerminationStatus> {
    loop {
        match wait::waitpid(pid, None) {
            Ok(status) => match TerminationStatus::from_wait_status(status) {
                Some((_, status)) => return Ok(status),
                None => debug!("{}: ignoring wait status {:?}", pid, status),
            },
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(Error::from(e.context(ErrorKind::Nix))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::process::Command;
    use std::thread;
    use std::time::{Duration, Instant};

    use serial_test::serial;

    use super::*;

    fn spawn(program: &str, args: &[&str]) -> Pid {
        let child = Command::new(program).args(args).spawn().unwrap();
        Pid::from_raw(child.id() as i32)
    }

    /// Sweeps until `pid` is reported or a few seconds pass.
    fn sweep_until(table: &mut JobTable, pid: Pid) -> Vec<(Pid, TerminationStatus)> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut seen = Vec::new();
        while Instant::now() < deadline {
            seen.extend(table.sweep().unwrap());
            if seen.iter().any(|(p, _)| *p == pid) {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }
        seen
    }

    #[test]
    fn insert_and_list() {
        let mut table = JobTable::default();
        assert!(table.insert(Pid::from_raw(100), "sleep"));
        assert!(table.insert(Pid::from_raw(101), "cat"));

        let listed: Vec<_> = table.list().map(|(i, job)| (i, job.to_string())).collect();
        assert_eq!(
            listed,
            vec![(0, "100 sleep".to_string()), (1, "101 cat".to_string())]
        );
        assert!(table.is_alive(Pid::from_raw(101)));
        assert_eq!(table.get(1).map(Job::pid), Some(Pid::from_raw(101)));
        assert!(table.get(1).map_or(false, Job::is_alive));
    }

    #[test]
    fn mark_dead_hides_job() {
        let mut table = JobTable::default();
        table.insert(Pid::from_raw(100), "sleep");
        table.insert(Pid::from_raw(101), "cat");
        table.mark_dead(Pid::from_raw(100));

        assert!(!table.is_alive(Pid::from_raw(100)));
        assert!(table.get(0).is_none());
        let indices: Vec<_> = table.list().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![1]);
    }

    #[test]
    fn full_table_drops_new_jobs() {
        let mut table = JobTable::with_capacity(2);
        assert!(table.insert(Pid::from_raw(100), "a"));
        assert!(table.insert(Pid::from_raw(101), "b"));
        assert!(!table.has_capacity());
        assert!(!table.insert(Pid::from_raw(102), "c"));
        assert!(!table.is_alive(Pid::from_raw(102)));
    }

    #[test]
    fn dead_slot_is_reused() {
        let mut table = JobTable::with_capacity(2);
        table.insert(Pid::from_raw(100), "a");
        table.insert(Pid::from_raw(101), "b");
        table.mark_dead(Pid::from_raw(100));

        assert!(table.has_capacity());
        assert!(table.insert(Pid::from_raw(102), "c"));
        assert_eq!(table.get(0).map(Job::label), Some("c"));
        assert_eq!(table.get(1).map(Job::label), Some("b"));
    }

    #[test]
    fn invalid_index_is_rejected_without_signalling() {
        let mut table = JobTable::default();
        table.insert(Pid::from_raw(100), "a");
        table.mark_dead(Pid::from_raw(100));

        for index in &[0, 1, 99] {
            let e = table.continue_in_background(*index).unwrap_err();
            assert_eq!(*e.kind(), ErrorKind::NoSuchJob(index.to_string()));
            let e = table.bring_to_foreground(*index).unwrap_err();
            assert_eq!(*e.kind(), ErrorKind::NoSuchJob(index.to_string()));
        }
    }

    #[test]
    #[serial]
    fn sweep_reports_finished_job_once() {
        let mut table = JobTable::default();
        let pid = spawn("sh", &["-c", "exit 3"]);
        table.insert(pid, "sh");

        let finished = sweep_until(&mut table, pid);
        assert_eq!(
            finished.iter().filter(|(p, _)| *p == pid).collect::<Vec<_>>(),
            vec![&(pid, TerminationStatus::Exited(3))]
        );
        assert!(!table.is_alive(pid));
        assert!(table.sweep().unwrap().iter().all(|(p, _)| *p != pid));
    }

    #[test]
    #[serial]
    fn sweep_reports_untracked_children() {
        let mut table = JobTable::default();
        let pid = spawn("true", &[]);

        let finished = sweep_until(&mut table, pid);
        assert!(finished.contains(&(pid, TerminationStatus::Exited(0))));
    }

    #[test]
    #[serial]
    fn terminate_all_signals_live_jobs() {
        let mut table = JobTable::default();
        let first = spawn("sleep", &["30"]);
        let second = spawn("sleep", &["30"]);
        table.insert(first, "sleep");
        table.insert(second, "sleep");

        table.terminate_all();

        let sigterm = Signal::SIGTERM as i32;
        assert_eq!(
            wait_for_process(first).unwrap(),
            TerminationStatus::Signaled(sigterm)
        );
        assert_eq!(
            wait_for_process(second).unwrap(),
            TerminationStatus::Signaled(sigterm)
        );
    }

    #[test]
    #[serial]
    fn bring_to_foreground_waits_for_job() {
        let mut table = JobTable::default();
        let pid = spawn("sh", &["-c", "sleep 0.2; exit 4"]);
        table.insert(pid, "sh");

        let status = table.bring_to_foreground(0).unwrap();
        assert_eq!(status, TerminationStatus::Exited(4));
        assert!(table.get(0).is_none());
    }

    #[test]
    #[serial]
    fn continue_in_background_resumes_stopped_job() {
        let mut table = JobTable::default();
        let pid = spawn("sleep", &["30"]);
        table.insert(pid, "sleep");

        signal::kill(pid, Signal::SIGSTOP).unwrap();
        table.continue_in_background(0).unwrap();
        assert!(table.is_alive(pid));

        signal::kill(pid, Signal::SIGKILL).unwrap();
        assert_eq!(
            wait_for_process(pid).unwrap(),
            TerminationStatus::Signaled(Signal::SIGKILL as i32)
        );
    }
}
