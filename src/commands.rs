use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::client::DeskClient;
use crate::config;
use crate::models::{BookingRequest, TemplateSource};
use crate::notifier::{self, Notifier};
use crate::scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Booked,
    DryRun,
    Excluded { weekday: u8 },
    InvalidAuthorization,
    Failed,
}

#[derive(Debug)]
pub struct TaskReport {
    pub path: PathBuf,
    pub outcome: Outcome,
}

/// Everything a booking task needs, shared read-only between tasks.
pub struct Runner {
    pub desk: DeskClient,
    pub notifier: Notifier,
    pub template: TemplateSource,
    pub today: NaiveDate,
    pub offset_days: u64,
    pub dry_run: bool,
}

/// Book the desk for the user described by the authorization file at `path`.
pub async fn run_for_user(runner: &Runner, path: &Path) -> Outcome {
    let auth = match config::load_auth_config(path).await {
        Ok(auth) => auth,
        Err(e) => {
            error!("Skipping {}: {}", path.display(), e);
            return Outcome::InvalidAuthorization;
        }
    };

    let Some(date) = scheduler::booking_date(runner.today, runner.offset_days) else {
        error!(
            "{} plus {} days is not a valid booking date",
            runner.today, runner.offset_days
        );
        return Outcome::Failed;
    };
    let request = BookingRequest::new(&auth, &date);

    info!(
        "Trying to book desk {} for {} on {}",
        auth.desk_id, auth.identity, request.day
    );

    if scheduler::is_excluded(request.weekday, &auth.excluding_days) {
        info!(
            "{}: {} is excluded from booking (weekday {})",
            auth.identity, request.day, request.weekday
        );
        return Outcome::Excluded {
            weekday: request.weekday,
        };
    }

    if runner.dry_run {
        println!(
            "[DRY RUN] Would book desk {} in space {} on {} for {}",
            request.desk_id, request.space_id, request.day, auth.identity
        );
        return Outcome::DryRun;
    }

    match runner.desk.book(&request, &auth.token).await {
        Ok(()) => {
            println!("Booked desk {} on {} for {}", request.desk_id, request.day, auth.identity);
            Outcome::Booked
        }
        Err(e) if e.is_network() => {
            error!("Could not reach booking API for {}: {}", auth.identity, e);
            send_failure_notice(runner, &auth.identity).await;
            Outcome::Failed
        }
        Err(e) => {
            error!("Booking for {} failed: {}", auth.identity, e);
            send_failure_notice(runner, &auth.identity).await;
            Outcome::Failed
        }
    }
}

/// Notification problems are logged and otherwise ignored.
async fn send_failure_notice(runner: &Runner, identity: &str) {
    let message = match notifier::render_template(&runner.template, identity) {
        Ok(message) => message,
        Err(e) => {
            warn!("Could not render notification for {}: {}", identity, e);
            return;
        }
    };
    debug!("Notification for {}: {}", identity, message);

    match runner.notifier.notify(&message).await {
        Ok(()) => info!("Sent failure notification for {}", identity),
        Err(e) => warn!("Failed to notify about {}: {}", identity, e),
    }
}

/// Runs one task per authorization file and waits for all of them.
pub async fn run_all(runner: Arc<Runner>, files: Vec<PathBuf>) -> Vec<TaskReport> {
    let mut tasks = JoinSet::new();
    for path in files {
        let runner = Arc::clone(&runner);
        tasks.spawn(async move {
            let outcome = run_for_user(&runner, &path).await;
            TaskReport { path, outcome }
        });
    }

    let mut reports = Vec::with_capacity(tasks.len());
    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(report) => reports.push(report),
            Err(e) => error!("Booking task aborted: {}", e),
        }
    }
    reports
}

/// Load the general config, list authorization files and book for all of
/// them. Config problems abort the run before anything is dispatched.
pub async fn run_bookings(
    config_dir: &Path,
    endpoint: &str,
    today: NaiveDate,
    offset_days: u64,
    dry_run: bool,
) -> Vec<TaskReport> {
    let general = match config::load_general_config(config_dir).await {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{}", e);
            return Vec::new();
        }
    };

    let files = match config::list_authorization_files(config_dir).await {
        Ok(files) => files,
        Err(e) => {
            error!("{}", e);
            return Vec::new();
        }
    };

    let runner = match (DeskClient::new(endpoint), Notifier::new(&general.slack_hook)) {
        (Ok(desk), Ok(notifier)) => Runner {
            desk,
            notifier,
            template: general.template(),
            today,
            offset_days,
            dry_run,
        },
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to build HTTP client: {}", e);
            return Vec::new();
        }
    };

    info!(
        "Found {} authorization file(s) in {}",
        files.len(),
        config_dir.display()
    );

    let reports = run_all(Arc::new(runner), files).await;
    log_summary(&reports);
    reports
}

fn log_summary(reports: &[TaskReport]) {
    let (mut booked, mut dry_run, mut excluded, mut failed) = (0, 0, 0, 0);
    for report in reports {
        match report.outcome {
            Outcome::Booked => booked += 1,
            Outcome::DryRun => dry_run += 1,
            Outcome::Excluded { weekday } => {
                excluded += 1;
                debug!("{}: weekday {} excluded", report.path.display(), weekday);
            }
            Outcome::InvalidAuthorization | Outcome::Failed => {
                failed += 1;
                warn!("No desk booked for {}", report.path.display());
            }
        }
    }
    info!(
        "Done: {} booked, {} dry run, {} excluded, {} failed",
        booked, dry_run, excluded, failed
    );
}
