//! Command-line front end: argument parsing and command dispatch for `oikos_cli`.

pub mod output;

use std::{
    env,
    path::PathBuf,
    str::FromStr,
    sync::Arc,
    thread,
    time::Duration,
};

use crate::{
    config::{app_data_dir, Config, ConfigManager},
    core::services::{
        CatchUpPolicy, DebtService, FinancialInputs, ReportService, StatusMetrics, StatusService,
        SummaryService,
    },
    domain::{Debt, DebtStrategy},
    errors::{OikosError, Result},
    repository::UserRepository,
    store::JsonFileStore,
    time::{Clock, SystemClock},
    utils::{build_info, persistence::write_atomic, DEFAULT_LOG_DIRECTIVE},
    worker::{RecurringTransactionJob, RollForwardReport, Scheduler},
};

use self::output::{money, OutputPreferences};

pub const USER_ENV: &str = "OIKOS_USER";
const FIELD_WIDTH: usize = 22;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RunRecurring { catch_up: bool },
    Debts { strategy: DebtStrategy },
    Summary,
    Status,
    Export { output: Option<PathBuf>, month_only: bool },
    Serve { stop_after: Option<Duration> },
    Backup { note: Option<String> },
    Backups,
    Restore { name: String },
    Version,
    Help,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub user: Option<String>,
    pub home: Option<PathBuf>,
    pub json: bool,
    pub plain: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    pub options: GlobalOptions,
}

/// Parses `args` (without the program name). Global flags may appear anywhere.
pub fn parse<I>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = String>,
{
    let mut options = GlobalOptions::default();
    let mut positional = Vec::new();
    let mut flags = Vec::new();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--user" | "-u" => options.user = Some(required_value(&mut args, "--user")?),
            "--home" => options.home = Some(PathBuf::from(required_value(&mut args, "--home")?)),
            "--json" => options.json = true,
            "--plain" => options.plain = true,
            "--output" | "-o" | "--for" | "--note" => {
                let value = required_value(&mut args, &arg)?;
                flags.push((arg, Some(value)));
            }
            "--help" | "-h" => positional.insert(0, "help".to_string()),
            "--version" | "-V" => positional.insert(0, "version".to_string()),
            other if other.starts_with("--") => flags.push((arg, None)),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let name = positional.next().unwrap_or_else(|| "help".to_string());
    let flag = |key: &str| flags.iter().any(|(k, _)| k == key);
    let flag_value = |keys: &[&str]| {
        flags
            .iter()
            .find(|(k, _)| keys.contains(&k.as_str()))
            .and_then(|(_, v)| v.clone())
    };

    let command = match name.as_str() {
        "run-recurring" => Command::RunRecurring {
            catch_up: flag("--catch-up"),
        },
        "debts" => {
            let strategy = match positional.next() {
                Some(raw) => DebtStrategy::from_str(&raw)?,
                None => DebtStrategy::default(),
            };
            Command::Debts { strategy }
        }
        "summary" => Command::Summary,
        "status" => Command::Status,
        "export" => Command::Export {
            output: flag_value(&["--output", "-o"])
                .or_else(|| positional.next())
                .map(PathBuf::from),
            month_only: flag("--month"),
        },
        "serve" => {
            let stop_after = match flag_value(&["--for"]) {
                Some(raw) => Some(Duration::from_secs(raw.parse().map_err(|_| {
                    OikosError::InvalidInput(format!("`--for` expects seconds, got `{raw}`"))
                })?)),
                None => None,
            };
            Command::Serve { stop_after }
        }
        "backup" => Command::Backup {
            note: flag_value(&["--note"]).or_else(|| positional.next()),
        },
        "backups" => Command::Backups,
        "restore" => Command::Restore {
            name: positional.next().ok_or_else(|| {
                OikosError::InvalidInput("restore needs a backup name".into())
            })?,
        },
        "version" => Command::Version,
        "help" => Command::Help,
        other => {
            return Err(OikosError::InvalidInput(format!(
                "unknown command `{other}`; run `oikos_cli help`"
            )))
        }
    };
    Ok(Invocation { command, options })
}

fn required_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .filter(|value| !value.starts_with("--"))
        .ok_or_else(|| OikosError::InvalidInput(format!("`{flag}` needs a value")))
}

pub fn usage() -> &'static str {
    "Usage: oikos_cli [--user <id>] [--home <dir>] [--json] [--plain] <command>\n\
     Commands:\n  \
     run-recurring [--catch-up]      materialize due recurring transactions\n  \
     debts [avalanche|snowball]      list debts in payoff order\n  \
     summary                         dashboard totals\n  \
     status                          financial health classification\n  \
     export [--month] [-o file.csv]  transactions as CSV\n  \
     serve [--for <secs>]            run the daily recurring job\n  \
     backup [note]                   snapshot the store\n  \
     backups                         list store snapshots\n  \
     restore <name>                  restore a store snapshot\n  \
     version                         build information\n\
     The user id defaults to $OIKOS_USER, then to `default_user` in the config."
}

/// Resolved runtime: configuration plus the open store.
struct Session {
    config: Config,
    store: JsonFileStore,
    repo: UserRepository,
    clock: Arc<dyn Clock>,
}

impl Session {
    fn open(options: &GlobalOptions) -> Result<Self> {
        let manager = match &options.home {
            Some(home) => ConfigManager::with_base_dir(home)?,
            None => ConfigManager::with_base_dir(app_data_dir())?,
        };
        let config = manager.load()?;
        crate::init_with_filter(config.log_filter.as_deref().unwrap_or(DEFAULT_LOG_DIRECTIVE));

        let user = options
            .user
            .clone()
            .or_else(|| env::var(USER_ENV).ok().filter(|v| !v.trim().is_empty()))
            .or_else(|| config.default_user.clone())
            .ok_or_else(|| {
                OikosError::Config(format!("no user selected; pass --user or set {USER_ENV}"))
            })?;

        let store = JsonFileStore::open(
            config.store_path(manager.base_dir()),
            Some(config.backup_retention),
        )?;
        let repo = UserRepository::new(Arc::new(store.clone()), user)?;
        Ok(Self {
            config,
            store,
            repo,
            clock: Arc::new(SystemClock),
        })
    }
}

/// Executes a parsed invocation.
pub fn run(invocation: Invocation) -> Result<()> {
    let options = invocation.options;
    output::set_preferences(OutputPreferences {
        plain: options.plain || options.json,
        quiet: false,
    });

    match invocation.command {
        Command::Help => {
            output::info(usage());
            Ok(())
        }
        Command::Version => {
            crate::init();
            if options.json {
                let details: serde_json::Map<String, serde_json::Value> = build_info::details()
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.into()))
                    .collect();
                output::info(serde_json::to_string_pretty(&details)?);
            } else {
                output::info(build_info::summary());
            }
            Ok(())
        }
        command => {
            let session = Session::open(&options)?;
            dispatch(command, &session, options.json)
        }
    }
}

fn dispatch(command: Command, session: &Session, json: bool) -> Result<()> {
    match command {
        Command::RunRecurring { catch_up } => {
            let policy = if catch_up {
                CatchUpPolicy::CatchUp
            } else {
                session.config.recurring.catch_up
            };
            let job = RecurringTransactionJob::new(session.repo.clone(), Arc::clone(&session.clock))
                .with_policy(policy);
            let report = job.run_now();
            print_report(&report, json)?;
            if report.is_success() {
                Ok(())
            } else {
                Err(OikosError::Storage(format!(
                    "{} recurring template(s) failed",
                    report.failures.len() + usize::from(report.load_error.is_some())
                )))
            }
        }
        Command::Debts { strategy } => {
            let debts: Vec<Debt> = session.repo.list()?;
            let ordered = DebtService::order(&debts, strategy);
            if json {
                output::info(serde_json::to_string_pretty(&ordered)?);
                return Ok(());
            }
            output::section(format!("Debts ({strategy})"));
            if ordered.is_empty() {
                output::info("No debts recorded.");
                return Ok(());
            }
            for (index, debt) in ordered.iter().enumerate() {
                output::info(format!(
                    "{:>2}. {:<20} {:>12} {:>7.2}%  min {}",
                    index + 1,
                    debt.name,
                    money(debt.total_amount),
                    debt.annual_interest_rate,
                    money(debt.minimum_monthly_payment)
                ));
            }
            let summary = DebtService::summary(&debts);
            output::field("Total owed", money(summary.total_owed), FIELD_WIDTH);
            output::field(
                "Minimum payments",
                money(summary.total_minimum_payment),
                FIELD_WIDTH,
            );
            if summary.with_settlement_offers > 0 {
                output::field(
                    "Settlement savings",
                    money(summary.potential_settlement_savings),
                    FIELD_WIDTH,
                );
            }
            Ok(())
        }
        Command::Summary => {
            let inputs = FinancialInputs::load(&session.repo)?;
            let snapshot = SummaryService::snapshot(&inputs, session.clock.now());
            if json {
                output::info(serde_json::to_string_pretty(&snapshot)?);
                return Ok(());
            }
            output::section(format!("Summary for {}", session.repo.user_id()));
            output::field("Income", money(snapshot.total_income), FIELD_WIDTH);
            output::field("Expenses", money(snapshot.total_expense), FIELD_WIDTH);
            output::field("Allocated", money(snapshot.total_allocated), FIELD_WIDTH);
            output::field("Balance", money(snapshot.current_balance), FIELD_WIDTH);
            output::field("Savings", money(snapshot.total_savings), FIELD_WIDTH);
            output::field("Investments", money(snapshot.investment_value), FIELD_WIDTH);
            output::field("Debt", money(snapshot.total_debt), FIELD_WIDTH);
            output::field("Net worth", money(snapshot.net_worth), FIELD_WIDTH);
            output::field(
                "Subscriptions / month",
                money(snapshot.subscriptions_total),
                FIELD_WIDTH,
            );
            if let Some(next) = &snapshot.next_subscription {
                output::field(
                    "Next bill",
                    format!("{} {} on {}", next.name, money(next.amount), next.due.format("%Y-%m-%d")),
                    FIELD_WIDTH,
                );
            }
            output::field("Status", snapshot.status, FIELD_WIDTH);
            Ok(())
        }
        Command::Status => {
            let inputs = FinancialInputs::load(&session.repo)?;
            let metrics = StatusMetrics::for_month(&inputs, session.clock.now());
            let status = StatusService::classify(&metrics);
            if json {
                let body = serde_json::json!({ "status": status, "metrics": metrics });
                output::info(serde_json::to_string_pretty(&body)?);
            } else {
                output::success(format!("Financial status: {status}"));
            }
            Ok(())
        }
        Command::Export { output: path, month_only } => {
            let mut transactions = session.repo.transactions()?;
            if month_only {
                transactions = ReportService::in_month(&transactions, session.clock.now());
            }
            let csv = ReportService::export_csv(&transactions)?;
            match path {
                Some(path) => {
                    write_atomic(&path, &csv)?;
                    output::success(format!(
                        "Exported {} transaction(s) to {}",
                        transactions.len(),
                        path.display()
                    ));
                }
                None => print!("{csv}"),
            }
            Ok(())
        }
        Command::Serve { stop_after } => {
            let scheduler = Scheduler::new();
            let job = RecurringTransactionJob::new(session.repo.clone(), Arc::clone(&session.clock))
                .with_policy(session.config.recurring.catch_up);
            scheduler.schedule_unique(Arc::new(job), session.config.recurring.schedule())?;
            output::success(format!(
                "Recurring job scheduled for {} (every {}s)",
                session.repo.user_id(),
                session.config.recurring.period_secs
            ));
            match stop_after {
                Some(duration) => {
                    thread::sleep(duration);
                    scheduler.shutdown()?;
                    output::info("Scheduler stopped.");
                }
                None => loop {
                    thread::park();
                },
            }
            Ok(())
        }
        Command::Backup { note } => {
            let path = session.store.backup(note.as_deref())?;
            output::success(format!("Backup written to {}", path.display()));
            Ok(())
        }
        Command::Backups => {
            let backups = session.store.list_backups()?;
            if json {
                output::info(serde_json::to_string_pretty(&backups)?);
            } else if backups.is_empty() {
                output::info("No backups found.");
            } else {
                for name in backups {
                    output::info(name);
                }
            }
            Ok(())
        }
        Command::Restore { name } => {
            session.store.restore(&name)?;
            output::success(format!("Restored {name}"));
            Ok(())
        }
        Command::Help | Command::Version => Ok(()),
    }
}

fn print_report(report: &RollForwardReport, json: bool) -> Result<()> {
    if json {
        output::info(serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    output::section("Recurring roll-forward");
    output::field("Templates", report.processed, FIELD_WIDTH);
    output::field("Transactions created", report.generated, FIELD_WIDTH);
    output::field("Skipped", report.skipped, FIELD_WIDTH);
    if let Some(err) = &report.load_error {
        output::error(format!("Could not read templates: {err}"));
    }
    for failure in &report.failures {
        output::warning(format!("{}: {}", failure.template_id, failure.error));
    }
    Ok(())
}
