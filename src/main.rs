//! Binary entry point for the Hostfleet CLI.

mod cli;

use std::ffi::OsString;
use std::io::{self, Write};
use std::process;
use std::rc::Rc;

use clap::Parser;
use shell_escape::unix::escape;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use hostfleet::cloud::{InstanceId, InvalidFilter, UnknownAttribute};
use hostfleet::{
    Annotate, AwsCli, CommandRunner, ConfigError, Connector, DispatchError, DispatchReport,
    FnTask, GroupHosts, HOSTS_ATTRIBUTE, Host, HostSource, HostfleetConfig, HostnameAttribute,
    Hosts, InstanceQuery, InstanceQueryHosts, ProcessCommandRunner, Region, ResolveError,
    StackHosts, TaskError, execute,
};

use cli::{Cli, QueryArgs, Target};

const LOG_ENV: &str = "HOSTFLEET_LOG";
const DEFAULT_LOG_FILTER: &str = "hostfleet=warn";

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Attribute(#[from] UnknownAttribute),
    #[error(transparent)]
    Filter(#[from] InvalidFilter),
    #[error("host resolution failed: {0}")]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("invalid command argument: {0}")]
    InvalidCommand(String),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(&cli) {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn dispatch(cli: &Cli) -> Result<i32, CliError> {
    let config = HostfleetConfig::load_without_cli_args()?;
    config.validate()?;
    let region = config.region(cli.region.as_deref())?;
    let attribute = match cli.attribute.as_deref() {
        Some(raw) => raw.parse::<HostnameAttribute>()?,
        None => config.hostname_attribute()?,
    };
    debug!(%region, %attribute, "resolved settings");

    let connector = AwsCli::with_process_runner(config.aws_bin.clone(), config.aws_profile.clone());
    let source = host_source(connector, region, attribute, &cli.target)?;

    let command = cli.target.command();
    if command.is_empty() {
        print_hosts(source.hosts(), &mut io::stdout().lock())?;
        return Ok(0);
    }

    validate_command_args(command)?;
    let task = ssh_task(
        ProcessCommandRunner,
        config.ssh_bin.clone(),
        config.ssh_user.clone(),
        render_remote_command(command),
    )
    .annotate(HOSTS_ATTRIBUTE, source);
    let report = execute(&task)?;
    summarise(&report, &mut io::stderr().lock())?;

    Ok(if report.succeeded() { 0 } else { 1 })
}

fn host_source<C>(
    connector: C,
    region: Region,
    attribute: HostnameAttribute,
    target: &Target,
) -> Result<Rc<dyn HostSource>, CliError>
where
    C: Connector + Clone + 'static,
{
    let source: Rc<dyn HostSource> = match target {
        Target::Group(args) => {
            Rc::new(GroupHosts::new(connector, region, args.name.as_str()).attribute(attribute))
        }
        Target::Stack(args) => Rc::new(
            StackHosts::new(
                connector,
                region,
                args.stack.as_str(),
                args.logical_id.as_str(),
            )
            .attribute(attribute),
        ),
        Target::Query(args) => Rc::new(
            InstanceQueryHosts::new(connector, region, instance_query(args)?).attribute(attribute),
        ),
    };
    Ok(source)
}

fn instance_query(args: &QueryArgs) -> Result<InstanceQuery, CliError> {
    let mut query = if args.instance_ids.is_empty() {
        InstanceQuery::default()
    } else {
        InstanceQuery::by_ids(args.instance_ids.iter().map(|id| InstanceId::from(id.as_str())))
    };
    for raw in &args.filters {
        query = query.filter(raw.parse()?);
    }
    Ok(query)
}

fn print_hosts(hosts: Hosts, out: &mut impl Write) -> Result<(), CliError> {
    for host in hosts {
        writeln!(out, "{}", host?)?;
    }
    Ok(())
}

/// Builds a task that runs `remote` on each host through the SSH client.
fn ssh_task<R>(
    runner: R,
    ssh_bin: String,
    user: Option<String>,
    remote: String,
) -> FnTask<impl Fn(&Host) -> Result<(), TaskError>>
where
    R: CommandRunner,
{
    FnTask::new(remote.clone(), move |host: &Host| {
        let args = ssh_args(user.as_deref(), host, &remote);
        let output = runner
            .run(&ssh_bin, &args)
            .map_err(|err| TaskError::new(err.to_string()))?;
        relay_output(host, &output.stdout, &mut io::stdout().lock());
        relay_output(host, &output.stderr, &mut io::stderr().lock());
        if output.is_success() {
            Ok(())
        } else {
            Err(TaskError::new(format!(
                "{ssh_bin} exited with status {}",
                output.status_text()
            )))
        }
    })
}

fn ssh_args(user: Option<&str>, host: &Host, remote: &str) -> Vec<OsString> {
    let destination = user.map_or_else(|| host.to_string(), |login| format!("{login}@{host}"));
    vec![
        OsString::from("--"),
        OsString::from(destination),
        OsString::from(remote),
    ]
}

fn relay_output(host: &Host, text: &str, target: &mut impl Write) {
    for line in text.lines() {
        writeln!(target, "[{host}] {line}").ok();
    }
}

fn summarise(report: &DispatchReport, out: &mut impl Write) -> io::Result<()> {
    for outcome in report.failures() {
        if let Err(err) = &outcome.result {
            writeln!(out, "{}: {err}", outcome.host)?;
        }
    }
    if !report.succeeded() {
        writeln!(
            out,
            "{} of {} hosts failed",
            report.failures().count(),
            report.outcomes.len()
        )?;
    }
    Ok(())
}

fn render_remote_command(args: &[String]) -> String {
    args.iter()
        .map(|arg| escape(arg.as_str().into()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn validate_command_args(args: &[String]) -> Result<(), CliError> {
    if args.iter().any(|arg| arg.chars().any(|ch| ch.is_ascii_control())) {
        return Err(CliError::InvalidCommand(String::from(concat!(
            "command arguments must not contain control characters (ASCII ",
            "0x00-0x1F or 0x7F, e.g. newline, carriage return, tab, NUL)"
        ))));
    }
    Ok(())
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
