use std::ffi::OsString;

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand, ValueEnum};
use tabled::Table;

use crate::{
    control_plane::{Addressing, ControlPlaneTarget, ValidatedTarget},
    data::target::TargetInfo,
    error::Error,
    rpc,
    trace::{prepare_tracing, TraceConfig},
};

#[derive(Parser, Debug)]
#[command(name = "xdsctl", author, version, about = "Resolve the xDS control plane endpoint", long_about = None)]
pub struct Cmd {
    #[arg(
        short,
        long,
        global = true,
        required = false,
        default_value = "info",
        help = "Log level(trace, debug, info, warn, error)"
    )]
    pub level: String,

    #[arg(
        value_enum,
        short = 'd',
        long,
        global = true,
        required = false,
        default_value = "plain",
        help = "Log display format"
    )]
    pub format: Format,

    #[arg(long = "log-file", global = true, help = "Log output file path")]
    pub log_file: Option<String>,

    #[arg(
        value_enum,
        short = 'o',
        long,
        global = true,
        required = false,
        default_value = "plain",
        help = "Output format"
    )]
    pub output: Output,

    #[clap(subcommand)]
    pub sub: SubCmd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Plain,
    Json,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Plain => write!(f, "plain"),
            Format::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Output {
    Plain,
    Json,
}

#[derive(Debug, Clone, Subcommand)]
pub enum SubCmd {
    /// Show the resolved control plane target
    Target(TargetCmd),
    /// Show the version
    Version,
}

#[derive(Debug, Clone, Parser)]
pub struct TargetCmd {
    #[arg(long, help = "Fail unless --xds-address or --xds-label is given")]
    pub require_address: bool,
}

/// Parsed command line: the subcommand plus the control plane options it inherited.
#[derive(Debug)]
pub struct Invocation {
    pub cmd: Cmd,
    pub target: ControlPlaneTarget,
}

pub fn command() -> clap::Command {
    let mut cmd = Cmd::command();
    ControlPlaneTarget::register_flags(&mut cmd);
    cmd
}

pub fn parse_from<I, T>(args: I) -> Result<Invocation, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;
    let cmd = Cmd::from_arg_matches(&matches)?;
    let target = ControlPlaneTarget::from_flags(innermost(&matches))?;
    Ok(Invocation { cmd, target })
}

fn innermost(matches: &ArgMatches) -> &ArgMatches {
    match matches.subcommand() {
        Some((_, sub)) => innermost(sub),
        None => matches,
    }
}

pub fn run() -> Result<(), Error> {
    let Invocation { cmd, target } = parse_from(std::env::args_os())?;

    prepare_tracing(TraceConfig {
        level: cmd.level,
        format: cmd.format.to_string(),
        file: cmd.log_file,
    })?;

    match cmd.sub {
        SubCmd::Version => println!("{}", env!("CARGO_PKG_VERSION")),
        SubCmd::Target(t) => {
            let target = resolve(&target, t.require_address)?;
            println!("{}", render(&target, cmd.output)?);
        }
    }
    Ok(())
}

pub fn resolve(target: &ControlPlaneTarget, require_address: bool) -> Result<ValidatedTarget, Error> {
    let validated = target.validate()?;
    match validated.addressing() {
        Addressing::Undetermined if require_address => return Err(Error::UndeterminedTarget),
        Addressing::Direct(addr) => tracing::debug!(address = addr, "use direct xDS address"),
        Addressing::PodLabel(selector) => {
            tracing::debug!(selector = selector, port = validated.port(), "discover xDS pod by label")
        }
        Addressing::Undetermined => tracing::debug!("xDS target is undetermined"),
    }
    Ok(validated)
}

pub fn render(target: &ValidatedTarget, output: Output) -> Result<String, Error> {
    let mut info = TargetInfo::from(target);
    if let Addressing::Direct(_) = target.addressing() {
        info.endpoint = rpc::endpoint(target)?.uri().to_string();
    }

    match output {
        Output::Json => serde_json::to_string_pretty(&info).map_err(Error::Serialize),
        Output::Plain => Ok(Table::new(vec![info]).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_defaults() {
        let inv = parse_from(["xdsctl", "target"]).unwrap();
        assert_eq!(inv.target, ControlPlaneTarget::default());
        assert_eq!(inv.cmd.output, Output::Plain);
        assert!(matches!(inv.cmd.sub, SubCmd::Target(TargetCmd { require_address: false })));
    }

    #[test]
    fn parse_flags_before_and_after_subcommand() {
        let inv = parse_from([
            "xdsctl",
            "--xds-address",
            "localhost:15010",
            "target",
            "--timeout",
            "5s",
            "--cert-dir",
            "/etc/certs",
            "-o",
            "json",
        ])
        .unwrap();
        assert_eq!(inv.target.address, "localhost:15010");
        assert_eq!(inv.target.timeout, Duration::from_secs(5));
        assert_eq!(inv.target.cert_dir, "/etc/certs");
        assert_eq!(inv.target.port, 15012);
        assert_eq!(inv.cmd.output, Output::Json);
    }

    #[test]
    fn parse_rejects_invalid_port() {
        match parse_from(["xdsctl", "target", "--xds-port", "70000"]) {
            Err(Error::InvalidFlag { name, .. }) => assert_eq!(name, "xds-port"),
            other => panic!("this test should not be pass here: {:?}", other),
        }
        assert!(matches!(
            parse_from(["xdsctl", "target", "--xds-port", "port"]),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn resolve_conflicting_target() {
        let inv = parse_from([
            "xdsctl",
            "target",
            "--xds-address",
            "localhost:15010",
            "--xds-label",
            "app=istiod",
        ])
        .unwrap();
        let err = resolve(&inv.target, false).unwrap_err();
        assert!(matches!(err, Error::ConflictingTarget));
        assert_eq!(err.to_string(), "either --xds-address or --xds-label, not both");
    }

    #[test]
    fn resolve_undetermined_target() {
        let target = ControlPlaneTarget::default();
        assert!(resolve(&target, false).is_ok());
        assert!(matches!(
            resolve(&target, true),
            Err(Error::UndeterminedTarget)
        ));
    }

    #[test]
    fn render_json_for_pod_label() {
        let target = ControlPlaneTarget {
            pod_label_selector: "app=istiod".to_string(),
            port: 15010,
            ..Default::default()
        }
        .validate()
        .unwrap();

        let out = render(&target, Output::Json).unwrap();
        let actual: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_json_eq!(
            actual,
            json!({
                "mode": "pod-label",
                "address": "",
                "podLabelSelector": "app=istiod",
                "port": 15010,
                "certDir": "",
                "timeout": "30s",
                "endpoint": "",
            })
        );
    }

    #[test]
    fn render_direct_target() {
        let target = ControlPlaneTarget {
            address: "istiod.istio-system".to_string(),
            ..Default::default()
        }
        .validate()
        .unwrap();

        let out = render(&target, Output::Json).unwrap();
        let actual: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(actual["mode"], "direct");
        assert_eq!(actual["address"], "istiod.istio-system:15012");
        assert!(actual["endpoint"]
            .as_str()
            .unwrap()
            .starts_with("http://istiod.istio-system:15012"));

        let plain = render(&target, Output::Plain).unwrap();
        assert!(plain.contains("direct"));
        assert!(plain.contains("istiod.istio-system:15012"));
    }
}
