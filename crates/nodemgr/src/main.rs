mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use nodemgr_client::Endpoint;

use crate::cmd::{Command, Session, Transport};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "nodemgr",
    version,
    about = "Manage OpenBTS, SIPAuthServe and SMQueue through their NodeManager endpoints"
)]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Service endpoint (tcp://host:port, ipc:///path or a socket path).
    /// Defaults to the service's local port.
    #[arg(long, value_name = "ENDPOINT", env = "NODEMGR_ENDPOINT", global = true)]
    endpoint: Option<Endpoint>,

    /// How requests reach the service: zmq for NodeManager's ZeroMQ port,
    /// framed for length-prefixed frames over a plain stream.
    #[arg(long, value_name = "TRANSPORT", env = "NODEMGR_TRANSPORT", default_value = "zmq", global = true)]
    transport: Transport,

    /// Bound on each request/reply round trip (e.g. 10s, 500ms).
    #[arg(long, value_name = "DURATION", env = "NODEMGR_TIMEOUT", default_value = "10s", global = true)]
    timeout: String,

    /// Treat 304 (not modified) replies as success.
    #[arg(long, global = true)]
    accept_not_modified: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = Session::new(cli.endpoint, &cli.timeout, cli.accept_not_modified, format)
        .map(|session| session.with_transport(cli.transport))
        .and_then(|session| cmd::run(cli.command, &session));

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use nodemgr_client::Service;

    use super::*;
    use crate::cmd::{ConfigAction, SubscribersAction};

    #[test]
    fn parses_config_read() {
        let cli = Cli::try_parse_from(["nodemgr", "config", "openbts", "read", "Control.NumSQLTries"])
            .expect("config read should parse");

        match cli.command {
            Command::Config(args) => {
                assert_eq!(args.service, Service::OpenBts);
                assert!(matches!(args.action, ConfigAction::Read { ref key } if key == "Control.NumSQLTries"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_connection_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "nodemgr",
            "version",
            "smqueue",
            "--endpoint",
            "tcp://10.0.0.5:45063",
            "--timeout",
            "500ms",
            "--accept-not-modified",
        ])
        .expect("global flags should parse");

        assert_eq!(cli.endpoint, Some(Endpoint::tcp("10.0.0.5", 45063)));
        assert_eq!(cli.timeout, "500ms");
        assert!(cli.accept_not_modified);
        assert_eq!(cli.transport, Transport::Zmq);
    }

    #[test]
    fn transport_selects_framed_streams() {
        let cli = Cli::try_parse_from(["nodemgr", "monitor", "--transport", "framed"])
            .expect("transport should parse");
        assert_eq!(cli.transport, Transport::Framed);

        let err = Cli::try_parse_from(["nodemgr", "monitor", "--transport", "http"])
            .expect_err("unknown transport should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn rejects_unknown_service() {
        let err = Cli::try_parse_from(["nodemgr", "version", "asterisk"])
            .expect_err("unknown service should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn subscriber_delete_needs_exactly_one_selector() {
        let err = Cli::try_parse_from(["nodemgr", "subscribers", "delete"])
            .expect_err("missing selector should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let err = Cli::try_parse_from([
            "nodemgr",
            "subscribers",
            "delete",
            "--imsi",
            "001010000000001",
            "--msisdn",
            "5551234",
        ])
        .expect_err("two selectors should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);

        let cli = Cli::try_parse_from(["nodemgr", "subscribers", "delete", "--msisdn", "5551234"])
            .expect("single selector should parse");
        match cli.command {
            Command::Subscribers(args) => {
                assert!(matches!(args.action, SubscribersAction::Delete(_)));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn subscriber_create_takes_optional_ki() {
        let cli = Cli::try_parse_from([
            "nodemgr",
            "subscribers",
            "create",
            "ada",
            "001010000000001",
            "5550001",
            "--ki",
            "00112233445566778899aabbccddeeff",
            "--yes",
        ])
        .expect("create should parse");
        match cli.command {
            Command::Subscribers(args) => match args.action {
                SubscribersAction::Create(create) => {
                    assert_eq!(create.ki.as_deref(), Some("00112233445566778899aabbccddeeff"));
                    assert!(create.yes);
                }
                other => panic!("unexpected action: {other:?}"),
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
