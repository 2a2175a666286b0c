use std::io::{BufRead, IsTerminal, Write};
use std::time::Duration;

use clap::{ArgGroup, Args, Subcommand, ValueEnum};
use nodemgr_client::{
    Channel, Client, ClientConfig, Endpoint, FramedChannel, ReplyPolicy, Service, ZmqChannel,
};
use tracing::debug;

use crate::exit::{client_error, CliError, CliResult, FAILURE, USAGE};
use crate::output::OutputFormat;

pub mod config;
pub mod monitor;
pub mod subscribers;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read or change a service configuration parameter.
    Config(ConfigArgs),
    /// Query a service's version.
    Version(VersionArgs),
    /// Show OpenBTS channel loads, queue sizes and noise levels.
    Monitor,
    /// Manage the SIPAuthServe subscriber registry.
    Subscribers(SubscribersArgs),
}

pub fn run(command: Command, session: &Session) -> CliResult<i32> {
    match command {
        Command::Config(args) => config::run(args, session),
        Command::Version(args) => version::run(args, session),
        Command::Monitor => monitor::run(session),
        Command::Subscribers(args) => subscribers::run(args, session),
    }
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Target service (openbts, sipauthserve, smqueue).
    pub service: Service,
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Read a parameter.
    Read { key: String },
    /// Set a parameter.
    Update {
        key: String,
        value: String,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Create a parameter (not exposed by the services).
    Create { key: String, value: String },
    /// Delete a parameter (not exposed by the services).
    Delete { key: String },
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Target service (openbts, sipauthserve, smqueue).
    pub service: Service,
}

#[derive(Args, Debug)]
pub struct SubscribersArgs {
    #[command(subcommand)]
    pub action: SubscribersAction,
}

#[derive(Subcommand, Debug)]
pub enum SubscribersAction {
    /// List registered subscribers.
    List,
    /// Register a subscriber.
    Create(CreateSubscriberArgs),
    /// Remove a subscriber by IMSI or MSISDN.
    Delete(DeleteSubscriberArgs),
}

#[derive(Args, Debug)]
pub struct CreateSubscriberArgs {
    pub name: String,
    pub imsi: String,
    pub msisdn: String,
    /// Authentication key. Without it the registry uses cache auth.
    #[arg(long, value_name = "HEX")]
    pub ki: Option<String>,
    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("selector").required(true).args(["imsi", "msisdn"])))]
pub struct DeleteSubscriberArgs {
    #[arg(long)]
    pub imsi: Option<String>,
    #[arg(long)]
    pub msisdn: Option<String>,
    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// How requests reach the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// ZeroMQ REQ socket, as NodeManager services listen.
    #[default]
    Zmq,
    /// Length-prefixed frames over a plain TCP or Unix stream.
    Framed,
}

/// Settings shared by every command invocation.
#[derive(Debug)]
pub struct Session {
    pub endpoint: Option<Endpoint>,
    pub transport: Transport,
    pub config: ClientConfig,
    pub format: OutputFormat,
}

impl Session {
    pub fn new(
        endpoint: Option<Endpoint>,
        timeout: &str,
        accept_not_modified: bool,
        format: OutputFormat,
    ) -> CliResult<Self> {
        let mut reply_policy = ReplyPolicy::default();
        if accept_not_modified {
            reply_policy = reply_policy.with_not_modified();
        }
        Ok(Self {
            endpoint,
            transport: Transport::default(),
            config: ClientConfig {
                timeout: parse_duration(timeout)?,
                reply_policy,
                ..ClientConfig::default()
            },
            format,
        })
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Connect to `service` at `--endpoint`, or its default local endpoint.
    pub fn connect(&self, service: Service) -> CliResult<Client<Box<dyn Channel>>> {
        let endpoint = self
            .endpoint
            .clone()
            .unwrap_or_else(|| service.default_endpoint());
        let opened = match self.transport {
            Transport::Zmq => ZmqChannel::open(&endpoint, &self.config)
                .map(|channel| Box::new(channel) as Box<dyn Channel>),
            Transport::Framed => FramedChannel::open(&endpoint, &self.config)
                .map(|channel| Box::new(channel) as Box<dyn Channel>),
        };
        let channel = opened
            .map_err(|err| client_error(&format!("connect to {service} at {endpoint} failed"), err))?;
        debug!(%service, %endpoint, transport = ?self.transport, "client ready");
        Ok(Client::with_config(channel, service, self.config.clone()))
    }
}

/// Ask before a mutating request. Non-interactive callers must pass `--yes`.
pub fn confirm(prompt: &str, yes: bool) -> CliResult<()> {
    if yes {
        return Ok(());
    }
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return Err(CliError::new(
            USAGE,
            "refusing to change a service without confirmation; pass --yes",
        ));
    }
    confirm_with(prompt, &mut stdin.lock(), &mut std::io::stderr())
}

fn confirm_with(prompt: &str, input: &mut impl BufRead, out: &mut impl Write) -> CliResult<()> {
    let _ = write!(out, "{prompt} [y/N] ");
    let _ = out.flush();

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|err| crate::exit::io_error("failed reading confirmation", err))?;

    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Ok(()),
        _ => Err(CliError::new(FAILURE, "aborted")),
    }
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(match unit {
        "ms" => Duration::from_millis(value),
        _ => Duration::from_secs(value),
    })
}
