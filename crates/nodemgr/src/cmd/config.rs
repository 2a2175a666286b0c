use nodemgr_client::{ops, Action};
use tracing::info;

use crate::cmd::{confirm, ConfigAction, ConfigArgs, Session};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::print_reply;

pub fn run(args: ConfigArgs, session: &Session) -> CliResult<i32> {
    let service = args.service;

    // Everything that can fail locally fails before a connection is opened.
    match &args.action {
        ConfigAction::Update { key, value, yes } => {
            confirm(&format!("Set {key} = {value} on {service}?"), *yes)?;
        }
        ConfigAction::Create { key, .. } => {
            ops::check_config_action(service, Action::Create)
                .map_err(|err| client_error(&format!("creating {key} failed"), err))?;
        }
        ConfigAction::Delete { key } => {
            ops::check_config_action(service, Action::Delete)
                .map_err(|err| client_error(&format!("deleting {key} failed"), err))?;
        }
        ConfigAction::Read { .. } => {}
    }

    let mut client = session.connect(service)?;
    let reply = match &args.action {
        ConfigAction::Read { key } => ops::read_config(&mut client, key)
            .map_err(|err| client_error(&format!("reading {key} failed"), err))?,
        ConfigAction::Update { key, value, .. } => {
            let reply = ops::update_config(&mut client, key, value)
                .map_err(|err| client_error(&format!("updating {key} failed"), err))?;
            info!(%service, key = %key, dirty = reply.dirty, "parameter updated");
            reply
        }
        ConfigAction::Create { key, value } => ops::create_config(&mut client, key, value)
            .map_err(|err| client_error(&format!("creating {key} failed"), err))?,
        ConfigAction::Delete { key } => ops::delete_config(&mut client, key)
            .map_err(|err| client_error(&format!("deleting {key} failed"), err))?,
    };

    print_reply(service, "config", &reply, session.format);
    Ok(SUCCESS)
}
