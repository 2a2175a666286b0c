use nodemgr_client::{ops, Service};

use crate::cmd::Session;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::print_reply;

pub fn run(session: &Session) -> CliResult<i32> {
    let mut client = session.connect(Service::OpenBts)?;
    let reply =
        ops::monitor(&mut client).map_err(|err| client_error("monitor query failed", err))?;
    print_reply(Service::OpenBts, "monitor", &reply, session.format);
    Ok(SUCCESS)
}
