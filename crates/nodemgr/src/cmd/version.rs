use nodemgr_client::ops;

use crate::cmd::{Session, VersionArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::print_reply;

pub fn run(args: VersionArgs, session: &Session) -> CliResult<i32> {
    let mut client = session.connect(args.service)?;
    let reply = ops::get_version(&mut client)
        .map_err(|err| client_error("version query failed", err))?;
    print_reply(args.service, "version", &reply, session.format);
    Ok(SUCCESS)
}
