use nodemgr_client::ops::{self, NewSubscriber, SubscriberMatch};
use nodemgr_client::Service;
use tracing::info;

use crate::cmd::{confirm, DeleteSubscriberArgs, Session, SubscribersAction, SubscribersArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::print_reply;

const SERVICE: Service = Service::SipAuthServe;

pub fn run(args: SubscribersArgs, session: &Session) -> CliResult<i32> {
    let reply = match args.action {
        SubscribersAction::List => {
            let mut client = session.connect(SERVICE)?;
            ops::get_subscribers(&mut client)
                .map_err(|err| client_error("listing subscribers failed", err))?
        }
        SubscribersAction::Create(create) => {
            let mut subscriber = NewSubscriber::new(create.name, create.imsi, create.msisdn);
            if let Some(ki) = create.ki {
                subscriber = subscriber.with_ki(ki);
            }
            confirm(
                &format!(
                    "Register {} (IMSI {}, MSISDN {})?",
                    subscriber.name, subscriber.imsi, subscriber.msisdn
                ),
                create.yes,
            )?;
            let mut client = session.connect(SERVICE)?;
            let reply = ops::create_subscriber(&mut client, &subscriber)
                .map_err(|err| client_error("registering subscriber failed", err))?;
            info!(imsi = %subscriber.imsi, full_auth = subscriber.ki.is_some(), "subscriber registered");
            reply
        }
        SubscribersAction::Delete(delete) => {
            let yes = delete.yes;
            let selector = selector(delete)?;
            confirm(&format!("Remove subscriber {selector}?"), yes)?;
            let mut client = session.connect(SERVICE)?;
            let reply = ops::delete_subscriber(&mut client, &selector)
                .map_err(|err| client_error(&format!("removing {selector} failed"), err))?;
            info!(%selector, "subscriber removed");
            reply
        }
    };

    print_reply(SERVICE, "subscribers", &reply, session.format);
    Ok(SUCCESS)
}

fn selector(args: DeleteSubscriberArgs) -> CliResult<SubscriberMatch> {
    match (args.imsi, args.msisdn) {
        (Some(imsi), None) => Ok(SubscriberMatch::Imsi(imsi)),
        (None, Some(msisdn)) => Ok(SubscriberMatch::Msisdn(msisdn)),
        _ => Err(CliError::new(USAGE, "exactly one of --imsi or --msisdn is required")),
    }
}
