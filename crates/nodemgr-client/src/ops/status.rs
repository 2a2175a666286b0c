use nodemgr_envelope::{encode, Action, Reply, MONITOR, VERSION};

use crate::channel::Channel;
use crate::client::Client;
use crate::error::Result;
use crate::service::Capability;

/// Query the service version.
pub fn get_version<C: Channel>(client: &mut Client<C>) -> Result<Reply> {
    client.require(Capability::Version, "version")?;
    client.call(&encode(VERSION, Action::Empty, "", ""))
}

/// Channel loads, queue sizes and noise levels. OpenBTS only.
pub fn monitor<C: Channel>(client: &mut Client<C>) -> Result<Reply> {
    client.require(Capability::Monitor, "monitor")?;
    client.call(&encode(MONITOR, Action::Empty, "", ""))
}
