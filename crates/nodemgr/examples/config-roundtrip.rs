//! Read, update and re-read a live OpenBTS configuration parameter.
//!
//! This talks to a running OpenBTS over its ZeroMQ NodeManager port
//! (tcp://127.0.0.1:45060 by default) and changes a real value.
//!
//! Run with:
//!   cargo run --example config-roundtrip
//!
//! Point it elsewhere with NODEMGR_ENDPOINT (e.g. ipc:///tmp/openbts.sock).

use std::io::{self, BufRead, Write};

use nodemgr::client::{connect_with_config, ops, ClientConfig, Endpoint, Service};

const KEY: &str = "Control.NumSQLTries";
const NEW_VALUE: &str = "3";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("note: this must run against a live OpenBTS instance");
    eprintln!("warning: {KEY} will be changed on that instance");
    eprint!("\ncontinue? (y/n) ");
    io::stderr().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    if !answer.trim().eq_ignore_ascii_case("y") {
        std::process::exit(1);
    }

    let endpoint = match std::env::var("NODEMGR_ENDPOINT") {
        Ok(raw) => raw.parse::<Endpoint>()?,
        Err(_) => Service::OpenBts.default_endpoint(),
    };
    let mut openbts = connect_with_config(&endpoint, Service::OpenBts, ClientConfig::default())?;

    println!("reading {KEY:?}");
    let reply = ops::read_config(&mut openbts, KEY)?;
    println!("  value: {}", value_of(&reply));

    println!("updating {KEY:?} to {NEW_VALUE:?}");
    let reply = ops::update_config(&mut openbts, KEY, NEW_VALUE)?;
    println!("  reply code: {} (restart needed: {})", reply.code, reply.dirty);

    println!("reading {KEY:?}");
    let reply = ops::read_config(&mut openbts, KEY)?;
    println!("  value: {}", value_of(&reply));

    Ok(())
}

fn value_of(reply: &nodemgr::client::Reply) -> String {
    match reply.data_field("value") {
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => "<none>".to_string(),
    }
}
