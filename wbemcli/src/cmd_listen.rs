/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, BufRead, Read, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use http::StatusCode;

use wbem_http::server::HttpServerRequest;
use wbem_listener::{ContentHandler, HandlerError, ListenerConfig, WbemListener};
use wbem_types::net::KeyStoreConfig;

pub(super) const COMMAND: &str = "listen";

const COMMAND_ARG_PORT: &str = "port";
const COMMAND_ARG_TLS: &str = "tls";
const COMMAND_ARG_KEYSTORE: &str = "keystore";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Run an indication listener until stdin is closed")
        .arg(
            Arg::new(COMMAND_ARG_PORT)
                .help("Listen port")
                .value_name("PORT")
                .num_args(1)
                .long("port")
                .value_parser(value_parser!(u16)),
        )
        .arg(
            Arg::new(COMMAND_ARG_TLS)
                .help("Enable TLS")
                .num_args(0)
                .long("tls")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(COMMAND_ARG_KEYSTORE)
                .help("PEM file with the server certificate chain and private key")
                .value_name("PEM FILE")
                .num_args(1)
                .long("keystore")
                .value_parser(value_parser!(PathBuf)),
        )
}

/// Find the value of the ID attribute of the MESSAGE element
fn message_id(body: &str) -> Option<&str> {
    let start = body.find("<MESSAGE")?;
    let element = &body[start..];
    let end = element.find('>')?;
    let attrs = &element[..end];
    let pos = attrs.find("ID=")?;
    let value = &attrs[pos + 3..];
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &value[1..];
    let len = value.find(quote)?;
    Some(&value[..len])
}

fn export_response(id: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <CIM CIMVERSION=\"2.0\" DTDVERSION=\"2.0\">\
         <MESSAGE ID=\"{id}\" PROTOCOLVERSION=\"1.0\">\
         <SIMPLEEXPRSP>\
         <EXPMETHODRESPONSE NAME=\"ExportIndication\">\
         <IRETURNVALUE/>\
         </EXPMETHODRESPONSE>\
         </SIMPLEEXPRSP>\
         </MESSAGE>\
         </CIM>\n"
    )
}

#[derive(Default)]
struct IndicationLogger {
    received: AtomicU64,
}

impl ContentHandler for IndicationLogger {
    fn handle(
        &self,
        request: &HttpServerRequest,
        reader: &mut dyn Read,
        writer: &mut dyn Write,
        peer: SocketAddr,
    ) -> Result<(), HandlerError> {
        let mut body = Vec::new();
        reader.read_to_end(&mut body)?;
        let body = String::from_utf8_lossy(&body);

        let Some(id) = message_id(&body) else {
            return Err(HandlerError::cim_error(
                StatusCode::BAD_REQUEST,
                "request-not-valid",
            ));
        };

        let n = self.received.fetch_add(1, Ordering::Relaxed) + 1;
        log::info!(
            "indication #{n} from {peer}: {} {} message {id}, {} bytes",
            request.method,
            request.uri,
            body.len()
        );
        println!("{body}");

        writer.write_all(export_response(id).as_bytes())?;
        Ok(())
    }
}

fn apply_args(config: &mut ListenerConfig, args: &ArgMatches) -> anyhow::Result<()> {
    if let Some(port) = args.get_one::<u16>(COMMAND_ARG_PORT) {
        config.set_port(*port);
    }
    if let Some(path) = args.get_one::<PathBuf>(COMMAND_ARG_KEYSTORE) {
        let mut builder = config.tls().cloned().unwrap_or_default();
        builder.set_keystore(KeyStoreConfig::new(path.clone()));
        config.set_tls(builder);
    }
    if args.get_flag(COMMAND_ARG_TLS) && config.tls().is_none() {
        return Err(anyhow!(
            "tls is enabled but neither --keystore nor a tls config section is set"
        ));
    }
    Ok(())
}

pub(super) fn run(mut config: ListenerConfig, args: &ArgMatches) -> anyhow::Result<()> {
    apply_args(&mut config, args)?;

    let handler = Arc::new(IndicationLogger::default());
    let listener = WbemListener::new(config);
    let handle = listener
        .start(handler.clone())
        .context("failed to start listener")?;
    eprintln!("listening on {}, close stdin to stop", handle.local_addr());

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "stats" => {
                let stats = handle.stats();
                eprintln!(
                    "workers: {} idle: {} busy: {} queued: {}",
                    stats.workers, stats.idle, stats.busy, stats.queued
                );
            }
            "q" | "quit" => break,
            _ => {}
        }
    }

    let clean = handle.shutdown();
    log::info!(
        "listener stopped after {} indications",
        handler.received.load(Ordering::Relaxed)
    );
    if clean {
        Ok(())
    } else {
        Err(anyhow!("some requests were still in flight at shutdown"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_message_id() {
        let body = r#"<?xml version="1.0"?><CIM CIMVERSION="2.0"><MESSAGE ID="1001" PROTOCOLVERSION="1.0"><SIMPLEEXPREQ/></MESSAGE></CIM>"#;
        assert_eq!(message_id(body), Some("1001"));

        let body = "<CIM><MESSAGE PROTOCOLVERSION='1.0' ID='abc'></MESSAGE></CIM>";
        assert_eq!(message_id(body), Some("abc"));

        assert_eq!(message_id("<CIM><MESSAGE></MESSAGE></CIM>"), None);
        assert_eq!(message_id("not xml"), None);
    }

    #[test]
    fn response_echoes_id() {
        let rsp = export_response("1001");
        assert!(rsp.contains(r#"<MESSAGE ID="1001" PROTOCOLVERSION="1.0">"#));
        assert!(rsp.contains("EXPMETHODRESPONSE"));
    }

    #[test]
    fn tls_requires_keystore() {
        let args = command()
            .try_get_matches_from(["listen", "--tls"])
            .unwrap();
        let mut config = ListenerConfig::default();
        assert!(apply_args(&mut config, &args).is_err());

        let args = command()
            .try_get_matches_from(["listen", "--tls", "--keystore", "/tmp/a.pem", "--port", "15990"])
            .unwrap();
        let mut config = ListenerConfig::default();
        apply_args(&mut config, &args).unwrap();
        assert!(config.tls().is_some());
        assert_eq!(config.bind().port(), 15990);
    }
}
