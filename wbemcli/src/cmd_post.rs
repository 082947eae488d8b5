/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use http::Method;

use wbem_auth::AuthModule;
use wbem_client::{ClientConfig, WbemClient};
use wbem_http::HeaderBag;
use wbem_types::auth::{Password, Username};

pub(super) const COMMAND: &str = "post";

const COMMAND_ARG_URL: &str = "url";
const COMMAND_ARG_FILE: &str = "file";
const COMMAND_ARG_HEADER: &str = "header";
const COMMAND_ARG_METHOD: &str = "method";
const COMMAND_ARG_USERNAME: &str = "username";
const COMMAND_ARG_PASSWORD: &str = "password";
const COMMAND_ARG_AUTH: &str = "auth";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Send one CIM-XML request and print the response")
        .arg(
            Arg::new(COMMAND_ARG_URL)
                .help("Target url, e.g. https://cimom.example.net:5989/cimom")
                .value_name("URL")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_FILE)
                .help("Read the request body from this file, stdin is used if not set")
                .value_name("FILE")
                .num_args(1)
                .long("file")
                .short('f')
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(COMMAND_ARG_HEADER)
                .help("Extra request header in 'name: value' form")
                .value_name("HEADER")
                .num_args(1)
                .long("header")
                .short('H')
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new(COMMAND_ARG_METHOD)
                .help("Request method")
                .value_name("METHOD")
                .num_args(1)
                .long("method")
                .short('X')
                .value_parser(["POST", "M-POST"])
                .default_value("POST"),
        )
        .arg(
            Arg::new(COMMAND_ARG_USERNAME)
                .help("Username")
                .value_name("USERNAME")
                .num_args(1)
                .short('u'),
        )
        .arg(
            Arg::new(COMMAND_ARG_PASSWORD)
                .help("Password")
                .value_name("PASSWORD")
                .num_args(1)
                .short('p')
                .requires(COMMAND_ARG_USERNAME),
        )
        .arg(
            Arg::new(COMMAND_ARG_AUTH)
                .help("Authentication module")
                .value_name("MODULE")
                .num_args(1)
                .long("auth")
                .value_parser(["basic", "digest", "local"]),
        )
}

fn parse_header(headers: &mut HeaderBag, s: &str) -> anyhow::Result<()> {
    let Some((name, value)) = s.split_once(':') else {
        return Err(anyhow!("no ':' found in header {s}"));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("empty header name in {s}"));
    }
    headers.insert(name, value.trim());
    Ok(())
}

fn build_headers(args: &ArgMatches) -> anyhow::Result<HeaderBag> {
    let mut headers = HeaderBag::new();
    headers.insert("Content-Type", "application/xml; charset=utf-8");
    if let Some(values) = args.get_many::<String>(COMMAND_ARG_HEADER) {
        for s in values {
            parse_header(&mut headers, s)?;
        }
    }
    Ok(headers)
}

fn read_body(args: &ArgMatches) -> anyhow::Result<Vec<u8>> {
    match args.get_one::<PathBuf>(COMMAND_ARG_FILE) {
        Some(path) => std::fs::read(path)
            .map_err(|e| anyhow!("failed to read file {}: {e}", path.display())),
        None => {
            let mut body = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut body)
                .context("failed to read body from stdin")?;
            Ok(body)
        }
    }
}

fn apply_args(config: &mut ClientConfig, args: &ArgMatches) -> anyhow::Result<()> {
    if let Some(module) = args.get_one::<String>(COMMAND_ARG_AUTH) {
        let module = AuthModule::from_str(module).map_err(|e| anyhow!("{e}"))?;
        config.set_auth_module(module);
    }
    if let Some(username) = args.get_one::<String>(COMMAND_ARG_USERNAME) {
        let username = Username::from_original(username).context("invalid username")?;
        let password = match args.get_one::<String>(COMMAND_ARG_PASSWORD) {
            Some(s) => Password::from_original(s).context("invalid password")?,
            None => Password::empty(),
        };
        config.set_credentials(username, password);
    }
    Ok(())
}

pub(super) fn run(mut config: ClientConfig, args: &ArgMatches) -> anyhow::Result<()> {
    apply_args(&mut config, args)?;

    let url = args
        .get_one::<String>(COMMAND_ARG_URL)
        .ok_or_else(|| anyhow!("no url set"))?;
    let method = args
        .get_one::<String>(COMMAND_ARG_METHOD)
        .map(|s| Method::from_bytes(s.as_bytes()))
        .transpose()
        .map_err(|e| anyhow!("invalid method: {e}"))?
        .unwrap_or(Method::POST);
    let headers = build_headers(args)?;
    let body = read_body(args)?;

    let client = WbemClient::new(url, &config)?;
    let mut rsp = client.submit(&method, &headers, &body)?;

    println!("{:?} {} {}", rsp.version, rsp.code, rsp.reason);
    for (name, value) in rsp.headers.iter() {
        println!("{name}: {value}");
    }
    println!();

    let content = rsp
        .body
        .read_to_vec()
        .context("failed to read response body")?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(&content)?;
    if !content.ends_with(b"\n") {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;

    client.close();
    if (200..300).contains(&rsp.code) {
        Ok(())
    } else {
        Err(anyhow!("server returned {} {}", rsp.code, rsp.reason))
    }
}
