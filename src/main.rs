// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use schedule_planner_client::api::ApiClient;
use schedule_planner_client::config::ClientConfig;
use schedule_planner_client::http::Transport;
use schedule_planner_client::models::LoginRequest;
use schedule_planner_client::{logging, ClientError};
use tracing::{error, info};

const USAGE: &str = "usage: schedule-client [status | login <phone-or-email> <password> | orgs | logout]";

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    info!(
        api_base_url = %config.api_base_url,
        dev_mode = config.environment.should_mock(),
        convention = %config.success_convention,
        "Schedule planner client starting"
    );

    let client = match ApiClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to initialize client");
            return ExitCode::FAILURE;
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let result = match args.as_slice() {
        [] | ["status"] => status(&client),
        ["login", account, password] => login(&client, account, password).await,
        ["orgs"] => orgs(&client).await,
        ["logout"] => client.logout().await,
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn status<T: Transport>(client: &ApiClient<T>) -> Result<(), ClientError> {
    if client.is_authenticated() {
        println!("logged in");
    } else {
        println!("not logged in");
    }
    Ok(())
}

async fn login<T: Transport>(
    client: &ApiClient<T>,
    account: &str,
    password: &str,
) -> Result<(), ClientError> {
    let profile = client
        .login(&LoginRequest::from_account(account, password))
        .await?;
    println!("logged in as {}", profile.nickname);
    Ok(())
}

async fn orgs<T: Transport>(client: &ApiClient<T>) -> Result<(), ClientError> {
    for org in client.user_orgs().await? {
        println!("{}\t{}\t{} members", org.id.0, org.name, org.members);
    }
    Ok(())
}
