use std::io::Write;

use anyhow::Context;
use clap::Args;
use paywise_sdk::{PayWiseClient, RegisterRequest};

use super::password_or_prompt;
use crate::output;

#[derive(Args)]
pub struct LoginArgs {
    #[arg(short = 'e', long)]
    email: String,
    /// Read from stdin when omitted.
    #[arg(short = 'p', long)]
    password: Option<String>,
}

impl LoginArgs {
    pub async fn run(&self, client: &PayWiseClient, out: &mut impl Write) -> anyhow::Result<()> {
        let password = password_or_prompt(self.password.as_deref())?;
        let session = client
            .auth()
            .login(&self.email, &password)
            .await
            .context("login failed")?;
        write!(out, "Signed in as ")?;
        output::user(out, &session.user)?;
        Ok(())
    }
}

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(short = 'e', long)]
    email: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    /// Read from stdin when omitted.
    #[arg(short = 'p', long)]
    password: Option<String>,
    /// Accept the PayWise terms of service.
    #[arg(long)]
    accept_terms: bool,
}

impl RegisterArgs {
    pub async fn run(&self, client: &PayWiseClient, out: &mut impl Write) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.accept_terms,
            "registration requires --accept-terms"
        );
        let password = password_or_prompt(self.password.as_deref())?;
        let request = RegisterRequest {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            confirm_password: password.clone(),
            password,
            agree_to_terms: true,
        };
        let session = client
            .auth()
            .register(&request)
            .await
            .context("registration failed")?;
        write!(out, "Welcome, ")?;
        output::user(out, &session.user)?;
        Ok(())
    }
}

#[derive(Args)]
pub struct WhoamiArgs {
    /// Ask the server instead of reading the cached profile.
    #[arg(long)]
    remote: bool,
}

impl WhoamiArgs {
    pub async fn run(&self, client: &PayWiseClient, out: &mut impl Write) -> anyhow::Result<()> {
        let auth = client.auth();
        let user = if self.remote {
            Some(auth.profile().await?)
        } else {
            auth.current_user().await?
        };
        match user {
            Some(user) => output::user(out, &user)?,
            None => writeln!(out, "Not logged in.")?,
        }
        Ok(())
    }
}

pub async fn logout(client: &PayWiseClient, out: &mut impl Write) -> anyhow::Result<()> {
    client.auth().logout().await?;
    writeln!(out, "Logged out.")?;
    Ok(())
}
