use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use fitlog::{
    credentials::{Session, UserProfile},
    models::DATE_FMT,
    remote::ProfileUpdate,
};

use crate::{
    cli::AuthCmd,
    commands::{Env, emit},
};

fn prompt_password() -> Result<String> {
    print!("password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("could not read password from stdin")?;
    let pw = line.trim_end_matches(['\r', '\n']).to_string();
    if pw.is_empty() {
        bail!("password must not be empty");
    }
    Ok(pw)
}

fn print_profile(p: &UserProfile) {
    let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
    println!("{} {} (id {})", "user:".cyan().bold(), p.username.bold(), p.id);
    println!("  birth date  {}", or_dash(p.birth_date.clone()));
    println!("  height      {}", or_dash(p.height.map(|h| format!("{h} cm"))));
    println!("  weight      {}", or_dash(p.weight.map(|w| format!("{w} kg"))));
}

pub async fn handle(cmd: AuthCmd, env: &Env) -> Result<()> {
    let creds = env.credentials()?;

    match cmd {
        AuthCmd::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };
            let api = env.anonymous_api()?;
            let token = api.login(&username, &password).await?;
            let user = api.with_token(token.clone()).me().await?;
            creds.save(&Session { token, user: user.clone() })?;
            println!("{} logged in as {}", "ok:".green().bold(), user.username.green());
        }

        AuthCmd::Register { username, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };
            env.anonymous_api()?.register(&username, &password).await?;
            println!(
                "{} account {} created, now run `fitlog auth login {}`",
                "ok:".green().bold(),
                username.green(),
                username
            );
        }

        AuthCmd::Logout => {
            creds.clear()?;
            println!("{} logged out", "info:".blue().bold());
        }

        AuthCmd::Status => match creds.load()? {
            Some(session) => emit(env.fmt, &session.user, || print_profile(&session.user))?,
            None => println!("{} not logged in", "info:".blue().bold()),
        },

        AuthCmd::Profile { birth_date, height, weight } => {
            let api = env.api()?;

            if birth_date.is_some() || height.is_some() || weight.is_some() {
                let current = creds.require()?.user;
                let mut update = ProfileUpdate::from(&current);
                if let Some(d) = birth_date {
                    update.birth_date = Some(d.format(DATE_FMT).to_string());
                }
                if height.is_some() {
                    update.height = height;
                }
                if weight.is_some() {
                    update.weight = weight;
                }
                api.update_profile(&update).await?;
                println!("{} profile updated", "ok:".green().bold());
            }

            let fresh = api.me().await?;
            creds.update_user(&fresh)?;
            emit(env.fmt, &fresh, || print_profile(&fresh))?;
        }
    }

    Ok(())
}
