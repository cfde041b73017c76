use anyhow::{Result, bail};
use colored::Colorize;
use fitlog::{FitnessRecord, NewRecord, Payload};

use crate::{
    cli::{AddArgs, LogCmd},
    commands::{Env, emit, today},
};

fn payload_from_args(args: &AddArgs) -> Result<Option<Payload>> {
    let payload = match (args.sets, args.reps, args.distance, args.minutes, args.seconds) {
        (Some(sets), Some(reps), None, None, None) => Some(Payload::Sets { sets, reps }),
        (None, None, Some(meters), None, None) => Some(Payload::Distance { meters }),
        (None, None, None, None, None) => None,
        (None, None, None, minutes, seconds) => Some(Payload::Time {
            minutes: minutes.unwrap_or(0),
            seconds: seconds.unwrap_or(0),
        }),
        _ => bail!("use only one of --sets/--reps, --distance or --minutes/--seconds"),
    };
    Ok(payload)
}

/// One listing line: the id, then the record as it displays.
fn record_line(r: &FitnessRecord) -> String {
    format!("  {}  {}", r.id.dimmed(), r)
}

pub fn print_record(r: &FitnessRecord) {
    println!("{}", record_line(r));
}

pub async fn handle(cmd: LogCmd, env: &Env) -> Result<()> {
    let mut source = env.source().await?;

    match cmd {
        LogCmd::Add(args) => {
            let new = NewRecord {
                date: args.date.unwrap_or_else(today),
                part: args.part,
                exercise: args.exercise.clone(),
                payload: payload_from_args(&args)?,
            };
            let created = source.create(new).await?;
            emit(env.fmt, &created, || {
                println!("{} record {} saved", "ok:".green().bold(), created.id);
                print_record(&created);
            })?;
        }

        LogCmd::List { from, to } => {
            let records = source.list(from, to).await?;
            emit(env.fmt, &records, || {
                if records.is_empty() {
                    println!("{}", "(no records)".dimmed());
                    return;
                }
                println!("{} ({})", "Records:".cyan().bold(), records.len());
                for r in &records {
                    print_record(r);
                }
            })?;
        }

        LogCmd::Delete { id } => {
            let removed = source.delete(&id).await?;
            if removed {
                println!("{} record {} deleted", "ok:".green().bold(), id);
            } else {
                println!("{} no record with id {}", "info:".blue().bold(), id);
            }
        }
    }

    Ok(())
}
