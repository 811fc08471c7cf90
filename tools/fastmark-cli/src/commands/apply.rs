//! Apply a watermark to a video.

use std::io::Write;
use std::time::Duration;

use fastmark_common::config::FastmarkConfig;
use fastmark_render_engine::{FfmpegEngine, JobControl, JobProgress, JobStage, ProgressCallback};

use crate::form::{self, AssumeYes, Confirm, FormFields, PromptConfirm};

pub async fn run(
    fields: FormFields,
    assume_yes: bool,
    timeout_secs: Option<u64>,
    dry_run: bool,
    config: &FastmarkConfig,
) -> anyhow::Result<()> {
    let mut confirm: Box<dyn Confirm> = if assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(PromptConfirm::new(std::io::stdin().lock(), std::io::stdout()))
    };

    let request = match form::prepare(&fields, confirm.as_mut()) {
        Ok(request) => request,
        Err(status) => {
            println!("{status}");
            return Ok(());
        }
    };
    drop(confirm);

    println!("{}", form::summary(&request));

    let engine = FfmpegEngine::from_config(&config.engine);

    if dry_run {
        let plan = match form::plan(&request, &engine) {
            Ok(plan) => plan,
            Err(status) => {
                println!("{status}");
                return Ok(());
            }
        };
        println!();
        println!("Encoder: {}", plan.encoder);
        println!("Filter graph: {}", plan.filter_graph);
        println!(
            "Command: {} {}",
            engine.ffmpeg_path().display(),
            plan.job
                .args
                .iter()
                .map(|a| shell_quote(a))
                .collect::<Vec<_>>()
                .join(" ")
        );
        return Ok(());
    }

    let timeout = match timeout_secs {
        Some(0) => anyhow::bail!("--timeout must be positive"),
        Some(secs) => Some(Duration::from_secs(secs)),
        None => config.job_timeout()?,
    };
    let control = JobControl::new().with_timeout(timeout);
    let job_control = control.clone();

    let progress_cb: ProgressCallback = Box::new(|p: JobProgress| {
        if p.stage == JobStage::Encoding {
            if p.fraction > 0.0 {
                print!(
                    "\r  Progress: {:.1}% ({:.1}s encoded, ETA: {:.0}s)  ",
                    p.fraction * 100.0,
                    p.out_time_secs,
                    p.eta_secs,
                );
            } else {
                print!("\r  Progress: {:.1}s encoded  ", p.out_time_secs);
            }
            std::io::stdout().flush().ok();
        }
    });

    let mut task = tokio::task::spawn_blocking(move || {
        form::run(&request, &engine, &job_control, Some(progress_cb))
    });

    let status = tokio::select! {
        joined = &mut task => joined?,
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupt received, cancelling job");
            control.cancel();
            task.await?
        }
    };

    println!();
    println!("{status}");

    Ok(())
}

/// Quote an argument for copy-pasting into a POSIX shell.
fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,@".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("-c:v"), "-c:v");
        assert_eq!(shell_quote("my clip.mp4"), "'my clip.mp4'");
        assert_eq!(
            shell_quote("enable='gte(t,3)'"),
            r"'enable='\''gte(t,3)'\'''"
        );
        assert_eq!(shell_quote(""), "''");
    }
}
