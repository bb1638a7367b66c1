//! # Joblog Command
//!
//! Reads `.logs/joblog.json` and prints each compiled object with the
//! messages it produced. `--failed` and `--severity` narrow the listing
//! the same way a tree view would.

use anyhow::Result;
use clap::Args;

use iproj::output::{self, Output, Status};
use iproj::project::Project;

/// Show the last job log
#[derive(Args, Debug)]
pub struct JoblogArgs {
    /// Only show objects that failed to build.
    #[arg(long)]
    pub failed: bool,

    /// Minimum message severity to show.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub severity: u32,

    /// Print the build output log instead.
    #[arg(long, conflicts_with_all = ["failed", "severity"])]
    pub output: bool,
}

pub fn execute(args: JoblogArgs, project: &Project, out: &Output) -> Result<()> {
    if args.output {
        match project.output_log()? {
            Some(text) => print!("{}", text),
            None => println!("No output log found"),
        }
        return Ok(());
    }

    let Some(info) = project.read_job_log()? else {
        println!("No job log found at {}", project.job_log_path().display());
        return Ok(());
    };
    let mut info = (*info).clone();
    info.show_failed_objects = args.failed;
    info.severity_level = args.severity;

    if let Some(created) = info.created_time {
        println!("Job log from {}", created.format("%Y-%m-%d %H:%M:%S"));
    }
    for object in info.visible_objects() {
        let status = if object.failed {
            Status::Error
        } else {
            Status::Ok
        };
        let name = if object.object.is_empty() {
            &object.cmd
        } else {
            &object.object
        };
        println!("{} {}", out.marker(status), name);
        for msg in info.visible_messages(object) {
            println!(
                "    {} {}",
                output::severity(format!("{} ({})", msg.msgid, msg.severity), msg.severity),
                msg.message_text
            );
        }
    }
    println!(
        "{} object(s), {} failed",
        info.objects.len(),
        info.failed_count()
    );
    Ok(())
}
