use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction, Command};

use crate::diff::{self, DiffOutcome};
use crate::error::Error;
use crate::mapping::{self, EndpointNode};
use crate::request::{self, Flags};
use crate::{execute, Transport};

/// Command tokens end at the first flag-like token; everything from there on
/// is the flag tail, split off later at the resolver's consumed count.
pub fn drop_flags(argv: &[String]) -> Vec<String> {
    argv.iter()
        .take_while(|a| !a.starts_with('-'))
        .cloned()
        .collect()
}

fn flag_command() -> Command {
    Command::new("scout")
        .no_binary_name(true)
        .disable_help_flag(true)
        .arg(
            Arg::new("body")
                .long("body")
                .help("Request body text")
                .num_args(1),
        )
        .arg(
            Arg::new("body-file")
                .long("body-file")
                .help("File holding the request body")
                .num_args(1)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Ask the server for JSON output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("provider")
                .long("provider")
                .help("Restrict results to one provider")
                .num_args(1),
        )
        .arg(
            Arg::new("method")
                .long("method")
                .help("HTTP method override (GET/POST/PUT/PATCH/DELETE)")
                .num_args(1),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .help("Return only the result count")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("cdn")
                .long("cdn")
                .help("Include CDN-hosted assets")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("total")
                .long("total")
                .help("Include totals in the response")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("limit")
                .long("limit")
                .help("Fetch a single page instead of paginating")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("compare")
                .long("compare")
                .help("Diff the output against this reference file")
                .num_args(1)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("reverse-compare")
                .long("reverse-compare")
                .help("Report lines unique to the reference instead")
                .action(ArgAction::SetTrue),
        )
}

/// Parse the unconsumed argv tail into [`Flags`].
///
/// # Errors
///
/// `Error::FlagParse` on a malformed tail; the caller reports it and exits
/// with code 2.
pub fn parse_flags(tail: &[String]) -> crate::error::Result<Flags> {
    let matches = flag_command().try_get_matches_from(tail)?;
    Ok(Flags {
        body: matches.get_one::<String>("body").cloned(),
        body_file: matches.get_one::<PathBuf>("body-file").cloned(),
        json: matches.get_flag("json"),
        provider: matches.get_one::<String>("provider").cloned(),
        method: matches.get_one::<String>("method").cloned(),
        count: matches.get_flag("count"),
        cdn: matches.get_flag("cdn"),
        total: matches.get_flag("total"),
        limit: matches.get_flag("limit"),
        compare: matches.get_one::<PathBuf>("compare").cloned(),
        reverse_compare: matches.get_flag("reverse-compare"),
    })
}

/// Print the command tree flattened from the mapping, then the flag set.
pub fn print_help(root: &EndpointNode) {
    println!("scout - mapping-driven REST client");
    println!();
    println!("COMMANDS:");
    for (path, template) in mapping::command_paths(root) {
        println!("  {path:<28} {template}");
    }
    println!();
    let mut cmd = flag_command();
    let _ = cmd.print_help();
}

/// Top-level driver: resolve the command path, build and execute the
/// request(s), then run the snapshot diff when requested.
///
/// Returns the process exit code. Endpoint, body, and configuration errors
/// keep the inherited graceful behavior (message on stdout, exit 0);
/// flag-parse errors exit 2; transport and snapshot failures exit 1.
pub fn drive(root: &EndpointNode, base_url: &str, argv: &[String], transport: &dyn Transport) -> i32 {
    let path = drop_flags(argv);
    if path.is_empty() || path[0] == "help" {
        print_help(root);
        return 0;
    }

    let resolved = match mapping::resolve(root, &path) {
        Ok(resolved) => resolved,
        Err(err) => {
            println!("{err}");
            return 0;
        }
    };
    tracing::debug!(template = %resolved.template, consumed = resolved.consumed, "endpoint resolved");

    let tail = argv.get(resolved.consumed..).unwrap_or_default();
    let flags = match parse_flags(tail) {
        Ok(flags) => flags,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };

    let spec = match request::build_request(&resolved.template, &path, base_url, &flags) {
        Ok(spec) => spec,
        Err(err) => {
            println!("Error: {err}");
            return 0;
        }
    };
    tracing::debug!(method = %spec.method, url = %spec.url, paginate = spec.paginate, "request built");

    let aggregate = match execute(transport, &spec, &flags) {
        Ok(aggregate) => aggregate,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };

    if let (Some(aggregate), Some(reference)) = (aggregate, flags.compare.as_deref()) {
        let snapshot = Path::new(diff::SNAPSHOT_FILE);
        match diff::run_diff(snapshot, &aggregate, reference, flags.reverse_compare) {
            Ok(DiffOutcome::Diff(lines)) => {
                for line in lines {
                    println!("{line}");
                }
            }
            Ok(DiffOutcome::ReferenceMissing) => {
                println!("{}", Error::CompareFileMissing);
            }
            Err(err) => {
                eprintln!("{err}");
                return 1;
            }
        }
    }

    0
}
