//! stack-explorer binary entry point.

use std::error::Error;
use std::process::ExitCode;

use stack_explorer::cli::{self, Args};
use stack_explorer::config::Config;
use stack_explorer::{
    logging, Binding, DebugSession, JsonSnapshotProvider, LifecycleBridge, ObjectId,
    SessionContext, SnapshotProvider, StackStatusExtension, StartOptions, StatusExtension,
    ThreadLocalRegistry,
};
use tracing::info;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = cli::parse_args()?;
    if args.help {
        cli::print_help();
        return Ok(());
    }
    if args.version {
        cli::print_version();
        return Ok(());
    }

    let config = Config::load(&args)?;
    logging::init_with_filter(config.log_filter()).ok();
    info!("stack-explorer v{}", env!("CARGO_PKG_VERSION"));

    replay(&args, &config)
}

fn replay(args: &Args, config: &Config) -> Result<(), Box<dyn Error>> {
    let path = args
        .snapshot
        .as_deref()
        .ok_or("missing snapshot file (see --help)")?;
    let provider = JsonSnapshotProvider::from_file(path)?;
    let target = provider
        .frames()
        .iter()
        .find(|frame| !provider.is_internal(frame))
        .map(|frame| frame.context().clone())
        .ok_or("snapshot has no navigable frames")?;

    // The REPL's own top-level binding, active before navigation starts.
    let mut session = SessionContext::with_binding(Binding::top_level(ObjectId::from_raw(0)));
    let status = StackStatusExtension::new(&config.status);
    let bridge = LifecycleBridge::new(provider, &config.explorer);

    if !bridge.session_started(&mut session, &target, StartOptions::default())? {
        println!("call stack capture disabled");
    }
    print_status(&status, &session)?;

    for command in &args.exec {
        println!("> {}", command);
        if let Err(e) = execute(command, &mut session) {
            println!("{}", e);
        }
        print_status(&status, &session)?;
    }

    bridge.session_ended(&mut session);
    info!(session = %session.id(), "session ended");
    Ok(())
}

fn execute(command: &str, session: &mut SessionContext) -> Result<(), Box<dyn Error>> {
    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    let arg = words.next();

    let navigated = match name {
        "up" => {
            let n = count(arg)?;
            ThreadLocalRegistry::with_frame_manager_mut(session, |fm, s| fm.up(s, n))
        }
        "down" => {
            let n = count(arg)?;
            ThreadLocalRegistry::with_frame_manager_mut(session, |fm, s| fm.down(s, n))
        }
        "frame" => {
            let index = frame_index(arg)?;
            ThreadLocalRegistry::with_frame_manager_mut(session, |fm, s| {
                let index = fm.resolve_index(index)?;
                fm.change_frame_to(s, index, true)
            })
        }
        "show-stack" => ThreadLocalRegistry::with_frame_manager(session.id(), |fm| {
            for (i, frame) in fm.iter().enumerate() {
                let marker = if i == fm.binding_index() { "=>" } else { "  " };
                let method = frame.context().method().unwrap_or("<main>");
                println!("{} #{} {} at {}", marker, i, method, frame.location());
            }
            Ok(())
        }),
        "pop" => ThreadLocalRegistry::pop_frame_manager(session).map(|_| Ok(())),
        _ => {
            println!("unknown command: {}", name);
            return Ok(());
        }
    };

    match navigated {
        Some(result) => Ok(result?),
        None => {
            println!("no frame manager is active");
            Ok(())
        }
    }
}

/// Frame count for `up`/`down`, 1 when omitted.
fn count(arg: Option<&str>) -> Result<usize, String> {
    match arg {
        None => Ok(1),
        Some(n) => n.parse().map_err(|_| format!("invalid frame count: '{}'", n)),
    }
}

/// Index argument of `frame`, which is required.
fn frame_index(arg: Option<&str>) -> Result<isize, String> {
    let n = arg.ok_or("frame requires an index")?;
    n.parse().map_err(|_| format!("invalid frame index: '{}'", n))
}

fn print_status(status: &StackStatusExtension, session: &SessionContext) -> std::fmt::Result {
    let mut out = String::new();
    if let Some(binding) = session.current_binding() {
        status.before_status(session.id(), binding, &mut out)?;
    }
    print!("{}", out);
    Ok(())
}
