#![warn(clippy::all)]

use clap::CommandFactory;
use clap::Parser;
use color_eyre::eyre;
use lazy_static::lazy_static;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vdesk::CycleDirection;
use vdesk::Desktop;
use vdesk::DesktopDetails;
use vdesk::Manager;
use vdesk::ManagerConfig;
use vdesk::Profile;
use vdesk::Window;
use vdesk::WindowDetails;
use vdesk::default_host;

lazy_static! {
    static ref HOME_DIR: PathBuf = std::env::var("VDESK_CONFIG_HOME").map_or_else(
        |_| dirs::config_dir().unwrap_or_default().join("vdesk"),
        PathBuf::from,
    );
    static ref CONFIG_FILE: PathBuf = HOME_DIR.join("vdesk.json");
}

macro_rules! gen_enum_subcommand_args {
    // SubCommand Pattern: Enum Type
    ( $( $name:ident: $element:ty ),+ $(,)? ) => {
        $(
            pastey::paste! {
                #[derive(clap::Parser)]
                pub struct $name {
                    #[clap(value_enum)]
                    [<$element:snake>]: $element
                }
            }
        )+
    };
}

gen_enum_subcommand_args! {
    Cycle: CycleDirection,
    CycleMoveWindow: CycleDirection,
}

macro_rules! gen_target_subcommand_args {
    // SubCommand Pattern
    ( $( $name:ident ),+ $(,)? ) => {
        $(
            #[derive(clap::Parser)]
            pub struct $name {
                /// Target desktop (one-indexed)
                numero: usize,
            }
        )+
    };
}

gen_target_subcommand_args! {
    Switch,
    MoveWindow,
}

#[derive(Parser)]
struct Desktops {
    /// Print the list as JSON
    #[clap(long)]
    json: bool,
}

#[derive(Parser)]
struct Create {
    /// Switch to the new desktop once it exists
    #[clap(long)]
    switch: bool,
}

#[derive(Parser)]
struct Remove {
    /// Desktop to remove (defaults to the current desktop)
    numero: Option<usize>,
    /// Desktop that receives the removed desktop's windows
    #[clap(short, long)]
    fallback: Option<usize>,
}

#[derive(Parser)]
struct Rename {
    /// Target desktop (one-indexed)
    numero: usize,
    name: String,
}

#[derive(Parser)]
struct Wallpaper {
    /// Target desktop (one-indexed)
    numero: usize,
    path: PathBuf,
}

#[derive(Parser)]
struct Windows {
    /// Only windows shown on this desktop, pinned ones included
    #[clap(short, long)]
    desktop: Option<usize>,
    /// Print the list as JSON
    #[clap(long)]
    json: bool,
}

#[derive(Parser)]
struct FocusWindow {
    /// Window handle, decimal or 0x-prefixed hexadecimal
    #[clap(value_parser = parse_hwnd)]
    hwnd: isize,
}

#[derive(Parser)]
struct ProfileArgs {
    /// Resolve this build instead of the running one
    #[clap(short, long)]
    build: Option<u32>,
}

#[derive(Parser)]
struct Completions {
    #[clap(value_enum)]
    shell: clap_complete::Shell,
}

#[derive(Parser)]
#[clap(author, about, version = version::LONG_VERSION)]
struct Opts {
    #[clap(subcommand)]
    subcmd: SubCommand,
}

#[derive(Parser)]
enum SubCommand {
    /// Generate vdeskc CLI completions for the target shell
    #[clap(arg_required_else_help = true)]
    Completions(Completions),
    /// Show the path to vdesk.json
    #[clap(alias = "config")]
    Configuration,
    /// Show the profile resolved for the running build
    Profile(ProfileArgs),
    /// List every desktop in order
    #[clap(alias = "ls")]
    Desktops(Desktops),
    /// Show the current desktop
    Current,
    /// Show the number of desktops
    Count,
    /// Create a new desktop after the last one
    Create(Create),
    /// Switch to the desktop at the target position
    #[clap(arg_required_else_help = true)]
    Switch(Switch),
    /// Switch to the previous or next desktop, wrapping around at either end
    #[clap(arg_required_else_help = true)]
    Cycle(Cycle),
    /// Remove a desktop, moving its windows to a fallback desktop
    Remove(Remove),
    /// Rename the desktop at the target position
    #[clap(arg_required_else_help = true)]
    Rename(Rename),
    /// Set the wallpaper of the desktop at the target position
    #[clap(arg_required_else_help = true)]
    Wallpaper(Wallpaper),
    /// List switcher-eligible windows, topmost first
    Windows(Windows),
    /// Show the focused window
    Focused,
    /// Move the focused window to the desktop at the target position
    #[clap(arg_required_else_help = true)]
    MoveWindow(MoveWindow),
    /// Move the focused window to the previous or next desktop and follow it there
    #[clap(arg_required_else_help = true)]
    CycleMoveWindow(CycleMoveWindow),
    /// Show the focused window on every desktop
    Pin,
    /// Show the focused window on its own desktop only
    Unpin,
    /// Toggle whether the focused window is shown on every desktop
    TogglePin,
    /// Focus a window, switching to its desktop first if needed
    #[clap(arg_required_else_help = true)]
    FocusWindow(FocusWindow),
}

fn setup() -> eyre::Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        unsafe {
            std::env::set_var("RUST_LIB_BACKTRACE", "1");
        }
    }

    color_eyre::install()?;

    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "warn");
        }
    }

    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt::Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .finish(),
    )?;

    std::panic::set_hook(Box::new(|panic| {
        panic.location().map_or_else(
            || {
                tracing::error!(message = %panic);
            },
            |location| {
                tracing::error!(
                    message = %panic,
                    panic.file = location.file(),
                    panic.line = location.line(),
                    panic.column = location.column(),
                );
            },
        );
    }));

    Ok(())
}

fn parse_hwnd(value: &str) -> Result<isize, String> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => isize::from_str_radix(hex, 16),
        None => value.parse(),
    };

    parsed.map_err(|error| format!("{value} is not a window handle: {error}"))
}

fn load_config() -> eyre::Result<ManagerConfig> {
    let mut config = if CONFIG_FILE.is_file() {
        let contents = std::fs::read_to_string(&*CONFIG_FILE)?;
        serde_json::from_str::<ManagerConfig>(&contents)?
    } else {
        tracing::debug!("{} not found, using defaults", CONFIG_FILE.display());
        ManagerConfig::default()
    };

    if let Ok(millis) = std::env::var("VDESK_SETTLE_MS") {
        config = config.with_settle_millis(millis.parse()?);
    }

    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> eyre::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_desktop(desktop: &Desktop<'_>) -> eyre::Result<()> {
    let details = DesktopDetails::try_from(desktop)?;
    let marker = if details.is_current { "*" } else { " " };
    println!(
        "{marker} {:>2}  {}  {}",
        details.numero, details.name, details.id
    );

    Ok(())
}

fn print_window(window: &Window<'_>) {
    println!(
        "{:#010x}  {}  {}",
        window.hwnd(),
        window.title(),
        window.app_id().unwrap_or("-")
    );
}

fn focused_window(manager: &Manager) -> eyre::Result<Window<'_>> {
    manager
        .current_window()
        .ok_or_else(|| eyre::eyre!("no window has focus"))
}

fn main() -> eyre::Result<()> {
    let opts: Opts = Opts::parse();
    setup()?;

    match opts.subcmd {
        SubCommand::Completions(args) => {
            let mut cli = Opts::command();
            clap_complete::generate(args.shell, &mut cli, "vdeskc", &mut std::io::stdout());
        }
        SubCommand::Configuration => {
            println!("{}", CONFIG_FILE.display());
        }
        SubCommand::Profile(args) => {
            let build = match args.build {
                Some(build) => build,
                None => match load_config()?.build_override {
                    Some(build) => build,
                    None => default_host()?.build_number(),
                },
            };

            print_json(&Profile::resolve(build)?)?;
        }
        subcmd => {
            let manager = Manager::from_default_host(load_config()?)?;
            run(&manager, subcmd)?;
        }
    }

    Ok(())
}

fn run(manager: &Manager, subcmd: SubCommand) -> eyre::Result<()> {
    match subcmd {
        SubCommand::Desktops(args) => {
            let desktops = manager.desktops()?;
            if args.json {
                let details = desktops
                    .iter()
                    .map(DesktopDetails::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                print_json(&details)?;
            } else {
                for desktop in &desktops {
                    print_desktop(desktop)?;
                }
            }
        }
        SubCommand::Current => {
            print_desktop(&manager.current_desktop()?)?;
        }
        SubCommand::Count => {
            println!("{}", manager.desktop_count()?);
        }
        SubCommand::Create(args) => {
            let desktop = manager.create_desktop()?;
            if args.switch {
                desktop.switch_to()?;
            }

            print_desktop(&desktop)?;
        }
        SubCommand::Switch(args) => {
            manager.desktop_by_numero(args.numero)?.switch_to()?;
        }
        SubCommand::Cycle(args) => {
            let current = manager.current_desktop()?;
            manager
                .adjacent_desktop(&current, args.cycle_direction)?
                .switch_to()?;
        }
        SubCommand::Remove(args) => {
            let desktop = match args.numero {
                Some(numero) => manager.desktop_by_numero(numero)?,
                None => manager.current_desktop()?,
            };

            match args.fallback {
                Some(numero) => desktop.remove(&manager.desktop_by_numero(numero)?)?,
                None => desktop.remove_with_default_fallback()?,
            }
        }
        SubCommand::Rename(args) => {
            manager.desktop_by_numero(args.numero)?.rename(&args.name)?;
        }
        SubCommand::Wallpaper(args) => {
            let path = std::path::absolute(&args.path)?;
            manager
                .desktop_by_numero(args.numero)?
                .set_wallpaper(&path.to_string_lossy())?;
        }
        SubCommand::Windows(args) => {
            let desktop = args
                .desktop
                .map(|numero| manager.desktop_by_numero(numero))
                .transpose()?;
            let windows = manager.windows(desktop.as_ref())?;

            if args.json {
                let details = windows
                    .iter()
                    .map(WindowDetails::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                print_json(&details)?;
            } else {
                windows.iter().for_each(print_window);
            }
        }
        SubCommand::Focused => {
            print_json(&WindowDetails::try_from(&focused_window(manager)?)?)?;
        }
        SubCommand::MoveWindow(args) => {
            let target = manager.desktop_by_numero(args.numero)?;
            focused_window(manager)?.move_to(&target)?;
        }
        SubCommand::CycleMoveWindow(args) => {
            let window = focused_window(manager)?;
            let target = manager.adjacent_desktop(&window.owning_desktop()?, args.cycle_direction)?;
            window.move_to(&target)?;
            window.focus()?;
        }
        SubCommand::Pin => {
            focused_window(manager)?.pin()?;
        }
        SubCommand::Unpin => {
            focused_window(manager)?.unpin()?;
        }
        SubCommand::TogglePin => {
            let pinned = focused_window(manager)?.toggle_pin()?;
            println!("{}", if pinned { "pinned" } else { "unpinned" });
        }
        SubCommand::FocusWindow(args) => {
            manager.window_for_handle(args.hwnd)?.focus()?;
        }
        SubCommand::Completions(_) | SubCommand::Configuration | SubCommand::Profile(_) => {}
    }

    Ok(())
}
