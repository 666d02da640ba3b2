//! Command-line front end for the admin client: OTP login, logout, session
//! status, and authenticated GET requests.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]
#![expect(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "terminal front end reports results and prompts on the console"
)]

use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use admin_client::config::ClientSettings;
use admin_client::domain::ports::{AuthClientError, Navigator};
use admin_client::domain::{DeviceIdentity, LoginError, LoginFlow, TokenStore};
use admin_client::outbound::http::{ApiClient, AuthClient, RequestOptions};
use admin_client::outbound::storage::{FileStore, MemoryStore};
use admin_client::presentation::format_error_message;
use admin_client::session::handle_signal;
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use tokio::runtime::{Builder, Runtime};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `admin-login` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "admin-login",
    about = "Log in to the admin API with a mobile OTP and make authenticated requests",
    version
)]
struct CliArgs {
    #[command(flatten)]
    settings: SettingsArgs,
    #[command(subcommand)]
    command: Command,
}

/// Overrides for `ADMIN_CLIENT_*` settings.
#[derive(Debug, Default, Args)]
struct SettingsArgs {
    /// Base URL prepended to API endpoints.
    #[arg(long, global = true, value_name = "url")]
    api_base_url: Option<String>,
    /// Base URL of the OTP endpoints.
    #[arg(long, global = true, value_name = "url")]
    auth_base_url: Option<String>,
    /// Device type reported when verifying a code.
    #[arg(long, global = true, value_name = "type")]
    device_type: Option<String>,
    /// Directory holding the stored credential and device id.
    #[arg(long, global = true, value_name = "dir")]
    state_dir: Option<PathBuf>,
}

impl SettingsArgs {
    /// Command line for the settings loader, holding only the given flags.
    fn loader_args(&self) -> Vec<OsString> {
        let mut args = vec![OsString::from("admin-login")];
        let flags = [
            ("--api-base-url", self.api_base_url.as_ref().map(OsString::from)),
            ("--auth-base-url", self.auth_base_url.as_ref().map(OsString::from)),
            ("--device-type", self.device_type.as_ref().map(OsString::from)),
            ("--state-dir", self.state_dir.as_ref().map(OsString::from)),
        ];
        for (flag, value) in flags {
            if let Some(value) = value {
                args.push(OsString::from(flag));
                args.push(value);
            }
        }
        args
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send an OTP to a mobile number, then verify it interactively.
    Login {
        /// Ten-digit mobile number without country prefix.
        #[arg(long, value_name = "digits")]
        mobile: String,
    },
    /// Forget the stored credential.
    Logout,
    /// Report whether a credential is stored, and this device's id.
    Status,
    /// Send an authenticated GET and print the JSON body.
    Get {
        /// Endpoint appended to the API base URL, e.g. `/forms/`.
        endpoint: String,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt().with_env_filter(EnvFilter::from_default_env()).try_init() {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = ClientSettings::load_from_args(args.settings.loader_args())?;
    if settings.api_base_url().is_empty() {
        warn!("ADMIN_CLIENT_API_BASE_URL is not set; endpoints are used as given");
    }

    let state_dir = settings.state_dir();
    let durable = Arc::new(
        FileStore::open(&state_dir)
            .with_context(|| format!("failed to open state directory {}", state_dir.display()))?,
    );
    let tokens = Arc::new(TokenStore::new(durable.clone(), Arc::new(MemoryStore::new())));
    let identity = Arc::new(DeviceIdentity::new(durable));

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;

    match args.command {
        Command::Login { mobile } => login(&runtime, settings, tokens, identity, &mobile),
        Command::Logout => {
            tokens.clear().wrap_err("failed to clear stored credential")?;
            println!("Logged out.");
            Ok(())
        }
        Command::Status => {
            let state = if tokens.read().is_some() {
                "logged in"
            } else {
                "logged out"
            };
            println!("status={state}");
            println!("device_id={}", identity.device_id());
            Ok(())
        }
        Command::Get { endpoint } => get(&runtime, &settings, tokens, &endpoint),
    }
}

fn login(
    runtime: &Runtime,
    settings: ClientSettings,
    tokens: Arc<TokenStore>,
    identity: Arc<DeviceIdentity>,
    mobile: &str,
) -> Result<()> {
    let gateway = Arc::new(AuthClient::new(settings, identity).wrap_err("failed to build HTTP client")?);
    let mut flow = LoginFlow::new(gateway, tokens, Arc::new(DefaultClock));

    runtime
        .block_on(flow.send_code(mobile))
        .map_err(|err| eyre!(present_login_error(&err)))?;
    println!("OTP sent. Enter the 4-digit code, or `r` to resend.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("OTP: ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            return Err(eyre!("no OTP entered"));
        };
        let raw = line?;
        let input = raw.trim();

        if input.eq_ignore_ascii_case("r") {
            match runtime.block_on(flow.resend_code()) {
                Ok(_) => println!("OTP resent."),
                Err(err) => println!("{}", present_login_error(&err)),
            }
            continue;
        }

        match runtime.block_on(flow.verify(input)) {
            Ok(_) => {
                println!("Logged in.");
                return Ok(());
            }
            Err(err) if ends_login(&err) => return Err(eyre!(present_login_error(&err))),
            Err(err) => println!("{}", present_login_error(&err)),
        }
    }
}

/// Whether a failed verification stops the prompt loop.
///
/// Rejections the user can answer with another code keep the prompt open;
/// configuration, storage, network, and server failures end it.
fn ends_login(err: &LoginError) -> bool {
    match err {
        LoginError::Validation(_) | LoginError::MissingToken => false,
        LoginError::Gateway(AuthClientError::Request(normalized)) => {
            !(400..500).contains(&normalized.status())
        }
        _ => true,
    }
}

fn get(
    runtime: &Runtime,
    settings: &ClientSettings,
    tokens: Arc<TokenStore>,
    endpoint: &str,
) -> Result<()> {
    let client = ApiClient::new(settings, tokens).wrap_err("failed to build HTTP client")?;
    match runtime.block_on(client.get(endpoint, RequestOptions::new())) {
        Ok(Some(body)) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        Ok(None) => {
            println!("(no JSON body)");
            Ok(())
        }
        Err(failure) => {
            if let Some(signal) = failure.signal() {
                handle_signal(signal, &TerminalNavigator::at(endpoint));
            }
            Err(eyre!(format_error_message(failure.error())))
        }
    }
}

fn present_login_error(err: &LoginError) -> String {
    match err {
        LoginError::Gateway(AuthClientError::Request(normalized)) => {
            format_error_message(normalized)
        }
        other => format_error_message(other.to_string().as_str()),
    }
}

/// Navigator for a terminal session: the "page" is the last endpoint used.
struct TerminalNavigator {
    path: Mutex<String>,
}

impl TerminalNavigator {
    fn at(path: &str) -> Self {
        Self {
            path: Mutex::new(path.to_owned()),
        }
    }
}

impl Navigator for TerminalNavigator {
    fn current_path(&self) -> String {
        self.path
            .lock()
            .map(|path| path.clone())
            .unwrap_or_default()
    }

    fn navigate_to(&self, path: &str) {
        eprintln!("Session expired; run `admin-login login` to sign in again (redirect to {path}).");
        if let Ok(mut current) = self.path.lock() {
            path.clone_into(&mut *current);
        }
    }
}
