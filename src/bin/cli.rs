//! datachat CLI Client
//!
//! Interactive menu on top of the chat session. Shows only the operations
//! the current state allows, asks for their input, and prints the outcome.

use std::io::{self, BufRead, Write};

use clap::Parser;
use datachat::protocol::{InboxBatch, Response, ResponseKind};
use datachat::{ChatSession, Config, DisconnectPolicy, Operation, Outcome, Request, SessionState};
use tracing_subscriber::{fmt, EnvFilter};

/// datachat CLI
#[derive(Parser, Debug)]
#[command(name = "datachat")]
#[command(about = "Interactive client for a line-based TCP chat server")]
#[command(version)]
struct Args {
    /// Chat server host
    #[arg(long, default_value = "datakomm.work")]
    host: String,

    /// Chat server port
    #[arg(short, long, default_value = "1300")]
    port: u16,

    /// Connect timeout in milliseconds (0 = none)
    #[arg(long, default_value = "5000")]
    connect_timeout_ms: u64,

    /// Read timeout in milliseconds (0 = none)
    #[arg(long, default_value = "10000")]
    read_timeout_ms: u64,

    /// Unrecognized lines to skip while waiting for a response
    #[arg(long, default_value = "256")]
    max_discarded_lines: usize,

    /// Stay connected if closing the socket fails
    #[arg(long)]
    keep_on_disconnect_error: bool,
}

/// One numbered menu entry
#[derive(Debug, Clone, Copy)]
enum MenuChoice {
    Run(Operation),
    Quit,
}

impl MenuChoice {
    fn description(self) -> &'static str {
        match self {
            MenuChoice::Run(op) => op.description(),
            MenuChoice::Quit => "Quit the application",
        }
    }

    fn is_available(self, state: SessionState) -> bool {
        match self {
            MenuChoice::Run(op) => op.is_permitted_in(state),
            MenuChoice::Quit => true,
        }
    }
}

fn main() {
    // Logs go to stderr so they don't interleave with the menu
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let policy = if args.keep_on_disconnect_error {
        DisconnectPolicy::KeepOnError
    } else {
        DisconnectPolicy::ReleaseOnError
    };

    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .connect_timeout_ms(args.connect_timeout_ms)
        .read_timeout_ms(args.read_timeout_ms)
        .max_discarded_lines(args.max_discarded_lines)
        .disconnect_policy(policy)
        .build();

    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        std::process::exit(2);
    }

    tracing::info!("datachat v{} -> {}", datachat::VERSION, config.addr());

    let mut session = ChatSession::new(config);
    let stdin = io::stdin();
    let mut input = stdin.lock();

    if let Err(e) = run(&mut session, &mut input) {
        tracing::error!("Console error: {}", e);
    }

    if session.is_connected() {
        if let Err(e) = session.disconnect() {
            tracing::warn!("Disconnect on exit failed: {}", e);
        }
    }
    println!("Bye!");
}

/// Read-eval-print loop; returns on quit or end of input
fn run(session: &mut ChatSession, input: &mut impl BufRead) -> io::Result<()> {
    let choices: Vec<MenuChoice> = Operation::ALL
        .into_iter()
        .map(MenuChoice::Run)
        .chain(std::iter::once(MenuChoice::Quit))
        .collect();

    loop {
        print_menu(&choices, session.state());

        let hint = format!("Enter the number of your choice (1..{}): ", choices.len());
        let Some(line) = prompt(input, &hint)? else {
            return Ok(());
        };
        println!();

        let choice = match line.trim().parse::<usize>() {
            Ok(n) if (1..=choices.len()).contains(&n) => choices[n - 1],
            _ => {
                println!("Invalid input, please choose a valid action\n");
                continue;
            }
        };

        let operation = match choice {
            MenuChoice::Quit => return Ok(()),
            MenuChoice::Run(op) => op,
        };

        if !operation.is_permitted_in(session.state()) {
            println!(
                "This function is not allowed in the current system state ({})\n",
                session.state()
            );
            continue;
        }

        let Some(request) = build_request(operation, input)? else {
            return Ok(());
        };

        match session.dispatch(request) {
            Ok(outcome) => render(&outcome),
            Err(e) => println!("ERROR: {}", e),
        }
        println!();
    }
}

fn print_menu(choices: &[MenuChoice], state: SessionState) {
    println!("==============================================");
    println!("What do you want to do now? ({})", state);
    println!("==============================================");
    println!("Available options:");
    for (i, choice) in choices.iter().enumerate() {
        if choice.is_available(state) {
            println!("  {}) {}", i + 1, choice.description());
        }
    }
    println!();
}

/// Collect the free-text input an operation needs; `None` on end of input
fn build_request(operation: Operation, input: &mut impl BufRead) -> io::Result<Option<Request>> {
    let request = match operation {
        Operation::Connect => Request::Connect,
        Operation::Disconnect => Request::Disconnect,
        Operation::Login => {
            let Some(username) = prompt(input, "Enter username: ")? else {
                return Ok(None);
            };
            Request::Login { username }
        }
        Operation::SendPublicMessage => {
            let Some(text) = prompt(input, "Enter public message: ")? else {
                return Ok(None);
            };
            Request::SendPublicMessage { text }
        }
        Operation::SendPrivateMessage => {
            let Some(recipient) = prompt(input, "Enter recipient: ")? else {
                return Ok(None);
            };
            let Some(text) = prompt(input, "Enter message: ")? else {
                return Ok(None);
            };
            Request::SendPrivateMessage { recipient, text }
        }
        Operation::ReadInbox => Request::ReadInbox,
        Operation::ListUsers => Request::ListUsers,
        Operation::GetJoke => Request::GetJoke,
        Operation::ListSupported => Request::ListSupported,
    };
    Ok(Some(request))
}

fn prompt(input: &mut impl BufRead, label: &str) -> io::Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

// =============================================================================
// Rendering
// =============================================================================

fn render(outcome: &Outcome) {
    match outcome {
        Outcome::Connected => println!("Connected (sync mode)"),
        Outcome::Disconnected => println!("Disconnected"),
        Outcome::Reply(response) => render_reply(response),
        Outcome::Inbox(batch) => render_inbox(batch),
    }
}

fn render_reply(response: &Response) {
    match response.kind() {
        ResponseKind::LoginOk => println!("Logged in"),
        ResponseKind::MsgOk => println!("Message sent"),
        ResponseKind::Users => println!("Users: {}", response.users().join(", ")),
        ResponseKind::Joke => println!("{}", response.body()),
        ResponseKind::Supported => println!("Supported commands: {}", response.body()),
        _ if response.is_error() => println!("ERROR: {}", response.line()),
        _ => println!("{}", response.line()),
    }
}

fn render_inbox(batch: &InboxBatch) {
    println!("Unread messages: {}", batch.declared_count());
    println!("----------------\nPrivate messages\n----------------");
    for message in batch.private() {
        println!("{}", message.text);
    }
    println!("---------------\nPublic messages\n---------------");
    for message in batch.public() {
        println!("{}", message.text);
    }
}
