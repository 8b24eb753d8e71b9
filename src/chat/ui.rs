//! Terminal front end for a chat session.
//!
//! Reads lines from stdin, turns them into intents, and renders session updates.
//! The session runs in its own task; closing the intent channel (quit, EOF, Ctrl+C,
//! hangup, terminate) makes it leave the chat before the process exits.

use anyhow::Result;
#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};
use tokio::sync::mpsc;
use tracing::debug;

use super::command::{Input, SLASH_COMMANDS, SlashCommand, parse_input};
use super::session::{ChatSession, Intent};
use super::state::{Author, ChatMessage, Partner, Phase, SessionUpdate};
use super::transport::Connector;
use crate::translation::{Translator, validate_language};
use crate::ui::{Spinner, Style};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// What the terminal currently shows, rebuilt from session updates.
#[derive(Debug)]
struct View {
    phase: Phase,
    partner: Option<Partner>,
    language: String,
    spinner: Option<Spinner>,
}

impl View {
    fn apply(&mut self, update: SessionUpdate) {
        match update {
            SessionUpdate::PhaseChanged(phase) => {
                self.phase = phase;
                self.spinner = None;
                match phase {
                    Phase::Queued => {
                        self.spinner = Some(Spinner::new("Connecting you to someone special..."));
                    }
                    Phase::Idle => {
                        self.partner = None;
                        print_idle_hint();
                    }
                    Phase::Paired => {}
                }
            }
            SessionUpdate::Paired(partner) => {
                print_paired(&partner);
                self.partner = Some(partner);
            }
            SessionUpdate::MessageAppended(message) => {
                print_message(&message, self.partner.as_ref());
            }
            SessionUpdate::Cleared => debug!("Message log cleared"),
            SessionUpdate::Notice(notice) => print_error(&notice.to_string()),
            SessionUpdate::Rejected(reason) => print_error(&reason),
        }
    }
}

/// Process signals that end the chat the way closing a browser tab would.
///
/// Listeners are registered once, so a signal that arrives between two polls is
/// still observed.
struct ShutdownSignals {
    #[cfg(unix)]
    interrupt: Signal,
    #[cfg(unix)]
    hangup: Signal,
    #[cfg(unix)]
    terminate: Signal,
    #[cfg(windows)]
    ctrl_c: tokio::signal::windows::CtrlC,
}

impl ShutdownSignals {
    #[cfg(unix)]
    fn install() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            hangup: signal(SignalKind::hangup())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(windows)]
    fn install() -> std::io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    /// Waits for the next signal and returns its name.
    #[cfg(unix)]
    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "interrupt",
            _ = self.hangup.recv() => "hangup",
            _ = self.terminate.recv() => "terminate",
        }
    }

    #[cfg(windows)]
    async fn recv(&mut self) -> &'static str {
        self.ctrl_c.recv().await;
        "interrupt"
    }
}

/// Forwards stdin lines from a plain thread until EOF or the first read error.
///
/// A blocked read on tokio's stdin cannot be cancelled and would hold the runtime
/// open at exit; a detached thread does not.
fn spawn_stdin_reader() -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let failed = line.is_err();
            if tx.blocking_send(line).is_err() || failed {
                break;
            }
        }
    });
    rx
}

/// Checks a language typed at the prompt and remembers it while idle.
fn choose_language(view: &mut View, language: String) -> Result<String> {
    validate_language(&language)?;
    if view.phase == Phase::Idle {
        view.language.clone_from(&language);
    }
    Ok(language)
}

/// Runs an interactive session until the user quits, stdin closes, or the
/// process is told to stop.
///
/// Every exit path leaves the chat and waits for the session driver before
/// returning.
pub async fn run_terminal<C, T>(mut session: ChatSession<C, T>) -> Result<()>
where
    C: Connector + Send + 'static,
    C::Connection: Send + 'static,
    T: Translator,
{
    let mut signals = ShutdownSignals::install()?;

    print_header();

    let mut view = View {
        phase: session.phase(),
        partner: None,
        language: session.preferred_language().to_string(),
        spinner: None,
    };
    let mut updates = session.subscribe();
    let (intents, intent_rx) = mpsc::channel(32);

    let driver = tokio::spawn(async move {
        session.run(intent_rx).await;
    });

    print_help();
    print_idle_hint();

    let mut lines = spawn_stdin_reader();
    let mut input_error = None;

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(update) => view.apply(update),
                None => break,
            },
            line = lines.recv() => {
                let line = match line {
                    Some(Ok(line)) => line,
                    None => break,
                    Some(Err(e)) => {
                        input_error = Some(e);
                        break;
                    }
                };
                let intent = match parse_input(&line) {
                    Input::Empty => continue,
                    Input::Text(text) => Intent::Send(text),
                    Input::Command(SlashCommand::Begin(lang)) => {
                        let lang = lang.unwrap_or_else(|| view.language.clone());
                        match choose_language(&mut view, lang) {
                            Ok(lang) => Intent::Begin(lang),
                            Err(e) => {
                                print_error(&e.to_string());
                                continue;
                            }
                        }
                    }
                    Input::Command(SlashCommand::Leave) => Intent::Leave,
                    Input::Command(SlashCommand::Lang(Some(lang))) => {
                        match choose_language(&mut view, lang) {
                            Ok(lang) => Intent::SetLanguage(lang),
                            Err(e) => {
                                print_error(&e.to_string());
                                continue;
                            }
                        }
                    }
                    Input::Command(SlashCommand::Lang(None)) => {
                        print_error("Usage: /lang <code>");
                        continue;
                    }
                    Input::Command(SlashCommand::Status) => {
                        print_status(&view);
                        continue;
                    }
                    Input::Command(SlashCommand::Help) => {
                        print_help();
                        continue;
                    }
                    Input::Command(SlashCommand::Quit) => break,
                    Input::Command(SlashCommand::Unknown(cmd)) => {
                        print_error(&format!("Unknown command: /{cmd}"));
                        continue;
                    }
                };
                if intents.send(intent).await.is_err() {
                    break;
                }
            }
            name = signals.recv() => {
                debug!(signal = name, "Shutting down");
                println!();
                break;
            }
        }
    }

    view.spinner = None;
    drop(intents);
    driver.await?;

    if let Some(e) = input_error {
        return Err(e.into());
    }

    print_goodbye();
    Ok(())
}

fn print_header() {
    println!(
        "{} {} - Translated chat with strangers",
        Style::header("polychat"),
        Style::version(format!("v{VERSION}"))
    );
    println!();
}

fn print_goodbye() {
    println!("{}", Style::success("Goodbye!"));
}

fn print_idle_hint() {
    println!(
        "{}",
        Style::hint("Type /begin to look for someone to chat with.")
    );
}

fn print_paired(partner: &Partner) {
    println!(
        "{} Connected with {} {}",
        Style::success("●"),
        Style::value(&partner.display_name),
        Style::secondary(format!("({})", partner.language))
    );
    println!("{}", Style::hint("Start chatting!"));
}

fn print_message(message: &ChatMessage, partner: Option<&Partner>) {
    match message.author {
        Author::SelfUser => println!("{} {}", Style::label("you:"), message.displayed_text),
        Author::Partner => {
            let name = partner.map_or("partner", |p| p.display_name.as_str());
            print!("{} {}", Style::value(format!("{name}:")), message.displayed_text);
            if message.is_translated() {
                print!("  {}", Style::secondary(format!("({})", message.original_text)));
            }
            println!();
        }
    }
}

fn print_status(view: &View) {
    println!("{}", Style::header("Session"));
    println!("  {}     {}", Style::label("phase"), Style::value(view.phase));
    println!("  {}  {}", Style::label("language"), Style::value(&view.language));
    if let Some(partner) = &view.partner {
        println!(
            "  {}   {} {}",
            Style::label("partner"),
            Style::value(&partner.display_name),
            Style::secondary(format!("({})", partner.language))
        );
    }
    println!();
}

fn print_help() {
    println!("{}", Style::header("Available commands"));
    for (command, description) in SLASH_COMMANDS {
        println!(
            "  {:8}  {}",
            Style::command(command),
            Style::secondary(description)
        );
    }
    println!("{}", Style::hint("Anything else is sent to your partner."));
    println!();
}

fn print_error(message: &str) {
    eprintln!("{} {message}", Style::error("Error:"));
}
