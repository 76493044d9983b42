// SecretCLI — Interactive input
//
// The command handlers only see the `Prompter` trait: read a line, read a
// secret (with a suggestion key), print a message. `TerminalPrompter` is the
// real implementation: plain stdin for lines, crossterm raw mode for masked
// password entry where Tab swaps in a suggested password.

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{queue, QueueableCommand};
use zeroize::{Zeroize, Zeroizing};

pub trait Prompter {
    /// Show `prompt` and read one line. `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Show `prompt` and read a secret. The suggestion key replaces the
    /// current input with `suggest()`. `None` if the user aborts.
    fn read_secret(
        &mut self,
        prompt: &str,
        suggest: &dyn Fn() -> String,
    ) -> io::Result<Option<Zeroizing<String>>>;

    /// Print one line of output.
    fn say(&mut self, line: &str);
}

// ─── Terminal ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

/// Leaves raw mode when dropped, even on an early return.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn redraw(out: &mut impl Write, prompt: &str, shown: &str) -> io::Result<()> {
    queue!(
        out,
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(prompt),
        Print(shown)
    )?;
    out.flush()
}

impl Prompter for TerminalPrompter {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(&['\r', '\n'][..]).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn read_secret(
        &mut self,
        prompt: &str,
        suggest: &dyn Fn() -> String,
    ) -> io::Result<Option<Zeroizing<String>>> {
        // Piped input: no raw mode, no masking, no suggestion key.
        if !io::stdin().is_terminal() {
            return Ok(self.read_line(prompt)?.map(Zeroizing::new));
        }

        let mut stdout = io::stdout();
        stdout.queue(Print(prompt))?;
        stdout.flush()?;

        let _guard = RawModeGuard::enable()?;
        let mut buffer = Zeroizing::new(String::new());
        // A suggested password is shown in clear so it can be written down.
        let mut revealed = false;

        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Enter => {
                    queue!(stdout, Print("\r\n"))?;
                    stdout.flush()?;
                    return Ok(Some(buffer));
                }
                KeyCode::Esc => {
                    queue!(stdout, Print("\r\n"))?;
                    stdout.flush()?;
                    return Ok(None);
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    queue!(stdout, Print("\r\n"))?;
                    stdout.flush()?;
                    return Ok(None);
                }
                KeyCode::Tab => {
                    buffer.zeroize();
                    buffer.push_str(&Zeroizing::new(suggest()));
                    revealed = true;
                }
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Char(c) => buffer.push(c),
                _ => continue,
            }

            let shown = if revealed {
                Zeroizing::new(buffer.to_string())
            } else {
                Zeroizing::new("*".repeat(buffer.chars().count()))
            };
            redraw(&mut stdout, prompt, &shown)?;
        }
    }

    fn say(&mut self, line: &str) {
        println!("{}", line);
    }
}

// ─── Scripted input for tests ────────────────────────────────────────────────
