//! Terminal rendering and input for the login screen.

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::io::{self, BufRead, IsTerminal, Write};

use portal_login::{LoginView, Notifier, Toast, ToastKind};

use crate::styled_output::{MessageType, print_error, print_success, styled};

/// Source of user-typed lines.
pub trait LineInput {
    /// Read one line after showing `prompt`. `secret` input is not echoed.
    ///
    /// Returns `None` when the user aborts (Ctrl+C, Esc) or input ends.
    fn read(&mut self, prompt: &str, secret: bool) -> io::Result<Option<String>>;
}

/// Reads from the real terminal, or from piped stdin when there is no TTY.
pub struct TerminalInput {
    interactive: bool,
}

impl TerminalInput {
    pub fn new() -> Self {
        Self {
            interactive: io::stdin().is_terminal(),
        }
    }
}

impl Default for TerminalInput {
    fn default() -> Self {
        Self::new()
    }
}

impl LineInput for TerminalInput {
    fn read(&mut self, prompt: &str, secret: bool) -> io::Result<Option<String>> {
        let mut stderr = io::stderr();
        write!(stderr, "{prompt}")?;
        stderr.flush()?;

        if !self.interactive {
            let mut line = String::new();
            let read = io::stdin().lock().read_line(&mut line)?;
            if read == 0 {
                return Ok(None);
            }
            return Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()));
        }

        crossterm::terminal::enable_raw_mode()?;
        let result = read_raw_line(&mut stderr, secret);
        let _ = crossterm::terminal::disable_raw_mode();
        writeln!(stderr)?;
        result
    }
}

/// Read key events until Enter. Raw mode must be enabled.
fn read_raw_line(out: &mut impl Write, secret: bool) -> io::Result<Option<String>> {
    let mut value = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(Some(value)),
            KeyCode::Esc => return Ok(None),
            KeyCode::Char('c') | KeyCode::Char('d')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                return Ok(None);
            }
            KeyCode::Backspace => {
                if value.pop().is_some() {
                    write!(out, "\x08 \x08")?;
                    out.flush()?;
                }
            }
            KeyCode::Char(c) => {
                value.push(c);
                write!(out, "{}", if secret { '*' } else { c })?;
                out.flush()?;
            }
            _ => {}
        }
    }
}

/// Shows toasts as styled lines on stderr.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

/// Text of a toast on a single line.
pub fn toast_line(toast: &Toast) -> String {
    match &toast.text2 {
        Some(detail) => format!("{}: {}", toast.text1, detail),
        None => toast.text1.clone(),
    }
}

impl Notifier for TerminalNotifier {
    fn show(&self, toast: Toast) {
        let line = toast_line(&toast);
        match toast.kind {
            ToastKind::Success => print_success(&line),
            ToastKind::Error => print_error(&line),
        }
    }
}

/// Screen header: title and subtitle.
pub fn render_header(out: &mut impl Write, view: &LoginView) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {}", view.title)?;
    writeln!(out, "  {}", view.subtitle)?;
    writeln!(out)
}

/// Inline field errors, for fields that have one.
pub fn render_field_errors(out: &mut impl Write, view: &LoginView, colors: bool) -> io::Result<()> {
    for field in [&view.phone, &view.password] {
        if let Some(error) = field.error {
            writeln!(
                out,
                "  {}",
                styled(MessageType::Error, &format!("{}: {}", field.label, error), colors)
            )?;
        }
    }
    Ok(())
}

/// Footer with secondary actions, support line and version.
pub fn render_footer(out: &mut impl Write, view: &LoginView) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "  {} (:forgot)   {} {} (:register)",
        view.forgot_password_label, view.register_prompt, view.register_label
    )?;
    writeln!(out, "  {}", view.support_line)?;
    writeln!(out, "  {}", view.version)?;
    writeln!(out)
}

/// Prompt text for a field: `Label (placeholder) [current]: `.
pub fn field_prompt(label: &str, placeholder: &str, current: Option<&str>) -> String {
    match current.filter(|c| !c.is_empty()) {
        Some(current) => format!("{label} * [{current}]: "),
        None => format!("{label} * ({placeholder}): "),
    }
}
