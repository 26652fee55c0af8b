//! Line-oriented command language of the interactive desk.
//!
//! A plain line is typed character by character and followed by a carriage
//! return. Lines starting with `:` are commands; `::` escapes a literal
//! leading colon.

use anyhow::{anyhow, bail, Context};
use typewriter_core::InkColor;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Strike `n` backspaces
    Backspace(usize),
    Enter,
    /// Drag the carriage lever by `dx`
    Drag(f32),
    Finish,
    Save,
    Export,
    /// Write a new letter (from a finished one)
    New,
    Snapshot,
    Archive,
    Letters,
    Theme(String),
    Ink(InkColor),
    Show,
    Help,
    Quit,
}

/// One parsed REPL line.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// Type this text, then return the carriage
    Type(String),
    Command(Command),
}

pub const HELP: &str = "\
Type a line of text and press Enter to strike it onto the sheet.
Commands:
  :bs [n]        backspace n times (default 1)
  :enter         carriage return
  :drag DX       drag the carriage lever (returns when DX > threshold)
  :finish        finish the letter
  :save          save the finished letter
  :export        export the finished letter as PDF
  :new           start a new letter after finishing
  :snap          take a snapshot of the sheet
  :archive       list snapshots
  :letters       list saved letters
  :theme NAME    switch theme
  :ink COLOR     switch ink (black, red, blue, green)
  :show          redraw the sheet
  :help          this text
  :quit          leave
  ::text         type a line that starts with ':'";

pub fn parse_line(raw: &str) -> anyhow::Result<Line> {
    if let Some(literal) = raw.strip_prefix("::") {
        return Ok(Line::Type(format!(":{literal}")));
    }
    let Some(command) = raw.strip_prefix(':') else {
        return Ok(Line::Type(raw.to_string()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    let command = match (name, arg) {
        ("bs", None) => Command::Backspace(1),
        ("bs", Some(n)) => {
            Command::Backspace(n.parse().with_context(|| format!("bad backspace count '{n}'"))?)
        }
        ("enter", _) => Command::Enter,
        ("drag", Some(dx)) => {
            Command::Drag(dx.parse().with_context(|| format!("bad drag distance '{dx}'"))?)
        }
        ("drag", None) => bail!("usage: :drag DX"),
        ("finish", _) => Command::Finish,
        ("save", _) => Command::Save,
        ("export", _) => Command::Export,
        ("new", _) => Command::New,
        ("snap", _) => Command::Snapshot,
        ("archive", _) => Command::Archive,
        ("letters", _) => Command::Letters,
        ("theme", Some(name)) => Command::Theme(name.to_string()),
        ("theme", None) => bail!("usage: :theme NAME"),
        ("ink", Some(color)) => Command::Ink(color.parse().map_err(|e: String| anyhow!(e))?),
        ("ink", None) => bail!("usage: :ink COLOR"),
        ("show", _) => Command::Show,
        ("help", _) | ("?", _) => Command::Help,
        ("quit", _) | ("q", _) => Command::Quit,
        (other, _) => bail!("unknown command ':{other}' (try :help)"),
    };
    Ok(Line::Command(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_escaped_text() {
        assert_eq!(parse_line("Dear you,").unwrap(), Line::Type("Dear you,".into()));
        assert_eq!(parse_line("").unwrap(), Line::Type(String::new()));
        assert_eq!(parse_line("::)").unwrap(), Line::Type(":)".into()));
    }

    #[test]
    fn commands_with_arguments() {
        assert_eq!(
            parse_line(":bs").unwrap(),
            Line::Command(Command::Backspace(1))
        );
        assert_eq!(
            parse_line(":bs 3").unwrap(),
            Line::Command(Command::Backspace(3))
        );
        assert_eq!(
            parse_line(":drag 95.5").unwrap(),
            Line::Command(Command::Drag(95.5))
        );
        assert_eq!(
            parse_line(":ink Blue").unwrap(),
            Line::Command(Command::Ink(InkColor::Blue))
        );
        assert_eq!(
            parse_line(":theme vintage").unwrap(),
            Line::Command(Command::Theme("vintage".into()))
        );
    }

    #[test]
    fn bad_commands_are_errors() {
        assert!(parse_line(":bs many").is_err());
        assert!(parse_line(":drag").is_err());
        assert!(parse_line(":ink purple").is_err());
        assert!(parse_line(":fly").is_err());
    }
}
