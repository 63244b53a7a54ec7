//! imhtml CLI - normalize IM markup or extract its text
//!
//! Usage: `imhtml [--text | --lines] [FILE|-]`

use std::io::{self, Read, Write};

use imhtml::StyledTextSink;
use tracing_subscriber::EnvFilter;

enum Output {
    Markup,
    Text,
    Lines,
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let mut output = Output::Markup;
    let mut path: Option<String> = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--text" => output = Output::Text,
            "--lines" => output = Output::Lines,
            "-h" | "--help" => {
                println!("usage: imhtml [--text | --lines] [FILE|-]");
                return Ok(());
            }
            _ if path.is_none() => path = Some(arg),
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unexpected argument: {arg}"),
                ));
            }
        }
    }

    let input = match path.as_deref() {
        Some(p) if p != "-" => std::fs::read_to_string(p)?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut editor = imhtml::Editor::new();
    editor.insert_html(&input, imhtml::Options::default());
    tracing::debug!(positions = editor.len(), runs = editor.buffer().runs().len(), "parsed");

    let mut stdout = io::stdout().lock();
    match output {
        Output::Markup => writeln!(stdout, "{}", editor.get_markup())?,
        Output::Text => writeln!(stdout, "{}", editor.text())?,
        Output::Lines => {
            for line in editor.get_markup_lines() {
                writeln!(stdout, "{line}")?;
            }
        }
    }

    Ok(())
}
