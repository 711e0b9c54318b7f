//! bridje-scan - dump the tokens the Bridje external scanner produces.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use bridje_scanner::{CharClasses, Lexeme, Scanner, Tokenizer};
use clap::Parser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

/// Print the tokens of Bridje source, one per line.
#[derive(Parser, Debug)]
#[command(name = "bridje-scan", author, version, about, long_about = None)]
struct Args {
    /// Source file to scan
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Scan code given on the command line
    #[arg(short, long, value_name = "CODE", conflicts_with = "file")]
    eval: Option<String>,

    /// Start an interactive session after scanning
    #[arg(short, long)]
    interactive: bool,

    /// Use the earlier grammar revision's symbol punctuation (`%` and `|`)
    #[arg(long, conflicts_with = "punct")]
    legacy_charset: bool,

    /// Punctuation characters allowed at the start of a symbol
    #[arg(long, value_name = "CHARS")]
    punct: Option<String>,

    /// Print the serialized scanner state after each token
    #[arg(long)]
    show_state: bool,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn classes(&self) -> CharClasses {
        match (&self.punct, self.legacy_charset) {
            (Some(punct), _) => CharClasses::with_punctuation(punct),
            (None, true) => CharClasses::legacy(),
            (None, false) => CharClasses::default(),
        }
    }
}

fn main() {
    let args = Args::parse();
    setup_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(args: &Args) -> Result<(), String> {
    let source = match (&args.eval, &args.file) {
        (Some(code), _) => Some(code.clone()),
        (None, Some(path)) => Some(
            fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?,
        ),
        (None, None) => None,
    };

    match source {
        Some(source) => {
            tracing::info!(bytes = source.len(), "scanning source");
            dump(&source, args)?;
            if args.interactive {
                start_repl(args)?;
            }
        }
        None => start_repl(args)?,
    }

    Ok(())
}

/// Scan `source` with a fresh scanner and print every lexeme.
fn dump(source: &str, args: &Args) -> Result<(), String> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut tokenizer = Tokenizer::with_scanner(source, Scanner::with_classes(args.classes()));

    while let Some(lexeme) = tokenizer.next_lexeme().map_err(|e| e.to_string())? {
        let line = format_lexeme(&lexeme);
        let line = if args.show_state {
            format!("{}  {}", line, hex(&tokenizer.scanner().serialize()))
        } else {
            line
        };
        writeln!(out, "{}", line).map_err(|e| e.to_string())?;
    }

    Ok(())
}

fn format_lexeme(lexeme: &Lexeme) -> String {
    let start = lexeme.start();
    let kind = match lexeme {
        Lexeme::Token(token) => token.kind.to_string(),
        Lexeme::Host(host) => format!("{:?}", host.kind),
    };
    format!(
        "{}:{} {} {:?}",
        start.line_number(),
        start.column_number(),
        kind,
        lexeme.text()
    )
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn start_repl(args: &Args) -> Result<(), String> {
    println!(
        "bridje-scan v{} - enter source, a blank line ends a block; Ctrl+D to quit",
        env!("CARGO_PKG_VERSION")
    );
    println!();

    let mut rl = DefaultEditor::new().map_err(|e| format!("Failed to create editor: {}", e))?;

    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { ">>> " } else { "... " };

        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if buffer.is_empty() && (trimmed == "exit" || trimmed == "quit") {
                    break;
                }

                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                if is_complete(&buffer) {
                    if !buffer.trim().is_empty() {
                        rl.add_history_entry(buffer.trim()).ok();
                        if let Err(e) = dump(&buffer, args) {
                            eprintln!("Error: {}", e);
                        }
                    }
                    buffer.clear();
                }
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                println!("^C");
            }
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(e) => {
                return Err(format!("Readline error: {}", e));
            }
        }
    }

    Ok(())
}

/// Check if the input is ready to scan: brackets and strings are closed, and
/// either a blank line ended the input or it is a single line that does not
/// open a block.
fn is_complete(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut prev_char = '\0';

    for c in input.chars() {
        if in_string {
            if c == '"' && prev_char != '\\' {
                in_string = false;
            }
            prev_char = c;
            continue;
        }

        match c {
            '"' => in_string = true,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
        prev_char = c;
    }

    if in_string || depth > 0 {
        return false;
    }

    let last_line = input.rsplit('\n').next().unwrap_or("");
    let single_line = !input.contains('\n');
    let opens_block = input.trim_end().ends_with(':');

    last_line.trim().is_empty() || (single_line && !opens_block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridje_scanner::tokenize;

    #[test]
    fn test_is_complete() {
        assert!(is_complete("foo 1 2"));
        assert!(is_complete("when: x"));
        assert!(!is_complete("when:"));
        assert!(!is_complete("when:\n  go"));
        assert!(is_complete("when:\n  go\n"));
        assert!(is_complete("when:\n  go\n   "));
        assert!(!is_complete("(foo"));
        assert!(is_complete("(foo\n  bar)\n"));
        assert!(!is_complete("\"open"));
    }

    #[test]
    fn test_format_lexeme() {
        let lexemes = tokenize("a\n  b:").unwrap();
        let lines: Vec<_> = lexemes.iter().map(format_lexeme).collect();
        assert_eq!(
            lines,
            vec![
                "1:1 SYMBOL \"a\"",
                "2:3 INDENT \"\"",
                "2:3 SYMBOL \"b\"",
                "2:4 Colon \":\"",
                "2:5 DEDENT \"\"",
            ]
        );
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[1, 0xff, 0xff, 0, 0]), "01 ff ff 00 00");
    }

    #[test]
    fn test_charset_selection() {
        let args = Args::parse_from(["bridje-scan", "--legacy-charset", "-e", "x"]);
        assert_eq!(args.classes(), CharClasses::legacy());

        let args = Args::parse_from(["bridje-scan", "--punct", "$", "-e", "x"]);
        assert_eq!(args.classes(), CharClasses::with_punctuation("$"));

        let args = Args::parse_from(["bridje-scan", "-e", "x"]);
        assert_eq!(args.classes(), CharClasses::default());
    }
}
