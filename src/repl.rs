//! Interactive command loop driving one scan session

use anyhow::{anyhow, bail, Context, Result};
use memscan::{
    MemoryError, MemoryProvider, MonitorDecision, MonitorOptions, ScanSession, ScanValue, Tally,
    ValueType,
};
use std::io::{BufRead, Write};
use std::str::{FromStr, SplitWhitespace};
use std::time::Duration;

pub const HELP: &str = "\
commands:
  next <value>                 keep only addresses now holding <value>
  read <index>                 read the value at an address
  write <index> <value>        write to one address
  writeall <value>             write to every address
  list                         show the candidate addresses
  count                        show how many candidates remain
  monitor [min] [interval_ms]  watch for changes until fewer than [min] remain
  help                         show this text
  quit                         leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next(String),
    Read(usize),
    Write(usize, String),
    WriteAll(String),
    List,
    Count,
    Monitor {
        min: Option<usize>,
        interval_ms: Option<u64>,
    },
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or_else(|| anyhow!("empty command"))?;

        let parsed = match command.to_ascii_lowercase().as_str() {
            "next" | "n" => Command::Next(next_arg(&mut words, command, "a value")?),
            "read" | "r" => Command::Read(next_index(&mut words, command)?),
            "write" | "w" => {
                let index = next_index(&mut words, command)?;
                Command::Write(index, next_arg(&mut words, command, "a value")?)
            }
            "writeall" => Command::WriteAll(next_arg(&mut words, command, "a value")?),
            "list" | "l" => Command::List,
            "count" | "c" => Command::Count,
            "monitor" | "m" => {
                let min = optional_positive(&mut words, "minimum")?;
                let interval_ms = optional_positive(&mut words, "interval")?;
                Command::Monitor { min, interval_ms }
            }
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => bail!("unknown command '{}', try 'help'", other),
        };
        Ok(parsed)
    }
}

fn next_arg(words: &mut SplitWhitespace<'_>, command: &str, what: &str) -> Result<String> {
    words
        .next()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("'{}' needs {}", command, what))
}

fn next_index(words: &mut SplitWhitespace<'_>, command: &str) -> Result<usize> {
    next_arg(words, command, "an index")?
        .parse()
        .context("bad index")
}

fn optional_positive<T>(words: &mut SplitWhitespace<'_>, what: &str) -> Result<Option<T>>
where
    T: FromStr + Default + PartialEq,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let Some(word) = words.next() else {
        return Ok(None);
    };
    let value: T = word.parse().with_context(|| format!("bad {}", what))?;
    if value == T::default() {
        bail!("{} must be greater than zero", what);
    }
    Ok(Some(value))
}

/// Reads commands from `input` until `quit`, end of input, or a failure
/// that releases the session
pub fn run<P, R, W>(
    session: &mut ScanSession<'_, P>,
    mut input: R,
    mut output: W,
    options: &MonitorOptions,
    json: bool,
) -> Result<()>
where
    P: MemoryProvider,
    R: BufRead,
    W: Write,
{
    writeln!(output, "{} candidate addresses", session.len()?)?;

    loop {
        write!(output, "> ")?;
        output.flush()?;

        let Some(line) = read_line(&mut input)? else {
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                writeln!(output, "error: {:#}", err)?;
                continue;
            }
        };

        if command == Command::Quit {
            return Ok(());
        }
        let result = execute(session, command, &mut input, &mut output, options, json);

        if let Err(err) = result {
            writeln!(output, "error: {:#}", err)?;
            if session.is_released() {
                return Err(err.context("session released"));
            }
        }
    }
}

fn execute<P, R, W>(
    session: &mut ScanSession<'_, P>,
    command: Command,
    input: &mut R,
    output: &mut W,
    options: &MonitorOptions,
    json: bool,
) -> Result<()>
where
    P: MemoryProvider,
    R: BufRead,
    W: Write,
{
    let value_type = session.value_type();
    match command {
        Command::Quit => {}
        Command::Help => writeln!(output, "{}", HELP)?,
        Command::Count => writeln!(output, "{}", session.len()?)?,
        Command::List => print_list(session, output, json)?,
        Command::Next(text) => {
            let remaining = session.rescan(ScanValue::parse(&text, value_type)?)?;
            writeln!(output, "{} candidate addresses", remaining)?;
        }
        Command::Read(index) => writeln!(output, "{}", session.read_at(index)?)?,
        Command::Write(index, text) => {
            session.write_at(index, ScanValue::parse(&text, value_type)?)?;
        }
        Command::WriteAll(text) => {
            let written = session.write_all(ScanValue::parse(&text, value_type)?)?;
            writeln!(output, "wrote {} addresses", written)?;
        }
        Command::Monitor { min, interval_ms } => {
            let options = MonitorOptions {
                min_addresses_to_exit: min.unwrap_or(options.min_addresses_to_exit),
                interval: interval_ms
                    .map(Duration::from_millis)
                    .unwrap_or(options.interval),
            };
            monitor(session, input, output, &options, value_type)?;
        }
    }
    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn print_list<P: MemoryProvider, W: Write>(
    session: &ScanSession<'_, P>,
    output: &mut W,
    json: bool,
) -> Result<()> {
    if json {
        writeln!(output, "{}", serde_json::to_string(session.address_list()?)?)?;
    } else {
        writeln!(output, "{}", session)?;
    }
    Ok(())
}

fn monitor<P, R, W>(
    session: &mut ScanSession<'_, P>,
    input: &mut R,
    output: &mut W,
    options: &MonitorOptions,
    value_type: ValueType,
) -> Result<()>
where
    P: MemoryProvider,
    R: BufRead,
    W: Write,
{
    writeln!(
        output,
        "monitoring {} addresses every {:?}",
        session.len()?,
        options.interval
    )?;

    let outcome = session.monitor(options, |values: &[ScanValue], tally: &Tally| {
        ask_decision(input, output, values, tally, value_type)
    })?;
    writeln!(
        output,
        "monitor stopped after {} polls, {} candidate addresses",
        outcome.polls, outcome.remaining
    )?;
    Ok(())
}

/// Shows the change and asks whether to narrow; any I/O or parse problem
/// keeps the candidates as they are
fn ask_decision<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    values: &[ScanValue],
    tally: &Tally,
    value_type: ValueType,
) -> MonitorDecision {
    let shown: Vec<String> = values.iter().map(ToString::to_string).collect();
    let _ = writeln!(output, "values changed: [{}]", shown.join(", "));
    let _ = writeln!(output, "tally: {}", tally);
    let _ = write!(output, "narrow? (y <value> / n) ");
    let _ = output.flush();

    let line = match read_line(input) {
        Ok(Some(line)) => line,
        _ => return MonitorDecision::Keep,
    };
    parse_decision(&line, value_type).unwrap_or_else(|err| {
        let _ = writeln!(output, "{}, keeping candidates", err);
        MonitorDecision::Keep
    })
}

fn parse_decision(line: &str, value_type: ValueType) -> Result<MonitorDecision, MemoryError> {
    let mut words = line.split_whitespace();
    match words.next().map(str::to_ascii_lowercase).as_deref() {
        Some("y") | Some("yes") => {
            let text = words
                .next()
                .ok_or_else(|| MemoryError::InvalidValue("missing target value".to_string()))?;
            ScanValue::parse(text, value_type).map(MonitorDecision::Narrow)
        }
        _ => Ok(MonitorDecision::Keep),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memscan::memory::SimulatedProvider;
    use memscan::{Address, Scanner};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    const PID: u32 = 3;

    fn provider() -> SimulatedProvider {
        let provider = SimulatedProvider::new();
        provider
            .add_process(PID, "repl.exe")
            .map_region(PID, Address::new(0x100), 12);
        provider.poke(PID, Address::new(0x100), 100).unwrap();
        provider.poke(PID, Address::new(0x104), 100).unwrap();
        provider.poke(PID, Address::new(0x108), 50).unwrap();
        provider
    }

    fn drive(provider: SimulatedProvider, script: &str, json: bool) -> (Result<()>, String) {
        let mut scanner = Scanner::open(provider, PID).unwrap();
        let mut session = scanner.scan(ScanValue::Integer32(100)).unwrap();
        let mut output = Vec::new();
        let options = MonitorOptions {
            min_addresses_to_exit: 2,
            interval: Duration::from_millis(1),
        };
        let result = run(&mut session, Cursor::new(script), &mut output, &options, json);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("next 5".parse::<Command>().unwrap(), Command::Next("5".into()));
        assert_eq!("w 1 9".parse::<Command>().unwrap(), Command::Write(1, "9".into()));
        assert_eq!(
            "monitor 3".parse::<Command>().unwrap(),
            Command::Monitor {
                min: Some(3),
                interval_ms: None
            }
        );
        assert!("read x".parse::<Command>().is_err());
        assert!("write 1".parse::<Command>().is_err());
        assert!("jump".parse::<Command>().is_err());
    }

    #[test]
    fn test_monitor_rejects_zero_settings() {
        let err = "monitor 0".parse::<Command>().unwrap_err();
        assert_eq!(err.to_string(), "minimum must be greater than zero");
        let err = "monitor 3 0".parse::<Command>().unwrap_err();
        assert_eq!(err.to_string(), "interval must be greater than zero");
        assert_eq!(
            "monitor 3 250".parse::<Command>().unwrap(),
            Command::Monitor {
                min: Some(3),
                interval_ms: Some(250)
            }
        );
    }

    #[test]
    fn test_parse_decision() {
        assert_eq!(
            parse_decision("y 105\n", ValueType::Integer32).unwrap(),
            MonitorDecision::Narrow(ScanValue::Integer32(105))
        );
        assert_eq!(parse_decision("n\n", ValueType::Integer32).unwrap(), MonitorDecision::Keep);
        assert!(parse_decision("y\n", ValueType::Integer32).is_err());
        assert!(parse_decision("y abc\n", ValueType::Float32).is_err());
    }

    #[test]
    fn test_session_commands() {
        let provider = provider();
        let (result, output) = drive(
            provider.clone(),
            "list\nread 1\nwrite 1 7\nnext 100\ncount\nquit\n",
            false,
        );
        assert!(result.is_ok());
        assert!(output.contains("['0x100', '0x104']"));
        assert!(output.contains("\n100\n") || output.contains("> 100\n"));
        assert!(output.ends_with("> 1\n> "));
        assert_eq!(
            provider.peek(PID, Address::new(0x104), ValueType::Integer32),
            Some(ScanValue::Integer32(7))
        );
    }

    #[test]
    fn test_json_list() {
        let (_, output) = drive(provider(), "list\n", true);
        assert!(output.contains(r#"["0x100","0x104"]"#));
    }

    #[test]
    fn test_contract_errors_keep_going() {
        let (result, output) = drive(provider(), "read 9\nnext 1.5\ncount\n", false);
        assert!(result.is_ok());
        assert!(output.contains("out of range"));
        assert!(output.contains("not a valid int"));
        assert!(output.contains("> 2\n"));
    }

    #[test]
    fn test_provider_failure_ends_loop() {
        let provider = provider();
        provider.fail_reads_at(Address::new(0x100));
        let (result, output) = drive(provider, "read 0\ncount\n", false);
        assert!(result.is_err());
        assert!(output.contains("Failed to read memory"));
        assert!(!output.contains("> 0\n"));
    }
}
