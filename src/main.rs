use std::env;
use std::str::FromStr;
use std::time::Duration;

use main_error::MainError;
use waveplus::{
    default_adapter, locate, ConnectionManager, Error, PipeSink, Poller, Protocol, SerialNumber,
    TerminalSink,
};

const DEFAULT_SAMPLE_PERIOD: Duration = Duration::from_secs(300);

enum Mode {
    Terminal,
    Pipe,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "terminal" => Ok(Mode::Terminal),
            "pipe" => Ok(Mode::Pipe),
            other => Err(Error::UnknownMode(other.into())),
        }
    }
}

fn sample_period(arg: Option<&str>) -> Result<Duration, Error> {
    let Some(arg) = arg else {
        return Ok(DEFAULT_SAMPLE_PERIOD);
    };
    match arg.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(Error::InvalidSamplePeriod(arg.into())),
    }
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    // readings go to stdout, logs stay on stderr
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        eprintln!(
            "usage: {} SERIAL_NUMBER <terminal|pipe> [SAMPLE_PERIOD_SECS]",
            args[0]
        );
        std::process::exit(2);
    }

    // validate everything before touching the radio
    let serial: SerialNumber = args[1].parse()?;
    let mode: Mode = args[2].parse()?;
    let period = sample_period(args.get(3).map(String::as_str))?;

    let protocol = Protocol::default();
    let adapter = default_adapter().await?;
    let device = locate(&adapter, &protocol, serial).await?;

    let link = ConnectionManager::new(device, protocol);
    let mut poller = Poller::new(link, period);
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    match mode {
        Mode::Terminal => {
            let mut sink = TerminalSink::new(std::io::stdout());
            poller.run(&mut sink, shutdown).await?;
        }
        Mode::Pipe => {
            let mut sink = PipeSink::new(std::io::stdout());
            poller.run(&mut sink, shutdown).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_both_variants() {
        assert!(matches!(Mode::from_str("terminal"), Ok(Mode::Terminal)));
        assert!(matches!(Mode::from_str("pipe"), Ok(Mode::Pipe)));
        assert!(matches!(
            Mode::from_str("csv"),
            Err(Error::UnknownMode(_))
        ));
    }

    #[test]
    fn sample_period_defaults_and_validates() {
        assert_eq!(sample_period(None).unwrap(), DEFAULT_SAMPLE_PERIOD);
        assert_eq!(sample_period(Some("60")).unwrap(), Duration::from_secs(60));
        assert!(sample_period(Some("0")).is_err());
        assert!(sample_period(Some("-5")).is_err());
        assert!(sample_period(Some("soon")).is_err());
    }
}
