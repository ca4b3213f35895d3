use std::path::PathBuf;

use clap::Parser;

use crate::limits::*;

/// Startup settings taken from the command line and environment.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "ticketd")]
#[command(about = "UDP ticket reservation server")]
#[command(version)]
pub struct Config {
    /// Event catalog: a description line followed by a ticket count line, per event.
    #[arg(short = 'f', value_name = "FILE")]
    pub catalog_path: PathBuf,

    /// UDP port to listen on.
    #[arg(short = 'p', default_value_t = DEFAULT_PORT, value_parser = parse_port)]
    pub port: u16,

    /// Seconds a reservation holds its tickets.
    #[arg(short = 't', value_name = "TIMEOUT", default_value_t = DEFAULT_HOLD_SECS, value_parser = parse_hold_secs)]
    pub hold_secs: u32,

    /// Address to bind the socket to.
    #[arg(long, env = "TICKETD_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Port for the Prometheus metrics endpoint; disabled when unset.
    #[arg(long, env = "TICKETD_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Decimal digits only; no sign, no whitespace.
fn parse_bounded(value: &str, min: u64, max: u64) -> Result<u64, String> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err("should be passed as a number".into());
    }
    match value.parse::<u64>() {
        Ok(n) if (min..=max).contains(&n) => Ok(n),
        _ => Err(format!("should be in range [{min}, {max}]")),
    }
}

fn parse_port(value: &str) -> Result<u16, String> {
    parse_bounded(value, 0, u64::from(u16::MAX)).map(|n| n as u16)
}

fn parse_hold_secs(value: &str) -> Result<u32, String> {
    parse_bounded(value, u64::from(MIN_HOLD_SECS), u64::from(MAX_HOLD_SECS)).map(|n| n as u32)
}

impl Config {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("ticketd").chain(args.iter().copied()))
    }

    fn rejected_value(args: &[&str]) -> bool {
        matches!(parse(args), Err(e) if e.kind() == ErrorKind::ValueValidation)
    }

    #[test]
    fn defaults() {
        let config = parse(&["-f", "events.txt"]).unwrap();
        assert_eq!(config.catalog_path, PathBuf::from("events.txt"));
        assert_eq!(config.port, 2022);
        assert_eq!(config.hold_secs, 5);
    }

    #[test]
    fn separate_and_attached_values() {
        let config = parse(&["-p", "4000", "-t30", "-fevents.txt"]).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.hold_secs, 30);
        assert_eq!(config.catalog_path, PathBuf::from("events.txt"));
    }

    #[test]
    fn listen_addr_joins_bind_and_port() {
        let config = parse(&["-f", "x", "-p", "9000", "--bind", "127.0.0.1"]).unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn catalog_is_required() {
        let err = parse(&["-p", "1"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn port_bounds() {
        assert_eq!(parse(&["-f", "x", "-p", "0"]).unwrap().port, 0);
        assert_eq!(parse(&["-f", "x", "-p", "65535"]).unwrap().port, 65535);
        assert!(rejected_value(&["-f", "x", "-p", "65536"]));
        assert!(rejected_value(&["-f", "x", "-p", "99999999999999999999999"]));
    }

    #[test]
    fn timeout_bounds() {
        assert!(rejected_value(&["-f", "x", "-t", "0"]));
        assert!(rejected_value(&["-f", "x", "-t", "86401"]));
        assert_eq!(parse(&["-f", "x", "-t", "86400"]).unwrap().hold_secs, 86_400);
        assert_eq!(parse(&["-f", "x", "-t", "1"]).unwrap().hold_secs, 1);
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        assert!(rejected_value(&["-f", "x", "-t", "12a"]));
        assert!(rejected_value(&["-f", "x", "-t", "+5"]));
        assert!(rejected_value(&["-f", "x", "-p", " 5"]));
        assert!(parse(&["-f", "x", "-t", "-1"]).is_err());
    }

    #[test]
    fn digits_only_parser() {
        assert_eq!(parse_bounded("007", 0, 10), Ok(7));
        assert!(parse_bounded("", 0, 10).is_err());
        assert!(parse_bounded("11", 0, 10).is_err());
    }

    #[test]
    fn unknown_or_incomplete_options() {
        assert!(parse(&["-f", "x", "-x", "1"]).is_err());
        assert!(parse(&["events.txt"]).is_err());
        assert!(parse(&["-f"]).is_err());
    }
}
