use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use colored::*;
use sim868::config::ModemConfig;
use sim868::gnss::GnssReceiver;
use sim868::io::{AlwaysOn, SerialPortChannel, StdClock};
use sim868::modem::{HttpMethod, Sim868};
use sim868::ModemError;
use tracing::Level;

const DEFAULT_PORT: &str = "/dev/ttyS0";
const DEFAULT_BAUD: &str = "115200";
const DEFAULT_GNSS_BAUD: &str = "9600";

type Modem = Sim868<SerialPortChannel, AlwaysOn, StdClock>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = App::new("sim868")
        .version("0.1.0")
        .about("📶 SIM868 modem driver - bring-up, GPRS, HTTP and GNSS from the command line")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .value_name("DEVICE")
                .help("Modem serial device")
                .takes_value(true)
                .default_value(DEFAULT_PORT)
                .global(true),
        )
        .arg(
            Arg::with_name("baud")
                .short("b")
                .long("baud")
                .value_name("RATE")
                .help("Modem baud rate")
                .takes_value(true)
                .default_value(DEFAULT_BAUD)
                .global(true),
        )
        .arg(
            Arg::with_name("gnss-port")
                .short("g")
                .long("gnss-port")
                .value_name("DEVICE")
                .help("GNSS receiver serial device")
                .takes_value(true)
                .global(true),
        )
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("JSON configuration (carrier, timeouts, HTTP header)")
                .takes_value(true)
                .global(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("Log level: -v info, -vv debug (AT traffic)")
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("init")
                .about("🤝 Autobaud handshake and echo off"),
        )
        .subcommand(
            SubCommand::with_name("sim")
                .about("💳 SIM card detection, presence and PIN check")
                .arg(
                    Arg::with_name("attempts")
                        .long("attempts")
                        .value_name("N")
                        .takes_value(true)
                        .default_value("1"),
                ),
        )
        .subcommand(
            SubCommand::with_name("network")
                .about("📡 Operator selection, signal, registration and bearer up"),
        )
        .subcommand(
            SubCommand::with_name("gprs")
                .about("🌐 Attach/open or close/detach the GPRS bearer")
                .arg(
                    Arg::with_name("state")
                        .required(true)
                        .possible_values(&["on", "off"]),
                ),
        )
        .subcommand(
            SubCommand::with_name("http")
                .about("📨 Send an HTTP request through the bearer")
                .arg(
                    Arg::with_name("method")
                        .required(true)
                        .possible_values(&["get", "post"]),
                )
                .arg(
                    Arg::with_name("payload")
                        .long("payload")
                        .value_name("JSON")
                        .help("JSON body for POST")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("attempts")
                        .long("attempts")
                        .value_name("N")
                        .help("Retry budget per phase (defaults to the configured value)")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("gnss")
                .about("🛰️  Wait for one RMC sentence and print the fix")
                .arg(
                    Arg::with_name("gnss-baud")
                        .long("gnss-baud")
                        .value_name("RATE")
                        .takes_value(true)
                        .default_value(DEFAULT_GNSS_BAUD),
                )
                .arg(
                    Arg::with_name("wait")
                        .long("wait")
                        .value_name("MS")
                        .help("Give up after this many milliseconds")
                        .takes_value(true),
                ),
        )
        .get_matches();

    init_tracing(matches.occurrences_of("verbose"));

    let config = match matches.value_of("config") {
        Some(path) => ModemConfig::from_file(path)?,
        None => ModemConfig::default(),
    };

    if let ("gnss", Some(sub_matches)) = matches.subcommand() {
        return handle_gnss(&matches, sub_matches);
    }

    let port = matches.value_of("port").unwrap_or(DEFAULT_PORT);
    let baud: u32 = matches.value_of("baud").unwrap_or(DEFAULT_BAUD).parse()?;
    let serial = SerialPortChannel::open(port, baud)?;
    let mut modem = Sim868::with_config(serial, AlwaysOn, StdClock::new(), &config)?;

    let outcome = match matches.subcommand() {
        ("init", _) => report("Autobaud", modem.init()),
        ("sim", Some(sub_matches)) => {
            let attempts: u8 = sub_matches.value_of("attempts").unwrap_or("1").parse()?;
            report("SIM card", modem.sim_card_init_retrying(attempts))
        }
        ("network", _) => report("Network", modem.gprs_gsm_init()),
        ("gprs", Some(sub_matches)) => {
            let connect = sub_matches.value_of("state") == Some("on");
            report("GPRS bearer", modem.gprs_enable(connect))
        }
        ("http", Some(sub_matches)) => handle_http(&mut modem, sub_matches, &config)?,
        _ => Ok(()),
    };

    outcome.map_err(Into::into)
}

fn init_tracing(verbosity: u64) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

fn handle_http(
    modem: &mut Modem,
    matches: &ArgMatches<'_>,
    config: &ModemConfig,
) -> Result<Result<(), ModemError>, Box<dyn std::error::Error>> {
    let method = match matches.value_of("method") {
        Some("post") => HttpMethod::Post,
        _ => HttpMethod::Get,
    };
    let attempts: u8 = match matches.value_of("attempts") {
        Some(n) => n.parse()?,
        None => config.http.max_attempts,
    };
    if let Some(payload) = matches.value_of("payload") {
        modem.http_set_json_payload(payload)?;
    }

    let result = modem.http_send_request(method, attempts);
    if let Some(status) = modem.last_http_status() {
        println!("{} {}", "Status:".bright_white(), status.to_string().bright_cyan());
    }
    if result.is_ok() {
        println!("{}", modem.http_response());
    }

    Ok(report("HTTP request", result))
}

fn handle_gnss(
    global: &ArgMatches<'_>,
    matches: &ArgMatches<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    let port = matches
        .value_of("gnss-port")
        .or_else(|| global.value_of("gnss-port"))
        .ok_or("gnss needs --gnss-port")?;
    let baud: u32 = matches
        .value_of("gnss-baud")
        .unwrap_or(DEFAULT_GNSS_BAUD)
        .parse()?;

    let serial = SerialPortChannel::open(port, baud)?;
    let mut receiver = GnssReceiver::new(serial, AlwaysOn, StdClock::new());
    if let Some(wait) = matches.value_of("wait") {
        receiver = receiver.with_max_wait(wait.parse()?);
    }
    receiver.set_power_level(true);

    if !receiver.get_fix_status()? {
        println!("{} {}", "⏳".yellow(), "No fix yet".bright_yellow());
        return Ok(());
    }

    let position = receiver.get_data()?;
    let summary = serde_json::json!({
        "position": position,
        "local_time": receiver.date_time(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

fn report(action: &str, result: Result<(), ModemError>) -> Result<(), ModemError> {
    match &result {
        Ok(()) => println!("{} {}", "✅".green(), format!("{} OK", action).bright_green()),
        Err(e) => println!(
            "{} {} failed: {} (code {})",
            "❌".red(),
            action.bright_white(),
            e.to_string().bright_red(),
            e.code()
        ),
    }
    result
}
