mod common;

use common::{MockClock, MockPower, MockSerial};
use sim868::config::RegistrationPolicy;
use sim868::io::Clock;
use sim868::modem::{BearerConfig, Carrier, ConnectionState, Sim868};
use sim868::ModemError;

type TestModem = Sim868<MockSerial, MockPower, MockClock>;

fn modem(replies: &[&str]) -> TestModem {
    Sim868::new(MockSerial::with_replies(replies), MockPower::on(), MockClock::new())
}

fn single_poll() -> RegistrationPolicy {
    RegistrationPolicy {
        rounds: 1,
        round_s: 1,
        poll_interval_s: 1,
    }
}

#[test]
fn test_network_mode_forced_to_automatic() {
    let mut modem = modem(&["+COPS: 1,0,\"TELCEL\"", "OK"]);

    assert_eq!(modem.gprs_network_mode(), Ok(()));
    assert_eq!(modem.transceiver().serial().sent(), ["AT+COPS?", "AT+COPS=0"]);
}

#[test]
fn test_network_mode_already_automatic() {
    let mut modem = modem(&["+COPS: 0,0,\"TELCEL\""]);

    assert_eq!(modem.gprs_network_mode(), Ok(()));
    assert_eq!(modem.transceiver().serial().sent().len(), 1);
}

#[test]
fn test_weak_signal_is_not_rejected() {
    let mut modem = modem(&["+CSQ: 3,0"]);

    assert_eq!(modem.gprs_network_rssi(), Ok(3));
}

#[test]
fn test_rssi_query_without_reply() {
    let mut modem = modem(&["ERROR"]);

    assert_eq!(modem.gprs_network_rssi(), Err(ModemError::Reply));
}

#[test]
fn test_registration_polls_whole_window() {
    let mut modem = modem(&["+CREG: 0,2", "+CREG: 0,0", "+CREG: 0,2", "+CREG: 0,1"]);

    assert_eq!(modem.gsm_network_registration(), Ok(()));

    // Default policy: 2 rounds of 30 s polled every 15 s
    assert_eq!(modem.transceiver().serial().count_sent("AT+CREG?"), 4);
    assert!(modem.transceiver().clock().now_ms() >= 4 * 15_000);
}

#[test]
fn test_registration_keeps_polling_after_success() {
    // Registered early, then lost again: the last recorded status wins
    let mut modem = modem(&["+CREG: 0,1", "+CREG: 0,1", "+CREG: 0,1", "+CREG: 0,0"]);

    assert_eq!(
        modem.gsm_network_registration(),
        Err(ModemError::NetworkRegistration)
    );
}

#[test]
fn test_registration_searching_does_not_override() {
    let mut modem = modem(&["+CREG: 0,5", "+CREG: 0,2", "+CREG: 0,3", "+CREG: 0,2"]);

    assert_eq!(modem.gsm_network_registration(), Ok(()));
}

#[test]
fn test_registration_unknown_status() {
    let mut modem = modem(&["+CREG: 0,1", "+CREG: 0,1", "+CREG: 0,1", "+CREG: 0,4"]);

    assert_eq!(modem.gsm_network_registration(), Err(ModemError::Reply));
}

#[test]
fn test_registration_never_answered() {
    let mut modem = modem(&[]);
    modem.set_registration_policy(single_poll());

    assert_eq!(modem.gsm_network_registration(), Err(ModemError::Reply));
}

#[test]
fn test_bearer_opened_from_scratch() {
    let mut modem = modem(&[
        "+CGATT: 0",
        "OK",
        "+SAPBR: 1,3,\"0.0.0.0\"",
        "OK",
        "OK",
        "OK",
        "OK",
        "OK",
        "+SAPBR: 1,1,\"10.64.12.7\"",
    ]);
    modem.gprs_set_apn(Carrier::Telcel);

    assert_eq!(modem.gprs_enable(true), Ok(()));
    assert_eq!(
        modem.transceiver().serial().sent(),
        [
            "AT+CGATT?",
            "AT+CGATT=1",
            "AT+SAPBR=2,1",
            "AT+SAPBR=3,1,\"CONTYPE\",\"GPRS\"",
            "AT+SAPBR=3,1,\"APN\",\"internet.itelcel.com\"",
            "AT+SAPBR=3,1,\"USER\",\"webgprs\"",
            "AT+SAPBR=3,1,\"PWD\",\"webgprs2003\"",
            "AT+SAPBR=1,1",
            "AT+SAPBR=2,1",
        ]
    );
}

#[test]
fn test_bearer_enable_is_idempotent() {
    let mut modem = modem(&["+CGATT: 1", "+SAPBR: 1,1,\"10.64.12.7\""]);
    modem.gprs_set_apn(Carrier::M2m);

    assert_eq!(modem.gprs_enable(true), Ok(()));
    assert_eq!(modem.transceiver().serial().sent(), ["AT+CGATT?", "AT+SAPBR=2,1"]);
}

#[test]
fn test_bearer_requires_profile() {
    let mut modem = modem(&["+CGATT: 1", "+SAPBR: 1,3,\"0.0.0.0\""]);

    assert_eq!(
        modem.gprs_enable(true),
        Err(ModemError::NotConfigured("bearer profile"))
    );
}

#[test]
fn test_attach_rejected() {
    let mut modem = modem(&["+CGATT: 0", "ERROR"]);
    modem.gprs_set_apn(Carrier::M2m);

    assert_eq!(modem.gprs_enable(true), Err(ModemError::GprsService));
}

#[test]
fn test_bearer_parameter_rejected() {
    let mut modem = modem(&["+CGATT: 1", "+SAPBR: 1,3,\"0.0.0.0\"", "OK", "ERROR"]);
    modem.gprs_set_apn(Carrier::Movistar);

    assert_eq!(modem.gprs_enable(true), Err(ModemError::Reply));
}

#[test]
fn test_bearer_open_not_confirmed() {
    let mut modem = modem(&[
        "+CGATT: 1",
        "+SAPBR: 1,3,\"0.0.0.0\"",
        "OK",
        "OK",
        "OK",
        "OK",
        "OK",
        "+SAPBR: 1,0,\"0.0.0.0\"",
    ]);
    modem.gprs_set_bearer(BearerConfig::new("iot.example", "", "").unwrap());

    assert_eq!(modem.gprs_enable(true), Err(ModemError::GprsContext));
}

#[test]
fn test_bearer_teardown() {
    let mut modem = modem(&[
        "+CGATT: 1",
        "+SAPBR: 1,1,\"10.64.12.7\"",
        "OK",
        "+SAPBR: 1,3,\"0.0.0.0\"",
        "OK",
    ]);

    assert_eq!(modem.gprs_enable(false), Ok(()));
    assert_eq!(
        modem.transceiver().serial().sent(),
        ["AT+CGATT?", "AT+SAPBR=2,1", "AT+SAPBR=0,1", "AT+SAPBR=2,1", "AT+CGATT=0"]
    );
}

#[test]
fn test_bearer_disable_is_idempotent() {
    let mut modem = modem(&["+CGATT: 1", "+SAPBR: 1,3,\"0.0.0.0\"", "OK"]);

    // Already closed: no close command, only the detach
    assert_eq!(modem.gprs_enable(false), Ok(()));
    assert_eq!(
        modem.transceiver().serial().sent(),
        ["AT+CGATT?", "AT+SAPBR=2,1", "AT+CGATT=0"]
    );
    assert_eq!(modem.transceiver().serial().count_sent("AT+SAPBR=0,1"), 0);
}

#[test]
fn test_teardown_detaches_even_when_close_fails() {
    let mut modem = modem(&["+CGATT: 1", "+SAPBR: 1,1,\"10.64.12.7\"", "ERROR", "OK"]);

    assert_eq!(modem.gprs_enable(false), Err(ModemError::GprsContext));
    assert_eq!(
        modem.transceiver().serial().sent().last().map(String::as_str),
        Some("AT+CGATT=0")
    );
}

#[test]
fn test_bearer_query() {
    let mut modem = modem(&["+SAPBR: 1,2,\"10.64.12.7\"", "+SAPBR: 1,9,\"0.0.0.0\""]);

    assert_eq!(modem.gprs_query(), Ok(ConnectionState::Closing));
    assert_eq!(modem.gprs_query(), Err(ModemError::Reply));
}

#[test]
fn test_gsm_bring_up_end_to_end() {
    let mut modem = modem(&[
        "+COPS: 0",
        "+CSQ: 18,0",
        "+CREG: 0,5",
        "+CGATT: 1",
        "+SAPBR: 1,1,\"10.64.12.7\"",
    ]);
    modem.set_registration_policy(single_poll());
    modem.gprs_set_apn(Carrier::Att);

    assert_eq!(modem.gprs_gsm_init(), Ok(()));
    assert_eq!(modem.transceiver().serial().pending_replies(), 0);
}

#[test]
fn test_gsm_bring_up_stops_at_registration() {
    let mut modem = modem(&["+COPS: 0", "+CSQ: 18,0", "+CREG: 0,0"]);
    modem.set_registration_policy(single_poll());

    assert_eq!(modem.gprs_gsm_init(), Err(ModemError::NetworkRegistration));
    assert_eq!(modem.transceiver().serial().count_sent("AT+CGATT?"), 0);
}

#[test]
fn test_carrier_profiles() {
    assert_eq!(Carrier::default(), Carrier::M2m);
    assert_eq!(Carrier::Iusacell.profile(), Carrier::Att.profile());

    let config = BearerConfig::for_carrier(Carrier::Movistar);
    assert_eq!(config.apn.as_str(), "internet.movistar.mx");
    assert_eq!(config.user.as_str(), "movistar");
}

#[test]
fn test_bearer_config_field_limit() {
    let apn = "a".repeat(51);
    assert_eq!(
        BearerConfig::new(&apn, "", ""),
        Err(ModemError::MessageTooLarge { limit: 50 })
    );
}
