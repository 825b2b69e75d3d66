//! Request/response exchanges against the mock transport

use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;
use uds_proto::{EcuState, NegativeResponseCode, UdsMessage};
use uds_tester::transport::mock::MockTransport;
use uds_tester::{MockConfig, TesterConfig, TesterError, UdsClient};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

fn setup(config: TesterConfig) -> (Arc<MockTransport>, UdsClient) {
    init_tracing();
    let mock = Arc::new(MockTransport::new(&MockConfig::default()));
    let client = UdsClient::new(mock.clone(), &config);
    (mock, client)
}

fn fast_config() -> TesterConfig {
    TesterConfig {
        response_timeout_ms: 50,
        response_pending_timeout_ms: 150,
        ..TesterConfig::default()
    }
}

#[tokio::test]
async fn test_session_change_tracks_state() {
    let (mock, client) = setup(TesterConfig::default());

    let response = client.diagnostic_session_control(0x03).await.unwrap();
    assert_eq!(response.uint("diagnosticSessionType"), Some(0x03));
    assert_eq!(
        response.bytes("sessionParameterRecord"),
        Some(&[0x00, 0x19, 0x01, 0xF4][..])
    );
    assert_eq!(client.ecu_state().session, 0x03);
    assert_eq!(mock.sent_frames(), vec![vec![0x10, 0x03]]);
}

#[tokio::test]
async fn test_read_vin() {
    let (_mock, client) = setup(TesterConfig::default());

    let (did, data) = client.read_data_by_id(&[0xF190]).await.unwrap();
    assert_eq!(did, 0xF190);
    assert_eq!(data, b"1HGCM82633A123456".to_vec());
}

#[tokio::test]
async fn test_negative_response_is_an_error() {
    let (mock, client) = setup(TesterConfig::default());
    mock.add_response(vec![0x10, 0x02], vec![0x7F, 0x10, 0x22]);

    let err = client.diagnostic_session_control(0x02).await.unwrap_err();
    assert!(matches!(
        err,
        TesterError::NegativeResponse {
            service_id: 0x10,
            nrc: NegativeResponseCode::ConditionsNotCorrect
        }
    ));
    assert_eq!(client.ecu_state(), EcuState::default());
}

#[rstest]
#[case(0x12, NegativeResponseCode::SubFunctionNotSupported)]
#[case(0x31, NegativeResponseCode::RequestOutOfRange)]
#[case(0x7E, NegativeResponseCode::SubFunctionNotSupportedInActiveSession)]
#[case(0xF0, NegativeResponseCode::Unknown(0xF0))]
#[tokio::test]
async fn test_negative_response_codes(#[case] code: u8, #[case] expected: NegativeResponseCode) {
    let (mock, client) = setup(TesterConfig::default());
    mock.add_response(vec![0x11, 0x01], vec![0x7F, 0x11, code]);

    match client.ecu_reset(0x01).await.unwrap_err() {
        TesterError::NegativeResponse { service_id, nrc } => {
            assert_eq!(service_id, 0x11);
            assert_eq!(nrc, expected);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_response_pending_then_final() {
    let (mock, client) = setup(fast_config());
    mock.add_responses(
        vec![0x31, 0x01, 0x02, 0x03],
        vec![
            vec![0x7F, 0x31, 0x78],
            vec![0x7F, 0x31, 0x78],
            vec![0x71, 0x01, 0x02, 0x03, 0x00],
        ],
    );

    let status = client.routine_control_start(0x0203, &[]).await.unwrap();
    assert_eq!(status, vec![0x00]);
}

#[tokio::test]
async fn test_response_pending_without_final_times_out() {
    let (mock, client) = setup(fast_config());
    mock.add_responses(vec![0x31, 0x01, 0x02, 0x03], vec![vec![0x7F, 0x31, 0x78]]);

    let err = client.routine_control_start(0x0203, &[]).await.unwrap_err();
    match err {
        TesterError::Timeout {
            service_id,
            waited_ms,
        } => {
            assert_eq!(service_id, 0x31);
            assert!(waited_ms >= 140, "waited {waited_ms} ms");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_response_pending_as_answer() {
    let mut config = fast_config();
    config.protocol.treat_response_pending_as_answer = true;
    let (mock, client) = setup(config);
    mock.add_responses(vec![0x31, 0x01, 0x02, 0x03], vec![vec![0x7F, 0x31, 0x78]]);

    let err = client.routine_control_start(0x0203, &[]).await.unwrap_err();
    assert!(matches!(
        err,
        TesterError::NegativeResponse {
            nrc: NegativeResponseCode::ResponsePending,
            ..
        }
    ));
}

#[tokio::test]
async fn test_uncorrelated_and_garbage_frames_are_skipped() {
    let (mock, client) = setup(TesterConfig::default());
    // Stale answer to an earlier read, a frame that does not decode, and a
    // negative response for another service
    mock.inject_incoming(vec![0x62, 0xF1, 0x91, b'H', b'W']);
    mock.inject_incoming(vec![0x01, 0x02]);
    mock.inject_incoming(vec![0x7F, 0x2E, 0x31]);

    let (did, _) = client.read_data_by_id(&[0xF190]).await.unwrap();
    assert_eq!(did, 0xF190);
}

#[tokio::test]
async fn test_silent_ecu_times_out() {
    let (mock, client) = setup(fast_config());
    mock.add_responses(vec![0x3E, 0x00], vec![]);

    let err = client.tester_present(false).await.unwrap_err();
    assert!(matches!(err, TesterError::Timeout { service_id: 0x3E, .. }));
}

#[tokio::test]
async fn test_security_access_unlocks() {
    let (mock, client) = setup(TesterConfig::default());

    let seed = client.security_access_request_seed(1).await.unwrap();
    assert_eq!(seed, vec![0x12, 0x34, 0x56, 0x78]);
    assert_eq!(client.ecu_state().security_level, 0);

    client
        .security_access_send_key(1, &[0xED, 0xCB, 0xA9, 0x87])
        .await
        .unwrap();
    assert_eq!(client.ecu_state().security_level, 0x02);
    assert_eq!(
        mock.sent_frames().last(),
        Some(&vec![0x27, 0x02, 0xED, 0xCB, 0xA9, 0x87])
    );
}

#[tokio::test]
async fn test_ecu_reset_returns_to_default_state() {
    let (mock, client) = setup(TesterConfig::default());
    mock.add_response(vec![0x11, 0x04], vec![0x51, 0x04, 0x0A]);

    client.diagnostic_session_control(0x03).await.unwrap();
    client.security_access_request_seed(1).await.unwrap();
    client.security_access_send_key(1, &[0x00]).await.unwrap();
    assert_ne!(client.ecu_state(), EcuState::default());

    let power_down_time = client.ecu_reset(0x04).await.unwrap();
    assert_eq!(power_down_time, Some(0x0A));
    assert_eq!(client.ecu_state(), EcuState::default());
}

#[tokio::test]
async fn test_generic_request() {
    let (mock, client) = setup(TesterConfig::default());
    mock.add_response(
        vec![0x23],
        vec![0x63, 0xDE, 0xAD, 0xBE, 0xEF],
    );

    let request = UdsMessage::new(0x23)
        .with("memorySizeLen", 1u8)
        .with("memoryAddressLen", 2u8)
        .with("memoryAddress2", 0x1234u16)
        .with("memorySize1", 0x04u8);
    let response = client.request(&request).await.unwrap();
    assert_eq!(response.bytes("dataRecord"), Some(&[0xDE, 0xAD, 0xBE, 0xEF][..]));
    assert_eq!(mock.sent_frames(), vec![vec![0x23, 0x12, 0x12, 0x34, 0x04]]);
}

#[tokio::test]
async fn test_disconnected_transport() {
    let (mock, client) = setup(TesterConfig::default());
    mock.set_connected(false);

    let err = client.tester_present(false).await.unwrap_err();
    assert!(matches!(err, TesterError::Transport(_)));
}
