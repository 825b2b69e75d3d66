//! Request/response correlation
//!
//! [`hashret`] gives a coarse bucket key shared by a request and every
//! message that may answer it; [`answers`] makes the fine-grained decision.
//! Matching never fails: a candidate missing the fields a rule needs simply
//! does not match.

use crate::codec;
use crate::config;
use crate::constants::service_id::{NEGATIVE_RESPONSE, RESPONSE_BIT};
use crate::message::UdsMessage;
use crate::nrc::NegativeResponseCode;
use crate::registry::ServiceKind;

/// Response matcher with an explicit response-pending policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseMatcher {
    treat_response_pending_as_answer: bool,
}

impl ResponseMatcher {
    pub fn new(treat_response_pending_as_answer: bool) -> Self {
        Self {
            treat_response_pending_as_answer,
        }
    }

    /// Matcher following the process-wide configuration
    pub fn from_global() -> Self {
        Self::new(config::treat_response_pending_as_answer())
    }

    /// Does `candidate` answer `request`?
    pub fn answers(&self, candidate: &UdsMessage, request: &UdsMessage) -> bool {
        if candidate.is_negative_response() {
            return negative_answers(candidate, request, self.treat_response_pending_as_answer);
        }

        if u16::from(candidate.service_id()) != u16::from(request.service_id()) + 0x40 {
            return false;
        }

        // Without a body on either side there is nothing to compare but
        // size. This is a weak heuristic, not a correlation guarantee.
        if candidate.is_bare() || request.is_bare() {
            return match (codec::encode(candidate), codec::encode(request)) {
                (Ok(c), Ok(r)) => c.len() <= r.len(),
                _ => false,
            };
        }

        match ServiceKind::from_service_id(request.service_id()) {
            Some(kind) => kind_answers(kind, candidate, request),
            None => false,
        }
    }
}

/// Does `candidate` answer `request`, under the process-wide configuration?
pub fn answers(candidate: &UdsMessage, request: &UdsMessage) -> bool {
    ResponseMatcher::from_global().answers(candidate, request)
}

/// [`answers`] with an explicit response-pending policy
pub fn answers_with(
    candidate: &UdsMessage,
    request: &UdsMessage,
    treat_response_pending_as_answer: bool,
) -> bool {
    ResponseMatcher::new(treat_response_pending_as_answer).answers(candidate, request)
}

/// Correlation key: the request service id with the response bit cleared
///
/// Negative responses use the service id they echo.
pub fn hashret(message: &UdsMessage) -> Vec<u8> {
    if message.is_negative_response() {
        return vec![message.echoed_service_id().unwrap_or(NEGATIVE_RESPONSE)];
    }
    vec![message.service_id() & !RESPONSE_BIT]
}

fn negative_answers(candidate: &UdsMessage, request: &UdsMessage, pending_is_answer: bool) -> bool {
    let (Some(echoed), Some(code)) = (
        candidate.echoed_service_id(),
        candidate.negative_response_code(),
    ) else {
        return false;
    };
    if echoed != request.service_id() {
        return false;
    }
    code != NegativeResponseCode::ResponsePending || pending_is_answer
}

/// Both messages carry `field` with the same integer value
fn same(candidate: &UdsMessage, request: &UdsMessage, field: &str) -> bool {
    match (candidate.uint(field), request.uint(field)) {
        (Some(c), Some(r)) => c == r,
        _ => false,
    }
}

fn kind_answers(kind: ServiceKind, candidate: &UdsMessage, request: &UdsMessage) -> bool {
    use ServiceKind::*;

    match kind {
        DiagnosticSessionControl => same(candidate, request, "diagnosticSessionType"),
        SecurityAccess => same(candidate, request, "securityAccessType"),
        CommunicationControl => same(candidate, request, "controlType"),
        AccessTimingParameter => same(candidate, request, "timingParameterAccessType"),
        ResponseOnEvent => same(candidate, request, "eventType"),
        LinkControl => same(candidate, request, "linkControlType"),
        ReadDataByIdentifier => match (
            candidate.uint("dataIdentifier"),
            request.list("identifiers"),
        ) {
            (Some(did), Some(requested)) => requested.contains(&did),
            _ => false,
        },
        ReadScalingDataByIdentifier | WriteDataByIdentifier | InputOutputControlByIdentifier => {
            same(candidate, request, "dataIdentifier")
        }
        ReadDataByPeriodicIdentifier => same(candidate, request, "periodicDataIdentifier"),
        DynamicallyDefineDataIdentifier => same(candidate, request, "subFunction"),
        WriteMemoryByAddress => {
            same(candidate, request, "memorySizeLen")
                && same(candidate, request, "memoryAddressLen")
        }
        ReadDtcInformation => same(candidate, request, "reportType"),
        RoutineControl => {
            same(candidate, request, "routineControlType")
                && same(candidate, request, "routineIdentifier")
        }
        TransferData => same(candidate, request, "blockSequenceCounter"),
        EcuReset
        | ClearDiagnosticInformation
        | ReadMemoryByAddress
        | RequestDownload
        | RequestUpload
        | RequestTransferExit
        | RequestFileTransfer
        | TesterPresent
        | SecuredDataTransmission
        | ControlDtcSetting => true,
        NegativeResponse => false,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::codec::decode;
    use crate::config::ProtocolConfig;
    use crate::registry::Registry;

    fn rdbi_request() -> UdsMessage {
        UdsMessage::new(0x22).with("identifiers", vec![0xF190u16, 0xF18C])
    }

    #[rstest]
    #[case(0x22, false, true)]
    #[case(0x22, true, true)]
    #[case(0x78, false, false)]
    #[case(0x78, true, true)]
    #[case(0x31, false, true)]
    fn test_negative_response_correlation(
        #[case] nrc: u8,
        #[case] pending_is_answer: bool,
        #[case] expected: bool,
    ) {
        let nr = UdsMessage::negative_response(0x22, NegativeResponseCode::from(nrc));
        assert_eq!(answers_with(&nr, &rdbi_request(), pending_is_answer), expected);
    }

    #[test]
    fn test_negative_response_for_other_service() {
        let nr = UdsMessage::negative_response(0x2E, NegativeResponseCode::ConditionsNotCorrect);
        assert!(!answers_with(&nr, &rdbi_request(), true));
    }

    #[test]
    fn test_negative_response_scenario() {
        let nr = decode(&[0x7F, 0x22, 0x31]).unwrap();
        assert!(answers(&nr, &rdbi_request()));
        assert_eq!(hashret(&nr), vec![0x22]);
    }

    #[test]
    fn test_malformed_negative_response_never_matches() {
        let nr = UdsMessage::new(0x7F).with("requestServiceId", 0x22u8);
        assert!(!answers_with(&nr, &rdbi_request(), true));
    }

    #[test]
    fn test_global_policy() {
        let pending = UdsMessage::negative_response(0x22, NegativeResponseCode::ResponsePending);

        ProtocolConfig {
            treat_response_pending_as_answer: true,
        }
        .install();
        assert!(answers(&pending, &rdbi_request()));

        ProtocolConfig::default().install();
        assert!(!answers(&pending, &rdbi_request()));
    }

    #[test]
    fn test_read_data_by_identifier_must_be_requested() {
        let vin = UdsMessage::new(0x62).with("dataIdentifier", 0xF190u16);
        let other = UdsMessage::new(0x62).with("dataIdentifier", 0xF187u16);
        assert!(answers_with(&vin, &rdbi_request(), false));
        assert!(!answers_with(&other, &rdbi_request(), false));
    }

    #[test]
    fn test_session_type_must_match() {
        let request = UdsMessage::new(0x10).with("diagnosticSessionType", 0x03u8);
        let ok = UdsMessage::new(0x50).with("diagnosticSessionType", 0x03u8);
        let wrong = UdsMessage::new(0x50).with("diagnosticSessionType", 0x02u8);
        assert!(answers_with(&ok, &request, false));
        assert!(!answers_with(&wrong, &request, false));
        assert!(!answers_with(&request, &ok, false));
    }

    #[test]
    fn test_routine_control_checks_type_and_identifier() {
        let request = UdsMessage::new(0x31)
            .with("routineControlType", 0x01u8)
            .with("routineIdentifier", 0xFF00u16);
        let ok = UdsMessage::new(0x71)
            .with("routineControlType", 0x01u8)
            .with("routineIdentifier", 0xFF00u16);
        let wrong_type = UdsMessage::new(0x71)
            .with("routineControlType", 0x03u8)
            .with("routineIdentifier", 0xFF00u16);
        let wrong_id = UdsMessage::new(0x71)
            .with("routineControlType", 0x01u8)
            .with("routineIdentifier", 0xFF01u16);
        assert!(answers_with(&ok, &request, false));
        assert!(!answers_with(&wrong_type, &request, false));
        assert!(!answers_with(&wrong_id, &request, false));
    }

    #[test]
    fn test_transfer_data_block_counter() {
        let request = decode(&[0x36, 0x05, 0xAA, 0xBB]).unwrap();
        assert!(answers_with(&decode(&[0x76, 0x05]).unwrap(), &request, false));
        assert!(!answers_with(&decode(&[0x76, 0x04]).unwrap(), &request, false));
    }

    #[test]
    fn test_write_memory_nibbles() {
        let request = decode(&[0x3D, 0x12, 0x10, 0x00, 0x02, 0xAA, 0xBB]).unwrap();
        let ok = decode(&[0x7D, 0x12, 0x10, 0x00, 0x02]).unwrap();
        let wrong = decode(&[0x7D, 0x11, 0x10, 0x02]).unwrap();
        assert!(answers_with(&ok, &request, false));
        assert!(!answers_with(&wrong, &request, false));
    }

    #[test]
    fn test_missing_field_does_not_match() {
        let request = UdsMessage::new(0x27).with("securityAccessType", 0x01u8);
        let candidate = UdsMessage::new(0x67).with("securitySeed", vec![0x01u8]);
        assert!(!answers_with(&candidate, &request, false));
    }

    #[test]
    fn test_bare_response_falls_back_to_length() {
        let clear = decode(&[0x14, 0xFF, 0xFF, 0xFF]).unwrap();
        let cleared = decode(&[0x54]).unwrap();
        assert!(answers_with(&cleared, &clear, false));

        let exit = UdsMessage::new(0x37);
        let exit_with_record = UdsMessage::new(0x77)
            .with("transferResponseParameterRecord", vec![0x12u8, 0x34]);
        assert!(!answers_with(&exit_with_record, &exit, false));
        assert!(answers_with(&UdsMessage::new(0x77), &exit, false));
    }

    #[test]
    fn test_unrelated_service_does_not_match() {
        let request = UdsMessage::new(0x3E).with("subFunction", 0x00u8);
        let response = UdsMessage::new(0x50).with("diagnosticSessionType", 0x01u8);
        assert!(!answers_with(&response, &request, false));
        let tp = UdsMessage::new(0x7E).with("zeroSubFunction", 0x00u8);
        assert!(answers_with(&tp, &request, false));
    }

    #[test]
    fn test_hashret_stable_for_every_pair() {
        for (request, response) in Registry::standard().pairs() {
            let req = UdsMessage::new(request.service_id());
            let resp = UdsMessage::new(response.service_id());
            assert_eq!(hashret(&req), hashret(&resp), "{}", request.name());
            assert_eq!(hashret(&req), vec![request.service_id()]);

            let nr = UdsMessage::negative_response(
                request.service_id(),
                NegativeResponseCode::GeneralReject,
            );
            assert_eq!(hashret(&nr), hashret(&req));
        }
    }
}
