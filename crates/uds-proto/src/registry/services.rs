//! UDS service kinds
//!
//! One variant per request service. A request and its positive response
//! share a kind; the negative response envelope has its own.

use crate::constants::service_id::{self, NEGATIVE_RESPONSE, RESPONSE_BIT};

macro_rules! service_kinds {
    ($($variant:ident = $id:path => $name:literal,)*) => {
        /// Message kind, shared by a request and its positive response
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ServiceKind {
            $($variant,)*
            NegativeResponse,
        }

        impl ServiceKind {
            /// Every request service, in ascending id order
            pub const REQUESTS: &'static [ServiceKind] = &[$(ServiceKind::$variant,)*];

            /// Request service id (0x7F for the negative response)
            pub fn request_id(&self) -> u8 {
                match self {
                    $(Self::$variant => $id,)*
                    Self::NegativeResponse => NEGATIVE_RESPONSE,
                }
            }

            /// ISO 14229 service name
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                    Self::NegativeResponse => "NegativeResponse",
                }
            }

            /// Name of the positive response message
            pub fn response_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => concat!($name, "PositiveResponse"),)*
                    Self::NegativeResponse => "NegativeResponse",
                }
            }
        }
    };
}

service_kinds! {
    DiagnosticSessionControl = service_id::DIAGNOSTIC_SESSION_CONTROL => "DiagnosticSessionControl",
    EcuReset = service_id::ECU_RESET => "ECUReset",
    ClearDiagnosticInformation = service_id::CLEAR_DIAGNOSTIC_INFO => "ClearDiagnosticInformation",
    ReadDtcInformation = service_id::READ_DTC_INFO => "ReadDTCInformation",
    ReadDataByIdentifier = service_id::READ_DATA_BY_ID => "ReadDataByIdentifier",
    ReadMemoryByAddress = service_id::READ_MEMORY_BY_ADDRESS => "ReadMemoryByAddress",
    ReadScalingDataByIdentifier = service_id::READ_SCALING_DATA_BY_ID => "ReadScalingDataByIdentifier",
    SecurityAccess = service_id::SECURITY_ACCESS => "SecurityAccess",
    CommunicationControl = service_id::COMMUNICATION_CONTROL => "CommunicationControl",
    ReadDataByPeriodicIdentifier = service_id::READ_DATA_BY_PERIODIC_ID => "ReadDataByPeriodicIdentifier",
    DynamicallyDefineDataIdentifier = service_id::DYNAMICALLY_DEFINE_DATA_ID => "DynamicallyDefineDataIdentifier",
    WriteDataByIdentifier = service_id::WRITE_DATA_BY_ID => "WriteDataByIdentifier",
    InputOutputControlByIdentifier = service_id::IO_CONTROL_BY_ID => "InputOutputControlByIdentifier",
    RoutineControl = service_id::ROUTINE_CONTROL => "RoutineControl",
    RequestDownload = service_id::REQUEST_DOWNLOAD => "RequestDownload",
    RequestUpload = service_id::REQUEST_UPLOAD => "RequestUpload",
    TransferData = service_id::TRANSFER_DATA => "TransferData",
    RequestTransferExit = service_id::REQUEST_TRANSFER_EXIT => "RequestTransferExit",
    RequestFileTransfer = service_id::REQUEST_FILE_TRANSFER => "RequestFileTransfer",
    WriteMemoryByAddress = service_id::WRITE_MEMORY_BY_ADDRESS => "WriteMemoryByAddress",
    TesterPresent = service_id::TESTER_PRESENT => "TesterPresent",
    AccessTimingParameter = service_id::ACCESS_TIMING_PARAMETER => "AccessTimingParameter",
    SecuredDataTransmission = service_id::SECURED_DATA_TRANSMISSION => "SecuredDataTransmission",
    ControlDtcSetting = service_id::CONTROL_DTC_SETTING => "ControlDTCSetting",
    ResponseOnEvent = service_id::RESPONSE_ON_EVENT => "ResponseOnEvent",
    LinkControl = service_id::LINK_CONTROL => "LinkControl",
}

impl ServiceKind {
    /// Kind of a request or positive-response id
    pub fn from_service_id(id: u8) -> Option<Self> {
        if id == NEGATIVE_RESPONSE {
            return Some(Self::NegativeResponse);
        }
        let request = id & !RESPONSE_BIT;
        Self::REQUESTS
            .iter()
            .copied()
            .find(|k| k.request_id() == request)
    }

    /// Positive response id (`request_id | 0x40`), none for the negative response
    pub fn response_id(&self) -> Option<u8> {
        match self {
            Self::NegativeResponse => None,
            other => Some(other.request_id() | RESPONSE_BIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twenty_six_request_services() {
        assert_eq!(ServiceKind::REQUESTS.len(), 26);
        for kind in ServiceKind::REQUESTS {
            assert_eq!(kind.request_id() & RESPONSE_BIT, 0, "{}", kind.name());
        }
    }

    #[test]
    fn test_from_service_id() {
        assert_eq!(
            ServiceKind::from_service_id(0x10),
            Some(ServiceKind::DiagnosticSessionControl)
        );
        assert_eq!(
            ServiceKind::from_service_id(0x50),
            Some(ServiceKind::DiagnosticSessionControl)
        );
        assert_eq!(
            ServiceKind::from_service_id(0xC7),
            Some(ServiceKind::LinkControl)
        );
        assert_eq!(
            ServiceKind::from_service_id(0x7F),
            Some(ServiceKind::NegativeResponse)
        );
        assert_eq!(ServiceKind::from_service_id(0x01), None);
    }

    #[test]
    fn test_response_names() {
        assert_eq!(ServiceKind::EcuReset.response_id(), Some(0x51));
        assert_eq!(
            ServiceKind::TesterPresent.response_name(),
            "TesterPresentPositiveResponse"
        );
        assert_eq!(ServiceKind::NegativeResponse.response_id(), None);
    }
}
