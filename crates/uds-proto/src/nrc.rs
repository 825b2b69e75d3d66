//! UDS Negative Response Codes (NRC)

use std::fmt;

macro_rules! negative_response_codes {
    ($($variant:ident = $code:literal => $name:literal,)*) => {
        /// UDS Negative Response Codes (ISO 14229-1 Annex A.1)
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NegativeResponseCode {
            $($variant,)*
            /// Reserved or manufacturer specific code
            Unknown(u8),
        }

        impl From<u8> for NegativeResponseCode {
            fn from(value: u8) -> Self {
                match value {
                    $($code => Self::$variant,)*
                    other => Self::Unknown(other),
                }
            }
        }

        impl From<NegativeResponseCode> for u8 {
            fn from(nrc: NegativeResponseCode) -> Self {
                match nrc {
                    $(NegativeResponseCode::$variant => $code,)*
                    NegativeResponseCode::Unknown(v) => v,
                }
            }
        }

        impl NegativeResponseCode {
            /// ISO 14229 parameter name, e.g. `requestOutOfRange`
            pub fn iso_name(&self) -> Option<&'static str> {
                match self {
                    $(Self::$variant => Some($name),)*
                    Self::Unknown(_) => None,
                }
            }

            /// Every code with a standard name, in ascending order
            pub fn all() -> &'static [(u8, &'static str)] {
                &[$(($code, $name),)*]
            }
        }
    };
}

negative_response_codes! {
    PositiveResponse = 0x00 => "positiveResponse",
    GeneralReject = 0x10 => "generalReject",
    ServiceNotSupported = 0x11 => "serviceNotSupported",
    SubFunctionNotSupported = 0x12 => "subFunctionNotSupported",
    IncorrectMessageLengthOrFormat = 0x13 => "incorrectMessageLengthOrInvalidFormat",
    ResponseTooLong = 0x14 => "responseTooLong",
    BusyRepeatRequest = 0x21 => "busyRepeatRequest",
    ConditionsNotCorrect = 0x22 => "conditionsNotCorrect",
    RequestSequenceError = 0x24 => "requestSequenceError",
    NoResponseFromSubnet = 0x25 => "noResponseFromSubnetComponent",
    FailurePreventsExecution = 0x26 => "failurePreventsExecutionOfRequestedAction",
    RequestOutOfRange = 0x31 => "requestOutOfRange",
    SecurityAccessDenied = 0x33 => "securityAccessDenied",
    InvalidKey = 0x35 => "invalidKey",
    ExceededNumberOfAttempts = 0x36 => "exceedNumberOfAttempts",
    RequiredTimeDelayNotExpired = 0x37 => "requiredTimeDelayNotExpired",
    UploadDownloadNotAccepted = 0x70 => "uploadDownloadNotAccepted",
    TransferDataSuspended = 0x71 => "transferDataSuspended",
    GeneralProgrammingFailure = 0x72 => "generalProgrammingFailure",
    WrongBlockSequenceCounter = 0x73 => "wrongBlockSequenceCounter",
    ResponsePending = 0x78 => "requestCorrectlyReceived-ResponsePending",
    SubFunctionNotSupportedInActiveSession = 0x7E => "subFunctionNotSupportedInActiveSession",
    ServiceNotSupportedInActiveSession = 0x7F => "serviceNotSupportedInActiveSession",
    RpmTooHigh = 0x81 => "rpmTooHigh",
    RpmTooLow = 0x82 => "rpmTooLow",
    EngineRunning = 0x83 => "engineIsRunning",
    EngineNotRunning = 0x84 => "engineIsNotRunning",
    EngineRunTimeTooLow = 0x85 => "engineRunTimeTooLow",
    TemperatureTooHigh = 0x86 => "temperatureTooHigh",
    TemperatureTooLow = 0x87 => "temperatureTooLow",
    VehicleSpeedTooHigh = 0x88 => "vehicleSpeedTooHigh",
    VehicleSpeedTooLow = 0x89 => "vehicleSpeedTooLow",
    ThrottleTooHigh = 0x8A => "throttle/PedalTooHigh",
    ThrottleTooLow = 0x8B => "throttle/PedalTooLow",
    TransmissionNotInNeutral = 0x8C => "transmissionRangeNotInNeutral",
    TransmissionNotInGear = 0x8D => "transmissionRangeNotInGear",
    BrakeSwitchNotClosed = 0x8F => "brakeSwitch(es)NotClosed",
    ShifterNotInPark = 0x90 => "shifterLeverNotInPark",
    TorqueConverterClutchLocked = 0x91 => "torqueConverterClutchLocked",
    VoltageTooHigh = 0x92 => "voltageTooHigh",
    VoltageTooLow = 0x93 => "voltageTooLow",
}

impl NegativeResponseCode {
    /// "Request correctly received, response pending" (0x78)
    pub fn is_response_pending(&self) -> bool {
        matches!(self, Self::ResponsePending)
    }
}

impl fmt::UpperHex for NegativeResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value: u8 = (*self).into();
        fmt::UpperHex::fmt(&value, f)
    }
}

impl fmt::Display for NegativeResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.iso_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Unknown(0x{:02X})", u8::from(*self)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nrc_byte_conversion() {
        let nrc = NegativeResponseCode::from(0x31);
        assert_eq!(nrc, NegativeResponseCode::RequestOutOfRange);
        assert_eq!(u8::from(nrc), 0x31);
        assert_eq!(nrc.to_string(), "requestOutOfRange");
    }

    #[test]
    fn test_nrc_unknown_keeps_raw_value() {
        let nrc = NegativeResponseCode::from(0xF3);
        assert_eq!(nrc, NegativeResponseCode::Unknown(0xF3));
        assert_eq!(u8::from(nrc), 0xF3);
        assert_eq!(format!("{:X}", nrc), "F3");
        assert_eq!(nrc.to_string(), "Unknown(0xF3)");
    }

    #[test]
    fn test_response_pending() {
        assert!(NegativeResponseCode::from(0x78).is_response_pending());
        assert!(!NegativeResponseCode::from(0x22).is_response_pending());
    }
}
