//! Display names for enumerated field values
//!
//! Kept apart from the message shapes: registering a name never changes how
//! a message is decoded, only how it is shown.

use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::RwLock;

use super::services::ServiceKind;
use crate::constants::service_id::{self, NEGATIVE_RESPONSE, RESPONSE_BIT};
use crate::constants::standard_did;
use crate::nrc::NegativeResponseCode;

type FieldNames = HashMap<String, HashMap<u64, String>>;

/// Read-mostly name lookup keyed by service, field and raw value
///
/// Requests and their positive responses share one table per field. The
/// data identifiers of ReadDataByIdentifier (`identifiers` and
/// `dataIdentifier`) and WriteDataByIdentifier share a single table.
#[derive(Debug, Default)]
pub struct NameTables {
    tables: RwLock<HashMap<u8, FieldNames>>,
}

/// Table holding `field` of `service_id`
fn table_slot(service_id: u8, field: &str) -> (u8, &str) {
    let key = if service_id == NEGATIVE_RESPONSE {
        service_id
    } else {
        service_id & !RESPONSE_BIT
    };
    match (key, field) {
        (service_id::READ_DATA_BY_ID, "identifiers" | "dataIdentifier")
        | (service_id::WRITE_DATA_BY_ID, "dataIdentifier") => {
            (service_id::READ_DATA_BY_ID, "dataIdentifier")
        }
        _ => (key, field),
    }
}

impl NameTables {
    /// Empty tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables seeded with the ISO 14229-1 names
    pub fn standard() -> Self {
        let tables = Self::new();
        tables.seed();
        tables
    }

    /// Process-wide tables used by [`crate::UdsMessage::describe`]
    pub fn global() -> &'static NameTables {
        static GLOBAL: OnceLock<NameTables> = OnceLock::new();
        GLOBAL.get_or_init(Self::standard)
    }

    /// Name of `raw` in `field` of `service_id`, if one is registered
    pub fn display_name(&self, service_id: u8, field: &str, raw: u64) -> Option<String> {
        let (key, field) = table_slot(service_id, field);
        self.tables
            .read()
            .get(&key)
            .and_then(|fields| fields.get(field))
            .and_then(|values| values.get(&raw))
            .cloned()
    }

    /// Add or replace one name, e.g. a vendor-specific data identifier
    pub fn register(&self, service_id: u8, field: &str, raw: u64, name: impl Into<String>) {
        let (key, field) = table_slot(service_id, field);
        self.tables
            .write()
            .entry(key)
            .or_default()
            .entry(field.to_string())
            .or_default()
            .insert(raw, name.into());
    }

    /// Add a batch of names for one field under a single write lock
    pub fn register_all<'a>(
        &self,
        service_id: u8,
        field: &str,
        names: impl IntoIterator<Item = (u64, &'a str)>,
    ) {
        let (key, field) = table_slot(service_id, field);
        let mut tables = self.tables.write();
        let values = tables
            .entry(key)
            .or_default()
            .entry(field.to_string())
            .or_default();
        for (raw, name) in names {
            values.insert(raw, name.to_string());
        }
    }

    fn seed_u8(&self, service_id: u8, field: &str, names: &[(u8, &str)]) {
        self.register_all(
            service_id,
            field,
            names.iter().map(|(raw, name)| (u64::from(*raw), *name)),
        );
    }

    fn seed(&self) {
        use service_id::*;

        self.seed_u8(
            DIAGNOSTIC_SESSION_CONTROL,
            "diagnosticSessionType",
            &[
                (0x00, "ISOSAEReserved"),
                (0x01, "defaultSession"),
                (0x02, "programmingSession"),
                (0x03, "extendedDiagnosticSession"),
                (0x04, "safetySystemDiagnosticSession"),
                (0x7F, "ISOSAEReserved"),
            ],
        );

        self.seed_u8(
            ECU_RESET,
            "resetType",
            &[
                (0x00, "ISOSAEReserved"),
                (0x01, "hardReset"),
                (0x02, "keyOffOnReset"),
                (0x03, "softReset"),
                (0x04, "enableRapidPowerShutDown"),
                (0x05, "disableRapidPowerShutDown"),
                (0x41, "powerDown"),
                (0x7F, "ISOSAEReserved"),
            ],
        );

        self.seed_u8(
            COMMUNICATION_CONTROL,
            "controlType",
            &[
                (0x00, "enableRxAndTx"),
                (0x01, "enableRxAndDisableTx"),
                (0x02, "disableRxAndEnableTx"),
                (0x03, "disableRxAndTx"),
            ],
        );
        self.seed_u8(
            COMMUNICATION_CONTROL,
            "communicationType0",
            &[
                (0x00, "ISOSAEReserved"),
                (0x01, "normalCommunicationMessages"),
                (0x02, "networkManagmentCommunicationMessages"),
                (
                    0x03,
                    "networkManagmentCommunicationMessages and normalCommunicationMessages",
                ),
            ],
        );
        self.register_all(
            COMMUNICATION_CONTROL,
            "communicationType2",
            std::iter::once((0, "Disable/Enable specified communication Type"))
                .chain((1..15).map(|n| (n, "Disable/Enable specific subnet")))
                .chain(std::iter::once((15, "Disable/Enable network"))),
        );

        self.seed_u8(
            ACCESS_TIMING_PARAMETER,
            "timingParameterAccessType",
            &[
                (0x00, "ISOSAEReserved"),
                (0x01, "readExtendedTimingParameterSet"),
                (0x02, "setTimingParametersToDefaultValues"),
                (0x03, "readCurrentlyActiveTimingParameters"),
                (0x04, "setTimingParametersToGivenValues"),
            ],
        );

        self.seed_u8(
            CONTROL_DTC_SETTING,
            "DTCSettingType",
            &[(0x00, "ISOSAEReserved"), (0x01, "on"), (0x02, "off")],
        );

        self.seed_u8(
            RESPONSE_ON_EVENT,
            "eventType",
            &[(0x00, "doNotStoreEvent"), (0x01, "storeEvent")],
        );

        self.seed_u8(
            LINK_CONTROL,
            "linkControlType",
            &[
                (0x00, "ISOSAEReserved"),
                (0x01, "verifyBaudrateTransitionWithFixedBaudrate"),
                (0x02, "verifyBaudrateTransitionWithSpecificBaudrate"),
                (0x03, "transitionBaudrate"),
            ],
        );

        self.seed_u8(
            READ_DATA_BY_PERIODIC_ID,
            "transmissionMode",
            &[
                (0x00, "ISOSAEReserved"),
                (0x01, "sendAtSlowRate"),
                (0x02, "sendAtMediumRate"),
                (0x03, "sendAtFastRate"),
                (0x04, "stopSending"),
            ],
        );

        self.seed_u8(
            DYNAMICALLY_DEFINE_DATA_ID,
            "subFunction",
            &[
                (0x01, "defineByIdentifier"),
                (0x02, "defineByMemoryAddress"),
                (0x03, "clearDynamicallyDefinedDataIdentifier"),
            ],
        );

        self.seed_u8(
            READ_DTC_INFO,
            "reportType",
            &[
                (0x00, "ISOSAEReserved"),
                (0x01, "reportNumberOfDTCByStatusMask"),
                (0x02, "reportDTCByStatusMask"),
                (0x03, "reportDTCSnapshotIdentification"),
                (0x04, "reportDTCSnapshotRecordByDTCNumber"),
                (0x05, "reportDTCSnapshotRecordByRecordNumber"),
                (0x06, "reportDTCExtendedDataRecordByDTCNumber"),
                (0x07, "reportNumberOfDTCBySeverityMaskRecord"),
                (0x08, "reportDTCBySeverityMaskRecord"),
                (0x09, "reportSeverityInformationOfDTC"),
                (0x0A, "reportSupportedDTC"),
                (0x0B, "reportFirstTestFailedDTC"),
                (0x0C, "reportFirstConfirmedDTC"),
                (0x0D, "reportMostRecentTestFailedDTC"),
                (0x0E, "reportMostRecentConfirmedDTC"),
                (0x0F, "reportMirrorMemoryDTCByStatusMask"),
                (0x10, "reportMirrorMemoryDTCExtendedDataRecordByDTCNumber"),
                (0x11, "reportNumberOfMirrorMemoryDTCByStatusMask"),
                (0x12, "reportNumberOfEmissionsRelatedOBDDTCByStatusMask"),
                (0x13, "reportEmissionsRelatedOBDDTCByStatusMask"),
                (0x14, "reportDTCFaultDetectionCounter"),
                (0x15, "reportDTCWithPermanentStatus"),
            ],
        );
        self.seed_u8(
            READ_DTC_INFO,
            "DTCFormatIdentifier",
            &[
                (0x00, "ISO15031-6DTCFormat"),
                (0x01, "UDS-1DTCFormat"),
                (0x02, "SAEJ1939-73DTCFormat"),
                (0x03, "ISO11992-4DTCFormat"),
            ],
        );

        self.seed_u8(
            ROUTINE_CONTROL,
            "routineControlType",
            &[
                (0x00, "ISOSAEReserved"),
                (0x01, "startRoutine"),
                (0x02, "stopRoutine"),
                (0x03, "requestRoutineResults"),
            ],
        );

        for sid in [REQUEST_DOWNLOAD, REQUEST_UPLOAD] {
            self.seed_u8(
                sid,
                "dataFormatIdentifier",
                &[(0x00, "noCompressionNoEncryption")],
            );
        }

        self.seed_u8(
            REQUEST_FILE_TRANSFER,
            "modeOfOperation",
            &[
                (0x00, "ISO/SAE Reserved"),
                (0x01, "Add File"),
                (0x02, "Delete File"),
                (0x03, "Replace File"),
                (0x04, "Read File"),
                (0x05, "Read Directory"),
            ],
        );

        let dids = || {
            standard_did::NAMES
                .iter()
                .map(|(raw, name)| (u64::from(*raw), *name))
        };
        for sid in [READ_DATA_BY_ID, READ_SCALING_DATA_BY_ID, IO_CONTROL_BY_ID] {
            self.register_all(sid, "dataIdentifier", dids());
        }

        self.register_all(
            NEGATIVE_RESPONSE,
            "requestServiceId",
            ServiceKind::REQUESTS
                .iter()
                .map(|k| (u64::from(k.request_id()), k.name())),
        );
        self.register_all(
            NEGATIVE_RESPONSE,
            "negativeResponseCode",
            NegativeResponseCode::all()
                .iter()
                .map(|(raw, name)| (u64::from(*raw), *name)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_and_response_share_tables() {
        let names = NameTables::standard();
        assert_eq!(
            names.display_name(0x10, "diagnosticSessionType", 0x02).as_deref(),
            Some("programmingSession")
        );
        assert_eq!(
            names.display_name(0x50, "diagnosticSessionType", 0x02).as_deref(),
            Some("programmingSession")
        );
    }

    #[test]
    fn test_unknown_value_has_no_name() {
        let names = NameTables::standard();
        assert_eq!(names.display_name(0x10, "diagnosticSessionType", 0x42), None);
        assert_eq!(names.display_name(0x10, "noSuchField", 0x01), None);
    }

    #[test]
    fn test_negative_response_tables() {
        let names = NameTables::standard();
        assert_eq!(
            names.display_name(0x7F, "requestServiceId", 0x22).as_deref(),
            Some("ReadDataByIdentifier")
        );
        assert_eq!(
            names.display_name(0x7F, "negativeResponseCode", 0x78).as_deref(),
            Some("requestCorrectlyReceived-ResponsePending")
        );
    }

    #[test]
    fn test_read_and_write_share_identifier_names() {
        let names = NameTables::standard();
        names.register(0x22, "dataIdentifier", 0x0101, "engineSpeed");

        for (service_id, field) in [
            (0x22, "identifiers"),
            (0x62, "dataIdentifier"),
            (0x2E, "dataIdentifier"),
            (0x6E, "dataIdentifier"),
        ] {
            assert_eq!(
                names.display_name(service_id, field, 0x0101).as_deref(),
                Some("engineSpeed"),
                "0x{service_id:02X} {field}"
            );
        }
        // Scaling data and IO control keep tables of their own
        assert_eq!(names.display_name(0x24, "dataIdentifier", 0x0101), None);
        assert_eq!(names.display_name(0x2F, "dataIdentifier", 0x0101), None);

        names.register(0x2E, "dataIdentifier", 0x0202, "odometer");
        let request = crate::UdsMessage::new(0x22).with("identifiers", vec![0x0101u16, 0x0202]);
        assert_eq!(
            request.describe_with(crate::Registry::standard(), &names),
            "ReadDataByIdentifier identifiers=[engineSpeed, odometer]"
        );
    }

    #[test]
    fn test_vendor_names_at_runtime() {
        let names = NameTables::standard();
        assert_eq!(names.display_name(0x62, "dataIdentifier", 0x0101), None);

        names.register(0x22, "dataIdentifier", 0x0101, "engineSpeed");
        assert_eq!(
            names.display_name(0x62, "dataIdentifier", 0x0101).as_deref(),
            Some("engineSpeed")
        );
        assert_eq!(
            names.display_name(0x22, "dataIdentifier", 0xF190).as_deref(),
            Some("VIN")
        );
    }
}
