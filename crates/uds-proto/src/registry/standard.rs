//! ISO 14229-1 service table
//!
//! Field names follow the ISO parameter names so that decoded messages can
//! be compared against traces from other tools.

use super::services::ServiceKind;
use super::shape::{Direction, MessageShape, ShapeBuilder};
use super::Registry;
use crate::codec::layout::Condition::{Equals, Even, NoneOf, Odd, OneOf};
use crate::constants::service_id::{NEGATIVE_RESPONSE, RESPONSE_BIT};
use crate::error::RegistryError;

fn request(kind: ServiceKind) -> ShapeBuilder {
    MessageShape::builder(kind.request_id(), kind.name(), kind, Direction::Request)
}

fn response(kind: ServiceKind) -> ShapeBuilder {
    MessageShape::builder(
        kind.request_id() | RESPONSE_BIT,
        kind.response_name(),
        kind,
        Direction::PositiveResponse,
    )
}

/// addressAndLengthFormatIdentifier followed by the address and size fields
/// it selects
fn memory_location(builder: ShapeBuilder) -> ShapeBuilder {
    builder
        .bits("memorySizeLen", 4)
        .bits("memoryAddressLen", 4)
        .uint("memoryAddress1", 1)
        .when("memoryAddressLen", Equals(1))
        .uint("memoryAddress2", 2)
        .when("memoryAddressLen", Equals(2))
        .uint("memoryAddress3", 3)
        .when("memoryAddressLen", Equals(3))
        .uint("memoryAddress4", 4)
        .when("memoryAddressLen", Equals(4))
        .uint("memorySize1", 1)
        .when("memorySizeLen", Equals(1))
        .uint("memorySize2", 2)
        .when("memorySizeLen", Equals(2))
        .uint("memorySize3", 3)
        .when("memorySizeLen", Equals(3))
        .uint("memorySize4", 4)
        .when("memorySizeLen", Equals(4))
}

/// Register every standard service and the negative response
pub(crate) fn populate(registry: &mut Registry) -> Result<(), RegistryError> {
    use ServiceKind::*;

    registry.register(
        request(DiagnosticSessionControl)
            .enum_byte("diagnosticSessionType")
            .build()?,
        response(DiagnosticSessionControl)
            .enum_byte("diagnosticSessionType")
            .greedy("sessionParameterRecord")
            .build()?,
    )?;

    registry.register(
        request(EcuReset).enum_byte("resetType").build()?,
        response(EcuReset)
            .enum_byte("resetType")
            .byte("powerDownTime")
            .when("resetType", Equals(0x04))
            .build()?,
    )?;

    registry.register(
        request(ClearDiagnosticInformation)
            .byte("groupOfDTCHighByte")
            .byte("groupOfDTCMiddleByte")
            .byte("groupOfDTCLowByte")
            .build()?,
        response(ClearDiagnosticInformation).build()?,
    )?;

    registry.register(
        request(ReadDtcInformation)
            .enum_byte("reportType")
            .byte("DTCSeverityMask")
            .when("reportType", OneOf(&[0x07, 0x08]))
            .byte("DTCStatusMask")
            .when(
                "reportType",
                OneOf(&[0x01, 0x02, 0x07, 0x08, 0x0F, 0x11, 0x12, 0x13]),
            )
            .byte("DTCHighByte")
            .when("reportType", OneOf(&[0x03, 0x04, 0x06, 0x10, 0x09]))
            .byte("DTCMiddleByte")
            .when("reportType", OneOf(&[0x03, 0x04, 0x06, 0x10, 0x09]))
            .byte("DTCLowByte")
            .when("reportType", OneOf(&[0x03, 0x04, 0x06, 0x10, 0x09]))
            .byte("DTCSnapshotRecordNumber")
            .when("reportType", OneOf(&[0x03, 0x04, 0x05]))
            .byte("DTCExtendedDataRecordNumber")
            .when("reportType", OneOf(&[0x06, 0x10]))
            .build()?,
        response(ReadDtcInformation)
            .enum_byte("reportType")
            .byte("DTCStatusAvailabilityMask")
            .when(
                "reportType",
                OneOf(&[
                    0x01, 0x07, 0x11, 0x12, 0x02, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, 0x13, 0x15,
                ]),
            )
            .enum_byte("DTCFormatIdentifier")
            .when("reportType", OneOf(&[0x01, 0x07, 0x11, 0x12]))
            .uint("DTCCount", 2)
            .when("reportType", OneOf(&[0x01, 0x07, 0x11, 0x12]))
            .greedy("DTCAndStatusRecord")
            .when(
                "reportType",
                OneOf(&[0x02, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, 0x13, 0x15]),
            )
            .greedy("dataRecord")
            .when(
                "reportType",
                OneOf(&[0x03, 0x04, 0x05, 0x06, 0x08, 0x09, 0x10, 0x14]),
            )
            .build()?,
    )?;

    // Record data after the identifier stays in the trailing payload
    registry.register(
        request(ReadDataByIdentifier)
            .uint_list("identifiers", 2)
            .build()?,
        response(ReadDataByIdentifier)
            .uint("dataIdentifier", 2)
            .build()?,
    )?;

    registry.register(
        memory_location(request(ReadMemoryByAddress)).build()?,
        response(ReadMemoryByAddress).greedy("dataRecord").build()?,
    )?;

    registry.register(
        request(ReadScalingDataByIdentifier)
            .uint("dataIdentifier", 2)
            .build()?,
        response(ReadScalingDataByIdentifier)
            .uint("dataIdentifier", 2)
            .byte("scalingByte")
            .greedy("dataRecord")
            .build()?,
    )?;

    registry.register(
        request(SecurityAccess)
            .byte("securityAccessType")
            .greedy("securityAccessDataRecord")
            .when("securityAccessType", Odd)
            .greedy("securityKey")
            .when("securityAccessType", Even)
            .build()?,
        response(SecurityAccess)
            .byte("securityAccessType")
            .greedy("securitySeed")
            .when("securityAccessType", Odd)
            .build()?,
    )?;

    registry.register(
        request(CommunicationControl)
            .enum_byte("controlType")
            .bits("communicationType0", 2)
            .bits("communicationType1", 2)
            .bits("communicationType2", 4)
            .build()?,
        response(CommunicationControl)
            .enum_byte("controlType")
            .build()?,
    )?;

    registry.register(
        request(ReadDataByPeriodicIdentifier)
            .enum_byte("transmissionMode")
            .byte("periodicDataIdentifier")
            .greedy("furtherPeriodicDataIdentifier")
            .build()?,
        response(ReadDataByPeriodicIdentifier)
            .byte("periodicDataIdentifier")
            .greedy("dataRecord")
            .build()?,
    )?;

    registry.register(
        request(DynamicallyDefineDataIdentifier)
            .enum_byte("subFunction")
            .greedy("dataRecord")
            .build()?,
        response(DynamicallyDefineDataIdentifier)
            .enum_byte("subFunction")
            .uint("dynamicallyDefinedDataIdentifier", 2)
            .build()?,
    )?;

    // dataRecord is carried as trailing payload
    registry.register(
        request(WriteDataByIdentifier)
            .uint("dataIdentifier", 2)
            .build()?,
        response(WriteDataByIdentifier)
            .uint("dataIdentifier", 2)
            .build()?,
    )?;

    registry.register(
        request(InputOutputControlByIdentifier)
            .uint("dataIdentifier", 2)
            .byte("controlOptionRecord")
            .greedy("controlEnableMaskRecord")
            .build()?,
        response(InputOutputControlByIdentifier)
            .uint("dataIdentifier", 2)
            .greedy("controlStatusRecord")
            .build()?,
    )?;

    // routineControlOptionRecord / routineStatusRecord are trailing payload
    registry.register(
        request(RoutineControl)
            .enum_byte("routineControlType")
            .uint("routineIdentifier", 2)
            .build()?,
        response(RoutineControl)
            .enum_byte("routineControlType")
            .uint("routineIdentifier", 2)
            .build()?,
    )?;

    for kind in [RequestDownload, RequestUpload] {
        registry.register(
            memory_location(request(kind).enum_byte("dataFormatIdentifier")).build()?,
            response(kind)
                .bits("memorySizeLen", 4)
                .bits("reserved", 4)
                .greedy("maxNumberOfBlockLength")
                .build()?,
        )?;
    }

    registry.register(
        request(TransferData)
            .byte("blockSequenceCounter")
            .greedy("transferRequestParameterRecord")
            .build()?,
        response(TransferData)
            .byte("blockSequenceCounter")
            .greedy("transferResponseParameterRecord")
            .build()?,
    )?;

    registry.register(
        request(RequestTransferExit)
            .greedy("transferRequestParameterRecord")
            .build()?,
        response(RequestTransferExit)
            .greedy("transferResponseParameterRecord")
            .build()?,
    )?;

    registry.register(
        request(RequestFileTransfer)
            .enum_byte("modeOfOperation")
            .uint("filePathAndNameLength", 2)
            .length_prefixed("filePathAndName", "filePathAndNameLength")
            .bits("compressionMethod", 4)
            .when("modeOfOperation", NoneOf(&[0x02, 0x05]))
            .bits("encryptingMethod", 4)
            .when("modeOfOperation", NoneOf(&[0x02, 0x05]))
            .byte("fileSizeParameterLength")
            .when("modeOfOperation", NoneOf(&[0x02, 0x04, 0x05]))
            .length_prefixed("fileSizeUnCompressed", "fileSizeParameterLength")
            .when("modeOfOperation", NoneOf(&[0x02, 0x04, 0x05]))
            .length_prefixed("fileSizeCompressed", "fileSizeParameterLength")
            .when("modeOfOperation", NoneOf(&[0x02, 0x04, 0x05]))
            .build()?,
        response(RequestFileTransfer)
            .enum_byte("modeOfOperation")
            .byte("lengthFormatIdentifier")
            .when("modeOfOperation", NoneOf(&[0x02]))
            .length_prefixed("maxNumberOfBlockLength", "lengthFormatIdentifier")
            .when("modeOfOperation", NoneOf(&[0x02]))
            .bits("compressionMethod", 4)
            .when("modeOfOperation", NoneOf(&[0x02]))
            .bits("encryptingMethod", 4)
            .when("modeOfOperation", NoneOf(&[0x02]))
            .uint("fileSizeOrDirInfoParameterLength", 2)
            .when("modeOfOperation", NoneOf(&[0x01, 0x02, 0x03]))
            .length_prefixed(
                "fileSizeUncompressedOrDirInfoLength",
                "fileSizeOrDirInfoParameterLength",
            )
            .when("modeOfOperation", NoneOf(&[0x01, 0x02, 0x03]))
            .length_prefixed("fileSizeCompressed", "fileSizeOrDirInfoParameterLength")
            .when("modeOfOperation", NoneOf(&[0x01, 0x02, 0x03, 0x05]))
            .build()?,
    )?;

    registry.register(
        memory_location(request(WriteMemoryByAddress))
            .greedy("dataRecord")
            .build()?,
        memory_location(response(WriteMemoryByAddress)).build()?,
    )?;

    registry.register(
        request(TesterPresent).byte("subFunction").build()?,
        response(TesterPresent).byte("zeroSubFunction").build()?,
    )?;

    registry.register(
        request(AccessTimingParameter)
            .enum_byte("timingParameterAccessType")
            .greedy("timingParameterRequestRecord")
            .when("timingParameterAccessType", Equals(0x04))
            .build()?,
        response(AccessTimingParameter)
            .enum_byte("timingParameterAccessType")
            .greedy("timingParameterResponseRecord")
            .when("timingParameterAccessType", Equals(0x03))
            .build()?,
    )?;

    registry.register(
        request(SecuredDataTransmission)
            .greedy("securityDataRequestRecord")
            .build()?,
        response(SecuredDataTransmission)
            .greedy("securityDataResponseRecord")
            .build()?,
    )?;

    registry.register(
        request(ControlDtcSetting)
            .enum_byte("DTCSettingType")
            .greedy("DTCSettingControlOptionRecord")
            .build()?,
        response(ControlDtcSetting)
            .enum_byte("DTCSettingType")
            .build()?,
    )?;

    registry.register(
        request(ResponseOnEvent)
            .enum_byte("eventType")
            .byte("eventWindowTime")
            .greedy("eventTypeRecord")
            .build()?,
        response(ResponseOnEvent)
            .enum_byte("eventType")
            .byte("numberOfIdentifiedEvents")
            .byte("eventWindowTime")
            .greedy("eventTypeRecord")
            .build()?,
    )?;

    registry.register(
        request(LinkControl)
            .enum_byte("linkControlType")
            .byte("baudrateIdentifier")
            .when("linkControlType", Equals(0x01))
            .byte("baudrateHighByte")
            .when("linkControlType", Equals(0x02))
            .byte("baudrateMiddleByte")
            .when("linkControlType", Equals(0x02))
            .byte("baudrateLowByte")
            .when("linkControlType", Equals(0x02))
            .build()?,
        response(LinkControl).enum_byte("linkControlType").build()?,
    )?;

    registry.negative_response(
        MessageShape::builder(
            NEGATIVE_RESPONSE,
            "NegativeResponse",
            NegativeResponse,
            Direction::NegativeResponse,
        )
        .enum_byte("requestServiceId")
        .enum_byte("negativeResponseCode")
        .build()?,
    )?;

    Ok(())
}
