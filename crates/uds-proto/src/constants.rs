//! Well-known UDS identifiers

/// Standard UDS service ID constants (request direction)
pub mod service_id {
    pub const DIAGNOSTIC_SESSION_CONTROL: u8 = 0x10;
    pub const ECU_RESET: u8 = 0x11;
    pub const CLEAR_DIAGNOSTIC_INFO: u8 = 0x14;
    pub const READ_DTC_INFO: u8 = 0x19;
    pub const READ_DATA_BY_ID: u8 = 0x22;
    pub const READ_MEMORY_BY_ADDRESS: u8 = 0x23;
    pub const READ_SCALING_DATA_BY_ID: u8 = 0x24;
    pub const SECURITY_ACCESS: u8 = 0x27;
    pub const COMMUNICATION_CONTROL: u8 = 0x28;
    pub const READ_DATA_BY_PERIODIC_ID: u8 = 0x2A;
    pub const DYNAMICALLY_DEFINE_DATA_ID: u8 = 0x2C;
    pub const WRITE_DATA_BY_ID: u8 = 0x2E;
    pub const IO_CONTROL_BY_ID: u8 = 0x2F;
    pub const ROUTINE_CONTROL: u8 = 0x31;
    pub const REQUEST_DOWNLOAD: u8 = 0x34;
    pub const REQUEST_UPLOAD: u8 = 0x35;
    pub const TRANSFER_DATA: u8 = 0x36;
    pub const REQUEST_TRANSFER_EXIT: u8 = 0x37;
    pub const REQUEST_FILE_TRANSFER: u8 = 0x38;
    pub const WRITE_MEMORY_BY_ADDRESS: u8 = 0x3D;
    pub const TESTER_PRESENT: u8 = 0x3E;
    pub const ACCESS_TIMING_PARAMETER: u8 = 0x83;
    pub const SECURED_DATA_TRANSMISSION: u8 = 0x84;
    pub const CONTROL_DTC_SETTING: u8 = 0x85;
    pub const RESPONSE_ON_EVENT: u8 = 0x86;
    pub const LINK_CONTROL: u8 = 0x87;
    pub const NEGATIVE_RESPONSE: u8 = 0x7F;

    /// Bit distinguishing a positive response from its request
    pub const RESPONSE_BIT: u8 = 0x40;
}

/// DiagnosticSessionControl (0x10) session types
pub mod session_type {
    pub const DEFAULT: u8 = 0x01;
    pub const PROGRAMMING: u8 = 0x02;
    pub const EXTENDED: u8 = 0x03;
    pub const SAFETY_SYSTEM: u8 = 0x04;
}

/// ECUReset (0x11) sub-functions
pub mod reset_type {
    /// Hard reset - complete shutdown and restart of ECU
    pub const HARD_RESET: u8 = 0x01;
    /// Key off/on reset - simulate ignition cycle
    pub const KEY_OFF_ON_RESET: u8 = 0x02;
    /// Soft reset - application-level restart
    pub const SOFT_RESET: u8 = 0x03;
    /// Enable rapid power shutdown; the response carries powerDownTime
    pub const ENABLE_RAPID_POWER_SHUTDOWN: u8 = 0x04;
    pub const DISABLE_RAPID_POWER_SHUTDOWN: u8 = 0x05;
}

/// RoutineControl (0x31) sub-functions
pub mod routine_control_type {
    pub const START_ROUTINE: u8 = 0x01;
    pub const STOP_ROUTINE: u8 = 0x02;
    pub const REQUEST_ROUTINE_RESULTS: u8 = 0x03;
}

/// TesterPresent (0x3E) sub-functions
pub mod tester_present {
    pub const ZERO_SUB_FUNCTION: u8 = 0x00;
    /// suppressPosRspMsgIndicationBit set
    pub const SUPPRESS_POSITIVE_RESPONSE: u8 = 0x80;
}

/// Standard UDS Data Identifiers (ISO 14229-1 Annex C)
pub mod standard_did {
    pub const BOOT_SOFTWARE_ID: u16 = 0xF180;
    pub const APPLICATION_SOFTWARE_ID: u16 = 0xF181;
    pub const APPLICATION_DATA_ID: u16 = 0xF182;
    pub const BOOT_SOFTWARE_FINGERPRINT: u16 = 0xF183;
    pub const APP_SOFTWARE_FINGERPRINT: u16 = 0xF184;
    pub const APP_DATA_FINGERPRINT: u16 = 0xF185;
    pub const ACTIVE_DIAGNOSTIC_SESSION: u16 = 0xF186;
    pub const SPARE_PART_NUMBER: u16 = 0xF187;
    pub const ECU_SOFTWARE_NUMBER: u16 = 0xF188;
    pub const ECU_SOFTWARE_VERSION: u16 = 0xF189;
    pub const SYSTEM_SUPPLIER_ID: u16 = 0xF18A;
    pub const ECU_MANUFACTURING_DATE: u16 = 0xF18B;
    pub const ECU_SERIAL_NUMBER: u16 = 0xF18C;
    pub const VIN: u16 = 0xF190;
    pub const ECU_HARDWARE_NUMBER: u16 = 0xF191;
    pub const SUPPLIER_HW_NUMBER: u16 = 0xF192;
    pub const SUPPLIER_HW_VERSION: u16 = 0xF193;
    pub const SUPPLIER_SW_NUMBER: u16 = 0xF194;
    pub const SUPPLIER_SW_VERSION: u16 = 0xF195;
    pub const SYSTEM_NAME: u16 = 0xF197;
    pub const PROGRAMMING_DATE: u16 = 0xF199;
    pub const TESTER_SERIAL_NUMBER: u16 = 0xF19E;

    /// Display names seeded into the data identifier name tables
    pub const NAMES: &[(u16, &str)] = &[
        (BOOT_SOFTWARE_ID, "bootSoftwareIdentification"),
        (APPLICATION_SOFTWARE_ID, "applicationSoftwareIdentification"),
        (APPLICATION_DATA_ID, "applicationDataIdentification"),
        (BOOT_SOFTWARE_FINGERPRINT, "bootSoftwareFingerprint"),
        (APP_SOFTWARE_FINGERPRINT, "applicationSoftwareFingerprint"),
        (APP_DATA_FINGERPRINT, "applicationDataFingerprint"),
        (ACTIVE_DIAGNOSTIC_SESSION, "activeDiagnosticSession"),
        (SPARE_PART_NUMBER, "vehicleManufacturerSparePartNumber"),
        (ECU_SOFTWARE_NUMBER, "vehicleManufacturerECUSoftwareNumber"),
        (ECU_SOFTWARE_VERSION, "vehicleManufacturerECUSoftwareVersionNumber"),
        (SYSTEM_SUPPLIER_ID, "systemSupplierIdentifier"),
        (ECU_MANUFACTURING_DATE, "ECUManufacturingDate"),
        (ECU_SERIAL_NUMBER, "ECUSerialNumber"),
        (VIN, "VIN"),
        (ECU_HARDWARE_NUMBER, "vehicleManufacturerECUHardwareNumber"),
        (SUPPLIER_HW_NUMBER, "systemSupplierECUHardwareNumber"),
        (SUPPLIER_HW_VERSION, "systemSupplierECUHardwareVersionNumber"),
        (SUPPLIER_SW_NUMBER, "systemSupplierECUSoftwareNumber"),
        (SUPPLIER_SW_VERSION, "systemSupplierECUSoftwareVersionNumber"),
        (SYSTEM_NAME, "systemNameOrEngineType"),
        (PROGRAMMING_DATE, "programmingDate"),
        (TESTER_SERIAL_NUMBER, "repairShopCodeOrTesterSerialNumber"),
    ];
}
