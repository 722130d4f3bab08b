//! Fixed device identity served by `/ISAPI/System/deviceInfo`

use crate::xml::escape_text;

/// Identity fields reported by the simulated NVR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    pub device_name: &'static str,
    pub device_id: &'static str,
    pub model: &'static str,
    pub serial_number: &'static str,
    pub firmware_version: &'static str,
}

/// The one device this mock pretends to be
pub const MOCK_DEVICE: DeviceInfo = DeviceInfo {
    device_name: "Mock NVR",
    device_id: "mock-device-001",
    model: "DS-7608NI-K2",
    serial_number: "MOCK2024010100001",
    firmware_version: "V4.62.000",
};

impl DeviceInfo {
    /// Render the `<DeviceInfo>` document
    pub fn to_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<DeviceInfo>
    <deviceName>{}</deviceName>
    <deviceID>{}</deviceID>
    <model>{}</model>
    <serialNumber>{}</serialNumber>
    <firmwareVersion>{}</firmwareVersion>
</DeviceInfo>"#,
            escape_text(self.device_name),
            escape_text(self.device_id),
            escape_text(self.model),
            escape_text(self.serial_number),
            escape_text(self.firmware_version),
        )
    }
}
