//! # NAS Registry
//!
//! Message ids, TLV ids and field enumerations for the Network Access Service.
//!
//! | Message                          | Id     | TLVs used here                     |
//! |----------------------------------|--------|------------------------------------|
//! | Indication Register              | 0x0003 | req 0x18 sys-info enable (u8)      |
//! | Get Serving System               | 0x0024 | resp 0x01 serving system           |
//! | Set System Selection Preference  | 0x0033 | req 0x11 mode preference (u16)     |
//! | Get System Info                  | 0x004D | resp 0x12/0x13/0x14 service status |
//! | System Info indication           | 0x004E | same as Get System Info            |
//!
//! Responses lead with the result TLV 0x02 (`result:u16, error:u16`).

use num_enum::TryFromPrimitive;

/// NAS message ids handled by the session
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum NasMessage {
    IndicationRegister = 0x0003,
    GetServingSystem = 0x0024,
    SetSystemSelectionPreference = 0x0033,
    GetSysInfo = 0x004D,
    SysInfoIndication = 0x004E,
}

impl NasMessage {
    pub fn id(self) -> u16 {
        self as u16
    }

    pub fn name(&self) -> &'static str {
        match self {
            NasMessage::IndicationRegister => "Indication Register",
            NasMessage::GetServingSystem => "Get Serving System",
            NasMessage::SetSystemSelectionPreference => "Set System Selection Preference",
            NasMessage::GetSysInfo => "Get System Info",
            NasMessage::SysInfoIndication => "System Info indication",
        }
    }
}

/// TLV type ids
pub mod tlv {
    /// Leading TLV of every response
    pub const RESULT: u8 = 0x02;
    /// Set System Selection Preference: radio-access-technology mode bitmask
    pub const MODE_PREFERENCE: u8 = 0x11;
    /// Indication Register: enable System Info indications
    pub const SYS_INFO_INDICATION: u8 = 0x18;
    /// Get Serving System: registration summary
    pub const SERVING_SYSTEM: u8 = 0x01;
    /// Get System Info / indication: per-technology service status
    pub const GSM_SERVICE_STATUS: u8 = 0x12;
    pub const WCDMA_SERVICE_STATUS: u8 = 0x13;
    pub const LTE_SERVICE_STATUS: u8 = 0x14;
}

/// Outcome carried in the first two bytes of the result TLV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QmiResult {
    Success,
    Failure { error: u16 },
}

impl QmiResult {
    pub const FAILURE_CODE: u16 = 1;

    /// Only the explicit failure code is treated as failure.
    pub fn from_codes(result: u16, error: u16) -> Self {
        if result == Self::FAILURE_CODE {
            QmiResult::Failure { error }
        } else {
            QmiResult::Success
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, QmiResult::Failure { .. })
    }
}

/// Radio access technologies accepted in the mode-preference bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RadioTechnology {
    Cdma1x,
    Hdr,
    Gsm,
    Umts,
    Lte,
    TdScdma,
}

impl RadioTechnology {
    pub fn mode_bit(self) -> u16 {
        match self {
            RadioTechnology::Cdma1x => 0x01,
            RadioTechnology::Hdr => 0x02,
            RadioTechnology::Gsm => 0x04,
            RadioTechnology::Umts => 0x08,
            RadioTechnology::Lte => 0x10,
            RadioTechnology::TdScdma => 0x20,
        }
    }

    /// Fold a preference list into the wire bitmask.
    pub fn mode_mask(technologies: &[RadioTechnology]) -> u16 {
        technologies.iter().fold(0, |mask, rat| mask | rat.mode_bit())
    }
}

/// `srv_status` byte of a service status TLV
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
pub enum ServiceStatus {
    NoService = 0,
    Limited = 1,
    Service = 2,
    LimitedRegional = 3,
    PowerSave = 4,
}

/// Technology the modem is attached on, as last observed from System Info
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceTechnology {
    #[default]
    None,
    Gsm,
    Umts,
    Lte,
}

impl ServiceTechnology {
    /// Technology reported by a service status TLV type, if it is one.
    pub fn from_status_tlv(tlv_type: u8) -> Option<Self> {
        match tlv_type {
            tlv::GSM_SERVICE_STATUS => Some(ServiceTechnology::Gsm),
            tlv::WCDMA_SERVICE_STATUS => Some(ServiceTechnology::Umts),
            tlv::LTE_SERVICE_STATUS => Some(ServiceTechnology::Lte),
            _ => None,
        }
    }

    pub fn has_service(&self) -> bool {
        !matches!(self, ServiceTechnology::None)
    }
}

/// Registration state byte of the serving system TLV
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
pub enum RegistrationState {
    NotRegistered = 0,
    Registered = 1,
    Searching = 2,
    Denied = 3,
    Unknown = 4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_ids() {
        assert_eq!(NasMessage::try_from(0x004Du16).unwrap(), NasMessage::GetSysInfo);
        assert_eq!(NasMessage::SysInfoIndication.id(), 0x004E);
        assert!(NasMessage::try_from(0x0001u16).is_err());
    }

    #[test]
    fn test_mode_mask() {
        assert_eq!(RadioTechnology::mode_mask(&[RadioTechnology::Gsm]), 0x04);
        assert_eq!(
            RadioTechnology::mode_mask(&[
                RadioTechnology::Gsm,
                RadioTechnology::Umts,
                RadioTechnology::Lte
            ]),
            0x1C
        );
        assert_eq!(RadioTechnology::mode_mask(&[]), 0);
    }

    #[test]
    fn test_result_codes() {
        assert_eq!(QmiResult::from_codes(0, 0), QmiResult::Success);
        assert!(QmiResult::from_codes(1, 0x0E).is_failure());
        assert_eq!(QmiResult::from_codes(1, 0x0E), QmiResult::Failure { error: 0x0E });
    }

    #[test]
    fn test_status_tlv_technology() {
        assert_eq!(ServiceTechnology::from_status_tlv(0x12), Some(ServiceTechnology::Gsm));
        assert_eq!(ServiceTechnology::from_status_tlv(0x13), Some(ServiceTechnology::Umts));
        assert_eq!(ServiceTechnology::from_status_tlv(0x14), Some(ServiceTechnology::Lte));
        assert_eq!(ServiceTechnology::from_status_tlv(0x10), None);
        assert!(!ServiceTechnology::None.has_service());
        assert!(ServiceTechnology::Lte.has_service());
    }
}
