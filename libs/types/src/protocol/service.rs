//! QMI service registry

use num_enum::FromPrimitive;

/// Service addressed by a QMUX header
///
/// `Control` is numerically zero and is the only service using the short
/// control header variant. Unlisted service numbers are preserved in `Other`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
pub enum ServiceType {
    Control = 0x00,
    Wds = 0x01,
    Dms = 0x02,
    Nas = 0x03,
    Qos = 0x04,
    Wms = 0x05,
    Pds = 0x06,
    Uim = 0x0B,
    #[num_enum(catch_all)]
    Other(u8),
}

impl From<ServiceType> for u8 {
    fn from(service: ServiceType) -> Self {
        match service {
            ServiceType::Control => 0x00,
            ServiceType::Wds => 0x01,
            ServiceType::Dms => 0x02,
            ServiceType::Nas => 0x03,
            ServiceType::Qos => 0x04,
            ServiceType::Wms => 0x05,
            ServiceType::Pds => 0x06,
            ServiceType::Uim => 0x0B,
            ServiceType::Other(value) => value,
        }
    }
}

impl ServiceType {
    pub fn name(&self) -> &'static str {
        match self {
            ServiceType::Control => "CTL",
            ServiceType::Wds => "WDS",
            ServiceType::Dms => "DMS",
            ServiceType::Nas => "NAS",
            ServiceType::Qos => "QOS",
            ServiceType::Wms => "WMS",
            ServiceType::Pds => "PDS",
            ServiceType::Uim => "UIM",
            ServiceType::Other(_) => "unknown",
        }
    }
}
