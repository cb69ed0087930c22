//! System Info and Serving System payload evaluation

use crate::error::{NasError, NasResult};
use qmi_codec::{DecodeResult, Frame, TlvRecord};
use qmi_types::nas::tlv;
use qmi_types::{QmiResult, RegistrationState, ServiceStatus, ServiceTechnology};

/// What a System Info response or indication says about service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysInfoReport {
    /// Leading result TLV signalled failure
    Failed { error: u16 },
    /// First technology whose status TLV reports full service, or `None`
    Observed(ServiceTechnology),
}

/// Decode a result TLV (`result:u16, error:u16`)
///
/// A record carrying only the result code reads as error zero.
pub fn read_result(record: &TlvRecord<'_>) -> DecodeResult<QmiResult> {
    let result = record.u16_at(0)?;
    let error = record.u16_at(2).unwrap_or(0);
    Ok(QmiResult::from_codes(result, error))
}

/// Walk the TLV chain of a System Info frame.
///
/// The leading record is read as the result code whatever its type, for
/// responses and indications alike, and is never scanned as a status record.
/// The walk stops at the first technology in full service.
pub fn evaluate(frame: &Frame<'_>) -> NasResult<SysInfoReport> {
    let mut records = frame.tlvs();

    let leading = records.next().transpose()?.ok_or(NasError::MissingResult {
        message_id: frame.header.message_id,
    })?;
    if let QmiResult::Failure { error } = read_result(&leading)? {
        return Ok(SysInfoReport::Failed { error });
    }

    for record in records {
        let record = record?;
        let Some(technology) = ServiceTechnology::from_status_tlv(record.tlv_type) else {
            continue;
        };
        if matches!(
            ServiceStatus::try_from(record.u8_at(0)?),
            Ok(ServiceStatus::Service)
        ) {
            return Ok(SysInfoReport::Observed(technology));
        }
    }

    Ok(SysInfoReport::Observed(ServiceTechnology::None))
}

/// Registration summary from a Get Serving System response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServingSystem {
    /// `None` when the modem reports a value outside the known range
    pub registration: Option<RegistrationState>,
    pub cs_attached: bool,
    pub ps_attached: bool,
    pub selected_network: u8,
    pub radio_interfaces: Vec<u8>,
}

impl ServingSystem {
    const ATTACHED: u8 = 1;

    /// Decode TLV 0x01; `Ok(None)` when the frame does not carry it.
    pub fn decode(frame: &Frame<'_>) -> DecodeResult<Option<Self>> {
        let Some(record) = frame.find(tlv::SERVING_SYSTEM)? else {
            return Ok(None);
        };

        let count = usize::from(record.u8_at(4)?);
        let radio_interfaces = (0..count)
            .map(|i| record.u8_at(5 + i))
            .collect::<DecodeResult<Vec<_>>>()?;

        Ok(Some(Self {
            registration: RegistrationState::try_from(record.u8_at(0)?).ok(),
            cs_attached: record.u8_at(1)? == Self::ATTACHED,
            ps_attached: record.u8_at(2)? == Self::ATTACHED,
            selected_network: record.u8_at(3)?,
            radio_interfaces,
        }))
    }
}
